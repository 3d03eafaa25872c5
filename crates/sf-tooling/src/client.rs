//! Salesforce Tooling API client.
//!
//! This client wraps `SalesforceClient` from `sobject-browser-client` and
//! provides typed methods for the metadata queries.

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use sobject_browser_client::{ClientConfig, QueryResult, SalesforceClient};

use crate::error::Result;
use crate::soql::{entity_definitions_query, field_definitions_query};
use crate::types::{EntityDefinition, FieldDefinition};

/// Salesforce Tooling API client.
///
/// # Example
///
/// ```rust,ignore
/// use sobject_browser_tooling::ToolingClient;
///
/// let client = ToolingClient::new(
///     "https://myorg.my.salesforce.com",
///     "access_token_here",
/// )?;
///
/// let entities = client.list_entity_definitions(500).await?;
/// let fields = client.list_field_definitions("Account", 500).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ToolingClient {
    client: SalesforceClient,
}

impl ToolingClient {
    /// Create a new Tooling API client with the given instance URL and access token.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let client = SalesforceClient::new(instance_url, access_token)?;
        Ok(Self { client })
    }

    /// Create a new Tooling API client with custom HTTP configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let client = SalesforceClient::with_config(instance_url, access_token, config)?;
        Ok(Self { client })
    }

    /// Create a Tooling client from an existing SalesforceClient.
    pub fn from_client(client: SalesforceClient) -> Self {
        Self { client }
    }

    /// Get the underlying SalesforceClient.
    pub fn inner(&self) -> &SalesforceClient {
        &self.client
    }

    /// Get the instance URL.
    pub fn instance_url(&self) -> &str {
        self.client.instance_url()
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        self.client.api_version()
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.client = self.client.with_api_version(version);
        self
    }

    // =========================================================================
    // Query Operations
    // =========================================================================

    /// Execute a SOQL query against the Tooling API.
    ///
    /// Returns the first page of results. Use `query_all` for automatic pagination.
    ///
    /// # Security
    ///
    /// Values spliced into a WHERE clause must be escaped. Prefer
    /// [`SoqlQuery`](crate::SoqlQuery), which does it for you.
    #[instrument(skip(self))]
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResult<T>> {
        self.client.tooling_query(soql).await.map_err(Into::into)
    }

    /// Execute a SOQL query and return all results (automatic pagination).
    #[instrument(skip(self))]
    pub async fn query_all<T: DeserializeOwned>(&self, soql: &str) -> Result<Vec<T>> {
        self.client
            .tooling_query_all(soql)
            .await
            .map_err(Into::into)
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Layoutable SObjects, ordered by API name.
    pub async fn list_entity_definitions(&self, limit: u32) -> Result<Vec<EntityDefinition>> {
        let soql = entity_definitions_query(limit)?;
        let records: Vec<EntityDefinition> = self.query_all(&soql).await?;
        debug!(count = records.len(), "Fetched entity definitions");
        Ok(records)
    }

    /// Fields of one SObject, ordered by API name.
    pub async fn list_field_definitions(
        &self,
        entity: &str,
        limit: u32,
    ) -> Result<Vec<FieldDefinition>> {
        let soql = field_definitions_query(entity, limit)?;
        let records: Vec<FieldDefinition> = self.query_all(&soql).await?;
        debug!(entity, count = records.len(), "Fetched field definitions");
        Ok(records)
    }
}
