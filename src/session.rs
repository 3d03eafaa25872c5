//! Authenticated session, built once per provider and cached as plain data.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sobject_browser_auth::{Credentials, SalesforceCredentials, SessionExchange};
use sobject_browser_client::{ClientConfig, SalesforceClient};
use sobject_browser_tooling::{base_url, ToolingClient};
use tokio::sync::OnceCell;
use tracing::{info, instrument};

use crate::cache::{keys, KeyValueCache};
use crate::error::Result;
use crate::memo::MemoCell;
use crate::resolver::CredentialResolver;

/// Everything needed to rebuild a session without asking the SF CLI again.
///
/// The access token is redacted in Debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub username: String,
    pub instance_url: String,
    pub access_token: String,
    pub api_version: String,
    pub base_url: String,
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("username", &self.username)
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SessionRecord {
    /// Record for credentials returned by an exchange.
    pub fn from_credentials(username: &str, creds: &SalesforceCredentials) -> Result<Self> {
        Ok(Self {
            username: creds.username().unwrap_or(username).to_string(),
            instance_url: creds.instance_url().to_string(),
            access_token: creds.access_token().to_string(),
            api_version: creds.api_version().to_string(),
            base_url: base_url(creds.instance_url())?,
        })
    }
}

/// A live Tooling client plus the record it was built from.
#[derive(Debug, Clone)]
pub struct Session {
    record: SessionRecord,
    client: ToolingClient,
}

impl Session {
    /// Build a client from a record. The token is not checked here.
    pub fn from_record(record: SessionRecord, config: ClientConfig) -> Result<Self> {
        let client = SalesforceClient::with_config(
            record.instance_url.clone(),
            record.access_token.clone(),
            config,
        )?
        .with_api_version(record.api_version.clone());

        Ok(Self {
            record,
            client: ToolingClient::from_client(client),
        })
    }

    pub fn client(&self) -> &ToolingClient {
        &self.client
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn username(&self) -> &str {
        &self.record.username
    }

    /// Scheme and host of the org, for setup links.
    pub fn base_url(&self) -> &str {
        &self.record.base_url
    }
}

/// Hands out the session for the default org.
///
/// The first call in a process either rebuilds the session from the cached
/// `connection` record or resolves the username and runs the exchange. The
/// result is kept for the provider's lifetime.
pub struct SessionProvider<E> {
    resolver: CredentialResolver,
    exchange: E,
    cache: Arc<dyn KeyValueCache>,
    client_config: ClientConfig,
    api_version: Option<String>,
    live: OnceCell<Session>,
}

impl<E> std::fmt::Debug for SessionProvider<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionProvider")
            .field("connected", &self.live.initialized())
            .finish_non_exhaustive()
    }
}

impl<E: SessionExchange> SessionProvider<E> {
    pub fn new(resolver: CredentialResolver, exchange: E, cache: Arc<dyn KeyValueCache>) -> Self {
        Self {
            resolver,
            exchange,
            cache,
            client_config: ClientConfig::default(),
            api_version: None,
            live: OnceCell::new(),
        }
    }

    /// HTTP settings for the rebuilt client.
    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = config;
        self
    }

    /// Use this API version regardless of what the exchange reports.
    pub fn with_api_version(mut self, version: Option<String>) -> Self {
        self.api_version = version;
        self
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    /// The session for the default org.
    pub async fn session(&self) -> Result<&Session> {
        self.live.get_or_try_init(|| self.connect()).await
    }

    #[instrument(skip(self))]
    async fn connect(&self) -> Result<Session> {
        let mut record = MemoCell::new(self.cache.clone(), keys::CONNECTION)
            .get_or_fetch(|| self.exchange_record())
            .await?;

        if let Some(version) = &self.api_version {
            record.api_version = version.clone();
        }

        Session::from_record(record, self.client_config.clone())
    }

    async fn exchange_record(&self) -> Result<SessionRecord> {
        let username = self.resolver.default_username().await?;
        let creds = self.exchange.exchange(&username).await?;
        let record = SessionRecord::from_credentials(&username, &creds)?;

        MemoCell::<String>::new(self.cache.clone(), keys::BASE_URL).store(&record.base_url)?;
        info!(username = %record.username, instance_url = %record.instance_url, "Session established");
        Ok(record)
    }
}
