//! Authenticated Salesforce client with Tooling query helpers.
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Sensitive parameters are skipped in tracing spans

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::client::SfHttpClient;
use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::RequestBuilder;
use crate::DEFAULT_API_VERSION;

/// Salesforce API client bound to one org session.
///
/// The access token is redacted in Debug output to prevent accidental
/// exposure in logs.
#[derive(Clone)]
pub struct SalesforceClient {
    http: SfHttpClient,
    instance_url: String,
    access_token: String,
    api_version: String,
}

impl std::fmt::Debug for SalesforceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceClient")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl SalesforceClient {
    /// Create a new Salesforce client with the given instance URL and access token.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(instance_url, access_token, ClientConfig::default())
    }

    /// Create a new Salesforce client with custom configuration.
    ///
    /// Fails with `InvalidUrl` if the instance URL does not parse.
    pub fn with_config(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let instance_url = instance_url.into();
        url::Url::parse(&instance_url)?;

        let http = SfHttpClient::new(config)?;
        Ok(Self {
            http,
            instance_url: instance_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Set the API version (e.g., "62.0").
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Get the instance URL.
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Get the access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Resolve a path against the instance URL.
    ///
    /// Absolute URLs pass through unchanged when they share the instance
    /// URL's origin. Any other origin is an `InvalidUrl` error.
    pub fn url(&self, path: &str) -> Result<String> {
        if path.starts_with("http://") || path.starts_with("https://") {
            let target = url::Url::parse(path)?;
            let instance = url::Url::parse(&self.instance_url)?;
            if target.origin() != instance.origin() {
                return Err(Error::new(ErrorKind::InvalidUrl(format!(
                    "{} is not on {}",
                    target.origin().ascii_serialization(),
                    self.instance_url
                ))));
            }
            Ok(path.to_string())
        } else if path.starts_with('/') {
            Ok(format!("{}{}", self.instance_url, path))
        } else {
            Ok(format!("{}/{}", self.instance_url, path))
        }
    }

    /// Build the Tooling API URL for a path.
    ///
    /// Example: `tooling_url("query")` -> `/services/data/v62.0/tooling/query`
    pub fn tooling_url(&self, path: &str) -> String {
        format!(
            "{}/services/data/v{}/tooling/{}",
            self.instance_url,
            self.api_version,
            path.trim_start_matches('/')
        )
    }

    /// GET with JSON response deserialization.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let request = RequestBuilder::get(self.url(url)?).bearer_auth(&self.access_token);
        self.http.send_json(&request).await
    }

    /// Execute a SOQL query via the Tooling API and return the first page.
    #[instrument(skip(self))]
    pub async fn tooling_query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResult<T>> {
        let request = RequestBuilder::get(self.tooling_url("query"))
            .bearer_auth(&self.access_token)
            .query("q", soql);
        self.http.send_json(&request).await
    }

    /// Execute a Tooling API query and follow `nextRecordsUrl` until done.
    pub async fn tooling_query_all<T: DeserializeOwned>(&self, soql: &str) -> Result<Vec<T>> {
        let mut result: QueryResult<T> = self.tooling_query(soql).await?;
        let mut all_records = std::mem::take(&mut result.records);

        while let Some(next_url) = result.next_records_url.take() {
            debug!(next_url = %next_url, fetched = all_records.len(), "Fetching next page");
            result = self.get_json(&next_url).await?;
            all_records.append(&mut result.records);
        }

        Ok(all_records)
    }
}

/// Result of a SOQL query.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct QueryResult<T> {
    /// Total number of records matching the query.
    #[serde(rename = "totalSize")]
    pub total_size: u64,

    /// Whether all records are returned (no more pages).
    pub done: bool,

    /// URL to fetch next batch of results.
    #[serde(rename = "nextRecordsUrl", default)]
    pub next_records_url: Option<String>,

    /// The records.
    pub records: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_url_building() {
        let client = SalesforceClient::new("https://acme.my.salesforce.com/", "token123").unwrap();

        assert_eq!(client.instance_url(), "https://acme.my.salesforce.com");
        assert_eq!(
            client.url("/services/data/v62.0/tooling/query/01gxx-2000").unwrap(),
            "https://acme.my.salesforce.com/services/data/v62.0/tooling/query/01gxx-2000"
        );
        assert_eq!(
            client.url("https://acme.my.salesforce.com/path").unwrap(),
            "https://acme.my.salesforce.com/path"
        );
        assert_eq!(
            client.tooling_url("query"),
            "https://acme.my.salesforce.com/services/data/v62.0/tooling/query"
        );
    }

    #[test]
    fn test_url_rejects_other_origins() {
        let client = SalesforceClient::new("https://acme.my.salesforce.com", "token").unwrap();

        for other in [
            "https://other.example/path",
            "http://acme.my.salesforce.com/path",
            "https://acme.my.salesforce.com:8443/path",
            "https://acme.my.salesforce.com.evil.example/path",
        ] {
            let err = client.url(other).unwrap_err();
            assert!(matches!(err.kind, ErrorKind::InvalidUrl(_)), "{other}");
        }
    }

    #[test]
    fn test_api_version_override() {
        let client = SalesforceClient::new("https://acme.my.salesforce.com", "token")
            .unwrap()
            .with_api_version("60.0");

        assert_eq!(client.api_version(), "60.0");
        assert!(client.tooling_url("query").contains("/v60.0/tooling/"));
    }

    #[test]
    fn test_rejects_unparseable_instance_url() {
        let err = SalesforceClient::new("acme.my.salesforce.com", "token").unwrap_err();
        assert!(matches!(err.kind, crate::ErrorKind::InvalidUrl(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = SalesforceClient::new("https://acme.my.salesforce.com", "00Dxx!secret").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("00Dxx!secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_tooling_query_all_follows_next_records_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/tooling/query"))
            .and(query_param("q", "SELECT Id FROM EntityDefinition"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 3,
                "done": false,
                "nextRecordsUrl": "/services/data/v62.0/tooling/query/01gxx-2",
                "records": [{"Id": "a"}, {"Id": "b"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/tooling/query/01gxx-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 3,
                "done": true,
                "records": [{"Id": "c"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = SalesforceClient::new(mock_server.uri(), "token").unwrap();
        let records: Vec<serde_json::Value> = client
            .tooling_query_all("SELECT Id FROM EntityDefinition")
            .await
            .unwrap();

        let ids: Vec<_> = records.iter().map(|r| r["Id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_next_records_url_on_another_host_is_not_followed() {
        let org = MockServer::start().await;
        let elsewhere = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/services/data/v62.0/tooling/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 2,
                "done": false,
                "nextRecordsUrl": format!("{}/services/data/v62.0/tooling/query/01gxx-2", elsewhere.uri()),
                "records": [{"Id": "a"}]
            })))
            .expect(1)
            .mount(&org)
            .await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&elsewhere)
            .await;

        let client = SalesforceClient::new(org.uri(), "token").unwrap();
        let err = client
            .tooling_query_all::<serde_json::Value>("SELECT Id FROM EntityDefinition")
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::InvalidUrl(_)));
        assert!(elsewhere.received_requests().await.unwrap().is_empty());
    }
}
