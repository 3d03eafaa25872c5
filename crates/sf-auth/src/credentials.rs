//! Credentials trait and the session credentials returned by an exchange.
//!
//! All credential types implement custom Debug to redact sensitive data.

use sobject_browser_client::DEFAULT_API_VERSION;

use crate::error::{Error, ErrorKind, Result};

/// Trait for Salesforce credentials.
pub trait Credentials: Send + Sync {
    /// Get the Salesforce instance URL.
    fn instance_url(&self) -> &str;

    /// Get the access token.
    fn access_token(&self) -> &str;

    /// Get the API version (e.g., "62.0").
    fn api_version(&self) -> &str;

    /// Returns true if the credentials appear to be valid (non-empty).
    fn is_valid(&self) -> bool {
        !self.instance_url().is_empty() && !self.access_token().is_empty()
    }
}

/// An access token bound to one org.
///
/// The access token is redacted in Debug output to prevent accidental
/// exposure in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SalesforceCredentials {
    instance_url: String,
    access_token: String,
    api_version: String,
    username: Option<String>,
}

impl std::fmt::Debug for SalesforceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceCredentials")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("username", &self.username)
            .finish()
    }
}

impl SalesforceCredentials {
    /// Create new credentials with the given values.
    pub fn new(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            instance_url: instance_url.into(),
            access_token: access_token.into(),
            api_version: api_version.into(),
            username: None,
        }
    }

    /// Attach the username the session belongs to.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// The username the session belongs to, if known.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Load credentials from environment variables.
    ///
    /// Required environment variables:
    /// - `SF_INSTANCE_URL` or `SALESFORCE_INSTANCE_URL`
    /// - `SF_ACCESS_TOKEN` or `SALESFORCE_ACCESS_TOKEN`
    ///
    /// Optional:
    /// - `SF_API_VERSION` or `SALESFORCE_API_VERSION` (default: "62.0")
    pub fn from_env() -> Result<Self> {
        let instance_url = std::env::var("SF_INSTANCE_URL")
            .or_else(|_| std::env::var("SALESFORCE_INSTANCE_URL"))
            .map_err(|_| Error::new(ErrorKind::EnvVar("SF_INSTANCE_URL".to_string())))?;

        let access_token = std::env::var("SF_ACCESS_TOKEN")
            .or_else(|_| std::env::var("SALESFORCE_ACCESS_TOKEN"))
            .map_err(|_| Error::new(ErrorKind::EnvVar("SF_ACCESS_TOKEN".to_string())))?;

        let api_version = std::env::var("SF_API_VERSION")
            .or_else(|_| std::env::var("SALESFORCE_API_VERSION"))
            .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        let creds = Self::new(instance_url, access_token, api_version);
        if !creds.is_valid() {
            return Err(Error::new(ErrorKind::InvalidCredentials(
                "SF_INSTANCE_URL and SF_ACCESS_TOKEN must not be empty".to_string(),
            )));
        }
        Ok(creds)
    }

    /// Parse the JSON printed by `sf org display --json`.
    ///
    /// Reads `result.instanceUrl`, `result.accessToken`, and optionally
    /// `result.apiVersion` and `result.username`.
    pub fn parse_org_display(stdout: &[u8]) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_slice(stdout)?;

        let result = json.get("result").ok_or_else(|| {
            Error::new(ErrorKind::SfCli("Missing 'result' in output".to_string()))
        })?;

        let instance_url = result
            .get("instanceUrl")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::new(ErrorKind::InvalidCredentials("Missing instanceUrl".to_string())))?;

        let access_token = result
            .get("accessToken")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::new(ErrorKind::InvalidCredentials("Missing accessToken".to_string())))?;

        url::Url::parse(instance_url).map_err(|e| {
            Error::with_source(
                ErrorKind::InvalidCredentials(format!("instanceUrl is not a URL: {instance_url}")),
                e,
            )
        })?;

        let api_version = result
            .get("apiVersion")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_API_VERSION);

        let mut creds = Self::new(instance_url, access_token, api_version);
        if let Some(username) = result.get("username").and_then(|v| v.as_str()) {
            creds = creds.with_username(username);
        }
        Ok(creds)
    }
}

impl Credentials for SalesforceCredentials {
    fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = SalesforceCredentials::new("https://acme.my.salesforce.com", "token123", "62.0");

        assert_eq!(creds.instance_url(), "https://acme.my.salesforce.com");
        assert_eq!(creds.access_token(), "token123");
        assert_eq!(creds.api_version(), "62.0");
        assert!(creds.username().is_none());
        assert!(creds.is_valid());
    }

    #[test]
    fn test_invalid_credentials() {
        let creds = SalesforceCredentials::new("", "", "62.0");
        assert!(!creds.is_valid());
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let creds = SalesforceCredentials::new(
            "https://acme.my.salesforce.com",
            "00Dxx!super_secret_access_token",
            "62.0",
        )
        .with_username("admin@acme.dev");

        let debug_output = format!("{:?}", creds);
        assert!(!debug_output.contains("super_secret_access_token"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(debug_output.contains("admin@acme.dev"));
    }

    #[test]
    fn test_parse_org_display() {
        let stdout = br#"{
            "status": 0,
            "result": {
                "id": "00Dxx0000001gEFEAY",
                "apiVersion": "61.0",
                "accessToken": "00Dxx!abc",
                "instanceUrl": "https://acme-dev-ed.my.salesforce.com",
                "username": "admin@acme.dev",
                "connectedStatus": "Connected"
            }
        }"#;

        let creds = SalesforceCredentials::parse_org_display(stdout).unwrap();
        assert_eq!(creds.instance_url(), "https://acme-dev-ed.my.salesforce.com");
        assert_eq!(creds.access_token(), "00Dxx!abc");
        assert_eq!(creds.api_version(), "61.0");
        assert_eq!(creds.username(), Some("admin@acme.dev"));
    }

    #[test]
    fn test_parse_org_display_defaults_api_version() {
        let stdout = br#"{"result":{"accessToken":"t","instanceUrl":"https://x.my.salesforce.com"}}"#;
        let creds = SalesforceCredentials::parse_org_display(stdout).unwrap();
        assert_eq!(creds.api_version(), DEFAULT_API_VERSION);
    }

    #[test]
    fn test_parse_org_display_missing_token() {
        let stdout = br#"{"result":{"instanceUrl":"https://x.my.salesforce.com"}}"#;
        let err = SalesforceCredentials::parse_org_display(stdout).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidCredentials(_)));
    }

    #[test]
    fn test_parse_org_display_rejects_bad_instance_url() {
        let stdout = br#"{"result":{"accessToken":"t","instanceUrl":"not a url"}}"#;
        let err = SalesforceCredentials::parse_org_display(stdout).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidCredentials(_)));
    }

    #[test]
    fn test_parse_org_display_missing_result() {
        let err = SalesforceCredentials::parse_org_display(br#"{"status":1}"#).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SfCli(_)));
    }

    #[test]
    fn test_parse_org_display_not_json() {
        let err = SalesforceCredentials::parse_org_display(b"Warning: update available").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Json(_)));
    }
}
