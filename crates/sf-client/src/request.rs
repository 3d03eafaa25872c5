//! Read-only request building.

use std::collections::BTreeMap;

/// Builder for a Tooling API GET request.
///
/// Every Tooling call this crate makes is a read, so the builder only
/// carries what a GET needs.
pub struct RequestBuilder {
    pub(crate) url: String,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) bearer_token: Option<String>,
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("query_params", &self.query_params)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl RequestBuilder {
    /// Create a GET request for the given absolute URL.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            query_params: Vec::new(),
            bearer_token: None,
        }
    }

    /// Set the bearer token for authentication.
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a query parameter. Values are percent-encoded on send.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    /// The target URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_parts() {
        let req = RequestBuilder::get("https://acme.my.salesforce.com/services/data/v62.0/tooling/query")
            .bearer_auth("token")
            .query("q", "SELECT Id FROM EntityDefinition")
            .header("Sforce-Query-Options", "batchSize=500");

        assert_eq!(req.query_params.len(), 1);
        assert_eq!(
            req.headers.get("Sforce-Query-Options").map(String::as_str),
            Some("batchSize=500")
        );
        assert!(req.url().ends_with("/tooling/query"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let req = RequestBuilder::get("https://x.my.salesforce.com").bearer_auth("00Dxx!secret");
        let debug = format!("{:?}", req);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("00Dxx!secret"));
    }
}
