//! Core HTTP client with retry, compression, and Salesforce-specific handling.

use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{is_retryable_status, Error, ErrorKind, Result};
use crate::request::RequestBuilder;
use crate::response::Response;
use crate::retry::RetryPolicy;

/// HTTP client for Salesforce APIs with built-in retry and error mapping.
#[derive(Debug, Clone)]
pub struct SfHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl SfHttpClient {
    /// Create a new HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a request, retrying transient failures per the retry config.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn execute(&self, request: &RequestBuilder) -> Result<Response> {
        let mut retry_policy = self.config.retry.clone().map(RetryPolicy::new);

        loop {
            let err = match self.execute_once(request).await {
                Ok(response) => {
                    if let Some(usage) = response.api_usage() {
                        debug!(used = usage.used, remaining = usage.remaining(), "API usage");
                    }
                    return response.check_salesforce_error().await;
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            let Some(policy) = retry_policy.as_mut() else {
                return Err(err);
            };

            match policy.next_delay(err.retry_after()) {
                Some(delay) => {
                    warn!(
                        attempt = policy.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(Error::with_source(
                        ErrorKind::RetriesExhausted {
                            attempts: policy.attempt(),
                        },
                        err,
                    ));
                }
            }
        }
    }

    /// Execute a single request without retry logic.
    async fn execute_once(&self, request: &RequestBuilder) -> Result<Response> {
        let mut req = self.inner.get(&request.url);

        if let Some(ref token) = request.bearer_token {
            req = req.bearer_auth(token);
        }

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if !request.query_params.is_empty() {
            req = req.query(&request.query_params);
        }

        if self.config.enable_tracing {
            debug!(url = %request.url, "Sending request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();

        if self.config.enable_tracing {
            if response.status().is_success() {
                debug!(status, content_length = response.content_length(), "Response received");
            } else {
                info!(status, "Non-success response");
            }
        }

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);

            return Err(Error::new(ErrorKind::RateLimited { retry_after }));
        }

        if is_retryable_status(status) {
            return Err(Error::new(ErrorKind::Http {
                status,
                message: format!("Server error: {}", status),
            }));
        }

        Ok(Response::new(response))
    }

    /// Execute a request and deserialize the JSON response.
    pub async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: &RequestBuilder,
    ) -> Result<T> {
        self.execute(request).await?.json().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RetryConfig;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn no_retry_client() -> SfHttpClient {
        SfHttpClient::new(ClientConfig::builder().without_retry().build()).unwrap()
    }

    #[tokio::test]
    async fn test_get_with_bearer_and_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tooling/query"))
            .and(header("Authorization", "Bearer test-token"))
            .and(query_param("q", "SELECT Id FROM EntityDefinition"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 0, "done": true, "records": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = no_retry_client();
        let request = RequestBuilder::get(format!("{}/tooling/query", mock_server.uri()))
            .bearer_auth("test-token")
            .query("q", "SELECT Id FROM EntityDefinition");

        let body: serde_json::Value = client.send_json(&request).await.unwrap();
        assert_eq!(body["done"], true);
    }

    #[tokio::test]
    async fn test_salesforce_error_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/error"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!([{
                "errorCode": "INVALID_FIELD",
                "message": "No such column 'Foo' on entity 'EntityDefinition'",
                "fields": ["Foo"]
            }])))
            .mount(&mock_server)
            .await;

        let err = no_retry_client()
            .execute(&RequestBuilder::get(format!("{}/error", mock_server.uri())))
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::SalesforceApi { .. }));
    }

    #[tokio::test]
    async fn test_rate_limiting_reads_retry_after() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
            .mount(&mock_server)
            .await;

        let err = no_retry_client()
            .execute(&RequestBuilder::get(format!("{}/limited", mock_server.uri())))
            .await
            .unwrap_err();

        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_retry_on_503() {
        let mock_server = MockServer::start().await;
        let call_count = Arc::new(AtomicU32::new(0));
        let counter = call_count.clone();

        Mock::given(method("GET"))
            .and(path("/retry"))
            .respond_with(move |_: &wiremock::Request| {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true}))
                }
            })
            .mount(&mock_server)
            .await;

        let client = SfHttpClient::new(
            ClientConfig::builder()
                .with_retry(
                    RetryConfig::default()
                        .with_max_attempts(3)
                        .with_initial_delay(Duration::from_millis(10)),
                )
                .build(),
        )
        .unwrap();

        let response = client
            .execute(&RequestBuilder::get(format!("{}/retry", mock_server.uri())))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(502))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = SfHttpClient::new(
            ClientConfig::builder()
                .with_retry(
                    RetryConfig::default()
                        .with_max_attempts(1)
                        .with_initial_delay(Duration::from_millis(5)),
                )
                .build(),
        )
        .unwrap();

        let err = client
            .execute(&RequestBuilder::get(format!("{}/down", mock_server.uri())))
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::RetriesExhausted { attempts: 1 }));
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/expired"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!([{
                "errorCode": "INVALID_SESSION_ID",
                "message": "Session expired or invalid"
            }])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = SfHttpClient::default_client().unwrap();
        let err = client
            .execute(&RequestBuilder::get(format!("{}/expired", mock_server.uri())))
            .await
            .unwrap_err();

        assert!(err.is_auth_error());
    }
}
