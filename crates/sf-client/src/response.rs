//! HTTP response handling with Salesforce-specific extensions.

use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};
use crate::security::sanitize_message;

/// Wrapper around a successful HTTP response.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Get the `Retry-After` header as a Duration (seconds form only).
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after")?
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    }

    /// Get API usage limits from the `Sforce-Limit-Info` header.
    pub fn api_usage(&self) -> Option<ApiUsage> {
        ApiUsage::parse(self.header("sforce-limit-info")?)
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(Into::into)
    }

    /// Deserialize the response body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.inner.bytes().await?;
        serde_json::from_slice(&body).map_err(Into::into)
    }

    /// Turn a non-2xx response into the matching error kind.
    pub(crate) async fn check_salesforce_error(self) -> Result<Response> {
        if self.is_success() {
            return Ok(self);
        }

        let status = self.status();
        let body = self.text().await.unwrap_or_default();
        Err(parse_error_response(status, &body))
    }
}

/// API usage information from response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiUsage {
    /// Number of API calls used.
    pub used: u64,
    /// Total API call limit.
    pub limit: u64,
}

impl ApiUsage {
    /// Parse `api-usage=25/15000` out of a `Sforce-Limit-Info` value.
    pub fn parse(info: &str) -> Option<Self> {
        let usage = info
            .split(',')
            .map(str::trim)
            .find_map(|part| part.strip_prefix("api-usage="))?;
        let (used, limit) = usage.split_once('/')?;
        Some(Self {
            used: used.parse().ok()?,
            limit: limit.parse().ok()?,
        })
    }

    /// Get the remaining API calls.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}

/// Map an error body and status to an error kind.
fn parse_error_response(status: u16, body: &str) -> Error {
    if status == 429 {
        return Error::new(ErrorKind::RateLimited { retry_after: None });
    }

    // Salesforce usually answers with an array of errors; sometimes a single object.
    let first = serde_json::from_str::<Vec<SalesforceErrorResponse>>(body)
        .ok()
        .and_then(|errors| errors.into_iter().next())
        .or_else(|| serde_json::from_str::<SalesforceErrorResponse>(body).ok());

    if let Some(err) = first {
        let message = sanitize_message(&err.message);
        return Error::new(match (status, err.error_code.as_str()) {
            (401, _) | (_, "INVALID_SESSION_ID") => ErrorKind::Authentication(message),
            _ => ErrorKind::SalesforceApi {
                error_code: err.error_code,
                message,
                fields: err.fields.unwrap_or_default(),
            },
        });
    }

    let sanitized = sanitize_message(body);
    let kind = match status {
        401 => ErrorKind::Authentication(sanitized),
        403 => ErrorKind::Authorization(sanitized),
        404 => ErrorKind::NotFound(sanitized),
        _ => ErrorKind::Http {
            status,
            message: sanitized,
        },
    };

    Error::new(kind)
}

/// Salesforce API error response format.
#[derive(Debug, serde::Deserialize)]
struct SalesforceErrorResponse {
    #[serde(alias = "errorCode")]
    error_code: String,
    message: String,
    fields: Option<Vec<String>>,
}
