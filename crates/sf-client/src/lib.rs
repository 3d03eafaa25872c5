//! # sobject-browser-client
//!
//! HTTP transport for the Salesforce Tooling API.
//!
//! This crate provides the pieces every query goes through:
//! - Automatic retry with exponential backoff and jitter
//! - Mapping of Salesforce error payloads and HTTP statuses to error kinds
//! - Rate limit detection (`Retry-After`)
//! - SOQL escaping and identifier checks
//! - Redaction of tokens in error messages
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    sobject-browser-tooling                  │
//! │  (EntityDefinition / FieldDefinition queries)               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SalesforceClient                          │
//! │  - Holds instance URL, access token, API version            │
//! │  - Tooling query + pagination                               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SfHttpClient                             │
//! │  - Raw HTTP with retry, compression, rate limiting          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use sobject_browser_client::SalesforceClient;
//!
//! let client = SalesforceClient::new("https://acme.my.salesforce.com", token)?;
//! let page: QueryResult<serde_json::Value> = client
//!     .tooling_query("SELECT Id FROM EntityDefinition LIMIT 5")
//!     .await?;
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod retry;
mod salesforce_client;
pub mod security;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use request::RequestBuilder;
pub use response::{ApiUsage, Response};
pub use retry::{BackoffStrategy, RetryConfig, RetryPolicy};
pub use salesforce_client::{QueryResult, SalesforceClient};

/// Default Salesforce API version
pub const DEFAULT_API_VERSION: &str = "62.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("sobject-browser/", env!("CARGO_PKG_VERSION"));
