//! # sobject-browser-tooling
//!
//! Salesforce Tooling API client for SObject metadata.
//!
//! ## Features
//!
//! - **EntityDefinition** - List layoutable SObjects with key prefixes and labels
//! - **FieldDefinition** - List the fields of one SObject
//! - **SOQL builder** - Escaped values and validated identifiers
//! - **Setup links** - Lightning Object Manager URLs per setup page
//!
//! ## Example
//!
//! ```rust,ignore
//! use sobject_browser_tooling::{setup_url, base_url, SetupSubpath, ToolingClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sobject_browser_tooling::Error> {
//!     let client = ToolingClient::new(
//!         "https://myorg.my.salesforce.com",
//!         "access_token_here",
//!     )?;
//!
//!     let base = base_url(client.instance_url())?;
//!     for entity in client.list_entity_definitions(500).await? {
//!         println!(
//!             "{} {}",
//!             entity.qualified_api_name,
//!             setup_url(&base, &entity.qualified_api_name, Some(SetupSubpath::Layouts))
//!         );
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod setup;
mod soql;
mod types;

pub use client::ToolingClient;
pub use error::{Error, ErrorKind, Result};
pub use setup::{base_url, setup_url, SetupSubpath};
pub use soql::{entity_definitions_query, field_definitions_query, SoqlQuery, DEFAULT_LIMIT};
pub use types::*;

// Re-export client types that users might need
pub use sobject_browser_client::{ClientConfig, ClientConfigBuilder, QueryResult};
