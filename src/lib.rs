//! # sobject-browser
//!
//! Browse the SObjects of a Salesforce org from the terminal.
//!
//! The org is the SF CLI default Dev Hub (or default org). Its username is
//! looked up once, exchanged for a session through `sf org display`, and
//! then used to query `EntityDefinition` and `FieldDefinition` from the
//! Tooling API. Every step is memoized in a [`KeyValueCache`], so a warm
//! cache answers without touching the CLI or the network.
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - CLI error output is sanitized before it reaches an error message
//! - Cache files are readable by the owner only on Unix
//!
//! ## Crates
//!
//! - **sobject-browser-client** - HTTP client with retry and Salesforce error mapping
//! - **sobject-browser-auth** - SF CLI config lookup and session exchange
//! - **sobject-browser-tooling** - EntityDefinition/FieldDefinition queries and setup links
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use sobject_browser::{BrowserConfig, CredentialResolver, QueryRunner, SessionProvider};
//! use sobject_browser::auth::{SfCliExchange, SfdxConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BrowserConfig::from_env()?;
//!     let cache = config.open_cache()?;
//!
//!     let resolver = CredentialResolver::new(Arc::new(SfdxConfig::load(config.target)), cache.clone());
//!     let sessions = SessionProvider::new(resolver, SfCliExchange::new(), cache.clone());
//!     let runner = QueryRunner::new(sessions, cache).with_limit(config.limit);
//!
//!     for entity in runner.list_entities().await? {
//!         println!("{} {}", entity.qualified_api_name, entity.key_prefix.unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
mod config;
mod error;
pub mod memo;
mod resolver;
mod runner;
mod session;
pub mod view;

pub use cache::{FileCache, KeyValueCache, MemoryCache, NamespacedCache};
pub use config::{BrowserConfig, BrowserConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use memo::{MemoCell, MemoState};
pub use resolver::CredentialResolver;
pub use runner::QueryRunner;
pub use session::{Session, SessionProvider, SessionRecord};

pub use sobject_browser_auth as auth;
pub use sobject_browser_client as client;
pub use sobject_browser_tooling as tooling;
