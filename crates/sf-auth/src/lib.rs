//! # sobject-browser-auth
//!
//! Turns the local Salesforce CLI state into an authenticated session.
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Tracing/logging skips credential parameters
//! - CLI stderr is passed through the transport's sanitizer before it
//!   ends up in an error message
//!
//! ## Two steps
//!
//! 1. [`SfdxConfig`] reads `target-dev-hub` (or `target-org`) from the
//!    environment, the project `.sf/config.json` or the global
//!    `~/.sf/config.json`, and resolves aliases from `~/.sfdx/alias.json`.
//! 2. A [`SessionExchange`] turns that username into
//!    [`SalesforceCredentials`]. [`SfCliExchange`] asks `sf org display`;
//!    [`EnvExchange`] reads `SF_INSTANCE_URL` / `SF_ACCESS_TOKEN`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sobject_browser_auth::{DefaultTargetSource, SessionExchange, SfCliExchange, SfdxConfig, TargetKey};
//!
//! let config = SfdxConfig::load(TargetKey::DevHub);
//! let username = config.default_target()?;
//! let creds = SfCliExchange::new().exchange(&username).await?;
//! ```

mod credentials;
mod error;
mod exchange;
mod sfdx_config;

pub use credentials::{Credentials, SalesforceCredentials};
pub use error::{Error, ErrorKind, Result};
pub use exchange::{EnvExchange, SessionExchange, SfCliExchange};
pub use sfdx_config::{
    ConfigInfo, ConfigLocation, DefaultTargetSource, SfdxConfig, TargetKey,
};
