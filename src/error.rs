//! Error types for the browser.

use sobject_browser_auth::ErrorKind as AuthErrorKind;
use sobject_browser_tooling::ErrorKind as ToolingErrorKind;

/// Result type alias for browser operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for browser operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Nothing names the default org.
    #[error("No default org configured. Run `sf config set {key}=<alias or username> --global`")]
    NoDefaultTarget { key: String },

    /// SF CLI config or browser config is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The username could not be exchanged for a session.
    #[error("Could not open a session: {0}")]
    Exchange(String),

    /// The org rejected the session.
    #[error("Session rejected by the org: {0}. Run `sobject-browser cache clear` and log in again with `sf org login web`")]
    Auth(String),

    /// The Tooling API query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Cache read or write failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// An SObject name that is not a valid API name.
    #[error("'{0}' is not a valid SObject API name")]
    InvalidEntityName(String),

    /// No entity with this name in the listed entities.
    #[error("No layoutable SObject named '{0}'")]
    UnknownEntity(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

// The conversions below copy the inner error's text into the kind, so the
// inner error is not kept as `source` as well.

impl From<sobject_browser_auth::Error> for Error {
    fn from(err: sobject_browser_auth::Error) -> Self {
        let kind = match &err.kind {
            AuthErrorKind::NoDefaultTarget { key } => ErrorKind::NoDefaultTarget { key: key.clone() },
            AuthErrorKind::Config(_) | AuthErrorKind::Io(_) => ErrorKind::Config(err.to_string()),
            AuthErrorKind::SfCli(_)
            | AuthErrorKind::InvalidCredentials(_)
            | AuthErrorKind::EnvVar(_)
            | AuthErrorKind::Json(_) => ErrorKind::Exchange(err.to_string()),
        };
        Error::new(kind)
    }
}

impl From<sobject_browser_tooling::Error> for Error {
    fn from(err: sobject_browser_tooling::Error) -> Self {
        let kind = match &err.kind {
            ToolingErrorKind::Authentication(msg) => ErrorKind::Auth(msg.clone()),
            ToolingErrorKind::InvalidName(name) => ErrorKind::InvalidEntityName(name.clone()),
            _ => ErrorKind::Query(err.to_string()),
        };
        Error::new(kind)
    }
}

impl From<sobject_browser_client::Error> for Error {
    fn from(err: sobject_browser_client::Error) -> Self {
        let kind = if err.is_auth_error() {
            ErrorKind::Auth(err.to_string())
        } else {
            ErrorKind::Query(err.to_string())
        };
        Error::new(kind)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorKind::Cache(err.to_string()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::new(ErrorKind::Cache(err.to_string()))
    }
}
