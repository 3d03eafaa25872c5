//! Error types for config lookup and session exchange.
//!
//! Error messages are designed to avoid exposing sensitive credential data.

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for auth operations.
///
/// Error messages are sanitized to prevent accidental credential exposure.
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
///
/// Error messages avoid including credential values.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// No default org is configured for the requested key.
    #[error("No default org configured for '{key}'. Run `sf config set {key}=<alias or username> --global`")]
    NoDefaultTarget { key: String },

    /// A config or alias file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credentials came back incomplete.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The `sf` CLI failed or returned something unexpected.
    #[error("SF CLI error: {0}")]
    SfCli(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}
