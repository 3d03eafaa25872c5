//! Error types for sobject-browser-tooling.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Returns true if the session behind the query was rejected.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Client error: {0}")]
    Client(String),

    #[error("Session rejected: {0}")]
    Authentication(String),

    #[error("Invalid API name: '{0}'")]
    InvalidName(String),

    #[error("No fields selected for query")]
    NoFields,

    #[error("{0}")]
    Other(String),
}

impl From<sobject_browser_client::Error> for Error {
    fn from(err: sobject_browser_client::Error) -> Self {
        let kind = if err.is_auth_error() {
            ErrorKind::Authentication(err.to_string())
        } else {
            ErrorKind::Client(err.to_string())
        };
        Error {
            kind,
            source: Some(Box::new(err)),
        }
    }
}
