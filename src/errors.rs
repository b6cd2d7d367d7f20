//! CIB client error hierarchy
//!
//! Failures are grouped by where they come from: the daemon side (translated
//! status codes), the document codec, and client configuration.

use ::config::ConfigError;

use crate::status::StatusCode;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Translated failure reported by a CIB, membership or address session
    #[error(transparent)]
    Cib(#[from] CibError),

    /// Malformed document payload
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Client configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Taxonomy tag of a translated daemon failure
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Cib(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Whether the session that produced this error should be re-established
    pub fn is_connection(&self) -> bool {
        matches!(self.kind(), Some(ErrorKind::Connection))
    }
}

impl From<StatusCode> for Error {
    fn from(status: StatusCode) -> Self {
        Error::Cib(status.into())
    }
}

/// Tag of a [`CibError`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Connection,
    NotSupported,
    Generic,
}

/// Typed failure of a CIB operation.
///
/// Only produced by translating a [`StatusCode`], see
/// [`CibError::from_status`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CibError {
    /// The addressed object, section or node does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// An object with the same identity is already present
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    /// The session is severed, refused or otherwise unusable.
    /// Callers should `connect()` again before retrying.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The session type or mode does not support the operation
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Any other status, with the raw code kept for diagnostics
    #[error("CIB error {code}: {message}")]
    Generic { code: i32, message: String },
}

impl CibError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CibError::NotFound(_) => ErrorKind::NotFound,
            CibError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            CibError::Connection(_) => ErrorKind::Connection,
            CibError::NotSupported(_) => ErrorKind::NotSupported,
            CibError::Generic { .. } => ErrorKind::Generic,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CibError::NotFound(msg)
            | CibError::AlreadyExists(msg)
            | CibError::Connection(msg)
            | CibError::NotSupported(msg) => msg,
            CibError::Generic { message, .. } => message,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document contains no root element")]
    Empty,

    #[error("Document contains more than one root element")]
    MultipleRoots,

    /// Input ended while `<tag>` was still open
    #[error("Unexpected end of document inside <{tag}>")]
    UnexpectedEnd { tag: String },

    #[error("Mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedEnd { expected: String, found: String },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid UTF-8 in {what}: {source}")]
    InvalidUtf8 {
        what: &'static str,
        source: std::str::Utf8Error,
    },

    #[error("Invalid attribute: {0}")]
    Attribute(String),

    /// JSON is well-formed but does not describe an element tree
    #[error("Invalid JSON document: {0}")]
    InvalidJson(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
