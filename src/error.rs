//! Error types for Weblate API operations.

use std::fmt;

use thiserror::Error;

/// A single server-side validation message.
///
/// `field` is `None` for messages that are not bound to a particular field
/// (for example `non_field_errors` or a top-level `detail`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMessage {
    pub field: Option<String>,
    pub message: String,
}

impl fmt::Display for FieldMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Errors that can occur during Weblate API operations.
#[derive(Debug, Error)]
pub enum WeblateError {
    /// No response was received (connection, DNS, TLS or timeout failure).
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server rejected the credentials (HTTP 401/403).
    #[error("Access denied (HTTP {status}), API key is wrong, missing or lacks permission")]
    Auth { status: u16, url: String },

    /// Object not found (HTTP 404).
    #[error("Object not found on the server (maybe operation is not supported on the server): {url}")]
    NotFound { url: String },

    /// Throttling or server failure that survived all retries.
    #[error("Service unavailable (HTTP {status}) after {attempts} attempt(s)")]
    ServiceUnavailable { status: u16, attempts: u32 },

    /// The server refused the payload and explained why.
    #[error("Validation failed (HTTP {status}): {}", join_messages(.messages))]
    Validation {
        status: u16,
        messages: Vec<FieldMessage>,
    },

    /// Any other non-success status.
    #[error("HTTP error {status}: {reason}")]
    Request { status: u16, reason: String },

    /// Successful status with a body that could not be decoded.
    #[error("Server returned invalid response: {0}")]
    Protocol(String),

    /// An upload reply without import counts, carrying the server's detail.
    #[error("Server did not accept the upload: {0}")]
    UploadRejected(String),

    /// A slug or path segment would escape the target directory.
    #[error("Unsafe path segment {segment:?}: {reason}")]
    PathValidation { segment: String, reason: &'static str },

    /// A field that is not part of the resource.
    #[error("{kind} has no attribute '{name}'")]
    AttributeNotFound { kind: &'static str, name: String },

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local file system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Command-level failure reported by the dispatcher.
    #[error("{0}")]
    Command(String),
}

/// The closed set of error kinds produced by the classifier and sanitizer,
/// plus the ambient kinds raised outside the HTTP path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Auth,
    NotFound,
    ServiceUnavailable,
    Validation,
    Request,
    Protocol,
    PathValidation,
    AttributeNotFound,
    Config,
    Io,
    Command,
}

impl WeblateError {
    /// The discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Request { .. } => ErrorKind::Request,
            Self::Protocol(_) | Self::UploadRejected(_) => ErrorKind::Protocol,
            Self::PathValidation { .. } => ErrorKind::PathValidation,
            Self::AttributeNotFound { .. } => ErrorKind::AttributeNotFound,
            Self::Config(_) | Self::Url(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Command(_) => ErrorKind::Command,
        }
    }

    /// Process exit code for the command-line tool.
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Transport => 10,
            _ => 1,
        }
    }

    pub(crate) fn command(message: impl Into<String>) -> Self {
        Self::Command(message.into())
    }
}

impl From<serde_json::Error> for WeblateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<csv::Error> for WeblateError {
    fn from(err: csv::Error) -> Self {
        Self::Io(err.into())
    }
}

fn join_messages(messages: &[FieldMessage]) -> String {
    messages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for Weblate operations.
pub type Result<T> = core::result::Result<T, WeblateError>;
