//! Error type shared by every Djelia operation
//!
//! All failures are reported as a single [`DjeliaError`] carrying an
//! [`ErrorKind`]. Callers branch on the kind rather than on the error type.

use std::fmt;

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, DjeliaError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Category of a [`DjeliaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, malformed or rejected API key
    Authentication,
    /// Request failed local or remote validation
    Validation,
    /// Unsupported language code
    Language,
    /// Unknown speaker id or speaker description
    Speaker,
    /// The API answered with a non-success status
    Api { status: u16 },
    /// Transport failures, I/O and everything else
    Generic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Authentication => write!(f, "authentication"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Language => write!(f, "language"),
            ErrorKind::Speaker => write!(f, "speaker"),
            ErrorKind::Api { status } => write!(f, "api ({})", status),
            ErrorKind::Generic => write!(f, "generic"),
        }
    }
}

/// Error returned by the Djelia client
#[derive(Debug, Error)]
#[error("{}", render(.kind, .message))]
pub struct DjeliaError {
    kind: ErrorKind,
    message: String,
    retryable: bool,
    #[source]
    source: Option<BoxError>,
}

fn render(kind: &ErrorKind, message: &str) -> String {
    match kind {
        ErrorKind::Api { status } => format!("API Error ({}): {}", status, message),
        _ => message.to_string(),
    }
}

/// Error body returned by the API (`{"detail": "..."}`)
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl DjeliaError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: false,
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn language(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Language, message)
    }

    pub fn speaker(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Speaker, message)
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self {
            retryable: status >= 500,
            ..Self::new(ErrorKind::Api { status }, message)
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generic, message)
    }

    /// No response headers within `after`; retryable like any transport timeout
    pub fn timed_out(after: std::time::Duration) -> Self {
        Self {
            retryable: true,
            ..Self::generic(format!("Request failed: timed out after {:?}", after))
        }
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Map a non-success HTTP status (and its body, if any) to an error
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| match b.detail {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });

        match status {
            401 => Self::authentication("Invalid or expired API key"),
            403 => Self::api(
                403,
                "Forbidden: You do not have permission to access this resource",
            ),
            404 => Self::api(404, "Resource not found"),
            422 => match detail {
                Some(detail) => Self::validation(format!("Validation error: {}", detail)),
                None => Self::validation("Validation error"),
            },
            _ => Self::api(
                status,
                detail.unwrap_or_else(|| format!("API error {}", status)),
            ),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Message without the `API Error (...)` prefix
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status for [`ErrorKind::Api`] errors
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ErrorKind::Api { status } => Some(status),
            _ => None,
        }
    }

    /// Whether the dispatcher may retry the request that produced this error
    ///
    /// True for connection resets, timeouts and 5xx responses.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl From<reqwest::Error> for DjeliaError {
    fn from(err: reqwest::Error) -> Self {
        let retryable = err.is_connect() || err.is_timeout() || err.is_request();
        let mut error = Self::generic(format!("Request failed: {}", err));
        error.retryable = retryable && err.status().is_none();
        error.with_source(err)
    }
}

impl From<serde_json::Error> for DjeliaError {
    fn from(err: serde_json::Error) -> Self {
        Self::generic(format!("Failed to parse API response: {}", err)).with_source(err)
    }
}
