//! Error types for management API operations.
//!
//! Errors are categorized so callers can decide on retries and user
//! feedback. This crate never retries on its own.

use std::fmt;

/// Result type alias for management API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport failures and server-side errors (transient, retryable).
    Network,
    /// The object does not exist remotely.
    NotFound,
    /// The request was rejected, e.g. invalid key or payload.
    Rejected,
    /// The response could not be decoded.
    Format,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network or server issue",
            Self::NotFound => "Object not found",
            Self::Rejected => "Request rejected by the API",
            Self::Format => "Unexpected response format",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your connection and the API base URL, then try again",
            Self::NotFound => "The object may have been deleted outside of this tool",
            Self::Rejected => "Check the API key and the declared attribute values",
            Self::Format => "The API may have changed; check the response body",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the management API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// The API answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The API reported that the object does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Description of the missing object, e.g. "site 12".
        resource: String,
    },

    /// The response body could not be decoded.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create a not-found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Transport { .. } => ErrorCategory::Network,
            Error::Status { status, .. } if *status >= 500 || *status == 429 => {
                ErrorCategory::Network
            }
            Error::Status { .. } => ErrorCategory::Rejected,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::InvalidResponse(_) => ErrorCategory::Format,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Whether the API reported the object as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Status {
                status: code,
                body: String::new(),
            },
            other => Self::Transport {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::NotFound.is_retryable());
        assert!(!ErrorCategory::Rejected.is_retryable());
        assert!(!ErrorCategory::Format.is_retryable());
    }

    #[test]
    fn test_error_category_text() {
        assert!(!ErrorCategory::Network.advice().is_empty());
        assert!(format!("{}", ErrorCategory::NotFound).contains("not found"));
    }

    #[test]
    fn test_status_category() {
        let server = Error::Status {
            status: 503,
            body: String::new(),
        };
        assert_eq!(server.category(), ErrorCategory::Network);
        assert!(server.is_retryable());

        let client = Error::Status {
            status: 400,
            body: "bad width".into(),
        };
        assert_eq!(client.category(), ErrorCategory::Rejected);
        assert!(client.to_string().contains("bad width"));
    }

    #[test]
    fn test_not_found() {
        let err = Error::not_found("site 12");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "site 12 not found");
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_from_ureq_status() {
        let err: Error = ureq::Error::StatusCode(502).into();
        assert!(matches!(err, Error::Status { status: 502, .. }));
    }

    #[test]
    fn test_from_serde_error() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: Error = parse.into();
        assert_eq!(err.category(), ErrorCategory::Format);
    }
}
