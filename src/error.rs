//! Error types for the search library.

use thiserror::Error;

use crate::ProviderKind;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Provider was invoked without its required credential or enable flag.
    #[error("Provider '{provider}' is not configured (set {variable})")]
    MissingCredential {
        /// Provider that was invoked.
        provider: ProviderKind,
        /// Environment variable that would configure it.
        variable: &'static str,
    },

    /// Backend signalled throttling (HTTP 429/503 or a block page).
    #[error("Rate limited: {message}")]
    RateLimited {
        /// HTTP status code, when the throttle came from a status line.
        status: Option<u16>,
        /// Backend message.
        message: String,
    },

    /// Retries were consumed without a successful response.
    #[error("Retries exhausted after {attempts} attempts: {message}")]
    RetryExhausted {
        /// Total attempts made, including the initial one.
        attempts: u32,
        /// Last backend message observed.
        message: String,
    },

    /// Backend returned a non-retryable error response.
    #[error("Backend error: {message}")]
    Backend {
        /// HTTP status code, if the response carried one.
        status: Option<u16>,
        /// Backend message.
        message: String,
    },

    /// Per-request deadline exceeded.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl SearchError {
    /// Classifies an HTTP error status: 429/503 become [`SearchError::RateLimited`],
    /// everything else [`SearchError::Backend`].
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 | 503 => Self::RateLimited {
                status: Some(status),
                message,
            },
            _ => Self::Backend {
                status: Some(status),
                message,
            },
        }
    }

    /// Maps a transport error, distinguishing deadline expiry from other failures.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else {
            Self::Http(err)
        }
    }

    /// Whether this error is a rate-limit condition (directly, or after
    /// retries were exhausted on one). Only these trigger provider failover.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::RetryExhausted { .. })
    }

    /// HTTP status code attached to the error, when present.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { status, .. } | Self::Backend { status, .. } => *status,
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
