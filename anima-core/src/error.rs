//! Error taxonomy for the Anima client.
//!
//! Every failure that crosses the public boundary is an [`AnimaError`].
//! HTTP-backed variants are bound to a fixed status code; [`AnimaError::Api`]
//! is the catch-all for unmapped statuses and transport-level problems.

use thiserror::Error;

/// Top-level error type for all Anima client operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimaError {
    /// Credential missing or rejected by the server (401).
    #[error("{message}")]
    Authentication {
        /// Server detail or default message.
        message: String,
    },

    /// The requested resource does not exist (404).
    #[error("{message}")]
    NotFound {
        /// Server detail or default message.
        message: String,
    },

    /// Input rejected, either by the server (422) or by client-side
    /// normalization such as event-type resolution.
    #[error("{message}")]
    Validation {
        /// Server detail or default message.
        message: String,
    },

    /// Too many requests (429).
    #[error("{message}")]
    RateLimit {
        /// Server detail or default message.
        message: String,
    },

    /// The server failed to handle the request (any 5xx).
    #[error("{message}")]
    Server {
        /// Server detail or default message.
        message: String,
        /// The actual 5xx status returned.
        status: u16,
    },

    /// Any other non-2xx status, or a transport-level failure
    /// (timeout, network error, undecodable body).
    #[error("{message}")]
    Api {
        /// Human-readable description.
        message: String,
        /// Status code when the failure came from an HTTP response.
        status: Option<u16>,
    },

    /// Caller-usage error, raised before any network call is made.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnimaError {
    /// Authentication failure, with the default message when `message` is `None`.
    #[must_use]
    pub fn authentication(message: Option<String>) -> Self {
        Self::Authentication {
            message: message.unwrap_or_else(|| "Authentication failed".to_string()),
        }
    }

    /// Not-found failure, with the default message when `message` is `None`.
    #[must_use]
    pub fn not_found(message: Option<String>) -> Self {
        Self::NotFound {
            message: message.unwrap_or_else(|| "Resource not found".to_string()),
        }
    }

    /// Validation failure, with the default message when `message` is `None`.
    #[must_use]
    pub fn validation(message: Option<String>) -> Self {
        Self::Validation {
            message: message.unwrap_or_else(|| "Validation error".to_string()),
        }
    }

    /// Rate-limit failure, with the default message when `message` is `None`.
    #[must_use]
    pub fn rate_limit(message: Option<String>) -> Self {
        Self::RateLimit {
            message: message.unwrap_or_else(|| "Rate limit exceeded".to_string()),
        }
    }

    /// Server failure for a 5xx status.
    #[must_use]
    pub fn server(status: u16, message: Option<String>) -> Self {
        Self::Server {
            message: message.unwrap_or_else(|| "Internal server error".to_string()),
            status,
        }
    }

    /// Catch-all failure.
    #[must_use]
    pub fn api(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Api {
            message: message.into(),
            status,
        }
    }

    /// Map a non-2xx HTTP status onto the taxonomy.
    ///
    /// 401, 404, 422 and 429 map to their dedicated kinds, every 5xx maps to
    /// [`AnimaError::Server`] carrying the real status, and anything else
    /// becomes [`AnimaError::Api`] with that status attached.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::authentication(Some(message)),
            404 => Self::not_found(Some(message)),
            422 => Self::validation(Some(message)),
            429 => Self::rate_limit(Some(message)),
            500..=599 => Self::server(status, Some(message)),
            _ => Self::api(message, Some(status)),
        }
    }

    /// The HTTP status bound to this failure, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Validation { .. } => Some(422),
            Self::RateLimit { .. } => Some(429),
            Self::Server { status, .. } => Some(*status),
            Self::Api { status, .. } => *status,
            Self::Config(_) => None,
        }
    }

    /// Whether a caller could reasonably retry this failure later.
    ///
    /// Informational only: the client itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit { .. } | Self::Server { .. })
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, AnimaError>;
