//! Request error handling
//!
//! Every failure a call through the request layer can produce. Transient
//! faults (no response, timeout, gateway) are retried before they surface
//! here; everything else is reported on first occurrence.

use peak_partner_shared::DomainError;
use thiserror::Error;

/// Failure of a call to the REST collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Backend unavailable (HTTP {status})")]
    Gateway { status: u16 },

    #[error("Authentication required")]
    Auth,

    #[error("Request failed (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RequestError {
    /// Classify an HTTP status that is not a success.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => RequestError::Auth,
            502..=504 => RequestError::Gateway { status },
            400..=499 => RequestError::Client { status, message },
            _ => RequestError::Server { status, message },
        }
    }

    /// Only faults that indicate a cold or unreachable backend are retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RequestError::Network(_) | RequestError::Timeout(_) | RequestError::Gateway { .. }
        )
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, RequestError::Auth)
    }

    /// HTTP status, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Auth => Some(401),
            RequestError::Gateway { status }
            | RequestError::Client { status, .. }
            | RequestError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<peak_partner_shared::ValidationError> for RequestError {
    fn from(err: peak_partner_shared::ValidationError) -> Self {
        RequestError::Domain(err.into())
    }
}

impl From<validator::ValidationErrors> for RequestError {
    fn from(errors: validator::ValidationErrors) -> Self {
        peak_partner_shared::ValidationError::from(errors).into()
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Decode(err.to_string())
    }
}

/// Result type alias for request-layer calls
pub type RequestResult<T> = Result<T, RequestError>;
