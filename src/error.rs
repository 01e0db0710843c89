//! Error types for remote calls
//!
//! Errors are classified by what the UI should do with them:
//! - Network: backend unreachable, fall back to local data
//! - Auth: token rejected, force logout and clear session state
//! - Validation: bad input, show inline message, nothing was sent
//! - NotFound: referenced entity absent, render an empty state

use thiserror::Error;

/// Error type for all remote API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns true if the backend could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Returns true if the bearer token was rejected. Callers must treat
    /// this as a forced logout.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    /// Returns true if the request never left the client.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }

    /// Get a user-friendly message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Cannot connect to server. Check your connection or continue as a guest.".to_string()
            }
            ApiError::Auth(_) => "Your session has expired. Please sign in again.".to_string(),
            ApiError::Validation(msg) => msg.clone(),
            ApiError::NotFound(_) => "The requested item could not be found.".to_string(),
            ApiError::Server { .. } => "Something went wrong on the server. Try again.".to_string(),
            ApiError::Decode(_) => "The server returned an unexpected response.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
