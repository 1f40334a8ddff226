//! Custom error types for the client

use common::error::StorageError;
use thiserror::Error;

/// Generic message shown when nothing more specific is known
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again";

/// Custom error type for the client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Form input rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// The request never produced an HTTP response
    #[error("{context}: {source}")]
    Network {
        /// Fallback message for the operation that failed
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend rejected the credential (HTTP 401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Non-2xx response, or a 2xx envelope flagged as unsuccessful
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Backend message, or the operation's fallback
        message: String,
    },

    /// The backend answered but the requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// The response body did not have the expected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// Durable session storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The session was cleared while the operation was in flight
    #[error("Session ended before the operation completed")]
    SessionEnded,

    /// The operation needs a signed-in user
    #[error("Not signed in")]
    NotSignedIn,

    /// The session store has been disposed
    #[error("Session store has been disposed")]
    Disposed,
}

impl ClientError {
    /// Short message suitable for a notification banner
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) | ClientError::NotFound(msg) => msg.clone(),
            ClientError::Network { context, .. } => context.to_string(),
            ClientError::Unauthorized => {
                "Your session has expired, please sign in again".to_string()
            }
            ClientError::Api { message, .. } => message.clone(),
            ClientError::NotSignedIn | ClientError::SessionEnded => {
                "Please sign in to continue".to_string()
            }
            ClientError::Decode(_) | ClientError::Storage(_) | ClientError::Disposed => {
                GENERIC_FAILURE.to_string()
            }
        }
    }

    /// Whether this error came from the global 401 handling
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

/// Type alias for client results
pub type ClientResult<T> = Result<T, ClientError>;
