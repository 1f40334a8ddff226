//! Response envelopes used by the backend

use serde::Deserialize;

use crate::error::{ClientError, ClientResult};
use crate::models::{Category, Event};

/// Standard `{ success, data, message }` wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload
    ///
    /// An explicit `success: false` becomes an API error carrying the
    /// backend message (or `fallback`). A missing or null `data` becomes
    /// `missing`, so callers can decide between "not found" and a shape
    /// error.
    pub fn into_data(
        self,
        fallback: &str,
        missing: impl FnOnce() -> ClientError,
    ) -> ClientResult<T> {
        if self.success == Some(false) {
            return Err(ClientError::Api {
                status: 200,
                message: self.message.unwrap_or_else(|| fallback.to_string()),
            });
        }

        self.data.ok_or_else(missing)
    }

    /// Like `into_data`, but a missing payload is `None` rather than an error
    pub fn into_optional(self, fallback: &str) -> ClientResult<Option<T>> {
        if self.success == Some(false) {
            return Err(ClientError::Api {
                status: 200,
                message: self.message.unwrap_or_else(|| fallback.to_string()),
            });
        }

        Ok(self.data)
    }

    /// Whether the backend reported success; an absent flag counts as success
    pub fn succeeded(&self) -> bool {
        self.success.unwrap_or(true)
    }
}

/// Paginated list, as returned under `data` by list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: Option<u32>,
    pub last_page: Option<u32>,
    pub total: Option<u64>,
}

/// `GET /event/recents` body
#[derive(Debug, Clone, Deserialize)]
pub struct RecentEvents {
    #[serde(rename = "recentEvents", default)]
    pub recent_events: Vec<Event>,
}

/// `GET /categories` body
#[derive(Debug, Clone, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Error body shape used for non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message in the body, if any
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|message| !message.trim().is_empty())
    }
}
