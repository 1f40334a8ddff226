//! Client configuration
//!
//! Values come from built-in defaults overlaid by `BTICKET_*` environment
//! variables.

use config::{Config, Environment};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_APP_URL: &str = "http://localhost:8000";
const DEFAULT_STORAGE_PATH: &str = ".bticket/storage.json";

/// Configuration for the B-Ticket client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST API (e.g., "https://bticket.example/api")
    pub api_url: String,
    /// Public application URL, used to build media URLs
    pub app_url: String,
    /// Path of the durable session storage document
    pub storage_path: PathBuf,
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BTICKET_API_URL`: REST API base URL (default: "http://localhost:8000/api")
    /// - `BTICKET_APP_URL`: public application URL (default: "http://localhost:8000")
    /// - `BTICKET_STORAGE_PATH`: session storage file (default: ".bticket/storage.json")
    pub fn from_env() -> ConfigResult<Self> {
        let settings = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("app_url", DEFAULT_APP_URL)?
            .set_default("storage_path", DEFAULT_STORAGE_PATH)?
            .add_source(Environment::with_prefix("BTICKET"))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.normalized()
    }

    /// Create a configuration pointing at an explicit API, keeping the
    /// other defaults
    pub fn with_api_url(api_url: impl Into<String>) -> ConfigResult<Self> {
        Self {
            api_url: api_url.into(),
            app_url: DEFAULT_APP_URL.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
        }
        .normalized()
    }

    fn normalized(mut self) -> ConfigResult<Self> {
        self.api_url = normalize_url("api_url", &self.api_url)?;
        self.app_url = normalize_url("app_url", &self.app_url)?;
        Ok(self)
    }
}

fn normalize_url(key: &'static str, value: &str) -> ConfigResult<String> {
    let trimmed = value.trim().trim_end_matches('/');

    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("expected an http(s) URL, got {:?}", value),
        });
    }

    Ok(trimmed.to_string())
}
