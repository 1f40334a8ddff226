//! Custom error types for the common library
//!
//! This module defines the error types shared by the storage and
//! configuration layers.

use thiserror::Error;

/// Custom error type for durable storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a valid key-value document
    #[error("Storage file is corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),

    /// Serializing the key-value document failed
    #[error("Storage serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Custom error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The layered configuration could not be built or deserialized
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was present but unusable
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid {
        /// Configuration key
        key: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
