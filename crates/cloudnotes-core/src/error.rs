//! Error types for cloudnotes-core

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias using cloudnotes-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cloudnotes-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Backend capability is unavailable because startup configuration failed
    #[error("Backend is not configured")]
    NotConfigured,

    /// Client or plugin setup failure
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Auth provider error
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data API reported an error payload
    #[error("Data API error: {0}")]
    Api(String),

    /// Media/object storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The auth event stream ended
    #[error("Auth event stream terminated")]
    StreamTerminated,
}
