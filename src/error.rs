//! Easel error types

use thiserror::Error;

/// Easel error type
#[derive(Error, Debug)]
pub enum Error {
    /// Session is not authenticated
    #[error("Authentication required")]
    Unauthenticated,

    /// Missing or mismatched CSRF token
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Fixed-window rate limit exhausted for a key
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Request method is not accepted by the endpoint
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Bad input shape or content
    #[error("{0}")]
    Validation(String),

    /// Unknown record key
    #[error("{0}")]
    NotFound(String),

    /// Document on disk is not a mapping of records
    #[error("Corrupt store: {0}")]
    CorruptStore(String),

    /// Password hashing failure
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for Easel operations
pub type Result<T> = std::result::Result<T, Error>;
