//! Error handling for the engine
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for the engine
pub type Result<T> = std::result::Result<T, SweepError>;

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum SweepError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (bad batch/chunk sizes, malformed identifiers)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
