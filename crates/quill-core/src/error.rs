//! Unified error types for the Quill cache layer.

use std::fmt::{self, Debug};
use thiserror::Error;

/// Unified error type for Quill.
///
/// The cache provisioning code raises nothing of its own; these variants
/// carry failures from configuration, the Redis connection pool and the
/// encoders up to the caller.
#[derive(Error, Debug)]
pub enum QuillError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Redis could not be reached, or no connection was available
    #[error("Cache error: {0}")]
    Cache(String),

    /// Redis answered but rejected the command (wrong type, bad argument)
    #[error("Cache command error: {0}")]
    CacheCommand(String),

    /// Encoding or decoding of a cached key or value failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuillError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::CacheCommand(_) => "CACHE_COMMAND_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a cache error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Wraps a Redis error with the failed operation as context.
    ///
    /// Refused, dropped and timed-out connections become `Cache`; anything
    /// the server answered becomes `CacheCommand`.
    #[must_use]
    pub fn redis(context: impl fmt::Display, err: redis::RedisError) -> Self {
        if is_connectivity_failure(&err) {
            Self::Cache(format!("{}: connection failed: {}", context, err))
        } else {
            Self::CacheCommand(format!("{}: {}", context, err))
        }
    }

    /// Checks if this error is retriable.
    ///
    /// Only cache connectivity failures are; a rejected command or a value
    /// that failed to encode will fail the same way next time.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Cache(_))
    }
}

impl From<serde_json::Error> for QuillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(format!("JSON error: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for QuillError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::Serialization(format!("invalid UTF-8: {}", err))
    }
}

impl From<redis::RedisError> for QuillError {
    fn from(err: redis::RedisError) -> Self {
        if is_connectivity_failure(&err) {
            Self::Cache(format!("connection failed: {}", err))
        } else {
            Self::CacheCommand(err.to_string())
        }
    }
}

fn is_connectivity_failure(err: &redis::RedisError) -> bool {
    err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped()
}
