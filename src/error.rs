//! Error types and handling for zevermon
//!
//! The crate-wide [`ZeverError`] covers configuration, I/O and startup
//! failures. Device-level failures have their own narrower types
//! ([`crate::protocol::ParseError`], [`crate::fetcher::TransportError`]) which
//! the status cache absorbs; they only become a `ZeverError` when a caller
//! outside the poll cycle (for example the probe command) wants to propagate
//! them.

use crate::fetcher::TransportError;
use crate::protocol::ParseError;
use thiserror::Error;

/// Result type alias for zevermon operations
pub type Result<T> = std::result::Result<T, ZeverError>;

/// Main error type for zevermon
#[derive(Debug, Error)]
pub enum ZeverError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Network-related errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Malformed device payloads
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// HTTP status API errors
    #[error("Web server error: {message}")]
    Web { message: String },
}

impl ZeverError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        ZeverError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        ZeverError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        ZeverError::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        ZeverError::Network {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        ZeverError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new protocol error
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        ZeverError::Protocol {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        ZeverError::Web {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ZeverError {
    fn from(err: std::io::Error) -> Self {
        ZeverError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for ZeverError {
    fn from(err: serde_yaml::Error) -> Self {
        ZeverError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ZeverError {
    fn from(err: serde_json::Error) -> Self {
        ZeverError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ZeverError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ZeverError::timeout(err.to_string())
        } else {
            ZeverError::network(err.to_string())
        }
    }
}

impl From<TransportError> for ZeverError {
    fn from(err: TransportError) -> Self {
        ZeverError::network(err.to_string())
    }
}

impl From<ParseError> for ZeverError {
    fn from(err: ParseError) -> Self {
        ZeverError::protocol(err.to_string())
    }
}
