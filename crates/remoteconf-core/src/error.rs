//! Error types for the remote configuration system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for remote configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the remote configuration system
#[derive(Error, Debug)]
pub enum Error {
    /// Options failed their self-check; no manager was constructed
    #[error("invalid options: {0}")]
    Validation(String),

    /// A factory could not build a manager; nothing was registered
    #[error("failed to create manager: {0}")]
    Construction(String),

    /// Lookup for a provider id that was never registered
    #[error("provider {0} not registered")]
    NotRegistered(String),

    /// A remote content fetch failed (network, permission)
    #[error("fetch failed ({provider}): {message}")]
    Fetch {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The remote object does not exist
    #[error("remote content not found ({provider}): {message}")]
    NotFound {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The remote store rejected the supplied credentials
    #[error("authentication failed ({provider}): {message}")]
    Authentication {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// A typed convenience wrapper received options of the wrong concrete type
    #[error("invalid options type for {provider} provider (expected {expected})")]
    TypeMismatch {
        /// Provider name
        provider: String,
        /// Name of the expected options type
        expected: &'static str,
    },

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors (keyring files, local transports)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a construction error
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    /// Create a "not registered" error
    pub fn not_registered(id: impl Into<String>) -> Self {
        Self::NotRegistered(id.into())
    }

    /// Create a fetch error
    pub fn fetch(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(provider: impl Into<String>, expected: &'static str) -> Self {
        Self::TypeMismatch {
            provider: provider.into(),
            expected,
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
