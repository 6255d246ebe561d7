//! Error types with credential sanitization.
//!
//! Every failure an operation can produce collapses into one of two caller-facing
//! kinds: a validation failure (the request was incomplete, no I/O happened) or a
//! connection failure (the server could not be reached, listed, or read). Connection
//! strings are never part of an error message.

use thiserror::Error;

/// Main error type for export engine operations.
///
/// # Security
/// Error messages carry the driver diagnostic but never the connection string
/// that produced it.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Required input missing or empty; detected before any connection attempt
    #[error("{message}")]
    Validation {
        /// What was missing
        message: String,
    },

    /// Connection, listing, or retrieval failed (credentials sanitized)
    #[error("{context}: {source}")]
    Connection {
        /// Operation that failed
        context: String,
        /// Underlying driver error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid engine configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Offending setting
        message: String,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        /// File operation that failed
        context: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        /// Value that failed to serialize
        context: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with ExportError
pub type Result<T> = std::result::Result<T, ExportError>;

impl ExportError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a connection error with context
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns true if the error was raised before any I/O was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Short human-readable message for the operator.
    ///
    /// Connection failures surface the underlying driver diagnostic; the
    /// operation context is used only when the driver gave no text.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Connection { context, source } => {
                let text = source.to_string();
                if text.trim().is_empty() {
                    context.clone()
                } else {
                    text
                }
            }
            other => other.to_string(),
        }
    }

    /// Re-labels a connection failure with an operation context.
    ///
    /// Other variants pass through unchanged.
    pub(crate) fn with_context(self, context: &str) -> Self {
        match self {
            Self::Connection { source, .. } => Self::Connection {
                context: context.to_string(),
                source,
            },
            other => other,
        }
    }
}

/// Plain-text error source for failures that carry only a message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SourceMessage(pub String);
