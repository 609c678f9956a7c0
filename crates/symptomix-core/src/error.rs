//! Error types for the Symptomix client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Symptomix client crates.
///
/// Every failure an exchange can run into is folded into one of these
/// variants so the controller can log it and pick the terminal transcript
/// entry without caring where it came from.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymptomixError {
    /// Input was empty after trimming
    #[error("Message is empty")]
    EmptyInput,

    /// Another exchange is still outstanding and the policy rejects overlap
    #[error("An exchange is already in flight ({in_flight} outstanding)")]
    Busy { in_flight: usize },

    /// Connection, DNS or other transport level failure
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Backend answered with a non-2xx status
    #[error("Backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Backend answered 2xx but the body was not the expected reply shape
    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The exchange was cancelled before the backend answered
    #[error("Exchange cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Markup template could not be rendered
    #[error("Render error: {0}")]
    Render(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SymptomixError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an Http error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a MalformedReply error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedReply(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error came from talking to the backend.
    ///
    /// Returns true for transport, HTTP status, malformed body, timeout and
    /// cancellation failures. These are the failures an exchange turns into
    /// a `bot-error` transcript entry.
    pub fn is_exchange_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Http { .. }
                | Self::MalformedReply(_)
                | Self::Timeout { .. }
                | Self::Cancelled
        )
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SymptomixError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SymptomixError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SymptomixError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, SymptomixError>`.
pub type Result<T> = std::result::Result<T, SymptomixError>;
