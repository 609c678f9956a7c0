//! Session context.
//!
//! A conversation is scoped on the backend by an opaque session identifier.
//! The identifier is created once when a conversation starts and handed to
//! the controller explicitly, so nothing reads it from global state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Result, SymptomixError};

/// Opaque token that scopes a conversation to a backend-side context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier, rejecting blank values.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SymptomixError::config("session id must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Conversation-scoped context threaded into every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Identifier sent as `chat_id`
    pub id: SessionId,
    /// When the conversation was started
    pub started_at: DateTime<Utc>,
}

impl SessionContext {
    /// Starts a conversation with the given identifier.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            started_at: Utc::now(),
        }
    }

    /// Starts a conversation, using `configured` if present or a generated id otherwise.
    pub fn start(configured: Option<&str>) -> Result<Self> {
        let id = match configured {
            Some(value) => SessionId::parse(value)?,
            None => SessionId::generate(),
        };
        Ok(Self::new(id))
    }
}
