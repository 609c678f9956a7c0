//! Outgoing messages, replies and their wire shapes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SymptomixError};
use crate::session::{SessionContext, SessionId};

/// A single user submission, ready to be sent.
///
/// Constructed per submission and discarded once the request is out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    text: String,
    session_id: SessionId,
}

impl OutgoingMessage {
    /// Builds a message from raw input, trimming surrounding whitespace.
    ///
    /// Returns `SymptomixError::EmptyInput` when nothing is left.
    pub fn new(raw: &str, session: &SessionContext) -> Result<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(SymptomixError::EmptyInput);
        }
        Ok(Self {
            text: text.to_string(),
            session_id: session.id.clone(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The JSON body sent to `POST /get`.
    pub fn to_request(&self) -> ChatRequest {
        ChatRequest {
            msg: self.text.clone(),
            chat_id: self.session_id.as_str().to_string(),
        }
    }
}

/// Markdown reply returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub markdown: String,
}

impl Reply {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
        }
    }
}

/// Body of `POST /get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub msg: String,
    pub chat_id: String,
}

/// Successful body of `POST /get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

impl From<ChatResponse> for Reply {
    fn from(body: ChatResponse) -> Self {
        Reply::new(body.response)
    }
}

/// Body of `POST /reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    pub chat_id: String,
}

/// Body of a successful `POST /reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    pub message: String,
}

/// Error body the backend sends with 4xx answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
