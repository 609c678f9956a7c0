//! Transcript model.
//!
//! The transcript is the ordered, append-only history a conversation shows.
//! The only entry that is ever removed is a `pending` placeholder, and removal
//! always goes through [`Transcript::resolve_pending`], which appends the
//! terminal entry in the same step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumString};

use crate::error::{Result, SymptomixError};
use crate::message::Reply;
use crate::render::{escape_text, render_markdown};

/// Fixed user-facing text for failed exchanges.
pub const ERROR_NOTICE: &str = "Something went wrong. Please try again.";

/// Identifier of a transcript entry, unique within one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// Kind of a transcript entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EntryKind {
    /// Text the user submitted.
    User,
    /// Placeholder shown while a reply is awaited.
    Pending,
    /// Rendered backend reply.
    Bot,
    /// Fixed error notice for a failed exchange.
    BotError,
}

impl EntryKind {
    /// Whether this kind ends an exchange.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Bot | Self::BotError)
    }
}

/// A single rendered entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    /// Source text: the user's message, the reply markdown, or the error notice.
    pub text: String,
    /// Markup safe to insert as-is.
    pub html: String,
    pub created_at: DateTime<Utc>,
}

/// Ordered history of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `user` entry with escaped text.
    pub fn push_user(&mut self, text: &str) -> &TranscriptEntry {
        self.push(EntryKind::User, text.to_string(), escape_text(text))
    }

    /// Appends a `pending` placeholder.
    pub fn push_pending(&mut self) -> &TranscriptEntry {
        self.push(EntryKind::Pending, String::new(), String::new())
    }

    /// Replaces the placeholder `pending` with the terminal entry for `outcome`.
    ///
    /// The placeholder is removed and the terminal entry is appended at the
    /// end, so overlapping exchanges land in arrival order.
    pub fn resolve_pending(
        &mut self,
        pending: EntryId,
        outcome: &Result<Reply>,
    ) -> Result<&TranscriptEntry> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id == pending && entry.kind == EntryKind::Pending)
            .ok_or_else(|| {
                SymptomixError::internal(format!("no pending placeholder with id {pending}"))
            })?;
        self.entries.remove(position);

        let entry = match outcome {
            Ok(reply) => self.push(
                EntryKind::Bot,
                reply.markdown.clone(),
                render_markdown(&reply.markdown),
            ),
            Err(_) => self.push(
                EntryKind::BotError,
                ERROR_NOTICE.to_string(),
                escape_text(ERROR_NOTICE),
            ),
        };
        Ok(entry)
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&TranscriptEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: EntryKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }

    pub fn pending_count(&self) -> usize {
        self.count(EntryKind::Pending)
    }

    fn push(&mut self, kind: EntryKind, text: String, html: String) -> &TranscriptEntry {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(TranscriptEntry {
            id,
            kind,
            text,
            html,
            created_at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }
}
