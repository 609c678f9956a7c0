//! Backend contract.
//!
//! Defines the interface the exchange controller talks to. The HTTP
//! implementation lives in `symptomix-interaction`; tests use scripted mocks.

use crate::error::Result;
use crate::message::{OutgoingMessage, Reply};
use crate::session::SessionId;

/// A chat backend that answers one message at a time.
///
/// # Errors
///
/// Implementations map every failure (transport, status, body) into a
/// [`SymptomixError`](crate::SymptomixError) exchange failure. They must not
/// retry; one call is one attempt.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends `message` and returns the markdown reply.
    async fn send(&self, message: &OutgoingMessage) -> Result<Reply>;

    /// Drops the backend-side history for `session`.
    async fn reset(&self, session: &SessionId) -> Result<()>;
}
