//! Transcript events and the surfaces that consume them.
//!
//! The controller never touches a rendering surface directly. It publishes
//! one event per transcript mutation on a broadcast channel; surfaces
//! subscribe and apply the events in order.

use symptomix_core::{EntryId, TranscriptEntry};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// A single transcript mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// The view left the empty/centered layout. Published at most once.
    LayoutActivated,
    /// An entry was appended at the end of the transcript.
    EntryAppended(TranscriptEntry),
    /// A pending placeholder was removed.
    EntryRemoved(EntryId),
}

/// Something that shows a transcript: a terminal, an HTML document, ...
pub trait TranscriptSurface {
    fn layout_activated(&mut self);

    fn entry_appended(&mut self, entry: &TranscriptEntry);

    fn entry_removed(&mut self, id: EntryId);

    /// Called after every append so the newest entry is visible.
    fn scroll_to_end(&mut self) {}
}

/// Applies one event to `surface`.
pub fn apply_event<S: TranscriptSurface + ?Sized>(surface: &mut S, event: &TranscriptEvent) {
    match event {
        TranscriptEvent::LayoutActivated => surface.layout_activated(),
        TranscriptEvent::EntryAppended(entry) => {
            surface.entry_appended(entry);
            surface.scroll_to_end();
        }
        TranscriptEvent::EntryRemoved(id) => surface.entry_removed(*id),
    }
}

/// Feeds events from `events` into `surface` until the channel closes.
///
/// Returns the surface so callers can inspect it afterwards.
pub async fn drive_surface<S: TranscriptSurface>(
    mut events: broadcast::Receiver<TranscriptEvent>,
    mut surface: S,
) -> S {
    loop {
        match events.recv().await {
            Ok(event) => apply_event(&mut surface, &event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "transcript surface lagged behind, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }
    surface
}
