use std::io::Write;

use colored::Colorize;
use symptomix_application::TranscriptSurface;
use symptomix_core::{EntryId, EntryKind, TranscriptEntry};

const BOT_NAME: &str = "Symptomix";

/// Formats one entry for the terminal.
///
/// Bot replies are shown as their markdown source; terminals have no use
/// for the sanitized HTML.
pub fn format_entry(entry: &TranscriptEntry) -> String {
    match entry.kind {
        EntryKind::User => format!("{}", format!("> {}", entry.text).green()),
        EntryKind::Pending => format!("{}", "thinking…".bright_black()),
        EntryKind::Bot => {
            let mut out = format!("{}", format!("[{BOT_NAME}]").bright_magenta());
            for line in entry.text.lines() {
                out.push('\n');
                out.push_str(&line.bright_blue().to_string());
            }
            out
        }
        EntryKind::BotError => format!("{}", entry.text.red()),
    }
}

/// Prints transcript events as they arrive.
///
/// Printed lines cannot be taken back, so placeholder removal prints nothing.
pub struct TerminalSurface<W: Write> {
    out: W,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TranscriptSurface for TerminalSurface<W> {
    fn layout_activated(&mut self) {}

    fn entry_appended(&mut self, entry: &TranscriptEntry) {
        let mut text = format_entry(entry);
        if entry.kind.is_terminal() {
            text.push('\n');
        }
        if let Err(err) = writeln!(self.out, "{text}") {
            tracing::warn!(entry = %entry.id, error = %err, "failed to print entry");
        }
    }

    fn entry_removed(&mut self, _id: EntryId) {}

    fn scroll_to_end(&mut self) {
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symptomix_application::{TranscriptEvent, apply_event};
    use symptomix_core::{Reply, SymptomixError, Transcript};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_user_and_pending() {
        plain();
        let mut transcript = Transcript::new();
        let user = transcript.push_user("I have a headache").clone();
        let pending = transcript.push_pending().clone();

        assert_eq!(format_entry(&user), "> I have a headache");
        assert_eq!(format_entry(&pending), "thinking…");
    }

    #[test]
    fn test_format_bot_reply_keeps_markdown_lines() {
        plain();
        let mut transcript = Transcript::new();
        let pending = transcript.push_pending().id;
        let bot = transcript
            .resolve_pending(pending, &Ok(Reply::new("**Rest**\n- drink water")))
            .unwrap()
            .clone();

        assert_eq!(format_entry(&bot), "[Symptomix]\n**Rest**\n- drink water");
    }

    #[test]
    fn test_format_error_notice() {
        plain();
        let mut transcript = Transcript::new();
        let pending = transcript.push_pending().id;
        let error = transcript
            .resolve_pending(pending, &Err(SymptomixError::transport("refused")))
            .unwrap()
            .clone();

        assert_eq!(format_entry(&error), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_surface_prints_appended_entries_only() {
        plain();
        let mut transcript = Transcript::new();
        let user = transcript.push_user("hello").clone();
        let pending = transcript.push_pending().clone();
        let bot = transcript
            .resolve_pending(pending.id, &Ok(Reply::new("Hi")))
            .unwrap()
            .clone();

        let mut surface = TerminalSurface::new(Vec::new());
        for event in [
            TranscriptEvent::LayoutActivated,
            TranscriptEvent::EntryAppended(user),
            TranscriptEvent::EntryAppended(pending.clone()),
            TranscriptEvent::EntryRemoved(pending.id),
            TranscriptEvent::EntryAppended(bot),
        ] {
            apply_event(&mut surface, &event);
        }

        let printed = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(printed, "> hello\nthinking…\n[Symptomix]\nHi\n\n");
    }
}
