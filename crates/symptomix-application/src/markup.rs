//! HTML markup for transcripts.
//!
//! Fragments are produced by minijinja templates with HTML auto-escaping
//! forced on for every template. The only values inserted unescaped are
//! `entry.html`, which the transcript already escaped or sanitized, and the
//! entry fragments the container wraps.

use minijinja::{AutoEscape, Environment, context};
use symptomix_core::{EntryId, LayoutState, Result, SymptomixError, Transcript, TranscriptEntry};

use crate::events::TranscriptSurface;

const ENTRY_TEMPLATE: &str = r#"<div class="entry entry-{{ entry.kind }}" id="entry-{{ entry.id }}" data-kind="{{ entry.kind }}">
{%- if entry.kind == "pending" %}<div class="dot-flashing" aria-label="Waiting for a reply"></div>
{%- else %}<div class="bubble">{{ entry.html|safe }}</div>
{%- endif %}</div>"#;

const CONTAINER_TEMPLATE: &str = r#"<div class="chat-box layout-{{ layout }}" data-scroll="end">
{%- for fragment in fragments %}
{{ fragment|safe }}
{%- endfor %}
</div>"#;

/// Renders transcript entries into HTML fragments.
pub struct MarkupRenderer {
    env: Environment<'static>,
}

impl MarkupRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template("entry.html", ENTRY_TEMPLATE)
            .map_err(render_error)?;
        env.add_template("container.html", CONTAINER_TEMPLATE)
            .map_err(render_error)?;
        Ok(Self { env })
    }

    /// Markup for a single entry.
    pub fn render_entry(&self, entry: &TranscriptEntry) -> Result<String> {
        self.env
            .get_template("entry.html")
            .and_then(|template| template.render(context! { entry => entry }))
            .map_err(render_error)
    }

    /// Markup for the whole scrollable container.
    pub fn render_transcript(&self, transcript: &Transcript, layout: LayoutState) -> Result<String> {
        let fragments = transcript
            .entries()
            .iter()
            .map(|entry| self.render_entry(entry))
            .collect::<Result<Vec<_>>>()?;
        self.render_container(layout, &fragments)
    }

    /// Wraps already rendered entry fragments in the scrollable container.
    pub fn render_container<S: AsRef<str>>(&self, layout: LayoutState, fragments: &[S]) -> Result<String> {
        let fragments: Vec<&str> = fragments.iter().map(AsRef::as_ref).collect();
        self.env
            .get_template("container.html")
            .and_then(|template| {
                template.render(context! {
                    fragments => fragments,
                    layout => layout.as_ref(),
                })
            })
            .map_err(render_error)
    }
}

fn render_error(err: minijinja::Error) -> SymptomixError {
    SymptomixError::render(err.to_string())
}

/// A surface that keeps an HTML document in sync with transcript events.
pub struct HtmlSurface {
    renderer: MarkupRenderer,
    layout: LayoutState,
    fragments: Vec<(EntryId, String)>,
}

impl HtmlSurface {
    pub fn new() -> Result<Self> {
        Ok(Self {
            renderer: MarkupRenderer::new()?,
            layout: LayoutState::default(),
            fragments: Vec::new(),
        })
    }

    pub fn layout(&self) -> LayoutState {
        self.layout
    }

    /// The current container markup.
    pub fn document(&self) -> Result<String> {
        let fragments: Vec<&str> = self.fragments.iter().map(|(_, html)| html.as_str()).collect();
        self.renderer.render_container(self.layout, &fragments)
    }
}

impl TranscriptSurface for HtmlSurface {
    fn layout_activated(&mut self) {
        self.layout.activate();
    }

    fn entry_appended(&mut self, entry: &TranscriptEntry) {
        match self.renderer.render_entry(entry) {
            Ok(fragment) => self.fragments.push((entry.id, fragment)),
            Err(err) => tracing::error!(entry = %entry.id, error = %err, "failed to render entry"),
        }
    }

    fn entry_removed(&mut self, id: EntryId) {
        self.fragments.retain(|(entry_id, _)| *entry_id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{TranscriptEvent, apply_event};
    use symptomix_core::{ERROR_NOTICE, Reply};

    #[test]
    fn test_user_entry_fragment_is_escaped_once() {
        let renderer = MarkupRenderer::new().unwrap();
        let mut transcript = Transcript::new();
        let entry = transcript.push_user("<script>x</script> & more").clone();

        let html = renderer.render_entry(&entry).unwrap();

        assert!(html.contains("class=\"entry entry-user\""));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt; &amp; more"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("&amp;lt;"), "double escaped: {html}");
    }

    #[test]
    fn test_bot_entry_keeps_rendered_markdown() {
        let renderer = MarkupRenderer::new().unwrap();
        let mut transcript = Transcript::new();
        let pending = transcript.push_pending().id;
        let entry = transcript
            .resolve_pending(pending, &Ok(Reply::new("**hi**")))
            .unwrap()
            .clone();

        let html = renderer.render_entry(&entry).unwrap();
        assert!(html.contains("<strong>hi</strong>"));
        assert!(html.contains("data-kind=\"bot\""));
    }

    #[test]
    fn test_pending_entry_shows_placeholder() {
        let renderer = MarkupRenderer::new().unwrap();
        let mut transcript = Transcript::new();
        let entry = transcript.push_pending().clone();

        let html = renderer.render_entry(&entry).unwrap();
        assert!(html.contains("dot-flashing"));
        assert!(html.contains("id=\"entry-0\""));
    }

    #[test]
    fn test_transcript_container_carries_layout() {
        let renderer = MarkupRenderer::new().unwrap();
        let mut transcript = Transcript::new();
        transcript.push_user("hi");
        let pending = transcript.push_pending().id;
        transcript
            .resolve_pending(pending, &Err(SymptomixError::Cancelled))
            .unwrap();

        let html = renderer
            .render_transcript(&transcript, LayoutState::Active)
            .unwrap();

        assert!(html.starts_with("<div class=\"chat-box layout-active\""));
        assert!(html.contains("entry-user"));
        assert!(html.contains("entry-bot-error"));
        assert!(html.contains(ERROR_NOTICE));
        assert!(!html.contains("entry-pending"));
    }

    #[test]
    fn test_html_surface_matches_full_render() {
        let mut transcript = Transcript::new();
        let user = transcript.push_user("a < b").clone();
        let pending = transcript.push_pending().clone();
        let bot = transcript
            .resolve_pending(pending.id, &Ok(Reply::new("# Rest")))
            .unwrap()
            .clone();

        let mut surface = HtmlSurface::new().unwrap();
        for event in [
            TranscriptEvent::LayoutActivated,
            TranscriptEvent::EntryAppended(user),
            TranscriptEvent::EntryAppended(pending.clone()),
            TranscriptEvent::EntryRemoved(pending.id),
            TranscriptEvent::EntryAppended(bot),
        ] {
            apply_event(&mut surface, &event);
        }

        let renderer = MarkupRenderer::new().unwrap();
        let full = renderer
            .render_transcript(&transcript, LayoutState::Active)
            .unwrap();
        assert_eq!(surface.document().unwrap(), full);
    }

    #[test]
    fn test_empty_container_is_centered() {
        let renderer = MarkupRenderer::new().unwrap();
        let html = renderer
            .render_container::<&str>(LayoutState::Centered, &[])
            .unwrap();
        assert_eq!(html, "<div class=\"chat-box layout-centered\" data-scroll=\"end\">\n</div>");
    }

    #[test]
    fn test_html_surface_follows_events() {
        let mut transcript = Transcript::new();
        let user = transcript.push_user("hi").clone();
        let pending = transcript.push_pending().clone();
        let bot = transcript
            .resolve_pending(pending.id, &Ok(Reply::new("_hello_")))
            .unwrap()
            .clone();

        let mut surface = HtmlSurface::new().unwrap();
        apply_event(&mut surface, &TranscriptEvent::LayoutActivated);
        apply_event(&mut surface, &TranscriptEvent::EntryAppended(user));
        apply_event(&mut surface, &TranscriptEvent::EntryAppended(pending.clone()));
        assert!(surface.document().unwrap().contains("dot-flashing"));

        apply_event(&mut surface, &TranscriptEvent::EntryRemoved(pending.id));
        apply_event(&mut surface, &TranscriptEvent::EntryAppended(bot));

        let document = surface.document().unwrap();
        assert_eq!(surface.layout(), LayoutState::Active);
        assert!(document.contains("layout-active"));
        assert!(!document.contains("dot-flashing"));
        assert!(document.contains("<em>hello</em>"));
    }
}
