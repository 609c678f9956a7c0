//! Markdown rendering and escaping.
//!
//! Both user text and backend replies end up as markup in a transcript.
//! User text is always escaped. Replies are rendered from markdown, but any
//! raw HTML they carry is emitted as escaped text and links or images with a
//! scheme outside the allowlist are pointed at `#`.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

/// URL schemes a rendered link or image may use.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Render markdown to sanitized HTML.
pub fn render_markdown(markdown: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options).map(sanitize_event);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Escape plain text for insertion into HTML.
pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Whether `url` is safe to place in an `href` or `src` attribute.
///
/// Relative references (no scheme) are allowed.
pub fn is_safe_url(url: &str) -> bool {
    let trimmed = url.trim_start();
    match scheme_of(trimmed) {
        Some(scheme) => ALLOWED_SCHEMES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(scheme)),
        None => true,
    }
}

fn scheme_of(url: &str) -> Option<&str> {
    let colon = url.find(':')?;
    let candidate = &url[..colon];
    // A '/', '?' or '#' before the colon means the colon is part of a path or query.
    if candidate.is_empty() || candidate.contains(['/', '?', '#']) {
        return None;
    }
    Some(candidate)
}

fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::HtmlBlock) => Event::Start(Tag::Paragraph),
        Event::End(TagEnd::HtmlBlock) => Event::End(TagEnd::Paragraph),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutralize(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralize(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn neutralize(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        CowStr::Borrowed("#")
    }
}
