//! Message rendering.
//!
//! User text is shown literally. Assistant text comes from a remote model and
//! is untrusted: it is converted from markdown to HTML with every executable
//! construct removed or escaped. There is no switch that turns this off.

use std::ops::Range;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use markdown::{Options, ParseOptions, mdast, to_mdast};
use regex::Regex;

use crate::session::{Message, MessageRole};

/// Elements whose content executes or styles the host page. They are removed
/// together with their content before markdown conversion.
static EXECUTABLE_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<(?:script|style|iframe|object|embed|noscript|template)\b[^>]*>.*?</(?:script|style|iframe|object|embed|noscript|template)\s*>",
    )
    .expect("executable element pattern is valid")
});

/// Converts message content into its display form, once per message.
#[derive(Debug, Default)]
pub struct RenderPipeline {
    conversions: AtomicUsize,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the display form of `message`, computing and caching it on
    /// first use.
    pub fn render(&self, message: &Message) -> String {
        message
            .rendered_cell()
            .get_or_init(|| {
                self.conversions.fetch_add(1, Ordering::Relaxed);
                match message.role() {
                    MessageRole::User => escape_text(message.content()),
                    MessageRole::Assistant => render_markdown(message.content()),
                }
            })
            .clone()
    }

    /// Number of conversions performed so far.
    pub fn conversions(&self) -> usize {
        self.conversions.load(Ordering::Relaxed)
    }
}

/// Escapes `text` so it displays literally inside HTML.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Converts untrusted markdown to HTML.
///
/// Raw HTML left after stripping is escaped and unsafe link protocols are
/// dropped by the compiler's default (non-dangerous) options.
pub fn render_markdown(source: &str) -> String {
    let options = Options::gfm();
    let stripped = strip_executable_elements(source, &options.parse);
    match markdown::to_html_with_options(&stripped, &options) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("[Render] Markdown conversion failed, showing plain text: {}", e);
            format!("<p>{}</p>", escape_text(source))
        }
    }
}

/// Removes executable elements outside code.
///
/// Code blocks (fenced or indented) and inline code spans are located on the
/// parsed tree and left untouched; the compiler escapes them and users expect
/// code samples to survive.
fn strip_executable_elements(source: &str, options: &ParseOptions) -> String {
    let code = match to_mdast(source, options) {
        Ok(root) => {
            let mut ranges = Vec::new();
            collect_code_ranges(&root, &mut ranges);
            ranges
        }
        Err(e) => {
            tracing::debug!("[Render] Could not parse for code spans: {}", e);
            Vec::new()
        }
    };

    let mut output = String::with_capacity(source.len());
    let mut last = 0;
    for found in EXECUTABLE_ELEMENT.find_iter(source) {
        let overlaps_code = code
            .iter()
            .any(|range| found.start() < range.end && range.start < found.end());
        if overlaps_code {
            continue;
        }
        output.push_str(&source[last..found.start()]);
        last = found.end();
    }
    output.push_str(&source[last..]);
    output
}

/// Byte ranges of every code block and inline code span under `node`.
fn collect_code_ranges(node: &mdast::Node, ranges: &mut Vec<Range<usize>>) {
    match node {
        mdast::Node::Code(_) | mdast::Node::InlineCode(_) => {
            if let Some(position) = node.position() {
                ranges.push(position.start.offset..position.end.offset);
            }
        }
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    collect_code_ranges(child, ranges);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_content_is_literal() {
        let pipeline = RenderPipeline::new();
        let message = Message::user("<b>hi</b> **not bold**");
        let html = pipeline.render(&message);

        assert_eq!(html, "&lt;b&gt;hi&lt;/b&gt; **not bold**");
    }

    #[test]
    fn test_assistant_markdown_is_converted() {
        let pipeline = RenderPipeline::new();
        let message = Message::assistant("# Title\n\n- *one*\n- `two`\n");
        let html = pipeline.render(&message);

        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>one</em>"));
        assert!(html.contains("<code>two</code>"));
    }

    #[test]
    fn test_render_is_computed_once() {
        let pipeline = RenderPipeline::new();
        let message = Message::assistant("**cached**");

        let first = pipeline.render(&message);
        let second = pipeline.render(&message);

        assert_eq!(first, second);
        assert_eq!(pipeline.conversions(), 1);
        assert_eq!(message.rendered_content(), Some(first.as_str()));
    }

    #[test]
    fn test_script_is_removed_and_bold_survives() {
        let pipeline = RenderPipeline::new();
        let message = Message::assistant("<script>evil()</script>**bold**");
        let html = pipeline.render(&message);

        assert!(!html.to_lowercase().contains("<script"));
        assert!(!html.contains("evil()"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_multiline_and_mixed_case_script_is_removed() {
        let html = render_markdown("before\n\n<ScRiPt type=\"text/javascript\">\nsteal();\n</SCRIPT>\n\nafter");
        assert!(!html.to_lowercase().contains("<script"));
        assert!(!html.contains("steal()"));
        assert!(html.contains("before"));
        assert!(html.contains("after"));
    }

    #[test]
    fn test_inline_html_is_escaped() {
        let html = render_markdown("look <img src=x onerror=alert(1)> here");
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img"));
    }

    #[test]
    fn test_dangerous_link_protocol_is_dropped() {
        let html = render_markdown("[click](javascript:alert(1)) and [ok](https://example.com)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains("href=\"https://example.com\""));
    }

    #[test]
    fn test_fenced_code_keeps_script_sample_escaped() {
        let html = render_markdown("```html\n<script>demo()</script>\n```\n");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;demo()&lt;/script&gt;"));
    }

    #[test]
    fn test_inline_code_keeps_script_sample() {
        let html = render_markdown("Avoid `<script>alert(1)</script>` in templates.");
        assert!(!html.contains("<script>"));
        assert!(html.contains("<code>&lt;script&gt;alert(1)&lt;/script&gt;</code>"));
    }

    #[test]
    fn test_indented_code_keeps_script_sample() {
        let html = render_markdown("    <script>indented()</script>\n");
        assert!(!html.contains("<script>"));
        assert!(html.contains("<pre><code>&lt;script&gt;indented()&lt;/script&gt;"));
    }

    #[test]
    fn test_script_outside_code_is_still_removed_next_to_code() {
        let html = render_markdown("`<b>` <script>gone()</script> **kept**");
        assert!(!html.contains("gone()"));
        assert!(html.contains("<code>&lt;b&gt;</code>"));
        assert!(html.contains("<strong>kept</strong>"));
    }
}
