//! HTML to plain text conversion
//!
//! Strips all markup from an HTML fragment while keeping paragraph structure:
//! block-level elements become blank-line boundaries, inline markup collapses
//! into the surrounding text.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// HTML block-level elements, from
/// https://developer.mozilla.org/en-US/docs/Web/HTML/Block-level_elements
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "dialog",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

lazy_static! {
    /// Runs of two or more newlines, possibly separated by single spaces.
    static ref NEWLINE_RUN_RE: Regex = Regex::new(r"\n( ?\n)+").unwrap();
    /// Horizontal whitespace inside a text node.
    static ref INLINE_WS_RE: Regex = Regex::new(r"[ \t\r]+").unwrap();
}

fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag)
}

/// Convert HTML markup to plain text.
///
/// Block elements contribute newline markers on both sides, text nodes are
/// joined with single spaces, then newline runs collapse to one blank line and
/// every line is trimmed. The output contains no tags, and running it through
/// this function again returns it unchanged.
pub fn text_from_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<String> = Vec::new();
    collect_parts(document.root_element(), &mut parts);

    let joined = parts.join(" ");
    let collapsed = NEWLINE_RUN_RE.replace_all(&joined, "\n\n");
    let lines: Vec<&str> = collapsed.split('\n').map(str::trim).collect();
    lines.join("\n").trim_matches('\n').to_string()
}

/// Walk the element's children, pushing newline markers around block elements
/// and whitespace-normalized text content.
fn collect_parts(element: ElementRef, parts: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Element(el) => {
                let block = is_block(el.name());
                if block {
                    parts.push("\n".to_string());
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_parts(child_el, parts);
                }
                if block {
                    parts.push("\n".to_string());
                }
            }
            Node::Text(text) => {
                // Keep newlines so normalization is idempotent on its own
                // output; horizontal runs from markup formatting collapse.
                let raw: &str = &text.text;
                let cleaned = INLINE_WS_RE.replace_all(raw, " ");
                let cleaned = cleaned.trim_matches(' ');
                if !cleaned.is_empty() {
                    parts.push(cleaned.to_string());
                }
            }
            _ => {}
        }
    }
}
