//! Text processing utilities
//!
//! Currently just HTML-to-plain-text conversion for article bodies flagged
//! with `HTMLContent="true"`.

pub mod html;

pub use html::text_from_html;
