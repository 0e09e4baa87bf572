//! proquest-xml: parse ProQuest XML exports into flat records and
//! keyword-in-context tables
//!
//! This library provides pure Rust implementations of:
//! - Record tree parsing of ProQuest XML export files (attributes under
//!   `@`-prefixed keys, element text under `#text`, repeated elements as
//!   sequences)
//! - Slash-delimited path resolution with wildcard search
//! - HTML-to-plain-text conversion preserving paragraph boundaries
//! - A typed document model (title, authors, subject terms, body text)
//! - Flattening documents into tables with CSV / JSON-lines export
//! - Concordance (keyword-in-context) search over flattened tables

pub mod concordance;
pub mod document;
pub mod error;
pub mod query;
pub mod record;
pub mod table;
pub mod text;
pub mod tree;

// Re-export main types for convenience
pub use concordance::{
    concordance, concordance_with_window, context_windows, filter_company_reports, tokenize,
    ContextWindow, DEFAULT_CONTEXT_WINDOW,
};
pub use document::{AuthorEntry, Document};
pub use error::{ProquestError, Result};
pub use query::{collect_query_terms, parse_query_line, prompt_query_terms};
pub use record::{create_table, create_table_lenient, to_record, ExtraField, FieldValue, FlatRecord};
pub use table::Table;
pub use text::text_from_html;
pub use tree::{parse_tree, TreeNode, TreeValue};
