//! Keyword-in-context search over flattened record tables
//!
//! Tokenizes each row's full text, finds every occurrence of each query term,
//! and explodes the hits into one output row per occurrence with joined
//! left/right context. Matching is case-sensitive, whole-token equality;
//! context windows are measured in tokens.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::record::{FieldValue, FlatRecord};
use crate::table::Table;

/// Tokens per side of a context window unless the caller picks another size.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Publication name of ProQuest's machine-generated company data sheets.
const COMPANY_REPORT_PUBLICATION: &str = "Company Data Report";

lazy_static! {
    /// Word tokens: a letter followed by letters, digits, underscores, or
    /// apostrophes.
    static ref TOKEN_RE: Regex = Regex::new(r"\p{L}[\p{L}\p{N}_']*").unwrap();
}

/// Tokenize text into `(byte_offset, token)` pairs.
pub fn tokenize(text: &str) -> Vec<(usize, &str)> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| (m.start(), m.as_str()))
        .collect()
}

/// One keyword hit with its token context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextWindow {
    pub left: Vec<String>,
    pub token: String,
    pub right: Vec<String>,
    /// Byte offset of the matched token in the source text.
    pub offset: usize,
}

/// Every occurrence of `term` in `text`, with up to `window` tokens of
/// context on each side. Case-sensitive whole-token match.
pub fn context_windows(text: &str, term: &str, window: usize) -> Vec<ContextWindow> {
    let tokens = tokenize(text);
    let mut hits = Vec::new();
    for (i, (offset, token)) in tokens.iter().enumerate() {
        if *token != term {
            continue;
        }
        let left_start = i.saturating_sub(window);
        let right_end = (i + 1 + window).min(tokens.len());
        hits.push(ContextWindow {
            left: tokens[left_start..i]
                .iter()
                .map(|(_, t)| t.to_string())
                .collect(),
            token: token.to_string(),
            right: tokens[i + 1..right_end]
                .iter()
                .map(|(_, t)| t.to_string())
                .collect(),
            offset: *offset,
        });
    }
    hits
}

/// Drop the rows whose `publication` is ProQuest's "Company Data Report"
/// sentinel, preserving the order of the rest.
pub fn filter_company_reports(table: &Table) -> Table {
    table.filtered(|row| {
        row.get("publication").and_then(FieldValue::as_text) != Some(COMPANY_REPORT_PUBLICATION)
    })
}

/// Keyword-in-context search with the default window size.
pub fn concordance(table: &Table, query_terms: &[String]) -> Table {
    concordance_with_window(table, query_terms, DEFAULT_CONTEXT_WINDOW)
}

/// Keyword-in-context search over every row's `text` column.
///
/// Produces one row per occurrence, across all terms and all rows, in row
/// order then term order then hit order. Each output row carries every input
/// column except `text`, followed by `left`, `query`, and `right` (contexts
/// joined with single spaces). Rows sharing an identical joined left context
/// are deduplicated, keeping the first.
pub fn concordance_with_window(table: &Table, query_terms: &[String], window: usize) -> Table {
    let mut out_rows = Vec::new();
    let mut seen_left: HashSet<String> = HashSet::new();

    for row in table.rows() {
        let text = match row.get("text").and_then(FieldValue::as_text) {
            Some(text) => text,
            None => continue,
        };
        for term in query_terms {
            for hit in context_windows(text, term, window) {
                let left = hit.left.join(" ");
                if !seen_left.insert(left.clone()) {
                    continue;
                }
                let mut out = FlatRecord::new();
                for (name, value) in row.iter() {
                    if name != "text" {
                        out.insert(name, value.clone());
                    }
                }
                out.insert("left", FieldValue::Text(left));
                out.insert("query", FieldValue::Text(hit.token));
                out.insert("right", FieldValue::Text(hit.right.join(" ")));
                out_rows.push(out);
            }
        }
    }

    Table::from_records(out_rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(id: &str, publication: &str, text: &str) -> FlatRecord {
        let mut row = FlatRecord::new();
        row.insert("id", FieldValue::Text(id.into()));
        row.insert("publication", FieldValue::Text(publication.into()));
        row.insert("text", FieldValue::Text(text.into()));
        row
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_tokenize_offsets() {
        let tokens = tokenize("the quick brown fox");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0], (0, "the"));
        assert_eq!(tokens[3], (16, "fox"));
    }

    #[test]
    fn test_tokenize_keeps_apostrophes() {
        let tokens = tokenize("the fox's den");
        assert_eq!(tokens[1].1, "fox's");
    }

    #[test]
    fn test_context_window_at_text_end() {
        let hits = context_windows("the quick brown fox", "fox", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].left, vec!["the", "quick", "brown"]);
        assert!(hits[0].right.is_empty());
        assert_eq!(hits[0].offset, 16);
    }

    #[test]
    fn test_context_window_size_limits_left() {
        let hits = context_windows("one two three four five six", "six", 2);
        assert_eq!(hits[0].left, vec!["four", "five"]);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert!(context_windows("The fox", "the", 5).is_empty());
        assert_eq!(context_windows("The fox", "The", 5).len(), 1);
    }

    #[test]
    fn test_match_is_whole_token() {
        assert!(context_windows("foxes run", "fox", 5).is_empty());
    }

    #[test]
    fn test_concordance_single_hit() {
        let table = Table::from_records(vec![text_row("1", "P", "the quick brown fox")]);
        let out = concordance(&table, &terms(&["fox"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out.cell(0, "query"), &FieldValue::Text("fox".into()));
        assert_eq!(
            out.cell(0, "left"),
            &FieldValue::Text("the quick brown".into())
        );
        assert_eq!(out.cell(0, "right"), &FieldValue::Text("".into()));
    }

    #[test]
    fn test_concordance_drops_text_column_and_orders_columns() {
        let table = Table::from_records(vec![text_row("1", "P", "a fox")]);
        let out = concordance(&table, &terms(&["fox"]));
        assert_eq!(out.columns(), &["id", "publication", "left", "query", "right"]);
    }

    #[test]
    fn test_concordance_multiple_rows_and_terms() {
        let table = Table::from_records(vec![
            text_row("1", "P", "alpha beta gamma"),
            text_row("2", "P", "beta delta"),
        ]);
        let out = concordance(&table, &terms(&["beta", "delta"]));
        assert_eq!(out.len(), 3);
        // Row order first, then term order within a row.
        assert_eq!(out.cell(0, "id"), &FieldValue::Text("1".into()));
        assert_eq!(out.cell(1, "id"), &FieldValue::Text("2".into()));
        assert_eq!(out.cell(1, "query"), &FieldValue::Text("beta".into()));
        assert_eq!(out.cell(2, "query"), &FieldValue::Text("delta".into()));
    }

    #[test]
    fn test_concordance_dedups_identical_left_context() {
        let table = Table::from_records(vec![
            text_row("1", "P", "same lead fox here"),
            text_row("2", "P", "same lead fox there"),
        ]);
        let out = concordance(&table, &terms(&["fox"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out.cell(0, "id"), &FieldValue::Text("1".into()));
        assert_eq!(out.cell(0, "right"), &FieldValue::Text("here".into()));
    }

    #[test]
    fn test_concordance_no_hits_no_rows() {
        let table = Table::from_records(vec![text_row("1", "P", "nothing relevant")]);
        let out = concordance(&table, &terms(&["fox"]));
        assert!(out.is_empty());
    }

    #[test]
    fn test_rows_without_text_are_skipped() {
        let mut row = FlatRecord::new();
        row.insert("id", FieldValue::Text("1".into()));
        let table = Table::from_records(vec![row, text_row("2", "P", "a fox")]);
        let out = concordance(&table, &terms(&["fox"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out.cell(0, "id"), &FieldValue::Text("2".into()));
    }

    #[test]
    fn test_filter_company_reports() {
        let table = Table::from_records(vec![
            text_row("1", "The Gazette", "x"),
            text_row("2", "Company Data Report", "y"),
            text_row("3", "Herald", "z"),
        ]);
        let kept = filter_company_reports(&table);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.cell(0, "id"), &FieldValue::Text("1".into()));
        assert_eq!(kept.cell(1, "id"), &FieldValue::Text("3".into()));
    }
}
