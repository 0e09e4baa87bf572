//! ProQuest document model
//!
//! Wraps one parsed record tree and exposes typed accessors for the fields
//! the flattener needs. The tree is owned exclusively and never mutated after
//! construction; derived data (authors, terms, text) is computed on demand.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProquestError, Result};
use crate::text::text_from_html;
use crate::tree::{self, parse_tree, TreeValue};

/// Root wrapper element of a ProQuest export file.
const RECORD_WRAPPER: &str = "RECORD";

/// Element holding the document's unique id.
const ID_PATH: &str = "GOID";

/// One contributor, in contribution order.
///
/// Not all entries have first/last name recorded; some only carry the
/// original-form full name. `order` keeps the raw attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorEntry {
    pub order: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub full_name: Option<String>,
}

/// One parsed ProQuest article.
#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    tree: TreeValue,
}

impl Document {
    /// Parse a document from XML text.
    ///
    /// Unwraps the `RECORD` container and extracts the `GOID` id; both must
    /// be present.
    pub fn from_str(xml: &str) -> Result<Self> {
        let root = parse_tree(xml)?;
        let tree = match root.get(RECORD_WRAPPER) {
            Some(TreeValue::Node(node)) => TreeValue::Node(node.clone()),
            _ => {
                return Err(ProquestError::parse(format!(
                    "missing {} wrapper element",
                    RECORD_WRAPPER
                )))
            }
        };
        let id = tree::get_string(&tree, ID_PATH)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProquestError::parse(format!("missing {} field", ID_PATH)))?;
        tracing::debug!(id = %id, "parsed ProQuest document");
        Ok(Document { id, tree })
    }

    /// Parse a document from an XML file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::from_str(&xml)
    }

    /// The document's unique id (`GOID`).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resolve a path expression against the record tree.
    pub fn get(&self, path: &str) -> Option<&TreeValue> {
        tree::get(&self.tree, path)
    }

    /// Resolve a path expression to a string value.
    pub fn get_string(&self, path: &str) -> Option<String> {
        tree::get_string(&self.tree, path)
    }

    /// Find all values matching a wildcard pattern, e.g.
    /// `DFS/PubFrosting/*Title*`.
    pub fn search(&self, pattern: &str) -> Vec<(String, &TreeValue)> {
        tree::search(&self.tree, pattern)
    }

    /// Deep copy of the full record tree.
    pub fn get_dict(&self) -> TreeValue {
        self.tree.clone()
    }

    /// The tree's key structure, one key per line, indented by depth.
    /// Diagnostic output only.
    pub fn key_tree(&self) -> String {
        let mut out = String::new();
        if let TreeValue::Node(node) = &self.tree {
            format_keys(node, "", &mut out);
        }
        out
    }

    /// Print the tree's key structure to stdout. Diagnostic only.
    pub fn show_all_keys(&self) {
        print!("{}", self.key_tree());
    }

    /// Case-insensitive substring search over all tag names, returning the
    /// matching key paths.
    pub fn search_all_tags(&self, text: &str) -> Vec<String> {
        let needle = text.to_lowercase();
        let node = match &self.tree {
            TreeValue::Node(node) => node,
            _ => return Vec::new(),
        };
        tree::key_paths(node)
            .into_iter()
            .filter(|path| {
                path.rsplit('/')
                    .next()
                    .map(|last| last.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Case-insensitive substring search over all leaf string values
    /// (including strings inside sequences), returning `(path, value)` pairs.
    pub fn search_all_values(&self, text: &str) -> Vec<(String, &TreeValue)> {
        let needle = text.to_lowercase();
        let node = match &self.tree {
            TreeValue::Node(node) => node,
            _ => return Vec::new(),
        };
        let mut results = Vec::new();
        for path in tree::key_paths(node) {
            let value = match tree::get(&self.tree, &path) {
                Some(value) => value,
                None => continue,
            };
            let matched = match value {
                TreeValue::Scalar(s) => s.to_lowercase().contains(&needle),
                TreeValue::Sequence(items) => items.iter().any(|item| {
                    item.as_scalar()
                        .map(|s| s.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                }),
                TreeValue::Node(_) => false,
            };
            if matched {
                results.push((path, value));
            }
        }
        results
    }

    /// The article title.
    pub fn get_article_title(&self) -> Option<String> {
        self.get_string("Obj/TitleAtt/Title")
    }

    /// The main article text, converting HTML to plain text when the stored
    /// text is flagged as HTML and `clean_html` is set.
    pub fn get_text(&self, clean_html: bool) -> Option<String> {
        let is_html = self
            .get_string("TextInfo/Text/@HTMLContent")
            .map(|flag| flag == "true")
            .unwrap_or(false);
        // Text without attributes parses as a plain scalar, so fall back to
        // the element itself when there is no #text child.
        let text = self
            .get_string("TextInfo/Text/#text")
            .or_else(|| self.get_string("TextInfo/Text"))?;
        if clean_html && is_html {
            Some(text_from_html(&text))
        } else {
            Some(text)
        }
    }

    /// The general subject terms, or `None` when the document has none.
    ///
    /// A single term and a repeated term element both normalize to a list.
    pub fn get_terms(&self) -> Option<Vec<String>> {
        let term_info = self.get("Obj/Terms/GenSubjTerm")?;
        let terms = match term_info {
            TreeValue::Sequence(items) => items
                .iter()
                .filter_map(|entry| tree::get_string(entry, "GenSubjValue"))
                .collect(),
            single => tree::get_string(single, "GenSubjValue")
                .into_iter()
                .collect(),
        };
        Some(terms)
    }

    /// The article's contributors, sorted ascending by contribution order.
    ///
    /// A single contributor and a repeated contributor element both normalize
    /// to a list. When multiple contributors are present, every
    /// `@ContribOrder` must parse as an integer; a missing or non-numeric
    /// order is a [`ProquestError::MalformedAuthor`]. A document without a
    /// contributor node yields an empty list.
    pub fn get_authors(&self) -> Result<Vec<AuthorEntry>> {
        let contributors = match self.get("Obj/Contributors/Contributor") {
            Some(value) => value,
            None => return Ok(Vec::new()),
        };

        match contributors {
            TreeValue::Sequence(items) => {
                let mut authors: Vec<(i64, AuthorEntry)> = Vec::with_capacity(items.len());
                for entry in items {
                    let author = extract_author(entry);
                    let order = author
                        .order
                        .as_deref()
                        .and_then(|raw| raw.trim().parse::<i64>().ok())
                        .ok_or_else(|| ProquestError::MalformedAuthor {
                            id: self.id.clone(),
                            value: author.order.clone().unwrap_or_default(),
                        })?;
                    authors.push((order, author));
                }
                authors.sort_by_key(|(order, _)| *order);
                Ok(authors.into_iter().map(|(_, author)| author).collect())
            }
            single => Ok(vec![extract_author(single)]),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.get_article_title().unwrap_or_default();
        let short: String = title.chars().take(15).collect();
        write!(f, "Document(id={}, title='{}...')", self.id, short)
    }
}

fn extract_author(entry: &TreeValue) -> AuthorEntry {
    AuthorEntry {
        order: tree::get_string(entry, "@ContribOrder"),
        last_name: tree::get_string(entry, "Author/LastNameAtt/LastName"),
        first_name: tree::get_string(entry, "Author/FirstNameAtt/FirstName"),
        full_name: tree::get_string(entry, "Author/OriginalFormAtt/OriginalForm"),
    }
}

fn format_keys(node: &crate::tree::TreeNode, indent: &str, out: &mut String) {
    for (key, value) in node.iter() {
        out.push_str(indent);
        out.push_str(key);
        out.push('\n');
        if let TreeValue::Node(child) = value {
            let deeper = format!("{}  ", indent);
            format_keys(child, &deeper, out);
        }
    }
}
