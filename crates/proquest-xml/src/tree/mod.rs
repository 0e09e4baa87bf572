//! Record tree value model
//!
//! A parsed ProQuest document is an ordered tree of string keys. Every value
//! is one of three variants: a scalar string, a nested node, or a sequence of
//! values produced when an XML element repeats under the same parent. The
//! variant is fixed at parse time, so callers never have to probe whether a
//! contributor list is "really" a single entry.
//!
//! XML attributes are stored under `@`-prefixed keys and mixed element text
//! under the reserved `#text` key, matching the path syntax consumers use.

pub mod parser;
pub mod path;

pub use parser::parse_tree;
pub use path::{get, get_string, key_paths, search};

/// Reserved key for an element's own text when it also carries attributes
/// or child elements.
pub const TEXT_KEY: &str = "#text";

/// Prefix marking an XML attribute key.
pub const ATTRIBUTE_PREFIX: char = '@';

/// One value in a record tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeValue {
    /// Leaf text content.
    Scalar(String),
    /// Nested element with attributes and/or children.
    Node(TreeNode),
    /// Repeated sibling elements collapsed under one key.
    Sequence(Vec<TreeValue>),
}

impl TreeValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            TreeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&TreeNode> {
        match self {
            TreeValue::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[TreeValue]> {
        match self {
            TreeValue::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

/// An ordered mapping of keys to tree values.
///
/// Insertion order is the document order of the source XML; lookup is by
/// linear scan, which is fine at the fan-out of real export records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeNode {
    entries: Vec<(String, TreeValue)>,
}

impl TreeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&TreeValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TreeValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert a key, replacing any existing value.
    pub fn insert(&mut self, key: impl Into<String>, value: TreeValue) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Attach a child element parsed from the document.
    ///
    /// A repeated key collapses into a `Sequence`: the second occurrence
    /// converts the existing value into a two-element sequence, later
    /// occurrences append.
    pub fn push_child(&mut self, key: impl Into<String>, value: TreeValue) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(TreeValue::Sequence(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, TreeValue::Sequence(Vec::new()));
                if let TreeValue::Sequence(items) = existing {
                    items.push(first);
                    items.push(value);
                }
            }
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
