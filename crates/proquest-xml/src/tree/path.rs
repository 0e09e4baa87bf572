//! Path expressions over record trees
//!
//! A path is a slash-delimited sequence of segments: literal keys (including
//! `@`-prefixed attribute keys and the `#text` marker, which are ordinary keys
//! in the tree), numeric indices into sequences, or `*` wildcard patterns for
//! [`search`]. A leading slash is tolerated, so `/DFS/PubFrosting/Title` and
//! `DFS/PubFrosting/Title` address the same node.
//!
//! Resolution never errors: a path that does not resolve fully yields nothing,
//! and [`get`] never descends into a sequence without an explicit index.

use super::{TreeNode, TreeValue};

/// One parsed path segment.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Literal key match.
    Key(String),
    /// Explicit index into a sequence.
    Index(usize),
    /// Key pattern where `*` matches any substring.
    Pattern(String),
}

impl PathSegment {
    fn parse(raw: &str) -> Self {
        if raw.contains('*') {
            PathSegment::Pattern(raw.to_string())
        } else if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            // XML element names cannot start with a digit, so an all-digit
            // segment is unambiguous.
            PathSegment::Index(raw.parse().unwrap_or(0))
        } else {
            PathSegment::Key(raw.to_string())
        }
    }

    fn matches_key(&self, key: &str) -> bool {
        match self {
            PathSegment::Key(k) => k == key,
            PathSegment::Pattern(p) => wildcard_match(p, key),
            PathSegment::Index(_) => false,
        }
    }
}

/// Split a path expression into segments, ignoring empty segments from a
/// leading or doubled slash.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(PathSegment::parse)
        .collect()
}

/// Resolve a path against a tree value.
///
/// Returns `None` if any segment is absent at any depth. There are no partial
/// matches and no implicit sequence traversal; indexing a sequence requires a
/// numeric segment.
pub fn get<'a>(tree: &'a TreeValue, path: &str) -> Option<&'a TreeValue> {
    let mut current = tree;
    for segment in parse_path(path) {
        current = match (current, &segment) {
            (TreeValue::Node(node), PathSegment::Key(key)) => node.get(key)?,
            (TreeValue::Sequence(items), PathSegment::Index(i)) => items.get(*i)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve a path to a string value.
///
/// A scalar resolves to its text; a node resolves to its `#text` content when
/// present. Nodes without text and sequences yield `None`.
pub fn get_string(tree: &TreeValue, path: &str) -> Option<String> {
    match get(tree, path)? {
        TreeValue::Scalar(s) => Some(s.clone()),
        TreeValue::Node(node) => node
            .get(super::TEXT_KEY)
            .and_then(TreeValue::as_scalar)
            .map(str::to_string),
        TreeValue::Sequence(_) => None,
    }
}

/// Find all values matching a path pattern.
///
/// Segments may contain `*` wildcards matching any substring of a key, e.g.
/// `DFS/PubFrosting/*Title*`. Returns `(path, value)` pairs in tree order.
/// Never fails; no match yields an empty result.
pub fn search<'a>(tree: &'a TreeValue, pattern: &str) -> Vec<(String, &'a TreeValue)> {
    let segments = parse_path(pattern);
    let mut results = Vec::new();
    if segments.is_empty() {
        return results;
    }
    search_inner(tree, &segments, String::new(), &mut results);
    results
}

fn search_inner<'a>(
    value: &'a TreeValue,
    segments: &[PathSegment],
    prefix: String,
    results: &mut Vec<(String, &'a TreeValue)>,
) {
    let (segment, rest) = match segments.split_first() {
        Some(split) => split,
        None => return,
    };

    match value {
        TreeValue::Node(node) => {
            for (key, child) in node.iter() {
                if !segment.matches_key(key) {
                    continue;
                }
                let child_path = format!("{}/{}", prefix, key);
                if rest.is_empty() {
                    results.push((child_path, child));
                } else {
                    search_inner(child, rest, child_path, results);
                }
            }
        }
        TreeValue::Sequence(items) => {
            if let PathSegment::Index(i) = segment {
                if let Some(child) = items.get(*i) {
                    let child_path = format!("{}/{}", prefix, i);
                    if rest.is_empty() {
                        results.push((child_path, child));
                    } else {
                        search_inner(child, rest, child_path, results);
                    }
                }
            }
        }
        TreeValue::Scalar(_) => {}
    }
}

/// All key paths reachable through nested nodes, in tree order.
///
/// Sequences are not descended; their key path addresses the sequence itself,
/// mirroring how the whole-tree queries treat repeated elements.
pub fn key_paths(node: &TreeNode) -> Vec<String> {
    let mut paths = Vec::new();
    collect_key_paths(node, "", &mut paths);
    paths
}

fn collect_key_paths(node: &TreeNode, prefix: &str, paths: &mut Vec<String>) {
    for (key, value) in node.iter() {
        let path = format!("{}/{}", prefix, key);
        paths.push(path.clone());
        if let TreeValue::Node(child) = value {
            collect_key_paths(child, &path, paths);
        }
    }
}

/// Match a `*` wildcard pattern against a key, where `*` matches any
/// substring (including the empty one).
fn wildcard_match(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !key.starts_with(first) {
        return false;
    }
    let mut rest = &key[first.len()..];
    if rest.len() < last.len() || !rest.ends_with(last) {
        return false;
    }
    rest = &rest[..rest.len() - last.len()];

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    true
}
