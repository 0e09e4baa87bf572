//! Flattening documents into tabular records
//!
//! One [`Document`] becomes one [`FlatRecord`]: a single-level, ordered
//! mapping of column names to cell values. Batches of records collect into a
//! [`Table`](crate::table::Table).

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::document::{AuthorEntry, Document};
use crate::error::{ProquestError, Result};
use crate::table::Table;
use crate::tree::TreeValue;

/// Format of `Obj/NumericDate`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One cell of a flat record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    Date(NaiveDate),
    List(Vec<String>),
    Authors(Vec<AuthorEntry>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn from_opt_text(value: Option<String>) -> Self {
        match value {
            Some(s) => FieldValue::Text(s),
            None => FieldValue::Null,
        }
    }

    /// Best-effort conversion from a resolved tree value: scalars become
    /// text, sequences of scalars become lists, nested nodes have no flat
    /// representation.
    fn from_tree(value: Option<&TreeValue>) -> Self {
        match value {
            Some(TreeValue::Scalar(s)) => FieldValue::Text(s.clone()),
            Some(TreeValue::Sequence(items)) => FieldValue::List(
                items
                    .iter()
                    .filter_map(|item| item.as_scalar().map(str::to_string))
                    .collect(),
            ),
            Some(TreeValue::Node(_)) | None => FieldValue::Null,
        }
    }
}

/// An extra column requested by the caller: either a path resolved against
/// the document, or a closure deriving the value from it.
pub enum ExtraField {
    Path(String),
    Derive(Box<dyn Fn(&Document) -> FieldValue>),
}

impl ExtraField {
    pub fn path(path: impl Into<String>) -> Self {
        ExtraField::Path(path.into())
    }

    pub fn derive(f: impl Fn(&Document) -> FieldValue + 'static) -> Self {
        ExtraField::Derive(Box::new(f))
    }

    fn resolve(&self, document: &Document) -> FieldValue {
        match self {
            ExtraField::Path(path) => FieldValue::from_tree(document.get(path)),
            ExtraField::Derive(f) => f(document),
        }
    }
}

/// One flattened document: ordered column name to cell value pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatRecord {
    fields: Vec<(String, FieldValue)>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any existing value but keeping its position.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Flatten one document into a record.
///
/// Required columns come first, in fixed order: `id`, `title`,
/// `date_published`, `publication`, the first author's three name fields,
/// `other_authors`, `article_type`, `text`. Extra fields follow in caller
/// order. A document with no authors is a [`ProquestError::NoAuthor`]; an
/// unparseable `Obj/NumericDate` flattens to null.
pub fn to_record(document: &Document, extra_fields: &[(String, ExtraField)]) -> Result<FlatRecord> {
    let authors = document.get_authors()?;
    let (first_author, other_authors) =
        authors.split_first().ok_or_else(|| ProquestError::NoAuthor {
            id: document.id().to_string(),
        })?;

    let date_published = document
        .get_string("Obj/NumericDate")
        .and_then(|raw| NaiveDate::parse_from_str(&raw, DATE_FORMAT).ok())
        .map(FieldValue::Date)
        .unwrap_or(FieldValue::Null);

    let mut record = FlatRecord::new();
    record.insert("id", FieldValue::Text(document.id().to_string()));
    record.insert(
        "title",
        FieldValue::from_opt_text(document.get_article_title()),
    );
    record.insert("date_published", date_published);
    record.insert(
        "publication",
        FieldValue::from_opt_text(document.get_string("DFS/PubFrosting/Title")),
    );
    record.insert(
        "author1_last_name",
        FieldValue::from_opt_text(first_author.last_name.clone()),
    );
    record.insert(
        "author1_first_name",
        FieldValue::from_opt_text(first_author.first_name.clone()),
    );
    record.insert(
        "author1_full_name",
        FieldValue::from_opt_text(first_author.full_name.clone()),
    );
    record.insert("other_authors", FieldValue::Authors(other_authors.to_vec()));
    record.insert(
        "article_type",
        FieldValue::from_opt_text(document.get_string("Obj/ObjectTypes/mstar")),
    );
    record.insert("text", FieldValue::from_opt_text(document.get_text(true)));

    for (name, field) in extra_fields {
        record.insert(name.clone(), field.resolve(document));
    }

    Ok(record)
}

/// Flatten a batch of documents into a table, preserving input order.
///
/// Fails on the first document that cannot be flattened; see
/// [`create_table_lenient`] for the skip-and-report alternative.
pub fn create_table(
    documents: &[Document],
    extra_fields: &[(String, ExtraField)],
) -> Result<Table> {
    let records = documents
        .iter()
        .map(|doc| to_record(doc, extra_fields))
        .collect::<Result<Vec<_>>>()?;
    Ok(Table::from_records(records))
}

/// Flatten a batch of documents, skipping and logging the ones that fail.
///
/// Returns the table of surviving rows (input order preserved) together with
/// the index and error of every skipped document.
pub fn create_table_lenient(
    documents: &[Document],
    extra_fields: &[(String, ExtraField)],
) -> (Table, Vec<(usize, ProquestError)>) {
    let mut records = Vec::with_capacity(documents.len());
    let mut failures = Vec::new();
    for (index, doc) in documents.iter().enumerate() {
        match to_record(doc, extra_fields) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(id = doc.id(), index, error = %err, "skipping document");
                failures.push((index, err));
            }
        }
    }
    (Table::from_records(records), failures)
}
