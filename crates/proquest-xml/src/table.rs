//! Tabular collection of flat records
//!
//! A [`Table`] is an ordered batch of [`FlatRecord`]s with a fixed column
//! set: the union of every row's columns in first-seen order, null-filled
//! where a row lacks a column. Tables export to CSV and JSON lines for
//! downstream analysis tools.

use std::io::Write;

use crate::error::Result;
use crate::record::{FieldValue, FlatRecord};

#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<FlatRecord>,
}

impl Table {
    /// Build a table from records, taking the union of their columns in
    /// first-seen order.
    pub fn from_records(rows: Vec<FlatRecord>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for name in row.columns() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.to_string());
                }
            }
        }
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FlatRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value at a row/column, null when the row lacks the column.
    pub fn cell(&self, row: usize, column: &str) -> &FieldValue {
        static NULL: FieldValue = FieldValue::Null;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// New table keeping only the rows the predicate accepts, in order.
    pub fn filtered(&self, predicate: impl Fn(&FlatRecord) -> bool) -> Table {
        let rows: Vec<FlatRecord> = self.rows.iter().filter(|r| predicate(r)).cloned().collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Write the table as CSV, header row first.
    ///
    /// Scalar cells render as their text, dates as `YYYY-MM-DD`, nulls as
    /// empty fields, and list/author cells as embedded JSON.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.columns)?;
        for (index, _) in self.rows.iter().enumerate() {
            let cells = self
                .columns
                .iter()
                .map(|column| csv_field(self.cell(index, column)))
                .collect::<Result<Vec<String>>>()?;
            csv_writer.write_record(&cells)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the table as JSON lines, one record object per row.
    pub fn write_json_lines<W: Write>(&self, mut writer: W) -> Result<()> {
        for row in &self.rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

fn csv_field(value: &FieldValue) -> Result<String> {
    Ok(match value {
        FieldValue::Null => String::new(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        FieldValue::List(_) | FieldValue::Authors(_) => serde_json::to_string(value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::AuthorEntry;
    use chrono::NaiveDate;

    fn row(pairs: &[(&str, FieldValue)]) -> FlatRecord {
        let mut record = FlatRecord::new();
        for (name, value) in pairs {
            record.insert(*name, value.clone());
        }
        record
    }

    #[test]
    fn test_union_columns_first_seen_order() {
        let table = Table::from_records(vec![
            row(&[
                ("id", FieldValue::Text("1".into())),
                ("title", FieldValue::Text("a".into())),
            ]),
            row(&[
                ("id", FieldValue::Text("2".into())),
                ("extra", FieldValue::Text("x".into())),
            ]),
        ]);
        assert_eq!(table.columns(), &["id", "title", "extra"]);
        assert_eq!(table.cell(1, "title"), &FieldValue::Null);
        assert_eq!(table.cell(1, "extra"), &FieldValue::Text("x".into()));
    }

    #[test]
    fn test_csv_export() {
        let table = Table::from_records(vec![row(&[
            ("id", FieldValue::Text("1".into())),
            (
                "date_published",
                FieldValue::Date(NaiveDate::from_ymd_opt(2019, 7, 4).unwrap()),
            ),
            ("note", FieldValue::Null),
        ])]);
        let csv = table.to_csv_string().unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,date_published,note"));
        assert_eq!(lines.next(), Some("1,2019-07-04,"));
    }

    #[test]
    fn test_csv_embeds_authors_as_json() {
        let authors = vec![AuthorEntry {
            order: Some("2".into()),
            last_name: Some("Doe".into()),
            first_name: Some("Jane".into()),
            full_name: None,
        }];
        let table = Table::from_records(vec![row(&[
            ("id", FieldValue::Text("1".into())),
            ("other_authors", FieldValue::Authors(authors)),
        ])]);
        let csv = table.to_csv_string().unwrap();
        assert!(csv.contains("last_name"));
        assert!(csv.contains("Doe"));
    }

    #[test]
    fn test_filtered_preserves_order() {
        let table = Table::from_records(vec![
            row(&[("id", FieldValue::Text("1".into()))]),
            row(&[("id", FieldValue::Text("2".into()))]),
            row(&[("id", FieldValue::Text("3".into()))]),
        ]);
        let kept = table.filtered(|r| r.get("id").and_then(FieldValue::as_text) != Some("2"));
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.rows()[0].get("id"), Some(&FieldValue::Text("1".into())));
        assert_eq!(kept.rows()[1].get("id"), Some(&FieldValue::Text("3".into())));
    }

    #[test]
    fn test_json_lines_export() {
        let table = Table::from_records(vec![
            row(&[("id", FieldValue::Text("1".into()))]),
            row(&[("id", FieldValue::Text("2".into()))]),
        ]);
        let mut buf = Vec::new();
        table.write_json_lines(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"id":"1"}"#);
    }
}
