// src/models/record.rs

//! Normalized records and the per-batch aggregate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::{AuthorId, SourceField};

/// One entry of a record: column name to value, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(Map<String, Value>);

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text column.
    pub fn with_text(mut self, column: &str, value: impl Into<String>) -> Self {
        self.0.insert(column.to_string(), Value::String(value.into()));
        self
    }

    /// Append a numeric column, keeping the raw text when it is not a number.
    pub fn with_number(mut self, column: &str, raw: &str) -> Self {
        self.0.insert(column.to_string(), parse_number(raw));
        self
    }

    pub fn insert(&mut self, column: &str, value: Value) {
        self.0.insert(column.to_string(), value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Column value rendered as plain text; `None` when the column is absent.
    pub fn text(&self, column: &str) -> Option<String> {
        self.0.get(column).map(value_to_text)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only the listed columns, preserving entry order.
    fn retain_columns(&mut self, keep: &[String]) {
        self.0.retain(|column, _| keep.iter().any(|k| k == column));
    }
}

/// Render a JSON value the way a spreadsheet cell shows it.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Portal counts are integers; `.`, `,` and spaces only group digits.
fn parse_number(raw: &str) -> Value {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | ' '))
        .collect();
    match cleaned.parse::<i64>() {
        Ok(n) if !cleaned.is_empty() => Value::from(n),
        _ => Value::String(raw.trim().to_string()),
    }
}

/// The ordered entries one source returned for one author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Vec<Entry>);

impl Record {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self(entries)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, entry: Entry) {
        self.0.push(entry);
    }

    /// Union of entry columns in first-seen order.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for entry in &self.0 {
            for column in entry.columns() {
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }
        }
        columns
    }

    /// Restrict every entry to the selected columns.
    pub fn project(&mut self, columns: &ColumnSelection) {
        if let ColumnSelection::Only(keep) = columns {
            for entry in &mut self.0 {
                entry.retain_columns(keep);
            }
        }
    }
}

impl FromIterator<Entry> for Record {
    fn from_iter<T: IntoIterator<Item = Entry>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Which entry columns to keep after fetching.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSelection {
    #[default]
    All,
    Only(Vec<String>),
}

impl ColumnSelection {
    /// Parse names such as `["title", "year"]`; `*` or nothing keeps all.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keep: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name == "*" {
                return ColumnSelection::All;
            }
            if !name.is_empty() && !keep.iter().any(|k| k == name) {
                keep.push(name.to_string());
            }
        }
        if keep.is_empty() {
            ColumnSelection::All
        } else {
            ColumnSelection::Only(keep)
        }
    }
}

/// Everything fetched for one author, keyed by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorBundle {
    pub author: AuthorId,
    pub records: BTreeMap<SourceField, Record>,
}

impl AuthorBundle {
    pub fn new(author: AuthorId) -> Self {
        Self {
            author,
            records: BTreeMap::new(),
        }
    }

    /// Store a record unless the field is already present.
    ///
    /// Returns `false` when the field was already written.
    pub fn insert(&mut self, field: SourceField, record: Record) -> bool {
        if self.records.contains_key(&field) {
            return false;
        }
        self.records.insert(field, record);
        true
    }

    pub fn get(&self, field: SourceField) -> Option<&Record> {
        self.records.get(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = SourceField> + '_ {
        self.records.keys().copied()
    }

    /// Display name from the profile record, when one was fetched.
    pub fn display_name(&self) -> Option<String> {
        self.records
            .get(&SourceField::Profile)?
            .entries()
            .first()?
            .text("name")
            .filter(|name| !name.trim().is_empty())
    }
}

/// Broad class of a per-cell failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Transport,
    Parse,
    NotFound,
    Session,
    Other,
}

impl FailureKind {
    pub fn classify(error: &AppError) -> Self {
        match error.root() {
            AppError::Timeout { .. } => FailureKind::Timeout,
            AppError::Http(_) | AppError::Status { .. } | AppError::Io(_) => {
                FailureKind::Transport
            }
            AppError::Parse { .. } | AppError::Selector { .. } | AppError::Json(_) => {
                FailureKind::Parse
            }
            AppError::AuthorNotFound(_) => FailureKind::NotFound,
            AppError::SessionExpired | AppError::Authentication(_) => FailureKind::Session,
            _ => FailureKind::Other,
        }
    }
}

/// One (author, field) fetch that failed and was replaced by an empty record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub author: AuthorId,
    pub field: SourceField,
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(author: AuthorId, field: SourceField, error: &AppError) -> Self {
        Self {
            author,
            field,
            kind: FailureKind::classify(error),
            message: error.root().to_string(),
        }
    }
}

/// Result of one batch: a bundle for every requested author plus failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Bundles in normalized request order.
    pub authors: Vec<AuthorBundle>,
    pub failures: Vec<FetchFailure>,
}

impl AggregateResult {
    pub fn get(&self, author: &str) -> Option<&AuthorBundle> {
        self.authors.iter().find(|b| b.author.as_str() == author)
    }

    pub fn author_ids(&self) -> impl Iterator<Item = &AuthorId> {
        self.authors.iter().map(|b| &b.author)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of (author, field) cells that were fetched successfully.
    pub fn successful_cells(&self) -> usize {
        let total: usize = self.authors.iter().map(|b| b.records.len()).sum();
        total.saturating_sub(self.failures.len())
    }

    pub fn failures_for(&self, author: &AuthorId) -> impl Iterator<Item = &FetchFailure> {
        self.failures.iter().filter(move |f| &f.author == author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AuthorId {
        AuthorId::new(s).unwrap()
    }

    #[test]
    fn test_entry_keeps_column_order() {
        let entry = Entry::new()
            .with_text("title", "A")
            .with_text("journal", "J")
            .with_number("citations", "12");
        let columns: Vec<&str> = entry.columns().collect();
        assert_eq!(columns, vec!["title", "journal", "citations"]);
        assert_eq!(entry.get("citations"), Some(&Value::from(12)));
    }

    #[test]
    fn test_with_number_keeps_raw_text_when_not_numeric() {
        let entry = Entry::new()
            .with_number("fund", "Rp 15.000.000")
            .with_number("citations", "")
            .with_number("total", "1,250");
        assert_eq!(entry.text("fund").unwrap(), "Rp 15.000.000");
        assert_eq!(entry.text("citations").unwrap(), "");
        assert_eq!(entry.get("total"), Some(&Value::from(1250)));
    }

    #[test]
    fn test_record_columns_union_first_seen() {
        let record = Record::new(vec![
            Entry::new().with_text("title", "A").with_text("year", "2020"),
            Entry::new().with_text("title", "B").with_text("doi", "10.1/x"),
        ]);
        assert_eq!(record.columns(), vec!["title", "year", "doi"]);
    }

    #[test]
    fn test_project_keeps_selected_columns() {
        let mut record = Record::new(vec![
            Entry::new()
                .with_text("title", "A")
                .with_text("year", "2020")
                .with_text("url", "u"),
        ]);
        record.project(&ColumnSelection::from_names(["url", "title", "nope"]));
        let columns: Vec<&str> = record.entries()[0].columns().collect();
        assert_eq!(columns, vec!["title", "url"]);
    }

    #[test]
    fn test_column_selection_wildcard() {
        assert_eq!(ColumnSelection::from_names(["*"]), ColumnSelection::All);
        assert_eq!(
            ColumnSelection::from_names(Vec::<String>::new()),
            ColumnSelection::All
        );
    }

    #[test]
    fn test_bundle_never_overwrites() {
        let mut bundle = AuthorBundle::new(id("1"));
        let first = Record::new(vec![Entry::new().with_text("title", "first")]);
        assert!(bundle.insert(SourceField::Book, first.clone()));
        assert!(!bundle.insert(SourceField::Book, Record::empty()));
        assert_eq!(bundle.get(SourceField::Book), Some(&first));
    }

    #[test]
    fn test_display_name_from_profile() {
        let mut bundle = AuthorBundle::new(id("1"));
        assert_eq!(bundle.display_name(), None);
        bundle.insert(
            SourceField::Profile,
            Record::new(vec![Entry::new().with_text("name", "Budi Santoso")]),
        );
        assert_eq!(bundle.display_name().as_deref(), Some("Budi Santoso"));
    }

    #[test]
    fn test_failure_kind_classification() {
        let timeout = AppError::source_fetch(
            SourceField::Wos,
            AppError::Timeout {
                url: "https://x".into(),
            },
        );
        assert_eq!(FailureKind::classify(&timeout), FailureKind::Timeout);
        let parse = AppError::parse("page", "bad");
        assert_eq!(FailureKind::classify(&parse), FailureKind::Parse);

        let failure = FetchFailure::new(id("9"), SourceField::Wos, &timeout);
        assert_eq!(failure.message, "Request timed out: https://x");
    }

    #[test]
    fn test_successful_cells() {
        let mut bundle = AuthorBundle::new(id("1"));
        bundle.insert(SourceField::Book, Record::empty());
        bundle.insert(SourceField::Ipr, Record::empty());
        let result = AggregateResult {
            authors: vec![bundle],
            failures: vec![FetchFailure {
                author: id("1"),
                field: SourceField::Ipr,
                kind: FailureKind::Parse,
                message: "bad".into(),
            }],
        };
        assert_eq!(result.successful_cells(), 1);
        assert!(!result.is_complete());
        assert!(result.get("1").is_some());
        assert!(result.get("2").is_none());
    }
}
