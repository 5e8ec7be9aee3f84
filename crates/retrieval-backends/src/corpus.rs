//! Companion corpus for locally built vector indexes.

use std::io::BufRead;

use serde_json::{Map, Value};

use retrieval_core::Result;

/// An in-memory corpus of JSON rows, addressed by position.
///
/// Rows are arbitrary JSON objects; the dense adapter reads its id and
/// content fields out of them by name.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    rows: Vec<Map<String, Value>>,
}

impl Corpus {
    /// Wrap existing rows.
    pub fn new(rows: Vec<Map<String, Value>>) -> Self {
        Self { rows }
    }

    /// Load a corpus from JSON-lines content, one object per line.
    ///
    /// Blank lines are skipped.
    pub fn from_json_lines(reader: impl BufRead) -> Result<Self> {
        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row: Map<String, Value> = serde_json::from_str(&line)?;
            rows.push(row);
        }
        Ok(Self { rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the corpus has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The raw value of `field` in row `row`, if present.
    pub fn field(&self, row: usize, field: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(field))
    }

    /// The value of `field` in row `row`, rendered as text.
    ///
    /// String values come back verbatim; other scalars render through
    /// their JSON form; null and missing fields are `None`.
    pub fn string_field(&self, row: usize, field: &str) -> Option<String> {
        self.field(row, field).and_then(value_as_text)
    }
}

/// Render a JSON value as passage text.
pub(crate) fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
