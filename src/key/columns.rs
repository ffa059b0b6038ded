//! Key-column comparator

use super::RecordComparator;
use crate::types::{CsvDeltaError, Header, KeyedRecord, Side};
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;

/// A key column, by header name or by zero-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyColumn {
    Name(String),
    Index(usize),
}

impl KeyColumn {
    /// Parse a column spec: a header name, or a position when the input has no header
    pub fn parse(spec: &str, has_headers: bool) -> Result<Self, CsvDeltaError> {
        if has_headers {
            return Ok(KeyColumn::Name(spec.to_string()));
        }
        spec.trim().parse::<usize>().map(KeyColumn::Index).map_err(|_| {
            CsvDeltaError::Config(format!(
                "Key column '{}' must be a zero-based position when the input has no header",
                spec
            ))
        })
    }

    fn value<'a>(&self, row: &KeyedRecord<'a>) -> Option<&'a str> {
        match self {
            KeyColumn::Name(name) => row.get(name),
            KeyColumn::Index(index) => row.field(*index),
        }
    }
}

impl fmt::Display for KeyColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyColumn::Name(name) => f.write_str(name),
            KeyColumn::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// How key values are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// Byte-wise string order
    #[default]
    Text,
    /// Values parsed as `f64`; empty values sort first
    Numeric,
}

/// Orders records by a list of key columns, first column most significant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyComparator {
    columns: Vec<KeyColumn>,
    key_type: KeyType,
}

impl KeyComparator {
    pub fn new(columns: Vec<KeyColumn>, key_type: KeyType) -> Result<Self, CsvDeltaError> {
        if columns.is_empty() {
            return Err(CsvDeltaError::Config(
                "At least one key column is required".to_string(),
            ));
        }
        Ok(Self { columns, key_type })
    }

    /// Text comparator over named columns
    pub fn by_names<S: AsRef<str>>(names: &[S]) -> Result<Self, CsvDeltaError> {
        Self::new(
            names
                .iter()
                .map(|n| KeyColumn::Name(n.as_ref().to_string()))
                .collect(),
            KeyType::Text,
        )
    }

    pub fn columns(&self) -> &[KeyColumn] {
        &self.columns
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Check every named key column exists in `header`
    ///
    /// Positional keys are checked against the header width when one is present.
    pub fn validate(&self, header: &Header, side: Side) -> Result<(), CsvDeltaError> {
        for column in &self.columns {
            match column {
                KeyColumn::Name(name) if !header.contains(name) => {
                    return Err(CsvDeltaError::MissingColumn {
                        column: name.clone(),
                        side,
                    });
                }
                KeyColumn::Index(index) if !header.is_empty() && *index >= header.len() => {
                    return Err(CsvDeltaError::Config(format!(
                        "Key column #{} is out of range for the {} input ({} columns)",
                        index,
                        side,
                        header.len()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn compare_values(
        &self,
        column: &KeyColumn,
        a: Option<&str>,
        b: Option<&str>,
    ) -> Result<Ordering, CsvDeltaError> {
        match self.key_type {
            KeyType::Text => Ok(a.cmp(&b)),
            KeyType::Numeric => {
                let a = parse_numeric(column, a)?;
                let b = parse_numeric(column, b)?;
                Ok(match (a, b) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    (x, y) => x.is_some().cmp(&y.is_some()),
                })
            }
        }
    }
}

impl RecordComparator for KeyComparator {
    fn compare(&self, a: &KeyedRecord<'_>, b: &KeyedRecord<'_>) -> Result<Ordering, CsvDeltaError> {
        for column in &self.columns {
            let ordering = self.compare_values(column, column.value(a), column.value(b))?;
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
        }
        Ok(Ordering::Equal)
    }
}

fn parse_numeric(column: &KeyColumn, value: Option<&str>) -> Result<Option<f64>, CsvDeltaError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<f64>().map(Some).map_err(|_| {
            CsvDeltaError::Comparator(format!(
                "key column {} has non-numeric value '{}'",
                column, text
            ))
        }),
    }
}
