//! Record, Header and the KeyedRecord view handed to comparators

use serde::Serialize;
use std::collections::HashMap;

/// UTF-8 byte-order mark as it appears at the start of a decoded header cell
pub const UTF8_BOM: char = '\u{feff}';

/// One data row: ordered text field values
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Create a record from owned field values
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Field value at `index`, if present
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

impl From<Vec<&str>> for Record {
    fn from(fields: Vec<&str>) -> Self {
        Self::new(fields.into_iter().map(str::to_string).collect())
    }
}

impl From<&csv::StringRecord> for Record {
    fn from(record: &csv::StringRecord) -> Self {
        Self::new(record.iter().map(str::to_string).collect())
    }
}

/// Column names of a stream plus a name-to-index map built once
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    /// Build a header; the first occurrence of a duplicated name wins lookups
    pub fn new(columns: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }
        Self { columns, index }
    }

    /// An empty header, used for streams read without headers
    pub fn empty() -> Self {
        Self::default()
    }

    /// Strip a UTF-8 byte-order mark from the first column name
    pub fn strip_bom(self) -> Self {
        match self.columns.first() {
            Some(first) if first.starts_with(UTF8_BOM) => {
                let mut columns = self.columns;
                columns[0] = columns[0].trim_start_matches(UTF8_BOM).to_string();
                Self::new(columns)
            }
            _ => self,
        }
    }

    /// Position of the column called `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The header as a writable record
    pub fn to_record(&self) -> Record {
        Record::new(self.columns.clone())
    }

    /// Re-order `record` (laid out by `from`) into this header's layout
    ///
    /// Columns missing from `from` become empty strings.
    pub fn project(&self, record: &Record, from: &Header) -> Record {
        let fields = self
            .columns
            .iter()
            .map(|name| {
                from.index_of(name)
                    .and_then(|i| record.get(i))
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();
        Record::new(fields)
    }
}

impl From<Record> for Header {
    fn from(record: Record) -> Self {
        Self::new(record.into_fields())
    }
}

/// A record viewed through its stream's header
///
/// Transient: built per comparison, never stored.
#[derive(Debug, Clone, Copy)]
pub struct KeyedRecord<'a> {
    header: &'a Header,
    record: &'a Record,
}

impl<'a> KeyedRecord<'a> {
    pub fn new(header: &'a Header, record: &'a Record) -> Self {
        Self { header, record }
    }

    /// Value of the column called `name`
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.header
            .index_of(name)
            .and_then(|index| self.record.get(index))
    }

    /// Value at position `index`
    pub fn field(&self, index: usize) -> Option<&'a str> {
        self.record.get(index)
    }

    pub fn record(&self) -> &'a Record {
        self.record
    }

    pub fn header(&self) -> &'a Header {
        self.header
    }
}
