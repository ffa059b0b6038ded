//! # csvdelta - External sort and key-based diff for large CSV files
//!
//! Two engines share one comparator contract:
//!
//! - [`sort`]: bounded-memory external merge sort of a delimited file
//! - [`diff`]: merge-join of two key-sorted files into create / update /
//!   delete events, the primary input being authoritative
//!
//! Delimited syntax is read and written through the [`stream`] traits, so the
//! engines can also run over in-memory rows.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod key;
pub mod sort;
pub mod stream;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use diff::{compare, ChangeStream, DiffSummary};
pub use key::{KeyComparator, RecordComparator};
pub use sort::{ExternalSorter, SortOptions, SortStats};
pub use types::{ChangeEvent, CsvDeltaError, Header, KeyedRecord, Record};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
