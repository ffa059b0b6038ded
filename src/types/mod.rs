//! Core type definitions for csvdelta

mod error;
mod event;
mod record;

pub use error::{map_file_error, CsvDeltaError, Side};
pub use event::{ChangeEvent, ChangeKind};
pub use record::{Header, KeyedRecord, Record, UTF8_BOM};
