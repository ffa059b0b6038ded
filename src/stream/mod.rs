//! Record streams - sequential read/write of delimited records
//!
//! Syntax (quoting, escaping) is handled by the `csv` crate; the engines only
//! see [`RecordStream`] and [`RecordSink`].

mod csv_stream;
mod memory;

pub use csv_stream::{read_header_of, CsvDialect, CsvRecordSink, CsvRecordStream};
pub use memory::{MemoryRecordSink, MemoryRecordStream};

use crate::types::{CsvDeltaError, Header, Record};

/// Sequential reader of records
pub trait RecordStream {
    /// Read the header row
    ///
    /// Must be called before any [`next_record`](Self::next_record) of the
    /// current pass. Returns `None` for a completely empty stream.
    fn read_header(&mut self) -> Result<Option<Header>, CsvDeltaError>;

    /// Next record, or `None` at end of stream
    fn next_record(&mut self) -> Result<Option<Record>, CsvDeltaError>;

    /// Reset the read position to the start of the stream
    fn rewind(&mut self) -> Result<(), CsvDeltaError>;

    /// Release the stream. Idempotent.
    fn close(&mut self) -> Result<(), CsvDeltaError>;
}

/// Sequential writer of records
pub trait RecordSink {
    fn write_record(&mut self, record: &Record) -> Result<(), CsvDeltaError>;

    fn write_header(&mut self, header: &Header) -> Result<(), CsvDeltaError> {
        self.write_record(&header.to_record())
    }

    /// Flush and release the sink. Idempotent.
    fn close(&mut self) -> Result<(), CsvDeltaError>;
}

impl<S: RecordStream + ?Sized> RecordStream for &mut S {
    fn read_header(&mut self) -> Result<Option<Header>, CsvDeltaError> {
        (**self).read_header()
    }

    fn next_record(&mut self) -> Result<Option<Record>, CsvDeltaError> {
        (**self).next_record()
    }

    fn rewind(&mut self) -> Result<(), CsvDeltaError> {
        (**self).rewind()
    }

    fn close(&mut self) -> Result<(), CsvDeltaError> {
        (**self).close()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_record(&mut self, record: &Record) -> Result<(), CsvDeltaError> {
        (**self).write_record(record)
    }

    fn write_header(&mut self, header: &Header) -> Result<(), CsvDeltaError> {
        (**self).write_header(header)
    }

    fn close(&mut self) -> Result<(), CsvDeltaError> {
        (**self).close()
    }
}
