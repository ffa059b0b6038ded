//! In-memory record streams for tests and small inputs

use super::{RecordSink, RecordStream};
use crate::types::{CsvDeltaError, Header, Record};
use std::io;

/// Reader over rows held in memory; the first row is the header
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStream {
    rows: Vec<Record>,
    position: usize,
    header_read: bool,
    closed: bool,
}

impl MemoryRecordStream {
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Build from string slices, header row first
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| Record::from(row.to_vec()))
                .collect(),
        )
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl RecordStream for MemoryRecordStream {
    fn read_header(&mut self) -> Result<Option<Header>, CsvDeltaError> {
        if self.header_read || self.position > 0 {
            return Err(CsvDeltaError::Config(
                "header must be read once, before any record".to_string(),
            ));
        }
        self.header_read = true;
        Ok(self.next_row().map(Header::from))
    }

    fn next_record(&mut self) -> Result<Option<Record>, CsvDeltaError> {
        Ok(self.next_row())
    }

    fn rewind(&mut self) -> Result<(), CsvDeltaError> {
        if self.closed {
            return Err(CsvDeltaError::Io(io::Error::other("stream is closed")));
        }
        self.position = 0;
        self.header_read = false;
        Ok(())
    }

    fn close(&mut self) -> Result<(), CsvDeltaError> {
        self.closed = true;
        Ok(())
    }
}

impl MemoryRecordStream {
    fn next_row(&mut self) -> Option<Record> {
        if self.closed {
            return None;
        }
        let row = self.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        row
    }
}

/// Writer collecting rows in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSink {
    rows: Vec<Record>,
    closed: bool,
}

impl MemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl RecordSink for MemoryRecordSink {
    fn write_record(&mut self, record: &Record) -> Result<(), CsvDeltaError> {
        if self.closed {
            return Err(CsvDeltaError::Io(io::Error::other("sink is closed")));
        }
        self.rows.push(record.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), CsvDeltaError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_stream_reads_header_and_rows() {
        let mut s = MemoryRecordStream::from_rows(&[&["id"], &["1"], &["2"]]);

        assert_eq!(s.read_header().unwrap().map(|h| h.len()), Some(1));
        assert_eq!(s.next_record().unwrap(), Some(Record::from(vec!["1"])));
        assert_eq!(s.next_record().unwrap(), Some(Record::from(vec!["2"])));
        assert_eq!(s.next_record().unwrap(), None);
    }

    #[test]
    fn test_memory_stream_rewind_and_close() {
        let mut s = MemoryRecordStream::from_rows(&[&["id"], &["1"]]);
        s.read_header().unwrap();
        s.next_record().unwrap();
        s.rewind().unwrap();
        assert!(s.read_header().unwrap().is_some());

        s.close().unwrap();
        s.close().unwrap();
        assert!(s.is_closed());
        assert_eq!(s.next_record().unwrap(), None);
    }

    #[test]
    fn test_memory_sink_collects_rows() {
        let mut sink = MemoryRecordSink::new();
        sink.write_header(&Header::new(vec!["id".to_string()])).unwrap();
        sink.write_record(&Record::from(vec!["9"])).unwrap();
        sink.close().unwrap();

        assert_eq!(sink.rows().len(), 2);
        assert!(sink.write_record(&Record::from(vec!["10"])).is_err());
    }
}
