//! CSV-backed record streams

use super::{RecordSink, RecordStream};
use crate::types::{map_file_error, CsvDeltaError, Header, Record};
use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, Write};
use std::path::{Path, PathBuf};

/// Delimited-record dialect shared by every reader and writer of one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl CsvDialect {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        // Headers are read explicitly through `read_header`.
        builder
            .has_headers(false)
            .flexible(false)
            .delimiter(self.delimiter)
            .quote(self.quote);
        builder
    }

    fn writer_builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder
            .has_headers(false)
            .delimiter(self.delimiter)
            .quote(self.quote);
        builder
    }
}

/// Record reader over any `Read + Seek` source
///
/// A stream opened with [`CsvRecordStream::open`] owns its file and releases
/// it on [`close`](RecordStream::close). A stream built with
/// [`CsvRecordStream::from_reader`] over `&mut File` only drops the borrow;
/// the caller's handle stays open.
pub struct CsvRecordStream<R> {
    reader: Option<csv::Reader<R>>,
    buffer: csv::StringRecord,
    path: Option<PathBuf>,
    header_read: bool,
    records_read: u64,
}

impl CsvRecordStream<File> {
    /// Open `path` for reading
    pub fn open(path: &Path, dialect: &CsvDialect) -> Result<Self, CsvDeltaError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                CsvDeltaError::Config(format!("Source path does not exist: {}", path.display()))
            }
            _ => map_file_error(path, e),
        })?;
        let mut stream = Self::from_reader(file, dialect);
        stream.path = Some(path.to_path_buf());
        Ok(stream)
    }
}

impl<R: Read> CsvRecordStream<R> {
    pub fn from_reader(reader: R, dialect: &CsvDialect) -> Self {
        Self {
            reader: Some(dialect.reader_builder().from_reader(reader)),
            buffer: csv::StringRecord::new(),
            path: None,
            header_read: false,
            records_read: 0,
        }
    }

    /// Data records returned since the last rewind
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    fn read_raw(&mut self) -> Result<Option<Record>, CsvDeltaError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        match reader.read_record(&mut self.buffer) {
            Ok(true) => Ok(Some(Record::from(&self.buffer))),
            Ok(false) => Ok(None),
            Err(e) => Err(map_csv_error(self.path.as_deref(), e)),
        }
    }
}

impl<R: Read + Seek> RecordStream for CsvRecordStream<R> {
    fn read_header(&mut self) -> Result<Option<Header>, CsvDeltaError> {
        if self.header_read || self.records_read > 0 {
            return Err(CsvDeltaError::Config(
                "header must be read once, before any record".to_string(),
            ));
        }
        self.header_read = true;
        Ok(self.read_raw()?.map(Header::from))
    }

    fn next_record(&mut self) -> Result<Option<Record>, CsvDeltaError> {
        let record = self.read_raw()?;
        if record.is_some() {
            self.records_read += 1;
        }
        Ok(record)
    }

    fn rewind(&mut self) -> Result<(), CsvDeltaError> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| CsvDeltaError::Io(io::Error::other("stream is closed")))?;
        reader
            .seek(csv::Position::new())
            .map_err(|e| map_csv_error(self.path.as_deref(), e))?;
        self.header_read = false;
        self.records_read = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<(), CsvDeltaError> {
        self.reader = None;
        Ok(())
    }
}

/// Record writer over any `Write` target
pub struct CsvRecordSink<W: Write> {
    writer: Option<csv::Writer<W>>,
    path: Option<PathBuf>,
}

impl CsvRecordSink<File> {
    /// Create (or truncate) `path` for writing
    pub fn create(path: &Path, dialect: &CsvDialect) -> Result<Self, CsvDeltaError> {
        let file = File::create(path).map_err(|e| map_file_error(path, e))?;
        let mut sink = Self::from_writer(file, dialect);
        sink.path = Some(path.to_path_buf());
        Ok(sink)
    }
}

impl<W: Write> CsvRecordSink<W> {
    pub fn from_writer(writer: W, dialect: &CsvDialect) -> Self {
        Self {
            writer: Some(dialect.writer_builder().from_writer(writer)),
            path: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }
}

impl<W: Write> RecordSink for CsvRecordSink<W> {
    fn write_record(&mut self, record: &Record) -> Result<(), CsvDeltaError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| CsvDeltaError::Io(io::Error::other("sink is closed")))?;
        writer
            .write_record(record.fields())
            .map_err(|e| map_csv_error(self.path.as_deref(), e))
    }

    fn close(&mut self) -> Result<(), CsvDeltaError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| match self.path.as_deref() {
                Some(path) => map_file_error(path, e),
                None => CsvDeltaError::Io(e),
            })?;
        }
        Ok(())
    }
}

/// Read just the header row of the file at `path`
pub fn read_header_of(path: &Path, dialect: &CsvDialect) -> Result<Option<Header>, CsvDeltaError> {
    let mut stream = CsvRecordStream::open(path, dialect)?;
    let header = stream.read_header()?;
    stream.close()?;
    Ok(header)
}

fn map_csv_error(path: Option<&Path>, error: csv::Error) -> CsvDeltaError {
    match path {
        Some(path) if error.is_io_error() => match error.into_kind() {
            csv::ErrorKind::Io(io) => map_file_error(path, io),
            other => CsvDeltaError::Parse(format!("{:?}", other)),
        },
        _ => CsvDeltaError::from(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn stream(data: &str) -> CsvRecordStream<Cursor<Vec<u8>>> {
        CsvRecordStream::from_reader(Cursor::new(data.as_bytes().to_vec()), &CsvDialect::default())
    }

    #[test]
    fn test_reads_header_then_records() {
        let mut s = stream("id,name\n1,alice\n2,\"b, c\"\n");

        let header = s.read_header().unwrap().expect("header present");
        assert_eq!(header.columns(), &["id".to_string(), "name".to_string()]);
        assert_eq!(s.next_record().unwrap(), Some(Record::from(vec!["1", "alice"])));
        assert_eq!(s.next_record().unwrap(), Some(Record::from(vec!["2", "b, c"])));
        assert_eq!(s.next_record().unwrap(), None);
        assert_eq!(s.records_read(), 2);
    }

    #[test]
    fn test_empty_stream_has_no_header() {
        let mut s = stream("");
        assert_eq!(s.read_header().unwrap(), None);
        assert_eq!(s.next_record().unwrap(), None);
    }

    #[test]
    fn test_header_after_record_is_rejected() {
        let mut s = stream("a\n1\n");
        s.next_record().unwrap();
        let err = s.read_header().unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_rewind_restarts_from_header() {
        let mut s = stream("id\n1\n2\n");
        s.read_header().unwrap();
        s.next_record().unwrap();
        s.next_record().unwrap();

        s.rewind().unwrap();

        let header = s.read_header().unwrap().expect("header after rewind");
        assert_eq!(header.columns(), &["id".to_string()]);
        assert_eq!(s.next_record().unwrap(), Some(Record::from(vec!["1"])));
    }

    #[test]
    fn test_field_count_mismatch_is_data_shape_error() {
        let mut s = stream("id,name\n1\n");
        s.read_header().unwrap();
        let err = s.next_record().unwrap_err();
        assert!(err.is_data_shape_error(), "got {err:?}");
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut s = stream("id\n1\n");
        s.close().unwrap();
        s.close().unwrap();
        assert!(s.is_closed());
        assert_eq!(s.next_record().unwrap(), None);
        assert!(s.rewind().is_err());
    }

    #[test]
    fn test_borrowed_handle_survives_close() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "id\n1\n").expect("write input");
        let mut file = File::open(&path).expect("open input");

        {
            let mut s = CsvRecordStream::from_reader(&mut file, &CsvDialect::default());
            s.read_header().unwrap();
            s.close().unwrap();
        }

        // The caller's handle is still usable after the stream closed.
        file.rewind().expect("rewind caller handle");
        let mut content = String::new();
        file.read_to_string(&mut content).expect("read caller handle");
        assert_eq!(content, "id\n1\n");
    }

    #[test]
    fn test_open_missing_path_is_configuration_error() {
        let err = CsvRecordStream::open(Path::new("/nonexistent/input.csv"), &CsvDialect::default())
            .err()
            .expect("open should fail");
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_sink_round_trip_with_delimiter() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("out.tsv");
        let dialect = CsvDialect::with_delimiter(b'\t');

        let mut sink = CsvRecordSink::create(&path, &dialect).expect("create sink");
        sink.write_header(&Header::new(vec!["id".into(), "note".into()]))
            .unwrap();
        sink.write_record(&Record::from(vec!["1", "has, comma"])).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id\tnote\n1\thas, comma\n"
        );
        assert!(sink.write_record(&Record::from(vec!["2", "x"])).is_err());
    }

    #[test]
    fn test_read_header_of() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let header = read_header_of(&path, &CsvDialect::default())
            .unwrap()
            .expect("header");
        assert_eq!(header.index_of("b"), Some(1));
    }
}
