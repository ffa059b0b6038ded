//! Temporary run storage for the external sort

use crate::stream::{
    CsvDialect, CsvRecordSink, CsvRecordStream, MemoryRecordSink, MemoryRecordStream, RecordSink,
    RecordStream,
};
use crate::types::{map_file_error, CsvDeltaError, Record};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Phase that produced a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunPhase {
    /// Sorted batch written during partitioning
    Part,
    /// Output of a two-way merge
    Merge,
}

/// Identifier of one run: phase plus a zero-based counter per phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId {
    pub phase: RunPhase,
    pub seq: usize,
}

impl RunId {
    pub fn part(seq: usize) -> Self {
        Self {
            phase: RunPhase::Part,
            seq,
        }
    }

    pub fn merge(seq: usize) -> Self {
        Self {
            phase: RunPhase::Merge,
            seq,
        }
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            RunPhase::Part => write!(f, "part.{}", self.seq),
            RunPhase::Merge => write!(f, "merge.{}", self.seq),
        }
    }
}

/// Arena of named runs owned by a single sort call
pub trait RunStore {
    type Reader: RecordStream;
    type Writer: RecordSink;

    /// Start writing a new run
    fn create_run(&mut self, id: RunId) -> Result<Self::Writer, CsvDeltaError>;

    /// Close a writer obtained from [`create_run`](Self::create_run)
    fn finish_run(&mut self, id: RunId, writer: Self::Writer) -> Result<(), CsvDeltaError>;

    fn open_run(&mut self, id: RunId) -> Result<Self::Reader, CsvDeltaError>;

    fn remove_run(&mut self, id: RunId) -> Result<(), CsvDeltaError>;

    /// Move the final run into place as the sort output
    fn persist_run(&mut self, id: RunId) -> Result<(), CsvDeltaError>;
}

impl<S: RunStore + ?Sized> RunStore for &mut S {
    type Reader = S::Reader;
    type Writer = S::Writer;

    fn create_run(&mut self, id: RunId) -> Result<Self::Writer, CsvDeltaError> {
        (**self).create_run(id)
    }

    fn finish_run(&mut self, id: RunId, writer: Self::Writer) -> Result<(), CsvDeltaError> {
        (**self).finish_run(id, writer)
    }

    fn open_run(&mut self, id: RunId) -> Result<Self::Reader, CsvDeltaError> {
        (**self).open_run(id)
    }

    fn remove_run(&mut self, id: RunId) -> Result<(), CsvDeltaError> {
        (**self).remove_run(id)
    }

    fn persist_run(&mut self, id: RunId) -> Result<(), CsvDeltaError> {
        (**self).persist_run(id)
    }
}

/// Runs stored as files next to the destination: `<destination>.part.<n>`,
/// `<destination>.merge.<n>`
#[derive(Debug, Clone)]
pub struct FsRunStore {
    destination: PathBuf,
    dialect: CsvDialect,
}

impl FsRunStore {
    pub fn new(destination: &Path, dialect: CsvDialect) -> Self {
        Self {
            destination: destination.to_path_buf(),
            dialect,
        }
    }

    /// File backing run `id`
    pub fn run_path(&self, id: RunId) -> PathBuf {
        sibling_path(&self.destination, &id.to_string())
    }
}

impl RunStore for FsRunStore {
    type Reader = CsvRecordStream<File>;
    type Writer = CsvRecordSink<File>;

    fn create_run(&mut self, id: RunId) -> Result<Self::Writer, CsvDeltaError> {
        CsvRecordSink::create(&self.run_path(id), &self.dialect)
    }

    fn finish_run(&mut self, _id: RunId, mut writer: Self::Writer) -> Result<(), CsvDeltaError> {
        writer.close()
    }

    fn open_run(&mut self, id: RunId) -> Result<Self::Reader, CsvDeltaError> {
        let path = self.run_path(id);
        let file = File::open(&path).map_err(|e| map_file_error(&path, e))?;
        Ok(CsvRecordStream::from_reader(file, &self.dialect))
    }

    fn remove_run(&mut self, id: RunId) -> Result<(), CsvDeltaError> {
        let path = self.run_path(id);
        fs::remove_file(&path).map_err(|e| map_file_error(&path, e))
    }

    fn persist_run(&mut self, id: RunId) -> Result<(), CsvDeltaError> {
        let path = self.run_path(id);
        // Single rename: atomic on POSIX when both paths share a filesystem.
        fs::rename(&path, &self.destination).map_err(|e| map_file_error(&path, e))
    }
}

/// Runs kept in memory; records every finished run for inspection
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    runs: BTreeMap<RunId, Vec<Record>>,
    history: Vec<(RunId, Vec<Record>)>,
    output: Option<Vec<Record>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every run in the order it was finished, with its rows (header included)
    pub fn history(&self) -> &[(RunId, Vec<Record>)] {
        &self.history
    }

    /// Runs not yet removed or persisted
    pub fn live_runs(&self) -> Vec<RunId> {
        self.runs.keys().copied().collect()
    }

    /// Rows of the persisted run, if the sort produced one
    pub fn output(&self) -> Option<&[Record]> {
        self.output.as_deref()
    }

    fn missing(id: RunId) -> CsvDeltaError {
        CsvDeltaError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("run {} does not exist", id),
        ))
    }
}

impl RunStore for MemoryRunStore {
    type Reader = MemoryRecordStream;
    type Writer = MemoryRecordSink;

    fn create_run(&mut self, _id: RunId) -> Result<Self::Writer, CsvDeltaError> {
        Ok(MemoryRecordSink::new())
    }

    fn finish_run(&mut self, id: RunId, mut writer: Self::Writer) -> Result<(), CsvDeltaError> {
        writer.close()?;
        let rows = writer.into_rows();
        self.history.push((id, rows.clone()));
        self.runs.insert(id, rows);
        Ok(())
    }

    fn open_run(&mut self, id: RunId) -> Result<Self::Reader, CsvDeltaError> {
        self.runs
            .get(&id)
            .map(|rows| MemoryRecordStream::new(rows.clone()))
            .ok_or_else(|| Self::missing(id))
    }

    fn remove_run(&mut self, id: RunId) -> Result<(), CsvDeltaError> {
        self.runs.remove(&id).map(|_| ()).ok_or_else(|| Self::missing(id))
    }

    fn persist_run(&mut self, id: RunId) -> Result<(), CsvDeltaError> {
        let rows = self.runs.remove(&id).ok_or_else(|| Self::missing(id))?;
        self.output = Some(rows);
        Ok(())
    }
}

/// `<path>.<suffix>`, keeping the full original file name
pub(crate) fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
