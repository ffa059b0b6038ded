//! External sort: bounded-memory partition into runs, then pairwise merging

use super::copy::copy_file_atomic;
use super::run_store::{FsRunStore, RunId, RunStore};
use crate::key::RecordComparator;
use crate::stream::{CsvDialect, CsvRecordStream, RecordSink, RecordStream};
use crate::types::{CsvDeltaError, Header, KeyedRecord, Record};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::path::Path;

/// Default number of records buffered per run
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

/// Sort tuning shared by the partition and merge phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOptions {
    /// Maximum records held in memory; also the size of each initial run
    pub batch_size: usize,

    /// First row is a header: kept on top of every run and of the output
    pub has_headers: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            has_headers: true,
        }
    }
}

impl SortOptions {
    pub fn validate(&self) -> Result<(), CsvDeltaError> {
        if self.batch_size == 0 {
            return Err(CsvDeltaError::Config(
                "batch_size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Progress events emitted while sorting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortEvent {
    /// A sorted batch was written as a new run
    RunWritten { run: RunId, rows: usize },
    /// Two runs are being merged into a new one
    MergeStarted {
        left: RunId,
        right: RunId,
        into: RunId,
    },
    /// A merge finished and its inputs were removed
    MergeFinished { into: RunId, rows: u64 },
    /// Sort completed
    Finished { stats: SortStats },
}

/// Optional callback used to receive sort events.
pub type SortCallback<'a> = dyn Fn(&SortEvent) + 'a;

/// Totals for one sort call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Data records read (header excluded)
    pub rows: u64,
    /// Runs written during partitioning
    pub runs: usize,
    /// Two-way merges performed
    pub merges: usize,
    /// Source had no data rows and was copied unchanged
    pub copied_source: bool,
}

/// External sort engine
///
/// # Example
/// ```no_run
/// use csvdelta::key::KeyComparator;
/// use csvdelta::sort::{ExternalSorter, SortOptions};
/// use std::path::Path;
///
/// let sorter = ExternalSorter::new(SortOptions::default())?;
/// let by_id = KeyComparator::by_names(&["id"])?;
/// sorter.sort(Path::new("export.csv"), Path::new("export.sorted.csv"), &by_id)?;
/// # Ok::<(), csvdelta::types::CsvDeltaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExternalSorter {
    options: SortOptions,
    dialect: CsvDialect,
}

impl ExternalSorter {
    pub fn new(options: SortOptions) -> Result<Self, CsvDeltaError> {
        options.validate()?;
        Ok(Self {
            options,
            dialect: CsvDialect::default(),
        })
    }

    pub fn with_dialect(mut self, dialect: CsvDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn options(&self) -> &SortOptions {
        &self.options
    }

    /// Sort the file at `source` into `destination`
    pub fn sort<C>(
        &self,
        source: &Path,
        destination: &Path,
        comparator: &C,
    ) -> Result<SortStats, CsvDeltaError>
    where
        C: RecordComparator + ?Sized,
    {
        self.sort_with_events(source, destination, comparator, None)
    }

    /// [`sort`](Self::sort), reporting progress to `on_event`
    pub fn sort_with_events<C>(
        &self,
        source: &Path,
        destination: &Path,
        comparator: &C,
        on_event: Option<&SortCallback<'_>>,
    ) -> Result<SortStats, CsvDeltaError>
    where
        C: RecordComparator + ?Sized,
    {
        self.options.validate()?;
        if !source.exists() {
            return Err(CsvDeltaError::Config(format!(
                "Source path does not exist: {}",
                source.display()
            )));
        }
        if source == destination {
            return Err(CsvDeltaError::Config(
                "Source and destination cannot be the same".to_string(),
            ));
        }

        let mut input = CsvRecordStream::open(source, &self.dialect)?;
        let mut store = FsRunStore::new(destination, self.dialect);
        let result = self.sort_runs(&mut input, &mut store, comparator, on_event);
        input.close()?;
        let mut stats = result?;

        if stats.runs == 0 {
            log::debug!(
                "no data rows in {}, copying it unchanged",
                source.display()
            );
            copy_file_atomic(source, destination)?;
            stats.copied_source = true;
        }

        log::info!(
            "sorted {} rows from {} into {} ({} runs, {} merges)",
            stats.rows,
            source.display(),
            destination.display(),
            stats.runs,
            stats.merges
        );
        emit_event(on_event, SortEvent::Finished { stats });
        Ok(stats)
    }

    /// Sort `source` using `store` for every run
    ///
    /// The last run is persisted through [`RunStore::persist_run`]. When the
    /// source has no data rows nothing is persisted and `stats.runs == 0`; the
    /// caller decides how to materialize the empty output.
    pub fn sort_stream<S, St, C>(
        &self,
        source: &mut S,
        store: &mut St,
        comparator: &C,
    ) -> Result<SortStats, CsvDeltaError>
    where
        S: RecordStream + ?Sized,
        St: RunStore + ?Sized,
        C: RecordComparator + ?Sized,
    {
        self.options.validate()?;
        self.sort_runs(source, store, comparator, None)
    }

    fn sort_runs<S, St, C>(
        &self,
        source: &mut S,
        store: &mut St,
        comparator: &C,
        on_event: Option<&SortCallback<'_>>,
    ) -> Result<SortStats, CsvDeltaError>
    where
        S: RecordStream + ?Sized,
        St: RunStore + ?Sized,
        C: RecordComparator + ?Sized,
    {
        let header = if self.options.has_headers {
            source.read_header()?
        } else {
            None
        };

        // Comparators see the header without a byte-order mark; runs keep it as read.
        let view = header.clone().map(Header::strip_bom).unwrap_or_default();

        let mut stats = SortStats::default();
        let mut queue = self.partition(
            source,
            store,
            header.as_ref(),
            &view,
            comparator,
            &mut stats,
            on_event,
        )?;
        stats.runs = queue.len();

        // Merge in passes over the FIFO queue. An odd run out of a pass waits at
        // the back so every merge joins adjacent input ranges, older side first.
        let mut merge_seq = 0;
        while queue.len() > 1 {
            let carry = if queue.len() % 2 == 1 {
                queue.pop_back()
            } else {
                None
            };
            for _ in 0..queue.len() / 2 {
                let (Some(left), Some(right)) = (queue.pop_front(), queue.pop_front()) else {
                    break;
                };
                let into = RunId::merge(merge_seq);
                merge_seq += 1;

                emit_event(on_event, SortEvent::MergeStarted { left, right, into });
                let rows = merge_runs(
                    store,
                    [left, right],
                    into,
                    header.as_ref(),
                    &view,
                    comparator,
                )?;
                store.remove_run(left)?;
                store.remove_run(right)?;
                log::debug!("merged {} + {} into {} ({} rows)", left, right, into, rows);
                emit_event(on_event, SortEvent::MergeFinished { into, rows });

                queue.push_back(into);
                stats.merges += 1;
            }
            queue.extend(carry);
        }

        if let Some(last) = queue.pop_front() {
            store.persist_run(last)?;
        }

        Ok(stats)
    }

    /// Phase 1: split `source` into sorted runs of at most `batch_size` records
    fn partition<S, St, C>(
        &self,
        source: &mut S,
        store: &mut St,
        header: Option<&Header>,
        view: &Header,
        comparator: &C,
        stats: &mut SortStats,
        on_event: Option<&SortCallback<'_>>,
    ) -> Result<VecDeque<RunId>, CsvDeltaError>
    where
        S: RecordStream + ?Sized,
        St: RunStore + ?Sized,
        C: RecordComparator + ?Sized,
    {
        let mut queue = VecDeque::new();
        let mut batch: Vec<Record> = Vec::with_capacity(self.options.batch_size.min(8192));

        while let Some(record) = source.next_record()? {
            stats.rows += 1;
            batch.push(record);
            if batch.len() >= self.options.batch_size {
                let rows = batch.len();
                let id = RunId::part(queue.len());
                let run = write_run(store, id, header, view, &mut batch, comparator)?;
                emit_event(on_event, SortEvent::RunWritten { run, rows });
                queue.push_back(run);
            }
        }

        if !batch.is_empty() {
            let rows = batch.len();
            let id = RunId::part(queue.len());
            let run = write_run(store, id, header, view, &mut batch, comparator)?;
            emit_event(on_event, SortEvent::RunWritten { run, rows });
            queue.push_back(run);
        }

        Ok(queue)
    }
}

/// One-call sort of the file at `source` into `destination`
pub fn sort<C>(
    source: &Path,
    destination: &Path,
    comparator: &C,
    batch_size: usize,
    has_headers: bool,
) -> Result<SortStats, CsvDeltaError>
where
    C: RecordComparator + ?Sized,
{
    ExternalSorter::new(SortOptions {
        batch_size,
        has_headers,
    })?
    .sort(source, destination, comparator)
}

/// Stable in-memory sort; the first comparator error wins and is returned
pub(crate) fn sort_batch<C>(
    batch: &mut [Record],
    header: &Header,
    comparator: &C,
) -> Result<(), CsvDeltaError>
where
    C: RecordComparator + ?Sized,
{
    let mut failure: Option<CsvDeltaError> = None;
    batch.sort_by(|a, b| {
        if failure.is_some() {
            return Ordering::Equal;
        }
        match comparator.compare(&KeyedRecord::new(header, a), &KeyedRecord::new(header, b)) {
            Ok(ordering) => ordering,
            Err(e) => {
                failure = Some(e);
                Ordering::Equal
            }
        }
    });
    failure.map_or(Ok(()), Err)
}

fn write_run<St, C>(
    store: &mut St,
    run: RunId,
    header: Option<&Header>,
    view: &Header,
    batch: &mut Vec<Record>,
    comparator: &C,
) -> Result<RunId, CsvDeltaError>
where
    St: RunStore + ?Sized,
    C: RecordComparator + ?Sized,
{
    sort_batch(batch, view, comparator)?;

    let mut writer = store.create_run(run)?;
    if let Some(header) = header {
        writer.write_header(header)?;
    }
    for record in batch.drain(..) {
        writer.write_record(&record)?;
    }
    store.finish_run(run, writer)?;
    log::debug!("wrote run {}", run);
    Ok(run)
}

/// Two-way merge of `left` and `right` into `into`; ties take `left`
fn merge_runs<St, C>(
    store: &mut St,
    [left, right]: [RunId; 2],
    into: RunId,
    header: Option<&Header>,
    view: &Header,
    comparator: &C,
) -> Result<u64, CsvDeltaError>
where
    St: RunStore + ?Sized,
    C: RecordComparator + ?Sized,
{
    let mut first = store.open_run(left)?;
    let mut second = store.open_run(right)?;
    let mut dest = store.create_run(into)?;

    if let Some(header) = header {
        first.read_header()?;
        second.read_header()?;
        dest.write_header(header)?;
    }

    let mut row1 = first.next_record()?;
    let mut row2 = second.next_record()?;
    let mut rows = 0u64;

    loop {
        let take_first = match (&row1, &row2) {
            (None, None) => break,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => {
                comparator.compare(&KeyedRecord::new(view, a), &KeyedRecord::new(view, b))?
                    != Ordering::Greater
            }
        };

        if take_first {
            if let Some(record) = row1.take() {
                dest.write_record(&record)?;
            }
            row1 = first.next_record()?;
        } else {
            if let Some(record) = row2.take() {
                dest.write_record(&record)?;
            }
            row2 = second.next_record()?;
        }
        rows += 1;
    }

    first.close()?;
    second.close()?;
    store.finish_run(into, dest)?;
    Ok(rows)
}

fn emit_event(on_event: Option<&SortCallback<'_>>, event: SortEvent) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
