//! Merge-join of two key-sorted streams into change events

use super::columns::TrackedColumns;
use super::summary::DiffSummary;
use crate::key::RecordComparator;
use crate::stream::RecordStream;
use crate::types::{ChangeEvent, CsvDeltaError, Header, KeyedRecord, Record};
use std::cmp::Ordering;

/// Lazily classified changes between `primary` and `secondary`
///
/// Both inputs must be sorted ascending by an order compatible with the
/// comparator. The primary side is authoritative: rows only there are
/// creates, rows only in the secondary are deletes.
///
/// The streams are closed once both are exhausted, after the first error, or
/// when the `ChangeStream` is dropped.
///
/// # Example
/// ```
/// use csvdelta::diff::ChangeStream;
/// use csvdelta::key::KeyComparator;
/// use csvdelta::stream::MemoryRecordStream;
///
/// let primary = MemoryRecordStream::from_rows(&[&["id", "qty"], &["1", "5"], &["2", "1"]]);
/// let secondary = MemoryRecordStream::from_rows(&[&["id", "qty"], &["1", "4"]]);
/// let by_id = KeyComparator::by_names(&["id"])?;
///
/// let changes = ChangeStream::open(primary, secondary, &by_id, &["qty".to_string()])?
///     .collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(changes.len(), 2);
/// assert!(changes[0].is_update());
/// assert!(changes[1].is_create());
/// # Ok::<(), csvdelta::types::CsvDeltaError>(())
/// ```
pub struct ChangeStream<P, S, C>
where
    P: RecordStream,
    S: RecordStream,
    C: RecordComparator,
{
    primary: P,
    secondary: S,
    comparator: C,
    primary_header: Header,
    secondary_header: Header,
    tracked: TrackedColumns,
    primary_row: Option<Record>,
    secondary_row: Option<Record>,
    primary_done: bool,
    secondary_done: bool,
    closed: bool,
    summary: DiffSummary,
}

impl<P, S, C> ChangeStream<P, S, C>
where
    P: RecordStream,
    S: RecordStream,
    C: RecordComparator,
{
    /// Read both headers and resolve `change_columns`
    ///
    /// An empty `change_columns` disables updates. A change column missing
    /// from either header fails here, before any data row is read; both
    /// streams are closed on that path too.
    pub fn open(
        primary: P,
        secondary: S,
        comparator: C,
        change_columns: &[String],
    ) -> Result<Self, CsvDeltaError> {
        let mut stream = Self {
            primary,
            secondary,
            comparator,
            primary_header: Header::empty(),
            secondary_header: Header::empty(),
            tracked: TrackedColumns::default(),
            primary_row: None,
            secondary_row: None,
            primary_done: false,
            secondary_done: false,
            closed: false,
            summary: DiffSummary::new(),
        };
        // On error `stream` is dropped, which closes both sides.
        stream.primary_header = read_clean_header(&mut stream.primary)?;
        stream.secondary_header = read_clean_header(&mut stream.secondary)?;
        if !change_columns.is_empty() {
            stream.tracked = TrackedColumns::resolve(
                change_columns,
                &stream.primary_header,
                &stream.secondary_header,
            )?;
        }
        Ok(stream)
    }

    /// Header of the primary stream, byte-order mark removed
    pub fn primary_header(&self) -> &Header {
        &self.primary_header
    }

    /// Header of the secondary stream, byte-order mark removed
    pub fn secondary_header(&self) -> &Header {
        &self.secondary_header
    }

    /// Counts so far; complete once the iterator returned `None`
    pub fn summary(&self) -> &DiffSummary {
        &self.summary
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn fill(&mut self) -> Result<(), CsvDeltaError> {
        if self.primary_row.is_none() && !self.primary_done {
            self.primary_row = self.primary.next_record()?;
            match self.primary_row {
                Some(_) => self.summary.primary_rows += 1,
                None => self.primary_done = true,
            }
        }
        if self.secondary_row.is_none() && !self.secondary_done {
            self.secondary_row = self.secondary.next_record()?;
            match self.secondary_row {
                Some(_) => self.summary.secondary_rows += 1,
                None => self.secondary_done = true,
            }
        }
        Ok(())
    }

    fn step(&mut self) -> Result<Option<ChangeEvent>, CsvDeltaError> {
        loop {
            self.fill()?;

            let ordering = match (&self.primary_row, &self.secondary_row) {
                (None, None) => return Ok(None),
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(p), Some(s)) => self.comparator.compare(
                    &KeyedRecord::new(&self.primary_header, p),
                    &KeyedRecord::new(&self.secondary_header, s),
                )?,
            };

            let event = match ordering {
                Ordering::Less => self.primary_row.take().map(ChangeEvent::Create),
                Ordering::Greater => self.secondary_row.take().map(ChangeEvent::Delete),
                Ordering::Equal => {
                    let (Some(p), Some(s)) = (self.primary_row.take(), self.secondary_row.take())
                    else {
                        continue;
                    };
                    if self.tracked.differs(&p, &s) {
                        Some(ChangeEvent::Update(p))
                    } else {
                        self.summary.record_unchanged();
                        None
                    }
                }
            };

            if let Some(event) = event {
                self.summary.record_event(&event);
                return Ok(Some(event));
            }
        }
    }

    fn close_streams(&mut self) -> Result<(), CsvDeltaError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let primary = self.primary.close();
        let secondary = self.secondary.close();
        primary.and(secondary)
    }
}

impl<P, S, C> Iterator for ChangeStream<P, S, C>
where
    P: RecordStream,
    S: RecordStream,
    C: RecordComparator,
{
    type Item = Result<ChangeEvent, CsvDeltaError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        match self.step() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                log::debug!(
                    "compare finished: {} creates, {} updates, {} deletes, {} unchanged",
                    self.summary.creates,
                    self.summary.updates,
                    self.summary.deletes,
                    self.summary.unchanged
                );
                self.close_streams().err().map(Err)
            }
            Err(e) => {
                if let Err(close_err) = self.close_streams() {
                    log::warn!("failed to close compare inputs: {}", close_err);
                }
                Some(Err(e))
            }
        }
    }
}

impl<P, S, C> Drop for ChangeStream<P, S, C>
where
    P: RecordStream,
    S: RecordStream,
    C: RecordComparator,
{
    fn drop(&mut self) {
        if let Err(e) = self.close_streams() {
            log::warn!("failed to close compare inputs: {}", e);
        }
    }
}

/// Compare `primary` against `secondary`, handing each change to `on_event`
///
/// Events arrive in ascending key order as they are discovered. An error from
/// `on_event` stops the comparison and is returned; both streams are closed on
/// every path.
///
/// # Arguments
/// * `primary` - Authoritative input, sorted by key
/// * `secondary` - Input checked against the primary, sorted by key
/// * `comparator` - Key order shared by both inputs
/// * `change_columns` - Columns that turn a key match into an update; empty disables updates
/// * `on_event` - Consumer of change events
///
/// # Returns
/// * `Ok(DiffSummary)` - Counts for the whole comparison
/// * `Err(CsvDeltaError)` - Configuration, stream, comparator or consumer failure
pub fn compare<P, S, C, F>(
    primary: P,
    secondary: S,
    comparator: C,
    change_columns: &[String],
    mut on_event: F,
) -> Result<DiffSummary, CsvDeltaError>
where
    P: RecordStream,
    S: RecordStream,
    C: RecordComparator,
    F: FnMut(ChangeEvent) -> Result<(), CsvDeltaError>,
{
    let mut changes = ChangeStream::open(primary, secondary, comparator, change_columns)?;
    for event in changes.by_ref() {
        on_event(event?)?;
    }
    Ok(*changes.summary())
}

fn read_clean_header<R: RecordStream>(stream: &mut R) -> Result<Header, CsvDeltaError> {
    Ok(stream
        .read_header()?
        .map(Header::strip_bom)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{try_from_fn, KeyComparator};
    use crate::stream::MemoryRecordStream;

    fn by_id() -> KeyComparator {
        KeyComparator::by_names(&["id"]).expect("key")
    }

    fn tracked(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn first_fields(events: &[ChangeEvent]) -> Vec<(char, String)> {
        events
            .iter()
            .map(|e| {
                let tag = match e {
                    ChangeEvent::Create(_) => '+',
                    ChangeEvent::Update(_) => '~',
                    ChangeEvent::Delete(_) => '-',
                };
                (tag, e.record().get(0).unwrap_or_default().to_string())
            })
            .collect()
    }

    #[test]
    fn test_two_pointer_classification() {
        let primary = MemoryRecordStream::from_rows(&[&["id", "v"], &["a", "1"], &["c", "2"]]);
        let secondary = MemoryRecordStream::from_rows(&[&["id", "v"], &["b", "9"], &["c", "3"]]);

        let events: Vec<ChangeEvent> = ChangeStream::open(primary, secondary, by_id(), &tracked(&["v"]))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            first_fields(&events),
            vec![('+', "a".into()), ('-', "b".into()), ('~', "c".into())]
        );
    }

    #[test]
    fn test_summary_counts() {
        let primary = MemoryRecordStream::from_rows(&[&["id"], &["1"], &["2"], &["3"]]);
        let secondary = MemoryRecordStream::from_rows(&[&["id"], &["2"], &["4"]]);

        let summary = compare(primary, secondary, by_id(), &[], |_| Ok(())).unwrap();

        assert_eq!(summary.primary_rows, 3);
        assert_eq!(summary.secondary_rows, 2);
        assert_eq!(summary.creates, 2);
        assert_eq!(summary.deletes, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.updates, 0);
    }

    #[test]
    fn test_bom_header_is_cleaned() {
        let primary = MemoryRecordStream::from_rows(&[&["\u{feff}id", "v"], &["1", "x"]]);
        let secondary = MemoryRecordStream::from_rows(&[&["id", "v"], &["1", "y"]]);

        let stream = ChangeStream::open(primary, secondary, by_id(), &tracked(&["id"])).unwrap();

        assert_eq!(stream.primary_header().columns()[0], "id");
    }

    #[test]
    fn test_missing_change_column_closes_streams() {
        let mut primary = MemoryRecordStream::from_rows(&[&["id"], &["1"]]);
        let mut secondary = MemoryRecordStream::from_rows(&[&["id", "v"], &["1", "x"]]);

        let err = ChangeStream::open(&mut primary, &mut secondary, by_id(), &tracked(&["v"]))
            .err()
            .expect("missing column");

        assert!(err.is_configuration_error());
        assert!(primary.is_closed());
        assert!(secondary.is_closed());
    }

    #[test]
    fn test_comparator_error_stops_iteration() {
        let primary = MemoryRecordStream::from_rows(&[&["id"], &["1"]]);
        let secondary = MemoryRecordStream::from_rows(&[&["id"], &["1"]]);
        let failing = try_from_fn(|_, _| Err(CsvDeltaError::Comparator("bad key".to_string())));

        let mut stream = ChangeStream::open(primary, secondary, failing, &[]).unwrap();

        assert!(matches!(stream.next(), Some(Err(CsvDeltaError::Comparator(_)))));
        assert!(stream.is_closed());
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_drop_closes_streams() {
        let mut primary = MemoryRecordStream::from_rows(&[&["id"], &["1"], &["2"]]);
        let mut secondary = MemoryRecordStream::from_rows(&[&["id"]]);

        {
            let mut stream = ChangeStream::open(&mut primary, &mut secondary, by_id(), &[]).unwrap();
            assert!(stream.next().is_some());
        }

        assert!(primary.is_closed());
        assert!(secondary.is_closed());
    }
}
