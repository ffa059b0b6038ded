//! `sort` command

use crate::config::SortConfig;
use crate::key::KeyComparator;
use crate::sort::{ExternalSorter, SortEvent, SortOptions, SortStats};
use crate::stream::{read_header_of, CsvDialect};
use crate::types::{CsvDeltaError, Header, Side};
use crate::ui::ProgressReporter;
use std::path::Path;

/// Run the sort operation
pub fn run(config: &SortConfig, reporter: &mut ProgressReporter) -> Result<SortStats, CsvDeltaError> {
    config.validate()?;
    sort_file(
        &config.source,
        &config.destination,
        &config.comparator,
        config.options,
        &config.dialect,
        reporter,
    )
}

/// Sort one file, checking the key columns against its header first
pub(crate) fn sort_file(
    source: &Path,
    destination: &Path,
    comparator: &KeyComparator,
    options: SortOptions,
    dialect: &CsvDialect,
    reporter: &mut ProgressReporter,
) -> Result<SortStats, CsvDeltaError> {
    if options.has_headers {
        let header = read_header_of(source, dialect)?
            .map(Header::strip_bom)
            .unwrap_or_default();
        // An empty file has nothing to order; it is copied as is.
        if !header.is_empty() {
            comparator.validate(&header, Side::Source)?;
        }
    }

    reporter.start_sort(source);
    let sorter = ExternalSorter::new(options)?.with_dialect(*dialect);
    let on_event = |event: &SortEvent| reporter.sort_event(event);
    let stats = sorter.sort_with_events(source, destination, comparator, Some(&on_event))?;
    reporter.finish_sort(destination, &stats);

    Ok(stats)
}
