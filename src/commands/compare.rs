//! `compare` command

use super::output::ChangeWriter;
use crate::config::CompareConfig;
use crate::diff::{ChangeStream, DiffSummary};
use crate::stream::CsvRecordStream;
use crate::types::{CsvDeltaError, Side};
use crate::ui::ProgressReporter;
use std::path::Path;

/// Run the compare operation on already sorted inputs
pub fn run(
    config: &CompareConfig,
    reporter: &mut ProgressReporter,
) -> Result<DiffSummary, CsvDeltaError> {
    config.validate()?;
    compare_files(&config.primary, &config.secondary, config, reporter)
}

/// Compare `primary` against `secondary` using the key and output settings of `config`
pub(crate) fn compare_files(
    primary: &Path,
    secondary: &Path,
    config: &CompareConfig,
    reporter: &mut ProgressReporter,
) -> Result<DiffSummary, CsvDeltaError> {
    let primary_stream = CsvRecordStream::open(primary, &config.dialect)?;
    let secondary_stream = CsvRecordStream::open(secondary, &config.dialect)?;

    let mut changes = ChangeStream::open(
        primary_stream,
        secondary_stream,
        &config.comparator,
        &config.change_columns,
    )?;
    if !changes.primary_header().is_empty() {
        config.comparator.validate(changes.primary_header(), Side::Primary)?;
    }
    if !changes.secondary_header().is_empty() {
        config
            .comparator
            .validate(changes.secondary_header(), Side::Secondary)?;
    }

    let mut writer = ChangeWriter::open(
        config.output.as_deref(),
        config.format,
        &config.dialect,
        changes.primary_header().clone(),
        changes.secondary_header().clone(),
    )?;

    reporter.start_compare(&config.primary, &config.secondary);
    // Not a `for` loop: the summary is read between events.
    #[allow(clippy::while_let_on_iterator)]
    while let Some(event) = changes.next() {
        writer.write(&event?)?;
        reporter.update_compare(changes.summary());
    }

    let summary = *changes.summary();
    writer.finish(&summary)?;
    reporter.finish_compare(&summary);
    log::info!(
        "{} creates, {} updates, {} deletes, {} unchanged",
        summary.creates,
        summary.updates,
        summary.deletes,
        summary.unchanged
    );

    Ok(summary)
}
