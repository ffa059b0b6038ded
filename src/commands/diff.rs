//! `diff` command: sort both inputs by key, then compare the sorted copies

use super::compare::compare_files;
use super::sort::sort_file;
use crate::config::DiffConfig;
use crate::diff::DiffSummary;
use crate::types::{map_file_error, CsvDeltaError};
use crate::ui::ProgressReporter;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Run the sort-then-compare pipeline
pub fn run(config: &DiffConfig, reporter: &mut ProgressReporter) -> Result<DiffSummary, CsvDeltaError> {
    config.validate()?;

    // Dropping `_scratch` removes the temporary directory and its sorted copies.
    let (_scratch, work_dir) = work_dir(config.work_dir.as_deref())?;
    let primary_sorted = work_dir.join("primary.sorted.csv");
    let secondary_sorted = work_dir.join("secondary.sorted.csv");
    let compare = &config.compare;

    log::info!("sorting inputs into {}", work_dir.display());
    sort_file(
        &compare.primary,
        &primary_sorted,
        &compare.comparator,
        config.sort_options(),
        &compare.dialect,
        reporter,
    )?;
    sort_file(
        &compare.secondary,
        &secondary_sorted,
        &compare.comparator,
        config.sort_options(),
        &compare.dialect,
        reporter,
    )?;

    compare_files(&primary_sorted, &secondary_sorted, compare, reporter)
}

fn work_dir(requested: Option<&Path>) -> Result<(Option<TempDir>, PathBuf), CsvDeltaError> {
    match requested {
        Some(dir) => Ok((None, dir.to_path_buf())),
        None => {
            let scratch = tempfile::Builder::new()
                .prefix("csvdelta-")
                .tempdir()
                .map_err(|e| map_file_error(&std::env::temp_dir(), e))?;
            let path = scratch.path().to_path_buf();
            Ok((Some(scratch), path))
        }
    }
}
