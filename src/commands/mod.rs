//! Subcommand runners used by the `csvdelta` binary

pub mod compare;
pub mod diff;
pub mod output;
pub mod sort;

use crate::config::{CommandConfig, Config};
use crate::types::CsvDeltaError;
use crate::ui::ProgressReporter;

/// Run the configured subcommand
pub fn run(config: Config) -> Result<(), CsvDeltaError> {
    let mut reporter = ProgressReporter::new(!config.quiet);

    match &config.command {
        CommandConfig::Sort(sort) => {
            sort::run(sort, &mut reporter)?;
        }
        CommandConfig::Compare(compare) => {
            compare::run(compare, &mut reporter)?;
        }
        CommandConfig::Diff(diff) => {
            diff::run(diff, &mut reporter)?;
        }
    }

    Ok(())
}
