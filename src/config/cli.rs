//! Command-line interface

use super::OutputFormat;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "csvdelta",
    version,
    about = "External sort and create/update/delete diff for large CSV files",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Only log warnings and errors; no progress spinner
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// TOML file with default options; command-line flags take precedence
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sort a CSV file by key columns using bounded memory
    Sort(SortArgs),
    /// Classify rows of two key-sorted CSV files as creates, updates and deletes
    Compare(CompareArgs),
    /// Sort both inputs by key, then compare them
    Diff(DiffArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Sort(_) => "sort",
            Command::Compare(_) => "compare",
            Command::Diff(_) => "diff",
        }
    }
}

/// Key and dialect options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct KeyArgs {
    /// Key column name (or zero-based position with --no-headers); repeat or comma-separate
    #[arg(short = 'k', long = "key", value_name = "COLUMN", value_delimiter = ',')]
    pub keys: Vec<String>,

    /// Order key values as numbers instead of text
    #[arg(long = "numeric")]
    pub numeric: bool,

    /// Field delimiter: a single character, or `tab`
    #[arg(short = 'd', long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SortArgs {
    /// File to sort
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Sorted output file
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    #[command(flatten)]
    pub keys: KeyArgs,

    /// Records held in memory per run [default: 100000]
    #[arg(short = 'b', long = "batch-size", value_name = "ROWS")]
    pub batch_size: Option<usize>,

    /// The input has no header row; keys are column positions
    #[arg(long = "no-headers")]
    pub no_headers: bool,
}

/// Change-reporting options shared by `compare` and `diff`
#[derive(Args, Debug, Clone, Default)]
pub struct ChangeArgs {
    /// Column whose change makes a key match an update; repeat or comma-separate
    #[arg(short = 'c', long = "change-column", value_name = "COLUMN", value_delimiter = ',')]
    pub change_columns: Vec<String>,

    /// Output format [default: text]
    #[arg(short = 'f', long = "format", value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write changes to a file [default: standard output]
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Authoritative input, sorted by key
    #[arg(value_name = "PRIMARY")]
    pub primary: PathBuf,

    /// Input checked against the primary, sorted by key
    #[arg(value_name = "SECONDARY")]
    pub secondary: PathBuf,

    #[command(flatten)]
    pub keys: KeyArgs,

    #[command(flatten)]
    pub changes: ChangeArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// Authoritative input, any order
    #[arg(value_name = "PRIMARY")]
    pub primary: PathBuf,

    /// Input checked against the primary, any order
    #[arg(value_name = "SECONDARY")]
    pub secondary: PathBuf,

    #[command(flatten)]
    pub keys: KeyArgs,

    #[command(flatten)]
    pub changes: ChangeArgs,

    /// Records held in memory per sort run [default: 100000]
    #[arg(short = 'b', long = "batch-size", value_name = "ROWS")]
    pub batch_size: Option<usize>,

    /// Directory for the sorted copies [default: a temporary directory]
    #[arg(long = "work-dir", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sort_with_keys() {
        let cli = Cli::try_parse_from([
            "csvdelta", "-vv", "sort", "in.csv", "out.csv", "-k", "region,id", "--numeric", "-b",
            "500",
        ])
        .expect("valid arguments");

        assert_eq!(cli.verbosity, 2);
        assert_eq!(cli.command.name(), "sort");
        let Command::Sort(args) = cli.command else {
            panic!("expected sort");
        };
        assert_eq!(args.keys.keys, vec!["region", "id"]);
        assert!(args.keys.numeric);
        assert_eq!(args.batch_size, Some(500));
        assert!(!args.no_headers);
    }

    #[test]
    fn test_parse_compare_changes() {
        let cli = Cli::try_parse_from([
            "csvdelta", "compare", "a.csv", "b.csv", "-k", "id", "-c", "name", "-c", "email",
            "--format", "json",
        ])
        .expect("valid arguments");

        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.changes.change_columns, vec!["name", "email"]);
        assert_eq!(args.changes.format, Some(OutputFormat::Json));
        assert_eq!(args.changes.output, None);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["csvdelta", "diff", "a.csv", "b.csv", "-k", "id", "-q"])
            .expect("valid arguments");
        assert!(cli.quiet);
    }
}
