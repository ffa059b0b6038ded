//! Configuration management

mod cli;
mod file;

pub use cli::{ChangeArgs, Cli, Command, CompareArgs, DiffArgs, KeyArgs, SortArgs};
pub use file::FileConfig;

use crate::key::{KeyColumn, KeyComparator, KeyType};
use crate::sort::{SortOptions, DEFAULT_BATCH_SIZE};
use crate::stream::CsvDialect;
use crate::types::CsvDeltaError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How change events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One colored line per change: `+`, `~` or `-` followed by the row
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// CSV with an `action` column ahead of the primary header
    Csv,
}

/// Validated configuration for one run of the binary
#[derive(Debug, Clone)]
pub struct Config {
    /// Suppress progress and info logging
    pub quiet: bool,

    pub command: CommandConfig,
}

#[derive(Debug, Clone)]
pub enum CommandConfig {
    Sort(SortConfig),
    Compare(CompareConfig),
    Diff(DiffConfig),
}

/// `sort` subcommand
#[derive(Debug, Clone)]
pub struct SortConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub comparator: KeyComparator,
    pub options: SortOptions,
    pub dialect: CsvDialect,
}

impl SortConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), CsvDeltaError> {
        require_file(&self.source)?;

        if self.source == self.destination {
            return Err(CsvDeltaError::Config(
                "Source and destination cannot be the same".to_string(),
            ));
        }

        self.options.validate()
    }
}

/// `compare` subcommand
#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub primary: PathBuf,
    pub secondary: PathBuf,
    pub comparator: KeyComparator,
    pub change_columns: Vec<String>,
    pub dialect: CsvDialect,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

impl CompareConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), CsvDeltaError> {
        require_file(&self.primary)?;
        require_file(&self.secondary)?;

        if let Some(output) = &self.output {
            if output == &self.primary || output == &self.secondary {
                return Err(CsvDeltaError::Config(
                    "Output cannot overwrite an input".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// `diff` subcommand: sort both inputs, then compare
#[derive(Debug, Clone)]
pub struct DiffConfig {
    pub compare: CompareConfig,
    pub batch_size: usize,
    /// Keep the sorted copies here instead of a temporary directory
    pub work_dir: Option<PathBuf>,
}

impl DiffConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), CsvDeltaError> {
        self.compare.validate()?;
        self.sort_options().validate()?;

        if let Some(dir) = &self.work_dir {
            if !dir.is_dir() {
                return Err(CsvDeltaError::Config(format!(
                    "Work directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    pub fn sort_options(&self) -> SortOptions {
        SortOptions {
            batch_size: self.batch_size,
            has_headers: true,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = CsvDeltaError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let command = match cli.command {
            Command::Sort(args) => {
                let has_headers = !(args.no_headers || file.no_headers.unwrap_or(false));
                let config = SortConfig {
                    comparator: build_comparator(&args.keys, &file, has_headers)?,
                    dialect: build_dialect(&args.keys, &file)?,
                    options: SortOptions {
                        batch_size: batch_size(args.batch_size, &file),
                        has_headers,
                    },
                    source: args.source,
                    destination: args.destination,
                };
                config.validate()?;
                CommandConfig::Sort(config)
            }
            Command::Compare(args) => {
                let config = build_compare(args.primary, args.secondary, &args.keys, args.changes, &file)?;
                config.validate()?;
                CommandConfig::Compare(config)
            }
            Command::Diff(args) => {
                let config = DiffConfig {
                    batch_size: batch_size(args.batch_size, &file),
                    work_dir: args.work_dir.or_else(|| file.work_dir.clone()),
                    compare: build_compare(args.primary, args.secondary, &args.keys, args.changes, &file)?,
                };
                config.validate()?;
                CommandConfig::Diff(config)
            }
        };

        Ok(Config {
            quiet: cli.quiet,
            command,
        })
    }
}

/// Parse a delimiter option: one single-byte character, or `tab` / `\t`
pub fn parse_delimiter(value: &str) -> Result<u8, CsvDeltaError> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [byte] if byte.is_ascii() && *byte != b'"' && *byte != b'\n' && *byte != b'\r' => {
                Ok(*byte)
            }
            _ => Err(CsvDeltaError::Config(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                value
            ))),
        },
    }
}

fn require_file(path: &Path) -> Result<(), CsvDeltaError> {
    if !path.exists() {
        return Err(CsvDeltaError::Config(format!(
            "Source path does not exist: {}",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(CsvDeltaError::Config(format!(
            "Source path is a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

fn build_compare(
    primary: PathBuf,
    secondary: PathBuf,
    keys: &KeyArgs,
    changes: ChangeArgs,
    file: &FileConfig,
) -> Result<CompareConfig, CsvDeltaError> {
    let change_columns = if changes.change_columns.is_empty() {
        file.change_columns.clone().unwrap_or_default()
    } else {
        changes.change_columns
    };

    Ok(CompareConfig {
        primary,
        secondary,
        // Change columns are names, so compare inputs always carry a header.
        comparator: build_comparator(keys, file, true)?,
        change_columns,
        dialect: build_dialect(keys, file)?,
        format: changes.format.or(file.format).unwrap_or_default(),
        output: changes.output,
    })
}

fn build_comparator(
    args: &KeyArgs,
    file: &FileConfig,
    has_headers: bool,
) -> Result<KeyComparator, CsvDeltaError> {
    let specs: Vec<String> = if args.keys.is_empty() {
        file.key.clone().unwrap_or_default()
    } else {
        args.keys.clone()
    };
    if specs.is_empty() {
        return Err(CsvDeltaError::Config(
            "At least one key column is required (--key)".to_string(),
        ));
    }

    let columns = specs
        .iter()
        .map(|spec| KeyColumn::parse(spec, has_headers))
        .collect::<Result<Vec<_>, _>>()?;

    let key_type = if args.numeric || file.numeric_key.unwrap_or(false) {
        KeyType::Numeric
    } else {
        KeyType::Text
    };

    KeyComparator::new(columns, key_type)
}

fn build_dialect(args: &KeyArgs, file: &FileConfig) -> Result<CsvDialect, CsvDeltaError> {
    match args.delimiter.as_deref().or(file.delimiter.as_deref()) {
        Some(value) => Ok(CsvDialect::with_delimiter(parse_delimiter(value)?)),
        None => Ok(CsvDialect::default()),
    }
}

fn batch_size(arg: Option<usize>, file: &FileConfig) -> usize {
    arg.or(file.batch_size).unwrap_or(DEFAULT_BATCH_SIZE)
}
