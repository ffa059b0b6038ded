//! Optional TOML configuration file

use super::OutputFormat;
use crate::types::{map_file_error, CsvDeltaError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults read from `--config <file>`
///
/// ```toml
/// key = ["id"]
/// numeric_key = true
/// change_columns = ["name", "email"]
/// batch_size = 250000
/// delimiter = ";"
/// format = "csv"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub key: Option<Vec<String>>,
    pub numeric_key: Option<bool>,
    pub change_columns: Option<Vec<String>>,
    pub batch_size: Option<usize>,
    pub delimiter: Option<String>,
    pub no_headers: Option<bool>,
    pub format: Option<OutputFormat>,
    pub work_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, CsvDeltaError> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CsvDeltaError::Config(format!(
                "Config file does not exist: {}",
                path.display()
            )),
            _ => map_file_error(path, e),
        })?;
        Self::parse(&text)
            .map_err(|e| CsvDeltaError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
