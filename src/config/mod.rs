//! Run configuration loaded from YAML
//!
//! The file names one input path per source table and optionally tunes the
//! loader:
//!
//! ```yaml
//! paths:
//!   input:
//!     Charges: data/Charges_use.csv
//!     Units: data/Units_use.csv
//!     # ... one entry per table
//! loader:
//!   batch_size: 8192
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::util::safe_read_to_string;
use crate::error::{CrashAnalysisError, Result};
use crate::schema::CrashTable;

/// Default number of rows per batch when reading source files
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub paths: PathsConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub input: InputPaths,
}

/// Source file of each table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPaths {
    #[serde(rename = "Charges")]
    pub charges: PathBuf,
    #[serde(rename = "Damages")]
    pub damages: PathBuf,
    #[serde(rename = "Endorse")]
    pub endorse: PathBuf,
    #[serde(rename = "Primary_Person")]
    pub primary_person: PathBuf,
    #[serde(rename = "Restrict")]
    pub restrict: PathBuf,
    #[serde(rename = "Units")]
    pub units: PathBuf,
}

impl InputPaths {
    /// Path configured for `table`
    #[must_use]
    pub fn path_for(&self, table: CrashTable) -> &Path {
        match table {
            CrashTable::Charges => &self.charges,
            CrashTable::Damages => &self.damages,
            CrashTable::Endorse => &self.endorse,
            CrashTable::PrimaryPerson => &self.primary_person,
            CrashTable::Restrict => &self.restrict,
            CrashTable::Units => &self.units,
        }
    }
}

impl Default for InputPaths {
    fn default() -> Self {
        let path = |table: CrashTable| PathBuf::from(format!("data/{}_use.csv", table.name()));
        Self {
            charges: path(CrashTable::Charges),
            damages: path(CrashTable::Damages),
            endorse: path(CrashTable::Endorse),
            primary_person: path(CrashTable::PrimaryPerson),
            restrict: path(CrashTable::Restrict),
            units: path(CrashTable::Units),
        }
    }
}

/// Options for reading source files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Rows per record batch
    pub batch_size: usize,
    /// CSV field delimiter, a single ASCII character
    pub delimiter: String,
    /// Load the tables concurrently
    pub parallel: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delimiter: ",".to_string(),
            parallel: true,
        }
    }
}

impl LoaderConfig {
    /// The delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(CrashAnalysisError::config_error(format!(
                "CSV delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(CrashAnalysisError::config_error(
                "loader.batch_size must be greater than zero",
            ));
        }
        self.delimiter_byte().map(|_| ())
    }
}

impl AnalysisConfig {
    /// Parse and validate a configuration from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.loader.validate()?;
        Ok(config)
    }

    /// Read, parse and validate the configuration file at `path`
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = safe_read_to_string(path, "reading configuration")?;
        let config = Self::from_yaml_str(&text).map_err(|e| e.with_path(path))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
