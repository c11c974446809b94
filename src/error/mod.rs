//! Error handling for crash analytics.

use std::io;
use std::path::{Path, PathBuf};

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use parquet::errors::ParquetError;

pub mod util;

/// Specialized error type for loading crash tables and evaluating analyses
#[derive(Debug, thiserror::Error)]
pub enum CrashAnalysisError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Error raised by an Arrow kernel or the CSV reader
    #[error("Arrow error: {0}")]
    ArrowError(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    ParquetError(#[from] ParquetError),

    /// Malformed YAML configuration
    #[error("Config error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration that parsed but cannot be used
    #[error("Config error: {0}")]
    ConfigError(String),

    /// A source table does not have the shape the analyses need
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// A column referenced by an operator does not exist
    #[error("Column '{column}' not found in dataset '{dataset}'")]
    ColumnNotFound { column: String, dataset: String },

    /// A column has a type the operators cannot read
    #[error("Column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: DataType },

    /// An operator was called with arguments it cannot evaluate
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Any of the above, tied to the file it came from
    #[error("{source} (path: {})", path.display())]
    WithPath {
        path: PathBuf,
        #[source]
        source: Box<CrashAnalysisError>,
    },
}

impl CrashAnalysisError {
    /// Create a schema error
    pub fn schema_error(message: impl Into<String>) -> Self {
        Self::SchemaError(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Create a column not found error
    pub fn column_not_found(column: &str, dataset: &str) -> Self {
        Self::ColumnNotFound {
            column: column.to_string(),
            dataset: dataset.to_string(),
        }
    }

    /// Attach the path of the file being processed
    #[must_use]
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            already @ Self::WithPath { .. } => already,
            other => Self::WithPath {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, without any path annotation
    #[must_use]
    pub fn without_path(&self) -> &Self {
        match self {
            Self::WithPath { source, .. } => source.without_path(),
            other => other,
        }
    }
}

/// Result type for crash analytics operations
pub type Result<T> = std::result::Result<T, CrashAnalysisError>;
