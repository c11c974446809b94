//! Source file loading
//!
//! Every table is read completely (CSV or Parquet), concatenated into a
//! single batch and conformed with [`conform_batch`] before it becomes a
//! [`Dataset`].

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::csv::ReaderBuilder;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;

use crate::analysis::CrashTables;
use crate::config::{AnalysisConfig, LoaderConfig};
use crate::dataset::Dataset;
use crate::error::util::safe_open_file;
use crate::error::{CrashAnalysisError, Result};
use crate::schema::{CrashTable, conform_batch, text_schema};
use crate::utils::{log_table_load_start, log_table_loaded, log_table_warning};

/// Source file formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Parquet,
}

impl SourceFormat {
    /// `.parquet` files are Parquet, anything else is read as CSV
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => Self::Parquet,
            _ => Self::Csv,
        }
    }
}

/// Load one table from `path`
///
/// # Arguments
/// * `table` - Which table the file holds
/// * `path` - CSV or Parquet source file
/// * `config` - Reader options
///
/// # Returns
/// The conformed dataset, named after the table
pub fn load_table(table: CrashTable, path: &Path, config: &LoaderConfig) -> Result<Dataset> {
    let start = Instant::now();
    log_table_load_start(table, path);

    let batch = match SourceFormat::from_path(path) {
        SourceFormat::Csv => read_csv(path, config),
        SourceFormat::Parquet => read_parquet(path, config),
    }
    .and_then(|batch| conform_batch(table, &batch))
    .map_err(|e| e.with_path(path))?;

    if batch.num_rows() == 0 {
        log_table_warning(table, "no rows after the header", Some(path));
    }
    log_table_loaded(
        table,
        path,
        batch.num_rows(),
        batch.num_columns(),
        Some(start.elapsed()),
    );

    Ok(Dataset::new(table.name(), batch))
}

/// Read a CSV file with a header row into a single all-text batch
pub fn read_csv(path: &Path, config: &LoaderConfig) -> Result<RecordBatch> {
    let delimiter = config.delimiter_byte()?;

    let mut header = String::new();
    BufReader::new(safe_open_file(path, "reading CSV header")?).read_line(&mut header)?;
    let names = parse_header(&header, char::from(delimiter));
    if names.is_empty() {
        return Err(CrashAnalysisError::schema_error(
            "CSV file is empty, expected a header row",
        ));
    }

    let schema = Arc::new(text_schema(&names));
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .with_delimiter(delimiter)
        .with_batch_size(config.batch_size)
        .build(safe_open_file(path, "reading CSV file")?)?;

    let batches = reader.collect::<std::result::Result<Vec<_>, ArrowError>>()?;
    log::debug!("Read {} CSV batches from {}", batches.len(), path.display());

    Ok(concat_batches(&schema, &batches)?)
}

/// Read a Parquet file into a single batch
pub fn read_parquet(path: &Path, config: &LoaderConfig) -> Result<RecordBatch> {
    let file = safe_open_file(path, "reading parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = Arc::clone(builder.schema());
    let reader = builder.with_batch_size(config.batch_size).build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, ArrowError>>()?;
    log::debug!("Read {} parquet batches from {}", batches.len(), path.display());

    Ok(concat_batches(&schema, &batches)?)
}

/// Split a header line into column names, dropping surrounding quotes
fn parse_header(line: &str, delimiter: char) -> Vec<String> {
    let line = line
        .trim_start_matches('\u{feff}')
        .trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Vec::new();
    }
    line.split(delimiter)
        .map(|name| name.trim().trim_matches('"').to_string())
        .collect()
}

/// Load all six tables named by `config`
///
/// Tables are read concurrently when `loader.parallel` is set. Every table
/// is fully loaded before this returns.
pub fn load_tables(config: &AnalysisConfig) -> Result<CrashTables> {
    let start = Instant::now();
    let load =
        |table: &CrashTable| load_table(*table, config.paths.input.path_for(*table), &config.loader);

    let datasets: Vec<Dataset> = if config.loader.parallel {
        CrashTable::ALL.par_iter().map(load).collect::<Result<_>>()?
    } else {
        CrashTable::ALL.iter().map(load).collect::<Result<_>>()?
    };

    let [charges, damages, endorse, primary_person, restrict, units] =
        <[Dataset; 6]>::try_from(datasets).map_err(|loaded| {
            CrashAnalysisError::invalid_operation(format!(
                "Expected 6 tables, loaded {}",
                loaded.len()
            ))
        })?;

    log::info!(
        "Loaded {} tables in {:?}",
        CrashTable::ALL.len(),
        start.elapsed()
    );

    Ok(CrashTables {
        charges,
        damages,
        endorse,
        primary_person,
        restrict,
        units,
    })
}
