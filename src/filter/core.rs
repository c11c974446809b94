//! Core filtering functionality
//!
//! Applies boolean masks and predicate expressions to datasets.

use std::collections::HashSet;

use arrow::array::{Array, BooleanArray};
use arrow::compute::filter_record_batch as arrow_filter_record_batch;
use arrow::record_batch::RecordBatch;

use crate::dataset::Dataset;
use crate::error::{CrashAnalysisError, Result};
use crate::filter::expr::{Expr, evaluate_expr};

/// Filter a record batch based on a boolean mask
///
/// # Arguments
/// * `batch` - The record batch to filter
/// * `mask` - The boolean mask indicating which rows to keep
///
/// # Returns
/// A new record batch with only rows where mask is true
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(CrashAnalysisError::invalid_operation(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        )));
    }

    Ok(arrow_filter_record_batch(batch, mask)?)
}

/// Trait for predicates that can filter datasets
pub trait BatchFilter: std::fmt::Debug {
    /// Keep the rows of `dataset` this filter accepts
    fn filter(&self, dataset: &Dataset) -> Result<Dataset>;

    /// Returns the set of column names required by this filter
    fn required_columns(&self) -> HashSet<String>;
}

impl BatchFilter for Expr {
    fn filter(&self, dataset: &Dataset) -> Result<Dataset> {
        let mask = evaluate_expr(dataset, self)?;
        let batch = filter_record_batch(dataset.batch(), &mask)?;

        log::debug!(
            "Filter on '{}' kept {} of {} rows",
            dataset.name(),
            batch.num_rows(),
            dataset.num_rows()
        );

        Ok(Dataset::new(dataset.name(), batch))
    }

    fn required_columns(&self) -> HashSet<String> {
        Expr::required_columns(self)
    }
}

/// Keep the rows of `dataset` matching `expr`
pub fn filter(dataset: &Dataset, expr: &Expr) -> Result<Dataset> {
    expr.filter(dataset)
}

/// Apply several filters in sequence, stopping early once nothing is left
///
/// Every column the filters read must exist in `dataset`, even when it has
/// no rows.
pub fn apply_filters(dataset: &Dataset, filters: &[&dyn BatchFilter]) -> Result<Dataset> {
    let mut required: Vec<String> = filters
        .iter()
        .flat_map(|filter| filter.required_columns())
        .collect();
    required.sort_unstable();
    required.dedup();
    if let Some(column) = required.iter().find(|column| !dataset.has_column(column)) {
        return Err(CrashAnalysisError::column_not_found(column, dataset.name()));
    }

    let mut current = dataset.clone();
    for filter in filters {
        if current.is_empty() {
            break;
        }
        current = filter.filter(&current)?;
    }
    Ok(current)
}
