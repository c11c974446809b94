//! Column projection with optional duplicate removal

use rustc_hash::FxHashSet;

use crate::dataset::{Dataset, row_key};
use crate::error::{CrashAnalysisError, Result};

/// Keep only `columns`, in the given order
///
/// With `distinct`, rows whose projected values equal an earlier row are
/// dropped, so the first occurrence of every combination survives in input
/// order.
///
/// # Arguments
/// * `dataset` - The relation to project
/// * `columns` - Names of the columns to keep
/// * `distinct` - Whether to remove duplicate rows
///
/// # Returns
/// A new dataset with the same name and the projected columns
pub fn project(dataset: &Dataset, columns: &[&str], distinct: bool) -> Result<Dataset> {
    if columns.is_empty() {
        return Err(CrashAnalysisError::invalid_operation(format!(
            "Projection of '{}' needs at least one column",
            dataset.name()
        )));
    }

    let indices = columns
        .iter()
        .map(|column| dataset.column_index(column))
        .collect::<Result<Vec<usize>>>()?;
    let projected = Dataset::new(dataset.name(), dataset.batch().project(&indices)?);

    if !distinct {
        return Ok(projected);
    }

    let views = projected.column_views(columns)?;
    let mut seen = FxHashSet::default();
    let keep: Vec<usize> = projected
        .rows()
        .filter(|&row| seen.insert(row_key(&views, row)))
        .collect();

    log::debug!(
        "Distinct projection of '{}' kept {} of {} rows",
        dataset.name(),
        keep.len(),
        dataset.num_rows()
    );

    projected.take(&keep)
}
