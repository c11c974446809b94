//! Inner equi-join on a single shared key column

use arrow::array::ArrayRef;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::sync::Arc;

use crate::dataset::{Dataset, Value};
use crate::error::{CrashAnalysisError, Result};

/// Inner join of `left` and `right` on equality of `key`
///
/// The output holds the key once, then the remaining left columns, then the
/// remaining right columns. A right column whose name is already taken is
/// renamed to `"<right name>.<column>"`. Rows come out in left order, and
/// for each left row its matches come in right order. Missing keys never
/// match.
pub fn equi_join(left: &Dataset, right: &Dataset, key: &str) -> Result<Dataset> {
    let left_keys = left.column(key)?;
    let right_keys = right.column(key)?;

    if left_keys.column_type() != right_keys.column_type() {
        return Err(CrashAnalysisError::invalid_operation(format!(
            "Join key '{key}' has different types in '{}' and '{}'",
            left.name(),
            right.name()
        )));
    }

    let mut lookup: FxHashMap<Value, SmallVec<[usize; 4]>> = FxHashMap::default();
    for row in right.rows() {
        let value = right_keys.value(row);
        if !value.is_missing() {
            lookup.entry(value).or_default().push(row);
        }
    }

    let mut left_rows = Vec::new();
    let mut right_rows = Vec::new();
    for row in left.rows() {
        if let Some(matches) = lookup.get(&left_keys.value(row)) {
            for &matched in matches {
                left_rows.push(row);
                right_rows.push(matched);
            }
        }
    }

    let left_taken = left.take(&left_rows)?;
    let right_taken = right.take(&right_rows)?;

    let mut fields: Vec<Field> = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();
    let mut taken_names = FxHashSet::default();

    let key_idx = left.column_index(key)?;
    fields.push(left.schema().field(key_idx).clone());
    columns.push(Arc::clone(left_taken.batch().column(key_idx)));
    taken_names.insert(key.to_string());

    let left_schema = left.schema();
    for (idx, field) in left_schema.fields().iter().enumerate() {
        if idx == key_idx {
            continue;
        }
        taken_names.insert(field.name().clone());
        fields.push(field.as_ref().clone());
        columns.push(Arc::clone(left_taken.batch().column(idx)));
    }

    let right_schema = right.schema();
    for (idx, field) in right_schema.fields().iter().enumerate() {
        if field.name() == key {
            continue;
        }
        let name = if taken_names.contains(field.name()) {
            format!("{}.{}", right.name(), field.name())
        } else {
            field.name().clone()
        };
        taken_names.insert(name.clone());
        fields.push(field.as_ref().clone().with_name(name));
        columns.push(Arc::clone(right_taken.batch().column(idx)));
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;

    log::debug!(
        "Joined '{}' ({} rows) with '{}' ({} rows) on {key}: {} rows",
        left.name(),
        left.num_rows(),
        right.name(),
        right.num_rows(),
        batch.num_rows()
    );

    Ok(Dataset::new(
        format!("{}_{}", left.name(), right.name()),
        batch,
    ))
}
