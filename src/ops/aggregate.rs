//! Group-by with a single aggregate

use rustc_hash::FxHashMap;

use crate::dataset::{ColumnType, Dataset, RowKey, Value, row_key};
use crate::error::Result;

/// Output column of [`Aggregate::Count`]
pub const COUNT_COLUMN: &str = "count";
/// Output column of [`Aggregate::Sum`]
pub const SUM_COLUMN: &str = "sum";

/// Aggregate computed per group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate {
    /// Number of rows in the group
    Count,
    /// Sum of a column; missing or non-numeric values count as zero
    Sum(String),
}

impl Aggregate {
    /// Name of the column holding the aggregate in the output
    #[must_use]
    pub fn output_column(&self) -> &'static str {
        match self {
            Self::Count => COUNT_COLUMN,
            Self::Sum(_) => SUM_COLUMN,
        }
    }
}

/// One row per distinct combination of `by`, plus the aggregate
///
/// Groups appear in order of their first row. With an empty `by` the whole
/// relation is one group, so the output always has exactly one row.
///
/// # Arguments
/// * `dataset` - Input relation
/// * `by` - Grouping columns; missing is a group value like any other
/// * `aggregate` - What to compute per group
pub fn group_aggregate(dataset: &Dataset, by: &[&str], aggregate: &Aggregate) -> Result<Dataset> {
    let key_views = dataset.column_views(by)?;
    let summed = match aggregate {
        Aggregate::Count => None,
        Aggregate::Sum(column) => Some(dataset.column(column)?),
    };

    let mut group_of: FxHashMap<RowKey, usize> = FxHashMap::default();
    let mut keys: Vec<RowKey> = Vec::new();
    let mut totals: Vec<i64> = Vec::new();

    for row in dataset.rows() {
        let key = row_key(&key_views, row);
        let group = match group_of.get(&key) {
            Some(&group) => group,
            None => {
                let group = keys.len();
                group_of.insert(key.clone(), group);
                keys.push(key);
                totals.push(0);
                group
            }
        };

        let delta = match &summed {
            None => 1,
            Some(view) => view.number(row).unwrap_or(0),
        };
        totals[group] = totals[group].saturating_add(delta);
    }

    if by.is_empty() && keys.is_empty() {
        keys.push(RowKey::new());
        totals.push(0);
    }

    let mut columns: Vec<(&str, ColumnType)> = by
        .iter()
        .zip(&key_views)
        .map(|(name, view)| (*name, view.column_type()))
        .collect();
    columns.push((aggregate.output_column(), ColumnType::Integer));

    let rows: Vec<Vec<Value>> = keys
        .into_iter()
        .zip(totals)
        .map(|(key, total)| {
            let mut row: Vec<Value> = key.into_vec();
            row.push(Value::Integer(total));
            row
        })
        .collect();

    log::debug!(
        "Grouped '{}' by {:?}: {} groups from {} rows",
        dataset.name(),
        by,
        rows.len(),
        dataset.num_rows()
    );

    Dataset::from_rows(dataset.name(), &columns, &rows)
}
