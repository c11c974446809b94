//! Ordering within partitions with competition ranking
//!
//! Rows sharing an order value share a rank, and the next distinct value
//! skips ahead by the size of the tie: values `[10, 10, 10, 5, 5]` rank as
//! `[1, 1, 1, 4, 4]`.

use std::cmp::Ordering;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array};

use crate::dataset::{Dataset, RowKey, row_key};
use crate::error::Result;
use crate::filter::Expr;

/// Column added by [`rank`]
pub const RANK_COLUMN: &str = "rank";

/// How to partition and order rows before ranking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankSpec {
    partition_by: Vec<String>,
    order_by: String,
    tie_break: Vec<String>,
}

impl RankSpec {
    /// Rank by `column`, largest first
    pub fn by(column: impl Into<String>) -> Self {
        Self {
            order_by: column.into(),
            ..Self::default()
        }
    }

    /// Restart ranking for every distinct combination of `columns`
    #[must_use]
    pub fn partition_by(mut self, columns: &[&str]) -> Self {
        self.partition_by = columns.iter().map(ToString::to_string).collect();
        self
    }

    /// Columns ordering rows of equal rank ascending in the output
    ///
    /// Ties keep their shared rank; this only makes their output order
    /// deterministic.
    #[must_use]
    pub fn tie_break(mut self, columns: &[&str]) -> Self {
        self.tie_break = columns.iter().map(ToString::to_string).collect();
        self
    }
}

struct Ranked {
    partition: RowKey,
    order: Option<i64>,
    ties: RowKey,
    row: usize,
}

impl Ranked {
    fn cmp_output(&self, other: &Self) -> Ordering {
        self.partition
            .cmp(&other.partition)
            .then_with(|| other.order.cmp(&self.order))
            .then_with(|| self.ties.cmp(&other.ties))
            .then_with(|| self.row.cmp(&other.row))
    }
}

/// Sort rows and append a [`RANK_COLUMN`] with their competition rank
///
/// Output is ordered by partition ascending, then order value descending
/// with missing values last, then tie-break columns ascending. The order
/// column is read numerically; values that are not numbers rank last.
pub fn rank(dataset: &Dataset, spec: &RankSpec) -> Result<Dataset> {
    let partition_names: Vec<&str> = spec.partition_by.iter().map(String::as_str).collect();
    let tie_names: Vec<&str> = spec.tie_break.iter().map(String::as_str).collect();

    let partition_views = dataset.column_views(&partition_names)?;
    let tie_views = dataset.column_views(&tie_names)?;
    let order_view = dataset.column(&spec.order_by)?;

    let mut entries: Vec<Ranked> = dataset
        .rows()
        .map(|row| Ranked {
            partition: row_key(&partition_views, row),
            order: order_view.number(row),
            ties: row_key(&tie_views, row),
            row,
        })
        .collect();
    entries.sort_by(Ranked::cmp_output);

    let mut ranks = Vec::with_capacity(entries.len());
    let mut position = 0_i64;
    let mut current_rank = 0_i64;
    for (idx, entry) in entries.iter().enumerate() {
        let previous = idx.checked_sub(1).map(|p| &entries[p]);
        match previous {
            Some(prev) if prev.partition == entry.partition => {
                position += 1;
                if prev.order != entry.order {
                    current_rank = position;
                }
            }
            _ => {
                position = 1;
                current_rank = 1;
            }
        }
        ranks.push(current_rank);
    }

    let order: Vec<usize> = entries.iter().map(|e| e.row).collect();
    let sorted = dataset.take(&order)?;
    let column: ArrayRef = Arc::new(Int64Array::from(ranks));

    log::debug!(
        "Ranked {} rows of '{}' by {} in partitions {:?}",
        dataset.num_rows(),
        dataset.name(),
        spec.order_by,
        spec.partition_by
    );

    sorted.with_column(RANK_COLUMN, column)
}

/// Predicate keeping rows ranked `k` or better
#[must_use]
pub fn rank_at_most(k: i64) -> Expr {
    Expr::LtEq(RANK_COLUMN.to_string(), k)
}

/// Predicate keeping rows ranked in `lo..=hi`; all tied rows at the edges pass
#[must_use]
pub fn rank_between(lo: i64, hi: i64) -> Expr {
    Expr::And(vec![
        Expr::GtEq(RANK_COLUMN.to_string(), lo),
        Expr::LtEq(RANK_COLUMN.to_string(), hi),
    ])
}
