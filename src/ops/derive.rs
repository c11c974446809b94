//! Computed integer columns

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array};

use crate::dataset::{ColumnView, Dataset};
use crate::error::Result;

/// Integer expression over the columns of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericExpr {
    /// Numeric value of a column; text is parsed leniently
    Column(String),
    Literal(i64),
    /// Sum of both sides, missing if either side is missing
    Add(Box<NumericExpr>, Box<NumericExpr>),
}

impl NumericExpr {
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    #[must_use]
    pub fn add(self, other: NumericExpr) -> Self {
        Self::Add(Box::new(self), Box::new(other))
    }

    fn bind<'a>(&self, dataset: &'a Dataset) -> Result<Bound<'a>> {
        Ok(match self {
            Self::Column(name) => Bound::Column(dataset.column(name)?),
            Self::Literal(n) => Bound::Literal(*n),
            Self::Add(lhs, rhs) => {
                Bound::Add(Box::new(lhs.bind(dataset)?), Box::new(rhs.bind(dataset)?))
            }
        })
    }
}

/// A [`NumericExpr`] with its columns resolved against one dataset
enum Bound<'a> {
    Column(ColumnView<'a>),
    Literal(i64),
    Add(Box<Bound<'a>>, Box<Bound<'a>>),
}

impl Bound<'_> {
    fn eval(&self, row: usize) -> Option<i64> {
        match self {
            Self::Column(view) => view.number(row),
            Self::Literal(n) => Some(*n),
            Self::Add(lhs, rhs) => Some(lhs.eval(row)?.saturating_add(rhs.eval(row)?)),
        }
    }
}

/// Append an integer column `name` computed from `expr` for every row
pub fn derive_column(dataset: &Dataset, name: &str, expr: &NumericExpr) -> Result<Dataset> {
    let bound = expr.bind(dataset)?;
    let values: Vec<Option<i64>> = dataset.rows().map(|row| bound.eval(row)).collect();
    let column: ArrayRef = Arc::new(Int64Array::from(values));
    dataset.with_column(name, column)
}
