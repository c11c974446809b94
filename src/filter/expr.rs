//! Expression-based row predicates
//!
//! This module provides the predicate language used by the filter operator.
//! Evaluation is two-valued: any comparison against a missing cell is
//! `false`, and [`Expr::Not`] is exact negation, so a predicate and its
//! negation always split a dataset into two disjoint parts.

use std::collections::HashSet;

use arrow::array::BooleanArray;
use arrow::compute::{and, not, or};
use rustc_hash::FxHashSet;

use crate::dataset::{ColumnView, Dataset, Value};
use crate::error::{CrashAnalysisError, Result};

/// Represents a filter expression over the columns of a dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column equals a literal value
    Eq(String, Value),

    /// Column does not equal a literal value
    NotEq(String, Value),

    /// Column is greater than an integer
    Gt(String, i64),

    /// Column is greater than or equal to an integer
    GtEq(String, i64),

    /// Column is less than an integer
    Lt(String, i64),

    /// Column is less than or equal to an integer
    LtEq(String, i64),

    /// Column is in a set of values
    In(String, Vec<Value>),

    /// Column is not in a set of values
    NotIn(String, Vec<Value>),

    /// Column is missing
    IsNull(String),

    /// Column is present
    IsNotNull(String),

    /// Column value contains a substring
    Contains(String, String),

    /// Column equals a literal after upper-casing both sides
    EqIgnoreCase(String, String),

    /// Column is in a set of literals after upper-casing both sides
    InIgnoreCase(String, Vec<String>),

    /// Column contains a substring after upper-casing both sides
    ContainsIgnoreCase(String, String),

    /// Column is missing or contains only whitespace
    IsBlank(String),

    /// Column holds `"<label> <level>"` text whose level is at least `threshold`
    TokenAtLeast { column: String, threshold: i64 },

    /// Logical AND of expressions
    And(Vec<Expr>),

    /// Logical OR of expressions
    Or(Vec<Expr>),

    /// Logical NOT of an expression
    Not(Box<Expr>),

    /// Always evaluates to true
    AlwaysTrue,

    /// Always evaluates to false
    AlwaysFalse,
}

impl Expr {
    /// The logical negation of this expression
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Returns a set of all column names required by this expression
    #[must_use]
    pub fn required_columns(&self) -> HashSet<String> {
        let mut columns = HashSet::new();
        self.collect_required_columns(&mut columns);
        columns
    }

    fn collect_required_columns(&self, columns: &mut HashSet<String>) {
        match self {
            Self::Eq(col, _)
            | Self::NotEq(col, _)
            | Self::Gt(col, _)
            | Self::GtEq(col, _)
            | Self::Lt(col, _)
            | Self::LtEq(col, _)
            | Self::In(col, _)
            | Self::NotIn(col, _)
            | Self::IsNull(col)
            | Self::IsNotNull(col)
            | Self::Contains(col, _)
            | Self::EqIgnoreCase(col, _)
            | Self::InIgnoreCase(col, _)
            | Self::ContainsIgnoreCase(col, _)
            | Self::IsBlank(col)
            | Self::TokenAtLeast { column: col, .. } => {
                columns.insert(col.clone());
            }
            Self::And(exprs) | Self::Or(exprs) => {
                for expr in exprs {
                    expr.collect_required_columns(columns);
                }
            }
            Self::Not(expr) => expr.collect_required_columns(columns),
            Self::AlwaysTrue | Self::AlwaysFalse => {}
        }
    }
}

/// Text values as literals for [`Expr::In`] and [`Expr::NotIn`]
#[must_use]
pub fn text_values(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

/// Extracts the level from damage-scale style text such as `"DAMAGED 4"`
///
/// The first whitespace-separated token after the leading label word that
/// parses as an integer is the level. Text without such a token (`"NO
/// DAMAGE"`, `"NA"`) has no level.
#[must_use]
pub fn labelled_level(text: &str) -> Option<i64> {
    text.split_whitespace()
        .skip(1)
        .find_map(|token| token.parse::<i64>().ok())
}

/// Evaluates a filter expression against a dataset
///
/// # Returns
/// A boolean array without nulls, one entry per row, `true` where the row
/// matches
pub fn evaluate_expr(dataset: &Dataset, expr: &Expr) -> Result<BooleanArray> {
    let rows = dataset.num_rows();

    match expr {
        Expr::AlwaysTrue => Ok(BooleanArray::from(vec![true; rows])),
        Expr::AlwaysFalse => Ok(BooleanArray::from(vec![false; rows])),

        Expr::And(exprs) => evaluate_and_expression(dataset, exprs),
        Expr::Or(exprs) => evaluate_or_expression(dataset, exprs),
        Expr::Not(inner) => Ok(not(&evaluate_expr(dataset, inner)?)?),

        Expr::Eq(col, literal) => {
            let view = dataset.column(col)?;
            Ok(mask(rows, |row| cell_equals(view, row, literal)))
        }
        Expr::NotEq(col, literal) => {
            let view = dataset.column(col)?;
            Ok(mask(rows, |row| !cell_equals(view, row, literal)))
        }

        Expr::Gt(col, n) => compare_number(dataset, col, |v| v > *n),
        Expr::GtEq(col, n) => compare_number(dataset, col, |v| v >= *n),
        Expr::Lt(col, n) => compare_number(dataset, col, |v| v < *n),
        Expr::LtEq(col, n) => compare_number(dataset, col, |v| v <= *n),

        Expr::In(col, literals) => evaluate_in_expression(dataset, col, literals, false),
        Expr::NotIn(col, literals) => evaluate_in_expression(dataset, col, literals, true),

        Expr::IsNull(col) => {
            let view = dataset.column(col)?;
            Ok(mask(rows, |row| view.is_null(row)))
        }
        Expr::IsNotNull(col) => {
            let view = dataset.column(col)?;
            Ok(mask(rows, |row| !view.is_null(row)))
        }

        Expr::Contains(col, needle) => {
            let view = text_column(dataset, col)?;
            Ok(mask(rows, |row| {
                view.text(row).is_some_and(|s| s.contains(needle.as_str()))
            }))
        }

        Expr::EqIgnoreCase(col, literal) => {
            let view = text_column(dataset, col)?;
            let literal = literal.to_uppercase();
            Ok(mask(rows, |row| {
                view.text(row).is_some_and(|s| s.to_uppercase() == literal)
            }))
        }
        Expr::InIgnoreCase(col, literals) => {
            let view = text_column(dataset, col)?;
            let literals: FxHashSet<String> = literals.iter().map(|s| s.to_uppercase()).collect();
            Ok(mask(rows, |row| {
                view.text(row)
                    .is_some_and(|s| literals.contains(&s.to_uppercase()))
            }))
        }
        Expr::ContainsIgnoreCase(col, needle) => {
            let view = text_column(dataset, col)?;
            let needle = needle.to_uppercase();
            Ok(mask(rows, |row| {
                view.text(row)
                    .is_some_and(|s| s.to_uppercase().contains(&needle))
            }))
        }

        Expr::IsBlank(col) => {
            let view = dataset.column(col)?;
            Ok(mask(rows, |row| {
                view.is_null(row) || view.text(row).is_some_and(|s| s.trim().is_empty())
            }))
        }

        Expr::TokenAtLeast { column, threshold } => {
            let view = dataset.column(column)?;
            Ok(mask(rows, |row| {
                view.text(row)
                    .and_then(labelled_level)
                    .is_some_and(|level| level >= *threshold)
            }))
        }
    }
}

/// Evaluates a logical AND expression
fn evaluate_and_expression(dataset: &Dataset, exprs: &[Expr]) -> Result<BooleanArray> {
    let Some((first, rest)) = exprs.split_first() else {
        return Ok(BooleanArray::from(vec![true; dataset.num_rows()]));
    };

    let mut result = evaluate_expr(dataset, first)?;
    for expr in rest {
        let mask = evaluate_expr(dataset, expr)?;
        result = and(&result, &mask)?;
    }

    Ok(result)
}

/// Evaluates a logical OR expression
fn evaluate_or_expression(dataset: &Dataset, exprs: &[Expr]) -> Result<BooleanArray> {
    let Some((first, rest)) = exprs.split_first() else {
        return Ok(BooleanArray::from(vec![false; dataset.num_rows()]));
    };

    let mut result = evaluate_expr(dataset, first)?;
    for expr in rest {
        let mask = evaluate_expr(dataset, expr)?;
        result = or(&result, &mask)?;
    }

    Ok(result)
}

/// Evaluates set membership; missing cells are never members
fn evaluate_in_expression(
    dataset: &Dataset,
    col: &str,
    literals: &[Value],
    negated: bool,
) -> Result<BooleanArray> {
    let view = dataset.column(col)?;
    let result = match view {
        ColumnView::Text(_) => {
            let set: FxHashSet<&str> = literals.iter().filter_map(Value::as_text).collect();
            mask(dataset.num_rows(), |row| {
                view.text(row).is_some_and(|s| set.contains(s)) != negated
            })
        }
        ColumnView::Integer(_) => {
            let set: FxHashSet<i64> = literals.iter().filter_map(Value::as_integer).collect();
            mask(dataset.num_rows(), |row| {
                view.number(row).is_some_and(|n| set.contains(&n)) != negated
            })
        }
    };
    Ok(result)
}

fn compare_number(
    dataset: &Dataset,
    col: &str,
    predicate: impl Fn(i64) -> bool,
) -> Result<BooleanArray> {
    let view = dataset.column(col)?;
    Ok(mask(dataset.num_rows(), |row| {
        view.number(row).is_some_and(&predicate)
    }))
}

fn text_column<'a>(dataset: &'a Dataset, col: &str) -> Result<ColumnView<'a>> {
    match dataset.column(col)? {
        view @ ColumnView::Text(_) => Ok(view),
        ColumnView::Integer(_) => Err(CrashAnalysisError::invalid_operation(format!(
            "Text comparison on integer column '{col}' of dataset '{}'",
            dataset.name()
        ))),
    }
}

fn cell_equals(view: ColumnView<'_>, row: usize, literal: &Value) -> bool {
    match (view, literal) {
        (ColumnView::Text(_), Value::Text(s)) => view.text(row) == Some(s.as_str()),
        (ColumnView::Integer(_), Value::Integer(n)) => view.number(row) == Some(*n),
        _ => false,
    }
}

fn mask(rows: usize, predicate: impl Fn(usize) -> bool) -> BooleanArray {
    BooleanArray::from((0..rows).map(predicate).collect::<Vec<bool>>())
}
