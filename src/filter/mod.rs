//! Filtering capabilities
//!
//! This module provides a flexible expression-based filtering system for
//! datasets, allowing you to keep rows based on column values.

pub mod core;
pub mod expr;

pub use self::core::{BatchFilter, apply_filters, filter, filter_record_batch};
pub use self::expr::{Expr, evaluate_expr, labelled_level, text_values};
