//! Relational analyses over road-crash tables.
//!
//! Six source tables are loaded into Arrow-backed [`Dataset`]s and queried
//! with a small set of relational operators (filter, projection, equi-join,
//! group-aggregate and tie-aware ranking) to answer a fixed set of questions.

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod format;
pub mod loader;
pub mod ops;
pub mod schema;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use analysis::{AnalysisId, AnalysisOutcome, AnalysisReport, Answer, CrashAnalysis, CrashTables};
pub use config::{AnalysisConfig, LoaderConfig};
pub use dataset::{ColumnType, Dataset, Value};
pub use error::{CrashAnalysisError, Result};
pub use schema::CrashTable;

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Operators
pub use filter::{Expr, apply_filters, evaluate_expr, filter};
pub use format::{column_listing, format_listing};
pub use ops::{
    Aggregate, NumericExpr, RankSpec, derive_column, equi_join, group_aggregate, project, rank,
    rank_at_most, rank_between,
};

// Loading
pub use loader::{load_table, load_tables};
