//! Shared helpers for logging, progress and console output

pub mod logging;

pub use logging::{log_table_load_start, log_table_loaded, log_table_warning};
