//! Logging utilities for output and progress tracking
//!
//! This module provides utilities for logging, console output, and progress tracking.

pub mod console;
pub mod log;
pub mod progress;

// Re-export commonly used functions for convenience
pub use log::{log_table_load_start, log_table_loaded, log_table_warning};
pub use progress::{create_spinner, finish_and_clear};
