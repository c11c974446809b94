//! Log lines for table loading
//!
//! Loading reports go through these helpers so every table is announced,
//! summarised and flagged in the same shape.

use std::path::Path;
use std::time::Duration;

use crate::schema::CrashTable;

/// Announce that `table` is being read from `path`
pub fn log_table_load_start(table: CrashTable, path: &Path) {
    log::info!("Loading {table} from {}", path.display());
}

/// Summarise a finished load: row and column counts plus elapsed time
pub fn log_table_loaded(
    table: CrashTable,
    path: &Path,
    rows: usize,
    columns: usize,
    elapsed: Option<Duration>,
) {
    match elapsed {
        Some(duration) => log::info!(
            "Loaded {table}: {rows} rows x {columns} columns from {} in {duration:?}",
            path.display()
        ),
        None => log::info!(
            "Loaded {table}: {rows} rows x {columns} columns from {}",
            path.display()
        ),
    }
}

/// Flag suspicious content in a loaded table
pub fn log_table_warning(table: CrashTable, message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{table}: {message} ({})", path.display()),
        None => log::warn!("{table}: {message}"),
    }
}
