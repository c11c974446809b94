//! Utility functions for error handling
//!
//! File access helpers that fail with the offending path attached.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{CrashAnalysisError, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(io_error(io::ErrorKind::NotFound, format!("File not found, needed for {purpose}"))
            .with_path(path));
    }

    if !path.is_file() {
        return Err(io_error(
            io::ErrorKind::InvalidInput,
            format!("Path is not a file, expected a file for {purpose}"),
        )
        .with_path(path));
    }

    fs::File::open(path).map_err(|e| {
        let message = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check file permissions".to_string()
            }
            _ => format!("Failed to open file for {purpose}: {e}"),
        };
        io_error(e.kind(), message).with_path(path)
    })
}

/// Safely read a file to string with rich error information
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    let mut file = safe_open_file(path, purpose)?;

    let mut content = String::new();
    match io::Read::read_to_string(&mut file, &mut content) {
        Ok(_) => Ok(content),
        Err(e) => {
            let message = match e.kind() {
                io::ErrorKind::InvalidData => {
                    "File contains invalid UTF-8 data - cannot read as text".to_string()
                }
                _ => format!("Failed to read file content for {purpose}: {e}"),
            };
            Err(io_error(e.kind(), message).with_path(path))
        }
    }
}

fn io_error(kind: io::ErrorKind, message: String) -> CrashAnalysisError {
    CrashAnalysisError::IoError(io::Error::new(kind, message))
}
