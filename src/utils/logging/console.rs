//! Console output utilities
//!
//! Text rendering of analysis results for the terminal.

use std::fmt::Write;

use crate::dataset::Value;

/// Line of `*` framing the analysis output
pub const BANNER: &str =
    "***************************************************************************";

/// Number of [`BANNER`] lines above and below the answers
pub const BANNER_LINES: usize = 3;

/// Render a header and row-major values as a boxed text table
///
/// Cells are right-aligned; missing values render as empty cells.
#[must_use]
pub fn format_table(headers: &[String], rows: &[Vec<Value>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            cells
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let separator = widths.iter().fold(String::from("+"), |mut line, width| {
        line.push_str(&"-".repeat(*width));
        line.push('+');
        line
    });

    let mut out = String::new();
    let _ = writeln!(out, "{separator}");
    let _ = writeln!(out, "{}", table_row(headers.iter().map(String::as_str), &widths));
    let _ = writeln!(out, "{separator}");
    for row in &cells {
        let _ = writeln!(out, "{}", table_row(row.iter().map(String::as_str), &widths));
    }
    let _ = write!(out, "{separator}");
    out
}

fn table_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.zip(widths) {
        let _ = write!(line, "{cell:>width$}|");
    }
    line
}

/// Print a numbered question title and its answer
pub fn print_answer(number: u8, title: &str, answer: &str) {
    println!("{number}. {title}");
    println!("{answer}");
    println!();
}

/// The block of banner lines printed before and after the answers
#[must_use]
pub fn banner() -> String {
    vec![BANNER; BANNER_LINES].join("\n")
}

pub fn print_banner() {
    println!("{}", banner());
}
