//! Human-readable listings of analysis results

use std::fmt::Display;

use itertools::Itertools;

use crate::dataset::Dataset;
use crate::error::Result;

/// Separator between listed values
pub const LISTING_SEPARATOR: &str = ", ";

/// Join values with [`LISTING_SEPARATOR`]; an empty input gives `""`
pub fn format_listing<I>(values: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    values.into_iter().join(LISTING_SEPARATOR)
}

/// Listing of `column` in row order, skipping missing cells
///
/// A missing value has no text to list, so the result never holds an empty
/// entry or ends with a separator.
pub fn column_listing(dataset: &Dataset, column: &str) -> Result<String> {
    let values = dataset.column_values(column)?;
    Ok(format_listing(
        values.iter().filter(|value| !value.is_missing()),
    ))
}
