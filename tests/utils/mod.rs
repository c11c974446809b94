use std::fs;
use std::path::{Path, PathBuf};

use crash_analytics::schema::columns::{FIN_RESP_TYPE_ID, VEH_DMAG_SCL_1_ID, VEH_DMAG_SCL_2_ID};
use crash_analytics::{ColumnType, CrashTable, CrashTables, Dataset, Value};

/// Damage columns the severe-damage analysis reads from Damages or Units
pub const DAMAGE_ASSESSMENT: [&str; 3] = [VEH_DMAG_SCL_1_ID, VEH_DMAG_SCL_2_ID, FIN_RESP_TYPE_ID];

/// One fixture row: the columns it sets, everything else missing
pub type Row<'a> = Vec<(&'a str, Value)>;

/// Build a table carrying every required column of `kind`
///
/// Columns not set by a row are missing in that row; columns set by a row
/// but not required are appended with the type of their first value.
#[must_use]
pub fn table(kind: CrashTable, rows: &[Row<'_>]) -> Dataset {
    table_with_columns(kind, &[], rows)
}

/// Like [`table`], with `extra` text columns present even if no row sets them
#[must_use]
pub fn table_with_columns(kind: CrashTable, extra: &[&str], rows: &[Row<'_>]) -> Dataset {
    let mut columns: Vec<(&str, ColumnType)> = kind
        .required_columns()
        .iter()
        .map(|column| (*column, kind.column_type(column)))
        .chain(extra.iter().map(|column| (*column, ColumnType::Text)))
        .collect();

    for row in rows {
        for (name, value) in row {
            if !columns.iter().any(|(column, _)| column == name) {
                let column_type = match value {
                    Value::Integer(_) => ColumnType::Integer,
                    _ => ColumnType::Text,
                };
                columns.push((*name, column_type));
            }
        }
    }

    let values: Vec<Vec<Value>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|(column, _)| {
                    row.iter()
                        .find(|(name, _)| name == column)
                        .map_or(Value::Missing, |(_, value)| value.clone())
                })
                .collect()
        })
        .collect();

    Dataset::from_rows(kind.name(), &columns, &values).expect("fixture table should build")
}

/// All six tables with no rows; Damages carries the damage assessment columns
#[must_use]
pub fn empty_tables() -> CrashTables {
    CrashTables {
        charges: table(CrashTable::Charges, &[]),
        damages: table_with_columns(CrashTable::Damages, &DAMAGE_ASSESSMENT, &[]),
        endorse: table(CrashTable::Endorse, &[]),
        primary_person: table(CrashTable::PrimaryPerson, &[]),
        restrict: table(CrashTable::Restrict, &[]),
        units: table(CrashTable::Units, &[]),
    }
}

/// Shorthand for a text cell
#[must_use]
pub fn text(value: &str) -> Value {
    Value::from(value)
}

/// Write a CSV file with the given header and rows into `dir`
pub fn write_csv(dir: &Path, file_name: &str, header: &[&str], rows: &[&[&str]]) -> PathBuf {
    let mut content = header.join(",");
    content.push('\n');
    for row in rows {
        content.push_str(&row.join(","));
        content.push('\n');
    }
    let path = dir.join(file_name);
    fs::write(&path, content).expect("fixture CSV should be writable");
    path
}

/// Write a CSV for `table` whose header is exactly its required columns
pub fn write_required_csv(dir: &Path, table: CrashTable, rows: &[&[&str]]) -> PathBuf {
    write_csv(
        dir,
        &format!("{}_use.csv", table.name()),
        table.required_columns(),
        rows,
    )
}

/// Values of `column` rendered as strings
#[must_use]
pub fn strings(dataset: &Dataset, column: &str) -> Vec<String> {
    dataset
        .column_values(column)
        .expect("column should exist")
        .iter()
        .map(ToString::to_string)
        .collect()
}
