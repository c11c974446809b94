//! The six source tables and the column contract each must satisfy.
//!
//! Loaded batches are conformed to a fixed shape: required columns must be
//! present, the known integer columns become `Int64` and every other column
//! becomes `Utf8`.

use std::fmt;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::dataset::ColumnType;
use crate::error::{CrashAnalysisError, Result};

/// Column names used by the analyses
pub mod columns {
    pub const CRASH_ID: &str = "CRASH_ID";

    pub const CHARGE: &str = "CHARGE";

    pub const DAMAGED_PROPERTY: &str = "DAMAGED_PROPERTY";

    pub const PRSN_INJRY_SEV_ID: &str = "PRSN_INJRY_SEV_ID";
    pub const PRSN_GNDR_ID: &str = "PRSN_GNDR_ID";
    pub const PRSN_ETHNICITY_ID: &str = "PRSN_ETHNICITY_ID";
    pub const DRVR_LIC_STATE_ID: &str = "DRVR_LIC_STATE_ID";
    pub const DRVR_LIC_TYPE_ID: &str = "DRVR_LIC_TYPE_ID";
    pub const DRVR_ZIP: &str = "DRVR_ZIP";
    pub const DEATH_CNT: &str = "DEATH_CNT";

    pub const VEH_BODY_STYL_ID: &str = "VEH_BODY_STYL_ID";
    pub const VEH_MAKE_ID: &str = "VEH_MAKE_ID";
    pub const VEH_LIC_STATE_ID: &str = "VEH_LIC_STATE_ID";
    pub const VEH_COLOR_ID: &str = "VEH_COLOR_ID";
    pub const VEH_DMAG_SCL_1_ID: &str = "VEH_DMAG_SCL_1_ID";
    pub const VEH_DMAG_SCL_2_ID: &str = "VEH_DMAG_SCL_2_ID";
    pub const FIN_RESP_TYPE_ID: &str = "FIN_RESP_TYPE_ID";
    pub const CONTRIB_FACTR_1_ID: &str = "CONTRIB_FACTR_1_ID";
    pub const CONTRIB_FACTR_2_ID: &str = "CONTRIB_FACTR_2_ID";
    pub const TOT_INJRY_CNT: &str = "TOT_INJRY_CNT";
}

use columns::*;

/// One of the six source tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CrashTable {
    Charges,
    Damages,
    Endorse,
    #[serde(rename = "Primary_Person")]
    PrimaryPerson,
    Restrict,
    Units,
}

impl CrashTable {
    /// All tables in load order
    pub const ALL: [Self; 6] = [
        Self::Charges,
        Self::Damages,
        Self::Endorse,
        Self::PrimaryPerson,
        Self::Restrict,
        Self::Units,
    ];

    /// Canonical table name, as used in configuration files
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Charges => "Charges",
            Self::Damages => "Damages",
            Self::Endorse => "Endorse",
            Self::PrimaryPerson => "Primary_Person",
            Self::Restrict => "Restrict",
            Self::Units => "Units",
        }
    }

    /// Columns a source file for this table must provide
    ///
    /// The damage scale and financial responsibility columns are read from
    /// the Damages and Units join, so either table may carry them and
    /// neither requires them.
    #[must_use]
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::Charges => &[CRASH_ID, CHARGE],
            Self::Damages => &[CRASH_ID, DAMAGED_PROPERTY],
            Self::Endorse | Self::Restrict => &[CRASH_ID],
            Self::PrimaryPerson => &[
                CRASH_ID,
                PRSN_INJRY_SEV_ID,
                PRSN_GNDR_ID,
                DEATH_CNT,
                DRVR_LIC_STATE_ID,
                PRSN_ETHNICITY_ID,
                DRVR_ZIP,
                DRVR_LIC_TYPE_ID,
            ],
            Self::Units => &[
                CRASH_ID,
                VEH_BODY_STYL_ID,
                VEH_MAKE_ID,
                TOT_INJRY_CNT,
                DEATH_CNT,
                VEH_LIC_STATE_ID,
                VEH_COLOR_ID,
                CONTRIB_FACTR_1_ID,
                CONTRIB_FACTR_2_ID,
            ],
        }
    }

    /// Columns stored as integers; everything else is text
    #[must_use]
    pub fn integer_columns(self) -> &'static [&'static str] {
        match self {
            Self::PrimaryPerson => &[DEATH_CNT],
            Self::Units => &[TOT_INJRY_CNT, DEATH_CNT],
            _ => &[],
        }
    }

    #[must_use]
    pub fn column_type(self, column: &str) -> ColumnType {
        if self.integer_columns().contains(&column) {
            ColumnType::Integer
        } else {
            ColumnType::Text
        }
    }
}

impl fmt::Display for CrashTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check that `schema` carries every required column of `table`
pub fn validate_schema(table: CrashTable, schema: &Schema) -> Result<()> {
    for column in table.required_columns() {
        if schema.index_of(column).is_err() {
            return Err(CrashAnalysisError::schema_error(format!(
                "Table '{table}' is missing required column '{column}'"
            )));
        }
    }
    Ok(())
}

/// Bring a loaded batch to the shape the analyses expect
///
/// # Arguments
/// * `table` - The table the batch was read for
/// * `batch` - Batch as read from the source file
///
/// # Returns
/// A batch with the same columns in the same order, integer columns cast to
/// `Int64` (values that do not parse become null) and all others to `Utf8`
pub fn conform_batch(table: CrashTable, batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    validate_schema(table, &schema)?;

    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let target = table.column_type(field.name()).data_type();
        let converted = if array.data_type() == &target {
            Arc::clone(array)
        } else {
            log::debug!(
                "Casting {}.{} from {} to {target}",
                table,
                field.name(),
                array.data_type()
            );
            cast(array, &target)?
        };
        fields.push(Field::new(field.name(), target, true));
        arrays.push(converted);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// All-text schema for the given header names
#[must_use]
pub fn text_schema(names: &[String]) -> Schema {
    Schema::new(
        names
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    )
}
