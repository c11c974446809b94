//! Immutable in-memory relations
//!
//! A [`Dataset`] is a named Arrow `RecordBatch` whose columns are either text
//! (`Utf8`) or integer (`Int64`). Operators never mutate a dataset; they
//! build new ones from row indices with [`Dataset::take`] or from scratch with
//! [`Dataset::from_rows`].

use std::ops::Range;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Int64Array, Int64Builder, StringArray, StringBuilder, UInt32Array,
};
use arrow::compute;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use smallvec::SmallVec;

use crate::error::{CrashAnalysisError, Result};

pub mod value;

pub use value::Value;

/// Composite key built from the values of several columns of one row
pub type RowKey = SmallVec<[Value; 2]>;

/// Logical column types understood by the operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Free text (Arrow `Utf8`)
    Text,
    /// 64-bit integer (Arrow `Int64`)
    Integer,
}

impl ColumnType {
    /// The Arrow type backing this column type
    #[must_use]
    pub fn data_type(self) -> DataType {
        match self {
            Self::Text => DataType::Utf8,
            Self::Integer => DataType::Int64,
        }
    }

    /// Maps an Arrow type back to a column type, if supported
    #[must_use]
    pub fn from_data_type(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::Utf8 => Some(Self::Text),
            DataType::Int64 => Some(Self::Integer),
            _ => None,
        }
    }
}

/// Typed, borrowed view of one column
#[derive(Debug, Clone, Copy)]
pub enum ColumnView<'a> {
    Text(&'a StringArray),
    Integer(&'a Int64Array),
}

impl<'a> ColumnView<'a> {
    /// Number of rows in the column
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(array) => array.len(),
            Self::Integer(array) => array.len(),
        }
    }

    /// Returns `true` if the column has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical type of the column
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Text(_) => ColumnType::Text,
            Self::Integer(_) => ColumnType::Integer,
        }
    }

    /// Whether the cell at `row` is missing
    #[must_use]
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Self::Text(array) => array.is_null(row),
            Self::Integer(array) => array.is_null(row),
        }
    }

    /// Owned value of the cell at `row`
    #[must_use]
    pub fn value(&self, row: usize) -> Value {
        if self.is_null(row) {
            return Value::Missing;
        }
        match self {
            Self::Text(array) => Value::Text(array.value(row).to_string()),
            Self::Integer(array) => Value::Integer(array.value(row)),
        }
    }

    /// Borrowed text of the cell at `row`; `None` when missing or when the
    /// column is not a text column
    #[must_use]
    pub fn text(&self, row: usize) -> Option<&'a str> {
        match *self {
            Self::Text(array) if !array.is_null(row) => Some(array.value(row)),
            _ => None,
        }
    }

    /// Numeric reading of the cell at `row`: integers as-is, text parsed
    /// leniently, `None` when missing or unparseable
    #[must_use]
    pub fn number(&self, row: usize) -> Option<i64> {
        match *self {
            Self::Integer(array) if !array.is_null(row) => Some(array.value(row)),
            Self::Text(array) if !array.is_null(row) => array.value(row).trim().parse().ok(),
            _ => None,
        }
    }
}

/// Builds the composite key of `row` over the given column views
#[must_use]
pub fn row_key(views: &[ColumnView<'_>], row: usize) -> RowKey {
    views.iter().map(|view| view.value(row)).collect()
}

/// An immutable, named relation
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    batch: RecordBatch,
}

impl Dataset {
    /// Wrap an existing record batch
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
        }
    }

    /// Build a dataset from row-major values
    ///
    /// Every row must have one value per column, and each value must be
    /// [`Value::Missing`] or match its column's type.
    pub fn from_rows(
        name: impl Into<String>,
        columns: &[(&str, ColumnType)],
        rows: &[Vec<Value>],
    ) -> Result<Self> {
        let name = name.into();
        if columns.is_empty() {
            return Err(CrashAnalysisError::invalid_operation(format!(
                "Dataset '{name}' needs at least one column"
            )));
        }

        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(CrashAnalysisError::invalid_operation(format!(
                "Row {idx} of dataset '{name}' has {} values, expected {}",
                row.len(),
                columns.len()
            )));
        }

        let fields: Vec<Field> = columns
            .iter()
            .map(|(column, kind)| Field::new(*column, kind.data_type(), true))
            .collect();

        let arrays = columns
            .iter()
            .enumerate()
            .map(|(col_idx, (column, kind))| build_array(&name, column, *kind, rows, col_idx))
            .collect::<Result<Vec<ArrayRef>>>()?;

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self { name, batch })
    }

    /// Name of the relation, used in error messages and join renames
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing record batch
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Row indices of the relation
    #[must_use]
    pub fn rows(&self) -> Range<usize> {
        0..self.batch.num_rows()
    }

    /// Column names in schema order
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.batch.schema().index_of(column).is_ok()
    }

    /// Position of `column` in the schema
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.batch
            .schema()
            .index_of(column)
            .map_err(|_| CrashAnalysisError::column_not_found(column, &self.name))
    }

    /// Typed view of `column`
    pub fn column(&self, column: &str) -> Result<ColumnView<'_>> {
        let idx = self.column_index(column)?;
        let array = self.batch.column(idx);

        match array.data_type() {
            DataType::Utf8 => array
                .as_any()
                .downcast_ref::<StringArray>()
                .map(ColumnView::Text),
            DataType::Int64 => array
                .as_any()
                .downcast_ref::<Int64Array>()
                .map(ColumnView::Integer),
            _ => None,
        }
        .ok_or_else(|| CrashAnalysisError::UnsupportedColumnType {
            column: column.to_string(),
            data_type: array.data_type().clone(),
        })
    }

    /// Typed views of several columns, in the given order
    pub fn column_views(&self, columns: &[&str]) -> Result<Vec<ColumnView<'_>>> {
        columns.iter().map(|column| self.column(column)).collect()
    }

    /// Value at `row` in `column`
    pub fn value(&self, row: usize, column: &str) -> Result<Value> {
        if row >= self.num_rows() {
            return Err(CrashAnalysisError::invalid_operation(format!(
                "Row {row} out of bounds for dataset '{}' with {} rows",
                self.name,
                self.num_rows()
            )));
        }
        Ok(self.column(column)?.value(row))
    }

    /// All values of `column` in row order
    pub fn column_values(&self, column: &str) -> Result<Vec<Value>> {
        let view = self.column(column)?;
        Ok(self.rows().map(|row| view.value(row)).collect())
    }

    /// The same rows with `column` appended as the last column
    pub fn with_column(&self, name: &str, column: ArrayRef) -> Result<Self> {
        if self.has_column(name) {
            return Err(CrashAnalysisError::invalid_operation(format!(
                "Column '{name}' already exists in dataset '{}'",
                self.name
            )));
        }
        if ColumnType::from_data_type(column.data_type()).is_none() {
            return Err(CrashAnalysisError::UnsupportedColumnType {
                column: name.to_string(),
                data_type: column.data_type().clone(),
            });
        }

        let schema = self.batch.schema();
        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        fields.push(Field::new(name, column.data_type().clone(), true));

        let mut columns = self.batch.columns().to_vec();
        columns.push(column);

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        Ok(Self::new(self.name.clone(), batch))
    }

    /// Gather the rows at `indices` (in that order) into a new dataset
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        let indices = indices
            .iter()
            .map(|&idx| {
                u32::try_from(idx).map_err(|_| {
                    CrashAnalysisError::invalid_operation(format!(
                        "Row index {idx} exceeds the supported dataset size"
                    ))
                })
            })
            .collect::<Result<Vec<u32>>>()?;
        let indices = UInt32Array::from(indices);

        let columns = self
            .batch
            .columns()
            .iter()
            .map(|column| compute::take(column.as_ref(), &indices, None))
            .collect::<arrow::error::Result<Vec<ArrayRef>>>()?;

        let batch = if columns.is_empty() {
            RecordBatch::new_empty(self.batch.schema())
        } else {
            RecordBatch::try_new(self.batch.schema(), columns)?
        };

        Ok(Self::new(self.name.clone(), batch))
    }
}

fn build_array(
    dataset: &str,
    column: &str,
    kind: ColumnType,
    rows: &[Vec<Value>],
    col_idx: usize,
) -> Result<ArrayRef> {
    let mismatch = |value: &Value| {
        CrashAnalysisError::invalid_operation(format!(
            "Value {value:?} does not fit {kind:?} column '{column}' of dataset '{dataset}'"
        ))
    };

    match kind {
        ColumnType::Text => {
            let mut builder = StringBuilder::with_capacity(rows.len(), rows.len() * 8);
            for row in rows {
                match &row[col_idx] {
                    Value::Text(s) => builder.append_value(s),
                    Value::Missing => builder.append_null(),
                    other @ Value::Integer(_) => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()) as ArrayRef)
        }
        ColumnType::Integer => {
            let mut builder = Int64Builder::with_capacity(rows.len());
            for row in rows {
                match &row[col_idx] {
                    Value::Integer(n) => builder.append_value(*n),
                    Value::Missing => builder.append_null(),
                    other @ Value::Text(_) => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()) as ArrayRef)
        }
    }
}
