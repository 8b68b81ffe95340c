//! The in-memory data frame.
//!
//! A [`DataFrame`] is an ordered sequence of named `f64` columns of equal
//! length, carrying an object name. Columns are Arrow [`Float64Array`]s so
//! frames convert cheaply to and from [`RecordBatch`] for downstream
//! columnar tooling, and render through Arrow's pretty printer.

pub mod block;

use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use snafu::prelude::*;

/// Errors raised while constructing or converting a frame.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FrameError {
    /// The frame name is empty or blank.
    #[snafu(display("The frame must be named"))]
    UnnamedFrame,

    /// The frame has no columns at all.
    #[snafu(display("The frame must have at least one column"))]
    NoColumns,

    /// The number of column names differs from the number of columns.
    #[snafu(display("{names} column names for {columns} columns"))]
    ColumnCountMismatch {
        /// Number of names supplied.
        names: usize,
        /// Number of data columns supplied.
        columns: usize,
    },

    /// A column's length differs from the first column's length.
    #[snafu(display(
        "Column {column:?} has {found} rows, expected {expected}"
    ))]
    ColumnLengthMismatch {
        /// Name of the offending column.
        column: String,
        /// Row count of the first column.
        expected: usize,
        /// Row count of the offending column.
        found: usize,
    },

    /// Two columns share the same name.
    #[snafu(display("Duplicate column name {column:?}"))]
    DuplicateColumn {
        /// The repeated name.
        column: String,
    },

    /// A column name is empty or blank.
    #[snafu(display("Column names must not be blank"))]
    EmptyColumnName,

    /// A column contains null values, which the on-disk format cannot
    /// represent.
    #[snafu(display("Column {column:?} contains nulls"))]
    NullsUnsupported {
        /// Name of the offending column.
        column: String,
    },

    /// A record batch column is not a `Float64` array.
    #[snafu(display("Column {column:?} is not Float64"))]
    NonNumericColumn {
        /// Name of the offending column.
        column: String,
    },

    /// A row-major value buffer does not hold `rows * cols` values.
    #[snafu(display("{len} values for a {rows}x{cols} payload"))]
    ValueCountMismatch {
        /// Declared row count.
        rows: usize,
        /// Declared column count.
        cols: usize,
        /// Number of values actually supplied.
        len: usize,
    },
}

/// An ordered collection of named, equal-length `f64` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    name: String,
    column_names: Vec<String>,
    columns: Vec<Float64Array>,
}

impl DataFrame {
    /// Build a frame from named columns.
    ///
    /// # Errors
    ///
    /// Rejects blank frame names, zero columns, name/column count
    /// disagreement, blank or duplicate column names, unequal column
    /// lengths, and columns containing nulls.
    pub fn new(
        name: impl Into<String>,
        column_names: Vec<String>,
        columns: Vec<Float64Array>,
    ) -> Result<Self, FrameError> {
        let name = name.into();
        ensure!(!name.trim().is_empty(), UnnamedFrameSnafu);
        ensure!(!columns.is_empty(), NoColumnsSnafu);
        ensure!(
            column_names.len() == columns.len(),
            ColumnCountMismatchSnafu {
                names: column_names.len(),
                columns: columns.len(),
            }
        );

        for (i, col_name) in column_names.iter().enumerate() {
            ensure!(!col_name.trim().is_empty(), EmptyColumnNameSnafu);
            ensure!(
                !column_names[..i].contains(col_name),
                DuplicateColumnSnafu {
                    column: col_name.clone()
                }
            );
        }

        let expected = columns[0].len();
        for (col_name, column) in column_names.iter().zip(&columns) {
            ensure!(
                column.len() == expected,
                ColumnLengthMismatchSnafu {
                    column: col_name.clone(),
                    expected,
                    found: column.len(),
                }
            );
            ensure!(
                column.null_count() == 0,
                NullsUnsupportedSnafu {
                    column: col_name.clone()
                }
            );
        }

        Ok(DataFrame {
            name,
            column_names,
            columns,
        })
    }

    /// Build a frame from a row-major value buffer of shape `rows x cols`.
    ///
    /// The column count is taken from the payload shape; the name list must
    /// agree with it.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ColumnCountMismatch`] when the name count and
    /// payload width disagree, plus any [`DataFrame::new`] validation error.
    pub fn from_row_major(
        name: impl Into<String>,
        column_names: Vec<String>,
        rows: usize,
        cols: usize,
        values: &[f64],
    ) -> Result<Self, FrameError> {
        ensure!(
            column_names.len() == cols,
            ColumnCountMismatchSnafu {
                names: column_names.len(),
                columns: cols,
            }
        );
        ensure!(
            values.len() == rows * cols,
            ValueCountMismatchSnafu {
                rows,
                cols,
                len: values.len(),
            }
        );

        let columns = (0..cols)
            .map(|c| {
                let column: Vec<f64> = (0..rows).map(|r| values[r * cols + c]).collect();
                Float64Array::from(column)
            })
            .collect();

        Self::new(name, column_names, columns)
    }

    /// The frame's object name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.columns[0].len()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// The column at position `index`.
    pub fn column(&self, index: usize) -> &Float64Array {
        &self.columns[index]
    }

    /// The column named `name`, if present.
    pub fn column_by_name(&self, name: &str) -> Option<&Float64Array> {
        self.column_names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Flatten the frame into a row-major value buffer.
    pub fn values_row_major(&self) -> Vec<f64> {
        let rows = self.num_rows();
        let mut out = Vec::with_capacity(rows * self.num_columns());
        for r in 0..rows {
            for column in &self.columns {
                out.push(column.value(r));
            }
        }
        out
    }

    /// Convert the frame into an Arrow [`RecordBatch`] with an all-`Float64`
    /// schema.
    ///
    /// # Errors
    ///
    /// Propagates Arrow's batch validation error; a frame that passed
    /// construction always converts.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let fields: Vec<Field> = self
            .column_names
            .iter()
            .map(|n| Field::new(n, DataType::Float64, false))
            .collect();
        let arrays: Vec<ArrayRef> = self
            .columns
            .iter()
            .map(|c| Arc::new(c.clone()) as ArrayRef)
            .collect();
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
    }

    /// Build a frame from an Arrow [`RecordBatch`] whose columns are all
    /// `Float64`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::NonNumericColumn`] for any non-`Float64`
    /// column, plus any [`DataFrame::new`] validation error.
    pub fn from_record_batch(
        name: impl Into<String>,
        batch: &RecordBatch,
    ) -> Result<Self, FrameError> {
        let mut column_names = Vec::with_capacity(batch.num_columns());
        let mut columns = Vec::with_capacity(batch.num_columns());
        for (field, array) in batch.schema().fields().iter().zip(batch.columns()) {
            let column = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .context(NonNumericColumnSnafu {
                    column: field.name().clone(),
                })?;
            column_names.push(field.name().clone());
            columns.push(column.clone());
        }
        Self::new(name, column_names, columns)
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let batch = self.to_record_batch().map_err(|_| fmt::Error)?;
        let table = pretty_format_batches(&[batch]).map_err(|_| fmt::Error)?;
        write!(f, "{table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(values: &[f64]) -> Float64Array {
        Float64Array::from(values.to_vec())
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_accepts_equal_length_named_columns() {
        let frame = DataFrame::new(
            "sample",
            names(&["A", "B"]),
            vec![col(&[1.0, 2.0]), col(&[3.0, 4.0])],
        )
        .expect("valid frame");

        assert_eq!(frame.name(), "sample");
        assert_eq!(frame.num_rows(), 2);
        assert_eq!(frame.num_columns(), 2);
        assert_eq!(frame.column_by_name("B").map(|c| c.value(0)), Some(3.0));
    }

    #[test]
    fn new_rejects_blank_name() {
        let err = DataFrame::new("  ", names(&["A"]), vec![col(&[1.0])])
            .expect_err("expected UnnamedFrame");
        assert!(matches!(err, FrameError::UnnamedFrame));
    }

    #[test]
    fn new_rejects_name_count_mismatch() {
        let err = DataFrame::new("f", names(&["A", "B"]), vec![col(&[1.0])])
            .expect_err("expected ColumnCountMismatch");
        assert!(matches!(
            err,
            FrameError::ColumnCountMismatch {
                names: 2,
                columns: 1
            }
        ));
    }

    #[test]
    fn new_rejects_unequal_column_lengths() {
        let err = DataFrame::new(
            "f",
            names(&["A", "B"]),
            vec![col(&[1.0, 2.0]), col(&[3.0])],
        )
        .expect_err("expected ColumnLengthMismatch");
        assert!(matches!(err, FrameError::ColumnLengthMismatch { .. }));
    }

    #[test]
    fn new_rejects_duplicate_column_names() {
        let err = DataFrame::new(
            "f",
            names(&["A", "A"]),
            vec![col(&[1.0]), col(&[2.0])],
        )
        .expect_err("expected DuplicateColumn");
        assert!(matches!(err, FrameError::DuplicateColumn { .. }));
    }

    #[test]
    fn new_rejects_nulls() {
        let column = Float64Array::from(vec![Some(1.0), None]);
        let err = DataFrame::new("f", names(&["A"]), vec![column])
            .expect_err("expected NullsUnsupported");
        assert!(matches!(err, FrameError::NullsUnsupported { .. }));
    }

    #[test]
    fn row_major_roundtrip_preserves_order() {
        let frame = DataFrame::new(
            "f",
            names(&["A", "B", "C"]),
            vec![
                col(&[1.0, 4.0]),
                col(&[2.0, 5.0]),
                col(&[3.0, 6.0]),
            ],
        )
        .expect("valid frame");

        let flat = frame.values_row_major();
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let back = DataFrame::from_row_major("f", names(&["A", "B", "C"]), 2, 3, &flat)
            .expect("rebuild from row-major");
        assert_eq!(back, frame);
    }

    #[test]
    fn from_row_major_rejects_width_mismatch() {
        let err = DataFrame::from_row_major("f", names(&["A", "B"]), 2, 3, &[0.0; 6])
            .expect_err("expected ColumnCountMismatch");
        assert!(matches!(err, FrameError::ColumnCountMismatch { .. }));
    }

    #[test]
    fn record_batch_roundtrip() {
        let frame = DataFrame::new(
            "f",
            names(&["A", "B"]),
            vec![col(&[1.0, 2.0]), col(&[3.0, 4.0])],
        )
        .expect("valid frame");

        let batch = frame.to_record_batch().expect("to batch");
        assert_eq!(batch.num_rows(), 2);

        let back = DataFrame::from_record_batch("f", &batch).expect("from batch");
        assert_eq!(back, frame);
    }

    #[test]
    fn display_renders_column_headers() {
        let frame = DataFrame::new("f", names(&["A"]), vec![col(&[1.5])])
            .expect("valid frame");
        let rendered = frame.to_string();
        assert!(rendered.contains('A'));
        assert!(rendered.contains("1.5"));
    }
}
