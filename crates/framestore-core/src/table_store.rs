//! The table layout: keyed, per-column, indexed frame storage.
//!
//! A [`TableStore`] persists frames under string keys inside one container
//! file. Each stored table is laid out column-wise:
//!
//! - `/<key>`: attributes `format` = `table`, `name`, `column_names`.
//! - `/<key>/col/<column>`: one 1-D dataset per column.
//! - `/<key>/index/<column>`: the row permutation sorting that column
//!   ascending, one per column.
//!
//! The per-column indexes are what make the layout queryable: a closed
//! value range over any column resolves through its index without scanning
//! unsorted rows. Appends rewrite the whole file, so every commit is a
//! single atomic rename.
//!
//! This layout is intentionally not readable through
//! [`DataFrame::from_block`]: the block layout stores one dense payload
//! behind root-attribute indirection, while this layout stores per-column
//! datasets under a key. The two shapes serve different access patterns
//! and do not interoperate.

use std::path::{Path, PathBuf};

use arrow::array::{Array, Float64Array};
use log::warn;
use snafu::prelude::*;

use crate::container::{Container, ContainerBuilder, ContainerError};
use crate::frame::{DataFrame, FrameError};
use crate::layout::{
    ATTR_COLUMN_NAMES, ATTR_FORMAT, ATTR_NAME, FORMAT_TABLE, column_node_path, index_node_path,
    key_is_valid, table_node_path,
};
use crate::storage::StorageError;

/// Errors raised by table-store operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    /// The key is blank or contains a path separator.
    #[snafu(display("Invalid table key {key:?}"))]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// A container-level failure: I/O, framing, missing nodes or
    /// attributes, decode failures.
    #[snafu(display("Table store container failure"))]
    Container {
        /// Underlying container error.
        source: ContainerError,
    },

    /// The recovered pieces did not assemble into a valid frame.
    #[snafu(display("Table store frame assembly failure"))]
    Frame {
        /// Underlying frame error.
        source: FrameError,
    },

    /// The node under the key exists but is not a table-layout node.
    #[snafu(display("Node for key {key:?} is not in the table layout"))]
    NotATable {
        /// The offending key.
        key: String,
    },

    /// The queried column does not exist in the stored table.
    #[snafu(display("Table {key:?} has no column {column:?}"))]
    UnknownColumn {
        /// The table key.
        key: String,
        /// The unknown column name.
        column: String,
    },

    /// An append's column names do not match the stored table's.
    #[snafu(display("Appended frame columns do not match table {key:?}"))]
    SchemaMismatch {
        /// The table key.
        key: String,
    },

    /// A stored index is unusable (wrong length or out-of-range rows).
    #[snafu(display("Stored index for {key:?}/{column:?} is corrupt"))]
    CorruptIndex {
        /// The table key.
        key: String,
        /// The indexed column.
        column: String,
    },
}

/// A keyed frame store backed by one container file.
///
/// The store holds only the target path; every operation opens the file,
/// does its work, and releases the handle before returning.
#[derive(Debug, Clone)]
pub struct TableStore {
    path: PathBuf,
}

/// The row permutation that sorts `column` ascending.
///
/// NaN values order last via `total_cmp`, so they never fall inside a
/// finite closed range.
fn sort_permutation(column: &Float64Array) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..column.len()).collect();
    perm.sort_by(|&a, &b| column.value(a).total_cmp(&column.value(b)));
    perm
}

impl TableStore {
    /// Bind a store to a container file path. The file itself is not
    /// touched until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TableStore { path: path.into() }
    }

    /// The container file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn validate_key(key: &str) -> Result<(), StoreError> {
        ensure!(key_is_valid(key), InvalidKeySnafu { key });
        Ok(())
    }

    /// Store `frame` under `key`, creating the container file if needed.
    ///
    /// Other keys already present in the file are preserved; an existing
    /// table under the same key is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] for unusable keys and
    /// [`StoreError::Container`] for storage failures.
    pub fn put(&self, key: &str, frame: &DataFrame) -> Result<(), StoreError> {
        Self::validate_key(key)?;

        let mut builder = match Container::open(&self.path) {
            Ok(existing) => {
                let mut builder =
                    ContainerBuilder::from_container(&existing).context(ContainerSnafu)?;
                if builder.contains_node(&table_node_path(key)) {
                    warn!("replacing existing table node {key:?} in {}", self.path.display());
                    builder.remove_subtree(&table_node_path(key));
                }
                builder
            }
            Err(ContainerError::Storage {
                source: StorageError::NotFound { .. },
            }) => ContainerBuilder::new(),
            Err(e) => return Err(e).context(ContainerSnafu),
        };

        Self::write_key(&mut builder, key, frame)?;
        builder.write(&self.path).context(ContainerSnafu)
    }

    fn write_key(
        builder: &mut ContainerBuilder,
        key: &str,
        frame: &DataFrame,
    ) -> Result<(), StoreError> {
        let node = table_node_path(key);
        builder
            .set_text_attr(&node, ATTR_FORMAT, FORMAT_TABLE)
            .context(ContainerSnafu)?;
        builder
            .set_text_attr(&node, ATTR_NAME, frame.name())
            .context(ContainerSnafu)?;
        builder
            .set_text_list_attr(&node, ATTR_COLUMN_NAMES, frame.column_names())
            .context(ContainerSnafu)?;

        let rows = frame.num_rows() as u64;
        for (i, column_name) in frame.column_names().iter().enumerate() {
            let column = frame.column(i);
            builder
                .set_dataset(
                    &column_node_path(key, column_name),
                    rows,
                    1,
                    column.values(),
                )
                .context(ContainerSnafu)?;

            let index: Vec<f64> = sort_permutation(column)
                .into_iter()
                .map(|row| row as f64)
                .collect();
            builder
                .set_dataset(&index_node_path(key, column_name), rows, 1, &index)
                .context(ContainerSnafu)?;
        }
        Ok(())
    }

    fn read_table_meta(
        &self,
        container: &Container,
        key: &str,
    ) -> Result<(String, Vec<String>), StoreError> {
        let node = table_node_path(key);
        let format = container
            .text_attr(&node, ATTR_FORMAT)
            .context(ContainerSnafu)?;
        ensure!(format == FORMAT_TABLE, NotATableSnafu { key });

        let name = container.text_attr(&node, ATTR_NAME).context(ContainerSnafu)?;
        let column_names = container
            .text_list_attr(&node, ATTR_COLUMN_NAMES)
            .context(ContainerSnafu)?;
        Ok((name, column_names))
    }

    fn read_column(
        &self,
        container: &Container,
        key: &str,
        column: &str,
    ) -> Result<Float64Array, StoreError> {
        let dataset = container
            .dataset(&column_node_path(key, column))
            .context(ContainerSnafu)?;
        Ok(Float64Array::from(dataset.values))
    }

    /// Load the frame stored under `key`.
    ///
    /// # Errors
    ///
    /// Lookup failures (missing file, missing key, missing columns)
    /// surface as [`StoreError::Container`];
    /// [`StoreError::NotATable`] marks a node that is not in the table
    /// layout.
    pub fn get(&self, key: &str) -> Result<DataFrame, StoreError> {
        Self::validate_key(key)?;
        let container = Container::open(&self.path).context(ContainerSnafu)?;

        let (name, column_names) = self.read_table_meta(&container, key)?;
        let mut columns = Vec::with_capacity(column_names.len());
        for column_name in &column_names {
            columns.push(self.read_column(&container, key, column_name)?);
        }

        DataFrame::new(name, column_names, columns).context(FrameSnafu)
    }

    /// Select the rows of the table under `key` whose value in `column`
    /// lies within the closed range `[lo, hi]`, using the stored sort
    /// index. Rows come back ascending in `column`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownColumn`] if the column is not part of
    /// the stored table and [`StoreError::CorruptIndex`] if the stored
    /// permutation does not cover the table's rows.
    pub fn select(
        &self,
        key: &str,
        column: &str,
        lo: f64,
        hi: f64,
    ) -> Result<DataFrame, StoreError> {
        Self::validate_key(key)?;
        let container = Container::open(&self.path).context(ContainerSnafu)?;

        let (name, column_names) = self.read_table_meta(&container, key)?;
        ensure!(
            column_names.iter().any(|n| n == column),
            UnknownColumnSnafu { key, column }
        );

        let target = self.read_column(&container, key, column)?;

        let index = container
            .dataset(&index_node_path(key, column))
            .context(ContainerSnafu)?;
        let rows = target.len();
        ensure!(index.values.len() == rows, CorruptIndexSnafu { key, column });

        let mut picked = Vec::new();
        for raw in &index.values {
            let row = *raw as usize;
            ensure!(row < rows, CorruptIndexSnafu { key, column });
            let value = target.value(row);
            if value > hi {
                break;
            }
            if value >= lo {
                picked.push(row);
            }
        }

        let mut columns = Vec::with_capacity(column_names.len());
        for column_name in &column_names {
            let full = self.read_column(&container, key, column_name)?;
            let filtered: Vec<f64> = picked.iter().map(|&row| full.value(row)).collect();
            columns.push(Float64Array::from(filtered));
        }

        DataFrame::new(name, column_names, columns).context(FrameSnafu)
    }

    /// Append `frame`'s rows to the table stored under `key`.
    ///
    /// The appended frame must have exactly the stored column names in the
    /// stored order. Indexes are rebuilt over the combined rows and the
    /// file is rewritten atomically. The stored table keeps its name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaMismatch`] when the column names differ
    /// and the usual lookup errors when the key is absent.
    pub fn append(&self, key: &str, frame: &DataFrame) -> Result<(), StoreError> {
        Self::validate_key(key)?;
        let existing = self.get(key)?;

        ensure!(
            existing.column_names() == frame.column_names(),
            SchemaMismatchSnafu { key }
        );

        let mut columns = Vec::with_capacity(existing.num_columns());
        for i in 0..existing.num_columns() {
            let mut values: Vec<f64> = existing.column(i).values().to_vec();
            values.extend_from_slice(frame.column(i).values());
            columns.push(Float64Array::from(values));
        }

        let combined = DataFrame::new(
            existing.name(),
            existing.column_names().to_vec(),
            columns,
        )
        .context(FrameSnafu)?;

        let container = Container::open(&self.path).context(ContainerSnafu)?;
        let mut builder = ContainerBuilder::from_container(&container).context(ContainerSnafu)?;
        builder.remove_subtree(&table_node_path(key));
        Self::write_key(&mut builder, key, &combined)?;
        builder.write(&self.path).context(ContainerSnafu)
    }
}
