//! The block layout: a dense 2-D payload behind root-attribute indirection.
//!
//! Files in this layout store the frame as one contiguous row-major block.
//! The root node carries two byte-string attributes, `path` and `data`:
//! `path` names the node holding the column metadata (`name` and the
//! ordered `column_names` list), `data` names the node holding the 2-D
//! payload. By convention the payload node sits directly under the
//! metadata node, named after the frame.
//!
//! Reading performs the two-step indirection: open the file, read and
//! decode the root attributes, resolve the column names at `path`, resolve
//! the payload at `data`, then assemble the frame. Every missing piece is a
//! lookup error; nothing is defaulted.

use std::path::Path;

use snafu::prelude::*;

use crate::container::{Container, ContainerBuilder, ContainerError};
use crate::frame::{DataFrame, FrameError};
use crate::layout::{ATTR_COLUMN_NAMES, ATTR_DATA, ATTR_NAME, ATTR_PATH};

/// Errors raised by block-layout reads and writes.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BlockError {
    /// The metadata node path is not usable (must be absolute and not the
    /// root itself).
    #[snafu(display("Invalid block node path {path:?}"))]
    NodePath {
        /// The rejected node path.
        path: String,
    },

    /// A container-level failure: I/O, framing, missing nodes or
    /// attributes, decode failures.
    #[snafu(display("Block container failure"))]
    Container {
        /// Underlying container error.
        source: ContainerError,
    },

    /// The recovered pieces did not assemble into a valid frame, for
    /// example when the column-name count disagrees with the payload width.
    #[snafu(display("Block frame assembly failure"))]
    Frame {
        /// Underlying frame error.
        source: FrameError,
    },
}

impl DataFrame {
    /// Write this frame to `file_path` in the block layout, placing the
    /// column metadata at `node_path` and the payload beneath it.
    ///
    /// The file is created or atomically replaced.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::NodePath`] for an unusable metadata path and
    /// [`BlockError::Container`] for storage failures.
    pub fn to_block(&self, file_path: &Path, node_path: &str) -> Result<(), BlockError> {
        ensure!(
            node_path.starts_with('/') && node_path.len() > 1,
            NodePathSnafu { path: node_path }
        );

        let data_path = format!("{node_path}/{}", self.name());

        let mut builder = ContainerBuilder::new();
        builder
            .set_text_attr("/", ATTR_PATH, node_path)
            .context(ContainerSnafu)?;
        builder
            .set_text_attr("/", ATTR_DATA, &data_path)
            .context(ContainerSnafu)?;
        builder
            .set_text_attr(node_path, ATTR_NAME, self.name())
            .context(ContainerSnafu)?;
        builder
            .set_text_list_attr(node_path, ATTR_COLUMN_NAMES, self.column_names())
            .context(ContainerSnafu)?;
        builder
            .set_dataset(
                &data_path,
                self.num_rows() as u64,
                self.num_columns() as u64,
                &self.values_row_major(),
            )
            .context(ContainerSnafu)?;

        builder.write(file_path).context(ContainerSnafu)
    }

    /// Read a block-layout frame from `file_path`.
    ///
    /// The file is opened read-only for the duration of the call and
    /// released before returning.
    ///
    /// # Errors
    ///
    /// Surfaces every container-level lookup or decode failure as
    /// [`BlockError::Container`], and a column-name/payload-width
    /// disagreement as [`BlockError::Frame`].
    pub fn from_block(file_path: &Path) -> Result<DataFrame, BlockError> {
        let container = Container::open(file_path).context(ContainerSnafu)?;

        let meta_path = container.text_attr("/", ATTR_PATH).context(ContainerSnafu)?;
        let data_path = container.text_attr("/", ATTR_DATA).context(ContainerSnafu)?;

        let column_names = container
            .text_list_attr(&meta_path, ATTR_COLUMN_NAMES)
            .context(ContainerSnafu)?;
        let name = container
            .text_attr(&meta_path, ATTR_NAME)
            .context(ContainerSnafu)?;

        let dataset = container.dataset(&data_path).context(ContainerSnafu)?;

        DataFrame::from_row_major(
            name,
            column_names,
            dataset.rows,
            dataset.cols,
            &dataset.values,
        )
        .context(FrameSnafu)
    }
}
