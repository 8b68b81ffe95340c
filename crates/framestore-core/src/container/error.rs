//! Error types and SNAFU context selectors for container files.
//!
//! This module centralizes the `ContainerError` enum used by the reader and
//! writer. Keep new variants here so framing, lookup, and decode failures
//! stay distinguishable to callers instead of collapsing into one opaque
//! format error.

use snafu::{Backtrace, prelude::*};

use crate::storage::StorageError;

/// Errors that can occur while reading or writing a container file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ContainerError {
    /// The file does not start and end with the container magic bytes.
    #[snafu(display("Not a container file (bad magic): {path}"))]
    BadMagic {
        /// The offending file path.
        path: String,
    },

    /// The file is too short to hold the fixed framing or the manifest.
    #[snafu(display("Container file truncated ({len} bytes): {path}"))]
    Truncated {
        /// The offending file path.
        path: String,
        /// Observed file length in bytes.
        len: u64,
    },

    /// The container was written with a format version this crate does not
    /// understand.
    #[snafu(display("Unsupported container format version {found}: {path}"))]
    UnsupportedVersion {
        /// The offending file path.
        path: String,
        /// Version number found in the file header.
        found: u32,
    },

    /// The manifest JSON could not be parsed or produced.
    #[snafu(display("Container manifest error in {path}: {source}"))]
    Manifest {
        /// The offending file path.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A node path used by the caller is not absolute or is blank.
    #[snafu(display("Invalid node path: {node:?} (must start with '/')"))]
    InvalidNodePath {
        /// The rejected node path.
        node: String,
    },

    /// No node exists at the requested path.
    #[snafu(display("No node at {node:?}"))]
    MissingNode {
        /// The requested node path.
        node: String,
    },

    /// The node exists but does not carry the requested attribute.
    #[snafu(display("Node {node:?} has no attribute {name:?}"))]
    MissingAttribute {
        /// The node that was inspected.
        node: String,
        /// The requested attribute name.
        name: String,
    },

    /// The attribute exists but holds the other value kind (single byte
    /// string vs. byte-string list).
    #[snafu(display("Attribute {name:?} on {node:?} is not a {expected}"))]
    AttributeKind {
        /// The node that was inspected.
        node: String,
        /// The requested attribute name.
        name: String,
        /// Human-readable expected kind.
        expected: &'static str,
    },

    /// The attribute bytes did not decode as UTF-8 text.
    #[snafu(display("Attribute {name:?} on {node:?} is not valid UTF-8"))]
    AttributeNotUtf8 {
        /// The node that was inspected.
        node: String,
        /// The requested attribute name.
        name: String,
        /// Underlying decode error.
        source: std::str::Utf8Error,
    },

    /// The node exists but carries no dataset.
    #[snafu(display("Node {node:?} has no dataset"))]
    MissingDataset {
        /// The requested node path.
        node: String,
    },

    /// The dataset descriptor points outside the payload region, or its
    /// byte length disagrees with its declared shape.
    #[snafu(display("Dataset on {node:?} has inconsistent bounds"))]
    DatasetBounds {
        /// The node whose dataset descriptor is inconsistent.
        node: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// The declared dataset shape does not match the supplied value count.
    #[snafu(display(
        "Dataset shape {rows}x{cols} on {node:?} does not match {len} values"
    ))]
    DatasetShape {
        /// The node the dataset was being attached to.
        node: String,
        /// Declared row count.
        rows: u64,
        /// Declared column count.
        cols: u64,
        /// Number of values actually supplied.
        len: usize,
    },

    /// A filesystem operation failed underneath the container layer.
    #[snafu(display("Container storage failure"))]
    Storage {
        /// Underlying storage error.
        source: StorageError,
    },
}
