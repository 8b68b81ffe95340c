//! The single-file container format.
//!
//! A container is one binary file holding a tree of named nodes. Each node
//! may carry byte-string attributes and at most one `f64` array payload.
//! On disk the file is framed by a four-byte magic at both ends, with a
//! JSON manifest describing the node tree followed by a raw payload region:
//!
//! ```text
//! "FRS1" | u32 version (LE) | u64 manifest length (LE) |
//! manifest JSON | payload region | "FRS1"
//! ```
//!
//! Dataset descriptors in the manifest record offsets relative to the start
//! of the payload region, so the manifest never depends on its own encoded
//! length. Attribute values are stored as raw bytes and decoded to UTF-8
//! only on access; non-UTF-8 bytes surface as a decode error at that point.
//!
//! [`ContainerBuilder`] assembles and persists a container;
//! [`Container`] opens one read-only for the duration of the borrow.

pub mod error;
pub mod manifest;
pub mod reader;
pub mod writer;

pub use error::ContainerError;
pub use manifest::{
    AttrValue, CONTAINER_FORMAT_VERSION, CONTAINER_MAGIC, DatasetMeta, Manifest, NodeMeta,
};
pub use reader::{Container, Dataset};
pub use writer::ContainerBuilder;
