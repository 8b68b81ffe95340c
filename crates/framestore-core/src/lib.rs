//! Core engine for a single-file, attribute-tagged frame container format.
//!
//! This crate provides the foundational pieces for `framestore`:
//!
//! - A binary container file holding named nodes, byte-string attributes,
//!   and `f64` array payloads behind a JSON manifest (`container` module).
//! - A `DataFrame` of named, equal-length `f64` columns backed by Arrow
//!   arrays (`frame` module).
//! - The block layout: a dense 2-D payload located through root-level
//!   `path`/`data` attribute indirection (`frame::block` module).
//! - A `TableStore` that persists frames as per-column table nodes with
//!   per-column sort indexes, supporting range selection and appends
//!   (`table_store` module).
//! - Synchronous filesystem utilities with atomic write-then-rename
//!   semantics (`storage` module).
//!
//! The two on-disk shapes are deliberately distinct: a file written with
//! [`table_store::TableStore::put`] is not readable through
//! [`frame::DataFrame::from_block`], and vice versa. The block layout exists
//! for dense interchange; the table layout exists for keyed, indexed,
//! appendable storage.
#![deny(missing_docs)]

pub mod container;
pub mod frame;
pub mod layout;
pub mod storage;
pub mod table_store;

pub use container::{Container, ContainerBuilder, ContainerError};
pub use frame::{DataFrame, FrameError, block::BlockError};
pub use table_store::{StoreError, TableStore};
