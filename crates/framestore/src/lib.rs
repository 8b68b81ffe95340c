//! # framestore
//!
//! Single-file container store for labeled numeric frames.
//!
//! This crate is the supported public entry point and provides a small,
//! stable surface over `framestore-core`:
//!
//! - [`DataFrame`]: named, equal-length `f64` columns.
//! - [`DataFrame::to_block`] / [`DataFrame::from_block`]: dense block
//!   interchange behind root-attribute indirection.
//! - [`TableStore`]: keyed, per-column, indexed storage with range
//!   selection and appends.
//!
//! The two on-disk shapes are distinct and do not interoperate; pick the
//! block layout for dense interchange and the table layout for keyed,
//! queryable storage.
//!
//! ## Example
//!
//! ```rust,ignore
//! use framestore::prelude::*;
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

/// Container namespace for callers that need direct node access.
pub mod container {
    pub use framestore_core::container::{
        AttrValue, Container, ContainerBuilder, ContainerError, Dataset,
    };
}

pub use framestore_core::frame::block::BlockError;
pub use framestore_core::storage::StorageError;
pub use framestore_core::{DataFrame, FrameError, StoreError, TableStore};
