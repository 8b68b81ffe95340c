//! Wrapper prelude.
//!
//! The `framestore` crate is the supported public entry point. Downstream
//! code should prefer importing from this prelude instead of depending on
//! internal core module paths.

pub use crate::container;
pub use crate::{BlockError, DataFrame, FrameError, StorageError, StoreError, TableStore};
