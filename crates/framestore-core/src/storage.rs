//! Filesystem utilities for container files.
//!
//! This module centralizes all filesystem logic used by the container
//! reader and writer. It is responsible for:
//!
//! - Reading whole container files into memory, classifying a missing file
//!   as [`StorageError::NotFound`] so callers can distinguish it from other
//!   I/O problems.
//! - Writing container files atomically via a write-then-rename sequence,
//!   so a failed or interrupted write never leaves a partially written file
//!   visible at the target path.
//!
//! All I/O here is synchronous and blocking; file handles are scoped to the
//! duration of a single call and released on every exit path.

pub mod error;
pub mod io;

pub use error::{StorageError, StorageResult};
pub use io::{read_all_bytes, write_atomic};
