//! Synchronous read/write primitives with atomic replacement semantics.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use bytes::Bytes;
use snafu::prelude::*;

use crate::storage::error::{NotFoundSnafu, OtherIoSnafu, StorageResult};

fn create_parent_dir(abs: &Path) -> StorageResult<()> {
    if let Some(parent) = abs.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(OtherIoSnafu {
                path: parent.display().to_string(),
            })?;
        }
    }
    Ok(())
}

/// Guard that removes a temporary file on drop unless disarmed.
/// Used to ensure cleanup on error paths during atomic writes.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Disarm the guard so the file is NOT removed on drop.
    /// Call this after a successful rename.
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            // Best-effort cleanup; we're likely already handling another error.
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Write `contents` to `path` using an atomic write.
///
/// This performs a write-then-rename sequence: it writes the payload to a
/// temporary file next to the target path, syncs the file, and then renames
/// it into place to provide an atomic replacement. Missing parent
/// directories are created.
///
/// # Errors
///
/// Returns [`StorageError::OtherIo`] when filesystem I/O fails at any step.
///
/// [`StorageError::OtherIo`]: crate::storage::StorageError::OtherIo
pub fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    create_parent_dir(path)?;

    let tmp_path = path.with_extension("tmp");
    let mut guard = TempFileGuard::new(tmp_path.clone());

    {
        let mut file = File::create(&tmp_path).context(OtherIoSnafu {
            path: tmp_path.display().to_string(),
        })?;

        file.write_all(contents).context(OtherIoSnafu {
            path: tmp_path.display().to_string(),
        })?;

        file.sync_all().context(OtherIoSnafu {
            path: tmp_path.display().to_string(),
        })?;
    }

    fs::rename(&tmp_path, path).context(OtherIoSnafu {
        path: path.display().to_string(),
    })?;

    // Success - don't remove the temp file (it's been renamed).
    guard.disarm();

    Ok(())
}

/// Read the full contents of the file at `path` and return them as [`Bytes`].
///
/// # Errors
///
/// - If the file does not exist this returns [`StorageError::NotFound`].
/// - On any other I/O error this returns [`StorageError::OtherIo`].
///
/// [`StorageError::NotFound`]: crate::storage::StorageError::NotFound
/// [`StorageError::OtherIo`]: crate::storage::StorageError::OtherIo
pub fn read_all_bytes(path: &Path) -> StorageResult<Bytes> {
    let path_str = path.display().to_string();

    match fs::read(path) {
        Ok(bytes) => Ok(Bytes::from(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(e).context(NotFoundSnafu { path: path_str })
        }
        Err(e) => Err(e).context(OtherIoSnafu { path: path_str }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn write_atomic_creates_file_with_contents() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("test.bin");

        write_atomic(&path, b"hello world")?;

        let read_back = fs::read(&path)?;
        assert_eq!(read_back, b"hello world");
        Ok(())
    }

    #[test]
    fn write_atomic_creates_parent_directories() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("nested/deep/dir/file.bin");

        write_atomic(&path, b"nested content")?;

        assert!(path.exists());
        let read_back = fs::read(&path)?;
        assert_eq!(read_back, b"nested content");
        Ok(())
    }

    #[test]
    fn write_atomic_overwrites_existing_file() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("overwrite.bin");

        write_atomic(&path, b"original")?;
        write_atomic(&path, b"updated")?;

        let read_back = fs::read(&path)?;
        assert_eq!(read_back, b"updated");
        Ok(())
    }

    #[test]
    fn write_atomic_no_leftover_tmp_file() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("clean.bin");

        write_atomic(&path, b"data")?;

        // The .tmp file should not remain after a successful write.
        let tmp_path = tmp.path().join("clean.tmp");
        assert!(!tmp_path.exists());
        Ok(())
    }

    #[test]
    fn read_all_bytes_returns_file_contents() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("readable.bin");
        fs::write(&path, b"file contents")?;

        let result = read_all_bytes(&path)?;
        assert_eq!(result.as_ref(), b"file contents");
        Ok(())
    }

    #[test]
    fn read_all_bytes_returns_not_found_for_missing_file() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("does_not_exist.bin");

        let result = read_all_bytes(&path);

        assert!(result.is_err());
        let err = result.expect_err("expected NotFound error");
        assert!(matches!(err, StorageError::NotFound { .. }));
        Ok(())
    }

    #[test]
    fn write_then_read_roundtrip() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("roundtrip.bin");

        let original = b"roundtrip content";
        write_atomic(&path, original)?;

        let read_back = read_all_bytes(&path)?;
        assert_eq!(read_back.as_ref(), original);
        Ok(())
    }
}
