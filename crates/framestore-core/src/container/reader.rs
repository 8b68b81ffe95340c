//! Read-only access to container files.

use std::path::Path;

use bytes::Bytes;
use snafu::prelude::*;

use crate::container::error::{
    AttributeKindSnafu, AttributeNotUtf8Snafu, BadMagicSnafu, ContainerError, DatasetBoundsSnafu,
    ManifestSnafu, MissingAttributeSnafu, MissingDatasetSnafu, MissingNodeSnafu, StorageSnafu,
    TruncatedSnafu, UnsupportedVersionSnafu,
};
use crate::container::manifest::{
    AttrValue, CONTAINER_FORMAT_VERSION, CONTAINER_MAGIC, DatasetMeta, Manifest, NodeMeta,
};
use crate::storage;

/// Fixed bytes before the manifest: magic + version + manifest length.
const HEADER_LEN: usize = 4 + 4 + 8;

/// Smallest possible container file: header plus trailing magic.
const MIN_FILE_LEN: usize = HEADER_LEN + CONTAINER_MAGIC.len();

/// A decoded `f64` dataset together with its declared shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Row-major values, `rows * cols` long.
    pub values: Vec<f64>,
}

/// An open container file.
///
/// The whole file is read into memory on open; all lookups afterwards are
/// in-memory. The underlying file handle is released before `open` returns,
/// so a `Container` never holds the file open.
#[derive(Debug)]
pub struct Container {
    manifest: Manifest,
    payload: Bytes,
}

impl Container {
    /// Open the container at `path` and validate its framing.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::Storage`] if the file is missing or unreadable.
    /// - [`ContainerError::Truncated`] / [`ContainerError::BadMagic`] /
    ///   [`ContainerError::UnsupportedVersion`] on framing violations.
    /// - [`ContainerError::Manifest`] if the manifest JSON does not parse.
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        let path_str = path.display().to_string();
        let bytes = storage::read_all_bytes(path).context(StorageSnafu)?;

        ensure!(
            bytes.len() >= MIN_FILE_LEN,
            TruncatedSnafu {
                path: path_str.clone(),
                len: bytes.len() as u64,
            }
        );

        let head = &bytes[..4];
        let tail = &bytes[bytes.len() - 4..];
        ensure!(
            head == CONTAINER_MAGIC && tail == CONTAINER_MAGIC,
            BadMagicSnafu {
                path: path_str.clone(),
            }
        );

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        ensure!(
            version == CONTAINER_FORMAT_VERSION,
            UnsupportedVersionSnafu {
                path: path_str.clone(),
                found: version,
            }
        );

        let manifest_len = u64::from_le_bytes([
            bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
        ]);

        // The manifest must fit between the header and the trailing magic.
        let body_len = (bytes.len() - MIN_FILE_LEN) as u64;
        ensure!(
            manifest_len <= body_len,
            TruncatedSnafu {
                path: path_str.clone(),
                len: bytes.len() as u64,
            }
        );
        let manifest_len = manifest_len as usize;

        let manifest_bytes = &bytes[HEADER_LEN..HEADER_LEN + manifest_len];
        let manifest: Manifest =
            serde_json::from_slice(manifest_bytes).context(ManifestSnafu {
                path: path_str.clone(),
            })?;

        let payload = bytes.slice(HEADER_LEN + manifest_len..bytes.len() - 4);

        Ok(Container { manifest, payload })
    }

    /// The manifest of this container.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Look up the node at `node_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::MissingNode`] if no node exists at that
    /// path.
    pub fn node(&self, node_path: &str) -> Result<&NodeMeta, ContainerError> {
        self.manifest
            .nodes
            .get(node_path)
            .context(MissingNodeSnafu { node: node_path })
    }

    fn attr(&self, node_path: &str, name: &str) -> Result<&AttrValue, ContainerError> {
        self.node(node_path)?
            .attrs
            .get(name)
            .context(MissingAttributeSnafu {
                node: node_path,
                name,
            })
    }

    /// Read a single byte-string attribute and decode it as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Fails if the node or attribute is missing, if the attribute holds a
    /// list, or if the bytes are not valid UTF-8.
    pub fn text_attr(&self, node_path: &str, name: &str) -> Result<String, ContainerError> {
        match self.attr(node_path, name)? {
            AttrValue::Bytes(raw) => {
                let text = std::str::from_utf8(raw).context(AttributeNotUtf8Snafu {
                    node: node_path,
                    name,
                })?;
                Ok(text.to_string())
            }
            AttrValue::BytesList(_) => AttributeKindSnafu {
                node: node_path,
                name,
                expected: "single byte string",
            }
            .fail(),
        }
    }

    /// Read a byte-string-list attribute and decode each item as UTF-8
    /// text, preserving order.
    ///
    /// # Errors
    ///
    /// Fails if the node or attribute is missing, if the attribute holds a
    /// single value, or if any item is not valid UTF-8.
    pub fn text_list_attr(
        &self,
        node_path: &str,
        name: &str,
    ) -> Result<Vec<String>, ContainerError> {
        match self.attr(node_path, name)? {
            AttrValue::BytesList(items) => {
                let mut out = Vec::with_capacity(items.len());
                for raw in items {
                    let text = std::str::from_utf8(raw).context(AttributeNotUtf8Snafu {
                        node: node_path,
                        name,
                    })?;
                    out.push(text.to_string());
                }
                Ok(out)
            }
            AttrValue::Bytes(_) => AttributeKindSnafu {
                node: node_path,
                name,
                expected: "byte string list",
            }
            .fail(),
        }
    }

    /// Read the dataset attached to the node at `node_path`.
    ///
    /// # Errors
    ///
    /// Fails if the node is missing, carries no dataset, or if the dataset
    /// descriptor is inconsistent with the payload region.
    pub fn dataset(&self, node_path: &str) -> Result<Dataset, ContainerError> {
        let meta = self
            .node(node_path)?
            .dataset
            .as_ref()
            .context(MissingDatasetSnafu { node: node_path })?;

        self.decode_dataset(node_path, meta)
    }

    fn decode_dataset(
        &self,
        node_path: &str,
        meta: &DatasetMeta,
    ) -> Result<Dataset, ContainerError> {
        let expected_len = meta
            .rows
            .checked_mul(meta.cols)
            .and_then(|n| n.checked_mul(8));
        ensure!(
            expected_len == Some(meta.len),
            DatasetBoundsSnafu { node: node_path }
        );

        let start = usize::try_from(meta.offset).ok();
        let end = start.and_then(|s| usize::try_from(meta.len).ok().map(|l| s + l));
        let raw = match (start, end) {
            (Some(start), Some(end)) => self.payload.get(start..end),
            _ => None,
        };
        let raw = raw.context(DatasetBoundsSnafu { node: node_path })?;

        let values = raw
            .chunks_exact(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                f64::from_le_bytes(buf)
            })
            .collect();

        Ok(Dataset {
            rows: meta.rows as usize,
            cols: meta.cols as usize,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::writer::ContainerBuilder;
    use crate::storage::write_atomic;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn sample_container(dir: &Path) -> Result<std::path::PathBuf, ContainerError> {
        let path = dir.join("sample.frs");
        let mut builder = ContainerBuilder::new();
        builder.set_text_attr("/", "path", "/frame")?;
        builder.set_text_attr("/", "data", "/frame/values")?;
        builder.set_text_list_attr("/frame", "column_names", ["A", "B"])?;
        builder.set_dataset("/frame/values", 2, 2, &[1.0, 2.0, 3.0, 4.0])?;
        builder.write(&path)?;
        Ok(path)
    }

    #[test]
    fn open_reads_attributes_and_dataset() -> TestResult {
        let tmp = TempDir::new()?;
        let path = sample_container(tmp.path())?;

        let container = Container::open(&path)?;
        assert_eq!(container.text_attr("/", "path")?, "/frame");
        assert_eq!(container.text_attr("/", "data")?, "/frame/values");
        assert_eq!(
            container.text_list_attr("/frame", "column_names")?,
            vec!["A".to_string(), "B".to_string()]
        );

        let ds = container.dataset("/frame/values")?;
        assert_eq!(ds.rows, 2);
        assert_eq!(ds.cols, 2);
        assert_eq!(ds.values, vec![1.0, 2.0, 3.0, 4.0]);
        Ok(())
    }

    #[test]
    fn open_rejects_bad_magic() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("bad.frs");
        write_atomic(&path, b"NOPE............................")?;

        let err = Container::open(&path).expect_err("expected BadMagic");
        assert!(matches!(err, ContainerError::BadMagic { .. }));
        Ok(())
    }

    #[test]
    fn open_rejects_truncated_file() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("short.frs");
        write_atomic(&path, b"FRS1")?;

        let err = Container::open(&path).expect_err("expected Truncated");
        assert!(matches!(err, ContainerError::Truncated { .. }));
        Ok(())
    }

    #[test]
    fn open_rejects_unknown_version() -> TestResult {
        let tmp = TempDir::new()?;
        let path = sample_container(tmp.path())?;

        let mut bytes = std::fs::read(&path)?;
        bytes[4..8].copy_from_slice(&99u32.to_le_bytes());
        write_atomic(&path, &bytes)?;

        let err = Container::open(&path).expect_err("expected UnsupportedVersion");
        assert!(matches!(
            err,
            ContainerError::UnsupportedVersion { found: 99, .. }
        ));
        Ok(())
    }

    #[test]
    fn missing_node_and_attribute_are_lookup_errors() -> TestResult {
        let tmp = TempDir::new()?;
        let path = sample_container(tmp.path())?;
        let container = Container::open(&path)?;

        assert!(matches!(
            container.node("/absent"),
            Err(ContainerError::MissingNode { .. })
        ));
        assert!(matches!(
            container.text_attr("/", "absent"),
            Err(ContainerError::MissingAttribute { .. })
        ));
        Ok(())
    }

    #[test]
    fn attribute_kind_mismatch_is_rejected() -> TestResult {
        let tmp = TempDir::new()?;
        let path = sample_container(tmp.path())?;
        let container = Container::open(&path)?;

        // "path" holds a single byte string, not a list.
        assert!(matches!(
            container.text_list_attr("/", "path"),
            Err(ContainerError::AttributeKind { .. })
        ));
        // "column_names" holds a list, not a single byte string.
        assert!(matches!(
            container.text_attr("/frame", "column_names"),
            Err(ContainerError::AttributeKind { .. })
        ));
        Ok(())
    }

    #[test]
    fn non_utf8_attribute_bytes_fail_to_decode() -> TestResult {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("latin.frs");

        let mut builder = ContainerBuilder::new();
        builder.set_attr("/", "path", AttrValue::Bytes(vec![0xFF, 0xFE, 0xFD]))?;
        builder.write(&path)?;

        let container = Container::open(&path)?;
        let err = container
            .text_attr("/", "path")
            .expect_err("expected AttributeNotUtf8");
        assert!(matches!(err, ContainerError::AttributeNotUtf8 { .. }));
        Ok(())
    }

    #[test]
    fn missing_file_surfaces_storage_not_found() {
        let err = Container::open(Path::new("/definitely/not/here.frs"))
            .expect_err("expected Storage error");
        assert!(matches!(err, ContainerError::Storage { .. }));
    }
}
