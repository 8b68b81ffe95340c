//! Manifest model for container files.
//!
//! The manifest is the JSON document stored between the file header and the
//! payload region. It records the format version, a creation timestamp, and
//! the node tree: attributes plus dataset descriptors that locate raw `f64`
//! payloads by offset and length within the payload region.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Magic bytes at the head and tail of every container file.
pub const CONTAINER_MAGIC: [u8; 4] = *b"FRS1";

/// Current container format version.
///
/// Bumped only when we make a breaking change to the on-disk layout.
pub const CONTAINER_FORMAT_VERSION: u32 = 1;

/// An attribute value attached to a node.
///
/// Values are raw byte strings; text is an access-time interpretation, not
/// a storage-time one. Decoding happens in the reader so that non-UTF-8
/// bytes fail at the point of use with the node and attribute named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    /// A single byte string.
    Bytes(Vec<u8>),
    /// An ordered list of byte strings.
    BytesList(Vec<Vec<u8>>),
}

impl AttrValue {
    /// Build a single byte-string attribute from text.
    pub fn from_text(text: &str) -> Self {
        AttrValue::Bytes(text.as_bytes().to_vec())
    }

    /// Build a byte-string-list attribute from an ordered list of text values.
    pub fn from_text_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AttrValue::BytesList(
            items
                .into_iter()
                .map(|s| s.as_ref().as_bytes().to_vec())
                .collect(),
        )
    }
}

/// Descriptor locating one `f64` dataset inside the payload region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Byte offset of the dataset, relative to the start of the payload
    /// region.
    pub offset: u64,
    /// Byte length of the dataset.
    pub len: u64,
    /// Number of rows.
    pub rows: u64,
    /// Number of columns. Values are stored row-major.
    pub cols: u64,
}

/// One node in the container tree: attributes plus an optional dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Attributes keyed by name.
    #[serde(default)]
    pub attrs: BTreeMap<String, AttrValue>,
    /// The node's dataset, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetMeta>,
}

/// The manifest document stored in every container file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Container format version, duplicated from the binary header so the
    /// manifest is self-describing.
    pub format_version: u32,
    /// Creation timestamp, RFC3339 UTC.
    pub created_at: DateTime<Utc>,
    /// Nodes keyed by absolute slash path (`"/"`, `"/frame"`, ...).
    pub nodes: BTreeMap<String, NodeMeta>,
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn manifest_json_roundtrip() -> TestResult {
        let mut nodes = BTreeMap::new();
        let mut root = NodeMeta::default();
        root.attrs
            .insert("path".to_string(), AttrValue::from_text("/frame"));
        nodes.insert("/".to_string(), root);

        let mut frame = NodeMeta::default();
        frame.attrs.insert(
            "column_names".to_string(),
            AttrValue::from_text_list(["A", "B"]),
        );
        frame.dataset = Some(DatasetMeta {
            offset: 0,
            len: 32,
            rows: 2,
            cols: 2,
        });
        nodes.insert("/frame".to_string(), frame);

        let manifest = Manifest {
            format_version: CONTAINER_FORMAT_VERSION,
            created_at: Utc::now(),
            nodes,
        };

        let json = serde_json::to_vec(&manifest)?;
        let back: Manifest = serde_json::from_slice(&json)?;

        assert_eq!(back.format_version, CONTAINER_FORMAT_VERSION);
        assert_eq!(back.nodes, manifest.nodes);
        Ok(())
    }

    #[test]
    fn attr_value_preserves_list_order() {
        let attr = AttrValue::from_text_list(["A", "B", "C"]);
        match attr {
            AttrValue::BytesList(items) => {
                assert_eq!(items, vec![b"A".to_vec(), b"B".to_vec(), b"C".to_vec()]);
            }
            AttrValue::Bytes(_) => panic!("expected a list attribute"),
        }
    }
}
