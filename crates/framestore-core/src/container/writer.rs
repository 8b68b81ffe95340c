//! Construction and persistence of container files.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use snafu::prelude::*;

use crate::container::error::{
    ContainerError, DatasetShapeSnafu, InvalidNodePathSnafu, ManifestSnafu, StorageSnafu,
};
use crate::container::manifest::{
    AttrValue, CONTAINER_FORMAT_VERSION, CONTAINER_MAGIC, DatasetMeta, Manifest, NodeMeta,
};
use crate::container::reader::Container;
use crate::storage;

/// Builder that assembles a container in memory and writes it atomically.
///
/// Nodes are created on demand when an attribute or dataset is attached;
/// intermediate parent nodes are created empty so the stored tree is fully
/// connected. The root node `/` always exists.
#[derive(Debug)]
pub struct ContainerBuilder {
    nodes: BTreeMap<String, NodeMeta>,
    payload: Vec<u8>,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    /// Create an empty builder holding only the root node.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), NodeMeta::default());
        ContainerBuilder {
            nodes,
            payload: Vec::new(),
        }
    }

    /// Seed a builder with every node and dataset of an existing container.
    ///
    /// Dataset payloads are copied into the new payload region, so the
    /// resulting builder is independent of the source container.
    ///
    /// # Errors
    ///
    /// Fails if any dataset descriptor in the source container is
    /// inconsistent with its payload region.
    pub fn from_container(source: &Container) -> Result<Self, ContainerError> {
        let mut builder = ContainerBuilder::new();
        for (path, node) in &source.manifest().nodes {
            for (name, value) in &node.attrs {
                builder.set_attr(path, name, value.clone())?;
            }
            if node.dataset.is_some() {
                let ds = source.dataset(path)?;
                builder.set_dataset(path, ds.rows as u64, ds.cols as u64, &ds.values)?;
            }
        }
        Ok(builder)
    }

    fn validate_node_path(node_path: &str) -> Result<(), ContainerError> {
        ensure!(
            node_path.starts_with('/') && !node_path.contains("//"),
            InvalidNodePathSnafu { node: node_path }
        );
        Ok(())
    }

    fn ensure_node(&mut self, node_path: &str) -> Result<&mut NodeMeta, ContainerError> {
        Self::validate_node_path(node_path)?;

        // Create intermediate parents so the tree is connected.
        let mut end = node_path.len();
        while let Some(sep) = node_path[..end].rfind('/') {
            let parent = if sep == 0 { "/" } else { &node_path[..sep] };
            self.nodes.entry(parent.to_string()).or_default();
            if sep == 0 {
                break;
            }
            end = sep;
        }

        Ok(self.nodes.entry(node_path.to_string()).or_default())
    }

    /// Whether a node already exists at `node_path`.
    pub fn contains_node(&self, node_path: &str) -> bool {
        self.nodes.contains_key(node_path)
    }

    /// Remove the node at `node_path` and every node beneath it.
    ///
    /// Removing a subtree does not reclaim payload bytes already copied in;
    /// they simply become unreferenced.
    pub fn remove_subtree(&mut self, node_path: &str) {
        let prefix = format!("{node_path}/");
        self.nodes
            .retain(|path, _| path != node_path && !path.starts_with(&prefix));
    }

    /// Attach an attribute to the node at `node_path`, creating the node if
    /// needed. An existing attribute of the same name is replaced.
    ///
    /// # Errors
    ///
    /// Fails if `node_path` is not an absolute slash path.
    pub fn set_attr(
        &mut self,
        node_path: &str,
        name: &str,
        value: AttrValue,
    ) -> Result<(), ContainerError> {
        let node = self.ensure_node(node_path)?;
        node.attrs.insert(name.to_string(), value);
        Ok(())
    }

    /// Attach a text attribute, stored as its UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Fails if `node_path` is not an absolute slash path.
    pub fn set_text_attr(
        &mut self,
        node_path: &str,
        name: &str,
        text: &str,
    ) -> Result<(), ContainerError> {
        self.set_attr(node_path, name, AttrValue::from_text(text))
    }

    /// Attach an ordered text-list attribute, each item stored as its UTF-8
    /// bytes.
    ///
    /// # Errors
    ///
    /// Fails if `node_path` is not an absolute slash path.
    pub fn set_text_list_attr<I, S>(
        &mut self,
        node_path: &str,
        name: &str,
        items: I,
    ) -> Result<(), ContainerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_attr(node_path, name, AttrValue::from_text_list(items))
    }

    /// Attach a row-major `f64` dataset to the node at `node_path`,
    /// creating the node if needed. An existing dataset on the node is
    /// replaced (its old payload bytes become unreferenced).
    ///
    /// # Errors
    ///
    /// Fails if `node_path` is invalid or if `rows * cols` does not match
    /// the number of supplied values.
    pub fn set_dataset(
        &mut self,
        node_path: &str,
        rows: u64,
        cols: u64,
        values: &[f64],
    ) -> Result<(), ContainerError> {
        Self::validate_node_path(node_path)?;

        let expected = rows.checked_mul(cols);
        ensure!(
            expected == Some(values.len() as u64),
            DatasetShapeSnafu {
                node: node_path,
                rows,
                cols,
                len: values.len(),
            }
        );

        let offset = self.payload.len() as u64;
        self.payload.reserve(values.len() * 8);
        for v in values {
            self.payload.extend_from_slice(&v.to_le_bytes());
        }

        let node = self.ensure_node(node_path)?;
        node.dataset = Some(DatasetMeta {
            offset,
            len: values.len() as u64 * 8,
            rows,
            cols,
        });
        Ok(())
    }

    /// Serialize the container and write it to `path` atomically,
    /// creating or replacing the file.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Storage`] when the filesystem write fails.
    pub fn write(self, path: &Path) -> Result<(), ContainerError> {
        let manifest = Manifest {
            format_version: CONTAINER_FORMAT_VERSION,
            created_at: Utc::now(),
            nodes: self.nodes,
        };

        let manifest_bytes = serde_json::to_vec(&manifest).context(ManifestSnafu {
            path: path.display().to_string(),
        })?;

        let mut out =
            Vec::with_capacity(4 + 4 + 8 + manifest_bytes.len() + self.payload.len() + 4);
        out.extend_from_slice(&CONTAINER_MAGIC);
        out.extend_from_slice(&CONTAINER_FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(manifest_bytes.len() as u64).to_le_bytes());
        out.extend_from_slice(&manifest_bytes);
        out.extend_from_slice(&self.payload);
        out.extend_from_slice(&CONTAINER_MAGIC);

        storage::write_atomic(path, &out).context(StorageSnafu)
    }
}
