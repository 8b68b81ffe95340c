//! Naming conventions for the on-disk layouts.
//!
//! This module keeps attribute names and node-path construction in one
//! place so the two layouts (block and table) can evolve without scattering
//! string literals through the reader and writer code.

/// Root attribute naming the node that carries the column metadata.
pub const ATTR_PATH: &str = "path";

/// Root attribute naming the node that carries the numeric payload.
pub const ATTR_DATA: &str = "data";

/// Metadata-node attribute holding the frame's object name.
pub const ATTR_NAME: &str = "name";

/// Metadata-node attribute holding the ordered column-name list.
pub const ATTR_COLUMN_NAMES: &str = "column_names";

/// Table-node attribute identifying the table layout.
pub const ATTR_FORMAT: &str = "format";

/// Value of [`ATTR_FORMAT`] for table-layout nodes.
pub const FORMAT_TABLE: &str = "table";

/// Node path of the table stored under `key`.
pub fn table_node_path(key: &str) -> String {
    format!("/{key}")
}

/// Node path of one column's values within the table stored under `key`.
pub fn column_node_path(key: &str, column: &str) -> String {
    format!("/{key}/col/{column}")
}

/// Node path of one column's sort index within the table stored under `key`.
pub fn index_node_path(key: &str, column: &str) -> String {
    format!("/{key}/index/{column}")
}

/// Whether `key` is usable as a table-store key: non-blank, no slashes.
pub fn key_is_valid(key: &str) -> bool {
    !key.trim().is_empty() && !key.contains('/')
}
