//! Attribute keys of the persisted graph format.

/// Top-level sequence of node records.
pub const GRAPH_DATA_NODES: &str = "nodes";
/// Top-level sequence of connection records.
pub const GRAPH_DATA_CONNECTIONS: &str = "connections";

pub const NODE_ID: &str = "id";
pub const NODE_KIND: &str = "kind";
pub const NODE_CLASSNAME: &str = "className";
/// Only read for loader nodes.
pub const LOADER_NODE_FILE_PATH: &str = "filePath";

pub const CONNECTION_ID: &str = "id";
pub const CONNECTION_LABEL: &str = "label";
pub const CONNECTION_FROM_NODE: &str = "fromNode";
pub const CONNECTION_TO_NODE: &str = "toNode";
