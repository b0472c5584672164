//! A node of the asset graph as read from the persisted graph.

use super::{Connection, NodeKind};
use serde::{Deserialize, Serialize};

/// A node of the asset graph.
///
/// `parent_connections` holds copies of every connection entering this node,
/// in connection declaration order. It is filled once while the graph is
/// built and not touched afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
  pub node_id: String,
  pub kind: NodeKind,
  /// Registry reference of the behavior that runs this node.
  pub behavior_ref: String,
  /// Only set for loader nodes.
  pub load_file_path: Option<String>,
  pub parent_connections: Vec<Connection>,
}

impl NodeData {
  /// Creates a non-loader node.
  pub fn new(node_id: impl Into<String>, kind: NodeKind, behavior_ref: impl Into<String>) -> Self {
    Self {
      node_id: node_id.into(),
      kind,
      behavior_ref: behavior_ref.into(),
      load_file_path: None,
      parent_connections: vec![],
    }
  }

  /// Creates a loader node reading from `load_file_path`.
  pub fn loader(
    node_id: impl Into<String>,
    behavior_ref: impl Into<String>,
    load_file_path: impl Into<String>,
  ) -> Self {
    Self {
      node_id: node_id.into(),
      kind: NodeKind::Loader,
      behavior_ref: behavior_ref.into(),
      load_file_path: Some(load_file_path.into()),
      parent_connections: vec![],
    }
  }

  pub fn with_parent_connections(mut self, parent_connections: Vec<Connection>) -> Self {
    self.parent_connections = parent_connections;
    self
  }

  /// Ids of the nodes feeding this one, in parent connection order.
  pub fn parent_node_ids(&self) -> impl Iterator<Item = &str> {
    self.parent_connections.iter().map(|c| c.from_node_id.as_str())
  }

  /// Ids of the connections feeding this one, in parent connection order.
  pub fn incoming_connection_ids(&self) -> impl Iterator<Item = &str> {
    self
      .parent_connections
      .iter()
      .map(|c| c.connection_id.as_str())
  }
}
