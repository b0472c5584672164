//! A labeled connection between two nodes of the asset graph.

use serde::{Deserialize, Serialize};

/// A labeled connection between two nodes.
///
/// `from_node_id` and `to_node_id` are looked up by id in the node table;
/// a connection never owns the nodes it joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
  pub connection_id: String,
  /// Label artifacts travel under. May be empty.
  pub label: String,
  pub from_node_id: String,
  pub to_node_id: String,
}

impl Connection {
  pub fn new(
    connection_id: impl Into<String>,
    label: impl Into<String>,
    from_node_id: impl Into<String>,
    to_node_id: impl Into<String>,
  ) -> Self {
    Self {
      connection_id: connection_id.into(),
      label: label.into(),
      from_node_id: from_node_id.into(),
      to_node_id: to_node_id.into(),
    }
  }

  /// Returns true if this connection leaves `node_id`.
  pub fn leaves(&self, node_id: &str) -> bool {
    self.from_node_id == node_id
  }
}
