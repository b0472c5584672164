//! Parsed asset graph: endpoint node ids, node table and connections.

use super::{Connection, NodeData};
use std::collections::HashMap;

/// Parsed asset graph, ready to be run endpoint by endpoint.
#[derive(Debug, Clone, Default)]
pub struct StackedGraph {
  /// Nodes with no outgoing connection, in node declaration order.
  pub endpoint_node_ids: Vec<String>,
  pub nodes: HashMap<String, NodeData>,
  /// Connections in declaration order.
  pub connections: Vec<Connection>,
}

impl StackedGraph {
  pub fn node(&self, node_id: &str) -> Option<&NodeData> {
    self.nodes.get(node_id)
  }

  pub fn outgoing_connections(&self, node_id: &str) -> Vec<&Connection> {
    self.connections.iter().filter(|c| c.leaves(node_id)).collect()
  }

  /// True when no connection leaves `node_id`.
  pub fn is_endpoint(&self, node_id: &str) -> bool {
    !self.connections.iter().any(|c| c.leaves(node_id))
  }

  /// Label of the first connection leaving `node_id`, or "" for an endpoint.
  pub fn label_to_child(&self, node_id: &str) -> &str {
    self
      .connections
      .iter()
      .find(|c| c.leaves(node_id))
      .map(|c| c.label.as_str())
      .unwrap_or("")
  }

  /// First connection leaving `node_id` under `label`.
  pub fn first_connection_with_label(&self, node_id: &str, label: &str) -> Option<&Connection> {
    self
      .connections
      .iter()
      .find(|c| c.leaves(node_id) && c.label == label)
  }
}
