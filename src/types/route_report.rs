//! Results of running one endpoint (a route) and of a whole stacked graph.

use super::NodeKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Non-fatal condition raised while running a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
  /// A behavior emitted under a label no outgoing connection carries.
  DroppedOutput {
    node_id: String,
    label: String,
    artifact_count: usize,
  },
  /// The node's kind has no behavior capability yet; it produced nothing.
  UnsupportedKind { node_id: String, kind: NodeKind },
}

/// Observable output of one route run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOutput {
  /// Connection ids that received artifacts during the run.
  pub connection_ids: BTreeSet<String>,
  /// Node ids in the order they were executed.
  pub executed_nodes: Vec<String>,
  pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of one endpoint run inside a stacked graph run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteReport {
  pub endpoint_node_id: String,
  pub output: Option<RouteOutput>,
  /// Fatal error text when the route aborted.
  pub error: Option<String>,
}

impl RouteReport {
  pub fn completed(endpoint_node_id: impl Into<String>, output: RouteOutput) -> Self {
    Self {
      endpoint_node_id: endpoint_node_id.into(),
      output: Some(output),
      error: None,
    }
  }

  pub fn failed(endpoint_node_id: impl Into<String>, error: impl Into<String>) -> Self {
    Self {
      endpoint_node_id: endpoint_node_id.into(),
      output: None,
      error: Some(error.into()),
    }
  }

  pub fn is_ok(&self) -> bool {
    self.error.is_none()
  }
}

/// Report of one `run_stacked_graph` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackReport {
  pub endpoint_node_ids: Vec<String>,
  pub routes: Vec<RouteReport>,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
}

impl StackReport {
  /// True when every route completed.
  pub fn all_ok(&self) -> bool {
    self.routes.iter().all(RouteReport::is_ok)
  }

  /// All diagnostics across completed routes, in route order.
  pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
    self
      .routes
      .iter()
      .filter_map(|r| r.output.as_ref())
      .flat_map(|o| o.diagnostics.iter())
  }

  pub fn route(&self, endpoint_node_id: &str) -> Option<&RouteReport> {
    self
      .routes
      .iter()
      .find(|r| r.endpoint_node_id == endpoint_node_id)
  }
}
