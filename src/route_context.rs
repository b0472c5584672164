//! Run-scoped state behaviors write their results into.

use crate::types::{AssetData, Diagnostic, ResultCache, StackedGraph};
use tracing::{trace, warn};

/// Per-route result store handed to each behavior.
///
/// Results are keyed by connection id. A context lives for one route run
/// and is dropped once the populated connection ids have been collected.
pub struct RouteContext<'g> {
  graph: &'g StackedGraph,
  cache: ResultCache,
  diagnostics: Vec<Diagnostic>,
}

impl<'g> RouteContext<'g> {
  pub fn new(graph: &'g StackedGraph) -> Self {
    Self {
      graph,
      cache: ResultCache::new(),
      diagnostics: vec![],
    }
  }

  /// Hands `artifacts` emitted by `source_node_id` under `label` to the
  /// first connection leaving that node with the same label.
  ///
  /// Output of an endpoint has nowhere to go and is discarded quietly.
  /// Otherwise, with no connection under `label`, the artifacts are dropped
  /// and a [Diagnostic::DroppedOutput] is recorded. Writing the same
  /// connection twice keeps the later artifacts.
  pub fn output(&mut self, source_node_id: &str, label: &str, artifacts: Vec<AssetData>) {
    if self.graph.is_endpoint(source_node_id) {
      trace!(
        node_id = source_node_id,
        label,
        artifact_count = artifacts.len(),
        "endpoint output discarded"
      );
      return;
    }
    match self.graph.first_connection_with_label(source_node_id, label) {
      Some(connection) => {
        self
          .cache
          .insert(connection.connection_id.clone(), artifacts);
      }
      None => {
        warn!(
          node_id = source_node_id,
          label,
          artifact_count = artifacts.len(),
          "no connection carries this label; output dropped"
        );
        self.diagnostics.push(Diagnostic::DroppedOutput {
          node_id: source_node_id.to_string(),
          label: label.to_string(),
          artifact_count: artifacts.len(),
        });
      }
    }
  }

  /// Distinct labels of the connections leaving `node_id`, in declaration order.
  pub fn outgoing_labels(&self, node_id: &str) -> Vec<&'g str> {
    let graph = self.graph;
    let mut labels: Vec<&'g str> = Vec::new();
    for connection in graph.outgoing_connections(node_id) {
      if !labels.contains(&connection.label.as_str()) {
        labels.push(connection.label.as_str());
      }
    }
    labels
  }

  /// Artifacts stored for `connection_id` so far.
  pub fn results(&self, connection_id: &str) -> Option<&[AssetData]> {
    self.cache.get(connection_id).map(Vec::as_slice)
  }

  pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
    self.diagnostics.push(diagnostic);
  }

  pub(crate) fn into_parts(self) -> (ResultCache, Vec<Diagnostic>) {
    (self.cache, self.diagnostics)
  }
}
