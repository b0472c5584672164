//! Runs a stacked asset graph, one endpoint at a time.
//!
//! For every endpoint (a node with no outgoing connection) the engine walks
//! the endpoint's ancestors depth first, executing each parent before its
//! child, and threads artifacts from node to node through connection-keyed
//! results held in a [RouteContext]. Each endpoint gets its own context;
//! nothing is shared between endpoints.

use crate::behaviors::{BehaviorRegistry, Capability};
use crate::error::GraphError;
use crate::graph_parser::parse_graph;
use crate::route_context::RouteContext;
use crate::types::{AssetData, Diagnostic, NodeData, RouteOutput, RouteReport, StackReport, StackedGraph};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, trace};

/// Progress of one node within one route run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VisitState {
  Unvisited,
  AncestorsRunning,
  SelfRunning,
  Done,
}

/// Mutable state of one route run.
pub(crate) struct RouteRun<'g> {
  graph: &'g StackedGraph,
  ctx: RouteContext<'g>,
  states: HashMap<&'g str, VisitState>,
  executed_nodes: Vec<String>,
}

impl<'g> RouteRun<'g> {
  pub(crate) fn new(graph: &'g StackedGraph) -> Self {
    Self {
      graph,
      ctx: RouteContext::new(graph),
      states: HashMap::new(),
      executed_nodes: vec![],
    }
  }

  pub(crate) fn state(&self, node_id: &str) -> VisitState {
    self
      .states
      .get(node_id)
      .copied()
      .unwrap_or(VisitState::Unvisited)
  }

  /// Looks up `node_id` and marks it as waiting on its parents.
  ///
  /// Returns `None` when the node already ran in this route.
  fn enter(&mut self, node_id: &str) -> Result<Option<&'g NodeData>, GraphError> {
    let graph = self.graph;
    let node = graph.node(node_id).ok_or_else(|| GraphError::NodeNotFound {
      node_id: node_id.to_string(),
    })?;
    match self.state(node_id) {
      VisitState::Done => Ok(None),
      VisitState::AncestorsRunning | VisitState::SelfRunning => Err(GraphError::CycleDetected {
        node_id: node_id.to_string(),
      }),
      VisitState::Unvisited => {
        self
          .states
          .insert(node.node_id.as_str(), VisitState::AncestorsRunning);
        Ok(Some(node))
      }
    }
  }

  fn finish(self) -> RouteOutput {
    let (cache, diagnostics) = self.ctx.into_parts();
    RouteOutput {
      connection_ids: cache.into_keys().collect(),
      executed_nodes: self.executed_nodes,
      diagnostics,
    }
  }
}

/// Executes asset graphs with behaviors resolved from a [BehaviorRegistry].
#[derive(Clone)]
pub struct GraphStack {
  registry: BehaviorRegistry,
}

impl Default for GraphStack {
  fn default() -> Self {
    Self::new(BehaviorRegistry::with_builtins())
  }
}

impl GraphStack {
  pub fn new(registry: BehaviorRegistry) -> Self {
    Self { registry }
  }

  pub fn registry(&self) -> &BehaviorRegistry {
    &self.registry
  }

  pub fn registry_mut(&mut self) -> &mut BehaviorRegistry {
    &mut self.registry
  }

  /// Parses `graph_data` and runs every endpoint.
  ///
  /// Fails only when the graph cannot be parsed. A route that aborts is
  /// recorded as failed in the report and the remaining endpoints still run.
  #[instrument(level = "trace", skip(self, graph_data))]
  pub fn run_stacked_graph(&self, graph_data: &Value) -> Result<StackReport, GraphError> {
    let started_at = Utc::now();
    let graph = parse_graph(graph_data)?;
    let routes = self.run_endpoints(&graph);
    Ok(StackReport {
      endpoint_node_ids: graph.endpoint_node_ids.clone(),
      routes,
      started_at,
      finished_at: Utc::now(),
    })
  }

  /// Runs every endpoint of an already parsed graph.
  pub fn run_endpoints(&self, graph: &StackedGraph) -> Vec<RouteReport> {
    graph
      .endpoint_node_ids
      .iter()
      .map(|end_node_id| match self.run_serialized_route(end_node_id, graph) {
        Ok(output) => RouteReport::completed(end_node_id, output),
        Err(e) => {
          error!(endpoint = %end_node_id, error = %e, "route aborted");
          RouteReport::failed(end_node_id, e.to_string())
        }
      })
      .collect()
  }

  /// Runs the ancestors of `end_node_id` and then the node itself.
  ///
  /// Returns the connection ids that received results, the execution order
  /// and any non-fatal diagnostics.
  #[instrument(level = "trace", skip(self, graph))]
  pub fn run_serialized_route(
    &self,
    end_node_id: &str,
    graph: &StackedGraph,
  ) -> Result<RouteOutput, GraphError> {
    info!(endpoint = end_node_id, "running route");
    let mut run = RouteRun::new(graph);
    self.run_up_to_parent(end_node_id, &mut run)?;
    let output = run.finish();
    info!(
      endpoint = end_node_id,
      executed = ?output.executed_nodes,
      connections = ?output.connection_ids,
      "route complete"
    );
    Ok(output)
  }

  /// Executes every parent of `node_id`, then `node_id` itself.
  ///
  /// A node runs at most once per route even when several paths reach it.
  /// Reaching a node again while its own parents are still running means
  /// the graph has a cycle. The walk keeps its own stack of
  /// `(node, next parent index)` frames, so graph depth is not bounded by
  /// the thread stack.
  pub(crate) fn run_up_to_parent<'g>(
    &self,
    node_id: &str,
    run: &mut RouteRun<'g>,
  ) -> Result<(), GraphError> {
    let graph = run.graph;
    let mut walk: Vec<(&'g NodeData, usize)> = Vec::new();
    if let Some(node) = run.enter(node_id)? {
      walk.push((node, 0));
    }

    while let Some(frame) = walk.last_mut() {
      let (node, next_parent) = *frame;
      if let Some(parent) = node.parent_connections.get(next_parent) {
        frame.1 += 1;
        if let Some(parent_node) = run.enter(&parent.from_node_id)? {
          walk.push((parent_node, 0));
        }
        continue;
      }
      walk.pop();

      let node_id = node.node_id.as_str();
      run.states.insert(node_id, VisitState::SelfRunning);
      let label_to_child = graph.label_to_child(node_id);
      if graph.is_endpoint(node_id) {
        trace!(node_id, "endpoint node, nothing downstream");
      }
      let inputs = gather_inputs(node, &run.ctx)?;
      self.dispatch(node, label_to_child, inputs, &mut run.ctx)?;

      run.executed_nodes.push(node.node_id.clone());
      run.states.insert(node_id, VisitState::Done);
    }
    Ok(())
  }

  /// Instantiates the node's behavior and runs it.
  fn dispatch(
    &self,
    node: &NodeData,
    label_to_child: &str,
    inputs: Vec<AssetData>,
    ctx: &mut RouteContext<'_>,
  ) -> Result<(), GraphError> {
    let node_id = node.node_id.as_str();
    debug!(
      node_id,
      kind = %node.kind,
      behavior_ref = %node.behavior_ref,
      label_to_child,
      input_count = inputs.len(),
      "executing node"
    );

    let result = match Capability::for_kind(node.kind) {
      Some(Capability::Loader) => {
        let mut behavior = self.registry.loader(&node.behavior_ref)?;
        behavior.set_load_file_path(node.load_file_path.clone());
        behavior.run(node_id, label_to_child, inputs, ctx)
      }
      Some(Capability::Filter) => {
        let behavior = self.registry.filter(&node.behavior_ref)?;
        behavior.run(node_id, label_to_child, inputs, ctx)
      }
      Some(Capability::Importer) => {
        let behavior = self.registry.importer(&node.behavior_ref)?;
        behavior.run(node_id, label_to_child, inputs, ctx)
      }
      None => {
        error!(node_id, kind = %node.kind, "not yet applied node kind");
        ctx.report(Diagnostic::UnsupportedKind {
          node_id: node_id.to_string(),
          kind: node.kind,
        });
        Ok(())
      }
    };

    result.map_err(|message| GraphError::Behavior {
      node_id: node_id.to_string(),
      message,
    })
  }
}

/// Concatenates the results of the node's incoming connections, in
/// parent connection order.
pub(crate) fn gather_inputs(node: &NodeData, ctx: &RouteContext<'_>) -> Result<Vec<AssetData>, GraphError> {
  let mut inputs = Vec::new();
  for connection_id in node.incoming_connection_ids() {
    let results = ctx
      .results(connection_id)
      .ok_or_else(|| GraphError::MissingResult {
        node_id: node.node_id.clone(),
        connection_id: connection_id.to_string(),
      })?;
    inputs.extend_from_slice(results);
  }
  Ok(inputs)
}
