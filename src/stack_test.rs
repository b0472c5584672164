//! Tests for `GraphStack`.

use crate::behaviors::{BehaviorRegistry, LoaderBehavior, NodeBehavior};
use crate::error::GraphError;
use crate::graph_parser::parse_graph;
use crate::route_context::RouteContext;
use crate::stack::GraphStack;
use crate::types::{AssetData, Diagnostic, NodeKind, StackedGraph};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// One recorded behavior invocation.
#[derive(Debug, Clone, PartialEq)]
struct Call {
  node_id: String,
  label_to_child: String,
  inputs: Vec<String>,
  load_file_path: Option<String>,
}

type Log = Arc<Mutex<Vec<Call>>>;

/// Records its call and emits one artifact named after the node.
///
/// Emits under each of `labels`, or under `label_to_child` when empty.
struct Scripted {
  log: Log,
  labels: Vec<String>,
  load_file_path: Option<String>,
  fail: bool,
}

impl NodeBehavior for Scripted {
  fn run(
    &self,
    node_id: &str,
    label_to_child: &str,
    inputs: Vec<AssetData>,
    ctx: &mut RouteContext<'_>,
  ) -> Result<(), String> {
    self.log.lock().unwrap().push(Call {
      node_id: node_id.to_string(),
      label_to_child: label_to_child.to_string(),
      inputs: inputs
        .iter()
        .map(|a| a.file_name_and_extension.clone().unwrap_or_default())
        .collect(),
      load_file_path: self.load_file_path.clone(),
    });
    if self.fail {
      return Err("scripted failure".to_string());
    }
    let artifact = AssetData::exported(format!("{}.out", node_id));
    if self.labels.is_empty() {
      ctx.output(node_id, label_to_child, vec![artifact]);
    } else {
      for label in &self.labels {
        ctx.output(node_id, label, vec![artifact.clone()]);
      }
    }
    Ok(())
  }
}

impl LoaderBehavior for Scripted {
  fn set_load_file_path(&mut self, load_file_path: Option<String>) {
    self.load_file_path = load_file_path;
  }
}

fn scripted(log: &Log) -> impl Fn() -> Scripted + Send + Sync + 'static {
  let log = log.clone();
  move || Scripted {
    log: log.clone(),
    labels: vec![],
    load_file_path: None,
    fail: false,
  }
}

fn stack(log: &Log) -> GraphStack {
  let mut registry = BehaviorRegistry::new();
  registry.register_loader("Load", scripted(log));
  registry.register_filter("Filter", scripted(log));
  registry.register_importer("Import", scripted(log));
  let fail_log = log.clone();
  registry.register_importer("Fail", move || Scripted {
    log: fail_log.clone(),
    labels: vec![],
    load_file_path: None,
    fail: true,
  });
  let fanout_log = log.clone();
  registry.register_loader("Fanout", move || Scripted {
    log: fanout_log.clone(),
    labels: vec!["x".to_string(), "y".to_string()],
    load_file_path: None,
    fail: false,
  });
  GraphStack::new(registry)
}

fn node(id: &str, kind: &str, class_name: &str) -> Value {
  if kind == "LOADER" {
    json!({"id": id, "kind": kind, "className": class_name, "filePath": format!("src/{}", id)})
  } else {
    json!({"id": id, "kind": kind, "className": class_name})
  }
}

fn conn(id: &str, label: &str, from: &str, to: &str) -> Value {
  json!({"id": id, "label": label, "fromNode": from, "toNode": to})
}

fn graph(nodes: Vec<Value>, connections: Vec<Value>) -> StackedGraph {
  parse_graph(&json!({"nodes": nodes, "connections": connections})).unwrap()
}

fn called(log: &Log) -> Vec<String> {
  log.lock().unwrap().iter().map(|c| c.node_id.clone()).collect()
}

fn ids(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn single_node_without_connections() {
  let log = Log::default();
  let g = graph(vec![node("a", "FILTER", "Filter")], vec![]);
  assert_eq!(g.endpoint_node_ids, vec!["a"]);
  let out = stack(&log).run_serialized_route("a", &g).unwrap();
  assert!(out.connection_ids.is_empty());
  assert_eq!(out.executed_nodes, vec!["a"]);
  // Endpoint output has no consumer and is not a diagnostic.
  assert!(out.diagnostics.is_empty());
  assert_eq!(log.lock().unwrap()[0].label_to_child, "");
}

#[test]
fn linear_chain_runs_parents_first() {
  let log = Log::default();
  let g = graph(
    vec![
      node("c", "IMPORTER", "Import"),
      node("a", "LOADER", "Load"),
      node("b", "FILTER", "Filter"),
    ],
    vec![conn("c1", "L1", "a", "b"), conn("c2", "L2", "b", "c")],
  );
  let out = stack(&log).run_serialized_route("c", &g).unwrap();
  assert_eq!(out.executed_nodes, ids(&["a", "b", "c"]));
  assert_eq!(called(&log), ids(&["a", "b", "c"]));
  assert_eq!(out.connection_ids.iter().cloned().collect::<Vec<_>>(), ids(&["c1", "c2"]));

  let calls = log.lock().unwrap();
  assert_eq!(calls[0].label_to_child, "L1");
  assert_eq!(calls[1].label_to_child, "L2");
  assert_eq!(calls[1].inputs, vec!["a.out"]);
  assert_eq!(calls[2].inputs, vec!["b.out"]);
}

#[test]
fn loader_receives_load_path() {
  let log = Log::default();
  let g = graph(
    vec![node("a", "LOADER", "Load"), node("b", "FILTER", "Filter")],
    vec![conn("c1", "", "a", "b")],
  );
  stack(&log).run_serialized_route("b", &g).unwrap();
  let calls = log.lock().unwrap();
  assert_eq!(calls[0].load_file_path.as_deref(), Some("src/a"));
  assert_eq!(calls[1].load_file_path, None);
}

#[test]
fn rerunning_a_route_gives_same_connection_ids() {
  let log = Log::default();
  let g = graph(
    vec![node("a", "LOADER", "Load"), node("b", "IMPORTER", "Import")],
    vec![conn("c1", "x", "a", "b")],
  );
  let s = stack(&log);
  let first = s.run_serialized_route("b", &g).unwrap();
  let second = s.run_serialized_route("b", &g).unwrap();
  assert_eq!(first.connection_ids, second.connection_ids);
  assert_eq!(first.executed_nodes, second.executed_nodes);
}

#[test]
fn fan_in_concatenates_in_parent_connection_order() {
  let log = Log::default();
  let g = graph(
    vec![
      node("a", "LOADER", "Load"),
      node("b", "LOADER", "Load"),
      node("m", "IMPORTER", "Import"),
    ],
    vec![conn("from_b", "", "b", "m"), conn("from_a", "", "a", "m")],
  );
  let out = stack(&log).run_serialized_route("m", &g).unwrap();
  assert_eq!(out.executed_nodes, ids(&["b", "a", "m"]));
  let calls = log.lock().unwrap();
  assert_eq!(calls[2].inputs, vec!["b.out", "a.out"]);
}

#[test]
fn diamond_runs_shared_ancestor_once() {
  let log = Log::default();
  let g = graph(
    vec![
      node("a", "LOADER", "Fanout"),
      node("b", "FILTER", "Filter"),
      node("c", "FILTER", "Filter"),
      node("d", "IMPORTER", "Import"),
    ],
    vec![
      conn("ab", "x", "a", "b"),
      conn("ac", "y", "a", "c"),
      conn("bd", "", "b", "d"),
      conn("cd", "", "c", "d"),
    ],
  );
  let out = stack(&log).run_serialized_route("d", &g).unwrap();
  assert_eq!(out.executed_nodes, ids(&["a", "b", "c", "d"]));
  assert_eq!(called(&log), ids(&["a", "b", "c", "d"]));
  assert_eq!(
    out.connection_ids.iter().cloned().collect::<Vec<_>>(),
    ids(&["ab", "ac", "bd", "cd"])
  );
  assert_eq!(log.lock().unwrap()[3].inputs, vec!["b.out", "c.out"]);
}

#[test]
fn deep_chain_runs_without_exhausting_the_stack() {
  const DEPTH: usize = 10_000;
  let log = Log::default();
  let mut nodes = vec![node("n0", "LOADER", "Load")];
  let mut connections = Vec::with_capacity(DEPTH - 1);
  for i in 1..DEPTH {
    nodes.push(node(&format!("n{}", i), "FILTER", "Filter"));
    connections.push(conn(
      &format!("c{}", i),
      "",
      &format!("n{}", i - 1),
      &format!("n{}", i),
    ));
  }
  let g = graph(nodes, connections);
  let end = format!("n{}", DEPTH - 1);
  assert_eq!(g.endpoint_node_ids, vec![end.clone()]);

  let out = stack(&log).run_serialized_route(&end, &g).unwrap();
  assert_eq!(out.executed_nodes.len(), DEPTH);
  assert_eq!(out.executed_nodes[0], "n0");
  assert_eq!(out.executed_nodes[DEPTH - 1], end);
  assert_eq!(out.connection_ids.len(), DEPTH - 1);
  assert_eq!(log.lock().unwrap()[DEPTH - 1].inputs, vec![format!("n{}.out", DEPTH - 2)]);
}

#[test]
fn cycle_deep_in_a_long_chain_is_detected() {
  const DEPTH: usize = 5_000;
  let log = Log::default();
  let mut nodes = Vec::with_capacity(DEPTH);
  let mut connections = Vec::with_capacity(DEPTH);
  for i in 0..DEPTH {
    nodes.push(node(&format!("n{}", i), "FILTER", "Filter"));
  }
  for i in 1..DEPTH {
    connections.push(conn(
      &format!("c{}", i),
      "",
      &format!("n{}", i - 1),
      &format!("n{}", i),
    ));
  }
  // n10 also feeds n0, closing a loop far from the endpoint.
  connections.push(conn("back", "", "n10", "n0"));
  let g = graph(nodes, connections);
  let end = format!("n{}", DEPTH - 1);
  let err = stack(&log).run_serialized_route(&end, &g).unwrap_err();
  assert!(matches!(err, GraphError::CycleDetected { ref node_id } if node_id == "n10"));
  assert!(called(&log).is_empty());
}

#[test]
fn diamond_with_unfed_branch_fails_on_missing_result() {
  let log = Log::default();
  let g = graph(
    vec![
      node("a", "LOADER", "Load"),
      node("b", "FILTER", "Filter"),
      node("c", "FILTER", "Filter"),
    ],
    vec![conn("ab", "", "a", "b"), conn("ac", "", "a", "c")],
  );
  let err = stack(&log).run_serialized_route("c", &g).unwrap_err();
  assert!(matches!(
    err,
    GraphError::MissingResult { ref node_id, ref connection_id } if node_id == "c" && connection_id == "ac"
  ));
}

#[test]
fn unmatched_label_is_dropped_not_fatal() {
  let log = Log::default();
  let g = graph(
    vec![node("a", "LOADER", "Fanout"), node("b", "FILTER", "Filter")],
    vec![conn("c1", "x", "a", "b")],
  );
  let out = stack(&log).run_serialized_route("b", &g).unwrap();
  assert_eq!(out.connection_ids.iter().cloned().collect::<Vec<_>>(), ids(&["c1"]));
  assert_eq!(
    out.diagnostics,
    vec![Diagnostic::DroppedOutput {
      node_id: "a".to_string(),
      label: "y".to_string(),
      artifact_count: 1,
    }]
  );
}

#[test]
fn missing_parent_node_is_lookup_error() {
  let log = Log::default();
  let g = graph(
    vec![node("b", "IMPORTER", "Import")],
    vec![conn("c1", "", "ghost", "b")],
  );
  let err = stack(&log).run_serialized_route("b", &g).unwrap_err();
  assert!(matches!(err, GraphError::NodeNotFound { ref node_id } if node_id == "ghost"));
  assert!(called(&log).is_empty());
}

#[test]
fn missing_endpoint_is_lookup_error() {
  let log = Log::default();
  let g = graph(vec![node("a", "FILTER", "Filter")], vec![]);
  let err = stack(&log).run_serialized_route("zzz", &g).unwrap_err();
  assert!(matches!(err, GraphError::NodeNotFound { .. }));
}

#[test]
fn cycle_is_detected() {
  let log = Log::default();
  let g = graph(
    vec![
      node("a", "FILTER", "Filter"),
      node("b", "FILTER", "Filter"),
      node("c", "IMPORTER", "Import"),
    ],
    vec![
      conn("ab", "", "a", "b"),
      conn("ba", "", "b", "a"),
      conn("bc", "", "b", "c"),
    ],
  );
  assert_eq!(g.endpoint_node_ids, vec!["c"]);
  let err = stack(&log).run_serialized_route("c", &g).unwrap_err();
  assert!(matches!(err, GraphError::CycleDetected { ref node_id } if node_id == "b"));
  assert!(called(&log).is_empty());
}

#[test]
fn self_loop_is_detected() {
  let log = Log::default();
  let g = graph(
    vec![node("a", "FILTER", "Filter"), node("z", "IMPORTER", "Import")],
    vec![conn("aa", "", "a", "a"), conn("az", "", "a", "z")],
  );
  let err = stack(&log).run_serialized_route("z", &g).unwrap_err();
  assert!(matches!(err, GraphError::CycleDetected { ref node_id } if node_id == "a"));
}

#[test]
fn unsupported_kinds_report_and_continue() {
  for kind in [NodeKind::Prefabricator, NodeKind::Bundlizer, NodeKind::Exporter] {
    let log = Log::default();
    let g = graph(
      vec![node("a", "LOADER", "Load"), node("p", kind.tag(), "Whatever")],
      vec![conn("c1", "", "a", "p")],
    );
    let out = stack(&log).run_serialized_route("p", &g).unwrap();
    assert_eq!(out.executed_nodes, ids(&["a", "p"]));
    assert_eq!(
      out.diagnostics,
      vec![Diagnostic::UnsupportedKind {
        node_id: "p".to_string(),
        kind,
      }]
    );
    assert_eq!(called(&log), ids(&["a"]));
  }
}

#[test]
fn child_of_unsupported_kind_has_no_input() {
  let log = Log::default();
  let g = graph(
    vec![
      node("p", "PREFABRICATOR", "Prefab"),
      node("i", "IMPORTER", "Import"),
    ],
    vec![conn("c1", "", "p", "i")],
  );
  let err = stack(&log).run_serialized_route("i", &g).unwrap_err();
  assert!(matches!(err, GraphError::MissingResult { .. }));
}

#[test]
fn unknown_behavior_aborts_route() {
  let log = Log::default();
  let g = graph(vec![node("a", "FILTER", "DoesNotExist")], vec![]);
  let err = stack(&log).run_serialized_route("a", &g).unwrap_err();
  assert!(matches!(err, GraphError::UnknownBehavior { ref behavior_ref } if behavior_ref == "DoesNotExist"));
}

#[test]
fn wrong_capability_aborts_route() {
  let log = Log::default();
  let g = graph(vec![node("a", "LOADER", "Import")], vec![]);
  let err = stack(&log).run_serialized_route("a", &g).unwrap_err();
  assert!(matches!(err, GraphError::WrongCapability { .. }));
}

#[test]
fn behavior_failure_names_node() {
  let log = Log::default();
  let g = graph(
    vec![node("a", "LOADER", "Load"), node("x", "IMPORTER", "Fail")],
    vec![conn("c1", "", "a", "x")],
  );
  let err = stack(&log).run_serialized_route("x", &g).unwrap_err();
  match err {
    GraphError::Behavior { node_id, message } => {
      assert_eq!(node_id, "x");
      assert_eq!(message, "scripted failure");
    }
    other => panic!("unexpected error: {}", other),
  }
}

#[test]
fn stacked_graph_runs_each_endpoint_independently() {
  let log = Log::default();
  let data = json!({
    "nodes": [
      node("a", "LOADER", "Load"),
      node("left", "IMPORTER", "Import"),
      node("right", "IMPORTER", "Import")
    ],
    "connections": [
      conn("to_left", "", "a", "left"),
      conn("to_right", "", "a", "right")
    ]
  });
  let report = stack(&log).run_stacked_graph(&data).unwrap();
  assert_eq!(report.endpoint_node_ids, ids(&["left", "right"]));
  let left = report.route("left").unwrap();
  assert!(left.is_ok());
  assert_eq!(
    left.output.as_ref().unwrap().executed_nodes,
    ids(&["a", "left"])
  );
  // The shared loader only feeds its first connection, so "right" aborts.
  let right = report.route("right").unwrap();
  assert!(!right.is_ok());
  assert!(right.error.as_deref().unwrap().contains("to_right"));
  // "a" ran once per route.
  assert_eq!(called(&log), ids(&["a", "left", "a"]));
  assert!(!report.all_ok());
  assert!(report.finished_at >= report.started_at);
}

#[test]
fn stacked_graph_parse_failure_is_error() {
  let log = Log::default();
  let err = stack(&log)
    .run_stacked_graph(&json!({"nodes": [{"id": "a", "kind": "BOGUS", "className": "X"}], "connections": []}))
    .unwrap_err();
  assert!(matches!(err, GraphError::Schema(_)));
}

#[test]
fn default_stack_uses_builtins() {
  let s = GraphStack::default();
  assert_eq!(s.registry().behavior_refs().len(), 3);
}
