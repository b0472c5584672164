//! Reads a persisted asset graph into the typed graph model.
//!
//! The persisted form is a JSON object with a `nodes` and a `connections`
//! sequence (see [crate::settings] for the keys). Every record is checked;
//! all malformed fields are reported together as one
//! [GraphError::Schema].
//!
//! The parser does not check that connections reference declared nodes and
//! does not look for cycles. Both surface later, when a route is run.

use crate::error::{GraphError, SchemaIssue};
use crate::settings::{
  CONNECTION_FROM_NODE, CONNECTION_ID, CONNECTION_LABEL, CONNECTION_TO_NODE, GRAPH_DATA_CONNECTIONS,
  GRAPH_DATA_NODES, LOADER_NODE_FILE_PATH, NODE_CLASSNAME, NODE_ID, NODE_KIND,
};
use crate::types::{Connection, NodeData, NodeKind, StackedGraph};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

/// Parses a JSON document into a [StackedGraph].
pub fn parse_graph_json(source: &str) -> Result<StackedGraph, GraphError> {
  let value: Value = serde_json::from_str(source)?;
  parse_graph(&value)
}

/// Parses an already-decoded graph document into a [StackedGraph].
#[instrument(level = "trace", skip(graph_data))]
pub fn parse_graph(graph_data: &Value) -> Result<StackedGraph, GraphError> {
  let mut issues = Vec::new();

  let Some(root) = graph_data.as_object() else {
    return Err(GraphError::Schema(vec![SchemaIssue::new(
      "$",
      format!("expected an object, found {}", type_name(graph_data)),
    )]));
  };

  let connection_records = sequence(root, GRAPH_DATA_CONNECTIONS, &mut issues);
  let node_records = sequence(root, GRAPH_DATA_NODES, &mut issues);

  let connections = parse_connections(connection_records, &mut issues);
  let nodes = parse_nodes(node_records, &mut issues);

  if !issues.is_empty() {
    return Err(GraphError::Schema(issues));
  }

  let endpoint_node_ids =
    find_endpoint_node_ids(nodes.iter().map(|n| n.node_id.as_str()), &connections);

  let mut parents = collect_parent_connections(&connections);
  let nodes: HashMap<String, NodeData> = nodes
    .into_iter()
    .map(|node| {
      let parent_connections = parents.remove(&node.node_id).unwrap_or_default();
      (
        node.node_id.clone(),
        node.with_parent_connections(parent_connections),
      )
    })
    .collect();

  info!(
    node_count = nodes.len(),
    unsupported_count = nodes.values().filter(|n| !n.kind.is_supported()).count(),
    connection_count = connections.len(),
    endpoints = ?endpoint_node_ids,
    "parsed asset graph"
  );

  Ok(StackedGraph {
    endpoint_node_ids,
    nodes,
    connections,
  })
}

/// Node ids that never appear as the source of a connection, in the order
/// given. Each id is returned once.
pub fn find_endpoint_node_ids<'a>(
  node_ids: impl IntoIterator<Item = &'a str>,
  connections: &[Connection],
) -> Vec<String> {
  let has_child: HashSet<&str> = connections
    .iter()
    .map(|c| c.from_node_id.as_str())
    .collect();
  let mut seen = HashSet::new();
  node_ids
    .into_iter()
    .filter(|id| !has_child.contains(id) && seen.insert(*id))
    .map(str::to_string)
    .collect()
}

/// Groups connections by the node they enter, keeping declaration order.
pub fn collect_parent_connections(connections: &[Connection]) -> HashMap<String, Vec<Connection>> {
  connections
    .iter()
    .fold(HashMap::new(), |mut parents: HashMap<String, Vec<Connection>>, c| {
      parents.entry(c.to_node_id.clone()).or_default().push(c.clone());
      parents
    })
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Returns the array stored under `key`, or records an issue and returns an empty slice.
fn sequence<'a>(root: &'a Map<String, Value>, key: &str, issues: &mut Vec<SchemaIssue>) -> &'a [Value] {
  match root.get(key) {
    Some(Value::Array(items)) => items,
    Some(other) => {
      issues.push(SchemaIssue::new(
        key,
        format!("expected an array, found {}", type_name(other)),
      ));
      &[]
    }
    None => {
      issues.push(SchemaIssue::new(key, "missing sequence"));
      &[]
    }
  }
}

/// Reads a required string field, recording an issue when it is absent or not a string.
fn string_field(
  record: &Map<String, Value>,
  path: &str,
  key: &str,
  issues: &mut Vec<SchemaIssue>,
) -> Option<String> {
  match record.get(key) {
    Some(Value::String(s)) => Some(s.clone()),
    Some(other) => {
      issues.push(SchemaIssue::new(
        format!("{}.{}", path, key),
        format!("expected a string, found {}", type_name(other)),
      ));
      None
    }
    None => {
      issues.push(SchemaIssue::new(format!("{}.{}", path, key), "missing field"));
      None
    }
  }
}

fn record<'a>(value: &'a Value, path: &str, issues: &mut Vec<SchemaIssue>) -> Option<&'a Map<String, Value>> {
  let map = value.as_object();
  if map.is_none() {
    issues.push(SchemaIssue::new(
      path,
      format!("expected an object, found {}", type_name(value)),
    ));
  }
  map
}

pub(crate) fn parse_connections(records: &[Value], issues: &mut Vec<SchemaIssue>) -> Vec<Connection> {
  let mut connections = Vec::with_capacity(records.len());
  for (i, value) in records.iter().enumerate() {
    let path = format!("{}[{}]", GRAPH_DATA_CONNECTIONS, i);
    let Some(rec) = record(value, &path, issues) else {
      continue;
    };
    let id = string_field(rec, &path, CONNECTION_ID, issues);
    let label = string_field(rec, &path, CONNECTION_LABEL, issues);
    let from = string_field(rec, &path, CONNECTION_FROM_NODE, issues);
    let to = string_field(rec, &path, CONNECTION_TO_NODE, issues);
    if let (Some(id), Some(label), Some(from), Some(to)) = (id, label, from, to) {
      connections.push(Connection::new(id, label, from, to));
    }
  }
  connections
}

pub(crate) fn parse_nodes(records: &[Value], issues: &mut Vec<SchemaIssue>) -> Vec<NodeData> {
  let mut nodes = Vec::with_capacity(records.len());
  let mut seen_ids = HashSet::new();
  for (i, value) in records.iter().enumerate() {
    let path = format!("{}[{}]", GRAPH_DATA_NODES, i);
    let Some(rec) = record(value, &path, issues) else {
      continue;
    };
    let id = string_field(rec, &path, NODE_ID, issues);
    let kind = string_field(rec, &path, NODE_KIND, issues).and_then(|tag| {
      tag
        .parse::<NodeKind>()
        .map_err(|e| issues.push(SchemaIssue::new(format!("{}.{}", path, NODE_KIND), e)))
        .ok()
    });
    let behavior_ref = string_field(rec, &path, NODE_CLASSNAME, issues);

    if let Some(ref id) = id
      && !seen_ids.insert(id.clone())
    {
      issues.push(SchemaIssue::new(
        format!("{}.{}", path, NODE_ID),
        format!("duplicate node id '{}'", id),
      ));
      continue;
    }

    let (Some(id), Some(kind), Some(behavior_ref)) = (id, kind, behavior_ref) else {
      continue;
    };
    let node = match kind {
      NodeKind::Loader => match string_field(rec, &path, LOADER_NODE_FILE_PATH, issues) {
        Some(load_file_path) => NodeData::loader(id, behavior_ref, load_file_path),
        None => continue,
      },
      _ => NodeData::new(id, kind, behavior_ref),
    };
    nodes.push(node);
  }
  nodes
}
