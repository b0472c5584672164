//! Errors raised while parsing and running an asset graph.

use crate::behaviors::Capability;
use std::fmt;
use thiserror::Error;

/// One malformed field of the persisted graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
  /// Location of the field, e.g. `nodes[2].kind`.
  pub path: String,
  pub problem: String,
}

impl SchemaIssue {
  pub fn new(path: impl Into<String>, problem: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      problem: problem.into(),
    }
  }
}

impl fmt::Display for SchemaIssue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.path, self.problem)
  }
}

fn summarize(issues: &[SchemaIssue]) -> String {
  let joined = issues
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ");
  format!("{} issue(s): {}", issues.len(), joined)
}

#[derive(Debug, Error)]
pub enum GraphError {
  #[error("invalid graph, {}", summarize(.0))]
  Schema(Vec<SchemaIssue>),

  #[error("failed to find node from relations. node_id: {node_id}")]
  NodeNotFound { node_id: String },

  #[error("node {node_id} expects results on connection {connection_id} but none were produced")]
  MissingResult {
    node_id: String,
    connection_id: String,
  },

  #[error("no behavior registered as '{behavior_ref}'")]
  UnknownBehavior { behavior_ref: String },

  #[error("behavior '{behavior_ref}' is a {found} behavior, expected {expected}")]
  WrongCapability {
    behavior_ref: String,
    expected: Capability,
    found: Capability,
  },

  #[error("cycle detected at node {node_id}")]
  CycleDetected { node_id: String },

  #[error("node {node_id} failed: {message}")]
  Behavior { node_id: String, message: String },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

impl GraphError {
  /// Schema issues carried by this error, empty for other variants.
  pub fn schema_issues(&self) -> &[SchemaIssue] {
    match self {
      GraphError::Schema(issues) => issues,
      _ => &[],
    }
  }
}
