//! # assetgraph
//!
//! Runs asset-processing graphs. A graph is a set of typed nodes joined by
//! labeled, directed connections; artifacts flow from a node to its
//! children along those connections.
//!
//! ## Architecture
//!
//! - [graph_parser] turns the persisted JSON graph into a [StackedGraph]:
//!   nodes with their parent connections attached, plus the endpoint ids
//!   (nodes with no outgoing connection).
//! - [GraphStack] runs each endpoint on its own: parents first, depth
//!   first, every node at most once per route, with per-route results
//!   held in a [RouteContext] keyed by connection id.
//! - [behaviors] holds the work each node does. Behaviors are resolved by
//!   name from a [BehaviorRegistry] and checked against the node's kind.
//! - [report_io] persists the resulting [StackReport].

pub mod behaviors;
pub mod error;
pub mod graph_parser;
pub mod report_io;
pub mod route_context;
pub mod settings;
pub mod stack;
#[cfg(test)]
mod stack_test;
pub mod types;

pub use behaviors::{BehaviorRegistry, Capability, LoaderBehavior, NodeBehavior};
pub use error::{GraphError, SchemaIssue};
pub use graph_parser::{parse_graph, parse_graph_json};
pub use route_context::RouteContext;
pub use stack::GraphStack;
pub use types::{
  AssetData, Connection, Diagnostic, NodeData, NodeKind, RouteOutput, RouteReport, StackReport,
  StackedGraph,
};
