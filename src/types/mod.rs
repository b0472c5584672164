//! Asset graph model types.
//!
//! Nodes and connections are built once by the graph parser and read by
//! the engine; artifacts (`AssetData`) are produced and consumed by
//! behaviors only.

mod asset_data;
mod connection;
mod node_data;
mod node_kind;
mod route_report;
mod stacked_graph;

use std::collections::HashMap;

pub use asset_data::AssetData;
pub use connection::Connection;
pub use node_data::NodeData;
pub use node_kind::NodeKind;
pub use route_report::{Diagnostic, RouteOutput, RouteReport, StackReport};
pub use stacked_graph::StackedGraph;

/// Artifacts stored per connection id during one route run.
pub type ResultCache = HashMap<String, Vec<AssetData>>;
