//! Node behaviors: the per-kind work the engine dispatches to.
//!
//! A behavior is created fresh from the [BehaviorRegistry] for every node
//! execution. It receives the artifacts of the node's incoming connections
//! and hands its results to [RouteContext::output] under a label.

mod extension_filter;
mod file_system_loader;
mod passthrough_importer;
mod registry;

use crate::route_context::RouteContext;
use crate::types::{AssetData, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use extension_filter::ExtensionFilter;
pub use file_system_loader::FileSystemLoader;
pub use passthrough_importer::PassthroughImporter;
pub use registry::BehaviorRegistry;

/// What a registered behavior can be used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
  Loader,
  Filter,
  Importer,
}

impl Capability {
  /// Capability the engine needs to run a node of `kind`, if any.
  pub fn for_kind(kind: NodeKind) -> Option<Capability> {
    match kind {
      NodeKind::Loader => Some(Capability::Loader),
      NodeKind::Filter => Some(Capability::Filter),
      NodeKind::Importer => Some(Capability::Importer),
      NodeKind::Prefabricator | NodeKind::Bundlizer | NodeKind::Exporter => None,
    }
  }
}

impl fmt::Display for Capability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Capability::Loader => write!(f, "loader"),
      Capability::Filter => write!(f, "filter"),
      Capability::Importer => write!(f, "importer"),
    }
  }
}

/// Work done for one node of a route.
pub trait NodeBehavior {
  /// Runs the node.
  ///
  /// `label_to_child` is the label of the node's first outgoing connection,
  /// or "" for an endpoint. Behaviors that split their output by label may
  /// emit under other labels instead.
  fn run(
    &self,
    node_id: &str,
    label_to_child: &str,
    inputs: Vec<AssetData>,
    ctx: &mut RouteContext<'_>,
  ) -> Result<(), String>;
}

/// A behavior that reads assets from a configured location.
pub trait LoaderBehavior: NodeBehavior {
  /// Called with the node's load path before [NodeBehavior::run].
  fn set_load_file_path(&mut self, load_file_path: Option<String>);
}
