//! Kind tag of an asset graph node.

use crate::behaviors::Capability;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a node; decides which behavior capability the engine asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
  Loader,
  Filter,
  Importer,
  Prefabricator,
  Bundlizer,
  Exporter,
}

impl NodeKind {
  pub const ALL: [NodeKind; 6] = [
    NodeKind::Loader,
    NodeKind::Filter,
    NodeKind::Importer,
    NodeKind::Prefabricator,
    NodeKind::Bundlizer,
    NodeKind::Exporter,
  ];

  /// The tag used for this kind in persisted graphs.
  pub fn tag(&self) -> &'static str {
    match self {
      NodeKind::Loader => "LOADER",
      NodeKind::Filter => "FILTER",
      NodeKind::Importer => "IMPORTER",
      NodeKind::Prefabricator => "PREFABRICATOR",
      NodeKind::Bundlizer => "BUNDLIZER",
      NodeKind::Exporter => "EXPORTER",
    }
  }

  /// Returns true for kinds the engine has a behavior capability for.
  pub fn is_supported(&self) -> bool {
    Capability::for_kind(*self).is_some()
  }
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.tag())
  }
}

impl FromStr for NodeKind {
  type Err = String;

  /// Tags are matched exactly; there is no fallback kind.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    NodeKind::ALL
      .into_iter()
      .find(|k| k.tag() == s)
      .ok_or_else(|| format!("unknown node kind tag '{}'", s))
  }
}
