//! Importer that marks every input as imported.

use crate::route_context::RouteContext;
use crate::types::AssetData;
use super::NodeBehavior;

/// Re-emits each input as imported under `Imported/<node_id>/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughImporter;

impl PassthroughImporter {
  pub const NAME: &'static str = "PassthroughImporter";
}

pub(crate) fn imported_path(node_id: &str, asset: &AssetData) -> String {
  let rel = asset
    .path_under_source_base
    .as_deref()
    .or(asset.file_name_and_extension.as_deref())
    .unwrap_or(asset.trace_id.as_str());
  format!("Imported/{}/{}", node_id, rel)
}

impl NodeBehavior for PassthroughImporter {
  fn run(
    &self,
    node_id: &str,
    label_to_child: &str,
    inputs: Vec<AssetData>,
    ctx: &mut RouteContext<'_>,
  ) -> Result<(), String> {
    let imported = inputs
      .iter()
      .map(|a| AssetData::imported(a, imported_path(node_id, a)))
      .collect();
    ctx.output(node_id, label_to_child, imported);
    Ok(())
  }
}
