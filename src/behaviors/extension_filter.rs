//! Filter that splits assets by file extension.

use crate::route_context::RouteContext;
use crate::types::AssetData;
use super::NodeBehavior;
use std::collections::BTreeMap;
use tracing::instrument;

/// Emits each group of same-extension assets under the extension as label
/// (`png`, `fbx`, ...). Assets without an extension go to `label_to_child`.
/// Every outgoing label of the node receives an output, possibly empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionFilter;

impl ExtensionFilter {
  pub const NAME: &'static str = "ExtensionFilter";
}

/// Groups `inputs` by label, keeping input order inside each group.
///
/// `outgoing_labels` and `label_to_child` start out as empty groups.
pub(crate) fn group_by_extension(
  inputs: Vec<AssetData>,
  outgoing_labels: &[&str],
  label_to_child: &str,
) -> BTreeMap<String, Vec<AssetData>> {
  let mut groups: BTreeMap<String, Vec<AssetData>> = outgoing_labels
    .iter()
    .map(|label| (label.to_string(), Vec::new()))
    .collect();
  groups.entry(label_to_child.to_string()).or_default();
  for asset in inputs {
    let label = asset
      .extension()
      .unwrap_or_else(|| label_to_child.to_string());
    groups.entry(label).or_default().push(asset);
  }
  groups
}

impl NodeBehavior for ExtensionFilter {
  #[instrument(level = "trace", skip(self, inputs, ctx))]
  fn run(
    &self,
    node_id: &str,
    label_to_child: &str,
    inputs: Vec<AssetData>,
    ctx: &mut RouteContext<'_>,
  ) -> Result<(), String> {
    let outgoing_labels = ctx.outgoing_labels(node_id);
    for (label, assets) in group_by_extension(inputs, &outgoing_labels, label_to_child) {
      ctx.output(node_id, &label, assets);
    }
    Ok(())
  }
}
