//! Loader that collects every file under a directory.

use crate::route_context::RouteContext;
use crate::types::AssetData;
use super::{LoaderBehavior, NodeBehavior};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Emits one [AssetData] per file found under the load path.
///
/// Hidden entries (name starting with `.`) and symlinks are skipped. Files
/// are emitted in path order so repeated runs see the same sequence.
#[derive(Debug, Clone, Default)]
pub struct FileSystemLoader {
  load_file_path: Option<String>,
}

impl FileSystemLoader {
  pub const NAME: &'static str = "FileSystemLoader";
}

fn is_hidden(path: &Path) -> bool {
  path
    .file_name()
    .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}

/// Collects regular files below `dir`, depth first, sorted per directory.
/// Symlinks are not followed.
pub(crate) fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
  let mut entries = fs::read_dir(dir)?
    .map(|e| e.map(|e| e.path()))
    .collect::<Result<Vec<_>, _>>()?;
  entries.sort();
  for path in entries {
    if is_hidden(&path) {
      continue;
    }
    let file_type = fs::symlink_metadata(&path)?.file_type();
    if file_type.is_symlink() {
      continue;
    }
    if file_type.is_dir() {
      collect_files(&path, out)?;
    } else if file_type.is_file() {
      out.push(path);
    }
  }
  Ok(())
}

impl NodeBehavior for FileSystemLoader {
  #[instrument(level = "trace", skip(self, _inputs, ctx))]
  fn run(
    &self,
    node_id: &str,
    label_to_child: &str,
    _inputs: Vec<AssetData>,
    ctx: &mut RouteContext<'_>,
  ) -> Result<(), String> {
    let base = self
      .load_file_path
      .as_deref()
      .ok_or_else(|| "no load path configured".to_string())?;
    let mut files = Vec::new();
    collect_files(Path::new(base), &mut files)
      .map_err(|e| format!("failed to read {}: {}", base, e))?;
    debug!(node_id, base, file_count = files.len(), "loaded source files");

    let assets = files
      .iter()
      .map(|p| AssetData::loaded(p.to_string_lossy(), base))
      .collect();
    ctx.output(node_id, label_to_child, assets);
    Ok(())
  }
}

impl LoaderBehavior for FileSystemLoader {
  fn set_load_file_path(&mut self, load_file_path: Option<String>) {
    self.load_file_path = load_file_path;
  }
}
