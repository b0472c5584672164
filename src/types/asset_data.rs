//! Artifact record threaded along connections.
//!
//! The engine never looks inside an `AssetData`; only behaviors do.

use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// One asset moving through the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetData {
  /// Identifies the asset across loader, importer and exporter steps.
  pub trace_id: String,
  pub absolute_source_path: Option<String>,
  pub source_base_path: Option<String>,
  pub file_name_and_extension: Option<String>,
  pub path_under_source_base: Option<String>,
  pub imported_path: Option<String>,
  pub exported_path: Option<String>,
  pub asset_id: Option<String>,
  pub is_new: bool,
  pub is_bundled: bool,
}

fn new_trace_id() -> String {
  Uuid::new_v4().to_string()
}

fn file_name_of(path: &str) -> Option<String> {
  Path::new(path)
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
}

/// Path of `absolute` relative to `base`, with `/` separators.
/// Falls back to the full path when `absolute` is not under `base`.
pub(crate) fn path_under_base(absolute: &str, base: &str) -> String {
  match Path::new(absolute).strip_prefix(base) {
    Ok(rel) => rel
      .components()
      .map(|c| c.as_os_str().to_string_lossy().into_owned())
      .collect::<Vec<_>>()
      .join("/"),
    Err(_) => absolute.to_string(),
  }
}

impl AssetData {
  /// A source asset found by a loader under `source_base_path`.
  pub fn loaded(absolute_source_path: impl Into<String>, source_base_path: impl Into<String>) -> Self {
    let absolute_source_path = absolute_source_path.into();
    let source_base_path = source_base_path.into();
    Self {
      trace_id: new_trace_id(),
      file_name_and_extension: file_name_of(&absolute_source_path),
      path_under_source_base: Some(path_under_base(&absolute_source_path, &source_base_path)),
      absolute_source_path: Some(absolute_source_path),
      source_base_path: Some(source_base_path),
      imported_path: None,
      exported_path: None,
      asset_id: None,
      is_new: true,
      is_bundled: false,
    }
  }

  /// The imported form of `source`. Keeps the trace id and source information.
  pub fn imported(source: &AssetData, imported_path: impl Into<String>) -> Self {
    Self {
      imported_path: Some(imported_path.into()),
      is_new: false,
      ..source.clone()
    }
  }

  /// An asset written out by an exporter.
  pub fn exported(exported_path: impl Into<String>) -> Self {
    let exported_path = exported_path.into();
    Self {
      trace_id: new_trace_id(),
      absolute_source_path: None,
      source_base_path: None,
      file_name_and_extension: file_name_of(&exported_path),
      path_under_source_base: None,
      imported_path: None,
      exported_path: Some(exported_path),
      asset_id: None,
      is_new: true,
      is_bundled: false,
    }
  }

  /// Lowercase extension of the file name, if it has one.
  pub fn extension(&self) -> Option<String> {
    self
      .file_name_and_extension
      .as_deref()
      .and_then(|n| Path::new(n).extension())
      .map(|e| e.to_string_lossy().to_lowercase())
  }
}
