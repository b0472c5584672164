//! Stack report save/load (JSON).

use crate::error::GraphError;
use crate::types::StackReport;
use std::path::Path;
use tracing::instrument;

/// Default filename for a stack report under an output directory.
pub const REPORT_FILENAME: &str = "stack_report.json";

/// Saves `report` to `path` as pretty JSON, creating parent directories.
#[instrument(level = "trace", skip(path, report))]
pub fn save_report(path: &Path, report: &StackReport) -> Result<(), GraphError> {
  let json = serde_json::to_string_pretty(report)?;
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  Ok(())
}

/// Loads a report from `path`. Fails if the file is missing or not a report.
#[instrument(level = "trace", skip(path))]
pub fn load_report(path: &Path) -> Result<StackReport, GraphError> {
  let bytes = std::fs::read(path)?;
  Ok(serde_json::from_slice(&bytes)?)
}
