//! CLI: Run an asset graph from a JSON file.
//!
//! Parses the graph, runs every endpoint with the built-in behaviors and
//! prints one summary line per route. Loader paths are resolved against
//! the current directory.
//!
//! Usage: `run_graph [OPTIONS] <path-to-graph-json>`
//! Example: run_graph --report out/stack_report.json graphs/textures.json
//!
//! Set RUST_LOG=assetgraph=debug to see every node dispatch.

use assetgraph::{GraphStack, StackReport, report_io};
use clap::Parser;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run an asset graph from a JSON file.
#[derive(Parser, Debug)]
#[command(name = "run_graph")]
#[command(
  after_help = r#"Environment variables (override flags when set):
  ASSETGRAPH_REPORT   Path the JSON stack report is written to.

Examples:
  run_graph graphs/textures.json
  run_graph --strict --report out/stack_report.json graphs/textures.json"#
)]
struct Args {
  /// Write the stack report as JSON to this path. Overridden by ASSETGRAPH_REPORT if set.
  #[arg(long, value_name = "PATH")]
  report: Option<PathBuf>,

  /// Exit non-zero when any route failed or raised a diagnostic.
  #[arg(long)]
  strict: bool,

  /// Path to the graph JSON file
  #[arg(value_name = "path-to-graph-json")]
  graph_path: PathBuf,
}

fn print_summary(report: &StackReport) {
  println!("Graph run completed.");
  println!("  Endpoints: {:?}", report.endpoint_node_ids);
  for route in &report.routes {
    match (&route.output, &route.error) {
      (Some(output), _) => println!(
        "  [ok]     {}: executed {:?}, connections {:?}, diagnostics {}",
        route.endpoint_node_id,
        output.executed_nodes,
        output.connection_ids,
        output.diagnostics.len()
      ),
      (None, Some(error)) => println!("  [failed] {}: {}", route.endpoint_node_id, error),
      (None, None) => println!("  [failed] {}", route.endpoint_node_id),
    }
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let report_path = env::var("ASSETGRAPH_REPORT")
    .ok()
    .map(PathBuf::from)
    .or_else(|| args.report.clone());
  info!(graph = %args.graph_path.display(), report = ?report_path, strict = args.strict, "run_graph starting");

  let path = &args.graph_path;
  let text = match fs::read_to_string(path) {
    Ok(s) => s,
    Err(e) => {
      eprintln!("Error reading {}: {}", path.display(), e);
      process::exit(1);
    }
  };

  let graph_data: Value = match serde_json::from_str(&text) {
    Ok(v) => v,
    Err(e) => {
      eprintln!("Error parsing JSON: {}", e);
      process::exit(1);
    }
  };

  let report = match GraphStack::default().run_stacked_graph(&graph_data) {
    Ok(r) => r,
    Err(e) => {
      eprintln!("Graph error: {}", e);
      process::exit(1);
    }
  };

  print_summary(&report);

  if let Some(report_path) = report_path {
    if let Err(e) = report_io::save_report(&report_path, &report) {
      eprintln!("Error writing report {}: {}", report_path.display(), e);
      process::exit(1);
    }
    println!("  Report: {}", report_path.display());
  }

  let diagnostic_count = report.diagnostics().count();
  info!(all_ok = report.all_ok(), diagnostic_count, "graph run finished");
  if args.strict && (!report.all_ok() || diagnostic_count > 0) {
    process::exit(1);
  }
}
