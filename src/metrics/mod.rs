// Metrics over saved sessions
//
// Reads what `ArtifactWriter` persisted and summarizes it.

mod calculator;
mod types;

pub use calculator::calculate;
pub use types::{MetricsReport, RelevanceStats, SafetyStats, TurnStats};

pub const REPORT_FILE: &str = "METRICS_REPORT.txt";

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::ArtifactWriter;

/// Load every saved trace and output under `results_dir` and summarize them
pub fn from_results_dir(results_dir: &Path, turn_budget: usize) -> Result<MetricsReport> {
    let writer = ArtifactWriter::new(results_dir)?;
    let traces = writer.load_traces()?;
    let outputs = writer.load_outputs()?;
    Ok(calculate(&traces, &outputs, turn_budget))
}

/// Write the rendered report to `<results_dir>/METRICS_REPORT.txt`
pub fn save_report(results_dir: &Path, report: &MetricsReport) -> Result<PathBuf> {
    let path = results_dir.join(REPORT_FILE);
    fs::write(&path, report.to_string())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
