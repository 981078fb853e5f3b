// Persists session traces and structured outputs as numbered JSON files
//
//   <results>/traces/trace_<N>.json
//   <results>/outputs/output_<N>.json

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::ConversationOutput;
use crate::logging::SessionTrace;

const TRACE_PREFIX: &str = "trace_";
const OUTPUT_PREFIX: &str = "output_";

pub struct ArtifactWriter {
    traces_dir: PathBuf,
    outputs_dir: PathBuf,
}

/// Paths written for one session
#[derive(Debug, Clone)]
pub struct SavedArtifacts {
    pub trace_path: PathBuf,
    pub output_path: PathBuf,
}

impl ArtifactWriter {
    pub fn new(results_dir: &Path) -> Result<Self> {
        let traces_dir = results_dir.join("traces");
        let outputs_dir = results_dir.join("outputs");
        for dir in [&traces_dir, &outputs_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create results directory: {}", dir.display()))?;
        }
        Ok(Self {
            traces_dir,
            outputs_dir,
        })
    }

    /// Write both artifacts under the same next free index
    pub fn save(
        &self,
        trace: &SessionTrace,
        output: &ConversationOutput,
    ) -> Result<SavedArtifacts> {
        let index = next_index(&self.traces_dir, TRACE_PREFIX)?
            .max(next_index(&self.outputs_dir, OUTPUT_PREFIX)?);

        let trace_path = self.traces_dir.join(format!("{}{}.json", TRACE_PREFIX, index));
        let output_path = self.outputs_dir.join(format!("{}{}.json", OUTPUT_PREFIX, index));

        write_json(&trace_path, trace)?;
        write_json(&output_path, output)?;

        debug!(
            "Saved session artifacts {} and {}",
            trace_path.display(),
            output_path.display()
        );

        Ok(SavedArtifacts {
            trace_path,
            output_path,
        })
    }

    pub fn load_traces(&self) -> Result<Vec<SessionTrace>> {
        load_numbered(&self.traces_dir, TRACE_PREFIX)
    }

    pub fn load_outputs(&self) -> Result<Vec<ConversationOutput>> {
        load_numbered(&self.outputs_dir, OUTPUT_PREFIX)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize artifact")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Numbered files `<prefix><N>.json` in `dir`, sorted by N
fn numbered_files(dir: &Path, prefix: &str) -> Result<Vec<(u64, PathBuf)>> {
    let mut files = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in {}", dir.display()))?
            .path();
        let index = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.strip_prefix(prefix))
            .and_then(|n| n.parse::<u64>().ok());
        if let (Some(index), Some("json")) = (index, path.extension().and_then(|e| e.to_str())) {
            files.push((index, path));
        }
    }

    files.sort_by_key(|(index, _)| *index);
    Ok(files)
}

fn next_index(dir: &Path, prefix: &str) -> Result<u64> {
    Ok(numbered_files(dir, prefix)?
        .last()
        .map(|(index, _)| index + 1)
        .unwrap_or(1))
}

fn load_numbered<T: DeserializeOwned>(dir: &Path, prefix: &str) -> Result<Vec<T>> {
    numbered_files(dir, prefix)?
        .into_iter()
        .map(|(_, path)| {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        })
        .collect()
}
