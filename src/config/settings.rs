// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::constants::*;
use crate::providers::openrouter::DEFAULT_BASE_URL;
use crate::providers::retry::MAX_ATTEMPTS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API credential for the model gateway
    pub api_key: String,

    /// Model identifier (e.g. "openai/gpt-4o-mini")
    pub model: String,

    /// OpenAI-compatible endpoint root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory holding developers.json and bugs.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Where traces and structured outputs are written
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Attempts per gateway call, at most 2
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
}

/// Limits applied to every conversation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_extraction_max_tokens")]
    pub extraction_max_tokens: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            max_tokens: DEFAULT_MAX_TOKENS,
            extraction_max_tokens: DEFAULT_EXTRACTION_MAX_TOKENS,
        }
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: default_base_url(),
            data_dir: default_data_dir(),
            results_dir: default_results_dir(),
            session: SessionConfig::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("api_key must not be empty");
        }
        if self.model.trim().is_empty() {
            bail!("model must not be empty");
        }
        if self.session.max_turns == 0 {
            bail!("session.max_turns must be at least 1");
        }
        if self.session.max_tool_rounds == 0 {
            bail!("session.max_tool_rounds must be at least 1");
        }
        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS {
            bail!("max_attempts must be between 1 and {}", MAX_ATTEMPTS);
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_results_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RESULTS_DIR)
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}

fn default_max_tool_rounds() -> usize {
    DEFAULT_MAX_TOOL_ROUNDS
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_extraction_max_tokens() -> u32 {
    DEFAULT_EXTRACTION_MAX_TOKENS
}
