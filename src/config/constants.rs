// Project-wide constants
//
// Centralised here so limits have one source of truth.

/// User turns allowed per session
pub const DEFAULT_MAX_TURNS: usize = 20;

/// Model/tool round-trips allowed while resolving one user turn
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// Token cap for conversational replies
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Token cap for the final extraction pass
pub const DEFAULT_EXTRACTION_MAX_TOKENS: u32 = 300;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Attempts per gateway call (first try + at most one retry)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Directory under $HOME holding config.toml
pub const CONFIG_DIR_NAME: &str = ".bugscribe";
