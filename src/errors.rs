// Typed error taxonomy surfaced to callers of the Session API
//
// Input faults never reach here (they are answered with a clarification),
// tool faults are fed back to the model, and validation faults downgrade the
// output to `success: false`. What remains is below.

use thiserror::Error;

/// Failure talking to the language-model service.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("model gateway request timed out")]
    Timeout,

    #[error("model gateway transport error: {0}")]
    Transport(String),

    #[error("model gateway returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed model response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Whether a bounded retry may help. All gateway calls are read-only,
    /// so repeating one is idempotent.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::Transport(_) => true,
            GatewayError::Http { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::Malformed(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Failure of one `submit_user_utterance` step.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session is closed; start a new session to report again")]
    SessionClosed,

    #[error("model kept requesting tools for {rounds} rounds without replying")]
    ToolLoopExceeded { rounds: usize },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Failure loading the developer/bug dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: i64 },
}
