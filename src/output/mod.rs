// Structured session output
//
// `ConversationOutput` is the only externally observable result of a
// session. A report is present only on success.

pub mod writer;

pub use writer::ArtifactWriter;

use serde::{Deserialize, Serialize};

use crate::dataset::BugId;

/// Validated progress report for one bug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugReport {
    pub bug_id: BugId,
    /// "<YYYY-MM-DD HH:MM:SS> - <description>"
    pub progress_note: String,
    pub solved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationOutput {
    pub success: bool,
    pub report: Option<BugReport>,
}

impl ConversationOutput {
    pub fn success(report: BugReport) -> Self {
        Self {
            success: true,
            report: Some(report),
        }
    }

    pub fn failure() -> Self {
        Self {
            success: false,
            report: None,
        }
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
