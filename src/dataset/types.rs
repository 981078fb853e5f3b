// Developer and bug records as stored in the dataset files

use serde::{Deserialize, Deserializer, Serialize};

pub type DeveloperId = i64;
pub type BugId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Developer {
    #[serde(rename = "developer_id")]
    pub id: DeveloperId,
    pub name: String,
}

/// Workflow status of a bug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BugStatus {
    Open,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    Testing,
    Resolved,
    Closed,
}

impl BugStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BugStatus::Open => "Open",
            BugStatus::InProgress => "In Progress",
            BugStatus::Testing => "Testing",
            BugStatus::Resolved => "Resolved",
            BugStatus::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bug {
    #[serde(rename = "bug_id")]
    pub id: BugId,
    pub description: String,
    #[serde(rename = "assigned_dev")]
    pub assigned_developer_id: DeveloperId,
    pub status: BugStatus,
    /// One timestamped note per entry, oldest first
    #[serde(default, deserialize_with = "deserialize_notes")]
    pub progress_notes: Vec<String>,
    #[serde(default)]
    pub solved: bool,
}

impl Bug {
    pub fn is_assigned_to(&self, developer_id: DeveloperId) -> bool {
        self.assigned_developer_id == developer_id
    }
}

/// Accepts the newline-joined string the tracker writes as well as a list.
fn deserialize_notes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Notes {
        Joined(String),
        List(Vec<String>),
        Missing(()),
    }

    let notes = match Notes::deserialize(deserializer)? {
        Notes::Joined(text) => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Notes::List(list) => list,
        Notes::Missing(()) => Vec::new(),
    };
    Ok(notes)
}
