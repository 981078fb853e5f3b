// Per-session event trace
//
// Records what happened in a conversation (messages, tool traffic, budget and
// finalize events) for later inspection and metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::providers::types::Role;

/// One thing that happened in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    Message {
        role: Role,
        content: String,
    },
    ToolCall {
        tool: String,
        input: Value,
    },
    ToolResult {
        tool: String,
        is_error: bool,
        output: String,
    },
    TurnBudgetReached {
        turns: usize,
    },
    SessionAborted {
        reason: String,
    },
    Finalized {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rejection: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: TraceEvent,
}

/// Ordered trace of a single session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTrace {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub entries: Vec<TraceEntry>,
}

impl SessionTrace {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, event: TraceEvent) {
        self.entries.push(TraceEntry {
            timestamp: Utc::now(),
            event,
        });
    }

    pub fn events(&self) -> impl Iterator<Item = &TraceEvent> {
        self.entries.iter().map(|entry| &entry.event)
    }

    /// Number of user utterances recorded
    pub fn user_turns(&self) -> usize {
        self.events()
            .filter(|e| matches!(e, TraceEvent::Message { role: Role::User, .. }))
            .count()
    }

    pub fn tool_calls(&self) -> usize {
        self.events()
            .filter(|e| matches!(e, TraceEvent::ToolCall { .. }))
            .count()
    }

    /// Tool dispatches that came back as errors (refusals, unknown tools)
    pub fn refused_tool_calls(&self) -> usize {
        self.events()
            .filter(|e| matches!(e, TraceEvent::ToolResult { is_error: true, .. }))
            .count()
    }
}
