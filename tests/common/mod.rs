// Shared fixtures for integration tests
#![allow(dead_code)]

use serde_json::Value;
use std::sync::Arc;

use bugscribe::config::SessionConfig;
use bugscribe::dataset::{Bug, BugStatus, Developer, JsonDataset};
use bugscribe::providers::{ModelTurn, ScriptedGateway, ToolCall};
use bugscribe::{ConversationEngine, ConversationSession, UtteranceReply};

fn bug(id: i64, description: &str, dev: i64, status: BugStatus) -> Bug {
    Bug {
        id,
        description: description.to_string(),
        assigned_developer_id: dev,
        status,
        progress_notes: Vec::new(),
        solved: false,
    }
}

fn developer(id: i64, name: &str) -> Developer {
    Developer {
        id,
        name: name.to_string(),
    }
}

/// Alice (1) owns bug 1, Bob (2) owns bug 2, Carol (3) owns bug 7,
/// Dave (4) owns nothing
pub fn dataset() -> Arc<JsonDataset> {
    let developers = vec![
        developer(1, "Alice Johnson"),
        developer(2, "Bob Smith"),
        developer(3, "Carol White"),
        developer(4, "Dave Brown"),
    ];
    let bugs = vec![
        bug(1, "Login page crashes on submit", 1, BugStatus::Open),
        bug(2, "Payment processing fails", 2, BugStatus::InProgress),
        bug(7, "Database connection leak", 3, BugStatus::Testing),
    ];
    Arc::new(JsonDataset::from_records(developers, bugs).expect("fixture ids are unique"))
}

pub fn say(text: &str) -> ModelTurn {
    ModelTurn::text(text)
}

pub fn call(id: &str, name: &str, args: Value) -> ModelTurn {
    ModelTurn::with_tool_calls(vec![ToolCall::new(id, name, args)])
}

/// Extraction reply carrying `value` as JSON text
pub fn extraction(value: Value) -> ModelTurn {
    ModelTurn::text(value.to_string())
}

pub fn engine(script: Vec<ModelTurn>) -> (ConversationEngine, Arc<ScriptedGateway>) {
    engine_with(script, SessionConfig::default())
}

pub fn engine_with(
    script: Vec<ModelTurn>,
    limits: SessionConfig,
) -> (ConversationEngine, Arc<ScriptedGateway>) {
    let gateway = Arc::new(ScriptedGateway::from_turns(script));
    let engine = ConversationEngine::new(gateway.clone(), dataset(), limits);
    (engine, gateway)
}

/// Submit each utterance in order, panicking on engine errors
pub async fn converse(
    engine: &ConversationEngine,
    session: &mut ConversationSession,
    utterances: &[&str],
) -> Vec<UtteranceReply> {
    let mut replies = Vec::new();
    for text in utterances {
        let reply = engine
            .submit_user_utterance(session, text)
            .await
            .unwrap_or_else(|e| panic!("utterance {text:?} failed: {e}"));
        replies.push(reply);
    }
    replies
}
