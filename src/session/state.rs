// Conversation session state
//
// One session owns one transcript; nothing here is shared between sessions.
// Only the conversation engine and the finalize pass mutate it.

use serde_json::Value;
use uuid::Uuid;

use crate::dataset::{BugId, DeveloperId};
use crate::logging::{SessionTrace, TraceEvent};
use crate::output::ConversationOutput;
use crate::providers::types::{Message, Role};
use crate::tools::implementations::verify_developer::VERIFY_DEVELOPER;

/// Why a session stopped accepting utterances
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The model called `end_conversation`
    ModelClosed { reason: String },
    /// The user turn budget was used up
    TurnBudget,
    /// The caller finished the session (quit, or finalize on an open session)
    CallerEnded,
    /// A gateway fault ended the session unsuccessfully
    Aborted { reason: String },
}

#[derive(Debug)]
pub struct ConversationSession {
    id: Uuid,
    transcript: Vec<Message>,
    turn_count: usize,
    developer_id: Option<DeveloperId>,
    developer_name: Option<String>,
    selected_bug_id: Option<BugId>,
    ended: bool,
    end_reason: Option<EndReason>,
    closing_requested: Option<String>,
    output: Option<ConversationOutput>,
    trace: SessionTrace,
}

impl ConversationSession {
    pub(crate) fn new() -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            transcript: Vec::new(),
            turn_count: 0,
            developer_id: None,
            developer_name: None,
            selected_bug_id: None,
            ended: false,
            end_reason: None,
            closing_requested: None,
            output: None,
            trace: SessionTrace::new(id),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    pub fn developer_id(&self) -> Option<DeveloperId> {
        self.developer_id
    }

    pub fn developer_name(&self) -> Option<&str> {
        self.developer_name.as_deref()
    }

    pub fn selected_bug_id(&self) -> Option<BugId> {
        self.selected_bug_id
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn end_reason(&self) -> Option<&EndReason> {
        self.end_reason.as_ref()
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.end_reason, Some(EndReason::Aborted { .. }))
    }

    pub fn trace(&self) -> &SessionTrace {
        &self.trace
    }

    /// Output cached by a previous finalize
    pub fn output(&self) -> Option<&ConversationOutput> {
        self.output.as_ref()
    }

    /// Developers confirmed by a successful `verify_developer` result earlier
    /// in this transcript, in the order they were verified
    pub fn established_developers(&self) -> Vec<(DeveloperId, String)> {
        let mut established = Vec::new();

        for msg in &self.transcript {
            for call in msg.tool_calls.iter().filter(|c| c.name == VERIFY_DEVELOPER) {
                let result = self.transcript.iter().find(|m| {
                    m.role == Role::Tool && m.tool_call_id.as_deref() == Some(call.id.as_str())
                });
                let Some(payload) =
                    result.and_then(|m| serde_json::from_str::<Value>(m.text()).ok())
                else {
                    continue;
                };
                if payload["success"] != Value::Bool(true) {
                    continue;
                }
                if let (Some(id), Some(name)) =
                    (payload["developer_id"].as_i64(), payload["name"].as_str())
                {
                    if !established.iter().any(|(known, _)| *known == id) {
                        established.push((id, name.to_string()));
                    }
                }
            }
        }

        established
    }

    /// Text of everything the developer typed, in order
    pub fn user_utterances(&self) -> impl Iterator<Item = &str> {
        self.transcript
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.text())
    }

    // ── Mutation (engine and finalize only) ─────────────────────────────────

    pub(crate) fn push(&mut self, message: Message) {
        if message.role != Role::Tool && !message.text().is_empty() {
            self.trace.record(TraceEvent::Message {
                role: message.role,
                content: message.text().to_string(),
            });
        }
        self.transcript.push(message);
    }

    pub(crate) fn begin_turn(&mut self) -> usize {
        self.turn_count += 1;
        self.turn_count
    }

    pub(crate) fn resolve_developer(&mut self, developer_id: DeveloperId, name: String) {
        if self.developer_id.is_none() {
            self.developer_id = Some(developer_id);
            self.developer_name = Some(name);
        }
    }

    pub(crate) fn set_selected_bug(&mut self, bug_id: Option<BugId>) {
        self.selected_bug_id = bug_id;
    }

    pub(crate) fn request_closing(&mut self, reason: String) {
        self.closing_requested = Some(reason);
    }

    pub(crate) fn take_closing_request(&mut self) -> Option<String> {
        self.closing_requested.take()
    }

    pub(crate) fn end(&mut self, reason: EndReason) {
        if self.ended {
            return;
        }
        match &reason {
            EndReason::TurnBudget => self.trace.record(TraceEvent::TurnBudgetReached {
                turns: self.turn_count,
            }),
            EndReason::Aborted { reason } => self.trace.record(TraceEvent::SessionAborted {
                reason: reason.clone(),
            }),
            _ => {}
        }
        self.ended = true;
        self.end_reason = Some(reason);
    }

    pub(crate) fn record(&mut self, event: TraceEvent) {
        self.trace.record(event);
    }

    pub(crate) fn store_output(&mut self, output: ConversationOutput) {
        self.output = Some(output);
    }
}
