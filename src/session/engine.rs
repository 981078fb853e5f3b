// Conversation engine
//
// Drives one utterance at a time: append it, call the model, resolve any tool
// calls through the dispatcher, and repeat until the model answers in plain
// text. Structural limits are the user turn budget and the tool-round cap;
// everything else about the interview is left to the model.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::SessionConfig;
use crate::dataset::DatasetProvider;
use crate::errors::EngineError;
use crate::extraction::Extractor;
use crate::logging::TraceEvent;
use crate::output::ConversationOutput;
use crate::prompts;
use crate::providers::types::{CompletionRequest, Message};
use crate::providers::ModelGateway;
use crate::session::state::{ConversationSession, EndReason};
use crate::tools::{SessionEffect, ToolDispatcher};

/// What the caller shows after one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceReply {
    pub assistant_text: String,
    pub session_ended: bool,
}

pub struct ConversationEngine {
    gateway: Arc<dyn ModelGateway>,
    dispatcher: ToolDispatcher,
    extractor: Extractor,
    limits: SessionConfig,
}

impl ConversationEngine {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        dataset: Arc<dyn DatasetProvider>,
        limits: SessionConfig,
    ) -> Self {
        let extractor = Extractor::new(
            Arc::clone(&gateway),
            Arc::clone(&dataset),
            limits.extraction_max_tokens,
        );
        Self {
            gateway,
            dispatcher: ToolDispatcher::new(dataset),
            extractor,
            limits,
        }
    }

    /// New session with the greeting already in the transcript
    pub fn start(&self) -> ConversationSession {
        let mut session = ConversationSession::new();
        session.push(Message::assistant(prompts::GREETING));
        info!(
            "Started session {} ({} / {})",
            session.id(),
            self.gateway.name(),
            self.gateway.model()
        );
        session
    }

    /// Process one developer utterance
    ///
    /// Gateway errors leave the session open with the turn consumed. A model
    /// that keeps calling tools past the round cap ends the session.
    #[instrument(skip(self, session, text), fields(session = %session.id()))]
    pub async fn submit_user_utterance(
        &self,
        session: &mut ConversationSession,
        text: &str,
    ) -> Result<UtteranceReply, EngineError> {
        if session.is_ended() {
            return Err(EngineError::SessionClosed);
        }

        let text = text.trim();
        if text.is_empty() {
            debug!("Empty utterance, asking for clarification");
            return Ok(UtteranceReply {
                assistant_text: prompts::CLARIFICATION.to_string(),
                session_ended: false,
            });
        }

        session.push(Message::user(text));
        let turn = session.begin_turn();
        info!("Turn {}/{}", turn, self.limits.max_turns);

        let model_text = match self.resolve_turn(session).await {
            Ok(text) => text,
            Err(e @ EngineError::ToolLoopExceeded { .. }) => {
                warn!("Aborting session: {}", e);
                session.end(EndReason::Aborted {
                    reason: e.to_string(),
                });
                return Err(e);
            }
            Err(e) => {
                warn!("Turn {} failed: {}", turn, e);
                session.take_closing_request();
                if turn >= self.limits.max_turns {
                    session.end(EndReason::TurnBudget);
                }
                return Err(e);
            }
        };

        if let Some(reason) = session.take_closing_request() {
            info!("Model closed the conversation: {}", reason);
            let assistant_text = if model_text.is_empty() {
                session.push(Message::assistant(prompts::FAREWELL));
                prompts::FAREWELL.to_string()
            } else {
                model_text
            };
            session.end(EndReason::ModelClosed { reason });
            return Ok(UtteranceReply {
                assistant_text,
                session_ended: true,
            });
        }

        if turn >= self.limits.max_turns {
            info!("Turn budget of {} reached", self.limits.max_turns);
            session.push(Message::assistant(prompts::CLOSING_REMARK));
            session.end(EndReason::TurnBudget);
            let assistant_text = if model_text.is_empty() {
                prompts::CLOSING_REMARK.to_string()
            } else {
                format!("{}\n\n{}", model_text, prompts::CLOSING_REMARK)
            };
            return Ok(UtteranceReply {
                assistant_text,
                session_ended: true,
            });
        }

        let assistant_text = if model_text.is_empty() {
            session.push(Message::assistant(prompts::FALLBACK_REPLY));
            prompts::FALLBACK_REPLY.to_string()
        } else {
            model_text
        };

        Ok(UtteranceReply {
            assistant_text,
            session_ended: false,
        })
    }

    /// Run the extraction and validation pass; see [`Extractor::finalize`]
    pub async fn finalize(&self, session: &mut ConversationSession) -> ConversationOutput {
        self.extractor.finalize(session).await
    }

    /// Call the model until it answers without tool calls, returning its
    /// (trimmed, possibly empty) text. That text is already in the transcript.
    async fn resolve_turn(&self, session: &mut ConversationSession) -> Result<String, EngineError> {
        let tools = self.dispatcher.definitions();
        let mut rounds = 0;

        loop {
            let request = CompletionRequest::new(session.transcript().to_vec())
                .with_system(prompts::conversation_system_prompt())
                .with_tools(tools.clone())
                .with_max_tokens(self.limits.max_tokens);

            let reply = self.gateway.complete(&request).await?;

            if !reply.has_tool_calls() {
                let text = reply.text.unwrap_or_default().trim().to_string();
                if !text.is_empty() {
                    session.push(Message::assistant(text.clone()));
                }
                return Ok(text);
            }

            if rounds >= self.limits.max_tool_rounds {
                return Err(EngineError::ToolLoopExceeded { rounds });
            }
            rounds += 1;
            debug!("Tool round {}: {} call(s)", rounds, reply.tool_calls.len());

            session.push(Message::assistant_tool_calls(
                reply.text.clone(),
                reply.tool_calls.clone(),
            ));

            for call in &reply.tool_calls {
                session.record(TraceEvent::ToolCall {
                    tool: call.name.clone(),
                    input: Value::Object(call.arguments.clone()),
                });

                let dispatch = self.dispatcher.dispatch(session, call).await;

                session.record(TraceEvent::ToolResult {
                    tool: call.name.clone(),
                    is_error: dispatch.result.is_error,
                    output: dispatch.result.content.clone(),
                });
                session.push(Message::tool_result(&dispatch.result));

                match dispatch.effect {
                    Some(SessionEffect::DeveloperResolved { developer_id, name }) => {
                        session.resolve_developer(developer_id, name);
                    }
                    Some(SessionEffect::CloseRequested { reason }) => {
                        session.request_closing(reason);
                    }
                    None => {}
                }
            }
        }
    }
}
