// Extraction & validation pass
//
// One model call, without tools, reads the whole transcript and proposes a
// report. The proposal is then checked against the session and dataset; any
// failure along the way yields `{success: false, report: null}`.

pub mod parse;
pub mod validate;

pub use parse::{parse_extraction, RawExtraction};
pub use validate::{stamp_progress_note, validate, Rejection, ValidatedReport};

use chrono::Local;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::dataset::DatasetProvider;
use crate::logging::TraceEvent;
use crate::output::{BugReport, ConversationOutput};
use crate::prompts;
use crate::providers::types::{CompletionRequest, Message, Role};
use crate::providers::ModelGateway;
use crate::session::{ConversationSession, EndReason};

pub struct Extractor {
    gateway: Arc<dyn ModelGateway>,
    dataset: Arc<dyn DatasetProvider>,
    max_tokens: u32,
}

impl Extractor {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        dataset: Arc<dyn DatasetProvider>,
        max_tokens: u32,
    ) -> Self {
        Self {
            gateway,
            dataset,
            max_tokens,
        }
    }

    /// Produce the session's output, ending the session if it is still open
    ///
    /// The first result is cached on the session, so later calls return it
    /// unchanged without another model call.
    #[instrument(skip(self, session), fields(session = %session.id()))]
    pub async fn finalize(&self, session: &mut ConversationSession) -> ConversationOutput {
        if let Some(output) = session.output() {
            return output.clone();
        }
        if !session.is_ended() {
            session.end(EndReason::CallerEnded);
        }

        let (output, rejection) = match self.extract(session).await {
            Ok(report) => {
                session.set_selected_bug(Some(report.bug_id));
                info!("Report accepted for bug {}", report.bug_id);
                let output = ConversationOutput::success(BugReport {
                    bug_id: report.bug_id,
                    progress_note: stamp_progress_note(Local::now(), &report.description),
                    solved: report.solved,
                });
                (output, None)
            }
            Err(rejection) => {
                warn!("No report: {}", rejection);
                (ConversationOutput::failure(), Some(rejection.to_string()))
            }
        };

        session.record(TraceEvent::Finalized {
            success: output.success,
            rejection,
        });
        session.store_output(output.clone());
        output
    }

    async fn extract(&self, session: &ConversationSession) -> Result<ValidatedReport, Rejection> {
        if session.is_aborted() {
            return Err(Rejection::SessionAborted);
        }
        if session.turn_count() == 0 {
            return Err(Rejection::NoDialogue);
        }

        let request = CompletionRequest::new(vec![Message::user(prompts::extraction_prompt(
            &render_transcript(session.transcript()),
        ))])
        .with_system(prompts::extraction_system_prompt())
        .with_max_tokens(self.max_tokens)
        .with_temperature(0.0);

        let reply = self
            .gateway
            .complete(&request)
            .await
            .map_err(|e| Rejection::Gateway(e.to_string()))?;

        let raw = parse_extraction(reply.text.as_deref().unwrap_or_default())
            .map_err(Rejection::Malformed)?;

        validate(&raw, session, self.dataset.as_ref())
    }
}

/// Plain-text transcript for the extraction prompt
pub fn render_transcript(transcript: &[Message]) -> String {
    let mut lines = Vec::new();

    for msg in transcript {
        match msg.role {
            Role::User => lines.push(format!("Developer: {}", msg.text())),
            Role::Assistant => {
                if !msg.text().is_empty() {
                    lines.push(format!("Assistant: {}", msg.text()));
                }
                for call in &msg.tool_calls {
                    lines.push(format!(
                        "Assistant called {}({})",
                        call.name,
                        serde_json::Value::Object(call.arguments.clone())
                    ));
                }
            }
            Role::Tool => lines.push(format!("Tool result: {}", msg.text())),
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::sample_dataset;
    use crate::errors::GatewayError;
    use crate::providers::types::{ModelTurn, ToolCall};
    use crate::providers::ScriptedGateway;
    use serde_json::json;

    fn extractor(
        script: Vec<Result<ModelTurn, GatewayError>>,
    ) -> (Extractor, Arc<ScriptedGateway>) {
        let gateway = Arc::new(ScriptedGateway::new(script));
        (
            Extractor::new(gateway.clone(), Arc::new(sample_dataset()), 300),
            gateway,
        )
    }

    fn alice_session() -> ConversationSession {
        let mut session = ConversationSession::new();
        session.push(Message::user("I'm Alice Johnson"));
        session.begin_turn();
        session.push(Message::user("I fixed the form validation that crashed login"));
        session.begin_turn();
        session.resolve_developer(1, "Alice Johnson".to_string());
        session
    }

    #[tokio::test]
    async fn test_successful_finalize_stamps_note_and_caches() {
        let (extractor, gateway) = extractor(vec![Ok(ModelTurn::text(
            json!({
                "success": true,
                "developer_id": 1,
                "bug_id": 1,
                "progress_description": "Fixed the form validation that crashed login",
                "solved": true,
                "reason": "complete"
            })
            .to_string(),
        ))]);
        let mut session = alice_session();

        let output = extractor.finalize(&mut session).await;
        assert!(output.success);
        let report = output.report.clone().unwrap();
        assert_eq!(report.bug_id, 1);
        assert!(report.solved);
        assert!(report
            .progress_note
            .ends_with(" - Fixed the form validation that crashed login"));
        assert_eq!(session.selected_bug_id(), Some(1));
        assert_eq!(session.end_reason(), Some(&EndReason::CallerEnded));

        let again = extractor.finalize(&mut session).await;
        assert_eq!(again, output);
        assert_eq!(gateway.call_count(), 1);

        let request = &gateway.requests()[0];
        assert!(request.tools.is_empty());
        assert_eq!(request.max_tokens, 300);
    }

    #[tokio::test]
    async fn test_gateway_failure_fails_closed() {
        let (extractor, _) = extractor(vec![Err(GatewayError::Timeout)]);
        let mut session = alice_session();
        assert_eq!(extractor.finalize(&mut session).await, ConversationOutput::failure());
    }

    #[tokio::test]
    async fn test_malformed_reply_fails_closed() {
        let (extractor, _) = extractor(vec![Ok(ModelTurn::text("Sure! The bug was fixed."))]);
        let mut session = alice_session();
        assert_eq!(extractor.finalize(&mut session).await, ConversationOutput::failure());
    }

    #[tokio::test]
    async fn test_no_model_call_without_dialogue_or_after_abort() {
        let (extractor, gateway) = extractor(vec![]);

        let mut empty = ConversationSession::new();
        assert!(!extractor.finalize(&mut empty).await.success);

        let mut aborted = alice_session();
        aborted.end(EndReason::Aborted {
            reason: "tool loop".to_string(),
        });
        assert!(!extractor.finalize(&mut aborted).await.success);

        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_render_transcript_includes_tool_traffic() {
        let call = ToolCall::new("c1", "verify_developer", json!({"name": "Alice"}));
        let transcript = vec![
            Message::assistant("What's your name?"),
            Message::user("Alice"),
            Message::assistant_tool_calls(None, vec![call]),
            Message::tool_result(&crate::tools::ToolResult::success(
                "c1",
                &json!({"success": true}),
            )),
        ];
        let rendered = render_transcript(&transcript);
        assert_eq!(
            rendered,
            "Assistant: What's your name?\n\
             Developer: Alice\n\
             Assistant called verify_developer({\"name\":\"Alice\"})\n\
             Tool result: {\"success\":true}"
        );
    }
}
