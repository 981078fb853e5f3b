// end_conversation tool - the model's explicit signal that the dialogue is over

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::tools::registry::{SessionEffect, Tool, ToolContext, ToolError, ToolOutput};
use crate::tools::types::ToolInputSchema;

pub const END_CONVERSATION: &str = "end_conversation";

const DEFAULT_REASON: &str = "developer has nothing further to report";

pub struct EndConversationTool;

#[async_trait]
impl Tool for EndConversationTool {
    fn name(&self) -> &str {
        END_CONVERSATION
    }

    fn description(&self) -> &str {
        "End the conversation. Call this once the developer has confirmed whether the bug \
         is solved, or has nothing further to report. Then reply with a short goodbye."
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::single("reason", "string", "Why the conversation is ending")
    }

    async fn execute(
        &self,
        input: &Map<String, Value>,
        _context: &ToolContext<'_>,
    ) -> Result<ToolOutput, ToolError> {
        let reason = input
            .get("reason")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REASON)
            .to_string();

        Ok(ToolOutput::new(json!({"success": true, "ending": true}))
            .with_effect(SessionEffect::CloseRequested { reason }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::sample_dataset;
    use crate::session::ConversationSession;

    #[tokio::test]
    async fn test_requests_close_with_default_reason() {
        let dataset = sample_dataset();
        let session = ConversationSession::new();
        let context = ToolContext {
            dataset: &dataset,
            session: &session,
        };

        let out = EndConversationTool.execute(&Map::new(), &context).await.unwrap();
        assert_eq!(
            out.effect,
            Some(SessionEffect::CloseRequested {
                reason: DEFAULT_REASON.to_string()
            })
        );
    }
}
