// get_bugs_for_developer tool - lists the bugs assigned to a verified developer
//
// Only ids confirmed by an earlier verify_developer result in this dialogue
// are accepted, and once the session has resolved a developer no other id is.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::dataset::DeveloperId;
use crate::tools::registry::{SessionEffect, Tool, ToolContext, ToolError, ToolOutput};
use crate::tools::types::ToolInputSchema;

pub const GET_BUGS_FOR_DEVELOPER: &str = "get_bugs_for_developer";

pub struct GetBugsForDeveloperTool;

/// Accepts an integer or a numeric string; models send both
fn developer_id_arg(input: &Map<String, Value>) -> Result<DeveloperId, ToolError> {
    match input.get("developer_id") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| ToolError::InvalidArguments("'developer_id' must be an integer".to_string()))
}

#[async_trait]
impl Tool for GetBugsForDeveloperTool {
    fn name(&self) -> &str {
        GET_BUGS_FOR_DEVELOPER
    }

    fn description(&self) -> &str {
        "List the bugs assigned to a developer. Only use a developer_id returned by \
         verify_developer in this conversation."
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::single(
            "developer_id",
            "integer",
            "The developer_id returned by verify_developer",
        )
    }

    async fn execute(
        &self,
        input: &Map<String, Value>,
        context: &ToolContext<'_>,
    ) -> Result<ToolOutput, ToolError> {
        let developer_id = developer_id_arg(input)?;

        let established = context.session.established_developers();
        let Some((_, name)) = established.iter().find(|(id, _)| *id == developer_id) else {
            warn!("Refusing bug lookup for unverified developer {}", developer_id);
            return Err(ToolError::Refused {
                code: "developer_not_established",
                message: format!(
                    "Developer {} has not been verified in this conversation. Call {} first.",
                    developer_id,
                    super::verify_developer::VERIFY_DEVELOPER
                ),
            });
        };

        if let Some(current) = context.session.developer_id() {
            if current != developer_id {
                warn!(
                    "Refusing bug lookup for developer {} in a session for {}",
                    developer_id, current
                );
                return Err(ToolError::Refused {
                    code: "developer_mismatch",
                    message: "This conversation is already about a different developer."
                        .to_string(),
                });
            }
        }

        let bugs = context.dataset.get_bugs_for_developer(developer_id);
        debug!("Developer {} has {} assigned bug(s)", developer_id, bugs.len());

        let payload: Vec<Value> = bugs
            .iter()
            .map(|bug| {
                json!({
                    "bug_id": bug.id,
                    "description": bug.description,
                    "status": bug.status.as_str(),
                    "solved": bug.solved,
                })
            })
            .collect();

        Ok(
            ToolOutput::new(Value::Array(payload)).with_effect(SessionEffect::DeveloperResolved {
                developer_id,
                name: name.clone(),
            }),
        )
    }
}
