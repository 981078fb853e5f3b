// verify_developer tool - resolves a spoken name to a developer record
//
// Exact matches are confirmed outright. A single partial match is returned
// for the model to confirm with the developer; anything else comes back with
// guidance so the model can ask again.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::tools::registry::{Tool, ToolContext, ToolError, ToolOutput};
use crate::tools::types::ToolInputSchema;

pub const VERIFY_DEVELOPER: &str = "verify_developer";

pub struct VerifyDeveloperTool;

#[async_trait]
impl Tool for VerifyDeveloperTool {
    fn name(&self) -> &str {
        VERIFY_DEVELOPER
    }

    fn description(&self) -> &str {
        "Verify that a developer exists by name. Call this as soon as the developer \
         tells you who they are, before looking up any bugs."
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::single("name", "string", "The developer's name as they gave it")
    }

    async fn execute(
        &self,
        input: &Map<String, Value>,
        context: &ToolContext<'_>,
    ) -> Result<ToolOutput, ToolError> {
        let name = input
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'name'".to_string()))?;

        if let Some(developer) = context.dataset.find_developer_by_name(name) {
            debug!("Exact developer match for '{}': {}", name, developer.id);
            return Ok(ToolOutput::new(json!({
                "success": true,
                "type": "exact_match",
                "developer_id": developer.id,
                "name": developer.name,
            })));
        }

        let similar = context.dataset.find_similar_developers(name);
        let payload = match similar.as_slice() {
            [only] => json!({
                "success": true,
                "type": "partial_match_needs_confirmation",
                "developer_id": only.id,
                "name": only.name,
                "message": format!(
                    "Found '{}'. Ask the developer to confirm this is them.",
                    only.name
                ),
            }),
            [] => json!({
                "success": false,
                "message": format!("No developer named '{}'.", name),
                "valid_developers": context.dataset.list_developer_names(),
            }),
            several => json!({
                "success": false,
                "message": format!("Several developers match '{}'. Ask for the full name.", name),
                "potential_matches": several.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            }),
        };

        Ok(ToolOutput::new(payload))
    }
}
