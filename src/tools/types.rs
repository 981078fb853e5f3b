// Core types for the tool-calling protocol
//
// Definitions follow the JSON Schema shape expected by OpenAI-compatible
// function calling.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: ToolInputSchema,
}

/// JSON Schema for tool input parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub schema_type: String, // Usually "object"
    pub properties: Value,
    pub required: Vec<String>,
}

impl ToolInputSchema {
    /// Schema with one required parameter of the given JSON type
    pub fn single(name: &str, json_type: &str, description: &str) -> Self {
        let mut properties = serde_json::Map::new();
        properties.insert(
            name.to_string(),
            serde_json::json!({
                "type": json_type,
                "description": description
            }),
        );

        Self {
            schema_type: "object".to_string(),
            properties: Value::Object(properties),
            required: vec![name.to_string()],
        }
    }
}

/// Result of one tool dispatch, fed back to the model keyed by call id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    /// JSON-encoded payload
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(tool_call_id: impl Into<String>, payload: &Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: payload.to_string(),
            is_error: false,
        }
    }

    /// Recoverable failure surfaced to the model as `{"error": code, ...}`
    pub fn error(tool_call_id: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        let payload = serde_json::json!({
            "error": code,
            "message": message.into(),
        });
        Self {
            tool_call_id: tool_call_id.into(),
            content: payload.to_string(),
            is_error: true,
        }
    }

    /// Error code of a failed dispatch, if any
    pub fn error_code(&self) -> Option<String> {
        if !self.is_error {
            return None;
        }
        serde_json::from_str::<Value>(&self.content)
            .ok()
            .and_then(|v| v["error"].as_str().map(str::to_string))
    }
}
