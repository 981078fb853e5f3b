// OpenRouter gateway (OpenAI-compatible chat completions)
//
// Works against any endpoint speaking the OpenAI chat-completions format;
// OpenRouter is the default base URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::with_retry;
use super::types::{CompletionRequest, Message, ModelTurn, Role, ToolCall};
use super::ModelGateway;
use crate::config::Config;
use crate::errors::GatewayError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Clone)]
pub struct OpenRouterGateway {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_attempts: u32,
}

impl OpenRouterGateway {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_attempts,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        Self::new(
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            config.max_attempts,
        )
    }

    /// Convert a CompletionRequest to the OpenAI wire format
    fn to_wire_request(&self, request: &CompletionRequest) -> WireRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = &request.system {
            messages.push(WireMessage::Regular {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        for msg in &request.messages {
            messages.push(to_wire_message(msg));
        }

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|tool| {
                        let parameters = match serde_json::to_value(&tool.input_schema) {
                            Ok(value) => value,
                            Err(e) => {
                                tracing::warn!(
                                    "Failed to convert tool schema for '{}': {}",
                                    tool.name,
                                    e
                                );
                                serde_json::json!({})
                            }
                        };
                        WireTool {
                            tool_type: "function".to_string(),
                            function: WireFunction {
                                name: tool.name.clone(),
                                description: tool.description.clone(),
                                parameters,
                            },
                        }
                    })
                    .collect(),
            )
        };

        WireRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
            tools,
        }
    }

    /// Convert the first choice of a wire response into a ModelTurn
    fn from_wire_response(&self, response: WireResponse) -> Result<ModelTurn, GatewayError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Malformed("response contained no choices".to_string()))?;

        let text = choice.message.content.filter(|t| !t.trim().is_empty());

        let mut tool_calls = Vec::new();
        for call in choice.message.tool_calls.unwrap_or_default() {
            if call.tool_type != "function" {
                continue;
            }
            // Unparseable arguments reach the dispatcher as an empty map,
            // which answers with `invalid_arguments`.
            let arguments = serde_json::from_str(&call.function.arguments).unwrap_or_else(|e| {
                tracing::warn!(
                    "Tool call '{}' had unparseable arguments: {}",
                    call.function.name,
                    e
                );
                serde_json::json!({})
            });
            tool_calls.push(ToolCall::new(call.id, call.function.name, arguments));
        }

        Ok(ModelTurn { text, tool_calls })
    }

    /// Send a single request (no retry)
    async fn complete_once(&self, request: &CompletionRequest) -> Result<ModelTurn, GatewayError> {
        let wire_request = self.to_wire_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!("Sending request to model gateway: {:?}", wire_request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&wire_request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let wire_response: WireResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(format!("failed to parse response: {}", e)))?;

        tracing::debug!("Received response: {:?}", wire_response);

        self.from_wire_response(wire_response)
    }
}

#[async_trait]
impl ModelGateway for OpenRouterGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<ModelTurn, GatewayError> {
        with_retry(self.max_attempts, || self.complete_once(request)).await
    }

    fn name(&self) -> &str {
        "openrouter"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn to_wire_message(msg: &Message) -> WireMessage {
    match msg.role {
        Role::Assistant if !msg.tool_calls.is_empty() => {
            let tool_calls = msg
                .tool_calls
                .iter()
                .map(|call| WireRequestToolCall {
                    id: call.id.clone(),
                    tool_type: "function".to_string(),
                    function: WireRequestFunction {
                        name: call.name.clone(),
                        arguments: serde_json::Value::Object(call.arguments.clone()).to_string(),
                    },
                })
                .collect();
            WireMessage::Assistant {
                role: "assistant".to_string(),
                content: msg.content.clone(),
                tool_calls: Some(tool_calls),
            }
        }
        Role::Tool => WireMessage::Tool {
            role: "tool".to_string(),
            content: if msg.text().trim().is_empty() {
                "(no output)".to_string()
            } else {
                msg.text().to_string()
            },
            tool_call_id: msg.tool_call_id.clone().unwrap_or_default(),
        },
        Role::User | Role::Assistant => WireMessage::Regular {
            role: msg.role.as_str().to_string(),
            content: msg.text().to_string(),
        },
    }
}

// Wire types

#[derive(Debug, Clone, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

/// Request-side message; variants ordered most-specific first
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum WireMessage {
    Tool {
        role: String,
        content: String,
        tool_call_id: String,
    },
    Assistant {
        role: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<WireRequestToolCall>>,
    },
    Regular {
        role: String,
        content: String,
    },
}

#[derive(Debug, Clone, Serialize)]
struct WireRequestToolCall {
    id: String,
    #[serde(rename = "type")]
    tool_type: String,
    function: WireRequestFunction,
}

#[derive(Debug, Clone, Serialize)]
struct WireRequestFunction {
    name: String,
    arguments: String, // JSON-encoded string
}

#[derive(Debug, Clone, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: WireFunction,
}

#[derive(Debug, Clone, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "default_tool_type")]
    tool_type: String,
    function: WireToolFunction,
}

fn default_tool_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct WireToolFunction {
    name: String,
    arguments: String, // JSON string
}
