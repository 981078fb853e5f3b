// Tool trait and registry
//
// Each tool answers one model function call against the dataset. Tools never
// mutate the session directly; they may return an effect for the engine to
// apply.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::dataset::{DatasetProvider, DeveloperId};
use crate::session::ConversationSession;
use crate::tools::types::{ToolDefinition, ToolInputSchema};

/// Read-only view handed to a tool while it runs
pub struct ToolContext<'a> {
    pub dataset: &'a dyn DatasetProvider,
    /// The dialogue so far, used for precondition checks
    pub session: &'a ConversationSession,
}

/// Session change requested by a successful tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    DeveloperResolved { developer_id: DeveloperId, name: String },
    CloseRequested { reason: String },
}

#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub payload: Value,
    pub effect: Option<SessionEffect>,
}

impl ToolOutput {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            effect: None,
        }
    }

    pub fn with_effect(mut self, effect: SessionEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// Recoverable tool failure, reported back to the model
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{message}")]
    Refused { code: &'static str, message: String },
}

impl ToolError {
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::InvalidArguments(_) => "invalid_arguments",
            ToolError::Refused { code, .. } => code,
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> ToolInputSchema;

    async fn execute(
        &self,
        input: &Map<String, Value>,
        context: &ToolContext<'_>,
    ) -> Result<ToolOutput, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tools by name, with definitions kept in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }
}
