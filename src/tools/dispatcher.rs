// Tool dispatcher
//
// Maps a model-requested call onto a registered tool and turns every outcome,
// including unknown tools and refusals, into a tool-result message for the
// model. Nothing here aborts a session.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::dataset::DatasetProvider;
use crate::providers::types::ToolCall;
use crate::session::ConversationSession;
use crate::tools::implementations::{
    EndConversationTool, GetBugsForDeveloperTool, VerifyDeveloperTool,
};
use crate::tools::registry::{SessionEffect, ToolContext, ToolRegistry};
use crate::tools::types::{ToolDefinition, ToolResult};

/// Outcome of one dispatched call
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub result: ToolResult,
    /// Session change for the engine to apply, on success only
    pub effect: Option<SessionEffect>,
}

pub struct ToolDispatcher {
    registry: ToolRegistry,
    dataset: Arc<dyn DatasetProvider>,
}

impl ToolDispatcher {
    /// Dispatcher with the conversation tools registered
    pub fn new(dataset: Arc<dyn DatasetProvider>) -> Self {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(VerifyDeveloperTool));
        registry.register(Box::new(GetBugsForDeveloperTool));
        registry.register(Box::new(EndConversationTool));
        Self::with_registry(registry, dataset)
    }

    pub fn with_registry(registry: ToolRegistry, dataset: Arc<dyn DatasetProvider>) -> Self {
        Self { registry, dataset }
    }

    /// Schemas advertised to the model on every conversation call
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    #[instrument(skip(self, session, call), fields(tool = %call.name, id = %call.id))]
    pub async fn dispatch(&self, session: &ConversationSession, call: &ToolCall) -> Dispatch {
        let Some(tool) = self.registry.get(&call.name) else {
            warn!("Model requested unknown tool '{}'", call.name);
            return Dispatch {
                result: ToolResult::error(
                    call.id.clone(),
                    "unknown_tool",
                    format!(
                        "No tool named '{}'. Available: {}",
                        call.name,
                        self.registry.tool_names().join(", ")
                    ),
                ),
                effect: None,
            };
        };

        let context = ToolContext {
            dataset: self.dataset.as_ref(),
            session,
        };

        match tool.execute(&call.arguments, &context).await {
            Ok(output) => {
                info!("Tool executed successfully");
                Dispatch {
                    result: ToolResult::success(call.id.clone(), &output.payload),
                    effect: output.effect,
                }
            }
            Err(e) => {
                warn!("Tool call rejected ({}): {}", e.code(), e);
                Dispatch {
                    result: ToolResult::error(call.id.clone(), e.code(), e.to_string()),
                    effect: None,
                }
            }
        }
    }
}
