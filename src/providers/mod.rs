// Model gateway abstraction
//
// The conversation engine talks to the language-model service only through
// `ModelGateway`, so the remote provider can be swapped (or scripted in
// tests) without touching orchestration code.

use async_trait::async_trait;

use crate::errors::GatewayError;

pub mod openrouter;
pub mod retry;
pub mod scripted;
pub mod types;

pub use openrouter::OpenRouterGateway;
pub use scripted::ScriptedGateway;
pub use types::{CompletionRequest, Message, ModelTurn, Role, ToolCall};

/// A remote language model that may answer with text or tool calls
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Run one completion over the given transcript and tool schema.
    ///
    /// Blocking and fallible; implementations apply their own timeout and
    /// at most a bounded number of idempotent retries.
    async fn complete(&self, request: &CompletionRequest) -> Result<ModelTurn, GatewayError>;

    /// Provider name for logs (e.g. "openrouter")
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;
}
