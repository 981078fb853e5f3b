// Tool-calling support for the conversation engine
//
// The model may call these tools mid-turn to look up developers and bugs, or
// to signal that the conversation is over.

pub mod dispatcher;
pub mod implementations;
pub mod registry;
pub mod types;

pub use dispatcher::{Dispatch, ToolDispatcher};
pub use registry::{SessionEffect, Tool, ToolContext, ToolError, ToolOutput, ToolRegistry};
pub use types::{ToolDefinition, ToolInputSchema, ToolResult};
