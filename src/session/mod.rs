// Conversation sessions and the engine that drives them

pub mod engine;
pub mod state;

pub use engine::{ConversationEngine, UtteranceReply};
pub use state::{ConversationSession, EndReason};
