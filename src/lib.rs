// Bugscribe - conversational bug progress reporter
// Library exports

pub mod cli;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod extraction;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod tools;

pub use errors::{DatasetError, EngineError, GatewayError};
pub use output::{BugReport, ConversationOutput};
pub use session::{ConversationEngine, ConversationSession, UtteranceReply};
