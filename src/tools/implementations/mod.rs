// Tool implementations
//
// Each tool resolves one model function call against the dataset.

pub mod bugs_for_developer;
pub mod end_conversation;
pub mod verify_developer;

pub use bugs_for_developer::GetBugsForDeveloperTool;
pub use end_conversation::EndConversationTool;
pub use verify_developer::VerifyDeveloperTool;
