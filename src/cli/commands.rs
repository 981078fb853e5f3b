// In-chat command handling

/// Words the REPL treats as commands rather than utterances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "/help" => Some(Command::Help),
            "quit" | "exit" | "/quit" | "/exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

pub fn format_help() -> &'static str {
    r#"Answer the assistant's questions to record progress on one bug.
Commands:
  /help         - Show this help message
  quit, exit    - Finish the session and save the report"#
}
