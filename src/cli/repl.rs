// Interactive chat loop
//
// Reads one utterance per line, prints the assistant's reply, and on exit
// finalizes the session, prints the structured output and saves artifacts.

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use std::io::{BufRead, Write};
use tracing::{error, info};

use super::commands::{format_help, Command};
use crate::errors::EngineError;
use crate::output::{ArtifactWriter, ConversationOutput};
use crate::output::writer::SavedArtifacts;
use crate::prompts;
use crate::session::ConversationEngine;

pub struct Repl {
    engine: ConversationEngine,
    writer: ArtifactWriter,
}

/// Result of one interactive session
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub output: ConversationOutput,
    pub saved: SavedArtifacts,
    pub turns: usize,
}

impl Repl {
    pub fn new(engine: ConversationEngine, writer: ArtifactWriter) -> Self {
        Self { engine, writer }
    }

    /// Run one session against stdin/stdout
    pub async fn run(&self) -> Result<SessionSummary> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        self.run_with(stdin.lock(), &mut stdout).await
    }

    pub async fn run_with<R: BufRead, W: Write>(
        &self,
        mut input: R,
        out: &mut W,
    ) -> Result<SessionSummary> {
        let mut session = self.engine.start();

        writeln!(out, "{}", "Bug progress report".bold())?;
        writeln!(out, "{}", "Type /help for commands, quit to finish.".dark_grey())?;
        writeln!(out)?;
        writeln!(out, "{} {}", "Assistant:".cyan(), prompts::GREETING)?;

        loop {
            write!(out, "\n{} ", "You:".green())?;
            out.flush()?;

            let mut line = String::new();
            let read = input.read_line(&mut line).context("Failed to read input")?;
            if read == 0 {
                writeln!(out)?;
                break;
            }

            match Command::parse(&line) {
                Some(Command::Quit) => break,
                Some(Command::Help) => {
                    writeln!(out, "{}", format_help())?;
                    continue;
                }
                None => {}
            }

            match self.engine.submit_user_utterance(&mut session, &line).await {
                Ok(reply) => {
                    writeln!(out, "{} {}", "Assistant:".cyan(), reply.assistant_text)?;
                    if reply.session_ended {
                        break;
                    }
                }
                Err(EngineError::SessionClosed) => break,
                Err(e @ EngineError::ToolLoopExceeded { .. }) => {
                    error!("Session aborted: {}", e);
                    writeln!(out, "{} {}", "Error:".red(), e)?;
                    break;
                }
                Err(e) => {
                    error!("Model call failed: {}", e);
                    writeln!(out, "{} {} (please try again)", "Error:".red(), e)?;
                    if session.is_ended() {
                        break;
                    }
                }
            }
        }

        writeln!(out, "\n{}", "Finalizing report...".dark_grey())?;
        let output = self.engine.finalize(&mut session).await;
        let json = output.to_pretty_json().context("Failed to serialize output")?;
        writeln!(out, "{}", json)?;

        let saved = self.writer.save(session.trace(), &output)?;
        info!("Saved {}", saved.output_path.display());
        writeln!(
            out,
            "{}",
            format!(
                "Saved {} and {}",
                saved.trace_path.display(),
                saved.output_path.display()
            )
            .dark_grey()
        )?;

        Ok(SessionSummary {
            output,
            saved,
            turns: session.turn_count(),
        })
    }
}
