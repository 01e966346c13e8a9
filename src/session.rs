//! Interactive chat driver.
//!
//! [`ChatSession`] owns the [`TurnMemory`] and the backend handle. Each line is
//! handled in order: build prompt, generate, clean, display, record.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, trace};

use crate::cleaner::clean_reply;
use crate::config::ChatConfig;
use crate::error::ConfigurationError;
use crate::llm::{GenerationParams, Generator, first_text};
use crate::memory::TurnMemory;

pub const EXIT_COMMAND: &str = "/exit";
pub const CLEAR_COMMAND: &str = "/clear";

/// A classified line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Clear,
    Blank,
    Say(String),
}

impl Command {
    /// Classify a raw input line. Commands ignore case and surrounding space.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Command::Blank
        } else if line.eq_ignore_ascii_case(EXIT_COMMAND) {
            Command::Exit
        } else if line.eq_ignore_ascii_case(CLEAR_COMMAND) {
            Command::Clear
        } else {
            Command::Say(line.to_string())
        }
    }
}

/// What handling one line produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Exit,
    Cleared,
    Skipped,
    Reply(String),
}

/// Startup text shown before the first prompt.
pub fn banner(model: &str, max_turns: usize) -> String {
    format!(
        "Simple Local Chatbot\nModel: {model}\nMemory window (exchanges): {max_turns}\n\
         Type '{EXIT_COMMAND}' to quit, '{CLEAR_COMMAND}' to clear short-term memory.\n"
    )
}

/// One chat session: a memory window plus the backend that answers.
pub struct ChatSession<G> {
    generator: G,
    memory: TurnMemory,
    params: GenerationParams,
    system_prompt: String,
}

impl<G: Generator> ChatSession<G> {
    pub fn new(
        generator: G,
        memory: TurnMemory,
        params: GenerationParams,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            memory,
            params,
            system_prompt: system_prompt.into(),
        }
    }

    /// Build a session from `cfg`, failing when its memory size is invalid.
    pub fn from_config(generator: G, cfg: &ChatConfig) -> Result<Self, ConfigurationError> {
        let memory = TurnMemory::new(cfg.memory)?;
        Ok(Self::new(
            generator,
            memory,
            cfg.params(),
            cfg.system_prompt.clone(),
        ))
    }

    pub fn memory(&self) -> &TurnMemory {
        &self.memory
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Full prompt for `input`: the system preamble followed by the dialogue.
    pub fn build_prompt(&self, input: &str) -> String {
        format!("{}{}", self.system_prompt, self.memory.render_prompt(input))
    }

    /// Ask the backend for a reply to `input` and remember the exchange.
    pub async fn respond(&mut self, input: &str) -> Result<String> {
        let prompt = self.build_prompt(input);
        trace!(%prompt, "llm prompt");
        let results = self.generator.generate(&prompt, &self.params).await?;
        let raw = first_text(results)?;
        let reply = clean_reply(&raw, &prompt);
        debug!(%reply, "bot reply");
        self.memory.record(input, &reply);
        Ok(reply)
    }

    /// Handle one raw input line.
    pub async fn handle_line(&mut self, line: &str) -> Result<Outcome> {
        match Command::parse(line) {
            Command::Blank => Ok(Outcome::Skipped),
            Command::Exit => Ok(Outcome::Exit),
            Command::Clear => {
                self.memory.clear();
                info!("memory cleared");
                Ok(Outcome::Cleared)
            }
            Command::Say(text) => self.respond(&text).await.map(Outcome::Reply),
        }
    }

    /// Read lines from `input` until `/exit` or end of input, writing the
    /// transcript to `output`.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        loop {
            output.write_all(b"User: ").await?;
            output.flush().await?;
            let Some(line) = lines.next_line().await? else {
                info!("end of input");
                output.write_all(b"\n").await?;
                break;
            };
            match self.handle_line(&line).await? {
                Outcome::Skipped => continue,
                Outcome::Exit => {
                    output.write_all(b"Exiting chatbot. Goodbye!\n").await?;
                    break;
                }
                Outcome::Cleared => {
                    output
                        .write_all(b"[memory] cleared previous turns.\n")
                        .await?;
                }
                Outcome::Reply(reply) => {
                    output.write_all(format!("Bot: {reply}\n").as_bytes()).await?;
                }
            }
        }
        output.flush().await?;
        Ok(())
    }
}
