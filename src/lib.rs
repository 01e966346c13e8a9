//! Command-line chat loop around a text-completion model.
//!
//! A [`TurnMemory`] keeps the last few exchanges, renders them as a
//! `User:`/`Bot:` dialogue and a [`Generator`] continues it. The raw
//! continuation goes through [`clean_reply`] before it is shown.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod ollama;
pub mod session;

pub use cleaner::{FALLBACK_REPLY, clean_reply};
pub use config::ChatConfig;
pub use error::{ConfigurationError, GenerationError};
pub use llm::{Generation, GenerationParams, Generator, ScriptedGenerator};
pub use memory::{Exchange, TurnMemory};
pub use ollama::{Device, OllamaGenerator, load_generator};
pub use session::{ChatSession, Command, Outcome};
