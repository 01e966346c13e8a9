use serde::Deserialize;
use std::path::Path;

use crate::llm::GenerationParams;
use crate::ollama::Device;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, polite, and knowledgeable AI assistant. \
Answer user questions clearly, accurately, and conversationally.\n";

/// Settings for a chat session, usually read from a TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Model identifier handed to the provider.
    pub model: String,
    /// Base URL of the Ollama server.
    pub llm_url: String,
    /// Number of recent exchanges kept in the prompt.
    pub memory: i64,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub sampling: bool,
    pub device: Device,
    /// Preamble placed before the rendered dialogue on every turn.
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "qwen2:0.5b".into(),
            llm_url: "http://localhost:11434".into(),
            memory: 4,
            max_new_tokens: 80,
            temperature: 0.7,
            top_k: 50,
            sampling: true,
            device: Device::Auto,
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
        }
    }
}

impl ChatConfig {
    /// Generation options derived from this config.
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.max_new_tokens,
            sampling_enabled: self.sampling,
            temperature: self.temperature,
            top_k: self.top_k,
            return_full_text: true,
        }
    }
}

/// Load a [`ChatConfig`] from a TOML file. Missing keys keep their defaults.
///
/// ```no_run
/// # async fn example() -> anyhow::Result<()> {
/// let cfg = banter::config::load("banter.toml").await?;
/// println!("chatting with {}", cfg.model);
/// # Ok(()) }
/// ```
pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<ChatConfig> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(toml::from_str(&text)?)
}
