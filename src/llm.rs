use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::error::GenerationError;

/// Sampling options passed through to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub sampling_enabled: bool,
    pub temperature: f32,
    pub top_k: u32,
    /// Return the prompt followed by the continuation instead of the
    /// continuation alone.
    pub return_full_text: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 80,
            sampling_enabled: true,
            temperature: 0.7,
            top_k: 50,
            return_full_text: true,
        }
    }
}

/// One result produced by a [`Generator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
}

/// Text completion capability: prompt in, continuations out.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Vec<Generation>>;
}

/// Take the text of the first result, rejecting an empty result set.
pub fn first_text(results: Vec<Generation>) -> Result<String, GenerationError> {
    results
        .into_iter()
        .next()
        .map(|g| g.text)
        .ok_or(GenerationError::EmptyResult)
}

/// Offline backend replaying queued continuations, one per call.
///
/// Useful for scripted demos and for driving a [`ChatSession`] without a
/// model server. Once the queue is exhausted it returns no results. Every
/// prompt it receives is kept and can be read back with [`prompts`].
///
/// [`ChatSession`]: crate::session::ChatSession
/// [`prompts`]: ScriptedGenerator::prompts
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

// Both queues stay consistent under a panic elsewhere, so poisoning is ignored.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Vec<Generation>> {
        lock(&self.prompts).push(prompt.to_string());
        let Some(reply) = lock(&self.replies).pop_front() else {
            return Ok(Vec::new());
        };
        debug!(target: "llm", response = %reply, "ScriptedGenerator response");
        let text = if params.return_full_text {
            format!("{prompt}{reply}")
        } else {
            reply
        };
        Ok(vec![Generation { text }])
    }
}
