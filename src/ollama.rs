//! Generation backend and model provider backed by an Ollama server.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::ValueEnum;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ollama_rs::Ollama;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::models::ModelOptions;
use ollama_rs::models::pull::PullModelStatus;
use serde::Deserialize;
use tracing::{debug, info, trace, warn};

use crate::llm::{Generation, GenerationParams, Generator};

/// Where the model should run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Let the server offload to a GPU when it has one.
    #[default]
    Auto,
    /// Keep every layer on the CPU.
    Cpu,
}

/// [`Generator`] implementation backed by [`Ollama`] completions.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Ollama,
    model: String,
    device: Device,
}

impl OllamaGenerator {
    pub fn new(client: Ollama, model: impl Into<String>, device: Device) -> Self {
        Self {
            client,
            model: model.into(),
            device,
        }
    }

    /// Returns the configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn options(&self, params: &GenerationParams) -> ModelOptions {
        let temperature = if params.sampling_enabled {
            params.temperature
        } else {
            0.0
        };
        let num_predict = i32::try_from(params.max_new_tokens).unwrap_or(i32::MAX);
        let options = ModelOptions::default()
            .num_predict(num_predict)
            .temperature(temperature)
            .top_k(params.top_k);
        match self.device {
            Device::Cpu => options.num_gpu(0),
            Device::Auto => options,
        }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Vec<Generation>> {
        trace!(target: "llm", model = %self.model, %prompt, "Ollama prompt");
        // Raw mode skips the chat template so the model continues after `Bot:`.
        let req = GenerationRequest::new(self.model.clone(), prompt.to_string())
            .raw(true)
            .options(self.options(params));
        let resp = self.client.generate(req).await?;
        debug!(target: "llm", response = %resp.response, "Ollama full response");
        let text = if params.return_full_text {
            format!("{prompt}{}", resp.response)
        } else {
            resp.response
        };
        Ok(vec![Generation { text }])
    }
}

/// Connect to the server at `url` and make sure `model` is available locally.
///
/// Missing models are pulled with a progress bar on stderr.
pub async fn load_generator(url: &str, model: &str, device: Device) -> Result<OllamaGenerator> {
    info!(%url, %model, "loading model");
    let client = Ollama::try_new(url)?;
    if !has_local_model(&client, model).await? {
        pull_missing_model(&client, model).await?;
    }
    match device {
        Device::Auto => info!("device: auto, server may offload to GPU"),
        Device::Cpu => info!("device: cpu, GPU offload disabled"),
    }
    info!(%model, "backend ready");
    Ok(OllamaGenerator::new(client, model, device))
}

async fn has_local_model(client: &Ollama, model: &str) -> Result<bool> {
    let tagged = format!("{model}:latest");
    let models = client.list_local_models().await?;
    trace!(count = models.len(), "local models");
    Ok(models.iter().any(|m| m.name == model || m.name == tagged))
}

/// Download progress for one model, mirrored to a stderr bar and to logs.
struct PullProgress {
    model: String,
    bar: ProgressBar,
    sized: bool,
    last_percent: Option<u64>,
}

impl PullProgress {
    fn start(model: &str) -> Result<Self> {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        bar.set_style(ProgressStyle::with_template("pulling {prefix} {spinner} {msg}")?);
        bar.set_prefix(model.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Ok(Self {
            model: model.to_string(),
            bar,
            sized: false,
            last_percent: None,
        })
    }

    fn update(&mut self, status: PullModelStatus) -> Result<()> {
        let PullModelStatus {
            message,
            total,
            completed,
            ..
        } = status;
        if let (Some(total), Some(done)) = (total, completed) {
            if !self.sized {
                self.bar.set_style(ProgressStyle::with_template(
                    "pulling {prefix} {bar:40.cyan/blue} {bytes}/{total_bytes} {msg}",
                )?);
                self.sized = true;
            }
            self.bar.set_length(total);
            self.bar.set_position(done);
            let percent = (done * 100).checked_div(total).unwrap_or(0);
            if self.last_percent.is_none_or(|p| percent >= p + 10) {
                info!(model = %self.model, percent, "pull progress");
                self.last_percent = Some(percent);
            }
        } else {
            debug!(model = %self.model, status = %message, "pull status");
        }
        self.bar.set_message(message);
        Ok(())
    }

    fn finish(self) {
        self.bar.finish_and_clear();
        info!(model = %self.model, "model pulled");
    }
}

async fn pull_missing_model(client: &Ollama, model: &str) -> Result<()> {
    warn!(%model, "model not found locally, pulling");
    let mut progress = PullProgress::start(model)?;
    let mut stream = client.pull_model_stream(model.to_string(), false).await?;
    while let Some(status) = stream.next().await {
        progress.update(status?)?;
    }
    progress.finish();
    Ok(())
}
