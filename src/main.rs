use banter::{ChatConfig, ChatSession, Device, TurnMemory, config, load_generator, session};
use clap::Parser;
use cli_common::{LogLevel, init_tracing};
use std::path::PathBuf;
use tokio::io::{AsyncWriteExt, BufReader, stdin, stdout};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "banter", version, about = "Run the local CLI chatbot")]
struct Cli {
    /// Optional TOML config; flags below override its values
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Model identifier, e.g. qwen2:0.5b
    #[arg(long, env = "BANTER_MODEL")]
    model: Option<String>,

    /// Number of recent exchanges to keep in the sliding window
    #[arg(long, allow_negative_numbers = true)]
    memory: Option<i64>,

    /// Maximum tokens to generate per reply
    #[arg(long)]
    max_new_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Sample only from the k most likely tokens
    #[arg(long)]
    top_k: Option<u32>,

    /// Decode greedily instead of sampling
    #[arg(long)]
    greedy: bool,

    /// Device preference for the model
    #[arg(long)]
    device: Option<Device>,

    /// Base URL for Ollama
    #[arg(long, env = "OLLAMA_URL")]
    llm_url: Option<String>,

    /// Logging verbosity level
    #[arg(long, default_value = "warn")]
    log_level: LogLevel,
}

impl Cli {
    fn apply(self, mut cfg: ChatConfig) -> ChatConfig {
        if let Some(model) = self.model {
            cfg.model = model;
        }
        if let Some(memory) = self.memory {
            cfg.memory = memory;
        }
        if let Some(n) = self.max_new_tokens {
            cfg.max_new_tokens = n;
        }
        if let Some(t) = self.temperature {
            cfg.temperature = t;
        }
        if let Some(k) = self.top_k {
            cfg.top_k = k;
        }
        if self.greedy {
            cfg.sampling = false;
        }
        if let Some(device) = self.device {
            cfg.device = device;
        }
        if let Some(url) = self.llm_url {
            cfg.llm_url = url;
        }
        cfg
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let base = match &cli.config {
        Some(path) => config::load(path).await?,
        None => ChatConfig::default(),
    };
    let cfg = cli.apply(base);
    info!(?cfg, "configuration");

    // Reject a bad window before touching the backend.
    TurnMemory::new(cfg.memory)?;
    let generator = load_generator(&cfg.llm_url, &cfg.model, cfg.device).await?;
    let mut chat = ChatSession::from_config(generator, &cfg)?;

    let mut out = stdout();
    out.write_all(session::banner(&cfg.model, chat.memory().max_turns()).as_bytes())
        .await?;
    out.write_all(b"\n").await?;
    out.flush().await?;

    tokio::select! {
        res = chat.run(BufReader::new(stdin()), stdout()) => res?,
        _ = tokio::signal::ctrl_c() => {
            let mut out = stdout();
            out.write_all(b"\nReceived interrupt. Exiting. Goodbye!\n").await?;
            out.flush().await?;
            // The stdin reader thread may still be blocked on a read.
            std::process::exit(0);
        }
    }
    Ok(())
}
