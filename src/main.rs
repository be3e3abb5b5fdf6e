//! `postlingo` CLI: translate each TEXT through the cache and print the
//! resulting records as JSON lines. Failed translations are output, not errors.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use postlingo::{Config, TranslationEvent, WritePolicy};

#[derive(Debug, Parser)]
#[command(name = "postlingo", version, about = "Translate texts through the per-key cache")]
struct Cli {
    /// JSON config file; `POSTLINGO_*` variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target language code (e.g. "es").
    #[arg(short, long)]
    target: String,

    /// Source language code; defaults to auto-detect.
    #[arg(short, long)]
    source: Option<String>,

    /// How overlapping outcomes for one key are applied.
    #[arg(long, value_parser = parse_policy)]
    policy: Option<WritePolicy>,

    /// Texts to translate; each is cached under `text-<n>`.
    #[arg(required = true)]
    texts: Vec<String>,
}

fn parse_policy(s: &str) -> Result<WritePolicy, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    postlingo::init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env().context("applying environment overrides")?;
    if let Some(source) = cli.source {
        config.cache.source_language = source;
    }
    if let Some(policy) = cli.policy {
        config.cache.write_policy = policy;
    }
    config.validate()?;

    let cache = postlingo::build_cache(&config)?;
    let mut events = cache.subscribe();
    let watcher = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let TranslationEvent::Completed { key, status, .. } = event {
                debug!(key = %key, status = %status, "translation completed");
            }
        }
    });

    let mut keys = Vec::with_capacity(cli.texts.len());
    let mut handles = Vec::with_capacity(cli.texts.len());
    for (n, text) in cli.texts.iter().enumerate() {
        let key = format!("text-{n}");
        handles.push(cache.request(&key, text, &cli.target)?);
        keys.push(key);
    }
    for handle in handles {
        handle.await.context("translation task panicked")?;
    }

    for key in &keys {
        if let Some(record) = cache.get(key) {
            let line = serde_json::json!({ "key": key, "record": record });
            println!("{line}");
        }
    }

    let completed = keys.iter().filter(|k| cache.is_complete(k)).count();
    info!(completed, total = keys.len(), metrics = ?cache.metrics().summary(), "done");

    // Dropping the last sender closes the event stream.
    drop(cache);
    watcher.await.context("event watcher panicked")?;
    Ok(())
}
