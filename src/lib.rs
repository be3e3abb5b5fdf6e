//! postlingo: per-entity on-demand translation cache.
//! Requests are keyed by an entity id (e.g. a post URI); each key tracks its
//! own Pending/Success/Failed record, fed by a pluggable translation provider.

pub mod config;
pub mod generation;
pub mod metrics;
pub mod translate;

pub use config::{CacheConfig, Config, ConfigError, GoogleConfig};
pub use generation::WritePolicy;
pub use translate::cache::{CacheError, InFlight, TranslationCache, TranslationEvent};
pub use translate::google::GoogleTranslateClient;
pub use translate::record::{TranslationRecord, TranslationStatus};
pub use translate::{ProviderTranslation, TranslateError, TranslationProvider, AUTO_DETECT};

use std::sync::Arc;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `postlingo=info` filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("postlingo=info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}

/// Build a cache backed by the Google `gtx` client described by `config`.
pub fn build_cache(config: &Config) -> Result<TranslationCache, TranslateError> {
    let client = GoogleTranslateClient::new(&config.google)?;
    tracing::info!(base_url = %client.base_url(), policy = ?config.cache.write_policy, "translation cache ready");
    Ok(TranslationCache::new(Arc::new(client), &config.cache))
}
