//! Per-entity translation cache.
//! Key: caller-chosen entity id (e.g. a post URI). One record per key, written
//! Pending synchronously on request and overwritten by the provider outcome.
//! Unbounded unless `max_entries` is configured; reads never touch LRU order.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use super::record::{TranslationRecord, TranslationStatus};
use super::TranslationProvider;
use crate::config::CacheConfig;
use crate::generation::{GenerationCounter, WritePolicy};
use crate::metrics::{metric_names, MetricsRegistry, RequestIds};

/// Caller defects, reported before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("translation key is empty")]
    EmptyKey,
    #[error("text to translate is empty")]
    EmptyText,
    #[error("target language is empty")]
    EmptyTargetLanguage,
    #[error("no tokio runtime to spawn the translation on")]
    NoRuntime,
}

/// Store change notifications for observers (UI layers, loggers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationEvent {
    /// Record reset to Pending.
    Requested { key: String, generation: u64 },
    /// Provider outcome written.
    Completed {
        key: String,
        generation: u64,
        status: TranslationStatus,
    },
    /// Provider outcome dropped because a newer request or a clear superseded it.
    Discarded { key: String, generation: u64 },
    Cleared { key: String },
    Evicted { key: String },
}

struct Entry {
    record: TranslationRecord,
    /// Generation of the latest request issued for this key.
    generation: u64,
}

struct Inner {
    store: Mutex<LruCache<String, Entry>>,
    provider: Arc<dyn TranslationProvider>,
    generations: GenerationCounter,
    policy: WritePolicy,
    source_language: String,
    events: broadcast::Sender<TranslationEvent>,
    metrics: Arc<MetricsRegistry>,
}

impl Inner {
    fn emit(&self, event: TranslationEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Insert `entry` under `key`, reporting a displaced least-recent key.
    fn install(store: &mut LruCache<String, Entry>, key: &str, entry: Entry) -> Option<String> {
        match store.push(key.to_string(), entry) {
            Some((old_key, _)) if old_key != key => Some(old_key),
            _ => None,
        }
    }

    /// Write a provider outcome if the write policy admits it.
    fn apply(&self, key: &str, generation: u64, record: TranslationRecord) {
        let status = record.status();
        let (applied, evicted) = {
            let mut store = self.store.lock();
            let current = store.peek(key).map(|e| e.generation);
            if self.policy.admits(generation, current) {
                let entry = Entry {
                    record,
                    generation: current.unwrap_or(generation),
                };
                (true, Self::install(&mut store, key, entry))
            } else {
                (false, None)
            }
        };

        if let Some(evicted) = evicted {
            debug!(key = %evicted, "translation_evicted");
            self.emit(TranslationEvent::Evicted { key: evicted });
        }
        if applied {
            self.emit(TranslationEvent::Completed {
                key: key.to_string(),
                generation,
                status,
            });
        } else {
            info!(key = %key, generation, "stale translation discarded");
            self.emit(TranslationEvent::Discarded {
                key: key.to_string(),
                generation,
            });
        }
    }
}

/// A request whose Pending record is already stored; running it performs the
/// provider call and writes the outcome.
#[must_use = "the provider call only happens when the request is run"]
pub struct InFlight {
    inner: Arc<Inner>,
    key: String,
    text: String,
    target_language: String,
    ids: RequestIds,
}

impl std::fmt::Debug for InFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight")
            .field("key", &self.key)
            .field("target_language", &self.target_language)
            .field("ids", &self.ids)
            .finish()
    }
}

impl InFlight {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.ids.generation
    }

    /// Call the provider and store the outcome. Provider failures end up in the
    /// record, never in the return value.
    pub async fn run(self) {
        let span = info_span!(
            "translation",
            request_id = %self.ids.request_id,
            key = %self.key,
            generation = self.ids.generation,
        );
        async move {
            let timer = self.inner.metrics.span();
            let outcome = self
                .inner
                .provider
                .translate(&self.text, &self.target_language, &self.inner.source_language)
                .await;

            let record = match outcome {
                Ok(result) => {
                    let elapsed_us = timer.finish(metric_names::PROVIDER_SUCCESS);
                    info!(
                        elapsed_us,
                        detected = ?result.detected_source_language,
                        "translation_succeeded"
                    );
                    TranslationRecord::success(&self.target_language, result)
                }
                Err(e) => {
                    let elapsed_us = timer.finish(metric_names::PROVIDER_FAILURE);
                    warn!(error = %e, elapsed_us, "translation_failed");
                    TranslationRecord::failed(&self.target_language, e.to_string())
                }
            };

            self.inner.apply(&self.key, self.ids.generation, record);
        }
        .instrument(span)
        .await
    }
}

/// Shared per-key translation store. Clones share the same store.
#[derive(Clone)]
pub struct TranslationCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TranslationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationCache")
            .field("entries", &self.len())
            .field("policy", &self.inner.policy)
            .field("source_language", &self.inner.source_language)
            .finish()
    }
}

impl TranslationCache {
    pub fn new(provider: Arc<dyn TranslationProvider>, config: &CacheConfig) -> Self {
        let store = match config.max_entries.and_then(NonZeroUsize::new) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(store),
                provider,
                generations: GenerationCounter::new(),
                policy: config.write_policy,
                source_language: config.source_language.clone(),
                events,
                metrics: Arc::new(MetricsRegistry::new()),
            }),
        }
    }

    /// Reset `key` to Pending and return the request to run.
    ///
    /// The Pending record is visible to readers as soon as this returns.
    pub fn begin(
        &self,
        key: &str,
        text: &str,
        target_language: &str,
    ) -> Result<InFlight, CacheError> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        if text.is_empty() {
            return Err(CacheError::EmptyText);
        }
        if target_language.is_empty() {
            return Err(CacheError::EmptyTargetLanguage);
        }

        let generation = self.inner.generations.advance();
        let evicted = {
            let mut store = self.inner.store.lock();
            Inner::install(
                &mut store,
                key,
                Entry {
                    record: TranslationRecord::pending(target_language),
                    generation,
                },
            )
        };

        debug!(key = %key, generation, target = %target_language, "translation_requested");
        if let Some(evicted) = evicted {
            debug!(key = %evicted, "translation_evicted");
            self.inner.emit(TranslationEvent::Evicted { key: evicted });
        }
        self.inner.emit(TranslationEvent::Requested {
            key: key.to_string(),
            generation,
        });

        Ok(InFlight {
            inner: Arc::clone(&self.inner),
            key: key.to_string(),
            text: text.to_string(),
            target_language: target_language.to_string(),
            ids: RequestIds::new(generation),
        })
    }

    /// Reset `key` to Pending and spawn the provider call on the current tokio
    /// runtime.
    pub fn request(
        &self,
        key: &str,
        text: &str,
        target_language: &str,
    ) -> Result<JoinHandle<()>, CacheError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let in_flight = self.begin(key, text, target_language)?;
        Ok(handle.spawn(in_flight.run()))
    }

    /// Like [`TranslationCache::request`], but runs the provider call in place.
    pub async fn translate(
        &self,
        key: &str,
        text: &str,
        target_language: &str,
    ) -> Result<(), CacheError> {
        self.begin(key, text, target_language)?.run().await;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<TranslationRecord> {
        self.inner.store.lock().peek(key).map(|e| e.record.clone())
    }

    pub fn is_complete(&self, key: &str) -> bool {
        self.inner
            .store
            .lock()
            .peek(key)
            .is_some_and(|e| e.record.is_complete())
    }

    /// Remove the record for `key`. Absent keys are a no-op.
    pub fn clear(&self, key: &str) {
        let removed = self.inner.store.lock().pop(key).is_some();
        if removed {
            debug!(key = %key, "translation_cleared");
            self.inner.emit(TranslationEvent::Cleared {
                key: key.to_string(),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.inner.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys, most recently written first.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .store
            .lock()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn snapshot(&self) -> HashMap<String, TranslationRecord> {
        self.inner
            .store
            .lock()
            .iter()
            .map(|(k, e)| (k.clone(), e.record.clone()))
            .collect()
    }

    /// Subscribe to store changes.
    pub fn subscribe(&self) -> broadcast::Receiver<TranslationEvent> {
        self.inner.events.subscribe()
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.inner.metrics
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.inner.policy
    }
}
