//! Bounded embedding cache with first-in, first-out batch eviction.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

use super::{EmbeddingProvider, EmbeddingVector};
use crate::config::CacheConfig;
use crate::error::{ConfigError, MetricsResult};

/// Digest of `(provider_id, text)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Derive the key for `text` as embedded by `provider_id`.
    pub fn new(text: &str, provider_id: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
        hasher.update(&(provider_id.len() as u64).to_le_bytes());
        hasher.update(provider_id.as_bytes());
        hasher.update(text.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }
}

/// Counters describing cache behaviour since construction or the last clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, EmbeddingVector>,
    /// Keys in insertion order; the front is evicted first.
    order: VecDeque<CacheKey>,
    stats: CacheStats,
}

/// Shared cache in front of an embedding provider.
///
/// Lookups, inserts and eviction all happen under one mutex. The provider
/// call itself runs outside the lock, so two threads missing on the same key
/// may both call the provider; the first insert wins and the second result is
/// discarded.
///
/// Eviction is by insertion order, not recency: once the cache holds more
/// than `max_entries`, the `eviction_batch` oldest entries are dropped.
#[derive(Debug)]
pub struct EmbeddingCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl EmbeddingCache {
    /// Create a cache with explicit bounds.
    pub fn new(config: CacheConfig) -> Result<Self, ConfigError> {
        if config.max_entries == 0 || config.eviction_batch == 0 {
            return Err(ConfigError::Invalid(
                "cache bounds must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            config,
            state: Mutex::new(CacheState::default()),
        })
    }

    /// Create a cache holding up to 1000 entries, evicting 200 at a time.
    pub fn with_defaults() -> Self {
        Self {
            config: CacheConfig::default(),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Get the cache bounds.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Every mutation below completes before the guard drops, so a
        // poisoned lock still guards consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached vector for `text`, or compute and cache it.
    ///
    /// A provider failure is returned as-is and leaves the cache untouched.
    pub fn get_or_compute(
        &self,
        text: &str,
        provider: &dyn EmbeddingProvider,
    ) -> MetricsResult<EmbeddingVector> {
        let key = CacheKey::new(text, provider.id());

        {
            let mut state = self.lock();
            if let Some(vector) = state.entries.get(&key).cloned() {
                state.stats.hits += 1;
                trace!(provider = provider.id(), "embedding cache hit");
                return Ok(vector);
            }
            state.stats.misses += 1;
        }

        debug!(provider = provider.id(), chars = text.len(), "embedding cache miss");
        let vector = provider.embed(text).map_err(|err| {
            warn!(provider = provider.id(), error = %err, "embedding provider failed");
            err
        })?;

        let mut state = self.lock();
        if let Some(existing) = state.entries.get(&key) {
            return Ok(existing.clone());
        }
        state.entries.insert(key, vector.clone());
        state.order.push_back(key);

        if state.entries.len() > self.config.max_entries {
            let count = self.config.eviction_batch.min(state.order.len());
            let evicted: Vec<CacheKey> = state.order.drain(..count).collect();
            for old in &evicted {
                state.entries.remove(old);
            }
            state.stats.evictions += count as u64;
            debug!(
                evicted = count,
                remaining = state.entries.len(),
                "embedding cache evicted oldest entries"
            );
        }

        Ok(vector)
    }

    /// Whether a vector for `(text, provider_id)` is currently cached.
    pub fn contains(&self, text: &str, provider_id: &str) -> bool {
        self.lock()
            .entries
            .contains_key(&CacheKey::new(text, provider_id))
    }

    /// Number of cached embeddings.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Snapshot of hit, miss and eviction counters.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
        state.stats = CacheStats::default();
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}
