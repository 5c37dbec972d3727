//! Result cache
//!
//! Trait and in-memory implementation for caching key estimates per clip.
//!
//! Entries are keyed by source identifier and analysis duration, and store
//! the outcome as `Option<KeyEstimate>`: a clip with no tonal signal is
//! cached as `None` so it is not re-analyzed. Failed and cancelled runs are
//! never cached.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::analysis::result::KeyEstimate;

/// Cache key: one clip analyzed over one duration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Source identifier as given to the estimator
    pub source_id: String,
    /// `seconds_to_analyze.to_bits()`, so the key stays `Eq + Hash`
    pub seconds_bits: u32,
}

impl CacheKey {
    /// Build a key
    pub fn new(source_id: impl Into<String>, seconds_to_analyze: f32) -> Self {
        Self {
            source_id: source_id.into(),
            seconds_bits: seconds_to_analyze.to_bits(),
        }
    }

    /// Analysis duration this key was built for
    pub fn seconds_to_analyze(&self) -> f32 {
        f32::from_bits(self.seconds_bits)
    }
}

/// Storage for completed analyses
///
/// Writes are idempotent; the last writer wins.
pub trait ResultCache: Send + Sync {
    /// Look up a completed analysis
    ///
    /// `None` is a miss; `Some(None)` is a cached "no tonal signal".
    fn get(&self, key: &CacheKey) -> Option<Option<KeyEstimate>>;

    /// Store a completed analysis
    fn insert(&self, key: CacheKey, estimate: Option<KeyEstimate>);
}

/// Process-local cache backed by a `HashMap`
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, Option<KeyEstimate>>>,
}

impl InMemoryCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl ResultCache for InMemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Option<KeyEstimate>> {
        // A poisoned lock behaves as a miss
        self.entries.read().ok()?.get(key).cloned()
    }

    fn insert(&self, key: CacheKey, estimate: Option<KeyEstimate>) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(key, estimate);
            }
            Err(_) => log::warn!("Result cache lock poisoned, dropping entry for {}", key.source_id),
        }
    }
}
