//! Byte-budgeted response store with TTL expiry and LRU eviction.

use super::key::CacheKey;
use crate::types::GenerationResponse;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry {
    response: GenerationResponse,
    inserted_at: Instant,
    last_accessed: Instant,
    size_bytes: usize,
}

impl CacheEntry {
    fn new(response: GenerationResponse) -> Self {
        let now = Instant::now();
        let size_bytes = response.content.len();
        Self {
            response,
            inserted_at: now,
            last_accessed: now,
            size_bytes,
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

#[derive(Default)]
struct StoreState {
    entries: HashMap<CacheKey, CacheEntry>,
    current_size: usize,
}

/// Point-in-time cache occupancy for observability.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub entries: usize,
    pub current_size_bytes: usize,
    pub current_size_mb: f64,
    pub max_size_bytes: usize,
}

/// Per-provider bounded response cache.
///
/// The sum of entry sizes never exceeds `max_size_bytes` except transiently
/// while a single entry larger than the whole budget is being stored.
/// Expired entries are purged on access, not proactively.
///
/// All operations are in-memory and atomic with respect to concurrent
/// callers on the same provider.
pub struct ResponseCache {
    state: Mutex<StoreState>,
    max_size_bytes: usize,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(max_size_bytes: usize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            max_size_bytes,
            ttl,
        }
    }

    /// Construct from a megabyte budget and a TTL in minutes.
    pub fn with_mb_budget(max_size_mb: u64, ttl_minutes: u64) -> Self {
        Self::new(
            (max_size_mb as usize) * 1024 * 1024,
            Duration::from_secs(ttl_minutes * 60),
        )
    }

    /// Look up a response; expired entries are removed and reported absent.
    ///
    /// A hit bumps the entry's access time and returns a copy flagged
    /// `served_from_cache = true`.
    pub fn get(&self, key: &CacheKey) -> Option<GenerationResponse> {
        let mut state = self.state.lock().unwrap();
        let expired = match state.entries.get(key) {
            None => return None,
            Some(entry) => entry.is_expired(self.ttl),
        };
        if expired {
            if let Some(entry) = state.entries.remove(key) {
                state.current_size -= entry.size_bytes;
            }
            return None;
        }
        let entry = state.entries.get_mut(key)?;
        entry.last_accessed = Instant::now();
        let mut response = entry.response.clone();
        response.served_from_cache = true;
        Some(response)
    }

    /// Insert a response, evicting least-recently-used entries until it fits.
    ///
    /// A response larger than the whole budget empties the cache and is
    /// still stored.
    pub fn put(&self, key: CacheKey, response: GenerationResponse) {
        let size = response.content.len();
        let mut state = self.state.lock().unwrap();

        // Replacing an entry frees its budget before the fit check.
        if let Some(old) = state.entries.remove(&key) {
            state.current_size -= old.size_bytes;
        }

        while state.current_size + size > self.max_size_bytes && !state.entries.is_empty() {
            // Oldest access wins eviction; key order breaks ties deterministically.
            let victim = state
                .entries
                .iter()
                .min_by(|(ka, ea), (kb, eb)| {
                    ea.last_accessed
                        .cmp(&eb.last_accessed)
                        .then_with(|| ka.cmp(kb))
                })
                .map(|(k, _)| k.clone());
            match victim {
                Some(k) => {
                    if let Some(evicted) = state.entries.remove(&k) {
                        state.current_size -= evicted.size_bytes;
                        tracing::debug!(key = %k, size_bytes = evicted.size_bytes, "evicted LRU cache entry");
                    }
                }
                None => break,
            }
        }

        state.current_size += size;
        state.entries.insert(key, CacheEntry::new(response));
    }

    /// Live entry count, expired entries included until purged on access.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn current_size_bytes(&self) -> usize {
        self.state.lock().unwrap().current_size
    }

    pub fn current_size_mb(&self) -> f64 {
        self.current_size_bytes() as f64 / (1024.0 * 1024.0)
    }

    pub fn max_size_bytes(&self) -> usize {
        self.max_size_bytes
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        let state = self.state.lock().unwrap();
        CacheSnapshot {
            entries: state.entries.len(),
            current_size_bytes: state.current_size,
            current_size_mb: state.current_size as f64 / (1024.0 * 1024.0),
            max_size_bytes: self.max_size_bytes,
        }
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.entries.clear();
        state.current_size = 0;
    }
}
