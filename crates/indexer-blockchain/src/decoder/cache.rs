use std::{
    num::NonZeroUsize,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use alloy::dyn_abi::DynSolValue;
use indexer_observability::record_decode_cache_lookup;
use lru::LruCache;

use super::DecoderOptions;

/// Identity of one decode request: payload bytes, target ABI type and options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub payload_hex: String,
    pub target: &'static str,
    pub options: DecoderOptions,
}

struct CacheEntry {
    values: Vec<DynSolValue>,
    inserted_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Bounded, time-expiring cache of ABI decode results.
///
/// Once full, inserting a new key evicts the least recently used entry.
/// Expired entries are dropped when looked up or by [`DecodeCache::evict_expired`].
/// A capacity of zero disables caching.
pub struct DecodeCache {
    entries: Option<Mutex<LruCache<CacheKey, CacheEntry>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DecodeCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<DynSolValue>> {
        let entries = self.entries.as_ref()?;

        let mut entries = entries.lock().unwrap_or_else(PoisonError::into_inner);
        let hit = match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.values.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        };
        drop(entries);

        let counter = if hit.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        record_decode_cache_lookup(hit.is_some());
        hit
    }

    pub fn insert(&self, key: CacheKey, values: Vec<DynSolValue>) {
        let Some(entries) = &self.entries else {
            return;
        };

        entries.lock().unwrap_or_else(PoisonError::into_inner).put(
            key,
            CacheEntry {
                values,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let Some(entries) = &self.entries else {
            return 0;
        };

        let mut entries = entries.lock().unwrap_or_else(PoisonError::into_inner);
        let expired: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, entry)| entry.inserted_at.elapsed() >= self.ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| {
            entries.lock().unwrap_or_else(PoisonError::into_inner).len()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
