//! In-memory shared cache
//!
//! Two tiers in the manner of the gateway-style cache managers this is
//! modeled on: a small LRU for hot keys and a larger concurrent map behind
//! it. The engine itself only ever calls [`SharedCache::flush_all`]; the
//! get/put surface exists for hosts that want to use the same cache for their
//! own aggregates.

use super::SharedCache;
use crate::utils::error::{Result, SweepError};
use async_trait::async_trait;
use dashmap::DashMap;
use lru::LruCache;
use parking_lot::RwLock;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Cache statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub flushes: u64,
}

#[derive(Default)]
struct AtomicCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    flushes: AtomicU64,
}

/// In-memory implementation of [`SharedCache`]
pub struct MemoryCache {
    hot: Arc<RwLock<LruCache<String, Value>>>,
    store: Arc<DashMap<String, Value>>,
    stats: Arc<AtomicCacheStats>,
}

impl MemoryCache {
    /// Create a cache with the given hot-tier capacity
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            SweepError::Config("cache capacity must be greater than 0".to_string())
        })?;
        Ok(Self {
            hot: Arc::new(RwLock::new(LruCache::new(capacity))),
            store: Arc::new(DashMap::new()),
            stats: Arc::new(AtomicCacheStats::default()),
        })
    }

    /// Look up a cached value
    pub fn get(&self, key: &str) -> Option<Value> {
        {
            let mut hot = self.hot.write();
            if let Some(value) = hot.get(key) {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(value.clone());
            }
        }
        if let Some(entry) = self.store.get(key) {
            let value = entry.value().clone();
            // Promote to the hot tier
            self.hot.write().put(key.to_string(), value.clone());
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Some(value);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a value
    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.store.insert(key.into(), value);
    }

    /// Number of entries in the backing store
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the backing store is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Statistics snapshot
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            flushes: self.stats.flushes.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl SharedCache for MemoryCache {
    async fn flush_all(&self) -> Result<()> {
        self.hot.write().clear();
        self.store.clear();
        self.stats.flushes.fetch_add(1, Ordering::Relaxed);
        info!("Shared cache flushed");
        Ok(())
    }
}
