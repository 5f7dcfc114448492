// ABOUTME: In-memory snapshot cache with LRU eviction and per-entry TTL
// ABOUTME: Read-through get_or_refresh plus whole-cache invalidation with a generation guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CacheConfig, CacheKey};
use crate::constants::cache::DEFAULT_CACHE_MAX_ENTRIES;
use crate::errors::AppResult;

/// In-memory cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory cache with LRU eviction
///
/// Cloning is cheap and clones share the same store. Each `ToolCatalog`
/// creates its own instance, so separate catalogs never share snapshots.
///
/// `invalidate` clears everything and advances a generation counter. A
/// refresh that started before an invalidation is returned to its caller but
/// not stored, so a snapshot read before a write can never outlive the write.
#[derive(Clone)]
pub struct InMemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    generation: Arc<AtomicU64>,
}

impl InMemoryCache {
    /// Capacity used when the config asks for zero entries
    const FALLBACK_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CACHE_MAX_ENTRIES) {
        Some(n) => n,
        None => NonZeroUsize::MIN,
    };

    /// Create a new cache
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.max_entries).unwrap_or(Self::FALLBACK_CAPACITY);

        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Store a value with the given TTL
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized
    pub async fn set<T: Serialize + Sync>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let serialized = serde_json::to_vec(value)?;
        self.store
            .write()
            .await
            .push(key.to_string(), CacheEntry::new(serialized, ttl));
        Ok(())
    }

    /// Retrieve a live value; expired entries are dropped on access
    ///
    /// # Errors
    ///
    /// Returns an error if the stored bytes cannot be deserialized as `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let rendered = key.to_string();
        let mut store = self.store.write().await;

        // LruCache::get is mutable (updates access order)
        let Some(entry) = store.get(&rendered) else {
            return Ok(None);
        };
        if entry.is_expired() {
            store.pop(&rendered);
            return Ok(None);
        }
        let value = serde_json::from_slice(&entry.data)?;
        drop(store);
        Ok(Some(value))
    }

    /// Return the cached value for `key`, or run `refresh` and cache its result
    ///
    /// # Errors
    ///
    /// Returns the error produced by `refresh`, or a serialization error
    pub async fn get_or_refresh<T, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        refresh: F,
    ) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
    {
        if let Some(value) = self.get(key).await? {
            debug!(cache_key = %key, "Snapshot cache hit");
            return Ok(value);
        }

        let started_at = self.generation();
        debug!(cache_key = %key, "Snapshot cache miss, refreshing");
        let value = refresh().await?;

        let serialized = serde_json::to_vec(&value)?;
        let mut store = self.store.write().await;
        // Checked under the write lock so invalidate() cannot slip in between
        if self.generation() == started_at {
            store.push(key.to_string(), CacheEntry::new(serialized, ttl));
        } else {
            debug!(cache_key = %key, "Discarding snapshot read that raced an invalidation");
        }
        drop(store);

        Ok(value)
    }

    /// Drop every entry
    pub async fn invalidate(&self) {
        let mut store = self.store.write().await;
        let removed = store.len();
        store.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
        drop(store);
        debug!(removed, "Snapshot cache invalidated");
    }

    /// Number of invalidations performed so far
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}
