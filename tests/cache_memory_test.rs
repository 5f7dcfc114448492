// ABOUTME: Tests for the in-memory snapshot cache
// ABOUTME: TTL expiry, read-through refresh, whole-cache invalidation and the generation guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use ticktick_assistant::cache::{CacheConfig, CacheKey, InMemoryCache};
use ticktick_assistant::errors::{AppError, AppResult};
use tokio::time::sleep;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Snapshot {
    projects: Vec<String>,
}

fn snapshot(names: &[&str]) -> Snapshot {
    Snapshot {
        projects: names.iter().map(|&n| n.to_owned()).collect(),
    }
}

const TTL: Duration = Duration::from_secs(30);

#[tokio::test]
async fn test_set_and_get() -> Result<()> {
    let cache = InMemoryCache::new(&CacheConfig::default());
    let key = CacheKey::projects("token-a");

    cache.set(&key, &snapshot(&["Work"]), TTL).await?;

    let cached: Option<Snapshot> = cache.get(&key).await?;
    assert_eq!(cached, Some(snapshot(&["Work"])));
    assert_eq!(cache.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_entries_expire_after_ttl() -> Result<()> {
    let cache = InMemoryCache::new(&CacheConfig::default());
    let key = CacheKey::batch_snapshot("session");

    cache
        .set(&key, &snapshot(&["Home"]), Duration::from_millis(50))
        .await?;
    sleep(Duration::from_millis(120)).await;

    let cached: Option<Snapshot> = cache.get(&key).await?;
    assert_eq!(cached, None);
    assert!(cache.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_get_or_refresh_fetches_once_within_ttl() -> Result<()> {
    let cache = InMemoryCache::new(&CacheConfig::default());
    let key = CacheKey::projects("token-a");
    let fetches = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let counter = fetches.clone();
        let value: Snapshot = cache
            .get_or_refresh(&key, TTL, || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(snapshot(&["Work", "Home"]))
            })
            .await?;
        assert_eq!(value.projects.len(), 2);
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_refresh_failure_is_not_cached() -> Result<()> {
    let cache = InMemoryCache::new(&CacheConfig::default());
    let key = CacheKey::projects("token-a");

    let failed: AppResult<Snapshot> = cache
        .get_or_refresh(&key, TTL, || async {
            Err(AppError::internal("Failed to fetch projects: 503"))
        })
        .await;
    assert!(failed.is_err());
    assert!(cache.is_empty().await);

    let recovered: Snapshot = cache
        .get_or_refresh(&key, TTL, || async { Ok(snapshot(&["Work"])) })
        .await?;
    assert_eq!(recovered, snapshot(&["Work"]));
    Ok(())
}

#[tokio::test]
async fn test_invalidate_clears_every_key() -> Result<()> {
    let cache = InMemoryCache::new(&CacheConfig::default());
    cache
        .set(&CacheKey::projects("a"), &snapshot(&["Work"]), TTL)
        .await?;
    cache
        .set(&CacheKey::batch_snapshot("b"), &snapshot(&["Home"]), TTL)
        .await?;
    assert_eq!(cache.generation(), 0);

    cache.invalidate().await;

    assert!(cache.is_empty().await);
    assert_eq!(cache.generation(), 1);
    Ok(())
}

#[tokio::test]
async fn test_refresh_racing_an_invalidation_is_not_stored() -> Result<()> {
    let cache = InMemoryCache::new(&CacheConfig::default());
    let key = CacheKey::batch_snapshot("session");

    // A write lands while the snapshot read is in flight
    let writer = cache.clone();
    let stale: Snapshot = cache
        .get_or_refresh(&key, TTL, || async move {
            writer.invalidate().await;
            Ok(snapshot(&["Deleted project"]))
        })
        .await?;

    assert_eq!(stale, snapshot(&["Deleted project"]));
    let cached: Option<Snapshot> = cache.get(&key).await?;
    assert_eq!(cached, None);
    Ok(())
}

#[tokio::test]
async fn test_clones_share_the_store() -> Result<()> {
    let cache = InMemoryCache::new(&CacheConfig::default());
    let clone = cache.clone();
    let key = CacheKey::projects("token-a");

    clone.set(&key, &snapshot(&["Work"]), TTL).await?;
    assert!(cache.get::<Snapshot>(&key).await?.is_some());

    cache.invalidate().await;
    assert_eq!(clone.generation(), 1);
    Ok(())
}

#[tokio::test]
async fn test_separate_caches_are_isolated() -> Result<()> {
    let first = InMemoryCache::new(&CacheConfig::default());
    let second = InMemoryCache::new(&CacheConfig::default());
    let key = CacheKey::projects("token-a");

    first.set(&key, &snapshot(&["Work"]), TTL).await?;

    assert!(second.get::<Snapshot>(&key).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_capacity_evicts_least_recently_used() -> Result<()> {
    let cache = InMemoryCache::new(&CacheConfig {
        max_entries: 1,
        ttl: TTL,
    });

    cache
        .set(&CacheKey::projects("a"), &snapshot(&["A"]), TTL)
        .await?;
    cache
        .set(&CacheKey::projects("b"), &snapshot(&["B"]), TTL)
        .await?;

    assert_eq!(cache.len().await, 1);
    assert!(cache
        .get::<Snapshot>(&CacheKey::projects("a"))
        .await?
        .is_none());
    Ok(())
}

#[test]
fn test_default_ttl_is_thirty_seconds() {
    assert_eq!(CacheConfig::default().ttl, Duration::from_secs(30));
    assert_eq!(
        CacheConfig::with_ttl(Duration::from_secs(5)).ttl,
        Duration::from_secs(5)
    );
}
