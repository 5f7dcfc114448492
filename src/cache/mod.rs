// ABOUTME: Snapshot cache for full-state reads from the task service
// ABOUTME: Cache configuration and credential-scoped keys; never keyed by raw tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// In-memory cache implementation
pub mod memory;

use std::fmt;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::constants::cache::{CACHE_KEY_PREFIX, DEFAULT_CACHE_MAX_ENTRIES, SNAPSHOT_TTL_SECS};

pub use memory::InMemoryCache;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Lifetime of a full-state snapshot
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            ttl: Duration::from_secs(SNAPSHOT_TTL_SECS),
        }
    }
}

impl CacheConfig {
    /// Configuration with a custom snapshot lifetime
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }
}

/// Structured cache key scoped to one credential set
///
/// Snapshots are cached per credential, never per query: callers re-filter
/// the cached snapshot instead of fetching again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Project list from the base API
    Projects {
        /// SHA-256 fingerprint of the access token
        fingerprint: String,
    },
    /// Full batch sync from the extended API
    BatchSnapshot {
        /// SHA-256 fingerprint of the session token
        fingerprint: String,
    },
}

impl CacheKey {
    /// Key for the project list of the given access token
    #[must_use]
    pub fn projects(access_token: &str) -> Self {
        Self::Projects {
            fingerprint: fingerprint(access_token),
        }
    }

    /// Key for the batch snapshot of the given session token
    #[must_use]
    pub fn batch_snapshot(session_token: &str) -> Self {
        Self::BatchSnapshot {
            fingerprint: fingerprint(session_token),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Projects { fingerprint } => {
                write!(f, "{CACHE_KEY_PREFIX}projects:{fingerprint}")
            }
            Self::BatchSnapshot { fingerprint } => {
                write!(f, "{CACHE_KEY_PREFIX}batch:{fingerprint}")
            }
        }
    }
}

/// Hex-encoded SHA-256 of a credential value
#[must_use]
pub fn fingerprint(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}
