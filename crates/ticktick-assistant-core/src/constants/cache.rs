// ABOUTME: Cache-related constants for snapshot TTL and capacity
// ABOUTME: Defaults for the tool catalog's read-through snapshot cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Snapshot TTL for full-state reads (project list, batch sync)
pub const SNAPSHOT_TTL_SECS: u64 = 30;

/// Default maximum cache entries (one per credential and snapshot kind)
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;

/// Cache key prefix for namespacing
pub const CACHE_KEY_PREFIX: &str = "ticktick:snapshot:";
