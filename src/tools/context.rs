// ABOUTME: Per-call execution context handed to every tool implementation
// ABOUTME: Bundles the task service, the snapshot cache, credentials and arguments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Execution Context
//!
//! Tools never reach for global state. Everything a tool needs arrives in a
//! [`ToolContext`]: the service to call, the catalog-owned snapshot cache, the
//! caller's credentials and the call's arguments.

use std::time::Duration;

use crate::cache::{CacheKey, InMemoryCache};
use crate::errors::{AppError, AppResult, ToolError};
use crate::ticktick::{BatchSnapshot, Credentials, Project, TaskService};

use super::args::ToolArgs;

/// Context provided to every tool execution
pub struct ToolContext<'a> {
    /// Backing service client
    pub service: &'a dyn TaskService,
    /// Snapshot cache owned by the catalog
    pub cache: &'a InMemoryCache,
    /// Lifetime of a cached snapshot
    pub ttl: Duration,
    /// Caller credentials
    pub credentials: &'a Credentials,
    /// Arguments of this call
    pub args: ToolArgs<'a>,
}

impl<'a> ToolContext<'a> {
    /// OAuth access token for base API calls
    #[must_use]
    pub fn access_token(&self) -> &'a str {
        self.credentials.access_token()
    }

    /// Session token for extended API calls
    ///
    /// # Errors
    ///
    /// Returns a session-required error when the credentials carry none
    pub fn session_token(&self) -> Result<&'a str, ToolError> {
        self.credentials
            .session_token()
            .ok_or_else(|| ToolError::session_required(self.args.tool()))
    }

    /// Project list, served from the snapshot cache when fresh
    ///
    /// # Errors
    ///
    /// Returns the service error when the list has to be fetched and the fetch fails
    pub async fn projects(&self) -> AppResult<Vec<Project>> {
        let token = self.access_token();
        let service = self.service;
        self.cache
            .get_or_refresh(&CacheKey::projects(token), self.ttl, || async move {
                service.list_projects(token).await.map_err(AppError::from)
            })
            .await
    }

    /// Whole-account batch snapshot, served from the snapshot cache when fresh
    ///
    /// # Errors
    ///
    /// Returns a session-required error without a session token, or the
    /// service error when the snapshot has to be fetched and the fetch fails
    pub async fn batch_snapshot(&self) -> AppResult<BatchSnapshot> {
        let token = self.session_token()?;
        let service = self.service;
        self.cache
            .get_or_refresh(&CacheKey::batch_snapshot(token), self.ttl, || async move {
                service.batch_check(token).await.map_err(AppError::from)
            })
            .await
    }
}
