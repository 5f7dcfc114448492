// ABOUTME: TickTick backing-service boundary: credentials, typed models and the TaskService trait
// ABOUTME: The tool catalog talks only to TaskService so tests can substitute a fake service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # TickTick Service
//!
//! Two API tiers exist. The base tier is the public OAuth REST API
//! (bearer access token). The extended tier is the session API used by the
//! official apps (`X-Ticktick-Session` header) and adds whole-account sync,
//! completed-task queries, subtasks and tag management.

/// HTTP client implementation
pub mod client;
/// Service error type
pub mod errors;
/// Data models
pub mod models;

pub use client::TickTickClient;
pub use errors::{ServiceError, ServiceResult};
pub use models::{
    BatchProject, BatchSnapshot, ChecklistItem, CompletedTask, Project, ProjectData, SyncTaskBean,
    Tag, Task,
};

use std::fmt::{self, Debug, Formatter};

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Credentials for one TickTick account
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
    session_token: Option<String>,
}

impl Credentials {
    /// Create credentials; the session token unlocks the extended API
    #[must_use]
    pub fn new(access_token: impl Into<String>, session_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            session_token: session_token.filter(|t| !t.is_empty()),
        }
    }

    /// OAuth access token (base API)
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Session token (extended API)
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Whether the extended API can be used
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session_token.is_some()
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Operations the tool catalog needs from the backing service
///
/// Every call takes the credential it needs and fails with a typed
/// [`ServiceError`] on a non-success status.
#[async_trait]
pub trait TaskService: Send + Sync {
    // ------------------------------------------------------------------
    // Base API
    // ------------------------------------------------------------------

    /// List every project
    async fn list_projects(&self, access_token: &str) -> ServiceResult<Vec<Project>>;

    /// A project with its open tasks
    async fn project_data(&self, access_token: &str, project_id: &str)
        -> ServiceResult<ProjectData>;

    /// One task with full detail
    async fn get_task(&self, access_token: &str, project_id: &str, task_id: &str)
        -> ServiceResult<Task>;

    /// Create a project from the given fields
    async fn create_project(
        &self,
        access_token: &str,
        project: &Map<String, Value>,
    ) -> ServiceResult<Project>;

    /// Update the given fields of a project
    async fn update_project(
        &self,
        access_token: &str,
        project_id: &str,
        updates: &Map<String, Value>,
    ) -> ServiceResult<Project>;

    /// Delete a project and its tasks
    async fn delete_project(&self, access_token: &str, project_id: &str) -> ServiceResult<()>;

    /// Create a task from the given fields
    async fn create_task(&self, access_token: &str, task: &Map<String, Value>)
        -> ServiceResult<Task>;

    /// Update the given fields of a task; an explicit `null` clears a field
    async fn update_task(
        &self,
        access_token: &str,
        task_id: &str,
        updates: &Map<String, Value>,
    ) -> ServiceResult<Task>;

    /// Mark a task completed
    async fn complete_task(&self, access_token: &str, project_id: &str, task_id: &str)
        -> ServiceResult<()>;

    /// Delete a task
    async fn delete_task(&self, access_token: &str, project_id: &str, task_id: &str)
        -> ServiceResult<()>;

    // ------------------------------------------------------------------
    // Extended API
    // ------------------------------------------------------------------

    /// Full account state
    async fn batch_check(&self, session_token: &str) -> ServiceResult<BatchSnapshot>;

    /// Tasks completed between `from` and `to`
    async fn completed_tasks(
        &self,
        session_token: &str,
        from: &str,
        to: &str,
    ) -> ServiceResult<Vec<CompletedTask>>;

    /// Nest a task under a parent in the same project
    async fn make_subtask(
        &self,
        session_token: &str,
        task_id: &str,
        parent_id: &str,
        project_id: &str,
    ) -> ServiceResult<()>;

    /// Create a tag
    async fn create_tag(&self, session_token: &str, name: &str, color: Option<&str>)
        -> ServiceResult<()>;

    /// Rename a tag on every task
    async fn rename_tag(&self, session_token: &str, old_name: &str, new_name: &str)
        -> ServiceResult<()>;

    /// Delete a tag from every task
    async fn delete_tag(&self, session_token: &str, name: &str) -> ServiceResult<()>;

    /// Merge tag `from` into tag `to`
    async fn merge_tags(&self, session_token: &str, from: &str, to: &str) -> ServiceResult<()>;

    /// Sign in with account credentials and return a session token
    async fn sign_in(&self, username: &str, password: &str) -> ServiceResult<String>;
}
