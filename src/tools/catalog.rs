// ABOUTME: Tool catalog: selects the definitions for a feature level and dispatches calls
// ABOUTME: Never fails outward; every outcome is a JSON string the model can read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Catalog
//!
//! The catalog owns the static definitions, the backing-service handle and
//! the snapshot cache. Two catalog instances never share cache state.
//!
//! Dispatch rules:
//! - with [`FeatureLevel::Base`] only base tools resolve
//! - with [`FeatureLevel::Extended`] names in the extended-only set run the
//!   extended executor and every other name falls through to the base one
//! - a tool that writes clears the whole cache before it runs and again
//!   after it returns
//! - any failure is encoded as `{"error": "<message>"}`

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheConfig, InMemoryCache};
use crate::config::FeatureLevel;
use crate::errors::{AppResult, ToolError};
use crate::ticktick::{Credentials, TaskService};

use super::args::ToolArgs;
use super::context::ToolContext;
use super::definitions::{base_tools, extended_only_tools, ToolDefinition};
use super::{extended, flags, projects, tasks};

/// Static tool catalog bound to one backing service
pub struct ToolCatalog {
    service: Arc<dyn TaskService>,
    cache: InMemoryCache,
    ttl: Duration,
    base: Vec<ToolDefinition>,
    extended: Vec<ToolDefinition>,
    extended_names: HashSet<String>,
}

impl ToolCatalog {
    /// Create a catalog with its own snapshot cache
    #[must_use]
    pub fn new(service: Arc<dyn TaskService>, cache_config: &CacheConfig) -> Self {
        let base = base_tools();
        let extended_only = extended_only_tools();
        let extended_names = extended_only.iter().map(|t| t.name.clone()).collect();
        let extended = base.iter().cloned().chain(extended_only).collect();

        info!(
            base_tools = base.len(),
            ttl_secs = cache_config.ttl.as_secs(),
            "Tool catalog initialized"
        );

        Self {
            service,
            cache: InMemoryCache::new(cache_config),
            ttl: cache_config.ttl,
            base,
            extended,
            extended_names,
        }
    }

    /// Definitions offered to the model at `level`
    #[must_use]
    pub fn list(&self, level: FeatureLevel) -> &[ToolDefinition] {
        match level {
            FeatureLevel::Base => &self.base,
            FeatureLevel::Extended => &self.extended,
        }
    }

    /// Definition of `name` at `level`
    #[must_use]
    pub fn definition(&self, level: FeatureLevel, name: &str) -> Option<&ToolDefinition> {
        self.list(level).iter().find(|t| t.name == name)
    }

    /// Whether `name` only exists in the extended catalog
    #[must_use]
    pub fn is_extended_only(&self, name: &str) -> bool {
        self.extended_names.contains(name)
    }

    /// Snapshot cache owned by this catalog
    #[must_use]
    pub const fn cache(&self) -> &InMemoryCache {
        &self.cache
    }

    /// Run one tool and return its JSON result
    ///
    /// Never fails: unknown tools, bad arguments and service failures all
    /// come back as `{"error": "<message>"}`.
    #[instrument(skip(self, arguments, credentials), fields(tool = %name, level = %level))]
    pub async fn execute(
        &self,
        level: FeatureLevel,
        name: &str,
        arguments: &Map<String, Value>,
        credentials: &Credentials,
    ) -> String {
        match self.dispatch(level, name, arguments, credentials).await {
            Ok(result) => {
                debug!("Tool succeeded");
                result.to_string()
            }
            Err(error) => {
                warn!(code = ?error.code, message = %error.message, "Tool failed");
                json!({ "error": error.message }).to_string()
            }
        }
    }

    async fn dispatch(
        &self,
        level: FeatureLevel,
        name: &str,
        arguments: &Map<String, Value>,
        credentials: &Credentials,
    ) -> AppResult<Value> {
        let definition = self
            .definition(level, name)
            .ok_or_else(|| ToolError::not_found(name))?;
        let writes = definition.writes_data();

        if writes {
            self.cache.invalidate().await;
        }

        let ctx = ToolContext {
            service: self.service.as_ref(),
            cache: &self.cache,
            ttl: self.ttl,
            credentials,
            args: ToolArgs::new(name, arguments),
        };

        let result = if level == FeatureLevel::Extended && self.is_extended_only(name) {
            run_extended(&ctx).await
        } else {
            run_base(&ctx).await
        };

        if writes {
            // A read that overlapped the write must not survive it
            self.cache.invalidate().await;
        }

        result
    }
}

async fn run_base(ctx: &ToolContext<'_>) -> AppResult<Value> {
    match ctx.args.tool() {
        "list_projects" => projects::list_projects(ctx).await,
        "get_project_tasks" => projects::get_project_tasks(ctx).await,
        "create_project" => projects::create_project(ctx).await,
        "update_project" => projects::update_project(ctx).await,
        "delete_project" => projects::delete_project(ctx).await,
        "get_task" => tasks::get_task(ctx).await,
        "create_task" => tasks::create_task(ctx).await,
        "update_task" => tasks::update_task(ctx).await,
        "complete_task" => tasks::complete_task(ctx).await,
        "delete_task" => tasks::delete_task(ctx).await,
        "move_task" => tasks::move_task(ctx).await,
        "flag_task" => flags::flag_task(ctx).await,
        "unflag_task" => flags::unflag_task(ctx).await,
        "get_flagged_tasks" => flags::get_flagged_tasks(ctx).await,
        other => Err(ToolError::not_found(other).into()),
    }
}

async fn run_extended(ctx: &ToolContext<'_>) -> AppResult<Value> {
    match ctx.args.tool() {
        "filter_tasks" => extended::filter_tasks(ctx).await,
        "get_completed_tasks" => extended::get_completed_tasks(ctx).await,
        "make_subtask" => extended::make_subtask(ctx).await,
        "get_all_tags" => extended::get_all_tags(ctx).await,
        "create_tag" => extended::create_tag(ctx).await,
        "rename_tag" => extended::rename_tag(ctx).await,
        "delete_tag" => extended::delete_tag(ctx).await,
        "merge_tags" => extended::merge_tags(ctx).await,
        "batch_sync" => extended::batch_sync(ctx).await,
        other => Err(ToolError::not_found(other).into()),
    }
}
