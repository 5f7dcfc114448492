// ABOUTME: Extended-API tools: cross-project filtering, completed tasks, subtasks and tags
// ABOUTME: Whole-account reads are served from the cached batch snapshot and re-filtered locally
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Extended Tools
//!
//! These tools need a session token. Read tools share one cached batch
//! snapshot per session and filter it in memory; write tools go straight to
//! the service (the catalog has already cleared the cache).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{json, Value};

use crate::constants::ticktick::{STATUS_COMPLETED, STATUS_OPEN};
use crate::errors::{AppResult, ToolError};
use crate::ticktick::{CompletedTask, Tag, Task};

use super::args::ToolArgs;
use super::context::ToolContext;

/// Label used when a task's project is missing from the snapshot
const UNKNOWN_PROJECT: &str = "Unknown";

// ============================================================================
// Date handling
// ============================================================================

/// Parse an ISO-8601 instant as sent by the model or the service
///
/// Accepts RFC 3339, the service's `+0000` offset form, and offset-less
/// date-times or plain dates (read as UTC).
#[must_use]
pub fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%z"] {
        if let Ok(instant) = DateTime::parse_from_str(value, format) {
            return Some(instant);
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

// ============================================================================
// filter_tasks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusFilter {
    Open,
    Completed,
    All,
}

impl StatusFilter {
    fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("open") => Self::Open,
            Some("completed") => Self::Completed,
            Some(_) => Self::All,
        }
    }

    const fn accepts(self, status: i64) -> bool {
        match self {
            Self::Open => status == STATUS_OPEN,
            Self::Completed => status == STATUS_COMPLETED,
            Self::All => true,
        }
    }
}

/// Criteria of one `filter_tasks` call
#[derive(Debug)]
struct TaskFilter<'a> {
    status: StatusFilter,
    project_id: Option<&'a str>,
    tag: Option<String>,
    priority: Option<i64>,
    due_before: Option<DateTime<FixedOffset>>,
    due_after: Option<DateTime<FixedOffset>>,
    search: Option<String>,
}

impl<'a> TaskFilter<'a> {
    fn from_args(args: &ToolArgs<'a>) -> Result<Self, ToolError> {
        let instant = |key: &str| -> Result<Option<DateTime<FixedOffset>>, ToolError> {
            args.optional_non_empty_str(key)?
                .map(|raw| {
                    parse_instant(raw).ok_or_else(|| {
                        ToolError::invalid_parameter(
                            args.tool(),
                            key,
                            format!("'{raw}' is not an ISO 8601 date"),
                        )
                    })
                })
                .transpose()
        };

        Ok(Self {
            status: StatusFilter::parse(args.optional_non_empty_str("status")?),
            project_id: args.optional_non_empty_str("projectId")?,
            tag: args
                .optional_non_empty_str("tag")?
                .map(str::to_lowercase),
            priority: args.optional_i64("priority")?,
            due_before: instant("dueBefore")?,
            due_after: instant("dueAfter")?,
            search: args
                .optional_non_empty_str("search")?
                .map(str::to_lowercase),
        })
    }

    fn matches(&self, task: &Task) -> bool {
        if !self.status.accepts(task.status) {
            return false;
        }
        if self.project_id.is_some_and(|id| task.project_id != id) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !task.tag_list().iter().any(|t| t.to_lowercase() == *tag) {
                return false;
            }
        }
        if self.priority.is_some_and(|p| task.priority != p) {
            return false;
        }
        if self.due_before.is_some() || self.due_after.is_some() {
            let Some(due) = task.due_date.as_deref().and_then(parse_instant) else {
                return false;
            };
            if self.due_before.is_some_and(|before| due > before)
                || self.due_after.is_some_and(|after| due < after)
            {
                return false;
            }
        }
        self.search
            .as_ref()
            .is_none_or(|needle| task.title.to_lowercase().contains(needle.as_str()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilteredTask<'a> {
    id: &'a str,
    title: &'a str,
    project_id: &'a str,
    project_name: &'a str,
    status: i64,
    priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<&'a str>,
}

/// `filter_tasks`: cross-project query over the cached snapshot
pub async fn filter_tasks(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let filter = TaskFilter::from_args(&ctx.args)?;
    let snapshot = ctx.batch_snapshot().await?;

    let matches: Vec<FilteredTask<'_>> = snapshot
        .tasks()
        .iter()
        .filter(|task| filter.matches(task))
        .map(|task| FilteredTask {
            id: &task.id,
            title: &task.title,
            project_id: &task.project_id,
            project_name: snapshot
                .project_name(&task.project_id)
                .unwrap_or(UNKNOWN_PROJECT),
            status: task.status,
            priority: task.priority,
            tags: task.tags.as_deref(),
            due_date: task.due_date.as_deref(),
            start_date: task.start_date.as_deref(),
            parent_id: task.parent_id.as_deref(),
        })
        .collect();

    Ok(serde_json::to_value(matches)?)
}

// ============================================================================
// Completed tasks and subtasks
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletedSummary<'a> {
    id: &'a str,
    title: &'a str,
    project_id: &'a str,
    priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_time: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<&'a str>,
}

impl<'a> From<&'a CompletedTask> for CompletedSummary<'a> {
    fn from(task: &'a CompletedTask) -> Self {
        Self {
            id: &task.id,
            title: &task.title,
            project_id: &task.project_id,
            priority: task.priority,
            tags: task.tags.as_deref(),
            completed_time: task.completed_time.as_deref(),
            due_date: task.due_date.as_deref(),
        }
    }
}

/// `get_completed_tasks`
pub async fn get_completed_tasks(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let session = ctx.session_token()?;
    let from = ctx.args.required_str("from")?;
    let to = ctx.args.required_str("to")?;

    let tasks = ctx.service.completed_tasks(session, from, to).await?;
    let summaries: Vec<CompletedSummary<'_>> = tasks.iter().map(CompletedSummary::from).collect();
    Ok(serde_json::to_value(summaries)?)
}

/// `make_subtask`
pub async fn make_subtask(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let session = ctx.session_token()?;
    let task_id = ctx.args.required_str("taskId")?;
    let parent_id = ctx.args.required_str("parentId")?;
    let project_id = ctx.args.required_str("projectId")?;

    ctx.service
        .make_subtask(session, task_id, parent_id, project_id)
        .await?;
    Ok(json!({ "success": true }))
}

// ============================================================================
// Tags
// ============================================================================

#[derive(Serialize)]
struct TagSummary<'a> {
    name: &'a str,
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
}

impl<'a> From<&'a Tag> for TagSummary<'a> {
    fn from(tag: &'a Tag) -> Self {
        Self {
            name: &tag.name,
            label: &tag.label,
            color: tag.color.as_deref(),
        }
    }
}

/// `get_all_tags`
pub async fn get_all_tags(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let snapshot = ctx.batch_snapshot().await?;
    let tags: Vec<TagSummary<'_>> = snapshot.tags.iter().map(TagSummary::from).collect();
    Ok(serde_json::to_value(tags)?)
}

/// `create_tag`
pub async fn create_tag(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let session = ctx.session_token()?;
    let name = ctx.args.required_str("name")?;
    let color = ctx.args.optional_str("color")?;

    ctx.service.create_tag(session, name, color).await?;
    Ok(json!({ "success": true, "name": name }))
}

/// `rename_tag`
pub async fn rename_tag(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let session = ctx.session_token()?;
    let old_name = ctx.args.required_str("oldName")?;
    let new_name = ctx.args.required_str("newName")?;

    ctx.service.rename_tag(session, old_name, new_name).await?;
    Ok(json!({ "success": true }))
}

/// `delete_tag`
pub async fn delete_tag(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let session = ctx.session_token()?;
    let name = ctx.args.required_str("name")?;

    ctx.service.delete_tag(session, name).await?;
    Ok(json!({ "success": true }))
}

/// `merge_tags`
pub async fn merge_tags(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let session = ctx.session_token()?;
    let from = ctx.args.required_str("from")?;
    let to = ctx.args.required_str("to")?;

    ctx.service.merge_tags(session, from, to).await?;
    Ok(json!({ "success": true }))
}

// ============================================================================
// batch_sync
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectCount<'a> {
    id: &'a str,
    name: &'a str,
    task_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncOverview<'a> {
    total_open_tasks: usize,
    projects: Vec<ProjectCount<'a>>,
    tags: Vec<TagSummary<'a>>,
}

/// `batch_sync`: open-task counts per project plus every tag
pub async fn batch_sync(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let snapshot = ctx.batch_snapshot().await?;
    let open: Vec<&Task> = snapshot.tasks().iter().filter(|t| t.is_open()).collect();

    let overview = SyncOverview {
        total_open_tasks: open.len(),
        projects: snapshot
            .project_profiles
            .iter()
            .map(|project| ProjectCount {
                id: &project.id,
                name: &project.name,
                task_count: open.iter().filter(|t| t.project_id == project.id).count(),
            })
            .collect(),
        tags: snapshot.tags.iter().map(TagSummary::from).collect(),
    };

    Ok(serde_json::to_value(overview)?)
}
