// ABOUTME: TickTick data models for the base and extended APIs
// ABOUTME: camelCase serde types that keep unknown fields so objects round-trip intact
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::ticktick::{FLAGGED_TAG, STATUS_OPEN};

/// A project (list)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project id
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Hex color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// `TASK` or `NOTE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// `list`, `kanban` or `timeline`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A checklist item inside a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Item id, absent for items not yet created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Item title
    #[serde(default)]
    pub title: String,
    /// 0 unchecked, 1 checked
    #[serde(default)]
    pub status: i64,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A task
///
/// Dates, reminders (`TRIGGER`) and recurrence (`RRULE`) are kept as the
/// strings the service sent; nothing here parses them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task id
    #[serde(default)]
    pub id: String,
    /// Owning project id
    #[serde(default)]
    pub project_id: String,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Plain-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Rich-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// 0 open, 2 completed
    #[serde(default)]
    pub status: i64,
    /// 0 none, 1 low, 3 medium, 5 high
    #[serde(default)]
    pub priority: i64,
    /// Tag names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Due date (ISO-8601 with offset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Start date (ISO-8601 with offset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// All-day flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    /// IANA timezone of the dates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// Reminder triggers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Vec<String>>,
    /// Recurrence rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_flag: Option<String>,
    /// Checklist items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ChecklistItem>>,
    /// Parent task id (extended API)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Completion time (extended API)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Tags as a slice, empty when the task has none
    #[must_use]
    pub fn tag_list(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    /// Whether the task carries the flag tag
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.tag_list().iter().any(|t| t == FLAGGED_TAG)
    }

    /// Whether the task is open
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.status == STATUS_OPEN
    }
}

/// A project together with its open tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    /// The project itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    /// Its tasks
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Project entry of a batch sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProject {
    /// Project id
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Hex color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Archived flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

/// A tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Lowercase identifier
    #[serde(default)]
    pub name: String,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Hex color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Task section of a batch sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncTaskBean {
    /// Every task of the account
    #[serde(default)]
    pub update: Vec<Task>,
}

/// Full account state returned by the extended API batch sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSnapshot {
    /// Tasks
    #[serde(default)]
    pub sync_task_bean: SyncTaskBean,
    /// Projects
    #[serde(default)]
    pub project_profiles: Vec<BatchProject>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Inbox project id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbox_id: Option<String>,
}

impl BatchSnapshot {
    /// All tasks of the snapshot
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.sync_task_bean.update
    }

    /// Project name for an id
    #[must_use]
    pub fn project_name(&self, project_id: &str) -> Option<&str> {
        self.project_profiles
            .iter()
            .find(|p| p.id == project_id)
            .map(|p| p.name.as_str())
    }
}

/// A completed task from the extended API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    /// Task id
    #[serde(default)]
    pub id: String,
    /// Owning project id
    #[serde(default)]
    pub project_id: String,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Status (2 for completed)
    #[serde(default)]
    pub status: i64,
    /// Priority
    #[serde(default)]
    pub priority: i64,
    /// Tag names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Completion time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<String>,
    /// Due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}
