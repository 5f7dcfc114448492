// ABOUTME: Static tool definitions for the base and extended TickTick catalogs
// ABOUTME: Each definition carries its JSON schema, confirmation flag and capability bits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Definitions
//!
//! Definitions are built once when the catalog is created and never mutated.
//! Parameter schemas are plain JSON Schema objects; a property type written as
//! `["string", "null"]` means the value may be omitted or sent as `null` to
//! clear a field on the service.

use bitflags::bitflags;
use serde::Serialize;
use serde_json::{json, Value};

bitflags! {
    /// Capabilities a tool declares for routing and cache decisions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ToolCapabilities: u8 {
        /// Tool reads service state
        const READS_DATA = 0b0001;
        /// Tool mutates service state (invalidates the snapshot cache)
        const WRITES_DATA = 0b0010;
        /// Tool needs the extended (session) API
        const EXTENDED = 0b0100;
    }
}

impl ToolCapabilities {
    /// Check if tool reads data
    #[must_use]
    pub const fn reads_data(self) -> bool {
        self.contains(Self::READS_DATA)
    }

    /// Check if tool writes data (drives cache invalidation)
    #[must_use]
    pub const fn writes_data(self) -> bool {
        self.contains(Self::WRITES_DATA)
    }

    /// Check if tool needs the extended API
    #[must_use]
    pub const fn is_extended(self) -> bool {
        self.contains(Self::EXTENDED)
    }

    /// Get a description of all enabled capabilities for logging
    #[must_use]
    pub fn describe(self) -> String {
        let mut parts = Vec::new();
        if self.reads_data() {
            parts.push("reads_data");
        }
        if self.writes_data() {
            parts.push("writes_data");
        }
        if self.is_extended() {
            parts.push("extended");
        }
        if parts.is_empty() {
            "none".to_owned()
        } else {
            parts.join(", ")
        }
    }
}

/// A tool the model may call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Natural-language description shown to the model
    pub description: String,
    /// JSON Schema of the arguments object
    pub parameters: Value,
    /// Whether the user must approve each call
    pub requires_confirmation: bool,
    /// Routing and cache capabilities
    #[serde(skip)]
    pub capabilities: ToolCapabilities,
}

impl ToolDefinition {
    /// Create a read-only definition that needs no confirmation
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            requires_confirmation: false,
            capabilities: ToolCapabilities::READS_DATA,
        }
    }

    /// Mark the tool as mutating
    #[must_use]
    pub fn writes(mut self) -> Self {
        self.capabilities = (self.capabilities - ToolCapabilities::READS_DATA)
            | ToolCapabilities::WRITES_DATA;
        self
    }

    /// Require user confirmation before each call
    #[must_use]
    pub fn requiring_confirmation(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }

    /// Check if calls to this tool mutate service state
    #[must_use]
    pub const fn writes_data(&self) -> bool {
        self.capabilities.writes_data()
    }

    fn extended(mut self) -> Self {
        self.capabilities |= ToolCapabilities::EXTENDED;
        self
    }
}

fn object(properties: Value, required: &[&str]) -> Value {
    if required.is_empty() {
        json!({ "type": "object", "properties": properties })
    } else {
        json!({ "type": "object", "properties": properties, "required": required })
    }
}

fn task_and_project() -> Value {
    object(
        json!({
            "taskId": { "type": "string", "description": "The task ID" },
            "projectId": { "type": "string", "description": "The project ID" }
        }),
        &["taskId", "projectId"],
    )
}

fn checklist_items(with_id: bool, description: &str) -> Value {
    let mut properties = json!({
        "title": { "type": "string", "description": "Subtask title" },
        "status": { "type": "number", "description": "0=unchecked, 1=checked" }
    });
    if with_id {
        properties["id"] = json!({
            "type": "string",
            "description": "Subtask ID (omit for new subtasks)"
        });
    }
    json!({
        "type": "array",
        "items": { "type": "object", "properties": properties, "required": ["title"] },
        "description": description
    })
}

// ============================================================================
// Base catalog
// ============================================================================

/// Tools backed by the base (OAuth) API, in catalog order
#[must_use]
pub fn base_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "list_projects",
            "Get all TickTick projects/lists. Returns project names and IDs.",
            object(json!({}), &[]),
        ),
        ToolDefinition::new(
            "get_project_tasks",
            "Get all tasks in a specific project by project ID.",
            object(
                json!({
                    "projectId": { "type": "string", "description": "The project ID to get tasks for" }
                }),
                &["projectId"],
            ),
        ),
        ToolDefinition::new(
            "create_project",
            "Create a new project/list.",
            object(
                json!({
                    "name": { "type": "string", "description": "Project name" },
                    "color": { "type": "string", "description": "Color hex code (e.g. \"#ff6161\")" },
                    "viewMode": { "type": "string", "description": "View mode: \"list\", \"kanban\", or \"timeline\"" },
                    "kind": { "type": "string", "description": "\"TASK\" for task list, \"NOTE\" for note list" }
                }),
                &["name"],
            ),
        )
        .writes(),
        ToolDefinition::new(
            "update_project",
            "Update a project: rename, change color, view mode, etc.",
            object(
                json!({
                    "projectId": { "type": "string", "description": "The project ID to update" },
                    "name": { "type": "string", "description": "New project name" },
                    "color": { "type": "string", "description": "New color hex code" },
                    "viewMode": { "type": "string", "description": "New view mode: \"list\", \"kanban\", or \"timeline\"" }
                }),
                &["projectId"],
            ),
        )
        .writes(),
        ToolDefinition::new(
            "delete_project",
            "Delete a project and all its tasks. This is destructive and cannot be undone; the user will be asked to confirm.",
            object(
                json!({
                    "projectId": { "type": "string", "description": "The project ID to delete" },
                    "name": { "type": "string", "description": "Project name (for confirmation display)" }
                }),
                &["projectId"],
            ),
        )
        .writes()
        .requiring_confirmation(),
        ToolDefinition::new(
            "get_task",
            "Get a single task by project ID and task ID. Returns full task details including subtasks, reminders, and recurrence.",
            object(
                json!({
                    "projectId": { "type": "string", "description": "The project ID" },
                    "taskId": { "type": "string", "description": "The task ID" }
                }),
                &["projectId", "taskId"],
            ),
        ),
        ToolDefinition::new(
            "create_task",
            "Create a new task in a project.",
            object(
                json!({
                    "projectId": { "type": "string", "description": "The project ID to create the task in" },
                    "title": { "type": "string", "description": "Task title" },
                    "content": { "type": "string", "description": "Task description/notes (plain text)" },
                    "desc": { "type": "string", "description": "Task description (rich text/markdown)" },
                    "priority": { "type": "number", "description": "Priority: 0=none, 1=low, 3=medium, 5=high" },
                    "dueDate": { "type": ["string", "null"], "description": "Due date in ISO 8601 format (e.g. \"2026-02-20T16:00:00.000+0000\")" },
                    "startDate": { "type": ["string", "null"], "description": "Start date in ISO 8601 format" },
                    "isAllDay": { "type": "boolean", "description": "True if the due date is all-day (no specific time)" },
                    "timeZone": { "type": "string", "description": "Timezone (e.g. \"Europe/Sofia\", \"America/New_York\")" },
                    "tags": { "type": "array", "items": { "type": "string" }, "description": "Tags to assign to the task" },
                    "reminders": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Reminder triggers in iCal format (e.g. \"TRIGGER:P0DT9H0M0S\" for 9am, \"TRIGGER:-PT15M\" for 15 min before)"
                    },
                    "repeatFlag": {
                        "type": "string",
                        "description": "Recurrence rule in iCal RRULE format (e.g. \"RRULE:FREQ=DAILY;INTERVAL=1\", \"RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR\")"
                    },
                    "items": checklist_items(false, "Subtask/checklist items")
                }),
                &["projectId", "title"],
            ),
        )
        .writes(),
        ToolDefinition::new(
            "update_task",
            "Update a task: rename, change description, priority, due date, tags, reminders, recurrence, subtasks, etc.",
            object(
                json!({
                    "taskId": { "type": "string", "description": "The task ID" },
                    "projectId": { "type": "string", "description": "The project ID the task currently belongs to" },
                    "title": { "type": "string", "description": "New task title" },
                    "content": { "type": "string", "description": "New task description (plain text)" },
                    "desc": { "type": "string", "description": "New task description (rich text/markdown)" },
                    "priority": { "type": "number", "description": "New priority: 0=none, 1=low, 3=medium, 5=high" },
                    "dueDate": { "type": ["string", "null"], "description": "Due date in ISO 8601 format, or null to remove" },
                    "startDate": { "type": ["string", "null"], "description": "Start date in ISO 8601 format, or null to remove" },
                    "isAllDay": { "type": "boolean", "description": "True if the due date is all-day (no specific time)" },
                    "timeZone": { "type": "string", "description": "Timezone for the due date" },
                    "tags": { "type": "array", "items": { "type": "string" }, "description": "Replace all tags on the task" },
                    "reminders": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Replace all reminders (iCal TRIGGER format), or empty array to remove all"
                    },
                    "repeatFlag": {
                        "type": ["string", "null"],
                        "description": "Recurrence rule in iCal RRULE format, or null to remove recurrence"
                    },
                    "items": checklist_items(true, "Replace all subtask/checklist items")
                }),
                &["taskId", "projectId"],
            ),
        )
        .writes(),
        ToolDefinition::new(
            "complete_task",
            "Mark a task as completed.",
            task_and_project(),
        )
        .writes(),
        ToolDefinition::new(
            "delete_task",
            "Delete a task. This is destructive and cannot be undone; the user will be asked to confirm.",
            object(
                json!({
                    "taskId": { "type": "string", "description": "The task ID" },
                    "projectId": { "type": "string", "description": "The project ID" },
                    "title": { "type": "string", "description": "Task title (for confirmation display)" }
                }),
                &["taskId", "projectId"],
            ),
        )
        .writes()
        .requiring_confirmation(),
        ToolDefinition::new(
            "move_task",
            "Move a task from one project to another.",
            object(
                json!({
                    "taskId": { "type": "string", "description": "The task ID to move" },
                    "fromProjectId": { "type": "string", "description": "The project ID the task currently belongs to" },
                    "toProjectId": { "type": "string", "description": "The target project ID to move the task to" }
                }),
                &["taskId", "fromProjectId", "toProjectId"],
            ),
        )
        .writes(),
        ToolDefinition::new(
            "flag_task",
            "Flag a task by adding the \"flagged\" tag. Flagged tasks can be listed with get_flagged_tasks.",
            task_and_project(),
        )
        .writes(),
        ToolDefinition::new(
            "unflag_task",
            "Unflag a task by removing the \"flagged\" tag.",
            task_and_project(),
        )
        .writes(),
        ToolDefinition::new(
            "get_flagged_tasks",
            "Get all tasks across all projects that have the \"flagged\" tag.",
            object(json!({}), &[]),
        ),
    ]
}

// ============================================================================
// Extended-only tools
// ============================================================================

/// Tools that only exist with the extended (session) API, in catalog order
#[must_use]
pub fn extended_only_tools() -> Vec<ToolDefinition> {
    let tools = vec![
        ToolDefinition::new(
            "filter_tasks",
            "Filter tasks across ALL projects. Supports filtering by status, project, tag, priority, and date range. Much more powerful than get_project_tasks since it works cross-project.",
            object(
                json!({
                    "status": { "type": "string", "description": "Filter by status: \"open\", \"completed\", or \"all\". Default: \"open\"" },
                    "projectId": { "type": "string", "description": "Filter to a specific project ID" },
                    "tag": { "type": "string", "description": "Filter by tag name" },
                    "priority": { "type": "number", "description": "Filter by priority: 0=none, 1=low, 3=medium, 5=high" },
                    "dueBefore": { "type": "string", "description": "Filter tasks due before this ISO date" },
                    "dueAfter": { "type": "string", "description": "Filter tasks due after this ISO date" },
                    "search": { "type": "string", "description": "Search in task title (case-insensitive)" }
                }),
                &[],
            ),
        ),
        ToolDefinition::new(
            "get_completed_tasks",
            "Get completed tasks across all projects within a date range. Use this when users ask about finished/done tasks.",
            object(
                json!({
                    "from": { "type": "string", "description": "Start date in ISO 8601 format (e.g. \"2026-02-01T00:00:00.000+0000\")" },
                    "to": { "type": "string", "description": "End date in ISO 8601 format (e.g. \"2026-02-17T23:59:59.000+0000\")" }
                }),
                &["from", "to"],
            ),
        ),
        ToolDefinition::new(
            "make_subtask",
            "Make a task a subtask of another task (create parent-child relationship). Both tasks must be in the same project.",
            object(
                json!({
                    "taskId": { "type": "string", "description": "The task ID to make a subtask" },
                    "parentId": { "type": "string", "description": "The parent task ID" },
                    "projectId": { "type": "string", "description": "The project ID both tasks belong to" }
                }),
                &["taskId", "parentId", "projectId"],
            ),
        )
        .writes(),
        ToolDefinition::new(
            "get_all_tags",
            "Get all tags in the user's TickTick account.",
            object(json!({}), &[]),
        ),
        ToolDefinition::new(
            "create_tag",
            "Create a new tag.",
            object(
                json!({
                    "name": { "type": "string", "description": "Tag name" },
                    "color": { "type": "string", "description": "Tag color (hex code)" }
                }),
                &["name"],
            ),
        )
        .writes(),
        ToolDefinition::new(
            "rename_tag",
            "Rename an existing tag. All tasks with this tag will be updated.",
            object(
                json!({
                    "oldName": { "type": "string", "description": "Current tag name" },
                    "newName": { "type": "string", "description": "New tag name" }
                }),
                &["oldName", "newName"],
            ),
        )
        .writes(),
        ToolDefinition::new(
            "delete_tag",
            "Delete a tag. The tag will be removed from all tasks.",
            object(
                json!({
                    "name": { "type": "string", "description": "Tag name to delete" }
                }),
                &["name"],
            ),
        )
        .writes()
        .requiring_confirmation(),
        ToolDefinition::new(
            "merge_tags",
            "Merge one tag into another. All tasks with the source tag will get the target tag instead.",
            object(
                json!({
                    "from": { "type": "string", "description": "Source tag name (will be removed)" },
                    "to": { "type": "string", "description": "Target tag name (will be kept)" }
                }),
                &["from", "to"],
            ),
        )
        .writes(),
        ToolDefinition::new(
            "batch_sync",
            "Get a full overview of all tasks, projects, and tags. Returns task count, all projects, and all tags. Useful for getting a big picture view.",
            object(json!({}), &[]),
        ),
    ];

    tools.into_iter().map(ToolDefinition::extended).collect()
}
