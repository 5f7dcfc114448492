// ABOUTME: Project tools of the base catalog (list, tasks of a project, create, update, delete)
// ABOUTME: Read tools project the service models; write tools forward only supplied fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::errors::AppResult;
use crate::ticktick::{ChecklistItem, Project, Task};

use super::context::ToolContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSummary<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
}

impl<'a> From<&'a Project> for ProjectSummary<'a> {
    fn from(project: &'a Project) -> Self {
        Self {
            id: &project.id,
            name: &project.name,
            color: project.color.as_deref(),
            kind: project.kind.as_deref(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectTask<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    status: i64,
    priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reminders: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repeat_flag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<&'a [ChecklistItem]>,
}

impl<'a> From<&'a Task> for ProjectTask<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: &task.id,
            title: &task.title,
            content: task.content.as_deref(),
            status: task.status,
            priority: task.priority,
            tags: task.tags.as_deref(),
            due_date: task.due_date.as_deref(),
            start_date: task.start_date.as_deref(),
            reminders: task.reminders.as_deref(),
            repeat_flag: task.repeat_flag.as_deref(),
            items: task.items.as_deref(),
        }
    }
}

/// `list_projects`: id, name, color and kind of every project
pub async fn list_projects(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let projects = ctx.projects().await?;
    let summaries: Vec<ProjectSummary<'_>> = projects.iter().map(ProjectSummary::from).collect();
    Ok(serde_json::to_value(summaries)?)
}

/// `get_project_tasks`: the tasks of one project
pub async fn get_project_tasks(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let project_id = ctx.args.required_str("projectId")?;
    let data = ctx
        .service
        .project_data(ctx.access_token(), project_id)
        .await?;
    let tasks: Vec<ProjectTask<'_>> = data.tasks.iter().map(ProjectTask::from).collect();
    Ok(serde_json::to_value(tasks)?)
}

/// `create_project`
pub async fn create_project(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let name = ctx.args.required_str("name")?;
    let mut body = Map::new();
    body.insert("name".to_owned(), Value::String(name.to_owned()));
    for key in ["color", "viewMode", "kind"] {
        if let Some(value) = ctx.args.get(key) {
            body.insert(key.to_owned(), value.clone());
        }
    }

    let project = ctx.service.create_project(ctx.access_token(), &body).await?;
    Ok(serde_json::to_value(project)?)
}

/// `update_project`: sends only the fields the model supplied
pub async fn update_project(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let project_id = ctx.args.required_str("projectId")?;
    let mut updates = Map::new();
    ctx.args
        .copy_present(&["name", "color", "viewMode"], &mut updates);

    let project = ctx
        .service
        .update_project(ctx.access_token(), project_id, &updates)
        .await?;
    Ok(serde_json::to_value(project)?)
}

/// `delete_project`
pub async fn delete_project(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let project_id = ctx.args.required_str("projectId")?;
    ctx.service
        .delete_project(ctx.access_token(), project_id)
        .await?;
    Ok(json!({ "success": true }))
}
