// ABOUTME: Task tools of the base catalog (get, create, update, complete, delete, move)
// ABOUTME: Dates, reminders and recurrence rules are forwarded verbatim to the service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde_json::{json, Map, Value};

use crate::errors::AppResult;

use super::context::ToolContext;

/// Optional task fields accepted by `create_task` and `update_task`
const TASK_FIELDS: &[&str] = &[
    "title",
    "content",
    "desc",
    "priority",
    "dueDate",
    "startDate",
    "isAllDay",
    "timeZone",
    "tags",
    "reminders",
    "repeatFlag",
    "items",
];

/// `get_task`: full detail of one task
pub async fn get_task(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let project_id = ctx.args.required_str("projectId")?;
    let task_id = ctx.args.required_str("taskId")?;
    let task = ctx
        .service
        .get_task(ctx.access_token(), project_id, task_id)
        .await?;
    Ok(serde_json::to_value(task)?)
}

/// `create_task`
pub async fn create_task(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let project_id = ctx.args.required_str("projectId")?;
    ctx.args.required_str("title")?;

    let mut body = Map::new();
    body.insert("projectId".to_owned(), Value::String(project_id.to_owned()));
    ctx.args.copy_present(TASK_FIELDS, &mut body);

    let task = ctx.service.create_task(ctx.access_token(), &body).await?;
    Ok(serde_json::to_value(task)?)
}

/// `update_task`: always carries `projectId`, plus the fields the model supplied
pub async fn update_task(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let task_id = ctx.args.required_str("taskId")?;
    let project_id = ctx.args.required_str("projectId")?;

    let mut updates = Map::new();
    updates.insert("projectId".to_owned(), Value::String(project_id.to_owned()));
    ctx.args.copy_present(TASK_FIELDS, &mut updates);

    let task = ctx
        .service
        .update_task(ctx.access_token(), task_id, &updates)
        .await?;
    Ok(serde_json::to_value(task)?)
}

/// `complete_task`
pub async fn complete_task(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let task_id = ctx.args.required_str("taskId")?;
    let project_id = ctx.args.required_str("projectId")?;
    ctx.service
        .complete_task(ctx.access_token(), project_id, task_id)
        .await?;
    Ok(json!({ "success": true }))
}

/// `delete_task`
pub async fn delete_task(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let task_id = ctx.args.required_str("taskId")?;
    let project_id = ctx.args.required_str("projectId")?;
    ctx.service
        .delete_task(ctx.access_token(), project_id, task_id)
        .await?;
    Ok(json!({ "success": true }))
}

/// `move_task`: rewrites the task's project
pub async fn move_task(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let task_id = ctx.args.required_str("taskId")?;
    let to_project_id = ctx.args.required_str("toProjectId")?;

    let mut updates = Map::new();
    updates.insert(
        "projectId".to_owned(),
        Value::String(to_project_id.to_owned()),
    );

    let task = ctx
        .service
        .update_task(ctx.access_token(), task_id, &updates)
        .await?;
    Ok(serde_json::to_value(task)?)
}
