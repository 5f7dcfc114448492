// ABOUTME: Flag tools: a task is flagged when it carries the "flagged" tag
// ABOUTME: Flagging is idempotent and the flagged listing walks every cached project
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::constants::ticktick::FLAGGED_TAG;
use crate::errors::AppResult;

use super::context::ToolContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FlaggedTask<'a> {
    id: &'a str,
    title: &'a str,
    project_id: &'a str,
    project_name: &'a str,
    priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<&'a str>,
}

/// Current tags of a task; empty when the project does not contain it
async fn current_tags(
    ctx: &ToolContext<'_>,
    project_id: &str,
    task_id: &str,
) -> AppResult<Vec<String>> {
    let data = ctx
        .service
        .project_data(ctx.access_token(), project_id)
        .await?;
    Ok(data
        .tasks
        .into_iter()
        .find(|task| task.id == task_id)
        .and_then(|task| task.tags)
        .unwrap_or_default())
}

async fn write_tags(
    ctx: &ToolContext<'_>,
    project_id: &str,
    task_id: &str,
    tags: &[String],
) -> AppResult<Value> {
    let mut updates = Map::new();
    updates.insert("tags".to_owned(), json!(tags));
    updates.insert("projectId".to_owned(), Value::String(project_id.to_owned()));
    let task = ctx
        .service
        .update_task(ctx.access_token(), task_id, &updates)
        .await?;
    Ok(serde_json::to_value(task)?)
}

/// `flag_task`: adds the flag tag unless already present
pub async fn flag_task(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let task_id = ctx.args.required_str("taskId")?;
    let project_id = ctx.args.required_str("projectId")?;

    let mut tags = current_tags(ctx, project_id, task_id).await?;
    if tags.iter().any(|tag| tag == FLAGGED_TAG) {
        return Ok(json!({ "message": "Task is already flagged" }));
    }
    tags.push(FLAGGED_TAG.to_owned());
    write_tags(ctx, project_id, task_id, &tags).await
}

/// `unflag_task`: removes the flag tag; a no-op filter when absent
pub async fn unflag_task(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let task_id = ctx.args.required_str("taskId")?;
    let project_id = ctx.args.required_str("projectId")?;

    let mut tags = current_tags(ctx, project_id, task_id).await?;
    tags.retain(|tag| tag != FLAGGED_TAG);
    write_tags(ctx, project_id, task_id, &tags).await
}

/// `get_flagged_tasks`: open flagged tasks of every project
///
/// Projects come from the snapshot cache; a project whose tasks fail to
/// load is skipped rather than failing the whole listing.
pub async fn get_flagged_tasks(ctx: &ToolContext<'_>) -> AppResult<Value> {
    let projects = ctx.projects().await?;
    let mut flagged = Vec::new();

    for project in &projects {
        match ctx
            .service
            .project_data(ctx.access_token(), &project.id)
            .await
        {
            Ok(data) => {
                for task in data.tasks.iter().filter(|t| t.is_flagged() && t.is_open()) {
                    flagged.push(serde_json::to_value(FlaggedTask {
                        id: &task.id,
                        title: &task.title,
                        project_id: &task.project_id,
                        project_name: &project.name,
                        priority: task.priority,
                        due_date: task.due_date.as_deref(),
                    })?);
                }
            }
            Err(error) => {
                debug!(project_id = %project.id, %error, "Skipping project that failed to load");
            }
        }
    }

    Ok(Value::Array(flagged))
}
