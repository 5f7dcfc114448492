// ABOUTME: reqwest implementation of TaskService for the TickTick base and extended APIs
// ABOUTME: Maps non-success statuses and undecodable bodies onto ServiceError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument, warn};

use super::{
    BatchSnapshot, CompletedTask, Project, ProjectData, ServiceError, ServiceResult, Task,
    TaskService,
};
use crate::constants::ticktick::{
    COMPLETED_TASKS_LIMIT, REQUEST_TIMEOUT_SECS, SESSION_HEADER, V1_BASE_URL, V2_BASE_URL,
};
use crate::errors::{AppError, AppResult};

/// Sign-in reply of the extended API
#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(rename = "_sessionToken", default)]
    session_token: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

/// Decode a success body; an empty body reads as `{}`
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> ServiceResult<T> {
    if body.trim().is_empty() {
        return serde_json::from_value(Value::Object(Map::new()))
            .map_err(|_| ServiceError::invalid_json(body));
    }
    serde_json::from_str(body).map_err(|_| ServiceError::invalid_json(body))
}

/// HTTP client for the TickTick APIs
#[derive(Debug, Clone)]
pub struct TickTickClient {
    client: Client,
    base_url: String,
    v2_base_url: String,
}

impl TickTickClient {
    /// Create a client against the public endpoints
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn with_defaults() -> AppResult<Self> {
        Self::new(V1_BASE_URL, V2_BASE_URL)
    }

    /// Create a client against custom base URLs (e.g. a relay)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(base_url: impl Into<String>, v2_base_url: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url, v2_base_url))
    }

    /// Wrap an existing reqwest client
    #[must_use]
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        v2_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            v2_base_url: v2_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn v1(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn v2(&self, path: &str) -> String {
        format!("{}/{path}", self.v2_base_url)
    }

    fn authorized(builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder.bearer_auth(access_token)
    }

    fn session(builder: RequestBuilder, session_token: &str) -> RequestBuilder {
        builder.header(SESSION_HEADER, session_token)
    }

    /// Send and return the body text of a success response
    async fn send_raw(builder: RequestBuilder, operation: &str) -> ServiceResult<String> {
        let response = builder
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                operation: operation.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "TickTick request failed");
            return Err(ServiceError::status(operation, status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|source| ServiceError::Transport {
                operation: operation.to_owned(),
                source,
            })
    }

    async fn send_json<T: DeserializeOwned>(
        builder: RequestBuilder,
        operation: &str,
    ) -> ServiceResult<T> {
        let body = Self::send_raw(builder, operation).await?;
        debug!(operation, body_len = body.len(), "TickTick request succeeded");
        decode_body(&body)
    }

    async fn send_unit(builder: RequestBuilder, operation: &str) -> ServiceResult<()> {
        Self::send_raw(builder, operation).await.map(|_| ())
    }
}

#[async_trait]
impl TaskService for TickTickClient {
    #[instrument(skip(self, access_token))]
    async fn list_projects(&self, access_token: &str) -> ServiceResult<Vec<Project>> {
        let request = Self::authorized(self.client.get(self.v1("project")), access_token);
        Self::send_json(request, "fetch projects").await
    }

    #[instrument(skip(self, access_token))]
    async fn project_data(
        &self,
        access_token: &str,
        project_id: &str,
    ) -> ServiceResult<ProjectData> {
        let url = self.v1(&format!("project/{project_id}/data"));
        let request = Self::authorized(self.client.get(url), access_token);
        Self::send_json(request, "fetch project data").await
    }

    #[instrument(skip(self, access_token))]
    async fn get_task(
        &self,
        access_token: &str,
        project_id: &str,
        task_id: &str,
    ) -> ServiceResult<Task> {
        let url = self.v1(&format!("project/{project_id}/task/{task_id}"));
        let request = Self::authorized(self.client.get(url), access_token);
        Self::send_json(request, "fetch task").await
    }

    #[instrument(skip(self, access_token, project))]
    async fn create_project(
        &self,
        access_token: &str,
        project: &Map<String, Value>,
    ) -> ServiceResult<Project> {
        let request = Self::authorized(self.client.post(self.v1("project")), access_token)
            .json(project);
        Self::send_json(request, "create project").await
    }

    #[instrument(skip(self, access_token, updates))]
    async fn update_project(
        &self,
        access_token: &str,
        project_id: &str,
        updates: &Map<String, Value>,
    ) -> ServiceResult<Project> {
        let url = self.v1(&format!("project/{project_id}"));
        let request = Self::authorized(self.client.post(url), access_token)
            .json(updates);
        Self::send_json(request, "update project").await
    }

    #[instrument(skip(self, access_token))]
    async fn delete_project(&self, access_token: &str, project_id: &str) -> ServiceResult<()> {
        let url = self.v1(&format!("project/{project_id}"));
        let request = Self::authorized(self.client.delete(url), access_token);
        Self::send_unit(request, "delete project").await
    }

    #[instrument(skip(self, access_token, task))]
    async fn create_task(
        &self,
        access_token: &str,
        task: &Map<String, Value>,
    ) -> ServiceResult<Task> {
        let request = Self::authorized(self.client.post(self.v1("task")), access_token)
            .json(task);
        Self::send_json(request, "create task").await
    }

    #[instrument(skip(self, access_token, updates))]
    async fn update_task(
        &self,
        access_token: &str,
        task_id: &str,
        updates: &Map<String, Value>,
    ) -> ServiceResult<Task> {
        let url = self.v1(&format!("task/{task_id}"));
        let request = Self::authorized(self.client.post(url), access_token)
            .json(updates);
        Self::send_json(request, "update task").await
    }

    #[instrument(skip(self, access_token))]
    async fn complete_task(
        &self,
        access_token: &str,
        project_id: &str,
        task_id: &str,
    ) -> ServiceResult<()> {
        let url = self.v1(&format!("project/{project_id}/task/{task_id}/complete"));
        let request = Self::authorized(self.client.post(url), access_token);
        Self::send_unit(request, "complete task").await
    }

    #[instrument(skip(self, access_token))]
    async fn delete_task(
        &self,
        access_token: &str,
        project_id: &str,
        task_id: &str,
    ) -> ServiceResult<()> {
        let url = self.v1(&format!("task/{project_id}/{task_id}"));
        let request = Self::authorized(self.client.delete(url), access_token);
        Self::send_unit(request, "delete task").await
    }

    #[instrument(skip(self, session_token))]
    async fn batch_check(&self, session_token: &str) -> ServiceResult<BatchSnapshot> {
        let request = Self::session(self.client.get(self.v2("batch/check/0")), session_token);
        Self::send_json(request, "sync account").await
    }

    #[instrument(skip(self, session_token))]
    async fn completed_tasks(
        &self,
        session_token: &str,
        from: &str,
        to: &str,
    ) -> ServiceResult<Vec<CompletedTask>> {
        let limit = COMPLETED_TASKS_LIMIT.to_string();
        let request = Self::session(
            self.client.get(self.v2("project/all/completedInAll/")),
            session_token,
        )
        .query(&[("from", from), ("to", to), ("limit", limit.as_str())]);
        Self::send_json(request, "fetch completed tasks").await
    }

    #[instrument(skip(self, session_token))]
    async fn make_subtask(
        &self,
        session_token: &str,
        task_id: &str,
        parent_id: &str,
        project_id: &str,
    ) -> ServiceResult<()> {
        let body = json!([{ "taskId": task_id, "parentId": parent_id, "projectId": project_id }]);
        let request = Self::session(self.client.post(self.v2("batch/taskParent")), session_token)
            .json(&body);
        Self::send_unit(request, "make subtask").await
    }

    #[instrument(skip(self, session_token))]
    async fn create_tag(
        &self,
        session_token: &str,
        name: &str,
        color: Option<&str>,
    ) -> ServiceResult<()> {
        let mut body = json!({ "label": name, "name": name.to_lowercase() });
        if let Some(color) = color {
            body["color"] = Value::String(color.to_owned());
        }
        let request = Self::session(self.client.post(self.v2("tag")), session_token)
            .json(&body);
        Self::send_unit(request, "create tag").await
    }

    #[instrument(skip(self, session_token))]
    async fn rename_tag(
        &self,
        session_token: &str,
        old_name: &str,
        new_name: &str,
    ) -> ServiceResult<()> {
        let request = Self::session(self.client.put(self.v2("tag/rename")), session_token)
            .json(&json!({ "name": old_name, "newName": new_name }));
        Self::send_unit(request, "rename tag").await
    }

    #[instrument(skip(self, session_token))]
    async fn delete_tag(&self, session_token: &str, name: &str) -> ServiceResult<()> {
        let request = Self::session(self.client.delete(self.v2("tag")), session_token)
            .json(&json!({ "name": name }));
        Self::send_unit(request, "delete tag").await
    }

    #[instrument(skip(self, session_token))]
    async fn merge_tags(&self, session_token: &str, from: &str, to: &str) -> ServiceResult<()> {
        let request = Self::session(self.client.put(self.v2("tag/merge")), session_token)
            .json(&json!({ "from": from, "to": to }));
        Self::send_unit(request, "merge tags").await
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, username: &str, password: &str) -> ServiceResult<String> {
        let request = self
            .client
            .post(self.v2("user/signon"))
            .query(&[("wc", "true"), ("remember", "true")])
            .json(&json!({ "username": username, "password": password }));
        let body = Self::send_raw(request, "sign in").await?;
        let reply: SignInResponse = decode_body(&body)?;
        reply
            .session_token
            .or(reply.token)
            .ok_or_else(|| ServiceError::invalid_json(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_decodes_as_empty_object() {
        let data: ProjectData = decode_body("").unwrap();
        assert!(data.tasks.is_empty());
    }

    #[test]
    fn test_garbage_body_is_invalid_json() {
        let error = decode_body::<ProjectData>("<html>bad gateway</html>").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid JSON response: <html>bad gateway</html>"
        );
    }

    #[test]
    fn test_base_urls_are_normalized() {
        let client = TickTickClient::with_client(
            Client::new(),
            "http://relay/api/ticktick/",
            "http://relay/api/ticktick-v2",
        );
        assert_eq!(client.v1("project"), "http://relay/api/ticktick/project");
        assert_eq!(client.v2("tag"), "http://relay/api/ticktick-v2/tag");
    }
}
