// ABOUTME: Shared test utilities: fake task service, scripted model transport and wire fixtures
// ABOUTME: Every fake appends to one ordered event log so tests can assert effect ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::too_many_lines
)]
//! Shared test utilities for `ticktick_assistant`

use std::collections::{HashMap, HashSet, VecDeque};
use std::env;
use std::future;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use ticktick_assistant::cache::CacheConfig;
use ticktick_assistant::conversation::TurnObserver;
use ticktick_assistant::errors::{AppError, AppResult};
use ticktick_assistant::llm::{LlmRequest, LlmTransport, ToolCall, TransportResponse};
use ticktick_assistant::ticktick::{
    BatchProject, BatchSnapshot, CompletedTask, Credentials, Project, ProjectData, ServiceError,
    ServiceResult, SyncTaskBean, Tag, Task, TaskService,
};
use ticktick_assistant::tools::ToolCatalog;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Event log
// ============================================================================

/// Ordered record of side effects across every fake
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Events starting with `prefix`, in order
    pub fn filtered(&self, prefix: &str) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }

    pub fn count(&self, event: &str) -> usize {
        self.snapshot().iter().filter(|e| *e == event).count()
    }
}

// ============================================================================
// Fake task service
// ============================================================================

#[derive(Default)]
struct FakeState {
    projects: Vec<Project>,
    tasks: HashMap<String, Vec<Task>>,
    tags: Vec<Tag>,
    completed: Vec<CompletedTask>,
    failing_projects: HashSet<String>,
    fail_with_status: Option<u16>,
    task_updates: Vec<(String, Map<String, Value>)>,
    project_payloads: Vec<Map<String, Value>>,
    task_payloads: Vec<Map<String, Value>>,
}

/// In-memory `TaskService` recording every call as `service:<operation>`
#[derive(Clone)]
pub struct FakeTaskService {
    state: Arc<Mutex<FakeState>>,
    log: EventLog,
}

pub fn task(id: &str, project_id: &str, title: &str) -> Task {
    Task {
        id: id.to_owned(),
        project_id: project_id.to_owned(),
        title: title.to_owned(),
        ..Task::default()
    }
}

pub fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_owned(),
        name: name.to_owned(),
        ..Project::default()
    }
}

impl FakeTaskService {
    pub fn new(log: EventLog) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState::default())),
            log,
        }
    }

    /// Two projects with three open tasks and two tags
    pub fn with_sample_data(log: EventLog) -> Self {
        let service = Self::new(log);
        {
            let mut state = service.state.lock().unwrap();
            state.projects = vec![project("p1", "Work"), project("p2", "Home")];

            let mut report = task("t1", "p1", "Write quarterly report");
            report.priority = 5;
            report.tags = Some(vec!["flagged".to_owned(), "work".to_owned()]);
            report.due_date = Some("2026-03-01T09:00:00.000+0000".to_owned());

            let mut email = task("t2", "p1", "Email Bob");
            email.priority = 1;

            let mut milk = task("t3", "p2", "Buy milk");
            milk.priority = 3;
            milk.tags = Some(vec!["errand".to_owned()]);
            milk.due_date = Some("2026-02-20T18:00:00.000+0000".to_owned());

            state.tasks.insert("p1".to_owned(), vec![report, email]);
            state.tasks.insert("p2".to_owned(), vec![milk]);
            state.tags = vec![tag("work"), tag("errand"), tag("flagged")];
        }
        service
    }

    /// Make `project_data` fail for one project
    pub fn fail_project(&self, project_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_projects
            .insert(project_id.to_owned());
    }

    /// Make every call fail with the given HTTP status
    pub fn fail_everything(&self, status: u16) {
        self.state.lock().unwrap().fail_with_status = Some(status);
    }

    pub fn add_task(&self, task: Task) {
        self.state
            .lock()
            .unwrap()
            .tasks
            .entry(task.project_id.clone())
            .or_default()
            .push(task);
    }

    pub fn task_updates(&self) -> Vec<(String, Map<String, Value>)> {
        self.state.lock().unwrap().task_updates.clone()
    }

    pub fn created_projects(&self) -> Vec<Map<String, Value>> {
        self.state.lock().unwrap().project_payloads.clone()
    }

    pub fn created_tasks(&self) -> Vec<Map<String, Value>> {
        self.state.lock().unwrap().task_payloads.clone()
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.log.count(&format!("service:{operation}"))
    }

    fn enter(&self, operation: &str) -> ServiceResult<()> {
        self.log.push(format!("service:{operation}"));
        match self.state.lock().unwrap().fail_with_status {
            Some(status) => Err(ServiceError::status(operation, status)),
            None => Ok(()),
        }
    }

    fn all_tasks(&self) -> Vec<Task> {
        let state = self.state.lock().unwrap();
        let mut tasks: Vec<Task> = state.tasks.values().flatten().cloned().collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        tasks
    }
}

fn tag(name: &str) -> Tag {
    Tag {
        name: name.to_owned(),
        label: name.to_owned(),
        color: None,
    }
}

#[async_trait]
impl TaskService for FakeTaskService {
    async fn list_projects(&self, _access_token: &str) -> ServiceResult<Vec<Project>> {
        self.enter("list_projects")?;
        Ok(self.state.lock().unwrap().projects.clone())
    }

    async fn project_data(
        &self,
        _access_token: &str,
        project_id: &str,
    ) -> ServiceResult<ProjectData> {
        self.enter("project_data")?;
        let state = self.state.lock().unwrap();
        if state.failing_projects.contains(project_id) {
            return Err(ServiceError::status("fetch project data", 500));
        }
        Ok(ProjectData {
            project: state.projects.iter().find(|p| p.id == project_id).cloned(),
            tasks: state.tasks.get(project_id).cloned().unwrap_or_default(),
        })
    }

    async fn get_task(
        &self,
        _access_token: &str,
        project_id: &str,
        task_id: &str,
    ) -> ServiceResult<Task> {
        self.enter("get_task")?;
        self.state
            .lock()
            .unwrap()
            .tasks
            .get(project_id)
            .and_then(|tasks| tasks.iter().find(|t| t.id == task_id).cloned())
            .ok_or_else(|| ServiceError::status("fetch task", 404))
    }

    async fn create_project(
        &self,
        _access_token: &str,
        project: &Map<String, Value>,
    ) -> ServiceResult<Project> {
        self.enter("create_project")?;
        let mut state = self.state.lock().unwrap();
        state.project_payloads.push(project.clone());
        let name = project.get("name").and_then(Value::as_str).unwrap_or_default();
        let created = self::project(&format!("p{}", state.projects.len() + 1), name);
        state.projects.push(created.clone());
        Ok(created)
    }

    async fn update_project(
        &self,
        _access_token: &str,
        project_id: &str,
        updates: &Map<String, Value>,
    ) -> ServiceResult<Project> {
        self.enter("update_project")?;
        let mut state = self.state.lock().unwrap();
        let target = state
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| ServiceError::status("update project", 404))?;
        if let Some(name) = updates.get("name").and_then(Value::as_str) {
            name.clone_into(&mut target.name);
        }
        Ok(target.clone())
    }

    async fn delete_project(&self, _access_token: &str, project_id: &str) -> ServiceResult<()> {
        self.enter("delete_project")?;
        let mut state = self.state.lock().unwrap();
        state.projects.retain(|p| p.id != project_id);
        state.tasks.remove(project_id);
        Ok(())
    }

    async fn create_task(
        &self,
        _access_token: &str,
        payload: &Map<String, Value>,
    ) -> ServiceResult<Task> {
        self.enter("create_task")?;
        let project_id = payload
            .get("projectId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let title = payload.get("title").and_then(Value::as_str).unwrap_or_default();
        let created = task("new-task", &project_id, title);
        let mut state = self.state.lock().unwrap();
        state.task_payloads.push(payload.clone());
        state
            .tasks
            .entry(project_id)
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_task(
        &self,
        _access_token: &str,
        task_id: &str,
        updates: &Map<String, Value>,
    ) -> ServiceResult<Task> {
        self.enter("update_task")?;
        let mut state = self.state.lock().unwrap();
        state
            .task_updates
            .push((task_id.to_owned(), updates.clone()));

        let target_project = updates
            .get("projectId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let existing = state
            .tasks
            .values_mut()
            .flat_map(|tasks| tasks.iter_mut())
            .find(|t| t.id == task_id);

        let Some(existing) = existing else {
            return Ok(task(task_id, &target_project, ""));
        };
        if let Some(title) = updates.get("title").and_then(Value::as_str) {
            title.clone_into(&mut existing.title);
        }
        if let Some(tags) = updates.get("tags") {
            existing.tags = serde_json::from_value(tags.clone()).ok();
        }
        Ok(existing.clone())
    }

    async fn complete_task(
        &self,
        _access_token: &str,
        project_id: &str,
        task_id: &str,
    ) -> ServiceResult<()> {
        self.enter("complete_task")?;
        let mut state = self.state.lock().unwrap();
        if let Some(tasks) = state.tasks.get_mut(project_id) {
            for task in tasks.iter_mut().filter(|t| t.id == task_id) {
                task.status = 2;
            }
        }
        Ok(())
    }

    async fn delete_task(
        &self,
        _access_token: &str,
        project_id: &str,
        task_id: &str,
    ) -> ServiceResult<()> {
        self.enter("delete_task")?;
        let mut state = self.state.lock().unwrap();
        if let Some(tasks) = state.tasks.get_mut(project_id) {
            tasks.retain(|t| t.id != task_id);
        }
        Ok(())
    }

    async fn batch_check(&self, _session_token: &str) -> ServiceResult<BatchSnapshot> {
        self.enter("batch_check")?;
        let update = self.all_tasks();
        let state = self.state.lock().unwrap();
        Ok(BatchSnapshot {
            sync_task_bean: SyncTaskBean { update },
            project_profiles: state
                .projects
                .iter()
                .map(|p| BatchProject {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    ..BatchProject::default()
                })
                .collect(),
            tags: state.tags.clone(),
            inbox_id: None,
        })
    }

    async fn completed_tasks(
        &self,
        _session_token: &str,
        _from: &str,
        _to: &str,
    ) -> ServiceResult<Vec<CompletedTask>> {
        self.enter("completed_tasks")?;
        Ok(self.state.lock().unwrap().completed.clone())
    }

    async fn make_subtask(
        &self,
        _session_token: &str,
        _task_id: &str,
        _parent_id: &str,
        _project_id: &str,
    ) -> ServiceResult<()> {
        self.enter("make_subtask")
    }

    async fn create_tag(
        &self,
        _session_token: &str,
        name: &str,
        _color: Option<&str>,
    ) -> ServiceResult<()> {
        self.enter("create_tag")?;
        self.state.lock().unwrap().tags.push(tag(name));
        Ok(())
    }

    async fn rename_tag(
        &self,
        _session_token: &str,
        _old_name: &str,
        _new_name: &str,
    ) -> ServiceResult<()> {
        self.enter("rename_tag")
    }

    async fn delete_tag(&self, _session_token: &str, name: &str) -> ServiceResult<()> {
        self.enter("delete_tag")?;
        self.state.lock().unwrap().tags.retain(|t| t.name != name);
        Ok(())
    }

    async fn merge_tags(&self, _session_token: &str, _from: &str, _to: &str) -> ServiceResult<()> {
        self.enter("merge_tags")
    }

    async fn sign_in(&self, _username: &str, _password: &str) -> ServiceResult<String> {
        self.enter("sign_in")?;
        Ok("session-token".to_owned())
    }
}

/// Catalog over a fake service with the default cache settings
pub fn catalog_with(service: &FakeTaskService) -> Arc<ToolCatalog> {
    Arc::new(ToolCatalog::new(
        Arc::new(service.clone()),
        &CacheConfig::default(),
    ))
}

pub fn base_credentials() -> Credentials {
    Credentials::new("oauth-token", None)
}

pub fn extended_credentials() -> Credentials {
    Credentials::new("oauth-token", Some("session-token".to_owned()))
}

/// Arguments object from a JSON literal
pub fn args(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

// ============================================================================
// Scripted transport
// ============================================================================

/// Transport replaying canned replies, logging `llm:request` per call
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<TransportResponse>>,
    requests: Mutex<Vec<LlmRequest>>,
    hang_when_exhausted: bool,
    log: EventLog,
}

impl ScriptedTransport {
    pub fn new(log: EventLog, replies: Vec<TransportResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            hang_when_exhausted: false,
            log,
        }
    }

    /// Never answers once the script runs out
    pub fn hanging(log: EventLog, replies: Vec<TransportResponse>) -> Self {
        Self {
            hang_when_exhausted: true,
            ..Self::new(log, replies)
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmTransport for ScriptedTransport {
    async fn send(&self, request: &LlmRequest) -> AppResult<TransportResponse> {
        self.log.push("llm:request");
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(reply) => Ok(reply),
            None if self.hang_when_exhausted => future::pending().await,
            None => Err(AppError::internal("Scripted transport has no reply left")),
        }
    }
}

pub fn ok(body: &Value) -> TransportResponse {
    TransportResponse {
        status: 200,
        body: body.to_string(),
    }
}

pub fn status(code: u16, body: &str) -> TransportResponse {
    TransportResponse {
        status: code,
        body: body.to_owned(),
    }
}

// ============================================================================
// Vendor reply fixtures
// ============================================================================

pub fn anthropic_text(text: &str) -> Value {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
    })
}

/// `(id, name, input)` triples as `tool_use` blocks
pub fn anthropic_tool_use(calls: &[(&str, &str, Value)]) -> Value {
    let blocks: Vec<Value> = calls
        .iter()
        .map(|(id, name, input)| {
            json!({ "type": "tool_use", "id": id, "name": name, "input": input })
        })
        .collect();
    json!({
        "id": "msg_2",
        "type": "message",
        "role": "assistant",
        "content": blocks,
        "stop_reason": "tool_use",
    })
}

pub fn openai_text(text: &str) -> Value {
    json!({
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop",
        }],
    })
}

/// `(id, name, arguments)` triples with stringified arguments
pub fn openai_tool_calls(calls: &[(&str, &str, Value)]) -> Value {
    let tool_calls: Vec<Value> = calls
        .iter()
        .map(|(id, name, arguments)| {
            json!({
                "id": id,
                "type": "function",
                "function": { "name": name, "arguments": arguments.to_string() },
            })
        })
        .collect();
    json!({
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": null, "tool_calls": tool_calls },
            "finish_reason": "tool_calls",
        }],
    })
}

pub fn gemini_text(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP",
        }],
    })
}

/// `(name, args)` pairs as `functionCall` parts
pub fn gemini_function_calls(calls: &[(&str, Value)]) -> Value {
    let parts: Vec<Value> = calls
        .iter()
        .map(|(name, args)| json!({ "functionCall": { "name": name, "args": args } }))
        .collect();
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": parts },
            "finishReason": "STOP",
        }],
    })
}

// ============================================================================
// Observer
// ============================================================================

/// Observer logging `observer:<event>:<detail>` entries
pub struct LoggingObserver {
    log: EventLog,
    texts: Mutex<Vec<String>>,
    results: Mutex<Vec<(String, String, String)>>,
}

impl LoggingObserver {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            texts: Mutex::new(Vec::new()),
            results: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    /// `(call id, tool name, result)` in arrival order
    pub fn results(&self) -> Vec<(String, String, String)> {
        self.results.lock().unwrap().clone()
    }
}

impl TurnObserver for LoggingObserver {
    fn on_tool_call(&self, call: &ToolCall) {
        self.log.push(format!("observer:tool_call:{}", call.name));
    }

    fn on_tool_result(&self, call_id: &str, tool_name: &str, result: &str) {
        self.log.push(format!("observer:tool_result:{tool_name}"));
        self.results.lock().unwrap().push((
            call_id.to_owned(),
            tool_name.to_owned(),
            result.to_owned(),
        ));
    }

    fn on_confirmation(&self, call: &ToolCall, approved: bool) {
        self.log
            .push(format!("observer:confirmation:{}:{approved}", call.name));
    }

    fn on_text(&self, text: &str) {
        self.texts.lock().unwrap().push(text.to_owned());
    }
}
