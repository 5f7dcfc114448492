// ABOUTME: Integration tests for the tool loop against scripted model replies and a fake task service
// ABOUTME: Covers ordering, confirmation, cache invalidation, iteration cap, cancellation and failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use common::{
    anthropic_text, anthropic_tool_use, base_credentials, catalog_with, extended_credentials,
    gemini_function_calls, gemini_text, init_test_logging, ok, openai_text, openai_tool_calls,
    status, EventLog, FakeTaskService, LoggingObserver, ScriptedTransport,
};
use serde_json::{json, Value};
use ticktick_assistant::config::{FeatureLevel, LlmProviderType};
use ticktick_assistant::constants::tool_loop::{
    DEFAULT_MAX_ITERATIONS, MAX_ITERATIONS_TEXT, STOPPED_TEXT,
};
use ticktick_assistant::conversation::{
    ConfirmationGate, NoopObserver, ToolLoop, TurnObserver, TurnRequest, TurnStatus,
};
use ticktick_assistant::errors::ErrorCode;
use ticktick_assistant::llm::{
    Message, MessageContent, MessageRole, ProviderAdapter, ToolCall, TransportResponse,
};
use ticktick_assistant::ticktick::Credentials;
use ticktick_assistant::tools::ToolCatalog;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

const CANCEL_JSON: &str = r#"{"cancelled":true,"message":"User cancelled this action"}"#;

struct Harness {
    log: EventLog,
    service: FakeTaskService,
    transport: Arc<ScriptedTransport>,
    catalog: Arc<ToolCatalog>,
    tool_loop: ToolLoop,
}

fn harness_with(transport: ScriptedTransport, log: EventLog) -> Harness {
    init_test_logging();
    let service = FakeTaskService::with_sample_data(log.clone());
    let catalog = catalog_with(&service);
    let transport = Arc::new(transport);
    let tool_loop = ToolLoop::new(transport.clone(), catalog.clone());
    Harness {
        log,
        service,
        transport,
        catalog,
        tool_loop,
    }
}

fn harness(replies: Vec<TransportResponse>) -> Harness {
    let log = EventLog::default();
    harness_with(ScriptedTransport::new(log.clone(), replies), log)
}

impl Harness {
    fn request(&self, provider: LlmProviderType, level: FeatureLevel) -> TurnRequest {
        let credentials: Credentials = match level {
            FeatureLevel::Base => base_credentials(),
            FeatureLevel::Extended => extended_credentials(),
        };
        TurnRequest::new(
            ProviderAdapter::for_provider(provider, None),
            vec![
                Message::system("You manage tasks."),
                Message::user("Help me with my tasks"),
            ],
            self.catalog.list(level),
            "test-model",
            "test-key",
            credentials,
            level,
        )
    }
}

fn tool_results(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .filter(|m| m.role == MessageRole::Tool)
        .map(|m| match &m.content {
            MessageContent::Vendor(payload) => payload.value().clone(),
            MessageContent::Text(text) => panic!("tool result stored as text: {text}"),
        })
        .collect()
}

// ============================================================================
// Basic flow
// ============================================================================

#[tokio::test]
async fn test_text_reply_completes_turn() -> Result<()> {
    let h = harness(vec![ok(&anthropic_text("Nothing to do."))]);
    let observer = LoggingObserver::new(h.log.clone());

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::Claude, FeatureLevel::Base),
            &observer,
            None,
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(outcome.status, TurnStatus::Completed);
    assert_eq!(outcome.text, "Nothing to do.");
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.messages.len(), 3);
    assert_eq!(outcome.messages[2].role, MessageRole::Assistant);
    assert_eq!(observer.texts(), vec!["Nothing to do.".to_owned()]);

    let requests = h.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body["system"], "You manage tasks.");
    assert_eq!(requests[0].body["tools"].as_array().unwrap().len(), 14);
    Ok(())
}

#[tokio::test]
async fn test_openai_tool_call_is_executed_and_keyed_by_id() -> Result<()> {
    let h = harness(vec![
        ok(&openai_tool_calls(&[(
            "c1",
            "complete_task",
            json!({ "taskId": "t1", "projectId": "p1" }),
        )])),
        ok(&openai_text("Marked it done.")),
    ]);

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::OpenAi, FeatureLevel::Base),
            &NoopObserver,
            None,
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(outcome.text, "Marked it done.");
    assert_eq!(outcome.iterations, 2);
    assert_eq!(h.service.calls("complete_task"), 1);

    let results = tool_results(&outcome.messages);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["role"], "tool");
    assert_eq!(results[0]["tool_call_id"], "c1");
    assert_eq!(results[0]["content"], r#"{"success":true}"#);

    // The second request replays the assistant tool call and its result verbatim
    let second = &h.transport.requests()[1].body["messages"];
    let sent = second.as_array().unwrap();
    assert_eq!(sent[2]["tool_calls"][0]["id"], "c1");
    assert_eq!(sent[3]["tool_call_id"], "c1");
    Ok(())
}

#[tokio::test]
async fn test_gemini_results_are_keyed_by_tool_name() -> Result<()> {
    let h = harness(vec![
        ok(&gemini_function_calls(&[(
            "get_task",
            json!({ "projectId": "p1", "taskId": "t2" }),
        )])),
        ok(&gemini_text("Found it.")),
    ]);

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::Gemini, FeatureLevel::Base),
            &NoopObserver,
            None,
            &CancellationToken::new(),
        )
        .await?;

    let results = tool_results(&outcome.messages);
    assert_eq!(results.len(), 1);
    let response = &results[0]["parts"][0]["functionResponse"];
    assert_eq!(response["name"], "get_task");
    assert_eq!(response["response"]["result"]["title"], "Email Bob");
    Ok(())
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_tool_calls_run_sequentially_in_model_order() -> Result<()> {
    let h = harness(vec![
        ok(&anthropic_tool_use(&[
            ("c1", "get_task", json!({ "projectId": "p1", "taskId": "t1" })),
            ("c2", "complete_task", json!({ "projectId": "p1", "taskId": "t2" })),
            ("c3", "get_task", json!({ "projectId": "p2", "taskId": "t3" })),
        ])),
        ok(&anthropic_text("All three handled.")),
    ]);
    let observer = LoggingObserver::new(h.log.clone());

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::Claude, FeatureLevel::Base),
            &observer,
            None,
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(
        h.log.snapshot(),
        vec![
            "llm:request",
            "observer:tool_call:get_task",
            "service:get_task",
            "observer:tool_result:get_task",
            "observer:tool_call:complete_task",
            "service:complete_task",
            "observer:tool_result:complete_task",
            "observer:tool_call:get_task",
            "service:get_task",
            "observer:tool_result:get_task",
            "llm:request",
        ]
    );

    let ids: Vec<Value> = tool_results(&outcome.messages)
        .iter()
        .map(|r| r["content"][0]["tool_use_id"].clone())
        .collect();
    assert_eq!(ids, vec![json!("c1"), json!("c2"), json!("c3")]);
    Ok(())
}

// ============================================================================
// Confirmation
// ============================================================================

#[tokio::test]
async fn test_denied_confirmation_skips_the_tool() -> Result<()> {
    let h = harness(vec![
        ok(&anthropic_tool_use(&[(
            "c1",
            "delete_task",
            json!({ "projectId": "p1", "taskId": "t1" }),
        )])),
        ok(&anthropic_text("Okay, I left it alone.")),
    ]);
    let observer = LoggingObserver::new(h.log.clone());

    let (gate, mut requests) = ConfirmationGate::channel();
    let ui = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(request) = requests.recv().await {
            seen.push(request.pending().tool_call.id.clone());
            request.deny();
        }
        seen
    });

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::Claude, FeatureLevel::Base),
            &observer,
            Some(&gate),
            &CancellationToken::new(),
        )
        .await?;
    drop(gate);

    assert_eq!(ui.await?, vec!["c1".to_owned()]);
    assert_eq!(h.service.calls("delete_task"), 0);
    assert!(h.log.filtered("observer:tool_call").is_empty());
    assert_eq!(
        observer.results(),
        vec![(
            "c1".to_owned(),
            "delete_task".to_owned(),
            CANCEL_JSON.to_owned()
        )]
    );

    let results = tool_results(&outcome.messages);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["content"][0]["content"], CANCEL_JSON);
    assert_eq!(outcome.status, TurnStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn test_missing_gate_denies_confirmation() -> Result<()> {
    let h = harness(vec![
        ok(&openai_tool_calls(&[(
            "c1",
            "delete_project",
            json!({ "projectId": "p2" }),
        )])),
        ok(&openai_text("Not deleted.")),
    ]);

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::OpenAi, FeatureLevel::Base),
            &NoopObserver,
            None,
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(h.service.calls("delete_project"), 0);
    assert_eq!(tool_results(&outcome.messages)[0]["content"], CANCEL_JSON);
    Ok(())
}

#[tokio::test]
async fn test_confirmation_flag_comes_from_catalog_not_offered_tools() -> Result<()> {
    let h = harness(vec![
        ok(&openai_tool_calls(&[
            (
                "c1",
                "delete_task",
                json!({ "taskId": "t2", "projectId": "p1" }),
            ),
            ("c2", "delete_project", json!({ "projectId": "p2" })),
        ])),
        ok(&openai_text("Nothing deleted.")),
    ]);

    // Offer only a read tool, plus a copy of delete_project stripped of its flag
    let mut request = h.request(LlmProviderType::OpenAi, FeatureLevel::Base);
    let mut stripped = h
        .catalog
        .definition(FeatureLevel::Base, "delete_project")
        .cloned()
        .unwrap();
    stripped.requires_confirmation = false;
    request.tools = vec![
        h.catalog
            .definition(FeatureLevel::Base, "list_projects")
            .cloned()
            .unwrap(),
        stripped,
    ];

    let outcome = h
        .tool_loop
        .run(request, &NoopObserver, None, &CancellationToken::new())
        .await?;

    assert_eq!(h.service.calls("delete_task"), 0);
    assert_eq!(h.service.calls("delete_project"), 0);
    let results = tool_results(&outcome.messages);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["content"], CANCEL_JSON);
    assert_eq!(results[1]["content"], CANCEL_JSON);
    Ok(())
}

#[tokio::test]
async fn test_confirmed_delete_runs_once_and_invalidates_cache() -> Result<()> {
    let h = harness(vec![
        ok(&anthropic_tool_use(&[("c1", "list_projects", json!({}))])),
        ok(&anthropic_tool_use(&[(
            "c2",
            "delete_task",
            json!({ "projectId": "p1", "taskId": "t2" }),
        )])),
        ok(&anthropic_tool_use(&[("c3", "list_projects", json!({}))])),
        ok(&anthropic_text("Deleted.")),
    ]);
    let observer = LoggingObserver::new(h.log.clone());

    let (gate, mut requests) = ConfirmationGate::channel();
    let ui = tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            request.confirm();
        }
    });

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::Claude, FeatureLevel::Base),
            &observer,
            Some(&gate),
            &CancellationToken::new(),
        )
        .await?;
    drop(gate);
    ui.await?;

    assert_eq!(outcome.text, "Deleted.");
    assert_eq!(h.service.calls("delete_task"), 1);
    // Second listing is not served from the snapshot taken before the delete
    assert_eq!(h.service.calls("list_projects"), 2);
    assert_eq!(h.catalog.cache().generation(), 2);

    let events = h.log.snapshot();
    let confirmed = events
        .iter()
        .position(|e| e == "observer:confirmation:delete_task:true")
        .unwrap();
    let deleted = events.iter().position(|e| e == "service:delete_task").unwrap();
    assert!(confirmed < deleted);
    Ok(())
}

// ============================================================================
// Iteration cap
// ============================================================================

#[tokio::test]
async fn test_iteration_cap_returns_sentinel() -> Result<()> {
    let looping = || ok(&anthropic_tool_use(&[("c", "list_projects", json!({}))]));
    let h = harness(vec![looping(), looping(), looping(), looping()]);

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::Claude, FeatureLevel::Base)
                .with_max_iterations(3),
            &NoopObserver,
            None,
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(outcome.status, TurnStatus::MaxIterationsReached);
    assert_eq!(outcome.text, MAX_ITERATIONS_TEXT);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(h.transport.requests().len(), 3);
    Ok(())
}

#[test]
fn test_default_iteration_cap_is_ten() {
    let request = TurnRequest::new(
        ProviderAdapter::for_provider(LlmProviderType::Claude, None),
        Vec::new(),
        Vec::new(),
        "m",
        "k",
        base_credentials(),
        FeatureLevel::Base,
    );
    assert_eq!(request.max_iterations, DEFAULT_MAX_ITERATIONS);
    assert_eq!(DEFAULT_MAX_ITERATIONS, 10);
    assert!(!format!("{request:?}").contains("\"k\""));
}

// ============================================================================
// Cancellation
// ============================================================================

/// Cancels the turn as soon as the first tool result arrives
struct CancelAfterFirstResult {
    token: CancellationToken,
    inner: LoggingObserver,
}

impl TurnObserver for CancelAfterFirstResult {
    fn on_tool_call(&self, call: &ToolCall) {
        self.inner.on_tool_call(call);
    }

    fn on_tool_result(&self, call_id: &str, tool_name: &str, result: &str) {
        self.inner.on_tool_result(call_id, tool_name, result);
        self.token.cancel();
    }
}

#[tokio::test]
async fn test_cancel_between_tool_calls_stops_promptly() -> Result<()> {
    let h = harness(vec![ok(&anthropic_tool_use(&[
        ("c1", "complete_task", json!({ "projectId": "p1", "taskId": "t1" })),
        ("c2", "complete_task", json!({ "projectId": "p1", "taskId": "t2" })),
        ("c3", "complete_task", json!({ "projectId": "p2", "taskId": "t3" })),
    ]))]);
    let token = CancellationToken::new();
    let observer = CancelAfterFirstResult {
        token: token.clone(),
        inner: LoggingObserver::new(h.log.clone()),
    };

    let outcome = timeout(
        Duration::from_secs(5),
        h.tool_loop.run(
            h.request(LlmProviderType::Claude, FeatureLevel::Base),
            &observer,
            None,
            &token,
        ),
    )
    .await??;

    assert_eq!(outcome.status, TurnStatus::Stopped);
    assert_eq!(outcome.text, STOPPED_TEXT);
    assert!(h.service.calls("complete_task") <= 2);
    assert_eq!(h.transport.requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_before_start_sends_nothing() -> Result<()> {
    let h = harness(vec![ok(&anthropic_text("unused"))]);
    let token = CancellationToken::new();
    token.cancel();

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::Claude, FeatureLevel::Base),
            &NoopObserver,
            None,
            &token,
        )
        .await?;

    assert_eq!(outcome.status, TurnStatus::Stopped);
    assert_eq!(outcome.iterations, 0);
    assert_eq!(outcome.messages.len(), 2);
    assert!(h.transport.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_cancel_abandons_in_flight_model_request() -> Result<()> {
    let log = EventLog::default();
    let h = harness_with(ScriptedTransport::hanging(log.clone(), Vec::new()), log);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let outcome = timeout(
        Duration::from_secs(5),
        h.tool_loop.run(
            h.request(LlmProviderType::OpenAi, FeatureLevel::Base),
            &NoopObserver,
            None,
            &token,
        ),
    )
    .await??;

    assert_eq!(outcome.status, TurnStatus::Stopped);
    assert_eq!(outcome.text, STOPPED_TEXT);
    Ok(())
}

#[tokio::test]
async fn test_cancel_while_awaiting_confirmation() -> Result<()> {
    let h = harness(vec![ok(&anthropic_tool_use(&[(
        "c1",
        "delete_task",
        json!({ "projectId": "p1", "taskId": "t1" }),
    )]))]);
    let token = CancellationToken::new();

    let (gate, mut requests) = ConfirmationGate::channel();
    let canceller = token.clone();
    let ui = tokio::spawn(async move {
        // Hold the request unanswered and stop the turn instead
        let request = requests.recv().await;
        canceller.cancel();
        request
    });

    let outcome = timeout(
        Duration::from_secs(5),
        h.tool_loop.run(
            h.request(LlmProviderType::Claude, FeatureLevel::Base),
            &NoopObserver,
            Some(&gate),
            &token,
        ),
    )
    .await??;

    assert_eq!(outcome.status, TurnStatus::Stopped);
    assert_eq!(h.service.calls("delete_task"), 0);
    assert!(ui.await?.is_some());
    Ok(())
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_non_success_status_aborts_turn() {
    let h = harness(vec![status(429, "rate limited")]);

    let error = h
        .tool_loop
        .run(
            h.request(LlmProviderType::Claude, FeatureLevel::Base),
            &NoopObserver,
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(error.message, "LLM API error (429): rate limited");
    assert_eq!(error.code, ErrorCode::ExternalRateLimited);
}

#[tokio::test]
async fn test_unparseable_reply_is_invalid_format() {
    let h = harness(vec![TransportResponse {
        status: 200,
        body: "<html>oops</html>".to_owned(),
    }]);

    let error = h
        .tool_loop
        .run(
            h.request(LlmProviderType::Gemini, FeatureLevel::Base),
            &NoopObserver,
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidFormat);
}

#[tokio::test]
async fn test_tool_failure_becomes_result_and_turn_continues() -> Result<()> {
    let h = harness(vec![
        ok(&openai_tool_calls(&[
            ("c1", "list_projects", json!({})),
            ("c2", "no_such_tool", json!({})),
        ])),
        ok(&openai_text("The service is down.")),
    ]);
    h.service.fail_everything(503);

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::OpenAi, FeatureLevel::Base),
            &NoopObserver,
            None,
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(outcome.status, TurnStatus::Completed);
    let results = tool_results(&outcome.messages);
    let first: Value = serde_json::from_str(results[0]["content"].as_str().unwrap())?;
    assert_eq!(first["error"], "Failed to list_projects: 503");
    assert_eq!(
        results[1]["content"],
        r#"{"error":"Unknown tool: no_such_tool"}"#
    );
    Ok(())
}

#[tokio::test]
async fn test_extended_tool_is_unknown_at_base_level() -> Result<()> {
    let h = harness(vec![
        ok(&anthropic_tool_use(&[("c1", "get_all_tags", json!({}))])),
        ok(&anthropic_text("Cannot list tags.")),
    ]);

    let outcome = h
        .tool_loop
        .run(
            h.request(LlmProviderType::Claude, FeatureLevel::Base),
            &NoopObserver,
            None,
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(
        tool_results(&outcome.messages)[0]["content"][0]["content"],
        r#"{"error":"Unknown tool: get_all_tags"}"#
    );
    assert_eq!(h.service.calls("batch_check"), 0);
    Ok(())
}

#[tokio::test]
async fn test_extended_level_dispatches_extended_tools() -> Result<()> {
    let h = harness(vec![
        ok(&anthropic_tool_use(&[("c1", "get_all_tags", json!({}))])),
        ok(&anthropic_text("You have three tags.")),
    ]);

    let request = h.request(LlmProviderType::Claude, FeatureLevel::Extended);
    assert_eq!(request.tools.len(), 23);

    let outcome = h
        .tool_loop
        .run(request, &NoopObserver, None, &CancellationToken::new())
        .await?;

    let content = tool_results(&outcome.messages)[0]["content"][0]["content"].clone();
    let tags: Value = serde_json::from_str(content.as_str().unwrap())?;
    assert_eq!(tags.as_array().unwrap().len(), 3);
    assert_eq!(h.service.calls("batch_check"), 1);
    Ok(())
}
