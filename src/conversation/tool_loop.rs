// ABOUTME: Tool loop driving one conversation turn: request, parse, run tools, repeat
// ABOUTME: Sequential tool calls, iteration cap, cooperative cancellation and confirmation gating
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Loop
//!
//! One call to [`ToolLoop::run`] is one user turn. The loop alternates between
//! asking the model and executing the tools it requests until the model
//! answers without tool calls, the iteration cap is hit, or the turn is
//! cancelled.
//!
//! Transcript order is strict: assistant payload, then one tool-result message
//! per call in the order the model returned them, then the next request.
//! A failing tool never aborts the turn; a failing model request always does.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::FeatureLevel;
use crate::constants::tool_loop::{
    DEFAULT_MAX_ITERATIONS, MAX_ITERATIONS_TEXT, STOPPED_TEXT, USER_CANCELLED_MESSAGE,
};
use crate::errors::{AppError, AppResult};
use crate::llm::{LlmAdapter, LlmTransport, Message, ParsedResponse, ProviderAdapter, ToolCall};
use crate::ticktick::Credentials;
use crate::tools::{ToolCatalog, ToolDefinition};

use super::confirmation::{ConfirmationGate, PendingConfirmation};

// ============================================================================
// Observer
// ============================================================================

/// Progress callbacks fired while a turn runs
///
/// Callbacks are notifications only; they cannot change the loop's course.
pub trait TurnObserver: Send + Sync {
    /// A tool is about to run
    fn on_tool_call(&self, _call: &ToolCall) {}

    /// A tool result is available (including synthesized cancellations)
    fn on_tool_result(&self, _call_id: &str, _tool_name: &str, _result: &str) {}

    /// The user answered a confirmation request
    fn on_confirmation(&self, _call: &ToolCall, _approved: bool) {}

    /// The model produced its final text
    fn on_text(&self, _text: &str) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TurnObserver for NoopObserver {}

// ============================================================================
// Request / Outcome
// ============================================================================

/// Everything one turn needs
#[derive(Clone)]
pub struct TurnRequest {
    /// Vendor adapter
    pub adapter: ProviderAdapter,
    /// Transcript so far, system prompt first
    pub messages: Vec<Message>,
    /// Tools offered to the model
    pub tools: Vec<ToolDefinition>,
    /// Model identifier
    pub model: String,
    /// Vendor API key
    pub api_key: String,
    /// Backing-service credentials for tool execution
    pub credentials: Credentials,
    /// Feature level used for tool dispatch
    pub feature_level: FeatureLevel,
    /// Maximum number of model requests in this turn
    pub max_iterations: usize,
}

impl TurnRequest {
    /// Create a request with the default iteration cap
    #[must_use]
    pub fn new(
        adapter: ProviderAdapter,
        messages: Vec<Message>,
        tools: impl Into<Vec<ToolDefinition>>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        credentials: Credentials,
        feature_level: FeatureLevel,
    ) -> Self {
        Self {
            adapter,
            messages,
            tools: tools.into(),
            model: model.into(),
            api_key: api_key.into(),
            credentials,
            feature_level,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Override the iteration cap
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Debug for TurnRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnRequest")
            .field("adapter", &self.adapter.name())
            .field("messages", &self.messages.len())
            .field("tools", &self.tools.len())
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .field("credentials", &self.credentials)
            .field("feature_level", &self.feature_level)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// The model answered without tool calls
    Completed,
    /// The cancellation token fired
    Stopped,
    /// The iteration cap was reached
    MaxIterationsReached,
}

/// Result of one turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Final text, or a sentinel for stopped and capped turns
    pub text: String,
    /// Transcript including every message appended during the turn
    pub messages: Vec<Message>,
    /// How the turn ended
    pub status: TurnStatus,
    /// Model requests sent
    pub iterations: usize,
}

impl TurnOutcome {
    fn stopped(messages: Vec<Message>, iterations: usize) -> Self {
        info!(iterations, "Turn stopped by cancellation");
        Self {
            text: STOPPED_TEXT.to_owned(),
            messages,
            status: TurnStatus::Stopped,
            iterations,
        }
    }
}

// ============================================================================
// Loop
// ============================================================================

/// Per-turn borrowed state shared by the loop's steps
struct Turn<'a> {
    adapter: &'a ProviderAdapter,
    tools: &'a [ToolDefinition],
    credentials: &'a Credentials,
    feature_level: FeatureLevel,
    observer: &'a dyn TurnObserver,
    confirmations: Option<&'a ConfirmationGate>,
    cancel: &'a CancellationToken,
}

/// Drives turns against one transport and one tool catalog
#[derive(Clone)]
pub struct ToolLoop {
    transport: Arc<dyn LlmTransport>,
    catalog: Arc<ToolCatalog>,
}

impl ToolLoop {
    /// Create a loop
    #[must_use]
    pub fn new(transport: Arc<dyn LlmTransport>, catalog: Arc<ToolCatalog>) -> Self {
        Self { transport, catalog }
    }

    /// Run one turn
    ///
    /// Returns the stopped sentinel when `cancel` fires and the
    /// max-iterations sentinel when the cap is hit; neither is an error.
    /// Without a confirmation gate, tools that need confirmation are denied.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport fails, the model endpoint answers
    /// with a non-2xx status, or its reply cannot be parsed.
    #[instrument(
        skip_all,
        fields(provider = request.adapter.name(), model = %request.model, level = %request.feature_level)
    )]
    pub async fn run(
        &self,
        request: TurnRequest,
        observer: &dyn TurnObserver,
        confirmations: Option<&ConfirmationGate>,
        cancel: &CancellationToken,
    ) -> AppResult<TurnOutcome> {
        let TurnRequest {
            adapter,
            mut messages,
            tools,
            model,
            api_key,
            credentials,
            feature_level,
            max_iterations,
        } = request;

        let turn = Turn {
            adapter: &adapter,
            tools: &tools,
            credentials: &credentials,
            feature_level,
            observer,
            confirmations,
            cancel,
        };

        for iteration in 0..max_iterations {
            if cancel.is_cancelled() {
                return Ok(TurnOutcome::stopped(messages, iteration));
            }

            let Some(parsed) = self
                .request_model(&turn, &messages, &model, &api_key)
                .await?
            else {
                return Ok(TurnOutcome::stopped(messages, iteration + 1));
            };

            let ParsedResponse {
                text,
                tool_calls,
                raw_assistant_message,
            } = parsed;
            messages.push(raw_assistant_message);

            if tool_calls.is_empty() {
                let text = text.unwrap_or_default();
                observer.on_text(&text);
                info!(iterations = iteration + 1, "Turn completed");
                return Ok(TurnOutcome {
                    text,
                    messages,
                    status: TurnStatus::Completed,
                    iterations: iteration + 1,
                });
            }

            debug!(calls = tool_calls.len(), "Model requested tools");
            for call in &tool_calls {
                if cancel.is_cancelled() {
                    return Ok(TurnOutcome::stopped(messages, iteration + 1));
                }
                let Some(result_message) = self.handle_call(&turn, call).await else {
                    return Ok(TurnOutcome::stopped(messages, iteration + 1));
                };
                messages.push(result_message);
            }
        }

        warn!(max_iterations, "Turn reached the iteration cap");
        Ok(TurnOutcome {
            text: MAX_ITERATIONS_TEXT.to_owned(),
            messages,
            status: TurnStatus::MaxIterationsReached,
            iterations: max_iterations,
        })
    }

    /// Send one model request; `None` when cancelled while waiting
    async fn request_model(
        &self,
        turn: &Turn<'_>,
        messages: &[Message],
        model: &str,
        api_key: &str,
    ) -> AppResult<Option<ParsedResponse>> {
        let http_request = turn
            .adapter
            .build_request(messages, turn.tools, model, api_key)?;

        let response = tokio::select! {
            biased;
            () = turn.cancel.cancelled() => return Ok(None),
            response = self.transport.send(&http_request) => response?,
        };

        if !response.is_success() {
            warn!(status = response.status, "Model endpoint returned an error");
            return Err(AppError::llm_api(response.status, &response.body));
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|e| {
            AppError::invalid_format(format!("Model response is not valid JSON: {e}"))
        })?;
        turn.adapter.parse_response(&body).map(Some)
    }

    /// Process one tool call into its result message; `None` when cancelled
    /// while waiting for confirmation
    async fn handle_call(&self, turn: &Turn<'_>, call: &ToolCall) -> Option<Message> {
        let correlation_id = turn.adapter.result_correlation_id(call);

        // The catalog owns the confirmation flag; the offered list may omit the tool
        if let Some(definition) = self
            .catalog
            .definition(turn.feature_level, &call.name)
            .filter(|definition| definition.requires_confirmation)
        {
            let approved = Self::confirm(turn, call, definition).await?;
            turn.observer.on_confirmation(call, approved);
            if !approved {
                info!(tool = %call.name, "User declined tool call");
                let result =
                    json!({ "cancelled": true, "message": USER_CANCELLED_MESSAGE }).to_string();
                turn.observer.on_tool_result(&call.id, &call.name, &result);
                return Some(turn.adapter.format_tool_result(correlation_id, &result));
            }
        }

        turn.observer.on_tool_call(call);
        // In-flight tool calls run to completion even if the turn is cancelled
        let result = self
            .catalog
            .execute(
                turn.feature_level,
                &call.name,
                &call.arguments,
                turn.credentials,
            )
            .await;
        turn.observer.on_tool_result(&call.id, &call.name, &result);
        Some(turn.adapter.format_tool_result(correlation_id, &result))
    }

    async fn confirm(
        turn: &Turn<'_>,
        call: &ToolCall,
        definition: &ToolDefinition,
    ) -> Option<bool> {
        let Some(gate) = turn.confirmations else {
            warn!(tool = %call.name, "No confirmation gate attached, denying");
            return Some(false);
        };

        let pending = PendingConfirmation {
            tool_call: call.clone(),
            tool_definition: definition.clone(),
        };
        tokio::select! {
            biased;
            () = turn.cancel.cancelled() => None,
            approved = gate.request(pending) => Some(approved),
        }
    }
}
