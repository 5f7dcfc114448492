// ABOUTME: OpenAI chat-completions adapter shared by OpenAI and xAI Grok
// ABOUTME: Parses choices[0].message.tool_calls with stringified JSON arguments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Adapter
//!
//! One implementation serves every endpoint that speaks the `OpenAI` chat
//! completions dialect. Presets exist for `OpenAI` itself and for xAI Grok;
//! they differ only in base URL, name and model catalog.
//!
//! System messages are accepted inline, so the transcript is sent in order.
//! The assistant message returned by the vendor is re-appended verbatim
//! (with `role` forced to `assistant`) so `tool_calls` stay correlated with
//! the `tool` messages that answer them.

use serde_json::{json, Map, Value};

use super::{
    expect_object, join_url, LlmAdapter, LlmRequest, Message, MessageContent, MessageRole,
    ParsedResponse, ToolCall, VendorFamily, VendorPayload,
};
use crate::constants::models::{
    GROK_BASE_URL, GROK_DEFAULT_MODEL, GROK_MODELS, OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL,
    OPENAI_MODELS,
};
use crate::errors::{AppError, AppResult};
use crate::tools::ToolDefinition;

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for an `OpenAI`-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL (vendor root or relay prefix); `/v1/chat/completions` is appended
    pub base_url: String,
    /// Provider name for selection and logging
    pub provider_name: &'static str,
    /// Provider display name
    pub display_name: &'static str,
    /// Default model
    pub default_model: &'static str,
    /// Models offered for selection
    pub models: &'static [&'static str],
}

impl OpenAiCompatibleConfig {
    /// Preset for the `OpenAI` API
    #[must_use]
    pub fn openai() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_owned(),
            provider_name: "openai",
            display_name: "OpenAI",
            default_model: OPENAI_DEFAULT_MODEL,
            models: OPENAI_MODELS,
        }
    }

    /// Preset for the xAI Grok API
    #[must_use]
    pub fn grok() -> Self {
        Self {
            base_url: GROK_BASE_URL.to_owned(),
            provider_name: "grok",
            display_name: "xAI Grok",
            default_model: GROK_DEFAULT_MODEL,
            models: GROK_MODELS,
        }
    }

    /// Replace the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// ============================================================================
// Adapter Implementation
// ============================================================================

/// Adapter for `OpenAI`-compatible chat completions
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleAdapter {
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleAdapter {
    /// Create an adapter from a configuration
    #[must_use]
    pub const fn new(config: OpenAiCompatibleConfig) -> Self {
        Self { config }
    }

    /// Adapter configuration
    #[must_use]
    pub const fn config(&self) -> &OpenAiCompatibleConfig {
        &self.config
    }

    fn convert_message(message: &Message) -> AppResult<Value> {
        match &message.content {
            MessageContent::Text(text) => {
                Ok(json!({ "role": message.role.as_str(), "content": text }))
            }
            MessageContent::Vendor(payload) => payload.value_for(VendorFamily::OpenAi).cloned(),
        }
    }

    fn parse_tool_call(raw: &Value) -> AppResult<ToolCall> {
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::invalid_format("Tool call missing id"))?;
        let function = raw
            .get("function")
            .ok_or_else(|| AppError::invalid_format("Tool call missing function"))?;
        let name = function
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::invalid_format("Tool call missing function name"))?;

        let arguments = match function.get("arguments") {
            Some(Value::String(encoded)) if encoded.trim().is_empty() => Map::new(),
            Some(Value::String(encoded)) => {
                let decoded: Value = serde_json::from_str(encoded).map_err(|e| {
                    AppError::invalid_format(format!(
                        "Tool call '{name}' has malformed arguments: {e}"
                    ))
                })?;
                expect_object(decoded, "Tool call arguments")?
            }
            // Some compatible servers already send an object
            Some(other) => expect_object(other.clone(), "Tool call arguments")?,
            None => Map::new(),
        };

        Ok(ToolCall::new(id, name, arguments))
    }
}

impl LlmAdapter for OpenAiCompatibleAdapter {
    fn name(&self) -> &'static str {
        self.config.provider_name
    }

    fn display_name(&self) -> &'static str {
        self.config.display_name
    }

    fn family(&self) -> VendorFamily {
        VendorFamily::OpenAi
    }

    fn default_model(&self) -> &'static str {
        self.config.default_model
    }

    fn available_models(&self) -> &'static [&'static str] {
        self.config.models
    }

    fn format_tools(&self, tools: &[ToolDefinition]) -> Value {
        Value::Array(
            tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters,
                        },
                    })
                })
                .collect(),
        )
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        model: &str,
        api_key: &str,
    ) -> AppResult<LlmRequest> {
        let converted = messages
            .iter()
            .map(Self::convert_message)
            .collect::<AppResult<Vec<_>>>()?;

        let mut body = json!({ "model": model, "messages": converted });
        if !tools.is_empty() {
            body["tools"] = self.format_tools(tools);
        }

        Ok(LlmRequest {
            url: join_url(&self.config.base_url, "v1/chat/completions"),
            headers: vec![
                ("content-type".to_owned(), "application/json".to_owned()),
                ("authorization".to_owned(), format!("Bearer {api_key}")),
            ],
            body,
        })
    }

    fn parse_response(&self, response: &Value) -> AppResult<ParsedResponse> {
        let message = response
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(Value::as_object)
            .ok_or_else(|| {
                AppError::invalid_format("Chat completion response missing choices[0].message")
            })?;

        let tool_calls = match message.get("tool_calls") {
            Some(Value::Array(calls)) => calls
                .iter()
                .map(Self::parse_tool_call)
                .collect::<AppResult<Vec<_>>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(AppError::invalid_format(
                    "Chat completion tool_calls must be an array",
                ))
            }
        };

        let text = message
            .get("content")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        let mut raw = message.clone();
        raw.insert("role".to_owned(), Value::String("assistant".to_owned()));

        Ok(ParsedResponse {
            text,
            tool_calls,
            raw_assistant_message: Message::vendor(
                MessageRole::Assistant,
                VendorPayload::new(VendorFamily::OpenAi, Value::Object(raw)),
            ),
        })
    }

    fn format_tool_result(&self, correlation_id: &str, result: &str) -> Message {
        let value = json!({
            "role": "tool",
            "tool_call_id": correlation_id,
            "content": result,
        });
        Message::vendor(
            MessageRole::Tool,
            VendorPayload::new(VendorFamily::OpenAi, value),
        )
    }
}
