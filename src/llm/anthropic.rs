// ABOUTME: Anthropic Messages API adapter (content blocks with inline tool_use)
// ABOUTME: Builds /v1/messages requests and parses text and tool_use blocks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Anthropic Adapter
//!
//! The system prompt travels in the dedicated `system` field; every other
//! message goes into `messages`. Tool results are sent back as a `user`
//! message holding a single `tool_result` block keyed by `tool_use_id`.

use serde_json::{json, Value};

use super::{
    expect_object, join_url, system_prompt, LlmAdapter, LlmRequest, Message, MessageContent,
    MessageRole, ParsedResponse, ToolCall, VendorFamily, VendorPayload,
};
use crate::constants::models::{
    ANTHROPIC_BASE_URL, ANTHROPIC_MAX_TOKENS, ANTHROPIC_VERSION, CLAUDE_DEFAULT_MODEL,
    CLAUDE_MODELS,
};
use crate::errors::{AppError, AppResult};
use crate::tools::ToolDefinition;

/// Adapter for the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicAdapter {
    base_url: String,
}

impl AnthropicAdapter {
    /// Create an adapter against the given base URL (public API or relay prefix)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn convert_message(message: &Message) -> AppResult<Value> {
        match &message.content {
            MessageContent::Text(text) => {
                let role = match message.role {
                    MessageRole::Assistant => "assistant",
                    _ => "user",
                };
                Ok(json!({ "role": role, "content": text }))
            }
            MessageContent::Vendor(payload) => {
                payload.value_for(VendorFamily::Anthropic).cloned()
            }
        }
    }
}

impl Default for AnthropicAdapter {
    fn default() -> Self {
        Self::new(ANTHROPIC_BASE_URL)
    }
}

impl LlmAdapter for AnthropicAdapter {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn display_name(&self) -> &'static str {
        "Anthropic Claude"
    }

    fn family(&self) -> VendorFamily {
        VendorFamily::Anthropic
    }

    fn default_model(&self) -> &'static str {
        CLAUDE_DEFAULT_MODEL
    }

    fn available_models(&self) -> &'static [&'static str] {
        CLAUDE_MODELS
    }

    fn format_tools(&self, tools: &[ToolDefinition]) -> Value {
        Value::Array(
            tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "input_schema": tool.parameters,
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
            .filter(|m| m.role != MessageRole::System)
            .map(Self::convert_message)
            .collect::<AppResult<Vec<_>>>()?;

        let mut body = json!({
            "model": model,
            "max_tokens": ANTHROPIC_MAX_TOKENS,
            "messages": converted,
        });
        if let Some(system) = system_prompt(messages) {
            body["system"] = Value::String(system.to_owned());
        }
        if !tools.is_empty() {
            body["tools"] = self.format_tools(tools);
        }

        Ok(LlmRequest {
            url: join_url(&self.base_url, "v1/messages"),
            headers: vec![
                ("content-type".to_owned(), "application/json".to_owned()),
                ("x-api-key".to_owned(), api_key.to_owned()),
                ("anthropic-version".to_owned(), ANTHROPIC_VERSION.to_owned()),
            ],
            body,
        })
    }

    fn parse_response(&self, response: &Value) -> AppResult<ParsedResponse> {
        let blocks = response
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::invalid_format("Anthropic response missing content array"))?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in blocks {
            match block.get("type").and_then(Value::as_str) {
                Some("text") => {
                    if let Some(span) = block.get("text").and_then(Value::as_str) {
                        text.push_str(span);
                    }
                }
                Some("tool_use") => {
                    let id = block.get("id").and_then(Value::as_str).ok_or_else(|| {
                        AppError::invalid_format("Anthropic tool_use block missing id")
                    })?;
                    let name = block.get("name").and_then(Value::as_str).ok_or_else(|| {
                        AppError::invalid_format("Anthropic tool_use block missing name")
                    })?;
                    let input = block.get("input").cloned().unwrap_or(Value::Null);
                    tool_calls.push(ToolCall::new(
                        id,
                        name,
                        expect_object(input, "tool_use input")?,
                    ));
                }
                // thinking and other block kinds stay in the raw message only
                _ => {}
            }
        }

        let raw = json!({ "role": "assistant", "content": blocks });
        Ok(ParsedResponse {
            text: (!text.is_empty()).then_some(text),
            tool_calls,
            raw_assistant_message: Message::vendor(
                MessageRole::Assistant,
                VendorPayload::new(VendorFamily::Anthropic, raw),
            ),
        })
    }

    fn format_tool_result(&self, correlation_id: &str, result: &str) -> Message {
        let value = json!({
            "role": "user",
            "content": [{
                "type": "tool_result",
                "tool_use_id": correlation_id,
                "content": result,
            }],
        });
        Message::vendor(
            MessageRole::Tool,
            VendorPayload::new(VendorFamily::Anthropic, value),
        )
    }
}
