// ABOUTME: Google Gemini generateContent adapter with nullable schema rewriting
// ABOUTME: Parses candidates[0].content.parts and correlates tool results by tool name
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gemini Adapter
//!
//! Gemini differs from the other families in three ways:
//!
//! - the schema dialect has no `type: [T, "null"]` unions, so parameter
//!   schemas are rewritten to `type: T, nullable: true` before sending
//! - function calls carry no id, so one is generated per call
//! - a `functionResponse` has no call-id field, so tool results are keyed by
//!   the tool *name* ([`LlmAdapter::result_correlation_id`] returns it)

use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::{
    expect_object, join_url, system_prompt, LlmAdapter, LlmRequest, Message, MessageContent,
    MessageRole, ParsedResponse, ToolCall, VendorFamily, VendorPayload,
};
use crate::constants::models::{GEMINI_BASE_URL, GEMINI_DEFAULT_MODEL, GEMINI_MODELS};
use crate::errors::{AppError, AppResult};
use crate::tools::ToolDefinition;

/// Rewrite nullable type unions into Gemini's `nullable` flag form
///
/// Recurses through nested objects. A `type` array loses its `"null"` member,
/// collapses to a single type when only one remains, and gains
/// `nullable: true` when `"null"` was present. Other arrays are copied as is.
#[must_use]
pub fn convert_schema(schema: &Value) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };

    let mut result = Map::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Array(types) if key == "type" => {
                let non_null: Vec<Value> = types
                    .iter()
                    .filter(|t| t.as_str() != Some("null"))
                    .cloned()
                    .collect();
                let nullable = non_null.len() != types.len();
                let collapsed = match non_null.as_slice() {
                    [single] => single.clone(),
                    _ => Value::Array(non_null),
                };
                result.insert("type".to_owned(), collapsed);
                if nullable {
                    result.insert("nullable".to_owned(), Value::Bool(true));
                }
            }
            Value::Object(_) => {
                result.insert(key.clone(), convert_schema(value));
            }
            _ => {
                result.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(result)
}

/// Adapter for the Gemini `generateContent` API
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    base_url: String,
}

impl GeminiAdapter {
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
                    MessageRole::Assistant => "model",
                    _ => "user",
                };
                Ok(json!({ "role": role, "parts": [{ "text": text }] }))
            }
            MessageContent::Vendor(payload) => payload.value_for(VendorFamily::Gemini).cloned(),
        }
    }
}

impl Default for GeminiAdapter {
    fn default() -> Self {
        Self::new(GEMINI_BASE_URL)
    }
}

impl LlmAdapter for GeminiAdapter {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini"
    }

    fn family(&self) -> VendorFamily {
        VendorFamily::Gemini
    }

    fn default_model(&self) -> &'static str {
        GEMINI_DEFAULT_MODEL
    }

    fn available_models(&self) -> &'static [&'static str] {
        GEMINI_MODELS
    }

    fn format_tools(&self, tools: &[ToolDefinition]) -> Value {
        let declarations: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": convert_schema(&tool.parameters),
                })
            })
            .collect();
        json!([{ "function_declarations": declarations }])
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        model: &str,
        api_key: &str,
    ) -> AppResult<LlmRequest> {
        let contents = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(Self::convert_message)
            .collect::<AppResult<Vec<_>>>()?;

        let mut body = json!({ "contents": contents });
        if !tools.is_empty() {
            body["tools"] = self.format_tools(tools);
        }
        if let Some(system) = system_prompt(messages) {
            body["system_instruction"] = json!({ "parts": [{ "text": system }] });
        }

        Ok(LlmRequest {
            url: join_url(
                &self.base_url,
                &format!("v1beta/models/{model}:generateContent"),
            ),
            headers: vec![
                ("content-type".to_owned(), "application/json".to_owned()),
                ("x-goog-api-key".to_owned(), api_key.to_owned()),
            ],
            body,
        })
    }

    fn parse_response(&self, response: &Value) -> AppResult<ParsedResponse> {
        let candidates = response
            .get("candidates")
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::invalid_format("Gemini response missing candidates"))?;

        let content = candidates
            .first()
            .and_then(|candidate| candidate.get("content"))
            .cloned()
            .unwrap_or_else(|| json!({ "role": "model", "parts": [] }));

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        if let Some(parts) = content.get("parts").and_then(Value::as_array) {
            for part in parts {
                if let Some(span) = part.get("text").and_then(Value::as_str) {
                    text.push_str(span);
                }
                if let Some(call) = part.get("functionCall") {
                    let name = call.get("name").and_then(Value::as_str).ok_or_else(|| {
                        AppError::invalid_format("Gemini functionCall missing name")
                    })?;
                    let args = call.get("args").cloned().unwrap_or(Value::Null);
                    tool_calls.push(ToolCall::new(
                        Uuid::new_v4().to_string(),
                        name,
                        expect_object(args, "functionCall args")?,
                    ));
                }
            }
        }

        Ok(ParsedResponse {
            text: (!text.is_empty()).then_some(text),
            tool_calls,
            raw_assistant_message: Message::vendor(
                MessageRole::Assistant,
                VendorPayload::new(VendorFamily::Gemini, content),
            ),
        })
    }

    fn format_tool_result(&self, correlation_id: &str, result: &str) -> Message {
        // Non-JSON tool output is still delivered, as a JSON string
        let parsed =
            serde_json::from_str(result).unwrap_or_else(|_| Value::String(result.to_owned()));
        let value = json!({
            "role": "user",
            "parts": [{
                "functionResponse": {
                    "name": correlation_id,
                    "response": { "result": parsed },
                },
            }],
        });
        Message::vendor(
            MessageRole::Tool,
            VendorPayload::new(VendorFamily::Gemini, value),
        )
    }

    fn result_correlation_id<'a>(&self, call: &'a ToolCall) -> &'a str {
        &call.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_schema_leaves_plain_types_alone() {
        let schema = json!({ "type": "string", "enum": ["a", "b"] });
        assert_eq!(convert_schema(&schema), schema);
    }

    #[test]
    fn test_convert_schema_keeps_multi_type_unions() {
        let schema = json!({ "type": ["string", "number", "null"] });
        assert_eq!(
            convert_schema(&schema),
            json!({ "type": ["string", "number"], "nullable": true })
        );
    }
}
