// ABOUTME: LLM provider adapter layer translating between internal messages and vendor wire formats
// ABOUTME: Defines Message, ToolCall, ParsedResponse and the LlmAdapter contract shared by all vendors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # LLM Provider Adapters
//!
//! Each supported vendor family speaks a different tool-calling dialect. An
//! adapter is a set of pure functions that turn the shared message list and
//! tool catalog into a vendor HTTP request, and turn the vendor reply back
//! into a [`ParsedResponse`]. Network I/O lives behind [`LlmTransport`].
//!
//! ## Key Concepts
//!
//! - **`Message`**: a transcript entry holding either plain text or an opaque
//!   [`VendorPayload`] produced by an adapter
//! - **`LlmAdapter`**: the four wire operations plus descriptive metadata
//! - **`ProviderAdapter`**: closed set of the supported vendor families
//!
//! ## Example
//!
//! ```rust
//! use ticktick_assistant::config::LlmProviderType;
//! use ticktick_assistant::llm::{LlmAdapter, Message, ProviderAdapter};
//!
//! let adapter = ProviderAdapter::for_provider(LlmProviderType::OpenAi, None);
//! let request = adapter
//!     .build_request(&[Message::user("hello")], &[], "gpt-4.1", "sk-test")
//!     .unwrap();
//! assert!(request.url.ends_with("/v1/chat/completions"));
//! ```

mod anthropic;
mod gemini;
mod openai_compatible;
pub mod prompts;
mod provider;
mod transport;

pub use anthropic::AnthropicAdapter;
pub use gemini::{convert_schema, GeminiAdapter};
pub use openai_compatible::{OpenAiCompatibleAdapter, OpenAiCompatibleConfig};
pub use prompts::build_system_prompt;
pub use provider::ProviderAdapter;
pub use transport::{HttpTransport, LlmTransport, TransportResponse};

use std::fmt::{self, Debug, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};
use crate::tools::ToolDefinition;

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
    /// Carrier of a tool result
    Tool,
}

impl MessageRole {
    /// Convert to string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// Vendor family whose wire format a payload follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorFamily {
    /// Content blocks with inline `tool_use` blocks
    Anthropic,
    /// `choices[0].message.tool_calls` with stringified arguments
    #[serde(rename = "openai")]
    OpenAi,
    /// `candidates[0].content.parts` with native `functionCall` arguments
    Gemini,
}

impl fmt::Display for VendorFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anthropic => write!(f, "anthropic"),
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Vendor-shaped message produced by an adapter
///
/// The orchestrator never looks inside: it only carries the payload back to
/// the adapter of the same family, which re-sends it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorPayload {
    family: VendorFamily,
    value: Value,
}

impl VendorPayload {
    /// Wrap a vendor-shaped value
    #[must_use]
    pub const fn new(family: VendorFamily, value: Value) -> Self {
        Self { family, value }
    }

    /// Family the payload belongs to
    #[must_use]
    pub const fn family(&self) -> VendorFamily {
        self.family
    }

    /// Raw vendor value
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Borrow the value, refusing payloads produced for another vendor
    ///
    /// # Errors
    ///
    /// Returns `INVALID_FORMAT` when the payload belongs to a different family
    pub fn value_for(&self, family: VendorFamily) -> AppResult<&Value> {
        if self.family == family {
            Ok(&self.value)
        } else {
            Err(AppError::invalid_format(format!(
                "Transcript contains a {} message that cannot be sent to {family}",
                self.family
            )))
        }
    }
}

/// Content of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageContent {
    /// Plain text
    Text(String),
    /// Opaque vendor payload (raw assistant message or tool result)
    Vendor(VendorPayload),
}

/// A single message in a conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: MessageContent,
}

impl Message {
    /// Create a plain-text message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Create a message carrying a vendor payload
    #[must_use]
    pub const fn vendor(role: MessageRole, payload: VendorPayload) -> Self {
        Self {
            role,
            content: MessageContent::Vendor(payload),
        }
    }

    /// Text content, if this is a plain-text message
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Vendor(_) => None,
        }
    }
}

// ============================================================================
// Tool Calls and Responses
// ============================================================================

/// One model request to run a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id, vendor-supplied or synthesized
    pub id: String,
    /// Tool name
    pub name: String,
    /// Arguments object, passed through to the tool unvalidated
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Create a tool call
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Normalized model reply
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// Concatenated text spans, `None` when the reply had no text
    pub text: Option<String>,
    /// Tool calls in the order the model returned them
    pub tool_calls: Vec<ToolCall>,
    /// Vendor-shaped assistant message to append verbatim to the transcript
    pub raw_assistant_message: Message,
}

impl ParsedResponse {
    /// Whether the model asked for any tool
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// HTTP request descriptor built by an adapter
#[derive(Clone)]
pub struct LlmRequest {
    /// Absolute endpoint URL
    pub url: String,
    /// Header name and value pairs
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Value,
}

impl LlmRequest {
    /// Look up a header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl Debug for LlmRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Header values carry API keys; only names are shown
        let header_names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("LlmRequest")
            .field("url", &self.url)
            .field("headers", &header_names)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Adapter Trait
// ============================================================================

/// Vendor wire-format adapter
///
/// Every operation is pure: no I/O and no mutation of inputs.
pub trait LlmAdapter: Send + Sync {
    /// Unique adapter identifier (e.g. "claude", "openai", "gemini")
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Wire family this adapter speaks
    fn family(&self) -> VendorFamily;

    /// Default model
    fn default_model(&self) -> &'static str;

    /// Models offered for selection
    fn available_models(&self) -> &'static [&'static str];

    /// Map tool definitions to the vendor's tool spec
    fn format_tools(&self, tools: &[ToolDefinition]) -> Value;

    /// Build the HTTP request for one model call
    ///
    /// # Errors
    ///
    /// Returns `INVALID_FORMAT` if the transcript holds a payload of another vendor
    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        model: &str,
        api_key: &str,
    ) -> AppResult<LlmRequest>;

    /// Parse a decoded vendor reply
    ///
    /// # Errors
    ///
    /// Returns `INVALID_FORMAT` when expected fields are missing or malformed
    fn parse_response(&self, response: &Value) -> AppResult<ParsedResponse>;

    /// Build the transcript message carrying a tool result
    fn format_tool_result(&self, correlation_id: &str, result: &str) -> Message;

    /// Correlation id to pass to [`LlmAdapter::format_tool_result`] for `call`
    fn result_correlation_id<'a>(&self, call: &'a ToolCall) -> &'a str {
        &call.id
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Join a base URL and a path without doubling slashes
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Text of the first system message, if any
pub(crate) fn system_prompt(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .find(|m| m.role == MessageRole::System)
        .and_then(Message::text)
}

/// Require a JSON object, naming `what` in the error
pub(crate) fn expect_object(value: Value, what: &str) -> AppResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(AppError::invalid_format(format!(
            "{what} must be a JSON object, got {other}"
        ))),
    }
}
