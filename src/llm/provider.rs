// ABOUTME: Closed enum over the supported vendor adapters for runtime provider switching
// ABOUTME: Built from the configured provider type with an optional base URL override
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Provider Selector
//!
//! `ProviderAdapter` gives the orchestrator one concrete type to hold no matter
//! which vendor is configured. Every call is forwarded to the wrapped adapter.
//!
//! ```rust
//! use ticktick_assistant::config::LlmProviderType;
//! use ticktick_assistant::llm::{LlmAdapter, ProviderAdapter};
//!
//! let adapter = ProviderAdapter::for_provider(LlmProviderType::Grok, None);
//! assert_eq!(adapter.name(), "grok");
//! assert_eq!(adapter.default_model(), "grok-4-fast-non-reasoning");
//! ```

use serde_json::Value;
use tracing::debug;

use super::{
    AnthropicAdapter, GeminiAdapter, LlmAdapter, LlmRequest, Message, OpenAiCompatibleAdapter,
    OpenAiCompatibleConfig, ParsedResponse, ToolCall, VendorFamily,
};
use crate::config::LlmProviderType;
use crate::constants::models::{ANTHROPIC_BASE_URL, GEMINI_BASE_URL};
use crate::errors::AppResult;
use crate::tools::ToolDefinition;

/// Unified adapter over every supported vendor family
#[derive(Debug, Clone)]
pub enum ProviderAdapter {
    /// Anthropic Messages API
    Anthropic(AnthropicAdapter),
    /// `OpenAI`-style chat completions (`OpenAI`, Grok)
    OpenAiCompatible(OpenAiCompatibleAdapter),
    /// Google Gemini
    Gemini(GeminiAdapter),
}

impl ProviderAdapter {
    /// Build the adapter for a provider, optionally against a relay or custom base URL
    #[must_use]
    pub fn for_provider(provider: LlmProviderType, base_url: Option<String>) -> Self {
        debug!(%provider, custom_base_url = base_url.is_some(), "Selecting LLM adapter");
        match provider {
            LlmProviderType::Claude => Self::Anthropic(AnthropicAdapter::new(
                base_url.unwrap_or_else(|| ANTHROPIC_BASE_URL.to_owned()),
            )),
            LlmProviderType::OpenAi => {
                Self::OpenAiCompatible(OpenAiCompatibleAdapter::new(with_override(
                    OpenAiCompatibleConfig::openai(),
                    base_url,
                )))
            }
            LlmProviderType::Grok => {
                Self::OpenAiCompatible(OpenAiCompatibleAdapter::new(with_override(
                    OpenAiCompatibleConfig::grok(),
                    base_url,
                )))
            }
            LlmProviderType::Gemini => Self::Gemini(GeminiAdapter::new(
                base_url.unwrap_or_else(|| GEMINI_BASE_URL.to_owned()),
            )),
        }
    }

    fn inner(&self) -> &dyn LlmAdapter {
        match self {
            Self::Anthropic(adapter) => adapter,
            Self::OpenAiCompatible(adapter) => adapter,
            Self::Gemini(adapter) => adapter,
        }
    }
}

fn with_override(config: OpenAiCompatibleConfig, base_url: Option<String>) -> OpenAiCompatibleConfig {
    match base_url {
        Some(url) => config.with_base_url(url),
        None => config,
    }
}

impl LlmAdapter for ProviderAdapter {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn display_name(&self) -> &'static str {
        self.inner().display_name()
    }

    fn family(&self) -> VendorFamily {
        self.inner().family()
    }

    fn default_model(&self) -> &'static str {
        self.inner().default_model()
    }

    fn available_models(&self) -> &'static [&'static str] {
        self.inner().available_models()
    }

    fn format_tools(&self, tools: &[ToolDefinition]) -> Value {
        self.inner().format_tools(tools)
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        model: &str,
        api_key: &str,
    ) -> AppResult<LlmRequest> {
        self.inner().build_request(messages, tools, model, api_key)
    }

    fn parse_response(&self, response: &Value) -> AppResult<ParsedResponse> {
        self.inner().parse_response(response)
    }

    fn format_tool_result(&self, correlation_id: &str, result: &str) -> Message {
        self.inner().format_tool_result(correlation_id, result)
    }

    fn result_correlation_id<'a>(&self, call: &'a ToolCall) -> &'a str {
        self.inner().result_correlation_id(call)
    }
}
