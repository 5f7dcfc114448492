// ABOUTME: Core configuration type definitions for provider and API tier selection
// ABOUTME: Contains the LlmProviderType and FeatureLevel enums used across config modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::models;
use crate::errors::{AppError, ErrorCode};

/// LLM provider selection for chat functionality
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// Anthropic Claude (content blocks with inline `tool_use`)
    #[default]
    Claude,
    /// `OpenAI` chat completions
    #[serde(rename = "openai")]
    OpenAi,
    /// xAI Grok through the `OpenAI`-compatible endpoint
    Grok,
    /// Google Gemini `generateContent`
    Gemini,
}

impl LlmProviderType {
    /// Environment variable name for LLM provider selection
    pub const ENV_VAR: &'static str = "ASSISTANT_LLM_PROVIDER";

    /// Every selectable provider, in display order
    pub const ALL: [Self; 4] = [Self::Claude, Self::OpenAi, Self::Grok, Self::Gemini];

    /// Parse from string with fallback to default
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Load from environment variable
    #[must_use]
    pub fn from_env() -> Self {
        env::var(Self::ENV_VAR)
            .map(|s| Self::from_str_or_default(&s))
            .unwrap_or_default()
    }

    /// Vendor-specific environment variable holding the API key
    #[must_use]
    pub const fn api_key_env_var(&self) -> &'static str {
        match self {
            Self::Claude => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Grok => "XAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Model used when none is configured
    #[must_use]
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::Claude => models::CLAUDE_DEFAULT_MODEL,
            Self::OpenAi => models::OPENAI_DEFAULT_MODEL,
            Self::Grok => models::GROK_DEFAULT_MODEL,
            Self::Gemini => models::GEMINI_DEFAULT_MODEL,
        }
    }

    /// Models offered for selection
    #[must_use]
    pub const fn available_models(&self) -> &'static [&'static str] {
        match self {
            Self::Claude => models::CLAUDE_MODELS,
            Self::OpenAi => models::OPENAI_MODELS,
            Self::Grok => models::GROK_MODELS,
            Self::Gemini => models::GEMINI_MODELS,
        }
    }
}

impl FromStr for LlmProviderType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Self::Claude),
            "openai" | "gpt" => Ok(Self::OpenAi),
            "grok" | "xai" => Ok(Self::Grok),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(AppError::new(
                ErrorCode::ConfigInvalid,
                format!(
                    "Unknown LLM provider '{other}' (expected claude, openai, grok or gemini)"
                ),
            )),
        }
    }
}

impl Display for LlmProviderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Claude => write!(f, "claude"),
            Self::OpenAi => write!(f, "openai"),
            Self::Grok => write!(f, "grok"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Backend capability tier that selects the tool catalog
///
/// `Base` is the OAuth REST API. `Extended` adds the session-authenticated API
/// with cross-project queries and tag management.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum FeatureLevel {
    /// Base catalog (OAuth API)
    #[default]
    #[serde(rename = "v1")]
    Base,
    /// Extended catalog (base plus session API tools)
    #[serde(rename = "v2")]
    Extended,
}

impl FeatureLevel {
    /// Environment variable name for API tier selection
    pub const ENV_VAR: &'static str = "TICKTICK_API_VERSION";

    /// Parse from string with fallback to default
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Load from environment variable
    #[must_use]
    pub fn from_env() -> Self {
        env::var(Self::ENV_VAR)
            .map(|s| Self::from_str_or_default(&s))
            .unwrap_or_default()
    }

    /// Tier actually usable with the given credentials
    ///
    /// The extended catalog needs a session token; without one the base
    /// catalog is used even when the extended tier was requested.
    #[must_use]
    pub const fn effective(self, has_session_token: bool) -> Self {
        match self {
            Self::Extended if has_session_token => Self::Extended,
            _ => Self::Base,
        }
    }
}

impl FromStr for FeatureLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "base" => Ok(Self::Base),
            "v2" | "extended" => Ok(Self::Extended),
            other => Err(AppError::new(
                ErrorCode::ConfigInvalid,
                format!("Unknown API version '{other}' (expected v1 or v2)"),
            )),
        }
    }
}

impl Display for FeatureLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Base => write!(f, "v1"),
            Self::Extended => write!(f, "v2"),
        }
    }
}
