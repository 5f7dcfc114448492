// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for the cache, tool loop, model vendors and TickTick API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Cache-related constants (TTL, sizes)
pub mod cache;
/// Tool loop limits and sentinel texts
pub mod tool_loop;

/// Service names used in logs and error messages
pub mod service_names {
    /// Binary/service name
    pub const TICKTICK_ASSISTANT: &str = "ticktick-assistant";
    /// TickTick backing service
    pub const TICKTICK: &str = "TickTick";
    /// Generic model endpoint label
    pub const LLM: &str = "LLM";
}

/// Model vendor endpoints and model catalogs
pub mod models {
    /// Anthropic public API base URL
    pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
    /// Anthropic API version header value
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
    /// Output token cap sent with every Anthropic request
    pub const ANTHROPIC_MAX_TOKENS: u32 = 4096;
    /// Default Claude model
    pub const CLAUDE_DEFAULT_MODEL: &str = "claude-sonnet-4-6";
    /// Claude models offered for selection
    pub const CLAUDE_MODELS: &[&str] = &[
        "claude-sonnet-4-6",
        "claude-haiku-4-5-20251001",
        "claude-opus-4-6",
    ];

    /// `OpenAI` public API base URL
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    /// Default `OpenAI` model
    pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4.1";
    /// `OpenAI` models offered for selection
    pub const OPENAI_MODELS: &[&str] = &["gpt-4.1", "gpt-4.1-mini", "o3", "o4-mini"];

    /// xAI public API base URL
    pub const GROK_BASE_URL: &str = "https://api.x.ai";
    /// Default Grok model
    pub const GROK_DEFAULT_MODEL: &str = "grok-4-fast-non-reasoning";
    /// Grok models offered for selection
    pub const GROK_MODELS: &[&str] = &[
        "grok-4-fast-non-reasoning",
        "grok-4-1-fast-non-reasoning",
        "grok-3",
    ];

    /// Gemini public API base URL
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
    /// Default Gemini model
    pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";
    /// Gemini models offered for selection
    pub const GEMINI_MODELS: &[&str] = &[
        "gemini-2.5-flash",
        "gemini-2.5-pro",
        "gemini-2.5-flash-lite",
        "gemini-3-flash-preview",
        "gemini-3-pro-preview",
        "gemini-3.1-pro-preview",
    ];

    /// Connection timeout for model endpoints
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;
    /// Whole-request timeout for model endpoints
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
}

/// TickTick API endpoints and domain values
pub mod ticktick {
    /// Base (OAuth) API root
    pub const V1_BASE_URL: &str = "https://api.ticktick.com/open/v1";
    /// Extended (session) API root
    pub const V2_BASE_URL: &str = "https://api.ticktick.com/api/v2";
    /// Header carrying the extended API session token
    pub const SESSION_HEADER: &str = "X-Ticktick-Session";
    /// Page size for completed-task queries
    pub const COMPLETED_TASKS_LIMIT: u32 = 999;
    /// Tag used to model the "flagged" state of a task
    pub const FLAGGED_TAG: &str = "flagged";
    /// Task status of an open task
    pub const STATUS_OPEN: i64 = 0;
    /// Task status of a completed task
    pub const STATUS_COMPLETED: i64 = 2;
    /// Request timeout for backing-service calls
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}
