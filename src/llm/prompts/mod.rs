// ABOUTME: System prompt for the task assistant loaded at compile time
// ABOUTME: Appends a fresh current-time and timezone section on every turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # System Prompts
//!
//! The instructions live in a markdown file so they can be edited without
//! touching code. The system prompt is never persisted: it is rebuilt for
//! every turn so the model always sees the current time.

use chrono::{DateTime, SecondsFormat, Utc};

/// Static assistant instructions
pub const ASSISTANT_INSTRUCTIONS: &str = include_str!("assistant_system.md");

/// Get the static instructions without the time context
#[must_use]
pub const fn get_assistant_instructions() -> &'static str {
    ASSISTANT_INSTRUCTIONS
}

/// Build the full system prompt for one turn
///
/// `now` is rendered as ISO-8601 UTC with milliseconds; `timezone` is the
/// IANA name the model should use for every date it produces.
#[must_use]
pub fn build_system_prompt(now: DateTime<Utc>, timezone: &str) -> String {
    format!(
        "{instructions}\n\n## Current context\n- Date and time: {now}\n- Timezone: {timezone}\n- Use this timezone for all date operations unless the user specifies otherwise.",
        instructions = ASSISTANT_INSTRUCTIONS.trim(),
        now = now.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}
