// ABOUTME: Tool loop limits and the sentinel texts returned for non-error endings
// ABOUTME: Shared by the orchestrator, its configuration layer and the CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default cap on request/tool-execution cycles per turn
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Text returned when a turn is cancelled by the caller
pub const STOPPED_TEXT: &str = "Request stopped.";

/// Text returned when the iteration cap is reached
pub const MAX_ITERATIONS_TEXT: &str = "Reached maximum tool call iterations.";

/// Message carried by the synthetic result of a denied confirmation
pub const USER_CANCELLED_MESSAGE: &str = "User cancelled this action";
