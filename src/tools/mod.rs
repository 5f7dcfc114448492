// ABOUTME: Tool catalog module: static definitions, argument access and per-tool executors
// ABOUTME: The catalog is the only entry point; executors are private to this module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tools
//!
//! The model sees [`ToolDefinition`]s; the tool loop calls
//! [`ToolCatalog::execute`] which always returns a JSON string.

/// Typed argument access
pub mod args;
/// Catalog and dispatcher
pub mod catalog;
/// Per-call execution context
pub mod context;
/// Static definitions
pub mod definitions;

mod extended;
mod flags;
mod projects;
mod tasks;

pub use args::ToolArgs;
pub use catalog::ToolCatalog;
pub use context::ToolContext;
pub use definitions::{base_tools, extended_only_tools, ToolCapabilities, ToolDefinition};
