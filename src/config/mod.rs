// ABOUTME: Configuration management module for model vendor, TickTick and loop settings
// ABOUTME: Re-exports typed selectors and the environment-driven AssistantConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Types**: `LlmProviderType` and `FeatureLevel` selectors
//! - **Environment**: `AssistantConfig` loaded from environment variables

/// Environment-driven assistant configuration
pub mod environment;
/// Typed configuration selectors
pub mod types;

pub use environment::{AssistantConfig, ConfigOverrides, TickTickConfig};
pub use types::{FeatureLevel, LlmProviderType};
