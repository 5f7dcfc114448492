// ABOUTME: Main library entry point for the TickTick assistant orchestration core
// ABOUTME: Provider adapters, tool catalog, tool loop and confirmation gate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # TickTick Assistant
//!
//! Provider-agnostic tool-calling core for a conversational assistant that manages
//! tasks in TickTick. A turn sends the transcript to a model vendor, executes the
//! tools the model asks for, feeds the results back and repeats until the model
//! answers with plain text.
//!
//! ## Architecture
//!
//! - **llm**: one adapter per vendor family (Anthropic, `OpenAI`-style, Gemini)
//!   translating the internal transcript to and from each wire protocol
//! - **tools**: the static tool catalog and its dispatcher, with a short-TTL
//!   snapshot cache invalidated on every write
//! - **conversation**: the tool loop state machine, the confirmation gate and
//!   transcript persistence helpers
//! - **ticktick**: typed client for the TickTick base and extended APIs
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ticktick_assistant::cache::CacheConfig;
//! use ticktick_assistant::config::{FeatureLevel, LlmProviderType};
//! use ticktick_assistant::conversation::{NoopObserver, ToolLoop, TurnRequest};
//! use ticktick_assistant::llm::{HttpTransport, Message, ProviderAdapter};
//! use ticktick_assistant::ticktick::{Credentials, TickTickClient};
//! use ticktick_assistant::tools::ToolCatalog;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), ticktick_assistant::errors::AppError> {
//! let service = Arc::new(TickTickClient::with_defaults()?);
//! let catalog = Arc::new(ToolCatalog::new(service, &CacheConfig::default()));
//! let transport = Arc::new(HttpTransport::new()?);
//! let tool_loop = ToolLoop::new(transport, catalog.clone());
//!
//! let request = TurnRequest::new(
//!     ProviderAdapter::for_provider(LlmProviderType::Claude, None),
//!     vec![Message::system("You manage tasks."), Message::user("What is due today?")],
//!     catalog.list(FeatureLevel::Base),
//!     "claude-sonnet-4-6",
//!     "sk-ant-...",
//!     Credentials::new("oauth-token", None),
//!     FeatureLevel::Base,
//! );
//! let outcome = tool_loop
//!     .run(request, &NoopObserver, None, &CancellationToken::new())
//!     .await?;
//! println!("{}", outcome.text);
//! # Ok(())
//! # }
//! ```

/// Unified error handling re-exported from the core crate
pub mod errors;

/// Application constants re-exported from the core crate
pub mod constants;

/// Environment-driven configuration and typed selectors
pub mod config;

/// Structured logging setup with tracing
pub mod logging;

/// Snapshot cache with TTL and invalidate-on-write
pub mod cache;

/// Model vendor adapters, transport and system prompt
pub mod llm;

/// TickTick base and extended API client
pub mod ticktick;

/// Tool catalog, definitions and executors
pub mod tools;

/// Tool loop, confirmation gate and transcript persistence
pub mod conversation;
