// ABOUTME: Logging configuration and structured logging setup for the assistant
// ABOUTME: Reads RUST_LOG and LOG_FORMAT, quiets HTTP internals and writes to stderr
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging configuration
//!
//! Logs go to stderr so the chat REPL keeps stdout for the conversation itself.
//! Secrets are never recorded as span or event fields.

use std::env;
use std::io;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::service_names;

/// Environment variable holding the filter directives
pub const LEVEL_ENV_VAR: &str = "RUST_LOG";
/// Environment variable selecting the output format
pub const FORMAT_ENV_VAR: &str = "LOG_FORMAT";
/// Presence enables file and line numbers in structured output
pub const LOCATION_ENV_VAR: &str = "LOG_INCLUDE_LOCATION";

const DEFAULT_LEVEL: &str = "warn";

/// Crates whose request-level chatter is capped at `warn`
const NOISY_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "h2"];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Single-line output for interactive sessions
    #[default]
    Compact,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to compact
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `warn` or `ticktick_assistant=debug`
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Service name attached to the startup event
    pub service_name: String,
    /// Service version attached to the startup event
    pub service_version: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_owned(),
            format: LogFormat::default(),
            include_location: false,
            service_name: service_names::TICKTICK_ASSISTANT.to_owned(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl LoggingConfig {
    /// Read the configuration from `RUST_LOG`, `LOG_FORMAT` and `LOG_INCLUDE_LOCATION`
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var(LEVEL_ENV_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_owned());

        Self {
            level,
            format: env::var(FORMAT_ENV_VAR)
                .map(|name| LogFormat::parse(&name))
                .unwrap_or_default(),
            include_location: env::var_os(LOCATION_ENV_VAR).is_some(),
            ..Self::default()
        }
    }

    /// Override the filter directives (the CLI's `--verbose` flag)
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Build the filter, capping HTTP client internals at `warn`
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        NOISY_TARGETS
            .iter()
            .fold(EnvFilter::new(&self.level), |filter, target| {
                let directive = format!("{target}=warn")
                    .parse()
                    .unwrap_or_else(|_| Level::WARN.into());
                filter.add_directive(directive)
            })
    }

    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());
        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_file(self.include_location)
            .with_line_number(self.include_location);

        match self.format {
            LogFormat::Json => registry.with(layer.json()).try_init()?,
            LogFormat::Compact => registry
                .with(layer.compact().with_target(false))
                .try_init()?,
        }

        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            log.level = %self.level,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}
