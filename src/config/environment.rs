// ABOUTME: Environment-based configuration for the assistant (model vendor, TickTick, loop limits)
// ABOUTME: Loads, validates and summarizes AssistantConfig without ever printing secrets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment configuration
//!
//! Every setting comes from the process environment. Tests inject values through
//! [`AssistantConfig::from_lookup`] instead of mutating the real environment.

use std::env;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use super::types::{FeatureLevel, LlmProviderType};
use crate::constants::{cache, ticktick, tool_loop};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::ticktick::Credentials;

/// Environment variable for the model identifier
pub const MODEL_ENV_VAR: &str = "ASSISTANT_LLM_MODEL";
/// Environment variable for a vendor-agnostic API key
pub const API_KEY_ENV_VAR: &str = "ASSISTANT_LLM_API_KEY";
/// Environment variable for the model base URL or relay prefix
pub const LLM_BASE_URL_ENV_VAR: &str = "ASSISTANT_LLM_BASE_URL";
/// Environment variable for the iteration cap
pub const MAX_ITERATIONS_ENV_VAR: &str = "ASSISTANT_MAX_TOOL_ITERATIONS";
/// Environment variable for the snapshot cache TTL in seconds
pub const CACHE_TTL_ENV_VAR: &str = "ASSISTANT_CACHE_TTL_SECS";
/// Environment variable for the timezone shown to the model
pub const TIMEZONE_ENV_VAR: &str = "ASSISTANT_TIMEZONE";
/// TickTick OAuth access token
pub const ACCESS_TOKEN_ENV_VAR: &str = "TICKTICK_ACCESS_TOKEN";
/// TickTick session token for the extended API
pub const SESSION_TOKEN_ENV_VAR: &str = "TICKTICK_SESSION_TOKEN";
/// TickTick base API root override
pub const TICKTICK_BASE_URL_ENV_VAR: &str = "TICKTICK_BASE_URL";
/// TickTick extended API root override
pub const TICKTICK_V2_BASE_URL_ENV_VAR: &str = "TICKTICK_V2_BASE_URL";

/// Values supplied on the command line that take precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Provider override
    pub provider: Option<LlmProviderType>,
    /// Model override
    pub model: Option<String>,
    /// Iteration cap override
    pub max_iterations: Option<usize>,
}

/// TickTick connection settings
#[derive(Clone)]
pub struct TickTickConfig {
    /// OAuth bearer token for the base API
    pub access_token: String,
    /// Session token for the extended API
    pub session_token: Option<String>,
    /// Base API root
    pub base_url: String,
    /// Extended API root
    pub v2_base_url: String,
}

impl Debug for TickTickConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TickTickConfig")
            .field("access_token", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.base_url)
            .field("v2_base_url", &self.v2_base_url)
            .finish()
    }
}

/// Complete assistant configuration
#[derive(Clone)]
pub struct AssistantConfig {
    /// Selected model vendor
    pub provider: LlmProviderType,
    /// Model identifier
    pub model: String,
    /// Model vendor API key
    pub api_key: String,
    /// Optional base URL override (relay prefix or self-hosted endpoint)
    pub llm_base_url: Option<String>,
    /// TickTick settings
    pub ticktick: TickTickConfig,
    /// API tier requested by the user (see [`AssistantConfig::feature_level`])
    pub requested_feature_level: FeatureLevel,
    /// Cap on request/tool-execution cycles per turn
    pub max_iterations: usize,
    /// Snapshot cache TTL
    pub cache_ttl: Duration,
    /// Timezone name shown in the system prompt
    pub timezone: String,
}

impl AssistantConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required value is missing or a value fails to parse.
    pub fn from_env() -> AppResult<Self> {
        Self::from_env_with(&ConfigOverrides::default())
    }

    /// Load configuration from environment variables with command-line overrides
    ///
    /// # Errors
    ///
    /// Returns an error if a required value is missing or a value fails to parse.
    pub fn from_env_with(overrides: &ConfigOverrides) -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok(), overrides)
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a required value is missing or a value fails to parse.
    pub fn from_lookup<F>(lookup: F, overrides: &ConfigOverrides) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let provider = overrides.provider.unwrap_or_else(|| {
            get(LlmProviderType::ENV_VAR)
                .map(|s| LlmProviderType::from_str_or_default(&s))
                .unwrap_or_default()
        });

        let model = overrides
            .model
            .clone()
            .or_else(|| get(MODEL_ENV_VAR))
            .unwrap_or_else(|| provider.default_model().to_owned());

        let api_key = get(API_KEY_ENV_VAR)
            .or_else(|| get(provider.api_key_env_var()))
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::ConfigMissing,
                    format!(
                        "{API_KEY_ENV_VAR} or {} must be set for provider {provider}",
                        provider.api_key_env_var()
                    ),
                )
            })?;

        let access_token = get(ACCESS_TOKEN_ENV_VAR).ok_or_else(|| {
            AppError::new(
                ErrorCode::ConfigMissing,
                format!("{ACCESS_TOKEN_ENV_VAR} must be set"),
            )
        })?;

        let max_iterations = match overrides.max_iterations {
            Some(value) => value,
            None => parse_or(
                get(MAX_ITERATIONS_ENV_VAR),
                MAX_ITERATIONS_ENV_VAR,
                tool_loop::DEFAULT_MAX_ITERATIONS,
            )?,
        };

        let cache_ttl_secs = parse_or(
            get(CACHE_TTL_ENV_VAR),
            CACHE_TTL_ENV_VAR,
            cache::SNAPSHOT_TTL_SECS,
        )?;

        let config = Self {
            provider,
            model,
            api_key,
            llm_base_url: get(LLM_BASE_URL_ENV_VAR),
            ticktick: TickTickConfig {
                access_token,
                session_token: get(SESSION_TOKEN_ENV_VAR),
                base_url: get(TICKTICK_BASE_URL_ENV_VAR)
                    .unwrap_or_else(|| ticktick::V1_BASE_URL.to_owned()),
                v2_base_url: get(TICKTICK_V2_BASE_URL_ENV_VAR)
                    .unwrap_or_else(|| ticktick::V2_BASE_URL.to_owned()),
            },
            requested_feature_level: get(FeatureLevel::ENV_VAR)
                .map(|s| FeatureLevel::from_str_or_default(&s))
                .unwrap_or_default(),
            max_iterations,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            timezone: get(TIMEZONE_ENV_VAR)
                .or_else(|| get("TZ"))
                .unwrap_or_else(|| "UTC".to_owned()),
        };

        config.validate()?;
        debug!(summary = %config.summary(), "Configuration loaded");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a URL does not parse or the iteration cap is zero.
    pub fn validate(&self) -> AppResult<()> {
        if self.max_iterations == 0 {
            return Err(AppError::new(
                ErrorCode::ConfigInvalid,
                format!("{MAX_ITERATIONS_ENV_VAR} must be at least 1"),
            ));
        }

        let mut urls = vec![
            (TICKTICK_BASE_URL_ENV_VAR, self.ticktick.base_url.as_str()),
            (
                TICKTICK_V2_BASE_URL_ENV_VAR,
                self.ticktick.v2_base_url.as_str(),
            ),
        ];
        if let Some(base) = &self.llm_base_url {
            urls.push((LLM_BASE_URL_ENV_VAR, base.as_str()));
        }

        for (name, value) in urls {
            Url::parse(value).map_err(|e| {
                AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!("{name} is not a valid URL ({value}): {e}"),
                )
            })?;
        }

        Ok(())
    }

    /// Catalog tier actually in effect for these credentials
    #[must_use]
    pub const fn feature_level(&self) -> FeatureLevel {
        self.requested_feature_level
            .effective(self.ticktick.session_token.is_some())
    }

    /// TickTick credentials for tool execution
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.ticktick.access_token.clone(),
            self.ticktick.session_token.clone(),
        )
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "provider={} model={} base_url={} api={} max_iterations={} cache_ttl={}s timezone={}",
            self.provider,
            self.model,
            self.llm_base_url.as_deref().unwrap_or("default"),
            self.feature_level(),
            self.max_iterations,
            self.cache_ttl.as_secs(),
            self.timezone
        )
    }
}

impl Debug for AssistantConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AssistantConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .field("llm_base_url", &self.llm_base_url)
            .field("ticktick", &self.ticktick)
            .field("requested_feature_level", &self.requested_feature_level)
            .field("max_iterations", &self.max_iterations)
            .field("cache_ttl", &self.cache_ttl)
            .field("timezone", &self.timezone)
            .finish()
    }
}

fn parse_or<T>(value: Option<String>, name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e| {
            AppError::new(
                ErrorCode::ConfigInvalid,
                format!("Invalid {name} value '{raw}': {e}"),
            )
        })
    })
}
