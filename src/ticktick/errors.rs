// ABOUTME: Typed failures raised by the TickTick service client
// ABOUTME: Converts into AppError so tool dispatch can encode them as tool results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use reqwest::Error as ReqwestError;
use thiserror::Error;

use crate::errors::{AppError, ErrorCode};

/// Maximum number of body characters quoted in an invalid-JSON error
const BODY_SNIPPET_CHARS: usize = 200;

/// Result type for service client calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a single backing-service call
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Non-success HTTP status
    #[error("Failed to {operation}: {status}")]
    Status {
        /// What the call was doing, e.g. "fetch projects"
        operation: String,
        /// HTTP status code
        status: u16,
    },

    /// Success status but the body is not the expected JSON
    #[error("Invalid JSON response: {snippet}")]
    InvalidJson {
        /// Leading part of the offending body
        snippet: String,
    },

    /// Request could not be sent or its body could not be read
    #[error("Failed to {operation}: {source}")]
    Transport {
        /// What the call was doing
        operation: String,
        /// Underlying reqwest error
        #[source]
        source: ReqwestError,
    },

    /// Extended API call attempted without a session token
    #[error("A TickTick session token is required to {operation}")]
    SessionRequired {
        /// What the call was doing
        operation: String,
    },
}

impl ServiceError {
    /// Status failure for `operation`
    #[must_use]
    pub fn status(operation: impl Into<String>, status: u16) -> Self {
        Self::Status {
            operation: operation.into(),
            status,
        }
    }

    /// Invalid JSON body, quoting at most the first 200 characters
    #[must_use]
    pub fn invalid_json(body: &str) -> Self {
        Self::InvalidJson {
            snippet: body.chars().take(BODY_SNIPPET_CHARS).collect(),
        }
    }

    /// Missing session token for `operation`
    #[must_use]
    pub fn session_required(operation: impl Into<String>) -> Self {
        Self::SessionRequired {
            operation: operation.into(),
        }
    }

    /// Error code matching this failure
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Status { status, .. } => match *status {
                401 | 403 => ErrorCode::ExternalAuthFailed,
                404 => ErrorCode::ResourceNotFound,
                429 => ErrorCode::ExternalRateLimited,
                500..=599 => ErrorCode::ExternalServiceUnavailable,
                _ => ErrorCode::ExternalServiceError,
            },
            Self::InvalidJson { .. } => ErrorCode::InvalidFormat,
            Self::Transport { .. } => ErrorCode::ExternalServiceUnavailable,
            Self::SessionRequired { .. } => ErrorCode::AuthInvalid,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(error: ServiceError) -> Self {
        let code = error.code();
        let message = error.to_string();
        Self::new(code, message).with_source(error)
    }
}
