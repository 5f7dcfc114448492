// ABOUTME: Re-exports the unified error types from the core crate
// ABOUTME: Keeps crate::errors paths stable for every module and the binary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! `AppError`, `ErrorCode`, `AppResult` and `ToolError` live in
//! `ticktick_assistant_core` and are re-exported here.

pub use ticktick_assistant_core::errors::*;

use reqwest::Error as ReqwestError;

/// Map a transport-level reqwest failure onto an `AppError`
#[must_use]
pub fn from_reqwest(service: &str, error: ReqwestError) -> AppError {
    let code = if error.is_timeout() || error.is_connect() {
        ErrorCode::ExternalServiceUnavailable
    } else {
        ErrorCode::ExternalServiceError
    };
    AppError::new(code, format!("{service}: {error}")).with_source(error)
}
