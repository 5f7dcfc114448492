// ABOUTME: Re-exports application constants from the core crate
// ABOUTME: Cache TTLs, tool loop limits, vendor endpoints and TickTick values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Constants are defined in `ticktick_assistant_core::constants`.

pub use ticktick_assistant_core::constants::*;
