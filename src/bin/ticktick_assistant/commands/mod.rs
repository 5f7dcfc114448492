// ABOUTME: Command modules for the ticktick-assistant CLI
// ABOUTME: Chat REPL, tool catalog listing and extended-API sign-in
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod chat;
pub mod sign_in;
pub mod tools;
