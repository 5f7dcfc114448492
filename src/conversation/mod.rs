// ABOUTME: Conversation orchestration: the tool loop, the confirmation gate and stored records
// ABOUTME: Everything needed to run a turn and persist its visible result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Conversation
//!
//! - [`ToolLoop`] runs one turn against a transport and a tool catalog
//! - [`ConfirmationGate`] suspends the loop until the user approves a
//!   destructive call
//! - [`transcript`] holds the persisted records and [`TurnRecorder`]

/// Confirmation request/response channel
pub mod confirmation;
/// Turn state machine
pub mod tool_loop;
/// Stored conversations and transcript rebuild
pub mod transcript;

pub use confirmation::{
    ConfirmationGate, ConfirmationRequest, ConfirmationRequests, PendingConfirmation,
};
pub use tool_loop::{NoopObserver, ToolLoop, TurnObserver, TurnOutcome, TurnRequest, TurnStatus};
pub use transcript::{
    rebuild_transcript, ConfirmationStatus, Conversation, StoredConfirmation, StoredMessage,
    StoredRole, StoredToolCall, TurnRecorder,
};
