// ABOUTME: Confirmation gate: a request/response channel between the tool loop and the UI
// ABOUTME: Each request carries a oneshot responder; a dropped responder counts as a denial
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Confirmation Gate
//!
//! The tool loop suspends on [`ConfirmationGate::request`] for every call to a
//! tool that requires confirmation. The UI side owns the matching
//! [`ConfirmationRequests`] receiver, shows each [`PendingConfirmation`] and
//! answers through [`ConfirmationRequest::confirm`] or
//! [`ConfirmationRequest::deny`].
//!
//! No timeout is applied here; an unanswered request waits until the turn is
//! cancelled. Dropping a request, or the receiver, answers "no".

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::llm::ToolCall;
use crate::tools::ToolDefinition;

/// Calls are processed sequentially, so at most one request is in flight per turn
const CHANNEL_CAPACITY: usize = 1;

/// A tool call awaiting the user's decision
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirmation {
    /// The call the model made
    pub tool_call: ToolCall,
    /// Definition of the called tool
    pub tool_definition: ToolDefinition,
}

/// One confirmation question plus the way to answer it
#[derive(Debug)]
pub struct ConfirmationRequest {
    pending: PendingConfirmation,
    responder: oneshot::Sender<bool>,
}

impl ConfirmationRequest {
    /// The call awaiting a decision
    #[must_use]
    pub const fn pending(&self) -> &PendingConfirmation {
        &self.pending
    }

    /// Approve the call
    pub fn confirm(self) {
        self.resolve(true);
    }

    /// Reject the call
    pub fn deny(self) {
        self.resolve(false);
    }

    /// Answer with an explicit decision
    pub fn resolve(self, approved: bool) {
        if self.responder.send(approved).is_err() {
            debug!(
                tool = %self.pending.tool_call.name,
                "Confirmation answered after the turn stopped waiting"
            );
        }
    }
}

/// Sending half held by the tool loop
#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    sender: mpsc::Sender<ConfirmationRequest>,
}

/// Receiving half held by the UI
#[derive(Debug)]
pub struct ConfirmationRequests {
    receiver: mpsc::Receiver<ConfirmationRequest>,
}

impl ConfirmationGate {
    /// Create a connected gate and request receiver
    #[must_use]
    pub fn channel() -> (Self, ConfirmationRequests) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        (Self { sender }, ConfirmationRequests { receiver })
    }

    /// Ask the user and wait for the answer
    ///
    /// Returns `false` when the receiver is gone or the request is dropped
    /// without an answer.
    pub async fn request(&self, pending: PendingConfirmation) -> bool {
        let tool = pending.tool_call.name.clone();
        let (responder, answer) = oneshot::channel();

        if self
            .sender
            .send(ConfirmationRequest { pending, responder })
            .await
            .is_err()
        {
            warn!(%tool, "No confirmation handler listening, denying");
            return false;
        }

        answer.await.unwrap_or_else(|_| {
            warn!(%tool, "Confirmation request dropped unanswered, denying");
            false
        })
    }
}

impl ConfirmationRequests {
    /// Next confirmation request, or `None` once every gate is dropped
    pub async fn recv(&mut self) -> Option<ConfirmationRequest> {
        self.receiver.recv().await
    }
}
