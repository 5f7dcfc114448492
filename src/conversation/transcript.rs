// ABOUTME: Persisted conversation records and rebuilding a model transcript from them
// ABOUTME: TurnRecorder observes a running turn and produces the assistant record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Conversation Records
//!
//! Only plain text is persisted. Vendor payloads stay in memory for the
//! lifetime of a session; a reloaded conversation is rebuilt from the user
//! and assistant texts with a freshly generated system prompt.

use std::iter;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::llm::{Message, ToolCall};

use super::tool_loop::TurnObserver;

/// Characters of the first user message used as the conversation title
const TITLE_MAX_CHARS: usize = 50;

// ============================================================================
// Records
// ============================================================================

/// Author of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredRole {
    /// The person chatting
    User,
    /// The assistant
    Assistant,
}

/// A tool call shown under an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToolCall {
    /// Correlation id
    pub id: String,
    /// Tool name
    pub name: String,
    /// Arguments the model passed
    pub args: Map<String, Value>,
    /// JSON result, once available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// State of a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    /// Waiting for the user
    Pending,
    /// Approved
    Confirmed,
    /// Declined
    Cancelled,
}

/// A confirmation prompt shown under an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfirmation {
    /// Id of the tool call it gates
    pub id: String,
    /// Tool name
    pub tool_name: String,
    /// Arguments the model passed
    pub args: Map<String, Value>,
    /// Current state
    pub status: ConfirmationStatus,
}

/// One displayed message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    /// Message id
    pub id: String,
    /// Author
    pub role: StoredRole,
    /// Text content
    pub content: String,
    /// Provider that produced an assistant message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Model that produced an assistant message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Tools called while producing this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<StoredToolCall>>,
    /// Confirmations requested while producing this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<Vec<StoredConfirmation>>,
}

impl StoredMessage {
    /// A user message with a fresh id
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: StoredRole::User,
            content: content.into(),
            provider: None,
            model: None,
            tool_calls: None,
            confirmations: None,
        }
    }

    /// An assistant message with a fresh id
    #[must_use]
    pub fn assistant(
        content: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: StoredRole::Assistant,
            content: content.into(),
            provider: Some(provider.into()),
            model: Some(model.into()),
            tool_calls: None,
            confirmations: None,
        }
    }
}

/// A saved conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Conversation id
    pub id: String,
    /// Title derived from the first user message
    pub title: String,
    /// Displayed messages in order
    pub messages: Vec<StoredMessage>,
    /// Creation time, milliseconds since the Unix epoch
    pub created_at: i64,
    /// Last update time, milliseconds since the Unix epoch
    pub updated_at: i64,
}

impl Conversation {
    /// Start a conversation titled after its first user message
    #[must_use]
    pub fn new(first_user_text: &str) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            title: first_user_text.trim().chars().take(TITLE_MAX_CHARS).collect(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump the update time
    pub fn push(&mut self, message: StoredMessage) {
        self.messages.push(message);
        self.updated_at = Utc::now().timestamp_millis();
    }

    /// Model transcript for continuing this conversation
    #[must_use]
    pub fn transcript(&self, system_prompt: &str) -> Vec<Message> {
        rebuild_transcript(system_prompt, &self.messages)
    }

    /// Read a conversation from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a conversation
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path).await.map_err(|e| {
            AppError::internal(format!("Failed to read {}: {e}", path.display())).with_source(e)
        })?;
        let conversation: Self = serde_json::from_str(&raw)?;
        debug!(messages = conversation.messages.len(), "Conversation loaded");
        Ok(conversation)
    }

    /// Write this conversation to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn save(&self, path: &Path) -> AppResult<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).await.map_err(|e| {
            AppError::internal(format!("Failed to write {}: {e}", path.display())).with_source(e)
        })?;
        debug!(messages = self.messages.len(), "Conversation saved");
        Ok(())
    }
}

/// Rebuild a model transcript from stored messages
///
/// The result starts with `system_prompt` followed by one plain-text message
/// per stored message, in order.
#[must_use]
pub fn rebuild_transcript(system_prompt: &str, stored: &[StoredMessage]) -> Vec<Message> {
    iter::once(Message::system(system_prompt))
        .chain(stored.iter().map(|message| match message.role {
            StoredRole::User => Message::user(message.content.clone()),
            StoredRole::Assistant => Message::assistant(message.content.clone()),
        }))
        .collect()
}

// ============================================================================
// Recorder
// ============================================================================

#[derive(Default)]
struct RecordedTurn {
    tool_calls: Vec<StoredToolCall>,
    confirmations: Vec<StoredConfirmation>,
}

/// Observer collecting what happened during one turn
#[derive(Default)]
pub struct TurnRecorder {
    recorded: Mutex<RecordedTurn>,
}

impl TurnRecorder {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the assistant record for the finished turn
    #[must_use]
    pub fn finish(
        self,
        content: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> StoredMessage {
        let recorded = self
            .recorded
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let mut message = StoredMessage::assistant(content, provider, model);
        message.tool_calls = Some(recorded.tool_calls).filter(|calls| !calls.is_empty());
        message.confirmations = Some(recorded.confirmations).filter(|c| !c.is_empty());
        message
    }

    fn with_recorded(&self, update: impl FnOnce(&mut RecordedTurn)) {
        let mut recorded = self
            .recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        update(&mut recorded);
    }
}

impl TurnObserver for TurnRecorder {
    fn on_tool_call(&self, call: &ToolCall) {
        self.with_recorded(|recorded| {
            recorded.tool_calls.push(StoredToolCall {
                id: call.id.clone(),
                name: call.name.clone(),
                args: call.arguments.clone(),
                result: None,
            });
        });
    }

    fn on_tool_result(&self, call_id: &str, _tool_name: &str, result: &str) {
        self.with_recorded(|recorded| {
            // Declined calls never started, so they have no entry to update
            if let Some(call) = recorded.tool_calls.iter_mut().find(|c| c.id == call_id) {
                call.result = Some(result.to_owned());
            }
        });
    }

    fn on_confirmation(&self, call: &ToolCall, approved: bool) {
        let status = if approved {
            ConfirmationStatus::Confirmed
        } else {
            ConfirmationStatus::Cancelled
        };
        self.with_recorded(|recorded| {
            recorded.confirmations.push(StoredConfirmation {
                id: call.id.clone(),
                tool_name: call.name.clone(),
                args: call.arguments.clone(),
                status,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;

    #[test]
    fn test_title_is_first_fifty_chars() {
        let text = "a".repeat(80);
        let conversation = Conversation::new(&text);
        assert_eq!(conversation.title.chars().count(), 50);
        assert!(conversation.messages.is_empty());
    }

    #[test]
    fn test_rebuild_starts_with_fresh_system_prompt() {
        let stored = vec![
            StoredMessage::user("hi"),
            StoredMessage::assistant("hello", "claude", "claude-sonnet-4-6"),
        ];
        let transcript = rebuild_transcript("prompt", &stored);
        let roles: Vec<MessageRole> = transcript.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(transcript[0].text(), Some("prompt"));
        assert_eq!(transcript[2].text(), Some("hello"));
    }

    #[test]
    fn test_recorder_ignores_result_without_call() {
        let recorder = TurnRecorder::new();
        recorder.on_tool_result("missing", "delete_task", "{}");
        let message = recorder.finish("done", "openai", "gpt-4.1");
        assert!(message.tool_calls.is_none());
        assert!(message.confirmations.is_none());
    }

    #[test]
    fn test_stored_message_serializes_camel_case() {
        let mut message = StoredMessage::assistant("ok", "gemini", "gemini-2.5-flash");
        message.confirmations = Some(vec![StoredConfirmation {
            id: "c1".to_owned(),
            tool_name: "delete_task".to_owned(),
            args: Map::new(),
            status: ConfirmationStatus::Cancelled,
        }]);
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["confirmations"][0]["toolName"], "delete_task");
        assert_eq!(value["confirmations"][0]["status"], "cancelled");
        assert!(value.get("toolCalls").is_none());
    }
}
