// ABOUTME: Chat command: a line-oriented REPL running one tool-loop turn per input line
// ABOUTME: Answers confirmations on stdin, cancels turns on Ctrl-C and persists history to a file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;
use std::pin::pin;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use ticktick_assistant::cache::CacheConfig;
use ticktick_assistant::config::{AssistantConfig, ConfigOverrides};
use ticktick_assistant::conversation::{
    ConfirmationGate, ConfirmationRequest, Conversation, StoredMessage, ToolLoop, TurnObserver,
    TurnOutcome, TurnRecorder, TurnRequest,
};
use ticktick_assistant::errors::AppResult;
use ticktick_assistant::llm::{build_system_prompt, HttpTransport, Message, ProviderAdapter, ToolCall};
use ticktick_assistant::ticktick::TickTickClient;
use ticktick_assistant::tools::ToolCatalog;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Longest tool result echoed to the terminal
const RESULT_PREVIEW_CHARS: usize = 200;

type InputLines = Lines<BufReader<Stdin>>;

/// Prints turn progress and records it for the conversation file
struct ConsoleObserver {
    recorder: TurnRecorder,
}

impl TurnObserver for ConsoleObserver {
    fn on_tool_call(&self, call: &ToolCall) {
        println!("  -> {} {}", call.name, Value::Object(call.arguments.clone()));
        self.recorder.on_tool_call(call);
    }

    fn on_tool_result(&self, call_id: &str, tool_name: &str, result: &str) {
        println!("  <- {tool_name}: {}", preview(result));
        self.recorder.on_tool_result(call_id, tool_name, result);
    }

    fn on_confirmation(&self, call: &ToolCall, approved: bool) {
        self.recorder.on_confirmation(call, approved);
    }
}

/// First `RESULT_PREVIEW_CHARS` characters of a tool result, with an ellipsis when cut
fn preview(result: &str) -> String {
    let mut shown: String = result.chars().take(RESULT_PREVIEW_CHARS).collect();
    if result.chars().nth(RESULT_PREVIEW_CHARS).is_some() {
        shown.push_str("...");
    }
    shown
}

/// Everything that stays fixed for the session
struct Session {
    config: AssistantConfig,
    catalog: Arc<ToolCatalog>,
    tool_loop: ToolLoop,
    adapter: ProviderAdapter,
}

impl Session {
    fn new(config: AssistantConfig) -> AppResult<Self> {
        let service = Arc::new(TickTickClient::new(
            config.ticktick.base_url.clone(),
            config.ticktick.v2_base_url.clone(),
        )?);
        let catalog = Arc::new(ToolCatalog::new(
            service,
            &CacheConfig::with_ttl(config.cache_ttl),
        ));
        let transport = Arc::new(HttpTransport::new()?);
        let tool_loop = ToolLoop::new(transport, catalog.clone());
        let adapter = ProviderAdapter::for_provider(config.provider, config.llm_base_url.clone());
        Ok(Self {
            config,
            catalog,
            tool_loop,
            adapter,
        })
    }

    fn system_prompt(&self) -> String {
        build_system_prompt(Utc::now(), &self.config.timezone)
    }

    fn request(&self, messages: Vec<Message>) -> TurnRequest {
        let level = self.config.feature_level();
        TurnRequest::new(
            self.adapter.clone(),
            messages,
            self.catalog.list(level),
            self.config.model.clone(),
            self.config.api_key.clone(),
            self.config.credentials(),
            level,
        )
        .with_max_iterations(self.config.max_iterations)
    }
}

/// Run the chat REPL
pub async fn run(overrides: &ConfigOverrides, conversation_path: Option<&Path>) -> Result<()> {
    let config = AssistantConfig::from_env_with(overrides)?;
    info!(summary = %config.summary(), "Starting chat session");
    let session = Session::new(config)?;

    let mut conversation = match conversation_path {
        Some(path) if path.exists() => Some(Conversation::load(path).await?),
        _ => None,
    };
    let mut transcript = conversation.as_ref().map_or_else(
        || vec![Message::system(session.system_prompt())],
        |c| c.transcript(&session.system_prompt()),
    );

    println!(
        "Chatting with {} ({}), tools {}. Ctrl-C stops a running turn, /exit quits.",
        session.config.provider,
        session.config.model,
        session.config.feature_level()
    );

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        prompt("> ").await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if matches!(text, "/exit" | "/quit") {
            break;
        }

        // The system prompt carries the current time, so it is rebuilt per turn
        if let Some(system) = transcript.first_mut() {
            *system = Message::system(session.system_prompt());
        }
        transcript.push(Message::user(text));
        let record = conversation.get_or_insert_with(|| Conversation::new(text));
        record.push(StoredMessage::user(text));

        let observer = ConsoleObserver {
            recorder: TurnRecorder::new(),
        };
        let result = run_turn(&session, transcript.clone(), &observer, &mut lines).await?;

        let content = match result {
            Ok(outcome) => {
                transcript = outcome.messages;
                println!("\n{}\n", outcome.text);
                outcome.text
            }
            Err(error) => {
                warn!(code = ?error.code, "Turn failed");
                let content = format!("Error: {}", error.message);
                println!("\n{content}\n");
                content
            }
        };
        record.push(observer.recorder.finish(
            content,
            session.config.provider.to_string(),
            session.config.model.clone(),
        ));

        if let Some(path) = conversation_path {
            if let Err(error) = record.save(path).await {
                warn!(%error, "Failed to save conversation");
            }
        }
    }

    Ok(())
}

/// Drive one turn, answering confirmations and watching for Ctrl-C
///
/// The outer result is a terminal I/O failure; the inner one is the turn's.
async fn run_turn(
    session: &Session,
    messages: Vec<Message>,
    observer: &ConsoleObserver,
    lines: &mut InputLines,
) -> Result<AppResult<TurnOutcome>> {
    let (gate, mut requests) = ConfirmationGate::channel();
    let cancel = CancellationToken::new();
    let mut turn = pin!(session.tool_loop.run(
        session.request(messages),
        observer,
        Some(&gate),
        &cancel
    ));

    loop {
        tokio::select! {
            outcome = &mut turn => return Ok(outcome),
            Some(request) = requests.recv() => {
                answer_confirmation(request, lines, &cancel).await?;
            }
            interrupted = signal::ctrl_c(), if !cancel.is_cancelled() => {
                interrupted?;
                println!("\nStopping...");
                cancel.cancel();
            }
        }
    }
}

async fn answer_confirmation(
    request: ConfirmationRequest,
    lines: &mut InputLines,
    cancel: &CancellationToken,
) -> Result<()> {
    let pending = request.pending();
    println!(
        "\nThe assistant wants to run {} with {}",
        pending.tool_call.name,
        Value::Object(pending.tool_call.arguments.clone())
    );
    prompt("Allow? [y/N] ").await?;

    tokio::select! {
        line = lines.next_line() => {
            let approved = line?.is_some_and(|answer| {
                matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
            });
            request.resolve(approved);
        }
        interrupted = signal::ctrl_c() => {
            interrupted?;
            println!("\nStopping...");
            cancel.cancel();
            request.deny();
        }
    }
    Ok(())
}

async fn prompt(text: &str) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_counts_characters() {
        let exact = "é".repeat(RESULT_PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);

        let longer = "é".repeat(RESULT_PREVIEW_CHARS + 1);
        let shown = preview(&longer);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), RESULT_PREVIEW_CHARS + 3);

        assert_eq!(preview(r#"{"success":true}"#), r#"{"success":true}"#);
    }
}
