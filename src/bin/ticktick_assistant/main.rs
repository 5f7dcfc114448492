// ABOUTME: TickTick assistant CLI - chat with a model that manages your TickTick tasks
// ABOUTME: Subcommands for the chat REPL, listing the tool catalog and extended-API sign-in
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Chat with the configured provider, keeping history in a file
//! ticktick-assistant chat --conversation ./history.json
//!
//! # Switch provider and model for one session
//! ticktick-assistant chat --provider gemini --model gemini-2.5-flash
//!
//! # Show the extended tool catalog as JSON
//! ticktick-assistant tools --level v2 --json
//!
//! # Obtain a session token for the extended API
//! ticktick-assistant sign-in --username me@example.com --password secret
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ticktick_assistant::config::{ConfigOverrides, FeatureLevel, LlmProviderType};
use ticktick_assistant::logging::LoggingConfig;

#[derive(Parser)]
#[command(
    name = "ticktick-assistant",
    about = "Conversational assistant for TickTick",
    long_about = "Chat with an LLM that can read and change your TickTick projects, tasks and tags."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session
    Chat {
        /// Conversation file to load and save
        #[arg(long)]
        conversation: Option<PathBuf>,

        /// Provider override (claude, openai, grok, gemini)
        #[arg(long)]
        provider: Option<LlmProviderType>,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Maximum model requests per turn
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// List the tools offered to the model
    Tools {
        /// Catalog tier (v1 or v2)
        #[arg(long, default_value = "v1")]
        level: FeatureLevel,

        /// Print the definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in to the extended API and print the session token
    SignIn {
        /// Account username or email
        #[arg(long)]
        username: String,

        /// Account password
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    logging.init()?;

    match cli.command {
        Command::Chat {
            conversation,
            provider,
            model,
            max_iterations,
        } => {
            let overrides = ConfigOverrides {
                provider,
                model,
                max_iterations,
            };
            commands::chat::run(&overrides, conversation.as_deref()).await?;
        }
        Command::Tools { level, json } => {
            commands::tools::list(level, json)?;
        }
        Command::SignIn { username, password } => {
            commands::sign_in::run(&username, &password).await?;
        }
    }

    Ok(())
}
