// ABOUTME: Sign-in command for the session-authenticated extended API
// ABOUTME: Prints the session token to export as TICKTICK_SESSION_TOKEN
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;

use anyhow::Result;
use ticktick_assistant::config::FeatureLevel;
use ticktick_assistant::config::environment::{
    SESSION_TOKEN_ENV_VAR, TICKTICK_BASE_URL_ENV_VAR, TICKTICK_V2_BASE_URL_ENV_VAR,
};
use ticktick_assistant::constants::ticktick::{V1_BASE_URL, V2_BASE_URL};
use ticktick_assistant::ticktick::{TaskService, TickTickClient};
use tracing::info;

/// Sign in and print the session token
pub async fn run(username: &str, password: &str) -> Result<()> {
    let client = TickTickClient::new(
        env::var(TICKTICK_BASE_URL_ENV_VAR).unwrap_or_else(|_| V1_BASE_URL.to_owned()),
        env::var(TICKTICK_V2_BASE_URL_ENV_VAR).unwrap_or_else(|_| V2_BASE_URL.to_owned()),
    )?;

    info!(%username, "Signing in to the extended API");
    let token = client.sign_in(username, password).await?;

    println!("\nSigned in. Extended tools are available with this session token:");
    println!("{}", "=".repeat(80));
    println!("export {SESSION_TOKEN_ENV_VAR}=\"{token}\"");
    println!("{}", "=".repeat(80));
    println!(
        "Set {}=v2 to offer the extended catalog to the model.",
        FeatureLevel::ENV_VAR
    );
    Ok(())
}
