// ABOUTME: Tools command: prints the catalog offered to the model at a feature level
// ABOUTME: Plain table by default, full definitions with --json
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use ticktick_assistant::config::FeatureLevel;
use ticktick_assistant::tools::{base_tools, extended_only_tools, ToolDefinition};

/// Print the tool catalog for `level`
pub fn list(level: FeatureLevel, json: bool) -> Result<()> {
    let mut tools = base_tools();
    if level == FeatureLevel::Extended {
        tools.extend(extended_only_tools());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    println!("Tool catalog {level} ({} tools)", tools.len());
    println!("{}", "=".repeat(80));
    for tool in &tools {
        print_row(tool);
    }
    Ok(())
}

fn print_row(tool: &ToolDefinition) {
    let confirm = if tool.requires_confirmation {
        " [confirm]"
    } else {
        ""
    };
    println!(
        "{:<22} {}{confirm}",
        tool.name,
        tool.capabilities.describe()
    );
    println!("    {}", tool.description);
}
