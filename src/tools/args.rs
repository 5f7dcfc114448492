// ABOUTME: Typed accessors over the JSON arguments object of a tool call
// ABOUTME: Missing or mistyped values become ToolError so they surface as tool results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde_json::{Map, Value};

use crate::errors::ToolError;

/// Borrowed view of one call's arguments
#[derive(Debug, Clone, Copy)]
pub struct ToolArgs<'a> {
    tool: &'a str,
    values: &'a Map<String, Value>,
}

impl<'a> ToolArgs<'a> {
    /// Wrap the arguments of a call to `tool`
    #[must_use]
    pub const fn new(tool: &'a str, values: &'a Map<String, Value>) -> Self {
        Self { tool, values }
    }

    /// Name of the tool being executed
    #[must_use]
    pub const fn tool(&self) -> &'a str {
        self.tool
    }

    /// Raw value of a present, non-null argument
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    /// Required string argument
    ///
    /// # Errors
    ///
    /// Returns a missing-parameter error when absent or null, and an
    /// invalid-parameter error when not a string
    pub fn required_str(&self, key: &str) -> Result<&'a str, ToolError> {
        self.optional_str(key)?
            .ok_or_else(|| ToolError::missing_parameter(self.tool, key))
    }

    /// Optional string argument; absent and null both read as `None`
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error when present but not a string
    pub fn optional_str(&self, key: &str) -> Result<Option<&'a str>, ToolError> {
        self.get(key)
            .map(|value| {
                value.as_str().ok_or_else(|| {
                    ToolError::invalid_parameter(self.tool, key, "expected a string")
                })
            })
            .transpose()
    }

    /// Optional non-empty string argument
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error when present but not a string
    pub fn optional_non_empty_str(&self, key: &str) -> Result<Option<&'a str>, ToolError> {
        Ok(self.optional_str(key)?.filter(|s| !s.is_empty()))
    }

    /// Optional integral number argument (`5` and `5.0` both read as 5)
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error when present but not an integral number
    pub fn optional_i64(&self, key: &str) -> Result<Option<i64>, ToolError> {
        self.get(key)
            .map(|value| {
                value
                    .as_i64()
                    .or_else(|| {
                        value
                            .as_f64()
                            .filter(|f| f.fract() == 0.0)
                            .map(|f| f as i64)
                    })
                    .ok_or_else(|| {
                        ToolError::invalid_parameter(self.tool, key, "expected an integer")
                    })
            })
            .transpose()
    }

    /// Copy every listed key present in the arguments into `target`
    ///
    /// An explicit `null` is copied as `null` so the service clears the field.
    pub fn copy_present(&self, keys: &[&str], target: &mut Map<String, Value>) {
        for key in keys {
            if let Some(value) = self.values.get(*key) {
                target.insert((*key).to_owned(), value.clone());
            }
        }
    }
}
