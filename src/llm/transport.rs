// ABOUTME: HTTP transport for adapter-built model requests
// ABOUTME: LlmTransport trait with a reqwest implementation; status handling stays with the caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::LlmRequest;
use crate::constants::models::{CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};
use crate::constants::service_names;
use crate::errors::{from_reqwest, AppError, AppResult};

/// Raw HTTP reply from a model endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl TransportResponse {
    /// Whether the status is 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends an adapter-built request to a model endpoint
///
/// Implementations only move bytes. Status checking and JSON decoding belong
/// to the tool loop, so a scripted transport can stand in during tests.
#[async_trait]
pub trait LlmTransport: Send + Sync {
    /// POST the request and return the status and body
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be reached or the body cannot be read
    async fn send(&self, request: &LlmRequest) -> AppResult<TransportResponse>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default connect and request timeouts
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LlmTransport for HttpTransport {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn send(&self, request: &LlmRequest) -> AppResult<TransportResponse> {
        // Content type comes from the adapter's headers
        let mut builder = self.client.post(&request.url).body(request.body.to_string());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            warn!("Failed to send request to model endpoint: {e}");
            from_reqwest(service_names::LLM, e)
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| from_reqwest(service_names::LLM, e))?;

        debug!(status, body_len = body.len(), "Model endpoint replied");
        Ok(TransportResponse { status, body })
    }
}
