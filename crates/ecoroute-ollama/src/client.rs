// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama chat API.
//!
//! Provides [`OllamaClient`], which posts non-streaming `/api/chat` requests
//! and maps transport, status and decoding failures to inference errors.
//! Requests are never retried: each call is metered by the caller.

use std::time::Duration;

use ecoroute_core::{ChatMessage, EcorouteError};
use tracing::debug;

use crate::types::{ChatRequest, ChatResponse, ErrorResponse};

/// HTTP client for an Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    chat_url: String,
}

impl OllamaClient {
    /// Creates a client for the server at `base_url` (e.g. `http://localhost:11434`).
    ///
    /// `timeout` bounds each whole request including model load time.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EcorouteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EcorouteError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            chat_url: format!("{}/api/chat", base_url.trim_end_matches('/')),
        })
    }

    /// Full URL of the chat endpoint.
    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    /// Sends one chat request and returns the parsed response.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<ChatResponse, EcorouteError> {
        let request = ChatRequest {
            model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(&self.chat_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EcorouteError::Inference {
                model: model.to_string(),
                message: if e.is_timeout() {
                    "request timed out".into()
                } else {
                    format!("HTTP request failed: {e}")
                },
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model, "chat response received");

        let body = response.text().await.map_err(|e| EcorouteError::Inference {
            model: model.to_string(),
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(api_err) => format!("Ollama error ({status}): {}", api_err.error),
                Err(_) => format!("Ollama returned {status}: {body}"),
            };
            return Err(EcorouteError::inference(model, message));
        }

        serde_json::from_str(&body).map_err(|e| EcorouteError::Inference {
            model: model.to_string(),
            message: format!("failed to parse chat response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
