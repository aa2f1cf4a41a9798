// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama inference backend for ecoroute.
//!
//! This crate implements [`InferenceBackend`] for a local Ollama server using
//! non-streaming `/api/chat` calls.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use ecoroute_config::model::InferenceConfig;
use ecoroute_core::{ChatMessage, EcorouteError, InferenceBackend};
use tracing::{debug, info};

use crate::client::OllamaClient;

/// Ollama backend implementing [`InferenceBackend`].
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: OllamaClient,
}

impl OllamaBackend {
    /// Creates a backend from the `[inference]` section.
    pub fn new(config: &InferenceConfig) -> Result<Self, EcorouteError> {
        let client = OllamaClient::new(&config.base_url, Duration::from_secs(config.timeout_secs))?;
        info!(
            base_url = config.base_url.as_str(),
            timeout_secs = config.timeout_secs,
            "Ollama backend initialized"
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, EcorouteError> {
        let response = self.client.chat(model, messages).await?;
        debug!(
            model = response.model.as_str(),
            load_ns = response.load_duration,
            total_ns = response.total_duration,
            eval_count = response.eval_count,
            "generation finished"
        );
        Ok(response.message.content)
    }
}
