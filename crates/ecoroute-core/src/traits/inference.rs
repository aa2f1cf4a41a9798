// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference backend trait for model servers (Ollama, test doubles).

use async_trait::async_trait;

use crate::error::EcorouteError;
use crate::types::ChatMessage;

/// A model server that turns a message history into a reply.
///
/// Implementations must not retry internally on behalf of the pipeline:
/// every call is metered, so a hidden retry would be attributed to the
/// wrong stage.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Run `model` over `messages` and return the reply text.
    async fn generate(&self, model: &str, messages: &[ChatMessage])
        -> Result<String, EcorouteError>;
}
