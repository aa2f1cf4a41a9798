// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model warm-up probing.
//!
//! A trivial query forces the model server to load a model, so the cost of
//! switching models lands in its own metered stage instead of the next real
//! call. The reply is discarded.

use ecoroute_core::{ChatMessage, InferenceBackend};
use tracing::{debug, warn};

/// Result of one warm-up probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarmupOutcome {
    /// The model answered.
    Loaded,
    /// The probe failed. The caller continues regardless.
    Failed(String),
}

impl WarmupOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

/// Sends a fixed warm-up query to a model.
#[derive(Debug, Clone)]
pub struct WarmupProber {
    prompt: String,
}

impl WarmupProber {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Probe `model`. Never fails; a failed probe is logged and reported.
    pub async fn probe(&self, backend: &dyn InferenceBackend, model: &str) -> WarmupOutcome {
        let messages = [ChatMessage::user(self.prompt.as_str())];
        match backend.generate(model, &messages).await {
            Ok(_) => {
                debug!(model, "warm-up probe answered");
                WarmupOutcome::Loaded
            }
            Err(e) => {
                warn!(model, error = %e, "warm-up probe failed, continuing");
                WarmupOutcome::Failed(e.to_string())
            }
        }
    }
}

impl Default for WarmupProber {
    fn default() -> Self {
        Self::new("What is 1+1?")
    }
}
