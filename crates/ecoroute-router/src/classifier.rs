// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Judge-model prompt complexity classification.
//!
//! Asks a lightweight model to rate a prompt from 1 to 10 and extracts the
//! score from its reply. One backend call per prompt.

use ecoroute_core::{ChatMessage, ComplexityScore, EcorouteError, InferenceBackend};
use tracing::debug;

use crate::rating::extract_rating;

/// Build the classification instruction for `prompt`.
pub fn complexity_prompt(prompt: &str) -> String {
    format!(
        "Analyze the following prompt and rate its complexity from 1 to 10:\n\n\
         Prompt: {prompt}\n\n\
         Only respond with the complexity score (1-10)."
    )
}

/// Rates prompt complexity with a judge model.
#[derive(Debug, Clone)]
pub struct ComplexityClassifier {
    model: String,
}

impl ComplexityClassifier {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// The judge model id.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classify `prompt`.
    ///
    /// Inference failures are returned as `Err`; a reply with no extractable
    /// score is `Ok(ComplexityScore::Unknown)`.
    pub async fn classify(
        &self,
        backend: &dyn InferenceBackend,
        prompt: &str,
    ) -> Result<ComplexityScore, EcorouteError> {
        let messages = [ChatMessage::user(complexity_prompt(prompt))];
        let reply = backend.generate(&self.model, &messages).await?;
        let score = extract_rating(&reply);
        debug!(
            model = self.model.as_str(),
            reply = reply.trim(),
            score = %score,
            "complexity classified"
        );
        Ok(score)
    }
}
