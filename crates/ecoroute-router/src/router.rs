// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Threshold routing from complexity score to model tier.
//!
//! Scores strictly above the threshold go to the large tier. Everything else,
//! including an unknown score, stays on the small tier.

use ecoroute_config::model::RoutingConfig;
use ecoroute_core::{ComplexityScore, ModelTier};

/// Map `score` to a tier given `threshold`.
pub fn route(score: ComplexityScore, threshold: u8) -> ModelTier {
    match score {
        ComplexityScore::Score(v) if v > threshold => ModelTier::Large,
        _ => ModelTier::Small,
    }
}

/// Routes scores to tiers and tiers to configured model ids.
#[derive(Debug, Clone)]
pub struct ModelRouter {
    small_model: String,
    large_model: String,
    threshold: u8,
}

impl ModelRouter {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            small_model: config.small_model.clone(),
            large_model: config.large_model.clone(),
            threshold: config.large_threshold,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Tier for `score`.
    pub fn route(&self, score: ComplexityScore) -> ModelTier {
        route(score, self.threshold)
    }

    /// Configured model id for `tier`.
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Small => &self.small_model,
            ModelTier::Large => &self.large_model,
        }
    }
}
