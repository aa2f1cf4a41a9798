// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classify-then-route flow against a scripted backend.

use ecoroute_config::model::RoutingConfig;
use ecoroute_core::{ComplexityScore, ModelTier};
use ecoroute_router::{ComplexityClassifier, ModelRouter};
use ecoroute_test_utils::MockBackend;

async fn tier_for_reply(reply: &str) -> (ComplexityScore, ModelTier) {
    let config = RoutingConfig::default();
    let mock = MockBackend::new().reply(&config.classifier_model, reply);
    let classifier = ComplexityClassifier::new(config.classifier_model.clone());
    let router = ModelRouter::new(&config);
    let score = classifier.classify(&mock, "prompt").await.unwrap();
    (score, router.route(score))
}

#[tokio::test]
async fn verbose_high_score_routes_large() {
    let (score, tier) = tier_for_reply("Complexity: 8/10 because of the proof.").await;
    assert_eq!(score, ComplexityScore::Score(8));
    assert_eq!(tier, ModelTier::Large);
}

#[tokio::test]
async fn threshold_score_stays_small() {
    let (score, tier) = tier_for_reply("5").await;
    assert_eq!(score, ComplexityScore::Score(5));
    assert_eq!(tier, ModelTier::Small);
}

#[tokio::test]
async fn unparsable_reply_stays_small() {
    let (score, tier) = tier_for_reply("I cannot rate this.").await;
    assert!(score.is_unknown());
    assert_eq!(tier, ModelTier::Small);
}
