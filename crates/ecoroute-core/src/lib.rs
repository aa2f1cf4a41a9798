// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for ecoroute.
//!
//! This crate provides the error type, the data model shared by the routing
//! pipeline and the evaluator, and the two backend traits every adapter
//! implements.

pub mod error;
pub mod traits;
pub mod types;

pub use error::EcorouteError;
pub use traits::{EnergyBackend, InferenceBackend};
pub use types::{
    AnswerRecord, ChatMessage, ComplexityScore, EnergySample, ModelTier, PipelineStage,
    PromptRecord, RatingAggregate, RatingTrial, RecordOutcome, Role, StageDeltas,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecoroute_error_has_all_variants() {
        let _config = EcorouteError::Config("test".into());
        let _table = EcorouteError::Table {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _inference = EcorouteError::Inference {
            model: "m".into(),
            message: "test".into(),
            source: None,
        };
        let _timeout = EcorouteError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _meter = EcorouteError::Meter("test".into());
        let _internal = EcorouteError::Internal("test".into());
    }

    #[test]
    fn backend_traits_are_object_safe() {
        fn _assert_inference(_: &dyn InferenceBackend) {}
        fn _assert_energy(_: &mut dyn EnergyBackend) {}
    }

    #[test]
    fn chat_message_serializes_lowercase_role() {
        let msg = ChatMessage::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
    }
}
