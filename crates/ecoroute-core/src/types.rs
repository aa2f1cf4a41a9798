// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the routing pipeline, the evaluator and the meter.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Marker written in place of a score or answer when a stage failed.
pub const ERROR_MARKER_PREFIX: &str = "[inference error";

/// Literal written for a score that could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";

/// One input prompt, read once from the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    /// Identifier taken from the configured id column.
    pub id: String,
    /// Prompt text sent to the models.
    pub prompt_text: String,
}

impl PromptRecord {
    pub fn new(id: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt_text: prompt_text.into(),
        }
    }
}

/// Role of a chat message sent to the inference backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single entry of the message history passed to `generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Prompt complexity as judged by the classifier model.
///
/// Valid scores are always in `1..=10`. Extraction failures are represented
/// by [`ComplexityScore::Unknown`], never by a negative number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplexityScore {
    Score(u8),
    Unknown,
}

impl ComplexityScore {
    /// Normalize a raw integer score.
    ///
    /// Values below 1 (including the legacy `-1` sentinel) become `Unknown`;
    /// values above 10 are clamped to 10.
    pub fn from_raw(raw: i64) -> Self {
        if raw < 1 {
            Self::Unknown
        } else {
            Self::Score(raw.min(10) as u8)
        }
    }

    /// The numeric score, if known.
    pub fn value(self) -> Option<u8> {
        match self {
            Self::Score(v) => Some(v),
            Self::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for ComplexityScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Score(v) => write!(f, "{v}"),
            Self::Unknown => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Model size class used to answer a prompt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModelTier {
    Small,
    Large,
}

/// Pipeline stages that receive an energy delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineStage {
    /// Warm-up of the small model before classification.
    Switch1,
    /// Complexity classification call.
    Complexity,
    /// Warm-up of the routed tier's model.
    Switch2,
    /// Answer generation on the routed tier.
    Answer,
}

/// A cumulative energy reading in kWh, taken at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct EnergySample(pub f64);

impl EnergySample {
    pub fn kwh(self) -> f64 {
        self.0
    }

    /// Energy consumed between `earlier` and `self`.
    pub fn since(self, earlier: EnergySample) -> f64 {
        self.0 - earlier.0
    }
}

/// Energy attributed to each stage of one record, in kWh.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageDeltas {
    pub switch1: f64,
    pub complexity: f64,
    pub switch2: f64,
    pub answer: f64,
}

impl StageDeltas {
    /// Sum of all stage deltas, equal to `S4 - S0` for a completed record.
    pub fn total(&self) -> f64 {
        self.switch1 + self.complexity + self.switch2 + self.answer
    }

    pub fn get(&self, stage: PipelineStage) -> f64 {
        match stage {
            PipelineStage::Switch1 => self.switch1,
            PipelineStage::Complexity => self.complexity,
            PipelineStage::Switch2 => self.switch2,
            PipelineStage::Answer => self.answer,
        }
    }

    pub fn set(&mut self, stage: PipelineStage, kwh: f64) {
        match stage {
            PipelineStage::Switch1 => self.switch1 = kwh,
            PipelineStage::Complexity => self.complexity = kwh,
            PipelineStage::Switch2 => self.switch2 = kwh,
            PipelineStage::Answer => self.answer = kwh,
        }
    }
}

/// How processing of a record ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Completed,
    Failed {
        stage: PipelineStage,
        message: String,
    },
}

impl RecordOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// The result of routing and answering one [`PromptRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub prompt_id: String,
    pub prompt_text: String,
    /// Tier the answer was generated on (`None` when classification failed).
    pub tier_used: Option<ModelTier>,
    /// Model id behind `tier_used`.
    pub model_used: Option<String>,
    pub complexity: ComplexityScore,
    /// Generated answer, or an error marker when a stage failed.
    pub answer: String,
    pub stage_deltas: StageDeltas,
    /// Switch stages whose warm-up probe failed. Their deltas still cover
    /// the attempted load.
    pub failed_warmups: Vec<PipelineStage>,
    pub outcome: RecordOutcome,
}

impl AnswerRecord {
    /// Column text for the complexity score, an error marker if classification failed.
    pub fn complexity_cell(&self) -> String {
        match &self.outcome {
            RecordOutcome::Failed {
                stage: PipelineStage::Complexity,
                message,
            } => error_marker(message),
            _ => self.complexity.to_string(),
        }
    }

    pub fn total_kwh(&self) -> f64 {
        self.stage_deltas.total()
    }

    /// Status column text: `ok` or `failed:<stage>`, followed by any failed
    /// warm-ups, e.g. `ok (warm-up failed: switch2)`.
    pub fn status(&self) -> String {
        let mut status = match &self.outcome {
            RecordOutcome::Completed => "ok".to_string(),
            RecordOutcome::Failed { stage, .. } => format!("failed:{stage}"),
        };
        if !self.failed_warmups.is_empty() {
            let stages: Vec<String> = self
                .failed_warmups
                .iter()
                .map(|s| s.to_string())
                .collect();
            status.push_str(&format!(" (warm-up failed: {})", stages.join(", ")));
        }
        status
    }
}

/// Format the marker that replaces a failed stage's output.
pub fn error_marker(message: &str) -> String {
    format!("{ERROR_MARKER_PREFIX}: {message}]")
}

/// One judge-model rating attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingTrial {
    /// A rating in `1..=10` was extracted.
    Rated(u8),
    /// The judge replied but no rating could be extracted.
    Unknown,
    /// The inference call failed or timed out.
    Failed(String),
}

impl RatingTrial {
    pub fn score(&self) -> Option<u8> {
        match self {
            Self::Rated(v) => Some(*v),
            _ => None,
        }
    }
}

/// Mean and population variance over the successful trials of one pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub mean: f64,
    pub variance: f64,
}

impl RatingAggregate {
    /// Aggregate the successful subset of `trials`; `None` when none succeeded.
    pub fn from_trials(trials: &[RatingTrial]) -> Option<Self> {
        let scores: Vec<f64> = trials
            .iter()
            .filter_map(RatingTrial::score)
            .map(f64::from)
            .collect();
        if scores.is_empty() {
            return None;
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Some(Self { mean, variance })
    }

    /// Integer rating derived from the mean, rounded half away from zero.
    pub fn rating(&self) -> u8 {
        self.mean.round().clamp(1.0, 10.0) as u8
    }
}
