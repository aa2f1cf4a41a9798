// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch answer-quality evaluation with a judge model.
//!
//! Each stored (prompt, answer) pair is rated in independent trials. Trials
//! that fail or yield no rating are kept in the trial list but left out of
//! the mean and variance. Failed trials are not retried.

use std::time::Duration;

use ecoroute_config::model::EvaluationConfig;
use ecoroute_core::{
    ChatMessage, ComplexityScore, EcorouteError, InferenceBackend, RatingAggregate, RatingTrial,
};
use ecoroute_energy::EnergyMeter;
use ecoroute_router::extract_rating;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::table::{TOTAL_ROW_ID, Table};

/// System message sent with every judge prompt.
pub const JUDGE_SYSTEM_PROMPT: &str =
    "You are an impartial evaluator. Only respond with a number from 1 to 10.";

/// Build the judge prompt for one pair, optionally with a reference explanation.
pub fn judge_prompt(prompt: &str, answer: &str, explanation: Option<&str>) -> String {
    let mut text = format!(
        "Consider the following prompt: {prompt}\nAnd the following answer: {answer}\n"
    );
    if let Some(explanation) = explanation.filter(|e| !e.trim().is_empty()) {
        text.push_str(&format!("Reference explanation: {explanation}\n"));
    }
    text.push_str(
        "Rate on a scale from 1 to 10 how well the answer answers the prompt. \
         Only return a single number from 1 to 10.",
    );
    text
}

/// One input row together with its rating trials.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedRow {
    /// The row's original cells, written back unchanged.
    pub cells: Vec<String>,
    pub trials: Vec<RatingTrial>,
}

impl RatedRow {
    pub fn aggregate(&self) -> Option<RatingAggregate> {
        RatingAggregate::from_trials(&self.trials)
    }

    /// Successful scores as a list, e.g. `[8, 9]`.
    pub fn scores_cell(&self) -> String {
        let scores: Vec<String> = self
            .trials
            .iter()
            .filter_map(RatingTrial::score)
            .map(|s| s.to_string())
            .collect();
        format!("[{}]", scores.join(", "))
    }

    /// Trials whose inference call failed.
    pub fn failed_trials(&self) -> usize {
        self.trials
            .iter()
            .filter(|t| matches!(t, RatingTrial::Failed(_)))
            .count()
    }

    /// Trials that got a reply without an extractable rating.
    pub fn unknown_trials(&self) -> usize {
        self.trials
            .iter()
            .filter(|t| matches!(t, RatingTrial::Unknown))
            .count()
    }
}

/// Result of an evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub headers: Vec<String>,
    pub rows: Vec<RatedRow>,
    /// Energy of the whole run, when metering was requested.
    pub session_kwh: Option<f64>,
}

impl EvaluationReport {
    /// Pairs with at least one successful trial.
    pub fn rated(&self) -> usize {
        self.rows.iter().filter(|r| r.aggregate().is_some()).count()
    }

    pub fn extraction_failures(&self) -> usize {
        self.rows.iter().map(RatedRow::unknown_trials).sum()
    }

    pub fn inference_failures(&self) -> usize {
        self.rows.iter().map(RatedRow::failed_trials).sum()
    }
}

/// Rates answers with a judge model.
#[derive(Debug, Clone)]
pub struct Evaluator {
    judge_model: String,
    trials: u32,
    pause: Duration,
    id_column: String,
    prompt_column: String,
    answer_column: String,
    explanation_column: Option<String>,
}

impl Evaluator {
    pub fn new(config: &EvaluationConfig) -> Self {
        Self {
            judge_model: config.judge_model.clone(),
            trials: config.trials.max(1),
            pause: Duration::from_millis(config.pause_ms),
            id_column: config.id_column.clone(),
            prompt_column: config.prompt_column.clone(),
            answer_column: config.answer_column.clone(),
            explanation_column: config.explanation_column.clone(),
        }
    }

    /// Run all trials for one pair.
    pub async fn rate_pair(
        &self,
        backend: &dyn InferenceBackend,
        prompt: &str,
        answer: &str,
        explanation: Option<&str>,
    ) -> Vec<RatingTrial> {
        let messages = [
            ChatMessage::system(JUDGE_SYSTEM_PROMPT),
            ChatMessage::user(judge_prompt(prompt, answer, explanation)),
        ];
        let mut trials = Vec::with_capacity(self.trials as usize);
        for trial in 0..self.trials {
            if trial > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            let outcome = match backend.generate(&self.judge_model, &messages).await {
                Ok(reply) => match extract_rating(&reply) {
                    ComplexityScore::Score(v) => RatingTrial::Rated(v),
                    ComplexityScore::Unknown => {
                        debug!(reply = reply.trim(), "no rating in judge reply");
                        RatingTrial::Unknown
                    }
                },
                Err(e) => {
                    warn!(trial, error = %e, "judge call failed");
                    RatingTrial::Failed(e.to_string())
                }
            };
            trials.push(outcome);
        }
        trials
    }

    /// Rate every row of `table`, skipping `TOTAL` summary rows.
    ///
    /// Missing columns fail before any judge call. With a meter, the whole
    /// run is measured as one session.
    pub async fn evaluate(
        &self,
        backend: &dyn InferenceBackend,
        table: &Table,
        meter: Option<&mut EnergyMeter>,
    ) -> Result<EvaluationReport, EcorouteError> {
        let id_idx = table.column(&self.id_column)?;
        let prompt_idx = table.column(&self.prompt_column)?;
        let answer_idx = table.column(&self.answer_column)?;
        let explanation_idx = self
            .explanation_column
            .as_deref()
            .map(|c| table.column(c))
            .transpose()?;

        let mut session = meter.map(EnergyMeter::start).transpose()?;

        let pairs: Vec<&Vec<String>> = table
            .rows
            .iter()
            .filter(|row| row[id_idx].trim() != TOTAL_ROW_ID)
            .collect();
        info!(
            pairs = pairs.len(),
            trials = self.trials,
            judge = self.judge_model.as_str(),
            "starting evaluation"
        );

        let mut rows = Vec::with_capacity(pairs.len());
        for (index, row) in pairs.iter().enumerate() {
            let explanation = explanation_idx.map(|i| row[i].as_str());
            let trials = self
                .rate_pair(backend, &row[prompt_idx], &row[answer_idx], explanation)
                .instrument(info_span!("pair", id = row[id_idx].as_str()))
                .await;
            let rated = RatedRow {
                cells: row.to_vec(),
                trials,
            };
            match rated.aggregate() {
                Some(agg) => info!(
                    id = row[id_idx].as_str(),
                    index = index + 1,
                    of = pairs.len(),
                    mean = agg.mean,
                    variance = agg.variance,
                    "pair rated"
                ),
                None => warn!(
                    id = row[id_idx].as_str(),
                    index = index + 1,
                    of = pairs.len(),
                    "no rating obtained"
                ),
            }
            rows.push(rated);
        }

        let session_kwh = match session.take() {
            Some(s) => Some(s.stop()?.kwh()),
            None => None,
        };

        let report = EvaluationReport {
            headers: table.headers.clone(),
            rows,
            session_kwh,
        };
        info!(
            extraction_failures = report.extraction_failures(),
            inference_failures = report.inference_failures(),
            session_kwh = report.session_kwh,
            "Successfully rated {}/{}",
            report.rated(),
            report.rows.len()
        );
        Ok(report)
    }
}
