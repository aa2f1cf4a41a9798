// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metered per-record routing pipeline.
//!
//! Every record runs the same strictly sequential checkpoint sequence:
//!
//! ```text
//! S0 -> warm-up(small) -> S1 -> classify -> S2 -> warm-up(tier) -> S3 -> answer -> S4
//! ```
//!
//! The four energy deltas between consecutive snapshots are attributed to
//! the `switch1`, `complexity`, `switch2` and `answer` stages. A failed
//! classify or answer call ends the record early: the failed stage and every
//! stage after it get zero energy, and the batch moves on.

use ecoroute_config::model::{PipelineConfig, RoutingConfig};
use ecoroute_core::types::error_marker;
use ecoroute_core::{
    AnswerRecord, ChatMessage, ComplexityScore, EcorouteError, InferenceBackend, ModelTier,
    PipelineStage, PromptRecord, RecordOutcome, StageDeltas,
};
use ecoroute_energy::{EnergyMeter, MeterSession};
use ecoroute_router::{ComplexityClassifier, ModelRouter, WarmupProber};
use tracing::{Instrument, info, info_span, warn};

use crate::table::completed_totals;

/// Outcome of a whole routing run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One entry per processed input record, in input order.
    pub records: Vec<AnswerRecord>,
    /// Meter reading at the end of the session, including energy not
    /// attributed to any stage.
    pub session_kwh: f64,
}

impl RunReport {
    pub fn completed(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.is_completed())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.completed()
    }

    /// Records answered on `tier`.
    pub fn routed_to(&self, tier: ModelTier) -> usize {
        self.records
            .iter()
            .filter(|r| r.tier_used == Some(tier))
            .count()
    }

    /// The `TOTAL` row value: summed totals of completed records.
    pub fn total_kwh(&self) -> f64 {
        completed_totals(&self.records).total()
    }
}

/// Drives records through the metered classify-route-answer sequence.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    classifier: ComplexityClassifier,
    router: ModelRouter,
    prober: WarmupProber,
    max_prompts: Option<usize>,
}

impl Orchestrator {
    pub fn new(routing: &RoutingConfig, pipeline: &PipelineConfig) -> Self {
        Self {
            classifier: ComplexityClassifier::new(routing.classifier_model.clone()),
            router: ModelRouter::new(routing),
            prober: WarmupProber::new(routing.warmup_prompt.clone()),
            max_prompts: pipeline.max_prompts,
        }
    }

    pub fn router(&self) -> &ModelRouter {
        &self.router
    }

    /// Process `records` in order within one metering session.
    ///
    /// Only a meter that cannot start fails the run; per-record inference
    /// failures are captured in the report.
    pub async fn run(
        &self,
        backend: &dyn InferenceBackend,
        meter: &mut EnergyMeter,
        records: &[PromptRecord],
    ) -> Result<RunReport, EcorouteError> {
        let limit = self.max_prompts.unwrap_or(records.len()).min(records.len());
        let selected = &records[..limit];
        info!(
            records = selected.len(),
            available = records.len(),
            backend = backend.name(),
            meter = meter.backend_name(),
            threshold = self.router.threshold(),
            "starting routing run"
        );

        let mut session = meter.start()?;
        let mut results = Vec::with_capacity(selected.len());
        for (index, record) in selected.iter().enumerate() {
            let result = self.process_record(backend, &mut session, record).await;
            info!(
                prompt_id = %result.prompt_id,
                index = index + 1,
                of = selected.len(),
                tier = ?result.tier_used,
                complexity = %result.complexity,
                kwh = result.total_kwh(),
                completed = result.outcome.is_completed(),
                "record processed"
            );
            results.push(result);
        }
        let session_kwh = session.stop()?.kwh();

        let report = RunReport {
            records: results,
            session_kwh,
        };
        info!(
            completed = report.completed(),
            failed = report.failed(),
            small = report.routed_to(ModelTier::Small),
            large = report.routed_to(ModelTier::Large),
            total_kwh = report.total_kwh(),
            session_kwh = report.session_kwh,
            "routing run finished"
        );
        Ok(report)
    }

    /// Run the checkpoint sequence for one record. Never fails.
    ///
    /// Everything logged while the record runs carries its `prompt_id`.
    pub async fn process_record(
        &self,
        backend: &dyn InferenceBackend,
        session: &mut MeterSession<'_>,
        record: &PromptRecord,
    ) -> AnswerRecord {
        let span = info_span!("record", prompt_id = %record.id);
        self.run_stages(backend, session, record)
            .instrument(span)
            .await
    }

    async fn run_stages(
        &self,
        backend: &dyn InferenceBackend,
        session: &mut MeterSession<'_>,
        record: &PromptRecord,
    ) -> AnswerRecord {
        let mut deltas = StageDeltas::default();
        let mut failed_warmups = Vec::new();

        let s0 = session.snapshot();
        let small = self.router.model_for(ModelTier::Small);
        if !self.prober.probe(backend, small).await.is_loaded() {
            failed_warmups.push(PipelineStage::Switch1);
        }
        let s1 = session.snapshot();
        deltas.set(PipelineStage::Switch1, s1.since(s0));

        let complexity = match self.classifier.classify(backend, &record.prompt_text).await {
            Ok(score) => score,
            Err(e) => {
                warn!(prompt_id = %record.id, error = %e, "complexity classification failed");
                return failed_record(
                    record,
                    None,
                    None,
                    ComplexityScore::Unknown,
                    deltas,
                    failed_warmups,
                    PipelineStage::Complexity,
                    &e,
                );
            }
        };
        let s2 = session.snapshot();
        deltas.set(PipelineStage::Complexity, s2.since(s1));

        let tier = self.router.route(complexity);
        let model = self.router.model_for(tier);
        if !self.prober.probe(backend, model).await.is_loaded() {
            failed_warmups.push(PipelineStage::Switch2);
        }
        let s3 = session.snapshot();
        deltas.set(PipelineStage::Switch2, s3.since(s2));

        let messages = [ChatMessage::user(record.prompt_text.as_str())];
        match backend.generate(model, &messages).await {
            Ok(answer) => {
                let s4 = session.snapshot();
                deltas.set(PipelineStage::Answer, s4.since(s3));
                AnswerRecord {
                    prompt_id: record.id.clone(),
                    prompt_text: record.prompt_text.clone(),
                    tier_used: Some(tier),
                    model_used: Some(model.to_string()),
                    complexity,
                    answer: answer.trim().to_string(),
                    stage_deltas: deltas,
                    failed_warmups,
                    outcome: RecordOutcome::Completed,
                }
            }
            Err(e) => {
                warn!(prompt_id = %record.id, model, error = %e, "answer generation failed");
                failed_record(
                    record,
                    Some(tier),
                    Some(model),
                    complexity,
                    deltas,
                    failed_warmups,
                    PipelineStage::Answer,
                    &e,
                )
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn failed_record(
    record: &PromptRecord,
    tier: Option<ModelTier>,
    model: Option<&str>,
    complexity: ComplexityScore,
    stage_deltas: StageDeltas,
    failed_warmups: Vec<PipelineStage>,
    stage: PipelineStage,
    error: &EcorouteError,
) -> AnswerRecord {
    let message = error.to_string();
    AnswerRecord {
        prompt_id: record.id.clone(),
        prompt_text: record.prompt_text.clone(),
        tier_used: tier,
        model_used: model.map(str::to_string),
        complexity,
        answer: error_marker(&message),
        stage_deltas,
        failed_warmups,
        outcome: RecordOutcome::Failed { stage, message },
    }
}
