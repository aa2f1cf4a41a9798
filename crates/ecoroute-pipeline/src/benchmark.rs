// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-model energy benchmark: every configured model answers every prompt.

use std::time::Instant;

use chrono::{DateTime, Utc};
use ecoroute_core::types::error_marker;
use ecoroute_core::{ChatMessage, EcorouteError, InferenceBackend, PromptRecord};
use ecoroute_energy::EnergyMeter;
use tracing::{info, warn};

/// One (model, prompt) measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    /// Running id across all models, starting at 1.
    pub global_id: u64,
    pub prompt_id: String,
    pub model: String,
    pub prompt: String,
    /// Model reply, or an error marker when the call failed.
    pub response: String,
    /// Zero for failed calls.
    pub energy_kwh: f64,
    pub duration_s: f64,
    pub timestamp: DateTime<Utc>,
    pub succeeded: bool,
}

/// Send every prompt to every model, metering each call.
///
/// Prompts with empty text are skipped. Failed calls are recorded and the
/// run continues.
pub async fn run_benchmark(
    backend: &dyn InferenceBackend,
    meter: &mut EnergyMeter,
    models: &[String],
    prompts: &[PromptRecord],
) -> Result<Vec<BenchmarkRecord>, EcorouteError> {
    let prompts: Vec<&PromptRecord> = prompts
        .iter()
        .filter(|p| !p.prompt_text.trim().is_empty())
        .collect();
    info!(
        models = models.len(),
        prompts = prompts.len(),
        "starting model benchmark"
    );

    let mut session = meter.start()?;
    let mut records = Vec::with_capacity(models.len() * prompts.len());
    let mut global_id = 1;

    for model in models {
        for prompt in &prompts {
            let before = session.snapshot();
            let started = Instant::now();
            let messages = [ChatMessage::user(prompt.prompt_text.trim())];
            let result = backend.generate(model, &messages).await;
            let duration_s = started.elapsed().as_secs_f64();
            let after = session.snapshot();

            let (response, energy_kwh, succeeded) = match result {
                Ok(text) => (text, after.since(before), true),
                Err(e) => {
                    warn!(model = model.as_str(), prompt_id = %prompt.id, error = %e, "benchmark call failed");
                    (error_marker(&e.to_string()), 0.0, false)
                }
            };
            info!(
                global_id,
                model = model.as_str(),
                prompt_id = %prompt.id,
                kwh = energy_kwh,
                duration_s,
                "benchmark call measured"
            );
            records.push(BenchmarkRecord {
                global_id,
                prompt_id: prompt.id.clone(),
                model: model.clone(),
                prompt: prompt.prompt_text.clone(),
                response,
                energy_kwh,
                duration_s,
                timestamp: Utc::now(),
                succeeded,
            });
            global_id += 1;
        }
    }

    let session_kwh = session.stop()?.kwh();
    info!(
        calls = records.len(),
        failed = records.iter().filter(|r| !r.succeeded).count(),
        session_kwh,
        "model benchmark finished"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use ecoroute_test_utils::{FakeEnergyBackend, MockBackend};

    use super::*;

    #[tokio::test]
    async fn every_model_answers_every_prompt() {
        let mock = MockBackend::new().with_default_reply("answer");
        let mut meter = EnergyMeter::new(Box::new(FakeEnergyBackend::ticking(0.002)));
        let models = vec!["gemma2:2b".to_string(), "mistral:7b".to_string()];
        let prompts = vec![
            PromptRecord::new("p1", "one"),
            PromptRecord::new("p2", "   "),
            PromptRecord::new("p3", "three"),
        ];

        let records = run_benchmark(&mock, &mut meter, &models, &prompts)
            .await
            .unwrap();

        assert_eq!(records.len(), 4);
        let ids: Vec<u64> = records.iter().map(|r| r.global_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(records[0].model, "gemma2:2b");
        assert_eq!(records[0].prompt_id, "p1");
        assert_eq!(records[1].prompt_id, "p3");
        assert_eq!(records[2].model, "mistral:7b");
        assert!(records.iter().all(|r| (r.energy_kwh - 0.002).abs() < 1e-12));
        assert_eq!(
            mock.called_models(),
            vec!["gemma2:2b", "gemma2:2b", "mistral:7b", "mistral:7b"]
        );
    }

    #[tokio::test]
    async fn failures_are_recorded_with_zero_energy() {
        let mock = MockBackend::new()
            .always_fail("mistral:7b", "not pulled")
            .with_default_reply("ok");
        let mut meter = EnergyMeter::new(Box::new(FakeEnergyBackend::ticking(0.1)));
        let models = vec!["gemma2:2b".to_string(), "mistral:7b".to_string()];
        let prompts = vec![PromptRecord::new("p1", "hi")];

        let records = run_benchmark(&mock, &mut meter, &models, &prompts)
            .await
            .unwrap();
        assert!(records[0].succeeded);
        assert!(!records[1].succeeded);
        assert_eq!(records[1].energy_kwh, 0.0);
        assert!(records[1].response.contains("not pulled"));
    }
}
