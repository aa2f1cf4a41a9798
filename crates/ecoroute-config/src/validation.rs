// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty model ids, positive timeouts and single-byte delimiters.

use crate::diagnostic::ConfigError;
use crate::model::{EcorouteConfig, EnergyBackendKind};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &EcorouteConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        fail(format!(
            "logging.level `{}` must be one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.inference.base_url.trim().is_empty() {
        fail("inference.base_url must not be empty".to_string());
    }
    if config.inference.timeout_secs == 0 {
        fail("inference.timeout_secs must be greater than 0".to_string());
    }

    for (key, value) in [
        ("routing.small_model", &config.routing.small_model),
        ("routing.large_model", &config.routing.large_model),
        ("routing.classifier_model", &config.routing.classifier_model),
        ("routing.warmup_prompt", &config.routing.warmup_prompt),
        ("evaluation.judge_model", &config.evaluation.judge_model),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    // A threshold of 0 or 10 would make one tier unreachable.
    if !(1..=9).contains(&config.routing.large_threshold) {
        fail(format!(
            "routing.large_threshold must be between 1 and 9, got {}",
            config.routing.large_threshold
        ));
    }

    for (key, value) in [
        ("pipeline.delimiter", &config.pipeline.delimiter),
        ("evaluation.delimiter", &config.evaluation.delimiter),
    ] {
        if value.len() != 1 || !value.is_ascii() {
            fail(format!("{key} must be a single ASCII character, got `{value}`"));
        }
    }

    for (key, value) in [
        ("pipeline.id_column", &config.pipeline.id_column),
        ("pipeline.prompt_column", &config.pipeline.prompt_column),
        ("evaluation.id_column", &config.evaluation.id_column),
        ("evaluation.prompt_column", &config.evaluation.prompt_column),
        ("evaluation.answer_column", &config.evaluation.answer_column),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    if config.pipeline.max_prompts == Some(0) {
        fail("pipeline.max_prompts must be at least 1 when set".to_string());
    }

    if config.evaluation.trials < 1 {
        fail("evaluation.trials must be at least 1".to_string());
    }

    if config.energy.backend == EnergyBackendKind::Constant
        && !(config.energy.constant_watts.is_finite() && config.energy.constant_watts > 0.0)
    {
        fail(format!(
            "energy.constant_watts must be a positive number, got {}",
            config.energy.constant_watts
        ));
    }

    if config.benchmark.models.is_empty() {
        fail("benchmark.models must list at least one model".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = EcorouteConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = EcorouteConfig::default();
        config.inference.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "timeout_secs"));
    }

    #[test]
    fn zero_trials_fails_validation() {
        let mut config = EcorouteConfig::default();
        config.evaluation.trials = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "evaluation.trials"));
    }

    #[test]
    fn multi_char_delimiter_fails_validation() {
        let mut config = EcorouteConfig::default();
        config.pipeline.delimiter = ";;".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "pipeline.delimiter"));
    }

    #[test]
    fn threshold_out_of_range_fails_validation() {
        let mut config = EcorouteConfig::default();
        config.routing.large_threshold = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "large_threshold"));
    }

    #[test]
    fn constant_backend_requires_positive_watts() {
        let mut config = EcorouteConfig::default();
        config.energy.backend = EnergyBackendKind::Constant;
        config.energy.constant_watts = 0.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "constant_watts"));
    }

    #[test]
    fn watts_ignored_for_rapl_backend() {
        let mut config = EcorouteConfig::default();
        config.energy.constant_watts = -1.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = EcorouteConfig::default();
        config.routing.small_model = " ".to_string();
        config.evaluation.judge_model = String::new();
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
