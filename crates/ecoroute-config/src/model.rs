// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for ecoroute.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level ecoroute configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EcorouteConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Inference backend connection settings.
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Model tiers and routing policy.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Routing pipeline input/output tables.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Answer quality evaluation settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Energy metering backend settings.
    #[serde(default)]
    pub energy: EnergyConfig,

    /// Per-model energy benchmark settings.
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Inference backend (Ollama) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InferenceConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound for a single inference call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}

/// Model tier and routing policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Model identifier for the small tier.
    #[serde(default = "default_small_model")]
    pub small_model: String,

    /// Model identifier for the large tier.
    #[serde(default = "default_large_model")]
    pub large_model: String,

    /// Lightweight judge model that rates prompt complexity.
    #[serde(default = "default_small_model")]
    pub classifier_model: String,

    /// Scores strictly above this threshold route to the large tier.
    #[serde(default = "default_large_threshold")]
    pub large_threshold: u8,

    /// Cheap query used to force a model load at a known checkpoint.
    #[serde(default = "default_warmup_prompt")]
    pub warmup_prompt: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            small_model: default_small_model(),
            large_model: default_large_model(),
            classifier_model: default_small_model(),
            large_threshold: default_large_threshold(),
            warmup_prompt: default_warmup_prompt(),
        }
    }
}

fn default_small_model() -> String {
    "gemma3:1b".to_string()
}

fn default_large_model() -> String {
    "gemma3:4b".to_string()
}

fn default_large_threshold() -> u8 {
    5
}

fn default_warmup_prompt() -> String {
    "What is 1+1?".to_string()
}

/// Routing pipeline table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Path to the prompt table.
    #[serde(default = "default_input_path")]
    pub input_path: String,

    /// Path the result table is written to.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Field delimiter for both tables (single ASCII character).
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Column holding the record identifier.
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Column holding the prompt text.
    #[serde(default = "default_prompt_column")]
    pub prompt_column: String,

    /// Process at most this many records. `None` processes all.
    #[serde(default)]
    pub max_prompts: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
            delimiter: default_delimiter(),
            id_column: default_id_column(),
            prompt_column: default_prompt_column(),
            max_prompts: None,
        }
    }
}

fn default_input_path() -> String {
    "prompts.csv".to_string()
}

fn default_output_path() -> String {
    "answers.csv".to_string()
}

fn default_delimiter() -> String {
    ";".to_string()
}

fn default_id_column() -> String {
    "sess_id".to_string()
}

fn default_prompt_column() -> String {
    "prompt".to_string()
}

/// Answer quality evaluation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Judge model that rates answers.
    #[serde(default = "default_judge_model")]
    pub judge_model: String,

    /// Independent trials per (prompt, answer) pair.
    #[serde(default = "default_trials")]
    pub trials: u32,

    /// Pause between trials, in milliseconds.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Path to the answer table to rate.
    #[serde(default = "default_output_path")]
    pub input_path: String,

    /// Path the rated table is written to.
    #[serde(default = "default_ratings_path")]
    pub output_path: String,

    /// Field delimiter for both tables.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    #[serde(default = "default_id_column")]
    pub id_column: String,

    #[serde(default = "default_prompt_column")]
    pub prompt_column: String,

    #[serde(default = "default_answer_column")]
    pub answer_column: String,

    /// Optional column with a reference explanation appended to the judge prompt.
    #[serde(default)]
    pub explanation_column: Option<String>,

    /// Meter the whole evaluation run.
    #[serde(default)]
    pub meter_energy: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            judge_model: default_judge_model(),
            trials: default_trials(),
            pause_ms: default_pause_ms(),
            input_path: default_output_path(),
            output_path: default_ratings_path(),
            delimiter: default_delimiter(),
            id_column: default_id_column(),
            prompt_column: default_prompt_column(),
            answer_column: default_answer_column(),
            explanation_column: None,
            meter_energy: false,
        }
    }
}

fn default_judge_model() -> String {
    "llama3:70b".to_string()
}

fn default_trials() -> u32 {
    1
}

fn default_pause_ms() -> u64 {
    200
}

fn default_ratings_path() -> String {
    "ratings.csv".to_string()
}

fn default_answer_column() -> String {
    "answer".to_string()
}

/// Which energy backend feeds the meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyBackendKind {
    /// Linux powercap (Intel RAPL) package counters.
    #[default]
    Rapl,
    /// Constant-power estimate from elapsed wall time.
    Constant,
}

/// Energy metering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnergyConfig {
    #[serde(default)]
    pub backend: EnergyBackendKind,

    /// Root of the powercap sysfs tree.
    #[serde(default = "default_rapl_root")]
    pub rapl_root: String,

    /// Assumed draw for the constant backend, in watts.
    #[serde(default = "default_constant_watts")]
    pub constant_watts: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            backend: EnergyBackendKind::default(),
            rapl_root: default_rapl_root(),
            constant_watts: default_constant_watts(),
        }
    }
}

fn default_rapl_root() -> String {
    "/sys/class/powercap".to_string()
}

fn default_constant_watts() -> f64 {
    65.0
}

/// Per-model energy benchmark configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkConfig {
    /// Models every prompt is sent to.
    #[serde(default = "default_benchmark_models")]
    pub models: Vec<String>,

    /// Path the benchmark table is written to.
    #[serde(default = "default_benchmark_output")]
    pub output_path: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            models: default_benchmark_models(),
            output_path: default_benchmark_output(),
        }
    }
}

fn default_benchmark_models() -> Vec<String> {
    vec!["gemma2:2b".to_string(), "mistral:7b".to_string()]
}

fn default_benchmark_output() -> String {
    "benchmark.csv".to_string()
}
