// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for ecoroute.

use thiserror::Error;

/// The primary error type used across all ecoroute crates.
#[derive(Debug, Error)]
pub enum EcorouteError {
    /// Configuration errors (invalid TOML, bad values, unusable backend selection).
    #[error("configuration error: {0}")]
    Config(String),

    /// Tabular input/output errors (missing file, unparsable rows, missing columns).
    #[error("table error: {message}")]
    Table {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Inference backend errors (unreachable server, model load failure, bad reply).
    #[error("inference error ({model}): {message}")]
    Inference {
        model: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An inference call exceeded its configured deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Energy meter errors (no readable counters, backend failed to start).
    #[error("energy meter error: {0}")]
    Meter(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EcorouteError {
    /// Shorthand for an [`EcorouteError::Inference`] without an underlying source.
    pub fn inference(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Inference {
            model: model.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an [`EcorouteError::Table`] without an underlying source.
    pub fn table(message: impl Into<String>) -> Self {
        Self::Table {
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error is scoped to a single record or trial.
    ///
    /// Inference failures and timeouts are recoverable at the record boundary;
    /// everything else aborts the run.
    pub fn is_inference(&self) -> bool {
        matches!(self, Self::Inference { .. } | Self::Timeout { .. })
    }
}
