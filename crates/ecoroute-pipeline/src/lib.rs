// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metered routing pipeline for ecoroute.
//!
//! This crate provides:
//! - [`Orchestrator`]: classify, route and answer each prompt with per-stage
//!   energy attribution
//! - [`Evaluator`]: rate stored answers with a judge model over repeated trials
//! - [`run_benchmark`]: measure every model on every prompt
//! - [`BoundedBackend`]: per-call deadline for any inference backend
//! - [`table`]: delimited table input and output
//!
//! All runs are strictly sequential: one inference call in flight per
//! metering session, output in input order.

pub mod benchmark;
pub mod evaluator;
pub mod invoke;
pub mod orchestrator;
pub mod table;

pub use benchmark::{BenchmarkRecord, run_benchmark};
pub use evaluator::{EvaluationReport, Evaluator, RatedRow, judge_prompt};
pub use invoke::BoundedBackend;
pub use orchestrator::{Orchestrator, RunReport};
pub use table::Table;
