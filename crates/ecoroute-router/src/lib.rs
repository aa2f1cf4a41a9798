// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt complexity classification and model routing for ecoroute.
//!
//! This crate provides:
//! - [`extract_rating`]: Pull a 1-10 rating out of free-form model output
//! - [`ComplexityClassifier`]: Ask a judge model how hard a prompt is
//! - [`ModelRouter`]: Map a complexity score to a model tier
//! - [`WarmupProber`]: Force a model load with a trivial query
//!
//! The classifier and prober each make exactly one backend call; neither
//! retries, since every call is metered by the caller.

pub mod classifier;
pub mod rating;
pub mod router;
pub mod warmup;

pub use classifier::{ComplexityClassifier, complexity_prompt};
pub use rating::extract_rating;
pub use router::{ModelRouter, route};
pub use warmup::{WarmupOutcome, WarmupProber};
