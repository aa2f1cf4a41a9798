// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for ecoroute integration tests.
//!
//! Provides deterministic stand-ins for the two external collaborators of
//! the pipeline, so tests run without a model server or energy counters.
//!
//! # Components
//!
//! - [`MockBackend`] - Scripted inference backend with a call log
//! - [`FakeEnergyBackend`] - Energy backend replaying scripted readings

pub mod fake_meter;
pub mod mock_backend;

pub use fake_meter::{FakeEnergyBackend, FakeMeterProbe};
pub use mock_backend::{MockBackend, MockCall};
