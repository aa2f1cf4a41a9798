// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend trait definitions.
//!
//! The inference backend and the energy backend are the two external
//! collaborators of the pipeline. Both are injected, so tests and
//! alternative deployments can swap them freely.

pub mod energy;
pub mod inference;

pub use energy::EnergyBackend;
pub use inference::InferenceBackend;
