// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Energy metering for ecoroute.
//!
//! This crate provides:
//! - [`EnergyMeter`] / [`MeterSession`]: the scoped metering session that
//!   turns raw backend readings into monotonic cumulative samples
//! - [`RaplBackend`]: Linux powercap package counters
//! - [`ConstantPowerBackend`]: wall-time estimate for hosts without counters

pub mod estimate;
pub mod meter;
pub mod rapl;

use ecoroute_config::model::{EnergyBackendKind, EnergyConfig};
use ecoroute_core::{EcorouteError, EnergyBackend};

pub use estimate::ConstantPowerBackend;
pub use meter::{EnergyMeter, MeterSession};
pub use rapl::RaplBackend;

/// Joules per kWh.
pub const JOULES_PER_KWH: f64 = 3.6e6;

/// Build the backend selected in `[energy]`.
pub fn backend_from_config(
    config: &EnergyConfig,
) -> Result<Box<dyn EnergyBackend>, EcorouteError> {
    match config.backend {
        EnergyBackendKind::Rapl => Ok(Box::new(RaplBackend::discover(&config.rapl_root)?)),
        EnergyBackendKind::Constant => {
            Ok(Box::new(ConstantPowerBackend::new(config.constant_watts)?))
        }
    }
}
