// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Energy backend trait for cumulative energy counters.

use crate::error::EcorouteError;

/// A source of cumulative energy readings.
///
/// The backend only reports raw readings. Monotonicity and carry-forward of
/// missing readings are enforced by the meter adapter that owns it.
pub trait EnergyBackend: Send {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Begin measuring. Readings are relative to this call.
    fn start(&mut self) -> Result<(), EcorouteError>;

    /// Cumulative kWh consumed since `start`, or `None` if no reading is
    /// available right now.
    fn read_kwh(&mut self) -> Option<f64>;

    /// Stop measuring and release any held resources.
    fn stop(&mut self) -> Result<(), EcorouteError>;
}
