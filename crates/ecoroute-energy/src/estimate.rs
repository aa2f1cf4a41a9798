// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Constant-power energy estimate.
//!
//! For hosts without readable energy counters: assumes a fixed power draw and
//! derives energy from elapsed wall time.

use std::time::{Duration, Instant};

use ecoroute_core::{EcorouteError, EnergyBackend};

use crate::JOULES_PER_KWH;

/// Energy in kWh drawn at `watts` over `elapsed`.
pub fn estimate_kwh(watts: f64, elapsed: Duration) -> f64 {
    watts * elapsed.as_secs_f64() / JOULES_PER_KWH
}

/// Energy backend estimating consumption as `watts x elapsed`.
#[derive(Debug)]
pub struct ConstantPowerBackend {
    watts: f64,
    started: Option<Instant>,
}

impl ConstantPowerBackend {
    /// Create a backend for a fixed draw. `watts` must be finite and positive.
    pub fn new(watts: f64) -> Result<Self, EcorouteError> {
        if !watts.is_finite() || watts <= 0.0 {
            return Err(EcorouteError::Config(format!(
                "energy.constant_watts must be a positive number, got {watts}"
            )));
        }
        Ok(Self {
            watts,
            started: None,
        })
    }

    pub fn watts(&self) -> f64 {
        self.watts
    }
}

impl EnergyBackend for ConstantPowerBackend {
    fn name(&self) -> &str {
        "constant"
    }

    fn start(&mut self) -> Result<(), EcorouteError> {
        self.started = Some(Instant::now());
        Ok(())
    }

    fn read_kwh(&mut self) -> Option<f64> {
        self.started
            .map(|started| estimate_kwh(self.watts, started.elapsed()))
    }

    fn stop(&mut self) -> Result<(), EcorouteError> {
        self.started = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_kilowatt_for_one_hour_is_one_kwh() {
        let kwh = estimate_kwh(1000.0, Duration::from_secs(3600));
        assert!((kwh - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sixty_five_watts_for_a_minute() {
        let kwh = estimate_kwh(65.0, Duration::from_secs(60));
        assert!((kwh - 65.0 * 60.0 / 3.6e6).abs() < 1e-15);
    }

    #[test]
    fn rejects_non_positive_watts() {
        assert!(matches!(
            ConstantPowerBackend::new(0.0),
            Err(EcorouteError::Config(_))
        ));
        assert!(ConstantPowerBackend::new(-5.0).is_err());
        assert!(ConstantPowerBackend::new(f64::NAN).is_err());
        assert_eq!(ConstantPowerBackend::new(65.0).unwrap().watts(), 65.0);
    }

    #[test]
    fn no_reading_before_start_or_after_stop() {
        let mut backend = ConstantPowerBackend::new(65.0).unwrap();
        assert_eq!(backend.read_kwh(), None);
        backend.start().unwrap();
        let first = backend.read_kwh().unwrap();
        let second = backend.read_kwh().unwrap();
        assert!(first >= 0.0);
        assert!(second >= first);
        backend.stop().unwrap();
        assert_eq!(backend.read_kwh(), None);
    }
}
