// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped energy metering sessions.
//!
//! An [`EnergyMeter`] wraps one energy backend. [`EnergyMeter::start`] opens a
//! [`MeterSession`] whose snapshots are cumulative kWh since the start and
//! never decrease: a missing backend reading repeats the last known value,
//! and a reading below the last known value is clamped to it. Dropping the
//! session without calling [`MeterSession::stop`] still stops the backend.

use ecoroute_core::{EcorouteError, EnergyBackend, EnergySample};
use tracing::{debug, info, warn};

/// Owner of an energy backend. At most one session is open at a time.
pub struct EnergyMeter {
    backend: Box<dyn EnergyBackend>,
}

impl EnergyMeter {
    pub fn new(backend: Box<dyn EnergyBackend>) -> Self {
        Self { backend }
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Begin a metering session.
    ///
    /// The returned session borrows the meter mutably, so a second session
    /// cannot be opened while one is live.
    pub fn start(&mut self) -> Result<MeterSession<'_>, EcorouteError> {
        self.backend.start()?;
        info!(backend = self.backend.name(), "energy metering started");
        Ok(MeterSession {
            backend: self.backend.as_mut(),
            last: EnergySample::default(),
            snapshots: 0,
            unavailable: 0,
            stopped: false,
        })
    }
}

/// A live metering session. See the module docs for the monotonicity rules.
pub struct MeterSession<'a> {
    backend: &'a mut dyn EnergyBackend,
    last: EnergySample,
    snapshots: u64,
    unavailable: u64,
    stopped: bool,
}

impl MeterSession<'_> {
    /// Cumulative energy consumed since the session started.
    pub fn snapshot(&mut self) -> EnergySample {
        self.snapshots += 1;
        match self.backend.read_kwh() {
            Some(kwh) if kwh.is_finite() && kwh >= self.last.kwh() => {
                self.last = EnergySample(kwh);
            }
            Some(kwh) if kwh.is_finite() => {
                warn!(
                    reading_kwh = kwh,
                    last_kwh = self.last.kwh(),
                    "energy reading went backwards, keeping last value"
                );
            }
            _ => {
                self.unavailable += 1;
                debug!(
                    last_kwh = self.last.kwh(),
                    "no energy reading available, carrying last value forward"
                );
            }
        }
        self.last
    }

    /// The most recent sample without querying the backend.
    pub fn last(&self) -> EnergySample {
        self.last
    }

    /// Number of snapshots that had to carry the last value forward.
    pub fn unavailable_readings(&self) -> u64 {
        self.unavailable
    }

    /// Take a final snapshot and stop the backend.
    pub fn stop(mut self) -> Result<EnergySample, EcorouteError> {
        let total = self.snapshot();
        self.stopped = true;
        self.backend.stop()?;
        info!(
            backend = self.backend.name(),
            total_kwh = total.kwh(),
            snapshots = self.snapshots,
            unavailable = self.unavailable,
            "energy metering stopped"
        );
        Ok(total)
    }
}

impl Drop for MeterSession<'_> {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        warn!(
            backend = self.backend.name(),
            last_kwh = self.last.kwh(),
            "metering session dropped without stop, stopping backend"
        );
        if let Err(e) = self.backend.stop() {
            warn!(error = %e, "failed to stop energy backend");
        }
    }
}

#[cfg(test)]
mod tests {
    use ecoroute_test_utils::FakeEnergyBackend;
    use proptest::prelude::*;
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn snapshots_follow_backend_readings() {
        let fake = FakeEnergyBackend::with_readings(vec![Some(0.0), Some(0.5), Some(1.25)]);
        let mut meter = EnergyMeter::new(Box::new(fake));
        let mut session = meter.start().unwrap();
        assert_eq!(session.snapshot().kwh(), 0.0);
        assert_eq!(session.snapshot().kwh(), 0.5);
        assert_eq!(session.snapshot().kwh(), 1.25);
    }

    #[test]
    fn missing_reading_carries_last_value_forward() {
        let fake = FakeEnergyBackend::with_readings(vec![None, Some(0.2), None, Some(0.3)]);
        let mut meter = EnergyMeter::new(Box::new(fake));
        let mut session = meter.start().unwrap();
        assert_eq!(session.snapshot().kwh(), 0.0);
        assert_eq!(session.snapshot().kwh(), 0.2);
        assert_eq!(session.snapshot().kwh(), 0.2);
        assert_eq!(session.snapshot().kwh(), 0.3);
        assert_eq!(session.unavailable_readings(), 2);
    }

    #[test]
    #[traced_test]
    fn backwards_reading_is_clamped() {
        let fake = FakeEnergyBackend::with_readings(vec![Some(1.0), Some(0.4), Some(f64::NAN)]);
        let mut meter = EnergyMeter::new(Box::new(fake));
        let mut session = meter.start().unwrap();
        assert_eq!(session.snapshot().kwh(), 1.0);
        assert_eq!(session.snapshot().kwh(), 1.0);
        assert_eq!(session.snapshot().kwh(), 1.0);
        assert!(logs_contain("energy reading went backwards"));
    }

    #[test]
    fn stop_returns_final_sample_and_stops_backend() {
        let fake = FakeEnergyBackend::with_readings(vec![Some(0.1), Some(0.7)]);
        let probe = fake.probe();
        let mut meter = EnergyMeter::new(Box::new(fake));
        let mut session = meter.start().unwrap();
        session.snapshot();
        let total = session.stop().unwrap();
        assert_eq!(total.kwh(), 0.7);
        assert_eq!(probe.starts(), 1);
        assert_eq!(probe.stops(), 1);
    }

    #[test]
    #[traced_test]
    fn dropping_session_stops_backend() {
        let fake = FakeEnergyBackend::with_readings(vec![Some(0.1)]);
        let probe = fake.probe();
        let mut meter = EnergyMeter::new(Box::new(fake));
        {
            let mut session = meter.start().unwrap();
            session.snapshot();
        }
        assert_eq!(probe.stops(), 1);
        assert!(logs_contain("dropped without stop"));
    }

    #[test]
    fn failed_start_is_reported() {
        let fake = FakeEnergyBackend::failing_start("no counters");
        let mut meter = EnergyMeter::new(Box::new(fake));
        assert!(matches!(meter.start(), Err(EcorouteError::Meter(_))));
    }

    #[test]
    fn meter_can_be_restarted_after_stop() {
        let fake = FakeEnergyBackend::with_readings(vec![Some(0.3), Some(0.1)]);
        let probe = fake.probe();
        let mut meter = EnergyMeter::new(Box::new(fake));
        let first = meter.start().unwrap().stop().unwrap();
        assert_eq!(first.kwh(), 0.3);
        // A new session starts from zero again.
        let mut session = meter.start().unwrap();
        assert_eq!(session.snapshot().kwh(), 0.1);
        drop(session);
        assert_eq!(probe.starts(), 2);
        assert_eq!(probe.stops(), 2);
    }

    proptest! {
        #[test]
        fn snapshots_never_decrease(
            readings in proptest::collection::vec(
                proptest::option::of(-1.0f64..10.0),
                1..64,
            )
        ) {
            let n = readings.len();
            let fake = FakeEnergyBackend::with_readings(readings);
            let mut meter = EnergyMeter::new(Box::new(fake));
            let mut session = meter.start().unwrap();
            let mut previous = session.last();
            for _ in 0..n {
                let sample = session.snapshot();
                prop_assert!(sample.kwh() >= previous.kwh());
                prop_assert!(sample.kwh() >= 0.0);
                previous = sample;
            }
        }
    }
}
