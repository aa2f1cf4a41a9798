// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fake energy backend replaying scripted readings.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ecoroute_core::{EcorouteError, EnergyBackend};

#[derive(Debug)]
enum Source {
    /// Readings returned in order; `None` once exhausted.
    Scripted(VecDeque<Option<f64>>),
    /// `step * n` for the n-th read since `start`.
    Ticking { step: f64, reads: u64 },
}

/// Counters shared between a [`FakeEnergyBackend`] and the test holding it.
#[derive(Debug, Clone, Default)]
pub struct FakeMeterProbe {
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl FakeMeterProbe {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

/// A scripted [`EnergyBackend`].
#[derive(Debug)]
pub struct FakeEnergyBackend {
    source: Source,
    start_error: Option<String>,
    probe: FakeMeterProbe,
}

impl FakeEnergyBackend {
    /// Replay `readings` in order, then report no reading.
    pub fn with_readings(readings: Vec<Option<f64>>) -> Self {
        Self {
            source: Source::Scripted(readings.into()),
            start_error: None,
            probe: FakeMeterProbe::default(),
        }
    }

    /// Report `step`, `2 * step`, `3 * step`, ... restarting at every `start`.
    pub fn ticking(step: f64) -> Self {
        Self {
            source: Source::Ticking { step, reads: 0 },
            start_error: None,
            probe: FakeMeterProbe::default(),
        }
    }

    /// A backend whose `start` fails with a meter error.
    pub fn failing_start(message: &str) -> Self {
        Self {
            source: Source::Scripted(VecDeque::new()),
            start_error: Some(message.to_string()),
            probe: FakeMeterProbe::default(),
        }
    }

    /// Handle for inspecting lifecycle calls after the backend is boxed.
    pub fn probe(&self) -> FakeMeterProbe {
        self.probe.clone()
    }
}

impl EnergyBackend for FakeEnergyBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn start(&mut self) -> Result<(), EcorouteError> {
        if let Some(message) = &self.start_error {
            return Err(EcorouteError::Meter(message.clone()));
        }
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
        if let Source::Ticking { reads, .. } = &mut self.source {
            *reads = 0;
        }
        Ok(())
    }

    fn read_kwh(&mut self) -> Option<f64> {
        self.probe.reads.fetch_add(1, Ordering::SeqCst);
        match &mut self.source {
            Source::Scripted(queue) => queue.pop_front().flatten(),
            Source::Ticking { step, reads } => {
                *reads += 1;
                Some(*step * *reads as f64)
            }
        }
    }

    fn stop(&mut self) -> Result<(), EcorouteError> {
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
