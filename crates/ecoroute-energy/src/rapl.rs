// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Linux powercap (RAPL) energy backend.
//!
//! Reads the package-level `intel-rapl:N/energy_uj` counters under the
//! powercap root and accumulates their deltas. Counters wrap at
//! `max_energy_range_uj`; a smaller reading than the previous one is treated
//! as exactly one wrap.

use std::fs;
use std::path::{Path, PathBuf};

use ecoroute_core::{EcorouteError, EnergyBackend};
use tracing::{debug, info};

/// Microjoules per kWh.
const MICROJOULES_PER_KWH: f64 = 3.6e12;

#[derive(Debug)]
struct RaplDomain {
    name: String,
    energy_path: PathBuf,
    max_range_uj: u64,
    previous_uj: u64,
}

impl RaplDomain {
    fn read_uj(&self) -> Option<u64> {
        read_u64(&self.energy_path)
    }
}

/// Energy backend summing all RAPL package domains.
#[derive(Debug)]
pub struct RaplBackend {
    domains: Vec<RaplDomain>,
    accumulated_uj: u128,
}

impl RaplBackend {
    /// Find every readable package domain under `root`.
    ///
    /// Fails if the directory has no `intel-rapl:N` domain whose counter can
    /// be read (on recent kernels `energy_uj` is readable by root only).
    pub fn discover(root: impl AsRef<Path>) -> Result<Self, EcorouteError> {
        let root = root.as_ref();
        let entries = fs::read_dir(root).map_err(|e| {
            EcorouteError::Meter(format!(
                "cannot read powercap directory {}: {e}",
                root.display()
            ))
        })?;

        let mut domains = Vec::new();
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(dir_name) = file_name.to_str() else {
                continue;
            };
            if !is_package_domain(dir_name) {
                continue;
            }
            let dir = entry.path();
            let energy_path = dir.join("energy_uj");
            let Some(current) = read_u64(&energy_path) else {
                debug!(domain = dir_name, "skipping unreadable RAPL domain");
                continue;
            };
            let name = fs::read_to_string(dir.join("name"))
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|_| dir_name.to_string());
            let max_range_uj = read_u64(&dir.join("max_energy_range_uj")).unwrap_or(u64::MAX);
            domains.push(RaplDomain {
                name,
                energy_path,
                max_range_uj,
                previous_uj: current,
            });
        }

        if domains.is_empty() {
            return Err(EcorouteError::Meter(format!(
                "no readable RAPL package domain under {} \
                 (run as root, or set energy.backend = \"constant\")",
                root.display()
            )));
        }
        domains.sort_by(|a, b| a.energy_path.cmp(&b.energy_path));

        info!(
            domains = ?domains.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            "RAPL domains discovered"
        );
        Ok(Self {
            domains,
            accumulated_uj: 0,
        })
    }

    /// Number of package domains being summed.
    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }
}

impl EnergyBackend for RaplBackend {
    fn name(&self) -> &str {
        "rapl"
    }

    fn start(&mut self) -> Result<(), EcorouteError> {
        for domain in &mut self.domains {
            domain.previous_uj = domain.read_uj().ok_or_else(|| {
                EcorouteError::Meter(format!("cannot read {}", domain.energy_path.display()))
            })?;
        }
        self.accumulated_uj = 0;
        Ok(())
    }

    fn read_kwh(&mut self) -> Option<f64> {
        // Read every domain before updating any, so a partial failure leaves
        // the accumulated total untouched.
        let readings = self
            .domains
            .iter()
            .map(RaplDomain::read_uj)
            .collect::<Option<Vec<u64>>>()?;

        for (domain, current) in self.domains.iter_mut().zip(readings) {
            let delta = if current >= domain.previous_uj {
                current - domain.previous_uj
            } else {
                domain.max_range_uj.saturating_sub(domain.previous_uj) + current
            };
            domain.previous_uj = current;
            self.accumulated_uj += u128::from(delta);
        }
        Some(self.accumulated_uj as f64 / MICROJOULES_PER_KWH)
    }

    fn stop(&mut self) -> Result<(), EcorouteError> {
        Ok(())
    }
}

/// `intel-rapl:0` is a package domain; `intel-rapl:0:1` is a subdomain.
fn is_package_domain(dir_name: &str) -> bool {
    dir_name
        .strip_prefix("intel-rapl:")
        .is_some_and(|idx| !idx.is_empty() && idx.chars().all(|c| c.is_ascii_digit()))
}

fn read_u64(path: &Path) -> Option<u64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}
