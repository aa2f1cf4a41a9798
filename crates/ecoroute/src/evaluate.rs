// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ecoroute evaluate` - judge-model rating of stored answers.

use std::path::PathBuf;

use colored::Colorize;
use ecoroute_config::EcorouteConfig;
use ecoroute_core::EcorouteError;
use ecoroute_pipeline::table::{self, delimiter_byte};
use ecoroute_pipeline::{Evaluator, Table};

pub async fn run(
    config: &EcorouteConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    trials: Option<u32>,
) -> Result<(), EcorouteError> {
    let mut evaluation = config.evaluation.clone();
    if let Some(trials) = trials {
        if trials == 0 {
            return Err(EcorouteError::Config("--trials must be at least 1".into()));
        }
        evaluation.trials = trials;
    }
    let input = input.unwrap_or_else(|| PathBuf::from(&evaluation.input_path));
    let output = output.unwrap_or_else(|| PathBuf::from(&evaluation.output_path));
    let delimiter = delimiter_byte(&evaluation.delimiter)?;

    let table = Table::read(&input, delimiter)?;
    let backend = crate::build_backend(config)?;
    let mut meter = if evaluation.meter_energy {
        Some(crate::build_meter(config)?)
    } else {
        None
    };

    let report = Evaluator::new(&evaluation)
        .evaluate(&backend, &table, meter.as_mut())
        .await?;
    table::write_ratings(&output, delimiter, &report.headers, &report.rows)?;

    println!(
        "{} {}/{} ({} unparsable replies, {} failed calls)",
        "Successfully rated".green().bold(),
        report.rated(),
        report.rows.len(),
        report.extraction_failures(),
        report.inference_failures(),
    );
    if let Some(kwh) = report.session_kwh {
        println!("Energy: {kwh:.6} kWh");
    }
    println!("Ratings saved to {}", output.display());
    Ok(())
}
