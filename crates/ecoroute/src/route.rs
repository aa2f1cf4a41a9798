// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ecoroute route` - the metered routing pipeline.

use std::path::PathBuf;

use colored::Colorize;
use ecoroute_config::EcorouteConfig;
use ecoroute_core::{EcorouteError, ModelTier};
use ecoroute_pipeline::table::{self, delimiter_byte};
use ecoroute_pipeline::Orchestrator;

pub async fn run(
    config: &EcorouteConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    limit: Option<usize>,
) -> Result<(), EcorouteError> {
    if limit == Some(0) {
        return Err(EcorouteError::Config("--limit must be at least 1".into()));
    }
    let pipeline = &config.pipeline;
    let input = input.unwrap_or_else(|| PathBuf::from(&pipeline.input_path));
    let output = output.unwrap_or_else(|| PathBuf::from(&pipeline.output_path));
    let delimiter = delimiter_byte(&pipeline.delimiter)?;

    // Fatal input problems surface before the meter or backend is touched.
    let prompts = table::read_prompts(
        &input,
        delimiter,
        &pipeline.id_column,
        &pipeline.prompt_column,
    )?;

    let mut pipeline = pipeline.clone();
    if limit.is_some() {
        pipeline.max_prompts = limit;
    }

    let backend = crate::build_backend(config)?;
    let mut meter = crate::build_meter(config)?;
    let orchestrator = Orchestrator::new(&config.routing, &pipeline);

    let report = orchestrator.run(&backend, &mut meter, &prompts).await?;
    table::write_answers(&output, delimiter, &report.records)?;

    println!(
        "{} {} prompts ({} completed, {} failed; {} small, {} large)",
        "Processed".green().bold(),
        report.records.len(),
        report.completed(),
        report.failed(),
        report.routed_to(ModelTier::Small),
        report.routed_to(ModelTier::Large),
    );
    println!(
        "Energy: {:.6} kWh attributed, {:.6} kWh metered",
        report.total_kwh(),
        report.session_kwh
    );
    println!("Results saved to {}", output.display());
    Ok(())
}
