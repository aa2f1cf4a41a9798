// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ecoroute measure` - per-model energy benchmark.

use std::path::PathBuf;

use colored::Colorize;
use ecoroute_config::EcorouteConfig;
use ecoroute_core::EcorouteError;
use ecoroute_pipeline::run_benchmark;
use ecoroute_pipeline::table::{self, delimiter_byte};

pub async fn run(
    config: &EcorouteConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), EcorouteError> {
    let pipeline = &config.pipeline;
    let input = input.unwrap_or_else(|| PathBuf::from(&pipeline.input_path));
    let output = output.unwrap_or_else(|| PathBuf::from(&config.benchmark.output_path));
    let delimiter = delimiter_byte(&pipeline.delimiter)?;

    let prompts = table::read_prompts(
        &input,
        delimiter,
        &pipeline.id_column,
        &pipeline.prompt_column,
    )?;
    let backend = crate::build_backend(config)?;
    let mut meter = crate::build_meter(config)?;

    let records = run_benchmark(&backend, &mut meter, &config.benchmark.models, &prompts).await?;
    table::write_benchmark(&output, delimiter, &records)?;

    for model in &config.benchmark.models {
        let runs: Vec<_> = records.iter().filter(|r| &r.model == model).collect();
        let kwh: f64 = runs.iter().map(|r| r.energy_kwh).sum();
        let failed = runs.iter().filter(|r| !r.succeeded).count();
        println!(
            "{} {} calls, {kwh:.6} kWh, {failed} failed",
            format!("{model}:").bold(),
            runs.len(),
        );
    }
    println!("Benchmark saved to {}", output.display());
    Ok(())
}
