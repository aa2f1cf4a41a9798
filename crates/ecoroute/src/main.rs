// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ecoroute - energy-aware LLM routing.
//!
//! This is the binary entry point. Tables are written to files; logs go to
//! stderr.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod evaluate;
mod measure;
mod route;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use ecoroute_config::EcorouteConfig;
use ecoroute_core::EcorouteError;
use ecoroute_energy::EnergyMeter;
use ecoroute_ollama::OllamaBackend;
use ecoroute_pipeline::BoundedBackend;

/// ecoroute - route prompts to small or large models and meter the energy of every stage.
#[derive(Parser, Debug)]
#[command(name = "ecoroute", version, about, long_about = None)]
struct Cli {
    /// Configuration file layered over the default hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify, route and answer every prompt, metering each stage.
    Route {
        /// Prompt table (overrides pipeline.input_path).
        #[arg(long)]
        input: Option<PathBuf>,
        /// Answer table (overrides pipeline.output_path).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Process at most this many prompts.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rate stored answers with the judge model.
    Evaluate {
        /// Answer table (overrides evaluation.input_path).
        #[arg(long)]
        input: Option<PathBuf>,
        /// Rated table (overrides evaluation.output_path).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Trials per pair (overrides evaluation.trials).
        #[arg(long)]
        trials: Option<u32>,
    },
    /// Measure every benchmark model on every prompt.
    Measure {
        /// Prompt table (overrides pipeline.input_path).
        #[arg(long)]
        input: Option<PathBuf>,
        /// Benchmark table (overrides benchmark.output_path).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ecoroute_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            ecoroute_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    let result = match cli.command {
        Commands::Route {
            input,
            output,
            limit,
        } => route::run(&config, input, output, limit).await,
        Commands::Evaluate {
            input,
            output,
            trials,
        } => evaluate::run(&config, input, output, trials).await,
        Commands::Measure { input, output } => measure::run(&config, input, output).await,
        Commands::Config => print_config(&config),
    };

    if let Err(e) = result {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn print_config(config: &EcorouteConfig) -> Result<(), EcorouteError> {
    let text = toml::to_string_pretty(config)
        .map_err(|e| EcorouteError::Internal(format!("cannot serialize config: {e}")))?;
    print!("{text}");
    Ok(())
}

/// The Ollama backend with every call bounded by `inference.timeout_secs`.
pub(crate) fn build_backend(
    config: &EcorouteConfig,
) -> Result<BoundedBackend<OllamaBackend>, EcorouteError> {
    let backend = OllamaBackend::new(&config.inference)?;
    Ok(BoundedBackend::new(
        backend,
        Duration::from_secs(config.inference.timeout_secs),
    ))
}

/// The meter selected in `[energy]`. Fails if the backend cannot be used.
pub(crate) fn build_meter(config: &EcorouteConfig) -> Result<EnergyMeter, EcorouteError> {
    let backend = ecoroute_energy::backend_from_config(&config.energy)?;
    Ok(EnergyMeter::new(backend))
}

/// Initialize the tracing subscriber on stderr.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ecoroute={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
