// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for ecoroute.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use ecoroute_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("small tier: {}", config.routing.small_model);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::EcorouteConfig;

/// Load configuration and validate it.
///
/// With `explicit` set, that file is layered over the XDG hierarchy;
/// otherwise only the XDG hierarchy and `ECOROUTE_*` variables are read.
/// Figment errors are converted into diagnostics with typo suggestions.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<EcorouteConfig, Vec<ConfigError>> {
    let loaded = match explicit {
        Some(path) => loader::load_config_from_path(path),
        None => loader::load_config(),
    };
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources(explicit);
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<EcorouteConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from("/etc/ecoroute/ecoroute.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("ecoroute/ecoroute.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("ecoroute.toml"));
    }
    if let Some(path) = explicit {
        candidates.push(path.to_path_buf());
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            // Figment reports canonical paths for file sources.
            let name = std::fs::canonicalize(&path).unwrap_or(path);
            Some((name.display().to_string(), content))
        })
        .collect()
}
