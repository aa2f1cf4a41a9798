// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./ecoroute.toml` > `~/.config/ecoroute/ecoroute.toml` >
//! `/etc/ecoroute/ecoroute.toml` with environment variable overrides via `ECOROUTE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::EcorouteConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ecoroute/ecoroute.toml` (system-wide)
/// 3. `~/.config/ecoroute/ecoroute.toml` (user XDG config)
/// 4. `./ecoroute.toml` (local directory)
/// 5. `ECOROUTE_*` environment variables
pub fn load_config() -> Result<EcorouteConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<EcorouteConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EcorouteConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// The file is layered on top of the XDG hierarchy, so a `--config` file only
/// needs to contain the keys it changes.
pub fn load_config_from_path(path: &Path) -> Result<EcorouteConfig, figment::Error> {
    xdg_figment()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    xdg_figment().merge(env_provider())
}

fn xdg_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(EcorouteConfig::default()))
        .merge(Toml::file("/etc/ecoroute/ecoroute.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("ecoroute/ecoroute.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("ecoroute.toml"))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `ECOROUTE_ROUTING_SMALL_MODEL` must map to
/// `routing.small_model`, not `routing.small.model`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("ECOROUTE_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: &[&str] = &[
        "logging",
        "inference",
        "routing",
        "pipeline",
        "evaluation",
        "energy",
        "benchmark",
    ];
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("routing_small_model"), "routing.small_model");
        assert_eq!(map_env_key("inference_timeout_secs"), "inference.timeout_secs");
        assert_eq!(map_env_key("energy_backend"), "energy.backend");
        assert_eq!(map_env_key("logging_level"), "logging.level");
    }

    #[test]
    fn unknown_env_section_is_left_alone() {
        assert_eq!(map_env_key("something_else"), "something_else");
    }
}
