// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file (or built-in defaults when no file exists)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, SimulationConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// File name searched for during discovery
pub const CONFIG_FILE_NAME: &str = "tripartite.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `TRIPARTITE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./tripartite.toml`
/// 3. Up to five parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("TRIPARTITE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by TRIPARTITE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        for ancestor in cwd.ancestors().skip(1).take(5) {
            search_paths.push(ancestor.join(CONFIG_FILE_NAME));
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet TRIPARTITE_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Parse a configuration from TOML text without overrides or validation.
pub fn parse_config(content: &str) -> ConfigResult<SimulationConfig> {
    Ok(toml::from_str(content)?)
}

/// Load, override and validate the configuration.
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is discovered.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns an error if the file is not found, contains invalid TOML (including
/// a model section with a missing field), an override is malformed, or
/// validation fails.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimulationConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let config = parse_config(&content)?;
    debug!(target: "tripartite-config", "Loaded configuration from {}", config_file.display());

    finish(config, cli_args)
}

/// Like [`load_config`], but falls back to built-in defaults when discovery
/// finds no file. An explicit path that does not exist is still an error.
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimulationConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }
    match find_config_file() {
        Ok(path) => load_config(Some(&path), cli_args),
        Err(ConfigError::FileNotFound(_)) if env::var("TRIPARTITE_CONFIG_PATH").is_err() => {
            debug!(target: "tripartite-config", "No {} found, using defaults", CONFIG_FILE_NAME);
            finish(SimulationConfig::default(), cli_args)
        }
        Err(e) => Err(e),
    }
}

fn finish(
    mut config: SimulationConfig,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimulationConfig> {
    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }
    validate_config(&config)?;
    Ok(config)
}

fn env_override<T: FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(target: "tripartite-config", "Ignoring unparsable {}={:?}", name, value);
            None
        }
    }
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `TRIPARTITE_DT_MS` -> `run.dt_ms`
/// - `TRIPARTITE_TOTAL_STEPS` -> `run.total_steps`
/// - `TRIPARTITE_RECORD_INTERVAL` -> `run.record_interval`
/// - `TRIPARTITE_SEED` -> `run.seed`
/// - `TRIPARTITE_LOG_LEVEL` -> `logging.level`
///
/// Unparsable values are logged and skipped.
pub fn apply_environment_overrides(config: &mut SimulationConfig) {
    if let Some(dt_ms) = env_override("TRIPARTITE_DT_MS") {
        config.run.dt_ms = dt_ms;
    }
    if let Some(steps) = env_override("TRIPARTITE_TOTAL_STEPS") {
        config.run.total_steps = steps;
    }
    if let Some(interval) = env_override("TRIPARTITE_RECORD_INTERVAL") {
        config.run.record_interval = interval;
    }
    if let Some(seed) = env_override("TRIPARTITE_SEED") {
        config.run.seed = seed;
    }
    if let Ok(level) = env::var("TRIPARTITE_LOG_LEVEL") {
        config.logging.level = level;
    }
}

fn cli_value<T: FromStr>(cli_args: &HashMap<String, String>, key: &str) -> ConfigResult<Option<T>> {
    match cli_args.get(key) {
        None => Ok(None),
        Some(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            ConfigError::InvalidValue(format!("--{} expects a number, got {:?}", key, value))
        }),
    }
}

/// Apply CLI argument overrides to configuration
///
/// Recognised keys: `dt_ms`, `total_steps`, `duration_s`, `record_interval`,
/// `seed`, `log_level`. `duration_s` is converted with the final `dt_ms`.
///
/// # Errors
///
/// `ConfigError::InvalidValue` for a malformed number or when both
/// `total_steps` and `duration_s` are given.
pub fn apply_cli_overrides(
    config: &mut SimulationConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(dt_ms) = cli_value(cli_args, "dt_ms")? {
        config.run.dt_ms = dt_ms;
    }

    let total_steps: Option<u64> = cli_value(cli_args, "total_steps")?;
    let duration_s: Option<f64> = cli_value(cli_args, "duration_s")?;
    match (total_steps, duration_s) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::InvalidValue(
                "total_steps and duration_s are mutually exclusive".to_string(),
            ))
        }
        (Some(steps), None) => config.run.total_steps = steps,
        (None, Some(seconds)) => {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "duration_s must be a non-negative number, got {}",
                    seconds
                )));
            }
            config.run.set_duration_s(seconds);
        }
        (None, None) => {}
    }

    if let Some(interval) = cli_value(cli_args, "record_interval")? {
        config.run.record_interval = interval;
    }
    if let Some(seed) = cli_value(cli_args, "seed")? {
        config.run.seed = seed;
    }
    if let Some(level) = cli_args.get("log_level") {
        config.logging.level = level.clone();
    }
    Ok(())
}
