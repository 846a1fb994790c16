// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Tripartite Configuration System
//!
//! Type-safe configuration for a simulation run:
//! - TOML file parsing (`tripartite.toml`)
//! - Environment variable overrides (`TRIPARTITE_*`)
//! - CLI argument overrides
//! - Whole-config validation that reports every problem at once
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tripartite_config::load_config;
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! println!("dt = {} ms, {} steps", config.run.dt_ms, config.run.total_steps);
//! ```
//!
//! Every model section may be omitted, in which case its defaults apply. A
//! section that is present must list all of its fields; a missing field is a
//! parse error.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    load_config_or_default, parse_config, CONFIG_FILE_NAME,
};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SimulationConfig::default()).is_ok());
    }

    #[test]
    fn test_toml_error_maps_to_parse_error() {
        let err: ConfigError = toml::from_str::<SimulationConfig>("[run\n").unwrap_err().into();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
