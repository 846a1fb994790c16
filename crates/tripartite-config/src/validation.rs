// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Collects every problem in a configuration and reports them together, so a
//! user fixing a file sees the whole list in one go.

use crate::{ConfigError, ConfigResult, SimulationConfig};
use tripartite_synapse_models::{ModelError, ModelParameters};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
    InvalidModel { section: &'static str, error: ModelError },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::InvalidModel { section, error } => write!(f, "[{}] {}", section, error),
        }
    }
}

/// Validate the complete configuration
///
/// Checks:
/// - run settings (positive finite `dt_ms`, non-zero step count and record interval)
/// - every model section through its own parameter checks
/// - both stimulus protocols (window order, pulse width below period)
/// - the logging level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failure
pub fn validate_config(config: &SimulationConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_run(config, &mut errors);
    validate_models(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_run(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    let run = &config.run;
    if !(run.dt_ms.is_finite() && run.dt_ms > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "run.dt_ms".to_string(),
            reason: format!("must be a positive number, got {}", run.dt_ms),
        });
    }
    if run.total_steps == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "run.total_steps".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if run.record_interval == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "run.record_interval".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn check_section(
    section: &'static str,
    params: &dyn ModelParameters,
    errors: &mut Vec<ConfigValidationError>,
) {
    if let Err(error) = params.validate() {
        errors.push(ConfigValidationError::InvalidModel { section, error });
    }
}

fn validate_models(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    check_section("stimulus", &config.stimulus, errors);
    check_section("postsynaptic_injection", &config.postsynaptic_injection, errors);
    check_section("presynaptic_membrane", &config.presynaptic_membrane, errors);
    check_section("presynaptic_calcium", &config.presynaptic_calcium, errors);
    check_section("glutamate_release", &config.glutamate_release, errors);
    check_section("astrocyte", &config.astrocyte, errors);
    check_section("gliotransmitter", &config.gliotransmitter, errors);
    check_section("postsynaptic_membrane", &config.postsynaptic_membrane, errors);
    check_section("postsynaptic_calcium", &config.postsynaptic_calcium, errors);
    check_section("camkii", &config.camkii, errors);
}

fn validate_logging(config: &SimulationConfig, errors: &mut Vec<ConfigValidationError>) {
    if !config.logging.has_valid_level() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!(
                "must be one of trace, debug, info, warn, error; got {:?}",
                config.logging.level
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripartite_synapse_models::{PulseShape, StimulusWindow};

    #[test]
    fn test_default_config_is_valid() {
        let result = validate_config(&SimulationConfig::default());
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_zero_dt_rejected() {
        let mut config = SimulationConfig::default();
        config.run.dt_ms = 0.0;

        let result = validate_config(&config);
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("run.dt_ms"));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_collects_every_problem() {
        let mut config = SimulationConfig::default();
        config.run.record_interval = 0;
        config.postsynaptic_membrane.time_constant_s = -1.0;
        config.camkii.total_camkii_m = f64::NAN;
        config.logging.level = "loud".to_string();

        let Err(ConfigError::ValidationError(msg)) = validate_config(&config) else {
            panic!("expected validation error");
        };
        assert!(msg.contains("run.record_interval"));
        assert!(msg.contains("[postsynaptic_membrane]"));
        assert!(msg.contains("time_constant_s"));
        assert!(msg.contains("[camkii]"));
        assert!(msg.contains("logging.level"));
        assert_eq!(msg.lines().count(), 5);
    }

    #[test]
    fn test_pulse_wider_than_period_rejected() {
        let mut config = SimulationConfig::default();
        config.stimulus.windows = vec![StimulusWindow {
            start_s: 0.0,
            end_s: 1.0,
            amplitude: 10.0,
            pulse: Some(PulseShape {
                frequency_hz: 100.0,
                width_s: 0.02,
            }),
        }];

        let Err(ConfigError::ValidationError(msg)) = validate_config(&config) else {
            panic!("expected validation error");
        };
        assert!(msg.contains("[stimulus]"));
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let mut config = SimulationConfig::default();
        config.postsynaptic_calcium.channel_open_probability = 1.5;
        assert!(validate_config(&config).is_err());
    }
}
