// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use tripartite_config::{parse_config, validate_config, ConfigError, SimulationConfig};

#[test]
fn test_written_defaults_load_back_unchanged() {
    let defaults = SimulationConfig::default();
    let text = toml::to_string_pretty(&defaults).unwrap();

    let parsed = parse_config(&text).unwrap();
    assert_eq!(parsed, defaults);
    assert!(validate_config(&parsed).is_ok());
}

#[test]
fn test_protocol_file_with_baseline_and_injection() {
    let config = parse_config(
        r#"
        [stimulus]
        windows = [
            { start_s = 0.5, end_s = 1.5, amplitude = 20.0, pulse = { frequency_hz = 50.0, width_s = 0.002 } },
        ]
        baseline = { amplitude = 3.0, frequency_hz = 1.0, width_s = 0.01 }

        [postsynaptic_injection]
        windows = [{ start_s = 0.1, end_s = 0.12, amplitude = -0.001 }]

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    assert!(validate_config(&config).is_ok());
    assert_eq!(config.stimulus.windows[0].pulse.unwrap().frequency_hz, 50.0);
    assert_eq!(config.stimulus.baseline.unwrap().amplitude, 3.0);
    assert_eq!(config.postsynaptic_injection.windows.len(), 1);
    // Unlisted logging fields fall back to defaults
    assert_eq!(config.logging.retention_runs, 10);
}

#[test]
fn test_missing_model_field_is_a_parse_error() {
    let result = parse_config(
        r#"
        [camkii]
        autophosphorylation_rate_per_s = 0.5
        "#,
    );
    match result {
        Err(ConfigError::ParseError(msg)) => assert!(msg.contains("missing field")),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_unknown_value_type_is_a_parse_error() {
    let result = parse_config(
        r#"
        [run]
        dt_ms = "fast"
        total_steps = 10
        record_interval = 1
        seed = 0
        "#,
    );
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}
