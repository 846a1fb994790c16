// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Stimulus sweeps
//!
//! Runs the same synapse configuration under several labelled stimulus
//! protocols. Every scenario gets its own freshly built state bundle, so
//! outcomes are independent of scenario order.

use serde::{Deserialize, Serialize};
use tracing::info;
use tripartite_config::SimulationConfig;
use tripartite_synapse_models::{StimulusParameters, StimulusWindow};

use crate::error::EngineResult;
use crate::record::DiscardSink;
use crate::simulation::SynapseSimulation;
use crate::summary::RunSummary;

/// Frequencies compared by [`default_frequency_scenarios`]
pub const DEFAULT_SWEEP_FREQUENCIES_HZ: [f64; 3] = [50.0, 75.0, 100.0];

/// Pulse amplitude used by the default sweep (µA/cm²), suprathreshold for
/// a 2 ms pulse.
pub const DEFAULT_SWEEP_AMPLITUDE: f64 = 20.0;

pub const DEFAULT_SWEEP_PULSE_WIDTH_S: f64 = 0.002;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusScenario {
    pub label: String,
    pub stimulus: StimulusParameters,
}

impl StimulusScenario {
    pub fn new(label: impl Into<String>, stimulus: StimulusParameters) -> Self {
        Self {
            label: label.into(),
            stimulus,
        }
    }

    /// A single pulse-train window labelled by its frequency.
    pub fn pulse_train(
        frequency_hz: f64,
        amplitude: f64,
        width_s: f64,
        start_s: f64,
        end_s: f64,
    ) -> Self {
        Self::new(
            format!("{frequency_hz} Hz"),
            StimulusParameters::with_windows(vec![StimulusWindow::pulsed(
                start_s,
                end_s,
                amplitude,
                frequency_hz,
                width_s,
            )]),
        )
    }
}

/// 50/75/100 Hz trains of 2 ms pulses between `start_s` and `end_s`.
pub fn default_frequency_scenarios(start_s: f64, end_s: f64) -> Vec<StimulusScenario> {
    DEFAULT_SWEEP_FREQUENCIES_HZ
        .iter()
        .map(|&f| {
            StimulusScenario::pulse_train(
                f,
                DEFAULT_SWEEP_AMPLITUDE,
                DEFAULT_SWEEP_PULSE_WIDTH_S,
                start_s,
                end_s,
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub label: String,
    pub summary: RunSummary,
}

impl ScenarioOutcome {
    pub fn peak_phosphorylation(&self) -> f64 {
        self.summary
            .peak("camkii_phosphorylated_fraction")
            .unwrap_or(0.0)
    }
}

/// Run every scenario with `base`'s run settings and model parameters,
/// replacing only the presynaptic stimulus.
///
/// Fails on the first scenario whose simulation cannot be built.
pub fn run_sweep(
    base: &SimulationConfig,
    scenarios: &[StimulusScenario],
) -> EngineResult<Vec<ScenarioOutcome>> {
    info!(
        target: "tripartite-synapse-engine",
        "Running sweep of {} scenarios",
        scenarios.len()
    );

    let mut outcomes = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let mut config = base.clone();
        config.stimulus = scenario.stimulus.clone();

        let mut sim = SynapseSimulation::new(&config)?;
        let summary = sim.run(&mut DiscardSink);

        info!(
            target: "tripartite-synapse-engine",
            "Scenario '{}': {} spikes, final alpha_mod={:.3e}",
            scenario.label,
            summary.spike_count,
            summary.final_alpha_modulation
        );

        outcomes.push(ScenarioOutcome {
            label: scenario.label.clone(),
            summary,
        });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenarios() {
        let scenarios = default_frequency_scenarios(0.0, 1.0);
        let labels: Vec<_> = scenarios.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["50 Hz", "75 Hz", "100 Hz"]);
        let window = &scenarios[2].stimulus.windows[0];
        assert_eq!(window.amplitude, DEFAULT_SWEEP_AMPLITUDE);
        assert_eq!(window.pulse.map(|p| p.frequency_hz), Some(100.0));
    }

    #[test]
    fn test_sweep_outcomes_are_independent_of_order() {
        let mut base = SimulationConfig::default();
        base.run.total_steps = 4_000;
        let scenarios = default_frequency_scenarios(0.0, 0.2);

        let forward = run_sweep(&base, &scenarios).unwrap();
        let mut reversed_input = scenarios.clone();
        reversed_input.reverse();
        let mut reversed = run_sweep(&base, &reversed_input).unwrap();
        reversed.reverse();

        assert_eq!(forward.len(), 3);
        for (a, b) in forward.iter().zip(&reversed) {
            assert_eq!(a.label, b.label);
            assert_eq!(a.summary.spike_count, b.summary.spike_count);
            assert_eq!(a.summary.ranges, b.summary.ranges);
        }
        // 0.2 s at 50 Hz vs 100 Hz
        assert!(forward[0].summary.spike_count < forward[2].summary.spike_count);
    }

    #[test]
    fn test_sweep_rejects_invalid_window() {
        let base = SimulationConfig::default();
        let bad = StimulusScenario::new(
            "backwards",
            StimulusParameters::with_windows(vec![StimulusWindow::constant(1.0, 0.5, 10.0)]),
        );
        assert!(run_sweep(&base, &[bad]).is_err());
    }
}
