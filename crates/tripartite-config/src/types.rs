// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! These structs map to sections in `tripartite.toml`. The model sections
//! reuse the parameter structs of the model crates directly.

use serde::{Deserialize, Serialize};
use tripartite_observability::LoggingConfig;
use tripartite_synapse_models::{
    AstrocyteParameters, GliotransmitterParameters, GlutamateReleaseParameters,
    HodgkinHuxleyParameters, PostsynapticCalciumParameters, PostsynapticMembraneParameters,
    PresynapticCalciumParameters, StimulusParameters, StimulusWindow, Time,
};
use tripartite_synapse_plasticity::CaMKIIParameters;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub run: RunConfig,
    /// Presynaptic stimulus, amplitudes in µA/cm²
    pub stimulus: StimulusParameters,
    /// Postsynaptic somatic injection, amplitudes in nA (positive is
    /// outward). Off unless the section defines windows.
    pub postsynaptic_injection: StimulusParameters,
    pub presynaptic_membrane: HodgkinHuxleyParameters,
    pub presynaptic_calcium: PresynapticCalciumParameters,
    pub glutamate_release: GlutamateReleaseParameters,
    pub astrocyte: AstrocyteParameters,
    pub gliotransmitter: GliotransmitterParameters,
    pub postsynaptic_membrane: PostsynapticMembraneParameters,
    pub postsynaptic_calcium: PostsynapticCalciumParameters,
    pub camkii: CaMKIIParameters,
    pub logging: LoggingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            stimulus: default_stimulus(),
            postsynaptic_injection: StimulusParameters::none(),
            presynaptic_membrane: HodgkinHuxleyParameters::default(),
            presynaptic_calcium: PresynapticCalciumParameters::default(),
            glutamate_release: GlutamateReleaseParameters::default(),
            astrocyte: AstrocyteParameters::default(),
            gliotransmitter: GliotransmitterParameters::default(),
            postsynaptic_membrane: PostsynapticMembraneParameters::default(),
            postsynaptic_calcium: PostsynapticCalciumParameters::default(),
            camkii: CaMKIIParameters::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Ten seconds of quiet followed by ten seconds of 10 µA/cm².
fn default_stimulus() -> StimulusParameters {
    StimulusParameters::with_windows(vec![StimulusWindow::constant(10.0, 20.0, 10.0)])
}

/// Integration settings for one run
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RunConfig {
    /// Fixed Euler step (ms)
    pub dt_ms: f64,
    pub total_steps: u64,
    /// Record every N-th step
    pub record_interval: u64,
    /// Seed of the R-type channel draw
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dt_ms: 0.05,
            total_steps: 400_000, // 20 s
            record_interval: 20,
            seed: 42,
        }
    }
}

impl RunConfig {
    pub fn dt(&self) -> Time {
        Time::from_millis(self.dt_ms)
    }

    /// Simulated time covered by `total_steps`.
    pub fn duration(&self) -> Time {
        self.dt().times(self.total_steps)
    }

    /// Set `total_steps` to cover `seconds` at the current `dt_ms`.
    pub fn set_duration_s(&mut self, seconds: f64) {
        self.total_steps = (seconds * 1e3 / self.dt_ms).round().max(0.0) as u64;
    }

    /// Number of records a run will produce (step 0 included).
    pub fn expected_records(&self) -> u64 {
        if self.record_interval == 0 || self.total_steps == 0 {
            return 0;
        }
        (self.total_steps - 1) / self.record_interval + 1
    }
}
