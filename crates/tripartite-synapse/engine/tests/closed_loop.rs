// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Closed-loop behaviour of the engine: feedback lag, decimation,
//! reproducibility and per-step invariants under a driven synapse.

use proptest::prelude::*;
use tripartite_config::SimulationConfig;
use tripartite_synapse_engine::{Recording, SynapseRecord, SynapseSimulation};
use tripartite_synapse_models::{StimulusParameters, StimulusWindow};

fn driven_config(steps: u64, interval: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.run.total_steps = steps;
    config.run.record_interval = interval;
    config.stimulus = StimulusParameters::with_windows(vec![StimulusWindow::pulsed(
        0.0, 10.0, 20.0, 100.0, 0.002,
    )]);
    config
}

fn run_all(config: &SimulationConfig) -> Vec<SynapseRecord> {
    let mut records = Vec::new();
    SynapseSimulation::new(config).unwrap().run(&mut records);
    records
}

#[test]
fn test_effective_alpha_uses_previous_step_signal() {
    let config = driven_config(4_000, 1);
    let records = run_all(&config);
    let sim = SynapseSimulation::new(&config).unwrap();
    let alpha = |modulation: f64| sim.glutamate_release().effective_alpha(modulation);

    assert_eq!(records[0].effective_alpha, alpha(0.0));
    for pair in records.windows(2) {
        let expected = alpha(pair[0].alpha_modulation);
        assert!((pair[1].effective_alpha - expected).abs() <= 1e-12 * expected.abs());
    }
}

#[test]
fn test_record_count_matches_decimation() {
    for (steps, interval) in [(1_000, 1), (1_000, 7), (999, 20), (1, 50)] {
        let config = driven_config(steps, interval);
        let records = run_all(&config);
        assert_eq!(records.len() as u64, config.run.expected_records());
        assert!(records.iter().all(|r| r.step % interval == 0));
    }
}

#[test]
fn test_same_seed_reproduces_run() {
    let config = driven_config(6_000, 10);
    assert_eq!(run_all(&config), run_all(&config));
}

#[test]
fn test_continued_run_extends_time() {
    let config = driven_config(2_000, 100);
    let mut sim = SynapseSimulation::new(&config).unwrap();
    let mut first = Recording::new();
    sim.run(&mut first);
    let mut second = Recording::new();
    let summary = sim.run(&mut second);

    assert_eq!(sim.step_index(), 4_000);
    assert_eq!(second.records()[0].step, 2_000);
    assert!((summary.simulated_s - 0.1).abs() < 1e-9);
}

#[test]
fn test_recording_json_has_every_observable() {
    let mut sim = SynapseSimulation::new(&driven_config(200, 50)).unwrap();
    let output = sim.run_recorded();
    let mut buffer = Vec::new();
    output.recording.write_json(&mut buffer).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
    for name in tripartite_synapse_engine::OBSERVABLES {
        assert!(json.to_string().contains(name), "missing {name}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn driven_states_stay_bounded(
        amplitude in 0.0f64..40.0,
        frequency in 5.0f64..120.0,
        seed in any::<u64>(),
    ) {
        let mut config = driven_config(3_000, 1);
        config.run.seed = seed;
        config.stimulus = StimulusParameters::with_windows(vec![StimulusWindow::pulsed(
            0.0, 1.0, amplitude, frequency, 0.002,
        )]);

        for r in run_all(&config) {
            for gate in [r.gate_m, r.gate_h, r.gate_n, r.vgcc_gate, r.ip3r_gate,
                         r.astro_gate, r.ampa_gate, r.glio_release_probability,
                         r.camkii_phosphorylated_fraction] {
                prop_assert!((0.0..=1.0).contains(&gate));
            }
            let pre = r.pre_releasable + r.pre_effective + r.pre_inactive;
            let glio = r.glio_releasable + r.glio_effective + r.glio_inactive;
            prop_assert!((pre - 1.0).abs() < 1e-9 && (glio - 1.0).abs() < 1e-9);
            prop_assert!(r.post_calcium_m >= 1e-9);
            prop_assert!(r.open_channels <= 12.0);
            prop_assert!((0.0..=0.005).contains(&r.alpha_modulation));
            prop_assert!(r.synaptic_glutamate_m >= 0.0 && r.extracellular_glutamate_m >= 0.0);
        }
    }
}
