// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Synapse Simulation
//!
//! Owns one instance of every compartment and advances them in a fixed order
//! each step:
//!
//! ```text
//! t ─▶ stimulus ─▶ HH ─V─▶ pre Ca ─c─▶ release ─g─▶ astrocyte ─c_a─▶ glio ─G─▶
//!      post V (g + G) ─V_post, I_AMPA─▶ spine Ca ─c_post─▶ CaMKII ─▶ α_mod
//! ```
//!
//! Two values cross step boundaries:
//! - `α_mod` from CaMKII at step N scales the sensor binding rate at N+1
//! - extrasynaptic glutamate `G` at step N drives presynaptic IP3 at N+1
//!
//! Everything is single-threaded and deterministic apart from the R-type
//! channel draw, which uses a `StdRng` seeded from the run configuration.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};
use tripartite_config::{RunConfig, SimulationConfig};
use tripartite_synapse_models::{
    AstrocyteCore, Compartment, Concentration, Current, CurrentDensity, GliotransmitterRelease,
    GlutamateRelease, PostsynapticCalcium, PostsynapticMembrane, PresynapticCalcium,
    PresynapticMembrane, StimulusProtocol, Time,
};
use tripartite_synapse_plasticity::{CaMKIISwitch, RetrogradeSignal};

use crate::error::{EngineError, EngineResult};
use crate::record::{RecordSink, Recording, SynapseRecord};
use crate::summary::{RunSummary, SummaryTracker};

/// A finished run: decimated records plus whole-run statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutput {
    pub recording: Recording,
    pub summary: RunSummary,
}

/// One tripartite synapse and its fixed-step driver.
#[derive(Debug, Clone)]
pub struct SynapseSimulation {
    run: RunConfig,
    dt: Time,

    stimulus: StimulusProtocol,
    injection: StimulusProtocol,

    pre_membrane: PresynapticMembrane,
    pre_calcium: PresynapticCalcium,
    release: GlutamateRelease,
    astrocyte: AstrocyteCore,
    gliotransmitter: GliotransmitterRelease,
    post_membrane: PostsynapticMembrane,
    post_calcium: PostsynapticCalcium,
    camkii: CaMKIISwitch,

    rng: StdRng,
    /// Computed at the end of the previous step
    retrograde: RetrogradeSignal,
    /// Gliotransmitter output of the previous step
    extracellular_glutamate: Concentration,
    step_index: u64,
}

impl SynapseSimulation {
    /// Build every model from its section of `config`.
    ///
    /// # Errors
    ///
    /// `EngineError::InvalidRun` for a non-positive `dt_ms` or zero record
    /// interval, `EngineError::Model` if any parameter table is rejected.
    pub fn new(config: &SimulationConfig) -> EngineResult<Self> {
        let run = config.run;
        if !(run.dt_ms.is_finite() && run.dt_ms > 0.0) {
            return Err(EngineError::InvalidRun(format!(
                "dt_ms must be a positive number, got {}",
                run.dt_ms
            )));
        }
        if run.record_interval == 0 {
            return Err(EngineError::InvalidRun(
                "record_interval must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            run,
            dt: run.dt(),
            stimulus: StimulusProtocol::new(config.stimulus.clone())?,
            injection: StimulusProtocol::new(config.postsynaptic_injection.clone())?,
            pre_membrane: PresynapticMembrane::new(config.presynaptic_membrane)?,
            pre_calcium: PresynapticCalcium::new(config.presynaptic_calcium)?,
            release: GlutamateRelease::new(config.glutamate_release)?,
            astrocyte: AstrocyteCore::new(config.astrocyte)?,
            gliotransmitter: GliotransmitterRelease::new(config.gliotransmitter)?,
            post_membrane: PostsynapticMembrane::new(config.postsynaptic_membrane)?,
            post_calcium: PostsynapticCalcium::new(config.postsynaptic_calcium)?,
            camkii: CaMKIISwitch::new(config.camkii)?,
            rng: StdRng::seed_from_u64(run.seed),
            retrograde: RetrogradeSignal::BASELINE,
            extracellular_glutamate: Concentration::ZERO,
            step_index: 0,
        })
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// Steps taken since construction or the last reset.
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    /// Simulated time at the start of the next step.
    pub fn time(&self) -> Time {
        self.dt.times(self.step_index)
    }

    /// Retrograde signal that the next step will apply.
    pub fn retrograde_signal(&self) -> RetrogradeSignal {
        self.retrograde
    }

    pub fn presynaptic_membrane(&self) -> &PresynapticMembrane {
        &self.pre_membrane
    }

    pub fn presynaptic_calcium(&self) -> &PresynapticCalcium {
        &self.pre_calcium
    }

    pub fn glutamate_release(&self) -> &GlutamateRelease {
        &self.release
    }

    pub fn astrocyte(&self) -> &AstrocyteCore {
        &self.astrocyte
    }

    pub fn gliotransmitter(&self) -> &GliotransmitterRelease {
        &self.gliotransmitter
    }

    pub fn postsynaptic_membrane(&self) -> &PostsynapticMembrane {
        &self.post_membrane
    }

    pub fn postsynaptic_calcium(&self) -> &PostsynapticCalcium {
        &self.post_calcium
    }

    pub fn camkii(&self) -> &CaMKIISwitch {
        &self.camkii
    }

    /// Advance every model by one step and return the post-step snapshot.
    pub fn step(&mut self) -> SynapseRecord {
        let dt = self.dt;
        let t = self.time();
        let alpha_modulation = self.retrograde.alpha_modulation();

        let pre_stimulus = self.stimulus.current_at(t);
        let post_injection_na = self.injection.current_at(t);

        let v_pre = self.pre_membrane.advance(
            dt,
            CurrentDensity::from_microamps_per_cm2(pre_stimulus),
            CurrentDensity::ZERO,
        );
        let c_pre = self.pre_calcium.advance(dt, v_pre, self.extracellular_glutamate);
        let glutamate = self.release.step(dt, c_pre, alpha_modulation);
        let c_astro = self.astrocyte.step(dt, glutamate);
        let extracellular = self.gliotransmitter.step(dt, c_astro);

        // AMPA receptors see cleft and extrasynaptic glutamate together
        let v_post = self.post_membrane.step(
            dt,
            glutamate + extracellular,
            Current::from_nanoamperes(post_injection_na),
        );
        let c_post = self.post_calcium.step(
            dt,
            v_post,
            self.post_membrane.ampa_current(),
            &mut self.rng,
        );
        self.camkii.step(dt, c_post);

        self.retrograde = self.camkii.get_retrograde_signal();
        self.extracellular_glutamate = extracellular;

        let record = self.snapshot(t, pre_stimulus, post_injection_na, alpha_modulation);
        self.step_index += 1;
        record
    }

    fn snapshot(
        &self,
        t: Time,
        pre_stimulus: f64,
        post_injection_na: f64,
        applied_modulation: f64,
    ) -> SynapseRecord {
        let hh = self.pre_membrane.state();
        let ca = self.pre_calcium.state();
        let glu = self.release.state();
        let astro = self.astrocyte.state();
        let glio = self.gliotransmitter.state();
        let post = self.post_membrane.state();
        let spine = self.post_calcium.state();
        let camkii = self.camkii.state();

        SynapseRecord {
            step: self.step_index,
            time_s: t.seconds(),
            pre_stimulus,
            post_injection_na,

            pre_voltage_mv: hh.voltage.millivolts(),
            gate_m: hh.m,
            gate_h: hh.h,
            gate_n: hh.n,

            pre_calcium_m: ca.total_cytosolic().molar(),
            pre_fast_calcium_m: ca.fast_calcium.molar(),
            pre_slow_calcium_m: ca.slow_calcium.molar(),
            er_calcium_m: ca.er_calcium.molar(),
            pre_ip3_m: ca.ip3.molar(),
            vgcc_gate: ca.vgcc_gate,
            ip3r_gate: ca.ip3r_gate,

            release_ready: glu.release_ready(),
            pre_releasable: glu.vesicles.releasable(),
            pre_effective: glu.vesicles.effective(),
            pre_inactive: glu.vesicles.inactive(),
            synaptic_glutamate_m: glu.cleft_glutamate.molar(),

            astro_calcium_m: astro.calcium.molar(),
            astro_ip3_m: astro.ip3.molar(),
            astro_gate: astro.gate,

            glio_release_probability: glio.release_probability(),
            glio_releasable: glio.vesicles.releasable(),
            glio_effective: glio.vesicles.effective(),
            glio_inactive: glio.vesicles.inactive(),
            extracellular_glutamate_m: glio.extracellular_glutamate.molar(),

            ampa_gate: post.ampa_gate,
            ampa_current_a: post.ampa_current.amperes(),
            post_voltage_mv: post.voltage.millivolts(),
            open_channels: spine.open_channels as f64,
            post_calcium_m: spine.calcium.molar(),

            camkii_phosphorylated_fraction: camkii.phosphorylated_fraction(),
            camkii_phosphorylated_m: self.camkii.phosphorylated_concentration().molar(),
            active_pp1_m: camkii.active_pp1.molar(),
            free_inhibitor_m: camkii.free_inhibitor.molar(),
            alpha_modulation: self.retrograde.alpha_modulation(),
            effective_alpha: self.release.effective_alpha(applied_modulation),
        }
    }

    /// Run `total_steps` further steps, handing every `record_interval`-th
    /// record to `sink`.
    ///
    /// Decimation follows the global step index, so a fresh simulation
    /// records step 0 first.
    pub fn run<S: RecordSink + ?Sized>(&mut self, sink: &mut S) -> RunSummary {
        let total = self.run.total_steps;
        let interval = self.run.record_interval;
        let progress_every = (total / 20).max(1);

        info!(
            target: "tripartite-synapse-engine",
            "Starting run: dt={} ms, steps={} ({:.3} s), seed={}, record_interval={}",
            self.run.dt_ms,
            total,
            self.dt.times(total).seconds(),
            self.run.seed,
            interval
        );

        let start_time = self.time();
        let started = Instant::now();
        let mut tracker = SummaryTracker::new();

        for i in 0..total {
            let record = self.step();

            if tracker.observe(&record) {
                warn!(
                    target: "tripartite-synapse-engine",
                    "Non-finite observable at step {} (t={:.6} s); dt={} ms may exceed the stability bound",
                    record.step,
                    record.time_s,
                    self.run.dt_ms
                );
            }

            if record.step % interval == 0 {
                sink.record(&record);
                tracker.count_record();
            }

            if (i + 1) % progress_every == 0 {
                debug!(
                    target: "tripartite-synapse-engine",
                    "Progress {:>3}%: t={:.3} s, V_pre={:.2} mV, c_post={:.3e} M, alpha_mod={:.3e}",
                    (i + 1) * 100 / total,
                    record.time_s,
                    record.pre_voltage_mv,
                    record.post_calcium_m,
                    record.alpha_modulation
                );
            }
        }

        let simulated_s = self.time().seconds() - start_time.seconds();
        let summary = tracker.finish(simulated_s, started.elapsed().as_secs_f64());

        info!(
            target: "tripartite-synapse-engine",
            "Run complete in {:.2} s wall clock: {} spikes, peak c_post={:.3e} M, peak phosphorylation={:.4}, final alpha_mod={:.3e}",
            summary.wall_clock_s,
            summary.spike_count,
            summary.peak("post_calcium_m").unwrap_or(0.0),
            summary.peak("camkii_phosphorylated_fraction").unwrap_or(0.0),
            summary.final_alpha_modulation
        );

        summary
    }

    /// Run and keep every decimated record in memory.
    pub fn run_recorded(&mut self) -> SimulationOutput {
        let mut recording = Recording::new();
        let summary = self.run(&mut recording);
        SimulationOutput { recording, summary }
    }

    /// Restore every model's initial state and reseed the channel draw.
    pub fn reset(&mut self) {
        self.pre_membrane.reset();
        self.pre_calcium.reset();
        self.release.reset();
        self.astrocyte.reset();
        self.gliotransmitter.reset();
        self.post_membrane.reset();
        self.post_calcium.reset();
        self.camkii.reset();
        self.rng = StdRng::seed_from_u64(self.run.seed);
        self.retrograde = RetrogradeSignal::BASELINE;
        self.extracellular_glutamate = Concentration::ZERO;
        self.step_index = 0;
        debug!(target: "tripartite-synapse-engine", "Simulation reset to initial state");
    }
}
