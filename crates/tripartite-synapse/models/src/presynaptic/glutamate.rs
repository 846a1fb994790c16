// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Presynaptic Glutamate Release
//!
//! Calcium-sensor Markov chain feeding a vesicle cycle. Rates are written in
//! µM and ms; the calcium input is read as µM and `dt` as ms.
//!
//! ## Sensor chain
//!
//! ```text
//!        5αc       4αc       3αc       2αc        αc         γ
//!   S0 ───────▶ S1 ───────▶ S2 ───────▶ S3 ───────▶ S4 ───────▶ S5 ──────▶ S*
//!      ◀───────    ◀───────    ◀───────    ◀───────    ◀───────    ◀──────
//!         β         2β          3β          4β          5β          δ
//! ```
//!
//! `α = α_base · (1 + alpha_modulation)`: the retrograde LTP signal raises
//! the calcium sensitivity of every binding step.
//!
//! ## Vesicles and cleft
//!
//! ```text
//! λ(c)  = a3 / (1 + exp((a1 − c) / a2))        spontaneous
//! f_r   = λ(c) + γ S*                          total release rate
//! dR/dt = I/τ_rec − f_r R      dE/dt = −E/τ_inact + f_r R
//! dg/dt = n_v g_v E − g_c g
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ModelResult, ParameterCheck};
use crate::kinetics::{clamp_unit, VesiclePool};
use crate::traits::{Compartment, ModelParameters};
use crate::units::{Concentration, Time};

/// Number of sensor states: six calcium-bound levels plus the isomerised state.
pub const SENSOR_STATES: usize = 7;

/// Index of the release-competent (isomerised) state.
pub const RELEASE_READY: usize = SENSOR_STATES - 1;

/// Number of calcium-binding steps.
const BINDING_SITES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlutamateReleaseParameters {
    /// Base forward binding rate (1/(µM·ms))
    pub alpha_per_um_ms: f64,
    /// Unbinding rate (1/ms)
    pub beta_per_ms: f64,
    /// Isomerisation into the release-ready state (1/ms)
    pub gamma_per_ms: f64,
    /// De-isomerisation (1/ms)
    pub delta_per_ms: f64,
    /// Spontaneous release half-activation (µM)
    pub spontaneous_half_um: f64,
    /// Spontaneous release slope (µM)
    pub spontaneous_slope_um: f64,
    /// Spontaneous release maximum (1/ms)
    pub spontaneous_max_per_ms: f64,
    pub tau_recovery_ms: f64,
    pub tau_inactivation_ms: f64,
    /// Vesicles per active zone
    pub vesicles_per_zone: f64,
    /// Glutamate per vesicle, as cleft concentration (µM)
    pub vesicle_glutamate_um: f64,
    /// Cleft clearance rate (1/ms)
    pub clearance_per_ms: f64,
}

impl Default for GlutamateReleaseParameters {
    fn default() -> Self {
        Self {
            alpha_per_um_ms: 0.3,
            beta_per_ms: 3.0,
            gamma_per_ms: 30.0,
            delta_per_ms: 8.0,
            spontaneous_half_um: 50.0,
            spontaneous_slope_um: 5.0,
            spontaneous_max_per_ms: 0.85,
            tau_recovery_ms: 800.0,
            tau_inactivation_ms: 3.0,
            vesicles_per_zone: 2.0,
            vesicle_glutamate_um: 60_000.0,
            clearance_per_ms: 10.0,
        }
    }
}

impl ModelParameters for GlutamateReleaseParameters {
    fn validate(&self) -> ModelResult<()> {
        let check = ParameterCheck::new(GlutamateRelease::NAME);
        check.non_negative("alpha_per_um_ms", self.alpha_per_um_ms)?;
        check.non_negative("beta_per_ms", self.beta_per_ms)?;
        check.non_negative("gamma_per_ms", self.gamma_per_ms)?;
        check.non_negative("delta_per_ms", self.delta_per_ms)?;
        check.finite("spontaneous_half_um", self.spontaneous_half_um)?;
        check.positive("spontaneous_slope_um", self.spontaneous_slope_um)?;
        check.non_negative("spontaneous_max_per_ms", self.spontaneous_max_per_ms)?;
        check.positive("tau_recovery_ms", self.tau_recovery_ms)?;
        check.positive("tau_inactivation_ms", self.tau_inactivation_ms)?;
        check.non_negative("vesicles_per_zone", self.vesicles_per_zone)?;
        check.non_negative("vesicle_glutamate_um", self.vesicle_glutamate_um)?;
        check.positive("clearance_per_ms", self.clearance_per_ms)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlutamateReleaseState {
    /// Occupancy of S0..S5 and S*
    pub sensor: [f64; SENSOR_STATES],
    pub vesicles: VesiclePool,
    pub cleft_glutamate: Concentration,
    /// Total release rate of the last step (1/ms)
    pub release_rate_per_ms: f64,
}

impl GlutamateReleaseState {
    fn resting() -> Self {
        let mut sensor = [0.0; SENSOR_STATES];
        sensor[0] = 1.0;
        Self {
            sensor,
            vesicles: VesiclePool::full(),
            cleft_glutamate: Concentration::ZERO,
            release_rate_per_ms: 0.0,
        }
    }

    pub fn release_ready(&self) -> f64 {
        self.sensor[RELEASE_READY]
    }

    pub fn sensor_total(&self) -> f64 {
        self.sensor.iter().sum()
    }
}

#[derive(Debug, Clone)]
pub struct GlutamateRelease {
    params: GlutamateReleaseParameters,
    state: GlutamateReleaseState,
}

impl GlutamateRelease {
    pub const NAME: &'static str = "GlutamateRelease";

    pub fn new(params: GlutamateReleaseParameters) -> ModelResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            state: GlutamateReleaseState::resting(),
        })
    }

    pub fn state(&self) -> &GlutamateReleaseState {
        &self.state
    }

    /// Effective binding rate under a given retrograde modulation (1/(µM·ms)).
    pub fn effective_alpha(&self, alpha_modulation: f64) -> f64 {
        self.params.alpha_per_um_ms * (1.0 + alpha_modulation)
    }

    /// Spontaneous release rate λ(c) for calcium in µM (1/ms).
    pub fn spontaneous_rate(&self, calcium_um: f64) -> f64 {
        let p = &self.params;
        p.spontaneous_max_per_ms
            / (1.0 + ((p.spontaneous_half_um - calcium_um) / p.spontaneous_slope_um).exp())
    }

    /// Advance one step and return the cleft glutamate concentration.
    ///
    /// `alpha_modulation` is the retrograde factor computed at the end of the
    /// previous step.
    pub fn step(&mut self, dt: Time, calcium: Concentration, alpha_modulation: f64) -> Concentration {
        let p = self.params;
        let dt_ms = dt.millis();
        let c_um = calcium.micromolar().max(0.0);
        let alpha = self.effective_alpha(alpha_modulation);
        let sensor = self.state.sensor;

        let mut d_sensor = [0.0; SENSOR_STATES];
        for i in 0..BINDING_SITES {
            let forward = (BINDING_SITES - i) as f64 * alpha * c_um * sensor[i];
            let backward = (i + 1) as f64 * p.beta_per_ms * sensor[i + 1];
            d_sensor[i] += backward - forward;
            d_sensor[i + 1] += forward - backward;
        }
        let isomerise = p.gamma_per_ms * sensor[BINDING_SITES];
        let revert = p.delta_per_ms * sensor[RELEASE_READY];
        d_sensor[BINDING_SITES] += revert - isomerise;
        d_sensor[RELEASE_READY] += isomerise - revert;

        let release_rate = self.spontaneous_rate(c_um) + p.gamma_per_ms * sensor[RELEASE_READY];
        let effective = self.state.vesicles.effective();
        let d_glutamate = p.vesicles_per_zone * p.vesicle_glutamate_um * effective
            - p.clearance_per_ms * self.state.cleft_glutamate.micromolar();

        let mut next = [0.0; SENSOR_STATES];
        for (x, (s, d)) in next.iter_mut().zip(sensor.iter().zip(d_sensor.iter())) {
            *x = clamp_unit(s + dt_ms * d);
        }
        let total: f64 = next.iter().sum();
        if total > 1.0 {
            next.iter_mut().for_each(|x| *x /= total);
        }

        self.state.sensor = next;
        self.state.vesicles.advance(
            dt_ms,
            release_rate,
            p.tau_recovery_ms,
            p.tau_inactivation_ms,
        );
        let glutamate_um = (self.state.cleft_glutamate.micromolar() + dt_ms * d_glutamate).max(0.0);
        self.state.cleft_glutamate = Concentration::from_micromolar(glutamate_um);
        self.state.release_rate_per_ms = release_rate;

        trace!(
            target: "tripartite-synapse-models",
            "[GLU] S*={:.4} R={:.4} E={:.4} g={:.3}uM rate={:.3e}",
            self.state.release_ready(),
            self.state.vesicles.releasable(),
            self.state.vesicles.effective(),
            glutamate_um,
            release_rate
        );

        self.state.cleft_glutamate
    }
}

impl Compartment for GlutamateRelease {
    type Parameters = GlutamateReleaseParameters;

    fn model_name(&self) -> &'static str {
        "Calcium-sensor glutamate release"
    }

    fn parameters(&self) -> &GlutamateReleaseParameters {
        &self.params
    }

    fn reset(&mut self) {
        self.state = GlutamateReleaseState::resting();
    }
}
