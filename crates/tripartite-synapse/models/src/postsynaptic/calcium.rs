// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Postsynaptic Spine Calcium
//!
//! Stochastic R-type channels plus an AMPA calcium fraction, a linear
//! extrusion term and a fast endogenous buffer, in SI units.
//!
//! ```text
//! n      ~ Binomial(N_R, P_open)   if V > V_θ,   else 0
//! i_R    = g_R n (V − E_R)
//! J      = −(η I_AMPA + i_R) / (z F Vol) − k_s (c − c_rest)
//! θ      = b_t K_endo / (K_endo + c)²
//! dc/dt  = J / (1 + θ)
//! ```
//!
//! The binomial draw is the only stochastic element of the whole simulation;
//! the caller owns the random source so runs are reproducible from a seed.

use rand::Rng;
use rand_distr::{Binomial, Distribution};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ModelResult, ParameterCheck};
use crate::kinetics::{CALCIUM_VALENCE, FARADAY, LITRES_PER_CUBIC_METRE};
use crate::traits::{Compartment, ModelParameters};
use crate::units::{Concentration, Current, Time, Voltage};

/// Floor applied to spine calcium after each step (M).
pub const SPINE_CALCIUM_FLOOR: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostsynapticCalciumParameters {
    /// Fraction of AMPA current carried by Ca²⁺
    pub ampa_calcium_fraction: f64,
    pub channel_count: u32,
    pub channel_open_probability: f64,
    pub channel_conductance_s: f64,
    pub channel_reversal_v: f64,
    pub activation_threshold_v: f64,
    pub buffer_total_m: f64,
    pub buffer_affinity_m: f64,
    pub spine_volume_m3: f64,
    pub resting_calcium_m: f64,
    pub extrusion_rate_per_s: f64,
}

impl Default for PostsynapticCalciumParameters {
    fn default() -> Self {
        Self {
            ampa_calcium_fraction: 0.012,
            channel_count: 12,
            channel_open_probability: 0.52,
            channel_conductance_s: 15e-12,
            channel_reversal_v: 0.0274,
            activation_threshold_v: -0.030,
            buffer_total_m: 200e-6,
            buffer_affinity_m: 10e-6,
            spine_volume_m3: 0.9048e-18,
            resting_calcium_m: 100e-9,
            extrusion_rate_per_s: 100.0,
        }
    }
}

impl ModelParameters for PostsynapticCalciumParameters {
    fn validate(&self) -> ModelResult<()> {
        let check = ParameterCheck::new(PostsynapticCalcium::NAME);
        check.probability("ampa_calcium_fraction", self.ampa_calcium_fraction)?;
        check.probability("channel_open_probability", self.channel_open_probability)?;
        check.non_negative("channel_conductance_s", self.channel_conductance_s)?;
        check.finite("channel_reversal_v", self.channel_reversal_v)?;
        check.finite("activation_threshold_v", self.activation_threshold_v)?;
        check.non_negative("buffer_total_m", self.buffer_total_m)?;
        check.positive("buffer_affinity_m", self.buffer_affinity_m)?;
        check.positive("spine_volume_m3", self.spine_volume_m3)?;
        check.positive("resting_calcium_m", self.resting_calcium_m)?;
        check.non_negative("extrusion_rate_per_s", self.extrusion_rate_per_s)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostsynapticCalciumState {
    pub calcium: Concentration,
    /// R-type channels open in the last step
    pub open_channels: u64,
}

#[derive(Debug, Clone)]
pub struct PostsynapticCalcium {
    params: PostsynapticCalciumParameters,
    state: PostsynapticCalciumState,
    opening: Binomial,
    /// 1 / (z F Vol) in M/C
    charge_to_concentration: f64,
}

impl PostsynapticCalcium {
    pub const NAME: &'static str = "PostsynapticCalcium";

    pub fn new(params: PostsynapticCalciumParameters) -> ModelResult<Self> {
        params.validate()?;
        let opening = Binomial::new(u64::from(params.channel_count), params.channel_open_probability)
            .map_err(|e| {
                ParameterCheck::new(Self::NAME).custom("channel_open_probability", e.to_string())
            })?;
        let volume_litres = params.spine_volume_m3 * LITRES_PER_CUBIC_METRE;
        Ok(Self {
            state: Self::initial_state(&params),
            opening,
            charge_to_concentration: 1.0 / (CALCIUM_VALENCE * FARADAY * volume_litres),
            params,
        })
    }

    fn initial_state(params: &PostsynapticCalciumParameters) -> PostsynapticCalciumState {
        PostsynapticCalciumState {
            calcium: Concentration::from_molar(params.resting_calcium_m),
            open_channels: 0,
        }
    }

    pub fn state(&self) -> &PostsynapticCalciumState {
        &self.state
    }

    /// Buffering factor `θ` at a given calcium level.
    pub fn buffer_capacity(&self, calcium: Concentration) -> f64 {
        let p = &self.params;
        let k = p.buffer_affinity_m;
        p.buffer_total_m * k / (k + calcium.molar()).powi(2)
    }

    /// Advance one step and return spine calcium.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        dt: Time,
        voltage: Voltage,
        ampa_current: Current,
        rng: &mut R,
    ) -> Concentration {
        let p = &self.params;
        let v = voltage.volts();
        let c = self.state.calcium.molar();

        let open = if v > p.activation_threshold_v {
            self.opening.sample(rng)
        } else {
            0
        };
        let i_r = p.channel_conductance_s * open as f64 * (v - p.channel_reversal_v);
        let influx = -(p.ampa_calcium_fraction * ampa_current.amperes() + i_r)
            * self.charge_to_concentration;
        let extrusion = p.extrusion_rate_per_s * (c - p.resting_calcium_m);
        let d_c = (influx - extrusion) / (1.0 + self.buffer_capacity(self.state.calcium));

        self.state = PostsynapticCalciumState {
            calcium: Concentration::from_molar((c + dt.seconds() * d_c).max(SPINE_CALCIUM_FLOOR)),
            open_channels: open,
        };

        trace!(
            target: "tripartite-synapse-models",
            "[POST-CA] c={:.3e} open={} i_R={:.3e}",
            self.state.calcium.molar(),
            open,
            i_r
        );

        self.state.calcium
    }
}

impl Compartment for PostsynapticCalcium {
    type Parameters = PostsynapticCalciumParameters;

    fn model_name(&self) -> &'static str {
        "Stochastic R-type spine calcium"
    }

    fn parameters(&self) -> &PostsynapticCalciumParameters {
        &self.params
    }

    fn reset(&mut self) {
        self.state = Self::initial_state(&self.params);
    }
}
