// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Postsynaptic Membrane
//!
//! AMPA-gated leaky integrator in SI units.
//!
//! ```text
//! dm/dt  = α g (1 − m) − β m
//! I_AMPA = g_AMPA m (V − E_AMPA)
//! τ dV/dt = −(V − V_rest) − R_m (I_inj + I_AMPA)
//! ```
//!
//! `I_AMPA` is negative (inward) below E_AMPA, so it depolarises; injected
//! current follows the same sign convention.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ModelResult, ParameterCheck};
use crate::kinetics::clamp_unit;
use crate::traits::{Compartment, ModelParameters};
use crate::units::{Concentration, Current, Time, Voltage};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostsynapticMembraneParameters {
    pub membrane_resistance_ohm: f64,
    pub resting_potential_v: f64,
    pub time_constant_s: f64,
    pub ampa_conductance_s: f64,
    pub ampa_reversal_v: f64,
    /// Glutamate binding rate (1/(M·s))
    pub ampa_binding_per_m_s: f64,
    /// Unbinding rate (1/s)
    pub ampa_unbinding_per_s: f64,
}

impl Default for PostsynapticMembraneParameters {
    fn default() -> Self {
        Self {
            membrane_resistance_ohm: 0.7985e11,
            resting_potential_v: -0.07,
            time_constant_s: 0.05,
            ampa_conductance_s: 0.35e-9,
            ampa_reversal_v: 0.0,
            ampa_binding_per_m_s: 1.1e6,
            ampa_unbinding_per_s: 190.0,
        }
    }
}

impl ModelParameters for PostsynapticMembraneParameters {
    fn validate(&self) -> ModelResult<()> {
        let check = ParameterCheck::new(PostsynapticMembrane::NAME);
        check.positive("membrane_resistance_ohm", self.membrane_resistance_ohm)?;
        check.finite("resting_potential_v", self.resting_potential_v)?;
        check.positive("time_constant_s", self.time_constant_s)?;
        check.non_negative("ampa_conductance_s", self.ampa_conductance_s)?;
        check.finite("ampa_reversal_v", self.ampa_reversal_v)?;
        check.non_negative("ampa_binding_per_m_s", self.ampa_binding_per_m_s)?;
        check.non_negative("ampa_unbinding_per_s", self.ampa_unbinding_per_s)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostsynapticMembraneState {
    pub voltage: Voltage,
    /// AMPA open fraction
    pub ampa_gate: f64,
    pub ampa_current: Current,
}

#[derive(Debug, Clone)]
pub struct PostsynapticMembrane {
    params: PostsynapticMembraneParameters,
    state: PostsynapticMembraneState,
}

impl PostsynapticMembrane {
    pub const NAME: &'static str = "PostsynapticMembrane";

    pub fn new(params: PostsynapticMembraneParameters) -> ModelResult<Self> {
        params.validate()?;
        Ok(Self {
            state: Self::initial_state(&params),
            params,
        })
    }

    fn initial_state(params: &PostsynapticMembraneParameters) -> PostsynapticMembraneState {
        PostsynapticMembraneState {
            voltage: Voltage::from_volts(params.resting_potential_v),
            ampa_gate: 0.0,
            ampa_current: Current::ZERO,
        }
    }

    pub fn state(&self) -> &PostsynapticMembraneState {
        &self.state
    }

    /// AMPA current computed in the last step.
    pub fn ampa_current(&self) -> Current {
        self.state.ampa_current
    }

    /// Advance one step and return the membrane potential.
    pub fn step(&mut self, dt: Time, glutamate: Concentration, injected: Current) -> Voltage {
        let p = &self.params;
        let dt = dt.seconds();
        let g = glutamate.molar().max(0.0);
        let s = &mut self.state;

        let d_gate = p.ampa_binding_per_m_s * g * (1.0 - s.ampa_gate) - p.ampa_unbinding_per_s * s.ampa_gate;
        s.ampa_gate = clamp_unit(s.ampa_gate + dt * d_gate);

        let v = s.voltage.volts();
        let i_ampa = p.ampa_conductance_s * s.ampa_gate * (v - p.ampa_reversal_v);
        let d_v = (-(v - p.resting_potential_v)
            - p.membrane_resistance_ohm * (injected.amperes() + i_ampa))
            / p.time_constant_s;

        s.ampa_current = Current::from_amperes(i_ampa);
        s.voltage = Voltage::from_volts(v + dt * d_v);

        trace!(
            target: "tripartite-synapse-models",
            "[POST] V={:.3}mV m={:.4} I_AMPA={:.3e}A",
            s.voltage.millivolts(),
            s.ampa_gate,
            i_ampa
        );

        s.voltage
    }
}

impl Compartment for PostsynapticMembrane {
    type Parameters = PostsynapticMembraneParameters;

    fn model_name(&self) -> &'static str {
        "AMPA leaky integrator"
    }

    fn parameters(&self) -> &PostsynapticMembraneParameters {
        &self.params
    }

    fn reset(&mut self) {
        self.state = Self::initial_state(&self.params);
    }
}
