// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Astrocyte Calcium / IP3 Core
//!
//! G-ChI scheme (De Pittà et al.) in SI units. `H(x; K, n)` is the Hill function.
//!
//! ```text
//! drive  = c0 − (1 + c1) c                          (ER driving force via total-calcium conservation)
//! J_chan = r_c m∞³ n∞³ h³ · drive                   m∞ = H(p; d1, 1), n∞ = H(c; d5, 1)
//! J_pump = v_ER H(c; K_ER, 2)
//! J_leak = r_L · drive
//! dc/dt  = J_chan − J_pump + J_leak
//!
//! P_β    = v_β H(g; K_R, 0.7) / (1 + K_p/K_R · H(c; K_π, 1))   glutamate-driven PLCβ, PKC-inhibited
//! P_δ    = v_δ / (1 + p/κ_δ) · H(c; K_PLCδ, 2)                  calcium-driven PLCδ
//! D_3K   = v_3K H(c; K_D, 4) H(p; K_3, 1)                       IP3 3-kinase
//! D_5P   = r_5P p                                              IP3 5-phosphatase
//! dp/dt  = P_β + P_δ − D_3K − D_5P
//!
//! dh/dt  = a2 d2 (p + d1)/(p + d3) (1 − h) − a2 c h
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ModelResult, ParameterCheck};
use crate::kinetics::{clamp_unit, hill};
use crate::traits::{Compartment, ModelParameters};
use crate::units::{Concentration, Time};

/// Floor applied to astrocytic calcium after each step (M).
pub const ASTROCYTE_CALCIUM_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AstrocyteParameters {
    // Calcium fluxes
    pub channel_rate_per_s: f64,
    pub leak_rate_per_s: f64,
    pub serca_max_m_per_s: f64,
    pub serca_affinity_m: f64,
    pub total_calcium_m: f64,
    pub er_volume_ratio: f64,

    // IP3R gating
    pub d1_m: f64,
    pub d2_m: f64,
    pub d3_m: f64,
    pub d5_m: f64,
    pub a2_per_m_s: f64,

    // IP3 production
    pub plc_beta_max_m_per_s: f64,
    pub plc_beta_glutamate_affinity_m: f64,
    pub pkc_inhibition_m: f64,
    pub pkc_calcium_affinity_m: f64,
    pub plc_delta_max_m_per_s: f64,
    pub plc_delta_calcium_affinity_m: f64,
    pub plc_delta_ip3_inhibition_m: f64,

    // IP3 degradation
    pub ip5p_rate_per_s: f64,
    pub ip3k_max_m_per_s: f64,
    pub ip3k_calcium_affinity_m: f64,
    pub ip3k_ip3_affinity_m: f64,

    // Initial state
    pub initial_calcium_m: f64,
    pub initial_ip3_m: f64,
    pub initial_gate: f64,
}

impl Default for AstrocyteParameters {
    fn default() -> Self {
        Self {
            channel_rate_per_s: 6.0,
            leak_rate_per_s: 0.11,
            serca_max_m_per_s: 0.9e-6,
            serca_affinity_m: 0.1e-6,
            total_calcium_m: 2e-6,
            er_volume_ratio: 0.185,

            d1_m: 0.13e-6,
            d2_m: 1.049e-6,
            d3_m: 0.9434e-6,
            d5_m: 0.08234e-6,
            a2_per_m_s: 0.2e6,

            plc_beta_max_m_per_s: 0.5e-6,
            plc_beta_glutamate_affinity_m: 1.3e-6,
            pkc_inhibition_m: 10e-6,
            pkc_calcium_affinity_m: 0.6e-6,
            plc_delta_max_m_per_s: 0.05e-6,
            plc_delta_calcium_affinity_m: 0.1e-6,
            plc_delta_ip3_inhibition_m: 1.5e-6,

            ip5p_rate_per_s: 0.05,
            ip3k_max_m_per_s: 2e-6,
            ip3k_calcium_affinity_m: 0.7e-6,
            ip3k_ip3_affinity_m: 1e-6,

            initial_calcium_m: 0.1e-6,
            initial_ip3_m: 0.1e-6,
            initial_gate: 0.8,
        }
    }
}

impl ModelParameters for AstrocyteParameters {
    fn validate(&self) -> ModelResult<()> {
        let check = ParameterCheck::new(AstrocyteCore::NAME);
        check.non_negative("channel_rate_per_s", self.channel_rate_per_s)?;
        check.non_negative("leak_rate_per_s", self.leak_rate_per_s)?;
        check.non_negative("serca_max_m_per_s", self.serca_max_m_per_s)?;
        check.positive("serca_affinity_m", self.serca_affinity_m)?;
        check.positive("total_calcium_m", self.total_calcium_m)?;
        check.positive("er_volume_ratio", self.er_volume_ratio)?;
        check.positive("d1_m", self.d1_m)?;
        check.positive("d2_m", self.d2_m)?;
        check.positive("d3_m", self.d3_m)?;
        check.positive("d5_m", self.d5_m)?;
        check.non_negative("a2_per_m_s", self.a2_per_m_s)?;
        check.non_negative("plc_beta_max_m_per_s", self.plc_beta_max_m_per_s)?;
        check.positive("plc_beta_glutamate_affinity_m", self.plc_beta_glutamate_affinity_m)?;
        check.non_negative("pkc_inhibition_m", self.pkc_inhibition_m)?;
        check.positive("pkc_calcium_affinity_m", self.pkc_calcium_affinity_m)?;
        check.non_negative("plc_delta_max_m_per_s", self.plc_delta_max_m_per_s)?;
        check.positive("plc_delta_calcium_affinity_m", self.plc_delta_calcium_affinity_m)?;
        check.positive("plc_delta_ip3_inhibition_m", self.plc_delta_ip3_inhibition_m)?;
        check.non_negative("ip5p_rate_per_s", self.ip5p_rate_per_s)?;
        check.non_negative("ip3k_max_m_per_s", self.ip3k_max_m_per_s)?;
        check.positive("ip3k_calcium_affinity_m", self.ip3k_calcium_affinity_m)?;
        check.positive("ip3k_ip3_affinity_m", self.ip3k_ip3_affinity_m)?;
        check.positive("initial_calcium_m", self.initial_calcium_m)?;
        check.non_negative("initial_ip3_m", self.initial_ip3_m)?;
        check.probability("initial_gate", self.initial_gate)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AstrocyteState {
    pub calcium: Concentration,
    pub ip3: Concentration,
    /// IP3R de-inactivation gate
    pub gate: f64,
}

/// Time derivatives at one state (M/s, M/s, 1/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AstrocyteDerivatives {
    pub calcium: f64,
    pub ip3: f64,
    pub gate: f64,
}

#[derive(Debug, Clone)]
pub struct AstrocyteCore {
    params: AstrocyteParameters,
    state: AstrocyteState,
}

impl AstrocyteCore {
    pub const NAME: &'static str = "AstrocyteCore";

    pub fn new(params: AstrocyteParameters) -> ModelResult<Self> {
        params.validate()?;
        Ok(Self {
            state: Self::initial_state(&params),
            params,
        })
    }

    fn initial_state(params: &AstrocyteParameters) -> AstrocyteState {
        AstrocyteState {
            calcium: Concentration::from_molar(params.initial_calcium_m),
            ip3: Concentration::from_molar(params.initial_ip3_m),
            gate: params.initial_gate,
        }
    }

    pub fn state(&self) -> &AstrocyteState {
        &self.state
    }

    /// Right-hand side of the three ODEs at the current state.
    pub fn compute_derivatives(&self, glutamate: Concentration) -> AstrocyteDerivatives {
        let p = &self.params;
        let c = self.state.calcium.molar();
        let ip3 = self.state.ip3.molar();
        let h = self.state.gate;
        let g = glutamate.molar();

        let m_inf = hill(ip3, p.d1_m, 1.0);
        let n_inf = hill(c, p.d5_m, 1.0);
        let drive = p.total_calcium_m - (1.0 + p.er_volume_ratio) * c;
        let j_channel = p.channel_rate_per_s * m_inf.powi(3) * n_inf.powi(3) * h.powi(3) * drive;
        let j_pump = p.serca_max_m_per_s * hill(c, p.serca_affinity_m, 2.0);
        let j_leak = p.leak_rate_per_s * drive;

        let plc_beta = p.plc_beta_max_m_per_s * hill(g, p.plc_beta_glutamate_affinity_m, 0.7)
            / (1.0
                + p.pkc_inhibition_m / p.plc_beta_glutamate_affinity_m
                    * hill(c, p.pkc_calcium_affinity_m, 1.0));
        let plc_delta = p.plc_delta_max_m_per_s / (1.0 + ip3 / p.plc_delta_ip3_inhibition_m)
            * hill(c, p.plc_delta_calcium_affinity_m, 2.0);
        let ip3k = p.ip3k_max_m_per_s
            * hill(c, p.ip3k_calcium_affinity_m, 4.0)
            * hill(ip3, p.ip3k_ip3_affinity_m, 1.0);
        let ip5p = p.ip5p_rate_per_s * ip3;

        let gate_alpha = p.a2_per_m_s * p.d2_m * (ip3 + p.d1_m) / (ip3 + p.d3_m);
        let gate_beta = p.a2_per_m_s * c;

        AstrocyteDerivatives {
            calcium: j_channel - j_pump + j_leak,
            ip3: plc_beta + plc_delta - ip3k - ip5p,
            gate: gate_alpha * (1.0 - h) - gate_beta * h,
        }
    }

    /// Advance one Euler step and return astrocytic calcium.
    pub fn step(&mut self, dt: Time, glutamate: Concentration) -> Concentration {
        let d = self.compute_derivatives(glutamate);
        let dt = dt.seconds();
        let s = self.state;

        self.state = AstrocyteState {
            calcium: Concentration::from_molar(
                (s.calcium.molar() + dt * d.calcium).max(ASTROCYTE_CALCIUM_FLOOR),
            ),
            ip3: Concentration::from_molar((s.ip3.molar() + dt * d.ip3).max(0.0)),
            gate: clamp_unit(s.gate + dt * d.gate),
        };

        trace!(
            target: "tripartite-synapse-models",
            "[ASTRO] c={:.3e} ip3={:.3e} h={:.4}",
            self.state.calcium.molar(),
            self.state.ip3.molar(),
            self.state.gate
        );

        self.state.calcium
    }
}

impl Compartment for AstrocyteCore {
    type Parameters = AstrocyteParameters;

    fn model_name(&self) -> &'static str {
        "G-ChI astrocyte"
    }

    fn parameters(&self) -> &AstrocyteParameters {
        &self.params
    }

    fn reset(&mut self) {
        self.state = Self::initial_state(&self.params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> AstrocyteCore {
        AstrocyteCore::new(AstrocyteParameters::default()).unwrap()
    }

    fn dt() -> Time {
        Time::from_millis(0.05)
    }

    #[test]
    fn test_glutamate_raises_ip3_production() {
        let astro = model();
        let without = astro.compute_derivatives(Concentration::ZERO);
        let with = astro.compute_derivatives(Concentration::from_micromolar(10.0));
        assert!(with.ip3 > without.ip3);
        // Calcium and gate derivatives do not depend on glutamate directly
        assert_eq!(with.calcium, without.calcium);
        assert_eq!(with.gate, without.gate);
    }

    #[test]
    fn test_sustained_glutamate_elevates_calcium() {
        let mut astro = model();
        let mut peak: f64 = 0.0;
        for _ in 0..100_000 {
            let c = astro.step(dt(), Concentration::from_micromolar(40.0));
            peak = peak.max(c.molar());
        }
        assert!(peak > 0.2e-6, "astrocyte calcium peak {}", peak);
    }

    #[test]
    fn test_state_bounds_hold() {
        let mut astro = model();
        for i in 0..50_000 {
            let g = if i % 1000 < 100 { 1e-3 } else { 0.0 };
            astro.step(dt(), Concentration::from_molar(g));
            let s = astro.state();
            assert!(s.calcium.molar() >= ASTROCYTE_CALCIUM_FLOOR);
            assert!(s.ip3.molar() >= 0.0);
            assert!((0.0..=1.0).contains(&s.gate));
        }
    }

    #[test]
    fn test_reset() {
        let mut astro = model();
        for _ in 0..100 {
            astro.step(dt(), Concentration::from_micromolar(40.0));
        }
        astro.reset();
        assert_eq!(astro.state().gate, 0.8);
        assert_eq!(astro.state().calcium, Concentration::from_molar(0.1e-6));
    }
}
