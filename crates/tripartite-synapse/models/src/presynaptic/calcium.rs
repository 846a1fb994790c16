// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Presynaptic Calcium
//!
//! Two-timescale bouton calcium in SI units (M, s, V, A, m²).
//!
//! ## Fast pool (plasma membrane)
//!
//! ```text
//! m∞(V)   = 1 / (1 + exp((V_m − V) / k_m))           dm/dt = (m∞ − m) / τ_m
//! I_Ca    = ρ m² g_Ca (V − E_Ca) A                   E_Ca from Nernst
//! I_PMCA  = v_P c² / (c² + K_P²) A
//! dc_f/dt = −(I_Ca + I_PMCA) / (z F Vol) + v_leak (c_ext − c)
//! ```
//!
//! Inward current is negative, so `−I_Ca` raises calcium and the outward pump
//! current lowers it.
//!
//! ## Slow pool (ER, Li–Rinzel IP3R)
//!
//! ```text
//! m∞ = p / (p + d1)     n∞ = c / (c + d5)
//! J_IP3R = c1 v1 m∞³ n∞³ q³ (c_ER − c)
//! J_SERCA = v3 c² / (c² + k3²)
//! J_ERleak = c1 v2 (c_ER − c)
//! dc_s/dt  = J_IP3R + J_ERleak − J_SERCA
//! dc_ER/dt = −dc_s/dt / c1
//! dq/dt = a2 d2 (p + d1)/(p + d3) (1 − q) − a2 c q
//! dp/dt = v_g g^0.7 / (k_g^0.7 + g^0.7) − r_p (p − p0)
//! ```
//!
//! `c = c_f + c_s` is the total cytosolic calcium. The ER equation is the
//! slow-pool equation scaled by the ER/cytosol volume ratio `c1`, so mass
//! exchanged between the two is conserved up to discretisation error.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ModelResult, ParameterCheck};
use crate::kinetics::{
    clamp_unit, hill, nernst_potential, CALCIUM_VALENCE, FARADAY, LITRES_PER_CUBIC_METRE,
};
use crate::traits::{Compartment, ModelParameters};
use crate::units::{Concentration, Time, Voltage};

/// Floor applied to slow-pool and ER calcium after each step (M).
pub const CALCIUM_FLOOR: f64 = 1e-10;

/// Lower bound on the cytosolic calcium used inside flux expressions (M).
const FLUX_CALCIUM_FLOOR: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresynapticCalciumParameters {
    // Geometry and environment
    pub temperature_k: f64,
    pub bouton_area_m2: f64,
    pub bouton_volume_m3: f64,
    pub extracellular_calcium_m: f64,
    pub resting_calcium_m: f64,

    // VGCC
    pub channel_density_per_m2: f64,
    pub channel_conductance_s: f64,
    pub activation_half_v: f64,
    pub activation_slope_v: f64,
    pub activation_tau_s: f64,

    // PMCA and plasma-membrane leak
    pub pmca_max_a_per_m2: f64,
    pub pmca_affinity_m: f64,
    pub leak_rate_per_s: f64,

    // ER / IP3R
    pub er_volume_ratio: f64,
    pub ip3r_max_rate_per_s: f64,
    pub er_leak_rate_per_s: f64,
    pub serca_max_m_per_s: f64,
    pub serca_affinity_m: f64,
    pub d1_m: f64,
    pub d2_m: f64,
    pub d3_m: f64,
    pub d5_m: f64,
    pub a2_per_m_s: f64,

    // IP3 production / relaxation
    pub ip3_production_m_per_s: f64,
    pub ip3_glutamate_affinity_m: f64,
    pub ip3_relaxation_rate_per_s: f64,
    pub resting_ip3_m: f64,

    // Initial state
    pub initial_er_calcium_m: f64,
    pub initial_ip3r_gate: f64,
}

impl Default for PresynapticCalciumParameters {
    fn default() -> Self {
        Self {
            temperature_k: 293.15,
            bouton_area_m2: 1.24e-12,
            bouton_volume_m3: 0.13e-18,
            extracellular_calcium_m: 2e-3,
            resting_calcium_m: 0.1e-6,

            channel_density_per_m2: 3.2e12,
            channel_conductance_s: 2.3e-12,
            activation_half_v: -0.017,
            activation_slope_v: 0.0084,
            activation_tau_s: 0.010,

            pmca_max_a_per_m2: 0.004,
            pmca_affinity_m: 0.1e-6,
            leak_rate_per_s: 2.66e-3,

            er_volume_ratio: 0.185,
            ip3r_max_rate_per_s: 30.0,
            er_leak_rate_per_s: 0.2374,
            serca_max_m_per_s: 90e-6,
            serca_affinity_m: 0.1e-6,
            d1_m: 0.13e-6,
            d2_m: 1.049e-6,
            d3_m: 0.9434e-6,
            d5_m: 0.08234e-6,
            a2_per_m_s: 0.2e6,

            ip3_production_m_per_s: 0.062e-6,
            ip3_glutamate_affinity_m: 0.78e-6,
            ip3_relaxation_rate_per_s: 0.14,
            resting_ip3_m: 0.16e-6,

            initial_er_calcium_m: 400e-6,
            initial_ip3r_gate: 0.5,
        }
    }
}

impl ModelParameters for PresynapticCalciumParameters {
    fn validate(&self) -> ModelResult<()> {
        let check = ParameterCheck::new(PresynapticCalcium::NAME);
        check.positive("temperature_k", self.temperature_k)?;
        check.positive("bouton_area_m2", self.bouton_area_m2)?;
        check.positive("bouton_volume_m3", self.bouton_volume_m3)?;
        check.positive("extracellular_calcium_m", self.extracellular_calcium_m)?;
        check.positive("resting_calcium_m", self.resting_calcium_m)?;
        check.non_negative("channel_density_per_m2", self.channel_density_per_m2)?;
        check.non_negative("channel_conductance_s", self.channel_conductance_s)?;
        check.finite("activation_half_v", self.activation_half_v)?;
        check.positive("activation_slope_v", self.activation_slope_v)?;
        check.positive("activation_tau_s", self.activation_tau_s)?;
        check.non_negative("pmca_max_a_per_m2", self.pmca_max_a_per_m2)?;
        check.positive("pmca_affinity_m", self.pmca_affinity_m)?;
        check.non_negative("leak_rate_per_s", self.leak_rate_per_s)?;
        check.positive("er_volume_ratio", self.er_volume_ratio)?;
        check.non_negative("ip3r_max_rate_per_s", self.ip3r_max_rate_per_s)?;
        check.non_negative("er_leak_rate_per_s", self.er_leak_rate_per_s)?;
        check.non_negative("serca_max_m_per_s", self.serca_max_m_per_s)?;
        check.positive("serca_affinity_m", self.serca_affinity_m)?;
        check.positive("d1_m", self.d1_m)?;
        check.positive("d2_m", self.d2_m)?;
        check.positive("d3_m", self.d3_m)?;
        check.positive("d5_m", self.d5_m)?;
        check.non_negative("a2_per_m_s", self.a2_per_m_s)?;
        check.non_negative("ip3_production_m_per_s", self.ip3_production_m_per_s)?;
        check.positive("ip3_glutamate_affinity_m", self.ip3_glutamate_affinity_m)?;
        check.non_negative("ip3_relaxation_rate_per_s", self.ip3_relaxation_rate_per_s)?;
        check.non_negative("resting_ip3_m", self.resting_ip3_m)?;
        check.positive("initial_er_calcium_m", self.initial_er_calcium_m)?;
        check.probability("initial_ip3r_gate", self.initial_ip3r_gate)?;
        Ok(())
    }
}

/// Six integrated variables of the bouton.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresynapticCalciumState {
    pub fast_calcium: Concentration,
    pub slow_calcium: Concentration,
    pub er_calcium: Concentration,
    pub ip3: Concentration,
    /// VGCC activation
    pub vgcc_gate: f64,
    /// IP3R inactivation recovery
    pub ip3r_gate: f64,
}

impl PresynapticCalciumState {
    pub fn total_cytosolic(&self) -> Concentration {
        self.fast_calcium + self.slow_calcium
    }
}

#[derive(Debug, Clone)]
pub struct PresynapticCalcium {
    params: PresynapticCalciumParameters,
    state: PresynapticCalciumState,
    /// E_Ca (V), fixed by the resting and extracellular concentrations.
    calcium_reversal_v: f64,
    /// 1 / (z F Vol) in M/C
    charge_to_concentration: f64,
}

impl PresynapticCalcium {
    pub const NAME: &'static str = "PresynapticCalcium";

    pub fn new(params: PresynapticCalciumParameters) -> ModelResult<Self> {
        params.validate()?;
        let calcium_reversal_v = nernst_potential(
            params.extracellular_calcium_m,
            params.resting_calcium_m,
            CALCIUM_VALENCE,
            params.temperature_k,
        );
        let volume_litres = params.bouton_volume_m3 * LITRES_PER_CUBIC_METRE;
        Ok(Self {
            state: Self::initial_state(&params),
            calcium_reversal_v,
            charge_to_concentration: 1.0 / (CALCIUM_VALENCE * FARADAY * volume_litres),
            params,
        })
    }

    fn initial_state(params: &PresynapticCalciumParameters) -> PresynapticCalciumState {
        PresynapticCalciumState {
            fast_calcium: Concentration::ZERO,
            slow_calcium: Concentration::from_molar(params.resting_calcium_m),
            er_calcium: Concentration::from_molar(params.initial_er_calcium_m),
            ip3: Concentration::from_molar(params.resting_ip3_m),
            vgcc_gate: 0.0,
            ip3r_gate: params.initial_ip3r_gate,
        }
    }

    pub fn state(&self) -> &PresynapticCalciumState {
        &self.state
    }

    pub fn calcium_reversal(&self) -> Voltage {
        Voltage::from_volts(self.calcium_reversal_v)
    }

    pub fn total_calcium(&self) -> Concentration {
        self.state.total_cytosolic()
    }

    /// Advance all six variables by one Euler step and return total cytosolic calcium.
    ///
    /// `glutamate` is the extrasynaptic glutamate reaching the bouton's
    /// metabotropic receptors (drives IP3 production).
    pub fn advance(&mut self, dt: Time, voltage: Voltage, glutamate: Concentration) -> Concentration {
        let p = &self.params;
        let dt = dt.seconds();
        let v = voltage.volts();
        let s = self.state;

        let c = s.total_cytosolic().molar().max(FLUX_CALCIUM_FLOOR);
        let c_er = s.er_calcium.molar();
        let ip3 = s.ip3.molar();

        // Fast pool
        let m_inf = 1.0 / (1.0 + ((p.activation_half_v - v) / p.activation_slope_v).exp());
        let d_vgcc = (m_inf - s.vgcc_gate) / p.activation_tau_s;
        let i_ca = p.channel_density_per_m2
            * s.vgcc_gate.powi(2)
            * p.channel_conductance_s
            * (v - self.calcium_reversal_v)
            * p.bouton_area_m2;
        let i_pmca = p.pmca_max_a_per_m2 * hill(c, p.pmca_affinity_m, 2.0) * p.bouton_area_m2;
        let j_leak = p.leak_rate_per_s * (p.extracellular_calcium_m - c);
        let d_fast = -(i_ca + i_pmca) * self.charge_to_concentration + j_leak;

        // Slow pool
        let m_ip3 = ip3 / (ip3 + p.d1_m);
        let n_ca = c / (c + p.d5_m);
        let j_ip3r = p.er_volume_ratio
            * p.ip3r_max_rate_per_s
            * m_ip3.powi(3)
            * n_ca.powi(3)
            * s.ip3r_gate.powi(3)
            * (c_er - c);
        let j_serca = p.serca_max_m_per_s * hill(c, p.serca_affinity_m, 2.0);
        let j_er_leak = p.er_volume_ratio * p.er_leak_rate_per_s * (c_er - c);
        let d_slow = j_ip3r + j_er_leak - j_serca;
        let d_er = -d_slow / p.er_volume_ratio;

        let q_alpha = p.a2_per_m_s * p.d2_m * (ip3 + p.d1_m) / (ip3 + p.d3_m);
        let q_beta = p.a2_per_m_s * c;
        let d_gate = q_alpha * (1.0 - s.ip3r_gate) - q_beta * s.ip3r_gate;

        let production = p.ip3_production_m_per_s
            * hill(glutamate.molar(), p.ip3_glutamate_affinity_m, 0.7);
        let d_ip3 = production - p.ip3_relaxation_rate_per_s * (ip3 - p.resting_ip3_m);

        self.state = PresynapticCalciumState {
            fast_calcium: Concentration::from_molar((s.fast_calcium.molar() + dt * d_fast).max(0.0)),
            slow_calcium: Concentration::from_molar(
                (s.slow_calcium.molar() + dt * d_slow).max(CALCIUM_FLOOR),
            ),
            er_calcium: Concentration::from_molar((c_er + dt * d_er).max(CALCIUM_FLOOR)),
            ip3: Concentration::from_molar((ip3 + dt * d_ip3).max(0.0)),
            vgcc_gate: clamp_unit(s.vgcc_gate + dt * d_vgcc),
            ip3r_gate: clamp_unit(s.ip3r_gate + dt * d_gate),
        };

        trace!(
            target: "tripartite-synapse-models",
            "[PRE-CA] c={:.3e} fast={:.3e} slow={:.3e} er={:.3e} ip3={:.3e}",
            self.state.total_cytosolic().molar(),
            self.state.fast_calcium.molar(),
            self.state.slow_calcium.molar(),
            self.state.er_calcium.molar(),
            self.state.ip3.molar()
        );

        self.state.total_cytosolic()
    }
}

impl Compartment for PresynapticCalcium {
    type Parameters = PresynapticCalciumParameters;

    fn model_name(&self) -> &'static str {
        "Presynaptic VGCC/ER calcium"
    }

    fn parameters(&self) -> &PresynapticCalciumParameters {
        &self.params
    }

    fn reset(&mut self) {
        self.state = Self::initial_state(&self.params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> PresynapticCalcium {
        PresynapticCalcium::new(PresynapticCalciumParameters::default()).unwrap()
    }

    fn dt() -> Time {
        Time::from_millis(0.05)
    }

    #[test]
    fn test_reversal_potential_positive() {
        let e = model().calcium_reversal().volts();
        assert!(e > 0.1 && e < 0.15);
    }

    #[test]
    fn test_resting_calcium_stays_low_and_positive() {
        let mut ca = model();
        let rest = Voltage::from_millivolts(-70.0);
        for _ in 0..20_000 {
            let c = ca.advance(dt(), rest, Concentration::ZERO);
            assert!(c.molar() >= CALCIUM_FLOOR);
            assert!(c.molar() < 0.2e-6, "resting calcium rose to {}", c);
        }
    }

    #[test]
    fn test_depolarisation_raises_calcium() {
        let mut ca = model();
        let before = ca.total_calcium().molar();
        for _ in 0..400 {
            ca.advance(dt(), Voltage::from_millivolts(0.0), Concentration::ZERO);
        }
        assert!(ca.state().vgcc_gate > 0.5);
        assert!(ca.total_calcium().molar() > 10.0 * before);
    }

    #[test]
    fn test_glutamate_drives_ip3() {
        let mut ca = model();
        let rest = Voltage::from_millivolts(-70.0);
        for _ in 0..2000 {
            ca.advance(dt(), rest, Concentration::from_micromolar(5.0));
        }
        assert!(ca.state().ip3.molar() > PresynapticCalciumParameters::default().resting_ip3_m);
    }

    #[test]
    fn test_er_exchange_conserves_mass() {
        // With the plasma membrane silent, c_s + c1·c_ER changes only by flooring.
        let mut params = PresynapticCalciumParameters::default();
        params.channel_density_per_m2 = 0.0;
        params.pmca_max_a_per_m2 = 0.0;
        params.leak_rate_per_s = 0.0;
        let c1 = params.er_volume_ratio;
        let mut ca = PresynapticCalcium::new(params).unwrap();
        let total = |s: &PresynapticCalciumState| s.slow_calcium.molar() + c1 * s.er_calcium.molar();
        let before = total(ca.state());
        for _ in 0..1000 {
            ca.advance(dt(), Voltage::from_millivolts(-70.0), Concentration::ZERO);
        }
        let after = total(ca.state());
        assert!(((after - before) / before).abs() < 1e-9);
    }

    #[test]
    fn test_gates_bounded_under_large_voltage() {
        let mut ca = model();
        for i in 0..5000 {
            let v = if i % 2 == 0 { 0.05 } else { -0.1 };
            ca.advance(dt(), Voltage::from_volts(v), Concentration::from_micromolar(100.0));
            let s = ca.state();
            assert!((0.0..=1.0).contains(&s.vgcc_gate));
            assert!((0.0..=1.0).contains(&s.ip3r_gate));
            assert!(s.er_calcium.molar() >= CALCIUM_FLOOR);
            assert!(s.fast_calcium.molar() >= 0.0);
        }
    }
}
