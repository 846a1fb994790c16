// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # CaMKII Bistable Switch
//!
//! Eleven-state phosphorylation chain of a CaMKII holoenzyme with a
//! PP1 / inhibitor-1 regulatory loop (Zhabotinsky-type), in SI units.
//!
//! ## Chain
//!
//! ```text
//! H      = c³ / (k_h³ + c³)
//! v_init = 10 K1 H² P0                   first (intersubunit) phosphorylation
//! v_a    = K1 H                          autophosphorylation
//! v_d    = K2 PP1 / (K_M + e_k Σ i·P_i)  dephosphorylation per site
//!
//! dP0/dt  = −v_init + v_d P1
//! dP1/dt  =  v_init − v_d P1 − v_a w1 P1 + 2 v_d P2
//! dPi/dt  =  v_a w(i−1) P(i−1) − v_a wi Pi − i v_d Pi + (i+1) v_d P(i+1)     2 ≤ i ≤ 9
//! dP10/dt =  v_a w9 P9 − 10 v_d P10
//! ```
//!
//! `w` are the per-transition cooperativity weights. Every term leaving one
//! state enters a neighbour, so `Σ P_i` is conserved by the scheme; after
//! clamping negatives the chain is renormalised to exactly 1.
//!
//! ## Regulatory loop
//!
//! ```text
//! dPP1/dt = −k_F I1 PP1 + k_B (PP1₀ − PP1) + k_I I1₀
//! dI1/dt  = −k_F I1 PP1 + k_B (PP1₀ − PP1) + v_PKA I1₀/(I1₀ + K_PKA) − v_CaN I1 c³/(k_h2³ + c³)
//! ```
//!
//! ## Readout
//!
//! ```text
//! alpha_mod = k_syt / (1 + exp(−(e_k Σ_{i≥1} P_i − P_half) / k_half))
//! ```
//!
//! There is no latch: the signal rises while calcium drives phosphorylation
//! and decays back through dephosphorylation once it stops.

use serde::{Deserialize, Serialize};
use tracing::trace;
use tripartite_synapse_models::kinetics::hill;
use tripartite_synapse_models::{
    Compartment, Concentration, ModelParameters, ModelResult, ParameterCheck, Time,
};

use crate::retrograde::RetrogradeSignal;

/// Phosphorylation levels P0..P10.
pub const CHAIN_STATES: usize = 11;

/// Cooperativity weight of the transition out of each level.
pub const COOPERATIVITY: [f64; CHAIN_STATES] =
    [1.0, 1.0, 1.8, 2.3, 2.7, 2.8, 2.7, 2.3, 1.8, 1.0, 1.0];

/// Bound on the sigmoid exponent so the readout never overflows.
const SIGMOID_EXPONENT_LIMIT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaMKIIParameters {
    // Phosphorylation
    pub autophosphorylation_rate_per_s: f64,
    pub calcium_half_activation_m: f64,
    pub hill_coefficient: f64,
    pub dephosphorylation_rate_per_s: f64,
    pub michaelis_constant_m: f64,
    pub total_camkii_m: f64,

    // PP1 / I1 loop
    pub pp1_total_m: f64,
    pub inhibitor_basal_m: f64,
    pub inhibitor_total_m: f64,
    pub binding_rate_per_m_s: f64,
    pub dissociation_rate_per_s: f64,
    pub pp1_release_rate_per_s: f64,
    pub pka_max_m_per_s: f64,
    pub pka_affinity_m: f64,
    pub calcineurin_rate_per_s: f64,
    pub calcineurin_half_activation_m: f64,

    // Retrograde readout
    pub signal_half_activation_m: f64,
    pub signal_slope_m: f64,
    pub max_alpha_modulation: f64,
}

impl CaMKIIParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinetic constants with the remaining values at their defaults.
    pub fn with_kinetics(
        autophosphorylation_rate_per_s: f64,
        calcium_half_activation_m: f64,
        dephosphorylation_rate_per_s: f64,
    ) -> Self {
        Self {
            autophosphorylation_rate_per_s,
            calcium_half_activation_m,
            dephosphorylation_rate_per_s,
            ..Self::default()
        }
    }
}

/// Kinetics: K1 = 0.5/s, k_h = 4 µM, K2 = 10/s. The slower set
/// (0.005/s, 150 µM, 50/s) leaves the switch off for any physiological
/// spine calcium. With these values the
/// readout saturates from about 3 µM sustained calcium, so driven runs tend
/// to end at `max_alpha_modulation`.
impl Default for CaMKIIParameters {
    fn default() -> Self {
        Self {
            autophosphorylation_rate_per_s: 0.5,
            calcium_half_activation_m: 4e-6,
            hill_coefficient: 3.0,
            dephosphorylation_rate_per_s: 10.0,
            michaelis_constant_m: 20e-6,
            total_camkii_m: 80e-6,

            pp1_total_m: 0.1e-6,
            inhibitor_basal_m: 0.1e-6,
            inhibitor_total_m: 1e-6,
            binding_rate_per_m_s: 1e6,
            dissociation_rate_per_s: 1e-3,
            pp1_release_rate_per_s: 1.0,
            pka_max_m_per_s: 0.45e-6,
            pka_affinity_m: 0.0059e-6,
            calcineurin_rate_per_s: 2.0,
            calcineurin_half_activation_m: 0.7e-6,

            signal_half_activation_m: 25e-6,
            signal_slope_m: 0.4e-6,
            max_alpha_modulation: 0.005,
        }
    }
}

impl ModelParameters for CaMKIIParameters {
    fn validate(&self) -> ModelResult<()> {
        let check = ParameterCheck::new(CaMKIISwitch::NAME);
        check.non_negative("autophosphorylation_rate_per_s", self.autophosphorylation_rate_per_s)?;
        check.positive("calcium_half_activation_m", self.calcium_half_activation_m)?;
        check.positive("hill_coefficient", self.hill_coefficient)?;
        check.non_negative("dephosphorylation_rate_per_s", self.dephosphorylation_rate_per_s)?;
        check.positive("michaelis_constant_m", self.michaelis_constant_m)?;
        check.positive("total_camkii_m", self.total_camkii_m)?;
        check.positive("pp1_total_m", self.pp1_total_m)?;
        check.non_negative("inhibitor_basal_m", self.inhibitor_basal_m)?;
        check.positive("inhibitor_total_m", self.inhibitor_total_m)?;
        check.non_negative("binding_rate_per_m_s", self.binding_rate_per_m_s)?;
        check.non_negative("dissociation_rate_per_s", self.dissociation_rate_per_s)?;
        check.non_negative("pp1_release_rate_per_s", self.pp1_release_rate_per_s)?;
        check.non_negative("pka_max_m_per_s", self.pka_max_m_per_s)?;
        check.non_negative("pka_affinity_m", self.pka_affinity_m)?;
        check.non_negative("calcineurin_rate_per_s", self.calcineurin_rate_per_s)?;
        check.positive("calcineurin_half_activation_m", self.calcineurin_half_activation_m)?;
        check.finite("signal_half_activation_m", self.signal_half_activation_m)?;
        check.positive("signal_slope_m", self.signal_slope_m)?;
        check.non_negative("max_alpha_modulation", self.max_alpha_modulation)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaMKIIState {
    /// Fraction of holoenzymes at each phosphorylation level
    pub chain: [f64; CHAIN_STATES],
    pub active_pp1: Concentration,
    pub free_inhibitor: Concentration,
}

impl CaMKIIState {
    fn resting(params: &CaMKIIParameters) -> Self {
        let mut chain = [0.0; CHAIN_STATES];
        chain[0] = 1.0;
        Self {
            chain,
            active_pp1: Concentration::from_molar(params.pp1_total_m),
            free_inhibitor: Concentration::ZERO,
        }
    }

    /// Fraction of holoenzymes with at least one phosphorylated subunit.
    pub fn phosphorylated_fraction(&self) -> f64 {
        self.chain[1..].iter().sum()
    }

    /// `Σ i·P_i`: mean phosphorylated subunits per holoenzyme.
    pub fn weighted_phosphorylation(&self) -> f64 {
        self.chain
            .iter()
            .enumerate()
            .map(|(i, p)| i as f64 * p)
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct CaMKIISwitch {
    params: CaMKIIParameters,
    state: CaMKIIState,
}

impl CaMKIISwitch {
    pub const NAME: &'static str = "CaMKIISwitch";

    pub fn new(params: CaMKIIParameters) -> ModelResult<Self> {
        params.validate()?;
        Ok(Self {
            state: CaMKIIState::resting(&params),
            params,
        })
    }

    pub fn state(&self) -> &CaMKIIState {
        &self.state
    }

    /// Phosphorylated CaMKII as an absolute concentration.
    pub fn phosphorylated_concentration(&self) -> Concentration {
        Concentration::from_molar(self.state.phosphorylated_fraction() * self.params.total_camkii_m)
    }

    /// Advance the chain and the regulatory loop by one Euler step.
    pub fn step(&mut self, dt: Time, calcium: Concentration) {
        let p = &self.params;
        let dt = dt.seconds();
        let c = calcium.molar().max(0.0);
        let chain = self.state.chain;
        let pp1 = self.state.active_pp1.molar();
        let inhibitor = self.state.free_inhibitor.molar();

        let drive = hill(c, p.calcium_half_activation_m, p.hill_coefficient);
        let v_init = 10.0 * p.autophosphorylation_rate_per_s * drive * drive * chain[0];
        let v_auto = p.autophosphorylation_rate_per_s * drive;
        let load = self.state.weighted_phosphorylation() * p.total_camkii_m;
        let v_dephos = p.dephosphorylation_rate_per_s * pp1 / (p.michaelis_constant_m + load);

        let last = CHAIN_STATES - 1;
        let mut d = [0.0; CHAIN_STATES];
        d[0] = -v_init + v_dephos * chain[1];
        d[1] = v_init - v_dephos * chain[1] - v_auto * COOPERATIVITY[1] * chain[1]
            + 2.0 * v_dephos * chain[2];
        for i in 2..last {
            d[i] = v_auto * COOPERATIVITY[i - 1] * chain[i - 1]
                - v_auto * COOPERATIVITY[i] * chain[i]
                - v_dephos * i as f64 * chain[i]
                + v_dephos * (i + 1) as f64 * chain[i + 1];
        }
        d[last] = v_auto * COOPERATIVITY[last - 1] * chain[last - 1]
            - v_dephos * last as f64 * chain[last];

        let association = p.binding_rate_per_m_s * inhibitor * pp1;
        let dissociation = p.dissociation_rate_per_s * (p.pp1_total_m - pp1);
        let d_pp1 = -association + dissociation + p.pp1_release_rate_per_s * p.inhibitor_basal_m;
        let pka = p.pka_max_m_per_s * p.inhibitor_basal_m / (p.inhibitor_basal_m + p.pka_affinity_m);
        let calcineurin = p.calcineurin_rate_per_s
            * inhibitor
            * hill(c, p.calcineurin_half_activation_m, 3.0);
        let d_inhibitor = -association + dissociation + pka - calcineurin;

        let mut next = [0.0; CHAIN_STATES];
        for (x, (p_i, d_i)) in next.iter_mut().zip(chain.iter().zip(d.iter())) {
            *x = (p_i + dt * d_i).max(0.0);
        }
        let total: f64 = next.iter().sum();
        if total > 0.0 {
            next.iter_mut().for_each(|x| *x /= total);
        } else {
            next = CaMKIIState::resting(p).chain;
        }

        self.state = CaMKIIState {
            chain: next,
            active_pp1: Concentration::from_molar((pp1 + dt * d_pp1).clamp(0.0, p.pp1_total_m)),
            free_inhibitor: Concentration::from_molar(
                (inhibitor + dt * d_inhibitor).clamp(0.0, p.inhibitor_total_m),
            ),
        };

        trace!(
            target: "tripartite-synapse-plasticity",
            "[CAMKII] phos={:.4} PP1={:.3e} I1={:.3e} c={:.3e}",
            self.state.phosphorylated_fraction(),
            self.state.active_pp1.molar(),
            self.state.free_inhibitor.molar(),
            c
        );
    }

    /// Sigmoid readout of total phosphorylated CaMKII.
    pub fn get_retrograde_signal(&self) -> RetrogradeSignal {
        let p = &self.params;
        let phosphorylated = self.phosphorylated_concentration().molar();
        let exponent = (-(phosphorylated - p.signal_half_activation_m) / p.signal_slope_m)
            .clamp(-SIGMOID_EXPONENT_LIMIT, SIGMOID_EXPONENT_LIMIT);
        RetrogradeSignal::new(p.max_alpha_modulation / (1.0 + exponent.exp()))
    }
}

impl Compartment for CaMKIISwitch {
    type Parameters = CaMKIIParameters;

    fn model_name(&self) -> &'static str {
        "CaMKII phosphorylation switch"
    }

    fn parameters(&self) -> &CaMKIIParameters {
        &self.params
    }

    fn reset(&mut self) {
        self.state = CaMKIIState::resting(&self.params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch() -> CaMKIISwitch {
        CaMKIISwitch::new(CaMKIIParameters::default()).unwrap()
    }

    #[test]
    fn test_resting_signal_is_baseline() {
        let camkii = switch();
        assert!(camkii.get_retrograde_signal().alpha_modulation() < 1e-20);
        assert_eq!(camkii.state().phosphorylated_fraction(), 0.0);
    }

    #[test]
    fn test_slow_kinetics_never_switch_on() {
        let mut camkii =
            CaMKIISwitch::new(CaMKIIParameters::with_kinetics(0.005, 150e-6, 50.0)).unwrap();
        let dt = Time::from_seconds(1e-4);
        for _ in 0..50_000 {
            camkii.step(dt, Concentration::from_micromolar(10.0));
        }
        assert!(camkii.state().phosphorylated_fraction() < 1e-3);
        assert!(camkii.get_retrograde_signal().alpha_modulation() < 1e-6);

        let mut fast = switch();
        for _ in 0..50_000 {
            fast.step(dt, Concentration::from_micromolar(10.0));
        }
        assert!(fast.get_retrograde_signal().alpha_modulation() > 0.99 * 0.005);
    }

    #[test]
    fn test_resting_calcium_keeps_chain_dephosphorylated() {
        let mut camkii = switch();
        let dt = Time::from_seconds(1e-4);
        for _ in 0..10_000 {
            camkii.step(dt, Concentration::from_nanomolar(100.0));
        }
        assert!(camkii.state().phosphorylated_fraction() < 1e-3);
        assert!(camkii.get_retrograde_signal().alpha_modulation() < 1e-6);
    }

    #[test]
    fn test_chain_sums_to_one() {
        let mut camkii = switch();
        let dt = Time::from_seconds(1e-4);
        for i in 0..20_000 {
            let c = if i % 5000 < 2500 { 10e-6 } else { 0.1e-6 };
            camkii.step(dt, Concentration::from_molar(c));
            let sum: f64 = camkii.state().chain.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
            assert!(camkii.state().chain.iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn test_regulatory_loop_bounded() {
        let p = CaMKIIParameters::default();
        let mut camkii = switch();
        let dt = Time::from_seconds(1e-4);
        for i in 0..20_000 {
            let c = if i % 2000 < 1000 { 50e-6 } else { 0.0 };
            camkii.step(dt, Concentration::from_molar(c));
            let s = camkii.state();
            assert!((0.0..=p.pp1_total_m).contains(&s.active_pp1.molar()));
            assert!((0.0..=p.inhibitor_total_m).contains(&s.free_inhibitor.molar()));
        }
    }

    #[test]
    fn test_signal_saturates_at_maximum() {
        let mut camkii = switch();
        // Force the chain fully phosphorylated.
        camkii.state.chain = [0.0; CHAIN_STATES];
        camkii.state.chain[CHAIN_STATES - 1] = 1.0;
        let signal = camkii.get_retrograde_signal().alpha_modulation();
        assert!((signal - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_signal_half_point() {
        let mut camkii = switch();
        // 25 µM of 80 µM phosphorylated
        let fraction = 25.0 / 80.0;
        camkii.state.chain = [0.0; CHAIN_STATES];
        camkii.state.chain[0] = 1.0 - fraction;
        camkii.state.chain[3] = fraction;
        let signal = camkii.get_retrograde_signal().alpha_modulation();
        assert!((signal - 0.0025).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut camkii = switch();
        for _ in 0..1000 {
            camkii.step(Time::from_seconds(1e-4), Concentration::from_micromolar(20.0));
        }
        assert!(camkii.state().phosphorylated_fraction() > 0.0);
        camkii.reset();
        assert_eq!(camkii.state().chain[0], 1.0);
    }
}
