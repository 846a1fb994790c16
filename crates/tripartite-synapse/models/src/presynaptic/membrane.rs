// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Presynaptic Hodgkin–Huxley Membrane
//!
//! Classic squid-axon kinetics with reversal potentials shifted to a
//! −70 mV resting cell. Equations use mV, ms, mS/cm² and µA/cm²; `dt`
//! is converted from [`Time`] on entry.
//!
//! ## Model Dynamics
//!
//! ```text
//! u = V − V_rest
//!
//! α_n = 0.01 (10 − u) / (exp((10 − u)/10) − 1)     β_n = 0.125 exp(−u/80)
//! α_m = 0.1  (25 − u) / (exp((25 − u)/10) − 1)     β_m = 4 exp(−u/18)
//! α_h = 0.07 exp(−u/20)                            β_h = 1 / (exp((30 − u)/10) + 1)
//!
//! dx/dt = α_x (1 − x) − β_x x                      x ∈ {m, h, n}
//!
//! I_Na = g_Na m³ h (V − E_Na)
//! I_K  = g_K n⁴ (V − E_K)
//! I_L  = g_L (V − E_L)
//!
//! C dV/dt = I_stim + I_inj − I_Na − I_K − I_L
//! ```
//!
//! The gates are advanced first and the ionic currents use the updated
//! gates. Gates are not clamped; for `dt` below [`STABLE_DT_MS`] the Euler
//! update is a convex combination of the old value and the steady state.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ModelResult, ParameterCheck};
use crate::kinetics::linear_exp_rate;
use crate::traits::{Compartment, ModelParameters};
use crate::units::{CurrentDensity, Time, Voltage};

/// Largest step (ms) for which the gating update stays bounded over the
/// physiological voltage range.
pub const STABLE_DT_MS: f64 = 0.05;

/// HH parameter table (mV, mS/cm², µF/cm²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HodgkinHuxleyParameters {
    pub capacitance_uf_per_cm2: f64,
    pub g_na_ms_per_cm2: f64,
    pub g_k_ms_per_cm2: f64,
    pub g_leak_ms_per_cm2: f64,
    pub e_na_mv: f64,
    pub e_k_mv: f64,
    pub e_leak_mv: f64,
    /// Potential the gating rate functions are referenced to
    pub resting_potential_mv: f64,
    pub initial_voltage_mv: f64,
    pub initial_m: f64,
    pub initial_h: f64,
    pub initial_n: f64,
}

impl HodgkinHuxleyParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conductances with the remaining values at their defaults.
    pub fn with_conductances(g_na: f64, g_k: f64, g_leak: f64) -> Self {
        Self {
            g_na_ms_per_cm2: g_na,
            g_k_ms_per_cm2: g_k,
            g_leak_ms_per_cm2: g_leak,
            ..Self::default()
        }
    }
}

impl Default for HodgkinHuxleyParameters {
    fn default() -> Self {
        Self {
            capacitance_uf_per_cm2: 1.0,
            g_na_ms_per_cm2: 120.0,
            g_k_ms_per_cm2: 36.0,
            g_leak_ms_per_cm2: 0.3,
            e_na_mv: 45.0,
            e_k_mv: -82.0,
            e_leak_mv: -59.4,
            resting_potential_mv: -70.0,
            initial_voltage_mv: -70.0,
            // steady state at −70 mV
            initial_m: 0.05,
            initial_h: 0.6,
            initial_n: 0.32,
        }
    }
}

impl ModelParameters for HodgkinHuxleyParameters {
    fn validate(&self) -> ModelResult<()> {
        let check = ParameterCheck::new(PresynapticMembrane::NAME);
        check.positive("capacitance_uf_per_cm2", self.capacitance_uf_per_cm2)?;
        check.non_negative("g_na_ms_per_cm2", self.g_na_ms_per_cm2)?;
        check.non_negative("g_k_ms_per_cm2", self.g_k_ms_per_cm2)?;
        check.non_negative("g_leak_ms_per_cm2", self.g_leak_ms_per_cm2)?;
        check.finite("e_na_mv", self.e_na_mv)?;
        check.finite("e_k_mv", self.e_k_mv)?;
        check.finite("e_leak_mv", self.e_leak_mv)?;
        check.finite("resting_potential_mv", self.resting_potential_mv)?;
        check.finite("initial_voltage_mv", self.initial_voltage_mv)?;
        check.probability("initial_m", self.initial_m)?;
        check.probability("initial_h", self.initial_h)?;
        check.probability("initial_n", self.initial_n)?;
        Ok(())
    }
}

/// Voltage plus the three gating variables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MembraneState {
    pub voltage: Voltage,
    /// Fast Na⁺ activation
    pub m: f64,
    /// Fast Na⁺ inactivation
    pub h: f64,
    /// Slow K⁺ activation
    pub n: f64,
}

/// Opening/closing rates (1/ms) at one voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateRates {
    pub alpha_m: f64,
    pub beta_m: f64,
    pub alpha_h: f64,
    pub beta_h: f64,
    pub alpha_n: f64,
    pub beta_n: f64,
}

impl GateRates {
    pub fn at(voltage_mv: f64, resting_mv: f64) -> Self {
        let u = voltage_mv - resting_mv;
        Self {
            alpha_m: linear_exp_rate(0.1, 25.0 - u, 10.0),
            beta_m: 4.0 * (-u / 18.0).exp(),
            alpha_h: 0.07 * (-u / 20.0).exp(),
            beta_h: 1.0 / (((30.0 - u) / 10.0).exp() + 1.0),
            alpha_n: linear_exp_rate(0.01, 10.0 - u, 10.0),
            beta_n: 0.125 * (-u / 80.0).exp(),
        }
    }

    pub fn m_infinity(&self) -> f64 {
        self.alpha_m / (self.alpha_m + self.beta_m)
    }

    pub fn h_infinity(&self) -> f64 {
        self.alpha_h / (self.alpha_h + self.beta_h)
    }

    pub fn n_infinity(&self) -> f64 {
        self.alpha_n / (self.alpha_n + self.beta_n)
    }
}

/// Spiking presynaptic compartment
#[derive(Debug, Clone)]
pub struct PresynapticMembrane {
    params: HodgkinHuxleyParameters,
    state: MembraneState,
}

impl PresynapticMembrane {
    pub const NAME: &'static str = "PresynapticMembrane";

    pub fn new(params: HodgkinHuxleyParameters) -> ModelResult<Self> {
        params.validate()?;
        Ok(Self {
            state: Self::initial_state(&params),
            params,
        })
    }

    fn initial_state(params: &HodgkinHuxleyParameters) -> MembraneState {
        MembraneState {
            voltage: Voltage::from_millivolts(params.initial_voltage_mv),
            m: params.initial_m,
            h: params.initial_h,
            n: params.initial_n,
        }
    }

    pub fn state(&self) -> &MembraneState {
        &self.state
    }

    pub fn voltage(&self) -> Voltage {
        self.state.voltage
    }

    /// Advance by one step.
    ///
    /// `dt` must not exceed [`STABLE_DT_MS`]; larger steps can overflow and
    /// are not detected here.
    pub fn advance(
        &mut self,
        dt: Time,
        stimulus: CurrentDensity,
        injected: CurrentDensity,
    ) -> Voltage {
        let p = &self.params;
        let dt_ms = dt.millis();
        let v = self.state.voltage.millivolts();
        let rates = GateRates::at(v, p.resting_potential_mv);

        let s = &mut self.state;
        s.m += dt_ms * (rates.alpha_m * (1.0 - s.m) - rates.beta_m * s.m);
        s.h += dt_ms * (rates.alpha_h * (1.0 - s.h) - rates.beta_h * s.h);
        s.n += dt_ms * (rates.alpha_n * (1.0 - s.n) - rates.beta_n * s.n);

        let i_na = p.g_na_ms_per_cm2 * s.m.powi(3) * s.h * (v - p.e_na_mv);
        let i_k = p.g_k_ms_per_cm2 * s.n.powi(4) * (v - p.e_k_mv);
        let i_leak = p.g_leak_ms_per_cm2 * (v - p.e_leak_mv);
        let i_ext = stimulus.microamps_per_cm2() + injected.microamps_per_cm2();

        let dv = (i_ext - i_na - i_k - i_leak) / p.capacitance_uf_per_cm2;
        s.voltage = Voltage::from_millivolts(v + dt_ms * dv);

        trace!(
            target: "tripartite-synapse-models",
            "[HH] V={:.3}mV m={:.4} h={:.4} n={:.4} I_ext={:.2}",
            s.voltage.millivolts(),
            s.m,
            s.h,
            s.n,
            i_ext
        );

        s.voltage
    }
}

impl Compartment for PresynapticMembrane {
    type Parameters = HodgkinHuxleyParameters;

    fn model_name(&self) -> &'static str {
        "Hodgkin-Huxley presynaptic membrane"
    }

    fn parameters(&self) -> &HodgkinHuxleyParameters {
        &self.params
    }

    fn reset(&mut self) {
        self.state = Self::initial_state(&self.params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt() -> Time {
        Time::from_millis(0.05)
    }

    fn run_constant(amplitude: f64, steps: usize) -> usize {
        let mut membrane = PresynapticMembrane::new(HodgkinHuxleyParameters::default()).unwrap();
        let mut previous = membrane.voltage().millivolts();
        let mut crossings = 0;
        for _ in 0..steps {
            let v = membrane
                .advance(
                    dt(),
                    CurrentDensity::from_microamps_per_cm2(amplitude),
                    CurrentDensity::ZERO,
                )
                .millivolts();
            if previous < 0.0 && v >= 0.0 {
                crossings += 1;
            }
            previous = v;
        }
        crossings
    }

    #[test]
    fn test_initial_gates_are_resting_steady_state() {
        let params = HodgkinHuxleyParameters::default();
        let rates = GateRates::at(params.resting_potential_mv, params.resting_potential_mv);
        assert!((rates.m_infinity() - params.initial_m).abs() < 0.01);
        assert!((rates.h_infinity() - params.initial_h).abs() < 0.01);
        assert!((rates.n_infinity() - params.initial_n).abs() < 0.01);
    }

    #[test]
    fn test_rate_singularities_are_finite() {
        // u = 25 and u = 10 are the removable singular points
        let at_m = GateRates::at(-45.0, -70.0);
        let at_n = GateRates::at(-60.0, -70.0);
        assert!((at_m.alpha_m - 1.0).abs() < 1e-9);
        assert!((at_n.alpha_n - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_rest_without_input() {
        let mut membrane = PresynapticMembrane::new(HodgkinHuxleyParameters::default()).unwrap();
        for _ in 0..1000 {
            let v = membrane
                .advance(dt(), CurrentDensity::ZERO, CurrentDensity::ZERO)
                .millivolts();
            assert!((-71.0..=-69.0).contains(&v), "V drifted to {}", v);
        }
    }

    #[test]
    fn test_suprathreshold_current_spikes() {
        // 35 µA/cm² for 1 s fires at roughly 100 Hz
        let spikes = run_constant(35.0, 20_000);
        assert!(spikes > 80 && spikes < 130, "spikes = {}", spikes);
    }

    #[test]
    fn test_subthreshold_current_is_silent() {
        assert_eq!(run_constant(2.0, 20_000), 0);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut membrane = PresynapticMembrane::new(HodgkinHuxleyParameters::default()).unwrap();
        for _ in 0..200 {
            membrane.advance(
                dt(),
                CurrentDensity::from_microamps_per_cm2(20.0),
                CurrentDensity::ZERO,
            );
        }
        membrane.reset();
        assert_eq!(membrane.voltage(), Voltage::from_millivolts(-70.0));
        assert_eq!(membrane.state().m, 0.05);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut params = HodgkinHuxleyParameters::default();
        params.capacitance_uf_per_cm2 = 0.0;
        assert!(PresynapticMembrane::new(params).is_err());

        let mut params = HodgkinHuxleyParameters::default();
        params.initial_h = 1.5;
        assert!(PresynapticMembrane::new(params).is_err());
    }
}
