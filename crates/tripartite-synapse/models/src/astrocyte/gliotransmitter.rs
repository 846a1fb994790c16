// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gliotransmitter Release
//!
//! Calcium-dependent exocytosis of glutamate from the astrocyte, in SI units.
//!
//! ```text
//! dO_j/dt = k⁺_j c − (k⁺_j c + k⁻_j) O_j          j = 1, 2, 3
//! f       = O1 O2 O3                               release probability
//! Θ       = [c > c_θ]                              release machinery active
//! dR/dt   = I/τ_rec − Θ f R     dE/dt = −E/τ_inact + Θ f R
//! dG/dt   = n_v g_v E − g_c G
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ModelResult, ParameterCheck};
use crate::kinetics::{clamp_unit, VesiclePool};
use crate::traits::{Compartment, ModelParameters};
use crate::units::{Concentration, Time};

pub const RELEASE_GATES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GliotransmitterParameters {
    /// Calcium-binding rates per gate (1/(M·s))
    pub gate_on_per_m_s: [f64; RELEASE_GATES],
    /// Unbinding rates per gate (1/s)
    pub gate_off_per_s: [f64; RELEASE_GATES],
    pub calcium_threshold_m: f64,
    pub tau_recovery_s: f64,
    pub tau_inactivation_s: f64,
    pub vesicles_per_site: f64,
    /// Glutamate per vesicle, as extracellular concentration (M)
    pub vesicle_glutamate_m: f64,
    pub clearance_per_s: f64,
}

impl Default for GliotransmitterParameters {
    fn default() -> Self {
        Self {
            gate_on_per_m_s: [3.75e6, 2.5e6, 1.25e7],
            gate_off_per_s: [0.4, 1.0, 1.0],
            calcium_threshold_m: 196.69e-9,
            tau_recovery_s: 0.8,
            tau_inactivation_s: 0.003,
            vesicles_per_site: 12.0,
            vesicle_glutamate_m: 0.02,
            clearance_per_s: 1e4,
        }
    }
}

impl ModelParameters for GliotransmitterParameters {
    fn validate(&self) -> ModelResult<()> {
        let check = ParameterCheck::new(GliotransmitterRelease::NAME);
        for k in self.gate_on_per_m_s {
            check.non_negative("gate_on_per_m_s", k)?;
        }
        for k in self.gate_off_per_s {
            check.non_negative("gate_off_per_s", k)?;
        }
        check.non_negative("calcium_threshold_m", self.calcium_threshold_m)?;
        check.positive("tau_recovery_s", self.tau_recovery_s)?;
        check.positive("tau_inactivation_s", self.tau_inactivation_s)?;
        check.non_negative("vesicles_per_site", self.vesicles_per_site)?;
        check.non_negative("vesicle_glutamate_m", self.vesicle_glutamate_m)?;
        check.positive("clearance_per_s", self.clearance_per_s)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GliotransmitterState {
    pub gates: [f64; RELEASE_GATES],
    pub vesicles: VesiclePool,
    pub extracellular_glutamate: Concentration,
}

impl GliotransmitterState {
    fn resting() -> Self {
        Self {
            gates: [0.0; RELEASE_GATES],
            vesicles: VesiclePool::full(),
            extracellular_glutamate: Concentration::ZERO,
        }
    }

    /// Product of the three gate openings.
    pub fn release_probability(&self) -> f64 {
        self.gates.iter().product()
    }
}

#[derive(Debug, Clone)]
pub struct GliotransmitterRelease {
    params: GliotransmitterParameters,
    state: GliotransmitterState,
}

impl GliotransmitterRelease {
    pub const NAME: &'static str = "GliotransmitterRelease";

    pub fn new(params: GliotransmitterParameters) -> ModelResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            state: GliotransmitterState::resting(),
        })
    }

    pub fn state(&self) -> &GliotransmitterState {
        &self.state
    }

    /// Advance one step and return extracellular glutamate.
    pub fn step(&mut self, dt: Time, astrocyte_calcium: Concentration) -> Concentration {
        let p = &self.params;
        let dt = dt.seconds();
        let c = astrocyte_calcium.molar().max(0.0);

        for (gate, (&k_on, &k_off)) in self
            .state
            .gates
            .iter_mut()
            .zip(p.gate_on_per_m_s.iter().zip(p.gate_off_per_s.iter()))
        {
            let d = k_on * c - (k_on * c + k_off) * *gate;
            *gate = clamp_unit(*gate + dt * d);
        }

        let above_threshold = c > p.calcium_threshold_m;
        let release_rate = if above_threshold {
            self.state.release_probability()
        } else {
            0.0
        };
        let effective = self.state.vesicles.effective();
        self.state
            .vesicles
            .advance(dt, release_rate, p.tau_recovery_s, p.tau_inactivation_s);

        let g = self.state.extracellular_glutamate.molar();
        let d_g = p.vesicles_per_site * p.vesicle_glutamate_m * effective - p.clearance_per_s * g;
        self.state.extracellular_glutamate = Concentration::from_molar((g + dt * d_g).max(0.0));

        trace!(
            target: "tripartite-synapse-models",
            "[GLIO] f={:.4e} active={} G={:.3e}",
            release_rate,
            above_threshold,
            self.state.extracellular_glutamate.molar()
        );

        self.state.extracellular_glutamate
    }
}

impl Compartment for GliotransmitterRelease {
    type Parameters = GliotransmitterParameters;

    fn model_name(&self) -> &'static str {
        "Astrocytic gliotransmitter release"
    }

    fn parameters(&self) -> &GliotransmitterParameters {
        &self.params
    }

    fn reset(&mut self) {
        self.state = GliotransmitterState::resting();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> GliotransmitterRelease {
        GliotransmitterRelease::new(GliotransmitterParameters::default()).unwrap()
    }

    fn dt() -> Time {
        Time::from_millis(0.05)
    }

    #[test]
    fn test_subthreshold_calcium_releases_nothing() {
        let mut glio = model();
        for _ in 0..20_000 {
            let g = glio.step(dt(), Concentration::from_nanomolar(100.0));
            assert_eq!(g, Concentration::ZERO);
        }
        // Gates still open towards their calcium-dependent steady state
        assert!(glio.state().release_probability() > 0.0);
        assert_eq!(glio.state().vesicles.releasable(), 1.0);
    }

    #[test]
    fn test_suprathreshold_calcium_releases() {
        let mut glio = model();
        let mut peak: f64 = 0.0;
        for _ in 0..20_000 {
            let g = glio.step(dt(), Concentration::from_nanomolar(500.0));
            peak = peak.max(g.molar());
        }
        assert!(peak > 0.0);
        assert!(glio.state().vesicles.releasable() < 1.0);
    }

    #[test]
    fn test_gate_steady_state() {
        let mut glio = model();
        let c = 1e-6;
        for _ in 0..200_000 {
            glio.step(dt(), Concentration::from_molar(c));
        }
        let p = GliotransmitterParameters::default();
        for j in 0..RELEASE_GATES {
            let expected = p.gate_on_per_m_s[j] * c / (p.gate_on_per_m_s[j] * c + p.gate_off_per_s[j]);
            assert!((glio.state().gates[j] - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_vesicle_fractions_sum_to_one() {
        let mut glio = model();
        for i in 0..40_000 {
            let c = if i % 4000 < 2000 { 2e-6 } else { 50e-9 };
            glio.step(dt(), Concentration::from_molar(c));
            let v = glio.state().vesicles;
            assert!((v.releasable() + v.effective() + v.inactive() - 1.0).abs() < 1e-12);
            assert!(glio.state().gates.iter().all(|g| (0.0..=1.0).contains(g)));
        }
    }
}
