// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Shared Kinetic Building Blocks
//!
//! Rate laws and bookkeeping reused by more than one compartment:
//!
//! - Hill functions `xⁿ / (xⁿ + Kⁿ)`
//! - the guarded `a·u / (exp(u/s) − 1)` rate that appears in HH gating
//! - Nernst reversal potential
//! - the releasable / effective / inactive vesicle cycle

use serde::{Deserialize, Serialize};

/// Faraday constant (C/mol)
pub const FARADAY: f64 = 96487.0;

/// Ideal gas constant (J/(mol·K))
pub const GAS_CONSTANT: f64 = 8.314;

/// Valence of Ca²⁺
pub const CALCIUM_VALENCE: f64 = 2.0;

/// Litres per cubic metre, for geometry volumes given in m³.
pub const LITRES_PER_CUBIC_METRE: f64 = 1000.0;

/// Distance from a removable singularity below which the analytic limit is used.
const SINGULARITY_EPSILON: f64 = 1e-7;

/// Hill function `xⁿ / (xⁿ + Kⁿ)` for `x ≥ 0`.
///
/// Negative inputs are treated as zero. Returns 0 when both terms vanish.
#[inline]
pub fn hill(x: f64, half_activation: f64, coefficient: f64) -> f64 {
    let xn = x.max(0.0).powf(coefficient);
    let kn = half_activation.powf(coefficient);
    let denominator = xn + kn;
    if denominator > 0.0 {
        xn / denominator
    } else {
        0.0
    }
}

/// Clamp to the probability interval.
#[inline]
pub fn clamp_unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// `coefficient · u / (exp(u / scale) − 1)`, with the limit `coefficient · scale` at `u → 0`.
#[inline]
pub fn linear_exp_rate(coefficient: f64, u: f64, scale: f64) -> f64 {
    if u.abs() < SINGULARITY_EPSILON {
        coefficient * scale
    } else {
        coefficient * u / ((u / scale).exp() - 1.0)
    }
}

/// Nernst reversal potential in volts.
pub fn nernst_potential(outside: f64, inside: f64, valence: f64, temperature_k: f64) -> f64 {
    GAS_CONSTANT * temperature_k / (valence * FARADAY) * (outside / inside).ln()
}

/// Releasable / effective vesicle fractions. The inactive fraction is derived
/// as `1 − R − E` and never stored.
///
/// ```text
/// dR/dt =  I / τ_rec − f · R
/// dE/dt = −E / τ_inact + f · R
/// ```
///
/// After each Euler step both fractions are clamped to [0, 1]; if their sum
/// then exceeds 1 they are scaled down by that sum so `I ≥ 0` holds exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesiclePool {
    releasable: f64,
    effective: f64,
}

impl VesiclePool {
    /// All vesicles releasable.
    pub const fn full() -> Self {
        Self {
            releasable: 1.0,
            effective: 0.0,
        }
    }

    pub fn releasable(&self) -> f64 {
        self.releasable
    }

    pub fn effective(&self) -> f64 {
        self.effective
    }

    pub fn inactive(&self) -> f64 {
        1.0 - self.releasable - self.effective
    }

    /// One Euler step. `dt`, `tau_recovery` and `tau_inactivation` share one
    /// time unit and `release_rate` is per that unit.
    pub fn advance(
        &mut self,
        dt: f64,
        release_rate: f64,
        tau_recovery: f64,
        tau_inactivation: f64,
    ) {
        let inactive = self.inactive();
        let released = release_rate * self.releasable;
        let d_releasable = inactive / tau_recovery - released;
        let d_effective = -self.effective / tau_inactivation + released;

        self.releasable = clamp_unit(self.releasable + dt * d_releasable);
        self.effective = clamp_unit(self.effective + dt * d_effective);

        let occupied = self.releasable + self.effective;
        if occupied > 1.0 {
            self.releasable /= occupied;
            self.effective /= occupied;
        }
    }
}

impl Default for VesiclePool {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hill_half_activation() {
        assert!((hill(2.0, 2.0, 3.0) - 0.5).abs() < 1e-12);
        assert_eq!(hill(-1.0, 2.0, 1.0), 0.0);
        assert_eq!(hill(0.0, 0.0, 2.0), 0.0);
        assert!(hill(1e3, 1.0, 4.0) > 0.999);
    }

    #[test]
    fn test_linear_exp_rate_limit_is_continuous() {
        let at_limit = linear_exp_rate(0.01, 0.0, 10.0);
        let near = linear_exp_rate(0.01, 1e-4, 10.0);
        assert!((at_limit - 0.1).abs() < 1e-12);
        assert!((at_limit - near).abs() < 1e-6);
        assert!(linear_exp_rate(0.1, 1e-9, 10.0).is_finite());
    }

    #[test]
    fn test_nernst_calcium() {
        // 2 mM outside, 100 nM inside at 20 °C: about +125 mV
        let e = nernst_potential(2e-3, 1e-7, CALCIUM_VALENCE, 293.15);
        assert!(e > 0.12 && e < 0.13, "E_Ca = {}", e);
    }

    #[test]
    fn test_vesicle_pool_conserves_fractions() {
        let mut pool = VesiclePool::full();
        for step in 0..10_000 {
            let rate = if step % 100 < 5 { 50.0 } else { 0.0 };
            pool.advance(0.05, rate, 800.0, 3.0);
            let sum = pool.releasable() + pool.effective() + pool.inactive();
            assert!((sum - 1.0).abs() < 1e-12);
            assert!(pool.inactive() >= -1e-12);
            assert!((0.0..=1.0).contains(&pool.releasable()));
            assert!((0.0..=1.0).contains(&pool.effective()));
        }
    }

    #[test]
    fn test_vesicle_pool_saturating_release() {
        let mut pool = VesiclePool::full();
        // A huge rate drives R far below 0 and E far above 1 before clamping.
        pool.advance(1.0, 1e6, 1.0, 1e6);
        assert_eq!(pool.releasable(), 0.0);
        assert!(pool.releasable() + pool.effective() <= 1.0 + 1e-12);
        assert!(pool.inactive() >= -1e-12);
    }
}
