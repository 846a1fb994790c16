// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Retrograde LTP signal carried from the spine back to the bouton.

use serde::{Deserialize, Serialize};

/// Dimensionless increment on the presynaptic calcium-sensor binding rate.
///
/// The release model applies it as `α_eff = α_base · (1 + alpha_modulation)`.
/// Zero means no potentiation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrogradeSignal(f64);

impl RetrogradeSignal {
    pub const BASELINE: Self = Self(0.0);

    pub const fn new(alpha_modulation: f64) -> Self {
        Self(alpha_modulation)
    }

    pub const fn alpha_modulation(self) -> f64 {
        self.0
    }

    /// Scale a base rate by `1 + alpha_modulation`.
    pub fn apply_to(self, base_rate: f64) -> f64 {
        base_rate * (1.0 + self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_is_identity() {
        assert_eq!(RetrogradeSignal::BASELINE.apply_to(0.3), 0.3);
        assert_eq!(RetrogradeSignal::default(), RetrogradeSignal::BASELINE);
    }

    #[test]
    fn test_apply_scales_rate() {
        let signal = RetrogradeSignal::new(0.005);
        assert!((signal.apply_to(0.3) - 0.3015).abs() < 1e-12);
    }
}
