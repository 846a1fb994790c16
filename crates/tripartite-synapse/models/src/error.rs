// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for model construction
//!
//! Stepping a model never fails: singular points are guarded and state is
//! clamped after every step. The only fallible operation is building a model
//! from a parameter struct.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{model}: invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        model: &'static str,
        field: &'static str,
        reason: String,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Field-by-field checks used by every `ModelParameters::validate`.
#[derive(Debug, Clone, Copy)]
pub struct ParameterCheck {
    model: &'static str,
}

impl ParameterCheck {
    pub const fn new(model: &'static str) -> Self {
        Self { model }
    }

    fn fail(&self, field: &'static str, reason: impl Into<String>) -> ModelError {
        ModelError::InvalidParameter {
            model: self.model,
            field,
            reason: reason.into(),
        }
    }

    pub fn finite(&self, field: &'static str, value: f64) -> ModelResult<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(self.fail(field, format!("must be finite, got {}", value)))
        }
    }

    pub fn positive(&self, field: &'static str, value: f64) -> ModelResult<()> {
        self.finite(field, value)?;
        if value > 0.0 {
            Ok(())
        } else {
            Err(self.fail(field, format!("must be > 0, got {}", value)))
        }
    }

    pub fn non_negative(&self, field: &'static str, value: f64) -> ModelResult<()> {
        self.finite(field, value)?;
        if value >= 0.0 {
            Ok(())
        } else {
            Err(self.fail(field, format!("must be >= 0, got {}", value)))
        }
    }

    pub fn probability(&self, field: &'static str, value: f64) -> ModelResult<()> {
        self.finite(field, value)?;
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(self.fail(field, format!("must be in [0, 1], got {}", value)))
        }
    }

    pub fn at_most(&self, field: &'static str, value: f64, limit: f64) -> ModelResult<()> {
        if value <= limit {
            Ok(())
        } else {
            Err(self.fail(field, format!("must be <= {}, got {}", limit, value)))
        }
    }

    pub fn custom(&self, field: &'static str, reason: impl Into<String>) -> ModelError {
        self.fail(field, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks_report_model_and_field() {
        let check = ParameterCheck::new("Astrocyte");
        let err = check.positive("r_c", 0.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Astrocyte"));
        assert!(msg.contains("r_c"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let check = ParameterCheck::new("m");
        assert!(check.finite("x", f64::NAN).is_err());
        assert!(check.non_negative("x", f64::INFINITY).is_err());
        assert!(check.non_negative("x", 0.0).is_ok());
        assert!(check.probability("p", 1.2).is_err());
        assert!(check.probability("p", 0.52).is_ok());
    }
}
