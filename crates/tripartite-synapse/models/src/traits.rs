// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Traits shared by every compartment model.

use crate::error::ModelResult;

/// A read-only parameter table for one compartment.
pub trait ModelParameters {
    /// Check every field. Called by the owning model's constructor.
    fn validate(&self) -> ModelResult<()>;
}

/// A stateful compartment advanced by fixed explicit-Euler steps.
///
/// The step operation itself is inherent on each model because its inputs
/// differ per compartment.
pub trait Compartment {
    type Parameters: ModelParameters;

    /// Human-readable model name (used in logs and errors).
    fn model_name(&self) -> &'static str;

    fn parameters(&self) -> &Self::Parameters;

    /// Restore the configured initial state.
    fn reset(&mut self);
}
