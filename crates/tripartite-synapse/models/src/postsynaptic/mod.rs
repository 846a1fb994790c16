// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Postsynaptic Spine
//!
//! AMPA-gated membrane and the spine calcium it drives.

pub mod calcium;
pub mod membrane;

pub use calcium::{PostsynapticCalcium, PostsynapticCalciumParameters, PostsynapticCalciumState};
pub use membrane::{PostsynapticMembrane, PostsynapticMembraneParameters, PostsynapticMembraneState};
