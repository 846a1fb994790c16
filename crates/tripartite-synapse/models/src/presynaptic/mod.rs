// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Presynaptic Terminal
//!
//! Spike generation, bouton calcium, and calcium-triggered glutamate release.
//!
//! ```text
//! I_stim ──▶ PresynapticMembrane ──V──▶ PresynapticCalcium ──c──▶ GlutamateRelease ──g──▶ cleft
//!                                            ▲                         ▲
//!                              extrasynaptic glutamate           alpha_modulation
//! ```

pub mod calcium;
pub mod glutamate;
pub mod membrane;

pub use calcium::{PresynapticCalcium, PresynapticCalciumParameters, PresynapticCalciumState};
pub use glutamate::{GlutamateRelease, GlutamateReleaseParameters, GlutamateReleaseState};
pub use membrane::{HodgkinHuxleyParameters, MembraneState, PresynapticMembrane};
