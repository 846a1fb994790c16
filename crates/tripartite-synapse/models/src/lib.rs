// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Tripartite Synapse Compartment Models
//!
//! Stateful biophysical models of the presynaptic terminal, the astrocyte and
//! the postsynaptic spine. Each model:
//!
//! - is built from a validated parameter struct (construction is the only fallible step)
//! - advances by one explicit-Euler step per call
//! - exchanges only typed scalar quantities ([`units`]) with its neighbours
//! - clamps or floors its state after every step
//!
//! ## Data Flow
//!
//! ```text
//! StimulusProtocol ─▶ PresynapticMembrane ─▶ PresynapticCalcium ─▶ GlutamateRelease
//!                                                                        │
//!     PostsynapticCalcium ◀─ PostsynapticMembrane ◀─ GliotransmitterRelease ◀─ AstrocyteCore
//! ```
//!
//! The CaMKII switch closing the loop lives in `tripartite-synapse-plasticity`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod astrocyte;
pub mod error;
pub mod kinetics;
pub mod postsynaptic;
pub mod presynaptic;
pub mod stimulus;
pub mod traits;
pub mod units;

pub use astrocyte::{AstrocyteCore, AstrocyteParameters, GliotransmitterParameters, GliotransmitterRelease};
pub use error::{ModelError, ModelResult, ParameterCheck};
pub use postsynaptic::{
    PostsynapticCalcium, PostsynapticCalciumParameters, PostsynapticMembrane,
    PostsynapticMembraneParameters,
};
pub use presynaptic::{
    GlutamateRelease, GlutamateReleaseParameters, HodgkinHuxleyParameters, PresynapticCalcium,
    PresynapticCalciumParameters, PresynapticMembrane,
};
pub use stimulus::{PulseShape, PulseTrain, StimulusParameters, StimulusProtocol, StimulusWindow};
pub use traits::{Compartment, ModelParameters};
pub use units::{Concentration, Current, CurrentDensity, Time, Voltage};
