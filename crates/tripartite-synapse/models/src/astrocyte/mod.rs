// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Astrocyte
//!
//! Synaptic glutamate drives astrocytic IP3 and calcium; calcium above a
//! threshold triggers gliotransmitter (glutamate) release into the
//! extrasynaptic space.

pub mod dynamics;
pub mod gliotransmitter;

pub use dynamics::{AstrocyteCore, AstrocyteDerivatives, AstrocyteParameters, AstrocyteState};
pub use gliotransmitter::{GliotransmitterParameters, GliotransmitterRelease, GliotransmitterState};
