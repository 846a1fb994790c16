// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Tripartite Synapse Plasticity
//!
//! Postsynaptic long-term potentiation:
//! - **CaMKII switch**: 11-state phosphorylation chain with a PP1/I1 loop
//! - **Retrograde signal**: sigmoid readout of phosphorylated CaMKII that
//!   scales the presynaptic calcium-sensor binding rate on the next step

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod camkii;
pub mod retrograde;

pub use camkii::{CaMKIIParameters, CaMKIIState, CaMKIISwitch, CHAIN_STATES, COOPERATIVITY};
pub use retrograde::RetrogradeSignal;
