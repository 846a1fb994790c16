// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Tripartite - Tripartite Synapse Simulator
//!
//! A single glutamatergic synapse modelled as three coupled compartments: a
//! Hodgkin-Huxley presynaptic bouton, a Li-Rinzel astrocyte and a postsynaptic
//! spine whose CaMKII switch feeds a retrograde signal back to transmitter
//! release.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! tripartite = "0.1"
//! ```
//!
//! ```rust,no_run
//! use tripartite::prelude::*;
//!
//! let mut config = SimulationConfig::default();
//! config.run.set_duration_s(2.0);
//! config.stimulus = StimulusParameters::with_windows(vec![
//!     StimulusWindow::pulsed(0.5, 1.5, 20.0, 100.0, 0.002),
//! ]);
//!
//! let mut sim = SynapseSimulation::new(&config)?;
//! let output = sim.run_recorded();
//! println!("final alpha_mod = {:e}", output.summary.final_alpha_modulation);
//! # Ok::<(), EngineError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: tripartite-config, tripartite-observability│
//! │  (TOML config + overrides, tracing setup)               │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Models: tripartite-synapse-models                      │
//! │  (units, stimulus, seven compartment models)            │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Plasticity: tripartite-synapse-plasticity              │
//! │  (CaMKII switch, retrograde signal)                     │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Engine: tripartite-synapse-engine                      │
//! │  (fixed-step loop, recording, summaries, sweeps)        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use tripartite_config as config;
pub use tripartite_observability as observability;
pub use tripartite_synapse_engine as engine;
pub use tripartite_synapse_models as models;
pub use tripartite_synapse_plasticity as plasticity;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, load_config_or_default, RunConfig, SimulationConfig};
    pub use crate::engine::{
        run_sweep, EngineError, RecordSink, Recording, RunSummary, SimulationOutput,
        StimulusScenario, SynapseRecord, SynapseSimulation,
    };
    pub use crate::models::{
        Compartment, Concentration, Current, CurrentDensity, ModelParameters, StimulusParameters,
        StimulusWindow, Time, Voltage,
    };
    pub use crate::plasticity::{CaMKIISwitch, RetrogradeSignal};
}
