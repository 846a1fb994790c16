// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Tripartite Synapse Engine
//!
//! Fixed-step driver that wires the compartment models and the CaMKII switch
//! into one closed loop, hands decimated records to a sink and summarises
//! each run.
//!
//! ## Example
//!
//! ```no_run
//! use tripartite_config::SimulationConfig;
//! use tripartite_synapse_engine::SynapseSimulation;
//!
//! let mut config = SimulationConfig::default();
//! config.run.total_steps = 20_000;
//!
//! let mut sim = SynapseSimulation::new(&config)?;
//! let output = sim.run_recorded();
//! println!("{} spikes", output.summary.spike_count);
//! # Ok::<(), tripartite_synapse_engine::EngineError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod record;
pub mod simulation;
pub mod summary;
pub mod sweep;

pub use error::{EngineError, EngineResult};
pub use record::{DiscardSink, RecordSink, Recording, SynapseRecord, OBSERVABLES};
pub use simulation::{SimulationOutput, SynapseSimulation};
pub use summary::{ObservableRange, RunSummary, SummaryTracker, SPIKE_THRESHOLD_MV};
pub use sweep::{
    default_frequency_scenarios, run_sweep, ScenarioOutcome, StimulusScenario,
    DEFAULT_SWEEP_FREQUENCIES_HZ,
};
