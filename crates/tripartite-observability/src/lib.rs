// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # tripartite-observability
//!
//! Logging infrastructure shared by the simulator crates.
//!
//! Library crates only emit `tracing` events; the binary decides where they
//! go by calling [`init_logging`] once at startup. Per-crate verbosity is
//! raised with `--debug-<crate>` flags or `TRIPARTITE_DEBUG`.
//!
//! ## Features
//! - `file-logging`: JSON log files in a timestamped run folder with retention

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Crates that accept `--debug-<name>`
pub const KNOWN_CRATES: &[&str] = &[
    "tripartite",
    "tripartite-config",
    "tripartite-observability",
    "tripartite-synapse-models",
    "tripartite-synapse-plasticity",
    "tripartite-synapse-engine",
];
