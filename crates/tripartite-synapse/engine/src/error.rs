// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Engine error types

use thiserror::Error;
use tripartite_config::ConfigError;
use tripartite_synapse_models::ModelError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Model construction failed: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid run settings: {0}")]
    InvalidRun(String),

    #[error("Failed to write recording: {0}")]
    Output(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
