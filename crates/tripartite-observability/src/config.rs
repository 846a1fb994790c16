// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration (the `[logging]` section of `tripartite.toml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for crates without a debug flag (trace, debug, info, warn, error)
    pub level: String,

    /// Console format
    pub format: LogFormat,

    /// Base directory for per-run log folders (`file-logging` only)
    pub log_dir: PathBuf,

    /// Remove run folders older than this many days
    pub retention_days: u64,

    /// Keep at most this many run folders
    pub retention_runs: usize,
}

/// Console log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-field human readable lines
    Text,
    /// Single-line abbreviated output
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

/// Log levels accepted in `level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl LoggingConfig {
    /// True when `level` names a known log level (case-insensitive).
    pub fn has_valid_level(&self) -> bool {
        LOG_LEVELS.contains(&self.level.to_ascii_lowercase().as_str())
    }
}
