// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-tripartite-synapse-engine` to raise one
//! crate to `debug` while the rest stay at the configured level.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Crates selected for debug-level logging
///
/// # Example
/// ```rust
/// use tripartite_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-tripartite-synapse-engine".to_string()]);
/// assert!(flags.is_enabled("tripartite-synapse-engine"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse `--debug-{crate-name}` and `--debug-all` from arguments.
    ///
    /// Unrelated arguments are ignored, so the full process argument list can
    /// be passed in.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }

        flags
    }

    /// Parse the `TRIPARTITE_DEBUG` format: `all` or comma-separated crate names.
    pub fn from_env_value(value: &str) -> Self {
        let mut flags = CrateDebugFlags::default();
        flags.merge_env_value(value);
        flags
    }

    fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',') {
            let crate_name = crate_name.trim();
            if !crate_name.is_empty() {
                self.enable(crate_name);
            }
        }
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string());
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` for flagged crates, `INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build an `EnvFilter` directive string.
    ///
    /// Each flagged crate gets a directive for its explicit event target
    /// (`tripartite-synapse-engine`) and one for its module path
    /// (`tripartite_synapse_engine`), followed by `default_level` for
    /// everything else.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters = Vec::new();
        for crate_name in &self.enabled_crates {
            filters.push(format!("{}=debug", crate_name));
            let module = crate_name.replace('-', "_");
            if module != *crate_name {
                filters.push(format!("{}=debug", module));
            }
        }
        filters.push(default_level.to_ascii_lowercase());
        filters.join(",")
    }
}

/// Debug flags from the process arguments plus `TRIPARTITE_DEBUG`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var("TRIPARTITE_DEBUG") {
        flags.merge_env_value(&value);
    }
    flags
}

/// Help text listing the debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  TRIPARTITE_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  TRIPARTITE_DEBUG=all                             Enable debug for all crates

Examples:
  --debug-tripartite-synapse-engine
  TRIPARTITE_DEBUG=tripartite-synapse-models,tripartite-synapse-plasticity
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec![
            "tripartite-sim".to_string(),
            "--debug-tripartite-synapse-engine".to_string(),
        ]);
        assert!(flags.is_enabled("tripartite-synapse-engine"));
        assert!(!flags.is_enabled("tripartite-synapse-models"));
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_env_value() {
        let flags = CrateDebugFlags::from_env_value(" tripartite-config , ,tripartite-synapse-models");
        assert!(flags.is_enabled("tripartite-config"));
        assert!(flags.is_enabled("tripartite-synapse-models"));
        assert_eq!(flags.enabled_crates.len(), 2);

        let flags = CrateDebugFlags::from_env_value("all");
        assert_eq!(flags.enabled_crates.len(), KNOWN_CRATES.len());
    }

    #[test]
    fn test_filter_string() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-tripartite-synapse-engine".to_string()]);
        let filter = flags.to_filter_string("WARN");
        assert_eq!(
            filter,
            "tripartite-synapse-engine=debug,tripartite_synapse_engine=debug,warn"
        );
        assert_eq!(CrateDebugFlags::default().to_filter_string("info"), "info");
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-tripartite-config".to_string()]);
        assert_eq!(flags.log_level("tripartite-config"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("tripartite-synapse-engine"), tracing::Level::INFO);
        assert!(flags.any_enabled());
    }
}
