// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialisation
//!
//! Always installs a console layer. With `file-logging`, adds JSON file
//! layers in a timestamped run folder:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       ├── tripartite-synapse-engine.log
//!       ├── tripartite-synapse-models.log
//!       └── tripartite.log (combined)
//! ```

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

#[cfg(feature = "file-logging")]
use chrono::{NaiveDateTime, Utc};
#[cfg(feature = "file-logging")]
use std::path::PathBuf;
#[cfg(feature = "file-logging")]
use tracing_appender::rolling;

/// Keeps file writers alive; logs are flushed when this is dropped.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    #[cfg(feature = "file-logging")]
    log_dir: PathBuf,
}

impl LoggingGuard {
    /// Run folder holding this run's log files, if file logging is enabled.
    pub fn log_dir(&self) -> Option<&Path> {
        #[cfg(feature = "file-logging")]
        {
            Some(&self.log_dir)
        }
        #[cfg(not(feature = "file-logging"))]
        {
            None
        }
    }
}

/// Console filter: flagged crates at debug, everything else at the configured level.
pub fn build_env_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = debug_flags.to_filter_string(&config.level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

fn console_layer(
    config: &LoggingConfig,
    filter: EnvFilter,
) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false);
    match config.format {
        LogFormat::Text => layer.with_filter(filter).boxed(),
        LogFormat::Compact => layer.compact().with_filter(filter).boxed(),
    }
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already installed or the level is not a
/// valid filter directive.
#[cfg(not(feature = "file-logging"))]
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = build_env_filter(debug_flags, config)?;
    Registry::default()
        .with(vec![console_layer(config, filter)])
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(LoggingGuard {})
}

/// Install the global subscriber with console and per-crate JSON file layers.
#[cfg(feature = "file-logging")]
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let base_log_dir = &config.log_dir;

    let timestamp = Utc::now().format(RUN_FOLDER_FORMAT);
    let run_folder = base_log_dir.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_logs(base_log_dir, config.retention_days, config.retention_runs)?;

    let filter = build_env_filter(debug_flags, config)?;
    let mut layers = vec![console_layer(config, filter)];
    let mut file_guards = Vec::new();

    for crate_name in crate::KNOWN_CRATES {
        let file_appender = rolling::never(&run_folder, format!("{}.log", crate_name));
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        file_guards.push(guard);

        let module = crate_name.replace('-', "_");
        let crate_filter = EnvFilter::try_new(format!("{crate_name}=debug,{module}=debug,off"))
            .with_context(|| format!("Invalid log filter for {}", crate_name))?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(crate_filter)
                .boxed(),
        );
    }

    let combined_appender = rolling::never(&run_folder, "tripartite.log");
    let (combined_non_blocking, combined_guard) = tracing_appender::non_blocking(combined_appender);
    file_guards.push(combined_guard);
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_writer(combined_non_blocking)
            .with_target(true)
            .json()
            .with_filter(build_env_filter(debug_flags, config)?)
            .boxed(),
    );

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard {
        _file_guards: file_guards,
        log_dir: run_folder,
    })
}

#[cfg(feature = "file-logging")]
const RUN_FOLDER_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Remove run folders older than `retention_days`, then trim to the newest
/// `retention_runs`.
#[cfg(feature = "file-logging")]
pub fn cleanup_old_logs(base_log_dir: &Path, retention_days: u64, retention_runs: usize) -> Result<()> {
    if !base_log_dir.exists() {
        return Ok(());
    }

    let cutoff = Utc::now().naive_utc() - chrono::Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let stamp = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("run_"))
            .and_then(|s| NaiveDateTime::parse_from_str(s, RUN_FOLDER_FORMAT).ok());
        if let Some(stamp) = stamp {
            runs.push((path, stamp));
        }
    }

    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    for (index, (path, stamp)) in runs.iter().enumerate() {
        if *stamp < cutoff || index >= retention_runs {
            if let Err(e) = std::fs::remove_dir_all(path) {
                tracing::warn!(
                    target: "tripartite-observability",
                    "Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_accepts_flagged_crates() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        assert!(build_env_filter(&flags, &LoggingConfig::default()).is_ok());
    }

    #[test]
    fn test_env_filter_uses_configured_level() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..LoggingConfig::default()
        };
        let filter = build_env_filter(&CrateDebugFlags::default(), &config).unwrap();
        assert_eq!(filter.max_level_hint(), Some(tracing_subscriber::filter::LevelFilter::WARN));
    }

    #[cfg(feature = "file-logging")]
    #[test]
    fn test_cleanup_keeps_newest_runs() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        for hours in 0..5 {
            let stamp = (now - chrono::Duration::hours(hours)).format(RUN_FOLDER_FORMAT);
            std::fs::create_dir(dir.path().join(format!("run_{}", stamp))).unwrap();
        }
        std::fs::create_dir(dir.path().join("unrelated")).unwrap();

        cleanup_old_logs(dir.path(), 30, 2).unwrap();

        let remaining: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|n| n.starts_with("run_"))
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(dir.path().join("unrelated").exists());
    }
}
