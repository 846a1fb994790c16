// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `tripartite-sim`: run the tripartite synapse from the command line.
//!
//! ```text
//! tripartite-sim run --duration-s 30 --amplitude 20 --frequency 100 --output run.json
//! tripartite-sim sweep --duration-s 30 --start-s 10 --end-s 20
//! tripartite-sim config > tripartite.toml
//! ```
//!
//! Per-crate debug logging: `--debug-tripartite-synapse-engine`, `--debug-all`
//! or `TRIPARTITE_DEBUG=...` (see `--help-debug`).

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

use tripartite::config::{load_config_or_default, SimulationConfig};
use tripartite::engine::{
    run_sweep, RunSummary, StimulusScenario, SynapseSimulation, DEFAULT_SWEEP_FREQUENCIES_HZ,
};
use tripartite::models::{StimulusParameters, StimulusWindow};
use tripartite::observability::{debug_flags_help, init_logging, parse_debug_flags};

/// Tripartite synapse simulator: presynaptic bouton, astrocyte and spine
/// with CaMKII retrograde feedback
#[derive(Parser, Debug)]
#[command(name = "tripartite-sim", version, author, long_about = None)]
struct Cli {
    /// Print the per-crate debug flags and exit
    #[arg(long, global = true, default_value_t = false)]
    help_debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one simulation and print its summary
    Run {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        stimulus: StimulusArgs,

        /// Write the decimated recording as column JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare pulse-train frequencies on identical synapses
    Sweep {
        #[command(flatten)]
        common: CommonArgs,

        /// Frequencies to compare (Hz), default 50,75,100
        #[arg(long, value_delimiter = ',')]
        frequencies: Vec<f64>,

        /// Pulse amplitude (µA/cm²)
        #[arg(long, default_value_t = 20.0)]
        amplitude: f64,

        /// Pulse width (ms)
        #[arg(long, default_value_t = 2.0)]
        pulse_width_ms: f64,

        /// Stimulation window start (s)
        #[arg(long, default_value_t = 10.0)]
        start_s: f64,

        /// Stimulation window end (s)
        #[arg(long, default_value_t = 20.0)]
        end_s: f64,
    },

    /// Print the effective configuration as TOML
    Config {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug, Default)]
struct CommonArgs {
    /// Configuration file (default: discover tripartite.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated duration (s); converted to steps with the final dt
    #[arg(long)]
    duration_s: Option<f64>,

    /// Time step (ms)
    #[arg(long)]
    dt_ms: Option<f64>,

    /// Seed for the R-type channel draw
    #[arg(long)]
    seed: Option<u64>,

    /// Keep every n-th step
    #[arg(long)]
    record_interval: Option<u64>,

    /// Console log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl CommonArgs {
    fn overrides(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        if let Some(v) = self.duration_s {
            map.insert("duration_s".to_string(), v.to_string());
        }
        if let Some(v) = self.dt_ms {
            map.insert("dt_ms".to_string(), v.to_string());
        }
        if let Some(v) = self.seed {
            map.insert("seed".to_string(), v.to_string());
        }
        if let Some(v) = self.record_interval {
            map.insert("record_interval".to_string(), v.to_string());
        }
        if let Some(v) = &self.log_level {
            map.insert("log_level".to_string(), v.clone());
        }
        map
    }

    fn load(&self) -> Result<SimulationConfig> {
        load_config_or_default(self.config.as_deref(), Some(&self.overrides()))
            .context("Failed to load configuration")
    }
}

/// Replaces the configured presynaptic stimulus with one window when
/// `--amplitude` is given.
#[derive(Args, Debug, Default)]
struct StimulusArgs {
    /// Stimulus amplitude (µA/cm²)
    #[arg(long)]
    amplitude: Option<f64>,

    /// Pulse frequency (Hz); constant current when omitted
    #[arg(long)]
    frequency: Option<f64>,

    /// Pulse width (ms)
    #[arg(long, default_value_t = 2.0)]
    pulse_width_ms: f64,

    /// Window start (s)
    #[arg(long, default_value_t = 0.0)]
    start_s: f64,

    /// Window end (s); defaults to the end of the run
    #[arg(long)]
    end_s: Option<f64>,
}

impl StimulusArgs {
    fn apply(&self, config: &mut SimulationConfig) -> Result<()> {
        let Some(amplitude) = self.amplitude else {
            if self.frequency.is_some() || self.end_s.is_some() {
                bail!("--frequency and --end-s require --amplitude");
            }
            return Ok(());
        };
        let end_s = self.end_s.unwrap_or_else(|| config.run.duration().seconds());
        let window = match self.frequency {
            Some(frequency) => StimulusWindow::pulsed(
                self.start_s,
                end_s,
                amplitude,
                frequency,
                self.pulse_width_ms / 1000.0,
            ),
            None => StimulusWindow::constant(self.start_s, end_s, amplitude),
        };
        config.stimulus = StimulusParameters::with_windows(vec![window]);
        Ok(())
    }
}

fn main() -> Result<()> {
    // Debug flags are not clap arguments
    let cli = Cli::parse_from(env::args().filter(|arg| !arg.starts_with("--debug-")));

    if cli.help_debug {
        println!("{}", debug_flags_help());
        return Ok(());
    }

    match cli.command {
        Some(Command::Run {
            common,
            stimulus,
            output,
        }) => {
            let mut config = common.load()?;
            stimulus.apply(&mut config)?;
            let _guard = start_logging(&config)?;
            run(&config, output)
        }
        Some(Command::Sweep {
            common,
            frequencies,
            amplitude,
            pulse_width_ms,
            start_s,
            end_s,
        }) => {
            let config = common.load()?;
            let _guard = start_logging(&config)?;
            let frequencies = if frequencies.is_empty() {
                DEFAULT_SWEEP_FREQUENCIES_HZ.to_vec()
            } else {
                frequencies
            };
            let scenarios: Vec<_> = frequencies
                .into_iter()
                .map(|f| {
                    StimulusScenario::pulse_train(f, amplitude, pulse_width_ms / 1000.0, start_s, end_s)
                })
                .collect();
            sweep(&config, &scenarios)
        }
        Some(Command::Config { common }) => {
            let config = common.load()?;
            let text = toml::to_string_pretty(&config).context("Failed to serialise configuration")?;
            print!("{text}");
            Ok(())
        }
        None => {
            bail!("no subcommand given; try `tripartite-sim --help`")
        }
    }
}

fn start_logging(config: &SimulationConfig) -> Result<tripartite::observability::LoggingGuard> {
    let flags = parse_debug_flags();
    init_logging(&flags, &config.logging)
}

fn run(config: &SimulationConfig, output: Option<PathBuf>) -> Result<()> {
    let mut sim = SynapseSimulation::new(config)?;
    let result = sim.run_recorded();

    if let Some(path) = output {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        result.recording.write_json(BufWriter::new(file))?;
        info!(target: "tripartite", "Wrote {} records to {}", result.recording.len(), path.display());
    }

    print_summary(&result.summary);
    Ok(())
}

fn sweep(config: &SimulationConfig, scenarios: &[StimulusScenario]) -> Result<()> {
    let outcomes = run_sweep(config, scenarios)?;

    println!(
        "{:<12} {:>8} {:>12} {:>16} {:>14} {:>14}",
        "scenario", "spikes", "rate (Hz)", "peak c_post (M)", "peak phospho", "final α_mod"
    );
    for outcome in &outcomes {
        let s = &outcome.summary;
        println!(
            "{:<12} {:>8} {:>12.1} {:>16.3e} {:>14.4} {:>14.3e}",
            outcome.label,
            s.spike_count,
            s.firing_rate_hz(),
            s.peak("post_calcium_m").unwrap_or(0.0),
            outcome.peak_phosphorylation(),
            s.final_alpha_modulation
        );
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Simulated {:.3} s in {} steps ({:.2} s wall clock)",
        summary.simulated_s, summary.steps, summary.wall_clock_s
    );
    println!("  records:               {}", summary.records);
    println!(
        "  presynaptic spikes:    {} ({:.1} Hz)",
        summary.spike_count,
        summary.firing_rate_hz()
    );
    for (label, name) in [
        ("peak V_post (mV)", "post_voltage_mv"),
        ("peak c_post (M)", "post_calcium_m"),
        ("peak phosphorylation", "camkii_phosphorylated_fraction"),
        ("peak astrocyte Ca (M)", "astro_calcium_m"),
    ] {
        if let Some(peak) = summary.peak(name) {
            println!("  {:<22} {:.4e}", format!("{label}:"), peak);
        }
    }
    println!("  final alpha_mod:       {:.4e}", summary.final_alpha_modulation);
    if summary.saw_non_finite {
        println!("  WARNING: non-finite values appeared; reduce --dt-ms");
    }
}
