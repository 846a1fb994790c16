// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recording interface
//!
//! Every step produces a flat [`SynapseRecord`] of named observables. The
//! engine hands every `record_interval`-th record to a [`RecordSink`];
//! storage, plotting and file formats are the sink's business.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

macro_rules! define_record {
    ($( $(#[$doc:meta])* $field:ident ),* $(,)?) => {
        /// Snapshot of all observables at one step
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        pub struct SynapseRecord {
            pub step: u64,
            $( $(#[$doc])* pub $field: f64, )*
        }

        /// Observable names, in record order
        pub const OBSERVABLES: &[&str] = &[ $( stringify!($field) ),* ];

        impl SynapseRecord {
            /// Look up an observable by name.
            pub fn value(&self, name: &str) -> Option<f64> {
                match name {
                    $( stringify!($field) => Some(self.$field), )*
                    _ => None,
                }
            }

            /// `(name, value)` pairs in [`OBSERVABLES`] order.
            pub fn values(&self) -> impl Iterator<Item = (&'static str, f64)> {
                OBSERVABLES.iter().copied().zip([ $( self.$field ),* ])
            }
        }
    };
}

define_record! {
    /// Simulated time at the start of the step (s)
    time_s,
    /// Presynaptic stimulus (µA/cm²)
    pre_stimulus,
    /// Postsynaptic somatic injection (nA)
    post_injection_na,

    pre_voltage_mv,
    gate_m,
    gate_h,
    gate_n,

    pre_calcium_m,
    pre_fast_calcium_m,
    pre_slow_calcium_m,
    er_calcium_m,
    pre_ip3_m,
    vgcc_gate,
    ip3r_gate,

    /// Occupancy of the release-ready sensor state
    release_ready,
    pre_releasable,
    pre_effective,
    pre_inactive,
    synaptic_glutamate_m,

    astro_calcium_m,
    astro_ip3_m,
    astro_gate,

    glio_release_probability,
    glio_releasable,
    glio_effective,
    glio_inactive,
    extracellular_glutamate_m,

    ampa_gate,
    ampa_current_a,
    post_voltage_mv,
    /// R-type channels open this step
    open_channels,
    post_calcium_m,

    camkii_phosphorylated_fraction,
    camkii_phosphorylated_m,
    active_pp1_m,
    free_inhibitor_m,
    alpha_modulation,
    /// Sensor binding rate in effect this step (1/(µM·ms))
    effective_alpha,
}

/// Consumer of decimated records.
pub trait RecordSink {
    fn record(&mut self, record: &SynapseRecord);
}

impl RecordSink for Vec<SynapseRecord> {
    fn record(&mut self, record: &SynapseRecord) {
        self.push(*record);
    }
}

/// Sink that drops everything, for runs where only the summary matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl RecordSink for DiscardSink {
    fn record(&mut self, _record: &SynapseRecord) {}
}

/// In-memory recording with column access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    records: Vec<SynapseRecord>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SynapseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&SynapseRecord> {
        self.records.last()
    }

    /// Time series of one observable, or `None` for an unknown name.
    pub fn series(&self, name: &str) -> Option<Vec<f64>> {
        if !OBSERVABLES.contains(&name) {
            return None;
        }
        Some(self.records.iter().filter_map(|r| r.value(name)).collect())
    }

    /// Column-oriented view: observable name to time series, plus `step`.
    pub fn columns(&self) -> BTreeMap<&'static str, Vec<f64>> {
        let mut columns: BTreeMap<&'static str, Vec<f64>> = OBSERVABLES
            .iter()
            .map(|name| (*name, Vec::with_capacity(self.records.len())))
            .collect();
        for record in &self.records {
            for (name, value) in record.values() {
                if let Some(column) = columns.get_mut(name) {
                    column.push(value);
                }
            }
        }
        columns.insert("step", self.records.iter().map(|r| r.step as f64).collect());
        columns
    }

    /// Write the columns as one JSON object.
    ///
    /// Non-finite values are written as `null`.
    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, &self.columns())
    }
}

impl RecordSink for Recording {
    fn record(&mut self, record: &SynapseRecord) {
        self.records.push(*record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observable_names_are_unique() {
        let mut names = OBSERVABLES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), OBSERVABLES.len());
    }

    #[test]
    fn test_value_lookup() {
        let record = SynapseRecord {
            pre_voltage_mv: -70.0,
            alpha_modulation: 0.002,
            ..SynapseRecord::default()
        };
        assert_eq!(record.value("pre_voltage_mv"), Some(-70.0));
        assert_eq!(record.value("alpha_modulation"), Some(0.002));
        assert_eq!(record.value("no_such_observable"), None);
        assert_eq!(record.values().count(), OBSERVABLES.len());
    }

    #[test]
    fn test_recording_series_and_columns() {
        let mut recording = Recording::new();
        for step in 0..3 {
            recording.record(&SynapseRecord {
                step,
                time_s: step as f64 * 0.001,
                ..SynapseRecord::default()
            });
        }
        assert_eq!(recording.series("time_s"), Some(vec![0.0, 0.001, 0.002]));
        assert_eq!(recording.series("bogus"), None);

        let columns = recording.columns();
        assert_eq!(columns["step"], vec![0.0, 1.0, 2.0]);
        assert_eq!(columns.len(), OBSERVABLES.len() + 1);
    }

    #[test]
    fn test_write_json() {
        let mut recording = Recording::new();
        recording.record(&SynapseRecord {
            post_voltage_mv: f64::NAN,
            ..SynapseRecord::default()
        });
        let mut buffer = Vec::new();
        recording.write_json(&mut buffer).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert!(parsed["post_voltage_mv"][0].is_null());
        assert_eq!(parsed["step"][0], serde_json::json!(0.0));
    }
}
