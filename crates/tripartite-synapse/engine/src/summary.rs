// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Whole-run statistics, accumulated over every step (not only recorded ones).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::{SynapseRecord, OBSERVABLES};

/// Presynaptic spike detection threshold (mV)
pub const SPIKE_THRESHOLD_MV: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservableRange {
    pub min: f64,
    pub max: f64,
}

impl ObservableRange {
    fn starting_at(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    fn include(&mut self, value: f64) {
        // f64::min/max skip NaN, so a diverging run still reports its finite range
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps: u64,
    pub simulated_s: f64,
    pub wall_clock_s: f64,
    pub records: u64,
    /// Upward crossings of [`SPIKE_THRESHOLD_MV`] by the presynaptic voltage
    pub spike_count: u64,
    pub final_alpha_modulation: f64,
    /// True if any observable was NaN or infinite at some step
    pub saw_non_finite: bool,
    pub ranges: BTreeMap<String, ObservableRange>,
}

impl RunSummary {
    pub fn range(&self, name: &str) -> Option<ObservableRange> {
        self.ranges.get(name).copied()
    }

    pub fn peak(&self, name: &str) -> Option<f64> {
        self.range(name).map(|r| r.max)
    }

    /// Mean presynaptic firing rate over the simulated time.
    pub fn firing_rate_hz(&self) -> f64 {
        if self.simulated_s > 0.0 {
            self.spike_count as f64 / self.simulated_s
        } else {
            0.0
        }
    }
}

/// Incremental builder fed one record per step.
#[derive(Debug, Clone, Default)]
pub struct SummaryTracker {
    ranges: Vec<ObservableRange>,
    steps: u64,
    records: u64,
    spike_count: u64,
    last_pre_voltage_mv: Option<f64>,
    last: Option<SynapseRecord>,
    saw_non_finite: bool,
}

impl SummaryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one step. Returns `true` the first time a non-finite value appears.
    pub fn observe(&mut self, record: &SynapseRecord) -> bool {
        if self.ranges.is_empty() {
            self.ranges = record.values().map(|(_, v)| ObservableRange::starting_at(v)).collect();
        } else {
            for (range, (_, value)) in self.ranges.iter_mut().zip(record.values()) {
                range.include(value);
            }
        }

        let v = record.pre_voltage_mv;
        if let Some(previous) = self.last_pre_voltage_mv {
            if previous < SPIKE_THRESHOLD_MV && v >= SPIKE_THRESHOLD_MV {
                self.spike_count += 1;
            }
        }
        self.last_pre_voltage_mv = Some(v);
        self.steps += 1;
        self.last = Some(*record);

        if !self.saw_non_finite && record.values().any(|(_, v)| !v.is_finite()) {
            self.saw_non_finite = true;
            return true;
        }
        false
    }

    pub fn count_record(&mut self) {
        self.records += 1;
    }

    pub fn spike_count(&self) -> u64 {
        self.spike_count
    }

    pub fn finish(self, simulated_s: f64, wall_clock_s: f64) -> RunSummary {
        let ranges = OBSERVABLES
            .iter()
            .zip(self.ranges)
            .map(|(name, range)| (name.to_string(), range))
            .collect();
        RunSummary {
            steps: self.steps,
            simulated_s,
            wall_clock_s,
            records: self.records,
            spike_count: self.spike_count,
            final_alpha_modulation: self.last.map_or(0.0, |r| r.alpha_modulation),
            saw_non_finite: self.saw_non_finite,
            ranges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(step: u64, v: f64) -> SynapseRecord {
        SynapseRecord {
            step,
            pre_voltage_mv: v,
            ..SynapseRecord::default()
        }
    }

    #[test]
    fn test_counts_upward_crossings_only() {
        let mut tracker = SummaryTracker::new();
        for (i, v) in [-70.0, -10.0, 5.0, 30.0, -5.0, 0.0, -60.0, 20.0].into_iter().enumerate() {
            tracker.observe(&at(i as u64, v));
        }
        assert_eq!(tracker.spike_count(), 3);
    }

    #[test]
    fn test_ranges_and_final_value() {
        let mut tracker = SummaryTracker::new();
        for (i, v) in [-70.0, 20.0, -75.0].into_iter().enumerate() {
            let mut record = at(i as u64, v);
            record.alpha_modulation = i as f64 * 0.001;
            tracker.observe(&record);
        }
        let summary = tracker.finish(1.0, 0.1);
        let range = summary.range("pre_voltage_mv").unwrap();
        assert_eq!((range.min, range.max), (-75.0, 20.0));
        assert_eq!(summary.final_alpha_modulation, 0.002);
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.firing_rate_hz(), 1.0);
    }

    #[test]
    fn test_non_finite_reported_once() {
        let mut tracker = SummaryTracker::new();
        assert!(!tracker.observe(&at(0, -70.0)));
        assert!(tracker.observe(&at(1, f64::NAN)));
        assert!(!tracker.observe(&at(2, f64::INFINITY)));
        let summary = tracker.finish(0.0, 0.0);
        assert!(summary.saw_non_finite);
        assert_eq!(summary.peak("pre_voltage_mv"), Some(f64::INFINITY));
    }
}
