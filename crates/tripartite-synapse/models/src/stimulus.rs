// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Stimulus Protocol
//!
//! A pure function of simulated time to injected current. The amplitude unit
//! is chosen by the consumer: µA/cm² for the presynaptic HH membrane, nA for
//! postsynaptic somatic injection.
//!
//! ```text
//! I(t) = Σ_windows  A_w · on_w(t)  +  A_b · pulse_b(t)
//!
//! on_w(t)    = [start ≤ t < end] · (pulse_w(t − start) if the window is pulsed, else 1)
//! pulse(τ)   = [(τ mod 1/f) < width]
//! ```
//!
//! The optional baseline pulse train (intrinsic pacing) runs for the whole
//! simulation; windows add on top of it.

use serde::{Deserialize, Serialize};

use crate::error::{ModelResult, ParameterCheck};
use crate::traits::ModelParameters;
use crate::units::Time;

/// Periodic rectangular pulse shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseShape {
    /// Pulse repetition frequency (Hz)
    pub frequency_hz: f64,
    /// Pulse width (s)
    pub width_s: f64,
}

impl PulseShape {
    pub fn period_s(&self) -> f64 {
        1.0 / self.frequency_hz
    }

    /// True while `elapsed` falls inside the "on" part of a period.
    pub fn is_on(&self, elapsed_s: f64) -> bool {
        elapsed_s >= 0.0 && elapsed_s.rem_euclid(self.period_s()) < self.width_s
    }

    fn validate(&self, check: &ParameterCheck) -> ModelResult<()> {
        check.positive("frequency_hz", self.frequency_hz)?;
        check.positive("width_s", self.width_s)?;
        if self.width_s >= self.period_s() {
            return Err(check.custom(
                "width_s",
                format!(
                    "pulse width {} s must be shorter than the period {} s",
                    self.width_s,
                    self.period_s()
                ),
            ));
        }
        Ok(())
    }
}

/// One stimulation window: constant or pulsed current between `start_s` and `end_s`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StimulusWindow {
    pub start_s: f64,
    pub end_s: f64,
    pub amplitude: f64,
    /// Pulsed delivery; `None` means constant current for the whole window.
    #[serde(default)]
    pub pulse: Option<PulseShape>,
}

impl StimulusWindow {
    pub fn constant(start_s: f64, end_s: f64, amplitude: f64) -> Self {
        Self {
            start_s,
            end_s,
            amplitude,
            pulse: None,
        }
    }

    pub fn pulsed(start_s: f64, end_s: f64, amplitude: f64, frequency_hz: f64, width_s: f64) -> Self {
        Self {
            start_s,
            end_s,
            amplitude,
            pulse: Some(PulseShape {
                frequency_hz,
                width_s,
            }),
        }
    }

    pub fn contains(&self, t_s: f64) -> bool {
        t_s >= self.start_s && t_s < self.end_s
    }

    pub fn current_at(&self, t_s: f64) -> f64 {
        if !self.contains(t_s) {
            return 0.0;
        }
        match &self.pulse {
            Some(pulse) if !pulse.is_on(t_s - self.start_s) => 0.0,
            _ => self.amplitude,
        }
    }
}

/// Baseline pacing pulse train active for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseTrain {
    pub amplitude: f64,
    pub frequency_hz: f64,
    pub width_s: f64,
}

impl PulseTrain {
    fn shape(&self) -> PulseShape {
        PulseShape {
            frequency_hz: self.frequency_hz,
            width_s: self.width_s,
        }
    }
}

/// Stimulus protocol configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StimulusParameters {
    pub windows: Vec<StimulusWindow>,
    #[serde(default)]
    pub baseline: Option<PulseTrain>,
}

impl StimulusParameters {
    /// No stimulation at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_windows(windows: Vec<StimulusWindow>) -> Self {
        Self {
            windows,
            baseline: None,
        }
    }
}

impl ModelParameters for StimulusParameters {
    fn validate(&self) -> ModelResult<()> {
        let check = ParameterCheck::new("StimulusProtocol");
        for window in &self.windows {
            check.non_negative("start_s", window.start_s)?;
            check.finite("end_s", window.end_s)?;
            check.finite("amplitude", window.amplitude)?;
            if window.end_s < window.start_s {
                return Err(check.custom(
                    "end_s",
                    format!(
                        "window end {} s precedes its start {} s",
                        window.end_s, window.start_s
                    ),
                ));
            }
            if let Some(pulse) = &window.pulse {
                pulse.validate(&check)?;
            }
        }
        if let Some(train) = &self.baseline {
            check.finite("baseline.amplitude", train.amplitude)?;
            train.shape().validate(&check)?;
        }
        Ok(())
    }
}

/// Stateless time → current mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusProtocol {
    params: StimulusParameters,
}

impl StimulusProtocol {
    pub fn new(params: StimulusParameters) -> ModelResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn parameters(&self) -> &StimulusParameters {
        &self.params
    }

    /// Injected current at `time`, in the amplitude unit of the configuration.
    pub fn current_at(&self, time: Time) -> f64 {
        let t = time.seconds();
        let windowed: f64 = self
            .params
            .windows
            .iter()
            .map(|window| window.current_at(t))
            .sum();
        let baseline = match &self.params.baseline {
            Some(train) if train.shape().is_on(t) => train.amplitude,
            _ => 0.0,
        };
        windowed + baseline
    }

    /// Last instant any window is active (baseline pacing excluded).
    pub fn last_window_end(&self) -> Option<Time> {
        self.params
            .windows
            .iter()
            .map(|w| w.end_s)
            .fold(None, |acc: Option<f64>, end| Some(acc.map_or(end, |a| a.max(end))))
            .map(Time::from_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_protocol_is_silent() {
        let protocol = StimulusProtocol::new(StimulusParameters::none()).unwrap();
        for i in 0..100 {
            assert_eq!(protocol.current_at(Time::from_millis(i as f64)), 0.0);
        }
        assert!(protocol.last_window_end().is_none());
    }

    #[test]
    fn test_constant_window_bounds() {
        let protocol = StimulusProtocol::new(StimulusParameters::with_windows(vec![
            StimulusWindow::constant(1.0, 2.0, 35.0),
        ]))
        .unwrap();
        assert_eq!(protocol.current_at(Time::from_seconds(0.999)), 0.0);
        assert_eq!(protocol.current_at(Time::from_seconds(1.0)), 35.0);
        assert_eq!(protocol.current_at(Time::from_seconds(1.5)), 35.0);
        assert_eq!(protocol.current_at(Time::from_seconds(2.0)), 0.0);
    }

    #[test]
    fn test_pulsed_window_duty_cycle() {
        // 20 Hz, 2 ms pulses
        let protocol = StimulusProtocol::new(StimulusParameters::with_windows(vec![
            StimulusWindow::pulsed(0.0, 1.0, 20.0, 20.0, 0.002),
        ]))
        .unwrap();
        let dt = Time::from_millis(0.05);
        let on_steps = (0..20_000)
            .filter(|&i| protocol.current_at(dt.times(i)) > 0.0)
            .count();
        // 20 pulses × 40 steps each
        assert_eq!(on_steps, 800);
        assert_eq!(protocol.current_at(Time::from_seconds(0.001)), 20.0);
        assert_eq!(protocol.current_at(Time::from_seconds(0.003)), 0.0);
        assert_eq!(protocol.current_at(Time::from_seconds(0.0505)), 20.0);
    }

    #[test]
    fn test_baseline_adds_to_windows() {
        let params = StimulusParameters {
            windows: vec![StimulusWindow::constant(0.0, 1.0, 2.0)],
            baseline: Some(PulseTrain {
                amplitude: 10.0,
                frequency_hz: 5.0,
                width_s: 0.010,
            }),
        };
        let protocol = StimulusProtocol::new(params).unwrap();
        assert_eq!(protocol.current_at(Time::from_millis(5.0)), 12.0);
        assert_eq!(protocol.current_at(Time::from_millis(50.0)), 2.0);
        assert_eq!(protocol.current_at(Time::from_millis(1205.0)), 10.0);
    }

    #[test]
    fn test_idempotent() {
        let protocol = StimulusProtocol::new(StimulusParameters::with_windows(vec![
            StimulusWindow::pulsed(0.1, 0.9, 6.0, 50.0, 0.005),
        ]))
        .unwrap();
        let t = Time::from_seconds(0.4321);
        assert_eq!(protocol.current_at(t), protocol.current_at(t));
    }

    #[test]
    fn test_invalid_windows_rejected() {
        let reversed = StimulusParameters::with_windows(vec![StimulusWindow::constant(2.0, 1.0, 1.0)]);
        assert!(StimulusProtocol::new(reversed).is_err());

        let wide = StimulusParameters::with_windows(vec![StimulusWindow::pulsed(0.0, 1.0, 1.0, 100.0, 0.02)]);
        assert!(StimulusProtocol::new(wide).is_err());

        let nan = StimulusParameters::with_windows(vec![StimulusWindow::constant(0.0, 1.0, f64::NAN)]);
        assert!(StimulusProtocol::new(nan).is_err());
    }

    #[test]
    fn test_last_window_end() {
        let protocol = StimulusProtocol::new(StimulusParameters::with_windows(vec![
            StimulusWindow::constant(0.1, 0.12, 0.5),
            StimulusWindow::constant(10.0, 20.0, 10.0),
        ]))
        .unwrap();
        assert_eq!(protocol.last_window_end(), Some(Time::from_seconds(20.0)));
    }
}
