// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Physical Quantities
//!
//! Every value that crosses a model boundary is wrapped in one of these
//! newtypes. Each stores a single canonical unit internally and exposes
//! explicit accessors for the other units a parameter table may be written in.
//!
//! | Quantity | Canonical unit | Other accessors |
//! |---|---|---|
//! | [`Time`] | s | ms |
//! | [`Voltage`] | V | mV |
//! | [`Concentration`] | M (mol/L) | µM, nM |
//! | [`Current`] | A | nA |
//! | [`CurrentDensity`] | µA/cm² | |
//!
//! The accessor a model calls documents which unit its equations use, so
//! a boundary conversion is always visible at the call site.

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub};
use serde::{Deserialize, Serialize};

macro_rules! quantity {
    ($(#[$meta:meta])* $name:ident, $unit:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(f64);

        impl $name {
            pub const ZERO: Self = Self(0.0);

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:e} {}", self.0, $unit)
            }
        }
    };
}

quantity!(
    /// Simulated time or a time step, stored in seconds.
    Time,
    "s"
);

quantity!(
    /// Membrane potential, stored in volts.
    Voltage,
    "V"
);

quantity!(
    /// Molar concentration, stored in mol/L.
    Concentration,
    "M"
);

quantity!(
    /// Absolute current, stored in amperes.
    Current,
    "A"
);

quantity!(
    /// Membrane current density, stored in µA/cm² (Hodgkin–Huxley convention).
    CurrentDensity,
    "µA/cm²"
);

impl Time {
    pub const fn from_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    pub fn from_millis(millis: f64) -> Self {
        Self(millis * 1e-3)
    }

    pub const fn seconds(self) -> f64 {
        self.0
    }

    pub fn millis(self) -> f64 {
        self.0 * 1e3
    }

    /// Time after `steps` fixed steps of size `self`.
    ///
    /// Multiplying instead of accumulating keeps long runs free of
    /// summation drift.
    pub fn times(self, steps: u64) -> Self {
        Self(self.0 * steps as f64)
    }
}

impl Voltage {
    pub const fn from_volts(volts: f64) -> Self {
        Self(volts)
    }

    pub fn from_millivolts(millivolts: f64) -> Self {
        Self(millivolts * 1e-3)
    }

    pub const fn volts(self) -> f64 {
        self.0
    }

    pub fn millivolts(self) -> f64 {
        self.0 * 1e3
    }
}

impl Concentration {
    pub const fn from_molar(molar: f64) -> Self {
        Self(molar)
    }

    pub fn from_micromolar(micromolar: f64) -> Self {
        Self(micromolar * 1e-6)
    }

    pub fn from_nanomolar(nanomolar: f64) -> Self {
        Self(nanomolar * 1e-9)
    }

    pub const fn molar(self) -> f64 {
        self.0
    }

    pub fn micromolar(self) -> f64 {
        self.0 * 1e6
    }

    pub fn nanomolar(self) -> f64 {
        self.0 * 1e9
    }
}

impl Current {
    pub const fn from_amperes(amperes: f64) -> Self {
        Self(amperes)
    }

    pub fn from_nanoamperes(nanoamperes: f64) -> Self {
        Self(nanoamperes * 1e-9)
    }

    pub const fn amperes(self) -> f64 {
        self.0
    }

    pub fn nanoamperes(self) -> f64 {
        self.0 * 1e9
    }
}

impl CurrentDensity {
    pub const fn from_microamps_per_cm2(value: f64) -> Self {
        Self(value)
    }

    pub const fn microamps_per_cm2(self) -> f64 {
        self.0
    }
}
