//! Sample, sample-rate and filter-activation types

use crate::error::{EcgError, EcgResult};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One ADC reading. Nominally 0-4095 for a 12-bit converter, but values are
/// trusted and never range-checked.
pub type Sample = i32;

/// Full-scale value of the 12-bit ADC
pub const ADC_MAX: Sample = 4095;

/// Acquisition rate in Hz, guaranteed to lie in [`SampleRate::MIN_HZ`, `SampleRate::MAX_HZ`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SampleRate(u32);

impl SampleRate {
    pub const MIN_HZ: u32 = 10;
    pub const MAX_HZ: u32 = 500;
    pub const DEFAULT_HZ: u32 = 100;

    /// Validate a requested rate
    pub fn new(hz: u32) -> EcgResult<Self> {
        if (Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Ok(Self(hz))
        } else {
            Err(EcgError::InvalidSampleRate {
                rate: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        }
    }

    #[inline]
    pub const fn hz(&self) -> u32 {
        self.0
    }

    /// Timer period: whole milliseconds, truncated toward zero
    #[inline]
    pub fn period(&self) -> Duration {
        period_for(self.0)
    }
}

/// Period for an arbitrary rate, truncated to whole milliseconds.
///
/// No bounds check is performed; a zero rate maps to a zero period.
pub fn period_for(hz: u32) -> Duration {
    match hz {
        0 => Duration::ZERO,
        hz => Duration::from_millis(u64::from(1000 / hz)),
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self(Self::DEFAULT_HZ)
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = EcgError;

    fn try_from(hz: u32) -> EcgResult<Self> {
        Self::new(hz)
    }
}

impl From<SampleRate> for u32 {
    fn from(rate: SampleRate) -> Self {
        rate.0
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// The four output streams of the filter bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// Unfiltered samples
    Raw,
    /// Arithmetic mean of the sample window
    MovingAverage,
    /// Middle element of the sorted sample window
    Median,
    /// First-order IIR smoothing
    Exponential,
}

impl FilterKind {
    /// All kinds in processing (and column) order
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Raw,
        FilterKind::MovingAverage,
        FilterKind::Median,
        FilterKind::Exponential,
    ];

    /// Column title used by the export file and the plotter view
    pub fn column_name(&self) -> &'static str {
        match self {
            FilterKind::Raw => "Crudo",
            FilterKind::MovingAverage => "Promedio",
            FilterKind::Median => "Mediana",
            FilterKind::Exponential => "Exponencial",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FilterKind::Raw => "Raw signal",
            FilterKind::MovingAverage => "Moving average",
            FilterKind::Median => "Median",
            FilterKind::Exponential => "Exponential (IIR)",
        }
    }
}

/// Per-stream enable flags, read by the filter bank on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterActivation {
    pub raw: bool,
    pub moving_average: bool,
    pub median: bool,
    pub exponential: bool,
}

impl FilterActivation {
    pub const fn all_on() -> Self {
        Self {
            raw: true,
            moving_average: true,
            median: true,
            exponential: true,
        }
    }

    pub const fn all_off() -> Self {
        Self {
            raw: false,
            moving_average: false,
            median: false,
            exponential: false,
        }
    }

    pub const fn raw_only() -> Self {
        Self {
            raw: true,
            ..Self::all_off()
        }
    }

    pub fn is_enabled(&self, kind: FilterKind) -> bool {
        match kind {
            FilterKind::Raw => self.raw,
            FilterKind::MovingAverage => self.moving_average,
            FilterKind::Median => self.median,
            FilterKind::Exponential => self.exponential,
        }
    }

    pub fn set(&mut self, kind: FilterKind, enabled: bool) {
        match kind {
            FilterKind::Raw => self.raw = enabled,
            FilterKind::MovingAverage => self.moving_average = enabled,
            FilterKind::Median => self.median = enabled,
            FilterKind::Exponential => self.exponential = enabled,
        }
    }

    /// Flip one flag, returning the new state
    pub fn toggle(&mut self, kind: FilterKind) -> bool {
        let enabled = !self.is_enabled(kind);
        self.set(kind, enabled);
        enabled
    }

    /// Enabled kinds in column order
    pub fn enabled_kinds(&self) -> impl Iterator<Item = FilterKind> + '_ {
        FilterKind::ALL.into_iter().filter(move |kind| self.is_enabled(*kind))
    }
}

impl Default for FilterActivation {
    fn default() -> Self {
        Self::all_on()
    }
}
