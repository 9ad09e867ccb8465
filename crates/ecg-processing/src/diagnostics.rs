//! Sensor diagnosis from a short burst of readings

use ecg_core::{EcgError, EcgResult, Sample};
use serde::{Deserialize, Serialize};

/// Readings taken by a diagnosis run
pub const DIAGNOSTIC_READINGS: usize = 10;

/// Range below which the signal is reported as flat
pub const FLAT_SIGNAL_RANGE: Sample = 50;

/// Classification of the mean reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalLevel {
    /// Mean below 800: supply or electrodes likely disconnected
    VeryLow,
    /// Mean below 1500: weak contact or unpowered sensor
    Low,
    /// Mean within the expected band
    Normal,
    /// Mean above 3000: probable saturation
    Saturated,
}

impl SignalLevel {
    pub fn classify(mean: f64) -> Self {
        if mean < 800.0 {
            SignalLevel::VeryLow
        } else if mean < 1500.0 {
            SignalLevel::Low
        } else if mean > 3000.0 {
            SignalLevel::Saturated
        } else {
            SignalLevel::Normal
        }
    }

    /// Suggested checks for the operator
    pub fn advice(&self) -> &'static [&'static str] {
        match self {
            SignalLevel::VeryLow => &[
                "Check the 3.3V and GND connections",
                "Check that the electrodes are attached",
                "Check the sensor wiring",
            ],
            SignalLevel::Low => &[
                "Electrode contact may be poor",
                "Check that the sensor is powered",
            ],
            SignalLevel::Saturated => &[
                "Check that the sensor is fed from 3.3V, not 5V",
                "Electrodes may be making poor contact",
            ],
            SignalLevel::Normal => &[],
        }
    }
}

/// Result of a diagnosis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDiagnosis {
    pub readings: Vec<Sample>,
    pub min: Sample,
    pub max: Sample,
    pub mean: f64,
    pub level: SignalLevel,
}

impl SensorDiagnosis {
    pub fn from_readings(readings: Vec<Sample>) -> EcgResult<Self> {
        let (min, max) = match (readings.iter().min(), readings.iter().max()) {
            (Some(&min), Some(&max)) => (min, max),
            _ => return Err(EcgError::EmptyData { operation: "diagnosis" }),
        };

        let sum: i64 = readings.iter().map(|&r| i64::from(r)).sum();
        let mean = sum as f64 / readings.len() as f64;

        Ok(Self {
            level: SignalLevel::classify(mean),
            readings,
            min,
            max,
            mean,
        })
    }

    pub fn range(&self) -> Sample {
        self.max - self.min
    }

    /// Too little variation to be a connected ECG
    pub fn is_flat(&self) -> bool {
        self.range() < FLAT_SIGNAL_RANGE
    }
}
