//! Pre-defined ECG waveform patterns for simulation

use std::f64::consts::TAU;

/// Gaussian PQRST components: (centre phase, width, relative amplitude)
const PQRST: [(f32, f32, f32); 5] = [
    (0.20, 0.025, 0.15),  // P
    (0.37, 0.010, -0.12), // Q
    (0.40, 0.012, 1.00),  // R
    (0.43, 0.010, -0.25), // S
    (0.65, 0.045, 0.30),  // T
];

/// Simulated ECG signal shapes, in units of full R-wave amplitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EcgPattern {
    /// Normal sinus rhythm
    Sinus { heart_rate_bpm: f32 },
    /// Sinus rhythm with slow respiratory baseline wander
    Breathing {
        heart_rate_bpm: f32,
        respiration_rate_bpm: f32,
        wander: f32,
    },
    /// No cardiac activity, constant level
    Flatline { level: f32 },
    /// Electrode detached: input pinned to a rail
    LeadOff { rail: f32 },
}

impl EcgPattern {
    /// Signal value at `time` seconds, relative to the baseline.
    ///
    /// Phases are reduced in `f64` before narrowing, so the shape holds for
    /// arbitrarily long runs.
    pub fn value_at_time(&self, time: f64) -> f32 {
        match self {
            EcgPattern::Sinus { heart_rate_bpm } => beat(time, *heart_rate_bpm),

            EcgPattern::Breathing { heart_rate_bpm, respiration_rate_bpm, wander } => {
                let cycles = f64::from(*respiration_rate_bpm) / 60.0 * time;
                let breath = wander * (TAU * cycles.fract()).sin() as f32;
                beat(time, *heart_rate_bpm) + breath
            },

            EcgPattern::Flatline { level } => *level,

            EcgPattern::LeadOff { rail } => *rail,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EcgPattern::Sinus { .. } => "Normal sinus rhythm",
            EcgPattern::Breathing { .. } => "Sinus rhythm with baseline wander",
            EcgPattern::Flatline { .. } => "Flatline",
            EcgPattern::LeadOff { .. } => "Lead off",
        }
    }

    /// Common preset patterns
    pub fn presets() -> Vec<(&'static str, EcgPattern)> {
        vec![
            ("Rest", EcgPattern::Sinus { heart_rate_bpm: 60.0 }),
            ("Normal", EcgPattern::Sinus { heart_rate_bpm: 72.0 }),
            ("Exercise", EcgPattern::Sinus { heart_rate_bpm: 140.0 }),
            ("Breathing", EcgPattern::Breathing {
                heart_rate_bpm: 72.0, respiration_rate_bpm: 15.0, wander: 0.1
            }),
            ("Disconnected", EcgPattern::Flatline { level: -2.5 }),
            ("Lead Off", EcgPattern::LeadOff { rail: 2.5 }),
        ]
    }
}

/// One cardiac cycle repeated at `heart_rate_bpm`
fn beat(time: f64, heart_rate_bpm: f32) -> f32 {
    if heart_rate_bpm <= 0.0 {
        return 0.0;
    }
    let phase = (f64::from(heart_rate_bpm) / 60.0 * time).fract() as f32;

    PQRST
        .iter()
        .map(|&(centre, width, amplitude)| {
            let d = (phase - centre) / width;
            amplitude * (-0.5 * d * d).exp()
        })
        .sum()
}
