//! Sample sources: the analog front end as seen by the sampling task

use crate::waveform::EcgPattern;
use ecg_core::{config_error, EcgResult, Sample, SampleRate, ADC_MAX};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One ADC conversion per call.
///
/// `read` must return promptly; it runs inside the sampling tick. Sensor
/// faults are the source's own business, the pipeline trusts every value.
pub trait SampleSource: Send {
    fn read(&mut self) -> Sample;

    /// Called before sampling starts at a (new) rate
    fn on_rate_change(&mut self, _rate: SampleRate) {}

    /// Switch the generated waveform. Returns `false` for sources that only
    /// report what the hardware measures.
    fn set_pattern(&mut self, _pattern: EcgPattern) -> bool {
        false
    }

    fn name(&self) -> &str {
        "sensor"
    }
}

/// Source shared by the scheduler and the diagnostics routine
pub type SharedSource = Arc<Mutex<Box<dyn SampleSource>>>;

/// Wrap a source so the scheduler and diagnostics can share it
pub fn shared<S: SampleSource + 'static>(source: S) -> SharedSource {
    Arc::new(Mutex::new(Box::new(source)))
}

/// Configuration for ECG simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcgSimConfig {
    /// Heart rate of the generated rhythm
    pub heart_rate_bpm: f32,
    /// Resting ADC level (mid-scale for a 12-bit converter)
    pub baseline: f32,
    /// R-wave amplitude in ADC counts
    pub amplitude: f32,
    /// Gaussian noise standard deviation in ADC counts
    pub noise_std: f32,
    /// Mains interference amplitude in ADC counts
    pub powerline_amplitude: f32,
    /// Mains frequency (50/60Hz)
    pub powerline_freq: f32,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for EcgSimConfig {
    fn default() -> Self {
        Self {
            heart_rate_bpm: 72.0,
            baseline: 2048.0,
            amplitude: 800.0,
            noise_std: 12.0,
            powerline_amplitude: 6.0,
            powerline_freq: 50.0,
            seed: None,
        }
    }
}

/// Synthetic AD8232-style ECG front end
///
/// The simulated clock is the sample index at the current rate plus the time
/// accumulated under earlier rates, so it never stalls however long it runs.
pub struct SimulatedEcgSource {
    config: EcgSimConfig,
    pattern: EcgPattern,
    rng: rand::rngs::StdRng,
    noise: Normal<f32>,
    rate_hz: u32,
    index: u64,
    origin: f64,
}

impl SimulatedEcgSource {
    pub fn new(config: EcgSimConfig) -> EcgResult<Self> {
        if !(config.noise_std >= 0.0 && config.noise_std.is_finite()) {
            return Err(config_error!(
                "noise standard deviation must be finite and non-negative, got {}",
                config.noise_std
            ));
        }

        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let noise = Normal::new(0.0, config.noise_std)
            .map_err(|e| config_error!("Failed to create noise distribution: {}", e))?;

        Ok(SimulatedEcgSource {
            pattern: EcgPattern::Sinus {
                heart_rate_bpm: config.heart_rate_bpm,
            },
            rng: rand::rngs::StdRng::seed_from_u64(seed),
            noise,
            rate_hz: SampleRate::DEFAULT_HZ,
            index: 0,
            origin: 0.0,
            config,
        })
    }

    /// Seconds of simulated signal produced so far
    fn elapsed(&self) -> f64 {
        self.origin + self.index as f64 / f64::from(self.rate_hz)
    }
}

impl SampleSource for SimulatedEcgSource {
    fn read(&mut self) -> Sample {
        let time = self.elapsed();
        let mut value = self.config.baseline
            + self.config.amplitude * self.pattern.value_at_time(time);

        value += self.noise.sample(&mut self.rng);
        let hum_cycles = (f64::from(self.config.powerline_freq) * time).fract();
        value += self.config.powerline_amplitude
            * (std::f64::consts::TAU * hum_cycles).sin() as f32;

        self.index += 1;

        // 12-bit converter saturates at both rails
        (value.round() as Sample).clamp(0, ADC_MAX)
    }

    fn on_rate_change(&mut self, rate: SampleRate) {
        self.origin = self.elapsed();
        self.index = 0;
        self.rate_hz = rate.hz();
    }

    fn set_pattern(&mut self, pattern: EcgPattern) -> bool {
        self.pattern = pattern;
        true
    }

    fn name(&self) -> &str {
        "simulated AD8232"
    }
}

/// Replays a fixed sequence, wrapping around at the end
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    samples: Vec<Sample>,
    position: usize,
}

impl ScriptedSource {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples, position: 0 }
    }

    /// Samples handed out so far
    pub fn position(&self) -> usize {
        self.position
    }
}

impl SampleSource for ScriptedSource {
    fn read(&mut self) -> Sample {
        if self.samples.is_empty() {
            return 0;
        }
        let sample = self.samples[self.position % self.samples.len()];
        self.position += 1;
        sample
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecg_core::EcgError;

    fn seeded() -> SimulatedEcgSource {
        SimulatedEcgSource::new(EcgSimConfig {
            seed: Some(7),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_simulated_values_in_adc_range() {
        let mut source = seeded();
        source.on_rate_change(SampleRate::new(250).unwrap());

        let readings: Vec<Sample> = (0..2500).map(|_| source.read()).collect();
        assert!(readings.iter().all(|&r| (0..=ADC_MAX).contains(&r)));

        let max = *readings.iter().max().unwrap();
        let min = *readings.iter().min().unwrap();
        // R peaks stand well above the baseline
        assert!(max > 2600);
        assert!(max - min > 500);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mut a = seeded();
        let mut b = seeded();
        for _ in 0..100 {
            assert_eq!(a.read(), b.read());
        }
    }

    #[test]
    fn test_lead_off_saturates() {
        let mut source = seeded();
        assert!(source.set_pattern(EcgPattern::LeadOff { rail: 5.0 }));
        assert_eq!(source.read(), ADC_MAX);

        source.set_pattern(EcgPattern::Flatline { level: -5.0 });
        assert_eq!(source.read(), 0);
    }

    #[test]
    fn test_invalid_noise_rejected() {
        let config = EcgSimConfig {
            noise_std: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            SimulatedEcgSource::new(config),
            Err(EcgError::InvalidConfig { .. })
        ));

        let config = EcgSimConfig {
            noise_std: f32::NAN,
            ..Default::default()
        };
        assert!(SimulatedEcgSource::new(config).is_err());
    }

    fn quiet() -> SimulatedEcgSource {
        SimulatedEcgSource::new(EcgSimConfig {
            noise_std: 0.0,
            powerline_amplitude: 0.0,
            seed: Some(1),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_clock_keeps_running_on_long_runs() {
        let mut source = quiet();
        source.on_rate_change(SampleRate::new(500).unwrap());
        // Roughly a day of sampling at 500 Hz
        source.index = 43_200_000;
        let before = source.elapsed();

        let readings: Vec<Sample> = (0..2000).map(|_| source.read()).collect();
        assert!((source.elapsed() - before - 4.0).abs() < 1e-6);

        let max = *readings.iter().max().unwrap();
        let min = *readings.iter().min().unwrap();
        assert!(max - min > 500, "signal went flat: range {}", max - min);
    }

    #[test]
    fn test_rate_change_keeps_clock_continuous() {
        let mut source = quiet();
        source.on_rate_change(SampleRate::new(100).unwrap());
        for _ in 0..150 {
            source.read();
        }
        assert!((source.elapsed() - 1.5).abs() < 1e-9);

        source.on_rate_change(SampleRate::new(500).unwrap());
        assert!((source.elapsed() - 1.5).abs() < 1e-9);
        for _ in 0..250 {
            source.read();
        }
        assert!((source.elapsed() - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_pattern_switch_through_shared_source() {
        let source = shared(quiet());
        assert!(source.lock().await.set_pattern(EcgPattern::Flatline { level: 0.0 }));
        assert_eq!(source.lock().await.read(), 2048);

        let scripted = shared(ScriptedSource::new(vec![7]));
        assert!(!scripted.lock().await.set_pattern(EcgPattern::Flatline { level: 0.0 }));
        assert_eq!(scripted.lock().await.read(), 7);
    }

    #[test]
    fn test_scripted_source_wraps() {
        let mut source = ScriptedSource::new(vec![1, 2, 3]);
        let readings: Vec<Sample> = (0..5).map(|_| source.read()).collect();
        assert_eq!(readings, vec![1, 2, 3, 1, 2]);
        assert_eq!(source.position(), 5);

        let mut empty = ScriptedSource::new(Vec::new());
        assert_eq!(empty.read(), 0);
    }
}
