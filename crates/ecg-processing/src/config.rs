//! Configuration management for ECG acquisition

use crate::activity::ActivityConfig;
use crate::filter_bank::FilterBankConfig;
use crate::pipeline::AcquisitionPipeline;
use crate::plotter::DEFAULT_LINE_LIMIT;
use ecg_core::{config_error, EcgError, EcgResult, FilterActivation, SampleRate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Complete acquisition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Sampling rate (10-500 Hz)
    pub sample_rate: SampleRate,
    /// Filter bank sizes and coefficients
    pub filters: FilterBankConfig,
    /// Activity indicator thresholds
    pub activity: ActivityConfig,
    /// Streams enabled at startup
    pub activation: FilterActivation,
    /// Directory receiving export files
    pub export_dir: PathBuf,
    /// Maximum lines shown by the plotter view
    pub plotter_limit: usize,
    /// Pause between diagnostic readings (ms)
    pub diagnostic_interval_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::default(),
            filters: FilterBankConfig::default(),
            activity: ActivityConfig::default(),
            activation: FilterActivation::all_on(),
            export_dir: PathBuf::from("."),
            plotter_limit: DEFAULT_LINE_LIMIT,
            diagnostic_interval_ms: 300,
        }
    }
}

impl AcquisitionConfig {
    /// Validate entire configuration
    pub fn validate(&self) -> EcgResult<()> {
        self.filters.validate()?;

        if self.activity.threshold < 0 {
            return Err(config_error!(
                "activity threshold must not be negative, got {}",
                self.activity.threshold
            ));
        }

        if self.plotter_limit == 0 {
            return Err(config_error!("plotter limit must be greater than 0"));
        }

        Ok(())
    }

    /// Replace the sample rate; an invalid rate leaves the current one active
    pub fn set_sample_rate(&mut self, hz: u32) -> EcgResult<SampleRate> {
        let rate = SampleRate::new(hz)?;
        self.sample_rate = rate;
        Ok(rate)
    }

    /// Fresh pipeline with empty buffers built from this configuration
    pub fn build_pipeline(&self) -> AcquisitionPipeline {
        AcquisitionPipeline::new(self.filters.clone(), self.activity.clone(), self.activation)
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> EcgResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EcgError::Serialization {
            reason: format!("Failed to serialize configuration: {}", e),
        })
    }

    /// Import and validate configuration from JSON
    pub fn from_json(json: &str) -> EcgResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| EcgError::Serialization {
            reason: format!("Failed to deserialize configuration: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> EcgResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| EcgError::Io {
            reason: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let config = Self::from_json(&json)?;
        info!(path = %path.display(), rate = %config.sample_rate, "Configuration loaded");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> EcgResult<()> {
        std::fs::write(path, self.to_json()?).map_err(|e| EcgError::Io {
            reason: format!("Failed to write {}: {}", path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AcquisitionConfig::default();
        assert_eq!(config.sample_rate.hz(), 100);
        assert_eq!(config.filters.history_capacity, 500);
        assert_eq!(config.filters.window_size, 5);
        assert_eq!(config.activity.threshold, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejected_rate_keeps_previous() {
        let mut config = AcquisitionConfig::default();
        assert!(config.set_sample_rate(250).is_ok());

        let result = config.set_sample_rate(1000);
        assert!(matches!(result, Err(EcgError::InvalidSampleRate { rate: 1000, .. })));
        assert_eq!(config.sample_rate.hz(), 250);
    }

    #[test]
    fn test_config_validation() {
        let mut config = AcquisitionConfig::default();
        config.plotter_limit = 0;
        assert!(config.validate().is_err());

        config.plotter_limit = 10;
        config.filters.window_size = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_serialization() {
        let mut config = AcquisitionConfig::default();
        config.set_sample_rate(200).unwrap();
        config.activation = FilterActivation::raw_only();

        let json = config.to_json().unwrap();
        let restored = AcquisitionConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AcquisitionConfig::from_json(r#"{ "sample_rate": 50 }"#).unwrap();
        assert_eq!(config.sample_rate.hz(), 50);
        assert_eq!(config.filters, FilterBankConfig::default());
    }

    #[test]
    fn test_json_rate_out_of_range() {
        let result = AcquisitionConfig::from_json(r#"{ "sample_rate": 5 }"#);
        assert!(matches!(result, Err(EcgError::Serialization { .. })));
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecg.json");

        let config = AcquisitionConfig::default();
        config.save(&path).unwrap();
        assert_eq!(AcquisitionConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_build_pipeline_uses_activation() {
        let mut config = AcquisitionConfig::default();
        config.activation = FilterActivation::all_off();
        let pipeline = config.build_pipeline();
        assert_eq!(pipeline.activation(), FilterActivation::all_off());
        assert_eq!(pipeline.bank().raw().capacity(), 500);
    }
}
