//! Activity indicator driven by sample-to-sample change

use ecg_core::{RingBuffer, Sample};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Indicator thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Absolute change between the last two raw samples that lights the indicator
    pub threshold: Sample,
    /// Raw samples required before the indicator can turn on
    pub min_history: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            threshold: 50,
            min_history: 11,
        }
    }
}

/// Pure evaluation of the raw stream's last two samples
#[derive(Debug, Clone, Default)]
pub struct ActivityIndicator {
    config: ActivityConfig,
}

impl ActivityIndicator {
    pub fn new(config: ActivityConfig) -> Self {
        Self { config }
    }

    /// On iff the buffer holds at least `min_history` samples and the last
    /// step exceeds the threshold.
    pub fn evaluate(&self, raw: &RingBuffer<Sample>) -> bool {
        if raw.len() < self.config.min_history.max(2) {
            return false;
        }

        let mut recent = raw.iter().rev();
        match (recent.next(), recent.next()) {
            (Some(&last), Some(&previous)) => {
                (i64::from(last) - i64::from(previous)).abs() > i64::from(self.config.threshold)
            }
            _ => false,
        }
    }
}

/// Physical (or virtual) output driven by the indicator
pub trait ActivityOutput: Send + Sync {
    fn set_active(&self, active: bool);
}

/// Indicator output stored in a shared flag, readable from any task
#[derive(Debug, Clone, Default)]
pub struct SharedActivity {
    state: Arc<AtomicBool>,
}

impl SharedActivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire)
    }
}

impl ActivityOutput for SharedActivity {
    fn set_active(&self, active: bool) {
        self.state.store(active, Ordering::Release);
    }
}
