//! Acquisition pipeline: filter bank, activation flags and activity indicator
//! behind a single owner
//!
//! The scheduler's tick handler is the only writer of the filter state. It
//! holds the shared lock for a whole tick, so foreground readers always see
//! complete ticks and activation changes take effect on the next tick.

use crate::activity::{ActivityConfig, ActivityIndicator};
use crate::filter_bank::{FilterBank, FilterBankConfig, TickOutput};
use ecg_core::{FilterActivation, FilterKind, Sample};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Pipeline shared between the sampling task and foreground readers
pub type SharedPipeline = Arc<Mutex<AcquisitionPipeline>>;

#[derive(Debug, Clone)]
pub struct AcquisitionPipeline {
    bank: FilterBank,
    activation: FilterActivation,
    indicator: ActivityIndicator,
    active: bool,
}

impl AcquisitionPipeline {
    pub fn new(
        filters: FilterBankConfig,
        activity: ActivityConfig,
        activation: FilterActivation,
    ) -> Self {
        Self {
            bank: FilterBank::new(filters),
            activation,
            indicator: ActivityIndicator::new(activity),
            active: false,
        }
    }

    /// Wrap in the lock shared with the scheduler
    pub fn shared(self) -> SharedPipeline {
        Arc::new(Mutex::new(self))
    }

    /// Process one sample, then re-evaluate the indicator on the raw stream
    pub fn tick(&mut self, raw: Sample) -> TickOutput {
        let output = self.bank.process(raw, self.activation);
        self.active = self.indicator.evaluate(self.bank.raw());
        output
    }

    pub fn bank(&self) -> &FilterBank {
        &self.bank
    }

    pub fn activation(&self) -> FilterActivation {
        self.activation
    }

    pub fn set_activation(&mut self, activation: FilterActivation) {
        self.activation = activation;
    }

    pub fn toggle(&mut self, kind: FilterKind) -> bool {
        self.activation.toggle(kind)
    }

    /// Indicator state after the most recent tick
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reset(&mut self) {
        self.bank.reset();
        self.active = false;
    }
}

impl Default for AcquisitionPipeline {
    fn default() -> Self {
        Self::new(
            FilterBankConfig::default(),
            ActivityConfig::default(),
            FilterActivation::default(),
        )
    }
}
