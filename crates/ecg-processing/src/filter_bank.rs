//! Filter bank: one raw sample in, up to four stream values out

use crate::filters::{ExponentialFilter, MedianFilter, MovingAverageFilter};
use ecg_core::{config_error, EcgResult, FilterActivation, RingBuffer, Sample};
use serde::{Deserialize, Serialize};

/// Sizes and coefficients of the filter bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterBankConfig {
    /// Capacity of each output stream
    pub history_capacity: usize,
    /// Samples feeding the moving average and median
    pub window_size: usize,
    /// Exponential smoothing factor
    pub alpha: f64,
}

impl FilterBankConfig {
    pub fn validate(&self) -> EcgResult<()> {
        if self.history_capacity == 0 {
            return Err(config_error!("history capacity must be greater than 0"));
        }
        if self.window_size == 0 || self.window_size % 2 == 0 {
            return Err(config_error!(
                "window size must be odd and non-zero, got {}",
                self.window_size
            ));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(config_error!("alpha must be in (0, 1], got {}", self.alpha));
        }
        Ok(())
    }
}

impl Default for FilterBankConfig {
    fn default() -> Self {
        Self {
            history_capacity: 500,
            window_size: 5,
            alpha: ExponentialFilter::DEFAULT_ALPHA,
        }
    }
}

/// Values emitted by one tick; `None` means nothing was appended to that stream
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutput {
    pub raw: Option<Sample>,
    pub average: Option<f64>,
    pub median: Option<Sample>,
    pub exponential: Option<f64>,
}

/// Owned copy of the four output streams, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSnapshot {
    pub raw: Vec<Sample>,
    pub average: Vec<f64>,
    pub median: Vec<Sample>,
    pub exponential: Vec<f64>,
}

impl FilterSnapshot {
    /// Length of the shortest stream, i.e. the number of aligned rows
    pub fn aligned_len(&self) -> usize {
        self.raw
            .len()
            .min(self.average.len())
            .min(self.median.len())
            .min(self.exponential.len())
    }
}

/// Filter state: the four bounded output streams, the sample window and the
/// recursive filter's memory.
///
/// Only [`FilterBank::process`] mutates it; everything else reads.
#[derive(Debug, Clone)]
pub struct FilterBank {
    raw: RingBuffer<Sample>,
    average: RingBuffer<f64>,
    median: RingBuffer<Sample>,
    exponential: RingBuffer<f64>,
    window: RingBuffer<Sample>,
    average_filter: MovingAverageFilter,
    median_filter: MedianFilter,
    exponential_filter: ExponentialFilter,
}

impl FilterBank {
    pub fn new(config: FilterBankConfig) -> Self {
        let capacity = config.history_capacity;
        FilterBank {
            raw: RingBuffer::new(capacity),
            average: RingBuffer::new(capacity),
            median: RingBuffer::new(capacity),
            exponential: RingBuffer::new(capacity),
            window: RingBuffer::new(config.window_size),
            average_filter: MovingAverageFilter::new(config.window_size),
            median_filter: MedianFilter::new(config.window_size),
            exponential_filter: ExponentialFilter::new(config.alpha),
        }
    }

    /// Run one tick.
    ///
    /// Order is fixed: raw stream, window update, average, median, exponential.
    /// The window is maintained whether or not any filter is enabled, so a
    /// re-enabled window filter resumes immediately. Bounded work, no I/O and
    /// no allocation.
    pub fn process(&mut self, raw: Sample, activation: FilterActivation) -> TickOutput {
        let mut output = TickOutput::default();

        if activation.raw {
            self.raw.append(raw);
            output.raw = Some(raw);
        }

        self.window.append(raw);

        if activation.moving_average {
            if let Some(mean) = self.average_filter.apply(&self.window) {
                self.average.append(mean);
                output.average = Some(mean);
            }
        }

        if activation.median {
            if let Some(median) = self.median_filter.apply(&self.window) {
                self.median.append(median);
                output.median = Some(median);
            }
        }

        if activation.exponential {
            let smoothed = self.exponential_filter.apply(raw);
            self.exponential.append(smoothed);
            output.exponential = Some(smoothed);
        }

        output
    }

    pub fn raw(&self) -> &RingBuffer<Sample> {
        &self.raw
    }

    pub fn average(&self) -> &RingBuffer<f64> {
        &self.average
    }

    pub fn median(&self) -> &RingBuffer<Sample> {
        &self.median
    }

    pub fn exponential(&self) -> &RingBuffer<f64> {
        &self.exponential
    }

    pub fn window(&self) -> &RingBuffer<Sample> {
        &self.window
    }

    /// Copy the output streams for a foreground reader
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            raw: self.raw.to_vec(),
            average: self.average.to_vec(),
            median: self.median.to_vec(),
            exponential: self.exponential.to_vec(),
        }
    }

    /// Empty every buffer and forget the exponential seed
    pub fn reset(&mut self) {
        self.raw.clear();
        self.average.clear();
        self.median.clear();
        self.exponential.clear();
        self.window.clear();
        self.exponential_filter.reset();
    }
}

impl Default for FilterBank {
    fn default() -> Self {
        Self::new(FilterBankConfig::default())
    }
}
