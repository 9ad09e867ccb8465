//! Summary statistics over the output streams

use crate::pipeline::AcquisitionPipeline;
use ecg_core::{FilterActivation, RingBuffer, Sample, SampleRate};
use serde::{Deserialize, Serialize};

/// Count, extremes and latest value of one stream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary<T> {
    pub count: usize,
    pub min: Option<T>,
    pub max: Option<T>,
    pub latest: Option<T>,
}

impl<T: Copy + PartialOrd> StreamSummary<T> {
    pub fn from_buffer(buffer: &RingBuffer<T>) -> Self {
        let mut summary = StreamSummary {
            count: buffer.len(),
            min: None,
            max: None,
            latest: buffer.last().copied(),
        };

        for &value in buffer {
            if summary.min.map_or(true, |min| value < min) {
                summary.min = Some(value);
            }
            if summary.max.map_or(true, |max| value > max) {
                summary.max = Some(value);
            }
        }

        summary
    }
}

/// Snapshot of everything the statistics view reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionStats {
    pub sample_rate: SampleRate,
    pub raw: StreamSummary<Sample>,
    pub average: StreamSummary<f64>,
    pub median: StreamSummary<Sample>,
    pub exponential: StreamSummary<f64>,
    pub activation: FilterActivation,
}

impl AcquisitionStats {
    pub fn collect(pipeline: &AcquisitionPipeline, sample_rate: SampleRate) -> Self {
        let bank = pipeline.bank();
        Self {
            sample_rate,
            raw: StreamSummary::from_buffer(bank.raw()),
            average: StreamSummary::from_buffer(bank.average()),
            median: StreamSummary::from_buffer(bank.median()),
            exponential: StreamSummary::from_buffer(bank.exponential()),
            activation: pipeline.activation(),
        }
    }

    /// Spread of the raw stream (max - min)
    pub fn variability(&self) -> Option<Sample> {
        match (self.raw.min, self.raw.max) {
            (Some(min), Some(max)) => Some(max - min),
            _ => None,
        }
    }
}
