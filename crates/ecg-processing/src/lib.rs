//! ECG-Processing: Multi-filter sampling pipeline for a single ECG stream
//!
//! Per-sample moving average, median and exponential filters applied in
//! lock-step, the activity indicator, and the read-only views consumed by
//! statistics, export and the plotter display.

pub mod activity;
pub mod config;
pub mod diagnostics;
pub mod export;
pub mod filter_bank;
pub mod filters;
pub mod pipeline;
pub mod plotter;
pub mod stats;

pub use activity::{ActivityConfig, ActivityIndicator, ActivityOutput, SharedActivity};
pub use config::AcquisitionConfig;
pub use diagnostics::{SensorDiagnosis, SignalLevel};
pub use export::{ExportReport, ExportRow};
pub use filter_bank::{FilterBank, FilterBankConfig, FilterSnapshot, TickOutput};
pub use filters::{ExponentialFilter, MedianFilter, MovingAverageFilter};
pub use pipeline::{AcquisitionPipeline, SharedPipeline};
pub use stats::{AcquisitionStats, StreamSummary};
