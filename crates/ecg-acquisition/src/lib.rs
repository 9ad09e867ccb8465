//! ECG-Acquisition: Sensor sources and the periodic sampling trigger
//!
//! Provides the sample-source abstraction with a simulated ECG front end and
//! the scheduler that drives the processing pipeline at the configured rate.

pub mod diagnostics;
pub mod scheduler;
pub mod source;
pub mod waveform;

pub use diagnostics::diagnose;
pub use scheduler::{SampleScheduler, SchedulerState};
pub use source::{EcgSimConfig, SampleSource, ScriptedSource, SharedSource, SimulatedEcgSource};
pub use waveform::EcgPattern;
