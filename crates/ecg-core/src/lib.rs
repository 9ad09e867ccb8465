//! ECG-Core: Foundation types for single-channel ECG acquisition
//!
//! Sample and rate types, filter activation flags, the bounded ring buffer
//! shared by every output stream, and the framework error type.

pub mod error;
pub mod ring_buffer;
pub mod sample;

pub use error::{EcgError, EcgResult};
pub use ring_buffer::RingBuffer;
pub use sample::*;
