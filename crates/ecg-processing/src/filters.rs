//! Per-sample digital filters
//!
//! The window filters read the shared sample window owned by the filter bank
//! and emit nothing until it is full. The exponential filter is recursive and
//! keeps its own last output.

use ecg_core::{RingBuffer, Sample};

/// Arithmetic mean of a full sample window
#[derive(Debug, Clone)]
pub struct MovingAverageFilter {
    window_size: usize,
}

impl MovingAverageFilter {
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    /// Mean of the last `window_size` samples, or `None` while the window fills
    pub fn apply(&self, window: &RingBuffer<Sample>) -> Option<f64> {
        if self.window_size == 0 || window.len() < self.window_size {
            return None;
        }

        let sum: i64 = window
            .iter_last(self.window_size)
            .map(|&sample| i64::from(sample))
            .sum();
        Some(sum as f64 / self.window_size as f64)
    }
}

/// Median of a full sample window
///
/// Sorting happens in a scratch buffer sized once at construction, so the
/// per-tick path does not allocate.
#[derive(Debug, Clone)]
pub struct MedianFilter {
    window_size: usize,
    scratch: Vec<Sample>,
}

impl MedianFilter {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            scratch: Vec::with_capacity(window_size),
        }
    }

    /// Middle element (index `window_size / 2`) of the sorted last window
    pub fn apply(&mut self, window: &RingBuffer<Sample>) -> Option<Sample> {
        if self.window_size == 0 || window.len() < self.window_size {
            return None;
        }

        self.scratch.clear();
        self.scratch.extend(window.iter_last(self.window_size).copied());
        self.scratch.sort_unstable();
        self.scratch.get(self.window_size / 2).copied()
    }
}

/// First-order IIR smoothing: `y[n] = alpha * x[n] + (1 - alpha) * y[n-1]`
///
/// The first input seeds the state, so the first output equals the first
/// input rather than `alpha * x[0]`.
#[derive(Debug, Clone)]
pub struct ExponentialFilter {
    alpha: f64,
    last_output: Option<f64>,
}

impl ExponentialFilter {
    pub const DEFAULT_ALPHA: f64 = 0.3;

    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            last_output: None,
        }
    }

    pub fn apply(&mut self, sample: Sample) -> f64 {
        let input = f64::from(sample);
        let output = match self.last_output {
            Some(previous) => self.alpha * input + (1.0 - self.alpha) * previous,
            None => input,
        };
        self.last_output = Some(output);
        output
    }

    pub fn reset(&mut self) {
        self.last_output = None;
    }
}

impl Default for ExponentialFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ALPHA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_of(samples: &[Sample]) -> RingBuffer<Sample> {
        let mut window = RingBuffer::new(5);
        for &sample in samples {
            window.append(sample);
        }
        window
    }

    #[test]
    fn test_moving_average() {
        let filter = MovingAverageFilter::new(5);
        assert_eq!(filter.apply(&window_of(&[10, 20, 30, 40])), None);
        assert_eq!(filter.apply(&window_of(&[10, 20, 30, 40, 50])), Some(30.0));
        // Fractional results are kept
        assert_eq!(filter.apply(&window_of(&[1, 2, 3, 4, 6])), Some(3.2));
    }

    #[test]
    fn test_moving_average_uses_last_window_only() {
        let filter = MovingAverageFilter::new(5);
        let mut window = RingBuffer::new(30);
        for sample in [1000, 1000, 10, 20, 30, 40, 50] {
            window.append(sample);
        }
        assert_eq!(filter.apply(&window), Some(30.0));
    }

    #[test]
    fn test_median() {
        let mut filter = MedianFilter::new(5);
        assert_eq!(filter.apply(&window_of(&[5, 1, 4, 2])), None);
        assert_eq!(filter.apply(&window_of(&[5, 1, 4, 2, 3])), Some(3));
        // An outlier spike does not move the median
        assert_eq!(filter.apply(&window_of(&[2000, 2010, 4095, 1990, 2005])), Some(2005));
    }

    #[test]
    fn test_median_leaves_window_untouched() {
        let mut filter = MedianFilter::new(5);
        let window = window_of(&[5, 1, 4, 2, 3]);
        filter.apply(&window);
        assert_eq!(window.to_vec(), vec![5, 1, 4, 2, 3]);
    }

    #[test]
    fn test_exponential_seeds_with_first_sample() {
        let mut filter = ExponentialFilter::default();
        assert_eq!(filter.apply(100), 100.0);
        let second = filter.apply(200);
        assert!((second - 130.0).abs() < 1e-9);
        let third = filter.apply(200);
        assert!((third - 151.0).abs() < 1e-9);
    }

    #[test]
    fn test_exponential_reset() {
        let mut filter = ExponentialFilter::new(0.5);
        filter.apply(10);
        filter.apply(20);
        filter.reset();
        assert_eq!(filter.apply(40), 40.0);
    }
}
