//! Batch statistics for the sampling cycle
//!
//! A cycle collects a fixed number of measurement attempts into a
//! [`SampleBatch`]; invalid attempts are counted but never enter the
//! statistics. The batch yields a median once the valid-sample quorum is
//! met. An optional [`TrailingAverage`] smooths consecutive cycle medians
//! and withholds output until its window has filled.

use core::cmp::Ordering;

use defmt::Format;
use heapless::Vec;

use crate::sensor::driver::RawSample;

/// Capacity of the per-cycle sample batch (upper bound for the configured
/// sample count)
pub const MAX_SAMPLES_PER_CYCLE: usize = 15;

/// Capacity of the trailing smoothing window (upper bound for the configured
/// window size)
pub const MAX_SMOOTHING_WINDOW: usize = 16;

/// Valid distances collected during one cycle, plus bookkeeping on the
/// attempts that produced nothing
pub struct SampleBatch {
    valid: Vec<f64, MAX_SAMPLES_PER_CYCLE>,
    attempted: usize,
    timeouts: usize,
    out_of_band: usize,
}

impl SampleBatch {
    pub const fn new() -> Self {
        Self {
            valid: Vec::new(),
            attempted: 0,
            timeouts: 0,
            out_of_band: 0,
        }
    }

    /// Folds one measurement attempt into the batch.
    pub fn record(&mut self, sample: RawSample) {
        self.attempted += 1;
        match sample {
            // batch capacity is enforced against the sample count at config
            // validation, so the push cannot overflow
            RawSample::Distance(cm) => {
                let _ = self.valid.push(cm);
            }
            RawSample::EchoStartTimeout | RawSample::EchoEndTimeout => self.timeouts += 1,
            RawSample::PulseOutOfBand(_) => self.out_of_band += 1,
        }
    }

    pub fn valid_count(&self) -> usize {
        self.valid.len()
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn timeouts(&self) -> usize {
        self.timeouts
    }

    pub fn out_of_band(&self) -> usize {
        self.out_of_band
    }

    pub fn meets_quorum(&self, quorum: usize) -> bool {
        self.valid.len() >= quorum
    }

    /// Statistical median of the valid samples: middle element for odd
    /// counts, average of the two middle elements for even counts.
    pub fn median(&self) -> Option<f64> {
        if self.valid.is_empty() {
            return None;
        }
        let mut sorted = self.valid.clone();
        sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            Some(sorted[mid])
        } else {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        }
    }
}

/// Fixed-capacity trailing window over cycle medians.
///
/// Emits nothing until `size` values have been pushed; from then on every
/// push evicts the oldest entry and yields the arithmetic mean of the
/// current window contents.
pub struct TrailingAverage {
    window: Vec<f64, MAX_SMOOTHING_WINDOW>,
    next: usize,
    size: usize,
}

impl TrailingAverage {
    /// `size` must be in `1..=MAX_SMOOTHING_WINDOW` (checked at config
    /// validation).
    pub fn new(size: usize) -> Self {
        Self {
            window: Vec::new(),
            next: 0,
            size,
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Pushes one value; returns the window mean once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.window.len() < self.size {
            let _ = self.window.push(value);
        } else {
            self.window[self.next] = value;
        }
        self.next = (self.next + 1) % self.size;

        if self.window.len() < self.size {
            return None;
        }
        let sum: f64 = self.window.iter().sum();
        Some(sum / self.size as f64)
    }
}

/// Why a cycle produced no published reading
#[derive(Debug, Clone, Copy, Format)]
pub enum DiscardReason {
    /// Too few valid samples to trust a median
    QuorumShort { valid: usize, required: usize },
    /// Smoothing window has not accumulated enough medians yet
    WindowFilling { have: usize, need: usize },
    /// Effective reading fell outside the tolerance-widened plausible range
    OutOfRange { distance_cm: f64 },
    /// Cycle abandoned by a pause request
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_time::Duration;

    fn close(a: f64, b: f64) -> bool {
        libm::fabs(a - b) < 1e-9
    }

    fn batch_of(values: &[f64]) -> SampleBatch {
        let mut batch = SampleBatch::new();
        for &v in values {
            batch.record(RawSample::Distance(v));
        }
        batch
    }

    #[test]
    fn median_of_odd_count_is_middle_element() {
        let batch = batch_of(&[30.0, 10.0, 20.0]);
        assert!(close(batch.median().unwrap(), 20.0));
    }

    #[test]
    fn median_of_even_count_averages_the_middle_pair() {
        let batch = batch_of(&[40.0, 10.0, 20.0, 30.0]);
        assert!(close(batch.median().unwrap(), 25.0));
    }

    #[test]
    fn median_of_empty_batch_is_none() {
        assert!(SampleBatch::new().median().is_none());
    }

    #[test]
    fn invalid_samples_are_counted_but_not_collected() {
        let mut batch = SampleBatch::new();
        batch.record(RawSample::Distance(42.0));
        batch.record(RawSample::EchoStartTimeout);
        batch.record(RawSample::EchoEndTimeout);
        batch.record(RawSample::PulseOutOfBand(Duration::from_micros(20)));
        assert_eq!(batch.attempted(), 4);
        assert_eq!(batch.valid_count(), 1);
        assert_eq!(batch.timeouts(), 2);
        assert_eq!(batch.out_of_band(), 1);
        assert!(close(batch.median().unwrap(), 42.0));
    }

    #[test]
    fn quorum_counts_only_valid_samples() {
        let mut batch = batch_of(&[42.0, 43.5]);
        for _ in 0..5 {
            batch.record(RawSample::EchoStartTimeout);
        }
        assert!(!batch.meets_quorum(3));
        batch.record(RawSample::Distance(41.0));
        assert!(batch.meets_quorum(3));
    }

    #[test]
    fn three_valid_of_seven_yields_their_median() {
        // 42.0 / 43.5 / 41.0 valid, the other four attempts timed out
        let mut batch = batch_of(&[42.0, 43.5, 41.0]);
        for _ in 0..4 {
            batch.record(RawSample::EchoEndTimeout);
        }
        assert!(batch.meets_quorum(3));
        assert!(close(batch.median().unwrap(), 42.0));
    }

    #[test]
    fn median_is_pure() {
        let batch = batch_of(&[17.3, 12.9, 44.1, 12.9, 30.0]);
        let first = batch.median().unwrap();
        let second = batch.median().unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn trailing_average_withholds_until_full() {
        let mut window = TrailingAverage::new(3);
        assert!(window.push(1.0).is_none());
        assert!(window.push(2.0).is_none());
        assert!(close(window.push(3.0).unwrap(), 2.0));
    }

    #[test]
    fn trailing_average_evicts_oldest() {
        let mut window = TrailingAverage::new(3);
        window.push(1.0);
        window.push(2.0);
        window.push(3.0);
        // 1.0 evicted: mean of [2.0, 3.0, 7.0]
        assert!(close(window.push(7.0).unwrap(), 4.0));
    }
}
