//! Monitoring Configuration
//!
//! All numeric parameters of the sensing pipeline live in a single immutable
//! [`MonitorConfig`], constructed once in `main.rs` and passed by reference
//! into the tasks that need it. There are no fallback values for physically
//! significant parameters: every field must be spelled out at the
//! construction site, and the combination is validated before any task is
//! spawned.
//!
//! # Validation
//! `validate()` rejects combinations that would make readings meaningless
//! (a quorum larger than the sample count, an inverted pulse band, a
//! non-positive speed of sound, ...). Rejection is fatal at startup.
//!
//! The one tolerated oddity is `min_level_cm == max_level_cm`: the firmware
//! runs, warns once at startup, and pins the fill level to 0%.

use defmt::Format;
use embassy_time::Duration;

use crate::sensor::driver::PulseTiming;
use crate::sensor::level::{LevelOrientation, LevelScale};
use crate::sensor::sampling::{MAX_SAMPLES_PER_CYCLE, MAX_SMOOTHING_WINDOW};

/// Immutable deployment configuration for the sensing pipeline
pub struct MonitorConfig {
    /// Measurement attempts per sampling cycle
    pub samples_per_cycle: usize,
    /// Minimum valid samples before the cycle median is trusted
    pub quorum: usize,
    /// Delay between measurement attempts (lets acoustic echoes settle)
    pub sample_interval: Duration,
    /// Quiet time immediately before each trigger pulse
    pub settle_time: Duration,
    /// One-time pause after pin setup, before the first measurement
    pub stabilization_time: Duration,
    /// Trigger pin high time (10 microseconds for HC-SR04 class sensors)
    pub trigger_pulse: Duration,
    /// Wait budget for the echo rising edge
    pub rising_edge_timeout: Duration,
    /// Wait budget for the echo falling edge
    pub falling_edge_timeout: Duration,
    /// Shortest echo pulse accepted as a real measurement
    pub min_valid_pulse: Duration,
    /// Longest echo pulse accepted as a real measurement
    pub max_valid_pulse: Duration,
    /// Speed of sound in centimeters per second
    pub speed_of_sound_cm_s: f64,
    /// Distance reading at one end of the plausible range (tank geometry)
    pub min_level_cm: f64,
    /// Distance reading at the other end of the plausible range
    pub max_level_cm: f64,
    /// Fractional widening of the plausible range on both ends
    pub tolerance: f64,
    /// Mapping direction between distance and fill percentage
    pub orientation: LevelOrientation,
    /// Trailing moving-average window over cycle medians, `None` to disable
    pub smoothing_window: Option<usize>,
    /// Decimal places kept on published distances and percentages
    pub round_decimals: u32,
    /// Cadence of sampling cycles (one reading published per interval)
    pub publish_interval: Duration,
}

impl MonitorConfig {
    /// Checks the parameter combination for physical plausibility.
    ///
    /// Called once at startup; an `Err` must abort the process before any
    /// task runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_cycle == 0 {
            return Err(ConfigError::NoSamples);
        }
        if self.samples_per_cycle > MAX_SAMPLES_PER_CYCLE {
            return Err(ConfigError::TooManySamples);
        }
        if self.quorum == 0 || self.quorum > self.samples_per_cycle {
            return Err(ConfigError::BadQuorum);
        }
        if self.trigger_pulse.as_ticks() == 0
            || self.rising_edge_timeout.as_ticks() == 0
            || self.falling_edge_timeout.as_ticks() == 0
        {
            return Err(ConfigError::ZeroTimingBudget);
        }
        if self.min_valid_pulse >= self.max_valid_pulse {
            return Err(ConfigError::PulseBandInverted);
        }
        if self.speed_of_sound_cm_s <= 0.0 {
            return Err(ConfigError::BadSpeedOfSound);
        }
        if self.min_level_cm > self.max_level_cm {
            return Err(ConfigError::LevelRangeInverted);
        }
        if !(self.tolerance >= 0.0) {
            return Err(ConfigError::BadTolerance);
        }
        if let Some(window) = self.smoothing_window {
            if window == 0 || window > MAX_SMOOTHING_WINDOW {
                return Err(ConfigError::BadSmoothingWindow);
            }
        }
        Ok(())
    }

    /// True when the level range carries no information (min == max).
    ///
    /// Tolerated, but worth exactly one startup warning: the fill level will
    /// always be reported as 0%.
    pub fn has_degenerate_range(&self) -> bool {
        self.min_level_cm == self.max_level_cm
    }

    /// Timing parameters consumed by the pulse driver
    pub fn pulse_timing(&self) -> PulseTiming {
        PulseTiming {
            trigger_pulse: self.trigger_pulse,
            rising_edge_timeout: self.rising_edge_timeout,
            falling_edge_timeout: self.falling_edge_timeout,
            min_valid_pulse: self.min_valid_pulse,
            max_valid_pulse: self.max_valid_pulse,
            speed_of_sound_cm_s: self.speed_of_sound_cm_s,
        }
    }

    /// Normalization parameters consumed by the level rescaler
    pub fn level_scale(&self) -> LevelScale {
        LevelScale::new(
            self.min_level_cm,
            self.max_level_cm,
            self.tolerance,
            self.orientation,
            self.round_decimals,
        )
    }
}

/// Startup-fatal configuration problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum ConfigError {
    /// Zero samples per cycle
    NoSamples,
    /// More samples per cycle than the batch can hold
    TooManySamples,
    /// Quorum of zero, or larger than the sample count
    BadQuorum,
    /// A trigger pulse or edge-wait budget of zero
    ZeroTimingBudget,
    /// Valid-pulse band is empty or inverted
    PulseBandInverted,
    /// Speed of sound must be positive
    BadSpeedOfSound,
    /// Minimum level distance above the maximum
    LevelRangeInverted,
    /// Tolerance must be a non-negative fraction
    BadTolerance,
    /// Smoothing window of zero, or beyond the window capacity
    BadSmoothingWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> MonitorConfig {
        MonitorConfig {
            samples_per_cycle: 7,
            quorum: 3,
            sample_interval: Duration::from_millis(1000),
            settle_time: Duration::from_millis(60),
            stabilization_time: Duration::from_millis(500),
            trigger_pulse: Duration::from_micros(10),
            rising_edge_timeout: Duration::from_millis(100),
            falling_edge_timeout: Duration::from_millis(200),
            min_valid_pulse: Duration::from_micros(100),
            max_valid_pulse: Duration::from_millis(38),
            speed_of_sound_cm_s: 34_300.0,
            min_level_cm: 10.0,
            max_level_cm: 120.0,
            tolerance: 0.1,
            orientation: LevelOrientation::DrainsWithDistance,
            smoothing_window: None,
            round_decimals: 1,
            publish_interval: Duration::from_secs(60),
        }
    }

    #[test]
    fn accepts_plausible_config() {
        assert_eq!(base().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_samples() {
        let mut cfg = base();
        cfg.samples_per_cycle = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::NoSamples));
    }

    #[test]
    fn rejects_oversized_batch() {
        let mut cfg = base();
        cfg.samples_per_cycle = MAX_SAMPLES_PER_CYCLE + 1;
        assert_eq!(cfg.validate(), Err(ConfigError::TooManySamples));
    }

    #[test]
    fn rejects_quorum_above_sample_count() {
        let mut cfg = base();
        cfg.quorum = cfg.samples_per_cycle + 1;
        assert_eq!(cfg.validate(), Err(ConfigError::BadQuorum));
    }

    #[test]
    fn rejects_inverted_pulse_band() {
        let mut cfg = base();
        cfg.min_valid_pulse = Duration::from_millis(40);
        assert_eq!(cfg.validate(), Err(ConfigError::PulseBandInverted));
    }

    #[test]
    fn rejects_inverted_level_range() {
        let mut cfg = base();
        cfg.min_level_cm = 200.0;
        assert_eq!(cfg.validate(), Err(ConfigError::LevelRangeInverted));
    }

    #[test]
    fn rejects_negative_tolerance() {
        let mut cfg = base();
        cfg.tolerance = -0.05;
        assert_eq!(cfg.validate(), Err(ConfigError::BadTolerance));
    }

    #[test]
    fn rejects_unusable_smoothing_window() {
        let mut cfg = base();
        cfg.smoothing_window = Some(0);
        assert_eq!(cfg.validate(), Err(ConfigError::BadSmoothingWindow));
        cfg.smoothing_window = Some(MAX_SMOOTHING_WINDOW + 1);
        assert_eq!(cfg.validate(), Err(ConfigError::BadSmoothingWindow));
    }

    #[test]
    fn degenerate_range_passes_validation_with_flag() {
        let mut cfg = base();
        cfg.min_level_cm = 100.0;
        cfg.max_level_cm = 100.0;
        assert_eq!(cfg.validate(), Ok(()));
        assert!(cfg.has_degenerate_range());
        assert!(!base().has_degenerate_range());
    }
}
