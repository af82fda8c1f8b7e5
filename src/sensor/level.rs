//! Level normalization
//!
//! Turns a validated distance into a fill percentage. The plausible distance
//! range `[min, max]` is widened by a tolerance fraction for the
//! accept/reject decision, then the accepted distance is linearly rescaled
//! into `[0, 100]`. Which end of the range means "full" depends on how the
//! sensor is mounted, so the mapping direction is an explicit configuration
//! choice ([`LevelOrientation`]), never inferred from the data.

use defmt::Format;
use embassy_time::Instant;

/// Mapping direction between measured distance and fill percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum LevelOrientation {
    /// Bottom-mounted sensor: a larger distance means a fuller tank
    FillsWithDistance,
    /// Lid-mounted sensor ranging down to the surface: a larger distance
    /// means an emptier tank
    DrainsWithDistance,
}

/// Normalization parameters derived from the monitor configuration
#[derive(Debug, Clone, Copy)]
pub struct LevelScale {
    min_cm: f64,
    max_cm: f64,
    tolerance: f64,
    orientation: LevelOrientation,
    decimals: u32,
}

impl LevelScale {
    pub const fn new(
        min_cm: f64,
        max_cm: f64,
        tolerance: f64,
        orientation: LevelOrientation,
        decimals: u32,
    ) -> Self {
        Self {
            min_cm,
            max_cm,
            tolerance,
            orientation,
            decimals,
        }
    }

    /// Accepts distances within `[min*(1-tol), max*(1+tol)]`, inclusive on
    /// both ends. Anything outside is a spurious extreme that must not reach
    /// storage.
    pub fn within_band(&self, distance_cm: f64) -> bool {
        let lower = self.min_cm * (1.0 - self.tolerance);
        let upper = self.max_cm * (1.0 + self.tolerance);
        distance_cm >= lower && distance_cm <= upper
    }

    /// Linearly rescales a distance to a fill percentage in `[0, 100]`,
    /// rounded to the configured precision.
    ///
    /// A degenerate range (`max == min`) pins the result to 0; the startup
    /// path warns about that once, so there is no per-call logging here.
    pub fn percent(&self, distance_cm: f64) -> f64 {
        let span = self.max_cm - self.min_cm;
        if span == 0.0 {
            return 0.0;
        }
        let scaled = ((distance_cm - self.min_cm) / span * 100.0).clamp(0.0, 100.0);
        let oriented = match self.orientation {
            LevelOrientation::FillsWithDistance => scaled,
            LevelOrientation::DrainsWithDistance => 100.0 - scaled,
        };
        round_to(oriented, self.decimals)
    }

    /// Rounds a distance to the configured precision
    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.decimals)
    }
}

/// The published value object: one finalized reading per sampling cycle
#[derive(Debug, Clone, Copy, Format)]
pub struct LevelReading {
    /// Effective (median or smoothed) distance in centimeters, rounded
    pub distance_cm: f64,
    /// Fill level percentage in `[0, 100]`, rounded
    pub percent: f64,
    /// Captured when the reading was finalized, not at cycle start
    pub measured_at: Instant,
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = libm::pow(10.0, decimals as f64);
    libm::round(value * factor) / factor
}
