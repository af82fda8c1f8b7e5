//! Pulse timing driver for HC-SR04 class ultrasonic sensors
//!
//! Produces one [`RawSample`] per `measure()` call:
//! - Emits a brief high pulse on the trigger pin
//! - Waits for the echo rising edge, then the falling edge, each under its
//!   own wall-clock budget
//! - Converts the echo pulse width to a round-trip distance in centimeters
//!
//! Timeouts and implausible pulse widths are ordinary outcomes, returned as
//! `RawSample` variants rather than errors: under water-tank geometry a
//! missed echo happens routinely (surface ripple, condensation on the
//! transducer) and the sampling layer absorbs it per sample.
//!
//! The driver owns its trigger/echo pin pair exclusively. With single-owner
//! pin handles there is no runtime "pin claimed elsewhere" failure mode to
//! report; a second sensor needs its own pin pair and its own driver.

use defmt::Format;
use embassy_rp::gpio::{Input, Output};
use embassy_time::{with_timeout, Duration, Instant, Timer};

/// Timing parameters for one trigger/echo exchange
#[derive(Debug, Clone, Copy)]
pub struct PulseTiming {
    /// Trigger pin high time
    pub trigger_pulse: Duration,
    /// Wait budget for the echo rising edge
    pub rising_edge_timeout: Duration,
    /// Wait budget for the echo falling edge
    pub falling_edge_timeout: Duration,
    /// Shortest plausible echo pulse
    pub min_valid_pulse: Duration,
    /// Longest plausible echo pulse
    pub max_valid_pulse: Duration,
    /// Speed of sound in centimeters per second
    pub speed_of_sound_cm_s: f64,
}

impl PulseTiming {
    /// Turns a measured echo pulse width into a sample.
    ///
    /// Pulses outside the valid band (glitches, electrical noise,
    /// disconnected wiring) are rejected rather than converted.
    pub fn classify(&self, pulse: Duration) -> RawSample {
        if pulse < self.min_valid_pulse || pulse > self.max_valid_pulse {
            RawSample::PulseOutOfBand(pulse)
        } else {
            RawSample::Distance(pulse_to_distance_cm(pulse, self.speed_of_sound_cm_s))
        }
    }
}

/// Outcome of one measurement attempt
#[derive(Debug, Clone, Copy, Format)]
pub enum RawSample {
    /// Valid round-trip measurement, in centimeters
    Distance(f64),
    /// Echo never went high within the rising-edge budget
    EchoStartTimeout,
    /// Echo never returned low within the falling-edge budget
    EchoEndTimeout,
    /// Echo pulse width outside the plausible band
    PulseOutOfBand(Duration),
}

impl RawSample {
    /// Distance in centimeters for valid samples, `None` otherwise
    pub fn distance_cm(&self) -> Option<f64> {
        match self {
            RawSample::Distance(cm) => Some(*cm),
            _ => None,
        }
    }
}

/// Single-owner handle to the sensor's trigger/echo pin pair
pub struct UltrasonicRanger<'d> {
    trigger: Output<'d>,
    echo: Input<'d>,
    timing: PulseTiming,
}

impl<'d> UltrasonicRanger<'d> {
    /// Takes ownership of the configured pins (trigger already driven low).
    pub fn new(trigger: Output<'d>, echo: Input<'d>, timing: PulseTiming) -> Self {
        Self {
            trigger,
            echo,
            timing,
        }
    }

    /// Performs one trigger/echo exchange.
    ///
    /// Blocks the calling task for at most the trigger pulse plus the sum of
    /// the two edge-wait budgets.
    pub async fn measure(&mut self) -> RawSample {
        self.trigger.set_high();
        Timer::after(self.timing.trigger_pulse).await;
        self.trigger.set_low();

        if with_timeout(self.timing.rising_edge_timeout, self.echo.wait_for_high())
            .await
            .is_err()
        {
            return RawSample::EchoStartTimeout;
        }
        let echo_started = Instant::now();

        if with_timeout(self.timing.falling_edge_timeout, self.echo.wait_for_low())
            .await
            .is_err()
        {
            return RawSample::EchoEndTimeout;
        }

        self.timing.classify(echo_started.elapsed())
    }
}

/// Converts an echo pulse width to a one-way distance.
///
/// The pulse spans the round trip, so the distance is half of
/// `pulse_seconds * speed_of_sound`.
pub fn pulse_to_distance_cm(pulse: Duration, speed_of_sound_cm_s: f64) -> f64 {
    let pulse_s = pulse.as_micros() as f64 / 1_000_000.0;
    pulse_s * speed_of_sound_cm_s / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> PulseTiming {
        PulseTiming {
            trigger_pulse: Duration::from_micros(10),
            rising_edge_timeout: Duration::from_millis(100),
            falling_edge_timeout: Duration::from_millis(200),
            min_valid_pulse: Duration::from_micros(100),
            max_valid_pulse: Duration::from_millis(38),
            speed_of_sound_cm_s: 34_300.0,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        libm::fabs(a - b) < 1e-9
    }

    #[test]
    fn converts_pulse_to_half_round_trip() {
        // 1 ms at 34300 cm/s covers 34.3 cm both ways
        let cm = pulse_to_distance_cm(Duration::from_micros(1000), 34_300.0);
        assert!(close(cm, 17.15));
    }

    #[test]
    fn rejects_pulse_below_floor() {
        // 50 us against a 100 us floor
        match timing().classify(Duration::from_micros(50)) {
            RawSample::PulseOutOfBand(_) => {}
            other => panic!("expected out-of-band, got {:?}", other),
        }
    }

    #[test]
    fn rejects_pulse_above_ceiling() {
        match timing().classify(Duration::from_millis(50)) {
            RawSample::PulseOutOfBand(_) => {}
            other => panic!("expected out-of-band, got {:?}", other),
        }
    }

    #[test]
    fn accepts_pulse_at_band_edges() {
        assert!(timing()
            .classify(Duration::from_micros(100))
            .distance_cm()
            .is_some());
        assert!(timing()
            .classify(Duration::from_millis(38))
            .distance_cm()
            .is_some());
    }
}
