//! Tank level measurement
//!
//! Runs the sampling cycle against the HC-SR04 ultrasonic sensor.
//!
//! # Cycle Operation
//! - Takes a fixed number of measurement attempts, with a settle delay
//!   before each trigger and a longer pause between attempts so acoustic
//!   echoes die out inside the tank
//! - Invalid attempts (timeouts, out-of-band pulses) are counted and dropped
//! - The median of the valid samples is trusted only once a minimum quorum
//!   of them exists; a starved cycle reports nothing rather than guessing
//! - With smoothing configured, cycle medians feed a trailing window and the
//!   window mean becomes the effective reading once the window has filled
//! - The effective reading must sit inside the tolerance-widened plausible
//!   range before it is rescaled to a fill percentage and emitted
//!
//! # Pacing
//! Cycles are paced against the publish interval with the sampling time
//! subtracted, so readings land once per interval regardless of how many
//! attempts timed out.
//!
//! # Pause/Resume
//! A control signal is polled between samples. Pausing abandons the current
//! cycle (reported as a discard) and parks the task until resumed; the
//! timing of an individual sample is never cut short.

use defmt::info;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Timer};

use crate::sensor::driver::UltrasonicRanger;
use crate::sensor::level::{LevelReading, LevelScale};
use crate::sensor::sampling::{DiscardReason, SampleBatch, TrailingAverage};
use crate::system::config::MonitorConfig;
use crate::system::event::{send, Events};
use crate::system::resources::LevelSensorResources;

/// Commands for the sampling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingCommand {
    /// Stop sampling after the sample currently in flight
    Pause,
    /// Resume a paused sampling loop
    Resume,
}

/// Control signal for the sampling loop
static SAMPLING_CONTROL: Signal<CriticalSectionRawMutex, SamplingCommand> = Signal::new();

/// Requests the measurement task to stop sampling.
///
/// Honored at the next between-samples checkpoint; the cycle in progress is
/// discarded. Meant for graceful shutdown and maintenance windows where the
/// transducer must stay quiet.
pub fn pause_sampling() {
    SAMPLING_CONTROL.signal(SamplingCommand::Pause);
}

/// Resumes a paused measurement task
pub fn resume_sampling() {
    SAMPLING_CONTROL.signal(SamplingCommand::Resume);
}

/// Main measurement task: one sampling cycle per publish interval
#[embassy_executor::task]
pub async fn level_measure(r: LevelSensorResources, cfg: &'static MonitorConfig) {
    // Trigger starts low; echo is driven by the sensor, no pull needed
    let trigger = Output::new(r.trigger_pin, Level::Low);
    let echo = Input::new(r.echo_pin, Pull::None);
    let mut sensor = UltrasonicRanger::new(trigger, echo, cfg.pulse_timing());

    let scale = cfg.level_scale();
    let mut window = cfg.smoothing_window.map(TrailingAverage::new);

    // Let the transducer stabilize after pin setup before the first trigger
    Timer::after(cfg.stabilization_time).await;
    info!(
        "Level measurement started: {=usize} samples per cycle, quorum {=usize}",
        cfg.samples_per_cycle, cfg.quorum
    );

    loop {
        let cycle_started = Instant::now();

        match run_cycle(&mut sensor, cfg, &scale, &mut window).await {
            Ok(reading) => send(Events::LevelMeasured(reading)).await,
            Err(reason) => send(Events::CycleDiscarded(reason)).await,
        }

        // Pace against the publish interval, sampling time included
        if let Some(idle) = cfg.publish_interval.checked_sub(cycle_started.elapsed()) {
            Timer::after(idle).await;
        }
    }
}

/// Runs one sampling cycle to completion.
///
/// Returns the finalized reading, or the reason the cycle produced nothing.
/// Per-sample failures never abort the cycle; they only shrink the batch.
async fn run_cycle(
    sensor: &mut UltrasonicRanger<'_>,
    cfg: &MonitorConfig,
    scale: &LevelScale,
    window: &mut Option<TrailingAverage>,
) -> Result<LevelReading, DiscardReason> {
    let mut batch = SampleBatch::new();

    for i in 0..cfg.samples_per_cycle {
        // Cooperative cancellation point between samples
        if let Some(SamplingCommand::Pause) = SAMPLING_CONTROL.try_take() {
            park_until_resumed().await;
            return Err(DiscardReason::Cancelled);
        }

        // Quiet time before the trigger so echoes of the previous pulse
        // cannot masquerade as the next one
        Timer::after(cfg.settle_time).await;
        batch.record(sensor.measure().await);

        if i + 1 < cfg.samples_per_cycle {
            Timer::after(cfg.sample_interval).await;
        }
    }

    if !batch.meets_quorum(cfg.quorum) {
        return Err(DiscardReason::QuorumShort {
            valid: batch.valid_count(),
            required: cfg.quorum,
        });
    }
    // quorum >= 1 is enforced at startup, so the batch cannot be empty here
    let Some(median) = batch.median() else {
        return Err(DiscardReason::QuorumShort {
            valid: 0,
            required: cfg.quorum,
        });
    };
    info!(
        "Cycle median {=f64} cm from {=usize}/{=usize} valid samples ({=usize} timeouts, {=usize} out of band)",
        median,
        batch.valid_count(),
        batch.attempted(),
        batch.timeouts(),
        batch.out_of_band()
    );

    let effective = match window {
        Some(window) => match window.push(median) {
            Some(mean) => scale.round(mean),
            None => {
                return Err(DiscardReason::WindowFilling {
                    have: window.len(),
                    need: window.size(),
                })
            }
        },
        None => median,
    };

    if !scale.within_band(effective) {
        return Err(DiscardReason::OutOfRange {
            distance_cm: effective,
        });
    }

    Ok(LevelReading {
        distance_cm: scale.round(effective),
        percent: scale.percent(effective),
        // timestamp of finalization, not of cycle start
        measured_at: Instant::now(),
    })
}

/// Parks the task until a resume command arrives
async fn park_until_resumed() {
    info!("Sampling paused");
    while SAMPLING_CONTROL.wait().await != SamplingCommand::Resume {}
    info!("Sampling resumed");
}
