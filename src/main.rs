//! Tank level monitor firmware entry point
//!
//! Validates the deployment configuration and spawns the measurement and
//! orchestration tasks.

#![no_std]
#![no_main]

use defmt::warn;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_time::Duration;
use sensor::level::LevelOrientation;
use system::config::MonitorConfig;
use system::resources::{AssignedResources, LevelSensorResources};
use task::{level_measure::level_measure, orchestrate::orchestrate};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Ultrasonic sensing pipeline
mod sensor;
/// System core modules
mod system;
/// Task implementations
mod task;

/// Deployment configuration
///
/// Every field must be spelled out; an incomplete configuration does not
/// compile, and an implausible one is rejected before any task is spawned.
/// Pin assignments live in `system::resources`.
static CONFIG: MonitorConfig = MonitorConfig {
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
};

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Refuse to start on a physically meaningless configuration
    if let Err(e) = CONFIG.validate() {
        defmt::panic!("configuration rejected: {}", e);
    }
    // The degenerate level range is warned about exactly once, here
    if CONFIG.has_degenerate_range() {
        warn!("min and max level distances are equal; fill level will always report 0%");
    }

    // Split the resources into separate groups, one per owning task
    let r = split_resources!(p);

    spawner.spawn(orchestrate()).unwrap();
    spawner.spawn(level_measure(r.level_sensor, &CONFIG)).unwrap();
}
