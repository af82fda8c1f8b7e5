//! Hardware Resource Management
//!
//! Assigns hardware resources (pins) to the tasks that own them. Each group
//! is moved into exactly one task, so concurrent access to a pin pair is a
//! compile error rather than something a lock has to arbitrate.
//!
//! # Resource Groups
//! - Level Sensor: HC-SR04 ultrasonic sensor trigger/echo pins

use assign_resources::assign_resources;
use embassy_rp::peripherals;

assign_resources! {
    /// HC-SR04 ultrasonic level sensor pins
    level_sensor: LevelSensorResources {
        trigger_pin: PIN_15,
        echo_pin: PIN_14,
    },
}
