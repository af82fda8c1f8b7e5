//! Publish/persist boundary
//!
//! The sensing pipeline ends here: a finalized [`LevelReading`] is rendered
//! into the wire payload fields (fill percentage, effective distance,
//! finalization timestamp). The transport collaborator - MQTT publisher,
//! serial bridge, whatever the deployment uses - wraps this seam and owns
//! its own concurrency model plus the conversion of the monotonic timestamp
//! to wall-clock ISO-8601 at ingest. The sampling logic never learns which
//! transport is attached.

use defmt::info;

use crate::sensor::level::LevelReading;

/// Hands one finalized reading to the publish/persist boundary.
pub fn publish(reading: &LevelReading) {
    info!(
        "report: fill={=f64}% distance={=f64}cm finalized_at={}",
        reading.percent, reading.distance_cm, reading.measured_at
    );
}
