//! Orchestrator Module
//!
//! The central consumer of system events: records every cycle outcome in the
//! system state and forwards publishable readings to the report boundary.
//! Discarded cycles are logged with their reason, so a field operator can
//! tell a quorum-starved sensor (wiring, acoustics) from range-rejected
//! readings (geometry, configuration) straight from the log.

use defmt::{info, warn};

use crate::sensor::sampling::DiscardReason;
use crate::system::event::{self, Events};
use crate::system::report;
use crate::system::state::SYSTEM_STATE;

/// Main orchestrator task
#[embassy_executor::task]
pub async fn orchestrate() {
    info!("Orchestrator started");
    loop {
        // wait for an event, record it, then react to it
        let event = event::wait().await;
        record_event(&event).await;
        handle_event(event);
    }
}

/// Folds an event into the global system state
async fn record_event(event: &Events) {
    let mut state = SYSTEM_STATE.lock().await;
    match event {
        Events::LevelMeasured(reading) => state.record_reading(*reading),
        Events::CycleDiscarded(reason) => state.record_discard(*reason),
    }
}

/// Reacts to an event after the state is up to date
fn handle_event(event: Events) {
    match event {
        Events::LevelMeasured(reading) => report::publish(&reading),
        Events::CycleDiscarded(reason) => match reason {
            DiscardReason::QuorumShort { valid, required } => {
                warn!(
                    "Cycle discarded: {=usize} valid samples, quorum is {=usize}",
                    valid, required
                );
            }
            DiscardReason::OutOfRange { distance_cm } => {
                warn!(
                    "Cycle discarded: {=f64} cm outside the plausible range",
                    distance_cm
                );
            }
            DiscardReason::WindowFilling { have, need } => {
                info!(
                    "Cycle withheld: smoothing window filling ({=usize}/{=usize})",
                    have, need
                );
            }
            DiscardReason::Cancelled => info!("Cycle cancelled by pause request"),
        },
    }
}
