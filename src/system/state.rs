//! System State Management
//!
//! Tracks the monitor's global state: the last published reading and how the
//! sampling cycles have been going. The state is protected by a mutex and
//! mutated only by the orchestrator, so tasks that want a snapshot (a future
//! display or health endpoint) read a consistent view.

use defmt::Format;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};

use crate::sensor::level::LevelReading;
use crate::sensor::sampling::DiscardReason;

/// Global system state protected by a mutex
///
/// Initialized to "nothing measured yet".
pub static SYSTEM_STATE: Mutex<CriticalSectionRawMutex, SystemState> = Mutex::new(SystemState {
    last_reading: None,
    cycles_completed: 0,
    cycles_discarded: 0,
    last_discard: None,
});

/// Monitor runtime state
#[derive(Format)]
pub struct SystemState {
    /// Most recent published reading, `None` until the first cycle succeeds
    pub last_reading: Option<LevelReading>,
    /// Cycles that produced a published reading
    pub cycles_completed: u32,
    /// Cycles that were discarded, for any reason
    pub cycles_discarded: u32,
    /// Reason of the most recent discarded cycle
    pub last_discard: Option<DiscardReason>,
}

impl SystemState {
    /// Records a published reading
    pub fn record_reading(&mut self, reading: LevelReading) {
        self.last_reading = Some(reading);
        self.cycles_completed = self.cycles_completed.wrapping_add(1);
    }

    /// Records a discarded cycle and why it was discarded
    pub fn record_discard(&mut self, reason: DiscardReason) {
        self.cycles_discarded = self.cycles_discarded.wrapping_add(1);
        self.last_discard = Some(reason);
    }
}
