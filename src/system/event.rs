//! System Events
//!
//! Defines events and the channel the measurement task uses to hand cycle
//! outcomes to the orchestrator.

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::sensor::level::LevelReading;
use crate::sensor::sampling::DiscardReason;

/// Multi-producer, single-consumer event channel with capacity of 10
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Events, 10> = Channel::new();

/// Sends an event to the system channel
pub async fn send(event: Events) {
    EVENT_CHANNEL.sender().send(event).await;
}

/// Receives the next event from the system channel
pub async fn wait() -> Events {
    EVENT_CHANNEL.receiver().receive().await
}

/// System-wide events
#[derive(Debug, Clone, Copy, Format)]
pub enum Events {
    /// A sampling cycle produced a publishable reading
    LevelMeasured(LevelReading),
    /// A sampling cycle produced nothing, with the reason
    CycleDiscarded(DiscardReason),
}
