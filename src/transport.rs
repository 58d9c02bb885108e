//! Transport state machine and poller.
//!
//! The `Transport` is the single authority over which track is active,
//! whether it is playing, and what comes next when a track ends or the user
//! skips. The `Poller` turns the engine's continuous playback position into
//! discrete end-of-track events on a fixed period.

mod machine;
mod poller;

pub use machine::{Direction, PollOutcome, RepeatPhase, Transport, TransportSnapshot};
pub use poller::Poller;

#[cfg(test)]
mod tests;
