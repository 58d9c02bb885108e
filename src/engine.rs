//! Playback engine: the contract the transport drives, plus the rodio-backed
//! implementation used by the real player.
//!
//! The transport treats the engine as a fire-and-forget collaborator: commands
//! are issued without waiting for acknowledgment and the transport's own state
//! stays authoritative.

mod output;
mod types;

pub use output::RodioEngine;
pub use types::{EngineError, PlaybackEngine};
