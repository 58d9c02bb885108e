use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::playlist::Track;

/// Errors surfaced by a playback engine. None of these are fatal to the
/// player; the transport degrades by skipping the offending track.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no usable audio output device: {0}")]
    Device(#[from] rodio::StreamError),
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: rodio::decoder::DecoderError,
    },
}

/// Contract between the transport state machine and whatever actually makes
/// sound. Wraps one track at a time.
///
/// `load` prepares a track paused at position zero; everything else operates
/// on the loaded track and is a no-op when nothing is loaded.
pub trait PlaybackEngine {
    /// Prepare `track` for playback, paused at position zero.
    fn load(&mut self, track: &Track) -> Result<(), EngineError>;
    fn play(&mut self);
    fn pause(&mut self);
    /// Move the playback position. Preserves the play/pause state.
    fn seek(&mut self, to: Duration);
    /// Current playback position of the loaded track.
    fn position(&self) -> Duration;
    /// Total length of the loaded track, when known.
    fn duration(&self) -> Option<Duration>;
    fn set_volume(&mut self, volume: f32);
    /// Whether the loaded track has played to its natural end.
    fn finished(&self) -> bool;
    /// Ramp volume down over `over` before shutdown. The default just pauses.
    fn fade_out(&mut self, over: Duration) {
        let _ = over;
        self.pause();
    }
}
