use std::time::Duration;

use rand::{Rng, thread_rng};

use crate::engine::PlaybackEngine;
use crate::playlist::Playlist;

/// What happens when the current track plays to its natural end.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RepeatPhase {
    /// Advance through the playlist; behavior at the very end is governed
    /// by the wrap-autoplay policy.
    None,
    /// Replay the current track.
    One,
    /// Advance and wrap around forever.
    All,
}

impl Default for RepeatPhase {
    fn default() -> Self {
        Self::None
    }
}

/// Direction of a manual skip.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Result of one poller pass over the transport.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing to do (not playing).
    Idle,
    /// Still playing; position advanced.
    Progress,
    /// The current track ended and the end-of-track transition ran.
    Ended,
}

/// Data-only view of the transport, handed to the renderer after every
/// transition and every poller tick. The core never touches UI elements.
#[derive(Debug, Clone)]
pub struct TransportSnapshot {
    /// 1-based for display.
    pub track_number: usize,
    pub track_count: usize,
    pub track_display: String,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub playing: bool,
    pub repeat: RepeatPhase,
    pub shuffle: bool,
    pub volume: f32,
    pub muted: bool,
    /// Non-fatal problem worth showing (e.g. a track that failed to load).
    pub warning: Option<String>,
}

/// The transport state machine.
///
/// Owns the playlist and the engine; all mutation of the current index,
/// repeat phase, shuffle flag and play state flows through these methods.
/// Engine commands are fire-and-forget: this state is authoritative even if
/// the engine lags behind.
pub struct Transport<E: PlaybackEngine> {
    playlist: Playlist,
    engine: E,
    current: usize,
    repeat: RepeatPhase,
    shuffle: bool,
    playing: bool,
    /// Whether the engine currently holds the track at `current`.
    loaded: bool,
    volume: f32,
    muted: bool,
    saved_volume: f32,
    wrap_autoplay: bool,
    warning: Option<String>,
}

impl<E: PlaybackEngine> Transport<E> {
    pub fn new(playlist: Playlist, engine: E) -> Self {
        Self {
            playlist,
            engine,
            current: 0,
            repeat: RepeatPhase::None,
            shuffle: false,
            playing: false,
            loaded: false,
            volume: 1.0,
            muted: false,
            saved_volume: 1.0,
            wrap_autoplay: true,
            warning: None,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn repeat(&self) -> RepeatPhase {
        self.repeat
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_wrap_autoplay(&mut self, enabled: bool) {
        self.wrap_autoplay = enabled;
    }

    pub fn set_repeat(&mut self, phase: RepeatPhase) {
        self.repeat = phase;
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        self.shuffle = enabled;
    }

    /// Start (or resume) playback of the current track. Idempotent.
    pub fn play(&mut self) {
        if self.playlist.is_empty() {
            self.warning = Some("no tracks".to_string());
            return;
        }
        if !self.loaded && !self.load_current_or_skip() {
            return;
        }
        self.engine.play();
        self.playing = true;
    }

    /// Pause without resetting the position; `play()` resumes where it left off.
    pub fn pause(&mut self) {
        self.engine.pause();
        self.playing = false;
    }

    pub fn toggle_play(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Manual skip. Stops the current track first (pause + seek to zero) so a
    /// pending end-of-track interpretation of the old track can never fire,
    /// clears an active repeat, keeps shuffle, then plays the new track.
    pub fn advance(&mut self, direction: Direction) {
        if self.playlist.is_empty() {
            self.warning = Some("no tracks".to_string());
            return;
        }

        self.stop_current();
        self.repeat = RepeatPhase::None;

        let len = self.playlist.len();
        let next = match direction {
            Direction::Next if self.shuffle => self.shuffle_target(),
            Direction::Next => (self.current + 1) % len,
            Direction::Previous => (self.current + len - 1) % len,
        };

        self.switch_to(next);
        self.play();
    }

    /// Cycle the repeat phase: None -> One -> All -> None. Affects only
    /// future end-of-track transitions; playback is untouched.
    pub fn cycle_repeat(&mut self) {
        self.repeat = match self.repeat {
            RepeatPhase::None => RepeatPhase::One,
            RepeatPhase::One => RepeatPhase::All,
            RepeatPhase::All => RepeatPhase::None,
        };
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    /// Natural end of the current track. Unlike a manual skip this never
    /// clears the repeat phase.
    pub fn on_track_ended(&mut self) {
        if self.playlist.is_empty() {
            return;
        }

        let len = self.playlist.len();
        self.stop_current();

        match self.repeat {
            RepeatPhase::One => {
                // Replay the same index from zero.
                self.switch_to(self.current);
                self.play();
            }
            RepeatPhase::All => {
                let next = if self.shuffle {
                    self.shuffle_target()
                } else {
                    (self.current + 1) % len
                };
                self.switch_to(next);
                self.play();
            }
            RepeatPhase::None => {
                if self.shuffle {
                    let next = self.shuffle_target();
                    self.switch_to(next);
                    self.play();
                } else if self.current + 1 >= len {
                    // Wrapped past the end: park at the first track, and only
                    // keep going if the wrap-autoplay policy says so.
                    self.switch_to(0);
                    if self.wrap_autoplay {
                        self.play();
                    }
                } else {
                    self.switch_to(self.current + 1);
                    self.play();
                }
            }
        }
    }

    /// Absolute seek as a fraction of the track duration. Clamped just short
    /// of 1.0 so a seek to the very end cannot retrigger the completion test.
    /// No-op while the duration is unknown.
    pub fn seek(&mut self, fraction: f64) {
        if !self.loaded {
            return;
        }
        let Some(total) = self.engine.duration() else {
            return;
        };
        let fraction = fraction.clamp(0.0, 0.99);
        self.engine.seek(total.mul_f64(fraction));
    }

    /// Current position as a fraction of the duration, for seek-step keys.
    pub fn position_fraction(&self) -> Option<f64> {
        if !self.loaded {
            return None;
        }
        let total = self.engine.duration()?;
        if total.is_zero() {
            return None;
        }
        Some(self.engine.position().as_secs_f64() / total.as_secs_f64())
    }

    pub fn set_volume(&mut self, volume: f32) {
        let previous = self.volume;
        self.volume = volume.clamp(0.0, 1.0);
        if self.volume > 0.0 {
            self.muted = false;
        } else if !self.muted {
            // Dragging the volume to zero presents as muted, latching the
            // last audible level so unmute has somewhere to return to.
            self.muted = true;
            if previous > 0.0 {
                self.saved_volume = previous;
            }
        }
        self.engine.set_volume(self.volume);
    }

    /// Mute latches the last audible volume and restores it on unmute.
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            self.volume = self.saved_volume;
        } else {
            self.muted = true;
            self.saved_volume = self.volume;
            self.volume = 0.0;
        }
        self.engine.set_volume(self.volume);
    }

    /// One poller pass: decide whether the current track has ended. A track
    /// counts as ended when the position reaches the duration minus `epsilon`
    /// or the engine reports natural completion, whichever comes first.
    pub fn poll(&mut self, epsilon: Duration) -> PollOutcome {
        if !self.playing {
            return PollOutcome::Idle;
        }

        let by_position = match self.engine.duration() {
            Some(total) => self.engine.position() + epsilon >= total,
            None => false,
        };

        if by_position || self.engine.finished() {
            self.on_track_ended();
            PollOutcome::Ended
        } else {
            PollOutcome::Progress
        }
    }

    /// Ramp down and stop; used on quit.
    pub fn shutdown(&mut self, fade: Duration) {
        if self.playing {
            self.engine.fade_out(fade);
        }
        self.playing = false;
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            track_number: self.current + 1,
            track_count: self.playlist.len(),
            track_display: self
                .playlist
                .get(self.current)
                .map(|t| t.display.clone())
                .unwrap_or_default(),
            position: if self.loaded {
                self.engine.position()
            } else {
                Duration::ZERO
            },
            // The engine's duration is only meaningful for the loaded track;
            // otherwise fall back to the scan-time metadata.
            duration: if self.loaded {
                self.engine.duration()
            } else {
                self.playlist.get(self.current).and_then(|t| t.duration)
            },
            playing: self.playing,
            repeat: self.repeat,
            shuffle: self.shuffle,
            volume: self.volume,
            muted: self.muted,
            warning: self.warning.clone(),
        }
    }

    /// Stop-before-switch: pause and rewind whatever is loaded so no stale
    /// audio or end-of-track reading can leak into the next track.
    fn stop_current(&mut self) {
        if self.loaded {
            self.engine.pause();
            self.engine.seek(Duration::ZERO);
        }
        self.playing = false;
    }

    fn switch_to(&mut self, index: usize) {
        self.current = index;
        self.loaded = false;
    }

    /// Uniform random index different from the current one, by iterative
    /// rejection sampling. A single-track playlist replays itself; without
    /// that guard the exclusion can never be satisfied.
    fn shuffle_target(&self) -> usize {
        let len = self.playlist.len();
        if len < 2 {
            return self.current;
        }

        let mut rng = thread_rng();
        loop {
            let candidate = rng.gen_range(0..len);
            if candidate != self.current {
                return candidate;
            }
        }
    }

    /// Load the current track into the engine, skipping forward past tracks
    /// that fail to load. Bounded to one sweep of the playlist so a list of
    /// all-broken files degrades to a stopped state instead of looping.
    fn load_current_or_skip(&mut self) -> bool {
        let len = self.playlist.len();
        self.warning = None;

        for _ in 0..len {
            // current is always in range while the playlist is non-empty
            let Some(track) = self.playlist.get(self.current) else {
                return false;
            };
            match self.engine.load(track) {
                Ok(()) => {
                    self.engine.set_volume(self.volume);
                    self.loaded = true;
                    return true;
                }
                Err(e) => {
                    self.warning = Some(format!("skipped {}: {}", track.display, e));
                    self.current = (self.current + 1) % len;
                }
            }
        }

        self.warning = Some("no playable tracks".to_string());
        self.playing = false;
        false
    }
}
