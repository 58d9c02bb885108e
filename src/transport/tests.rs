use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::engine::{EngineError, PlaybackEngine};
use crate::playlist::{Playlist, Track};

use super::machine::{Direction, PollOutcome, RepeatPhase, Transport};
use super::poller::Poller;

/// In-memory engine standing in for rodio.
#[derive(Default)]
struct FakeEngine {
    loaded: Option<PathBuf>,
    duration: Option<Duration>,
    position: Duration,
    playing: bool,
    volume: f32,
    finished: bool,
    fail: HashSet<PathBuf>,
    fail_seek: bool,
}

impl FakeEngine {
    fn failing(paths: &[&str]) -> Self {
        Self {
            fail: paths.iter().map(PathBuf::from).collect(),
            ..Self::default()
        }
    }

    /// Engine whose file goes bad mid-session: any real seek loses the
    /// track, and like the rodio backend it then reports completion.
    fn seek_poisoned() -> Self {
        Self {
            fail_seek: true,
            ..Self::default()
        }
    }
}

impl PlaybackEngine for FakeEngine {
    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        if self.fail.contains(&track.path) {
            return Err(EngineError::Open {
                path: track.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            });
        }
        self.loaded = Some(track.path.clone());
        self.duration = track.duration;
        self.position = Duration::ZERO;
        self.playing = false;
        self.finished = false;
        Ok(())
    }

    fn play(&mut self) {
        if self.loaded.is_some() {
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, to: Duration) {
        if self.fail_seek && !to.is_zero() {
            self.duration = None;
            self.playing = false;
            self.finished = true;
            return;
        }
        if self.loaded.is_some() {
            self.position = to;
        }
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Option<Duration> {
        if self.loaded.is_some() { self.duration } else { None }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn finished(&self) -> bool {
        self.finished
    }
}

fn track(name: &str) -> Track {
    Track {
        path: PathBuf::from(name),
        title: name.into(),
        artist: None,
        album: None,
        duration: Some(Duration::from_secs(10)),
        display: name.into(),
    }
}

fn transport_with(names: &[&str]) -> Transport<FakeEngine> {
    let tracks = names.iter().map(|n| track(n)).collect();
    Transport::new(Playlist::from_tracks(tracks), FakeEngine::default())
}

#[test]
fn advance_next_cycles_mod_n_and_wraps() {
    let mut t = transport_with(&["a", "b", "c"]);
    assert_eq!(t.current_index(), 0);

    t.advance(Direction::Next);
    assert_eq!(t.current_index(), 1);
    t.advance(Direction::Next);
    assert_eq!(t.current_index(), 2);
    t.advance(Direction::Next);
    assert_eq!(t.current_index(), 0);

    // N more calls return to the start again.
    for _ in 0..3 {
        t.advance(Direction::Next);
    }
    assert_eq!(t.current_index(), 0);
}

#[test]
fn advance_previous_is_the_inverse_of_next() {
    let mut t = transport_with(&["a", "b", "c", "d"]);
    t.advance(Direction::Next);
    let before = t.current_index();

    t.advance(Direction::Next);
    t.advance(Direction::Previous);
    assert_eq!(t.current_index(), before);

    // Previous from index 0 wraps to the last track.
    let mut t = transport_with(&["a", "b", "c"]);
    t.advance(Direction::Previous);
    assert_eq!(t.current_index(), 2);
}

#[test]
fn advance_on_single_track_playlist_restarts_the_track() {
    let mut t = transport_with(&["only"]);
    t.play();
    t.seek(0.5);

    t.advance(Direction::Next);
    assert_eq!(t.current_index(), 0);
    assert!(t.is_playing());
    assert_eq!(t.snapshot().position, Duration::ZERO);

    t.advance(Direction::Previous);
    assert_eq!(t.current_index(), 0);
    assert!(t.is_playing());
}

#[test]
fn manual_skip_clears_repeat_but_keeps_shuffle() {
    let mut t = transport_with(&["a", "b", "c"]);
    t.set_shuffle(true);
    t.set_repeat(RepeatPhase::One);

    t.advance(Direction::Next);
    assert_eq!(t.repeat(), RepeatPhase::None);
    assert!(t.shuffle());

    t.set_repeat(RepeatPhase::All);
    t.advance(Direction::Previous);
    assert_eq!(t.repeat(), RepeatPhase::None);
    assert!(t.shuffle());
}

#[test]
fn repeat_one_replays_same_index_indefinitely() {
    let mut t = transport_with(&["a", "b", "c"]);
    t.advance(Direction::Next);
    t.set_repeat(RepeatPhase::One);

    for _ in 0..3 {
        t.on_track_ended();
        assert_eq!(t.current_index(), 1);
        assert!(t.is_playing());
        assert_eq!(t.repeat(), RepeatPhase::One);
    }
}

#[test]
fn repeat_all_wraps_and_keeps_playing() {
    let mut t = transport_with(&["a", "b", "c"]);
    t.set_repeat(RepeatPhase::All);
    t.play();

    t.on_track_ended();
    assert_eq!(t.current_index(), 1);
    t.on_track_ended();
    assert_eq!(t.current_index(), 2);
    t.on_track_ended();
    assert_eq!(t.current_index(), 0);
    assert!(t.is_playing());
    assert_eq!(t.repeat(), RepeatPhase::All);
}

#[test]
fn shuffle_never_selects_the_current_index() {
    let mut t = transport_with(&["a", "b", "c", "d", "e"]);
    t.set_shuffle(true);
    t.play();

    for _ in 0..100 {
        let before = t.current_index();
        t.on_track_ended();
        assert_ne!(t.current_index(), before);
    }
}

#[test]
fn repeat_all_with_shuffle_picks_a_new_index_and_keeps_playing() {
    let mut t = transport_with(&["a", "b", "c", "d", "e"]);
    t.set_repeat(RepeatPhase::All);
    t.set_shuffle(true);
    t.play();

    for _ in 0..50 {
        let before = t.current_index();
        t.on_track_ended();
        assert_ne!(t.current_index(), before);
        assert!(t.is_playing());
        assert_eq!(t.repeat(), RepeatPhase::All);
        assert!(t.shuffle());
    }
}

#[test]
fn shuffle_with_one_track_replays_without_recursing() {
    let mut t = transport_with(&["only"]);
    t.set_shuffle(true);
    t.play();

    t.on_track_ended();
    assert_eq!(t.current_index(), 0);
    assert!(t.is_playing());
}

#[test]
fn natural_end_without_repeat_advances_sequentially() {
    let mut t = transport_with(&["a", "b", "c"]);
    t.play();

    t.on_track_ended();
    assert_eq!(t.current_index(), 1);
    assert!(t.is_playing());
}

#[test]
fn wrap_at_end_respects_autoplay_policy() {
    // Default policy: keep playing from the top.
    let mut t = transport_with(&["a", "b"]);
    t.play();
    t.on_track_ended();
    t.on_track_ended();
    assert_eq!(t.current_index(), 0);
    assert!(t.is_playing());

    // Opt-out: park at the first track, paused.
    let mut t = transport_with(&["a", "b"]);
    t.set_wrap_autoplay(false);
    t.play();
    t.on_track_ended();
    assert!(t.is_playing());
    t.on_track_ended();
    assert_eq!(t.current_index(), 0);
    assert!(!t.is_playing());
}

#[test]
fn pause_then_play_resumes_at_the_same_position() {
    let mut t = transport_with(&["a", "b"]);
    t.play();
    t.seek(0.5);
    let at = t.snapshot().position;
    assert_eq!(at, Duration::from_secs(5));

    t.pause();
    assert!(!t.is_playing());
    assert_eq!(t.snapshot().position, at);

    t.play();
    assert!(t.is_playing());
    assert_eq!(t.snapshot().position, at);
}

#[test]
fn seek_clamps_short_of_the_end() {
    let mut t = transport_with(&["a"]);
    t.play();

    t.seek(2.0);
    // Clamped to 0.99 of a 10s track: close to, but never at, the end.
    let at = t.snapshot().position;
    assert!(at >= Duration::from_millis(9890) && at < Duration::from_secs(10));

    t.seek(-1.0);
    assert_eq!(t.snapshot().position, Duration::ZERO);
}

#[test]
fn cycle_repeat_walks_three_states() {
    let mut t = transport_with(&["a"]);
    assert_eq!(t.repeat(), RepeatPhase::None);
    t.cycle_repeat();
    assert_eq!(t.repeat(), RepeatPhase::One);
    t.cycle_repeat();
    assert_eq!(t.repeat(), RepeatPhase::All);
    t.cycle_repeat();
    assert_eq!(t.repeat(), RepeatPhase::None);
}

#[test]
fn mute_latches_and_restores_volume() {
    let mut t = transport_with(&["a"]);
    t.set_volume(0.7);
    t.toggle_mute();
    assert!(t.is_muted());
    assert_eq!(t.volume(), 0.0);

    t.toggle_mute();
    assert!(!t.is_muted());
    assert_eq!(t.volume(), 0.7);

    // Raising the volume while muted unmutes.
    t.toggle_mute();
    t.set_volume(0.3);
    assert!(!t.is_muted());
    assert_eq!(t.volume(), 0.3);
}

#[test]
fn volume_dragged_to_zero_presents_as_muted() {
    let mut t = transport_with(&["a"]);
    t.set_volume(0.6);
    t.set_volume(0.0);
    assert!(t.is_muted());
    assert_eq!(t.volume(), 0.0);

    // Unmute returns to the last audible level.
    t.toggle_mute();
    assert!(!t.is_muted());
    assert_eq!(t.volume(), 0.6);
}

#[test]
fn empty_playlist_fails_fast_with_a_renderable_state() {
    let mut t = Transport::new(Playlist::from_tracks(Vec::new()), FakeEngine::default());
    t.play();
    assert!(!t.is_playing());
    assert_eq!(t.snapshot().warning.as_deref(), Some("no tracks"));

    t.advance(Direction::Next);
    assert!(!t.is_playing());
    t.on_track_ended();
    assert!(!t.is_playing());
}

#[test]
fn load_failure_skips_forward_with_a_warning() {
    let tracks = vec![track("bad"), track("good")];
    let mut t = Transport::new(
        Playlist::from_tracks(tracks),
        FakeEngine::failing(&["bad"]),
    );

    t.play();
    assert_eq!(t.current_index(), 1);
    assert!(t.is_playing());
    // The warning about the skipped track stays visible after the fallback.
    let warning = t.snapshot().warning.unwrap();
    assert!(warning.contains("bad"));
}

#[test]
fn track_lost_during_seek_ends_instead_of_freezing() {
    let mut t = Transport::new(
        Playlist::from_tracks(vec![track("a"), track("b")]),
        FakeEngine::seek_poisoned(),
    );

    t.play();
    t.seek(0.5);
    // The engine lost the track; the next poll must run the end-of-track
    // transition instead of reporting progress forever.
    assert_eq!(t.poll(Duration::from_millis(250)), PollOutcome::Ended);
    assert_eq!(t.current_index(), 1);
    assert!(t.is_playing());
}

#[test]
fn all_broken_playlist_stops_instead_of_looping() {
    let tracks = vec![track("bad1"), track("bad2")];
    let mut t = Transport::new(
        Playlist::from_tracks(tracks),
        FakeEngine::failing(&["bad1", "bad2"]),
    );

    t.play();
    assert!(!t.is_playing());
    assert_eq!(t.snapshot().warning.as_deref(), Some("no playable tracks"));
}

#[test]
fn poll_fires_end_of_track_near_the_duration() {
    let mut t = transport_with(&["a", "b"]);
    t.play();
    t.seek(0.99); // 9.9s of 10s

    let outcome = t.poll(Duration::from_millis(250));
    assert_eq!(outcome, PollOutcome::Ended);
    assert_eq!(t.current_index(), 1);
    assert!(t.is_playing());
}

#[test]
fn poll_reports_progress_mid_track_and_idle_when_paused() {
    let mut t = transport_with(&["a"]);
    t.play();
    assert_eq!(t.poll(Duration::from_millis(250)), PollOutcome::Progress);

    t.pause();
    assert_eq!(t.poll(Duration::from_millis(250)), PollOutcome::Idle);
}

#[test]
fn snapshot_is_one_based_for_display() {
    let mut t = transport_with(&["a", "b", "c"]);
    assert_eq!(t.snapshot().track_number, 1);
    assert_eq!(t.snapshot().track_count, 3);

    t.advance(Direction::Next);
    let snap = t.snapshot();
    assert_eq!(snap.track_number, 2);
    assert_eq!(snap.track_display, "b");
}

#[test]
fn poller_waits_a_full_period_between_ticks() {
    let mut t = transport_with(&["a"]);
    t.play();

    let start = Instant::now();
    let mut poller = Poller::new(Duration::from_millis(250), Duration::from_millis(250));
    poller.arm(start);

    assert_eq!(poller.tick(start, &mut t), PollOutcome::Idle);
    assert_eq!(
        poller.tick(start + Duration::from_millis(100), &mut t),
        PollOutcome::Idle
    );
    assert_eq!(
        poller.tick(start + Duration::from_millis(250), &mut t),
        PollOutcome::Progress
    );
    // The next tick is scheduled a full period after the last one.
    assert_eq!(
        poller.tick(start + Duration::from_millis(300), &mut t),
        PollOutcome::Idle
    );
}

#[test]
fn poller_disarms_when_playback_stops_and_rearms_cleanly() {
    let mut t = transport_with(&["a"]);
    t.play();

    let start = Instant::now();
    let mut poller = Poller::new(Duration::from_millis(250), Duration::from_millis(250));
    poller.arm(start);

    t.pause();
    assert_eq!(
        poller.tick(start + Duration::from_millis(250), &mut t),
        PollOutcome::Idle
    );
    assert!(!poller.is_armed());

    t.play();
    let later = start + Duration::from_millis(500);
    poller.arm(later);
    assert!(poller.is_armed());
    assert_eq!(
        poller.tick(later + Duration::from_millis(250), &mut t),
        PollOutcome::Progress
    );
}

#[test]
fn unarmed_poller_never_polls() {
    let mut t = transport_with(&["a"]);
    t.play();

    let mut poller = Poller::new(Duration::from_millis(250), Duration::from_millis(250));
    assert_eq!(
        poller.tick(Instant::now() + Duration::from_secs(10), &mut t),
        PollOutcome::Idle
    );
}
