use std::fs::File;
use std::io::BufReader;
use std::thread;
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::playlist::Track;

use super::types::{EngineError, PlaybackEngine};

/// Create a paused `Sink` for `track` that starts playback at `start_at`.
fn create_sink_at(
    stream: &OutputStream,
    track: &Track,
    start_at: Duration,
) -> Result<Sink, EngineError> {
    let file = File::open(&track.path).map_err(|source| EngineError::Open {
        path: track.path.clone(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file))
        .map_err(|source| EngineError::Decode {
            path: track.path.clone(),
            source,
        })?
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}

/// rodio-backed playback engine. Holds at most one sink at a time.
///
/// rodio does not report playback position, so position is tracked with a
/// wall clock: `accumulated` time up to the last pause/seek plus the time
/// since `started_at` while playing. Seeking rebuilds the sink and skips
/// into the decoded stream.
pub struct RodioEngine {
    stream: OutputStream,
    sink: Option<Sink>,
    duration: Option<Duration>,
    accumulated: Duration,
    started_at: Option<Instant>,
    volume: f32,
    paused: bool,
    // Kept so seek() can rebuild the sink for the loaded track.
    loaded: Option<Track>,
}

impl RodioEngine {
    pub fn new() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            duration: None,
            accumulated: Duration::ZERO,
            started_at: None,
            volume: 1.0,
            paused: true,
            loaded: None,
        })
    }

    fn install_sink(&mut self, sink: Sink, at: Duration) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        sink.set_volume(self.volume);
        self.sink = Some(sink);
        self.accumulated = at;
        self.started_at = None;
        self.paused = true;
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        let sink = create_sink_at(&self.stream, track, Duration::ZERO)?;
        self.install_sink(sink, Duration::ZERO);
        self.duration = track.duration;
        self.loaded = Some(track.clone());
        Ok(())
    }

    fn play(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        sink.play();
        if self.paused {
            self.started_at = Some(Instant::now());
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        sink.pause();
        if let Some(st) = self.started_at.take() {
            self.accumulated += st.elapsed();
        }
        self.paused = true;
    }

    fn seek(&mut self, to: Duration) {
        let Some(track) = self.loaded.clone() else {
            return;
        };
        if self.sink.is_none() {
            return;
        }

        let was_paused = self.paused;
        // Rebuild the sink and skip into the file. If the rebuild fails the
        // old sink was already stopped; the next load starts clean.
        match create_sink_at(&self.stream, &track, to) {
            Ok(sink) => {
                self.install_sink(sink, to);
                if !was_paused {
                    self.play();
                }
            }
            Err(_) => {
                // The file went bad mid-session (deleted, truncated, yanked
                // media). Keep the track marker but drop the sink and the
                // duration so `finished()` reports completion and the
                // end-of-track recovery takes over, rather than freezing on
                // a dead sink.
                if let Some(old) = self.sink.take() {
                    old.stop();
                }
                self.duration = None;
                self.accumulated = Duration::ZERO;
                self.started_at = None;
                self.paused = true;
            }
        }
    }

    fn position(&self) -> Duration {
        self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.volume);
        }
    }

    fn finished(&self) -> bool {
        // No loaded track counts as finished; a seek that lost the sink
        // must surface as an end-of-track, not as silent frozen progress.
        match (&self.loaded, &self.sink) {
            (Some(_), Some(sink)) => sink.empty(),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn fade_out(&mut self, over: Duration) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if over.is_zero() {
            sink.stop();
            return;
        }

        let steps: u32 = 20;
        let step = over / steps;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            sink.set_volume(self.volume * (1.0 - t));
            thread::sleep(step.max(Duration::from_millis(1)));
        }
        sink.stop();
    }
}
