use std::time::{Duration, Instant};

use crate::engine::PlaybackEngine;

use super::machine::{PollOutcome, Transport};

/// Fixed-period timer bridging the engine's continuous position into
/// discrete transport events.
///
/// One period serves both the position display and the end-of-track test;
/// the completion test subtracts `epsilon` from the duration so timer
/// granularity cannot make the poller miss the end of a track. Ticks run
/// synchronously on the caller's thread, so a tick can never overlap
/// itself; the stop-before-switch rule in the transport cancels any stale
/// end-of-track reading when tracks change between ticks.
pub struct Poller {
    period: Duration,
    epsilon: Duration,
    last_tick: Option<Instant>,
    armed: bool,
}

impl Poller {
    pub fn new(period: Duration, epsilon: Duration) -> Self {
        Self {
            period,
            epsilon,
            last_tick: None,
            armed: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Start ticking. The first tick fires one full period after `now`.
    /// Re-arming while already armed keeps the current schedule.
    pub fn arm(&mut self, now: Instant) {
        if !self.armed {
            self.armed = true;
            self.last_tick = Some(now);
        }
    }

    /// Stop ticking until the next `arm()`.
    pub fn stop(&mut self) {
        self.armed = false;
        self.last_tick = None;
    }

    /// Run one pass if the period has elapsed. Disarms itself when the
    /// transport is no longer playing afterwards, so a paused player burns
    /// no ticks.
    pub fn tick<E: PlaybackEngine>(
        &mut self,
        now: Instant,
        transport: &mut Transport<E>,
    ) -> PollOutcome {
        if !self.armed {
            return PollOutcome::Idle;
        }
        match self.last_tick {
            Some(last) if now.duration_since(last) < self.period => return PollOutcome::Idle,
            _ => {}
        }
        self.last_tick = Some(now);

        let outcome = transport.poll(self.epsilon);
        if !transport.is_playing() {
            self.stop();
        }
        outcome
    }
}
