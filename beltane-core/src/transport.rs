//! Playback cursor and play/pause/stop state machine.
//!
//! The cursor advances in real seconds; BPM only affects snapping. The host
//! calls [`TransportController::tick`] once per frame; ticks may be late or
//! skipped, the next one catches up from the injected [`Clock`].

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use beltane_types::{PlaybackState, TransportConfig};

/// Source of wall-clock time for the transport.
pub trait Clock: Send + Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs.max(0.0)));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.elapsed_nanos.load(Ordering::Relaxed))
    }
}

#[derive(Debug)]
pub struct TransportController {
    state: PlaybackState,
    cursor: f64,
    clock: Box<dyn Clock>,
    last_tick: Instant,
}

impl Default for TransportController {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

impl TransportController {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        let last_tick = clock.now();
        Self {
            state: PlaybackState::Stopped,
            cursor: 0.0,
            clock,
            last_tick,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Current position in seconds.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Stopped or paused → playing.
    pub fn play(&mut self) -> bool {
        if self.state == PlaybackState::Playing {
            return false;
        }
        self.state = PlaybackState::Playing;
        self.last_tick = self.clock.now();
        log::debug!(target: "transport", "play from {:.3}s", self.cursor);
        true
    }

    /// Playing → paused. No-op in any other state.
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.state = PlaybackState::Paused;
        log::debug!(target: "transport", "pause at {:.3}s", self.cursor);
        true
    }

    /// Any state → stopped, cursor back to zero.
    pub fn stop(&mut self) -> bool {
        let changed = self.state != PlaybackState::Stopped || self.cursor != 0.0;
        self.state = PlaybackState::Stopped;
        self.cursor = 0.0;
        if changed {
            log::debug!(target: "transport", "stop");
        }
        changed
    }

    pub fn toggle_play(&mut self) -> bool {
        if self.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Move the cursor, in any state. The target is clamped to the
    /// arrangement (or the loop end, if that is later) and wrapped into the
    /// loop region when looping.
    pub fn seek(&mut self, time: f64, relative: bool, duration: f64, config: &TransportConfig) -> f64 {
        let target = if relative { self.cursor + time } else { time };
        if !target.is_finite() {
            return self.cursor;
        }
        let upper = if config.loop_active() {
            duration.max(config.loop_end)
        } else {
            duration
        };
        let mut t = target.clamp(0.0, upper.max(0.0));
        if config.loop_active() && t >= config.loop_end {
            t = wrap_into_loop(t, config);
        }
        self.cursor = t;
        self.cursor
    }

    /// Advance a playing cursor by the wall-clock time since the last tick.
    ///
    /// Inside an active loop the cursor wraps at the loop end. Otherwise,
    /// reaching `duration` parks the cursor there and pauses.
    pub fn tick(&mut self, duration: f64, config: &TransportConfig) -> f64 {
        if self.state != PlaybackState::Playing {
            return self.cursor;
        }
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;

        let prev = self.cursor;
        let next = prev + elapsed;
        let looping = config.loop_active() && prev < config.loop_end;

        if looping {
            self.cursor = if next >= config.loop_end {
                wrap_into_loop(next, config)
            } else {
                next
            };
        } else if next >= duration {
            self.cursor = duration.max(0.0);
            self.state = PlaybackState::Paused;
            log::debug!(target: "transport", "reached end at {:.3}s", self.cursor);
        } else {
            self.cursor = next;
        }
        self.cursor
    }
}

fn wrap_into_loop(t: f64, config: &TransportConfig) -> f64 {
    let len = config.loop_end - config.loop_start;
    config.loop_start + (t - config.loop_start).rem_euclid(len)
}
