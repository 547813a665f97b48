//! Run lifecycle: Ready → Playing → Ended → Ready.
//!
//! One [`Session`] exists per running game. It is shared (usually behind an `Arc`) between
//! the tick loop, which drives the transitions, and display code sampling the elapsed time
//! on its own schedule. All three fields sit behind one lock so a reader never sees a phase
//! from one transition paired with a timestamp from another.

use engine_core::{Clock, SystemClock};
use parking_lot::RwLock;
use std::time::Duration;

/// Current phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// On the start pad, clock not running.
    #[default]
    Ready,
    /// Clock running.
    Playing,
    /// Goal reached, final time frozen.
    Ended,
}

/// Consistent copy of the session fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: GamePhase,
    /// Clock reading at the last `start()`. Survives restarts until overwritten.
    pub start_time: Option<Duration>,
    /// Clock reading at the last `end()`. Survives restarts until overwritten.
    pub end_time: Option<Duration>,
}

impl SessionState {
    /// Run time as of clock reading `now`.
    pub fn elapsed(&self, now: Duration) -> Duration {
        match (self.phase, self.start_time, self.end_time) {
            (GamePhase::Playing, Some(start), _) => now.saturating_sub(start),
            (GamePhase::Ended, Some(start), Some(end)) => end.saturating_sub(start),
            _ => Duration::ZERO,
        }
    }
}

/// The game session state machine.
///
/// Transitions from the wrong phase are no-ops; each returns whether it took effect.
#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    state: RwLock<SessionState>,
    clock: C,
}

impl Default for Session<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock::new())
    }
}

impl<C: Clock> Session<C> {
    pub fn new(clock: C) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// `Ready → Playing`, stamping `start_time`.
    pub fn start(&self) -> bool {
        self.transition("start", GamePhase::Ready, |state, now| {
            state.phase = GamePhase::Playing;
            state.start_time = Some(now);
        })
    }

    /// `Playing → Ended`, stamping `end_time`.
    pub fn end(&self) -> bool {
        self.transition("end", GamePhase::Playing, |state, now| {
            state.phase = GamePhase::Ended;
            state.end_time = Some(now);
        })
    }

    /// `Playing | Ended → Ready`. Timestamps are left alone.
    pub fn restart(&self) -> bool {
        let mut state = self.state.write();
        if state.phase == GamePhase::Ready {
            log::debug!("Ignoring restart: already Ready");
            return false;
        }
        state.phase = GamePhase::Ready;
        true
    }

    fn transition(
        &self,
        name: &str,
        from: GamePhase,
        apply: impl FnOnce(&mut SessionState, Duration),
    ) -> bool {
        let mut state = self.state.write();
        if state.phase != from {
            log::debug!("Ignoring {}: phase is {:?}", name, state.phase);
            return false;
        }
        apply(&mut state, self.clock.now());
        true
    }

    pub fn snapshot(&self) -> SessionState {
        *self.state.read()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.read().phase
    }

    /// Run time: live while playing, frozen once ended, zero when ready.
    pub fn elapsed(&self) -> Duration {
        let state = self.snapshot();
        state.elapsed(self.clock.now())
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }
}
