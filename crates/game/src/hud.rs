//! Read-only view of the run for the HUD: timer text, restart prompt, key indicators.

use engine_core::Clock;
use input::ControlInput;

use crate::session::{GamePhase, Session};

/// Everything the interface layer draws, sampled at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    /// Run time in seconds, two decimals.
    pub time_text: String,
    /// Only offered once the run has ended.
    pub show_restart: bool,
    /// Echo of the held controls, for the on-screen key pad.
    pub controls: ControlInput,
}

impl HudSnapshot {
    pub fn capture<C: Clock>(session: &Session<C>, controls: ControlInput) -> Self {
        let state = session.snapshot();
        let elapsed = state.elapsed(session.clock().now());
        Self {
            phase: state.phase,
            time_text: format_time(elapsed.as_secs_f32()),
            show_restart: state.phase == GamePhase::Ended,
            controls,
        }
    }
}

/// Seconds with two decimals, e.g. `"3.23"`.
pub fn format_time(seconds: f32) -> String {
    format!("{:.2}", seconds)
}
