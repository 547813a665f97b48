//! Headless marble race: lays out the configured course and lets a simple autopilot run it
//! at a fixed 60 Hz, with the run clock following simulation time.

use anyhow::Result;
use engine_core::{Clock, ManualClock};
use glam::Vec3;
use input::{Control, ControlInput};
use marble_race::{GamePhase, Race, RaceConfig};
use std::time::Duration;

/// Give up after this much simulated time.
const MAX_SIM_SECONDS: f32 = 120.0;
const SIM_HZ: f64 = 60.0;

/// Rolls forward, steers back to the centre line, and taps jump now and then.
struct Autopilot {
    frame: u64,
}

impl Autopilot {
    /// Ticks between jump presses.
    const JUMP_PERIOD: u64 = 45;
    /// Lateral drift tolerated before steering.
    const LANE_TOLERANCE: f32 = 0.4;

    fn controls(&mut self, marble: Option<Vec3>) -> ControlInput {
        self.frame += 1;
        let mut input = ControlInput::default().with(Control::Forward);
        if let Some(pos) = marble {
            input.set(Control::Leftward, pos.x > Self::LANE_TOLERANCE);
            input.set(Control::Rightward, pos.x < -Self::LANE_TOLERANCE);
        }
        input.set(Control::Jump, self.frame % Self::JUMP_PERIOD == 0);
        input
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RaceConfig::load();
    log::info!(
        "Course: {} obstacles, seed {}, kinds {:?}",
        config.blocks_count,
        config.seed,
        config.obstacle_kinds
    );

    let mut race = Race::with_clock(config, ManualClock::new())?;
    let step = Duration::from_secs_f64(1.0 / SIM_HZ);
    let mut pilot = Autopilot { frame: 0 };

    while race.elapsed().as_secs_f32() < MAX_SIM_SECONDS {
        let controls = pilot.controls(race.player_position());
        race.session().clock().advance(step);
        race.tick(&controls, step);

        if race.session().phase() == GamePhase::Ended {
            break;
        }
        if pilot.frame % (SIM_HZ as u64 * 5) == 0 {
            let hud = race.hud(controls);
            log::info!(
                "t={} phase={:?} marble={:?}",
                hud.time_text,
                hud.phase,
                race.player_position()
            );
        }
    }

    let hud = race.hud(ControlInput::default());
    match hud.phase {
        GamePhase::Ended => log::info!("Finished course in {}s", hud.time_text),
        phase => log::info!(
            "No finish after {:.0}s of simulation (phase {:?}, clock {:?})",
            MAX_SIM_SECONDS,
            phase,
            race.session().clock().now()
        ),
    }

    Ok(())
}
