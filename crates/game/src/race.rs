//! The tick loop tying course, physics, controller and session together.

use engine_core::{Clock, SystemClock, Time, Transform, TransformRaw, DEFAULT_MAX_DELTA};
use glam::Vec3;
use input::ControlInput;
use parking_lot::RwLock;
use physics::{Material, PhysicsService, PhysicsWorld, RigidBodyHandle};
use procgen::{generate, next_seed, Course, CourseError, ObstacleKind, UNIT_SPACING};
use std::sync::Arc;
use std::time::Duration;

use crate::camera::CameraRig;
use crate::config::RaceConfig;
use crate::hud::HudSnapshot;
use crate::level::LevelBodies;
use crate::player::{PlayerController, TickReport};
use crate::session::{GamePhase, Session};

/// Marble spawn point, just above the start pad.
pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const PLAYER_RADIUS: f32 = 0.3;
const PLAYER_MATERIAL: Material = Material::new(1.0, 0.2);
/// Lets the marble coast to a stop once input stops.
const PLAYER_DAMPING: f32 = 0.5;

/// The current course, shared with readers on other threads.
///
/// Replacement swaps a fully built `Arc<Course>`, so readers see either the old course or
/// the new one, never a mix.
#[derive(Debug)]
pub struct CourseHandle {
    current: RwLock<Arc<Course>>,
}

impl CourseHandle {
    pub fn new(course: Course) -> Self {
        Self {
            current: RwLock::new(Arc::new(course)),
        }
    }

    pub fn current(&self) -> Arc<Course> {
        Arc::clone(&self.current.read())
    }

    /// Publish `course`, returning the one it replaced.
    pub fn replace(&self, course: Arc<Course>) -> Arc<Course> {
        std::mem::replace(&mut *self.current.write(), course)
    }
}

fn frame_delta_cap(seconds: f32) -> Duration {
    match Duration::try_from_secs_f32(seconds.max(0.0)) {
        Ok(cap) => cap,
        Err(e) => {
            log::warn!(
                "max_frame_delta {} unusable ({}), using {:?}",
                seconds,
                e,
                DEFAULT_MAX_DELTA
            );
            DEFAULT_MAX_DELTA
        }
    }
}

/// One running game: course, physics world, marble, session.
pub struct Race<C: Clock = SystemClock> {
    config: RaceConfig,
    course: Arc<CourseHandle>,
    session: Arc<Session<C>>,
    physics: PhysicsWorld,
    level: LevelBodies,
    player: PlayerController<RigidBodyHandle>,
    time: Time,
    /// Phase seen at the end of the previous tick, to catch restarts made elsewhere.
    last_phase: GamePhase,
}

impl Race<SystemClock> {
    pub fn new(config: RaceConfig) -> Result<Self, CourseError> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> Race<C> {
    /// Build the first course and spawn the marble.
    pub fn with_clock(config: RaceConfig, clock: C) -> Result<Self, CourseError> {
        let course = generate(config.blocks_count, config.seed, &config.obstacle_kinds)?;

        let mut physics = PhysicsWorld::new();
        let level = LevelBodies::build(&mut physics, &course);
        let body = physics.add_ball_body(PLAYER_SPAWN, PLAYER_RADIUS, PLAYER_MATERIAL, PLAYER_DAMPING);
        physics.update_query_pipeline();

        let max_delta = frame_delta_cap(config.max_frame_delta);
        let player = PlayerController::new(body, config.controller);

        Ok(Self {
            course: Arc::new(CourseHandle::new(course)),
            session: Arc::new(Session::new(clock)),
            physics,
            level,
            player,
            time: Time::new().with_max_delta(max_delta),
            last_phase: GamePhase::Ready,
            config,
        })
    }

    /// Advance the simulation by one frame of `raw_delta` (clamped to `max_frame_delta`).
    pub fn tick(&mut self, input: &ControlInput, raw_delta: Duration) -> TickReport {
        if self.last_phase != GamePhase::Ready && self.session.phase() == GamePhase::Ready {
            log::info!("Session restarted externally");
            self.on_restart();
        }

        self.time.advance(raw_delta);
        let dt = self.time.delta_seconds();

        let report = self
            .player
            .update(&mut self.physics, &self.session, input, dt);
        if report.started {
            log::info!("Run started");
        }

        self.level.drive(&mut self.physics, self.time.elapsed_seconds());
        if dt > 0.0 {
            self.physics.step(dt);
        }

        let body = self.player.body();
        if self.physics.body_in_sensor(self.level.goal(), body) && self.session.end() {
            log::info!("Finished in {:.2}s", self.session.elapsed_seconds());
        }

        if let Some(position) = self.physics.translation(body) {
            if position.y < self.config.fall_limit {
                log::info!("Marble fell off the course at {:?}", position);
                if !self.restart() {
                    // Nothing to restart from; just put the marble back.
                    self.respawn_player();
                }
            }
        }

        self.last_phase = self.session.phase();
        report
    }

    /// Restart the run: back to Ready, marble to spawn, fresh course if configured.
    /// Returns false (and changes nothing) if the session was already Ready.
    pub fn restart(&mut self) -> bool {
        if !self.session.restart() {
            return false;
        }
        self.on_restart();
        self.last_phase = GamePhase::Ready;
        true
    }

    fn on_restart(&mut self) {
        if self.config.reseed_on_restart {
            let seed = next_seed(self.course.current().seed());
            let count = self.config.blocks_count;
            let kinds = self.config.obstacle_kinds.clone();
            if let Err(e) = self.regenerate(count, seed, &kinds) {
                log::warn!("Keeping current course, regeneration failed: {}", e);
            }
        }
        self.respawn_player();
    }

    fn respawn_player(&mut self) {
        self.physics.reset_body(self.player.body(), PLAYER_SPAWN);
        self.player.reset(PLAYER_SPAWN);
    }

    /// Replace the course. On error the current course stays in place untouched.
    pub fn regenerate(
        &mut self,
        count: u32,
        seed: u64,
        kinds: &[ObstacleKind],
    ) -> Result<(), CourseError> {
        let course = generate(count, seed, kinds)?;
        let level = LevelBodies::build(&mut self.physics, &course);
        let old_level = std::mem::replace(&mut self.level, level);
        old_level.remove(&mut self.physics);
        self.course.replace(Arc::new(course));
        self.config.blocks_count = count;
        self.config.obstacle_kinds = kinds.to_vec();
        Ok(())
    }

    pub fn session(&self) -> &Arc<Session<C>> {
        &self.session
    }

    pub fn course(&self) -> Arc<Course> {
        self.course.current()
    }

    /// Shared handle for readers that outlive a borrow of the race.
    pub fn course_handle(&self) -> Arc<CourseHandle> {
        Arc::clone(&self.course)
    }

    pub fn camera(&self) -> &CameraRig {
        self.player.camera()
    }

    pub fn player_position(&self) -> Option<Vec3> {
        self.physics.translation(self.player.body())
    }

    pub fn level(&self) -> &LevelBodies {
        &self.level
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Simulation time driving the obstacles.
    pub fn elapsed(&self) -> Duration {
        self.time.elapsed()
    }

    pub fn hud(&self, controls: ControlInput) -> HudSnapshot {
        HudSnapshot::capture(&self.session, controls)
    }

    /// One floor-tile transform per segment, for instanced drawing.
    pub fn segment_instances(&self) -> Vec<TransformRaw> {
        let tile = Vec3::new(UNIT_SPACING, 0.2, UNIT_SPACING);
        self.course()
            .segments()
            .iter()
            .map(|s| {
                Transform::from_position(s.position + Vec3::new(0.0, -0.1, 0.0))
                    .with_scale(tile)
                    .into()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::ManualClock;
    use input::Control;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn race(config: RaceConfig) -> Race<ManualClock> {
        Race::with_clock(config, ManualClock::new()).unwrap()
    }

    /// Tick with the session clock following simulation time.
    fn run(race: &mut Race<ManualClock>, input: &ControlInput, frames: usize) {
        for _ in 0..frames {
            race.session().clock().advance(FRAME);
            race.tick(input, FRAME);
        }
    }

    #[test]
    fn rejects_empty_kinds() {
        let config = RaceConfig {
            obstacle_kinds: vec![],
            ..Default::default()
        };
        assert!(matches!(
            Race::with_clock(config, ManualClock::new()),
            Err(CourseError::EmptyObstacleKinds)
        ));
    }

    #[test]
    fn marble_rests_on_start_pad_without_input() {
        let mut race = race(RaceConfig::default());
        run(&mut race, &ControlInput::default(), 120);
        let pos = race.player_position().unwrap();
        assert!((pos.y - PLAYER_RADIUS).abs() < 0.05, "y = {}", pos.y);
        assert_eq!(race.session().phase(), GamePhase::Ready);
    }

    #[test]
    fn forward_input_starts_and_rolls_forward() {
        let mut race = race(RaceConfig::default());
        run(&mut race, &ControlInput::default(), 30);
        let before = race.player_position().unwrap();
        let forward = ControlInput::default().with(Control::Forward);
        run(&mut race, &forward, 60);
        assert_eq!(race.session().phase(), GamePhase::Playing);
        assert!(race.player_position().unwrap().z < before.z);
        assert!(race.camera().smoothed_position.z > race.player_position().unwrap().z);
    }

    #[test]
    fn reaching_goal_ends_run() {
        let config = RaceConfig {
            blocks_count: 0,
            ..Default::default()
        };
        let mut race = race(config);
        let forward = ControlInput::default().with(Control::Forward);
        run(&mut race, &forward, 1);
        assert_eq!(race.session().phase(), GamePhase::Playing);

        let goal = race.course().end().position + Vec3::new(0.0, 0.3, 0.0);
        let body = race.player.body();
        race.physics_mut().reset_body(body, goal);
        run(&mut race, &ControlInput::default(), 1);
        assert_eq!(race.session().phase(), GamePhase::Ended);
        assert!(race.hud(ControlInput::default()).show_restart);
    }

    #[test]
    fn falling_off_restarts_on_a_new_course() {
        let mut race = race(RaceConfig::default());
        let first_seed = race.course().seed();
        let forward = ControlInput::default().with(Control::Forward);
        run(&mut race, &forward, 1);
        assert_eq!(race.session().phase(), GamePhase::Playing);

        let body = race.player.body();
        race.physics_mut()
            .reset_body(body, Vec3::new(0.0, -10.0, 0.0));
        run(&mut race, &ControlInput::default(), 1);

        assert_eq!(race.session().phase(), GamePhase::Ready);
        assert_eq!(race.course().seed(), next_seed(first_seed));
        let pos = race.player_position().unwrap();
        assert!((pos - PLAYER_SPAWN).length() < 0.1);
        assert_eq!(race.level().obstacles().len(), 3);
    }

    #[test]
    fn key_held_through_fall_restarts_the_clock() {
        let mut race = race(RaceConfig::default());
        let forward = ControlInput::default().with(Control::Forward);
        run(&mut race, &forward, 30);
        assert_eq!(race.session().phase(), GamePhase::Playing);

        let body = race.player.body();
        race.physics_mut()
            .reset_body(body, Vec3::new(0.0, -10.0, 0.0));
        run(&mut race, &forward, 1);
        assert_eq!(race.session().phase(), GamePhase::Ready);

        run(&mut race, &forward, 10);
        assert_eq!(race.session().phase(), GamePhase::Playing);
        assert!(race.session().elapsed() > Duration::ZERO);
    }

    #[test]
    fn unusable_frame_cap_falls_back_to_default() {
        for bad in [f32::INFINITY, 1e30, f32::NAN] {
            let config = RaceConfig {
                max_frame_delta: bad,
                ..Default::default()
            };
            let mut race = race(config);
            race.tick(&ControlInput::default(), Duration::from_secs(3));
            assert!(race.elapsed() <= DEFAULT_MAX_DELTA, "cap {}", bad);
        }
    }

    #[test]
    fn restart_without_reseed_keeps_course() {
        let config = RaceConfig {
            reseed_on_restart: false,
            ..Default::default()
        };
        let mut race = race(config);
        let course = race.course();
        assert!(!race.restart());
        run(&mut race, &ControlInput::default().with(Control::Jump), 1);
        assert!(race.restart());
        assert_eq!(*race.course(), *course);
    }

    #[test]
    fn external_restart_is_picked_up() {
        let mut race = race(RaceConfig::default());
        run(&mut race, &ControlInput::default().with(Control::Leftward), 20);
        let seed = race.course().seed();

        let session = Arc::clone(race.session());
        assert!(session.restart());
        run(&mut race, &ControlInput::default(), 1);
        assert_eq!(race.course().seed(), next_seed(seed));
    }

    #[test]
    fn regenerate_swaps_whole_course() {
        let mut race = race(RaceConfig::default());
        let handle = race.course_handle();
        let old = handle.current();
        race.regenerate(7, 99, &[ObstacleKind::Spinner]).unwrap();
        let new = handle.current();
        assert_eq!(old.length(), 5);
        assert_eq!(new.length(), 9);
        assert_eq!(race.level().obstacles().len(), 7);
        assert!(new.obstacle_kinds().iter().all(|k| *k == ObstacleKind::Spinner));

        assert!(race.regenerate(2, 1, &[]).is_err());
        assert_eq!(race.course().length(), 9);
    }

    #[test]
    fn stalled_frame_is_clamped() {
        let mut race = race(RaceConfig::default());
        race.tick(&ControlInput::default(), Duration::from_secs(3));
        assert_eq!(race.elapsed(), Duration::from_secs_f32(0.1));
    }

    #[test]
    fn instances_line_up_with_segments() {
        let race = race(RaceConfig::default());
        let instances = race.segment_instances();
        assert_eq!(instances.len(), 5);
        assert_eq!(instances[2].model[3], [0.0, -0.1, -8.0, 1.0]);
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 5 * 64);
    }
}
