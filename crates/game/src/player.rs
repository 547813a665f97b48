//! Player controller: rolls the marble with impulses, gates jumps on a ground probe, and
//! keeps the chase camera following.

use engine_core::Clock;
use glam::Vec3;
use input::{ControlInput, EdgeDetector};
use physics::PhysicsService;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraRig, CameraTuning};
use crate::session::{GamePhase, Session};

/// Force and probe constants for the marble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerTuning {
    /// Rolling impulse per second of input.
    #[serde(default = "default_impulse")]
    pub impulse: f32,
    /// Torque impulse per second of input (makes the roll visible).
    #[serde(default = "default_torque")]
    pub torque: f32,
    /// Upward impulse of a jump.
    #[serde(default = "default_jump_impulse")]
    pub jump_impulse: f32,
    /// How far below the marble centre the ground probe starts. Just past the radius.
    #[serde(default = "default_ray_offset")]
    pub ray_offset: f32,
    #[serde(default = "default_ray_max_distance")]
    pub ray_max_distance: f32,
    /// Probe distance under which the marble counts as grounded.
    #[serde(default = "default_grounded_threshold")]
    pub grounded_threshold: f32,
    #[serde(default)]
    pub camera: CameraTuning,
}

fn default_impulse() -> f32 {
    0.6
}
fn default_torque() -> f32 {
    0.2
}
fn default_jump_impulse() -> f32 {
    0.5
}
fn default_ray_offset() -> f32 {
    0.31
}
fn default_ray_max_distance() -> f32 {
    10.0
}
fn default_grounded_threshold() -> f32 {
    0.15
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            impulse: default_impulse(),
            torque: default_torque(),
            jump_impulse: default_jump_impulse(),
            ray_offset: default_ray_offset(),
            ray_max_distance: default_ray_max_distance(),
            grounded_threshold: default_grounded_threshold(),
            camera: CameraTuning::default(),
        }
    }
}

/// What the controller did during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Combined rolling impulse sent this tick.
    pub impulse: Vec3,
    /// Combined torque impulse sent this tick.
    pub torque: Vec3,
    pub jumped: bool,
    /// This tick's input started the run.
    pub started: bool,
}

/// Sum the rolling impulse and torque for every held direction.
///
/// Forward pushes toward -Z and spins about -X; right pushes toward +X and spins about -Z.
/// Opposite directions cancel, diagonals add.
pub fn locomotion(input: &ControlInput, tuning: &ControllerTuning, dt: f32) -> (Vec3, Vec3) {
    let impulse_strength = tuning.impulse * dt;
    let torque_strength = tuning.torque * dt;

    let mut impulse = Vec3::ZERO;
    let mut torque = Vec3::ZERO;

    if input.forward {
        impulse.z -= impulse_strength;
        torque.x -= torque_strength;
    }
    if input.rightward {
        impulse.x += impulse_strength;
        torque.z -= torque_strength;
    }
    if input.backward {
        impulse.z += impulse_strength;
        torque.x += torque_strength;
    }
    if input.leftward {
        impulse.x -= impulse_strength;
        torque.z += torque_strength;
    }

    (impulse, torque)
}

/// Drives one marble body through a [`PhysicsService`].
///
/// The controller keeps no copy of the body state; position is read back from physics
/// every tick.
#[derive(Debug)]
pub struct PlayerController<B> {
    body: B,
    edges: EdgeDetector,
    camera: CameraRig,
    tuning: ControllerTuning,
}

impl<B: Copy + std::fmt::Debug> PlayerController<B> {
    pub fn new(body: B, tuning: ControllerTuning) -> Self {
        Self {
            body,
            edges: EdgeDetector::new(),
            camera: CameraRig::default(),
            tuning,
        }
    }

    pub fn body(&self) -> B {
        self.body
    }

    /// Point the controller at a replacement body.
    pub fn set_body(&mut self, body: B) {
        self.body = body;
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn tuning(&self) -> &ControllerTuning {
        &self.tuning
    }

    /// Put the camera back at its resting view of `marble`.
    pub fn reset_camera(&mut self, marble: Vec3) {
        self.camera.snap_to(marble, &self.tuning.camera);
    }

    /// Respawn at `marble`: camera snaps, and keys still held count as fresh presses.
    pub fn reset(&mut self, marble: Vec3) {
        self.edges.reset();
        self.reset_camera(marble);
    }

    /// Advance one tick.
    ///
    /// The first fresh press while the session is Ready starts the run. Once the run has
    /// ended the marble no longer answers input, but the camera keeps following it.
    pub fn update<P, C>(
        &mut self,
        physics: &mut P,
        session: &Session<C>,
        input: &ControlInput,
        dt: f32,
    ) -> TickReport
    where
        P: PhysicsService<Body = B>,
        C: Clock,
    {
        let mut report = TickReport::default();
        let edges = self.edges.update(*input);

        if edges.any && session.phase() == GamePhase::Ready {
            report.started = session.start();
        }

        let Some(position) = physics.translation(self.body) else {
            log::debug!("Player body {:?} not found; skipping tick", self.body);
            return report;
        };

        if session.phase() != GamePhase::Ended {
            let (impulse, torque) = locomotion(input, &self.tuning, dt);
            physics.apply_impulse(self.body, impulse);
            physics.apply_torque_impulse(self.body, torque);
            report.impulse = impulse;
            report.torque = torque;

            if edges.jump && self.is_grounded(physics, position) {
                physics.apply_impulse(self.body, Vec3::new(0.0, self.tuning.jump_impulse, 0.0));
                report.jumped = true;
            }
        }

        self.camera.follow(position, &self.tuning.camera, dt);
        report
    }

    /// Probe straight down from just under the marble. Runs fresh on every jump press.
    fn is_grounded<P: PhysicsService<Body = B>>(&self, physics: &P, position: Vec3) -> bool {
        let origin = position - Vec3::new(0.0, self.tuning.ray_offset, 0.0);
        match physics.cast_ray(origin, Vec3::NEG_Y, self.tuning.ray_max_distance, true) {
            Some(hit) => hit.time_of_impact < self.tuning.grounded_threshold,
            None => {
                log::trace!("Ground probe found nothing below {:?}", origin);
                false
            }
        }
    }
}
