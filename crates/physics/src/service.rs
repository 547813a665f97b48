//! The operations the game issues against a rigid-body simulation.
//!
//! Game code only talks to physics through [`PhysicsService`], so a controller can be
//! exercised against a scripted stand-in as easily as against [`crate::PhysicsWorld`].

use engine_core::{Quat, Vec3};

/// First surface hit by a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the (unit) ray to the hit.
    pub time_of_impact: f32,
}

/// Rigid-body simulation as seen from gameplay code.
///
/// Lookups answer `None` when the body or query cannot be resolved; callers treat that as
/// "nothing there" rather than an error. Writes to an unknown body are ignored.
pub trait PhysicsService {
    /// Handle identifying a body inside the service.
    type Body: Copy + std::fmt::Debug;

    fn apply_impulse(&mut self, body: Self::Body, impulse: Vec3);

    fn apply_torque_impulse(&mut self, body: Self::Body, torque: Vec3);

    /// Pose target for a kinematic body, reached on the next step.
    fn set_next_kinematic_translation(&mut self, body: Self::Body, translation: Vec3);

    fn set_next_kinematic_rotation(&mut self, body: Self::Body, rotation: Quat);

    /// Cast a ray. With `solid`, a ray starting inside a shape hits it at distance zero.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, solid: bool)
        -> Option<RayHit>;

    fn translation(&self, body: Self::Body) -> Option<Vec3>;
}
