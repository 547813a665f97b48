//! Physics world management with Rapier3D.

use crate::collision::CollisionGroup;
use crate::service::{PhysicsService, RayHit};
use engine_core::{Quat, Transform, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;

/// Contact material used by every marble-race collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
}

impl Material {
    pub const fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Step the physics simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Update query pipeline for raycasting.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add the player's ball: dynamic, damped so it coasts to a stop, never sleeps.
    pub fn add_ball_body(
        &mut self,
        position: Vec3,
        radius: f32,
        material: Material,
        damping: f32,
    ) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .linear_damping(damping)
            .angular_damping(damping)
            .can_sleep(false)
            .build();
        let handle = self.rigid_body_set.insert(rigid_body);
        let collider = ColliderBuilder::ball(radius)
            .friction(material.friction)
            .restitution(material.restitution)
            .collision_groups(CollisionGroup::Player.interaction_groups())
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        handle
    }

    /// Add a kinematic box driven by pose targets (obstacles).
    pub fn add_kinematic_box(
        &mut self,
        position: Vec3,
        half_extents: Vec3,
        material: Material,
    ) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![position.x, position.y, position.z])
            .build();
        let handle = self.rigid_body_set.insert(rigid_body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .friction(material.friction)
            .restitution(material.restitution)
            .collision_groups(CollisionGroup::Obstacle.interaction_groups())
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        handle
    }

    /// Add a static cuboid collider. No parent body; collider is fixed in world.
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        half_extents: Vec3,
        material: Material,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![translation.x, translation.y, translation.z])
            .friction(material.friction)
            .restitution(material.restitution)
            .collision_groups(CollisionGroup::Environment.interaction_groups())
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a box sensor (finish line). Reports overlaps, never pushes back.
    pub fn add_sensor_cuboid(&mut self, translation: Vec3, half_extents: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![translation.x, translation.y, translation.z])
            .sensor(true)
            .collision_groups(CollisionGroup::Goal.interaction_groups())
            .build();
        self.collider_set.insert(collider)
    }

    /// Whether any collider of `body` overlaps `sensor` after the last step.
    pub fn body_in_sensor(&self, sensor: ColliderHandle, body: RigidBodyHandle) -> bool {
        self.rigid_body_set.get(body).is_some_and(|rb| {
            rb.colliders()
                .iter()
                .any(|&c| self.narrow_phase.intersection_pair(sensor, c) == Some(true))
        })
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }

    /// Get the transform of a rigid body.
    pub fn get_body_transform(&self, handle: RigidBodyHandle) -> Option<Transform> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            let rot = body.rotation();
            Transform {
                position: Vec3::new(pos.x, pos.y, pos.z),
                rotation: Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w),
                scale: Vec3::ONE,
            }
        })
    }

    /// Get the linear velocity of a rigid body.
    pub fn body_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let v = body.linvel();
            Vec3::new(v.x, v.y, v.z)
        })
    }

    /// Teleport a body and bring it to rest.
    pub fn reset_body(&mut self, handle: RigidBodyHandle, position: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(vector![position.x, position.y, position.z], true);
            body.set_rotation(UnitQuaternion::identity(), true);
            body.set_linvel(Vector::zeros(), true);
            body.set_angvel(Vector::zeros(), true);
        } else {
            log::debug!("reset_body: no body {:?}", handle);
        }
    }

    /// Remove a rigid body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }
}

impl PhysicsService for PhysicsWorld {
    type Body = RigidBodyHandle;

    fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(body) {
            body.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
    }

    fn apply_torque_impulse(&mut self, body: RigidBodyHandle, torque: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(body) {
            body.apply_torque_impulse(vector![torque.x, torque.y, torque.z], true);
        }
    }

    fn set_next_kinematic_translation(&mut self, body: RigidBodyHandle, translation: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(body) {
            body.set_next_kinematic_translation(vector![
                translation.x,
                translation.y,
                translation.z
            ]);
        }
    }

    fn set_next_kinematic_rotation(&mut self, body: RigidBodyHandle, rotation: Quat) {
        if let Some(body) = self.rigid_body_set.get_mut(body) {
            let q = Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z);
            body.set_next_kinematic_rotation(UnitQuaternion::from_quaternion(q));
        }
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        solid: bool,
    ) -> Option<RayHit> {
        self.raycast(origin, direction, max_distance, solid)
            .map(|hit| RayHit {
                time_of_impact: hit.distance,
            })
    }

    fn translation(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body).map(|rb| {
            let t = rb.translation();
            Vec3::new(t.x, t.y, t.z)
        })
    }
}
