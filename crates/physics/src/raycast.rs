//! Raycasting for ground checks and queries.

use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

impl PhysicsWorld {
    /// Cast a ray and return the first hit. Sensors are ignored.
    ///
    /// `solid` treats shapes as filled: a ray starting inside a collider reports a hit at
    /// distance zero instead of the far face.
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        solid: bool,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        let filter = QueryFilter::default().exclude_sensors();

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                solid,
                filter,
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Material;

    #[test]
    fn downward_ray_hits_floor_top() {
        let mut world = PhysicsWorld::new();
        world.add_static_cuboid(
            Vec3::new(0.0, -0.1, 0.0),
            Vec3::new(2.0, 0.1, 2.0),
            Material::new(1.0, 0.2),
        );
        world.update_query_pipeline();

        let hit = world
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y, 10.0, true)
            .unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Y).length() < 1e-4);
    }

    #[test]
    fn ray_ignores_sensors_and_misses_past_range() {
        let mut world = PhysicsWorld::new();
        world.add_sensor_cuboid(Vec3::new(0.0, -1.0, 0.0), Vec3::splat(0.5));
        world.update_query_pipeline();
        assert!(world
            .raycast(Vec3::ZERO, Vec3::NEG_Y, 10.0, true)
            .is_none());
    }
}
