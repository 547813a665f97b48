//! Physics bodies for a generated course: kinematic obstacles, static bounds, goal sensor.

use glam::Vec3;
use physics::{ColliderHandle, Material, PhysicsService, PhysicsWorld, RigidBodyHandle};
use procgen::{Course, ObstacleKind, Segment, OBSTACLE_SPAWN_OFFSET};

/// Low friction so the marble glances off obstacles instead of sticking to them.
const OBSTACLE_MATERIAL: Material = Material::new(0.0, 0.2);

/// Finish sensor, centred a little above the end pad.
const GOAL_OFFSET: Vec3 = Vec3::new(0.0, 0.25, 0.0);
const GOAL_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 0.35, 0.5);

/// A kinematic obstacle and the segment it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct ObstacleBody {
    pub segment: Segment,
    pub kind: ObstacleKind,
    pub body: RigidBodyHandle,
}

/// Everything a course put into the physics world.
#[derive(Debug)]
pub struct LevelBodies {
    obstacles: Vec<ObstacleBody>,
    bounds: Vec<ColliderHandle>,
    goal: ColliderHandle,
}

impl LevelBodies {
    /// Insert the course's bodies into `world`.
    pub fn build(world: &mut PhysicsWorld, course: &Course) -> Self {
        let obstacles: Vec<ObstacleBody> = course
            .segments()
            .iter()
            .filter_map(|segment| {
                let kind = segment.kind.obstacle_kind()?;
                let body = world.add_kinematic_box(
                    segment.position + OBSTACLE_SPAWN_OFFSET,
                    kind.half_extents(),
                    OBSTACLE_MATERIAL,
                );
                Some(ObstacleBody {
                    segment: *segment,
                    kind,
                    body,
                })
            })
            .collect();

        let bounds = course
            .bounds()
            .boxes()
            .iter()
            .map(|b| {
                world.add_static_cuboid(
                    b.center,
                    b.half_extents,
                    Material::new(b.friction, b.restitution),
                )
            })
            .collect();

        let goal = world.add_sensor_cuboid(course.end().position + GOAL_OFFSET, GOAL_HALF_EXTENTS);
        world.update_query_pipeline();

        log::debug!(
            "Built level: {} obstacle bodies, goal at {:?}",
            obstacles.len(),
            course.end().position
        );

        Self {
            obstacles,
            bounds,
            goal,
        }
    }

    pub fn obstacles(&self) -> &[ObstacleBody] {
        &self.obstacles
    }

    pub fn goal(&self) -> ColliderHandle {
        self.goal
    }

    /// Send every obstacle its pose for `elapsed` seconds of simulation time.
    pub fn drive<P>(&self, physics: &mut P, elapsed: f32)
    where
        P: PhysicsService<Body = RigidBodyHandle>,
    {
        for obstacle in &self.obstacles {
            let Some(pose) = obstacle.segment.pose_at(elapsed) else {
                continue;
            };
            if obstacle.kind.rotates() {
                physics.set_next_kinematic_rotation(obstacle.body, pose.rotation);
            } else {
                physics.set_next_kinematic_translation(
                    obstacle.body,
                    pose.translation(&obstacle.segment),
                );
            }
        }
    }

    /// Take every body and collider back out of `world`.
    pub fn remove(self, world: &mut PhysicsWorld) {
        for obstacle in self.obstacles {
            world.remove_body(obstacle.body);
        }
        for collider in self.bounds {
            world.remove_collider(collider);
        }
        world.remove_collider(self.goal);
        world.update_query_pipeline();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procgen::{generate, DEFAULT_OBSTACLE_KINDS};

    #[test]
    fn one_body_per_obstacle() {
        let mut world = PhysicsWorld::new();
        let course = generate(4, 9, &DEFAULT_OBSTACLE_KINDS).unwrap();
        let level = LevelBodies::build(&mut world, &course);
        assert_eq!(level.obstacles().len(), 4);
        assert_eq!(world.rigid_body_set.len(), 4);
        // 4 obstacle boxes + 4 bounds + goal
        assert_eq!(world.collider_set.len(), 9);

        level.remove(&mut world);
        assert_eq!(world.rigid_body_set.len(), 0);
        assert_eq!(world.collider_set.len(), 0);
    }

    #[test]
    fn driven_obstacles_follow_their_pose() {
        let mut world = PhysicsWorld::new();
        let course = generate(6, 3, &DEFAULT_OBSTACLE_KINDS).unwrap();
        let level = LevelBodies::build(&mut world, &course);
        let elapsed = 1.3;
        level.drive(&mut world, elapsed);
        world.step(1.0 / 60.0);

        for obstacle in level.obstacles() {
            let pose = obstacle.segment.pose_at(elapsed).unwrap();
            let t = world.get_body_transform(obstacle.body).unwrap();
            assert!((t.position - pose.translation(&obstacle.segment)).length() < 1e-4);
            assert!(t.rotation.abs_diff_eq(pose.rotation, 1e-4));
        }
    }

    #[test]
    fn floor_is_under_every_segment() {
        let mut world = PhysicsWorld::new();
        let course = generate(3, 1, &DEFAULT_OBSTACLE_KINDS).unwrap();
        let _level = LevelBodies::build(&mut world, &course);
        for segment in course.segments() {
            // Probe from beside the obstacles.
            let origin = segment.position + Vec3::new(1.9, 3.0, 1.9);
            let hit = world.raycast(origin, Vec3::NEG_Y, 10.0, true).unwrap();
            assert!((hit.point.y - 0.0).abs() < 1e-4, "segment {}", segment.index);
        }
    }
}
