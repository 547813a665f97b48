//! Kinematic obstacle motion.
//!
//! Obstacles are moved by dictating a target pose every tick, never by forces. The pose is
//! a pure function of elapsed simulation time and the segment's sampled parameters.

use glam::{Quat, Vec3};

use crate::course::{ObstacleKind, Segment, SegmentKind};

/// Where an obstacle body sits (relative to its segment centre) before it starts moving.
pub const OBSTACLE_SPAWN_OFFSET: Vec3 = Vec3::new(0.0, 0.3, 0.0);

/// Limbo bar rest height above the floor.
pub const LIMBO_BASE_HEIGHT: f32 = 1.15;
/// Axe swing half-width.
pub const AXE_SWING: f32 = 1.25;
/// Axe pivot height above the floor.
pub const AXE_HEIGHT: f32 = 0.75;

/// Target pose of an obstacle body, offset from its segment centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstaclePose {
    pub offset: Vec3,
    pub rotation: Quat,
}

impl ObstaclePose {
    /// World-space translation for a body on `segment`.
    pub fn translation(&self, segment: &Segment) -> Vec3 {
        segment.position + self.offset
    }
}

impl SegmentKind {
    /// Pose at `elapsed` seconds, or `None` for the start/end pads.
    pub fn pose_at(&self, elapsed: f32) -> Option<ObstaclePose> {
        match *self {
            SegmentKind::Start | SegmentKind::End => None,
            SegmentKind::Spinner { speed } => Some(ObstaclePose {
                offset: OBSTACLE_SPAWN_OFFSET,
                rotation: Quat::from_rotation_y(elapsed * speed),
            }),
            SegmentKind::Limbo { time_offset } => Some(ObstaclePose {
                offset: Vec3::new(0.0, (elapsed + time_offset).sin() + LIMBO_BASE_HEIGHT, 0.0),
                rotation: Quat::IDENTITY,
            }),
            SegmentKind::Axe { time_offset } => Some(ObstaclePose {
                offset: Vec3::new((elapsed + time_offset).sin() * AXE_SWING, AXE_HEIGHT, 0.0),
                rotation: Quat::IDENTITY,
            }),
        }
    }
}

impl Segment {
    /// See [`SegmentKind::pose_at`].
    pub fn pose_at(&self, elapsed: f32) -> Option<ObstaclePose> {
        self.kind.pose_at(elapsed)
    }
}

impl ObstacleKind {
    /// Half extents of the obstacle's box collider.
    pub fn half_extents(&self) -> Vec3 {
        match self {
            // 3.5 x 0.3 x 0.3 bar
            ObstacleKind::Spinner | ObstacleKind::Limbo => Vec3::new(1.75, 0.15, 0.15),
            // 1.5 x 1.5 x 0.3 slab
            ObstacleKind::Axe => Vec3::new(0.75, 0.75, 0.15),
        }
    }

    /// Whether the pose includes a rotation worth sending to the physics service.
    pub fn rotates(&self) -> bool {
        matches!(self, ObstacleKind::Spinner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::segment_position;
    use std::f32::consts::FRAC_PI_2;

    fn segment(kind: SegmentKind) -> Segment {
        Segment {
            kind,
            index: 2,
            position: segment_position(2),
        }
    }

    #[test]
    fn pads_have_no_pose() {
        assert!(SegmentKind::Start.pose_at(1.0).is_none());
        assert!(SegmentKind::End.pose_at(1.0).is_none());
    }

    #[test]
    fn spinner_rotates_without_translating() {
        let pose = SegmentKind::Spinner { speed: 0.5 }.pose_at(2.0).unwrap();
        assert_eq!(pose.offset, OBSTACLE_SPAWN_OFFSET);
        let expected = Quat::from_rotation_y(1.0);
        assert!(pose.rotation.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn limbo_peaks_at_quarter_phase() {
        let seg = segment(SegmentKind::Limbo { time_offset: 0.0 });
        let pose = seg.pose_at(FRAC_PI_2).unwrap();
        assert!((pose.offset.y - 2.15).abs() < 1e-5);
        assert_eq!(pose.offset.x, 0.0);
        assert_eq!(pose.rotation, Quat::IDENTITY);
        let world = pose.translation(&seg);
        assert_eq!(world.z, -8.0);
    }

    #[test]
    fn axe_swings_sideways_at_fixed_height() {
        let seg = segment(SegmentKind::Axe { time_offset: FRAC_PI_2 });
        let pose = seg.pose_at(0.0).unwrap();
        assert!((pose.offset.x - AXE_SWING).abs() < 1e-5);
        assert_eq!(pose.offset.y, AXE_HEIGHT);
        assert_eq!(pose.offset.z, 0.0);
    }

    #[test]
    fn pose_is_reproducible() {
        let kind = SegmentKind::Axe { time_offset: 1.7 };
        assert_eq!(kind.pose_at(12.345), kind.pose_at(12.345));
    }

    #[test]
    fn only_spinners_rotate() {
        assert!(ObstacleKind::Spinner.rotates());
        assert!(!ObstacleKind::Limbo.rotates());
        assert!(!ObstacleKind::Axe.rotates());
    }
}
