//! Static geometry enclosing a course: two side walls, an end wall and one long floor.

use glam::Vec3;

use crate::course::UNIT_SPACING;

const WALL_HEIGHT: f32 = 1.5;
const WALL_THICKNESS: f32 = 0.3;
/// Wall centre distance from the course axis.
const WALL_OFFSET: f32 = 2.15;
const FLOOR_THICKNESS: f32 = 0.2;

/// An axis-aligned box with its contact material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub friction: f32,
    pub restitution: f32,
}

/// Walls and floor for a course of `length` segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseBounds {
    pub left_wall: BoundsBox,
    pub right_wall: BoundsBox,
    pub end_wall: BoundsBox,
    pub floor: BoundsBox,
}

impl CourseBounds {
    pub fn for_length(length: u32) -> Self {
        let length = length as f32;
        let span = UNIT_SPACING * length;
        // Segment 0 is centred on the origin, so the run starts half a segment behind it.
        let mid_z = -span / 2.0 + UNIT_SPACING / 2.0;
        let wall_y = WALL_HEIGHT / 2.0;

        let side_wall = |x: f32| BoundsBox {
            center: Vec3::new(x, wall_y, mid_z),
            half_extents: Vec3::new(WALL_THICKNESS / 2.0, WALL_HEIGHT / 2.0, span / 2.0),
            friction: 0.0,
            restitution: 0.2,
        };

        Self {
            left_wall: side_wall(-WALL_OFFSET),
            right_wall: side_wall(WALL_OFFSET),
            end_wall: BoundsBox {
                center: Vec3::new(0.0, wall_y, -span + UNIT_SPACING / 2.0),
                half_extents: Vec3::new(UNIT_SPACING / 2.0, WALL_HEIGHT / 2.0, WALL_THICKNESS / 2.0),
                friction: 0.0,
                restitution: 0.2,
            },
            floor: BoundsBox {
                center: Vec3::new(0.0, -FLOOR_THICKNESS / 2.0, mid_z),
                half_extents: Vec3::new(UNIT_SPACING / 2.0, FLOOR_THICKNESS / 2.0, span / 2.0),
                // Friction keeps the marble from skating the whole run.
                friction: 1.0,
                restitution: 0.2,
            },
        }
    }

    /// All four boxes.
    pub fn boxes(&self) -> [BoundsBox; 4] {
        [self.left_wall, self.right_wall, self.end_wall, self.floor]
    }
}
