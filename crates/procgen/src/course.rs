//! Course generation: a straight run of fixed-size segments from start pad to finish.
//!
//! Every interior segment draws its obstacle kind and motion parameters from its own
//! RNG stream, seeded from `(seed, index)`. The same `(count, seed, kinds)` always
//! produces the same course, and changing `count` never reshuffles the segments that
//! both courses share.

use glam::Vec3;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use thiserror::Error;

use crate::bounds::CourseBounds;

/// Distance between consecutive segment centres along the travel axis.
pub const UNIT_SPACING: f32 = 4.0;

/// Upper bound on interior segments accepted by [`generate`].
pub const MAX_SEGMENTS: u32 = 10_000;

/// Obstacle set used when the caller has no preference.
pub const DEFAULT_OBSTACLE_KINDS: [ObstacleKind; 3] =
    [ObstacleKind::Spinner, ObstacleKind::Axe, ObstacleKind::Limbo];

/// Obstacle families a course can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Bar rotating about the vertical axis.
    Spinner,
    /// Bar bobbing up and down.
    Limbo,
    /// Slab swinging side to side.
    Axe,
}

/// What occupies a segment, with the per-obstacle motion parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentKind {
    Start,
    End,
    /// Angular rate in rad/s; sign picks the direction of spin.
    Spinner { speed: f32 },
    Limbo { time_offset: f32 },
    Axe { time_offset: f32 },
}

impl SegmentKind {
    /// The obstacle family, or `None` for the start/end pads.
    pub fn obstacle_kind(&self) -> Option<ObstacleKind> {
        match self {
            SegmentKind::Start | SegmentKind::End => None,
            SegmentKind::Spinner { .. } => Some(ObstacleKind::Spinner),
            SegmentKind::Limbo { .. } => Some(ObstacleKind::Limbo),
            SegmentKind::Axe { .. } => Some(ObstacleKind::Axe),
        }
    }
}

/// One slice of the course.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// 0 for the start pad, `count + 1` for the finish.
    pub index: u32,
    /// Centre of the segment floor.
    pub position: Vec3,
}

impl Segment {
    fn at(index: u32, kind: SegmentKind) -> Self {
        Self {
            kind,
            index,
            position: segment_position(index),
        }
    }

    pub fn is_obstacle(&self) -> bool {
        self.kind.obstacle_kind().is_some()
    }
}

/// Centre of the segment at `index`.
pub fn segment_position(index: u32) -> Vec3 {
    Vec3::new(0.0, 0.0, -(index as f32) * UNIT_SPACING)
}

/// Rejected generation input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseError {
    #[error("obstacle kind set is empty")]
    EmptyObstacleKinds,
    #[error("segment count {count} exceeds maximum of {max}")]
    TooManySegments { count: u32, max: u32 },
}

/// A generated course: start pad, `count` obstacles, finish pad.
///
/// Only [`generate`] builds one, so there are always at least the two pads.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    seed: u64,
    segments: Vec<Segment>,
    length: u32,
}

impl Course {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment count including start and end; sizes the boundary walls.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Number of obstacle segments.
    pub fn obstacle_count(&self) -> u32 {
        self.length.saturating_sub(2)
    }

    pub fn start(&self) -> &Segment {
        &self.segments[0]
    }

    pub fn end(&self) -> &Segment {
        &self.segments[self.segments.len() - 1]
    }

    /// Obstacle segments in course order.
    pub fn obstacles(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_obstacle())
    }

    /// Obstacle kinds in course order.
    pub fn obstacle_kinds(&self) -> Vec<ObstacleKind> {
        self.segments
            .iter()
            .filter_map(|s| s.kind.obstacle_kind())
            .collect()
    }

    /// Walls and floor enclosing this course.
    pub fn bounds(&self) -> CourseBounds {
        CourseBounds::for_length(self.length)
    }
}

/// Generate a course of `count` obstacles.
pub fn generate(count: u32, seed: u64, kinds: &[ObstacleKind]) -> Result<Course, CourseError> {
    if kinds.is_empty() {
        return Err(CourseError::EmptyObstacleKinds);
    }
    if count > MAX_SEGMENTS {
        return Err(CourseError::TooManySegments {
            count,
            max: MAX_SEGMENTS,
        });
    }

    let mut segments = Vec::with_capacity(count as usize + 2);
    segments.push(Segment::at(0, SegmentKind::Start));
    for i in 0..count {
        let mut rng = segment_rng(seed, i);
        let kind = kinds[rng.gen_range(0..kinds.len())];
        let segment_kind = sample_segment(kind, &mut rng);
        log::debug!("Segment {}: {:?}", i + 1, segment_kind);
        segments.push(Segment::at(i + 1, segment_kind));
    }
    segments.push(Segment::at(count + 1, SegmentKind::End));

    log::info!("Generated course: seed={} obstacles={}", seed, count);

    Ok(Course {
        seed,
        segments,
        length: count + 2,
    })
}

/// Independent stream for interior segment `index`.
fn segment_rng(seed: u64, index: u32) -> StdRng {
    let stream = (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(seed ^ stream)
}

fn sample_segment(kind: ObstacleKind, rng: &mut StdRng) -> SegmentKind {
    match kind {
        ObstacleKind::Spinner => {
            // Never slower than 0.2 rad/s, either direction.
            let magnitude = rng.gen::<f32>() + 0.2;
            let direction = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
            SegmentKind::Spinner {
                speed: magnitude * direction,
            }
        }
        ObstacleKind::Limbo => SegmentKind::Limbo {
            time_offset: rng.gen::<f32>() * TAU,
        },
        ObstacleKind::Axe => SegmentKind::Axe {
            time_offset: rng.gen::<f32>() * TAU,
        },
    }
}

/// Seed for the course after `seed` (splitmix64 step).
pub fn next_seed(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn three_obstacles_seed_42_layout() {
        let course = generate(3, 42, &DEFAULT_OBSTACLE_KINDS).unwrap();
        assert_eq!(course.segments.len(), 5);
        assert_eq!(course.length, 5);
        let zs: Vec<f32> = course.segments.iter().map(|s| s.position.z).collect();
        assert_eq!(zs, vec![0.0, -4.0, -8.0, -12.0, -16.0]);
        assert_eq!(course.start().kind, SegmentKind::Start);
        assert_eq!(course.end().kind, SegmentKind::End);
        assert_eq!(course.end().index, 4);

        let again = generate(3, 42, &DEFAULT_OBSTACLE_KINDS).unwrap();
        assert_eq!(course.obstacle_kinds(), again.obstacle_kinds());
        assert_eq!(course, again);
    }

    #[test]
    fn zero_obstacles_is_start_then_end() {
        let course = generate(0, 7, &DEFAULT_OBSTACLE_KINDS).unwrap();
        assert_eq!(course.length, 2);
        assert_eq!(course.segments.len(), 2);
        assert_eq!(course.obstacle_count(), 0);
        assert_eq!(course.length(), 2);
        assert_eq!(course.end().position, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(course.obstacles().count(), 0);
    }

    #[test]
    fn empty_kind_set_is_rejected() {
        assert_eq!(generate(3, 1, &[]), Err(CourseError::EmptyObstacleKinds));
    }

    #[test]
    fn oversized_count_is_rejected() {
        assert_eq!(
            generate(MAX_SEGMENTS + 1, 1, &DEFAULT_OBSTACLE_KINDS),
            Err(CourseError::TooManySegments {
                count: MAX_SEGMENTS + 1,
                max: MAX_SEGMENTS
            })
        );
    }

    #[test]
    fn single_kind_set_fills_every_slot() {
        let course = generate(6, 99, &[ObstacleKind::Axe]).unwrap();
        assert!(course.obstacle_kinds().iter().all(|k| *k == ObstacleKind::Axe));
    }

    #[test]
    fn longer_course_keeps_shared_prefix() {
        let short = generate(4, 1234, &DEFAULT_OBSTACLE_KINDS).unwrap();
        let long = generate(9, 1234, &DEFAULT_OBSTACLE_KINDS).unwrap();
        assert_eq!(short.segments[1..5], long.segments[1..5]);
    }

    #[test]
    fn different_seeds_differ() {
        // 20 independent draws from 3 kinds colliding exactly is vanishingly unlikely.
        let a = generate(20, 1, &DEFAULT_OBSTACLE_KINDS).unwrap();
        let b = generate(20, 2, &DEFAULT_OBSTACLE_KINDS).unwrap();
        assert_ne!(a.segments, b.segments);
    }

    #[test]
    fn spinner_speed_is_at_least_threshold() {
        let course = generate(200, 5, &[ObstacleKind::Spinner]).unwrap();
        for segment in course.obstacles() {
            match segment.kind {
                SegmentKind::Spinner { speed } => {
                    assert!(speed.abs() >= 0.2 && speed.abs() < 1.2, "speed {}", speed)
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn next_seed_advances() {
        assert_ne!(next_seed(0), 0);
        assert_ne!(next_seed(next_seed(0)), next_seed(0));
        assert_eq!(next_seed(77), next_seed(77));
    }

    proptest! {
        #[test]
        fn generate_is_pure(count in 0u32..64, seed in any::<u64>()) {
            let a = generate(count, seed, &DEFAULT_OBSTACLE_KINDS).unwrap();
            let b = generate(count, seed, &DEFAULT_OBSTACLE_KINDS).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn positions_step_back_by_unit_spacing(count in 0u32..64, seed in any::<u64>()) {
            let course = generate(count, seed, &DEFAULT_OBSTACLE_KINDS).unwrap();
            prop_assert_eq!(course.length, count + 2);
            prop_assert_eq!(course.segments.len() as u32, count + 2);
            for (i, pair) in course.segments.windows(2).enumerate() {
                prop_assert_eq!(pair[0].index, i as u32);
                prop_assert_eq!(pair[1].position.z - pair[0].position.z, -UNIT_SPACING);
            }
            prop_assert_eq!(course.obstacles().count() as u32, count);
        }
    }
}
