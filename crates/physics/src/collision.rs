//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for different body types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static course geometry (floor, walls)
    Environment = 1 << 0,
    /// The marble
    Player = 1 << 1,
    /// Moving obstacles
    Obstacle = 1 << 2,
    /// Finish-line sensor
    Goal = 1 << 3,
}

impl CollisionGroup {
    /// Interaction groups for this membership.
    pub fn interaction_groups(self) -> InteractionGroups {
        let (membership, filter) = match self {
            Self::Environment => Self::environment(),
            Self::Player => Self::player(),
            Self::Obstacle => Self::obstacle(),
            Self::Goal => Self::goal(),
        };
        InteractionGroups::new(membership, filter)
    }

    /// Create a collision group for environment.
    pub fn environment() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Environment as u32);
        let filter = Group::ALL;
        (membership, filter)
    }

    /// Create a collision group for the marble.
    pub fn player() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Player as u32);
        let filter = Group::from_bits_retain(
            Self::Environment as u32 | Self::Obstacle as u32 | Self::Goal as u32,
        );
        (membership, filter)
    }

    /// Obstacles only need to push the marble around.
    pub fn obstacle() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Obstacle as u32);
        let filter = Group::from_bits_retain(Self::Player as u32);
        (membership, filter)
    }

    /// The goal sensor only cares about the marble.
    pub fn goal() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Goal as u32);
        let filter = Group::from_bits_retain(Self::Player as u32);
        (membership, filter)
    }
}
