//! Physics for the marble race: the service interface the game drives, and a Rapier3D
//! world that implements it.

pub mod collision;
pub mod physics_world;
pub mod raycast;
pub mod service;

pub use collision::*;
pub use physics_world::*;
pub use raycast::*;
pub use service::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
