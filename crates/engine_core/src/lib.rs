//! Core engine types and utilities for the marble race.
//!
//! This crate provides the foundational types used across all game systems:
//! - Transform and per-instance transform data
//! - Frame timing with delta clamping
//! - Wall-clock sources for session timing

pub mod time;
pub mod transform;

pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
