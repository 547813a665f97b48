//! Procedural generation for marble race courses and their obstacles.

pub mod bounds;
pub mod course;
pub mod obstacle;

pub use bounds::*;
pub use course::*;
pub use obstacle::*;
