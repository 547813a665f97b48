//! Marble race: roll a marble down a procedurally laid obstacle course against the clock.
//!
//! - `session`: Ready/Playing/Ended state machine and run timing
//! - `player`: impulse locomotion, ground-probed jumps, chase camera
//! - `level`: physics bodies for a generated course
//! - `race`: the per-tick loop tying it all together

pub mod camera;
pub mod config;
pub mod hud;
pub mod level;
pub mod player;
pub mod race;
pub mod session;

pub use camera::{CameraRig, CameraTuning};
pub use config::RaceConfig;
pub use hud::{format_time, HudSnapshot};
pub use level::{LevelBodies, ObstacleBody};
pub use player::{locomotion, ControllerTuning, PlayerController, TickReport};
pub use race::{CourseHandle, Race, PLAYER_RADIUS, PLAYER_SPAWN};
pub use session::{GamePhase, Session, SessionState};
