//! Chase camera that trails the marble.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Where the camera sits relative to the marble and how quickly it catches up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTuning {
    /// Eye offset from the marble: behind it along the travel axis and a little above.
    #[serde(default = "default_position_offset")]
    pub position_offset: Vec3,
    /// Look-at offset from the marble.
    #[serde(default = "default_target_offset")]
    pub target_offset: Vec3,
    /// Catch-up rate per second.
    #[serde(default = "default_smoothing_rate")]
    pub smoothing_rate: f32,
}

fn default_position_offset() -> Vec3 {
    Vec3::new(0.0, 0.65, 2.25)
}
fn default_target_offset() -> Vec3 {
    Vec3::new(0.0, 0.25, 0.0)
}
fn default_smoothing_rate() -> f32 {
    5.0
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            position_offset: default_position_offset(),
            target_offset: default_target_offset(),
            smoothing_rate: default_smoothing_rate(),
        }
    }
}

/// Smoothed eye and look-at points handed to the render camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub smoothed_position: Vec3,
    pub smoothed_target: Vec3,
}

impl Default for CameraRig {
    /// High and to the side, so the first frames swoop in instead of starting under the floor.
    fn default() -> Self {
        Self {
            smoothed_position: Vec3::splat(10.0),
            smoothed_target: Vec3::ZERO,
        }
    }
}

impl CameraRig {
    /// Move part of the way toward the marble at `marble`.
    ///
    /// A blend factor (`rate * dt`) of 1 or more snaps onto the target, so a long frame never
    /// overshoots.
    pub fn follow(&mut self, marble: Vec3, tuning: &CameraTuning, dt: f32) {
        let t = (tuning.smoothing_rate * dt).max(0.0);
        if t >= 1.0 {
            self.snap_to(marble, tuning);
            return;
        }
        self.smoothed_position = self
            .smoothed_position
            .lerp(marble + tuning.position_offset, t);
        self.smoothed_target = self.smoothed_target.lerp(marble + tuning.target_offset, t);
    }

    /// Jump straight to the resting view of `marble`.
    pub fn snap_to(&mut self, marble: Vec3, tuning: &CameraTuning) {
        self.smoothed_position = marble + tuning.position_offset;
        self.smoothed_target = marble + tuning.target_offset;
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.smoothed_position, self.smoothed_target, Vec3::Y)
    }
}
