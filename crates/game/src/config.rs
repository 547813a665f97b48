//! Race configuration. Loaded from config.ron at startup.

use anyhow::Context;
use procgen::{ObstacleKind, DEFAULT_OBSTACLE_KINDS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::player::ControllerTuning;

/// Course layout and tuning. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Obstacle segments between the start and finish pads.
    #[serde(default = "default_blocks_count")]
    pub blocks_count: u32,
    /// Seed of the first course.
    #[serde(default)]
    pub seed: u64,
    /// Obstacle families to draw from. Must not be empty.
    #[serde(default = "default_obstacle_kinds")]
    pub obstacle_kinds: Vec<ObstacleKind>,
    /// Lay out a fresh course (next seed) every time the run restarts.
    #[serde(default = "default_true")]
    pub reseed_on_restart: bool,
    /// Longest frame delta fed to the simulation, in seconds.
    #[serde(default = "default_max_frame_delta")]
    pub max_frame_delta: f32,
    /// Falling below this height sends the marble back to the start.
    #[serde(default = "default_fall_limit")]
    pub fall_limit: f32,
    #[serde(default)]
    pub controller: ControllerTuning,
}

fn default_blocks_count() -> u32 {
    3
}
fn default_obstacle_kinds() -> Vec<ObstacleKind> {
    DEFAULT_OBSTACLE_KINDS.to_vec()
}
fn default_true() -> bool {
    true
}
fn default_max_frame_delta() -> f32 {
    0.1
}
fn default_fall_limit() -> f32 {
    -4.0
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            blocks_count: default_blocks_count(),
            seed: 0,
            obstacle_kinds: default_obstacle_kinds(),
            reseed_on_restart: default_true(),
            max_frame_delta: default_max_frame_delta(),
            fall_limit: default_fall_limit(),
            controller: ControllerTuning::default(),
        }
    }
}

impl RaceConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Missing or malformed files are errors.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        ron::from_str(&data).with_context(|| format!("parsing {}", path.display()))
    }

    /// Save current config to `path` as pretty RON.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let s = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("serialising config")?;
        std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        if let Err(e) = self.save_to(&config_path()) {
            log::warn!("Could not write config: {:#}", e);
        }
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.ron")
}
