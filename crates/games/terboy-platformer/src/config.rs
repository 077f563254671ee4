use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Env var naming a TOML file that overrides the defaults.
pub const CONFIG_ENV: &str = "TERBOY_PLATFORMER_CONFIG";
/// Fallback config location, relative to the working directory.
pub const CONFIG_PATH: &str = "config/platformer.toml";

/// Tile size in world units.
pub const TILE_SIZE: f32 = 36.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Horizontal and vertical motion constants, in world units per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Added to vx per frame in the input direction.
    pub run_acceleration: f32,
    /// Friction factor while a direction is held (vx *= 1 - f).
    pub start_friction: f32,
    /// Friction factor while idle.
    pub stop_friction: f32,
    pub max_x_speed: f32,
    pub max_y_speed: f32,
    /// Gravity while ascending with jump held.
    pub gravity_hold: f32,
    /// Gravity in every other case.
    pub gravity: f32,
    /// |vx| above this selects the run animation.
    pub run_anim_threshold: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            run_acceleration: 0.8,
            start_friction: 0.001,
            stop_friction: 0.1,
            max_x_speed: 10.0,
            max_y_speed: 18.0,
            gravity_hold: 0.3,
            gravity: 0.6,
            run_anim_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub jump_speed: f32,
    /// Frames after leaving the ground that still count as grounded.
    pub grounded_tolerance: u32,
    /// Frames a jump press stays buffered before landing.
    pub buffer_frames: u32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            jump_speed: 14.0,
            grounded_tolerance: 4,
            buffer_frames: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub jump_x_speed: f32,
    pub jump_y_speed: f32,
    /// Maximum descending speed while sliding down a wall.
    pub slide_speed: f32,
    /// Multiplier applied to vy during the momentum window.
    pub momentum_preserve: f32,
    pub momentum_frames: u32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            jump_x_speed: 9.0,
            jump_y_speed: 15.0,
            slide_speed: 0.7,
            momentum_preserve: 0.15,
            momentum_frames: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    /// Spike hitbox width as a fraction of the tile.
    pub spike_width_ratio: f32,
    /// Spike hitbox height as a fraction of the tile.
    pub spike_height_ratio: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            spike_width_ratio: 0.6,
            spike_height_ratio: 0.25,
        }
    }
}

/// Tag classification of tile types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    pub solid: BTreeSet<String>,
    pub autotile: BTreeSet<String>,
    pub lethal: BTreeSet<String>,
    pub goal: BTreeSet<String>,
}

fn tags(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for TagConfig {
    fn default() -> Self {
        let terrain = [
            "grass",
            "stone",
            "hardened_clay",
            "ores",
            "weather",
            "nether",
        ];
        Self {
            solid: tags(&terrain),
            autotile: tags(&terrain),
            lethal: tags(&["spikes", "saws", "kill"]),
            goal: tags(&["finish"]),
        }
    }
}

impl TagConfig {
    pub fn is_solid(&self, tag: &str) -> bool {
        self.solid.contains(tag)
    }

    pub fn is_lethal(&self, tag: &str) -> bool {
        self.lethal.contains(tag)
    }

    pub fn is_goal(&self, tag: &str) -> bool {
        self.goal.contains(tag)
    }

    pub fn is_interactive(&self, tag: &str) -> bool {
        self.is_lethal(tag) || self.is_goal(tag)
    }
}

/// Per-level rules outside the movement model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Tiles below the lowest grid row before the player counts as fallen out.
    pub below_map_margin_tiles: f32,
    /// Frames the death pose is shown before physics freezes.
    pub death_hold_frames: u32,
    /// Spawn position in world units when the level has no spawner.
    pub fallback_spawn: (f32, f32),
    /// Simulation rate; one tick is one frame.
    pub tick_rate_hz: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            below_map_margin_tiles: 2.0,
            death_hold_frames: 60,
            fallback_spawn: (10.0, 10.0),
            tick_rate_hz: 60.0,
        }
    }
}

/// Top-level platformer configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub tile_size: f32,
    /// Player hitbox as a fraction of the tile, (w, h).
    pub player_size_ratio: (f32, f32),
    pub movement: MovementConfig,
    pub jump: JumpConfig,
    pub wall: WallConfig,
    pub hazards: HazardConfig,
    pub tags: TagConfig,
    pub stage: StageConfig,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            player_size_ratio: (0.8, 0.8),
            movement: MovementConfig::default(),
            jump: JumpConfig::default(),
            wall: WallConfig::default(),
            hazards: HazardConfig::default(),
            tags: TagConfig::default(),
            stage: StageConfig::default(),
        }
    }
}

impl PlatformerConfig {
    /// Load config from `TERBOY_PLATFORMER_CONFIG` or `config/platformer.toml`.
    /// Falls back to defaults if neither file is readable or parseable.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            match Self::from_path(&path) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!("{e}, trying {CONFIG_PATH}"),
            }
        }
        match Self::from_path(CONFIG_PATH) {
            Ok(cfg) => cfg,
            Err(ConfigError::Io { .. }) => PlatformerConfig::default(),
            Err(e) => {
                tracing::warn!("{e}, using defaults");
                PlatformerConfig::default()
            },
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Player hitbox in world units.
    pub fn player_size(&self) -> (f32, f32) {
        (
            self.tile_size * self.player_size_ratio.0,
            self.tile_size * self.player_size_ratio.1,
        )
    }
}
