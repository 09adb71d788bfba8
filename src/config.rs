//! # Configuration Module
//!
//! Tunable parameters for level generation, streaming, entity motion and the
//! column renderer. Every struct carries the defaults the game ships with and
//! can be overridden piecemeal from JSON, missing fields falling back to the
//! defaults.
//!
//! ```
//! use voxel_crawler::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "streaming": { "draw_distance": 12 } }"#).unwrap();
//! assert_eq!(config.streaming.draw_distance, 12);
//! assert_eq!(config.streaming.margin, 5);
//! ```

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::WorldError;

/// Parameters of the room-and-corridor generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Map width in cells
    pub width: i32,
    /// Map height in cells
    pub height: i32,
    /// Number of room placement attempts
    pub attempts: u32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            width: 31,
            height: 31,
            attempts: 12,
        }
    }
}

/// Parameters of the noise-based forest generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Map width in cells
    pub width: i32,
    /// Map height in cells
    pub height: i32,
    /// Volume depth in voxels
    pub depth: i32,
    /// Per-cell probability of attempting a tree
    pub density: f64,
    /// Noise scale of the rolling base terrain
    pub base_scale: f64,
    /// Noise scale of the detail octave
    pub detail_scale: f64,
    /// Noise scale of the swamp pockets
    pub cave_scale: f64,
    /// Noise value above which ground becomes swamp
    pub cave_threshold: f64,
    /// Chebyshev radius in which no second tree may stand
    pub tree_spacing: i32,
    /// Requested trunk height of a tree
    pub tree_height: i32,
    /// Free voxels needed above the surface to plant a tree
    pub min_tree_clearance: i32,
    /// Half-width of the foliage-free square around the spawn
    pub spawn_clear_radius: i32,
    /// Fraction of the area covered with environment props
    pub environment_density: f64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            width: 96,
            height: 96,
            depth: 20,
            density: 0.1,
            base_scale: 60.0,
            detail_scale: 15.0,
            cave_scale: 20.0,
            cave_threshold: 0.2,
            tree_spacing: 3,
            tree_height: 9,
            min_tree_clearance: 6,
            spawn_clear_radius: 3,
            environment_density: 0.02,
        }
    }
}

/// Parameters of the region streamer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Half-width of the materialised window in cells
    pub draw_distance: i32,
    /// Distance from the window edge that triggers a rebuild
    pub margin: i32,
    /// Interval between prop spawns outside the window, in milliseconds
    pub environment_spawn_interval_ms: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            draw_distance: 30,
            margin: 5,
            environment_spawn_interval_ms: 10_000,
        }
    }
}

impl StreamingConfig {
    /// Prop spawn interval as a duration.
    pub fn environment_spawn_interval(&self) -> Duration {
        Duration::from_millis(self.environment_spawn_interval_ms)
    }
}

/// Parameters of the wandering state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Time between move decisions, in milliseconds
    pub cooldown_ms: u64,
    /// Duration of one step animation, in milliseconds
    pub animation_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 1_000,
            animation_ms: 200,
        }
    }
}

impl MotionConfig {
    /// Cooldown as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Step animation length as a duration.
    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }
}

/// How many headings a single turn input cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnMode {
    /// North, east, south, west
    Cardinal,
    /// All eight compass headings
    Octal,
}

/// Parameters of player movement and camera smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Camera animation length for one step or turn, in milliseconds
    pub move_duration_ms: u64,
    /// Heading granularity
    pub turn_mode: TurnMode,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_duration_ms: 200,
            turn_mode: TurnMode::Octal,
        }
    }
}

impl PlayerConfig {
    /// Camera animation length as a duration.
    pub fn move_duration(&self) -> Duration {
        Duration::from_millis(self.move_duration_ms)
    }
}

/// Parameters of the column renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Normal horizontal field of view in degrees
    pub fov_degrees: f64,
    /// Field of view used when a wall is directly ahead, in degrees
    pub wide_fov_degrees: f64,
    /// Number of rays cast at the normal field of view
    pub ray_count: usize,
    /// Maximum ray travel in cells
    pub max_depth: f64,
    /// How far the eye sits behind the cell centre, in cells
    pub eye_offset: f64,
    /// Wall scale as a fraction of the viewport width
    pub wall_scale: f64,
    /// Eye height above the standing floor, in voxels
    pub eye_height: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            wide_fov_degrees: 90.0,
            ray_count: 120,
            max_depth: 20.0,
            eye_offset: 0.3,
            wall_scale: 0.3,
            eye_height: 0.6,
        }
    }
}

/// Aggregate configuration of the whole engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dungeon generator parameters
    pub dungeon: DungeonConfig,
    /// Forest generator parameters
    pub forest: ForestConfig,
    /// Region streamer parameters
    pub streaming: StreamingConfig,
    /// Wandering state machine parameters
    pub motion: MotionConfig,
    /// Player movement parameters
    pub player: PlayerConfig,
    /// Column renderer parameters
    pub view: ViewConfig,
}

impl EngineConfig {
    /// Parses a configuration from JSON, filling omitted fields with defaults.
    ///
    /// # Errors
    /// Returns [`WorldError::Config`] if the text is not valid JSON for this schema.
    pub fn from_json_str(text: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(text)?)
    }
}
