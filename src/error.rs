//! # Error Module
//!
//! Errors surfaced to the shell. Only malformed generation parameters are
//! reported; every other failure mode (room overlap, out-of-range queries,
//! degenerate rays, rejected entity moves) is recovered where it happens.

use thiserror::Error;

/// A contract violation detected while constructing a world component.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    /// A volume or map dimension was zero or negative.
    #[error("invalid dimensions {width}x{height}x{depth}: every dimension must be positive")]
    InvalidDimensions {
        /// Requested width in cells
        width: i32,
        /// Requested height in cells
        height: i32,
        /// Requested depth in voxels
        depth: i32,
    },

    /// The dungeon footprint cannot hold the smallest room plus its margin.
    #[error("dungeon of {width}x{height} is too small, rooms need at least {min}x{min} cells")]
    DungeonTooSmall {
        /// Requested width in cells
        width: i32,
        /// Requested height in cells
        height: i32,
        /// Minimum supported side length
        min: i32,
    },

    /// The dungeon generator was given no room placement attempts.
    #[error("dungeon needs at least one room placement attempt")]
    NoRoomAttempts,

    /// A noise scale was zero, negative or not finite.
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidNoiseScale {
        /// Name of the offending parameter
        name: &'static str,
        /// Rejected value
        value: f64,
    },

    /// The forest is too shallow to leave room for a surface above the base.
    #[error("forest depth {depth} is too shallow, at least {min} voxels are required")]
    ForestTooShallow {
        /// Requested depth in voxels
        depth: i32,
        /// Minimum supported depth
        min: i32,
    },

    /// A probability-like parameter fell outside `[0, 1]`.
    #[error("{name} must lie within [0, 1], got {value}")]
    InvalidProbability {
        /// Name of the offending parameter
        name: &'static str,
        /// Rejected value
        value: f64,
    },

    /// The streaming margin swallows the whole draw distance.
    #[error("draw distance {draw_distance} must be larger than the rebuild margin {margin}")]
    InvalidDrawDistance {
        /// Requested half-width of the window
        draw_distance: i32,
        /// Requested rebuild margin
        margin: i32,
    },

    /// Configuration text could not be parsed.
    #[error("malformed configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for WorldError {
    fn from(err: serde_json::Error) -> Self {
        WorldError::Config(err.to_string())
    }
}
