//! # Level Generation
//!
//! Procedural generators that populate a [`VoxelVolume`] once at level load, and the
//! [`LevelMap`] seam through which the rest of the engine reads a generated level.
//!
//! ## Generators
//!
//! * [`dungeon::DungeonMap`]: rooms joined by L-shaped corridors (cave and plain biomes)
//! * [`forest::ForestMap`]: Perlin height field, swamp pockets and spaced trees
//!
//! Both take an explicitly seeded `fastrand::Rng`, so a seed fully determines a level.

use cgmath::Point2;

use crate::config::EngineConfig;
use crate::engine_state::player::direction::Direction;
use crate::engine_state::voxels::{tile::TileQuery, volume::VoxelVolume};
use crate::error::WorldError;

use templates::{EnemyTemplate, EnvironmentTemplate};

pub mod dungeon;
pub mod forest;
pub mod templates;

/// Where and how the player enters a level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpawnPoint {
    /// Starting cell
    pub cell: Point2<i32>,
    /// Starting heading
    pub facing: Direction,
}

impl SpawnPoint {
    /// Creates a spawn point.
    pub fn new(cell: Point2<i32>, facing: Direction) -> Self {
        SpawnPoint { cell, facing }
    }
}

/// An enemy placed by a generator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacedEnemy {
    /// Shared stats
    pub template: &'static EnemyTemplate,
    /// Grid position
    pub cell: Point2<i32>,
}

/// An environment prop placed by a generator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacedProp {
    /// Shared stats
    pub template: &'static EnvironmentTemplate,
    /// Grid position
    pub cell: Point2<i32>,
}

/// A generated level as seen by the engine.
///
/// Tile lookups answer [`Tile::Wall`](crate::engine_state::voxels::tile::Tile::Wall)
/// outside the map and heights answer `0` there.
pub trait LevelMap: TileQuery {
    /// The voxels of the level.
    fn volume(&self) -> &VoxelVolume;

    /// Mutable access for runtime removal.
    fn volume_mut(&mut self) -> &mut VoxelVolume;

    /// Height at which characters stand in column `(x, y)`.
    fn ground_height(&self, x: i32, y: i32) -> i32;

    /// Bottom of the visible face of column `(x, y)` for height-aware rendering.
    fn floor_at(&self, x: i32, y: i32) -> i32 {
        self.ground_height(x, y)
    }

    /// Top of column `(x, y)` for height-aware rendering.
    fn ceiling_at(&self, x: i32, y: i32) -> i32 {
        self.volume().height_at(x, y)
    }

    /// Where the player starts.
    fn spawn_point(&self) -> SpawnPoint;

    /// Props placed at generation time.
    fn environment_items(&self) -> &[PlacedProp];

    /// Enemies placed at generation time.
    fn enemies(&self) -> &[PlacedEnemy];

    /// Whether the level is roofed.
    fn has_ceiling(&self) -> bool;

    /// Whether a model `voxel_height` voxels tall fits on the ground of `(x, y)`.
    fn has_room_for(&self, x: i32, y: i32, voxel_height: i32) -> bool {
        self.volume()
            .is_clear_above(x, y, self.ground_height(x, y), voxel_height)
    }

    /// Footprint width.
    fn width(&self) -> i32 {
        self.volume().width()
    }

    /// Footprint height.
    fn height(&self) -> i32 {
        self.volume().height()
    }
}

/// An enemy that may appear in a biome, with its per-roll probability.
#[derive(Debug)]
pub struct EnemySpawn {
    /// Enemy kind
    pub enemy: &'static EnemyTemplate,
    /// Chance of appearing on each spawn roll
    pub probability: f64,
}

static FOREST_ENVIRONMENT: [&EnvironmentTemplate; 6] = [
    &templates::TREE,
    &templates::BUSH,
    &templates::WOOD_PIECE,
    &templates::APPLE,
    &templates::STUMP,
    &templates::FALLEN_LEAVES,
];
static CAVE_ENVIRONMENT: [&EnvironmentTemplate; 2] = [&templates::STALACTITE, &templates::MUSHROOM];
static PLAIN_ENVIRONMENT: [&EnvironmentTemplate; 3] =
    [&templates::GRASS, &templates::STONE, &templates::SEAWEED];
static FOREST_SPAWNS: [EnemySpawn; 1] = [EnemySpawn {
    enemy: &templates::SKELETON_WARRIOR,
    probability: 0.05,
}];

/// The kinds of level the game can generate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Biome {
    /// Open terrain with trees
    Forest,
    /// Enclosed dungeon
    Cave,
    /// Enclosed dungeon with lighter props
    Plain,
}

impl Biome {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Biome::Forest => "forest",
            Biome::Cave => "cave",
            Biome::Plain => "plain",
        }
    }

    /// Generates a fresh level for this biome from `seed`.
    ///
    /// # Errors
    /// Propagates the generator's parameter validation.
    pub fn generate(self, config: &EngineConfig, seed: u64) -> Result<Box<dyn LevelMap>, WorldError> {
        let rng = fastrand::Rng::with_seed(seed);
        log::info!("Generating {} level from seed {}", self.name(), seed);
        Ok(match self {
            Biome::Forest => Box::new(forest::ForestMap::generate(&config.forest, rng)?),
            Biome::Cave | Biome::Plain => Box::new(dungeon::DungeonMap::generate(&config.dungeon, rng)?),
        })
    }

    /// Props spawned at runtime in this biome.
    pub fn environment(self) -> &'static [&'static EnvironmentTemplate] {
        match self {
            Biome::Forest => &FOREST_ENVIRONMENT,
            Biome::Cave => &CAVE_ENVIRONMENT,
            Biome::Plain => &PLAIN_ENVIRONMENT,
        }
    }

    /// Enemies that may wander in during play.
    pub fn spawns(self) -> &'static [EnemySpawn] {
        match self {
            Biome::Forest => &FOREST_SPAWNS,
            Biome::Cave | Biome::Plain => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DungeonConfig, ForestConfig};

    #[test]
    fn biomes_build_their_generators() {
        let config = EngineConfig {
            forest: ForestConfig {
                width: 24,
                height: 24,
                ..ForestConfig::default()
            },
            dungeon: DungeonConfig {
                width: 16,
                height: 16,
                attempts: 6,
            },
            ..EngineConfig::default()
        };
        let forest = Biome::Forest.generate(&config, 1).unwrap();
        assert!(!forest.has_ceiling());
        assert_eq!(forest.width(), 24);
        let cave = Biome::Cave.generate(&config, 1).unwrap();
        assert!(cave.has_ceiling());
        assert_eq!(cave.height(), 16);
        assert!(Biome::Cave.spawns().is_empty());
        assert_eq!(Biome::Forest.spawns()[0].enemy.name, "Skeleton Warrior");
    }
}
