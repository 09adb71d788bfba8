//! # Forest Generator
//!
//! Noise-based open terrain with scattered trees.
//!
//! ## Algorithm
//!
//! 1. A height field blends two octaves of 3D Perlin noise (a broad base and a finer
//!    detail layer, 70/30), each sampled at an independently randomised phase, and
//!    remaps the result to `[2, depth - 1]`.
//! 2. Every column is filled with floor up to its surface. A third noise field turns
//!    ground voxels into swamp wherever it exceeds the cave threshold.
//! 3. Trees are attempted per cell with probability `density`. A tree needs no other
//!    trunk within a Chebyshev radius of `tree_spacing` and enough clearance above the
//!    surface.
//! 4. Foliage is cleared from a square around the spawn so the player never starts
//!    inside a tree.
//! 5. Ground props are scattered over the walkable cells.
//!
//! The height field is kept for the lifetime of the level and answers
//! [`LevelMap::ground_height`] without rescanning voxels.

use cgmath::Point2;
use noise::{NoiseFn, Perlin};

use crate::config::ForestConfig;
use crate::engine_state::player::direction::Direction;
use crate::engine_state::voxels::{
    tile::{Tile, TileQuery},
    volume::{voxel_object::VoxelObjectTemplate, VoxelVolume},
    voxel::voxel_type::VoxelType,
};
use crate::error::WorldError;

use super::{templates::FOREST_GROUND_ITEMS, LevelMap, PlacedEnemy, PlacedProp, SpawnPoint};

/// Shallowest forest that still leaves room for terrain above the base.
pub const MIN_FOREST_DEPTH: i32 = 8;
/// Lowest surface the height field produces.
pub const MIN_SURFACE: i32 = 2;
/// Tries spent looking for a free cell for each ground prop.
pub const PROP_PLACEMENT_TRIES: usize = 50;

const BASE_WEIGHT: f64 = 0.7;
const DETAIL_WEIGHT: f64 = 0.3;
const PHASE_RANGE: f64 = 100.0;

/// A generated forest level.
pub struct ForestMap {
    volume: VoxelVolume,
    heights: Vec<i32>,
    tree_anchors: Vec<Point2<i32>>,
    environment_items: Vec<PlacedProp>,
    spawn: SpawnPoint,
}

impl ForestMap {
    /// Generates a forest from `rng`.
    ///
    /// # Errors
    /// Returns [`WorldError::InvalidDimensions`] for non-positive sizes,
    /// [`WorldError::ForestTooShallow`] below [`MIN_FOREST_DEPTH`],
    /// [`WorldError::InvalidProbability`] for densities outside `[0, 1]` and
    /// [`WorldError::InvalidNoiseScale`] for non-positive or non-finite scales.
    pub fn generate(config: &ForestConfig, mut rng: fastrand::Rng) -> Result<Self, WorldError> {
        let volume = VoxelVolume::new(config.width, config.height, config.depth)?;
        if config.depth < MIN_FOREST_DEPTH {
            return Err(WorldError::ForestTooShallow {
                depth: config.depth,
                min: MIN_FOREST_DEPTH,
            });
        }
        for (name, value) in [
            ("density", config.density),
            ("environment_density", config.environment_density),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(WorldError::InvalidProbability { name, value });
            }
        }
        for (name, value) in [
            ("base_scale", config.base_scale),
            ("detail_scale", config.detail_scale),
            ("cave_scale", config.cave_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(WorldError::InvalidNoiseScale { name, value });
            }
        }

        let spawn = SpawnPoint::new(
            Point2::new(config.width / 2, config.height / 2),
            Direction::North,
        );
        let mut forest = ForestMap {
            volume,
            heights: Vec::new(),
            tree_anchors: Vec::new(),
            environment_items: Vec::new(),
            spawn,
        };

        forest.heights = Self::height_field(config, &mut rng);
        forest.fill_ground(config, &mut rng);
        forest.plant_trees(config, &mut rng);
        forest.clear_spawn(config.spawn_clear_radius);
        forest.scatter_ground_items(config, &mut rng);

        log::info!(
            "Generated {}x{}x{} forest with {} trees and {} props",
            config.width,
            config.height,
            config.depth,
            forest.tree_anchors.len(),
            forest.environment_items.len()
        );

        Ok(forest)
    }

    fn height_field(config: &ForestConfig, rng: &mut fastrand::Rng) -> Vec<i32> {
        let noise = Perlin::new(rng.u32(..));
        let base_phase = rng.f64() * PHASE_RANGE;
        let detail_phase = rng.f64() * PHASE_RANGE;
        let amplitude = (config.depth - 5) as f64;

        let mut heights = Vec::with_capacity((config.width * config.height) as usize);
        for y in 0..config.height {
            for x in 0..config.width {
                let (fx, fy) = (x as f64, y as f64);
                let base = noise.get([fx / config.base_scale, fy / config.base_scale, base_phase]);
                let detail = noise.get([
                    fx / config.detail_scale,
                    fy / config.detail_scale,
                    detail_phase,
                ]);
                let blended = (base * BASE_WEIGHT + detail * DETAIL_WEIGHT + 1.0) / 2.0;
                let h = (blended * amplitude).floor() as i32 + MIN_SURFACE;
                heights.push(h.clamp(MIN_SURFACE, config.depth - 1));
            }
        }
        heights
    }

    fn fill_ground(&mut self, config: &ForestConfig, rng: &mut fastrand::Rng) {
        let caves = Perlin::new(rng.u32(..));
        let cave_phase = rng.f64() * PHASE_RANGE;
        for y in 0..config.height {
            for x in 0..config.width {
                let surface = self.surface(x, y);
                for z in 0..surface {
                    let sample = caves.get([
                        x as f64 / config.cave_scale,
                        y as f64 / config.cave_scale,
                        z as f64 / config.cave_scale + cave_phase,
                    ]);
                    let voxel_type = if sample > config.cave_threshold {
                        VoxelType::Swamp
                    } else {
                        VoxelType::Floor
                    };
                    self.volume.set(x, y, z, voxel_type);
                }
            }
        }
    }

    fn plant_trees(&mut self, config: &ForestConfig, rng: &mut fastrand::Rng) {
        let tree = VoxelObjectTemplate::tree(config.tree_height);
        for y in 0..config.height {
            for x in 0..config.width {
                if rng.f64() >= config.density || !self.can_place_tree(x, y, config.tree_spacing) {
                    continue;
                }
                let surface = self.surface(x, y);
                if config.depth - surface < config.min_tree_clearance {
                    continue;
                }
                self.volume.place_object(x, y, surface, &tree);
                self.tree_anchors.push(Point2::new(x, y));
            }
        }
    }

    /// Whether a tree may stand at `(x, y)`: no trunk base within `radius` cells,
    /// judged both from the voxels at each neighbour's own surface and from the
    /// anchors planted so far.
    fn can_place_tree(&self, x: i32, y: i32, radius: i32) -> bool {
        for ny in y - radius..=y + radius {
            for nx in x - radius..=x + radius {
                if !self.volume.contains_column(nx, ny) {
                    continue;
                }
                if self.volume.get(nx, ny, self.surface(nx, ny)) == VoxelType::Tree {
                    return false;
                }
            }
        }
        !self
            .tree_anchors
            .iter()
            .any(|a| (a.x - x).abs() <= radius && (a.y - y).abs() <= radius)
    }

    fn clear_spawn(&mut self, radius: i32) {
        let center = self.spawn.cell;
        let mut cleared = 0;
        for y in center.y - radius..=center.y + radius {
            for x in center.x - radius..=center.x + radius {
                if !self.volume.contains_column(x, y) {
                    continue;
                }
                let surface = self.surface(x, y);
                cleared += self.volume.clear_above(x, y, surface, VoxelType::is_foliage);
            }
        }
        let before = self.tree_anchors.len();
        self.tree_anchors
            .retain(|a| (a.x - center.x).abs() > radius || (a.y - center.y).abs() > radius);
        log::debug!(
            "Cleared {} foliage voxels and {} trees around spawn {:?}",
            cleared,
            before - self.tree_anchors.len(),
            center
        );
    }

    fn scatter_ground_items(&mut self, config: &ForestConfig, rng: &mut fastrand::Rng) {
        let area = (config.width * config.height) as f64;
        let count = (area * config.environment_density).floor() as usize;
        if config.width < 3 || config.height < 3 {
            return;
        }
        for _ in 0..count {
            let spot = (0..PROP_PLACEMENT_TRIES).find_map(|_| {
                let x = rng.i32(1..config.width - 1);
                let y = rng.i32(1..config.height - 1);
                (self.tile_at(x, y) == Tile::Floor).then(|| Point2::new(x, y))
            });
            match spot {
                Some(cell) => {
                    let template = FOREST_GROUND_ITEMS[rng.usize(..FOREST_GROUND_ITEMS.len())];
                    self.environment_items.push(PlacedProp { template, cell });
                }
                None => log::warn!("No free cell found for a ground prop"),
            }
        }
    }

    fn surface(&self, x: i32, y: i32) -> i32 {
        self.heights[(x + y * self.volume.width()) as usize]
    }

    /// Cells where a tree was planted and not cleared afterwards.
    pub fn tree_anchors(&self) -> &[Point2<i32>] {
        &self.tree_anchors
    }
}

impl TileQuery for ForestMap {
    fn tile_at(&self, x: i32, y: i32) -> Tile {
        if !self.volume.contains_column(x, y) {
            return Tile::Wall;
        }
        if self.volume.get(x, y, self.surface(x, y)) == VoxelType::Tree {
            Tile::Wall
        } else {
            Tile::Floor
        }
    }
}

impl LevelMap for ForestMap {
    fn volume(&self) -> &VoxelVolume {
        &self.volume
    }

    fn volume_mut(&mut self) -> &mut VoxelVolume {
        &mut self.volume
    }

    fn ground_height(&self, x: i32, y: i32) -> i32 {
        if !self.volume.contains_column(x, y) {
            return 0;
        }
        self.surface(x, y)
    }

    fn spawn_point(&self) -> SpawnPoint {
        self.spawn
    }

    fn environment_items(&self) -> &[PlacedProp] {
        &self.environment_items
    }

    fn enemies(&self) -> &[PlacedEnemy] {
        &[]
    }

    fn has_ceiling(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ForestConfig {
        ForestConfig {
            width: 40,
            height: 40,
            depth: 20,
            density: 0.3,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn surface_stays_within_bounds() {
        let forest = ForestMap::generate(&small_config(), fastrand::Rng::with_seed(7)).unwrap();
        for y in 0..40 {
            for x in 0..40 {
                let h = forest.ground_height(x, y);
                assert!((MIN_SURFACE..=19).contains(&h), "({x},{y}) -> {h}");
                // ground below the surface is solid, the surface cell itself is not ground
                assert!(forest.volume().get(x, y, h - 1).is_solid());
                assert!(matches!(
                    forest.volume().get(x, y, h),
                    VoxelType::Air | VoxelType::Tree | VoxelType::Leaves
                ));
            }
        }
    }

    #[test]
    fn swamp_only_appears_below_the_surface() {
        let forest = ForestMap::generate(&small_config(), fastrand::Rng::with_seed(11)).unwrap();
        for y in 0..40 {
            for x in 0..40 {
                let h = forest.ground_height(x, y);
                for z in h..20 {
                    assert_ne!(forest.volume().get(x, y, z), VoxelType::Swamp);
                }
            }
        }
    }

    #[test]
    fn trees_keep_their_distance() {
        let forest = ForestMap::generate(&small_config(), fastrand::Rng::with_seed(5)).unwrap();
        let anchors = forest.tree_anchors();
        assert!(!anchors.is_empty());
        for (i, a) in anchors.iter().enumerate() {
            for b in &anchors[i + 1..] {
                let chebyshev = (a.x - b.x).abs().max((a.y - b.y).abs());
                assert!(chebyshev > 3, "{a:?} and {b:?}");
            }
        }
    }

    #[test]
    fn trunk_voxels_keep_their_distance() {
        let forest = ForestMap::generate(&small_config(), fastrand::Rng::with_seed(5)).unwrap();
        let trunks: Vec<Point2<i32>> = (0..40)
            .flat_map(|y| (0..40).map(move |x| Point2::new(x, y)))
            .filter(|c| forest.volume().get(c.x, c.y, forest.ground_height(c.x, c.y)) == VoxelType::Tree)
            .collect();
        assert_eq!(trunks.len(), forest.tree_anchors().len());
        for (i, a) in trunks.iter().enumerate() {
            for b in &trunks[i + 1..] {
                let chebyshev = (a.x - b.x).abs().max((a.y - b.y).abs());
                assert!(chebyshev > 3, "{a:?} and {b:?}");
            }
        }
    }

    #[test]
    fn spawn_area_is_free_of_foliage() {
        let forest = ForestMap::generate(&small_config(), fastrand::Rng::with_seed(5)).unwrap();
        let spawn = forest.spawn_point().cell;
        assert_eq!(spawn, Point2::new(20, 20));
        for y in spawn.y - 3..=spawn.y + 3 {
            for x in spawn.x - 3..=spawn.x + 3 {
                let h = forest.ground_height(x, y);
                for z in h..20 {
                    assert!(!forest.volume().get(x, y, z).is_foliage());
                }
                assert_eq!(forest.tile_at(x, y), Tile::Floor);
            }
        }
    }

    #[test]
    fn tree_trunks_are_walls() {
        let forest = ForestMap::generate(&small_config(), fastrand::Rng::with_seed(5)).unwrap();
        for anchor in forest.tree_anchors() {
            assert_eq!(forest.tile_at(anchor.x, anchor.y), Tile::Wall);
        }
        assert_eq!(forest.tile_at(-1, 0), Tile::Wall);
    }

    #[test]
    fn props_land_on_walkable_cells() {
        let forest = ForestMap::generate(&small_config(), fastrand::Rng::with_seed(9)).unwrap();
        assert_eq!(forest.environment_items().len(), (40.0 * 40.0 * 0.02) as usize);
        for item in forest.environment_items() {
            assert_eq!(forest.tile_at(item.cell.x, item.cell.y), Tile::Floor);
        }
    }

    #[test]
    fn same_seed_same_forest() {
        let a = ForestMap::generate(&small_config(), fastrand::Rng::with_seed(21)).unwrap();
        let b = ForestMap::generate(&small_config(), fastrand::Rng::with_seed(21)).unwrap();
        assert_eq!(a.volume().as_bytes(), b.volume().as_bytes());
        assert_eq!(a.tree_anchors(), b.tree_anchors());
    }

    #[test]
    fn shallow_or_invalid_forests_are_rejected() {
        let shallow = ForestConfig {
            depth: 6,
            ..small_config()
        };
        assert!(matches!(
            ForestMap::generate(&shallow, fastrand::Rng::with_seed(1)),
            Err(WorldError::ForestTooShallow { .. })
        ));
        let dense = ForestConfig {
            density: 1.5,
            ..small_config()
        };
        assert!(matches!(
            ForestMap::generate(&dense, fastrand::Rng::with_seed(1)),
            Err(WorldError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn degenerate_noise_scales_are_rejected() {
        for (base_scale, detail_scale, cave_scale) in [(0.0, 15.0, 20.0), (60.0, -1.0, 20.0), (60.0, 15.0, f64::NAN)] {
            let config = ForestConfig {
                base_scale,
                detail_scale,
                cave_scale,
                ..small_config()
            };
            assert!(matches!(
                ForestMap::generate(&config, fastrand::Rng::with_seed(1)),
                Err(WorldError::InvalidNoiseScale { .. })
            ));
        }
    }
}
