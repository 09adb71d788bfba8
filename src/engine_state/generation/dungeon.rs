//! # Dungeon Generator
//!
//! Room-and-corridor generation for the enclosed biomes.
//!
//! ## Algorithm
//!
//! 1. Up to `attempts` times, sample a room of 4..8 x 4..8 cells fully inside the map
//!    with a one-cell margin; skip it if it overlaps an accepted room.
//! 2. Carve an accepted room, then an L-shaped corridor (x first, then y) from the
//!    previous room's centre to its centre. Corridors overwrite whatever lies on
//!    their path.
//! 3. The first accepted room's centre becomes the spawn, facing north.
//! 4. Layer the carved mask into a three-voxel-deep volume: a floor base at z=0,
//!    walls at z=1..=2 for uncarved cells, and a ceiling at z=2 over carved ones.
//!
//! Overlap rejection means fewer rooms than attempts may be placed. That is a
//! quality variance, not an error.

use bitvec::prelude::BitVec;
use cgmath::Point2;

use crate::config::DungeonConfig;
use crate::engine_state::player::direction::Direction;
use crate::engine_state::voxels::{
    tile::{Tile, TileQuery},
    volume::VoxelVolume,
    voxel::voxel_type::VoxelType,
};
use crate::error::WorldError;

use super::{LevelMap, PlacedEnemy, PlacedProp, SpawnPoint};

/// Smallest footprint on which a room of the largest size still fits with its margin.
pub const MIN_DUNGEON_SIDE: i32 = 10;
/// Depth of a dungeon volume: base, walking layer, roof.
pub const DUNGEON_DEPTH: i32 = 3;
/// Layer holding walls or the walking space.
pub const WALKING_LAYER: i32 = 1;
/// Layer holding the roof over carved cells.
pub const CEILING_LAYER: i32 = 2;

const ROOM_SIZE_MIN: i32 = 4;
const ROOM_SIZE_MAX: i32 = 8;

/// An axis-aligned rectangle of cells, `w` by `h`, with its corner at `(x, y)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Room {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in cells
    pub w: i32,
    /// Height in cells
    pub h: i32,
}

impl Room {
    /// Builds a room from its corner and size.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Room { x, y, w, h }
    }

    /// Whether the two rectangles share at least one cell.
    pub fn intersects(&self, other: &Room) -> bool {
        !(self.x + self.w <= other.x
            || other.x + other.w <= self.x
            || self.y + self.h <= other.y
            || other.y + other.h <= self.y)
    }

    /// Centre cell, rounded towards the top-left.
    pub fn center(&self) -> Point2<i32> {
        Point2::new(self.x + self.w / 2, self.y + self.h / 2)
    }
}

/// Supplies candidate rooms to the generator.
pub trait RoomSource {
    /// Proposes a room that fits inside a `width` x `height` map with a one-cell margin.
    fn next_room(&mut self, width: i32, height: i32) -> Room;
}

/// Uniformly random rooms drawn from an injected generator.
pub struct RandomRooms {
    rng: fastrand::Rng,
}

impl RandomRooms {
    /// Wraps a seeded generator.
    pub fn new(rng: fastrand::Rng) -> Self {
        RandomRooms { rng }
    }
}

impl RoomSource for RandomRooms {
    fn next_room(&mut self, width: i32, height: i32) -> Room {
        let w = self.rng.i32(ROOM_SIZE_MIN..ROOM_SIZE_MAX);
        let h = self.rng.i32(ROOM_SIZE_MIN..ROOM_SIZE_MAX);
        let x = self.rng.i32(1..width - w - 1);
        let y = self.rng.i32(1..height - h - 1);
        Room::new(x, y, w, h)
    }
}

/// A generated dungeon level.
pub struct DungeonMap {
    volume: VoxelVolume,
    carved: BitVec,
    rooms: Vec<Room>,
    spawn: SpawnPoint,
}

impl DungeonMap {
    /// Generates a dungeon with rooms drawn from `rng`.
    ///
    /// # Errors
    /// Returns [`WorldError::DungeonTooSmall`] for footprints under
    /// [`MIN_DUNGEON_SIDE`] on either side and [`WorldError::NoRoomAttempts`]
    /// when `attempts` is zero.
    pub fn generate(config: &DungeonConfig, rng: fastrand::Rng) -> Result<Self, WorldError> {
        Self::generate_with(config, &mut RandomRooms::new(rng))
    }

    /// Generates a dungeon with rooms proposed by `rooms`.
    ///
    /// # Errors
    /// Returns [`WorldError::DungeonTooSmall`] for footprints under
    /// [`MIN_DUNGEON_SIDE`] on either side and [`WorldError::NoRoomAttempts`]
    /// when `attempts` is zero.
    pub fn generate_with<R: RoomSource + ?Sized>(
        config: &DungeonConfig,
        rooms: &mut R,
    ) -> Result<Self, WorldError> {
        let (width, height) = (config.width, config.height);
        if width <= 0 || height <= 0 {
            return Err(WorldError::InvalidDimensions {
                width,
                height,
                depth: DUNGEON_DEPTH,
            });
        }
        if width < MIN_DUNGEON_SIDE || height < MIN_DUNGEON_SIDE {
            return Err(WorldError::DungeonTooSmall {
                width,
                height,
                min: MIN_DUNGEON_SIDE,
            });
        }
        if config.attempts == 0 {
            return Err(WorldError::NoRoomAttempts);
        }

        let mut carver = Carver::new(width, height);
        let mut accepted: Vec<Room> = Vec::new();
        let mut spawn = SpawnPoint::new(Point2::new(1, 1), Direction::North);

        for _ in 0..config.attempts {
            let room = rooms.next_room(width, height);
            if accepted.iter().any(|r| r.intersects(&room)) {
                continue;
            }

            carver.carve_room(&room);
            match accepted.last() {
                Some(previous) => carver.carve_corridor(previous.center(), room.center()),
                None => spawn = SpawnPoint::new(room.center(), Direction::North),
            }
            accepted.push(room);
        }

        log::info!(
            "Generated {}x{} dungeon with {} of {} rooms placed",
            width,
            height,
            accepted.len(),
            config.attempts
        );

        let volume = carver.build_volume()?;
        Ok(DungeonMap {
            volume,
            carved: carver.carved,
            rooms: accepted,
            spawn,
        })
    }

    /// Accepted rooms in placement order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Whether the generator carved `(x, y)` to floor.
    pub fn is_carved(&self, x: i32, y: i32) -> bool {
        self.volume.contains_column(x, y)
            && self.carved[(x + y * self.volume.width()) as usize]
    }

    /// The carved mask, row-major.
    pub fn carved(&self) -> &BitVec {
        &self.carved
    }
}

/// Carves rooms and corridors into a row-major walkable mask.
struct Carver {
    width: i32,
    height: i32,
    carved: BitVec,
}

impl Carver {
    fn new(width: i32, height: i32) -> Self {
        let mut carved = BitVec::with_capacity((width * height) as usize);
        carved.resize((width * height) as usize, false);
        Carver {
            width,
            height,
            carved,
        }
    }

    fn carve(&mut self, x: i32, y: i32) {
        if (0..self.width).contains(&x) && (0..self.height).contains(&y) {
            self.carved.set((x + y * self.width) as usize, true);
        }
    }

    fn carve_room(&mut self, room: &Room) {
        for y in room.y..room.y + room.h {
            for x in room.x..room.x + room.w {
                self.carve(x, y);
            }
        }
    }

    fn carve_corridor(&mut self, from: Point2<i32>, to: Point2<i32>) {
        let (mut x, mut y) = (from.x, from.y);
        while x != to.x {
            self.carve(x, y);
            x += (to.x - x).signum();
        }
        while y != to.y {
            self.carve(x, y);
            y += (to.y - y).signum();
        }
        self.carve(x, y);
    }

    fn build_volume(&self) -> Result<VoxelVolume, WorldError> {
        let mut volume = VoxelVolume::new(self.width, self.height, DUNGEON_DEPTH)?;
        volume.fill_layer(0, VoxelType::Floor);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.carved[(x + y * self.width) as usize] {
                    volume.set(x, y, CEILING_LAYER, VoxelType::Ceiling);
                } else {
                    volume.set(x, y, WALKING_LAYER, VoxelType::Wall);
                    volume.set(x, y, CEILING_LAYER, VoxelType::Wall);
                }
            }
        }
        Ok(volume)
    }
}

impl TileQuery for DungeonMap {
    fn tile_at(&self, x: i32, y: i32) -> Tile {
        match self.volume.voxel_at(x, y, WALKING_LAYER) {
            None | Some(VoxelType::Wall) => Tile::Wall,
            Some(_) => Tile::Floor,
        }
    }
}

impl LevelMap for DungeonMap {
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
        WALKING_LAYER
    }

    fn spawn_point(&self) -> SpawnPoint {
        self.spawn
    }

    fn environment_items(&self) -> &[PlacedProp] {
        &[]
    }

    fn enemies(&self) -> &[PlacedEnemy] {
        &[]
    }

    fn has_ceiling(&self) -> bool {
        true
    }

    fn has_room_for(&self, x: i32, y: i32, _voxel_height: i32) -> bool {
        // Characters are scaled to the single voxel of headroom under the ceiling.
        self.volume.is_clear_above(x, y, WALKING_LAYER, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRooms(Vec<Room>);

    impl RoomSource for FixedRooms {
        fn next_room(&mut self, _width: i32, _height: i32) -> Room {
            self.0.remove(0)
        }
    }

    fn config(width: i32, height: i32, attempts: u32) -> DungeonConfig {
        DungeonConfig {
            width,
            height,
            attempts,
        }
    }

    #[test]
    fn single_fixed_room_scenario() {
        let mut rooms = FixedRooms(vec![Room::new(2, 2, 4, 4)]);
        let map = DungeonMap::generate_with(&config(10, 10, 1), &mut rooms).unwrap();

        assert_eq!(map.tile_at(3, 3).as_char(), '.');
        assert_eq!(map.tile_at(0, 0).as_char(), '#');
        assert_eq!(map.spawn_point(), SpawnPoint::new(Point2::new(4, 4), Direction::North));
        assert_eq!(map.rooms().len(), 1);
    }

    #[test]
    fn overlapping_rooms_are_skipped() {
        let mut rooms = FixedRooms(vec![
            Room::new(1, 1, 5, 5),
            Room::new(3, 3, 4, 4),
            Room::new(12, 12, 4, 4),
        ]);
        let map = DungeonMap::generate_with(&config(20, 20, 3), &mut rooms).unwrap();
        assert_eq!(map.rooms(), &[Room::new(1, 1, 5, 5), Room::new(12, 12, 4, 4)]);
        // the corridor runs along y = 3 to x = 14, then down x = 14
        assert_eq!(map.tile_at(10, 3), Tile::Floor);
        assert_eq!(map.tile_at(14, 8), Tile::Floor);
        assert_eq!(map.tile_at(10, 8), Tile::Wall);
    }

    #[test]
    fn voxel_layers_follow_the_mask() {
        let mut rooms = FixedRooms(vec![Room::new(2, 2, 4, 4)]);
        let map = DungeonMap::generate_with(&config(10, 10, 1), &mut rooms).unwrap();
        let volume = map.volume();

        assert_eq!(volume.get(3, 3, 0), VoxelType::Floor);
        assert_eq!(volume.get(3, 3, WALKING_LAYER), VoxelType::Air);
        assert_eq!(volume.get(3, 3, CEILING_LAYER), VoxelType::Ceiling);
        assert_eq!(volume.get(0, 0, WALKING_LAYER), VoxelType::Wall);
        assert_eq!(volume.floor_height(3, 3), 1);
        assert_eq!(volume.floor_height(0, 0), DUNGEON_DEPTH);
        assert_eq!(map.ground_height(3, 3), 1);
    }

    #[test]
    fn out_of_range_tiles_are_walls() {
        let map = DungeonMap::generate(&config(12, 12, 4), fastrand::Rng::with_seed(3)).unwrap();
        assert_eq!(map.tile_at(-1, 5), Tile::Wall);
        assert_eq!(map.tile_at(5, 12), Tile::Wall);
    }

    #[test]
    fn too_small_maps_are_rejected() {
        assert!(matches!(
            DungeonMap::generate(&config(9, 20, 12), fastrand::Rng::with_seed(1)),
            Err(WorldError::DungeonTooSmall { .. })
        ));
        assert!(matches!(
            DungeonMap::generate(&config(0, 20, 12), fastrand::Rng::with_seed(1)),
            Err(WorldError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn zero_attempts_are_rejected() {
        assert_eq!(
            DungeonMap::generate(&config(31, 31, 0), fastrand::Rng::with_seed(1)).err(),
            Some(WorldError::NoRoomAttempts)
        );
    }

    #[test]
    fn random_rooms_stay_inside_the_margin() {
        let mut rooms = RandomRooms::new(fastrand::Rng::with_seed(99));
        for _ in 0..500 {
            let room = rooms.next_room(10, 10);
            assert!(room.x >= 1 && room.y >= 1);
            assert!(room.x + room.w <= 9 && room.y + room.h <= 9);
        }
    }
}
