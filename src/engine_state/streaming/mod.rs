//! # Region Streaming
//!
//! Keeps renderer-visible geometry to a square window around the player.
//!
//! ## Architecture
//!
//! The streamer owns a [`RegionWindow`] of half-width `draw_distance`. While the
//! player stays within `draw_distance - margin` of the window centre only entity
//! attachment is refreshed. Crossing that line recentres the window on the player
//! and rebuilds the [`RegionGeometry`] from the level's voxels.
//!
//! Detaching never touches an entity's logical state; a detached enemy keeps its
//! cell and reappears when the window comes back over it.

use bitvec::prelude::*;
use cgmath::Point2;

use crate::config::StreamingConfig;
use crate::engine_state::entities::{EntityArena, EntityHandle, GridPositioned};
use crate::engine_state::generation::LevelMap;
use crate::engine_state::voxels::{tile::Tile, voxel::voxel_type::VoxelType};
use crate::error::WorldError;

/// Square window of cells centred on a tracked cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegionWindow {
    /// Tracked cell at the last rebuild
    pub center: Point2<i32>,
    /// Half-width in cells
    pub draw_distance: i32,
}

impl RegionWindow {
    /// Whether `cell` lies within `draw_distance` of the centre on both axes.
    pub fn contains(&self, cell: Point2<i32>) -> bool {
        (cell.x - self.center.x).abs() <= self.draw_distance
            && (cell.y - self.center.y).abs() <= self.draw_distance
    }

    /// Inclusive corners of the window clipped to a `width` by `height` map.
    pub fn clipped(&self, width: i32, height: i32) -> (Point2<i32>, Point2<i32>) {
        (
            Point2::new((self.center.x - self.draw_distance).max(0), (self.center.y - self.draw_distance).max(0)),
            Point2::new(
                (self.center.x + self.draw_distance).min(width - 1),
                (self.center.y + self.draw_distance).min(height - 1),
            ),
        )
    }
}

/// Materialised data of one column inside the window.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnGeometry {
    /// Walkability
    pub tile: Tile,
    /// Standing height
    pub ground: i32,
    /// Top of the column
    pub ceiling: i32,
    /// Voxels from `ground` up to `ceiling`, bottom first
    pub voxels: Vec<VoxelType>,
}

/// Geometry of every column inside a window.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionGeometry {
    min: Point2<i32>,
    max: Point2<i32>,
    columns: Vec<ColumnGeometry>,
}

impl Default for RegionGeometry {
    fn default() -> Self {
        Self {
            min: Point2::new(0, 0),
            max: Point2::new(0, 0),
            columns: Vec::new(),
        }
    }
}

impl RegionGeometry {
    /// Re-queries the level for every cell in `window`.
    pub fn build<L>(level: &L, window: &RegionWindow) -> Self
    where
        L: LevelMap + ?Sized,
    {
        let (min, max) = window.clipped(level.width(), level.height());
        let mut columns = Vec::new();
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let ground = level.floor_at(x, y);
                let ceiling = level.ceiling_at(x, y);
                columns.push(ColumnGeometry {
                    tile: level.tile_at(x, y),
                    ground,
                    ceiling,
                    voxels: (ground..ceiling).map(|z| level.volume().get(x, y, z)).collect(),
                });
            }
        }
        Self { min, max, columns }
    }

    /// Inclusive lower corner.
    pub fn min(&self) -> Point2<i32> {
        self.min
    }

    /// Inclusive upper corner.
    pub fn max(&self) -> Point2<i32> {
        self.max
    }

    /// Number of materialised columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether nothing is materialised.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column at map cell `(x, y)`, if it is inside the geometry.
    pub fn column(&self, x: i32, y: i32) -> Option<&ColumnGeometry> {
        if self.columns.is_empty() || x < self.min.x || y < self.min.y || x > self.max.x || y > self.max.y {
            return None;
        }
        let row = (self.max.x - self.min.x + 1) as usize;
        self.columns
            .get((y - self.min.y) as usize * row + (x - self.min.x) as usize)
    }
}

/// Result of a streamer update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StreamUpdate {
    /// The window moved and geometry was rebuilt
    Rebuilt {
        /// Rebuild counter after this rebuild
        generation: u64,
    },
    /// Only attachment was refreshed
    Refreshed,
}

/// Tracks the streamed window and which entities are attached to it.
#[derive(Debug)]
pub struct RegionStreamer {
    draw_distance: i32,
    margin: i32,
    window: Option<RegionWindow>,
    generation: u64,
    geometry: RegionGeometry,
    attached_enemies: Attachment,
    attached_props: Attachment,
}

/// Attached slots of one arena, with the generation each bit was set for.
#[derive(Debug, Default)]
struct Attachment {
    bits: BitVec,
    generations: Vec<u32>,
}

impl Attachment {
    fn sort<T: GridPositioned>(&mut self, window: &RegionWindow, arena: &EntityArena<T>) {
        self.bits.clear();
        for (handle, entity) in arena.iter() {
            let index = handle.index() as usize;
            if self.bits.len() <= index {
                self.bits.resize(index + 1, false);
                self.generations.resize(index + 1, 0);
            }
            self.bits.set(index, window.contains(entity.grid_cell()));
            self.generations[index] = handle.generation();
        }
    }

    fn contains(&self, handle: EntityHandle) -> bool {
        let index = handle.index() as usize;
        self.bits.get(index).is_some_and(|bit| *bit)
            && self.generations.get(index) == Some(&handle.generation())
    }

    fn count(&self) -> usize {
        self.bits.count_ones()
    }
}

impl RegionStreamer {
    /// Creates a streamer with no window yet; the first update always rebuilds.
    ///
    /// # Errors
    /// Returns [`WorldError::InvalidDrawDistance`] unless `0 <= margin < draw_distance`.
    pub fn new(config: &StreamingConfig) -> Result<Self, WorldError> {
        if config.margin < 0 || config.draw_distance <= config.margin {
            return Err(WorldError::InvalidDrawDistance {
                draw_distance: config.draw_distance,
                margin: config.margin,
            });
        }
        Ok(Self {
            draw_distance: config.draw_distance,
            margin: config.margin,
            window: None,
            generation: 0,
            geometry: RegionGeometry::default(),
            attached_enemies: Attachment::default(),
            attached_props: Attachment::default(),
        })
    }

    /// Current window, `None` before the first update.
    pub fn window(&self) -> Option<RegionWindow> {
        self.window
    }

    /// Number of rebuilds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Geometry of the current window.
    pub fn geometry(&self) -> &RegionGeometry {
        &self.geometry
    }

    /// Whether `cell` is far enough from the window centre to force a rebuild.
    pub fn needs_rebuild(&self, cell: Point2<i32>) -> bool {
        let threshold = self.draw_distance - self.margin;
        match self.window {
            None => true,
            Some(window) => {
                (cell.x - window.center.x).abs() > threshold || (cell.y - window.center.y).abs() > threshold
            }
        }
    }

    /// Handles a confirmed player position: rebuilds when the margin was crossed,
    /// otherwise refreshes attachment only.
    pub fn update<L, E, P>(
        &mut self,
        player_cell: Point2<i32>,
        level: &L,
        enemies: &EntityArena<E>,
        props: &EntityArena<P>,
    ) -> StreamUpdate
    where
        L: LevelMap + ?Sized,
        E: GridPositioned,
        P: GridPositioned,
    {
        if !self.needs_rebuild(player_cell) {
            self.refresh(enemies, props);
            return StreamUpdate::Refreshed;
        }

        let window = RegionWindow {
            center: player_cell,
            draw_distance: self.draw_distance,
        };
        self.geometry = RegionGeometry::build(level, &window);
        self.window = Some(window);
        self.generation += 1;
        self.refresh(enemies, props);
        log::info!(
            "Rebuilt region {} around ({}, {}): {} columns, {} enemies and {} props attached",
            self.generation,
            player_cell.x,
            player_cell.y,
            self.geometry.len(),
            self.attached_enemies.count(),
            self.attached_props.count()
        );
        StreamUpdate::Rebuilt {
            generation: self.generation,
        }
    }

    /// Re-sorts every entity into or out of the current window.
    pub fn refresh<E, P>(&mut self, enemies: &EntityArena<E>, props: &EntityArena<P>)
    where
        E: GridPositioned,
        P: GridPositioned,
    {
        let Some(window) = self.window else {
            return;
        };
        self.attached_enemies.sort(&window, enemies);
        self.attached_props.sort(&window, props);
    }

    /// Whether the enemy behind `handle` is attached.
    pub fn is_enemy_attached(&self, handle: EntityHandle) -> bool {
        self.attached_enemies.contains(handle)
    }

    /// Whether the prop behind `handle` is attached.
    pub fn is_prop_attached(&self, handle: EntityHandle) -> bool {
        self.attached_props.contains(handle)
    }
}
