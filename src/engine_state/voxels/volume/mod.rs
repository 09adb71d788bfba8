//! # Volume Module
//!
//! This module provides the [`VoxelVolume`], the dense 3D grid every generator
//! writes into and every renderer reads from.
//!
//! ## Coordinates
//!
//! Cells are addressed as `(x, y, z)` where `x`/`y` span the map footprint and `z`
//! is the vertical axis, `z = 0` being the bottom layer. Storage is a single
//! `Vec<Voxel>` laid out `[z][y][x]`, so one horizontal layer is contiguous.
//!
//! ## Out-of-range Queries
//!
//! Queries never panic. Reads outside the volume return [`VoxelType::Air`] (or
//! `None` from [`VoxelVolume::voxel_at`]) and writes outside it are ignored. Callers
//! that need "solid boundary" semantics, like tile lookups, map the sentinel
//! themselves.

use cgmath::Point3;

use crate::error::WorldError;

use super::voxel::{voxel_type::VoxelType, Voxel};

pub mod voxel_object;

use voxel_object::VoxelObjectTemplate;

/// A fixed-size 3D grid of typed voxels.
///
/// Created once per level, mutated while generating and (rarely) afterwards to clear
/// props. It is never resized.
///
/// # Examples
///
/// ```
/// use voxel_crawler::engine_state::voxels::{volume::VoxelVolume, voxel::voxel_type::VoxelType};
///
/// let mut volume = VoxelVolume::new(4, 4, 3).unwrap();
/// volume.set(1, 1, 0, VoxelType::Floor);
/// assert_eq!(volume.height_at(1, 1), 1);
/// assert_eq!(volume.get(-1, 0, 0), VoxelType::Air);
/// ```
#[derive(Debug, Clone)]
pub struct VoxelVolume {
    width: i32,
    height: i32,
    depth: i32,
    voxels: Vec<Voxel>,
}

impl VoxelVolume {
    /// Creates a volume filled with air.
    ///
    /// # Errors
    /// Returns [`WorldError::InvalidDimensions`] if any dimension is zero or negative.
    pub fn new(width: i32, height: i32, depth: i32) -> Result<Self, WorldError> {
        if width <= 0 || height <= 0 || depth <= 0 {
            return Err(WorldError::InvalidDimensions {
                width,
                height,
                depth,
            });
        }
        let len = width as usize * height as usize * depth as usize;
        Ok(VoxelVolume {
            width,
            height,
            depth,
            voxels: vec![Voxel::default(); len],
        })
    }

    /// Extent along x.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Extent along y.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Extent along z.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// `(width, height, depth)` as a point, handy for bounds arithmetic.
    pub fn dimensions(&self) -> Point3<i32> {
        Point3::new(self.width, self.height, self.depth)
    }

    /// Whether `(x, y)` lies inside the map footprint.
    pub fn contains_column(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    /// Whether `(x, y, z)` lies inside the volume.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.contains_column(x, y) && (0..self.depth).contains(&z)
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.contains(x, y, z) {
            return None;
        }
        Some(x as usize + self.width as usize * (y as usize + self.height as usize * z as usize))
    }

    /// Reads a voxel, returning `None` outside the volume.
    pub fn voxel_at(&self, x: i32, y: i32, z: i32) -> Option<VoxelType> {
        self.index(x, y, z).map(|i| self.voxels[i].get_type())
    }

    /// Reads a voxel, returning [`VoxelType::Air`] outside the volume.
    pub fn get(&self, x: i32, y: i32, z: i32) -> VoxelType {
        self.voxel_at(x, y, z).unwrap_or(VoxelType::Air)
    }

    /// Overwrites a voxel. Writes outside the volume are ignored.
    pub fn set(&mut self, x: i32, y: i32, z: i32, voxel_type: VoxelType) {
        if let Some(i) = self.index(x, y, z) {
            self.voxels[i] = Voxel::new(voxel_type);
        }
    }

    /// Height of the column's top surface.
    ///
    /// Scans `z` from the top of the volume downwards and returns `z + 1` for the
    /// first non-air voxel, `0` for an empty column or a column outside the volume.
    pub fn height_at(&self, x: i32, y: i32) -> i32 {
        if !self.contains_column(x, y) {
            return 0;
        }
        (0..self.depth)
            .rev()
            .find(|&z| self.get(x, y, z).is_solid())
            .map_or(0, |z| z + 1)
    }

    /// Standing level of an enclosed column: the `z` of the first air voxel counting
    /// up from the bottom, `depth` for a fully solid column, `0` outside the volume.
    pub fn floor_height(&self, x: i32, y: i32) -> i32 {
        if !self.contains_column(x, y) {
            return 0;
        }
        (0..self.depth)
            .find(|&z| !self.get(x, y, z).is_solid())
            .unwrap_or(self.depth)
    }

    /// Whether every voxel in `[from_z, from_z + count)` of the column is air.
    ///
    /// Cells above the top of the volume count as air, so a prop may poke out of
    /// the map; cells outside the footprint or below the bottom do not.
    pub fn is_clear_above(&self, x: i32, y: i32, from_z: i32, count: i32) -> bool {
        if !self.contains_column(x, y) || from_z < 0 {
            return false;
        }
        (from_z..from_z + count).all(|z| !self.get(x, y, z).is_solid())
    }

    /// Stamps every part of `template` relative to the anchor `(x, y, z)`.
    /// Parts falling outside the volume are clipped.
    pub fn place_object(&mut self, x: i32, y: i32, z: i32, template: &VoxelObjectTemplate) {
        for part in template.parts() {
            self.set(x + part.dx, y + part.dy, z + part.dz, part.voxel_type);
        }
    }

    /// Clears every voxel at or above `from_z` in the column that matches `predicate`.
    ///
    /// This is the only removal primitive used after generation. It never writes a
    /// solid voxel, so [`height_at`](Self::height_at) stays the result of a plain
    /// top-down scan.
    ///
    /// # Returns
    /// The number of voxels cleared.
    pub fn clear_above<P>(&mut self, x: i32, y: i32, from_z: i32, predicate: P) -> usize
    where
        P: Fn(VoxelType) -> bool,
    {
        let mut cleared = 0;
        for z in from_z.max(0)..self.depth {
            let voxel_type = self.get(x, y, z);
            if voxel_type.is_solid() && predicate(voxel_type) {
                self.set(x, y, z, VoxelType::Air);
                cleared += 1;
            }
        }
        cleared
    }

    /// Fills a whole horizontal layer with one type.
    pub fn fill_layer(&mut self, z: i32, voxel_type: VoxelType) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set(x, y, z, voxel_type);
            }
        }
    }

    /// The raw storage, one byte per voxel in `[z][y][x]` order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.voxels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned_height(volume: &VoxelVolume, x: i32, y: i32) -> i32 {
        let mut top = -1;
        for z in 0..volume.depth() {
            if volume.voxel_at(x, y, z) != Some(VoxelType::Air) {
                top = z;
            }
        }
        top + 1
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        assert!(VoxelVolume::new(0, 4, 4).is_err());
        assert!(VoxelVolume::new(4, -1, 4).is_err());
        assert_eq!(
            VoxelVolume::new(4, 4, 0).unwrap_err(),
            WorldError::InvalidDimensions {
                width: 4,
                height: 4,
                depth: 0
            }
        );
    }

    #[test]
    fn out_of_range_reads_are_air_and_writes_are_ignored() {
        let mut volume = VoxelVolume::new(3, 3, 3).unwrap();
        volume.set(3, 0, 0, VoxelType::Wall);
        volume.set(0, 0, -1, VoxelType::Wall);
        assert_eq!(volume.get(3, 0, 0), VoxelType::Air);
        assert_eq!(volume.voxel_at(3, 0, 0), None);
        assert_eq!(volume.voxel_at(0, 0, 0), Some(VoxelType::Air));
        assert!(volume.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn height_uses_the_topmost_solid_voxel() {
        let mut volume = VoxelVolume::new(2, 2, 6).unwrap();
        volume.set(0, 0, 0, VoxelType::Floor);
        volume.set(0, 0, 4, VoxelType::Leaves);
        assert_eq!(volume.height_at(0, 0), 5);
        assert_eq!(volume.height_at(1, 1), 0);
        assert_eq!(volume.height_at(-5, 0), 0);
        assert_eq!(volume.floor_height(0, 0), 1);
        assert_eq!(volume.floor_height(1, 1), 0);
    }

    #[test]
    fn height_matches_scan_after_stamping_and_clearing() {
        let mut volume = VoxelVolume::new(5, 5, 12).unwrap();
        volume.fill_layer(0, VoxelType::Floor);
        volume.place_object(2, 2, 1, &VoxelObjectTemplate::tree(5));
        volume.clear_above(2, 2, 1, VoxelType::is_foliage);
        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(volume.height_at(x, y), scanned_height(&volume, x, y), "column ({x},{y})");
            }
        }
    }

    #[test]
    fn clear_above_checks_every_cell_of_the_span() {
        let mut volume = VoxelVolume::new(2, 2, 5).unwrap();
        volume.set(0, 0, 0, VoxelType::Floor);
        volume.set(0, 0, 3, VoxelType::Leaves);
        assert!(volume.is_clear_above(0, 0, 1, 2));
        assert!(!volume.is_clear_above(0, 0, 1, 3));
        assert!(volume.is_clear_above(0, 0, 4, 3));
        assert!(!volume.is_clear_above(2, 0, 1, 1));
    }

    #[test]
    fn objects_are_clipped_at_the_boundary() {
        let mut volume = VoxelVolume::new(3, 3, 4).unwrap();
        volume.place_object(0, 0, 0, &VoxelObjectTemplate::tree(5));
        assert_eq!(volume.get(0, 0, 0), VoxelType::Tree);
        assert_eq!(volume.get(0, 0, 3), VoxelType::Leaves);
        assert_eq!(volume.height_at(0, 0), 4);
    }
}
