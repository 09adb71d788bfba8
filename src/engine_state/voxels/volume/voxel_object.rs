//! # Voxel Object Module
//!
//! Multi-voxel structures (trees, rocks) described as offsets from an anchor cell
//! and stamped into a volume with [`VoxelVolume::place_object`](super::VoxelVolume::place_object).

use crate::engine_state::voxels::voxel::voxel_type::VoxelType;

/// One voxel of a template, relative to the anchor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VoxelObjectPart {
    /// Offset along x
    pub dx: i32,
    /// Offset along y
    pub dy: i32,
    /// Offset along z (up)
    pub dz: i32,
    /// Type written at the offset
    pub voxel_type: VoxelType,
}

/// An immutable list of parts. Parts are applied in order, so later parts win
/// where they overlap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoxelObjectTemplate {
    parts: Vec<VoxelObjectPart>,
}

/// Trunks are never shorter than this.
pub const MIN_TRUNK_HEIGHT: i32 = 5;
/// Half-width of the leaf diamond.
pub const CANOPY_RADIUS: i32 = 4;

impl VoxelObjectTemplate {
    /// Builds a template from an explicit part list.
    pub fn new(parts: Vec<VoxelObjectPart>) -> Self {
        VoxelObjectTemplate { parts }
    }

    /// The parts in stamping order.
    pub fn parts(&self) -> &[VoxelObjectPart] {
        &self.parts
    }

    /// A tree: a vertical trunk of at least [`MIN_TRUNK_HEIGHT`] voxels topped by a
    /// layered diamond of leaves.
    ///
    /// The canopy starts two voxels below the trunk top and contains every offset
    /// whose horizontal Manhattan distance plus layer index is at most twice
    /// [`CANOPY_RADIUS`].
    pub fn tree(height: i32) -> Self {
        let trunk_height = height.max(MIN_TRUNK_HEIGHT);
        let mut parts: Vec<VoxelObjectPart> = (0..trunk_height)
            .map(|dz| VoxelObjectPart {
                dx: 0,
                dy: 0,
                dz,
                voxel_type: VoxelType::Tree,
            })
            .collect();

        let leaf_base = trunk_height - 2;
        for dx in -CANOPY_RADIUS..=CANOPY_RADIUS {
            for dy in -CANOPY_RADIUS..=CANOPY_RADIUS {
                for layer in 0..=CANOPY_RADIUS {
                    if dx.abs() + dy.abs() + layer <= CANOPY_RADIUS * 2 {
                        parts.push(VoxelObjectPart {
                            dx,
                            dy,
                            dz: leaf_base + layer,
                            voxel_type: VoxelType::Leaves,
                        });
                    }
                }
            }
        }

        VoxelObjectTemplate { parts }
    }

    /// Highest `dz` of any part plus one.
    pub fn vertical_extent(&self) -> i32 {
        self.parts.iter().map(|p| p.dz + 1).max().unwrap_or(0)
    }
}
