//! # Voxel Type Module
//!
//! This module defines the different types of voxels a level is built from.
//! It provides functionality for type identification, conversion from the compact
//! storage representation, and classification used by renderers and generators.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::VoxelTypeSize;

/// Enumerates all possible voxel types in a level.
///
/// Each variant represents a distinct material. The `FromPrimitive` derive allows
/// conversion from the compact integer representation used in storage. `Air` must
/// stay the zero discriminant so that zero-initialised storage reads as empty space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum VoxelType {
    /// Empty space, non-solid and transparent.
    Air = 0,

    /// Walkable ground, used as the dungeon base layer and the forest soil.
    Floor = 1,

    /// Solid dungeon rock.
    Wall = 2,

    /// The dungeon roof stamped above carved cells.
    Ceiling = 3,

    /// Boggy ground carved into subterranean pockets of the forest.
    Swamp = 4,

    /// Tree trunk, blocks movement where it meets the surface.
    Tree = 5,

    /// Tree canopy.
    Leaves = 6,
}

impl VoxelType {
    /// Every variant, in discriminant order.
    pub const ALL: [VoxelType; 7] = [
        VoxelType::Air,
        VoxelType::Floor,
        VoxelType::Wall,
        VoxelType::Ceiling,
        VoxelType::Swamp,
        VoxelType::Tree,
        VoxelType::Leaves,
    ];

    /// Converts a `VoxelTypeSize` back to a `VoxelType`.
    ///
    /// # Returns
    /// `None` if the value does not name a variant.
    pub fn from_id(id: VoxelTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(id)
    }

    /// The compact storage representation of this type.
    pub fn id(self) -> VoxelTypeSize {
        self as VoxelTypeSize
    }

    /// Whether the voxel occupies its cell (anything but air).
    pub fn is_solid(self) -> bool {
        self != VoxelType::Air
    }

    /// Whether the voxel belongs to a tree (trunk or canopy).
    pub fn is_foliage(self) -> bool {
        matches!(self, VoxelType::Tree | VoxelType::Leaves)
    }

    /// Short human readable name, used by debug overlays.
    pub fn name(self) -> &'static str {
        match self {
            VoxelType::Air => "air",
            VoxelType::Floor => "floor",
            VoxelType::Wall => "wall",
            VoxelType::Ceiling => "ceiling",
            VoxelType::Swamp => "swamp",
            VoxelType::Tree => "tree",
            VoxelType::Leaves => "leaves",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_for_every_variant() {
        for voxel_type in VoxelType::ALL {
            assert_eq!(VoxelType::from_id(voxel_type.id()), Some(voxel_type));
        }
        assert_eq!(VoxelType::from_id(200), None);
    }

    #[test]
    fn only_air_is_not_solid() {
        assert!(!VoxelType::Air.is_solid());
        assert!(VoxelType::ALL[1..].iter().all(|v| v.is_solid()));
        assert!(VoxelType::Leaves.is_foliage());
        assert!(!VoxelType::Swamp.is_foliage());
    }
}
