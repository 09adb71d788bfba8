//! # Voxel Module
//!
//! The compact per-cell storage unit of a [`VoxelVolume`](super::volume::VoxelVolume)
//! and the rich [`VoxelType`] it decodes to.

use voxel_type::VoxelType;

pub mod voxel_type;

/// The underlying integer type used to represent voxel types in memory.
pub type VoxelTypeSize = u8;

/// A single stored voxel.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute and the `Pod` derive let a whole volume be handed to a
/// renderer as a flat byte slice. A zeroed voxel is [`VoxelType::Air`].
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, Default, PartialEq, Eq)]
pub struct Voxel {
    /// The type of this voxel, encoded as a `VoxelTypeSize` for compact storage.
    pub voxel_type: VoxelTypeSize,
}

impl Voxel {
    /// Creates a voxel of the given type.
    pub fn new(voxel_type: VoxelType) -> Self {
        Voxel {
            voxel_type: voxel_type.id(),
        }
    }

    /// Decodes the stored type. Unknown ids read as air.
    pub fn get_type(&self) -> VoxelType {
        VoxelType::from_id(self.voxel_type).unwrap_or(VoxelType::Air)
    }
}
