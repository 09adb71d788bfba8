//! # Voxel World Model
//!
//! This module contains the data every other subsystem consumes: the typed voxel,
//! the dense volume holding a level, the object templates stamped into it and the
//! 2D tile view derived from it.
//!
//! ## Architecture
//!
//! * **Voxel**: compact one-byte storage and the [`VoxelType`](voxel::voxel_type::VoxelType) it decodes to
//! * **Volume**: the fixed-size `[z][y][x]` grid with height and clearance queries
//! * **Tile**: walkable/solid classification used by movement and ray casting
//!
//! ## Data Flow
//!
//! 1. A generator fills a volume once at level load
//! 2. Renderers query heights and voxels each frame
//! 3. Movement and the caster go through the level's tile view

pub mod tile;
pub mod volume;
pub mod voxel;
