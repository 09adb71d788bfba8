//! # Visibility
//!
//! First-person wall visibility by grid-traversal ray casting.
//!
//! ## Architecture
//!
//! * **Caster**: one ray against any [`TileQuery`](crate::engine_state::voxels::tile::TileQuery),
//!   returning distance, hit side and hit cell
//! * **Columns**: the per-frame fan of rays, fish-eye correction, and the slice
//!   geometry a shell draws from
//!
//! ## Data Flow
//!
//! 1. The camera pose is turned into a [`ViewPose`] with the eye set back
//! 2. [`field_of_view`] picks the angle and ray count for the frame
//! 3. Each ray is walked through the grid by [`cast_ray`]
//! 4. [`ColumnRenderer`] projects hits into [`WallSlice`]s or height-aware [`HeightSlice`]s

pub mod caster;
pub mod columns;

pub use caster::{cast_ray, HitSide, RayHit};
pub use columns::{field_of_view, Column, ColumnRenderer, FieldOfView, HeightSlice, ViewPose, WallSlice};
