//! # Column Renderer
//!
//! Turns a fan of rays into screen-space wall columns. The renderer owns no
//! drawing surface; it only computes slice geometry and shade for a viewport
//! of the given size, leaving rasterisation to the shell.

use cgmath::Point2;

use crate::config::ViewConfig;
use crate::engine_state::generation::LevelMap;
use crate::engine_state::player::CameraPose;
use crate::engine_state::voxels::tile::TileQuery;

use super::caster::{cast_ray, HitSide, RayHit};

/// Smallest distance used when projecting, so walls touching the eye stay finite.
const MIN_PROJECTED_DISTANCE: f64 = 1e-4;
/// Brightness of a wall at distance zero.
const BASE_SHADE: f64 = 200.0;
/// Brightness lost per cell of distance.
const SHADE_FALLOFF: f64 = 40.0;

/// Where the rays are cast from.
///
/// The eye sits a little behind the camera so a wall in the adjacent cell is not
/// rendered flush against the screen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewPose {
    /// Cell the camera is in
    pub cell: Point2<i32>,
    /// Ray origin
    pub eye: Point2<f64>,
    /// Central view angle in radians
    pub angle: f64,
}

impl ViewPose {
    /// Derives the eye from a camera pose, set back `eye_offset` cells along the view.
    pub fn new(camera: CameraPose, eye_offset: f64) -> Self {
        let (sin, cos) = camera.angle.sin_cos();
        Self {
            cell: camera.cell(),
            eye: Point2::new(
                camera.position.x - cos * eye_offset,
                camera.position.y - sin * eye_offset,
            ),
            angle: camera.angle,
        }
    }

    /// Cell directly ahead of the camera, rounding the view direction to the grid.
    pub fn cell_ahead(&self) -> Point2<i32> {
        let (sin, cos) = self.angle.sin_cos();
        Point2::new(
            self.cell.x + cos.round() as i32,
            self.cell.y + sin.round() as i32,
        )
    }
}

/// Field of view and ray count for one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FieldOfView {
    /// Horizontal angle covered, in radians
    pub angle: f64,
    /// Number of rays, one per screen column
    pub rays: usize,
}

/// Picks the field of view for `pose`, widening it with a proportional ray count
/// when the cell ahead is solid.
pub fn field_of_view<T>(config: &ViewConfig, pose: &ViewPose, tiles: &T) -> FieldOfView
where
    T: TileQuery + ?Sized,
{
    let ahead = pose.cell_ahead();
    if tiles.is_solid(ahead.x, ahead.y) && config.fov_degrees > 0.0 {
        let ratio = config.wide_fov_degrees / config.fov_degrees;
        FieldOfView {
            angle: config.wide_fov_degrees.to_radians(),
            rays: (config.ray_count as f64 * ratio).round() as usize,
        }
    } else {
        FieldOfView {
            angle: config.fov_degrees.to_radians(),
            rays: config.ray_count,
        }
    }
}

/// One cast ray with its fish-eye corrected distance.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Column {
    /// Absolute angle of the ray
    pub ray_angle: f64,
    /// Raw caster output
    pub hit: RayHit,
    /// Distance projected onto the central view axis
    pub corrected_distance: f64,
}

/// Uniform-height wall slice.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WallSlice {
    /// On-screen height, at most the viewport height
    pub height: f64,
    /// Screen y of the top edge
    pub top: f64,
    /// Grey level from 0 to 200
    pub shade: u8,
    /// Face orientation, for darkening and seams
    pub side: HitSide,
}

/// Wall slice whose edges follow the hit column's floor and ceiling.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeightSlice {
    /// Screen y of the top edge, clamped to the viewport
    pub top: f64,
    /// Screen y of the bottom edge, clamped to the viewport
    pub bottom: f64,
    /// Grey level from 0 to 200
    pub shade: u8,
    /// Face orientation, for darkening and seams
    pub side: HitSide,
}

/// Computes wall columns for a viewport.
#[derive(Debug, Clone)]
pub struct ColumnRenderer {
    config: ViewConfig,
    viewport_width: f64,
    viewport_height: f64,
}

impl ColumnRenderer {
    /// Creates a renderer for a viewport of `width` by `height` pixels.
    pub fn new(config: ViewConfig, width: f64, height: f64) -> Self {
        Self {
            config,
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Renderer settings.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Casts the fan of rays for `pose`, evenly spread across the field of view.
    pub fn cast_columns<T>(&self, pose: &ViewPose, tiles: &T) -> Vec<Column>
    where
        T: TileQuery + ?Sized,
    {
        let fov = field_of_view(&self.config, pose, tiles);
        (0..fov.rays)
            .map(|i| {
                let ray_angle = pose.angle - fov.angle / 2.0 + (i as f64 / fov.rays as f64) * fov.angle;
                let hit = cast_ray(pose.eye, ray_angle, self.config.max_depth, tiles);
                Column {
                    ray_angle,
                    hit,
                    corrected_distance: hit.distance * (ray_angle - pose.angle).cos(),
                }
            })
            .collect()
    }

    fn wall_scale(&self) -> f64 {
        self.viewport_width * self.config.wall_scale
    }

    fn shade(distance: f64) -> u8 {
        (BASE_SHADE - distance * SHADE_FALLOFF).clamp(0.0, BASE_SHADE) as u8
    }

    /// Uniform wall slice centred on the horizon.
    pub fn wall_slice(&self, column: &Column) -> WallSlice {
        let distance = column.corrected_distance.max(MIN_PROJECTED_DISTANCE);
        let height = (self.wall_scale() / distance).min(self.viewport_height);
        WallSlice {
            height,
            top: (self.viewport_height - height) / 2.0,
            shade: Self::shade(column.corrected_distance),
            side: column.hit.side,
        }
    }

    /// Slice spanning the hit column from its floor to its ceiling, seen from an eye
    /// `eye_z` voxels above the ground. Misses produce no slice.
    pub fn height_slice<L>(&self, column: &Column, level: &L, eye_z: f64) -> Option<HeightSlice>
    where
        L: LevelMap + ?Sized,
    {
        let cell = column.hit.cell?;
        let distance = column.corrected_distance.max(MIN_PROJECTED_DISTANCE);
        let horizon = self.viewport_height / 2.0;
        let project = |z: f64| {
            (horizon - (z - eye_z) * self.wall_scale() / distance).clamp(0.0, self.viewport_height)
        };
        Some(HeightSlice {
            top: project(level.ceiling_at(cell.x, cell.y) as f64),
            bottom: project(level.floor_at(cell.x, cell.y) as f64),
            shade: Self::shade(column.corrected_distance),
            side: column.hit.side,
        })
    }
}
