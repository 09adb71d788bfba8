//! Grid traversal for a single ray.

use cgmath::Point2;

use crate::engine_state::voxels::tile::TileQuery;

/// Substitute for a zero ray component, keeping the traversal finite.
pub const RAY_EPSILON: f64 = 1e-6;

/// Axis whose grid line the ray crossed when it hit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HitSide {
    /// Stepped along x, so the face is perpendicular to x
    X,
    /// Stepped along y, so the face is perpendicular to y
    Y,
}

/// Result of casting one ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Distance along the ray to the face that was hit, or the maximum depth on a miss
    pub distance: f64,
    /// Axis of the last step
    pub side: HitSide,
    /// Solid cell that stopped the ray, `None` on a miss
    pub cell: Option<Point2<i32>>,
}

impl RayHit {
    /// Whether the ray stopped on a solid cell.
    pub fn is_hit(&self) -> bool {
        self.cell.is_some()
    }
}

fn guard(component: f64) -> f64 {
    if component.abs() < RAY_EPSILON {
        RAY_EPSILON.copysign(component)
    } else {
        component
    }
}

/// Walks the grid from `origin` along `angle` until a solid cell or `max_depth`.
///
/// The distance is solved from the crossed grid line rather than measured between
/// cells, so it is exact for the face that was hit. Ties between the two axes step
/// along y.
pub fn cast_ray<T>(origin: Point2<f64>, angle: f64, max_depth: f64, tiles: &T) -> RayHit
where
    T: TileQuery + ?Sized,
{
    let dir_x = guard(angle.cos());
    let dir_y = guard(angle.sin());

    let start_x = origin.x.floor() as i32;
    let start_y = origin.y.floor() as i32;

    let delta_x = (1.0 / dir_x).abs();
    let delta_y = (1.0 / dir_y).abs();

    let (step_x, mut side_x) = if dir_x < 0.0 {
        (-1, (origin.x - start_x as f64) * delta_x)
    } else {
        (1, (start_x as f64 + 1.0 - origin.x) * delta_x)
    };
    let (step_y, mut side_y) = if dir_y < 0.0 {
        (-1, (origin.y - start_y as f64) * delta_y)
    } else {
        (1, (start_y as f64 + 1.0 - origin.y) * delta_y)
    };

    let mut map_x = start_x;
    let mut map_y = start_y;
    let mut side = HitSide::X;

    // Every step moves one axis by one cell, so the cell distance outgrows
    // `max_depth` within this many steps.
    let step_limit = (max_depth.max(0.0) * 2.0).ceil() as usize + 2;
    for _ in 0..step_limit {
        let travelled = ((map_x - start_x) as f64).hypot((map_y - start_y) as f64);
        if travelled >= max_depth {
            break;
        }

        if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            side = HitSide::X;
        } else {
            side_y += delta_y;
            map_y += step_y;
            side = HitSide::Y;
        }

        if tiles.is_solid(map_x, map_y) {
            let distance = match side {
                HitSide::X => (map_x as f64 - origin.x + (1 - step_x) as f64 / 2.0) / dir_x,
                HitSide::Y => (map_y as f64 - origin.y + (1 - step_y) as f64 / 2.0) / dir_y,
            };
            log::trace!("Ray at {:.3} rad hit ({}, {}) at {:.3}", angle, map_x, map_y, distance);
            return RayHit {
                distance,
                side,
                cell: Some(Point2::new(map_x, map_y)),
            };
        }
    }

    RayHit {
        distance: max_depth,
        side,
        cell: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::tile::Tile;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn single_pillar(x: i32, y: i32) -> Tile {
        if (x, y) == (2, 2) || !(0..4).contains(&x) || !(0..4).contains(&y) {
            Tile::Wall
        } else {
            Tile::Floor
        }
    }

    #[test]
    fn diagonal_ray_hits_the_pillar() {
        let hit = cast_ray(Point2::new(0.5, 0.5), 1f64.atan2(1.0), 20.0, &single_pillar);
        assert_eq!(hit.cell, Some(Point2::new(2, 2)));
        assert!((hit.distance - 1.5 * 2f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn axis_aligned_rays_measure_to_the_face() {
        let east = cast_ray(Point2::new(0.5, 2.5), 0.0, 20.0, &single_pillar);
        assert_eq!(east.cell, Some(Point2::new(2, 2)));
        assert_eq!(east.side, HitSide::X);
        assert!((east.distance - 1.5).abs() < 1e-6);

        let north = cast_ray(Point2::new(1.5, 3.5), -FRAC_PI_2, 20.0, &single_pillar);
        assert_eq!(north.cell, Some(Point2::new(1, -1)));
        assert_eq!(north.side, HitSide::Y);
        assert!((north.distance - 3.5).abs() < 1e-6);

        let west = cast_ray(Point2::new(3.5, 0.5), PI, 20.0, &single_pillar);
        assert_eq!(west.cell, Some(Point2::new(-1, 0)));
        assert!((west.distance - 3.5).abs() < 1e-6);
    }

    #[test]
    fn open_space_returns_max_depth() {
        let open = |_: i32, _: i32| Tile::Floor;
        let miss = cast_ray(Point2::new(0.5, 0.5), FRAC_PI_4, 7.0, &open);
        assert!(!miss.is_hit());
        assert_eq!(miss.distance, 7.0);
    }
}
