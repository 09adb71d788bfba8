//! # Tile Module
//!
//! The 2D walkability view of a level, shared by the ray caster, the motion system
//! and the minimap.

use cgmath::{Point2, Vector2};

/// Walkability of one map cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Open, walkable ground
    Floor,
    /// Blocks movement and stops rays
    Wall,
}

impl Tile {
    /// Whether the tile blocks movement and rays.
    pub fn is_solid(self) -> bool {
        self == Tile::Wall
    }

    /// Map glyph: `'#'` for walls, `'.'` for floor.
    pub fn as_char(self) -> char {
        match self {
            Tile::Floor => '.',
            Tile::Wall => '#',
        }
    }
}

/// Anything that can answer "what tile is at `(x, y)`".
///
/// Implementations must answer [`Tile::Wall`] outside the map.
pub trait TileQuery {
    /// Tile at the integer cell `(x, y)`.
    fn tile_at(&self, x: i32, y: i32) -> Tile;

    /// Shorthand for `tile_at(x, y).is_solid()`.
    fn is_solid(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).is_solid()
    }

    /// Whether a one-cell step of `offset` from `from` is open.
    ///
    /// The target must be walkable, and a diagonal step is refused when either
    /// orthogonal neighbour it brushes past is solid.
    fn can_step(&self, from: Point2<i32>, offset: Vector2<i32>) -> bool {
        let target = from + offset;
        if self.is_solid(target.x, target.y) {
            return false;
        }
        if offset.x != 0 && offset.y != 0 {
            return !(self.is_solid(from.x + offset.x, from.y) || self.is_solid(from.x, from.y + offset.y));
        }
        true
    }
}

impl<F> TileQuery for F
where
    F: Fn(i32, i32) -> Tile,
{
    fn tile_at(&self, x: i32, y: i32) -> Tile {
        self(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross(x: i32, y: i32) -> Tile {
        // walls at (1,0) and outside a 3x3 box
        if !(0..3).contains(&x) || !(0..3).contains(&y) || (x, y) == (1, 0) {
            Tile::Wall
        } else {
            Tile::Floor
        }
    }

    #[test]
    fn closures_answer_tile_queries() {
        assert_eq!(cross.tile_at(1, 1), Tile::Floor);
        assert!(cross.is_solid(-1, 0));
        assert_eq!(Tile::Wall.as_char(), '#');
        assert_eq!(Tile::Floor.as_char(), '.');
    }

    #[test]
    fn diagonal_steps_cannot_cut_corners() {
        let from = Point2::new(0, 1);
        assert!(cross.can_step(from, Vector2::new(0, 1)));
        assert!(!cross.can_step(from, Vector2::new(1, -1)));
        assert!(cross.can_step(from, Vector2::new(1, 1)));
        assert!(!cross.can_step(Point2::new(1, 1), Vector2::new(0, -1)));
    }
}
