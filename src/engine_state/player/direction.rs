//! # Direction Module
//!
//! The eight compass headings and the lookup tables that turn them into grid
//! offsets and angles. Grid `y` grows southwards, so north is `(0, -1)`.

use cgmath::{Rad, Vector2};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

/// A compass heading.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards negative y
    North,
    /// Diagonal between north and east
    NorthEast,
    /// Towards positive x
    East,
    /// Diagonal between south and east
    SouthEast,
    /// Towards positive y
    South,
    /// Diagonal between south and west
    SouthWest,
    /// Towards negative x
    West,
    /// Diagonal between north and west
    NorthWest,
}

impl Direction {
    /// All headings, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The four axis-aligned headings, clockwise from north.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// One-cell grid step in this heading.
    pub fn offset(self) -> Vector2<i32> {
        let (dx, dy) = match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        };
        Vector2::new(dx, dy)
    }

    /// Step taken by a strafe to the left. Diagonal headings strafe along the axis
    /// counter-clockwise of them.
    pub fn strafe_left(self) -> Vector2<i32> {
        let (dx, dy) = match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (0, -1),
            Direction::East => (0, -1),
            Direction::SouthEast => (1, 0),
            Direction::South => (1, 0),
            Direction::SouthWest => (0, 1),
            Direction::West => (0, 1),
            Direction::NorthWest => (-1, 0),
        };
        Vector2::new(dx, dy)
    }

    /// Step taken by a strafe to the right. Diagonal headings strafe along the axis
    /// clockwise of them.
    pub fn strafe_right(self) -> Vector2<i32> {
        let (dx, dy) = match self {
            Direction::North => (1, 0),
            Direction::NorthEast => (1, 0),
            Direction::East => (0, 1),
            Direction::SouthEast => (0, 1),
            Direction::South => (-1, 0),
            Direction::SouthWest => (-1, 0),
            Direction::West => (0, -1),
            Direction::NorthWest => (0, -1),
        };
        Vector2::new(dx, dy)
    }

    /// Whether the heading moves along both axes at once.
    pub fn is_diagonal(self) -> bool {
        let offset = self.offset();
        offset.x != 0 && offset.y != 0
    }

    /// View angle in the map plane, in radians, as used by the 2D caster
    /// (`0` is east, `-PI/2` is north).
    pub fn view_angle(self) -> f64 {
        match self {
            Direction::North => -FRAC_PI_2,
            Direction::NorthEast => -FRAC_PI_4,
            Direction::East => 0.0,
            Direction::SouthEast => FRAC_PI_4,
            Direction::South => FRAC_PI_2,
            Direction::SouthWest => 3.0 * FRAC_PI_4,
            Direction::West => PI,
            Direction::NorthWest => -3.0 * FRAC_PI_4,
        }
    }

    /// Yaw around the vertical axis for 3D views (`0` faces north, positive turns west).
    pub fn yaw(self) -> Rad<f32> {
        let yaw = match self {
            Direction::North => 0.0,
            Direction::NorthEast => -FRAC_PI_4,
            Direction::East => -FRAC_PI_2,
            Direction::SouthEast => -3.0 * FRAC_PI_4,
            Direction::South => PI,
            Direction::SouthWest => 3.0 * FRAC_PI_4,
            Direction::West => FRAC_PI_2,
            Direction::NorthWest => FRAC_PI_4,
        };
        Rad(yaw as f32)
    }

    fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::NorthEast => 1,
            Direction::East => 2,
            Direction::SouthEast => 3,
            Direction::South => 4,
            Direction::SouthWest => 5,
            Direction::West => 6,
            Direction::NorthWest => 7,
        }
    }

    /// Next heading clockwise in the eight-way rose.
    pub fn rotate_right(self) -> Self {
        Self::ALL[(self.index() + 1) % 8]
    }

    /// Next heading counter-clockwise in the eight-way rose.
    pub fn rotate_left(self) -> Self {
        Self::ALL[(self.index() + 7) % 8]
    }

    /// Next cardinal heading clockwise. Diagonals snap to the cardinal after them.
    pub fn rotate_right_cardinal(self) -> Self {
        Self::CARDINAL[(self.index() / 2 + 1) % 4]
    }

    /// Next cardinal heading counter-clockwise. Diagonals snap to the cardinal before them.
    pub fn rotate_left_cardinal(self) -> Self {
        Self::CARDINAL[((self.index() + 1) / 2 + 3) % 4]
    }
}

/// Signed difference `to - from` folded into `[-PI, PI)`, so interpolating by it
/// always turns the short way round.
pub fn shortest_arc(from: f64, to: f64) -> f64 {
    (to - from + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_match_view_angles() {
        for dir in Direction::ALL {
            let offset = dir.offset();
            let angle = (offset.y as f64).atan2(offset.x as f64);
            let diff = (angle - dir.view_angle()).rem_euclid(2.0 * PI);
            assert!(diff < 1e-9 || (2.0 * PI - diff) < 1e-9, "{dir:?}");
        }
    }

    #[test]
    fn half_the_headings_are_diagonal() {
        let diagonal: Vec<Direction> = Direction::ALL.into_iter().filter(|d| d.is_diagonal()).collect();
        assert_eq!(diagonal.len(), 4);
        assert!(Direction::CARDINAL.iter().all(|d| !d.is_diagonal()));
    }

    #[test]
    fn strafes_are_mirrors() {
        for dir in Direction::CARDINAL {
            assert_eq!(dir.strafe_left(), -dir.strafe_right());
        }
        assert_eq!(Direction::NorthEast.strafe_left(), Direction::North.offset());
        assert_eq!(Direction::NorthEast.strafe_right(), Direction::East.offset());
    }

    #[test]
    fn rotation_cycles() {
        let mut dir = Direction::North;
        for _ in 0..8 {
            dir = dir.rotate_right();
        }
        assert_eq!(dir, Direction::North);
        assert_eq!(Direction::North.rotate_left(), Direction::NorthWest);
        assert_eq!(Direction::North.rotate_left_cardinal(), Direction::West);
        assert_eq!(Direction::West.rotate_right_cardinal(), Direction::North);
        assert_eq!(Direction::NorthEast.rotate_right_cardinal(), Direction::East);
        assert_eq!(Direction::NorthEast.rotate_left_cardinal(), Direction::North);
    }

    #[test]
    fn arcs_take_the_short_way() {
        assert!((shortest_arc(0.0, FRAC_PI_2) - FRAC_PI_2).abs() < 1e-12);
        assert!((shortest_arc(-3.0 * FRAC_PI_4, PI) + FRAC_PI_4).abs() < 1e-12);
        assert!((shortest_arc(3.0 * FRAC_PI_4, -3.0 * FRAC_PI_4) - FRAC_PI_2).abs() < 1e-12);
    }
}
