//! # Entities
//!
//! Enemies and environment props living on the grid of a level.
//!
//! ## Key Components
//!
//! * `EntityArena` - Generational storage, so the shell and the streamer hold handles
//!   instead of references into game logic
//! * `MotionSystem` - The idle, deciding and moving state machine that makes enemies wander
//! * `spawning` - Placement of enemies and props next to the player or across the map
//!
//! Logical state (grid cell, hit points) is independent of rendering: the region
//! streamer only attaches or detaches handles, it never deletes entities.

use cgmath::Point2;
use web_time::Duration;

use crate::engine_state::generation::templates::{EnemyTemplate, EnvironmentTemplate};
use crate::engine_state::player::{cell_center, direction::Direction};

pub use arena::{EntityArena, EntityHandle};
pub use motion::{MotionEvent, MotionState, MotionSystem, RejectReason, Step};

pub mod arena;
pub mod motion;
pub mod spawning;

/// A wandering enemy.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    /// Shared stats
    pub template: &'static EnemyTemplate,
    /// Remaining hit points
    pub hp: i32,
    /// Cell the enemy stands on; stays the origin cell until a step completes
    pub grid: Point2<i32>,
    /// Heading of the last step
    pub facing: Direction,
    /// Interpolated position in cells
    pub position: Point2<f64>,
    /// Interpolated view angle in radians
    pub angle: f64,
    /// Wandering state
    pub motion: MotionState,
    /// Earliest clock time of the next decision
    pub next_move_at: Duration,
}

impl Enemy {
    /// Creates an enemy at rest on `cell`, ready to decide at `next_move_at`.
    pub fn new(
        template: &'static EnemyTemplate,
        cell: Point2<i32>,
        facing: Direction,
        next_move_at: Duration,
    ) -> Self {
        Self {
            template,
            hp: template.hp,
            grid: cell,
            facing,
            position: cell_center(cell),
            angle: facing.view_angle(),
            motion: MotionState::Idle,
            next_move_at,
        }
    }

    /// Cell the enemy is stepping into, if a step is in flight.
    pub fn target(&self) -> Option<Point2<i32>> {
        match self.motion {
            MotionState::Moving(step) => Some(step.to),
            MotionState::Idle | MotionState::Deciding => None,
        }
    }

    /// Whether the enemy stands on or is stepping into `cell`.
    pub fn occupies(&self, cell: Point2<i32>) -> bool {
        self.grid == cell || self.target() == Some(cell)
    }
}

/// An environment prop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prop {
    /// Shared stats
    pub template: &'static EnvironmentTemplate,
    /// Cell the prop stands on
    pub cell: Point2<i32>,
}

/// Anything with a grid cell the streamer can sort into or out of the window.
pub trait GridPositioned {
    /// Logical cell.
    fn grid_cell(&self) -> Point2<i32>;
}

impl GridPositioned for Enemy {
    fn grid_cell(&self) -> Point2<i32> {
        self.grid
    }
}

impl GridPositioned for Prop {
    fn grid_cell(&self) -> Point2<i32> {
        self.cell
    }
}
