//! # Motion System
//!
//! Drives every enemy through `Idle -> Deciding -> Moving -> Idle`.
//!
//! An idle enemy waits for its cooldown, then picks one of the eight headings
//! at random. The step is refused when the target is a wall, cuts a corner, is
//! the player's cell, or is held or claimed by another enemy; a refusal still
//! consumes the cooldown. An accepted step is interpolated over the animation
//! length and the next cooldown starts once it lands.

use cgmath::Point2;
use web_time::Duration;

use crate::config::MotionConfig;
use crate::engine_state::player::{
    cell_center,
    direction::{shortest_arc, Direction},
};
use crate::engine_state::voxels::tile::TileQuery;

use super::{Enemy, EntityArena, EntityHandle};

/// One accepted step, in flight.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Step {
    /// Cell left
    pub from: Point2<i32>,
    /// Cell entered
    pub to: Point2<i32>,
    /// Angle when the step started
    pub start_angle: f64,
    /// Angle faced on arrival
    pub target_angle: f64,
    /// Clock time at which the step started
    pub started_at: Duration,
}

/// Wandering state of one enemy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MotionState {
    /// Waiting for the cooldown to expire
    Idle,
    /// Cooldown expired, a heading is picked on this update
    Deciding,
    /// A step is being animated
    Moving(Step),
}

/// Why a picked step was refused.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The target cell is solid
    Wall,
    /// A diagonal step would brush a solid orthogonal neighbour
    CornerCut,
    /// The player stands on the target
    Player,
    /// Another enemy stands on or is stepping into the target
    Occupied,
}

/// What happened to an enemy during an update.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MotionEvent {
    /// A step was accepted
    Started {
        /// Enemy that moves
        handle: EntityHandle,
        /// Cell left
        from: Point2<i32>,
        /// Cell claimed
        to: Point2<i32>,
    },
    /// A step was refused and the cooldown re-armed
    Rejected {
        /// Enemy that stays
        handle: EntityHandle,
        /// Cell that was refused
        target: Point2<i32>,
        /// Refusal cause
        reason: RejectReason,
    },
    /// A step landed
    Completed {
        /// Enemy that moved
        handle: EntityHandle,
        /// Cell now stood on
        cell: Point2<i32>,
    },
}

/// Advances the wandering state machine of all enemies.
#[derive(Debug)]
pub struct MotionSystem {
    rng: fastrand::Rng,
    cooldown: Duration,
    animation: Duration,
}

impl MotionSystem {
    /// Creates a motion system drawing headings from `rng`.
    pub fn new(config: &MotionConfig, rng: fastrand::Rng) -> Self {
        Self {
            rng,
            cooldown: config.cooldown(),
            animation: config.animation(),
        }
    }

    /// Time between decisions.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Advances every enemy to `now` and reports decisions and arrivals.
    pub fn update<L>(
        &mut self,
        now: Duration,
        level: &L,
        player_cell: Point2<i32>,
        enemies: &mut EntityArena<Enemy>,
    ) -> Vec<MotionEvent>
    where
        L: TileQuery + ?Sized,
    {
        let mut events = Vec::new();
        for handle in enemies.handles() {
            if let Some(event) = self.advance(handle, now, level, player_cell, enemies) {
                events.push(event);
            }
        }
        events
    }

    fn advance<L>(
        &mut self,
        handle: EntityHandle,
        now: Duration,
        level: &L,
        player_cell: Point2<i32>,
        enemies: &mut EntityArena<Enemy>,
    ) -> Option<MotionEvent>
    where
        L: TileQuery + ?Sized,
    {
        loop {
            let enemy = enemies.get_mut(handle)?;
            let state = enemy.motion;
            match state {
                MotionState::Idle => {
                    if now < enemy.next_move_at {
                        return None;
                    }
                    enemy.motion = MotionState::Deciding;
                }
                MotionState::Deciding => {
                    let direction = Direction::ALL[self.rng.usize(..Direction::ALL.len())];
                    return self.decide(handle, direction, now, level, player_cell, enemies);
                }
                MotionState::Moving(step) => {
                    return self.animate(handle, enemy, step, now);
                }
            }
        }
    }

    fn decide<L>(
        &self,
        handle: EntityHandle,
        direction: Direction,
        now: Duration,
        level: &L,
        player_cell: Point2<i32>,
        enemies: &mut EntityArena<Enemy>,
    ) -> Option<MotionEvent>
    where
        L: TileQuery + ?Sized,
    {
        let from = enemies.get(handle)?.grid;
        let offset = direction.offset();
        let target = from + offset;

        let reason = if level.is_solid(target.x, target.y) {
            Some(RejectReason::Wall)
        } else if direction.is_diagonal() && !level.can_step(from, offset) {
            Some(RejectReason::CornerCut)
        } else if target == player_cell {
            Some(RejectReason::Player)
        } else if enemies
            .iter()
            .any(|(other, enemy)| other != handle && enemy.occupies(target))
        {
            Some(RejectReason::Occupied)
        } else {
            None
        };

        let enemy = enemies.get_mut(handle)?;
        if let Some(reason) = reason {
            log::debug!(
                "Enemy {} refused step to ({}, {}): {:?}",
                handle.index(),
                target.x,
                target.y,
                reason
            );
            enemy.motion = MotionState::Idle;
            enemy.next_move_at = now + self.cooldown;
            return Some(MotionEvent::Rejected {
                handle,
                target,
                reason,
            });
        }

        enemy.facing = direction;
        enemy.motion = MotionState::Moving(Step {
            from,
            to: target,
            start_angle: enemy.angle,
            target_angle: direction.view_angle(),
            started_at: now,
        });
        Some(MotionEvent::Started {
            handle,
            from,
            to: target,
        })
    }

    fn animate(&self, handle: EntityHandle, enemy: &mut Enemy, step: Step, now: Duration) -> Option<MotionEvent> {
        let t = if self.animation.is_zero() {
            1.0
        } else {
            (now.saturating_sub(step.started_at).as_secs_f64() / self.animation.as_secs_f64()).min(1.0)
        };

        let start = cell_center(step.from);
        let end = cell_center(step.to);
        enemy.position = start + (end - start) * t;
        enemy.angle = step.start_angle + shortest_arc(step.start_angle, step.target_angle) * t;

        if t < 1.0 {
            return None;
        }
        enemy.grid = step.to;
        enemy.position = end;
        enemy.angle = step.target_angle;
        enemy.motion = MotionState::Idle;
        enemy.next_move_at = now + self.cooldown;
        Some(MotionEvent::Completed {
            handle,
            cell: step.to,
        })
    }
}
