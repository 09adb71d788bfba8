//! # Player Module
//!
//! Grid-locked player movement with a smoothed camera.
//!
//! ## Key Components
//!
//! * `Player` - Logical cell and heading plus the camera that trails them
//! * `CameraAnimation` - One in-flight step or turn, sampled by wall-clock time
//! * `PlayerEvent` - What an input produced, so the engine knows when to stream
//!
//! The logical position changes the moment a move is accepted; only the camera
//! takes `move_duration` to catch up. While the camera is animating every new
//! input is dropped rather than queued.

use cgmath::{InnerSpace, Point2, Rad, Vector2};
use web_time::Duration;

use crate::config::{PlayerConfig, TurnMode};
use crate::engine_state::generation::SpawnPoint;
use crate::engine_state::voxels::tile::TileQuery;
use crate::engine_state::PlayerAction;

use direction::{shortest_arc, Direction};

pub mod direction;

/// Camera position and map-plane view angle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraPose {
    /// Continuous position in cells
    pub position: Point2<f64>,
    /// View angle in radians, `0` east and `-PI/2` north
    pub angle: f64,
}

/// One camera transition between two poses.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraAnimation {
    /// Pose when the input was accepted
    pub start: CameraPose,
    /// Pose the camera settles on
    pub target: CameraPose,
    /// Clock time at which the animation started
    pub started_at: Duration,
    /// Total length of the animation
    pub duration: Duration,
}

impl CameraAnimation {
    /// Fraction of the animation elapsed at `now`, clamped to `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Interpolated pose at `now`. Rotation follows the shortest arc.
    pub fn sample(&self, now: Duration) -> CameraPose {
        let t = self.progress(now);
        let position = self.start.position + (self.target.position - self.start.position) * t;
        let angle = self.start.angle + shortest_arc(self.start.angle, self.target.angle) * t;
        CameraPose { position, angle }
    }

    /// Whether the animation has run its full length at `now`.
    pub fn is_finished(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Outcome of feeding one set of actions to the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The player stepped from one cell into another
    Moved {
        /// Cell left
        from: Point2<i32>,
        /// Cell entered
        to: Point2<i32>,
    },
    /// The player turned to a new heading
    Turned(Direction),
    /// A move was requested but the target was not reachable
    Blocked(Point2<i32>),
}

/// The player avatar.
#[derive(Debug)]
pub struct Player {
    cell: Point2<i32>,
    facing: Direction,
    turn_mode: TurnMode,
    move_duration: Duration,
    pose: CameraPose,
    animation: Option<CameraAnimation>,
}

/// Centre of an integer cell in continuous coordinates.
pub fn cell_center(cell: Point2<i32>) -> Point2<f64> {
    Point2::new(cell.x as f64 + 0.5, cell.y as f64 + 0.5)
}

impl Player {
    /// Places the player on a level's spawn point.
    pub fn new(spawn: SpawnPoint, config: &PlayerConfig) -> Self {
        Self {
            cell: spawn.cell,
            facing: spawn.facing,
            turn_mode: config.turn_mode,
            move_duration: config.move_duration(),
            pose: CameraPose {
                position: cell_center(spawn.cell),
                angle: spawn.facing.view_angle(),
            },
            animation: None,
        }
    }

    /// Logical cell.
    pub fn cell(&self) -> Point2<i32> {
        self.cell
    }

    /// Logical heading.
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Current camera pose.
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Yaw for 3D views, snapped to the logical heading.
    pub fn yaw(&self) -> Rad<f32> {
        self.facing.yaw()
    }

    /// Whether a camera animation is still in flight.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Ground height under the camera, blended between the start and target cells
    /// of an in-flight step by how far the camera has travelled.
    pub fn camera_ground<F>(&self, floor_at: F) -> f64
    where
        F: Fn(Point2<i32>) -> i32,
    {
        let Some(animation) = self.animation else {
            return floor_at(self.pose.cell()) as f64;
        };
        let from = floor_at(animation.start.cell()) as f64;
        let to = floor_at(animation.target.cell()) as f64;
        let span = (animation.target.position - animation.start.position).magnitude();
        if span <= 0.0 {
            return to;
        }
        let t = ((self.pose.position - animation.start.position).magnitude() / span).clamp(0.0, 1.0);
        from + (to - from) * t
    }

    /// Applies one frame of input.
    ///
    /// Turning wins over moving when both are requested. `occupied` reports cells
    /// held by enemies. Returns `None` when the input was empty or dropped because
    /// the camera is still animating.
    pub fn intake_actions<L, O>(
        &mut self,
        actions: &PlayerAction,
        now: Duration,
        level: &L,
        occupied: O,
    ) -> Option<PlayerEvent>
    where
        L: TileQuery + ?Sized,
        O: Fn(Point2<i32>) -> bool,
    {
        if self.animation.is_some() {
            return None;
        }

        if actions.turn_left || actions.turn_right {
            let facing = match (actions.turn_left, self.turn_mode) {
                (true, TurnMode::Octal) => self.facing.rotate_left(),
                (true, TurnMode::Cardinal) => self.facing.rotate_left_cardinal(),
                (false, TurnMode::Octal) => self.facing.rotate_right(),
                (false, TurnMode::Cardinal) => self.facing.rotate_right_cardinal(),
            };
            self.facing = facing;
            self.animate_to(cell_center(self.cell), facing.view_angle(), now);
            return Some(PlayerEvent::Turned(facing));
        }

        let offset = self.requested_step(actions)?;
        let target = self.cell + offset;
        if !level.can_step(self.cell, offset) || occupied(target) {
            log::debug!("Player move to ({}, {}) blocked", target.x, target.y);
            return Some(PlayerEvent::Blocked(target));
        }

        let from = self.cell;
        self.cell = target;
        self.animate_to(cell_center(target), self.facing.view_angle(), now);
        Some(PlayerEvent::Moved { from, to: target })
    }

    /// Advances the camera animation to `now`, snapping onto the target once it ends.
    pub fn update(&mut self, now: Duration) -> CameraPose {
        if let Some(animation) = self.animation {
            if animation.is_finished(now) {
                self.pose = animation.target;
                self.animation = None;
            } else {
                self.pose = animation.sample(now);
            }
        }
        self.pose
    }

    fn requested_step(&self, actions: &PlayerAction) -> Option<Vector2<i32>> {
        if actions.move_forward {
            Some(self.facing.offset())
        } else if actions.move_backward {
            Some(-self.facing.offset())
        } else if actions.strafe_left {
            Some(self.facing.strafe_left())
        } else if actions.strafe_right {
            Some(self.facing.strafe_right())
        } else {
            None
        }
    }

    fn animate_to(&mut self, position: Point2<f64>, angle: f64, now: Duration) {
        self.animation = Some(CameraAnimation {
            start: self.pose,
            target: CameraPose { position, angle },
            started_at: now,
            duration: self.move_duration,
        });
    }
}

impl CameraPose {
    /// Cell the camera is currently over.
    pub fn cell(&self) -> Point2<i32> {
        Point2::new(self.position.x.floor() as i32, self.position.y.floor() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::tile::Tile;

    fn open_room(x: i32, y: i32) -> Tile {
        if (1..6).contains(&x) && (1..6).contains(&y) && (x, y) != (4, 2) {
            Tile::Floor
        } else {
            Tile::Wall
        }
    }

    fn player_at(x: i32, y: i32, facing: Direction) -> Player {
        Player::new(SpawnPoint::new(Point2::new(x, y), facing), &PlayerConfig::default())
    }

    fn forward() -> PlayerAction {
        PlayerAction {
            move_forward: true,
            ..PlayerAction::default()
        }
    }

    #[test]
    fn steps_update_the_cell_at_once_and_the_camera_over_time() {
        let mut player = player_at(3, 3, Direction::North);
        let event = player.intake_actions(&forward(), Duration::ZERO, &open_room, |_| false);
        assert_eq!(
            event,
            Some(PlayerEvent::Moved {
                from: Point2::new(3, 3),
                to: Point2::new(3, 2)
            })
        );
        assert_eq!(player.cell(), Point2::new(3, 2));

        let halfway = player.update(Duration::from_millis(100));
        assert!((halfway.position.y - 3.0).abs() < 1e-9);
        assert!(player.is_animating());

        let done = player.update(Duration::from_millis(250));
        assert_eq!(done.position, Point2::new(3.5, 2.5));
        assert!(!player.is_animating());
    }

    #[test]
    fn input_is_dropped_while_animating() {
        let mut player = player_at(3, 3, Direction::North);
        player.intake_actions(&forward(), Duration::ZERO, &open_room, |_| false);
        let dropped = player.intake_actions(&forward(), Duration::from_millis(50), &open_room, |_| false);
        assert_eq!(dropped, None);
        assert_eq!(player.cell(), Point2::new(3, 2));
    }

    #[test]
    fn walls_corners_and_enemies_block() {
        let mut player = player_at(1, 1, Direction::North);
        let blocked = player.intake_actions(&forward(), Duration::ZERO, &open_room, |_| false);
        assert_eq!(blocked, Some(PlayerEvent::Blocked(Point2::new(1, 0))));

        // (4,2) is a pillar
        let mut player = player_at(3, 2, Direction::East);
        let blocked = player.intake_actions(&forward(), Duration::ZERO, &open_room, |_| false);
        assert_eq!(blocked, Some(PlayerEvent::Blocked(Point2::new(4, 2))));

        let mut player = player_at(3, 3, Direction::NorthEast);
        let blocked = player.intake_actions(&forward(), Duration::ZERO, &open_room, |_| false);
        assert_eq!(blocked, Some(PlayerEvent::Blocked(Point2::new(4, 2))));

        let mut player = player_at(4, 3, Direction::NorthWest);
        let corner = player.intake_actions(&forward(), Duration::ZERO, &open_room, |_| false);
        assert_eq!(corner, Some(PlayerEvent::Blocked(Point2::new(3, 2))));

        let mut player = player_at(2, 2, Direction::South);
        let enemy = Point2::new(2, 3);
        let blocked = player.intake_actions(&forward(), Duration::ZERO, &open_room, |cell| cell == enemy);
        assert_eq!(blocked, Some(PlayerEvent::Blocked(enemy)));
    }

    #[test]
    fn turning_follows_the_turn_mode() {
        let mut player = player_at(3, 3, Direction::North);
        let turn = PlayerAction {
            turn_right: true,
            ..PlayerAction::default()
        };
        assert_eq!(
            player.intake_actions(&turn, Duration::ZERO, &open_room, |_| false),
            Some(PlayerEvent::Turned(Direction::NorthEast))
        );

        let config = PlayerConfig {
            turn_mode: TurnMode::Cardinal,
            ..PlayerConfig::default()
        };
        let mut player = Player::new(SpawnPoint::new(Point2::new(3, 3), Direction::West), &config);
        let turn = PlayerAction {
            turn_left: true,
            ..PlayerAction::default()
        };
        player.intake_actions(&turn, Duration::ZERO, &open_room, |_| false);
        assert_eq!(player.facing(), Direction::South);
        let pose = player.update(Duration::from_secs(1));
        assert!((pose.angle - Direction::South.view_angle()).abs() < 1e-9);
    }

    #[test]
    fn eye_ground_follows_the_camera_not_the_cell() {
        let mut player = player_at(2, 2, Direction::East);
        let ground = |cell: Point2<i32>| if cell.x == 3 { 4 } else { 0 };

        player.intake_actions(&forward(), Duration::ZERO, &open_room, |_| false);
        assert_eq!(player.cell(), Point2::new(3, 2));
        assert_eq!(player.camera_ground(ground), 0.0);

        player.update(Duration::from_millis(100));
        assert!((player.camera_ground(ground) - 2.0).abs() < 1e-9);

        player.update(Duration::from_millis(200));
        assert_eq!(player.camera_ground(ground), 4.0);
    }
}
