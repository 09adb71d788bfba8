//! # Engine State Module
//!
//! The core module that owns a running level and advances it frame by frame.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for a level in play
//! * `generation` - Dungeon and forest generators and the `LevelMap` seam
//! * `voxels` - The voxel volume every other subsystem reads
//! * `player` - Grid-locked player movement with a smoothed camera
//! * `visibility` - Ray-cast wall columns for the first-person view
//! * `entities` - Enemy and prop storage, wandering and spawning
//! * `streaming` - The materialised window around the player
//! * `minimap` - Text rendering of the tile grid
//!
//! ## Architecture
//!
//! Everything runs on the caller's thread, once per frame. `EngineState` owns
//! each subsystem outright; subsystems see each other only through arguments
//! passed in by the engine, never through stored references. The shell reads
//! what it needs to draw from [`Frame`] and addresses entities by handle.
//!
//! ## Frame Order
//!
//! 1. [`EngineState::intake_actions`] applies input; a confirmed step updates the streamer
//! 2. [`EngineState::tick`] advances the clock, camera, enemies and periodic spawns
//! 3. [`EngineState::frame`] casts the view and collects attached entity poses

use cgmath::{Point2, Rad};
use web_time::Duration;

use crate::config::EngineConfig;
use crate::error::WorldError;

use entities::{
    spawning, Enemy, EntityArena, EntityHandle, MotionEvent, MotionSystem, Prop,
};
use generation::{
    templates::{EnemyTemplate, EnvironmentTemplate},
    Biome, LevelMap,
};
use player::{direction::Direction, CameraPose, Player, PlayerEvent};
use streaming::{RegionStreamer, StreamUpdate};
use visibility::{Column, ColumnRenderer, HeightSlice, ViewPose, WallSlice};

pub mod entities;
pub mod generation;
pub mod minimap;
pub mod player;
pub mod streaming;
pub mod visibility;
pub mod voxels;

/// Viewport size used until the shell reports its own.
const DEFAULT_VIEWPORT: (f64, f64) = (640.0, 480.0);

/// Represents player actions derived from input
///
/// Key bindings live in the shell; each flag is one requested action for
/// the current frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlayerAction {
    /// Step along the heading
    pub move_forward: bool,
    /// Step against the heading
    pub move_backward: bool,
    /// Step to the left without turning
    pub strafe_left: bool,
    /// Step to the right without turning
    pub strafe_right: bool,
    /// Turn counter-clockwise
    pub turn_left: bool,
    /// Turn clockwise
    pub turn_right: bool,
}

impl PlayerAction {
    /// Whether no action is requested.
    pub fn is_empty(&self) -> bool {
        *self == PlayerAction::default()
    }
}

/// Pose of an attached entity, for the shell to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityPose {
    /// Handle the shell keys its meshes by
    pub handle: EntityHandle,
    /// Display name of the template
    pub name: &'static str,
    /// Interpolated position in cells
    pub position: Point2<f64>,
    /// Height of the ground under the entity
    pub ground: i32,
    /// View angle in radians
    pub angle: f64,
}

/// Everything a shell needs to draw one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Current camera pose
    pub camera: CameraPose,
    /// Camera yaw for 3D views
    pub yaw: Rad<f32>,
    /// Eye height in voxels
    pub eye_z: f64,
    /// One ray per screen column
    pub columns: Vec<Column>,
    /// Uniform slices, one per column
    pub wall_slices: Vec<WallSlice>,
    /// Height-aware slices, `None` where the ray missed
    pub height_slices: Vec<Option<HeightSlice>>,
    /// Attached enemies
    pub enemies: Vec<EntityPose>,
    /// Attached props
    pub props: Vec<EntityPose>,
}

/// What a tick changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Decisions and arrivals of wandering enemies
    pub motion: Vec<MotionEvent>,
    /// Props placed by the periodic spawn
    pub spawned_props: usize,
    /// Enemies placed by the periodic spawn
    pub spawned_enemies: Vec<EntityHandle>,
}

/// The main state container for a level in play
///
/// # Examples
///
/// ```
/// use voxel_crawler::config::EngineConfig;
/// use voxel_crawler::engine_state::{generation::Biome, EngineState, PlayerAction};
/// use web_time::Duration;
///
/// let mut engine = EngineState::new(EngineConfig::default(), Biome::Cave, 7).unwrap();
/// engine.intake_actions(&PlayerAction { move_forward: true, ..PlayerAction::default() });
/// engine.tick(Duration::from_millis(16));
/// let frame = engine.frame();
/// assert_eq!(frame.columns.len(), frame.wall_slices.len());
/// ```
pub struct EngineState {
    config: EngineConfig,
    biome: Biome,
    level: Box<dyn LevelMap>,
    player: Player,
    enemies: EntityArena<Enemy>,
    props: EntityArena<Prop>,
    motion: MotionSystem,
    streamer: RegionStreamer,
    renderer: ColumnRenderer,
    rng: fastrand::Rng,
    clock: Duration,
    next_environment_spawn: Duration,
}

impl EngineState {
    /// Generates a level for `biome` from `seed` and populates it.
    ///
    /// # Errors
    /// Returns the generator's or the streamer's parameter validation error.
    pub fn new(config: EngineConfig, biome: Biome, seed: u64) -> Result<Self, WorldError> {
        let level = biome.generate(&config, seed)?;
        let mut rng = fastrand::Rng::with_seed(seed).fork();
        let motion = MotionSystem::new(&config.motion, rng.fork());
        let player = Player::new(level.spawn_point(), &config.player);
        let streamer = RegionStreamer::new(&config.streaming)?;
        let renderer = ColumnRenderer::new(config.view.clone(), DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1);
        let next_environment_spawn = config.streaming.environment_spawn_interval();

        let mut engine = Self {
            config,
            biome,
            level,
            player,
            enemies: EntityArena::new(),
            props: EntityArena::new(),
            motion,
            streamer,
            renderer,
            rng,
            clock: Duration::ZERO,
            next_environment_spawn,
        };
        engine.populate();
        Ok(engine)
    }

    fn populate(&mut self) {
        let cooldown = self.motion.cooldown();
        for placed in self.level.enemies() {
            let facing = Direction::ALL[self.rng.usize(..Direction::ALL.len())];
            self.enemies
                .insert(Enemy::new(placed.template, placed.cell, facing, cooldown));
        }
        for placed in self.level.environment_items() {
            if self
                .level
                .has_room_for(placed.cell.x, placed.cell.y, placed.template.voxel_height)
            {
                self.props.insert(Prop {
                    template: placed.template,
                    cell: placed.cell,
                });
            }
        }

        let area = (self.level.width() * self.level.height()) as f64;
        let count = (area * spawning::INITIAL_PROP_DENSITY) as usize;
        spawning::scatter_environment(
            self.level.as_ref(),
            self.biome.environment(),
            count,
            &mut self.rng,
            None,
            &mut self.props,
        );

        self.streamer
            .update(self.player.cell(), self.level.as_ref(), &self.enemies, &self.props);
        log::info!(
            "Populated {} level with {} enemies and {} props",
            self.biome.name(),
            self.enemies.len(),
            self.props.len()
        );
    }

    /// Reports the shell's viewport size in pixels.
    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        self.renderer = ColumnRenderer::new(self.config.view.clone(), width, height);
    }

    /// Applies one frame of player input.
    ///
    /// A confirmed step is forwarded to the region streamer, which may rebuild
    /// the window.
    pub fn intake_actions(&mut self, actions: &PlayerAction) -> Option<PlayerEvent> {
        if actions.is_empty() {
            return None;
        }
        let enemies = &self.enemies;
        let event = self.player.intake_actions(actions, self.clock, self.level.as_ref(), |cell| {
            enemies.iter().any(|(_, enemy)| enemy.occupies(cell))
        })?;

        if let PlayerEvent::Moved { to, .. } = event {
            if let StreamUpdate::Rebuilt { generation } =
                self.streamer
                    .update(to, self.level.as_ref(), &self.enemies, &self.props)
            {
                log::debug!("Region generation {} after moving to ({}, {})", generation, to.x, to.y);
            }
        }
        Some(event)
    }

    /// Advances the clock by `dt` and every time-driven subsystem with it.
    pub fn tick(&mut self, dt: Duration) -> TickReport {
        self.clock += dt;
        self.player.update(self.clock);

        let mut report = TickReport {
            motion: self
                .motion
                .update(self.clock, self.level.as_ref(), self.player.cell(), &mut self.enemies),
            ..TickReport::default()
        };

        if self.clock >= self.next_environment_spawn {
            self.periodic_spawns(&mut report);
            self.next_environment_spawn = self.clock + self.config.streaming.environment_spawn_interval();
        }

        self.streamer.refresh(&self.enemies, &self.props);
        report
    }

    fn periodic_spawns(&mut self, report: &mut TickReport) {
        let Some(window) = self.streamer.window() else {
            return;
        };
        report.spawned_props = spawning::scatter_environment(
            self.level.as_ref(),
            self.biome.environment(),
            1,
            &mut self.rng,
            Some(&window),
            &mut self.props,
        );

        let next_move_at = self.clock + self.motion.cooldown();
        for spawn in self.biome.spawns() {
            if self.rng.f64() >= spawn.probability {
                continue;
            }
            if let Some(handle) = spawning::spawn_enemy_outside(
                self.level.as_ref(),
                spawn.enemy,
                &window,
                &mut self.enemies,
                &mut self.rng,
                next_move_at,
            ) {
                log::debug!("{} wandered in", spawn.enemy.name);
                report.spawned_enemies.push(handle);
            }
        }
    }

    /// Casts the view and collects the poses of attached entities.
    pub fn frame(&self) -> Frame {
        let camera = self.player.pose();
        let pose = ViewPose::new(camera, self.config.view.eye_offset);
        let eye_z = self.player.camera_ground(|cell| self.level.floor_at(cell.x, cell.y))
            + self.config.view.eye_height;

        let columns = self.renderer.cast_columns(&pose, self.level.as_ref());
        let wall_slices = columns.iter().map(|c| self.renderer.wall_slice(c)).collect();
        let height_slices = columns
            .iter()
            .map(|c| self.renderer.height_slice(c, self.level.as_ref(), eye_z))
            .collect();

        let enemies = self
            .enemies
            .iter()
            .filter(|(handle, _)| self.streamer.is_enemy_attached(*handle))
            .map(|(handle, enemy)| EntityPose {
                handle,
                name: enemy.template.name,
                position: enemy.position,
                ground: self.level.ground_height(enemy.grid.x, enemy.grid.y),
                angle: enemy.angle,
            })
            .collect();
        let props = self
            .props
            .iter()
            .filter(|(handle, _)| self.streamer.is_prop_attached(*handle))
            .map(|(handle, prop)| EntityPose {
                handle,
                name: prop.template.name,
                position: player::cell_center(prop.cell),
                ground: self.level.ground_height(prop.cell.x, prop.cell.y),
                angle: 0.0,
            })
            .collect();

        Frame {
            camera,
            yaw: self.player.yaw(),
            eye_z,
            columns,
            wall_slices,
            height_slices,
            enemies,
            props,
        }
    }

    /// Places an enemy next to the player.
    pub fn spawn_enemy_near_player(&mut self, template: &'static EnemyTemplate) -> Option<EntityHandle> {
        let handle = spawning::spawn_enemy_near_player(
            self.level.as_ref(),
            self.player.cell(),
            template,
            &mut self.enemies,
            &mut self.rng,
            self.clock,
            self.motion.cooldown(),
        )?;
        self.streamer.refresh(&self.enemies, &self.props);
        Some(handle)
    }

    /// Places a prop next to the player.
    pub fn spawn_prop_near_player(&mut self, template: &'static EnvironmentTemplate) -> Option<EntityHandle> {
        let handle =
            spawning::spawn_prop_near_player(self.level.as_ref(), self.player.cell(), template, &mut self.props)?;
        self.streamer.refresh(&self.enemies, &self.props);
        Some(handle)
    }

    /// Deletes an enemy outright, whether or not it is attached.
    pub fn remove_enemy(&mut self, handle: EntityHandle) -> Option<Enemy> {
        let enemy = self.enemies.remove(handle)?;
        self.streamer.refresh(&self.enemies, &self.props);
        Some(enemy)
    }

    /// Deletes a prop outright, whether or not it is attached.
    pub fn remove_prop(&mut self, handle: EntityHandle) -> Option<Prop> {
        let prop = self.props.remove(handle)?;
        self.streamer.refresh(&self.enemies, &self.props);
        Some(prop)
    }

    /// Text map of the level with the player and enemies.
    pub fn minimap(&self) -> String {
        let enemies: Vec<Point2<i32>> = self.enemies.iter().map(|(_, enemy)| enemy.grid).collect();
        minimap::render_ascii(
            self.level.as_ref(),
            self.level.width(),
            self.level.height(),
            self.player.cell(),
            &enemies,
        )
    }

    /// The level in play.
    pub fn level(&self) -> &dyn LevelMap {
        self.level.as_ref()
    }

    /// The player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// All enemies, attached or not.
    pub fn enemies(&self) -> &EntityArena<Enemy> {
        &self.enemies
    }

    /// All props, attached or not.
    pub fn props(&self) -> &EntityArena<Prop> {
        &self.props
    }

    /// The region streamer.
    pub fn streamer(&self) -> &RegionStreamer {
        &self.streamer
    }

    /// Biome of the level.
    pub fn biome(&self) -> Biome {
        self.biome
    }

    /// Time elapsed since the level started.
    pub fn clock(&self) -> Duration {
        self.clock
    }
}
