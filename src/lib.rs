#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Crawler
//!
//! The world core of a grid-based first-person dungeon crawler: procedural voxel
//! levels, ray-cast visibility, wandering enemies and a streamed render window.
//!
//! This crate has no window or audio of its own. A shell feeds it input and draws
//! what [`engine_state::EngineState::frame`] returns.
//!
//! ## Key Modules
//!
//! * `config` - Tunable parameters with the shipped defaults, loadable from JSON
//! * `engine_state` - Level generation, the voxel volume, player, visibility, entities and streaming
//! * `error` - The error returned when generation parameters are malformed
//!
//! ## Architecture
//!
//! Levels are generated once from an explicit seed into a fixed-size voxel volume.
//! After that the engine is advanced synchronously once per frame:
//! * Player input moves the player one cell at a time and may recentre the streamed window
//! * Enemies wander on their own cooldowns and never share a cell
//! * The first-person view is a fan of grid-traversal rays
//!
//! ## Usage
//!
//! ```rust
//! use voxel_crawler::config::EngineConfig;
//! use voxel_crawler::engine_state::{generation::Biome, EngineState};
//!
//! let engine = EngineState::new(EngineConfig::default(), Biome::Forest, 42).unwrap();
//! println!("{}", engine.minimap());
//! ```

use std::env;
use std::fs;

use log::info;
use web_time::Duration;

use config::EngineConfig;
use engine_state::{
    generation::{templates::SKELETON_WARRIOR, Biome},
    player::PlayerEvent,
    EngineState, PlayerAction,
};
use error::WorldError;

pub mod config;
pub mod engine_state;
pub mod error;

/// Environment variable naming a JSON configuration file for [`run`].
pub const CONFIG_ENV_VAR: &str = "VOXEL_CRAWLER_CONFIG";

/// Length of one simulated frame in the headless demo.
const DEMO_FRAME: Duration = Duration::from_millis(16);
/// Number of frames simulated per level in the headless demo.
const DEMO_FRAMES: u32 = 300;

/// Runs the headless demo: generates a forest and a cave, walks the player around
/// for a few seconds of game time and prints each level's minimap.
///
/// # Errors
/// Returns [`WorldError`] if the configuration file cannot be read or holds
/// invalid generation parameters.
pub fn run() -> Result<(), WorldError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match env::var(CONFIG_ENV_VAR) {
        Ok(path) => {
            let text = fs::read_to_string(&path).map_err(|err| WorldError::Config(format!("{path}: {err}")))?;
            EngineConfig::from_json_str(&text)?
        }
        Err(_) => EngineConfig::default(),
    };

    for biome in [Biome::Forest, Biome::Cave] {
        let seed = fastrand::u64(..);
        let mut engine = EngineState::new(config.clone(), biome, seed)?;
        engine.spawn_enemy_near_player(&SKELETON_WARRIOR);
        simulate(&mut engine);

        let frame = engine.frame();
        info!(
            "{} after {:?}: {} columns, {} enemies and {} props in view, region generation {}",
            biome.name(),
            engine.clock(),
            frame.columns.len(),
            frame.enemies.len(),
            frame.props.len(),
            engine.streamer().generation()
        );
        println!("{} (seed {})\n{}", biome.name(), seed, engine.minimap());
    }
    Ok(())
}

/// Walks forward whenever possible and turns right when blocked.
fn simulate(engine: &mut EngineState) {
    let forward = PlayerAction {
        move_forward: true,
        ..PlayerAction::default()
    };
    let turn = PlayerAction {
        turn_right: true,
        ..PlayerAction::default()
    };
    let mut blocked = false;
    for _ in 0..DEMO_FRAMES {
        let actions = if blocked { &turn } else { &forward };
        match engine.intake_actions(actions) {
            Some(PlayerEvent::Blocked(_)) => blocked = true,
            Some(PlayerEvent::Turned(_)) => blocked = false,
            Some(PlayerEvent::Moved { .. }) | None => {}
        }
        engine.tick(DEMO_FRAME);
    }
}
