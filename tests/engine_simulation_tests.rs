use std::collections::HashSet;

use web_time::Duration;

use voxel_crawler::config::EngineConfig;
use voxel_crawler::engine_state::entities::MotionEvent;
use voxel_crawler::engine_state::generation::templates::{MUSHROOM, SKELETON_WARRIOR};
use voxel_crawler::engine_state::generation::Biome;
use voxel_crawler::engine_state::player::PlayerEvent;
use voxel_crawler::engine_state::voxels::tile::TileQuery;
use voxel_crawler::engine_state::{EngineState, PlayerAction};

const FRAME: Duration = Duration::from_millis(16);

fn forward() -> PlayerAction {
    PlayerAction {
        move_forward: true,
        ..PlayerAction::default()
    }
}

fn turn_right() -> PlayerAction {
    PlayerAction {
        turn_right: true,
        ..PlayerAction::default()
    }
}

#[test]
fn wandering_enemies_only_take_legal_steps() {
    let mut engine = EngineState::new(EngineConfig::default(), Biome::Cave, 11).unwrap();
    let spawned = (0..4)
        .filter_map(|_| engine.spawn_enemy_near_player(&SKELETON_WARRIOR))
        .count();
    assert!(spawned > 0);

    for _ in 0..2_000 {
        let report = engine.tick(FRAME);
        for event in &report.motion {
            if let MotionEvent::Started { from, to, .. } = *event {
                let offset = to - from;
                assert!(offset.x.abs() <= 1 && offset.y.abs() <= 1 && offset != cgmath::Vector2::new(0, 0));
                assert!(engine.level().can_step(from, offset), "illegal step {from:?} -> {to:?}");
                assert_ne!(to, engine.player().cell());
            }
        }

        let mut claimed = HashSet::new();
        for (_, enemy) in engine.enemies().iter() {
            assert!(!engine.level().is_solid(enemy.grid.x, enemy.grid.y));
            assert_ne!(enemy.grid, engine.player().cell());
            assert!(claimed.insert(enemy.grid), "two enemies on {:?}", enemy.grid);
            if let Some(target) = enemy.target() {
                assert!(claimed.insert(target), "two enemies heading for {target:?}");
            }
        }
    }
}

#[test]
fn streamed_window_follows_the_player() {
    let config = EngineConfig::from_json_str(r#"{ "streaming": { "draw_distance": 4, "margin": 1 } }"#).unwrap();
    let mut engine = EngineState::new(config, Biome::Forest, 5).unwrap();
    engine.spawn_enemy_near_player(&SKELETON_WARRIOR);
    assert_eq!(engine.streamer().generation(), 1);

    let mut blocked = false;
    let mut moves = 0;
    for _ in 0..600 {
        let actions = if blocked { turn_right() } else { forward() };
        match engine.intake_actions(&actions) {
            Some(PlayerEvent::Moved { .. }) => moves += 1,
            Some(PlayerEvent::Blocked(_)) => blocked = true,
            Some(PlayerEvent::Turned(_)) => blocked = false,
            None => {}
        }
        engine.tick(FRAME);

        let window = engine.streamer().window().unwrap();
        let player = engine.player().cell();
        assert!((player.x - window.center.x).abs() <= 3 && (player.y - window.center.y).abs() <= 3);
        for (handle, enemy) in engine.enemies().iter() {
            assert_eq!(engine.streamer().is_enemy_attached(handle), window.contains(enemy.grid));
        }
        for (handle, prop) in engine.props().iter() {
            assert_eq!(engine.streamer().is_prop_attached(handle), window.contains(prop.cell));
        }
    }
    assert!(moves > 4);
    assert!(engine.streamer().generation() > 1);
}

#[test]
fn frames_cast_one_slice_per_column() {
    let mut engine = EngineState::new(EngineConfig::default(), Biome::Cave, 2).unwrap();
    engine.resize_viewport(640.0, 480.0);
    let frame = engine.frame();

    assert!(!frame.columns.is_empty());
    assert_eq!(frame.columns.len(), frame.wall_slices.len());
    assert_eq!(frame.columns.len(), frame.height_slices.len());
    for (column, slice) in frame.columns.iter().zip(&frame.height_slices) {
        assert_eq!(column.hit.is_hit(), slice.is_some());
        if let Some(slice) = slice {
            assert!(slice.top < 240.0 && 240.0 < slice.bottom);
        }
    }
    for wall in &frame.wall_slices {
        assert!(wall.height <= 480.0);
        assert!((wall.top * 2.0 + wall.height - 480.0).abs() < 1e-9);
    }
}

#[test]
fn removed_entities_leave_the_frame() {
    let mut engine = EngineState::new(EngineConfig::default(), Biome::Cave, 8).unwrap();
    let enemy = engine.spawn_enemy_near_player(&SKELETON_WARRIOR).unwrap();
    let prop = engine.spawn_prop_near_player(&MUSHROOM).unwrap();
    assert!(engine.frame().enemies.iter().any(|pose| pose.handle == enemy));
    assert!(engine.frame().props.iter().any(|pose| pose.handle == prop));

    assert!(engine.remove_enemy(enemy).is_some());
    assert!(engine.remove_prop(prop).is_some());
    assert!(engine.remove_enemy(enemy).is_none());
    assert!(!engine.enemies().contains(enemy));
    assert!(!engine.frame().enemies.iter().any(|pose| pose.handle == enemy));
    assert!(!engine.frame().props.iter().any(|pose| pose.handle == prop));
}

#[test]
fn props_trickle_in_outside_the_window() {
    let mut engine = EngineState::new(EngineConfig::default(), Biome::Forest, 21).unwrap();
    let before = engine.props().len();
    let mut spawned = 0;
    for _ in 0..(10_500 / 16) {
        spawned += engine.tick(FRAME).spawned_props;
    }
    assert!(spawned <= 1);
    assert_eq!(engine.props().len(), before + spawned);
}

#[test]
fn minimap_marks_the_player() {
    let engine = EngineState::new(EngineConfig::default(), Biome::Plain, 4).unwrap();
    let map = engine.minimap();
    let rows: Vec<&str> = map.lines().collect();
    let cell = engine.player().cell();
    assert_eq!(rows.len(), engine.level().height() as usize);
    assert_eq!(rows[cell.y as usize].chars().nth(cell.x as usize), Some('@'));
}
