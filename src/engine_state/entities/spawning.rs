//! Runtime placement of enemies and props.

use cgmath::Point2;
use web_time::Duration;

use crate::engine_state::generation::templates::{EnemyTemplate, EnvironmentTemplate};
use crate::engine_state::generation::LevelMap;
use crate::engine_state::player::direction::Direction;
use crate::engine_state::streaming::RegionWindow;
use crate::engine_state::voxels::tile::Tile;

use super::{Enemy, EntityArena, EntityHandle, Prop};

/// Neighbour cells tried around the player, in order.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

/// Random cells tried per prop before giving up on it.
pub const SCATTER_TRIES: usize = 50;

/// Share of the map area covered by props scattered at level load.
pub const INITIAL_PROP_DENSITY: f64 = 0.01;

/// First neighbour of `center` that is walkable, not `blocked`, and tall enough
/// for a model of `voxel_height`.
pub fn free_neighbour<L, B>(level: &L, center: Point2<i32>, voxel_height: i32, blocked: B) -> Option<Point2<i32>>
where
    L: LevelMap + ?Sized,
    B: Fn(Point2<i32>) -> bool,
{
    NEIGHBOUR_OFFSETS
        .iter()
        .map(|&(dx, dy)| Point2::new(center.x + dx, center.y + dy))
        .find(|&cell| {
            level.tile_at(cell.x, cell.y) == Tile::Floor
                && !blocked(cell)
                && level.has_room_for(cell.x, cell.y, voxel_height)
        })
}

/// Places an enemy on the first free neighbour of the player with a random heading.
///
/// The enemy decides its first step one `cooldown` after `now`. Returns `None` when
/// every neighbour is walled in or taken.
pub fn spawn_enemy_near_player<L>(
    level: &L,
    player_cell: Point2<i32>,
    template: &'static EnemyTemplate,
    enemies: &mut EntityArena<Enemy>,
    rng: &mut fastrand::Rng,
    now: Duration,
    cooldown: Duration,
) -> Option<EntityHandle>
where
    L: LevelMap + ?Sized,
{
    let cell = free_neighbour(level, player_cell, template.voxel_height, |cell| {
        enemies.iter().any(|(_, enemy)| enemy.occupies(cell))
    });
    let Some(cell) = cell else {
        log::warn!("No room to spawn {} next to the player", template.name);
        return None;
    };
    let facing = Direction::ALL[rng.usize(..Direction::ALL.len())];
    let handle = enemies.insert(Enemy::new(template, cell, facing, now + cooldown));
    log::debug!("Spawned {} at ({}, {})", template.name, cell.x, cell.y);
    Some(handle)
}

/// Places a prop on the first free neighbour of the player.
pub fn spawn_prop_near_player<L>(
    level: &L,
    player_cell: Point2<i32>,
    template: &'static EnvironmentTemplate,
    props: &mut EntityArena<Prop>,
) -> Option<EntityHandle>
where
    L: LevelMap + ?Sized,
{
    let cell = free_neighbour(level, player_cell, template.voxel_height, |_| false)?;
    Some(props.insert(Prop { template, cell }))
}

/// Scatters `count` props drawn from `templates` over walkable cells.
///
/// Each prop gets [`SCATTER_TRIES`] random cells; with `outside` set, cells inside
/// that window are skipped so props never pop in within view. Returns the number
/// of props placed.
pub fn scatter_environment<L>(
    level: &L,
    templates: &[&'static EnvironmentTemplate],
    count: usize,
    rng: &mut fastrand::Rng,
    outside: Option<&RegionWindow>,
    props: &mut EntityArena<Prop>,
) -> usize
where
    L: LevelMap + ?Sized,
{
    if templates.is_empty() || level.width() <= 0 || level.height() <= 0 {
        return 0;
    }
    let mut placed = 0;
    for _ in 0..count {
        for _ in 0..SCATTER_TRIES {
            let cell = Point2::new(rng.i32(0..level.width()), rng.i32(0..level.height()));
            if level.tile_at(cell.x, cell.y) == Tile::Wall {
                continue;
            }
            if outside.is_some_and(|window| window.contains(cell)) {
                continue;
            }
            let template = templates[rng.usize(..templates.len())];
            if level.has_room_for(cell.x, cell.y, template.voxel_height) {
                props.insert(Prop { template, cell });
                placed += 1;
                break;
            }
        }
    }
    if placed < count {
        log::warn!("Placed {} of {} props", placed, count);
    }
    placed
}

/// Places an enemy on a random walkable cell outside `window`, with bounded tries.
pub fn spawn_enemy_outside<L>(
    level: &L,
    template: &'static EnemyTemplate,
    window: &RegionWindow,
    enemies: &mut EntityArena<Enemy>,
    rng: &mut fastrand::Rng,
    next_move_at: Duration,
) -> Option<EntityHandle>
where
    L: LevelMap + ?Sized,
{
    if level.width() <= 0 || level.height() <= 0 {
        return None;
    }
    for _ in 0..SCATTER_TRIES {
        let cell = Point2::new(rng.i32(0..level.width()), rng.i32(0..level.height()));
        if level.tile_at(cell.x, cell.y) == Tile::Wall
            || window.contains(cell)
            || enemies.iter().any(|(_, enemy)| enemy.occupies(cell))
            || !level.has_room_for(cell.x, cell.y, template.voxel_height)
        {
            continue;
        }
        let facing = Direction::ALL[rng.usize(..Direction::ALL.len())];
        return Some(enemies.insert(Enemy::new(template, cell, facing, next_move_at)));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonConfig;
    use crate::engine_state::generation::dungeon::{DungeonMap, Room, RoomSource};
    use crate::engine_state::generation::templates::{MUSHROOM, SKELETON_WARRIOR, STALACTITE};
    use crate::engine_state::voxels::tile::TileQuery;

    struct OneRoom;

    impl RoomSource for OneRoom {
        fn next_room(&mut self, _width: i32, _height: i32) -> Room {
            Room::new(2, 2, 4, 4)
        }
    }

    fn single_room() -> DungeonMap {
        let config = DungeonConfig {
            width: 10,
            height: 10,
            attempts: 1,
        };
        DungeonMap::generate_with(&config, &mut OneRoom).unwrap()
    }

    #[test]
    fn enemies_spawn_on_the_first_free_neighbour() {
        let level = single_room();
        let mut enemies = EntityArena::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let player = Point2::new(5, 3);

        let first = spawn_enemy_near_player(&level, player, &SKELETON_WARRIOR, &mut enemies, &mut rng, Duration::ZERO, Duration::from_secs(1)).unwrap();
        // (6,3) is outside the room, (4,3) is the next offset
        assert_eq!(enemies.get(first).map(|e| e.grid), Some(Point2::new(4, 3)));
        assert_eq!(enemies.get(first).map(|e| e.next_move_at), Some(Duration::from_secs(1)));

        let second = spawn_enemy_near_player(&level, player, &SKELETON_WARRIOR, &mut enemies, &mut rng, Duration::ZERO, Duration::from_secs(1)).unwrap();
        assert_eq!(enemies.get(second).map(|e| e.grid), Some(Point2::new(5, 4)));
    }

    #[test]
    fn walled_in_players_get_no_company() {
        let level = single_room();
        let mut enemies = EntityArena::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let spawned = spawn_enemy_near_player(&level, Point2::new(8, 8), &SKELETON_WARRIOR, &mut enemies, &mut rng, Duration::ZERO, Duration::ZERO);
        assert_eq!(spawned, None);
        assert!(enemies.is_empty());
    }

    #[test]
    fn scattered_props_land_on_floor_outside_the_window() {
        let level = single_room();
        let mut props = EntityArena::new();
        let mut rng = fastrand::Rng::with_seed(9);
        let window = RegionWindow {
            center: Point2::new(2, 2),
            draw_distance: 1,
        };
        let placed = scatter_environment(&level, &[&STALACTITE, &MUSHROOM], 5, &mut rng, Some(&window), &mut props);
        assert_eq!(placed, props.len());
        for (_, prop) in props.iter() {
            assert!(!level.is_solid(prop.cell.x, prop.cell.y));
            assert!(!window.contains(prop.cell));
        }
    }
}
