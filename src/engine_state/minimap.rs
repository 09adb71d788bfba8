//! Text rendering of a level's tile grid, for debugging and the headless demo.

use cgmath::Point2;

use crate::engine_state::voxels::tile::TileQuery;

/// Glyph drawn for the player.
pub const PLAYER_GLYPH: char = '@';
/// Glyph drawn for an enemy.
pub const ENEMY_GLYPH: char = 'E';

/// Renders the `width` by `height` tile grid, one line per row, with the player and
/// enemies drawn over the tiles. The player wins when both share a cell.
pub fn render_ascii<T>(tiles: &T, width: i32, height: i32, player: Point2<i32>, enemies: &[Point2<i32>]) -> String
where
    T: TileQuery + ?Sized,
{
    let mut out = String::with_capacity(((width.max(0) + 1) * height.max(0)) as usize);
    for y in 0..height {
        for x in 0..width {
            let cell = Point2::new(x, y);
            let glyph = if cell == player {
                PLAYER_GLYPH
            } else if enemies.contains(&cell) {
                ENEMY_GLYPH
            } else {
                tiles.tile_at(x, y).as_char()
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
