use bubble_core::game_trait::{GameEvent, PlayerId};

use crate::entities::{EnemyKind, EntityStore};

/// Points for breaking a soft wall, to the bomb owner.
pub const SOFT_WALL_POINTS: i32 = 10;
/// Points for picking up an item.
pub const ITEM_POINTS: i32 = 50;
/// Points for freeing a trapped teammate.
pub const RESCUE_POINTS: i32 = 200;
/// Points to every surviving player when a level is cleared.
pub const LEVEL_CLEAR_POINTS: i32 = 500;

/// Points for defeating an enemy of `kind`.
pub fn enemy_points(kind: EnemyKind) -> i32 {
    kind.points()
}

/// Add `points` to a player's running score and report the new total.
pub fn award(store: &mut EntityStore, player_id: PlayerId, points: i32) -> Option<GameEvent> {
    let player = store.player_mut(player_id)?;
    player.score += points;
    Some(GameEvent::ScoreUpdate {
        player_id,
        score: player.score,
    })
}
