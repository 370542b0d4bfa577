use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::BubbleConfig;
use crate::grid::{Cell, GridWorld};
use crate::{PlayerState, PlayerStatus};

/// Pickup kinds dropped by destroyed soft walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    BombUp,
    RangeUp,
    SpeedUp,
    Kick,
    Ghost,
    Shield,
}

impl ItemKind {
    pub const ALL: [ItemKind; 6] = [
        ItemKind::BombUp,
        ItemKind::RangeUp,
        ItemKind::SpeedUp,
        ItemKind::Kick,
        ItemKind::Ghost,
        ItemKind::Shield,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::BombUp => "bomb_up",
            ItemKind::RangeUp => "range_up",
            ItemKind::SpeedUp => "speed_up",
            ItemKind::Kick => "kick",
            ItemKind::Ghost => "ghost",
            ItemKind::Shield => "shield",
        }
    }
}

/// An item lying on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub cell: Cell,
    pub kind: ItemKind,
}

/// Relative drop weights per item kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemWeights {
    pub bomb_up: u32,
    pub range_up: u32,
    pub speed_up: u32,
    pub kick: u32,
    pub ghost: u32,
    pub shield: u32,
}

impl Default for ItemWeights {
    fn default() -> Self {
        Self {
            bomb_up: 25,
            range_up: 25,
            speed_up: 20,
            kick: 10,
            ghost: 10,
            shield: 10,
        }
    }
}

impl ItemWeights {
    pub fn weight(&self, kind: ItemKind) -> u32 {
        match kind {
            ItemKind::BombUp => self.bomb_up,
            ItemKind::RangeUp => self.range_up,
            ItemKind::SpeedUp => self.speed_up,
            ItemKind::Kick => self.kick,
            ItemKind::Ghost => self.ghost,
            ItemKind::Shield => self.shield,
        }
    }

    pub fn total(&self) -> u32 {
        ItemKind::ALL.iter().map(|&k| self.weight(k)).sum()
    }
}

/// Probabilistic item table consulted when a soft wall is destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDropTable {
    /// Chance in `[0, 1]` that a destroyed soft wall drops anything.
    pub drop_chance: f32,
    pub weights: ItemWeights,
}

impl Default for ItemDropTable {
    fn default() -> Self {
        Self {
            drop_chance: 0.3,
            weights: ItemWeights::default(),
        }
    }
}

impl ItemDropTable {
    /// Roll the table once.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ItemKind> {
        let total = self.weights.total();
        if total == 0 || self.drop_chance <= 0.0 {
            return None;
        }
        if rng.random::<f32>() >= self.drop_chance {
            return None;
        }
        let mut pick = rng.random_range(0..total);
        for kind in ItemKind::ALL {
            let w = self.weights.weight(kind);
            if pick < w {
                return Some(kind);
            }
            pick -= w;
        }
        None
    }
}

/// Apply a pickup to a player. Permanent stats are level-scoped; the player
/// record is rebuilt on level transition.
pub fn apply_item(player: &mut PlayerState, kind: ItemKind, config: &BubbleConfig) {
    match kind {
        ItemKind::BombUp => player.max_bombs += 1,
        ItemKind::RangeUp => player.bomb_range += 1,
        ItemKind::SpeedUp => {
            player.move_speed = (player.move_speed + config.speed_increment).min(config.max_move_speed);
        },
        ItemKind::Kick => player.has_kick = true,
        ItemKind::Ghost => player.ghost_timer = config.ghost_duration_secs,
        ItemKind::Shield => player.has_shield = true,
    }
}

/// Hand every item lying under a NORMAL or TRAPPED player to that player.
/// Players are visited in roster order, so the first seat wins a tie.
pub fn collect_items(
    grid: &mut GridWorld,
    players: &mut [PlayerState],
    config: &BubbleConfig,
) -> Vec<(crate::PlayerId, ItemKind)> {
    let mut collected = Vec::new();
    for player in players.iter_mut() {
        if player.status == PlayerStatus::Dead {
            continue;
        }
        let cell = player.cell(config);
        if let Some(kind) = grid.consume_item(cell) {
            apply_item(player, kind, config);
            tracing::debug!(player_id = player.id, ?kind, x = cell.x, y = cell.y, "Item collected");
            collected.push((player.id, kind));
        }
    }
    collected
}
