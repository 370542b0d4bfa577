//! Bomb placement, fuses and blast propagation.

use std::collections::VecDeque;

use rand::Rng;

use bubble_core::game_trait::PlayerId;
use bubble_core::input::Direction;

use crate::config::BubbleConfig;
use crate::entities::{BlastId, BlastSource, BombId, EntityStore, PlayerStatus};
use crate::grid::{Cell, GridWorld, Tile};
use crate::items::ItemKind;

/// A soft wall broken by a blast, with the bomb owner to credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallBreak {
    pub owner: PlayerId,
    pub cell: Cell,
    pub dropped: Option<ItemKind>,
}

/// Everything one detonation chain did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainReport {
    pub blast_id: BlastId,
    /// Bombs detonated, root included.
    pub chain_len: u32,
    pub walls: Vec<WallBreak>,
}

/// Place a bomb under `player_id`. Returns `None` without touching state if
/// the player is not NORMAL, is at capacity, or the cell is taken.
pub fn try_place(
    grid: &GridWorld,
    store: &mut EntityStore,
    player_id: PlayerId,
    now: f32,
    config: &BubbleConfig,
) -> Option<BombId> {
    let player = store.player(player_id)?;
    if player.status != PlayerStatus::Normal || player.active_bombs >= player.max_bombs {
        return None;
    }
    let cell = player.cell(config);
    if grid.tile_at(cell) != Tile::Empty {
        return None;
    }
    let range = player.bomb_range;
    let id = store.add_bomb(player_id, cell, now, config.bomb_fuse_secs, range)?;
    if let Some(player) = store.player_mut(player_id) {
        player.active_bombs += 1;
    }
    tracing::debug!(player_id, bomb_id = id, x = cell.x, y = cell.y, range, "Bomb placed");
    Some(id)
}

/// Age explosions and drop the expired ones.
pub fn tick_explosions(store: &mut EntityStore, dt: f32) {
    for explosion in &mut store.explosions {
        explosion.remaining = (explosion.remaining - dt).max(0.0);
    }
    store.explosions.retain(|e| e.remaining > 0.0);
}

/// Burn every fuse and return the bombs due to detonate, in placement order.
pub fn tick_fuses(store: &mut EntityStore, dt: f32) -> Vec<BombId> {
    let mut due = Vec::new();
    for bomb in &mut store.bombs {
        bomb.fuse_remaining = (bomb.fuse_remaining - dt).max(0.0);
        if bomb.fuse_remaining <= 0.0 {
            due.push(bomb.id);
        }
    }
    due
}

/// Detonate `root` and every bomb its blast reaches, within this call.
///
/// The chain shares one blast id so an enemy is hit at most once by it. Each
/// bomb marks its own cell and walks outward up to its range: hard walls stop
/// the blast before them, soft walls are marked and broken and stop it, and a
/// bomb in the path is marked and queued. Returns `None` if `root` is gone
/// (already taken by an earlier chain this tick).
pub fn detonate<R: Rng + ?Sized>(
    grid: &mut GridWorld,
    store: &mut EntityStore,
    root: BombId,
    config: &BubbleConfig,
    rng: &mut R,
) -> Option<ChainReport> {
    store.bombs.iter().find(|b| b.id == root)?;

    let blast_id = store.next_blast_id();
    let lifetime = config.explosion_lifetime_secs;
    let mut report = ChainReport {
        blast_id,
        ..ChainReport::default()
    };
    let mut queue = VecDeque::from([root]);

    while let Some(id) = queue.pop_front() {
        let Some(bomb) = store.remove_bomb(id) else {
            continue;
        };
        report.chain_len += 1;
        if let Some(owner) = store.player_mut(bomb.owner) {
            owner.active_bombs = owner.active_bombs.saturating_sub(1);
        }

        let source = BlastSource::Player(bomb.owner);
        store.mark_explosion(bomb.cell, lifetime, blast_id, source);

        for direction in Direction::ALL {
            for step in 1..=bomb.blast_range as i32 {
                let cell = bomb.cell.offset(direction, step);
                match grid.tile_at(cell) {
                    Tile::WallHard => break,
                    Tile::WallSoft => {
                        store.mark_explosion(cell, lifetime, blast_id, source);
                        let dropped = grid.destroy_soft_wall(cell, &config.items, rng);
                        report.walls.push(WallBreak {
                            owner: bomb.owner,
                            cell,
                            dropped,
                        });
                        break;
                    },
                    Tile::Empty => {
                        store.mark_explosion(cell, lifetime, blast_id, source);
                        if let Some(next) = store.bomb_at(cell) {
                            if !queue.contains(&next.id) {
                                queue.push_back(next.id);
                            }
                            break;
                        }
                    },
                }
            }
        }
    }

    tracing::debug!(
        blast_id,
        chain_len = report.chain_len,
        walls = report.walls.len(),
        "Bomb chain detonated"
    );
    Some(report)
}

/// Enemy-sourced cross of explosion cells around `center`. Stops before any
/// wall or bomb and never breaks walls or sets off bombs.
pub fn hostile_burst(
    grid: &GridWorld,
    store: &mut EntityStore,
    center: Cell,
    range: u32,
    config: &BubbleConfig,
) -> BlastId {
    let blast_id = store.next_blast_id();
    let lifetime = config.explosion_lifetime_secs;
    store.mark_explosion(center, lifetime, blast_id, BlastSource::Enemy);
    for direction in Direction::ALL {
        for step in 1..=range as i32 {
            let cell = center.offset(direction, step);
            if grid.tile_at(cell) != Tile::Empty || store.has_bomb_at(cell) {
                break;
            }
            store.mark_explosion(cell, lifetime, blast_id, BlastSource::Enemy);
        }
    }
    blast_id
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::items::ItemDropTable;
    use crate::test_support::player_at;

    fn no_drop_config() -> BubbleConfig {
        BubbleConfig {
            items: ItemDropTable {
                drop_chance: 0.0,
                ..ItemDropTable::default()
            },
            ..BubbleConfig::default()
        }
    }

    fn setup(cfg: &BubbleConfig) -> (GridWorld, EntityStore) {
        let mut grid = GridWorld::open(9, 9);
        for cell in grid.cells().collect::<Vec<_>>() {
            if cell.x == 0 || cell.y == 0 || cell.x == 8 || cell.y == 8 {
                grid.set_tile(cell, Tile::WallHard);
            }
        }
        let store = EntityStore::with_players(vec![
            player_at(1, Cell::new(2, 2), cfg),
            player_at(2, Cell::new(6, 6), cfg),
        ]);
        (grid, store)
    }

    #[test]
    fn placement_respects_capacity() {
        let cfg = BubbleConfig::default();
        let (grid, mut store) = setup(&cfg);
        assert!(try_place(&grid, &mut store, 1, 0.0, &cfg).is_some());
        assert_eq!(store.players[0].active_bombs, 1);

        // At capacity and same cell: nothing changes.
        let before = store.bombs.len();
        assert!(try_place(&grid, &mut store, 1, 0.1, &cfg).is_none());
        assert_eq!(store.bombs.len(), before);
        assert_eq!(store.players[0].active_bombs, 1);
    }

    #[test]
    fn placement_refuses_occupied_cell() {
        let cfg = BubbleConfig::default();
        let (grid, mut store) = setup(&cfg);
        store.players[0].max_bombs = 3;
        assert!(try_place(&grid, &mut store, 1, 0.0, &cfg).is_some());
        assert!(try_place(&grid, &mut store, 1, 0.0, &cfg).is_none());
        assert_eq!(store.players[0].active_bombs, 1);
    }

    #[test]
    fn trapped_player_cannot_place() {
        let cfg = BubbleConfig::default();
        let (grid, mut store) = setup(&cfg);
        store.players[0].status = PlayerStatus::Trapped;
        assert!(try_place(&grid, &mut store, 1, 0.0, &cfg).is_none());
    }

    #[test]
    fn fuse_counts_down_to_detonation() {
        let cfg = BubbleConfig::default();
        let (grid, mut store) = setup(&cfg);
        let id = try_place(&grid, &mut store, 1, 0.0, &cfg).unwrap();
        assert!(tick_fuses(&mut store, 1.0).is_empty());
        assert_eq!(tick_fuses(&mut store, 1.0), vec![id]);
        assert_eq!(store.bombs[0].fuse_remaining, 0.0);
    }

    #[test]
    fn blast_marks_own_cell_and_stops_at_hard_walls() {
        let cfg = no_drop_config();
        let (mut grid, mut store) = setup(&cfg);
        store.players[0].bomb_range = 5;
        let id = try_place(&grid, &mut store, 1, 0.0, &cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let report = detonate(&mut grid, &mut store, id, &cfg, &mut rng).unwrap();

        assert_eq!(report.chain_len, 1);
        assert!(store.explosion_at(Cell::new(2, 2)).is_some());
        assert!(store.explosion_at(Cell::new(1, 2)).is_some());
        assert!(store.explosion_at(Cell::new(0, 2)).is_none());
        assert!(store.explosion_at(Cell::new(7, 2)).is_some());
        assert!(store.explosion_at(Cell::new(8, 2)).is_none());
        assert!(store.bombs.is_empty());
        assert_eq!(store.players[0].active_bombs, 0);
    }

    #[test]
    fn soft_wall_breaks_and_stops_blast() {
        let cfg = no_drop_config();
        let (mut grid, mut store) = setup(&cfg);
        store.players[0].bomb_range = 3;
        grid.set_tile(Cell::new(3, 2), Tile::WallSoft);
        let id = try_place(&grid, &mut store, 1, 0.0, &cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let report = detonate(&mut grid, &mut store, id, &cfg, &mut rng).unwrap();

        assert_eq!(grid.tile_at(Cell::new(3, 2)), Tile::Empty);
        assert!(store.explosion_at(Cell::new(3, 2)).is_some());
        assert!(store.explosion_at(Cell::new(4, 2)).is_none());
        assert_eq!(report.walls, vec![WallBreak {
            owner: 1,
            cell: Cell::new(3, 2),
            dropped: None,
        }]);
    }

    #[test]
    fn chain_reaction_is_same_call() {
        let cfg = no_drop_config();
        let (mut grid, mut store) = setup(&cfg);
        store.players[0].bomb_range = 2;
        let first = try_place(&grid, &mut store, 1, 0.0, &cfg).unwrap();
        store.add_bomb(2, Cell::new(4, 2), 0.5, cfg.bomb_fuse_secs, 1);
        store.players[1].active_bombs = 1;

        let mut rng = StdRng::seed_from_u64(1);
        let report = detonate(&mut grid, &mut store, first, &cfg, &mut rng).unwrap();
        assert_eq!(report.chain_len, 2);
        assert!(store.bombs.is_empty());
        assert_eq!(store.players[1].active_bombs, 0);
        // Second bomb's own reach.
        assert!(store.explosion_at(Cell::new(5, 2)).is_some());
        assert_eq!(
            store.explosion_at(Cell::new(5, 2)).map(|e| e.source),
            Some(BlastSource::Player(2))
        );
        assert!(store.explosions.iter().all(|e| e.blast_id == report.blast_id));
    }

    #[test]
    fn consumed_root_returns_none() {
        let cfg = no_drop_config();
        let (mut grid, mut store) = setup(&cfg);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(detonate(&mut grid, &mut store, 42, &cfg, &mut rng).is_none());
        assert!(store.explosions.is_empty());
    }

    #[test]
    fn items_survive_blasts() {
        let cfg = no_drop_config();
        let (mut grid, mut store) = setup(&cfg);
        grid.place_item(Cell::new(3, 2), ItemKind::Kick);
        let id = try_place(&grid, &mut store, 1, 0.0, &cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        detonate(&mut grid, &mut store, id, &cfg, &mut rng);
        assert_eq!(grid.item_at(Cell::new(3, 2)), Some(ItemKind::Kick));
    }

    #[test]
    fn explosions_expire() {
        let cfg = no_drop_config();
        let (mut grid, mut store) = setup(&cfg);
        let id = try_place(&grid, &mut store, 1, 0.0, &cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        detonate(&mut grid, &mut store, id, &cfg, &mut rng);
        tick_explosions(&mut store, 0.3);
        assert!(!store.explosions.is_empty());
        tick_explosions(&mut store, 0.31);
        assert!(store.explosions.is_empty());
    }

    #[test]
    fn hostile_burst_spares_walls_and_bombs() {
        let cfg = no_drop_config();
        let (mut grid, mut store) = setup(&cfg);
        grid.set_tile(Cell::new(4, 5), Tile::WallSoft);
        store.add_bomb(1, Cell::new(4, 3), 0.0, 2.0, 1);
        hostile_burst(&grid, &mut store, Cell::new(4, 4), 2, &cfg);

        assert_eq!(grid.tile_at(Cell::new(4, 5)), Tile::WallSoft);
        assert!(store.explosion_at(Cell::new(4, 5)).is_none());
        assert!(store.explosion_at(Cell::new(4, 3)).is_none());
        assert_eq!(store.bombs.len(), 1);
        assert!(store.explosion_at(Cell::new(6, 4)).is_some());
        assert!(store.explosion_at(Cell::new(7, 4)).is_none());
        assert!(store.explosions.iter().all(|e| e.source == BlastSource::Enemy));
    }
}
