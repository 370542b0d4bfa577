use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::BubbleConfig;
use crate::entities::EnemyKind;
use crate::grid::{Cell, GridWorld, Tile};

/// Minimum Manhattan distance between an enemy spawn and either player spawn.
pub const ENEMY_SPAWN_CLEARANCE: u32 = 4;

/// Every Nth level is a boss level.
pub const BOSS_LEVEL_INTERVAL: u32 = 5;

/// Per-level RNG. The same seed and level always generate the same layout.
pub fn level_rng(seed: u64, level: u32) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(u64::from(level).wrapping_mul(0x9E37_79B9_7F4A_7C15)))
}

/// Spawn cells by seat: top-left corner and bottom-right corner.
pub fn spawn_cells(width: u32, height: u32) -> [Cell; 2] {
    [Cell::new(1, 1), Cell::new(width as i32 - 2, height as i32 - 2)]
}

/// Spawn cells plus their inward neighbours. Never walled.
pub fn safe_zone(width: u32, height: u32) -> [Cell; 6] {
    let [a, b] = spawn_cells(width, height);
    [
        a,
        Cell::new(a.x + 1, a.y),
        Cell::new(a.x, a.y + 1),
        b,
        Cell::new(b.x - 1, b.y),
        Cell::new(b.x, b.y - 1),
    ]
}

fn is_pillar(cell: Cell, width: u32, height: u32) -> bool {
    cell.x == 0
        || cell.y == 0
        || cell.x == width as i32 - 1
        || cell.y == height as i32 - 1
        || (cell.x % 2 == 0 && cell.y % 2 == 0)
}

/// Build the tile matrix for `level`: border and pillar hard walls, then a
/// seeded scatter of soft walls whose count follows the level's density.
pub fn generate_grid(config: &BubbleConfig, level: u32, rng: &mut StdRng) -> GridWorld {
    let (width, height) = (config.grid_width, config.grid_height);
    let mut grid = GridWorld::open(width, height);
    let safe = safe_zone(width, height);

    let mut candidates = Vec::new();
    for cell in grid.cells().collect::<Vec<_>>() {
        if is_pillar(cell, width, height) {
            grid.set_tile(cell, Tile::WallHard);
        } else if !safe.contains(&cell) {
            candidates.push(cell);
        }
    }

    let density = config.soft_wall_density(level);
    let soft_count = ((candidates.len() as f32 * density).round() as usize).min(candidates.len());
    candidates.shuffle(rng);
    for &cell in &candidates[..soft_count] {
        grid.set_tile(cell, Tile::WallSoft);
    }

    tracing::debug!(level, width, height, soft_walls = soft_count, density, "Grid generated");
    grid
}

pub fn is_boss_level(level: u32) -> bool {
    level > 0 && level % BOSS_LEVEL_INTERVAL == 0
}

/// Enemy archetypes unlocked by `level`, in unlock order.
pub fn unlocked_kinds(level: u32) -> Vec<EnemyKind> {
    let mut kinds = vec![EnemyKind::Balloon];
    if level >= 2 {
        kinds.push(EnemyKind::Ghost);
    }
    if level >= 3 {
        kinds.push(EnemyKind::Minion);
    }
    if level >= 4 {
        kinds.push(EnemyKind::Frog);
    }
    if level >= 6 {
        kinds.push(EnemyKind::Tank);
    }
    kinds
}

/// Enemies to place on a PvE level.
pub fn enemy_roster(config: &BubbleConfig, level: u32) -> Vec<EnemyKind> {
    if is_boss_level(level) {
        let tier = level / BOSS_LEVEL_INTERVAL;
        let boss = if tier % 2 == 1 {
            EnemyKind::BossSlime
        } else {
            EnemyKind::BossMecha
        };
        let mut roster = vec![boss];
        roster.extend(std::iter::repeat_n(EnemyKind::Minion, tier as usize));
        return roster;
    }

    let count = config
        .enemy_base_count
        .saturating_add(config.enemy_count_step.saturating_mul(level.saturating_sub(1)))
        .min(config.max_enemies) as usize;
    let kinds = unlocked_kinds(level);
    (0..count).map(|i| kinds[i % kinds.len()]).collect()
}

/// Choose `count` distinct spawn cells for enemies, away from both players.
///
/// Prefers open floor. If the layout is too crowded, soft walls in the
/// eligible area are cleared to make room. May return fewer cells than asked
/// only when the grid has no eligible cells left at all.
pub fn pick_enemy_spawns(grid: &mut GridWorld, count: usize, rng: &mut StdRng) -> Vec<Cell> {
    let spawns = spawn_cells(grid.width(), grid.height());
    let eligible = |cell: &Cell| spawns.iter().all(|s| s.manhattan(*cell) >= ENEMY_SPAWN_CLEARANCE);

    let mut open: Vec<Cell> = grid
        .cells()
        .filter(|c| grid.tile_at(*c) == Tile::Empty && eligible(c))
        .collect();
    open.shuffle(rng);

    if open.len() < count {
        let mut soft: Vec<Cell> = grid
            .cells()
            .filter(|c| grid.tile_at(*c) == Tile::WallSoft && eligible(c))
            .collect();
        soft.shuffle(rng);
        for cell in soft.into_iter().take(count - open.len()) {
            grid.set_tile(cell, Tile::Empty);
            open.push(cell);
        }
        tracing::debug!(requested = count, available = open.len(), "Cleared soft walls for enemy spawns");
    }

    open.truncate(count);
    open
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> BubbleConfig {
        BubbleConfig::default()
    }

    #[test]
    fn deterministic_generation() {
        let a = generate_grid(&cfg(), 3, &mut level_rng(7, 3));
        let b = generate_grid(&cfg(), 3, &mut level_rng(7, 3));
        let tiles_a: Vec<Tile> = a.cells().map(|c| a.tile_at(c)).collect();
        let tiles_b: Vec<Tile> = b.cells().map(|c| b.tile_at(c)).collect();
        assert_eq!(tiles_a, tiles_b);
    }

    #[test]
    fn different_seeds_different_layouts() {
        let a = generate_grid(&cfg(), 1, &mut level_rng(1, 1));
        let b = generate_grid(&cfg(), 1, &mut level_rng(2, 1));
        let differs = a.cells().any(|c| a.tile_at(c) != b.tile_at(c));
        assert!(differs);
    }

    #[test]
    fn border_and_pillars_are_hard() {
        let c = cfg();
        let grid = generate_grid(&c, 1, &mut level_rng(0, 1));
        for cell in grid.cells() {
            let expected_hard = is_pillar(cell, c.grid_width, c.grid_height);
            assert_eq!(grid.tile_at(cell) == Tile::WallHard, expected_hard, "{cell:?}");
        }
    }

    #[test]
    fn safe_zones_stay_open() {
        let c = cfg();
        for level in 1..=10 {
            let grid = generate_grid(&c, level, &mut level_rng(99, level));
            for cell in safe_zone(c.grid_width, c.grid_height) {
                assert_eq!(grid.tile_at(cell), Tile::Empty, "level {level} {cell:?}");
            }
        }
    }

    #[test]
    fn soft_wall_count_tracks_density() {
        let c = cfg();
        // 15x13: 113 non-hard cells, 6 reserved.
        let candidates = 107.0_f32;
        for level in [1, 2, 5, 9, 20] {
            let grid = generate_grid(&c, level, &mut level_rng(5, level));
            let expected = (candidates * c.soft_wall_density(level)).round() as usize;
            assert_eq!(grid.count_tiles(Tile::WallSoft), expected, "level {level}");
        }
    }

    #[test]
    fn soft_walls_increase_with_level() {
        let c = cfg();
        let l1 = generate_grid(&c, 1, &mut level_rng(5, 1)).count_tiles(Tile::WallSoft);
        let l2 = generate_grid(&c, 2, &mut level_rng(5, 2)).count_tiles(Tile::WallSoft);
        assert!(l2 > l1);
    }

    #[test]
    fn roster_unlocks_archetypes() {
        let c = cfg();
        assert_eq!(enemy_roster(&c, 1), vec![EnemyKind::Balloon; 3]);
        assert_eq!(
            enemy_roster(&c, 2),
            vec![EnemyKind::Balloon, EnemyKind::Ghost, EnemyKind::Balloon, EnemyKind::Ghost]
        );
        assert!(enemy_roster(&c, 6).contains(&EnemyKind::Tank));
        assert!(!enemy_roster(&c, 4).contains(&EnemyKind::Tank));
        assert_eq!(enemy_roster(&c, 9).len(), c.max_enemies as usize);
    }

    #[test]
    fn boss_levels_alternate() {
        let c = cfg();
        let l5 = enemy_roster(&c, 5);
        assert_eq!(l5[0], EnemyKind::BossSlime);
        assert_eq!(l5.len(), 2);
        let l10 = enemy_roster(&c, 10);
        assert_eq!(l10[0], EnemyKind::BossMecha);
        assert_eq!(&l10[1..], &[EnemyKind::Minion, EnemyKind::Minion]);
    }

    #[test]
    fn enemy_spawns_keep_clearance() {
        let c = cfg();
        let mut rng = level_rng(3, 4);
        let mut grid = generate_grid(&c, 4, &mut rng);
        let cells = pick_enemy_spawns(&mut grid, 6, &mut rng);
        assert_eq!(cells.len(), 6);
        let spawns = spawn_cells(c.grid_width, c.grid_height);
        for cell in &cells {
            assert_eq!(grid.tile_at(*cell), Tile::Empty);
            assert!(spawns.iter().all(|s| s.manhattan(*cell) >= ENEMY_SPAWN_CLEARANCE));
        }
        let mut dedup = cells.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), cells.len());
    }

    #[test]
    fn crowded_layout_clears_room_for_enemies() {
        let c = BubbleConfig {
            soft_wall_density_base: 1.0,
            soft_wall_density_max: 1.0,
            ..BubbleConfig::default()
        };
        let mut rng = level_rng(3, 1);
        let mut grid = generate_grid(&c, 1, &mut rng);
        let cells = pick_enemy_spawns(&mut grid, 3, &mut rng);
        assert_eq!(cells.len(), 3);
        for cell in cells {
            assert_eq!(grid.tile_at(cell), Tile::Empty);
        }
    }
}
