//! Pixel-space movement and collision.
//!
//! Players move continuously and resolve against tiles, bombs and each other
//! one substep at a time. Enemies travel cell to cell and only change heading
//! on grid points. Kicked bombs slide whole cells.

use serde::{Deserialize, Serialize};

use bubble_core::game_trait::PlayerId;
use bubble_core::input::Direction;

use crate::config::BubbleConfig;
use crate::entities::{EnemyState, EntityStore, PlayerState, PlayerStatus};
use crate::grid::{Cell, GridWorld, Tile};

/// Largest distance (pixels) a player covers in one collision substep.
pub const MAX_SUBSTEP: f32 = 1.0;

/// Axis-aligned box in pixel space. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Shrink by `amount` on every side.
    pub fn inset(self, amount: f32) -> Self {
        let amount = amount.min(self.w / 2.0).min(self.h / 2.0);
        Self {
            x: self.x + amount,
            y: self.y + amount,
            w: self.w - amount * 2.0,
            h: self.h - amount * 2.0,
        }
    }

    /// Strict overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn center_cell(&self, tile_size: f32) -> Cell {
        let (cx, cy) = self.center();
        Cell::containing(cx, cy, tile_size)
    }

    /// Every cell the box overlaps (at most four for boxes smaller than a tile).
    pub fn cells(&self, tile_size: f32) -> Vec<Cell> {
        let x0 = (self.x / tile_size).floor() as i32;
        let y0 = (self.y / tile_size).floor() as i32;
        let x1 = ((self.x + self.w) / tile_size).ceil() as i32 - 1;
        let y1 = ((self.y + self.h) / tile_size).ceil() as i32 - 1;
        let mut cells = Vec::with_capacity(4);
        for y in y0..=y1 {
            for x in x0..=x1 {
                cells.push(Cell::new(x, y));
            }
        }
        cells
    }

    pub fn overlaps_cell(&self, cell: Cell, tile_size: f32) -> bool {
        let tile = Aabb::new(
            cell.x as f32 * tile_size,
            cell.y as f32 * tile_size,
            tile_size,
            tile_size,
        );
        self.overlaps(&tile)
    }
}

/// What stopped a substep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Obstruction {
    Tile,
    Bomb(Cell),
    Player,
}

/// Read-only view of everything that can block a player this tick.
struct PlayerView<'a> {
    grid: &'a GridWorld,
    bomb_cells: Vec<Cell>,
    blockers: Vec<Aabb>,
    config: &'a BubbleConfig,
}

impl PlayerView<'_> {
    fn obstruction(&self, current: &Aabb, candidate: &Aabb, pass_soft: bool) -> Option<Obstruction> {
        let tile = self.config.tile_size;
        let (max_x, max_y) = self.grid.pixel_size(tile);
        if candidate.x < 0.0 || candidate.y < 0.0 || candidate.x + candidate.w > max_x || candidate.y + candidate.h > max_y {
            return Some(Obstruction::Tile);
        }

        for cell in candidate.cells(tile) {
            match self.grid.tile_at(cell) {
                Tile::Empty => {},
                Tile::WallSoft if pass_soft || current.overlaps_cell(cell, tile) => {},
                Tile::WallSoft | Tile::WallHard => return Some(Obstruction::Tile),
            }
            if self.bomb_cells.contains(&cell) && !current.overlaps_cell(cell, tile) {
                return Some(Obstruction::Bomb(cell));
            }
        }

        if self.blockers.iter().any(|b| candidate.overlaps(b) && !current.overlaps(b)) {
            return Some(Obstruction::Player);
        }
        None
    }

    /// Whether the lane one cell ahead of `cell` is open for a corner nudge.
    fn lane_open(&self, cell: Cell, pass_soft: bool) -> bool {
        self.grid.is_walkable(cell, pass_soft) && !self.bomb_cells.contains(&cell)
    }
}

/// Result of resolving one player's movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerMove {
    pub x: f32,
    pub y: f32,
    /// A bomb the player walked into head-on.
    pub pushed_bomb: Option<Cell>,
}

fn resolve_player(player: &PlayerState, direction: Direction, dt: f32, view: &PlayerView<'_>) -> PlayerMove {
    let config = view.config;
    let distance = player.move_speed * dt;
    let substeps = (distance / MAX_SUBSTEP).ceil().max(1.0) as u32;
    let step = distance / substeps as f32;
    let (dx, dy) = direction.delta();
    let pass_soft = player.is_ghost();

    let mut pos = player.hitbox(config);
    let mut pushed_bomb = None;

    for _ in 0..substeps {
        let candidate = pos.translated(dx as f32 * step, dy as f32 * step);
        let obstruction = match view.obstruction(&pos, &candidate, pass_soft) {
            None => {
                pos = candidate;
                continue;
            },
            Some(o) => o,
        };
        if obstruction == Obstruction::Player {
            break;
        }

        // Slide toward the centre of the current lane when the cell ahead is open.
        let cell = pos.center_cell(config.tile_size);
        let ahead = cell.offset(direction, 1);
        if view.lane_open(ahead, pass_soft) {
            let lane_x = cell.x as f32 * config.tile_size + config.entity_offset();
            let lane_y = cell.y as f32 * config.tile_size + config.entity_offset();
            let (nx, ny) = if direction.is_horizontal() {
                (0.0, (lane_y - pos.y).clamp(-step, step))
            } else {
                ((lane_x - pos.x).clamp(-step, step), 0.0)
            };
            if nx != 0.0 || ny != 0.0 {
                let nudged = pos.translated(nx, ny);
                if view.obstruction(&pos, &nudged, pass_soft).is_none() {
                    pos = nudged;
                    continue;
                }
            }
        }

        if let Obstruction::Bomb(bomb_cell) = obstruction
            && bomb_cell == ahead
        {
            pushed_bomb = Some(bomb_cell);
        }
        let flush = flush_against(pos, direction, config.tile_size);
        if flush != pos && view.obstruction(&pos, &flush, pass_soft).is_none() {
            pos = flush;
        }
        break;
    }

    PlayerMove {
        x: pos.x,
        y: pos.y,
        pushed_bomb,
    }
}

/// Push `pos` up to the next tile boundary in `direction`.
fn flush_against(pos: Aabb, direction: Direction, tile: f32) -> Aabb {
    match direction {
        Direction::Left => Aabb {
            x: (pos.x / tile).floor() * tile,
            ..pos
        },
        Direction::Right => Aabb {
            x: ((pos.x + pos.w) / tile).ceil() * tile - pos.w,
            ..pos
        },
        Direction::Up => Aabb {
            y: (pos.y / tile).floor() * tile,
            ..pos
        },
        Direction::Down => Aabb {
            y: ((pos.y + pos.h) / tile).ceil() * tile - pos.h,
            ..pos
        },
    }
}

/// Move every player with a movement intent, in the order given.
///
/// Only NORMAL players move. A KICK holder walking into a resting bomb sets it
/// sliding.
pub fn move_players(
    grid: &GridWorld,
    store: &mut EntityStore,
    moves: &[(PlayerId, Direction)],
    config: &BubbleConfig,
    dt: f32,
) {
    for &(id, direction) in moves {
        let Some(idx) = store.players.iter().position(|p| p.id == id) else {
            continue;
        };
        let mover = &store.players[idx];
        if mover.status != PlayerStatus::Normal {
            continue;
        }

        let blockers = if mover.is_ghost() {
            Vec::new()
        } else {
            store
                .players
                .iter()
                .filter(|p| p.id != id && p.status == PlayerStatus::Normal && !p.is_ghost())
                .map(|p| p.hitbox(config))
                .collect()
        };
        let view = PlayerView {
            grid,
            bomb_cells: store.bombs.iter().map(|b| b.cell).collect(),
            blockers,
            config,
        };
        let result = resolve_player(mover, direction, dt, &view);
        let has_kick = mover.has_kick;

        let player = &mut store.players[idx];
        player.x = result.x;
        player.y = result.y;
        player.direction = direction;

        if has_kick
            && let Some(cell) = result.pushed_bomb
            && let Some(bomb) = store.bombs.iter_mut().find(|b| b.cell == cell)
            && bomb.sliding.is_none()
        {
            bomb.sliding = Some(direction);
            bomb.slide_progress = 0.0;
            tracing::debug!(player_id = id, bomb_id = bomb.id, ?direction, "Bomb kicked");
        }
    }
}

/// Top-left pixel position of an entity resting on `cell`.
pub fn rest_position(cell: Cell, config: &BubbleConfig) -> (f32, f32) {
    let offset = config.entity_offset();
    (
        cell.x as f32 * config.tile_size + offset,
        cell.y as f32 * config.tile_size + offset,
    )
}

/// Whether an enemy sits exactly on a grid point.
pub fn at_rest(enemy: &EnemyState, config: &BubbleConfig) -> bool {
    let (rx, ry) = rest_position(enemy.cell(config), config);
    enemy.x == rx && enemy.y == ry
}

/// Whether an enemy may step into `cell`.
pub fn enemy_can_enter(
    grid: &GridWorld,
    store: &EntityStore,
    enemy: &EnemyState,
    cell: Cell,
    config: &BubbleConfig,
) -> bool {
    if !grid.is_walkable(cell, enemy.kind.passes_soft_walls()) {
        return false;
    }
    !store.has_bomb_at(cell) || enemy.hitbox(config).overlaps_cell(cell, config.tile_size)
}

/// Advance one enemy along its heading toward the next grid point.
///
/// At a grid point the cell ahead must be enterable, otherwise the enemy
/// flags itself blocked and waits for the AI. Between grid points a newly
/// blocked target makes it turn back. Leftover travel past a grid point is
/// dropped so the AI decides on every point.
pub fn move_enemy(grid: &GridWorld, store: &mut EntityStore, idx: usize, config: &BubbleConfig, dt: f32) {
    let enemy = &store.enemies[idx];
    let Some(heading) = enemy.ai.heading else {
        return;
    };
    let tile = config.tile_size;
    let offset = config.entity_offset();
    let (dx, dy) = heading.delta();

    // Next grid point strictly ahead along the heading.
    let grid_index = |p: f32, d: i32| -> i32 {
        let t = (p - offset) / tile;
        match d.cmp(&0) {
            std::cmp::Ordering::Greater => t.floor() as i32 + 1,
            std::cmp::Ordering::Less => t.ceil() as i32 - 1,
            std::cmp::Ordering::Equal => t.round() as i32,
        }
    };
    let target = Cell::new(grid_index(enemy.x, dx), grid_index(enemy.y, dy));
    let resting = at_rest(enemy, config);

    if !enemy_can_enter(grid, store, enemy, target, config) {
        let enemy = &mut store.enemies[idx];
        if resting {
            enemy.ai.blocked = true;
        } else {
            enemy.ai.heading = Some(heading.opposite());
            enemy.ai.blocked = false;
        }
        return;
    }

    let enemy = &mut store.enemies[idx];
    enemy.ai.blocked = false;
    let (tx, ty) = rest_position(target, config);
    let budget = enemy.kind.speed() * dt;
    enemy.x = approach(enemy.x, tx, budget);
    enemy.y = approach(enemy.y, ty, budget);
}

fn approach(from: f32, to: f32, budget: f32) -> f32 {
    let delta = to - from;
    if delta.abs() <= budget { to } else { from + budget * delta.signum() }
}

/// Advance every sliding bomb by whole cells. A bomb stops in front of a
/// non-empty tile, another bomb, or a living player or enemy.
pub fn slide_bombs(grid: &GridWorld, store: &mut EntityStore, config: &BubbleConfig, dt: f32) {
    let tile = config.tile_size;
    let bodies: Vec<_> = store
        .players
        .iter()
        .filter(|p| p.is_alive())
        .map(|p| p.hitbox(config))
        .chain(store.enemies.iter().map(|e| e.hitbox(config)))
        .collect();

    for i in 0..store.bombs.len() {
        let Some(direction) = store.bombs[i].sliding else {
            continue;
        };
        store.bombs[i].slide_progress += config.kick_speed_cells * dt;
        while store.bombs[i].slide_progress >= 1.0 {
            let next = store.bombs[i].cell.offset(direction, 1);
            let blocked = grid.tile_at(next) != Tile::Empty
                || store.bombs.iter().any(|b| b.cell == next)
                || bodies.iter().any(|b| b.overlaps_cell(next, tile));
            let bomb = &mut store.bombs[i];
            if blocked {
                bomb.sliding = None;
                bomb.slide_progress = 0.0;
                tracing::debug!(bomb_id = bomb.id, x = bomb.cell.x, y = bomb.cell.y, "Bomb stopped");
                break;
            }
            bomb.cell = next;
            bomb.slide_progress -= 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EnemyKind;
    use crate::test_support::player_at;

    const DT: f32 = 1.0 / 60.0;

    fn open_grid() -> GridWorld {
        GridWorld::open(9, 9)
    }

    fn walled_grid() -> GridWorld {
        let mut grid = GridWorld::open(9, 9);
        for cell in grid.cells().collect::<Vec<_>>() {
            if cell.x == 0 || cell.y == 0 || cell.x == 8 || cell.y == 8 {
                grid.set_tile(cell, Tile::WallHard);
            }
        }
        grid
    }

    fn store_with(players: Vec<PlayerState>) -> EntityStore {
        EntityStore::with_players(players)
    }

    #[test]
    fn aabb_cells_exclude_touching_edges() {
        let tile = 48.0;
        let resting = Aabb::new(6.0, 6.0, 36.0, 36.0);
        assert_eq!(resting.cells(tile), vec![Cell::new(0, 0)]);
        let straddling = Aabb::new(30.0, 6.0, 36.0, 36.0);
        assert_eq!(straddling.cells(tile), vec![Cell::new(0, 0), Cell::new(1, 0)]);
        let flush = Aabb::new(12.0, 12.0, 36.0, 36.0);
        assert_eq!(flush.cells(tile), vec![Cell::new(0, 0)]);
    }

    #[test]
    fn inset_shrinks_every_side() {
        let b = Aabb::new(10.0, 10.0, 36.0, 36.0).inset(6.0);
        assert_eq!(b, Aabb::new(16.0, 16.0, 24.0, 24.0));
        assert!(!Aabb::new(0.0, 0.0, 10.0, 10.0).overlaps(&Aabb::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn player_moves_at_speed() {
        let cfg = BubbleConfig::default();
        let grid = open_grid();
        let mut store = store_with(vec![player_at(1, Cell::new(2, 2), &cfg)]);
        let x0 = store.players[0].x;
        move_players(&grid, &mut store, &[(1, Direction::Right)], &cfg, DT);
        let moved = store.players[0].x - x0;
        assert!((moved - cfg.base_move_speed * DT).abs() < 1e-3);
        assert_eq!(store.players[0].direction, Direction::Right);
    }

    #[test]
    fn hard_wall_stops_player_flush() {
        let cfg = BubbleConfig::default();
        let grid = walled_grid();
        let mut store = store_with(vec![player_at(1, Cell::new(1, 1), &cfg)]);
        for _ in 0..60 {
            move_players(&grid, &mut store, &[(1, Direction::Left)], &cfg, DT);
        }
        let p = &store.players[0];
        assert!((p.x - cfg.tile_size).abs() < 1e-3, "x = {}", p.x);
        assert_eq!(p.cell(&cfg), Cell::new(1, 1));
    }

    #[test]
    fn ghost_passes_soft_but_not_hard() {
        let cfg = BubbleConfig::default();
        let mut grid = walled_grid();
        grid.set_tile(Cell::new(2, 1), Tile::WallSoft);
        let mut store = store_with(vec![player_at(1, Cell::new(1, 1), &cfg)]);
        store.players[0].ghost_timer = 5.0;
        for _ in 0..12 {
            move_players(&grid, &mut store, &[(1, Direction::Right)], &cfg, DT);
        }
        assert_eq!(store.players[0].cell(&cfg), Cell::new(2, 1));

        // Ghost expires inside the wall; walking out is still allowed.
        store.players[0].ghost_timer = 0.0;
        let before = store.players[0].x;
        move_players(&grid, &mut store, &[(1, Direction::Right)], &cfg, DT);
        assert!(store.players[0].x > before);
    }

    #[test]
    fn vertical_move_keeps_column() {
        let cfg = BubbleConfig::default();
        let grid = walled_grid();
        let mut store = store_with(vec![player_at(1, Cell::new(1, 1), &cfg)]);
        let y0 = store.players[0].y;
        move_players(&grid, &mut store, &[(1, Direction::Up)], &cfg, DT);
        assert!(store.players[0].y < y0);
        assert_eq!(store.players[0].x, cfg.tile_size + cfg.entity_offset());
    }

    #[test]
    fn corner_nudge_slides_into_lane() {
        let cfg = BubbleConfig::default();
        let mut grid = walled_grid();
        grid.set_tile(Cell::new(3, 2), Tile::WallHard);
        let mut store = store_with(vec![player_at(1, Cell::new(2, 2), &cfg)]);
        // Off-centre downward so the hitbox clips the pillar at (3,2)'s row
        // while the cell ahead of the centre cell (3,3) is open.
        store.players[0].y += 30.0;
        assert_eq!(store.players[0].cell(&cfg), Cell::new(2, 3));
        let y0 = store.players[0].y;
        for _ in 0..10 {
            move_players(&grid, &mut store, &[(1, Direction::Right)], &cfg, DT);
        }
        let p = &store.players[0];
        assert!(p.y > y0, "nudged toward lane centre");
    }

    #[test]
    fn player_can_walk_off_own_bomb_but_not_back_on() {
        let cfg = BubbleConfig::default();
        let grid = open_grid();
        let mut store = store_with(vec![player_at(1, Cell::new(2, 2), &cfg)]);
        store.add_bomb(1, Cell::new(2, 2), 0.0, 2.0, 1);
        for _ in 0..20 {
            move_players(&grid, &mut store, &[(1, Direction::Right)], &cfg, DT);
        }
        assert_eq!(store.players[0].cell(&cfg), Cell::new(3, 2));
        for _ in 0..40 {
            move_players(&grid, &mut store, &[(1, Direction::Left)], &cfg, DT);
        }
        let p = &store.players[0];
        assert!(!p.hitbox(&cfg).overlaps_cell(Cell::new(2, 2), cfg.tile_size));
    }

    #[test]
    fn kick_sets_bomb_sliding() {
        let cfg = BubbleConfig::default();
        let grid = walled_grid();
        let mut store = store_with(vec![player_at(1, Cell::new(1, 1), &cfg)]);
        store.players[0].has_kick = true;
        store.add_bomb(2, Cell::new(3, 1), 0.0, 2.0, 1);
        for _ in 0..30 {
            move_players(&grid, &mut store, &[(1, Direction::Right)], &cfg, DT);
        }
        assert_eq!(store.bombs[0].sliding, Some(Direction::Right));

        for _ in 0..120 {
            slide_bombs(&grid, &mut store, &cfg, DT);
        }
        assert_eq!(store.bombs[0].cell, Cell::new(7, 1));
        assert_eq!(store.bombs[0].sliding, None);
    }

    #[test]
    fn bomb_without_kick_is_solid() {
        let cfg = BubbleConfig::default();
        let grid = walled_grid();
        let mut store = store_with(vec![player_at(1, Cell::new(1, 1), &cfg)]);
        store.add_bomb(2, Cell::new(3, 1), 0.0, 2.0, 1);
        for _ in 0..60 {
            move_players(&grid, &mut store, &[(1, Direction::Right)], &cfg, DT);
        }
        assert_eq!(store.bombs[0].sliding, None);
        assert!(!store.players[0].hitbox(&cfg).overlaps_cell(Cell::new(3, 1), cfg.tile_size));
    }

    #[test]
    fn sliding_bomb_stops_before_enemy() {
        let cfg = BubbleConfig::default();
        let grid = walled_grid();
        let mut store = EntityStore::default();
        store.add_bomb(1, Cell::new(1, 1), 0.0, 2.0, 1);
        store.bombs[0].sliding = Some(Direction::Right);
        store.spawn_enemy(EnemyKind::Balloon, Cell::new(4, 1), &cfg);
        for _ in 0..60 {
            slide_bombs(&grid, &mut store, &cfg, DT);
        }
        assert_eq!(store.bombs[0].cell, Cell::new(3, 1));
        assert_eq!(store.bombs[0].sliding, None);
    }

    #[test]
    fn sliding_bomb_stops_before_player() {
        let cfg = BubbleConfig::default();
        let grid = walled_grid();
        let mut store = store_with(vec![player_at(2, Cell::new(5, 1), &cfg)]);
        store.add_bomb(1, Cell::new(1, 1), 0.0, 2.0, 1);
        store.bombs[0].sliding = Some(Direction::Right);
        for _ in 0..60 {
            slide_bombs(&grid, &mut store, &cfg, DT);
        }
        assert_eq!(store.bombs[0].cell, Cell::new(4, 1));
        assert_eq!(store.bombs[0].sliding, None);

        // A dead player is no obstacle.
        store.players[0].status = crate::PlayerStatus::Dead;
        store.bombs[0].sliding = Some(Direction::Right);
        for _ in 0..60 {
            slide_bombs(&grid, &mut store, &cfg, DT);
        }
        assert_eq!(store.bombs[0].cell, Cell::new(7, 1));
    }

    #[test]
    fn normal_players_block_each_other() {
        let cfg = BubbleConfig::default();
        let grid = open_grid();
        let mut store = store_with(vec![
            player_at(1, Cell::new(2, 2), &cfg),
            player_at(2, Cell::new(3, 2), &cfg),
        ]);
        for _ in 0..60 {
            move_players(&grid, &mut store, &[(1, Direction::Right)], &cfg, DT);
        }
        assert!(!store.players[0].hitbox(&cfg).overlaps(&store.players[1].hitbox(&cfg)));

        store.players[0].ghost_timer = 3.0;
        for _ in 0..20 {
            move_players(&grid, &mut store, &[(1, Direction::Right)], &cfg, DT);
        }
        assert!(store.players[0].hitbox(&cfg).overlaps(&store.players[1].hitbox(&cfg)));
    }

    #[test]
    fn trapped_player_does_not_move() {
        let cfg = BubbleConfig::default();
        let grid = open_grid();
        let mut store = store_with(vec![player_at(1, Cell::new(2, 2), &cfg)]);
        store.players[0].status = PlayerStatus::Trapped;
        let x0 = store.players[0].x;
        move_players(&grid, &mut store, &[(1, Direction::Right)], &cfg, DT);
        assert_eq!(store.players[0].x, x0);
    }

    #[test]
    fn enemy_reaches_next_grid_point_and_stops_there() {
        let cfg = BubbleConfig::default();
        let grid = walled_grid();
        let mut store = EntityStore::default();
        store.spawn_enemy(EnemyKind::Balloon, Cell::new(1, 1), &cfg);
        store.enemies[0].ai.heading = Some(Direction::Right);
        // 48 px at 60 px/s: 0.8 s. Run a full second.
        for _ in 0..60 {
            move_enemy(&grid, &mut store, 0, &cfg, DT);
            if at_rest(&store.enemies[0], &cfg) && store.enemies[0].cell(&cfg) == Cell::new(2, 1) {
                break;
            }
        }
        let e = &store.enemies[0];
        assert_eq!(e.cell(&cfg), Cell::new(2, 1));
        assert!(at_rest(e, &cfg));
    }

    #[test]
    fn resting_enemy_facing_wall_is_blocked() {
        let cfg = BubbleConfig::default();
        let grid = walled_grid();
        let mut store = EntityStore::default();
        store.spawn_enemy(EnemyKind::Balloon, Cell::new(1, 1), &cfg);
        store.enemies[0].ai.heading = Some(Direction::Up);
        let before = (store.enemies[0].x, store.enemies[0].y);
        move_enemy(&grid, &mut store, 0, &cfg, DT);
        assert!(store.enemies[0].ai.blocked);
        assert_eq!((store.enemies[0].x, store.enemies[0].y), before);
    }

    #[test]
    fn enemies_treat_bombs_as_walls() {
        let cfg = BubbleConfig::default();
        let grid = open_grid();
        let mut store = EntityStore::default();
        store.spawn_enemy(EnemyKind::Ghost, Cell::new(2, 2), &cfg);
        store.add_bomb(1, Cell::new(3, 2), 0.0, 2.0, 1);
        store.enemies[0].ai.heading = Some(Direction::Right);
        move_enemy(&grid, &mut store, 0, &cfg, DT);
        assert!(store.enemies[0].ai.blocked);
    }

    #[test]
    fn enemy_turns_back_when_target_is_bombed_mid_step() {
        let cfg = BubbleConfig::default();
        let grid = open_grid();
        let mut store = EntityStore::default();
        store.spawn_enemy(EnemyKind::Balloon, Cell::new(2, 2), &cfg);
        store.enemies[0].ai.heading = Some(Direction::Right);
        move_enemy(&grid, &mut store, 0, &cfg, DT);
        assert!(!at_rest(&store.enemies[0], &cfg));
        store.add_bomb(1, Cell::new(3, 2), 0.0, 2.0, 1);
        move_enemy(&grid, &mut store, 0, &cfg, DT);
        assert_eq!(store.enemies[0].ai.heading, Some(Direction::Left));
    }
}
