//! Enemy decision making.
//!
//! Every archetype has its own decision function; [`decide`] is the single
//! dispatch point. Decisions are only taken when an enemy rests on a grid
//! point, otherwise it keeps its heading.

use rand::Rng;
use rand::seq::IndexedRandom;

use bubble_core::input::Direction;

use crate::config::BubbleConfig;
use crate::entities::{EnemyKind, EnemyState, EntityStore};
use crate::grid::{Cell, GridWorld, Tile};
use crate::movement::{at_rest, enemy_can_enter};

/// Chance a wandering enemy picks a new heading at a grid point even when it
/// could keep going.
pub const WANDER_REROLL_CHANCE: f64 = 0.25;

/// Boss attack requested this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    /// Spawn a minion on the given free cell.
    SpawnMinion(Cell),
    /// Hostile cross burst centred on the given cell.
    Burst(Cell),
}

/// Output of one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnemyIntent {
    pub heading: Option<Direction>,
    pub special: Option<Special>,
}

/// Everything an enemy may look at when deciding.
pub struct WorldView<'a> {
    pub grid: &'a GridWorld,
    pub store: &'a EntityStore,
    pub config: &'a BubbleConfig,
}

impl WorldView<'_> {
    fn open_directions(&self, enemy: &EnemyState) -> Vec<Direction> {
        let cell = enemy.cell(self.config);
        Direction::ALL
            .into_iter()
            .filter(|&d| enemy_can_enter(self.grid, self.store, enemy, cell.offset(d, 1), self.config))
            .collect()
    }

    /// Cell of the closest living player, by Manhattan distance.
    fn nearest_player(&self, from: Cell) -> Option<Cell> {
        self.store
            .living_players()
            .map(|p| p.cell(self.config))
            .min_by_key(|c| c.manhattan(from))
    }

    fn cell_free(&self, cell: Cell) -> bool {
        self.grid.tile_at(cell) == Tile::Empty
            && !self.store.has_bomb_at(cell)
            && !self.store.enemies.iter().any(|e| e.cell(self.config) == cell)
            && !self
                .store
                .living_players()
                .any(|p| p.hitbox(self.config).overlaps_cell(cell, self.config.tile_size))
    }
}

/// Chance each archetype spends a decision chasing instead of wandering.
pub fn chase_chance(kind: EnemyKind) -> f64 {
    match kind {
        EnemyKind::Balloon | EnemyKind::Ghost => 0.0,
        EnemyKind::Minion => 0.70,
        EnemyKind::Frog => 0.85,
        EnemyKind::Tank | EnemyKind::BossSlime | EnemyKind::BossMecha => 1.0,
    }
}

/// Pick this tick's intent for `enemy`.
pub fn decide<R: Rng + ?Sized>(enemy: &EnemyState, view: &WorldView<'_>, rng: &mut R) -> EnemyIntent {
    let deciding = enemy.ai.heading.is_none() || enemy.ai.blocked || at_rest(enemy, view.config);
    let heading = if deciding {
        match enemy.kind {
            EnemyKind::Balloon => balloon(enemy, view, rng),
            EnemyKind::Ghost => ghost(enemy, view, rng),
            EnemyKind::Minion | EnemyKind::Frog => hunter(enemy, view, rng),
            EnemyKind::Tank => tank(enemy, view, rng),
            EnemyKind::BossSlime | EnemyKind::BossMecha => hunter(enemy, view, rng),
        }
    } else {
        enemy.ai.heading
    };

    let special = match enemy.kind {
        EnemyKind::BossSlime if enemy.ai.special_cooldown <= 0.0 => slime_special(enemy, view, rng),
        EnemyKind::BossMecha if enemy.ai.special_cooldown <= 0.0 => {
            Some(Special::Burst(enemy.cell(view.config)))
        },
        _ => None,
    };

    EnemyIntent { heading, special }
}

fn balloon<R: Rng + ?Sized>(enemy: &EnemyState, view: &WorldView<'_>, rng: &mut R) -> Option<Direction> {
    wander(enemy, view, rng)
}

/// Walkability already lets ghosts through soft walls.
fn ghost<R: Rng + ?Sized>(enemy: &EnemyState, view: &WorldView<'_>, rng: &mut R) -> Option<Direction> {
    wander(enemy, view, rng)
}

fn tank<R: Rng + ?Sized>(enemy: &EnemyState, view: &WorldView<'_>, rng: &mut R) -> Option<Direction> {
    chase(enemy, view, rng).or_else(|| wander(enemy, view, rng))
}

fn hunter<R: Rng + ?Sized>(enemy: &EnemyState, view: &WorldView<'_>, rng: &mut R) -> Option<Direction> {
    if rng.random_bool(chase_chance(enemy.kind)) {
        chase(enemy, view, rng).or_else(|| wander(enemy, view, rng))
    } else {
        wander(enemy, view, rng)
    }
}

/// Keep going while possible, re-rolling now and then.
fn wander<R: Rng + ?Sized>(enemy: &EnemyState, view: &WorldView<'_>, rng: &mut R) -> Option<Direction> {
    let open = view.open_directions(enemy);
    if let Some(current) = enemy.ai.heading
        && !enemy.ai.blocked
        && open.contains(&current)
        && !rng.random_bool(WANDER_REROLL_CHANCE)
    {
        return Some(current);
    }
    open.choose(rng).copied()
}

/// Greedy Manhattan step toward the nearest living player. `None` when no
/// open step gets closer.
fn chase<R: Rng + ?Sized>(enemy: &EnemyState, view: &WorldView<'_>, rng: &mut R) -> Option<Direction> {
    let here = enemy.cell(view.config);
    let target = view.nearest_player(here)?;
    let current = here.manhattan(target);

    let open = view.open_directions(enemy);
    let best = open
        .iter()
        .map(|&d| here.offset(d, 1).manhattan(target))
        .min()?;
    if best >= current {
        return None;
    }
    let candidates: Vec<Direction> = open
        .into_iter()
        .filter(|&d| here.offset(d, 1).manhattan(target) == best)
        .collect();
    candidates.choose(rng).copied()
}

fn slime_special<R: Rng + ?Sized>(enemy: &EnemyState, view: &WorldView<'_>, rng: &mut R) -> Option<Special> {
    if view.store.enemies.len() >= view.config.max_enemies as usize {
        return None;
    }
    let here = enemy.cell(view.config);
    let free: Vec<Cell> = Direction::ALL
        .into_iter()
        .map(|d| here.offset(d, 1))
        .filter(|&c| view.cell_free(c))
        .collect();
    free.choose(rng).copied().map(Special::SpawnMinion)
}

/// Cooldowns, timers and headings for every enemy. Returns the specials to
/// carry out, in enemy order; the caller resets their cooldowns.
pub fn plan_enemies<R: Rng + ?Sized>(
    grid: &GridWorld,
    store: &mut EntityStore,
    config: &BubbleConfig,
    dt: f32,
    rng: &mut R,
) -> Vec<(usize, Special)> {
    for enemy in &mut store.enemies {
        enemy.invincible_timer = (enemy.invincible_timer - dt).max(0.0);
        enemy.ai.special_cooldown = (enemy.ai.special_cooldown - dt).max(0.0);
    }

    let mut specials = Vec::new();
    for idx in 0..store.enemies.len() {
        let intent = {
            let view = WorldView { grid, store, config };
            decide(&store.enemies[idx], &view, rng)
        };
        let ai = &mut store.enemies[idx].ai;
        if intent.heading != ai.heading {
            ai.blocked = false;
        }
        ai.heading = intent.heading;
        if let Some(special) = intent.special {
            specials.push((idx, special));
        }
    }
    specials
}

/// Cooldown a boss waits after using its special.
pub fn special_cooldown(kind: EnemyKind, config: &BubbleConfig) -> f32 {
    match kind {
        EnemyKind::BossSlime => config.slime_special_cooldown_secs,
        EnemyKind::BossMecha => config.mecha_special_cooldown_secs,
        EnemyKind::Balloon | EnemyKind::Ghost | EnemyKind::Minion | EnemyKind::Frog | EnemyKind::Tank => 0.0,
    }
}
