//! Entity records and the store that owns them.
//!
//! Players, enemies, bombs and explosions live here. The store hands out ids
//! and is only ever mutated by the tick pipeline.

use serde::{Deserialize, Serialize};

use bubble_core::game_trait::PlayerId;
use bubble_core::input::Direction;
use bubble_core::player::PlayerColor;

use crate::config::BubbleConfig;
use crate::grid::Cell;
use crate::movement::Aabb;

pub type EnemyId = u32;
pub type BombId = u32;
pub type BlastId = u64;

/// Player life-cycle state. GHOST and SHIELD are timed modifiers, not states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Normal,
    Trapped,
    Dead,
}

/// State of a single player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    /// Hitbox top-left, in pixels.
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub status: PlayerStatus,
    pub max_bombs: u32,
    /// Bombs this player currently has on the field.
    pub active_bombs: u32,
    pub bomb_range: u32,
    /// Pixels per second.
    pub move_speed: f32,
    pub has_kick: bool,
    /// Absorbs a single hit.
    pub has_shield: bool,
    /// Seconds of soft-wall pass-through remaining.
    pub ghost_timer: f32,
    /// Seconds of damage immunity remaining.
    pub invincible_timer: f32,
    /// Seconds until a TRAPPED player dies.
    pub trapped_timer: f32,
    pub score: i32,
    pub color: PlayerColor,
}

impl PlayerState {
    /// Fresh level-start record standing on `spawn`.
    pub fn spawn(id: PlayerId, color: PlayerColor, spawn: Cell, config: &BubbleConfig) -> Self {
        let offset = config.entity_offset();
        Self {
            id,
            x: spawn.x as f32 * config.tile_size + offset,
            y: spawn.y as f32 * config.tile_size + offset,
            direction: Direction::Down,
            status: PlayerStatus::Normal,
            max_bombs: config.base_max_bombs,
            active_bombs: 0,
            bomb_range: config.base_bomb_range,
            move_speed: config.base_move_speed,
            has_kick: false,
            has_shield: false,
            ghost_timer: 0.0,
            invincible_timer: 0.0,
            trapped_timer: 0.0,
            score: 0,
            color,
        }
    }

    pub fn hitbox(&self, config: &BubbleConfig) -> Aabb {
        Aabb::new(self.x, self.y, config.entity_size, config.entity_size)
    }

    /// Cell under the hitbox centre.
    pub fn cell(&self, config: &BubbleConfig) -> Cell {
        self.hitbox(config).center_cell(config.tile_size)
    }

    pub fn is_alive(&self) -> bool {
        self.status != PlayerStatus::Dead
    }

    pub fn is_ghost(&self) -> bool {
        self.ghost_timer > 0.0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0.0
    }
}

/// Enemy archetypes. Each has its own decision function in [`crate::ai`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Balloon,
    Ghost,
    Minion,
    Frog,
    Tank,
    BossSlime,
    BossMecha,
}

impl EnemyKind {
    pub fn max_hp(self) -> u32 {
        match self {
            EnemyKind::Balloon | EnemyKind::Ghost | EnemyKind::Minion => 1,
            EnemyKind::Frog => 2,
            EnemyKind::Tank => 3,
            EnemyKind::BossSlime => 8,
            EnemyKind::BossMecha => 12,
        }
    }

    /// Pixels per second.
    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Balloon => 60.0,
            EnemyKind::Ghost => 50.0,
            EnemyKind::Minion => 80.0,
            EnemyKind::Frog => 90.0,
            EnemyKind::Tank => 40.0,
            EnemyKind::BossSlime => 50.0,
            EnemyKind::BossMecha => 60.0,
        }
    }

    /// Score awarded to the player credited with the kill.
    pub fn points(self) -> i32 {
        match self {
            EnemyKind::Balloon => 100,
            EnemyKind::Ghost => 200,
            EnemyKind::Minion => 150,
            EnemyKind::Frog => 250,
            EnemyKind::Tank => 400,
            EnemyKind::BossSlime => 2000,
            EnemyKind::BossMecha => 3000,
        }
    }

    pub fn is_boss(self) -> bool {
        matches!(self, EnemyKind::BossSlime | EnemyKind::BossMecha)
    }

    pub fn passes_soft_walls(self) -> bool {
        matches!(self, EnemyKind::Ghost)
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Balloon => "balloon",
            EnemyKind::Ghost => "ghost",
            EnemyKind::Minion => "minion",
            EnemyKind::Frog => "frog",
            EnemyKind::Tank => "tank",
            EnemyKind::BossSlime => "boss_slime",
            EnemyKind::BossMecha => "boss_mecha",
        }
    }
}

/// Per-enemy AI memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiCursor {
    pub heading: Option<Direction>,
    /// Set by movement when the cell ahead was not walkable.
    pub blocked: bool,
    /// Seconds until a boss may use its special attack again.
    pub special_cooldown: f32,
}

/// State of a single enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyState {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    pub hp: u32,
    pub max_hp: u32,
    pub invincible_timer: f32,
    pub ai: AiCursor,
    /// Last blast that damaged this enemy; a blast never hits twice.
    pub last_blast: Option<BlastId>,
}

impl EnemyState {
    pub fn hitbox(&self, config: &BubbleConfig) -> Aabb {
        Aabb::new(self.x, self.y, config.entity_size, config.entity_size)
    }

    pub fn cell(&self, config: &BubbleConfig) -> Cell {
        self.hitbox(config).center_cell(config.tile_size)
    }
}

/// A live bomb. Always sits on exactly one grid cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub id: BombId,
    pub owner: PlayerId,
    pub cell: Cell,
    /// Level clock (seconds) at placement.
    pub placed_at: f32,
    pub fuse_remaining: f32,
    pub blast_range: u32,
    /// Set while the bomb travels after a kick.
    pub sliding: Option<Direction>,
    /// Fraction of a cell travelled toward the next cell.
    pub slide_progress: f32,
}

/// Who set off an explosion. Enemy-sourced blasts never hurt enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlastSource {
    Player(PlayerId),
    Enemy,
}

/// One lethal cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub cell: Cell,
    /// Seconds left.
    pub remaining: f32,
    pub blast_id: BlastId,
    pub source: BlastSource,
}

/// Owns every entity collection and hands out identities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    /// Roster order: seat 0 first.
    pub players: Vec<PlayerState>,
    pub enemies: Vec<EnemyState>,
    /// Placement order.
    pub bombs: Vec<Bomb>,
    pub explosions: Vec<Explosion>,
    next_enemy_id: EnemyId,
    next_bomb_id: BombId,
    next_blast_id: BlastId,
}

impl EntityStore {
    /// An empty store seated with `players`.
    pub fn with_players(players: Vec<PlayerState>) -> Self {
        Self {
            players,
            ..Self::default()
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Spawn an enemy centred on `cell`.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, cell: Cell, config: &BubbleConfig) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        let offset = config.entity_offset();
        let special_cooldown = match kind {
            EnemyKind::BossSlime => config.slime_special_cooldown_secs,
            EnemyKind::BossMecha => config.mecha_special_cooldown_secs,
            _ => 0.0,
        };
        self.enemies.push(EnemyState {
            id,
            kind,
            x: cell.x as f32 * config.tile_size + offset,
            y: cell.y as f32 * config.tile_size + offset,
            hp: kind.max_hp(),
            max_hp: kind.max_hp(),
            invincible_timer: 0.0,
            ai: AiCursor {
                special_cooldown,
                ..AiCursor::default()
            },
            last_blast: None,
        });
        id
    }

    pub fn bomb_at(&self, cell: Cell) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.cell == cell)
    }

    pub fn has_bomb_at(&self, cell: Cell) -> bool {
        self.bomb_at(cell).is_some()
    }

    /// Insert a bomb, refusing a second bomb on the same cell.
    pub fn add_bomb(
        &mut self,
        owner: PlayerId,
        cell: Cell,
        placed_at: f32,
        fuse: f32,
        blast_range: u32,
    ) -> Option<BombId> {
        if self.has_bomb_at(cell) {
            return None;
        }
        let id = self.next_bomb_id;
        self.next_bomb_id += 1;
        self.bombs.push(Bomb {
            id,
            owner,
            cell,
            placed_at,
            fuse_remaining: fuse,
            blast_range,
            sliding: None,
            slide_progress: 0.0,
        });
        Some(id)
    }

    pub fn remove_bomb(&mut self, id: BombId) -> Option<Bomb> {
        let idx = self.bombs.iter().position(|b| b.id == id)?;
        Some(self.bombs.remove(idx))
    }

    pub fn next_blast_id(&mut self) -> BlastId {
        let id = self.next_blast_id;
        self.next_blast_id += 1;
        id
    }

    /// Mark `cell` as exploding. An existing explosion keeps the longer
    /// lifetime and takes the newer blast identity, except that a hostile
    /// blast never takes over a live player blast.
    pub fn mark_explosion(&mut self, cell: Cell, lifetime: f32, blast_id: BlastId, source: BlastSource) {
        if let Some(existing) = self.explosions.iter_mut().find(|e| e.cell == cell) {
            existing.remaining = existing.remaining.max(lifetime);
            if let (BlastSource::Player(_), BlastSource::Enemy) = (existing.source, source) {
                return;
            }
            existing.blast_id = blast_id;
            existing.source = source;
            return;
        }
        self.explosions.push(Explosion {
            cell,
            remaining: lifetime,
            blast_id,
            source,
        });
    }

    pub fn explosion_at(&self, cell: Cell) -> Option<&Explosion> {
        self.explosions.iter().find(|e| e.cell == cell)
    }

    pub fn living_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.iter().filter(|p| p.is_alive())
    }
}
