pub mod ai;
pub mod bombs;
pub mod config;
pub mod damage;
pub mod entities;
pub mod grid;
pub mod items;
pub mod level_gen;
pub mod movement;
pub mod player_state;
pub mod progression;
pub mod scoring;

use std::collections::HashMap;
use std::time::Duration;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use bubble_core::arena_game_boilerplate;
use bubble_core::game_trait::{ArenaGame, GameEvent, GameMetadata, PlayerScore};
use bubble_core::input::{Direction, PlayerInputs};
use bubble_core::player::Player;

pub use bubble_core::game_trait::PlayerId;
pub use config::{BubbleConfig, ConfigError};
pub use entities::{
    BlastSource, Bomb, EnemyKind, EnemyState, EntityStore, Explosion, PlayerState, PlayerStatus,
};
pub use grid::{Cell, GridWorld, Tile};
pub use items::{Item, ItemKind};
pub use progression::Outcome;

use ai::Special;
use damage::DamageEvent;
use player_state::HitResult;
use progression::{Standing, Verdict};

/// Match rules: last one standing, or two players against the enemy waves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    Pvp,
    #[default]
    Pve,
}

/// The published snapshot. Only the tick pipeline mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub grid: GridWorld,
    pub entities: EntityStore,
    pub level: u32,
    /// Seconds left on the level clock.
    pub time_left: f32,
    pub is_level_clear: bool,
    pub mode: GameMode,
    pub outcome: Option<Outcome>,
    pub round_complete: bool,
    /// Seconds simulated on this level.
    pub elapsed: f32,
}

impl GameState {
    pub fn players(&self) -> &[PlayerState] {
        &self.entities.players
    }

    pub fn enemies(&self) -> &[EnemyState] {
        &self.entities.enemies
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.entities.bombs
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.entities.explosions
    }

    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.grid.items()
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.entities.player(id)
    }
}

/// The Bubble Couple arena.
pub struct BubbleCouple {
    state: GameState,
    roster: Vec<Player>,
    paused: bool,
    config: BubbleConfig,
    rng: StdRng,
}

impl BubbleCouple {
    pub fn new(mode: GameMode) -> Self {
        Self::with_config(mode, BubbleConfig::load())
    }

    pub fn with_config(mode: GameMode, config: BubbleConfig) -> Self {
        let mut rng = level_gen::level_rng(config.seed, 1);
        let grid = level_gen::generate_grid(&config, 1, &mut rng);
        Self {
            state: GameState {
                grid,
                entities: EntityStore::default(),
                level: 1,
                time_left: config.level_time_secs,
                is_level_clear: false,
                mode,
                outcome: None,
                round_complete: false,
                elapsed: 0.0,
            },
            roster: Vec::new(),
            paused: false,
            config,
            rng,
        }
    }

    /// Read-only view of the latest fully-updated tick.
    pub fn snapshot(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &BubbleConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    /// Rebuild level `level` from scratch. Scores carry over.
    pub fn init_level(&mut self, level: u32) {
        let scores = self.scores();
        self.build_level(level.max(1), &scores);
    }

    /// Move on to the next level. Refused (returns false, no state change)
    /// unless the current level is clear and the match is still running.
    pub fn advance_level(&mut self) -> bool {
        if !self.state.is_level_clear || self.state.outcome.is_some() {
            return false;
        }
        let scores = self.scores();
        self.build_level(self.state.level + 1, &scores);
        true
    }

    fn scores(&self) -> HashMap<PlayerId, i32> {
        self.state.entities.players.iter().map(|p| (p.id, p.score)).collect()
    }

    fn build_level(&mut self, level: u32, scores: &HashMap<PlayerId, i32>) {
        let config = &self.config;
        let mut rng = level_gen::level_rng(config.seed, level);
        let mut grid = level_gen::generate_grid(config, level, &mut rng);
        let spawns = level_gen::spawn_cells(config.grid_width, config.grid_height);

        let mut entities = EntityStore::default();
        for (seat, player) in self.roster.iter().enumerate() {
            let mut state = PlayerState::spawn(player.id, player.color, spawns[seat % spawns.len()], config);
            state.score = scores.get(&player.id).copied().unwrap_or(0);
            entities.players.push(state);
        }

        if self.state.mode == GameMode::Pve {
            let roster = level_gen::enemy_roster(config, level);
            let cells = level_gen::pick_enemy_spawns(&mut grid, roster.len(), &mut rng);
            for (kind, cell) in roster.into_iter().zip(cells) {
                entities.spawn_enemy(kind, cell, config);
            }
        }

        tracing::info!(
            level,
            mode = ?self.state.mode,
            players = entities.players.len(),
            enemies = entities.enemies.len(),
            soft_walls = grid.count_tiles(Tile::WallSoft),
            "Level initialised"
        );

        self.state = GameState {
            grid,
            entities,
            level,
            time_left: config.level_time_secs,
            is_level_clear: false,
            mode: self.state.mode,
            outcome: None,
            round_complete: false,
            elapsed: 0.0,
        };
        self.rng = rng;
    }

    fn award(&mut self, player_id: PlayerId, points: i32, events: &mut Vec<GameEvent>) {
        events.extend(scoring::award(&mut self.state.entities, player_id, points));
    }

    /// Movement and bomb requests from NORMAL players.
    fn gather_intents(&self, inputs: &PlayerInputs) -> (Vec<(PlayerId, Direction)>, Vec<PlayerId>) {
        let mut moves = Vec::new();
        let mut bombs = Vec::new();
        for player in &self.state.entities.players {
            if player.status != PlayerStatus::Normal {
                continue;
            }
            let intent = inputs.intent(player.id);
            if let Some(direction) = intent.movement {
                moves.push((player.id, direction));
            }
            if intent.place_bomb {
                bombs.push(player.id);
            }
        }
        (moves, bombs)
    }

    fn run_enemy_ai(&mut self, dt: f32) {
        let specials = ai::plan_enemies(
            &self.state.grid,
            &mut self.state.entities,
            &self.config,
            dt,
            &mut self.rng,
        );
        for (idx, special) in specials {
            let kind = self.state.entities.enemies[idx].kind;
            self.state.entities.enemies[idx].ai.special_cooldown = ai::special_cooldown(kind, &self.config);
            match special {
                Special::SpawnMinion(cell) => {
                    if self.state.entities.enemies.len() < self.config.max_enemies as usize {
                        self.state.entities.spawn_enemy(EnemyKind::Minion, cell, &self.config);
                        tracing::debug!(x = cell.x, y = cell.y, "Slime spawned a minion");
                    }
                },
                Special::Burst(cell) => {
                    bombs::hostile_burst(
                        &self.state.grid,
                        &mut self.state.entities,
                        cell,
                        self.config.mecha_burst_range,
                        &self.config,
                    );
                    tracing::debug!(x = cell.x, y = cell.y, "Mecha burst");
                },
            }
        }
    }

    fn run_movement(&mut self, moves: &[(PlayerId, Direction)], dt: f32) {
        let grid = &self.state.grid;
        let store = &mut self.state.entities;
        movement::move_players(grid, store, moves, &self.config, dt);
        for idx in 0..store.enemies.len() {
            movement::move_enemy(grid, store, idx, &self.config, dt);
        }
        movement::slide_bombs(grid, store, &self.config, dt);
    }

    fn run_bombs(&mut self, requests: &[PlayerId], dt: f32, events: &mut Vec<GameEvent>) {
        for &player_id in requests {
            bombs::try_place(
                &self.state.grid,
                &mut self.state.entities,
                player_id,
                self.state.elapsed,
                &self.config,
            );
        }

        bombs::tick_explosions(&mut self.state.entities, dt);
        let due = bombs::tick_fuses(&mut self.state.entities, dt);
        for bomb_id in due {
            let Some(report) = bombs::detonate(
                &mut self.state.grid,
                &mut self.state.entities,
                bomb_id,
                &self.config,
                &mut self.rng,
            ) else {
                continue;
            };
            events.push(GameEvent::BombDetonated {
                chain_len: report.chain_len,
            });
            for wall in report.walls {
                if let Some(kind) = wall.dropped {
                    events.push(GameEvent::ItemDropped {
                        item_name: kind.name().to_string(),
                    });
                }
                self.award(wall.owner, scoring::SOFT_WALL_POINTS, events);
            }
        }
    }

    fn run_damage(&mut self, events: &mut Vec<GameEvent>) {
        let mode = self.state.mode;
        let mut hits = damage::apply_explosions(&mut self.state.entities, mode, &self.config);
        hits.extend(damage::apply_contact(&mut self.state.entities, mode, &self.config));

        for hit in hits {
            match hit {
                DamageEvent::PlayerHit { player_id, result } => match result {
                    HitResult::ShieldAbsorbed => {},
                    HitResult::Trapped => events.push(GameEvent::PlayerTrapped { player_id }),
                    HitResult::Killed => events.push(GameEvent::PlayerEliminated { player_id }),
                },
                DamageEvent::EnemyHurt { kind, hp } => events.push(GameEvent::EnemyHurt {
                    kind_name: kind.name().to_string(),
                    hp,
                }),
                DamageEvent::EnemyKilled { kind, credited } => {
                    events.push(GameEvent::EnemyDefeated {
                        kind_name: kind.name().to_string(),
                        credited,
                    });
                    if let Some(player_id) = credited {
                        self.award(player_id, scoring::enemy_points(kind), events);
                    }
                },
            }
        }
    }

    fn run_player_states(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        let players = &mut self.state.entities.players;
        player_state::tick_timers(players, dt);

        let rescues = if self.state.mode == GameMode::Pve {
            player_state::resolve_rescues(players, &self.config)
        } else {
            Vec::new()
        };
        let died = player_state::expire_traps(players);

        for (player_id, rescuer_id) in rescues {
            events.push(GameEvent::PlayerRescued { player_id, rescuer_id });
            self.award(rescuer_id, scoring::RESCUE_POINTS, events);
        }
        events.extend(died.into_iter().map(|player_id| GameEvent::PlayerEliminated { player_id }));
    }

    fn run_items(&mut self, events: &mut Vec<GameEvent>) {
        let collected = items::collect_items(&mut self.state.grid, &mut self.state.entities.players, &self.config);
        for (player_id, _) in collected {
            self.award(player_id, scoring::ITEM_POINTS, events);
        }
    }

    fn run_progression(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        self.state.time_left = (self.state.time_left - dt).max(0.0);
        let verdict = progression::evaluate(&Standing {
            mode: self.state.mode,
            level: self.state.level,
            final_level: self.config.final_level,
            enemies_left: self.state.entities.enemies.len(),
            players: &self.state.entities.players,
            time_left: self.state.time_left,
        });

        match verdict {
            Verdict::Continue => {},
            Verdict::LevelClear => self.clear_level(events),
            Verdict::Over(outcome) => {
                if outcome == Outcome::CoopVictory {
                    self.clear_level(events);
                }
                self.state.outcome = Some(outcome);
                self.state.round_complete = true;
                events.push(GameEvent::RoundComplete);
                tracing::info!(level = self.state.level, ?outcome, "Match over");
            },
        }
    }

    fn clear_level(&mut self, events: &mut Vec<GameEvent>) {
        self.state.is_level_clear = true;
        let survivors: Vec<PlayerId> = self.state.entities.living_players().map(|p| p.id).collect();
        for player_id in survivors {
            self.award(player_id, scoring::LEVEL_CLEAR_POINTS, events);
        }
        events.push(GameEvent::LevelClear {
            level: self.state.level,
        });
        tracing::info!(level = self.state.level, time_left = self.state.time_left, "Level clear");
    }
}

impl Default for BubbleCouple {
    fn default() -> Self {
        Self::with_config(GameMode::default(), BubbleConfig::default())
    }
}

impl ArenaGame for BubbleCouple {
    fn metadata(&self) -> GameMetadata {
        let description = match self.state.mode {
            GameMode::Pvp => "Trap your rival in a bubble blast. Last one standing wins.",
            GameMode::Pve => "Clear every level of monsters together. Free your partner from bubbles!",
        };
        GameMetadata {
            name: "Bubble Couple".to_string(),
            description: description.to_string(),
            min_players: 1,
            max_players: 2,
            estimated_round_duration: Duration::try_from_secs_f32(self.config.level_time_secs).unwrap_or_default(),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    fn init(&mut self, players: &[Player]) {
        let max_players = usize::from(self.metadata().max_players);
        self.roster = players.iter().take(max_players).cloned().collect();
        self.paused = false;
        self.build_level(1, &HashMap::new());
    }

    fn update(&mut self, dt: f32, inputs: &PlayerInputs) -> Vec<GameEvent> {
        if self.paused
            || self.state.round_complete
            || self.state.is_level_clear
            || self.state.entities.players.is_empty()
            || !(dt.is_finite() && dt > 0.0)
        {
            return Vec::new();
        }

        let mut events = Vec::new();
        self.state.elapsed += dt;

        let (moves, bomb_requests) = self.gather_intents(inputs);
        self.run_enemy_ai(dt);
        self.run_movement(&moves, dt);
        self.run_bombs(&bomb_requests, dt, &mut events);
        self.run_damage(&mut events);
        self.run_player_states(dt, &mut events);
        self.run_items(&mut events);
        self.run_progression(dt, &mut events);

        events
    }

    arena_game_boilerplate!();

    fn round_results(&self) -> Vec<PlayerScore> {
        self.roster
            .iter()
            .map(|player| PlayerScore {
                player_id: player.id,
                score: self.state.player(player.id).map_or(0, |p| p.score),
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use bubble_core::player::PlayerColor;

    use crate::config::BubbleConfig;
    use crate::entities::PlayerState;
    use crate::grid::Cell;
    use crate::PlayerId;

    /// A fresh level-start player standing on `cell`.
    pub fn player_at(id: PlayerId, cell: Cell, config: &BubbleConfig) -> PlayerState {
        PlayerState::spawn(id, PlayerColor::for_seat(id as usize), cell, config)
    }
}
