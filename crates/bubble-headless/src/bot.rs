use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use bubble_core::game_trait::PlayerId;
use bubble_core::input::{Direction, PlayerIntent};
use bubble_couple::{BubbleConfig, Cell, GameState, PlayerStatus, Tile};

/// Seconds between two bombs from the same bot.
const BOMB_INTERVAL_SECS: f32 = 3.0;

/// Chance per decision to pick a fresh heading even when the current one is clear.
const TURN_CHANCE: f64 = 0.05;

/// A wandering bot that breaks soft walls and steps out of blast lanes.
pub struct WanderBot {
    player_id: PlayerId,
    rng: StdRng,
    heading: Option<Direction>,
    bomb_cooldown: f32,
}

impl WanderBot {
    pub fn new(player_id: PlayerId, seed: u64) -> Self {
        Self {
            player_id,
            rng: StdRng::seed_from_u64(seed),
            heading: None,
            bomb_cooldown: BOMB_INTERVAL_SECS,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Intent for the coming tick, read off the latest snapshot.
    pub fn intent(&mut self, state: &GameState, config: &BubbleConfig, dt: f32) -> PlayerIntent {
        let Some(me) = state.player(self.player_id) else {
            return PlayerIntent::default();
        };
        if me.status != PlayerStatus::Normal {
            self.heading = None;
            return PlayerIntent::default();
        }
        self.bomb_cooldown = (self.bomb_cooldown - dt).max(0.0);

        let here = me.cell(config);
        let danger = danger_cells(state);
        let open: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&d| is_passable(state, here.offset(d, 1)))
            .collect();

        if danger.contains(&here) {
            let safe: Vec<Direction> = open
                .iter()
                .copied()
                .filter(|&d| !danger.contains(&here.offset(d, 1)))
                .collect();
            self.heading = safe.choose(&mut self.rng).or_else(|| open.choose(&mut self.rng)).copied();
            return PlayerIntent {
                movement: self.heading,
                place_bomb: false,
            };
        }

        let next_to_soft = Direction::ALL
            .into_iter()
            .any(|d| state.grid.tile_at(here.offset(d, 1)) == Tile::WallSoft);
        let place_bomb = next_to_soft
            && self.bomb_cooldown <= 0.0
            && me.active_bombs < me.max_bombs
            && !open.is_empty()
            && !state.entities.has_bomb_at(here);
        if place_bomb {
            self.bomb_cooldown = BOMB_INTERVAL_SECS;
        }

        let keep = self.heading.is_some_and(|d| {
            let ahead = here.offset(d, 1);
            is_passable(state, ahead) && !danger.contains(&ahead)
        });
        if place_bomb || !keep || self.rng.random_bool(TURN_CHANCE) {
            let calm: Vec<Direction> = open
                .iter()
                .copied()
                .filter(|&d| !danger.contains(&here.offset(d, 1)))
                .collect();
            self.heading = calm.choose(&mut self.rng).copied();
        }

        PlayerIntent {
            movement: self.heading,
            place_bomb,
        }
    }
}

fn is_passable(state: &GameState, cell: Cell) -> bool {
    state.grid.is_walkable(cell, false) && !state.entities.has_bomb_at(cell)
}

/// Cells that are exploding now or lie in the lane of a live bomb.
pub fn danger_cells(state: &GameState) -> Vec<Cell> {
    let mut cells: Vec<Cell> = state.explosions().iter().map(|e| e.cell).collect();
    for bomb in state.bombs() {
        cells.push(bomb.cell);
        for direction in Direction::ALL {
            for step in 1..=bomb.blast_range as i32 {
                let cell = bomb.cell.offset(direction, step);
                if state.grid.tile_at(cell) != Tile::Empty {
                    break;
                }
                cells.push(cell);
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use bubble_core::player::PlayerColor;
    use bubble_couple::{EntityStore, GameMode, GridWorld, PlayerState};

    use super::*;

    fn open_state(config: &BubbleConfig, at: Cell) -> GameState {
        GameState {
            grid: GridWorld::open(9, 9),
            entities: EntityStore::with_players(vec![
                PlayerState::spawn(1, PlayerColor::default(), at, config),
            ]),
            level: 1,
            time_left: config.level_time_secs,
            is_level_clear: false,
            mode: GameMode::Pvp,
            outcome: None,
            round_complete: false,
            elapsed: 0.0,
        }
    }

    #[test]
    fn lanes_cover_range() {
        let config = BubbleConfig::default();
        let mut state = open_state(&config, Cell::new(1, 1));
        state.entities.add_bomb(1, Cell::new(4, 4), 0.0, 2.0, 2);
        let danger = danger_cells(&state);
        assert!(danger.contains(&Cell::new(4, 4)));
        assert!(danger.contains(&Cell::new(6, 4)));
        assert!(danger.contains(&Cell::new(4, 2)));
        assert!(!danger.contains(&Cell::new(7, 4)));
        assert!(!danger.contains(&Cell::new(5, 5)));
    }

    #[test]
    fn flees_own_bomb() {
        let config = BubbleConfig::default();
        let mut state = open_state(&config, Cell::new(4, 4));
        state.entities.add_bomb(1, Cell::new(4, 4), 0.0, 2.0, 1);
        let mut bot = WanderBot::new(1, 3);
        let intent = bot.intent(&state, &config, 1.0 / 60.0);
        assert!(intent.movement.is_some());
        assert!(!intent.place_bomb);
    }

    #[test]
    fn idle_when_not_normal() {
        let config = BubbleConfig::default();
        let mut state = open_state(&config, Cell::new(4, 4));
        state.entities.players[0].status = PlayerStatus::Trapped;
        let mut bot = WanderBot::new(1, 3);
        assert_eq!(bot.intent(&state, &config, 1.0 / 60.0), PlayerIntent::default());
    }

    #[test]
    fn no_bomb_without_soft_walls() {
        let config = BubbleConfig::default();
        let state = open_state(&config, Cell::new(4, 4));
        let mut bot = WanderBot::new(1, 9);
        for _ in 0..600 {
            assert!(!bot.intent(&state, &config, 1.0 / 60.0).place_bomb);
        }
    }
}
