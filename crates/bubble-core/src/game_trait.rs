use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::input::PlayerInputs;

/// Unique identifier for a player in the game.
pub type PlayerId = u64;

/// Core trait implemented by a tick-driven arena simulation.
///
/// The driver (render loop, headless runner, or test harness) owns timing and
/// input capture; the game only advances its own state, one tick per call.
pub trait ArenaGame {
    /// Game metadata for the mode selection screen.
    fn metadata(&self) -> GameMetadata;

    /// Called once when the players are seated. Resets all progress.
    fn init(&mut self, players: &[super::player::Player]);

    /// Advance exactly one tick of `dt` seconds. Returns the events it produced.
    fn update(&mut self, dt: f32, inputs: &PlayerInputs) -> Vec<GameEvent>;

    /// Encode the current snapshot by value, for readers that cannot borrow it.
    fn serialize_state(&self) -> Vec<u8>;

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Freeze the simulation; `update` becomes a no-op.
    fn pause(&mut self);

    fn resume(&mut self);

    /// Whether the match has reached a final outcome.
    fn is_round_complete(&self) -> bool;

    /// Current scores, one entry per seated player.
    fn round_results(&self) -> Vec<PlayerScore>;
}

/// Game metadata for the mode selection screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub min_players: u8,
    pub max_players: u8,
    pub estimated_round_duration: Duration,
}

/// Events emitted by a game during update, for HUD, audio and logging layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreUpdate { player_id: PlayerId, score: i32 },
    PlayerTrapped { player_id: PlayerId },
    PlayerRescued { player_id: PlayerId, rescuer_id: PlayerId },
    PlayerEliminated { player_id: PlayerId },
    EnemyHurt { kind_name: String, hp: u32 },
    EnemyDefeated {
        kind_name: String,
        credited: Option<PlayerId>,
    },
    ItemDropped { item_name: String },
    BombDetonated { chain_len: u32 },
    LevelClear { level: u32 },
    RoundComplete,
}

/// Score entry for a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub score: i32,
}

/// Generates the `ArenaGame` methods that only touch the snapshot and pause flag:
/// `serialize_state`, `pause`, `resume`, `is_round_complete`.
///
/// Requires the implementing struct to have `state` and `paused: bool` fields,
/// and the state type to have a `round_complete: bool` field.
#[macro_export]
macro_rules! arena_game_boilerplate {
    () => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).expect("game state serialization must succeed")
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_round_complete(&self) -> bool {
            self.state.round_complete
        }
    };
}
