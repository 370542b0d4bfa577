use serde::{Deserialize, Serialize};

use bubble_core::game_trait::PlayerId;

use crate::entities::PlayerState;
use crate::GameMode;

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Everyone eliminated together, or the clock ran out.
    Draw,
    PlayerWins(PlayerId),
    /// Cooperative clear of the final level.
    CoopVictory,
}

/// What the end-of-tick evaluation decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    /// All enemies gone on a non-final level; waits for `advance_level`.
    LevelClear,
    Over(Outcome),
}

/// Inputs to the end-of-tick evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Standing<'a> {
    pub mode: GameMode,
    pub level: u32,
    pub final_level: u32,
    pub enemies_left: usize,
    pub players: &'a [PlayerState],
    pub time_left: f32,
}

/// Checks run in order: level clear, eliminations, timeout.
pub fn evaluate(standing: &Standing<'_>) -> Verdict {
    if standing.mode == GameMode::Pve && standing.enemies_left == 0 {
        return if standing.level >= standing.final_level {
            Verdict::Over(Outcome::CoopVictory)
        } else {
            Verdict::LevelClear
        };
    }

    let alive: Vec<&PlayerState> = standing.players.iter().filter(|p| p.is_alive()).collect();
    match (standing.mode, alive.as_slice()) {
        (_, []) => return Verdict::Over(Outcome::Draw),
        (GameMode::Pvp, [winner]) if standing.players.len() >= 2 => {
            return Verdict::Over(Outcome::PlayerWins(winner.id));
        },
        _ => {},
    }

    if standing.time_left <= 0.0 {
        return Verdict::Over(Outcome::Draw);
    }
    Verdict::Continue
}
