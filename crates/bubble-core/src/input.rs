use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::game_trait::PlayerId;

/// Cardinal direction on the tile grid. Screen space: `Up` is negative y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit grid step for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// One player's intent for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// `None` means stand still.
    pub movement: Option<Direction>,
    /// Edge-triggered: true on exactly one tick per button press.
    pub place_bomb: bool,
}

impl PlayerIntent {
    pub fn moving(direction: Direction) -> Self {
        Self {
            movement: Some(direction),
            place_bomb: false,
        }
    }

    pub fn bomb() -> Self {
        Self {
            movement: None,
            place_bomb: true,
        }
    }
}

/// Collected intents from all players for a single tick.
#[derive(Debug, Clone, Default)]
pub struct PlayerInputs {
    pub intents: HashMap<PlayerId, PlayerIntent>,
}

impl PlayerInputs {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Intent for `player_id`, or the idle intent if none was latched.
    pub fn intent(&self, player_id: PlayerId) -> PlayerIntent {
        self.intents.get(&player_id).copied().unwrap_or_default()
    }

    pub fn with(mut self, player_id: PlayerId, intent: PlayerIntent) -> Self {
        self.intents.insert(player_id, intent);
        self
    }
}

/// Discrete actions the input layer reports. No raw device codes cross this boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move(Direction),
    PlaceBomb,
}

/// Boundary between the (asynchronous) input layer and the tick pipeline.
///
/// Polled exactly once at the start of every tick; implementations must hand
/// out a consistent view for the whole tick.
pub trait InputLatch {
    fn poll(&mut self) -> PlayerInputs;
}

impl InputLatch for PlayerInputs {
    /// A fixed set of intents replayed on every poll. Handy for tests.
    fn poll(&mut self) -> PlayerInputs {
        self.clone()
    }
}

/// Latch fed by press/release events.
///
/// Held directions are level-triggered and the most recently pressed one
/// wins. Bomb placement is edge-triggered: a press produces exactly one
/// `place_bomb` poll, even if released before the tick, and key repeat while
/// held produces nothing.
#[derive(Debug, Default)]
pub struct IntentLatch {
    held: HashMap<PlayerId, Vec<Direction>>,
    bomb_held: HashSet<PlayerId>,
    bomb_pending: HashSet<PlayerId>,
}

impl IntentLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, player_id: PlayerId, action: Action) {
        match action {
            Action::Move(direction) => {
                let held = self.held.entry(player_id).or_default();
                held.retain(|&d| d != direction);
                held.push(direction);
            },
            Action::PlaceBomb => {
                if self.bomb_held.insert(player_id) {
                    self.bomb_pending.insert(player_id);
                }
            },
        }
    }

    pub fn release(&mut self, player_id: PlayerId, action: Action) {
        match action {
            Action::Move(direction) => {
                if let Some(held) = self.held.get_mut(&player_id) {
                    held.retain(|&d| d != direction);
                }
            },
            Action::PlaceBomb => {
                self.bomb_held.remove(&player_id);
            },
        }
    }

    /// Forget everything, e.g. when focus is lost or the game resets.
    pub fn clear(&mut self) {
        self.held.clear();
        self.bomb_held.clear();
        self.bomb_pending.clear();
    }
}

impl InputLatch for IntentLatch {
    fn poll(&mut self) -> PlayerInputs {
        let mut inputs = PlayerInputs::default();
        for (&player_id, held) in &self.held {
            if let Some(&direction) = held.last() {
                inputs
                    .intents
                    .entry(player_id)
                    .or_default()
                    .movement = Some(direction);
            }
        }
        for player_id in self.bomb_pending.drain() {
            inputs.intents.entry(player_id).or_default().place_bomb = true;
        }
        inputs
    }
}
