pub mod game_trait;
pub mod input;
pub mod player;
pub mod scheduler;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{ArenaGame, GameEvent, PlayerId, PlayerScore};
    use crate::input::PlayerInputs;
    use crate::player::{Player, PlayerColor};

    /// Create `n` test players with sequential IDs starting at 1.
    pub fn make_players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player {
                id: i as PlayerId + 1,
                display_name: format!("Player{}", i + 1),
                color: PlayerColor::for_seat(i),
            })
            .collect()
    }

    /// Run N game ticks with empty inputs, returning all accumulated events.
    pub fn run_game_ticks(game: &mut dyn ArenaGame, n: usize, dt: f32) -> Vec<GameEvent> {
        let empty = PlayerInputs::empty();
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(dt, &empty));
        }
        all_events
    }

    /// Assert that the game's serialized state differs from `before`.
    pub fn assert_game_state_changed(game: &dyn ArenaGame, before: &[u8]) {
        let after = game.serialize_state();
        assert_ne!(
            before,
            &after[..],
            "Game state should have changed after operation"
        );
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Generic checks every ArenaGame implementation must pass. Game crates
    // call them from their own #[cfg(test)] modules with a concrete instance.

    /// After init() with N players, serialize_state() must return non-empty bytes.
    pub fn contract_init_creates_player_state(game: &mut dyn ArenaGame, player_count: usize) {
        let players = make_players(player_count);
        game.init(&players);
        let state = game.serialize_state();
        assert!(
            !state.is_empty(),
            "serialize_state() must return non-empty bytes after init"
        );
    }

    /// update() with dt>0 must advance the level timer.
    pub fn contract_update_advances_time(game: &mut dyn ArenaGame) {
        let before = game.serialize_state();
        game.update(1.0, &PlayerInputs::empty());
        let after = game.serialize_state();
        assert_ne!(
            before, after,
            "update(dt>0) must advance game state (timer)"
        );
    }

    /// Running update() enough times must eventually reach is_round_complete().
    pub fn contract_round_eventually_completes(game: &mut dyn ArenaGame, max_ticks: usize) {
        let empty = PlayerInputs::empty();
        for _ in 0..max_ticks {
            game.update(1.0, &empty);
            if game.is_round_complete() {
                return;
            }
        }
        assert!(
            game.is_round_complete(),
            "Game must complete after {max_ticks} ticks of 1s each"
        );
    }

    /// pause() must freeze the simulation, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(game: &mut dyn ArenaGame) {
        game.pause();
        let before = game.serialize_state();
        let empty = PlayerInputs::empty();
        game.update(1.0, &empty);
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        game.resume();
        game.update(1.0, &empty);
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// round_results() must return an entry for each seated player.
    pub fn contract_round_results_complete(
        game: &dyn ArenaGame,
        expected_players: usize,
    ) -> Vec<PlayerScore> {
        let results = game.round_results();
        assert_eq!(
            results.len(),
            expected_players,
            "round_results must have one entry per seated player"
        );
        results
    }
}
