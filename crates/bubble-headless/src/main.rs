mod bot;

use tracing_subscriber::EnvFilter;

use bubble_core::game_trait::{ArenaGame, GameEvent};
use bubble_core::input::PlayerInputs;
use bubble_core::player::{Player, PlayerColor};
use bubble_core::scheduler::TickScheduler;
use bubble_couple::{BubbleConfig, BubbleCouple, GameMode};

use bot::WanderBot;

/// Simulated frame length handed to the scheduler.
const FRAME_SECS: f32 = 1.0 / 60.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let mode = match args.next().as_deref() {
        Some("pvp") => GameMode::Pvp,
        _ => GameMode::Pve,
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(60.0);
    let mut config = BubbleConfig::load();
    if let Some(seed) = args.next().and_then(|s| s.parse::<u64>().ok()) {
        config.seed = seed;
    }

    let players: Vec<Player> = (0..2)
        .map(|seat| Player {
            id: seat as u64 + 1,
            display_name: format!("Bot{}", seat + 1),
            color: PlayerColor::for_seat(seat),
        })
        .collect();
    let mut bots: Vec<WanderBot> = players
        .iter()
        .map(|p| WanderBot::new(p.id, config.seed ^ p.id))
        .collect();

    let mut game = BubbleCouple::with_config(mode, config.clone());
    game.init(&players);
    let mut scheduler = TickScheduler::for_game(&game);

    tracing::info!(?mode, seconds, seed = config.seed, "Bubble Couple headless run starting");

    let frames = (seconds / FRAME_SECS).ceil() as u64;
    for _ in 0..frames {
        let mut latch = PlayerInputs::empty();
        for bot in &mut bots {
            let intent = bot.intent(game.snapshot(), game.config(), FRAME_SECS);
            latch = latch.with(bot.player_id(), intent);
        }

        for event in scheduler.advance(&mut game, &mut latch, FRAME_SECS) {
            log_event(&event);
        }

        if game.is_round_complete() {
            break;
        }
        if game.snapshot().is_level_clear && game.advance_level() {
            scheduler.restart();
        }
    }

    let snapshot = game.snapshot();
    tracing::info!(
        level = snapshot.level,
        outcome = ?snapshot.outcome,
        time_left = snapshot.time_left,
        ticks = scheduler.tick_count(),
        "Run finished"
    );
    for result in game.round_results() {
        tracing::info!(player_id = result.player_id, score = result.score, "Final score");
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::ScoreUpdate { .. }
        | GameEvent::BombDetonated { .. }
        | GameEvent::EnemyHurt { .. } => {
            tracing::trace!(?event, "Game event");
        },
        GameEvent::LevelClear { level } => tracing::info!(level, "Level cleared"),
        _ => tracing::debug!(?event, "Game event"),
    }
}
