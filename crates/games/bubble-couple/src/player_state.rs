//! Player life cycle: NORMAL, TRAPPED, DEAD.
//!
//! Ghost and shield are timed modifiers layered on NORMAL, not states.

use bubble_core::game_trait::PlayerId;

use crate::config::BubbleConfig;
use crate::entities::{PlayerState, PlayerStatus};
use crate::GameMode;

/// What a single hit did to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    ShieldAbsorbed,
    Trapped,
    Killed,
}

/// Apply one hit. TRAPPED, DEAD and invincible players ignore it.
pub fn hit_player(player: &mut PlayerState, mode: GameMode, config: &BubbleConfig) -> Option<HitResult> {
    if player.status != PlayerStatus::Normal || player.is_invincible() {
        return None;
    }
    if player.has_shield {
        player.has_shield = false;
        player.invincible_timer = config.shield_invincibility_secs;
        tracing::debug!(player_id = player.id, "Shield absorbed hit");
        return Some(HitResult::ShieldAbsorbed);
    }
    match mode {
        GameMode::Pve => {
            player.status = PlayerStatus::Trapped;
            player.trapped_timer = config.trap_duration_secs;
            tracing::debug!(player_id = player.id, "Player trapped");
            Some(HitResult::Trapped)
        },
        GameMode::Pvp => {
            kill(player);
            Some(HitResult::Killed)
        },
    }
}

fn kill(player: &mut PlayerState) {
    player.status = PlayerStatus::Dead;
    player.trapped_timer = 0.0;
    player.ghost_timer = 0.0;
    player.invincible_timer = 0.0;
    tracing::debug!(player_id = player.id, "Player eliminated");
}

/// Count down modifier and trap timers. Does not resolve expiry.
pub fn tick_timers(players: &mut [PlayerState], dt: f32) {
    for player in players.iter_mut().filter(|p| p.is_alive()) {
        player.ghost_timer = (player.ghost_timer - dt).max(0.0);
        player.invincible_timer = (player.invincible_timer - dt).max(0.0);
        if player.status == PlayerStatus::Trapped {
            player.trapped_timer = (player.trapped_timer - dt).max(0.0);
        }
    }
}

/// Free every trapped player touched by a NORMAL teammate.
/// Returns `(rescued, rescuer)` pairs.
pub fn resolve_rescues(players: &mut [PlayerState], config: &BubbleConfig) -> Vec<(PlayerId, PlayerId)> {
    let mut rescues = Vec::new();
    for i in 0..players.len() {
        if players[i].status != PlayerStatus::Trapped {
            continue;
        }
        let trapped_box = players[i].hitbox(config);
        let rescuer = players
            .iter()
            .enumerate()
            .find(|(j, p)| *j != i && p.status == PlayerStatus::Normal && p.hitbox(config).overlaps(&trapped_box))
            .map(|(_, p)| p.id);
        if let Some(rescuer) = rescuer {
            let player = &mut players[i];
            player.status = PlayerStatus::Normal;
            player.trapped_timer = 0.0;
            player.invincible_timer = config.rescue_invincibility_secs;
            tracing::debug!(player_id = player.id, rescuer, "Player rescued");
            rescues.push((player.id, rescuer));
        }
    }
    rescues
}

/// Trapped players whose timer ran out die. Returns their ids.
pub fn expire_traps(players: &mut [PlayerState]) -> Vec<PlayerId> {
    let mut died = Vec::new();
    for player in players.iter_mut() {
        if player.status == PlayerStatus::Trapped && player.trapped_timer <= 0.0 {
            kill(player);
            died.push(player.id);
        }
    }
    died
}
