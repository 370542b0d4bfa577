//! Explosion and contact damage for players and enemies.

use bubble_core::game_trait::PlayerId;

use crate::config::BubbleConfig;
use crate::entities::{BlastSource, EnemyKind, EntityStore, PlayerStatus};
use crate::player_state::{HitResult, hit_player};
use crate::GameMode;

/// Something the damage pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageEvent {
    PlayerHit { player_id: PlayerId, result: HitResult },
    EnemyHurt { kind: EnemyKind, hp: u32 },
    EnemyKilled { kind: EnemyKind, credited: Option<PlayerId> },
}

/// Hit every target standing on an active explosion cell.
///
/// Enemies only take damage from player blasts, once per blast id, and are
/// removed when their hp reaches zero.
pub fn apply_explosions(store: &mut EntityStore, mode: GameMode, config: &BubbleConfig) -> Vec<DamageEvent> {
    let mut events = Vec::new();
    if store.explosions.is_empty() {
        return events;
    }

    for i in 0..store.players.len() {
        let cell = store.players[i].cell(config);
        if store.explosion_at(cell).is_none() {
            continue;
        }
        let player = &mut store.players[i];
        if let Some(result) = hit_player(player, mode, config) {
            events.push(DamageEvent::PlayerHit {
                player_id: player.id,
                result,
            });
        }
    }

    let mut slain = Vec::new();
    for i in 0..store.enemies.len() {
        let cell = store.enemies[i].cell(config);
        let Some(explosion) = store.explosion_at(cell) else {
            continue;
        };
        let BlastSource::Player(owner) = explosion.source else {
            continue;
        };
        let blast_id = explosion.blast_id;

        let enemy = &mut store.enemies[i];
        if enemy.invincible_timer > 0.0 || enemy.last_blast == Some(blast_id) {
            continue;
        }
        enemy.hp = enemy.hp.saturating_sub(1);
        enemy.last_blast = Some(blast_id);
        enemy.invincible_timer = config.enemy_hit_invincibility_secs;
        tracing::debug!(enemy_id = enemy.id, kind = enemy.kind.name(), hp = enemy.hp, blast_id, "Enemy hit");
        if enemy.hp == 0 {
            slain.push((enemy.id, enemy.kind, owner));
        } else {
            events.push(DamageEvent::EnemyHurt {
                kind: enemy.kind,
                hp: enemy.hp,
            });
        }
    }

    for (id, kind, owner) in slain {
        store.enemies.retain(|e| e.id != id);
        let credited = store.player(owner).map(|p| p.id);
        events.push(DamageEvent::EnemyKilled { kind, credited });
    }
    events
}

/// Enemies touching a player apply one hit. Ghost-buffed players are immune
/// to contact.
pub fn apply_contact(store: &mut EntityStore, mode: GameMode, config: &BubbleConfig) -> Vec<DamageEvent> {
    let mut events = Vec::new();
    let enemy_boxes: Vec<_> = store
        .enemies
        .iter()
        .map(|e| e.hitbox(config).inset(config.contact_inset))
        .collect();
    if enemy_boxes.is_empty() {
        return events;
    }

    for player in &mut store.players {
        if player.status != PlayerStatus::Normal || player.is_ghost() {
            continue;
        }
        let body = player.hitbox(config);
        if !enemy_boxes.iter().any(|b| b.overlaps(&body)) {
            continue;
        }
        if let Some(result) = hit_player(player, mode, config) {
            events.push(DamageEvent::PlayerHit {
                player_id: player.id,
                result,
            });
        }
    }
    events
}
