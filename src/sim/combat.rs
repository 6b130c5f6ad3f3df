//! Combat rules
//!
//! Turns collision events into hp, score, deaths and drops, and runs the
//! hostile fire that feeds the next collision pass.

use super::collision::CombatEvent;
use super::entities::{EnemyBullet, PowerUpKind};
use super::events::{AudioCue, GameEvent};
use super::rng::RandomSource;
use super::store::EntityStore;
use crate::Tuning;
use crate::consts::BOSS_SCORE;

/// Per-frame facts combat needs from the run
#[derive(Debug, Clone, Copy)]
pub struct CombatContext<'a> {
    pub level: u32,
    pub now: u64,
    pub tuning: &'a Tuning,
}

/// What combat decided this frame
#[derive(Debug, Clone, Default)]
pub struct CombatOutcome {
    /// The boss died; the level is complete
    pub boss_defeated: bool,
    /// The final level's boss died
    pub run_won: bool,
    /// Player hp reached zero
    pub player_dead: bool,
    pub cues: Vec<AudioCue>,
    pub events: Vec<GameEvent>,
}

/// Roll for a power-up drop
pub fn roll_drop(rng: &mut impl RandomSource, tuning: &Tuning) -> Option<PowerUpKind> {
    if !rng.chance(tuning.drop_chance) {
        return None;
    }
    Some(PowerUpKind::ALL[rng.pick(PowerUpKind::ALL.len())])
}

/// Apply the frame's collision events in order
pub fn apply(
    store: &mut EntityStore,
    events: &[CombatEvent],
    ctx: CombatContext<'_>,
    rng: &mut impl RandomSource,
) -> CombatOutcome {
    let mut out = CombatOutcome::default();

    for event in events {
        match *event {
            CombatEvent::EnemyDamaged { enemy_id, damage } => {
                if let Some(enemy) = store.enemies.iter_mut().find(|e| e.id == enemy_id) {
                    enemy.hp -= damage;
                }
            }
            CombatEvent::BossDamaged { damage } => {
                let Some(boss) = &mut store.boss else {
                    continue;
                };
                boss.hp -= damage;
                if boss.hp <= 0 {
                    store.boss = None;
                    store.player.score += BOSS_SCORE;
                    out.boss_defeated = true;
                    out.events.push(GameEvent::BossDefeated { level: ctx.level });
                    if ctx.level >= ctx.tuning.num_levels {
                        out.run_won = true;
                    }
                    log::info!("Boss defeated on level {}", ctx.level);
                }
            }
            CombatEvent::PlayerDamaged => {
                if out.player_dead {
                    continue;
                }
                store.player.take_hits(1);
                out.events.push(GameEvent::PlayerDamaged {
                    hp: store.player.hp,
                });
                if !store.player.is_alive() {
                    out.player_dead = true;
                }
            }
            CombatEvent::PickedUp { kind } => {
                if out.player_dead {
                    continue;
                }
                store.player.apply_power_up(kind, ctx.now, ctx.tuning);
                out.cues.push(AudioCue::Powerup);
                out.events.push(GameEvent::PowerUpCollected { kind });
                log::debug!("Picked up {:?}", kind);
            }
        }
    }

    // Kills are settled after all damage so summed hits count once
    let kill_score = 10 * ctx.level as u64;
    for enemy in store.prune_dead() {
        store.player.score += kill_score;
        out.events.push(GameEvent::EnemyKilled {
            enemy_id: enemy.id,
            score: kill_score,
        });
        if let Some(kind) = roll_drop(rng, ctx.tuning) {
            store.spawn_power_up(enemy.pos, kind);
            out.events.push(GameEvent::PowerUpDropped { kind });
        }
    }

    out
}

/// Enemy and boss fire for this frame.
///
/// Enemies roll a per-frame probability scaled by level (and by the frames
/// elapsed); the boss fires on its elapsed-time interval.
pub fn hostile_fire(
    store: &mut EntityStore,
    ctx: CombatContext<'_>,
    frames: f32,
    rng: &mut impl RandomSource,
    cues: &mut Vec<AudioCue>,
) {
    if frames > 0.0 {
        let per_frame = ctx.tuning.enemy_shoot_chance(ctx.level) * ctx.tuning.enemy_fire_scale;
        let p = (per_frame * frames).min(1.0);
        let speed = EnemyBullet::speed_for(ctx.level);
        let muzzles: Vec<_> = store
            .enemies
            .iter()
            .filter_map(|e| rng.chance(p).then(|| e.muzzle()))
            .collect();
        for muzzle in muzzles {
            store.spawn_enemy_bullet(muzzle, speed);
            cues.push(AudioCue::EnemyShoot);
        }
    }

    let Some(boss) = &mut store.boss else {
        return;
    };
    let fan = boss.try_fire(ctx.now);
    if fan.is_empty() {
        return;
    }
    let speed = boss.bullet_speed();
    log::debug!("Boss fires {} bullets", fan.len());
    for muzzle in fan {
        store.spawn_enemy_bullet(muzzle, speed);
    }
    cues.push(AudioCue::BossShoot);
}
