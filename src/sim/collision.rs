//! Collision detection for the frame
//!
//! Everything in the playfield is an axis-aligned box. The resolver runs once
//! per frame after movement, consumes the projectiles and pickups that hit
//! something, and reports what happened as [`CombatEvent`]s for combat to
//! apply. Enemies and the boss are never removed here.

use glam::Vec2;

use super::entities::PowerUpKind;
use super::store::EntityStore;
use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; boxes that only share an edge do not touch
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Whether any part of the box is still on the playfield
    pub fn overlaps_playfield(&self) -> bool {
        self.max.x >= 0.0
            && self.min.x <= PLAYFIELD_WIDTH
            && self.max.y >= 0.0
            && self.min.y <= PLAYFIELD_HEIGHT
    }
}

/// Outcome of one collision pair, to be applied by combat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatEvent {
    /// Summed damage of every bullet that hit this enemy this frame
    EnemyDamaged { enemy_id: u32, damage: i32 },
    /// Summed damage of every bullet that hit the boss this frame
    BossDamaged { damage: i32 },
    /// One unshielded enemy bullet reached the player
    PlayerDamaged,
    /// The player touched a power-up
    PickedUp { kind: PowerUpKind },
}

/// Find every intersection for the frame.
///
/// A bullet is credited to the first enemy it overlaps and is consumed
/// whether or not that enemy survives. Enemy bullets touching the player are
/// consumed even when `shielded`, but then produce no damage.
pub fn resolve(store: &mut EntityStore, shielded: bool) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    let mut consumed = vec![false; store.bullets.len()];

    // Player bullets vs enemies
    for enemy in &store.enemies {
        let target = enemy.bounds();
        let mut damage = 0;
        let mut hit = false;
        for (i, bullet) in store.bullets.iter().enumerate() {
            if !consumed[i] && bullet.bounds().intersects(&target) {
                consumed[i] = true;
                damage += bullet.damage;
                hit = true;
            }
        }
        if hit {
            events.push(CombatEvent::EnemyDamaged {
                enemy_id: enemy.id,
                damage,
            });
        }
    }

    // Player bullets vs boss
    if let Some(boss) = &store.boss {
        let target = boss.bounds();
        let mut damage = 0;
        let mut hit = false;
        for (i, bullet) in store.bullets.iter().enumerate() {
            if !consumed[i] && bullet.bounds().intersects(&target) {
                consumed[i] = true;
                damage += bullet.damage;
                hit = true;
            }
        }
        if hit {
            events.push(CombatEvent::BossDamaged { damage });
        }
    }

    let mut index = 0;
    store.bullets.retain(|_| {
        let keep = !consumed[index];
        index += 1;
        keep
    });

    // Enemy bullets vs player
    let player_box = store.player.bounds();
    let before = store.enemy_bullets.len();
    store
        .enemy_bullets
        .retain(|b| !b.bounds().intersects(&player_box));
    let hits = before - store.enemy_bullets.len();
    if !shielded {
        events.extend(std::iter::repeat_n(CombatEvent::PlayerDamaged, hits));
    }

    // Power-ups vs player
    store.power_ups.retain(|p| {
        if p.bounds().intersects(&player_box) {
            events.push(CombatEvent::PickedUp { kind: p.kind });
            false
        } else {
            true
        }
    });

    events
}
