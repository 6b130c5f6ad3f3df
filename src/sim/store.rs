//! Entity store
//!
//! Owns every live game object, one collection per kind. Cross-kind
//! relationships are never stored; the collision pass rediscovers them each
//! frame. Collections stay in spawn (id) order so iteration is deterministic.

use glam::Vec2;

use super::entities::{
    Boss, Enemy, EnemyBullet, Player, PlayerBullet, PowerUp, PowerUpKind, ShotSpec,
};
use super::rng::RandomSource;
use crate::consts::*;

#[derive(Debug, Clone)]
pub struct EntityStore {
    /// Persists across levels
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// At most one boss is ever alive
    pub boss: Option<Boss>,
    pub bullets: Vec<PlayerBullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub power_ups: Vec<PowerUp>,
    next_id: u32,
}

impl EntityStore {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            enemies: Vec::new(),
            boss: None,
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            power_ups: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Drop every non-player entity (level transition)
    pub fn reset_level(&mut self) {
        self.enemies.clear();
        self.boss = None;
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.power_ups.clear();
    }

    pub fn boss_alive(&self) -> bool {
        self.boss.is_some()
    }

    /// Every live entity, player included
    pub fn entity_count(&self) -> usize {
        1 + self.enemies.len()
            + self.boss_alive() as usize
            + self.bullets.len()
            + self.enemy_bullets.len()
            + self.power_ups.len()
    }

    /// Lay out a wave of `quantity` enemies across the top of the playfield.
    ///
    /// Slots are evenly spaced from the left margin and banded into three
    /// rows; every third slot is eligible to be a flyer. Returns the number
    /// spawned.
    pub fn spawn_wave(
        &mut self,
        level: u32,
        quantity: u32,
        speed: f32,
        rng: &mut impl RandomSource,
    ) -> u32 {
        if quantity == 0 {
            log::error!("spawn_wave called with zero quantity on level {level}; ignoring");
            return 0;
        }
        let spacing = ((PLAYFIELD_WIDTH - 2.0 * WAVE_MARGIN_X) / quantity as f32)
            .floor()
            .max(WAVE_MIN_SPACING);
        let half = ENEMY_SIZE / 2.0;
        for i in 0..quantity {
            let left = WAVE_MARGIN_X + i as f32 * spacing;
            let top = WAVE_TOP_Y + (i % 3) as f32 * WAVE_ROW_HEIGHT;
            let flying = i % 3 == 0 && rng.chance(FLYING_CHANCE);
            let direction = if rng.chance(0.5) { -1.0 } else { 1.0 };
            let id = self.next_entity_id();
            self.enemies.push(Enemy {
                id,
                pos: Vec2::new(left + half, top + half),
                vel_x: direction * speed,
                hp: Enemy::hp_for(level, flying),
                flying,
            });
        }
        quantity
    }

    /// Spawn the level boss. Refuses (returns false) if one is already alive.
    pub fn spawn_boss(&mut self, level: u32, now: u64) -> bool {
        if self.boss.is_some() {
            log::error!("boss spawn requested while a boss is alive; ignoring");
            return false;
        }
        let id = self.next_entity_id();
        self.boss = Some(Boss::new(id, level, now));
        true
    }

    pub fn spawn_shots(&mut self, shots: Vec<ShotSpec>) {
        for shot in shots {
            let id = self.next_entity_id();
            self.bullets.push(PlayerBullet {
                id,
                pos: shot.pos,
                vel: shot.vel,
                damage: shot.damage,
                tint: shot.tint,
            });
        }
    }

    pub fn spawn_enemy_bullet(&mut self, pos: Vec2, speed: f32) {
        let id = self.next_entity_id();
        self.enemy_bullets.push(EnemyBullet { id, pos, speed });
    }

    pub fn spawn_power_up(&mut self, pos: Vec2, kind: PowerUpKind) {
        let id = self.next_entity_id();
        self.power_ups.push(PowerUp {
            id,
            pos,
            kind,
            fall_speed: POWER_UP_FALL_SPEED,
        });
    }

    /// Advance every non-player entity by `frames` and prune the ones that
    /// left the playfield.
    pub fn advance(&mut self, frames: f32) {
        self.enemies.retain_mut(|e| e.advance(frames));
        if let Some(boss) = &mut self.boss {
            boss.advance(frames);
        }
        self.bullets.retain_mut(|b| b.advance(frames));
        self.enemy_bullets.retain_mut(|b| b.advance(frames));
        self.power_ups.retain_mut(|p| p.advance(frames));
    }

    /// Remove enemies whose hp has run out
    pub fn prune_dead(&mut self) -> Vec<Enemy> {
        let (dead, alive): (Vec<Enemy>, Vec<Enemy>) =
            self.enemies.drain(..).partition(|e| e.hp <= 0);
        self.enemies = alive;
        dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::FixedRandom;

    #[test]
    fn test_wave_layout() {
        let mut store = EntityStore::new(Player::new(1));
        // Every draw below 0.6: all eligible slots fly, all head left
        let mut rng = FixedRandom::constant(0.1);
        assert_eq!(store.spawn_wave(1, 6, 1.0, &mut rng), 6);
        assert_eq!(store.enemies.len(), 6);

        let spacing = ((PLAYFIELD_WIDTH - 160.0) / 6.0).floor();
        for (i, e) in store.enemies.iter().enumerate() {
            let left = e.pos.x - ENEMY_SIZE / 2.0;
            let top = e.pos.y - ENEMY_SIZE / 2.0;
            assert_eq!(left, 80.0 + i as f32 * spacing);
            assert_eq!(top, 60.0 + (i % 3) as f32 * 68.0);
            assert_eq!(e.flying, i % 3 == 0);
            assert_eq!(e.hp, if e.flying { 2 } else { 1 });
            assert_eq!(e.vel_x, -1.0);
        }
    }

    #[test]
    fn test_wave_spacing_floor() {
        let mut store = EntityStore::new(Player::new(1));
        let mut rng = FixedRandom::constant(0.9);
        store.spawn_wave(10, 30, 4.0, &mut rng);
        assert!(store.enemies.iter().all(|e| !e.flying));
        let dx = store.enemies[1].pos.x - store.enemies[0].pos.x;
        assert_eq!(dx, WAVE_MIN_SPACING);
        assert_eq!(store.enemies[0].vel_x, 4.0);
    }

    #[test]
    fn test_zero_quantity_is_noop() {
        let mut store = EntityStore::new(Player::new(1));
        let mut rng = FixedRandom::constant(0.1);
        assert_eq!(store.spawn_wave(1, 0, 1.0, &mut rng), 0);
        assert!(store.enemies.is_empty());
    }

    #[test]
    fn test_single_boss() {
        let mut store = EntityStore::new(Player::new(1));
        assert!(store.spawn_boss(5, 0));
        assert!(!store.spawn_boss(5, 0));
        assert!(store.boss_alive());
    }

    #[test]
    fn test_advance_prunes_offscreen() {
        let mut store = EntityStore::new(Player::new(1));
        store.spawn_enemy_bullet(Vec2::new(100.0, PLAYFIELD_HEIGHT + 20.0), 5.0);
        store.spawn_enemy_bullet(Vec2::new(100.0, 100.0), 5.0);
        store.spawn_power_up(Vec2::new(100.0, PLAYFIELD_HEIGHT + 30.0), PowerUpKind::Heal);
        store.advance(1.0);
        assert_eq!(store.enemy_bullets.len(), 1);
        assert!(store.power_ups.is_empty());
    }

    #[test]
    fn test_reset_keeps_player() {
        let mut store = EntityStore::new(Player::new(1));
        store.player.score = 40;
        let mut rng = FixedRandom::constant(0.1);
        store.spawn_wave(1, 3, 1.0, &mut rng);
        store.spawn_boss(5, 0);
        store.reset_level();
        assert_eq!(store.entity_count(), 1);
        assert_eq!(store.player.score, 40);
    }

    #[test]
    fn test_prune_dead() {
        let mut store = EntityStore::new(Player::new(1));
        let mut rng = FixedRandom::constant(0.9);
        store.spawn_wave(1, 3, 1.0, &mut rng);
        store.enemies[1].hp = 0;
        let dead = store.prune_dead();
        assert_eq!(dead.len(), 1);
        assert_eq!(store.enemies.len(), 2);
    }
}
