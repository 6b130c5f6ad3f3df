//! Entity records and their per-kind advance rules
//!
//! Entities are plain data. Each kind has an `advance(frames) -> bool`
//! returning whether it is still inside the playfield; everything else that
//! destroys an entity (damage, pickup) is decided by combat.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::Tuning;
use crate::consts::*;
use crate::fan_velocity;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    /// Two-barrel spread shot
    Double,
    /// +1 hp, instantaneous
    Heal,
    /// Faster player bullets
    Fast,
    /// Immunity to enemy bullets
    Shield,
    /// Automatic five-bullet fan
    Burst,
}

impl PowerUpKind {
    /// Drop pool, in roll order
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Double,
        PowerUpKind::Heal,
        PowerUpKind::Fast,
        PowerUpKind::Shield,
        PowerUpKind::Burst,
    ];
}

/// Visual tag carried by player bullets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletTint {
    Standard,
    Burst,
}

/// Expiry instants (simulation ms) of the timed power-ups.
///
/// `None` means the effect is at baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTimers {
    pub double_until: Option<u64>,
    pub fast_until: Option<u64>,
    pub shield_until: Option<u64>,
    pub burst_until: Option<u64>,
}

impl PowerUpTimers {
    fn slot(&self, kind: PowerUpKind) -> Option<u64> {
        match kind {
            PowerUpKind::Double => self.double_until,
            PowerUpKind::Fast => self.fast_until,
            PowerUpKind::Shield => self.shield_until,
            PowerUpKind::Burst => self.burst_until,
            PowerUpKind::Heal => None,
        }
    }

    /// Whether `kind` is running at `now`
    pub fn is_active(&self, kind: PowerUpKind, now: u64) -> bool {
        self.slot(kind).is_some_and(|until| now < until)
    }

    /// Drop every timer that has elapsed by `now`
    pub fn expire(&mut self, now: u64) {
        for slot in [
            &mut self.double_until,
            &mut self.fast_until,
            &mut self.shield_until,
            &mut self.burst_until,
        ] {
            if slot.is_some_and(|until| now >= until) {
                *slot = None;
            }
        }
    }
}

/// A projectile the player is about to fire
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotSpec {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub tint: BulletTint,
}

/// Directional intents applied to the player this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Steering {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Center position
    pub pos: Vec2,
    pub hp: u8,
    pub score: u64,
    /// Damage carried by each bullet
    pub damage: i32,
    pub timers: PowerUpTimers,
    /// Time of the last manual shot
    pub last_shot: Option<u64>,
    /// Time of the last burst volley (`None` fires on the next frame)
    pub burst_last_shot: Option<u64>,
    /// Flying in from above the playfield; no steering or firing until landed
    #[serde(default)]
    pub entering: bool,
}

impl Player {
    pub fn new(damage: i32) -> Self {
        Self {
            pos: Vec2::new(PLAYFIELD_WIDTH / 2.0, Self::post_y()),
            hp: PLAYER_MAX_HP,
            score: 0,
            damage,
            timers: PowerUpTimers::default(),
            last_shot: None,
            burst_last_shot: None,
            entering: false,
        }
    }

    /// A ship that starts above the playfield and flies down to its post
    pub fn arriving(damage: i32) -> Self {
        Self {
            pos: Vec2::new(PLAYFIELD_WIDTH / 2.0, PLAYER_ENTRY_Y),
            entering: true,
            ..Self::new(damage)
        }
    }

    /// Resting height at the end of the fly-in
    fn post_y() -> f32 {
        PLAYFIELD_HEIGHT - PLAYER_START_OFFSET
    }

    /// Finish the fly-in at the ship's post
    pub fn land(&mut self) {
        self.pos.y = Self::post_y();
        self.entering = false;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(PLAYER_SIZE))
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn has_shield(&self, now: u64) -> bool {
        self.timers.is_active(PowerUpKind::Shield, now)
    }

    pub fn burst_active(&self, now: u64) -> bool {
        self.timers.is_active(PowerUpKind::Burst, now)
    }

    /// Vertical speed of manual shots at `now`
    pub fn bullet_speed(&self, now: u64) -> f32 {
        if self.timers.is_active(PowerUpKind::Fast, now) {
            FAST_BULLET_SPEED
        } else {
            BULLET_SPEED
        }
    }

    /// Move by the held directions, staying fully inside the playfield.
    /// During the fly-in the ship ignores steering and keeps descending.
    pub fn steer(&mut self, steering: Steering, frames: f32) {
        if self.entering {
            self.pos.y += PLAYER_ENTRY_SPEED * frames;
            if self.pos.y >= Self::post_y() {
                self.land();
            }
            return;
        }
        let mut dir = Vec2::ZERO;
        if steering.left {
            dir.x -= 1.0;
        }
        if steering.right {
            dir.x += 1.0;
        }
        if steering.up {
            dir.y -= 1.0;
        }
        if steering.down {
            dir.y += 1.0;
        }
        let half = PLAYER_SIZE / 2.0;
        self.pos += dir * PLAYER_MOVE_SPEED * frames;
        self.pos.x = self.pos.x.clamp(half, PLAYFIELD_WIDTH - half);
        self.pos.y = self.pos.y.clamp(half, PLAYFIELD_HEIGHT - half);
    }

    /// Fire a manual shot if the cooldown allows it
    pub fn try_shoot(&mut self, now: u64, tuning: &Tuning) -> Vec<ShotSpec> {
        if self.entering {
            return Vec::new();
        }
        if self
            .last_shot
            .is_some_and(|last| now.saturating_sub(last) < tuning.shoot_cooldown_ms)
        {
            return Vec::new();
        }
        self.last_shot = Some(now);

        let muzzle_y = self.pos.y - PLAYER_SIZE / 2.0;
        let vel = Vec2::new(0.0, self.bullet_speed(now));
        let shot = |x: f32| ShotSpec {
            pos: Vec2::new(x, muzzle_y),
            vel,
            damage: self.damage,
            tint: BulletTint::Standard,
        };
        if self.timers.is_active(PowerUpKind::Double, now) {
            vec![
                shot(self.pos.x - DOUBLE_SHOT_OFFSET),
                shot(self.pos.x + DOUBLE_SHOT_OFFSET),
            ]
        } else {
            vec![shot(self.pos.x)]
        }
    }

    /// Fire the burst fan if burst mode is running and its interval has passed
    pub fn burst_volley(&mut self, now: u64, tuning: &Tuning) -> Vec<ShotSpec> {
        if self.entering || !self.burst_active(now) {
            return Vec::new();
        }
        if self
            .burst_last_shot
            .is_some_and(|last| now.saturating_sub(last) < tuning.burst_interval_ms)
        {
            return Vec::new();
        }
        self.burst_last_shot = Some(now);

        let origin = Vec2::new(
            self.pos.x,
            self.pos.y - PLAYER_SIZE / 2.0 - BURST_MUZZLE_LIFT,
        );
        BURST_ANGLES_DEG
            .iter()
            .map(|&angle| ShotSpec {
                pos: origin,
                vel: fan_velocity(angle, BURST_SPEED),
                damage: self.damage,
                tint: BulletTint::Burst,
            })
            .collect()
    }

    /// Apply a collected power-up. Timed effects restart on re-pickup.
    pub fn apply_power_up(&mut self, kind: PowerUpKind, now: u64, tuning: &Tuning) {
        match kind {
            PowerUpKind::Double => {
                self.timers.double_until = Some(now + tuning.power_up_duration_ms);
            }
            PowerUpKind::Heal => {
                self.hp = (self.hp + 1).min(PLAYER_MAX_HP);
            }
            PowerUpKind::Fast => {
                self.timers.fast_until = Some(now + tuning.power_up_duration_ms);
            }
            PowerUpKind::Shield => {
                self.timers.shield_until = Some(now + tuning.power_up_duration_ms);
            }
            PowerUpKind::Burst => {
                self.timers.burst_until = Some(now + tuning.burst_duration_ms);
                self.burst_last_shot = None;
            }
        }
    }

    /// Lose `hits` hp, saturating at zero
    pub fn take_hits(&mut self, hits: u32) {
        let hits = hits.min(u8::MAX as u32) as u8;
        self.hp = self.hp.saturating_sub(hits);
    }
}

/// A wave enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    /// Horizontal velocity (units per frame)
    pub vel_x: f32,
    pub hp: i32,
    pub flying: bool,
}

impl Enemy {
    /// Hit points for an enemy spawned on `level`
    pub fn hp_for(level: u32, flying: bool) -> i32 {
        1 + flying as i32 + (level / 3) as i32
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(ENEMY_SIZE))
    }

    /// Where this enemy's bullets leave from
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y + ENEMY_SIZE / 2.0)
    }

    /// Patrol sideways, stepping down on each wall bounce
    pub fn advance(&mut self, frames: f32) -> bool {
        if frames <= 0.0 {
            return true;
        }
        self.pos.x += self.vel_x * frames;
        let half = ENEMY_SIZE / 2.0;
        let at_left = self.pos.x - half <= 0.0 && self.vel_x < 0.0;
        let at_right = self.pos.x + half >= PLAYFIELD_WIDTH && self.vel_x > 0.0;
        if at_left || at_right {
            self.vel_x = -self.vel_x;
            self.pos.y += ENEMY_DESCENT_STEP;
        }
        debug_assert!(self.pos.is_finite());
        self.bounds().min.y <= PLAYFIELD_HEIGHT
    }
}

/// The milestone-level boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub level: u32,
    /// Horizontal direction, +1 or -1
    pub direction: f32,
    pub speed: f32,
    pub fire_interval_ms: u64,
    pub last_shot: u64,
}

impl Boss {
    pub fn new(id: u32, level: u32, now: u64) -> Self {
        let hp = 80 + level as i32 * 40;
        Self {
            id,
            pos: Vec2::new(PLAYFIELD_WIDTH / 2.0, BOSS_SPAWN_Y),
            hp,
            max_hp: hp,
            level,
            direction: 1.0,
            speed: (2 + level / 2) as f32,
            fire_interval_ms: 1200u64.saturating_sub(level.saturating_sub(1) as u64 * 100).max(400),
            last_shot: now,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(BOSS_SIZE))
    }

    pub fn advance(&mut self, frames: f32) {
        if frames <= 0.0 {
            return;
        }
        self.pos.x += self.speed * self.direction * frames;
        let half = BOSS_SIZE / 2.0;
        if (self.pos.x - half <= 0.0 && self.direction < 0.0)
            || (self.pos.x + half >= PLAYFIELD_WIDTH && self.direction > 0.0)
        {
            self.direction = -self.direction;
        }
        debug_assert!(self.pos.is_finite());
    }

    /// Fan fire on the elapsed-time interval. Returns muzzle positions.
    pub fn try_fire(&mut self, now: u64) -> Vec<Vec2> {
        if now.saturating_sub(self.last_shot) < self.fire_interval_ms {
            return Vec::new();
        }
        self.last_shot = now;
        let spread = self.level as i32;
        let bottom = self.pos.y + BOSS_SIZE / 2.0;
        (-spread..=spread)
            .map(|i| Vec2::new(self.pos.x + i as f32 * BOSS_FAN_STEP, bottom))
            .collect()
    }

    pub fn bullet_speed(&self) -> f32 {
        (6 + self.level / 2) as f32
    }
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub tint: BulletTint,
}

impl PlayerBullet {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::new(BULLET_WIDTH, BULLET_HEIGHT))
    }

    pub fn advance(&mut self, frames: f32) -> bool {
        self.pos += self.vel * frames;
        debug_assert!(self.pos.is_finite());
        self.bounds().overlaps_playfield()
    }
}

/// A projectile fired by an enemy or the boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub id: u32,
    pub pos: Vec2,
    /// Downward speed (units per frame)
    pub speed: f32,
}

impl EnemyBullet {
    /// Speed of regular enemy bullets on `level`
    pub fn speed_for(level: u32) -> f32 {
        (5 + level / 3) as f32
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::new(ENEMY_BULLET_WIDTH, ENEMY_BULLET_HEIGHT))
    }

    pub fn advance(&mut self, frames: f32) -> bool {
        self.pos.y += self.speed * frames;
        debug_assert!(self.pos.is_finite());
        self.bounds().overlaps_playfield()
    }
}

/// A falling power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub fall_speed: f32,
}

impl PowerUp {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(POWER_UP_SIZE))
    }

    pub fn advance(&mut self, frames: f32) -> bool {
        self.pos.y += self.fall_speed * frames;
        debug_assert!(self.pos.is_finite());
        self.bounds().min.y <= PLAYFIELD_HEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u64 = 5_000;

    #[test]
    fn test_double_shot_then_expiry() {
        let tuning = Tuning::default();
        let mut player = Player::new(3);
        player.apply_power_up(PowerUpKind::Double, T, &tuning);

        let shots = player.try_shoot(T + 50, &tuning);
        assert_eq!(shots.len(), 2);
        assert_eq!(shots[0].pos.x, player.pos.x - 18.0);
        assert_eq!(shots[1].pos.x, player.pos.x + 18.0);
        assert!(shots.iter().all(|s| s.damage == 3));

        let shots = player.try_shoot(T + 10_050, &tuning);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].pos.x, player.pos.x);
    }

    #[test]
    fn test_shoot_cooldown() {
        let tuning = Tuning::default();
        let mut player = Player::new(1);
        assert_eq!(player.try_shoot(100, &tuning).len(), 1);
        assert!(player.try_shoot(399, &tuning).is_empty());
        assert_eq!(player.try_shoot(400, &tuning).len(), 1);
    }

    #[test]
    fn test_fast_reverts_to_baseline() {
        let tuning = Tuning::default();
        let mut player = Player::new(1);
        player.apply_power_up(PowerUpKind::Fast, T, &tuning);
        assert_eq!(player.bullet_speed(T + 1), FAST_BULLET_SPEED);
        assert_eq!(player.bullet_speed(T + 10_000), BULLET_SPEED);
        player.timers.expire(T + 10_000);
        assert_eq!(player.timers.fast_until, None);
    }

    #[test]
    fn test_repickup_restarts_timer() {
        let tuning = Tuning::default();
        let mut player = Player::new(1);
        player.apply_power_up(PowerUpKind::Shield, T, &tuning);
        player.apply_power_up(PowerUpKind::Shield, T + 8_000, &tuning);
        assert!(player.has_shield(T + 12_000));
        assert!(!player.has_shield(T + 18_000));
    }

    #[test]
    fn test_heal_is_capped() {
        let tuning = Tuning::default();
        let mut player = Player::new(1);
        player.apply_power_up(PowerUpKind::Heal, T, &tuning);
        assert_eq!(player.hp, PLAYER_MAX_HP);
        player.take_hits(2);
        player.apply_power_up(PowerUpKind::Heal, T, &tuning);
        assert_eq!(player.hp, PLAYER_MAX_HP - 1);
    }

    #[test]
    fn test_burst_fan_and_interval() {
        let tuning = Tuning::default();
        let mut player = Player::new(2);
        assert!(player.burst_volley(T, &tuning).is_empty());

        player.apply_power_up(PowerUpKind::Burst, T, &tuning);
        let fan = player.burst_volley(T, &tuning);
        assert_eq!(fan.len(), 5);
        assert!(fan.iter().all(|s| s.tint == BulletTint::Burst && s.damage == 2));
        assert!(fan[2].vel.x.abs() < 1e-5);
        assert!(fan[0].vel.x < 0.0 && fan[4].vel.x > 0.0);

        assert!(player.burst_volley(T + 299, &tuning).is_empty());
        assert_eq!(player.burst_volley(T + 300, &tuning).len(), 5);
        assert!(player.burst_volley(T + 10_000, &tuning).is_empty());
    }

    #[test]
    fn test_steer_clamps_to_playfield() {
        let mut player = Player::new(1);
        player.steer(Steering { right: true, ..Default::default() }, 1.0);
        assert_eq!(player.pos.x, PLAYFIELD_WIDTH / 2.0 + PLAYER_MOVE_SPEED);
        for _ in 0..500 {
            player.steer(Steering { left: true, down: true, ..Default::default() }, 1.0);
        }
        assert_eq!(player.pos.x, PLAYER_SIZE / 2.0);
        assert_eq!(player.pos.y, PLAYFIELD_HEIGHT - PLAYER_SIZE / 2.0);
    }

    #[test]
    fn test_enemy_bounces_and_descends() {
        let mut enemy = Enemy {
            id: 1,
            pos: Vec2::new(PLAYFIELD_WIDTH - ENEMY_SIZE / 2.0 - 0.5, 100.0),
            vel_x: 1.0,
            hp: 1,
            flying: false,
        };
        assert!(enemy.advance(1.0));
        assert_eq!(enemy.vel_x, -1.0);
        assert_eq!(enemy.pos.y, 100.0 + ENEMY_DESCENT_STEP);
    }

    #[test]
    fn test_enemy_zero_frames_is_inert() {
        let mut enemy = Enemy {
            id: 1,
            pos: Vec2::new(ENEMY_SIZE / 2.0, 100.0),
            vel_x: -1.0,
            hp: 1,
            flying: false,
        };
        assert!(enemy.advance(0.0));
        assert_eq!(enemy.pos, Vec2::new(ENEMY_SIZE / 2.0, 100.0));
        assert_eq!(enemy.vel_x, -1.0);
    }

    #[test]
    fn test_fly_in_blocks_firing_until_landed() {
        let tuning = Tuning::default();
        let mut player = Player::arriving(1);
        assert_eq!(player.pos.y, PLAYER_ENTRY_Y);
        assert!(player.try_shoot(T, &tuning).is_empty());

        // Steering is ignored on the way down
        player.steer(Steering { left: true, ..Default::default() }, 2.0);
        assert_eq!(player.pos, Vec2::new(PLAYFIELD_WIDTH / 2.0, PLAYER_ENTRY_Y + 10.0));
        assert!(player.entering);

        for _ in 0..200 {
            player.steer(Steering::default(), 1.0);
        }
        assert!(!player.entering);
        assert_eq!(player.pos.y, PLAYFIELD_HEIGHT - PLAYER_START_OFFSET);
        assert_eq!(player.try_shoot(T, &tuning).len(), 1);
    }

    #[test]
    fn test_enemy_leaves_past_bottom_edge() {
        let mut enemy = Enemy {
            id: 1,
            pos: Vec2::new(600.0, PLAYFIELD_HEIGHT + ENEMY_SIZE / 2.0 - 1.0),
            vel_x: 1.0,
            hp: 1,
            flying: false,
        };
        // Top edge still on the field
        assert!(enemy.advance(1.0));
        enemy.pos.y = PLAYFIELD_HEIGHT + ENEMY_SIZE / 2.0 + 1.0;
        assert!(!enemy.advance(1.0));
    }

    #[test]
    fn test_enemy_hp_by_level() {
        assert_eq!(Enemy::hp_for(1, false), 1);
        assert_eq!(Enemy::hp_for(1, true), 2);
        assert_eq!(Enemy::hp_for(6, true), 4);
    }

    #[test]
    fn test_boss_fire_interval_and_fan() {
        let mut boss = Boss::new(1, 5, 1_000);
        assert_eq!(boss.hp, 280);
        assert_eq!(boss.fire_interval_ms, 800);
        assert!(boss.try_fire(1_799).is_empty());
        let fan = boss.try_fire(1_800);
        assert_eq!(fan.len(), 11);
        assert_eq!(fan[0].x, boss.pos.x - 125.0);
        assert!(boss.try_fire(1_801).is_empty());

        let late = Boss::new(2, 10, 0);
        assert_eq!(late.fire_interval_ms, 400);
    }

    #[test]
    fn test_bullets_leave_playfield() {
        let mut bullet = PlayerBullet {
            id: 1,
            pos: Vec2::new(100.0, 5.0),
            vel: Vec2::new(0.0, BULLET_SPEED),
            damage: 1,
            tint: BulletTint::Standard,
        };
        assert!(!bullet.advance(2.0));

        let mut shot = EnemyBullet {
            id: 2,
            pos: Vec2::new(100.0, PLAYFIELD_HEIGHT - 1.0),
            speed: 10.0,
        };
        assert!(!shot.advance(1.0));
    }
}
