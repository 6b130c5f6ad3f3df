//! Space Adventure - wave-based arcade shooter core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, combat, waves, levels)
//! - `tuning`: Data-driven difficulty constants
//! - `snapshot`: Per-frame render payload handed to the presentation layer
//! - `platform`: Clock/input/render/audio boundary and the frame driver

pub mod platform;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use snapshot::{Hud, RenderFrame, Sprite, SpriteKind};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal update rate the per-frame velocities are expressed in
    pub const FRAME_RATE: f32 = 60.0;
    /// Duration of one nominal frame in milliseconds
    pub const FRAME_MS: f32 = 1000.0 / FRAME_RATE;
    /// Largest step (in frames) a single tick may advance, to survive stalls
    pub const MAX_FRAME_STEP: f32 = 4.0;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 1280.0;
    pub const PLAYFIELD_HEIGHT: f32 = 720.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 64.0;
    pub const PLAYER_MAX_HP: u8 = 5;
    pub const PLAYER_MOVE_SPEED: f32 = 6.0;
    /// Distance of the player's center above the bottom edge at run start
    pub const PLAYER_START_OFFSET: f32 = 80.0;
    /// Where the ship's center starts its fly-in, above the top edge
    pub const PLAYER_ENTRY_Y: f32 = -120.0;
    pub const PLAYER_ENTRY_SPEED: f32 = 5.0;
    pub const BULLET_SPEED: f32 = -12.0;
    pub const FAST_BULLET_SPEED: f32 = -20.0;
    /// Horizontal offset of each barrel in double-shot mode
    pub const DOUBLE_SHOT_OFFSET: f32 = 18.0;

    /// Burst fan
    pub const BURST_ANGLES_DEG: [f32; 5] = [-30.0, -15.0, 0.0, 15.0, 30.0];
    pub const BURST_SPEED: f32 = 10.0;
    pub const BURST_MUZZLE_LIFT: f32 = 6.0;

    /// Projectile and pickup sizes
    pub const BULLET_WIDTH: f32 = 8.0;
    pub const BULLET_HEIGHT: f32 = 18.0;
    pub const ENEMY_BULLET_WIDTH: f32 = 8.0;
    pub const ENEMY_BULLET_HEIGHT: f32 = 14.0;
    pub const POWER_UP_SIZE: f32 = 36.0;
    pub const POWER_UP_FALL_SPEED: f32 = 2.0;

    /// Enemy layout
    pub const ENEMY_SIZE: f32 = 56.0;
    pub const WAVE_MARGIN_X: f32 = 80.0;
    pub const WAVE_MIN_SPACING: f32 = 80.0;
    pub const WAVE_TOP_Y: f32 = 60.0;
    pub const WAVE_ROW_HEIGHT: f32 = 68.0;
    /// Vertical step an enemy takes each time it bounces off a side wall
    pub const ENEMY_DESCENT_STEP: f32 = 18.0;
    /// Fraction of eligible wave slots that become flyers
    pub const FLYING_CHANCE: f32 = 0.6;

    /// Boss
    pub const BOSS_SIZE: f32 = 260.0;
    pub const BOSS_SPAWN_Y: f32 = 140.0;
    pub const BOSS_FAN_STEP: f32 = 25.0;
    pub const BOSS_SCORE: u64 = 500;
}

/// Velocity of a projectile fired `angle_deg` degrees off straight-up.
///
/// Positive angles lean right; the vertical component always points up the
/// playfield (negative y).
#[inline]
pub fn fan_velocity(angle_deg: f32, speed: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(speed * rad.sin(), -speed * rad.cos())
}

/// Number of nominal frames covered by `elapsed_ms`, clamped to the catch-up limit.
#[inline]
pub fn frames_for(elapsed_ms: u64) -> f32 {
    (elapsed_ms as f32 / consts::FRAME_MS).min(consts::MAX_FRAME_STEP)
}
