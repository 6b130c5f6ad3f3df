//! Events emitted by the simulation for audio and the presentation layer.
//!
//! The core never waits on these; they are collected during a frame and
//! handed out once the frame has settled.

use serde::{Deserialize, Serialize};

use super::entities::PowerUpKind;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    /// Player fired a manual shot
    Shoot,
    /// An enemy fired
    EnemyShoot,
    /// The boss fired a fan
    BossShoot,
    /// Power-up collected
    Powerup,
}

impl AudioCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCue::Shoot => "shoot",
            AudioCue::EnemyShoot => "enemy_shoot",
            AudioCue::BossShoot => "boss_shoot",
            AudioCue::Powerup => "powerup",
        }
    }
}

/// Gameplay milestones that happened during a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    LevelStarted { level: u32 },
    WaveSpawned { level: u32, wave: u32, enemies: u32 },
    BossSpawned { level: u32, hp: i32 },
    EnemyKilled { enemy_id: u32, score: u64 },
    BossDefeated { level: u32 },
    PowerUpDropped { kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind },
    PlayerDamaged { hp: u8 },
    LevelComplete { level: u32 },
    RunWon { score: u64 },
    RunLost { level: u32, score: u64 },
}
