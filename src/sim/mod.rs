//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One clock sample per tick, supplied by the caller
//! - Injected random source only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod combat;
pub mod entities;
pub mod events;
pub mod rng;
pub mod run;
pub mod store;
pub mod waves;

pub use collision::{Aabb, CombatEvent, resolve};
pub use entities::{
    Boss, BulletTint, Enemy, EnemyBullet, Player, PlayerBullet, PowerUp, PowerUpKind,
    PowerUpTimers,
};
pub use events::{AudioCue, GameEvent};
pub use rng::{FixedRandom, RandomSource, seeded};
pub use run::{FrameReport, RunController, RunStatus, RunSummary, TickInput};
pub use store::EntityStore;
pub use waves::{WaveScheduler, WaveState};
