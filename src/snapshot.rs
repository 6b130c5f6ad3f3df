//! Per-frame render payload
//!
//! Built once the frame has settled and handed to the render sink. It is a
//! plain copy of what the presentation layer needs; nothing in it feeds back
//! into the simulation.

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::sim::entities::{BulletTint, PowerUpKind};
use crate::sim::store::EntityStore;

/// What a sprite depicts, with its visual-state tags
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpriteKind {
    Player { shield_active: bool, burst_active: bool },
    Enemy { flying: bool },
    Boss { hp: i32, max_hp: i32 },
    PlayerBullet { tint: BulletTint },
    EnemyBullet,
    PowerUp { power_up: PowerUpKind },
}

/// One live entity to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sprite {
    /// Entity id (0 for the player)
    pub id: u32,
    #[serde(flatten)]
    pub kind: SpriteKind,
    /// Center position
    pub pos: Vec2,
    pub size: Vec2,
}

/// HUD scalars
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hud {
    pub level: u32,
    pub num_levels: u32,
    pub lives: u8,
    pub score: u64,
    pub completed_waves: u32,
    pub total_waves: u32,
    /// Whole seconds (rounded up) until the next wave, while waiting
    pub next_wave_in_secs: Option<u64>,
    /// Boss hp while a boss is alive
    pub boss_hp: Option<i32>,
    pub shield_active: bool,
    pub burst_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderFrame {
    pub sprites: Vec<Sprite>,
    pub hud: Hud,
}

/// Copy the store into a render frame. Sprites are ordered player, boss,
/// enemies, player bullets, enemy bullets, power-ups.
pub fn build_render_frame(store: &EntityStore, hud: Hud, now: u64) -> RenderFrame {
    let mut sprites = Vec::with_capacity(store.entity_count());

    let player = &store.player;
    sprites.push(Sprite {
        id: 0,
        kind: SpriteKind::Player {
            shield_active: player.has_shield(now),
            burst_active: player.burst_active(now),
        },
        pos: player.pos,
        size: Vec2::splat(PLAYER_SIZE),
    });

    if let Some(boss) = &store.boss {
        sprites.push(Sprite {
            id: boss.id,
            kind: SpriteKind::Boss {
                hp: boss.hp,
                max_hp: boss.max_hp,
            },
            pos: boss.pos,
            size: Vec2::splat(BOSS_SIZE),
        });
    }

    sprites.extend(store.enemies.iter().map(|e| Sprite {
        id: e.id,
        kind: SpriteKind::Enemy { flying: e.flying },
        pos: e.pos,
        size: Vec2::splat(ENEMY_SIZE),
    }));
    sprites.extend(store.bullets.iter().map(|b| Sprite {
        id: b.id,
        kind: SpriteKind::PlayerBullet { tint: b.tint },
        pos: b.pos,
        size: Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
    }));
    sprites.extend(store.enemy_bullets.iter().map(|b| Sprite {
        id: b.id,
        kind: SpriteKind::EnemyBullet,
        pos: b.pos,
        size: Vec2::new(ENEMY_BULLET_WIDTH, ENEMY_BULLET_HEIGHT),
    }));
    sprites.extend(store.power_ups.iter().map(|p| Sprite {
        id: p.id,
        kind: SpriteKind::PowerUp { power_up: p.kind },
        pos: p.pos,
        size: Vec2::splat(POWER_UP_SIZE),
    }));

    RenderFrame { sprites, hud }
}
