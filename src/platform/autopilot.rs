//! Demo-mode input: the ship plays itself.
//!
//! Reads only the presented frame, like a human would. Used by the headless
//! runner and handy for soak-testing the simulation.

use crate::consts::*;
use crate::sim::TickInput;
use crate::snapshot::{RenderFrame, SpriteKind};

use super::InputProvider;

/// Horizontal band around the ship where incoming bullets count as a threat
const DODGE_HALF_WIDTH: f32 = 48.0;
/// How far above the ship the autopilot looks for incoming bullets
const DODGE_LOOKAHEAD: f32 = 220.0;
/// Dead zone when lining up with a target
const AIM_TOLERANCE: f32 = 8.0;
/// Power-ups this close (vertically) are worth chasing
const PICKUP_RANGE: f32 = 260.0;

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    /// Frames polled so far; after `quit_after` the run is aborted
    polls: u64,
    quit_after: Option<u64>,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a quit once `frames` frames have been played
    pub fn quitting_after(frames: u64) -> Self {
        Self {
            polls: 0,
            quit_after: Some(frames),
        }
    }

    /// X coordinate worth lining up under, if any
    fn target_x(frame: &RenderFrame, ship_y: f32) -> Option<f32> {
        let mut pickup = None;
        let mut boss = None;
        let mut lowest_enemy: Option<(f32, f32)> = None;
        for sprite in &frame.sprites {
            match sprite.kind {
                SpriteKind::PowerUp { .. } if ship_y - sprite.pos.y < PICKUP_RANGE => {
                    pickup = Some(sprite.pos.x);
                }
                SpriteKind::Boss { .. } => boss = Some(sprite.pos.x),
                SpriteKind::Enemy { .. } => {
                    if lowest_enemy.is_none_or(|(_, y)| sprite.pos.y > y) {
                        lowest_enemy = Some((sprite.pos.x, sprite.pos.y));
                    }
                }
                _ => {}
            }
        }
        pickup.or(boss).or(lowest_enemy.map(|(x, _)| x))
    }
}

impl InputProvider for Autopilot {
    fn poll(&mut self, frame: &RenderFrame) -> TickInput {
        self.polls += 1;
        let mut input = TickInput {
            shoot: true,
            quit: self.quit_after.is_some_and(|n| self.polls > n),
            ..Default::default()
        };

        let Some(ship) = frame
            .sprites
            .iter()
            .find(|s| matches!(s.kind, SpriteKind::Player { .. }))
        else {
            return input;
        };
        let ship_x = ship.pos.x;
        let ship_y = ship.pos.y;

        // Dodge first: step away from the nearest bullet closing in overhead
        let threat = frame
            .sprites
            .iter()
            .filter(|s| matches!(s.kind, SpriteKind::EnemyBullet))
            .filter(|s| {
                (s.pos.x - ship_x).abs() < DODGE_HALF_WIDTH
                    && s.pos.y < ship_y
                    && ship_y - s.pos.y < DODGE_LOOKAHEAD
            })
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
        if let Some(bullet) = threat {
            let go_left = bullet.pos.x >= ship_x && ship_x > PLAYER_SIZE;
            input.left = go_left;
            input.right = !go_left;
            return input;
        }

        if let Some(x) = Self::target_x(frame, ship_y) {
            input.left = x < ship_x - AIM_TOLERANCE;
            input.right = x > ship_x + AIM_TOLERANCE;
        }
        input
    }
}
