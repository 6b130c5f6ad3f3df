//! Wave scheduler
//!
//! One instance per level. Sequences the level's waves with a timed pause
//! between them, then either spawns the boss (milestone levels) or completes
//! the level. The scheduler only observes the store; it never kills anything.

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::rng::RandomSource;
use super::store::EntityStore;
use crate::Tuning;

/// Per-level wave state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveState {
    /// Waiting for the first spawn of the level
    SpawningWave,
    /// A wave is on the field
    WaveActive,
    /// Wave cleared; the next one spawns at `resume_at` (simulation ms)
    WaveClearedWaiting { resume_at: u64 },
    /// All waves cleared, boss on the field
    BossPending,
    /// Terminal for this level
    LevelComplete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveScheduler {
    level: u32,
    state: WaveState,
    completed_waves: u32,
    total_waves: u32,
    /// Enemies in the level's first wave
    base_quantity: u32,
    enemy_speed: f32,
    pause_ms: u64,
    milestone: bool,
}

impl WaveScheduler {
    pub fn new(level: u32, tuning: &Tuning) -> Self {
        Self {
            level,
            state: WaveState::SpawningWave,
            completed_waves: 0,
            total_waves: tuning.total_waves(level),
            base_quantity: tuning.wave_enemy_count(level),
            enemy_speed: tuning.enemy_speed(level),
            pause_ms: tuning.wave_pause_ms(level),
            milestone: tuning.is_milestone(level),
        }
    }

    pub fn state(&self) -> WaveState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn completed_waves(&self) -> u32 {
        self.completed_waves
    }

    pub fn total_waves(&self) -> u32 {
        self.total_waves
    }

    pub fn is_complete(&self) -> bool {
        self.state == WaveState::LevelComplete
    }

    /// Milliseconds until the next wave while waiting, otherwise `None`
    pub fn next_wave_in_ms(&self, now: u64) -> Option<u64> {
        match self.state {
            WaveState::WaveClearedWaiting { resume_at } => Some(resume_at.saturating_sub(now)),
            _ => None,
        }
    }

    /// Spawn the level's first wave
    pub fn start(&mut self, store: &mut EntityStore, rng: &mut impl RandomSource) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.state == WaveState::SpawningWave {
            self.spawn_next(store, rng, &mut events);
        }
        events
    }

    /// Observe the store after combat and step the state machine
    pub fn update(
        &mut self,
        store: &mut EntityStore,
        now: u64,
        rng: &mut impl RandomSource,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.state {
            WaveState::SpawningWave => self.spawn_next(store, rng, &mut events),
            WaveState::WaveActive => {
                if store.enemies.is_empty() && !store.boss_alive() {
                    self.wave_cleared(store, now, &mut events);
                }
            }
            // Countdown hitting zero exactly on a frame boundary still resumes
            WaveState::WaveClearedWaiting { resume_at } => {
                if now >= resume_at {
                    self.spawn_next(store, rng, &mut events);
                }
            }
            WaveState::BossPending => {
                if !store.boss_alive() {
                    self.boss_defeated();
                }
            }
            WaveState::LevelComplete => {}
        }
        events
    }

    /// Combat reports the boss died
    pub fn boss_defeated(&mut self) {
        if self.state == WaveState::BossPending {
            log::info!("Level {} boss down, level complete", self.level);
            self.state = WaveState::LevelComplete;
        }
    }

    fn spawn_next(
        &mut self,
        store: &mut EntityStore,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) {
        let quantity = self.base_quantity + self.completed_waves;
        let spawned = store.spawn_wave(self.level, quantity, self.enemy_speed, rng);
        let wave = self.completed_waves + 1;
        log::debug!(
            "Level {} wave {}/{}: {} enemies",
            self.level,
            wave,
            self.total_waves,
            spawned
        );
        events.push(GameEvent::WaveSpawned {
            level: self.level,
            wave,
            enemies: spawned,
        });
        self.state = WaveState::WaveActive;
    }

    fn wave_cleared(&mut self, store: &mut EntityStore, now: u64, events: &mut Vec<GameEvent>) {
        self.completed_waves += 1;
        if self.completed_waves < self.total_waves {
            self.state = WaveState::WaveClearedWaiting {
                resume_at: now + self.pause_ms,
            };
        } else if self.milestone {
            store.spawn_boss(self.level, now);
            if let Some(boss) = &store.boss {
                log::info!("Level {} boss spawned with {} hp", self.level, boss.hp);
                events.push(GameEvent::BossSpawned {
                    level: self.level,
                    hp: boss.hp,
                });
            }
            self.state = WaveState::BossPending;
        } else {
            self.state = WaveState::LevelComplete;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::entities::Player;
    use crate::sim::rng::FixedRandom;
    use glam::Vec2;
    use proptest::prelude::*;

    fn setup(level: u32) -> (WaveScheduler, EntityStore, FixedRandom) {
        let tuning = Tuning::default();
        (
            WaveScheduler::new(level, &tuning),
            EntityStore::new(Player::new(tuning.player_damage(level))),
            FixedRandom::constant(0.9),
        )
    }

    /// Clear the field and step the scheduler once
    fn clear_wave(sched: &mut WaveScheduler, store: &mut EntityStore, now: u64, rng: &mut FixedRandom) {
        store.enemies.clear();
        sched.update(store, now, rng);
    }

    #[test]
    fn test_level_one_completes_without_boss() {
        let (mut sched, mut store, mut rng) = setup(1);
        let events = sched.start(&mut store, &mut rng);
        assert_eq!(store.enemies.len(), 6);
        assert_eq!(
            events,
            vec![GameEvent::WaveSpawned { level: 1, wave: 1, enemies: 6 }]
        );
        assert_eq!(sched.state(), WaveState::WaveActive);

        clear_wave(&mut sched, &mut store, 100, &mut rng);
        assert_eq!(sched.completed_waves(), 1);
        assert_eq!(sched.state(), WaveState::LevelComplete);
        assert!(!store.boss_alive());
    }

    #[test]
    fn test_active_wave_waits_for_enemies() {
        let (mut sched, mut store, mut rng) = setup(2);
        sched.start(&mut store, &mut rng);
        sched.update(&mut store, 5_000, &mut rng);
        assert_eq!(sched.state(), WaveState::WaveActive);
        assert_eq!(sched.completed_waves(), 0);
    }

    #[test]
    fn test_pause_then_bigger_wave() {
        let (mut sched, mut store, mut rng) = setup(3);
        sched.start(&mut store, &mut rng);
        assert_eq!(store.enemies.len(), 10);

        clear_wave(&mut sched, &mut store, 1_000, &mut rng);
        // 2500 + 2 * 500
        assert_eq!(
            sched.state(),
            WaveState::WaveClearedWaiting { resume_at: 4_500 }
        );
        assert_eq!(sched.next_wave_in_ms(1_500), Some(3_000));

        sched.update(&mut store, 4_499, &mut rng);
        assert!(store.enemies.is_empty());

        let events = sched.update(&mut store, 4_500, &mut rng);
        assert_eq!(store.enemies.len(), 11);
        assert_eq!(
            events,
            vec![GameEvent::WaveSpawned { level: 3, wave: 2, enemies: 11 }]
        );
        assert_eq!(sched.state(), WaveState::WaveActive);
    }

    #[test]
    fn test_milestone_spawns_boss_after_last_wave() {
        let (mut sched, mut store, mut rng) = setup(5);
        sched.start(&mut store, &mut rng);
        let mut now = 0;
        for _ in 0..4 {
            clear_wave(&mut sched, &mut store, now, &mut rng);
            assert!(!store.boss_alive());
            now += 10_000;
            sched.update(&mut store, now, &mut rng);
        }
        store.enemies.clear();
        let events = sched.update(&mut store, now, &mut rng);
        assert_eq!(sched.completed_waves(), 5);
        assert_eq!(sched.state(), WaveState::BossPending);
        assert!(store.boss_alive());
        assert_eq!(events, vec![GameEvent::BossSpawned { level: 5, hp: 280 }]);

        // Still pending while the boss lives
        sched.update(&mut store, now + 50_000, &mut rng);
        assert_eq!(sched.state(), WaveState::BossPending);

        store.boss = None;
        sched.boss_defeated();
        assert!(sched.is_complete());
    }

    #[test]
    fn test_enemies_leaving_the_field_clear_the_wave() {
        let (mut sched, mut store, mut rng) = setup(2);
        sched.start(&mut store, &mut rng);
        // Park every enemy on the right wall, one descent step from the bottom
        for enemy in &mut store.enemies {
            enemy.pos = Vec2::new(
                PLAYFIELD_WIDTH - ENEMY_SIZE / 2.0 - 0.5,
                PLAYFIELD_HEIGHT + ENEMY_SIZE / 2.0 - 10.0,
            );
            enemy.vel_x = 1.0;
        }
        store.advance(1.0);
        assert!(store.enemies.is_empty());

        sched.update(&mut store, 1_000, &mut rng);
        assert_eq!(sched.completed_waves(), 1);
        assert_eq!(
            sched.state(),
            WaveState::WaveClearedWaiting { resume_at: 4_000 }
        );
    }

    #[test]
    fn test_complete_is_terminal() {
        let (mut sched, mut store, mut rng) = setup(1);
        sched.start(&mut store, &mut rng);
        clear_wave(&mut sched, &mut store, 0, &mut rng);
        assert!(sched.is_complete());
        assert!(sched.update(&mut store, 99_999, &mut rng).is_empty());
        assert!(sched.is_complete());
        assert!(store.enemies.is_empty());
    }

    proptest! {
        #[test]
        fn prop_boss_iff_milestone_and_all_waves(level in 1u32..=10) {
            let (mut sched, mut store, mut rng) = setup(level);
            sched.start(&mut store, &mut rng);
            let mut now = 0;
            loop {
                prop_assert_eq!(store.boss_alive(), sched.state() == WaveState::BossPending);
                if store.boss_alive() || sched.is_complete() {
                    break;
                }
                store.enemies.clear();
                sched.update(&mut store, now, &mut rng);
                now += 20_000;
                sched.update(&mut store, now, &mut rng);
            }
            prop_assert_eq!(sched.completed_waves(), level);
            prop_assert_eq!(store.boss_alive(), level % 5 == 0);
        }
    }
}
