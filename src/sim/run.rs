//! Run controller
//!
//! Owns all simulation state for a run and exposes the per-frame tick. Each
//! tick runs the fixed pipeline: movement, hostile fire, collisions, combat,
//! then wave and level transitions. The clock is sampled once by the caller
//! and passed in.

use serde::{Deserialize, Serialize};

use super::collision;
use super::combat::{self, CombatContext};
use super::entities::{Player, Steering};
use super::events::{AudioCue, GameEvent};
use super::rng::RandomSource;
use super::store::EntityStore;
use super::waves::WaveScheduler;
use crate::Tuning;
use crate::frames_for;
use crate::snapshot::{Hud, RenderFrame, build_render_frame};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Fire a manual shot (subject to cooldown)
    pub shoot: bool,
    /// Abort the run at this frame boundary
    pub quit: bool,
}

impl TickInput {
    /// No intents at all
    pub fn is_idle(&self) -> bool {
        *self == TickInput::default()
    }

    fn steering(&self) -> Steering {
        Steering {
            up: self.up,
            down: self.down,
            left: self.left,
            right: self.right,
        }
    }
}

/// Where the run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Playing,
    Won,
    Lost,
    /// Quit requested
    Aborted,
}

impl RunStatus {
    pub fn is_over(&self) -> bool {
        *self != RunStatus::Playing
    }
}

/// Everything a frame produced for the outside world
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub cues: Vec<AudioCue>,
    pub events: Vec<GameEvent>,
}

/// Final result of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub level: u32,
    pub score: u64,
    pub hp: u8,
}

#[derive(Debug, Clone)]
pub struct RunController {
    tuning: Tuning,
    level: u32,
    store: EntityStore,
    scheduler: WaveScheduler,
    status: RunStatus,
    /// Clock sample of the previous tick
    last_now: u64,
    /// Events raised outside a tick (run start), handed out by the next one
    pending: Vec<GameEvent>,
}

impl RunController {
    /// Start a run at level 1
    pub fn new(tuning: Tuning, now: u64, rng: &mut impl RandomSource) -> Self {
        Self::starting_at(tuning, 1, now, rng)
    }

    /// Start a run at `level` (clamped to the tuning's level range)
    pub fn starting_at(
        tuning: Tuning,
        level: u32,
        now: u64,
        rng: &mut impl RandomSource,
    ) -> Self {
        let level = level.clamp(1, tuning.num_levels.max(1));
        let store = EntityStore::new(Player::arriving(tuning.player_damage(level)));
        let scheduler = WaveScheduler::new(level, &tuning);
        let mut run = Self {
            tuning,
            level,
            store,
            scheduler,
            status: RunStatus::Playing,
            last_now: now,
            pending: Vec::new(),
        };
        let events = run.begin_level(level, rng);
        run.pending = events;
        run
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            status: self.status,
            level: self.level,
            score: self.store.player.score,
            hp: self.store.player.hp,
        }
    }

    /// Reset the field and set up the scheduler for `level`
    fn begin_level(&mut self, level: u32, rng: &mut impl RandomSource) -> Vec<GameEvent> {
        self.level = level;
        self.store.reset_level();
        self.store.player.damage = self.tuning.player_damage(level);
        self.scheduler = WaveScheduler::new(level, &self.tuning);
        log::info!(
            "Level {}/{} begins: {} waves, player damage {}",
            level,
            self.tuning.num_levels,
            self.scheduler.total_waves(),
            self.store.player.damage
        );

        let mut events = vec![GameEvent::LevelStarted { level }];
        events.extend(self.scheduler.start(&mut self.store, rng));
        events
    }

    /// Advance the run to clock sample `now`
    pub fn tick(
        &mut self,
        input: &TickInput,
        now: u64,
        rng: &mut impl RandomSource,
    ) -> FrameReport {
        let mut report = FrameReport {
            events: std::mem::take(&mut self.pending),
            ..Default::default()
        };
        if self.status.is_over() {
            return report;
        }

        if input.quit {
            log::info!("Quit requested on level {}", self.level);
            self.status = RunStatus::Aborted;
            return report;
        }

        // A clock that runs backwards is treated as stopped
        let now = now.max(self.last_now);
        let elapsed = now - self.last_now;
        self.last_now = now;
        if elapsed == 0 && input.is_idle() {
            return report;
        }
        let frames = frames_for(elapsed);

        // Player
        let player = &mut self.store.player;
        player.timers.expire(now);
        player.steer(input.steering(), frames);
        let mut shots = Vec::new();
        if input.shoot {
            shots = player.try_shoot(now, &self.tuning);
            if !shots.is_empty() {
                report.cues.push(AudioCue::Shoot);
            }
        }
        shots.extend(player.burst_volley(now, &self.tuning));
        self.store.spawn_shots(shots);

        // Movement, then the hostile fire that joins this frame's collisions
        self.store.advance(frames);
        let ctx = CombatContext {
            level: self.level,
            now,
            tuning: &self.tuning,
        };
        combat::hostile_fire(&mut self.store, ctx, frames, rng, &mut report.cues);

        let shielded = self.store.player.has_shield(now);
        let hits = collision::resolve(&mut self.store, shielded);
        let outcome = combat::apply(&mut self.store, &hits, ctx, rng);
        report.cues.extend(outcome.cues);
        report.events.extend(outcome.events);
        debug_assert!(self.store.enemies.iter().all(|e| e.hp > 0));

        // Run-ending outcomes skip every remaining level
        if outcome.run_won {
            self.finish(RunStatus::Won, &mut report);
            return report;
        }
        if outcome.player_dead {
            self.finish(RunStatus::Lost, &mut report);
            return report;
        }

        if outcome.boss_defeated {
            self.scheduler.boss_defeated();
        }
        let wave_events = self.scheduler.update(&mut self.store, now, rng);
        report.events.extend(wave_events);

        if self.scheduler.is_complete() {
            report.events.push(GameEvent::LevelComplete { level: self.level });
            if self.level >= self.tuning.num_levels {
                self.finish(RunStatus::Won, &mut report);
            } else {
                let next = self.level + 1;
                let events = self.begin_level(next, rng);
                report.events.extend(events);
            }
        }

        report
    }

    fn finish(&mut self, status: RunStatus, report: &mut FrameReport) {
        self.status = status;
        let score = self.store.player.score;
        match status {
            RunStatus::Won => {
                log::info!("Run won with score {}", score);
                report.events.push(GameEvent::RunWon { score });
            }
            RunStatus::Lost => {
                log::info!("Run lost on level {} with score {}", self.level, score);
                report.events.push(GameEvent::RunLost {
                    level: self.level,
                    score,
                });
            }
            RunStatus::Playing | RunStatus::Aborted => {}
        }
    }

    /// HUD scalars at the last clock sample
    pub fn hud(&self) -> Hud {
        let player = &self.store.player;
        Hud {
            level: self.level,
            num_levels: self.tuning.num_levels,
            lives: player.hp,
            score: player.score,
            completed_waves: self.scheduler.completed_waves(),
            total_waves: self.scheduler.total_waves(),
            next_wave_in_secs: self
                .scheduler
                .next_wave_in_ms(self.last_now)
                .map(|ms| ms.div_ceil(1000)),
            boss_hp: self.store.boss.as_ref().map(|b| b.hp),
            shield_active: player.has_shield(self.last_now),
            burst_active: player.burst_active(self.last_now),
        }
    }

    /// Snapshot for the render sink
    pub fn render_frame(&self) -> RenderFrame {
        build_render_frame(&self.store, self.hud(), self.last_now)
    }
}
