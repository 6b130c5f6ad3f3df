//! Difficulty tuning
//!
//! Every balance constant the simulation reads lives here, so a run can be
//! re-tuned from a JSON file without touching code. Defaults reproduce the
//! shipped game.

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

/// Data-driven difficulty constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Run shape ===
    /// Number of levels in a run
    pub num_levels: u32,
    /// Enemies in the first wave of level 1
    pub base_enemies: u32,
    /// A boss spawns on levels divisible by this
    pub boss_level_interval: u32,

    // === Difficulty curves ===
    pub player_base_damage: i32,
    /// Enemy horizontal speed at level 1 (units per frame)
    pub enemy_speed_base: f32,
    pub enemy_speed_inc: f32,
    /// Enemy fire probability at level 1 (per frame, before `enemy_fire_scale`)
    pub enemy_shoot_base: f32,
    pub enemy_shoot_inc: f32,
    /// Multiplier applied to the enemy fire probability for each roll
    pub enemy_fire_scale: f32,

    // === Timers (milliseconds) ===
    pub wave_pause_base_ms: u64,
    pub wave_pause_per_level_ms: u64,
    pub shoot_cooldown_ms: u64,
    pub power_up_duration_ms: u64,
    pub burst_interval_ms: u64,
    pub burst_duration_ms: u64,

    // === Drops ===
    /// Chance an enemy kill drops a power-up
    pub drop_chance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            num_levels: 10,
            base_enemies: 6,
            boss_level_interval: 5,

            player_base_damage: 1,
            enemy_speed_base: 1.0,
            enemy_speed_inc: 0.35,
            enemy_shoot_base: 0.006,
            enemy_shoot_inc: 0.004,
            enemy_fire_scale: 0.5,

            wave_pause_base_ms: 2500,
            wave_pause_per_level_ms: 500,
            shoot_cooldown_ms: 300,
            power_up_duration_ms: 10_000,
            burst_interval_ms: 300,
            burst_duration_ms: 10_000,

            drop_chance: 0.25,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning file. Missing fields take their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let tuning: Tuning = serde_json::from_str(json).context("malformed tuning JSON")?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.num_levels >= 1, "num_levels must be at least 1");
        ensure!(self.base_enemies >= 1, "base_enemies must be at least 1");
        ensure!(
            self.boss_level_interval >= 1,
            "boss_level_interval must be at least 1"
        );
        ensure!(
            self.player_base_damage >= 1,
            "player_base_damage must be at least 1"
        );
        for (name, p) in [
            ("enemy_shoot_base", self.enemy_shoot_base),
            ("enemy_fire_scale", self.enemy_fire_scale),
            ("drop_chance", self.drop_chance),
        ] {
            ensure!((0.0..=1.0).contains(&p), "{name} must lie in [0, 1], got {p}");
        }
        ensure!(
            self.enemy_speed_base.is_finite() && self.enemy_speed_inc.is_finite(),
            "enemy speeds must be finite"
        );
        ensure!(self.enemy_shoot_inc.is_finite(), "enemy_shoot_inc must be finite");
        ensure!(self.shoot_cooldown_ms > 0, "shoot_cooldown_ms must be positive");
        ensure!(self.power_up_duration_ms > 0, "power_up_duration_ms must be positive");
        ensure!(self.burst_interval_ms > 0, "burst_interval_ms must be positive");
        ensure!(self.burst_duration_ms > 0, "burst_duration_ms must be positive");
        Ok(())
    }

    /// Enemy horizontal speed for `level` (units per frame)
    pub fn enemy_speed(&self, level: u32) -> f32 {
        self.enemy_speed_base + self.enemy_speed_inc * level.saturating_sub(1) as f32
    }

    /// Enemy fire probability for `level`
    pub fn enemy_shoot_chance(&self, level: u32) -> f32 {
        self.enemy_shoot_base + self.enemy_shoot_inc * level.saturating_sub(1) as f32
    }

    /// Damage carried by each player bullet on `level`
    pub fn player_damage(&self, level: u32) -> i32 {
        self.player_base_damage + (level.saturating_sub(1) / 2) as i32
    }

    /// Enemies in the first wave of `level`; wave `k` adds `k` more
    pub fn wave_enemy_count(&self, level: u32) -> u32 {
        self.base_enemies + level.saturating_sub(1) * 2
    }

    /// Waves that must be cleared on `level`
    pub fn total_waves(&self, level: u32) -> u32 {
        level
    }

    /// Pause between a cleared wave and the next spawn on `level`
    pub fn wave_pause_ms(&self, level: u32) -> u64 {
        self.wave_pause_base_ms + level.saturating_sub(1) as u64 * self.wave_pause_per_level_ms
    }

    /// Whether `level` ends with a boss fight
    pub fn is_milestone(&self, level: u32) -> bool {
        level.is_multiple_of(self.boss_level_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_curves() {
        let t = Tuning::default();
        assert_eq!(t.enemy_speed(1), 1.0);
        assert!((t.enemy_speed(3) - 1.7).abs() < 1e-5);
        assert!((t.enemy_shoot_chance(1) - 0.006).abs() < 1e-6);
        assert!((t.enemy_shoot_chance(10) - 0.042).abs() < 1e-6);
        assert_eq!(t.player_damage(1), 1);
        assert_eq!(t.player_damage(2), 1);
        assert_eq!(t.player_damage(3), 2);
        assert_eq!(t.player_damage(10), 5);
        assert_eq!(t.wave_pause_ms(1), 2500);
        assert_eq!(t.wave_pause_ms(4), 4000);
    }

    #[test]
    fn test_wave_counts_for_every_level() {
        let t = Tuning::default();
        for level in 1..=10 {
            assert_eq!(t.wave_enemy_count(level), 6 + (level - 1) * 2);
            assert_eq!(t.total_waves(level), level);
        }
    }

    #[test]
    fn test_milestones() {
        let t = Tuning::default();
        let milestones: Vec<u32> = (1..=10).filter(|&l| t.is_milestone(l)).collect();
        assert_eq!(milestones, vec![5, 10]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let t = Tuning::from_json(r#"{ "num_levels": 3, "drop_chance": 1.0 }"#).unwrap();
        assert_eq!(t.num_levels, 3);
        assert_eq!(t.drop_chance, 1.0);
        assert_eq!(t.base_enemies, 6);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(Tuning::from_json(r#"{ "num_levels": 0 }"#).is_err());
        assert!(Tuning::from_json(r#"{ "drop_chance": 1.5 }"#).is_err());
        assert!(Tuning::from_json("not json").is_err());
    }

    #[test]
    fn test_json_roundtrip_preserves_defaults() {
        let json = serde_json::to_string(&Tuning::default()).unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), Tuning::default());
    }

    proptest! {
        #[test]
        fn prop_wave_growth_is_linear(base in 1u32..20, level in 1u32..50) {
            let t = Tuning { base_enemies: base, ..Tuning::default() };
            prop_assert_eq!(t.wave_enemy_count(level + 1), t.wave_enemy_count(level) + 2);
            prop_assert_eq!(t.total_waves(level), level);
        }

        #[test]
        fn prop_damage_never_decreases(level in 1u32..100) {
            let t = Tuning::default();
            prop_assert!(t.player_damage(level + 1) >= t.player_damage(level));
        }
    }
}
