//! Difficulty policy
//!
//! A [`Tier`] maps to a fixed [`DifficultySettings`] bundle. The adaptive layer
//! never mutates that table: it composes a pure [`Adjustment`] on top of it.

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, TuningConfig};

/// Named difficulty bucket
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
        }
    }

    /// Tier earned by `score`, never below the configured starting tier
    pub fn for_score(score: u32, tuning: &TuningConfig) -> Self {
        let earned = if score >= tuning.hard_score {
            Tier::Hard
        } else if score >= tuning.medium_score {
            Tier::Medium
        } else {
            Tier::Easy
        };
        earned.max(tuning.start_tier)
    }

    /// Base settings table
    pub fn settings(&self) -> DifficultySettings {
        match self {
            Tier::Easy => DifficultySettings {
                gap_size: 280.0,
                spawn_interval_ms: 2800.0,
                speed_multiplier: 0.5,
                min_obstacle_height: 100.0,
                max_obstacle_height: 300.0,
                spawn_pattern: SpawnPattern::Regular,
                random_spawn_chance: 1.0,
                gap_variation: 0.3,
            },
            Tier::Medium => DifficultySettings {
                gap_size: 220.0,
                spawn_interval_ms: 2200.0,
                speed_multiplier: 0.7,
                min_obstacle_height: 150.0,
                max_obstacle_height: 350.0,
                spawn_pattern: SpawnPattern::Alternating,
                random_spawn_chance: 0.9,
                gap_variation: 0.5,
            },
            Tier::Hard => DifficultySettings {
                gap_size: 180.0,
                spawn_interval_ms: 1800.0,
                speed_multiplier: 1.0,
                min_obstacle_height: 180.0,
                max_obstacle_height: 380.0,
                spawn_pattern: SpawnPattern::Random,
                random_spawn_chance: 0.85,
                gap_variation: 0.6,
            },
        }
    }
}

/// How the spawn gate decides whether an elapsed timer actually spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnPattern {
    /// Always spawns
    Regular,
    /// Spawns with probability `random_spawn_chance`
    Random,
    /// Spawns unless a secondary roll suppresses it, giving a rhythmic skip
    Alternating,
}

/// Per-tier tuning bundle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    /// Nominal vertical opening
    pub gap_size: f32,
    /// Nominal time between timer-driven spawns
    pub spawn_interval_ms: f32,
    /// Multiplies `obstacle.base_speed`
    pub speed_multiplier: f32,
    /// Bounds on the top obstacle's height, i.e. on where the gap sits
    pub min_obstacle_height: f32,
    pub max_obstacle_height: f32,
    pub spawn_pattern: SpawnPattern,
    /// Spawn probability per window under [`SpawnPattern::Random`]
    pub random_spawn_chance: f32,
    /// Fraction of the gap span the gap size may wander by
    pub gap_variation: f32,
}

impl DifficultySettings {
    /// Horizontal scroll speed in px/s
    pub fn scroll_speed(&self, config: &GameConfig) -> f32 {
        config.obstacle.base_speed * self.speed_multiplier
    }

    /// Replace corrupt values with defaults derived from base geometry.
    ///
    /// NaN must never reach obstacle positions, so every field that feeds
    /// into geometry or timing is checked here.
    pub fn sanitized(mut self, config: &GameConfig) -> Self {
        let o = &config.obstacle;

        if !self.gap_size.is_finite() || self.gap_size <= 0.0 {
            let fallback = (o.min_gap + o.max_gap) * 0.5;
            log::warn!("difficulty: gap_size = {} is invalid, using {}", self.gap_size, fallback);
            self.gap_size = fallback;
        }
        if !self.spawn_interval_ms.is_finite() || self.spawn_interval_ms <= 0.0 {
            // Enough time for a pair plus spacing to clear the spawn line
            let fallback = 1000.0 * (o.width + 2.0 * o.min_spacing) / o.base_speed;
            log::warn!(
                "difficulty: spawn_interval_ms = {} is invalid, using {}",
                self.spawn_interval_ms,
                fallback
            );
            self.spawn_interval_ms = fallback;
        }
        if !self.speed_multiplier.is_finite() || self.speed_multiplier <= 0.0 {
            log::warn!(
                "difficulty: speed_multiplier = {} is invalid, using 1.0",
                self.speed_multiplier
            );
            self.speed_multiplier = 1.0;
        }
        if !self.min_obstacle_height.is_finite() || self.min_obstacle_height < 0.0 {
            self.min_obstacle_height = 0.0;
        }
        if !self.max_obstacle_height.is_finite() || self.max_obstacle_height <= 0.0 {
            self.max_obstacle_height = config.screen.floor_y;
        }
        if self.max_obstacle_height < self.min_obstacle_height {
            std::mem::swap(&mut self.max_obstacle_height, &mut self.min_obstacle_height);
        }
        if !self.random_spawn_chance.is_finite() {
            self.random_spawn_chance = 1.0;
        }
        self.random_spawn_chance = self.random_spawn_chance.clamp(0.0, 1.0);
        if !self.gap_variation.is_finite() {
            self.gap_variation = 0.0;
        }
        self.gap_variation = self.gap_variation.clamp(0.0, 1.0);

        self
    }
}

/// Multiplicative transform over a settings bundle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Multiplies `gap_size`; above 1 widens the opening
    pub gap_scale: f32,
    /// Multiplies `spawn_interval_ms`; above 1 spaces spawns out
    pub interval_scale: f32,
    /// Multiplies `speed_multiplier`; below 1 slows the scroll
    pub speed_scale: f32,
}

impl Adjustment {
    pub const NONE: Adjustment = Adjustment {
        gap_scale: 1.0,
        interval_scale: 1.0,
        speed_scale: 1.0,
    };

    /// Applied after a death streak: wider gaps, slower and sparser pairs
    pub const SOFTEN: Adjustment = Adjustment {
        gap_scale: 1.2,
        interval_scale: 1.25,
        speed_scale: 0.8,
    };

    pub fn apply(&self, base: DifficultySettings) -> DifficultySettings {
        DifficultySettings {
            gap_size: base.gap_size * self.gap_scale,
            spawn_interval_ms: base.spawn_interval_ms * self.interval_scale,
            speed_multiplier: base.speed_multiplier * self.speed_scale,
            ..base
        }
    }

    /// `self` followed by `next`
    pub fn then(self, next: Adjustment) -> Adjustment {
        Adjustment {
            gap_scale: self.gap_scale * next.gap_scale,
            interval_scale: self.interval_scale * next.interval_scale,
            speed_scale: self.speed_scale * next.speed_scale,
        }
    }
}

/// Score-driven tier with a death-streak softening layer.
///
/// The death streak survives round resets; everything else follows the
/// current run's score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveDifficulty {
    tuning: TuningConfig,
    tier: Tier,
    consecutive_deaths: u32,
}

impl AdaptiveDifficulty {
    pub fn new(tuning: TuningConfig) -> Self {
        Self {
            tier: tuning.start_tier,
            tuning,
            consecutive_deaths: 0,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn consecutive_deaths(&self) -> u32 {
        self.consecutive_deaths
    }

    /// Re-evaluate the tier; returns the new tier if it changed
    pub fn update_score(&mut self, score: u32) -> Option<Tier> {
        let tier = Tier::for_score(score, &self.tuning);
        if tier != self.tier {
            log::info!("difficulty: {} -> {} at score {}", self.tier.as_str(), tier.as_str(), score);
            self.tier = tier;
            Some(tier)
        } else {
            None
        }
    }

    pub fn on_death(&mut self) {
        self.consecutive_deaths = self.consecutive_deaths.saturating_add(1);
    }

    pub fn on_score_increase(&mut self) {
        self.consecutive_deaths = 0;
    }

    /// Back to the starting tier for a new round
    pub fn reset_run(&mut self) {
        self.tier = self.tuning.start_tier;
    }

    pub fn adjustment(&self) -> Adjustment {
        if self.consecutive_deaths >= self.tuning.death_streak_threshold {
            Adjustment::SOFTEN
        } else {
            Adjustment::NONE
        }
    }

    /// Effective settings for the current tier, adjusted and sanitized
    pub fn current_settings(&self, config: &GameConfig) -> DifficultySettings {
        self.adjustment()
            .apply(self.tier.settings())
            .sanitized(config)
    }
}
