//! Game geometry and tuning configuration
//!
//! Everything here is plain data. Loaded once (from JSON or defaults),
//! sanitized, then treated as immutable for the lifetime of a session.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LIVE_PAIRS;
use crate::positive_or;
use crate::sim::Tier;

/// Playfield bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
    /// Top of the ground strip; the player dies when its bottom edge reaches it
    pub floor_y: f32,
    pub ceiling_y: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 800.0,
            floor_y: 700.0,
            ceiling_y: 0.0,
        }
    }
}

/// Player start state and shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Start position (player center)
    pub start_x: f32,
    pub start_y: f32,
    /// Collision radius
    pub radius: f32,
    /// Render size (square sprite)
    pub size: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_x: 100.0,
            start_y: 400.0,
            radius: 20.0,
            size: 48.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Velocity set by a single tap before the combo multiplier (negative = up)
    pub jump_velocity: f32,
    /// Terminal fall speed (px/s)
    pub max_fall_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 1000.0,
            jump_velocity: -280.0,
            max_fall_speed: 400.0,
        }
    }
}

/// Obstacle geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub width: f32,
    /// Scroll speed before the tier multiplier (px/s)
    pub base_speed: f32,
    pub min_gap: f32,
    pub max_gap: f32,
    /// Thickness of the cap strip at the opening end
    pub cap_thickness: f32,
    /// How far the cap sticks out on each side of the body
    pub cap_overhang: f32,
    /// Spawn line distance past the right screen edge
    pub spawn_offset: f32,
    /// Minimum free space between consecutive pairs
    pub min_spacing: f32,
    pub ceiling_margin: f32,
    pub floor_margin: f32,
    /// Extra room a gap must leave beyond the player diameter
    pub safety_margin: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            width: 80.0,
            base_speed: 240.0,
            min_gap: 120.0,
            max_gap: 300.0,
            cap_thickness: 24.0,
            cap_overhang: 12.0,
            spawn_offset: 20.0,
            min_spacing: 160.0,
            ceiling_margin: 50.0,
            floor_margin: 50.0,
            safety_margin: 40.0,
        }
    }
}

/// Spawn timing and gap placement knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Largest vertical move of the gap center between consecutive pairs
    pub max_center_step: f32,
    /// Chance a spawn jumps to one of the fixed zones instead of walking
    pub zone_jump_chance: f32,
    /// Fraction of the center band (at each end) considered "extreme"
    pub extreme_band: f32,
    /// Chance the alternating pattern suppresses a spawn
    pub alternating_skip_chance: f32,
    /// Relative spread of the sampled spawn interval (0 = exact tier interval)
    pub interval_jitter: f32,
    /// Gated-out spawns in a row before the gate is forced open
    pub max_consecutive_skips: u32,
    pub max_live_pairs: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            max_center_step: 140.0,
            zone_jump_chance: 0.25,
            extreme_band: 0.15,
            alternating_skip_chance: 0.33,
            interval_jitter: 0.1,
            max_consecutive_skips: 2,
            max_live_pairs: MAX_LIVE_PAIRS,
        }
    }
}

/// Difficulty progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    pub start_tier: Tier,
    /// Score at which the tier rises to at least medium
    pub medium_score: u32,
    /// Score at which the tier rises to hard
    pub hard_score: u32,
    /// Consecutive deaths before the adaptive softening kicks in
    pub death_streak_threshold: u32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            start_tier: Tier::Easy,
            medium_score: 20,
            hard_score: 50,
            death_streak_threshold: 3,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub player: PlayerConfig,
    pub physics: PhysicsConfig,
    pub obstacle: ObstacleConfig,
    pub spawn: SpawnConfig,
    pub tuning: TuningConfig,
}

fn fix(name: &str, value: f32, fallback: f32) -> f32 {
    let fixed = positive_or(value, fallback);
    if fixed != value {
        log::warn!("config: {} = {} is invalid, using {}", name, value, fixed);
    }
    fixed
}

fn fix_unit(name: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        value
    } else {
        log::warn!("config: {} = {} is outside [0, 1], using {}", name, value, fallback);
        fallback
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<GameConfig>(json) {
            Ok(config) => Some(config.sanitized()),
            Err(e) => {
                log::warn!("config: failed to parse JSON: {}", e);
                None
            }
        }
    }

    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string_pretty(self).ok()
    }

    /// Replace corrupt values with safe defaults.
    ///
    /// Every substitution is logged at warn level. The result always satisfies
    /// `min_gap >= player diameter + safety_margin` and `max_gap >= min_gap`.
    pub fn sanitized(mut self) -> Self {
        let d = GameConfig::default();

        let s = &mut self.screen;
        s.width = fix("screen.width", s.width, d.screen.width);
        s.height = fix("screen.height", s.height, d.screen.height);
        if !s.ceiling_y.is_finite() || s.ceiling_y < 0.0 {
            log::warn!("config: screen.ceiling_y = {} is invalid, using 0", s.ceiling_y);
            s.ceiling_y = 0.0;
        }
        if !s.floor_y.is_finite() || s.floor_y <= s.ceiling_y || s.floor_y > s.height {
            let fallback = s.height * (d.screen.floor_y / d.screen.height);
            log::warn!("config: screen.floor_y = {} is invalid, using {}", s.floor_y, fallback);
            s.floor_y = fallback;
        }

        let p = &mut self.player;
        p.radius = fix("player.radius", p.radius, d.player.radius);
        p.size = fix("player.size", p.size, d.player.size);
        p.start_x = fix("player.start_x", p.start_x, self.screen.width * 0.25);
        let mid = (self.screen.ceiling_y + self.screen.floor_y) * 0.5;
        if !p.start_y.is_finite()
            || p.start_y - p.radius <= self.screen.ceiling_y
            || p.start_y + p.radius >= self.screen.floor_y
        {
            log::warn!("config: player.start_y = {} is out of bounds, using {}", p.start_y, mid);
            p.start_y = mid;
        }

        let ph = &mut self.physics;
        ph.gravity = fix("physics.gravity", ph.gravity, d.physics.gravity);
        ph.max_fall_speed = fix("physics.max_fall_speed", ph.max_fall_speed, d.physics.max_fall_speed);
        if !ph.jump_velocity.is_finite() || ph.jump_velocity >= 0.0 {
            log::warn!(
                "config: physics.jump_velocity = {} must point upward, using {}",
                ph.jump_velocity,
                d.physics.jump_velocity
            );
            ph.jump_velocity = d.physics.jump_velocity;
        }

        let o = &mut self.obstacle;
        o.width = fix("obstacle.width", o.width, d.obstacle.width);
        o.base_speed = fix("obstacle.base_speed", o.base_speed, d.obstacle.base_speed);
        o.cap_thickness = fix("obstacle.cap_thickness", o.cap_thickness, d.obstacle.cap_thickness);
        o.spawn_offset = fix("obstacle.spawn_offset", o.spawn_offset, d.obstacle.spawn_offset);
        o.min_spacing = fix("obstacle.min_spacing", o.min_spacing, d.obstacle.min_spacing);
        o.ceiling_margin = fix("obstacle.ceiling_margin", o.ceiling_margin, d.obstacle.ceiling_margin);
        o.floor_margin = fix("obstacle.floor_margin", o.floor_margin, d.obstacle.floor_margin);
        o.safety_margin = fix("obstacle.safety_margin", o.safety_margin, d.obstacle.safety_margin);
        if !o.cap_overhang.is_finite() || o.cap_overhang < 0.0 {
            log::warn!("config: obstacle.cap_overhang = {} is invalid, using 0", o.cap_overhang);
            o.cap_overhang = 0.0;
        }

        let playable_min_gap = self.player.radius * 2.0 + o.safety_margin;
        o.min_gap = fix("obstacle.min_gap", o.min_gap, d.obstacle.min_gap);
        if o.min_gap < playable_min_gap {
            log::warn!(
                "config: obstacle.min_gap = {} is unpassable, raising to {}",
                o.min_gap,
                playable_min_gap
            );
            o.min_gap = playable_min_gap;
        }
        o.max_gap = fix("obstacle.max_gap", o.max_gap, d.obstacle.max_gap);
        if o.max_gap < o.min_gap {
            log::warn!("config: obstacle.max_gap = {} < min_gap, using {}", o.max_gap, o.min_gap);
            o.max_gap = o.min_gap;
        }

        let sp = &mut self.spawn;
        sp.max_center_step = fix("spawn.max_center_step", sp.max_center_step, d.spawn.max_center_step);
        sp.zone_jump_chance = fix_unit("spawn.zone_jump_chance", sp.zone_jump_chance, d.spawn.zone_jump_chance);
        sp.extreme_band = fix_unit("spawn.extreme_band", sp.extreme_band, d.spawn.extreme_band).min(0.5);
        sp.alternating_skip_chance = fix_unit(
            "spawn.alternating_skip_chance",
            sp.alternating_skip_chance,
            d.spawn.alternating_skip_chance,
        );
        sp.interval_jitter = fix_unit("spawn.interval_jitter", sp.interval_jitter, d.spawn.interval_jitter).min(0.5);
        if sp.max_live_pairs == 0 {
            log::warn!("config: spawn.max_live_pairs = 0, using {}", d.spawn.max_live_pairs);
            sp.max_live_pairs = d.spawn.max_live_pairs;
        }

        let t = &mut self.tuning;
        if t.hard_score < t.medium_score {
            log::warn!(
                "config: tuning.hard_score = {} < medium_score = {}, swapping",
                t.hard_score,
                t.medium_score
            );
            std::mem::swap(&mut t.hard_score, &mut t.medium_score);
        }
        if t.death_streak_threshold == 0 {
            t.death_streak_threshold = d.tuning.death_streak_threshold;
        }

        self
    }

    /// Lowest y the gap center can take for a given gap size
    pub fn min_gap_center(&self, gap: f32) -> f32 {
        self.screen.ceiling_y + self.obstacle.ceiling_margin + gap * 0.5
    }

    /// Highest y the gap center can take for a given gap size
    pub fn max_gap_center(&self, gap: f32) -> f32 {
        self.screen.floor_y - self.obstacle.floor_margin - gap * 0.5
    }
}
