//! Obstacle pairs and their lifecycle
//!
//! Per tick the manager scrolls, culls, bootstraps, scores and spawns, in that
//! order. Gap geometry is decided once at spawn time; afterwards a pair only
//! ever changes its `x`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::difficulty::{DifficultySettings, SpawnPattern};
use super::rect::Rect;
use super::rng::RandomSource;
use super::state::World;
use crate::config::GameConfig;

/// Fixed vertical zones (fractions of the center band) a spawn can jump to
const GAP_ZONES: [f32; 3] = [0.1, 0.5, 0.9];

/// Which member of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
}

/// One obstacle rectangle; `pos` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }
}

/// A top + bottom obstacle sharing one gap and one scoring flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstaclePair {
    /// Unique within a session, increasing in spawn order
    pub id: u32,
    pub top: Obstacle,
    pub bottom: Obstacle,
    /// Vertical opening between the inner edges
    pub gap: f32,
    /// Set once the pair's right edge passes the player's center
    pub scored: bool,
}

impl ObstaclePair {
    /// Build a pair whose gap of size `gap` is centered on `center`.
    ///
    /// The top member hangs from the ceiling, the bottom member stands on the floor.
    pub fn new(id: u32, x: f32, width: f32, gap: f32, center: f32, ceiling_y: f32, floor_y: f32) -> Self {
        let gap_top = center - gap * 0.5;
        let gap_bottom = center + gap * 0.5;
        Self {
            id,
            top: Obstacle {
                pos: Vec2::new(x, ceiling_y),
                width,
                height: (gap_top - ceiling_y).max(0.0),
            },
            bottom: Obstacle {
                pos: Vec2::new(x, gap_bottom),
                width,
                height: (floor_y - gap_bottom).max(0.0),
            },
            gap,
            scored: false,
        }
    }

    pub fn x(&self) -> f32 {
        self.top.pos.x
    }

    /// Trailing edge as the pair scrolls left
    pub fn right(&self) -> f32 {
        self.top.pos.x + self.top.width
    }

    /// y of the top member's inner edge
    pub fn gap_top(&self) -> f32 {
        self.top.pos.y + self.top.height
    }

    /// y of the bottom member's inner edge
    pub fn gap_bottom(&self) -> f32 {
        self.bottom.pos.y
    }

    pub fn gap_center(&self) -> f32 {
        (self.gap_top() + self.gap_bottom()) * 0.5
    }

    pub fn member(&self, side: Side) -> &Obstacle {
        match side {
            Side::Top => &self.top,
            Side::Bottom => &self.bottom,
        }
    }

    fn shift(&mut self, dx: f32) {
        self.top.pos.x += dx;
        self.bottom.pos.x += dx;
    }
}

/// What happened during one [`ObstacleManager::advance`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Pairs that crossed the player's center this tick
    pub score_delta: u32,
    pub scored_ids: Vec<u32>,
    pub culled: usize,
    /// A pair was spawned because the list was empty
    pub bootstrapped: Option<u32>,
    /// A pair was spawned by the timer
    pub spawned: Option<u32>,
    /// The timer elapsed but the pattern gate said no
    pub skipped: bool,
    /// The timer elapsed but the population cap was reached
    pub capped: bool,
}

/// Spawn timer and gap placement state.
///
/// The live pair list itself lives in [`World`]; the manager only keeps what it
/// needs to decide the next spawn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleManager {
    timer_ms: f64,
    /// Interval for the current spawn window, sampled once when it begins
    interval_ms: Option<f64>,
    last_center: Option<f32>,
    consecutive_skips: u32,
    next_id: u32,
}

impl ObstacleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all timing and placement history
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn timer_ms(&self) -> f64 {
        self.timer_ms
    }

    pub fn current_interval_ms(&self) -> Option<f64> {
        self.interval_ms
    }

    /// One tick of obstacle simulation. Only called while the run is playing.
    ///
    /// Corrupt settings are replaced with safe defaults and a bad `dt` moves
    /// nothing, so pair geometry stays finite whatever the caller passes.
    pub fn advance<R: RandomSource + ?Sized>(
        &mut self,
        world: &mut World,
        settings: &DifficultySettings,
        config: &GameConfig,
        dt: f32,
        rng: &mut R,
    ) -> AdvanceOutcome {
        let settings = &(*settings).sanitized(config);
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let mut outcome = AdvanceOutcome::default();

        // Scroll
        let dx = -settings.scroll_speed(config) * dt;
        for pair in &mut world.pairs {
            pair.shift(dx);
        }

        // Cull
        let before = world.pairs.len();
        world.pairs.retain(|p| p.right() >= 0.0);
        outcome.culled = before - world.pairs.len();
        if outcome.culled > 0 {
            log::trace!("culled {} pairs", outcome.culled);
        }

        // Bootstrap
        if world.pairs.is_empty() {
            let pair = self.spawn_pair(config.screen.width, settings, config, rng);
            outcome.bootstrapped = Some(pair.id);
            world.pairs.push(pair);
        }

        // Score
        let player_x = world.player.pos.x;
        for pair in &mut world.pairs {
            if !pair.scored && pair.right() < player_x {
                pair.scored = true;
                outcome.scored_ids.push(pair.id);
            }
        }
        outcome.score_delta = outcome.scored_ids.len() as u32;

        // Spawn timer
        self.timer_ms += f64::from(dt) * 1000.0;
        let interval = match self.interval_ms {
            Some(interval) => interval,
            None => self.begin_window(settings, config, rng),
        };
        if self.timer_ms < interval {
            return outcome;
        }

        let spawn_x = config.screen.width + config.obstacle.spawn_offset;
        if let Some(newest) = world.pairs.last() {
            if spawn_x - newest.right() < config.obstacle.min_spacing {
                log::trace!("spawn deferred, newest pair too close");
                return outcome;
            }
        }

        self.timer_ms = 0.0;
        self.begin_window(settings, config, rng);

        if !self.gate(settings, config, rng) {
            log::trace!("spawn skipped by {:?} pattern", settings.spawn_pattern);
            outcome.skipped = true;
            return outcome;
        }
        if world.pairs.len() >= config.spawn.max_live_pairs {
            log::trace!("spawn blocked by population cap ({})", world.pairs.len());
            outcome.capped = true;
            return outcome;
        }

        let pair = self.spawn_pair(spawn_x, settings, config, rng);
        outcome.spawned = Some(pair.id);
        world.pairs.push(pair);
        outcome
    }

    /// Sample the interval for a new spawn window and hold it
    fn begin_window<R: RandomSource + ?Sized>(
        &mut self,
        settings: &DifficultySettings,
        config: &GameConfig,
        rng: &mut R,
    ) -> f64 {
        let jitter = config.spawn.interval_jitter;
        let scale = if jitter > 0.0 {
            1.0 + jitter * rng.signed_unit()
        } else {
            1.0
        };
        let interval = f64::from(settings.spawn_interval_ms * scale);
        self.interval_ms = Some(interval);
        interval
    }

    /// Spawn-pattern gate. After too many skips in a row the gate is forced open.
    fn gate<R: RandomSource + ?Sized>(
        &mut self,
        settings: &DifficultySettings,
        config: &GameConfig,
        rng: &mut R,
    ) -> bool {
        let pass = if self.consecutive_skips >= config.spawn.max_consecutive_skips {
            true
        } else {
            match settings.spawn_pattern {
                SpawnPattern::Regular => true,
                SpawnPattern::Random => rng.chance(settings.random_spawn_chance),
                SpawnPattern::Alternating => !rng.chance(config.spawn.alternating_skip_chance),
            }
        };
        if pass {
            self.consecutive_skips = 0;
        } else {
            self.consecutive_skips += 1;
        }
        pass
    }

    fn spawn_pair<R: RandomSource + ?Sized>(
        &mut self,
        x: f32,
        settings: &DifficultySettings,
        config: &GameConfig,
        rng: &mut R,
    ) -> ObstaclePair {
        let (gap, center) = self.place_gap(settings, config, rng);
        self.next_id += 1;
        log::trace!("spawn pair {} at x={} gap={} center={}", self.next_id, x, gap, center);
        ObstaclePair::new(
            self.next_id,
            x,
            config.obstacle.width,
            gap,
            center,
            config.screen.ceiling_y,
            config.screen.floor_y,
        )
    }

    /// Pick the gap size and center for the next pair.
    ///
    /// The center follows a bounded random walk from the previous pair, with
    /// occasional jumps to fixed zones. A ceiling-hugging pair is never followed
    /// directly by a floor-hugging one (or the reverse).
    pub fn place_gap<R: RandomSource + ?Sized>(
        &mut self,
        settings: &DifficultySettings,
        config: &GameConfig,
        rng: &mut R,
    ) -> (f32, f32) {
        let settings = &(*settings).sanitized(config);
        let o = &config.obstacle;
        let sp = &config.spawn;

        let span = (o.max_gap - o.min_gap) * 0.5;
        let mut gap = settings.gap_size;
        if settings.gap_variation > 0.0 {
            gap += rng.signed_unit() * settings.gap_variation * span;
        }
        let playable = (config.max_gap_center(0.0) - config.min_gap_center(0.0)).max(o.min_gap);
        let gap = gap.clamp(o.min_gap, o.max_gap.min(playable));

        let (lo, hi) = center_band(gap, settings, config);
        let mid = (lo + hi) * 0.5;
        let last = self.last_center.unwrap_or(mid).clamp(lo, hi);

        let proposed = if rng.chance(sp.zone_jump_chance) {
            let zone = ((rng.next_f32() * GAP_ZONES.len() as f32) as usize).min(GAP_ZONES.len() - 1);
            lo + (hi - lo) * GAP_ZONES[zone]
        } else {
            last + rng.signed_unit() * sp.max_center_step
        };
        let mut center = proposed.clamp(lo, hi);

        if let Some(prev) = self.last_center {
            let band = (hi - lo) * sp.extreme_band;
            let near_top = |c: f32| c <= lo + band;
            let near_bottom = |c: f32| c >= hi - band;
            if (near_top(prev) && near_bottom(center)) || (near_bottom(prev) && near_top(center)) {
                log::trace!("gap whiplash {} -> {}, snapping to {}", prev, center, mid);
                center = mid;
            }
        }

        self.last_center = Some(center);
        (gap, center)
    }
}

/// Allowed range of the gap center for a given gap size.
///
/// Intersects the ceiling/floor margins with the tier's obstacle height
/// bounds; if that is empty the margin band alone is used.
pub fn center_band(gap: f32, settings: &DifficultySettings, config: &GameConfig) -> (f32, f32) {
    let margin_lo = config.min_gap_center(gap);
    let margin_hi = config.max_gap_center(gap);
    let tier_lo = config.screen.ceiling_y + settings.min_obstacle_height + gap * 0.5;
    let tier_hi = config.screen.ceiling_y + settings.max_obstacle_height + gap * 0.5;

    let lo = margin_lo.max(tier_lo);
    let hi = margin_hi.min(tier_hi);
    if lo <= hi {
        (lo, hi)
    } else if margin_lo <= margin_hi {
        (margin_lo, margin_hi)
    } else {
        let m = (config.screen.ceiling_y + config.screen.floor_y) * 0.5;
        (m, m)
    }
}
