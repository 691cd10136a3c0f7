//! Player entity and its fixed-step integrator
//!
//! The player never moves horizontally: scrolling is simulated by moving the
//! obstacles. Position is the center of the collision circle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::config::{PhysicsConfig, PlayerConfig};
use crate::consts::{COMBO_CAP, COMBO_WINDOW_MS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Center of the collision circle
    pub pos: Vec2,
    /// `vel.x` stays 0; positive `vel.y` is downward
    pub vel: Vec2,
    pub radius: f32,
    /// Render size (square sprite)
    pub size: f32,
}

/// Which screen bound the player was pushed back from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Boundary {
    Floor,
    Ceiling,
}

impl Player {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            pos: Vec2::new(config.start_x, config.start_y),
            vel: Vec2::ZERO,
            radius: config.radius,
            size: config.size,
        }
    }

    /// Bounding square used by the collision detector
    pub fn bounds(&self) -> Rect {
        Rect::around(self.pos, self.radius)
    }

    /// Clamp the player inside `[ceiling_y, floor_y]`, zeroing vertical speed
    /// on contact. Touching a bound counts as contact.
    pub fn clamp_to_bounds(&mut self, ceiling_y: f32, floor_y: f32) -> Option<Boundary> {
        if self.pos.y + self.radius >= floor_y {
            self.pos.y = floor_y - self.radius;
            self.vel.y = 0.0;
            Some(Boundary::Floor)
        } else if self.pos.y - self.radius <= ceiling_y {
            self.pos.y = ceiling_y + self.radius;
            self.vel.y = 0.0;
            Some(Boundary::Ceiling)
        } else {
            None
        }
    }
}

/// Advance one step under gravity.
///
/// `vy' = vy + g*dt`, `y' = y + vy'*dt`, then `vy'` is clamped to the terminal
/// fall speed. A non-finite or non-positive `dt` leaves the player untouched.
pub fn integrate(player: Player, physics: &PhysicsConfig, dt: f32) -> Player {
    if !dt.is_finite() || dt <= 0.0 {
        log::debug!("integrate: ignoring dt = {}", dt);
        return player;
    }
    let mut next = player;
    next.vel.x = 0.0;
    next.vel.y += physics.gravity * dt;
    next.pos.y += next.vel.y * dt;
    next.vel.y = next.vel.y.min(physics.max_fall_speed);
    next
}

/// Apply a tap: vertical speed becomes the boosted jump velocity
pub fn activate(player: Player, jump_velocity: f32, combo: &mut TapCombo, now_ms: f64) -> Player {
    let multiplier = combo.register(now_ms);
    Player {
        vel: Vec2::new(0.0, jump_velocity * multiplier),
        ..player
    }
}

/// Jump multiplier for a given combo length
pub fn combo_multiplier(count: u32) -> f32 {
    match count {
        0 | 1 => 1.0,
        2..=4 => 1.1,
        5..=9 => 1.2,
        _ => 1.3,
    }
}

/// Rolling counter of rapid consecutive taps
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TapCombo {
    count: u32,
    last_tap_ms: Option<f64>,
}

impl TapCombo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tap at `now_ms` and return the multiplier it earns
    pub fn register(&mut self, now_ms: f64) -> f32 {
        let in_window = match self.last_tap_ms {
            Some(last) if now_ms.is_finite() => {
                let delta = now_ms - last;
                (0.0..=COMBO_WINDOW_MS).contains(&delta)
            }
            _ => false,
        };
        if !in_window {
            self.count = 0;
        }
        self.count = (self.count + 1).min(COMBO_CAP);
        if now_ms.is_finite() {
            self.last_tap_ms = Some(now_ms);
        }
        combo_multiplier(self.count)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn multiplier(&self) -> f32 {
        combo_multiplier(self.count)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(&PlayerConfig::default())
    }

    #[test]
    fn test_fall_clamps_at_terminal_speed() {
        // gravity 1000, 60 ticks of 1/60s would reach 1000 px/s unclamped
        let physics = PhysicsConfig::default();
        let mut p = player();
        let mut reached_at = None;
        for i in 1..=60 {
            p = integrate(p, &physics, 1.0 / 60.0);
            assert!(p.vel.y <= physics.max_fall_speed);
            if reached_at.is_none() && p.vel.y >= physics.max_fall_speed {
                reached_at = Some(i);
            }
        }
        assert_eq!(p.vel.y, 400.0);
        let reached_at = reached_at.unwrap();
        assert!((24..=25).contains(&reached_at), "reached at {}", reached_at);
    }

    #[test]
    fn test_integrate_uses_unclamped_velocity_for_position() {
        let physics = PhysicsConfig::default();
        let mut p = player();
        p.vel.y = 399.0;
        let next = integrate(p, &physics, 0.01);
        // vy' = 409 moves the player before the clamp applies
        assert!((next.pos.y - (p.pos.y + 4.09)).abs() < 1e-3);
        assert_eq!(next.vel.y, 400.0);
    }

    #[test]
    fn test_integrate_ignores_bad_dt() {
        let physics = PhysicsConfig::default();
        let p = player();
        assert_eq!(integrate(p, &physics, f32::NAN), p);
        assert_eq!(integrate(p, &physics, -1.0), p);
        assert_eq!(integrate(p, &physics, 0.0), p);
    }

    #[test]
    fn test_single_tap_is_base_velocity() {
        let mut combo = TapCombo::new();
        let p = activate(player(), -280.0, &mut combo, 1000.0);
        assert_eq!(p.vel.y, -280.0);
        assert_eq!(combo.count(), 1);
    }

    #[test]
    fn test_combo_bands() {
        let mut combo = TapCombo::new();
        let mults: Vec<f32> = (0..12).map(|i| combo.register(i as f64 * 50.0)).collect();
        assert_eq!(mults[0], 1.0);
        assert_eq!(mults[1], 1.1);
        assert_eq!(mults[3], 1.1);
        assert_eq!(mults[4], 1.2);
        assert_eq!(mults[8], 1.2);
        assert_eq!(mults[9], 1.3);
        assert_eq!(mults[11], 1.3);
    }

    #[test]
    fn test_ten_fast_taps_reach_max_boost() {
        let mut combo = TapCombo::new();
        let mut p = player();
        for i in 0..10 {
            p = activate(p, -280.0, &mut combo, i as f64 * 50.0);
        }
        assert!((p.vel.y - -364.0).abs() < 1e-3, "vy = {}", p.vel.y);
    }

    #[test]
    fn test_fifth_tap_is_medium_boost() {
        let mut combo = TapCombo::new();
        let mut p = player();
        for i in 0..5 {
            p = activate(p, -280.0, &mut combo, i as f64 * 50.0);
        }
        assert!((p.vel.y - -336.0).abs() < 1e-3);
    }

    #[test]
    fn test_slow_tap_breaks_chain() {
        let mut combo = TapCombo::new();
        combo.register(0.0);
        combo.register(100.0);
        combo.register(200.0);
        assert_eq!(combo.count(), 3);
        assert_eq!(combo.register(501.0), 1.0);
        assert_eq!(combo.count(), 1);
    }

    #[test]
    fn test_combo_is_capped() {
        let mut combo = TapCombo::new();
        for i in 0..200 {
            combo.register(i as f64 * 10.0);
        }
        assert_eq!(combo.count(), COMBO_CAP);
        assert_eq!(combo.multiplier(), 1.3);
    }

    #[test]
    fn test_combo_reset() {
        let mut combo = TapCombo::new();
        combo.register(0.0);
        combo.register(10.0);
        combo.reset();
        assert_eq!(combo.count(), 0);
        // First tap after reset is never part of an old chain
        assert_eq!(combo.register(20.0), 1.0);
    }

    #[test]
    fn test_activation_is_upward() {
        let mut combo = TapCombo::new();
        let mut p = player();
        p.vel.y = 250.0;
        let before = p.vel.y;
        let p = activate(p, -280.0, &mut combo, 0.0);
        assert!(p.vel.y < before);
        assert!(p.vel.y < 0.0);
    }

    #[test]
    fn test_floor_and_ceiling_clamp() {
        let mut p = player();
        p.pos.y = 695.0;
        p.vel.y = 300.0;
        assert_eq!(p.clamp_to_bounds(0.0, 700.0), Some(Boundary::Floor));
        assert_eq!(p.pos.y, 680.0);
        assert_eq!(p.vel.y, 0.0);

        p.pos.y = 5.0;
        p.vel.y = -300.0;
        assert_eq!(p.clamp_to_bounds(0.0, 700.0), Some(Boundary::Ceiling));
        assert_eq!(p.pos.y, 20.0);

        p.pos.y = 300.0;
        assert_eq!(p.clamp_to_bounds(0.0, 700.0), None);
    }

    #[test]
    fn test_resting_on_floor_is_contact() {
        let mut p = player();
        p.radius = 10.0731;
        p.pos.y = 600.0 - p.radius;
        assert_eq!(p.clamp_to_bounds(0.0, 600.0), Some(Boundary::Floor));
        assert_eq!(p.clamp_to_bounds(0.0, 600.0), Some(Boundary::Floor));

        p.pos.y = p.radius;
        assert_eq!(p.clamp_to_bounds(0.0, 600.0), Some(Boundary::Ceiling));
    }
}
