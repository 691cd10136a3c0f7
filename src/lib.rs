//! Tapwing - simulation core of a side-scrolling tap-to-fly game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, obstacles, collisions, run state)
//! - `config`: Data-driven geometry and tuning
//! - `highscores`: Best score persistence boundary

pub mod config;
pub mod highscores;
pub mod sim;

pub use config::GameConfig;
pub use highscores::{BestScore, BestScoreStore};

/// Simulation constants that are not part of the tunable config
pub mod consts {
    /// Delta used for the very first frame (no previous timestamp yet)
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;
    /// Smallest delta we trust (120 fps equivalent)
    pub const MIN_DT: f32 = 1.0 / 120.0;
    /// Largest delta we trust (20 fps equivalent)
    pub const MAX_DT: f32 = 1.0 / 20.0;

    /// Taps closer together than this extend the combo chain (ms)
    pub const COMBO_WINDOW_MS: f64 = 300.0;
    /// Combo counter never grows past this
    pub const COMBO_CAP: u32 = 50;

    /// Hard cap on live obstacle pairs
    pub const MAX_LIVE_PAIRS: usize = 6;
}

/// Clamp a raw frame delta into the trusted range.
///
/// Non-finite or non-positive input falls back to [`consts::DEFAULT_DT`].
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return consts::DEFAULT_DT;
    }
    dt.clamp(consts::MIN_DT, consts::MAX_DT)
}

/// Returns `value` if it is finite and strictly positive, otherwise `fallback`
#[inline]
pub fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}
