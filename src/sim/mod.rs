//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same config, seed and inputs a
//! session always plays out the same way:
//! - Randomness only through [`RandomSource`]
//! - Stable iteration order (pairs oldest first)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod obstacles;
pub mod player;
pub mod rect;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{CapShape, CollisionResult, body_and_cap, detect};
pub use difficulty::{AdaptiveDifficulty, Adjustment, DifficultySettings, SpawnPattern, Tier};
pub use obstacles::{AdvanceOutcome, Obstacle, ObstacleManager, ObstaclePair, Side, center_band};
pub use player::{Boundary, Player, TapCombo, activate, combo_multiplier, integrate};
pub use rect::Rect;
pub use rng::{RandomSource, RngState, ScriptedRandom};
pub use state::{RunState, Session, SimEvent, World};
pub use tick::{FrameClock, TickInput, TickOutcome, tick};
