//! Variable timestep simulation tick
//!
//! One call advances a playing session by a clamped frame delta. Order inside a
//! tick is fixed: input, player, obstacles, scoring, collision.

use serde::{Deserialize, Serialize};

use super::collision::{CapShape, CollisionResult, detect};
use super::player::{Boundary, integrate};
use super::rng::RandomSource;
use super::state::{RunState, Session, SimEvent};
use crate::clamp_dt;
use crate::consts::DEFAULT_DT;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Tap / click / space
    pub activate: bool,
    /// Demo mode: the autopilot decides when to flap
    pub autopilot: bool,
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Delta actually simulated (seconds)
    pub dt: f32,
    pub score_delta: u32,
    pub spawned: Option<u32>,
    pub collision: CollisionResult,
}

/// Turns wall-clock timestamps into trusted frame deltas
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous frame, in seconds.
    ///
    /// The first frame after creation or [`reset`](Self::reset) gets the
    /// default delta. Everything else goes through [`clamp_dt`].
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        if !now_ms.is_finite() {
            return DEFAULT_DT;
        }
        match self.last_ms.replace(now_ms) {
            Some(last) => clamp_dt(((now_ms - last) / 1000.0) as f32),
            None => DEFAULT_DT,
        }
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Advance the session by one step of `dt` seconds.
///
/// Returns `None` (and touches nothing) unless the run is playing.
pub fn tick<R: RandomSource>(session: &mut Session<R>, input: &TickInput, dt: f32) -> Option<TickOutcome> {
    if session.state != RunState::Playing {
        return None;
    }
    let dt = clamp_dt(dt);

    if input.activate || (input.autopilot && autopilot_wants_flap(session)) {
        session.flap();
    }

    session.elapsed_ms += dt as f64 * 1000.0;

    // Player
    let screen = &session.config.screen;
    let mut player = integrate(session.world.player, &session.config.physics, dt);
    let contact = player.clamp_to_bounds(screen.ceiling_y, screen.floor_y);
    session.world.player = player;

    // Obstacles
    let settings = session.difficulty.current_settings(&session.config);
    let advance = session.obstacles.advance(
        &mut session.world,
        &settings,
        &session.config,
        dt,
        &mut session.rng,
    );
    for id in advance.bootstrapped.into_iter().chain(advance.spawned) {
        session.events.push(SimEvent::Spawned { id });
    }
    session.add_score(&advance.scored_ids);

    // Collision. A clamp contact is authoritative: the re-derived rect may sit
    // one rounding step short of the line.
    let screen = &session.config.screen;
    let collision = match contact {
        Some(Boundary::Floor) => CollisionResult::Ground,
        Some(Boundary::Ceiling) => CollisionResult::Ceiling,
        None => detect(
            &session.world.player.bounds(),
            &session.world.pairs,
            screen.floor_y,
            screen.ceiling_y,
            &CapShape::from(&session.config.obstacle),
        ),
    };
    if collision.is_hit() {
        session.end_run(collision);
    }

    Some(TickOutcome {
        dt,
        score_delta: advance.score_delta,
        spawned: advance.spawned,
        collision,
    })
}

/// Flap when the player is predicted to sink below the next gap's center
fn autopilot_wants_flap<R>(session: &Session<R>) -> bool {
    let player = &session.world.player;
    let left = player.pos.x - player.radius;
    let target = session
        .world
        .pairs
        .iter()
        .find(|pair| pair.right() > left)
        .map(|pair| pair.gap_center())
        .unwrap_or(session.config.player.start_y);
    let predicted = player.pos.y + player.vel.y * 0.15;
    predicted > target && player.vel.y > 0.0
}

impl<R: RandomSource> Session<R> {
    /// Drive the session from a wall-clock timestamp (ms).
    ///
    /// While not playing the frame clock is held reset, so the first frame
    /// after a pause or a restart never sees the time spent away.
    pub fn frame(&mut self, now_ms: f64, input: &TickInput) -> Option<TickOutcome> {
        if self.state != RunState::Playing {
            self.clock.reset();
            return None;
        }
        let dt = self.clock.delta(now_ms);
        tick(self, input, dt)
    }
}
