//! Run state and the session that owns it
//!
//! A [`Session`] is everything one player's process needs: the world snapshot,
//! spawn/combo timers, difficulty, score and best score. Nothing in the
//! simulation is global, so two sessions never leak into each other.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionResult;
use super::difficulty::{AdaptiveDifficulty, DifficultySettings, Tier};
use super::obstacles::{ObstacleManager, ObstaclePair};
use super::player::{Player, TapCombo, activate};
use super::rng::{RandomSource, RngState};
use super::tick::FrameClock;
use crate::config::GameConfig;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    /// Waiting for the first activate; nothing moves
    #[default]
    Menu,
    /// Ticks advance the world
    Playing,
    /// World frozen mid-run
    Paused,
    /// Run ended by a collision; the world stays as it was at impact
    GameOver,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Menu => "menu",
            RunState::Playing => "playing",
            RunState::Paused => "paused",
            RunState::GameOver => "game over",
        }
    }
}

/// Something presentation collaborators may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    StateChanged { from: RunState, to: RunState },
    /// `combo` is the chain length including this flap
    Flapped { combo: u32 },
    Spawned { id: u32 },
    Scored { id: u32, score: u32 },
    TierChanged(Tier),
    Collided(CollisionResult),
    NewBest(u32),
}

/// Entity snapshot shared by the per-tick components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub player: Player,
    /// Live pairs, oldest (leftmost) first
    pub pairs: Vec<ObstaclePair>,
}

impl World {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            player: Player::new(&config.player),
            pairs: Vec::new(),
        }
    }

    pub fn reset(&mut self, config: &GameConfig) {
        self.player = Player::new(&config.player);
        self.pairs.clear();
    }
}

/// One game session: a sequence of runs sharing a best score
#[derive(Debug)]
pub struct Session<R = Pcg32> {
    pub(crate) config: GameConfig,
    pub(crate) rng: R,
    pub(crate) seed: Option<RngState>,
    pub(crate) state: RunState,
    pub(crate) world: World,
    pub(crate) obstacles: ObstacleManager,
    pub(crate) combo: TapCombo,
    pub(crate) difficulty: AdaptiveDifficulty,
    pub(crate) score: u32,
    pub(crate) best_score: u32,
    /// Best score when the current run started
    pub(crate) run_start_best: u32,
    pub(crate) new_best: bool,
    /// Simulated time of the current run (ms)
    pub(crate) elapsed_ms: f64,
    pub(crate) clock: FrameClock,
    pub(crate) last_collision: CollisionResult,
    pub(crate) events: Vec<SimEvent>,
}

impl Session<Pcg32> {
    /// Seeded session. `best_score` is the persisted best loaded at startup.
    pub fn new(config: GameConfig, seed: u64, best_score: u32) -> Self {
        let rng_state = RngState::new(seed);
        let mut session = Self::with_rng(config, rng_state.to_rng(), best_score);
        session.seed = Some(rng_state);
        session
    }
}

impl<R: RandomSource> Session<R> {
    /// Session drawing randomness from any source
    pub fn with_rng(config: GameConfig, rng: R, best_score: u32) -> Self {
        let config = config.sanitized();
        log::info!("session created, best score {}", best_score);
        Self {
            world: World::new(&config),
            difficulty: AdaptiveDifficulty::new(config.tuning.clone()),
            config,
            rng,
            seed: None,
            state: RunState::Menu,
            obstacles: ObstacleManager::new(),
            combo: TapCombo::new(),
            score: 0,
            best_score,
            run_start_best: best_score,
            new_best: false,
            elapsed_ms: 0.0,
            clock: FrameClock::new(),
            last_collision: CollisionResult::None,
            events: Vec::new(),
        }
    }

    // === Read accessors ===

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed.map(|s| s.seed)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> &Player {
        &self.world.player
    }

    pub fn pairs(&self) -> &[ObstaclePair] {
        &self.world.pairs
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Set when a run ends above the previous best; stays set until acknowledged
    pub fn new_best(&self) -> bool {
        self.new_best
    }

    pub fn acknowledge_new_best(&mut self) {
        self.new_best = false;
    }

    pub fn combo_count(&self) -> u32 {
        self.combo.count()
    }

    pub fn tier(&self) -> Tier {
        self.difficulty.tier()
    }

    pub fn consecutive_deaths(&self) -> u32 {
        self.difficulty.consecutive_deaths()
    }

    /// Settings the obstacle manager is currently using
    pub fn difficulty_settings(&self) -> DifficultySettings {
        self.difficulty.current_settings(&self.config)
    }

    pub fn obstacle_manager(&self) -> &ObstacleManager {
        &self.obstacles
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Collision that ended the last run (None while a run is in progress)
    pub fn last_collision(&self) -> CollisionResult {
        self.last_collision
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    // === Transitions ===

    fn set_state(&mut self, to: RunState) {
        let from = self.state;
        if from != to {
            log::info!("state: {} -> {}", from.as_str(), to.as_str());
            self.state = to;
            self.events.push(SimEvent::StateChanged { from, to });
        }
    }

    fn reject(&self, request: &str) -> bool {
        log::debug!("{} ignored in state {}", request, self.state.as_str());
        false
    }

    /// Menu -> Playing
    pub fn start(&mut self) -> bool {
        if self.state != RunState::Menu {
            return self.reject("start");
        }
        self.begin_run();
        true
    }

    /// Fresh round straight into Playing
    fn begin_run(&mut self) {
        self.reset_round();
        self.set_state(RunState::Playing);
        // Immediate feedback: the run begins with a flap
        self.flap();
    }

    /// Playing -> Paused
    pub fn pause(&mut self) -> bool {
        if self.state != RunState::Playing {
            return self.reject("pause");
        }
        self.set_state(RunState::Paused);
        true
    }

    /// Paused -> Playing. The next frame uses a fresh reference time.
    pub fn resume(&mut self) -> bool {
        if self.state != RunState::Paused {
            return self.reject("resume");
        }
        self.clock.reset();
        self.set_state(RunState::Playing);
        true
    }

    /// GameOver -> Playing with a fresh round
    pub fn restart(&mut self) -> bool {
        if self.state != RunState::GameOver {
            return self.reject("restart");
        }
        self.begin_run();
        true
    }

    /// GameOver or Paused -> Menu with a fresh round
    pub fn return_to_menu(&mut self) -> bool {
        if !matches!(self.state, RunState::GameOver | RunState::Paused) {
            return self.reject("return to menu");
        }
        self.reset_game();
        true
    }

    /// Clear the round and go back to the menu. The best score survives.
    pub fn reset_game(&mut self) {
        self.reset_round();
        self.set_state(RunState::Menu);
    }

    fn reset_round(&mut self) {
        self.world.reset(&self.config);
        self.obstacles.reset();
        self.combo.reset();
        self.difficulty.reset_run();
        self.clock.reset();
        self.score = 0;
        self.elapsed_ms = 0.0;
        self.run_start_best = self.best_score;
        self.last_collision = CollisionResult::None;
    }

    // === Input ===

    /// The single "activate" input: flaps while playing, starts a run from the menu.
    pub fn activate(&mut self) -> bool {
        match self.state {
            RunState::Playing => {
                self.flap();
                true
            }
            RunState::Menu => self.start(),
            _ => self.reject("activate"),
        }
    }

    pub(crate) fn flap(&mut self) {
        let jump = self.config.physics.jump_velocity;
        self.world.player = activate(self.world.player, jump, &mut self.combo, self.elapsed_ms);
        self.events.push(SimEvent::Flapped {
            combo: self.combo.count(),
        });
    }

    // === Tick hooks ===

    pub(crate) fn add_score(&mut self, scored_ids: &[u32]) {
        for &id in scored_ids {
            self.score += 1;
            self.events.push(SimEvent::Scored { id, score: self.score });
        }
        if scored_ids.is_empty() {
            return;
        }
        self.best_score = self.best_score.max(self.score);
        self.difficulty.on_score_increase();
        if let Some(tier) = self.difficulty.update_score(self.score) {
            self.events.push(SimEvent::TierChanged(tier));
        }
    }

    /// Playing -> GameOver, only ever caused by a collision
    pub(crate) fn end_run(&mut self, collision: CollisionResult) {
        self.last_collision = collision;
        self.events.push(SimEvent::Collided(collision));
        self.best_score = self.best_score.max(self.score);
        if self.score > self.run_start_best {
            log::info!("new best score {} (was {})", self.score, self.run_start_best);
            self.new_best = true;
            self.events.push(SimEvent::NewBest(self.best_score));
        }
        self.difficulty.on_death();
        log::info!("run over: {:?}, score {}", collision, self.score);
        self.set_state(RunState::GameOver);
    }
}
