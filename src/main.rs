//! Tapwing headless demo
//!
//! Plays one autopilot run at a fixed 60 Hz and logs what happened.
//!
//! Usage: `tapwing [seed] [best-score.json] [config.json]`

use tapwing::GameConfig;
use tapwing::highscores::{BestScoreStore, JsonFileStore, MemoryStore};
use tapwing::sim::{RunState, Session, SimEvent, TickInput, tick};

/// Ten minutes of play
const MAX_TICKS: u32 = 60 * 60 * 10;
const DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(err)) => {
            log::warn!("bad seed ({}), using 42", err);
            42
        }
        None => 42,
    };
    let mut store: Box<dyn BestScoreStore> = match args.next() {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };
    let config = args.next().map(load_config).unwrap_or_default();

    log::info!("Tapwing (headless) starting with seed {}", seed);
    let mut session = Session::new(config, seed, store.load());
    session.start();

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let mut ticks = 0;
    while session.state() == RunState::Playing && ticks < MAX_TICKS {
        tick(&mut session, &input, DT);
        ticks += 1;

        for event in session.drain_events() {
            match event {
                SimEvent::Scored { score, .. } => log::debug!("score {}", score),
                SimEvent::TierChanged(tier) => log::info!("difficulty now {}", tier.as_str()),
                SimEvent::NewBest(best) => {
                    if let Err(err) = store.save(best) {
                        log::warn!("could not save best score: {}", err);
                    }
                }
                _ => {}
            }
        }
    }

    println!(
        "seed {}: score {} (best {}) after {:.1}s, ended by {:?}",
        seed,
        session.score(),
        session.best_score(),
        ticks as f32 * DT,
        session.last_collision(),
    );
}

fn load_config(path: String) -> GameConfig {
    let parsed = std::fs::read_to_string(&path)
        .map_err(|err| log::warn!("could not read {}: {}", path, err))
        .ok()
        .and_then(|json| GameConfig::from_json(&json));
    match parsed {
        Some(config) => {
            log::info!("loaded config from {}", path);
            config
        }
        None => {
            log::warn!("using default config");
            GameConfig::default()
        }
    }
}
