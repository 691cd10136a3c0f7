//! Full sessions driven through the public API

use tapwing::GameConfig;
use tapwing::highscores::{BestScoreStore, MemoryStore};
use tapwing::sim::{CollisionResult, Player, RunState, Session, SimEvent, TickInput, tick};

const DT: f32 = 1.0 / 60.0;

fn autopilot() -> TickInput {
    TickInput {
        autopilot: true,
        ..Default::default()
    }
}

/// Tick until the run ends or `max_ticks` pass; returns the ticks used
fn play_out(session: &mut Session, input: &TickInput, max_ticks: u32) -> u32 {
    let mut ticks = 0;
    while session.state() == RunState::Playing && ticks < max_ticks {
        tick(session, input, DT);
        ticks += 1;
    }
    ticks
}

/// Autopilot for a while, then let the player drop until the run ends
fn play_then_crash(session: &mut Session, autopilot_ticks: u32) {
    play_out(session, &autopilot(), autopilot_ticks);
    while session.state() == RunState::Playing {
        tick(session, &TickInput::default(), DT);
    }
}

#[test]
fn test_lifecycle() {
    let mut session = Session::new(GameConfig::default(), 7, 0);
    assert_eq!(session.state(), RunState::Menu);

    assert!(session.start());
    play_out(&mut session, &TickInput::default(), 10_000);
    assert_eq!(session.state(), RunState::GameOver);
    assert!(session.last_collision().is_hit());

    assert!(session.restart());
    assert_eq!(session.state(), RunState::Playing);
    assert_eq!(session.score(), 0);
    assert!(session.pairs().is_empty());

    assert!(session.pause());
    assert!(session.return_to_menu());
    assert_eq!(session.state(), RunState::Menu);
}

#[test]
fn test_reset_is_complete() {
    let mut session = Session::new(GameConfig::default(), 2024, 3);
    session.start();
    play_out(&mut session, &autopilot(), 20_000);
    let best = session.best_score();

    session.reset_game();
    assert_eq!(*session.player(), Player::new(&session.config().player));
    assert!(session.pairs().is_empty());
    assert_eq!(session.score(), 0);
    assert_eq!(session.combo_count(), 0);
    assert_eq!(session.obstacle_manager().timer_ms(), 0.0);
    assert_eq!(session.best_score(), best);
}

#[test]
fn test_pause_freezes_world() {
    let mut session = Session::new(GameConfig::default(), 11, 0);
    session.start();
    for _ in 0..90 {
        tick(&mut session, &autopilot(), DT);
    }
    assert!(session.pause());
    let player = *session.player();
    let pairs = session.pairs().to_vec();
    let timer = session.obstacle_manager().timer_ms();

    for i in 0..500 {
        assert!(session.frame(i as f64 * 16.0, &autopilot()).is_none());
    }
    assert_eq!(*session.player(), player);
    assert_eq!(session.pairs(), pairs.as_slice());
    assert_eq!(session.obstacle_manager().timer_ms(), timer);

    assert!(session.resume());
    assert!(tick(&mut session, &autopilot(), DT).is_some());
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed| {
        let mut session = Session::new(GameConfig::default(), seed, 0);
        session.start();
        let ticks = play_out(&mut session, &autopilot(), 5_000);
        (ticks, session.score(), *session.player(), session.pairs().to_vec())
    };
    assert_eq!(run(31337), run(31337));
}

#[test]
fn test_best_score_never_decreases() {
    let mut store = MemoryStore::new();
    let mut session = Session::new(GameConfig::default(), 5, store.load());
    let mut last_best = session.best_score();

    for _ in 0..5 {
        if session.state() == RunState::GameOver {
            session.restart();
        } else {
            session.start();
        }
        let mut ticks = 0;
        while session.state() == RunState::Playing {
            let input = if ticks < 3_000 { autopilot() } else { TickInput::default() };
            tick(&mut session, &input, DT);
            ticks += 1;
            assert!(session.best_score() >= session.score());
            assert!(session.best_score() >= last_best);
            last_best = session.best_score();
        }
        for event in session.drain_events() {
            if let SimEvent::NewBest(best) = event {
                store.save(best).unwrap();
            }
        }
        assert_eq!(store.load(), session.best_score());
    }
}

#[test]
fn test_new_best_flag_needs_acknowledging() {
    let mut session = Session::new(GameConfig::default(), 8, 0);
    session.start();
    play_then_crash(&mut session, 20_000);
    assert_eq!(session.state(), RunState::GameOver);

    if session.score() > 0 {
        assert!(session.new_best());
        session.restart();
        // Still set until the consumer clears it
        assert!(session.new_best());
        session.acknowledge_new_best();
        assert!(!session.new_best());
    } else {
        assert!(!session.new_best());
    }
}

#[test]
fn test_death_streak_softens_difficulty() {
    let mut session = Session::new(GameConfig::default(), 1, 0);
    let easy = session.difficulty_settings();
    for _ in 0..3 {
        if session.state() == RunState::GameOver {
            session.restart();
        } else {
            session.start();
        }
        play_out(&mut session, &TickInput::default(), 10_000);
        assert_eq!(session.last_collision(), CollisionResult::Ground);
    }
    assert_eq!(session.consecutive_deaths(), 3);
    let soft = session.difficulty_settings();
    assert!(soft.gap_size > easy.gap_size);
    assert!(soft.spawn_interval_ms > easy.spawn_interval_ms);
    assert!(soft.speed_multiplier < easy.speed_multiplier);
}
