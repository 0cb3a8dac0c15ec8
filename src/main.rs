//! Headless command-line driver.
//!
//! `redirect gen [count] [seed]` prints a generated level pack as the
//! JSON artifact a frontend would fetch. `redirect play [seed]` runs
//! the simulation loop without a UI, logging every event, until the
//! run ends.

use std::env;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use redirect::events::EventKind;
use redirect::sim::{Engine, LevelGenerator, RunStatus};
use redirect::DEFAULT_LEVEL_COUNT;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("gen") => {
            let count = parse_or(args.get(1), DEFAULT_LEVEL_COUNT);
            let seed = parse_or(args.get(2), clock_seed());
            generate(count, seed)
        }
        Some("play") => {
            let seed = parse_or(args.get(1), clock_seed());
            play(seed)
        }
        _ => {
            eprintln!("usage: redirect gen [count] [seed] | redirect play [seed]");
            ExitCode::FAILURE
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(arg: Option<&String>, default: T) -> T {
    match arg {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("could not parse argument {raw:?}, using default");
                default
            }
        },
        None => default,
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn generate(count: u32, seed: u64) -> ExitCode {
    log::info!("generating {count} levels with seed {seed}");
    let pack = LevelGenerator::new(seed).generate_many(count);
    match serde_json::to_string_pretty(&pack) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to encode level pack: {err}");
            ExitCode::FAILURE
        }
    }
}

fn play(seed: u64) -> ExitCode {
    log::info!("headless run with seed {seed}");
    let levels = LevelGenerator::new(seed).generate_many(DEFAULT_LEVEL_COUNT);
    let mut engine = Engine::new(levels);

    let bus = engine.events();
    let subscriptions = vec![
        bus.subscribe(EventKind::LevelChanged, |event| log::info!("{event:?}")),
        bus.subscribe(EventKind::MovesChanged, |event| log::debug!("{event:?}")),
        bus.subscribe(EventKind::TimeChanged, |event| log::debug!("{event:?}")),
        bus.subscribe(EventKind::ScoreChanged, |event| log::info!("{event:?}")),
        bus.subscribe(EventKind::Ended, |event| log::info!("{event:?}")),
    ];

    engine.start();
    while engine.state().status == RunStatus::Running {
        engine.tick();
    }

    for subscription in &subscriptions {
        subscription.unsubscribe();
    }

    let state = engine.state();
    println!(
        "run over: level {}, score {}, {} moves and {} ticks left",
        state.level_index, state.score, state.moves, state.time
    );
    ExitCode::SUCCESS
}
