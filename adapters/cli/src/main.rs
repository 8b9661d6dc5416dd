#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Blockfire levels without a renderer.

mod autopilot;
mod level_file;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use blockfire_session::{GameState, LevelCatalog, LevelSession, SessionConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::autopilot::Autopilot;

const DEMO_CATALOG: &str = include_str!("../levels/demo.toml");

#[derive(Debug, Parser)]
#[command(name = "blockfire")]
#[command(about = "Play Blockfire levels headlessly with a simple autopilot")]
struct Args {
    /// TOML level catalog; the bundled demo catalog is used when omitted
    #[arg(long)]
    levels: Option<PathBuf>,
    /// TOML file overriding gameplay rules
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Seed for target selection, overriding the rules file
    #[arg(long)]
    seed: Option<u64>,
    /// Catalog index of the first level to play
    #[arg(long, default_value_t = 0)]
    start: usize,
    /// Keep playing the following levels after a cleared one
    #[arg(long)]
    all: bool,
    /// Simulated frame length in milliseconds
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Simulated time limit per level in seconds
    #[arg(long, default_value_t = 300)]
    max_seconds: u64,
    /// Time a shooter needs to travel to its platform in milliseconds
    #[arg(long, default_value_t = 250)]
    travel_ms: u64,
}

/// Entry point for the Blockfire command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let levels = match &args.levels {
        Some(path) => level_file::load_catalog(path)?,
        None => level_file::parse_catalog(DEMO_CATALOG).context("bundled demo catalog is invalid")?,
    };
    let mut config = match &args.rules {
        Some(path) => level_file::load_rules(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.world.rng_seed = seed;
    }

    let mut session = LevelSession::with_catalog(config, LevelCatalog::new(levels));
    let mut autopilot = Autopilot::new(Duration::from_millis(args.travel_ms));
    let tick = Duration::from_millis(args.tick_ms.max(1));
    let limit = Duration::from_secs(args.max_seconds);

    let mut events = Vec::new();
    session.load_catalog_level(args.start, &mut events)?;
    loop {
        let state = play_level(&mut session, &mut autopilot, tick, limit);
        let summary = session.summary();
        println!(
            "level {} {:?}: {:?} with score {}/{} ({} of {} blocks) after {:.1}s, gold {}",
            summary.level_number,
            summary.level_name,
            summary.state,
            summary.score,
            summary.target_score,
            summary.destroyed,
            summary.total_blocks,
            summary.elapsed.as_secs_f64(),
            summary.gold,
        );

        if state != GameState::LevelComplete || !args.all {
            break;
        }
        if session.next_level(&mut events).is_err() {
            info!(gold = session.gold(), "catalog complete");
            break;
        }
        autopilot.reset();
    }

    Ok(())
}

fn play_level(
    session: &mut LevelSession,
    autopilot: &mut Autopilot,
    tick: Duration,
    limit: Duration,
) -> GameState {
    let mut events = Vec::new();
    let mut elapsed = Duration::ZERO;
    while session.state() == GameState::Playing && elapsed < limit {
        autopilot.step(session, tick, &mut events);
        session.tick(tick, &mut events);
        elapsed += tick;
        events.clear();
    }
    if session.state() == GameState::Playing {
        info!(seconds = limit.as_secs(), "time limit reached");
    }
    session.state()
}
