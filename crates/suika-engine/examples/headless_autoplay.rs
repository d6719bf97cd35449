//! Headless autoplay demo.
//!
//! Runs a seeded autoplayer against the rapier-backed game and prints the
//! final snapshot as JSON.
//!
//! Run with: `cargo run -p suika-engine --example headless_autoplay [config.json] [ticks]`
//!
//! Set `RUST_LOG=suika_rules=debug` to watch every spawn and merge.

use anyhow::Context;
use suika_engine::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_TICKS: u64 = 60 * 60;
const DROP_INTERVAL: u64 = 45;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(&path).with_context(|| format!("loading {path}"))?,
        None => GameConfig::default(),
    };
    let ticks = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("tick count {raw:?} is not a number"))?,
        None => DEFAULT_TICKS,
    };

    let mut session = Session::new(config, TracingUi).context("starting session")?;
    let seed = session.game().seed();
    let mut player = Autoplayer::new(seed, DROP_INTERVAL);

    let transitions = player.run(&mut session, ticks);
    let merges = transitions
        .iter()
        .filter(|t| matches!(t, Transition::Merged(_)))
        .count();

    tracing::info!(
        seed,
        ticks,
        drops = player.drops(),
        merges,
        score = session.game().score(),
        hash = %session.state_hash(),
        "autoplay finished"
    );

    let snapshot = session.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
