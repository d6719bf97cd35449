//! A seeded player that drops fruit on a fixed cadence.
//!
//! Useful for headless runs and for driving long deterministic sessions in
//! tests. The drop position is drawn uniformly from the span where the preview
//! fruit fits between the walls.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use suika_rules::arena::drop_range;
use suika_rules::game::Transition;
use suika_rules::ui::UiSink;

use crate::session::Session;

/// Drops the preview every `interval` ticks while the game is active.
#[derive(Debug, Clone)]
pub struct Autoplayer {
    rng: Pcg32,
    interval: u64,
    drops: u64,
}

impl Autoplayer {
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn new(seed: u64, interval: u64) -> Self {
        assert!(interval > 0, "autoplay interval must be at least one tick");
        Self {
            rng: Pcg32::seed_from_u64(seed),
            interval,
            drops: 0,
        }
    }

    /// Number of drops made so far.
    pub fn drops(&self) -> u64 {
        self.drops
    }

    /// Drop if this tick is on the cadence, then tick once.
    pub fn step<U: UiSink>(&mut self, session: &mut Session<U>) -> Vec<Transition> {
        let game = session.game();
        if game.is_active() && game.tick_count() % self.interval == 0 {
            let radius = game.registry().radius(game.preview());
            let (lo, hi) = drop_range(game.config(), radius);
            let x = if hi > lo { self.rng.gen_range(lo..=hi) } else { lo };
            session.click(x);
            self.drops += 1;
        }
        session.tick()
    }

    /// Play `ticks` ticks.
    pub fn run<U: UiSink>(&mut self, session: &mut Session<U>, ticks: u64) -> Vec<Transition> {
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(self.step(session));
        }
        all
    }
}
