//! A display that writes to the log.

use suika_rules::fruit::FruitType;
use suika_rules::ui::UiSink;
use tracing::info;

/// [`UiSink`] for headless runs: every update becomes an `info!` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUi;

impl UiSink for TracingUi {
    fn show_preview(&mut self, fruit: FruitType, texture: &str) {
        info!(%fruit, texture, "preview");
    }

    fn show_score(&mut self, score: u64) {
        info!(score, "score");
    }

    fn announce_win(&mut self, message: &str) {
        info!(message, "win");
    }

    fn set_reset_visible(&mut self, visible: bool) {
        info!(visible, "reset control");
    }
}
