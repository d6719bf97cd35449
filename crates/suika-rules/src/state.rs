//! Score and the active flag.

use serde::{Deserialize, Serialize};

/// The mutable scoreboard of one game.
///
/// `active == false` is terminal until the game is reset, which replaces the
/// whole value with [`GameState::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    score: u64,
    active: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// A fresh, playable state with zero score.
    pub fn new() -> Self {
        Self {
            score: 0,
            active: true,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Whether the player may drop fruit.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Add merge points. Saturates rather than wrapping.
    pub fn add_score(&mut self, points: u64) -> u64 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// End play. Idempotent.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
