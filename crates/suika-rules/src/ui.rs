//! The display collaborator.
//!
//! The rules write to the UI and never read from it. A [`UiSink`] receives the
//! preview image, the score, the win message and the visibility of the reset
//! control. [`RecordingUi`] keeps every update in order, which is what tests
//! and headless runs want.

use serde::{Deserialize, Serialize};

use crate::fruit::FruitType;

/// Write-only view of the game's display.
pub trait UiSink {
    /// The next fruit to drop changed.
    fn show_preview(&mut self, fruit: FruitType, texture: &str);
    /// The score changed.
    fn show_score(&mut self, score: u64);
    /// The player produced the largest fruit.
    fn announce_win(&mut self, message: &str);
    /// Show or hide the reset control.
    fn set_reset_visible(&mut self, visible: bool);
}

/// One call made on a [`UiSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiUpdate {
    Preview { fruit: FruitType, texture: String },
    Score(u64),
    Win(String),
    ResetVisible(bool),
}

/// A [`UiSink`] that records every update.
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    updates: Vec<UiUpdate>,
}

impl RecordingUi {
    /// All updates, oldest first.
    pub fn updates(&self) -> &[UiUpdate] {
        &self.updates
    }

    /// Forget every recorded update.
    pub fn clear(&mut self) {
        self.updates.clear();
    }

    /// The most recently shown preview.
    pub fn last_preview(&self) -> Option<FruitType> {
        self.updates.iter().rev().find_map(|u| match u {
            UiUpdate::Preview { fruit, .. } => Some(*fruit),
            _ => None,
        })
    }

    /// The most recently shown score.
    pub fn last_score(&self) -> Option<u64> {
        self.updates.iter().rev().find_map(|u| match u {
            UiUpdate::Score(score) => Some(*score),
            _ => None,
        })
    }

    /// Whether the reset control is currently visible. Hidden until shown.
    pub fn reset_visible(&self) -> bool {
        self.updates
            .iter()
            .rev()
            .find_map(|u| match u {
                UiUpdate::ResetVisible(visible) => Some(*visible),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Number of win announcements made.
    pub fn win_count(&self) -> usize {
        self.updates
            .iter()
            .filter(|u| matches!(u, UiUpdate::Win(_)))
            .count()
    }
}

impl UiSink for RecordingUi {
    fn show_preview(&mut self, fruit: FruitType, texture: &str) {
        self.updates.push(UiUpdate::Preview {
            fruit,
            texture: texture.to_owned(),
        });
    }

    fn show_score(&mut self, score: u64) {
        self.updates.push(UiUpdate::Score(score));
    }

    fn announce_win(&mut self, message: &str) {
        self.updates.push(UiUpdate::Win(message.to_owned()));
    }

    fn set_reset_visible(&mut self, visible: bool) {
        self.updates.push(UiUpdate::ResetVisible(visible));
    }
}

impl<U: UiSink + ?Sized> UiSink for &mut U {
    fn show_preview(&mut self, fruit: FruitType, texture: &str) {
        (**self).show_preview(fruit, texture);
    }

    fn show_score(&mut self, score: u64) {
        (**self).show_score(score);
    }

    fn announce_win(&mut self, message: &str) {
        (**self).announce_win(message);
    }

    fn set_reset_visible(&mut self, visible: bool) {
        (**self).set_reset_visible(visible);
    }
}
