//! Game configuration.
//!
//! [`GameConfig`] carries every tunable of a game: container size, fruit
//! table, scoring, timing and the preview RNG seed. Every field has a default,
//! so a JSON document only needs to name the values it overrides:
//!
//! ```
//! use suika_rules::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "fruit_types": 8, "seed": 42 }"#).unwrap();
//! assert_eq!(config.fruit_types, 8);
//! assert_eq!(config.initial_types, 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::RulesError;

/// Tunable parameters of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // -- container ----------------------------------------------------------
    /// Canvas width in pixels.
    pub canvas_width: f32,
    /// Canvas height in pixels. The y axis points down.
    pub canvas_height: f32,
    /// Thickness of the floor and side walls.
    pub wall_thickness: f32,

    // -- fruit table --------------------------------------------------------
    /// Number of fruit types (`N`).
    pub fruit_types: usize,
    /// Previews are drawn from `[0, initial_types)`.
    pub initial_types: usize,
    /// Radius of the smallest fruit.
    pub base_radius: f32,
    /// Radius added per tier.
    pub radius_step: f32,
    /// Directory holding the `{rank}.png` sprites.
    pub asset_dir: String,
    /// Bounciness of fruit bodies.
    pub restitution: f32,

    // -- play ---------------------------------------------------------------
    /// Height at which player drops appear.
    pub drop_y: f32,
    /// Points awarded per merge.
    pub merge_score: u64,
    /// Delay between producing the largest fruit and announcing the win.
    pub win_delay_ms: u64,
    /// Message surfaced when the player wins.
    pub win_message: String,

    // -- simulation ---------------------------------------------------------
    /// Simulation ticks per second.
    pub tick_rate_hz: f32,
    /// Downward acceleration in pixels per second squared.
    pub gravity: f32,
    /// Seed for the preview RNG. `None` draws a random seed.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 400.0,
            canvas_height: 600.0,
            wall_thickness: 60.0,
            fruit_types: 6,
            initial_types: 3,
            base_radius: 20.0,
            radius_step: 5.0,
            asset_dir: "fruits".to_owned(),
            restitution: 0.5,
            drop_y: 50.0,
            merge_score: 10,
            win_delay_ms: 100,
            win_message: "Congratulations, you win!!!".to_owned(),
            tick_rate_hz: 60.0,
            gravity: 980.0,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parse a JSON document and validate the result.
    pub fn from_json_str(json: &str) -> Result<Self, RulesError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its valid range.
    pub fn validate(&self) -> Result<(), RulesError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> RulesError {
            RulesError::InvalidConfig {
                field,
                reason: reason.into(),
            }
        }

        if !(2..=256).contains(&self.fruit_types) {
            return Err(invalid(
                "fruit_types",
                format!("must be in 2..=256, got {}", self.fruit_types),
            ));
        }
        if self.initial_types == 0 || self.initial_types > self.fruit_types {
            return Err(invalid(
                "initial_types",
                format!(
                    "must be in 1..={}, got {}",
                    self.fruit_types, self.initial_types
                ),
            ));
        }
        for (field, value) in [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("base_radius", self.base_radius),
            ("tick_rate_hz", self.tick_rate_hz),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(invalid(field, format!("must be positive and finite, got {value}")));
            }
        }
        for (field, value) in [
            ("wall_thickness", self.wall_thickness),
            ("radius_step", self.radius_step),
            ("gravity", self.gravity),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(invalid(field, format!("must be non-negative and finite, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(invalid(
                "restitution",
                format!("must be in 0.0..=1.0, got {}", self.restitution),
            ));
        }
        Ok(())
    }

    /// Duration of one simulation tick in seconds.
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }

    /// The win delay rounded up to whole ticks.
    pub fn win_delay_ticks(&self) -> u64 {
        let ticks = self.win_delay_ms as f64 * self.tick_rate_hz as f64 / 1000.0;
        ticks.ceil() as u64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
