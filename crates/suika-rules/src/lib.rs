//! Suika Rules -- the merge/spawn state machine of a fruit-merging drop game.
//!
//! Fruits of increasing size drop into a walled container. When two fruits of
//! the same type touch, both are removed and one fruit of the next type
//! appears at their midpoint. Producing the largest fruit wins the game.
//!
//! This crate owns every rule of the game and nothing else. The rigid-body
//! simulation sits behind the [`PhysicsBackend`](physics::PhysicsBackend)
//! trait and the display behind the [`UiSink`](ui::UiSink) trait, so the rules
//! can be driven by a deterministic stub in tests and by a real physics engine
//! in the `suika-engine` crate.
//!
//! # Quick Start
//!
//! ```
//! use suika_rules::prelude::*;
//!
//! let config = GameConfig { seed: Some(7), ..Default::default() };
//! let mut game = Game::new(config, ScriptedPhysics::new(), RecordingUi::default()).unwrap();
//!
//! let zero = game.registry().fruit(0).unwrap();
//! let a = game.spawn(100.0, 500.0, zero).unwrap();
//! let b = game.spawn(140.0, 500.0, zero).unwrap();
//!
//! game.physics_mut().queue_collision(a, b);
//! game.tick();
//!
//! assert_eq!(game.score(), 10);
//! assert_eq!(game.fruit_bodies().len(), 1);
//! ```

#![deny(unsafe_code)]

pub mod arena;
pub mod body;
pub mod config;
pub mod fruit;
pub mod game;
pub mod merge;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod ui;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while building or configuring a game.
///
/// Gameplay itself never fails: every input produced during play is valid by
/// construction, and ignored inputs are reported as
/// [`Transition::Ignored`](game::Transition::Ignored) instead.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// A raw fruit index outside the registry was requested.
    #[error("fruit type {index} is out of range (registry holds {count} types)")]
    UnknownFruitType { index: usize, count: usize },

    /// A configuration value is outside its valid range.
    #[error("invalid config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The configuration document could not be parsed.
    #[error("failed to parse game config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::arena::build_walls;
    pub use crate::body::{
        BodyDesc, BodyId, BodyKind, BodyLabel, BodySnapshot, CollisionPair, Position, Shape,
    };
    pub use crate::config::GameConfig;
    pub use crate::fruit::{FruitRegistry, FruitSpec, FruitType};
    pub use crate::game::{FruitSnapshot, Game, GameEvent, GameSnapshot, IgnoreReason, Transition};
    pub use crate::merge::{MergeOutcome, PairVerdict};
    pub use crate::physics::{PhysicsBackend, ScriptedPhysics};
    pub use crate::spawn::SpawnController;
    pub use crate::state::GameState;
    pub use crate::ui::{RecordingUi, UiSink, UiUpdate};
    pub use crate::RulesError;
}
