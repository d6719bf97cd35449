//! Suika Engine -- runs the fruit-merging rules on rapier2d.
//!
//! `suika-rules` decides what happens when fruit collide; this crate supplies
//! the world they collide in. It provides:
//!
//! - [`RapierPhysics`](physics::RapierPhysics): a deterministic rapier2d
//!   implementation of the rules' physics backend.
//! - [`Session`](session::Session): a fixed-step game loop with diagnostics,
//!   state hashing and input replay.
//! - [`Autoplayer`](autoplay::Autoplayer): a seeded player for headless runs.
//! - [`TracingUi`](ui::TracingUi): a display that logs through `tracing`.
//!
//! # Quick Start
//!
//! ```
//! use suika_engine::prelude::*;
//!
//! let config = GameConfig { seed: Some(42), ..Default::default() };
//! let mut session = Session::new(config, RecordingUi::default()).unwrap();
//! let mut player = Autoplayer::new(42, 20);
//!
//! player.run(&mut session, 120);
//! assert_eq!(player.drops(), 6);
//! ```

#![deny(unsafe_code)]

pub mod autoplay;
pub mod physics;
pub mod session;
pub mod ui;

use std::path::{Path, PathBuf};

use suika_rules::config::GameConfig;
use suika_rules::RulesError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from setting up or replaying a session.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The rules rejected the configuration.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// A config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A replay log holds an input after its last tick.
    #[error("replay input at tick {tick} is past the end of the log ({total_ticks} ticks)")]
    ReplayInput { tick: u64, total_ticks: u64 },
}

/// Read and validate a JSON game config.
pub fn load_config(path: impl AsRef<Path>) -> Result<GameConfig, EngineError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(GameConfig::from_json_str(&text)?)
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::autoplay::Autoplayer;
    pub use crate::physics::RapierPhysics;
    pub use crate::session::{
        hash_snapshot, replay, InputRecord, ReplayResult, Session, SessionInput, SessionLog,
        TickDiagnostics,
    };
    pub use crate::ui::TracingUi;
    pub use crate::{load_config, EngineError};
    pub use suika_rules::prelude::*;
}
