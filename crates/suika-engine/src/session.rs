//! Fixed-step game session over the rapier backend.
//!
//! A [`Session`] owns a [`Game`] running on [`RapierPhysics`] and adds what a
//! host loop needs around the rules:
//!
//! - per-tick timing and transition counts ([`TickDiagnostics`]),
//! - a BLAKE3 hash of the game snapshot for determinism checks,
//! - an input log that can be replayed into a fresh session.
//!
//! # Example
//!
//! ```
//! use suika_engine::prelude::*;
//!
//! let config = GameConfig { seed: Some(3), ..Default::default() };
//! let mut session = Session::new(config, RecordingUi::default()).unwrap();
//!
//! session.click(200.0);
//! session.run_ticks(30);
//!
//! assert_eq!(session.game().tick_count(), 30);
//! assert_eq!(session.state_hash().len(), 64);
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use suika_rules::config::GameConfig;
use suika_rules::game::{Game, GameEvent, GameSnapshot, Transition};
use suika_rules::ui::UiSink;
use tracing::{debug, warn};

use crate::physics::RapierPhysics;
use crate::EngineError;

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// What happened during the last tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickDiagnostics {
    /// Wall-clock time for the whole tick (physics step plus rules).
    pub total_time: Duration,
    /// Collision pairs reported by physics.
    pub collisions: usize,
    /// Pairs that merged.
    pub merges: usize,
    /// Whether the win fired on this tick.
    pub win_announced: bool,
}

impl TickDiagnostics {
    fn from_transitions(transitions: &[Transition], total_time: Duration) -> Self {
        let mut diag = Self {
            total_time,
            ..Default::default()
        };
        for t in transitions {
            match t {
                Transition::Merged(_) => {
                    diag.collisions += 1;
                    diag.merges += 1;
                }
                Transition::Ignored(_) => diag.collisions += 1,
                Transition::WinAnnounced => diag.win_announced = true,
                Transition::Spawned { .. } | Transition::Reset { .. } => {}
            }
        }
        diag
    }
}

// ---------------------------------------------------------------------------
// Input log
// ---------------------------------------------------------------------------

/// A player input applied between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionInput {
    Click { x: f32 },
    Reset,
}

/// An input and the tick count at which it was applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub tick: u64,
    pub input: SessionInput,
}

/// Everything needed to reproduce a session.
///
/// The config always carries the concrete seed the session ran with, even if
/// the original config left it unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    pub config: GameConfig,
    pub inputs: Vec<InputRecord>,
    pub total_ticks: u64,
    /// State hash at the end of the recorded session.
    pub final_hash: String,
}

/// Result of [`replay`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult {
    /// The hash the replayed session ended with.
    pub final_hash: String,
    /// Whether it equals the recorded hash.
    pub matches: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A game on rapier physics with diagnostics and input recording.
pub struct Session<U> {
    game: Game<RapierPhysics, U>,
    inputs: Vec<InputRecord>,
    last_diagnostics: TickDiagnostics,
}

impl<U: UiSink> Session<U> {
    /// Build the rapier world for `config` and start a game on it.
    pub fn new(config: GameConfig, ui: U) -> Result<Self, EngineError> {
        let physics = RapierPhysics::from_config(&config);
        let game = Game::new(config, physics, ui)?;
        Ok(Self {
            game,
            inputs: Vec::new(),
            last_diagnostics: TickDiagnostics::default(),
        })
    }

    /// Advance one fixed tick.
    pub fn tick(&mut self) -> Vec<Transition> {
        let start = Instant::now();
        let transitions = self.game.tick();
        self.last_diagnostics = TickDiagnostics::from_transitions(&transitions, start.elapsed());
        if self.last_diagnostics.merges > 0 {
            debug!(
                tick = self.game.tick_count(),
                merges = self.last_diagnostics.merges,
                "tick resolved merges"
            );
        }
        transitions
    }

    /// Advance `count` ticks, returning every transition in order.
    pub fn run_ticks(&mut self, count: u64) -> Vec<Transition> {
        let mut all = Vec::new();
        for _ in 0..count {
            all.extend(self.tick());
        }
        all
    }

    /// Drop the preview fruit at `x`.
    pub fn click(&mut self, x: f32) -> Transition {
        self.record(SessionInput::Click { x });
        self.game.handle(GameEvent::Spawn { x })
    }

    /// Press the reset control.
    pub fn reset(&mut self) -> Transition {
        self.record(SessionInput::Reset);
        self.game.handle(GameEvent::ResetRequested)
    }

    fn record(&mut self, input: SessionInput) {
        self.inputs.push(InputRecord {
            tick: self.game.tick_count(),
            input,
        });
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot()
    }

    /// BLAKE3 hex digest of the JSON-encoded snapshot.
    pub fn state_hash(&self) -> String {
        hash_snapshot(&self.game.snapshot())
    }

    /// The inputs so far, with the config needed to replay them.
    pub fn log(&self) -> SessionLog {
        let mut config = self.game.config().clone();
        config.seed = Some(self.game.seed());
        SessionLog {
            config,
            inputs: self.inputs.clone(),
            total_ticks: self.game.tick_count(),
            final_hash: self.state_hash(),
        }
    }
}

impl<U> Session<U> {
    pub fn game(&self) -> &Game<RapierPhysics, U> {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game<RapierPhysics, U> {
        &mut self.game
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }

    pub fn inputs(&self) -> &[InputRecord] {
        &self.inputs
    }
}

/// Hash a snapshot the way [`Session::state_hash`] does.
pub fn hash_snapshot(snapshot: &GameSnapshot) -> String {
    let json_bytes =
        serde_json::to_vec(snapshot).expect("GameSnapshot should always be JSON-serializable");
    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Re-run a recorded session from scratch and compare the final hash.
///
/// Inputs are applied before the tick whose count they were recorded at, so
/// a log replays into the same sequence of events.
pub fn replay<U: UiSink>(log: &SessionLog, ui: U) -> Result<ReplayResult, EngineError> {
    let mut session = Session::new(log.config.clone(), ui)?;
    let mut inputs = log.inputs.iter().peekable();

    for tick in 0..=log.total_ticks {
        while let Some(record) = inputs.next_if(|r| r.tick == tick) {
            match record.input {
                SessionInput::Click { x } => session.click(x),
                SessionInput::Reset => session.reset(),
            };
        }
        if tick < log.total_ticks {
            session.tick();
        }
    }
    if let Some(record) = inputs.next() {
        return Err(EngineError::ReplayInput {
            tick: record.tick,
            total_ticks: log.total_ticks,
        });
    }

    let final_hash = session.state_hash();
    let matches = final_hash == log.final_hash;
    if !matches {
        warn!(expected = %log.final_hash, actual = %final_hash, "replay diverged");
    }
    Ok(ReplayResult {
        final_hash,
        matches,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use suika_rules::ui::RecordingUi;

    fn session(seed: u64) -> Session<RecordingUi> {
        let config = GameConfig {
            seed: Some(seed),
            ..Default::default()
        };
        Session::new(config, RecordingUi::default()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            fruit_types: 1,
            ..Default::default()
        };
        let err = Session::new(config, RecordingUi::default()).err().unwrap();
        assert!(matches!(err, EngineError::Rules(_)));
    }

    #[test]
    fn state_hash_is_stable_without_ticks() {
        let s = session(1);
        assert_eq!(s.state_hash(), s.state_hash());
        assert_eq!(s.state_hash().len(), 64);
    }

    #[test]
    fn state_hash_changes_after_a_click() {
        let mut s = session(1);
        let before = s.state_hash();
        s.click(200.0);
        assert_ne!(s.state_hash(), before);
    }

    #[test]
    fn diagnostics_count_wall_contacts() {
        let mut s = session(2);
        s.click(200.0);
        let mut collisions = 0;
        for _ in 0..240 {
            s.tick();
            collisions += s.last_diagnostics().collisions;
        }
        assert!(collisions > 0, "a dropped fruit should touch the floor");
        assert_eq!(s.last_diagnostics().merges, 0);
    }

    #[test]
    fn inputs_are_recorded_with_their_tick() {
        let mut s = session(3);
        s.click(100.0);
        s.run_ticks(5);
        s.reset();
        assert_eq!(
            s.inputs(),
            &[
                InputRecord {
                    tick: 0,
                    input: SessionInput::Click { x: 100.0 }
                },
                InputRecord {
                    tick: 5,
                    input: SessionInput::Reset
                },
            ]
        );
    }

    #[test]
    fn log_pins_the_seed() {
        let config = GameConfig::default();
        let s = Session::new(config, RecordingUi::default()).unwrap();
        let log = s.log();
        assert_eq!(log.config.seed, Some(s.game().seed()));
    }

    #[test]
    fn replay_reproduces_the_final_hash() {
        let mut s = session(4);
        for (i, x) in [120.0, 200.0, 280.0, 200.0].into_iter().enumerate() {
            s.click(x);
            s.run_ticks(20 + i as u64);
        }
        s.run_ticks(60);
        let log = s.log();

        let result = replay(&log, RecordingUi::default()).unwrap();
        assert!(result.matches);
        assert_eq!(result.final_hash, log.final_hash);
    }

    #[test]
    fn replay_detects_tampered_log() {
        let mut s = session(5);
        s.click(200.0);
        s.run_ticks(30);
        let mut log = s.log();
        log.inputs[0].input = SessionInput::Click { x: 120.0 };

        let result = replay(&log, RecordingUi::default()).unwrap();
        assert!(!result.matches);
    }

    #[test]
    fn replay_rejects_inputs_past_the_end() {
        let mut s = session(6);
        s.run_ticks(3);
        let mut log = s.log();
        log.inputs.push(InputRecord {
            tick: 10,
            input: SessionInput::Reset,
        });
        let err = replay(&log, RecordingUi::default()).unwrap_err();
        assert!(matches!(err, EngineError::ReplayInput { tick: 10, .. }));
    }
}
