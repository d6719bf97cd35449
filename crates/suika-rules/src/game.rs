//! The game driver: one place where every state transition happens.
//!
//! A [`Game`] owns the physics backend, the UI sink, the [`GameState`] and the
//! spawn controller. Everything that changes the game goes through
//! [`Game::handle`] with one of three [`GameEvent`]s, or through
//! [`Game::tick`], which steps physics and feeds each reported collision back
//! into `handle`.
//!
//! # Win timer
//!
//! Producing the largest fruit does not end the game immediately. The win is
//! announced `win_delay_ticks` ticks later so the merge can settle on screen.
//! Every merge that produces the largest fruit schedules its own
//! announcement, even after the game is won. Pending announcements are not
//! cancelled by reset: each fires exactly once.
//!
//! # Example
//!
//! ```
//! use suika_rules::prelude::*;
//!
//! let config = GameConfig { seed: Some(1), ..Default::default() };
//! let mut game = Game::new(config, ScriptedPhysics::new(), RecordingUi::default()).unwrap();
//!
//! let preview = game.preview();
//! let t = game.handle(GameEvent::Spawn { x: 200.0 });
//! assert!(matches!(t, Transition::Spawned { fruit, .. } if fruit == preview));
//!
//! game.handle(GameEvent::ResetRequested);
//! assert!(game.fruit_bodies().is_empty());
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::arena::build_walls;
use crate::body::{BodyId, BodySnapshot, CollisionPair, Position};
use crate::config::GameConfig;
use crate::fruit::{FruitRegistry, FruitType};
use crate::merge::{apply_merge, classify, MergeOutcome, PairVerdict};
use crate::physics::PhysicsBackend;
use crate::spawn::SpawnController;
use crate::state::GameState;
use crate::ui::UiSink;
use crate::RulesError;

// ---------------------------------------------------------------------------
// Events and transitions
// ---------------------------------------------------------------------------

/// Everything that can happen to a game from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The player clicked at horizontal position `x`.
    Spawn { x: f32 },
    /// The physics world reported the start of a contact.
    CollisionDetected(CollisionPair),
    /// The player pressed the reset control.
    ResetRequested,
}

/// Why an event changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// A spawn arrived after the game was won.
    Inactive,
    /// A collision involved a wall.
    NotFruit,
    /// A collision between fruits of different types.
    TypeMismatch,
    /// A collision named a body that an earlier pair already removed.
    BodyConsumed,
}

/// The effect of one event or timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// A player drop created `body`; `next_preview` is the new preview.
    Spawned {
        body: BodyId,
        fruit: FruitType,
        next_preview: FruitType,
    },
    /// Two fruits merged.
    Merged(MergeOutcome),
    /// Nothing changed.
    Ignored(IgnoreReason),
    /// The game was reset; `cleared` fruit bodies were removed.
    Reset { cleared: usize, preview: FruitType },
    /// The pending win fired: the game is now inactive.
    WinAnnounced,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One fruit in a [`GameSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FruitSnapshot {
    pub id: BodyId,
    pub fruit: FruitType,
    pub position: Position,
}

/// Serializable view of a game at a tick boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub tick: u64,
    pub score: u64,
    pub active: bool,
    pub preview: FruitType,
    pub win_pending: bool,
    /// Fruits ordered by body id.
    pub fruits: Vec<FruitSnapshot>,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// A running game over physics backend `P` and display `U`.
pub struct Game<P, U> {
    config: GameConfig,
    registry: FruitRegistry,
    spawner: SpawnController,
    physics: P,
    ui: U,
    state: GameState,
    walls: Vec<BodyId>,
    /// Ticks executed so far.
    tick_counter: u64,
    /// Ticks at which pending wins fire, oldest first.
    win_due: VecDeque<u64>,
    seed: u64,
}

impl<P: PhysicsBackend, U: UiSink> Game<P, U> {
    /// Validate `config`, build the container in `physics` and show the
    /// initial score and preview on `ui`.
    pub fn new(config: GameConfig, mut physics: P, ui: U) -> Result<Self, RulesError> {
        config.validate()?;
        let registry = FruitRegistry::from_config(&config);
        let seed = config.seed.unwrap_or_else(rand::random);
        let spawner =
            SpawnController::new(&registry, config.initial_types, config.restitution, seed);
        let walls = build_walls(&mut physics, &config);

        let mut game = Self {
            config,
            registry,
            spawner,
            physics,
            ui,
            state: GameState::new(),
            walls,
            tick_counter: 0,
            win_due: VecDeque::new(),
            seed,
        };
        game.ui.show_score(0);
        game.ui.set_reset_visible(false);
        game.show_preview();

        info!(
            seed,
            fruit_types = game.registry.len(),
            initial_types = game.config.initial_types,
            "game created"
        );
        Ok(game)
    }

    /// Apply one event.
    pub fn handle(&mut self, event: GameEvent) -> Transition {
        match event {
            GameEvent::Spawn { x } => self.drop_preview(x),
            GameEvent::CollisionDetected(pair) => self.resolve_pair(&pair),
            GameEvent::ResetRequested => self.reset(),
        }
    }

    /// Step physics by one fixed tick, resolve every reported collision in
    /// order, then fire the win announcement if it is due.
    pub fn tick(&mut self) -> Vec<Transition> {
        let pairs = self.physics.step(self.config.fixed_dt());
        trace!(tick = self.tick_counter, collisions = pairs.len(), "physics stepped");

        let mut transitions: Vec<Transition> = pairs
            .into_iter()
            .map(|pair| self.handle(GameEvent::CollisionDetected(pair)))
            .collect();

        self.tick_counter += 1;

        while self.win_due.front().is_some_and(|&due| self.tick_counter >= due) {
            self.win_due.pop_front();
            self.announce_win();
            transitions.push(Transition::WinAnnounced);
        }
        transitions
    }

    /// Run `count` ticks, returning every transition in order.
    pub fn run_ticks(&mut self, count: u64) -> Vec<Transition> {
        let mut all = Vec::new();
        for _ in 0..count {
            all.extend(self.tick());
        }
        all
    }

    /// Create a fruit of type `fruit` at `(x, y)`.
    ///
    /// Returns `None` without touching the world when the game is inactive.
    /// `x` is not clamped.
    pub fn spawn(&mut self, x: f32, y: f32, fruit: FruitType) -> Option<BodyId> {
        if !self.state.is_active() {
            debug!(x, y, %fruit, "spawn ignored: game inactive");
            return None;
        }
        Some(
            self.spawner
                .spawn(&mut self.physics, &self.registry, fruit, Position::new(x, y)),
        )
    }

    /// Draw a new preview and show it.
    pub fn pick_next(&mut self) -> FruitType {
        let next = self.spawner.pick_next();
        self.show_preview();
        next
    }

    /// Remove every fruit, zero the score, reactivate play, hide the reset
    /// control and draw a fresh preview. Walls stay, and pending win
    /// announcements still fire.
    pub fn reset(&mut self) -> Transition {
        let fruits: Vec<BodyId> = self.fruit_bodies().iter().map(|b| b.id).collect();
        for &id in &fruits {
            self.physics.remove_body(id);
        }

        self.state = GameState::new();
        self.ui.show_score(0);
        self.ui.set_reset_visible(false);
        let preview = self.pick_next();

        info!(cleared = fruits.len(), %preview, "game reset");
        Transition::Reset {
            cleared: fruits.len(),
            preview,
        }
    }

    // -- transitions --------------------------------------------------------

    fn drop_preview(&mut self, x: f32) -> Transition {
        let fruit = self.spawner.preview();
        let Some(body) = self.spawn(x, self.config.drop_y, fruit) else {
            return Transition::Ignored(IgnoreReason::Inactive);
        };
        let next_preview = self.pick_next();
        Transition::Spawned {
            body,
            fruit,
            next_preview,
        }
    }

    fn resolve_pair(&mut self, pair: &CollisionPair) -> Transition {
        let (fruit, a, b) = match classify(&self.physics, pair) {
            PairVerdict::Match { fruit, a, b } => (fruit, a, b),
            PairVerdict::NotFruit => return Transition::Ignored(IgnoreReason::NotFruit),
            PairVerdict::Mismatch { .. } => {
                return Transition::Ignored(IgnoreReason::TypeMismatch)
            }
            PairVerdict::Consumed => {
                debug!(a = %pair.body_a, b = %pair.body_b, "pair skipped: body already consumed");
                return Transition::Ignored(IgnoreReason::BodyConsumed);
            }
        };

        let outcome = apply_merge(
            &mut self.physics,
            &self.registry,
            &self.spawner,
            fruit,
            &a,
            &b,
            self.config.merge_score,
        );

        if outcome.created.is_some() {
            let score = self.state.add_score(outcome.points);
            self.ui.show_score(score);
        }
        if outcome.reached_max {
            self.schedule_win();
        }
        Transition::Merged(outcome)
    }

    fn schedule_win(&mut self) {
        let due = self.tick_counter + self.config.win_delay_ticks();
        info!(
            tick = self.tick_counter,
            due,
            pending = self.win_due.len() + 1,
            "largest fruit produced, win scheduled"
        );
        self.win_due.push_back(due);
    }

    fn announce_win(&mut self) {
        self.ui.announce_win(&self.config.win_message);
        self.state.deactivate();
        self.ui.set_reset_visible(true);
        info!(score = self.state.score(), tick = self.tick_counter, "game won");
    }

    fn show_preview(&mut self) {
        let preview = self.spawner.preview();
        self.ui.show_preview(preview, self.registry.texture(preview));
    }

    // -- accessors ----------------------------------------------------------

    /// Every live fruit body, ordered by id.
    pub fn fruit_bodies(&self) -> Vec<BodySnapshot> {
        self.physics
            .bodies()
            .into_iter()
            .filter(|b| b.label.is_fruit())
            .collect()
    }

    /// Serializable view of the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            tick: self.tick_counter,
            score: self.state.score(),
            active: self.state.is_active(),
            preview: self.spawner.preview(),
            win_pending: !self.win_due.is_empty(),
            fruits: self
                .fruit_bodies()
                .into_iter()
                .filter_map(|b| {
                    b.label.fruit().map(|fruit| FruitSnapshot {
                        id: b.id,
                        fruit,
                        position: b.position,
                    })
                })
                .collect(),
        }
    }
}

impl<P, U> Game<P, U> {
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn score(&self) -> u64 {
        self.state.score()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// The fruit the next click will drop.
    pub fn preview(&self) -> FruitType {
        self.spawner.preview()
    }

    /// Whether a win announcement is scheduled.
    pub fn win_pending(&self) -> bool {
        !self.win_due.is_empty()
    }

    /// Number of scheduled win announcements.
    pub fn pending_wins(&self) -> usize {
        self.win_due.len()
    }

    pub fn registry(&self) -> &FruitRegistry {
        &self.registry
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The seed the preview RNG was started with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ids of the container walls.
    pub fn walls(&self) -> &[BodyId] {
        &self.walls
    }

    /// The number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulated seconds, computed as `tick_count * fixed_dt` to avoid drift
    /// from repeated addition.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 / self.config.tick_rate_hz as f64
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    /// Mutable access to the physics backend.
    ///
    /// Meant for setup and tests; bodies created here bypass the active check.
    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
