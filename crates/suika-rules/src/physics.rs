//! The physics capability consumed by the rules.
//!
//! The rules never simulate anything themselves. They create and remove
//! bodies, read positions, and react to the collision pairs a step reports.
//! [`PhysicsBackend`] captures exactly that surface.
//!
//! [`ScriptedPhysics`] is a deterministic in-memory backend: bodies never
//! move on their own and a step reports whatever collisions were queued
//! beforehand. It drives the rules in tests and tools that need exact control
//! over which pairs collide and in what order.

use std::collections::BTreeMap;

use crate::body::{BodyDesc, BodyId, BodySnapshot, CollisionPair, Position};

// ---------------------------------------------------------------------------
// PhysicsBackend
// ---------------------------------------------------------------------------

/// A rigid-body world the rules can drive.
pub trait PhysicsBackend {
    /// Create a body and add it to the world.
    fn create_body(&mut self, desc: &BodyDesc) -> BodyId;

    /// Remove a body from the world.
    ///
    /// Returns `true` if the body was alive. Removing a stale id is a no-op.
    fn remove_body(&mut self, id: BodyId) -> bool;

    /// Current state of a live body.
    fn body(&self, id: BodyId) -> Option<BodySnapshot>;

    /// All live bodies, ordered by id.
    fn bodies(&self) -> Vec<BodySnapshot>;

    /// Advance the simulation by `dt` seconds.
    ///
    /// Returns the pairs whose contact started during this step, in the order
    /// the rules should process them.
    fn step(&mut self, dt: f32) -> Vec<CollisionPair>;

    /// Number of live bodies.
    fn body_count(&self) -> usize {
        self.bodies().len()
    }
}

// ---------------------------------------------------------------------------
// ScriptedPhysics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ScriptedBody {
    desc: BodyDesc,
}

/// A physics world that only does what it is told.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPhysics {
    bodies: BTreeMap<BodyId, ScriptedBody>,
    next_id: u64,
    queued: Vec<CollisionPair>,
    steps: u64,
}

impl ScriptedPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a collision between `a` and `b` on the next step.
    ///
    /// Pairs are reported in the order they were queued. Ids are not
    /// checked, so a pair may name a body that no longer exists.
    pub fn queue_collision(&mut self, a: BodyId, b: BodyId) {
        self.queued.push(CollisionPair::new(a, b));
    }

    /// Teleport a live body. Returns `false` for stale ids.
    pub fn set_position(&mut self, id: BodyId, position: Position) -> bool {
        match self.bodies.get_mut(&id) {
            Some(body) => {
                body.desc.position = position;
                true
            }
            None => false,
        }
    }

    /// The descriptor a live body was created from, with its current position.
    pub fn desc(&self, id: BodyId) -> Option<&BodyDesc> {
        self.bodies.get(&id).map(|b| &b.desc)
    }

    /// Number of steps taken so far.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Collisions waiting for the next step.
    pub fn pending_collisions(&self) -> &[CollisionPair] {
        &self.queued
    }
}

impl PhysicsBackend for ScriptedPhysics {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyId {
        let id = BodyId::from_raw(self.next_id);
        self.next_id += 1;
        self.bodies.insert(id, ScriptedBody { desc: desc.clone() });
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    fn body(&self, id: BodyId) -> Option<BodySnapshot> {
        self.bodies.get(&id).map(|b| BodySnapshot {
            id,
            label: b.desc.label,
            position: b.desc.position,
        })
    }

    fn bodies(&self) -> Vec<BodySnapshot> {
        self.bodies
            .iter()
            .map(|(&id, b)| BodySnapshot {
                id,
                label: b.desc.label,
                position: b.desc.position,
            })
            .collect()
    }

    fn step(&mut self, _dt: f32) -> Vec<CollisionPair> {
        self.steps += 1;
        std::mem::take(&mut self.queued)
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
