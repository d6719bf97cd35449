//! rapier2d backend for the game rules.
//!
//! [`RapierPhysics`] implements [`PhysicsBackend`] over a rapier2d pipeline.
//! Each step:
//!
//! 1. rapier integrates the world with the game's fixed dt.
//! 2. Collision-started events are collected through rapier's channel
//!    collector.
//! 3. Collider handles are mapped back to [`BodyId`]s and the pairs are sorted
//!    by `(min id, max id)`.
//!
//! # Coordinates
//!
//! The world uses canvas coordinates directly: pixels, with y pointing down,
//! so gravity is a positive y acceleration. rapier's `length_unit` is set to
//! [`PIXELS_PER_METER`] so its contact tolerances and sleep thresholds scale
//! with the pixel world.
//!
//! # Determinism
//!
//! rapier2d is compiled with `enhanced-determinism`. Combined with a fixed
//! timestep, monotonically allocated body ids and sorted collision output, the
//! simulation is fully deterministic on the same platform.

use std::collections::HashMap;

use rapier2d::prelude::*;
use suika_rules::body::{BodyDesc, BodyId, BodyKind, BodyLabel, BodySnapshot, CollisionPair, Position, Shape};
use suika_rules::config::GameConfig;
use suika_rules::physics::PhysicsBackend;
use tracing::trace;

/// Pixels per simulated metre. rapier scales its length-based tolerances by
/// this value.
pub const PIXELS_PER_METER: f32 = 100.0;

/// A rapier body tracked by the backend.
#[derive(Debug, Clone, Copy)]
struct TrackedBody {
    handle: RigidBodyHandle,
    collider: ColliderHandle,
    label: BodyLabel,
}

// ---------------------------------------------------------------------------
// RapierPhysics
// ---------------------------------------------------------------------------

/// Owns the rapier2d simulation state.
///
/// rapier keeps its own body and collider storage; this type maps between
/// rapier handles and the [`BodyId`]s the rules work with.
pub struct RapierPhysics {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Live bodies by id.
    bodies: HashMap<BodyId, TrackedBody>,
    /// Maps rapier ColliderHandle -> BodyId for collision lookup.
    collider_to_body: HashMap<ColliderHandle, BodyId>,
    /// Next id to hand out. Ids are never reused.
    next_id: u64,
}

impl RapierPhysics {
    /// Create a world with the given downward acceleration.
    pub fn new(gravity: f32) -> Self {
        let integration_params = IntegrationParameters {
            length_unit: PIXELS_PER_METER as Real,
            ..IntegrationParameters::default()
        };
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, gravity as Real],
            integration_params,
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bodies: HashMap::new(),
            collider_to_body: HashMap::new(),
            next_id: 0,
        }
    }

    /// Create a world with the gravity configured for a game.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.gravity)
    }

    /// The length unit rapier's tolerances are scaled by.
    pub fn length_unit(&self) -> f32 {
        self.integration_params.length_unit as f32
    }

    /// Linear velocity of a live body.
    pub fn velocity(&self, id: BodyId) -> Option<(f32, f32)> {
        let tracked = self.bodies.get(&id)?;
        let rb = self.rigid_body_set.get(tracked.handle)?;
        let vel = rb.linvel();
        Some((vel.x as f32, vel.y as f32))
    }

    fn snapshot(&self, id: BodyId, tracked: &TrackedBody) -> Option<BodySnapshot> {
        let rb = self.rigid_body_set.get(tracked.handle)?;
        let trans = rb.translation();
        Some(BodySnapshot {
            id,
            label: tracked.label,
            position: Position::new(trans.x as f32, trans.y as f32),
        })
    }
}

impl PhysicsBackend for RapierPhysics {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyId {
        let id = BodyId::from_raw(self.next_id);
        self.next_id += 1;

        let translation = vector![desc.position.x as Real, desc.position.y as Real];
        let rb = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .translation(translation)
                .ccd_enabled(true)
                .build(),
            BodyKind::Static => RigidBodyBuilder::fixed().translation(translation).build(),
        };
        let handle = self.rigid_body_set.insert(rb);

        let shape: SharedShape = match desc.shape {
            Shape::Circle { radius } => SharedShape::ball(radius as Real),
            Shape::Rect { width, height } => {
                SharedShape::cuboid(width as Real / 2.0, height as Real / 2.0)
            }
        };
        let collider = ColliderBuilder::new(shape)
            .restitution(desc.restitution as Real)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider =
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        self.collider_to_body.insert(collider, id);
        self.bodies.insert(
            id,
            TrackedBody {
                handle,
                collider,
                label: desc.label,
            },
        );
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        let Some(tracked) = self.bodies.remove(&id) else {
            return false;
        };
        self.collider_to_body.remove(&tracked.collider);
        // Remove body (and attached colliders) from rapier.
        self.rigid_body_set.remove(
            tracked.handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
        true
    }

    fn body(&self, id: BodyId) -> Option<BodySnapshot> {
        let tracked = self.bodies.get(&id)?;
        self.snapshot(id, tracked)
    }

    fn bodies(&self) -> Vec<BodySnapshot> {
        let mut out: Vec<BodySnapshot> = self
            .bodies
            .iter()
            .filter_map(|(&id, tracked)| self.snapshot(id, tracked))
            .collect();
        // Sort by id for deterministic output ordering.
        out.sort_by_key(|b| b.id);
        out
    }

    fn step(&mut self, dt: f32) -> Vec<CollisionPair> {
        self.integration_params.dt = dt as Real;

        let (collision_send, collision_recv) =
            rapier2d::crossbeam::channel::unbounded::<CollisionEvent>();
        let (force_send, _force_recv) =
            rapier2d::crossbeam::channel::unbounded::<ContactForceEvent>();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None, // query pipeline (unused)
            &(),  // physics hooks
            &event_handler,
        );

        let mut collisions = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            if let CollisionEvent::Started(h1, h2, _flags) = event {
                let a = self.collider_to_body.get(&h1).copied();
                let b = self.collider_to_body.get(&h2).copied();
                if let (Some(a), Some(b)) = (a, b) {
                    collisions.push(CollisionPair::new(a, b));
                }
            }
        }

        // Sort for deterministic processing order.
        collisions.sort_by_key(|c| c.sort_key());
        trace!(collisions = collisions.len(), "rapier step");
        collisions
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use suika_rules::arena::build_walls;
    use suika_rules::fruit::FruitRegistry;

    const DT: f32 = 1.0 / 60.0;

    fn fruit_desc(rank: usize, x: f32, y: f32) -> BodyDesc {
        let registry = FruitRegistry::from_config(&GameConfig::default());
        let fruit = registry.fruit(rank).unwrap();
        BodyDesc {
            label: BodyLabel::Fruit(fruit),
            kind: BodyKind::Dynamic,
            shape: Shape::Circle {
                radius: registry.radius(fruit),
            },
            position: Position::new(x, y),
            restitution: 0.5,
        }
    }

    #[test]
    fn physics_world_starts_empty() {
        let pw = RapierPhysics::new(980.0);
        assert_eq!(pw.body_count(), 0);
        assert!(pw.bodies().is_empty());
    }

    #[test]
    fn create_and_remove_body() {
        let mut pw = RapierPhysics::new(0.0);
        let id = pw.create_body(&fruit_desc(0, 100.0, 100.0));
        assert_eq!(pw.body_count(), 1);
        let snap = pw.body(id).unwrap();
        assert_eq!(snap.position, Position::new(100.0, 100.0));

        assert!(pw.remove_body(id));
        assert!(pw.body(id).is_none());
        assert_eq!(pw.body_count(), 0);
    }

    #[test]
    fn remove_unknown_body_is_noop() {
        let mut pw = RapierPhysics::new(0.0);
        assert!(!pw.remove_body(BodyId::from_raw(42)));
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut pw = RapierPhysics::new(0.0);
        let a = pw.create_body(&fruit_desc(0, 100.0, 100.0));
        pw.remove_body(a);
        let b = pw.create_body(&fruit_desc(0, 100.0, 100.0));
        assert_ne!(a, b);
    }

    #[test]
    fn gravity_pulls_fruit_down_the_canvas() {
        let mut pw = RapierPhysics::new(980.0);
        let id = pw.create_body(&fruit_desc(0, 200.0, 50.0));
        for _ in 0..30 {
            pw.step(DT);
        }
        let snap = pw.body(id).unwrap();
        assert!(snap.position.y > 50.0, "fruit should fall, got y={}", snap.position.y);
        let (_, vy) = pw.velocity(id).unwrap();
        assert!(vy > 0.0, "velocity should point down the canvas, got {vy}");
    }

    #[test]
    fn tolerances_use_pixel_scale() {
        let pw = RapierPhysics::new(980.0);
        assert_eq!(pw.length_unit(), PIXELS_PER_METER);
    }

    #[test]
    fn fruit_comes_to_rest_on_the_floor() {
        let config = GameConfig::default();
        let mut pw = RapierPhysics::from_config(&config);
        build_walls(&mut pw, &config);
        let desc = fruit_desc(0, 200.0, 300.0);
        let Shape::Circle { radius } = desc.shape else {
            unreachable!("fruit are circles");
        };
        let id = pw.create_body(&desc);
        for _ in 0..600 {
            pw.step(DT);
        }

        let floor_top = config.canvas_height - config.wall_thickness / 2.0;
        let y = pw.body(id).unwrap().position.y;
        assert!(
            (y - (floor_top - radius)).abs() < 1.0,
            "fruit should rest on the floor, got y={y}"
        );
        let (vx, vy) = pw.velocity(id).unwrap();
        assert!(vx.abs() < 1.0 && vy.abs() < 1.0, "fruit should settle, got ({vx}, {vy})");
    }

    #[test]
    fn static_walls_do_not_move() {
        let mut pw = RapierPhysics::new(980.0);
        let walls = build_walls(&mut pw, &GameConfig::default());
        let before: Vec<_> = walls.iter().map(|&w| pw.body(w).unwrap()).collect();
        for _ in 0..60 {
            pw.step(DT);
        }
        let after: Vec<_> = walls.iter().map(|&w| pw.body(w).unwrap()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn falling_fruit_reports_floor_collision() {
        let mut pw = RapierPhysics::new(980.0);
        let walls = build_walls(&mut pw, &GameConfig::default());
        let fruit = pw.create_body(&fruit_desc(0, 200.0, 400.0));

        let mut all = Vec::new();
        for _ in 0..120 {
            all.extend(pw.step(DT));
        }
        assert!(
            all.iter().any(|p| p.involves(fruit) && p.involves(walls[0])),
            "fruit should hit the floor, got {all:?}"
        );
    }

    #[test]
    fn collision_pairs_are_sorted() {
        let mut pw = RapierPhysics::new(980.0);
        build_walls(&mut pw, &GameConfig::default());
        for i in 0..6 {
            pw.create_body(&fruit_desc(i % 3, 80.0 + i as f32 * 45.0, 500.0));
        }
        for _ in 0..120 {
            let pairs = pw.step(DT);
            let keys: Vec<_> = pairs.iter().map(|p| p.sort_key()).collect();
            let mut sorted = keys.clone();
            sorted.sort();
            assert_eq!(keys, sorted);
        }
    }

    #[test]
    fn removed_body_never_appears_in_collisions() {
        let mut pw = RapierPhysics::new(980.0);
        build_walls(&mut pw, &GameConfig::default());
        let gone = pw.create_body(&fruit_desc(0, 200.0, 500.0));
        pw.remove_body(gone);
        for _ in 0..120 {
            assert!(pw.step(DT).iter().all(|p| !p.involves(gone)));
        }
    }

    #[test]
    fn determinism_two_identical_runs() {
        fn run() -> Vec<BodySnapshot> {
            let mut pw = RapierPhysics::new(980.0);
            build_walls(&mut pw, &GameConfig::default());
            for i in 0..5 {
                pw.create_body(&fruit_desc(i % 3, 120.0 + i as f32 * 30.0, 60.0 * i as f32));
            }
            for _ in 0..180 {
                pw.step(DT);
            }
            pw.bodies()
        }
        assert_eq!(run(), run());
    }
}
