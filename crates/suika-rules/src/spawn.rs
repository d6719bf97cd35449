//! Choosing and materializing the fruit the player drops.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::debug;

use crate::body::{BodyDesc, BodyId, BodyKind, BodyLabel, Position, Shape};
use crate::fruit::{FruitRegistry, FruitType};
use crate::physics::PhysicsBackend;

/// Samples the preview fruit and builds fruit bodies.
///
/// Previews are drawn uniformly from the first `initial_types` ranks, so the
/// player only ever drops small fruit. The generator is a seeded PCG32, which
/// makes a game with a fixed seed fully reproducible.
#[derive(Debug, Clone)]
pub struct SpawnController {
    rng: Pcg32,
    candidates: Vec<FruitType>,
    preview: FruitType,
    restitution: f32,
}

impl SpawnController {
    /// Create a controller and draw the first preview.
    ///
    /// # Panics
    ///
    /// Panics if `initial_types` is zero or exceeds the registry. A validated
    /// [`GameConfig`](crate::config::GameConfig) rules both out.
    pub fn new(registry: &FruitRegistry, initial_types: usize, restitution: f32, seed: u64) -> Self {
        assert!(
            initial_types > 0 && initial_types <= registry.len(),
            "initial_types must be in 1..={}, got {initial_types}",
            registry.len()
        );
        let candidates: Vec<FruitType> = registry.iter().take(initial_types).collect();
        let mut rng = Pcg32::seed_from_u64(seed);
        let preview = candidates[rng.gen_range(0..candidates.len())];
        Self {
            rng,
            candidates,
            preview,
            restitution,
        }
    }

    /// The fruit the next drop will use.
    pub fn preview(&self) -> FruitType {
        self.preview
    }

    /// Draw a new preview and return it.
    pub fn pick_next(&mut self) -> FruitType {
        self.preview = self.candidates[self.rng.gen_range(0..self.candidates.len())];
        self.preview
    }

    /// Descriptor of a fruit body of type `fruit` centred at `position`.
    ///
    /// Player drops and merge results share this creation path.
    pub fn fruit_desc(&self, registry: &FruitRegistry, fruit: FruitType, position: Position) -> BodyDesc {
        BodyDesc {
            label: BodyLabel::Fruit(fruit),
            kind: BodyKind::Dynamic,
            shape: Shape::Circle {
                radius: registry.radius(fruit),
            },
            position,
            restitution: self.restitution,
        }
    }

    /// Create a fruit body in `physics` and return its id.
    pub fn spawn<P: PhysicsBackend>(
        &self,
        physics: &mut P,
        registry: &FruitRegistry,
        fruit: FruitType,
        position: Position,
    ) -> BodyId {
        let id = physics.create_body(&self.fruit_desc(registry, fruit, position));
        debug!(body = %id, %fruit, x = position.x, y = position.y, "fruit spawned");
        id
    }
}
