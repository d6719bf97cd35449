//! The merge rule: two equal fruits become one fruit of the next tier.
//!
//! Each reported collision pair goes through [`classify`] and, if it is a
//! match, through [`apply_merge`]:
//!
//! 1. A pair where either body is not a fruit is ignored. Fruit hitting a wall
//!    is the common case.
//! 2. A pair where either body no longer exists is ignored. This happens when
//!    an earlier pair of the same step already consumed one of the bodies.
//! 3. A pair of different fruit types is ignored.
//! 4. A pair of equal types removes both bodies. Below the largest type a new
//!    fruit one tier up appears at their midpoint and the merge scores. Two
//!    largest fruits simply vanish, without score.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::body::{BodyId, BodySnapshot, CollisionPair};
use crate::fruit::{FruitRegistry, FruitType};
use crate::physics::PhysicsBackend;
use crate::spawn::SpawnController;

// ---------------------------------------------------------------------------
// PairVerdict
// ---------------------------------------------------------------------------

/// What a collision pair means to the rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairVerdict {
    /// Both bodies are live fruit of the same type.
    Match {
        fruit: FruitType,
        a: BodySnapshot,
        b: BodySnapshot,
    },
    /// At least one body is not a fruit.
    NotFruit,
    /// Both are fruit, of different types.
    Mismatch { a: FruitType, b: FruitType },
    /// At least one body is gone, or the pair names one body twice.
    Consumed,
}

/// Decide what `pair` means given the current contents of `physics`.
pub fn classify<P: PhysicsBackend>(physics: &P, pair: &CollisionPair) -> PairVerdict {
    if pair.body_a == pair.body_b {
        return PairVerdict::Consumed;
    }
    let (Some(a), Some(b)) = (physics.body(pair.body_a), physics.body(pair.body_b)) else {
        return PairVerdict::Consumed;
    };
    match (a.label.fruit(), b.label.fruit()) {
        (Some(fa), Some(fb)) if fa == fb => PairVerdict::Match { fruit: fa, a, b },
        (Some(fa), Some(fb)) => PairVerdict::Mismatch { a: fa, b: fb },
        _ => PairVerdict::NotFruit,
    }
}

// ---------------------------------------------------------------------------
// MergeOutcome
// ---------------------------------------------------------------------------

/// The result of merging one matching pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// The two bodies that were removed.
    pub removed: [BodyId; 2],
    /// Type of the two removed fruits.
    pub merged: FruitType,
    /// The new fruit, absent when two largest fruits merged.
    pub created: Option<(BodyId, FruitType)>,
    /// Points earned by this merge.
    pub points: u64,
    /// Whether the new fruit is the largest type.
    pub reached_max: bool,
}

/// Remove both bodies of a matching pair and create the next-tier fruit.
pub fn apply_merge<P: PhysicsBackend>(
    physics: &mut P,
    registry: &FruitRegistry,
    spawner: &SpawnController,
    fruit: FruitType,
    a: &BodySnapshot,
    b: &BodySnapshot,
    merge_score: u64,
) -> MergeOutcome {
    physics.remove_body(a.id);
    physics.remove_body(b.id);

    let Some(next) = registry.next(fruit) else {
        debug!(a = %a.id, b = %b.id, %fruit, "largest fruits merged away");
        return MergeOutcome {
            removed: [a.id, b.id],
            merged: fruit,
            created: None,
            points: 0,
            reached_max: false,
        };
    };

    let at = a.position.midpoint(b.position);
    let id = spawner.spawn(physics, registry, next, at);
    debug!(a = %a.id, b = %b.id, from = %fruit, to = %next, body = %id, "fruits merged");

    MergeOutcome {
        removed: [a.id, b.id],
        merged: fruit,
        created: Some((id, next)),
        points: merge_score,
        reached_max: registry.is_max(next),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
