//! Physics-facing value types: body handles, labels, descriptors and
//! collision pairs.
//!
//! These are the currency exchanged with a
//! [`PhysicsBackend`](crate::physics::PhysicsBackend). The backend owns the
//! bodies; the rules only ever hold [`BodyId`]s and read [`BodySnapshot`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fruit::FruitType;

// ---------------------------------------------------------------------------
// BodyId
// ---------------------------------------------------------------------------

/// Handle of a body in the physics world.
///
/// Backends allocate ids monotonically and never reuse them, so an id whose
/// body was removed stays stale forever.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(u64);

impl BodyId {
    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BodyId({})", self.0)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point in canvas coordinates (pixels, y pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The point halfway between `self` and `other`.
    pub fn midpoint(self, other: Position) -> Position {
        Position {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Body descriptors
// ---------------------------------------------------------------------------

/// What a body is, from the game's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyLabel {
    /// A fruit of the given tier. Only fruit bodies take part in merges.
    Fruit(FruitType),
    /// Part of the container.
    Wall,
}

impl BodyLabel {
    /// The fruit type, if this is a fruit.
    pub fn fruit(self) -> Option<FruitType> {
        match self {
            BodyLabel::Fruit(fruit) => Some(fruit),
            BodyLabel::Wall => None,
        }
    }

    /// Whether this label marks a fruit.
    pub fn is_fruit(self) -> bool {
        matches!(self, BodyLabel::Fruit(_))
    }
}

/// How the solver treats a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Fully simulated (fruits).
    Dynamic,
    /// Immovable (walls).
    Static,
}

/// Collider geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Circle with radius.
    Circle {
        /// Radius of the circle.
        radius: f32,
    },
    /// Axis-aligned rectangle with full extents.
    Rect {
        /// Width along the x-axis.
        width: f32,
        /// Height along the y-axis.
        height: f32,
    },
}

/// Everything a backend needs to create a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub label: BodyLabel,
    pub kind: BodyKind,
    pub shape: Shape,
    /// Centre of the body.
    pub position: Position,
    /// Coefficient of restitution. 0.0 = no bounce, 1.0 = perfect bounce.
    pub restitution: f32,
}

/// Read-only view of a live body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub label: BodyLabel,
    pub position: Position,
}

// ---------------------------------------------------------------------------
// CollisionPair
// ---------------------------------------------------------------------------

/// Two bodies whose contact started during a physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionPair {
    /// First body in the collision.
    pub body_a: BodyId,
    /// Second body in the collision.
    pub body_b: BodyId,
}

impl CollisionPair {
    pub fn new(body_a: BodyId, body_b: BodyId) -> Self {
        Self { body_a, body_b }
    }

    /// `(min, max)` of the two ids, used to order pairs deterministically.
    pub fn sort_key(&self) -> (BodyId, BodyId) {
        (
            self.body_a.min(self.body_b),
            self.body_a.max(self.body_b),
        )
    }

    /// Whether `id` is one of the two bodies.
    pub fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == id
    }
}
