//! The static container the fruits fall into.

use crate::body::{BodyDesc, BodyId, BodyKind, BodyLabel, Position, Shape};
use crate::config::GameConfig;
use crate::physics::PhysicsBackend;

/// Descriptors of the floor, left wall and right wall, in that order.
///
/// Each wall is centred on a canvas edge, so half of its thickness lies
/// outside the visible area.
pub fn wall_descs(config: &GameConfig) -> [BodyDesc; 3] {
    let w = config.canvas_width;
    let h = config.canvas_height;
    let t = config.wall_thickness;
    let wall = |x: f32, y: f32, width: f32, height: f32| BodyDesc {
        label: BodyLabel::Wall,
        kind: BodyKind::Static,
        shape: Shape::Rect { width, height },
        position: Position::new(x, y),
        restitution: 0.0,
    };
    [
        wall(w / 2.0, h, w, t),
        wall(0.0, h / 2.0, t, h),
        wall(w, h / 2.0, t, h),
    ]
}

/// Create the three walls in `physics` and return their ids.
pub fn build_walls<P: PhysicsBackend>(physics: &mut P, config: &GameConfig) -> Vec<BodyId> {
    wall_descs(config)
        .iter()
        .map(|desc| physics.create_body(desc))
        .collect()
}

/// Horizontal range a fruit of `radius` can be dropped into without
/// overlapping a side wall.
pub fn drop_range(config: &GameConfig, radius: f32) -> (f32, f32) {
    let inner = config.wall_thickness / 2.0 + radius;
    let lo = inner;
    let hi = config.canvas_width - inner;
    if lo <= hi {
        (lo, hi)
    } else {
        let mid = config.canvas_width / 2.0;
        (mid, mid)
    }
}
