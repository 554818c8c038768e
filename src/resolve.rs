//! Penetration resolution: displacement corrections that push a movable body
//! out of an obstacle it overlaps.
//!
//! Both helpers are pure functions over geometry; callers decide whether the
//! correction lands on a position or a velocity. [`crate::World::separate`]
//! wraps [`separation`] for registered colliders.

use crate::narrow::Obb;
use crate::{Fp, Vec2};

/// Corrections overshoot contact by this much so the separated pair does not
/// immediately re-test as touching.
const OFFSET_EPSILON: Fp = 1e-4;

pub fn separation(movable: &Obb, rigid: &Obb, smoothness: Fp) -> Option<Vec2> {
    //! Returns the minimum-translation correction that separates `movable`
    //! from `rigid`: the SAT axis of least overlap, oriented to push
    //! `movable` away from `rigid`, scaled by the overlap amount and
    //! `smoothness`.
    //!
    //! `smoothness` of 1 separates in one go; fractions spread the
    //! separation over several ticks for a soft push. Returns `None` when
    //! the bodies do not penetrate — resolving an already-separated pair is
    //! a no-op.
    let (axis, depth) = movable.obb_query(rigid)?;
    let axis = if axis.dot(movable.pos - rigid.pos) < 0.0 { -axis } else { axis };
    Some(axis * (depth * smoothness + OFFSET_EPSILON))
}

pub fn aabb_separation(movable: &Obb, rigid: &Obb, smoothness: Fp) -> Option<Vec2> {
    //! Axis-aligned overlap heuristic: per-axis half-extent overlap, pushed
    //! along the normalized center-to-center direction. Rotation is ignored,
    //! which makes for a cheaper but cruder correction than [`separation`] —
    //! the classic arcade-style body push.
    let delta = movable.pos - rigid.pos;
    let overlap_x = movable.half.x + rigid.half.x - delta.x.abs();
    let overlap_y = movable.half.y + rigid.half.y - delta.y.abs();

    let smallest = Fp::min(overlap_x, overlap_y);
    if smallest <= 0.0 {
        return None;
    }

    let len = delta.length();
    let dir = if len > Fp::EPSILON {
        delta / len
    } else {
        Vec2::new(0.0, 1.0) // coincident centers: push direction is arbitrary
    };
    Some(dir * (smallest * smoothness))
}
