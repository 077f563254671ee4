//! Axis-separated AABB resolution against solid tile rectangles.
//!
//! X is applied and resolved first, then Y from the X-resolved position. The
//! order is fixed so diagonal approaches always resolve the same way.

use terboy_core::geometry::Rect;

/// Overlap smaller than this on either axis counts as touching. Absorbs the
/// rounding left behind by snapping an edge with `f32` arithmetic.
pub const CONTACT_EPSILON: f32 = 1e-3;

fn penetrates(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() - CONTACT_EPSILON
        && a.right() > b.left() + CONTACT_EPSILON
        && a.top() < b.bottom() - CONTACT_EPSILON
        && a.bottom() > b.top() + CONTACT_EPSILON
}

/// Which sides of the entity touched a solid this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Collisions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Collisions {
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.up || self.down
    }
}

/// Move `rect` along X by `vel.0`, snapping against overlapping solids.
///
/// A snap only happens on the side the entity is moving toward; a stationary
/// entity is never pushed.
pub fn resolve_x(rect: &mut Rect, vel: &mut (f32, f32), solids: &[Rect], hits: &mut Collisions) {
    rect.x += vel.0;
    for solid in solids {
        if !penetrates(rect, solid) {
            continue;
        }
        if vel.0 > 0.0 {
            rect.set_right(solid.left());
            hits.right = true;
        } else if vel.0 < 0.0 {
            rect.set_left(solid.right());
            hits.left = true;
        }
    }
    if hits.horizontal() {
        vel.0 = 0.0;
    }
}

/// Move `rect` along Y by `vel.1` (y grows downward), snapping against overlapping solids.
pub fn resolve_y(rect: &mut Rect, vel: &mut (f32, f32), solids: &[Rect], hits: &mut Collisions) {
    rect.y += vel.1;
    for solid in solids {
        if !penetrates(rect, solid) {
            continue;
        }
        if vel.1 > 0.0 {
            rect.set_bottom(solid.top());
            hits.down = true;
        } else if vel.1 < 0.0 {
            rect.set_top(solid.bottom());
            hits.up = true;
        }
    }
    if hits.vertical() {
        vel.1 = 0.0;
    }
}

/// Resolve both axes in order and return the flags raised.
///
/// `solids_at` is asked for the obstacles near the rect after each axis moves,
/// so the Y pass sees the neighbourhood of the X-resolved position.
pub fn resolve(
    rect: &mut Rect,
    vel: &mut (f32, f32),
    mut solids_at: impl FnMut(&Rect) -> Vec<Rect>,
) -> Collisions {
    let mut hits = Collisions::default();

    let probe = Rect::new(rect.x + vel.0, rect.y, rect.w, rect.h);
    let solids = solids_at(&probe);
    resolve_x(rect, vel, &solids, &mut hits);

    let probe = Rect::new(rect.x, rect.y + vel.1, rect.w, rect.h);
    let solids = solids_at(&probe);
    resolve_y(rect, vel, &solids, &mut hits);

    hits
}
