//! Collision queries against static level geometry
//!
//! Walls are solid on both axes. Platforms are one-way: they only support a
//! body whose bottom edge sits on (or just inside) their top surface, and never
//! block sideways movement.

use serde::{Deserialize, Serialize};

use super::geometry::AxisBox;
use crate::consts::GROUND_EPSILON;

/// Side of the other box that the moving box penetrates least
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// True if the two boxes overlap strictly on both axes
#[inline]
pub fn boxes_overlap(a: &AxisBox, b: &AxisBox) -> bool {
    a.overlaps_x(b) && a.overlaps_y(b)
}

/// True if `body` overlaps any box in `boxes`
pub fn overlaps(body: &AxisBox, boxes: &[AxisBox]) -> bool {
    boxes.iter().any(|b| boxes_overlap(body, b))
}

/// Side and depth of least penetration of `body` into `other`.
///
/// Depths are measured as the distance `body` would have to move to clear
/// `other` through that side. Ties resolve in the order left, right, top,
/// bottom.
pub fn penetration_side(body: &AxisBox, other: &AxisBox) -> (Side, f32) {
    let candidates = [
        (Side::Left, body.right() - other.left()),
        (Side::Right, other.right() - body.left()),
        (Side::Top, other.top() - body.bottom()),
        (Side::Bottom, body.top() - other.bottom()),
    ];

    let mut best = candidates[0];
    for &(side, depth) in &candidates[1..] {
        // Strict comparison keeps the earlier side on ties
        if depth < best.1 {
            best = (side, depth);
        }
    }
    best
}

/// True if `body` is standing on `platform`: horizontal overlap and a bottom
/// edge within the grounding tolerance of the platform's top
pub fn rests_on(body: &AxisBox, platform: &AxisBox) -> bool {
    body.overlaps_x(platform) && (body.bottom() - platform.top()).abs() < GROUND_EPSILON
}

/// Static geometry for one level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollisionField {
    pub walls: Vec<AxisBox>,
    pub platforms: Vec<AxisBox>,
}

impl CollisionField {
    pub fn new(walls: Vec<AxisBox>, platforms: Vec<AxisBox>) -> Self {
        Self { walls, platforms }
    }

    /// True if `body` intersects any wall
    #[inline]
    pub fn blocked(&self, body: &AxisBox) -> bool {
        overlaps(body, &self.walls)
    }

    /// True if `body` rests on any platform
    pub fn on_platform(&self, body: &AxisBox) -> bool {
        self.platforms.iter().any(|p| rests_on(body, p))
    }

    /// First wall `body` intersects, with its least-penetration side
    pub fn first_contact(&self, body: &AxisBox) -> Option<(usize, Side, f32)> {
        self.walls
            .iter()
            .enumerate()
            .find(|(_, w)| boxes_overlap(body, w))
            .map(|(i, w)| {
                let (side, depth) = penetration_side(body, w);
                (i, side, depth)
            })
    }
}
