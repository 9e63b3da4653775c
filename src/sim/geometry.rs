//! Axis-aligned box geometry for walls, platforms and hitboxes
//!
//! A box is stored as its centre plus half extents. Both half extents are
//! strictly positive; zero-size boxes are rejected when the box is built.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBox {
    center: Vec2,
    half: Vec2,
}

impl AxisBox {
    /// Build a box from its centre and half extents
    pub fn new(center: Vec2, half_width: f32, half_height: f32) -> Result<Self, SimError> {
        let valid = |h: f32| h.is_finite() && h > 0.0;
        if !valid(half_width) || !valid(half_height) {
            return Err(SimError::DegenerateBox {
                half_width,
                half_height,
            });
        }
        Ok(Self {
            center,
            half: Vec2::new(half_width, half_height),
        })
    }

    /// Build a box from a centre and full width/height.
    ///
    /// Odd sizes are halved with integer division so layout tables keep
    /// whole-unit edges.
    pub fn from_size(center: Vec2, width: f32, height: f32) -> Result<Self, SimError> {
        Self::new(center, (width / 2.0).floor(), (height / 2.0).floor())
    }

    /// The player's hitbox centred at `pos`
    pub fn player_at(pos: Vec2) -> Self {
        use crate::consts::{PLAYER_HALF_HEIGHT, PLAYER_HALF_WIDTH};
        Self {
            center: pos,
            half: Vec2::new(PLAYER_HALF_WIDTH, PLAYER_HALF_HEIGHT),
        }
    }

    /// Same extents, moved to a new centre
    #[inline]
    pub fn at(&self, center: Vec2) -> Self {
        Self {
            center,
            half: self.half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.half.x
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.half.y
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.half.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.half.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y - self.half.y
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y + self.half.y
    }

    /// Open-interval overlap on the x axis (touching edges do not count)
    #[inline]
    pub fn overlaps_x(&self, other: &AxisBox) -> bool {
        self.right() > other.left() && self.left() < other.right()
    }

    /// Open-interval overlap on the y axis
    #[inline]
    pub fn overlaps_y(&self, other: &AxisBox) -> bool {
        self.top() > other.bottom() && self.bottom() < other.top()
    }
}
