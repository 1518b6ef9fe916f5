//! Planar geometry helpers in canvas pixel space.
use serde::{Deserialize, Serialize};

/// A point in canvas coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation from `self` toward `other` by `t`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: (other.x - self.x).mul_add(t, self.x),
            y: (other.y - self.y).mul_add(t, self.y),
        }
    }

    /// Point at exactly `distance` from `self`, on the segment toward `toward`.
    ///
    /// Returns `self` unchanged when the two points coincide.
    #[must_use]
    pub fn step_toward(self, toward: Self, distance: f64) -> Self {
        let length = self.distance(toward);
        if length <= f64::EPSILON {
            return self;
        }
        let scale = distance / length;
        Self {
            x: (toward.x - self.x).mul_add(scale, self.x),
            y: (toward.y - self.y).mul_add(scale, self.y),
        }
    }
}

/// Canvas extent the presentation layer reports; bounds station placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1_280.0, 720.0)
    }
}

/// Heading in radians of the vector from `from` to `to`.
#[must_use]
pub fn angle_between(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Shortest distance from `p` to the segment `a`–`b`.
///
/// Degenerate segments collapse to the distance from `a`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let cx = b.x - a.x;
    let cy = b.y - a.y;
    let len_sq = cx.mul_add(cx, cy * cy);
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (p.x - a.x).mul_add(cx, (p.y - a.y) * cy) / len_sq;
    let nearest = a.lerp(b, t.clamp(0.0, 1.0));
    p.distance(nearest)
}
