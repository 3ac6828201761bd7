// Copyright 2025 Lars Brubaker
// License: MIT
//
// Planar geometry on f64 coordinates.
//
// The sweep line moves toward increasing y. Sites below the sweep line have
// parabolic arcs that open downward; the beach line is their upper envelope.
// All tolerant comparisons take the tolerance as an argument (see
// VoronoiConfig) rather than reading a global constant.

use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type Real = f64;

/// A 2D position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coordinate {
    pub x: Real,
    pub y: Real,
}

impl Coordinate {
    #[inline]
    pub const fn new(x: Real, y: Real) -> Self {
        Coordinate { x, y }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn dot(self, other: Self) -> Real {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product.
    #[inline]
    pub fn perp_dot(self, other: Self) -> Real {
        self.x * other.y - self.y * other.x
    }

    /// Rotate a quarter turn counter-clockwise.
    #[inline]
    pub fn rot_ccw(self) -> Self {
        Coordinate::new(-self.y, self.x)
    }

    #[inline]
    pub fn length_sq(self) -> Real {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> Real {
        self.length_sq().sqrt()
    }

    /// Unit vector in the same direction, or None for a zero vector.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        Coordinate::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }

    /// True if both axes differ by at most `eps`.
    #[inline]
    pub fn approx_eq(self, other: Self, eps: Real) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }

    /// Lexicographic order: x first, then y.
    pub fn lex_cmp(self, other: Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

impl Add for Coordinate {
    type Output = Coordinate;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Coordinate::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coordinate {
    type Output = Coordinate;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Coordinate::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Real> for Coordinate {
    type Output = Coordinate;
    #[inline]
    fn mul(self, k: Real) -> Self {
        Coordinate::new(self.x * k, self.y * k)
    }
}

impl Neg for Coordinate {
    type Output = Coordinate;
    #[inline]
    fn neg(self) -> Self {
        Coordinate::new(-self.x, -self.y)
    }
}

impl From<(Real, Real)> for Coordinate {
    fn from((x, y): (Real, Real)) -> Self {
        Coordinate::new(x, y)
    }
}

impl From<[Real; 2]> for Coordinate {
    fn from([x, y]: [Real; 2]) -> Self {
        Coordinate::new(x, y)
    }
}

/// Twice the signed area of triangle (a, b, c). Positive when counter-clockwise.
#[inline]
pub fn orient(a: Coordinate, b: Coordinate, c: Coordinate) -> Real {
    (b - a).perp_dot(c - a)
}

/// Center of the circle through three points, or None when they are collinear.
pub fn circumcenter(a: Coordinate, b: Coordinate, c: Coordinate) -> Option<Coordinate> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.perp_dot(ac);
    if d == 0.0 {
        return None;
    }
    let ab2 = ab.length_sq();
    let ac2 = ac.length_sq();
    let ux = (ac.y * ab2 - ab.y * ac2) / d;
    let uy = (ab.x * ac2 - ac.x * ab2) / d;
    let center = Coordinate::new(a.x + ux, a.y + uy);
    if center.is_finite() {
        Some(center)
    } else {
        None
    }
}

/// x-position of the breakpoint between the arc of `left` and the arc of
/// `right` (in that order along the beach line) when the sweep is at `directrix`.
///
/// With the directrix translated to y = 0, both parabolas satisfy
/// `y = ((x - fx)^2 + fy^2) / (2 fy)`. Equating them in `u = x - left.x`
/// gives `A u^2 + B u + C = 0`; of the two roots, the breakpoint with `left`
/// on its left is `(-B - sqrt(D)) / 2A`, evaluated in its cancellation-free
/// form when B is negative.
///
/// No tolerance is involved: the coefficients scale with the square of the
/// site spacing, so sites a few ulps apart still get the exact branch.
pub fn breakpoint_x(left: Coordinate, right: Coordinate, directrix: Real) -> Real {
    let da = left.y - directrix;
    let db = right.y - directrix;
    let dx = right.x - left.x;

    // Taken from the coordinates directly: da and db may be large and close.
    let a = right.y - left.y;
    let b = 2.0 * da * dx;
    let c = -da * (db * a + dx * dx);
    let root = (b * b - 4.0 * a * c).max(0.0).sqrt();

    let u = if b < 0.0 {
        2.0 * c / (root - b)
    } else if a != 0.0 {
        (-b - root) / (2.0 * a)
    } else if b > 0.0 {
        // Equal heights with `left` to the right of `right`: the breakpoint
        // has run off to the far left.
        return Real::NEG_INFINITY;
    } else {
        0.5 * dx
    };
    left.x + u
}

/// Signed area of a closed polygon. Positive when counter-clockwise.
pub fn signed_area(points: &[Coordinate]) -> Real {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut prev = points[n - 1];
    for &p in points {
        sum += prev.x * p.y - p.x * prev.y;
        prev = p;
    }
    0.5 * sum
}

/// Shoelace area: `0.5 * |sum(x_i * y_(i-1) - y_i * x_(i-1))|`.
pub fn shoelace_area(points: &[Coordinate]) -> Real {
    signed_area(points).abs()
}

/// Round to a number of decimal digits.
pub fn round_to(value: Real, digits: u32) -> Real {
    let scale = 10f64.powi(digits.min(i32::MAX as u32) as i32);
    if !scale.is_finite() {
        return value;
    }
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// Distance from `p` to segment `ab`.
pub fn segment_distance(p: Coordinate, a: Coordinate, b: Coordinate) -> Real {
    let ab = b - a;
    let len2 = ab.length_sq();
    if len2 == 0.0 {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}

/// True if closed segments `ab` and `cd` intersect.
pub fn segments_intersect(a: Coordinate, b: Coordinate, c: Coordinate, d: Coordinate) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(c, d, a))
        || (d2 == 0.0 && on_segment(c, d, b))
        || (d3 == 0.0 && on_segment(a, b, c))
        || (d4 == 0.0 && on_segment(a, b, d))
}

fn on_segment(a: Coordinate, b: Coordinate, p: Coordinate) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}
