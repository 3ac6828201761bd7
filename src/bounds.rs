// Copyright 2025 Lars Brubaker
// License: MIT
//
// Clip region for a diagram: an axis-aligned rectangle or a convex polygon.
//
// Corners are stored counter-clockwise. Positions along the boundary are
// measured as a perimeter parameter: edge index plus the fraction along that
// edge, so corner k sits at parameter k and the full loop spans [0, n).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};
use crate::geom::{orient, segment_distance, segments_intersect, signed_area, Coordinate, Real};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Polygon,
}

/// A convex clip region.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingShape {
    kind: ShapeKind,
    corners: Vec<Coordinate>,
}

impl BoundingShape {
    /// Axis-aligned box. Argument order follows the usual
    /// `(left, right, bottom, top)` convention.
    pub fn rectangle(left: Real, right: Real, bottom: Real, top: Real) -> Result<Self> {
        if ![left, right, bottom, top].iter().all(|v| v.is_finite()) {
            return Err(VoronoiError::InvalidInput(
                "rectangle bounds must be finite".into(),
            ));
        }
        if left >= right || bottom >= top {
            return Err(VoronoiError::InvalidInput(format!(
                "empty rectangle [{}, {}] x [{}, {}]",
                left, right, bottom, top
            )));
        }
        Ok(BoundingShape {
            kind: ShapeKind::Rectangle,
            corners: vec![
                Coordinate::new(left, bottom),
                Coordinate::new(right, bottom),
                Coordinate::new(right, top),
                Coordinate::new(left, top),
            ],
        })
    }

    /// Convex polygon from its corners in either winding order.
    ///
    /// Repeated and collinear corners are dropped. Only convex polygons are
    /// supported: a simple polygon with a reflex corner is rejected with
    /// [`VoronoiError::InvalidInput`], as are self-intersecting and
    /// degenerate ones.
    pub fn polygon<I, P>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Coordinate>,
    {
        let mut corners: Vec<Coordinate> = points.into_iter().map(Into::into).collect();
        if let Some(p) = corners.iter().find(|p| !p.is_finite()) {
            return Err(VoronoiError::InvalidInput(format!(
                "polygon corner ({}, {}) is not finite",
                p.x, p.y
            )));
        }
        corners.dedup();
        while corners.len() > 1 && corners.first() == corners.last() {
            corners.pop();
        }
        if corners.len() < 3 {
            return Err(VoronoiError::InvalidInput(format!(
                "polygon needs at least 3 distinct corners, got {}",
                corners.len()
            )));
        }

        let area = signed_area(&corners);
        if area == 0.0 || !area.is_finite() {
            return Err(VoronoiError::InvalidInput("polygon has zero area".into()));
        }
        if area < 0.0 {
            corners.reverse();
        }
        if is_self_intersecting(&corners) {
            return Err(VoronoiError::InvalidInput(
                "polygon is self-intersecting".into(),
            ));
        }

        remove_collinear(&mut corners);
        let n = corners.len();
        let reflex = (0..n).any(|i| {
            let prev = corners[(i + n - 1) % n];
            let next = corners[(i + 1) % n];
            orient(prev, corners[i], next) < 0.0
        });
        if reflex || n < 3 {
            return Err(VoronoiError::InvalidInput("polygon is not convex".into()));
        }

        Ok(BoundingShape {
            kind: ShapeKind::Polygon,
            corners,
        })
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Corners in counter-clockwise order.
    pub fn corners(&self) -> &[Coordinate] {
        &self.corners
    }

    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }

    pub fn area(&self) -> Real {
        signed_area(&self.corners)
    }

    /// Lower-left and upper-right corners of the axis-aligned bounds.
    pub fn bounds(&self) -> (Coordinate, Coordinate) {
        let mut lo = Coordinate::new(Real::INFINITY, Real::INFINITY);
        let mut hi = Coordinate::new(Real::NEG_INFINITY, Real::NEG_INFINITY);
        for c in &self.corners {
            lo.x = lo.x.min(c.x);
            lo.y = lo.y.min(c.y);
            hi.x = hi.x.max(c.x);
            hi.y = hi.y.max(c.y);
        }
        (lo, hi)
    }

    fn edge(&self, i: usize) -> (Coordinate, Coordinate) {
        let n = self.corners.len();
        (self.corners[i % n], self.corners[(i + 1) % n])
    }

    /// How far `p` lies outside the shape; zero or negative when inside.
    pub fn distance_outside(&self, p: Coordinate) -> Real {
        (0..self.corners.len())
            .map(|i| {
                let (a, b) = self.edge(i);
                let len = (b - a).length();
                -(b - a).perp_dot(p - a) / len
            })
            .fold(Real::NEG_INFINITY, Real::max)
    }

    /// Point-in-shape test that accepts points up to `eps` outside.
    pub fn contains(&self, p: Coordinate, eps: Real) -> bool {
        self.distance_outside(p) <= eps
    }

    /// Parameter range `[t_enter, t_exit]` of the line `base + t * dir` that
    /// lies inside the shape, or None if the line misses it.
    pub fn clip_line(&self, base: Coordinate, dir: Coordinate) -> Option<(Real, Real)> {
        let mut t_enter = Real::NEG_INFINITY;
        let mut t_exit = Real::INFINITY;
        for i in 0..self.corners.len() {
            let (a, b) = self.edge(i);
            let inward = (b - a).rot_ccw();
            let num = inward.dot(base - a);
            let den = inward.dot(dir);
            if den == 0.0 {
                if num < 0.0 {
                    return None;
                }
                continue;
            }
            let t = -num / den;
            if den > 0.0 {
                t_enter = t_enter.max(t);
            } else {
                t_exit = t_exit.min(t);
            }
        }
        if t_enter <= t_exit && t_enter.is_finite() && t_exit.is_finite() {
            Some((t_enter, t_exit))
        } else {
            None
        }
    }

    /// Perimeter parameter of a point within `eps` of the boundary.
    pub fn perimeter_position(&self, p: Coordinate, eps: Real) -> Option<Real> {
        (0..self.corners.len()).find_map(|i| {
            let (a, b) = self.edge(i);
            if segment_distance(p, a, b) > eps {
                return None;
            }
            let ab = b - a;
            let t = ((p - a).dot(ab) / ab.length_sq()).clamp(0.0, 1.0);
            Some(i as Real + t)
        })
    }

    /// Closest point to `p` on the boundary.
    pub fn nearest_boundary_point(&self, p: Coordinate) -> Coordinate {
        let mut best = self.corners[0];
        let mut best_dist = Real::INFINITY;
        for i in 0..self.corners.len() {
            let (a, b) = self.edge(i);
            let ab = b - a;
            let t = ((p - a).dot(ab) / ab.length_sq()).clamp(0.0, 1.0);
            let q = a + ab * t;
            let dist = (p - q).length_sq();
            if dist < best_dist {
                best = q;
                best_dist = dist;
            }
        }
        best
    }

    /// Index of the corner within `eps` of `p`, if any.
    pub fn corner_near(&self, p: Coordinate, eps: Real) -> Option<usize> {
        self.corners.iter().position(|c| c.approx_eq(p, eps))
    }
}

fn is_self_intersecting(corners: &[Coordinate]) -> bool {
    let n = corners.len();
    for i in 0..n {
        let (a, b) = (corners[i], corners[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (corners[j], corners[(j + 1) % n]);
            if segments_intersect(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

fn remove_collinear(corners: &mut Vec<Coordinate>) {
    let mut i = 0;
    while corners.len() >= 3 && i < corners.len() {
        let n = corners.len();
        let prev = corners[(i + n - 1) % n];
        let next = corners[(i + 1) % n];
        if orient(prev, corners[i], next) == 0.0 {
            corners.remove(i);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
}
