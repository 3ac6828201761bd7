// Copyright 2025 Lars Brubaker
// Shared test utilities for voronoi-dcel tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voronoi_dcel::geom::signed_area;
use voronoi_dcel::{BoundingShape, Coordinate, Diagram, SiteIdx, Voronoi};

pub fn build(shape: BoundingShape, points: &[(f64, f64)]) -> Diagram {
    let mut voronoi = Voronoi::new(shape);
    voronoi
        .create_diagram(points.iter().copied())
        .expect("diagram construction failed")
}

/// `count` points drawn uniformly from the shape's bounds, keeping those
/// strictly inside it.
pub fn random_points(seed: u64, count: usize, shape: &BoundingShape) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (lo, hi) = shape.bounds();
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let p = Coordinate::new(rng.gen_range(lo.x..hi.x), rng.gen_range(lo.y..hi.y));
        if shape.contains(p, -1e-6) {
            out.push((p.x, p.y));
        }
    }
    out
}

/// Every cell ring is closed, counter-clockwise and consistent with its twins.
pub fn assert_valid_dcel<M>(diagram: &Diagram<M>) {
    for s in 0..diagram.site_count() as SiteIdx {
        let ring = diagram
            .get_borders(s)
            .unwrap_or_else(|e| panic!("cell {} is not closed: {}", s, e));
        assert!(!ring.is_empty(), "cell {} has no edges", s);
        let first = diagram.site(s).unwrap().first_edge.unwrap();
        assert_eq!(ring[0], first);
        assert_eq!(diagram.next(*ring.last().unwrap()), Some(first));
        for &e in &ring {
            assert_eq!(diagram.site_of(e), Some(s), "edge {} is in the wrong ring", e);
            assert_eq!(diagram.twin(diagram.twin(e)), e);
            let twin_origin = diagram.origin(diagram.twin(e)).unwrap();
            assert_ne!(diagram.origin(e).unwrap(), twin_origin, "zero-length edge {}", e);
        }
        let coords = diagram.get_coordinates(s).unwrap();
        assert!(signed_area(&coords) > 0.0, "cell {} is not counter-clockwise", s);
    }
}

pub fn assert_area_conserved<M>(diagram: &Diagram<M>, tol: f64) {
    let total = diagram.total_area();
    let expected = diagram.shape().area();
    assert!(
        (total - expected).abs() <= tol,
        "cell areas sum to {}, shape area is {}",
        total,
        expected
    );
}

/// Every corner of a cell is at least as close to its own site as to any
/// other site.
pub fn assert_nearest_site<M>(diagram: &Diagram<M>, tol: f64) {
    let sites: Vec<Coordinate> = diagram.sites().iter().map(|s| s.coord).collect();
    for (s, own) in sites.iter().enumerate() {
        for p in diagram.get_coordinates(s as SiteIdx).unwrap() {
            let d_own = (p - *own).length();
            for other in &sites {
                assert!(
                    d_own <= (p - *other).length() + tol,
                    "corner ({}, {}) of cell {} is closer to ({}, {})",
                    p.x,
                    p.y,
                    s,
                    other.x,
                    other.y
                );
            }
        }
    }
}

/// No cell turns clockwise at any corner by more than `tol` times the
/// length of the chord around that corner.
pub fn assert_convex_cells<M>(diagram: &Diagram<M>, tol: f64) {
    for s in 0..diagram.site_count() as SiteIdx {
        let coords = diagram.get_coordinates(s).unwrap();
        let n = coords.len();
        for i in 0..n {
            let prev = coords[(i + n - 1) % n];
            let cur = coords[i];
            let next = coords[(i + 1) % n];
            let cross = (cur - prev).perp_dot(next - cur);
            assert!(
                cross >= -tol * (next - prev).length(),
                "cell {} turns clockwise at ({}, {}): {}",
                s,
                cur.x,
                cur.y,
                cross
            );
        }
    }
}

/// Roughly half the points of the integer grid 1..=9 x 1..=9, each moved by
/// up to `noise` in both axes.
pub fn noisy_grid(seed: u64, noise: f64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::new();
    for i in 1..=9 {
        for j in 1..=9 {
            if rng.gen_bool(0.5) {
                let dx = rng.gen_range(-noise..=noise);
                let dy = rng.gen_range(-noise..=noise);
                out.push((i as f64 + dx, j as f64 + dy));
            }
        }
    }
    if out.is_empty() {
        out.push((5.0, 5.0));
    }
    out
}

/// Brute-force cell: the shape cut by the bisector half-plane of every
/// other site.
pub fn brute_force_cell(site: Coordinate, others: &[Coordinate], shape: &BoundingShape) -> Vec<Coordinate> {
    let mut poly: Vec<Coordinate> = shape.corners().to_vec();
    for &q in others {
        if q == site {
            continue;
        }
        // Keep points p with (p - m) . (q - site) <= 0.
        let m = site.midpoint(q);
        let n = q - site;
        let side = |p: Coordinate| (p - m).dot(n);
        let mut out = Vec::new();
        for i in 0..poly.len() {
            let a = poly[i];
            let b = poly[(i + 1) % poly.len()];
            let (sa, sb) = (side(a), side(b));
            if sa <= 0.0 {
                out.push(a);
            }
            if (sa < 0.0 && sb > 0.0) || (sa > 0.0 && sb < 0.0) {
                let t = sa / (sa - sb);
                out.push(a + (b - a) * t);
            }
        }
        poly = out;
    }
    poly
}

pub fn brute_force_area<M>(diagram: &Diagram<M>, s: SiteIdx) -> f64 {
    let sites: Vec<Coordinate> = diagram.sites().iter().map(|s| s.coord).collect();
    signed_area(&brute_force_cell(sites[s as usize], &sites, diagram.shape())).abs()
}
