// Copyright 2025 Lars Brubaker
// License: MIT
//
// Clipping and ring finalization.
//
// Every surviving edge pair is cut to the shape along its bisector line
// (Cyrus-Beck against the convex shape). The line is taken through the
// midpoint of the two sites, so a far-away vertex only bounds the parameter
// range. Each cell's edges are then sorted counter-clockwise around its site
// and linked into a ring; gaps between consecutive edges are bridged by
// boundary half-edges that follow the shape counter-clockwise, whose twins
// form the exterior face. A ring that is not convex is rejected.

use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::bounds::BoundingShape;
use crate::error::VoronoiError;
use crate::geom::{signed_area, Coordinate, Real};
use crate::mesh::{twin, EdgeIdx, Mesh, Origin, SiteIdx, VertIdx, VertexKind};

pub(crate) struct Clipper<'a> {
    shape: &'a BoundingShape,
    /// One tolerance for every decision: a vertex this close to the boundary
    /// lies on it, an edge this short is dropped, two ring ends this close
    /// meet.
    tol: Real,
    corner_verts: Vec<Option<VertIdx>>,
}

impl<'a> Clipper<'a> {
    pub(crate) fn new(shape: &'a BoundingShape, eps: Real) -> Self {
        let (lo, hi) = shape.bounds();
        let extent = (hi - lo).length();
        Clipper {
            shape,
            tol: eps.max(extent * 1e-12),
            corner_verts: vec![None; shape.corner_count()],
        }
    }

    fn corner_vertex(&mut self, mesh: &mut Mesh, k: usize) -> VertIdx {
        if let Some(v) = self.corner_verts[k] {
            return v;
        }
        let v = mesh.add_vertex(self.shape.corners()[k], VertexKind::Corner);
        self.corner_verts[k] = Some(v);
        v
    }

    /// New vertex where an edge meets the boundary, snapped to a corner.
    fn boundary_vertex(&mut self, mesh: &mut Mesh, p: Coordinate) -> VertIdx {
        let p = self.shape.nearest_boundary_point(p);
        match self.shape.corner_near(p, self.tol) {
            Some(k) => self.corner_vertex(mesh, k),
            None => mesh.add_vertex(p, VertexKind::Boundary),
        }
    }

    /// True if an edge end must be cut back to the shape.
    fn outside(&self, end: Option<Coordinate>) -> bool {
        end.map_or(true, |p| self.shape.distance_outside(p) > self.tol)
    }

    /// Move Voronoi vertices that lie just outside the shape onto its
    /// boundary. Returns how many moved.
    pub(crate) fn snap_vertices(&self, mesh: &mut Mesh) -> usize {
        let mut moved = 0;
        for v in mesh.verts.iter_mut() {
            if v.kind != VertexKind::Voronoi {
                continue;
            }
            let d = self.shape.distance_outside(v.coord);
            if d > 0.0 && d <= self.tol {
                v.coord = self.shape.nearest_boundary_point(v.coord);
                moved += 1;
            }
        }
        moved
    }

    /// Cut every edge pair to the shape. Returns the number of pairs discarded.
    pub(crate) fn clip_edges(&mut self, mesh: &mut Mesh) -> usize {
        let mut discarded = 0;
        for e in (0..mesh.edges.len() as EdgeIdx).step_by(2) {
            if mesh.edges[e as usize].discarded {
                continue;
            }
            let (Some(p), Some(q)) = (mesh.site_of(e), mesh.site_of(twin(e))) else {
                continue;
            };
            let ps = mesh.sites[p as usize].coord;
            let qs = mesh.sites[q as usize].coord;
            // Direction of e: its site on the left.
            let Some(dir) = (qs - ps).rot_ccw().normalized() else {
                mesh.discard_pair(e);
                discarded += 1;
                continue;
            };

            let base = ps.midpoint(qs);
            let (start, end) = (mesh.origin_coord(e), mesh.dest_coord(e));
            let lo = start.map_or(Real::NEG_INFINITY, |a| (a - base).dot(dir));
            let hi = end.map_or(Real::INFINITY, |b| (b - base).dot(dir));
            let Some((t_enter, t_exit)) = self.shape.clip_line(base, dir) else {
                mesh.discard_pair(e);
                discarded += 1;
                continue;
            };
            let t0 = lo.max(t_enter);
            let t1 = hi.min(t_exit);
            if t1 - t0 <= self.tol {
                mesh.discard_pair(e);
                discarded += 1;
                continue;
            }
            // Ends more than tol outside are cut, however close t0 is to lo.
            if self.outside(start) {
                let v = self.boundary_vertex(mesh, base + dir * t0);
                mesh.set_origin(e, v);
            }
            if self.outside(end) {
                let v = self.boundary_vertex(mesh, base + dir * t1);
                mesh.set_origin(twin(e), v);
            }
        }
        discarded
    }

    /// Link the ring of every cell and the exterior face. Returns one
    /// ClippingFailure per cell whose ring could not be closed.
    pub(crate) fn close_rings(&mut self, mesh: &mut Mesh) -> Vec<VoronoiError> {
        let mut by_site: Vec<Vec<EdgeIdx>> = vec![Vec::new(); mesh.sites.len()];
        for e in mesh.live_edges() {
            if let Some(s) = mesh.site_of(e) {
                by_site[s as usize].push(e);
            }
        }

        let mut failures = Vec::new();
        for (s, edges) in by_site.into_iter().enumerate() {
            let site = s as SiteIdx;
            let mark = mesh.edges.len();
            if let Err(reason) = self.close_ring(mesh, site, edges) {
                // Roll back: the cell keeps its Voronoi edges but no ring.
                for e in (mark..mesh.edges.len()).step_by(2) {
                    mesh.discard_pair(e as EdgeIdx);
                }
                for e in 0..mark {
                    if mesh.edges[e].site == Some(site) {
                        mesh.edges[e].next = None;
                    }
                }
                mesh.sites[s].first_edge = None;
                failures.push(VoronoiError::ClippingFailure { site, reason });
            }
        }

        self.link_exterior(mesh);
        mesh.rebuild_incidence();
        failures
    }

    fn close_ring(
        &mut self,
        mesh: &mut Mesh,
        site: SiteIdx,
        edges: Vec<EdgeIdx>,
    ) -> std::result::Result<(), String> {
        let center = mesh.sites[site as usize].coord;
        let mut keyed = Vec::with_capacity(edges.len());
        for e in edges {
            let (Some(a), Some(b)) = (mesh.origin_coord(e), mesh.dest_coord(e)) else {
                return Err(format!("edge {} has an unresolved end", e));
            };
            let mid = a.midpoint(b) - center;
            keyed.push((mid.y.atan2(mid.x), e));
        }
        keyed.sort_by(|x, y| x.0.total_cmp(&y.0));
        let sorted: Vec<EdgeIdx> = keyed.into_iter().map(|(_, e)| e).collect();

        let mut ring = Vec::new();
        if sorted.is_empty() {
            // The cell is the whole shape.
            let n = self.shape.corner_count();
            for k in 0..n {
                let from = self.corner_vertex(mesh, k);
                let to = self.corner_vertex(mesh, (k + 1) % n);
                ring.push(boundary_pair(mesh, site, from, to));
            }
        } else {
            for (i, &e) in sorted.iter().enumerate() {
                let f = sorted[(i + 1) % sorted.len()];
                ring.push(e);
                let (Origin::At(x), Origin::At(y)) = (mesh.dest(e), mesh.origin(f)) else {
                    return Err(format!("edge {} has an unresolved end", e));
                };
                let (px, py) = (mesh.verts[x as usize].coord, mesh.verts[y as usize].coord);
                if x == y || px.approx_eq(py, self.tol) {
                    continue;
                }
                let bridge = self.walk_boundary(mesh, site, x, y)?;
                ring.extend(bridge);
            }
        }

        for (i, &e) in ring.iter().enumerate() {
            mesh.edges[e as usize].next = Some(ring[(i + 1) % ring.len()]);
        }

        let coords: Vec<Coordinate> = ring.iter().filter_map(|&e| mesh.origin_coord(e)).collect();
        let area = signed_area(&coords);
        if area.is_nan() || area <= 0.0 {
            return Err(format!("cell ring has non-positive area {}", area));
        }
        self.check_convex(&coords)?;

        let first = ring
            .iter()
            .zip(&coords)
            .min_by(|(_, a), (_, b)| a.lex_cmp(**b))
            .map(|(&e, _)| e);
        mesh.sites[site as usize].first_edge = first;
        Ok(())
    }

    /// A clipped cell is convex: every corner turns left, up to the
    /// tolerance, and the ring turns once in total.
    pub(crate) fn check_convex(&self, coords: &[Coordinate]) -> std::result::Result<(), String> {
        let n = coords.len();
        let mut turning = 0.0;
        for i in 0..n {
            let prev = coords[(i + n - 1) % n];
            let cur = coords[i];
            let next = coords[(i + 1) % n];
            let (inward, outward) = (cur - prev, next - cur);
            let cross = inward.perp_dot(outward);
            if cross < -2.0 * self.tol * (next - prev).length() {
                return Err(format!(
                    "cell ring turns clockwise at ({}, {})",
                    cur.x, cur.y
                ));
            }
            turning += cross.atan2(inward.dot(outward));
        }
        if (turning - TAU).abs() > 1e-6 {
            return Err(format!(
                "cell ring winds {:.3} times around its site",
                turning / TAU
            ));
        }
        Ok(())
    }

    /// Boundary half-edges from vertex `x` counter-clockwise to vertex `y`.
    fn walk_boundary(
        &mut self,
        mesh: &mut Mesh,
        site: SiteIdx,
        x: VertIdx,
        y: VertIdx,
    ) -> std::result::Result<Vec<EdgeIdx>, String> {
        let px = mesh.verts[x as usize].coord;
        let py = mesh.verts[y as usize].coord;
        let (Some(tx), Some(mut ty)) = (
            self.shape.perimeter_position(px, self.tol),
            self.shape.perimeter_position(py, self.tol),
        ) else {
            return Err(format!(
                "open cell ends ({}, {}) and ({}, {}) are not both on the boundary",
                px.x, px.y, py.x, py.y
            ));
        };
        let n = self.shape.corner_count();
        if ty <= tx {
            ty += n as Real;
        }

        let mut bridge = Vec::new();
        let mut from = x;
        let mut k = tx.floor() as usize + 1;
        while (k as Real) < ty {
            let corner = k % n;
            let c = self.shape.corners()[corner];
            if !c.approx_eq(px, self.tol) && !c.approx_eq(py, self.tol) {
                let cv = self.corner_vertex(mesh, corner);
                if cv != from {
                    bridge.push(boundary_pair(mesh, site, from, cv));
                    from = cv;
                }
            }
            k += 1;
        }
        if from != y {
            bridge.push(boundary_pair(mesh, site, from, y));
        }
        Ok(bridge)
    }

    /// Link the twins of boundary half-edges into the exterior face, which
    /// runs clockwise around the shape.
    fn link_exterior(&self, mesh: &mut Mesh) {
        let boundary: Vec<EdgeIdx> = mesh
            .live_edges()
            .filter(|&e| mesh.site_of(e).is_some() && mesh.site_of(twin(e)).is_none())
            .filter(|&e| mesh.next(e).is_some())
            .collect();
        let by_dest: HashMap<VertIdx, EdgeIdx> = boundary
            .iter()
            .filter_map(|&b| mesh.dest(b).vertex().map(|d| (d, b)))
            .collect();
        for &b in &boundary {
            let prev = mesh.origin(b).vertex().and_then(|o| by_dest.get(&o));
            if let Some(&prev) = prev {
                mesh.edges[twin(b) as usize].next = Some(twin(prev));
            }
        }
    }
}

fn boundary_pair(mesh: &mut Mesh, site: SiteIdx, from: VertIdx, to: VertIdx) -> EdgeIdx {
    let e = mesh.make_edge_pair(Some(site), None);
    mesh.set_origin(e, from);
    mesh.set_origin(twin(e), to);
    e
}
