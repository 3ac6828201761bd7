// Copyright 2025 Lars Brubaker
// License: MIT
//
// Doubly-connected edge list for a Voronoi diagram.
//
// All cross references are u32 indices into Vec arenas owned by the Mesh.
// Nothing is freed individually; the whole structure is dropped at once.
//
// Design:
//   - Half-edges are allocated in pairs: edges[i] and edges[i^1] are twins.
//     twin(e) = e ^ 1, so twin(twin(e)) == e by construction.
//   - A half-edge bounds the cell of `site` on its left. Walking `next` goes
//     counter-clockwise around that cell.
//   - `site == None` marks the exterior face outside the clip boundary.
//   - Origins stay Unresolved until the sweep or the clipper fixes them.
//   - Degenerate pairs (zero length, or outside the clip region) are marked
//     discarded and never appear in a ring.

use crate::error::{Result, VoronoiError};
use crate::geom::{round_to, shoelace_area, Coordinate, Real};

/// Index into Mesh::sites
pub type SiteIdx = u32;
/// Index into Mesh::verts
pub type VertIdx = u32;
/// Index into Mesh::edges
pub type EdgeIdx = u32;

/// The other half of a pair.
#[inline(always)]
pub fn twin(e: EdgeIdx) -> EdgeIdx {
    e ^ 1
}

/// Where a half-edge starts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Origin {
    #[default]
    Unresolved,
    At(VertIdx),
}

impl Origin {
    pub fn vertex(self) -> Option<VertIdx> {
        match self {
            Origin::At(v) => Some(v),
            Origin::Unresolved => None,
        }
    }
}

/// Spreadsheet-style label for a site index: A, B, ..., Z, AA, AB, ...
pub fn site_label(index: SiteIdx) -> String {
    let mut n = index as u64 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

#[derive(Clone, Debug)]
pub struct Site {
    pub index: SiteIdx,
    pub coord: Coordinate,
    /// Position of the first caller input merged into this site.
    pub input_index: usize,
    /// Edge of the closed cell ring with the lexicographically smallest origin.
    pub first_edge: Option<EdgeIdx>,
}

impl Site {
    pub fn name(&self) -> String {
        site_label(self.index)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum VertexKind {
    /// Circumcenter of three or more sites.
    #[default]
    Voronoi,
    /// Where a Voronoi edge crosses the clip boundary.
    Boundary,
    /// A corner of the clip shape.
    Corner,
}

#[derive(Clone, Debug, Default)]
pub struct Vertex {
    pub coord: Coordinate,
    pub kind: VertexKind,
    /// Live half-edges leaving this vertex. Filled in at finalization.
    pub incident: Vec<EdgeIdx>,
}

#[derive(Clone, Debug, Default)]
pub struct HalfEdge {
    pub origin: Origin,
    /// Next edge counter-clockwise around the left face.
    pub next: Option<EdgeIdx>,
    /// Site on the left, or None for the exterior face.
    pub site: Option<SiteIdx>,
    pub discarded: bool,
}

/// The half-edge arena.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub sites: Vec<Site>,
    pub verts: Vec<Vertex>,
    pub edges: Vec<HalfEdge>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_site(&mut self, coord: Coordinate, input_index: usize) -> SiteIdx {
        let index = self.sites.len() as SiteIdx;
        self.sites.push(Site {
            index,
            coord,
            input_index,
            first_edge: None,
        });
        index
    }

    pub fn add_vertex(&mut self, coord: Coordinate, kind: VertexKind) -> VertIdx {
        let v = self.verts.len() as VertIdx;
        self.verts.push(Vertex {
            coord,
            kind,
            incident: Vec::new(),
        });
        v
    }

    /// Create a twin pair. The even half bounds `left`, the odd half `right`.
    pub fn make_edge_pair(&mut self, left: Option<SiteIdx>, right: Option<SiteIdx>) -> EdgeIdx {
        let e = self.edges.len() as EdgeIdx;
        self.edges.push(HalfEdge {
            site: left,
            ..HalfEdge::default()
        });
        self.edges.push(HalfEdge {
            site: right,
            ..HalfEdge::default()
        });
        e
    }

    /// Mark both halves of a pair as degenerate.
    pub fn discard_pair(&mut self, e: EdgeIdx) {
        self.edges[e as usize].discarded = true;
        self.edges[twin(e) as usize].discarded = true;
        self.edges[e as usize].next = None;
        self.edges[twin(e) as usize].next = None;
    }

    // ─────────────────────────── Navigation helpers ────────────────────────────

    #[inline]
    pub fn origin(&self, e: EdgeIdx) -> Origin {
        self.edges[e as usize].origin
    }

    /// Origin of the twin.
    #[inline]
    pub fn dest(&self, e: EdgeIdx) -> Origin {
        self.edges[twin(e) as usize].origin
    }

    #[inline]
    pub fn set_origin(&mut self, e: EdgeIdx, v: VertIdx) {
        self.edges[e as usize].origin = Origin::At(v);
    }

    pub fn origin_coord(&self, e: EdgeIdx) -> Option<Coordinate> {
        self.origin(e).vertex().map(|v| self.verts[v as usize].coord)
    }

    pub fn dest_coord(&self, e: EdgeIdx) -> Option<Coordinate> {
        self.origin_coord(twin(e))
    }

    #[inline]
    pub fn next(&self, e: EdgeIdx) -> Option<EdgeIdx> {
        self.edges.get(e as usize)?.next
    }

    #[inline]
    pub fn site_of(&self, e: EdgeIdx) -> Option<SiteIdx> {
        self.edges.get(e as usize)?.site
    }

    #[inline]
    pub fn is_live(&self, e: EdgeIdx) -> bool {
        self.edges.get(e as usize).map_or(false, |h| !h.discarded)
    }

    /// Indices of all half-edges that are not discarded.
    pub fn live_edges(&self) -> impl Iterator<Item = EdgeIdx> + '_ {
        (0..self.edges.len() as EdgeIdx).filter(move |&e| self.is_live(e))
    }

    /// Recompute every vertex's list of outgoing live half-edges.
    pub fn rebuild_incidence(&mut self) {
        for v in &mut self.verts {
            v.incident.clear();
        }
        for e in 0..self.edges.len() {
            let h = &self.edges[e];
            if h.discarded {
                continue;
            }
            if let Origin::At(v) = h.origin {
                self.verts[v as usize].incident.push(e as EdgeIdx);
            }
        }
    }

    // ───────────────────────────── Cell queries ────────────────────────────────

    /// Half-edges of a cell in ring order, starting at the site's first edge.
    pub fn get_borders(&self, site: SiteIdx) -> Result<Vec<EdgeIdx>> {
        let s = self
            .sites
            .get(site as usize)
            .ok_or_else(|| VoronoiError::incomplete(site, "no such site"))?;
        let first = s
            .first_edge
            .ok_or_else(|| VoronoiError::incomplete(site, "cell ring is not closed"))?;

        let mut ring = Vec::new();
        let mut e = first;
        loop {
            ring.push(e);
            if ring.len() > self.edges.len() {
                return Err(VoronoiError::incomplete(
                    site,
                    "ring does not return to its first edge",
                ));
            }
            e = self.next(e).ok_or_else(|| {
                VoronoiError::incomplete(site, format!("edge {} has no successor", e))
            })?;
            if e == first {
                return Ok(ring);
            }
        }
    }

    /// Vertex indices around a cell, in ring order.
    pub fn get_vertices(&self, site: SiteIdx) -> Result<Vec<VertIdx>> {
        self.get_borders(site)?
            .into_iter()
            .map(|e| {
                self.origin(e).vertex().ok_or_else(|| {
                    VoronoiError::incomplete(site, format!("edge {} has no origin", e))
                })
            })
            .collect()
    }

    /// Coordinates of the cell polygon, counter-clockwise.
    pub fn get_coordinates(&self, site: SiteIdx) -> Result<Vec<Coordinate>> {
        Ok(self
            .get_vertices(site)?
            .into_iter()
            .map(|v| self.verts[v as usize].coord)
            .collect())
    }

    /// Shoelace area of a cell, optionally rounded to `precision` decimal digits.
    pub fn cell_area(&self, site: SiteIdx, precision: Option<u32>) -> Result<Real> {
        let area = shoelace_area(&self.get_coordinates(site)?);
        Ok(match precision {
            Some(digits) => round_to(area, digits),
            None => area,
        })
    }

    /// Sites whose cells share an edge with this cell, in ring order.
    pub fn neighbors(&self, site: SiteIdx) -> Result<Vec<SiteIdx>> {
        let mut out: Vec<SiteIdx> = Vec::new();
        for e in self.get_borders(site)? {
            if let Some(n) = self.site_of(twin(e)) {
                if !out.contains(&n) {
                    out.push(n);
                }
            }
        }
        Ok(out)
    }

    /// Sites whose cells touch a vertex, sorted.
    pub fn incident_sites(&self, v: VertIdx) -> Vec<SiteIdx> {
        let Some(vertex) = self.verts.get(v as usize) else {
            return Vec::new();
        };
        let mut out: Vec<SiteIdx> = vertex
            .incident
            .iter()
            .flat_map(|&e| [self.site_of(e), self.site_of(twin(e))])
            .flatten()
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit square cell for site 0, built by hand.
    fn square_cell() -> Mesh {
        let mut mesh = Mesh::new();
        let s = mesh.add_site(Coordinate::new(0.5, 0.5), 0);
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let verts: Vec<VertIdx> = corners
            .iter()
            .map(|&c| mesh.add_vertex(c.into(), VertexKind::Corner))
            .collect();
        let edges: Vec<EdgeIdx> = (0..4)
            .map(|i| {
                let e = mesh.make_edge_pair(Some(s), None);
                mesh.set_origin(e, verts[i]);
                mesh.set_origin(twin(e), verts[(i + 1) % 4]);
                e
            })
            .collect();
        for i in 0..4 {
            mesh.edges[edges[i] as usize].next = Some(edges[(i + 1) % 4]);
        }
        mesh.sites[s as usize].first_edge = Some(edges[0]);
        mesh.rebuild_incidence();
        mesh
    }

    #[test]
    fn twin_is_an_involution() {
        for e in 0..16 {
            assert_eq!(twin(twin(e)), e);
            assert_ne!(twin(e), e);
        }
    }

    #[test]
    fn site_labels() {
        assert_eq!(site_label(0), "A");
        assert_eq!(site_label(25), "Z");
        assert_eq!(site_label(26), "AA");
        assert_eq!(site_label(27), "AB");
        assert_eq!(site_label(701), "ZZ");
        assert_eq!(site_label(702), "AAA");
    }

    #[test]
    fn walk_square_cell() {
        let mesh = square_cell();
        let borders = mesh.get_borders(0).unwrap();
        assert_eq!(borders.len(), 4);
        assert_eq!(mesh.next(*borders.last().unwrap()), Some(borders[0]));
        let coords = mesh.get_coordinates(0).unwrap();
        assert_eq!(coords[0], Coordinate::new(0.0, 0.0));
        assert_eq!(coords[2], Coordinate::new(1.0, 1.0));
        assert_eq!(mesh.cell_area(0, Some(3)).unwrap(), 1.0);
        assert_eq!(mesh.neighbors(0).unwrap(), Vec::<SiteIdx>::new());
    }

    #[test]
    fn open_ring_is_incomplete() {
        let mut mesh = square_cell();
        let e = mesh.sites[0].first_edge.unwrap();
        mesh.edges[e as usize].next = None;
        let err = mesh.get_borders(0).unwrap_err();
        assert!(matches!(err, VoronoiError::IncompleteQuery { site: 0, .. }), "{:?}", err);
        assert!(mesh.cell_area(0, None).is_err());
        assert!(mesh.get_borders(7).is_err());
    }

    #[test]
    fn unfinished_site_is_incomplete() {
        let mut mesh = Mesh::new();
        mesh.add_site(Coordinate::new(0.0, 0.0), 0);
        assert!(matches!(
            mesh.get_coordinates(0),
            Err(VoronoiError::IncompleteQuery { .. })
        ));
    }

    #[test]
    fn incidence_and_discard() {
        let mut mesh = square_cell();
        assert_eq!(mesh.verts[0].incident.len(), 2, "edge out and exterior twin out");
        assert_eq!(mesh.incident_sites(0), vec![0]);

        let e = mesh.make_edge_pair(Some(0), None);
        mesh.set_origin(e, 0);
        mesh.discard_pair(e);
        mesh.rebuild_incidence();
        assert_eq!(mesh.verts[0].incident.len(), 2);
        assert!(!mesh.is_live(e));
        assert_eq!(mesh.live_edges().count(), 8);
    }
}
