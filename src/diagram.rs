// Copyright 2025 Lars Brubaker
// License: MIT
//
// A finished Voronoi diagram.

use crate::bounds::BoundingShape;
use crate::config::VoronoiConfig;
use crate::error::{Result, VoronoiError};
use crate::geom::{Coordinate, Real};
use crate::mesh::{twin, EdgeIdx, HalfEdge, Mesh, Origin, Site, SiteIdx, VertIdx, Vertex, VertexKind};
use crate::sweep::DiagramStatus;

/// The clipped diagram: one closed counter-clockwise cell per distinct site.
///
/// Sites are indexed in order of their first appearance in the input.
/// Cells that could not be closed are listed in `issues()`; queries on them
/// return `IncompleteQuery`.
#[derive(Clone, Debug)]
pub struct Diagram<M = ()> {
    mesh: Mesh,
    shape: BoundingShape,
    config: VoronoiConfig,
    metadata: Vec<Option<M>>,
    input_site: Vec<SiteIdx>,
    issues: Vec<VoronoiError>,
    degenerate: bool,
    messages: u64,
}

impl<M> Diagram<M> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        mesh: Mesh,
        shape: BoundingShape,
        config: VoronoiConfig,
        metadata: Vec<Option<M>>,
        input_site: Vec<SiteIdx>,
        issues: Vec<VoronoiError>,
        degenerate: bool,
        messages: u64,
    ) -> Self {
        Diagram {
            mesh,
            shape,
            config,
            metadata,
            input_site,
            issues,
            degenerate,
            messages,
        }
    }

    pub fn status(&self) -> DiagramStatus {
        DiagramStatus::Finalized
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn shape(&self) -> &BoundingShape {
        &self.shape
    }

    pub fn config(&self) -> &VoronoiConfig {
        &self.config
    }

    // ──────────────────────────────── Elements ─────────────────────────────────

    pub fn sites(&self) -> &[Site] {
        &self.mesh.sites
    }

    pub fn site(&self, site: SiteIdx) -> Option<&Site> {
        self.mesh.sites.get(site as usize)
    }

    pub fn site_count(&self) -> usize {
        self.mesh.sites.len()
    }

    /// Every vertex ever created, including ones later clipped away.
    pub fn vertices(&self) -> &[Vertex] {
        &self.mesh.verts
    }

    pub fn vertex(&self, v: VertIdx) -> Option<&Vertex> {
        self.mesh.verts.get(v as usize)
    }

    /// Voronoi vertices (circumcenters) that survived clipping.
    pub fn interior_vertices(&self) -> Vec<VertIdx> {
        self.mesh
            .verts
            .iter()
            .enumerate()
            .filter(|(_, v)| v.kind == VertexKind::Voronoi && !v.incident.is_empty())
            .map(|(i, _)| i as VertIdx)
            .collect()
    }

    pub fn edge(&self, e: EdgeIdx) -> Option<&HalfEdge> {
        self.mesh.edges.get(e as usize)
    }

    /// Number of live half-edges.
    pub fn edge_count(&self) -> usize {
        self.mesh.live_edges().count()
    }

    #[inline]
    pub fn twin(&self, e: EdgeIdx) -> EdgeIdx {
        twin(e)
    }

    pub fn next(&self, e: EdgeIdx) -> Option<EdgeIdx> {
        self.mesh.next(e)
    }

    pub fn origin(&self, e: EdgeIdx) -> Option<Coordinate> {
        match self.mesh.edges.get(e as usize)?.origin {
            Origin::At(v) => Some(self.mesh.verts[v as usize].coord),
            Origin::Unresolved => None,
        }
    }

    /// Site whose cell lies left of `e`; None on the exterior face.
    pub fn site_of(&self, e: EdgeIdx) -> Option<SiteIdx> {
        self.mesh.site_of(e)
    }

    // ────────────────────────────── Cell queries ───────────────────────────────

    pub fn get_borders(&self, site: SiteIdx) -> Result<Vec<EdgeIdx>> {
        self.mesh.get_borders(site)
    }

    pub fn get_vertices(&self, site: SiteIdx) -> Result<Vec<VertIdx>> {
        self.mesh.get_vertices(site)
    }

    pub fn get_coordinates(&self, site: SiteIdx) -> Result<Vec<Coordinate>> {
        self.mesh.get_coordinates(site)
    }

    pub fn cell_area(&self, site: SiteIdx, precision: Option<u32>) -> Result<Real> {
        self.mesh.cell_area(site, precision)
    }

    pub fn neighbors(&self, site: SiteIdx) -> Result<Vec<SiteIdx>> {
        self.mesh.neighbors(site)
    }

    pub fn incident_sites(&self, v: VertIdx) -> Vec<SiteIdx> {
        self.mesh.incident_sites(v)
    }

    /// Sum of the areas of every closed cell.
    pub fn total_area(&self) -> Real {
        (0..self.site_count() as SiteIdx)
            .filter_map(|s| self.cell_area(s, None).ok())
            .sum()
    }

    // ───────────────────────────────── Inputs ──────────────────────────────────

    pub fn metadata(&self, site: SiteIdx) -> Option<&M> {
        self.metadata.get(site as usize)?.as_ref()
    }

    /// Site that the `i`-th caller input was merged into.
    pub fn input_site(&self, i: usize) -> Option<SiteIdx> {
        self.input_site.get(i).copied()
    }

    /// True if any circle event was skipped as degenerate or any cell could
    /// not be closed.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Non-fatal problems met while building.
    pub fn issues(&self) -> &[VoronoiError] {
        &self.issues
    }

    /// Number of observer notifications sent while building.
    pub fn messages(&self) -> u64 {
        self.messages
    }
}
