// Copyright 2025 Lars Brubaker
// License: MIT
//
// Step-by-step notification of diagram construction.

use crate::error::Result;
use crate::geom::{Coordinate, Real};
use crate::mesh::{Mesh, SiteIdx};
use crate::sweep::DiagramStatus;

/// Read-only view of a diagram under construction.
///
/// Origins may be unresolved and rings open while the status is `Running`
/// or `Clipping`; the cell queries then return `IncompleteQuery`.
pub struct Snapshot<'a> {
    pub(crate) mesh: &'a Mesh,
    pub(crate) status: DiagramStatus,
    pub(crate) sweep_y: Option<Real>,
    pub(crate) beach_line: &'a [SiteIdx],
}

impl<'a> Snapshot<'a> {
    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    pub fn status(&self) -> DiagramStatus {
        self.status
    }

    /// Current sweep line position, once the first event has been processed.
    pub fn sweep_y(&self) -> Option<Real> {
        self.sweep_y
    }

    /// Sites of the beach-line arcs, left to right.
    pub fn beach_line(&self) -> &'a [SiteIdx] {
        self.beach_line
    }

    pub fn get_coordinates(&self, site: SiteIdx) -> Result<Vec<Coordinate>> {
        self.mesh.get_coordinates(site)
    }

    pub fn cell_area(&self, site: SiteIdx, precision: Option<u32>) -> Result<Real> {
        self.mesh.cell_area(site, precision)
    }
}

/// Receives a snapshot after every processed sweep event and once more when
/// the diagram is finalized. `message` starts at 1 and increases by one per call.
pub trait Observer {
    fn notify(&mut self, snapshot: &Snapshot<'_>, message: u64);
}
