// Copyright 2025 Lars Brubaker
// License: MIT
//
// Fortune's sweep over a set of sites, producing a clipped DCEL.
//
// Voronoi is the public entry point. DiagramBuilder holds the sweep state:
// the event queue, the beach line and the mesh under construction. Once the
// queue is empty, the clipper bounds every edge to the shape and closes the
// cell rings (see clip.rs).

use tracing::{debug, trace, warn};

use crate::beachline::{ArcIdx, BeachLine};
use crate::bounds::BoundingShape;
use crate::bucketalloc::BucketAlloc;
use crate::config::VoronoiConfig;
use crate::diagram::Diagram;
use crate::error::{Result, VoronoiError};
use crate::geom::{breakpoint_x, circumcenter, Coordinate, Real};
use crate::mesh::{twin, Mesh, Origin, SiteIdx, VertexKind};
use crate::observer::{Observer, Snapshot};
use crate::priorityq::PriorityQ;
use crate::sweep::{CircleEvent, DiagramStatus, EventIdx, EventKind, SweepEvent};

mod clip;

use clip::Clipper;

// ─────────────────────────────── Public types ──────────────────────────────────

/// One input site with optional caller-owned metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteInput<M = ()> {
    pub coord: Coordinate,
    pub metadata: Option<M>,
}

impl<M> SiteInput<M> {
    pub fn new(coord: impl Into<Coordinate>) -> Self {
        SiteInput {
            coord: coord.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(coord: impl Into<Coordinate>, metadata: M) -> Self {
        SiteInput {
            coord: coord.into(),
            metadata: Some(metadata),
        }
    }
}

impl<M> From<Coordinate> for SiteInput<M> {
    fn from(coord: Coordinate) -> Self {
        SiteInput::new(coord)
    }
}

impl<M> From<(Real, Real)> for SiteInput<M> {
    fn from(coord: (Real, Real)) -> Self {
        SiteInput::new(coord)
    }
}

/// Builds Voronoi diagrams clipped to a fixed shape.
///
/// ```rust
/// use voronoi_dcel::{BoundingShape, Voronoi};
///
/// let shape = BoundingShape::rectangle(-5.0, 15.0, -5.0, 5.0).unwrap();
/// let mut voronoi = Voronoi::new(shape);
/// let diagram = voronoi.create_diagram([(0.0, 0.0), (10.0, 0.0)]).unwrap();
/// assert_eq!(diagram.cell_area(0, Some(6)).unwrap(), 100.0);
/// ```
pub struct Voronoi {
    shape: BoundingShape,
    config: VoronoiConfig,
    observer: Option<Box<dyn Observer>>,
}

impl Voronoi {
    /// Builder for diagrams bounded by `shape`, with the default configuration.
    ///
    /// The shape is always convex: [`BoundingShape::polygon`] rejects a
    /// polygon with a reflex corner with [`VoronoiError::InvalidInput`], so
    /// concave outlines must be split by the caller.
    pub fn new(shape: BoundingShape) -> Self {
        Voronoi {
            shape,
            config: VoronoiConfig::default(),
            observer: None,
        }
    }

    pub fn with_config(shape: BoundingShape, config: VoronoiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Voronoi {
            shape,
            config,
            observer: None,
        })
    }

    pub fn shape(&self) -> &BoundingShape {
        &self.shape
    }

    pub fn config(&self) -> &VoronoiConfig {
        &self.config
    }

    /// Register an observer, replacing any previous one.
    pub fn attach_observer(&mut self, observer: Box<dyn Observer>) {
        self.observer = Some(observer);
    }

    pub fn detach_observer(&mut self) -> Option<Box<dyn Observer>> {
        self.observer.take()
    }

    /// Build the diagram of plain points.
    pub fn create_diagram<I, P>(&mut self, points: I) -> Result<Diagram>
    where
        I: IntoIterator<Item = P>,
        P: Into<Coordinate>,
    {
        self.create_diagram_with_metadata(points.into_iter().map(|p| SiteInput::<()>::new(p)))
    }

    /// Build the diagram of sites that carry metadata.
    ///
    /// Sites closer than `epsilon` in both axes are merged: the merged site
    /// keeps the position of the first such input and the metadata of the
    /// last input that had any.
    pub fn create_diagram_with_metadata<M, I>(&mut self, sites: I) -> Result<Diagram<M>>
    where
        I: IntoIterator<Item = SiteInput<M>>,
    {
        let prepared = prepare_sites(sites.into_iter().collect(), &self.shape, &self.config)?;

        let mut builder = DiagramBuilder::new(
            &self.shape,
            self.config,
            &prepared.coords,
            &prepared.first_input,
            self.observer.as_mut(),
        );
        builder.run();
        let (mesh, issues, degenerate, messages) = builder.finish();

        Ok(Diagram::new(
            mesh,
            self.shape.clone(),
            self.config,
            prepared.metadata,
            prepared.input_site,
            issues,
            degenerate,
            messages,
        ))
    }
}

// ────────────────────────────── Site preparation ──────────────────────────────

struct PreparedSites<M> {
    coords: Vec<Coordinate>,
    /// First caller input merged into each site.
    first_input: Vec<usize>,
    metadata: Vec<Option<M>>,
    /// Site of every caller input.
    input_site: Vec<SiteIdx>,
}

fn prepare_sites<M>(
    inputs: Vec<SiteInput<M>>,
    shape: &BoundingShape,
    config: &VoronoiConfig,
) -> Result<PreparedSites<M>> {
    let eps = config.epsilon;
    if inputs.is_empty() {
        return Err(VoronoiError::InvalidInput(
            "at least one site is required".into(),
        ));
    }
    let coords: Vec<Coordinate> = inputs.iter().map(|s| s.coord).collect();
    for (i, p) in coords.iter().enumerate() {
        if !p.is_finite() {
            return Err(VoronoiError::InvalidInput(format!(
                "site {} ({}, {}) is not finite",
                i, p.x, p.y
            )));
        }
        if !shape.contains(*p, eps) {
            return Err(VoronoiError::InvalidInput(format!(
                "site {} ({}, {}) lies outside the bounding shape",
                i, p.x, p.y
            )));
        }
    }

    // Group near-duplicates: scan in x order, looking back over the inputs
    // whose x is within eps.
    let n = coords.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| coords[a].lex_cmp(coords[b]));
    let mut root = vec![0usize; n];
    for (k, &i) in order.iter().enumerate() {
        let p = coords[i];
        let mut found = None;
        for &j in order[..k].iter().rev() {
            let q = coords[j];
            if p.x - q.x > eps {
                break;
            }
            if (p.y - q.y).abs() <= eps {
                found = Some(root[j]);
                break;
            }
        }
        root[i] = found.unwrap_or(i);
    }

    // Earliest input of each group, in caller order, becomes a site.
    let mut first_of_root = vec![usize::MAX; n];
    for i in 0..n {
        let r = root[i];
        first_of_root[r] = first_of_root[r].min(i);
    }
    let mut site_of_root = vec![0 as SiteIdx; n];
    let mut first_input = Vec::new();
    for i in 0..n {
        if first_of_root[root[i]] == i {
            site_of_root[root[i]] = first_input.len() as SiteIdx;
            first_input.push(i);
        }
    }

    let site_coords: Vec<Coordinate> = first_input.iter().map(|&i| coords[i]).collect();
    let mut metadata: Vec<Option<M>> = (0..first_input.len()).map(|_| None).collect();
    let mut input_site = Vec::with_capacity(n);
    for (i, input) in inputs.into_iter().enumerate() {
        let site = site_of_root[root[i]];
        input_site.push(site);
        if input.metadata.is_some() {
            metadata[site as usize] = input.metadata;
        }
    }

    debug!(
        inputs = n,
        sites = first_input.len(),
        "prepared sites for the sweep"
    );

    Ok(PreparedSites {
        coords: site_coords,
        first_input,
        metadata,
        input_site,
    })
}

// ─────────────────────────────── Diagram builder ──────────────────────────────

/// Upper bound on Voronoi vertices (and so on valid circle events) for `n`
/// distinct sites.
fn max_circle_events(n: usize) -> usize {
    if n >= 3 {
        2 * n - 5
    } else {
        0
    }
}

pub(crate) struct DiagramBuilder<'a> {
    shape: &'a BoundingShape,
    config: VoronoiConfig,
    observer: Option<&'a mut Box<dyn Observer>>,

    mesh: Mesh,
    status: DiagramStatus,

    // Sweep state
    queue: PriorityQ<SweepEvent>,
    beach: BeachLine,
    circles: BucketAlloc<CircleEvent>,
    sweep_y: Real,
    /// y of the lowest site; sites at exactly this y form the bottom row.
    first_row_y: Option<Real>,
    /// Circle events above this y cannot change any cell inside the shape.
    horizon: Real,
    circle_seq: u64,
    circles_fired: usize,
    max_circles: usize,

    messages: u64,
    issues: Vec<VoronoiError>,
    degenerate: bool,
}

impl<'a> DiagramBuilder<'a> {
    pub(crate) fn new(
        shape: &'a BoundingShape,
        config: VoronoiConfig,
        sites: &[Coordinate],
        first_input: &[usize],
        observer: Option<&'a mut Box<dyn Observer>>,
    ) -> Self {
        let mut mesh = Mesh::new();
        let mut queue = PriorityQ::new(Box::new(|a: &SweepEvent, b: &SweepEvent| a.leq(b)));
        for (i, &p) in sites.iter().enumerate() {
            mesh.add_site(p, first_input.get(i).copied().unwrap_or(i));
            queue.insert(SweepEvent::site(i as SiteIdx, p));
        }
        queue.init();

        // A vertex inside the shape is at most one extent from its sites, so
        // its event fires below top + extent.
        let (lo, hi) = shape.bounds();
        let horizon = hi.y + 2.0 * (hi - lo).length();

        DiagramBuilder {
            shape,
            config,
            observer,
            max_circles: max_circle_events(sites.len()),
            mesh,
            status: DiagramStatus::Idle,
            queue,
            beach: BeachLine::new(),
            circles: BucketAlloc::new(),
            sweep_y: Real::NEG_INFINITY,
            first_row_y: None,
            horizon,
            circle_seq: 0,
            circles_fired: 0,
            messages: 0,
            issues: Vec::new(),
            degenerate: false,
        }
    }

    /// Run the sweep to completion, then clip and finalize.
    pub(crate) fn run(&mut self) {
        self.sweep();
        self.clip();
        self.status = DiagramStatus::Finalized;
        self.notify();
    }

    fn sweep(&mut self) {
        self.status = DiagramStatus::Running;
        while let Some(event) = self.queue.extract_min() {
            let processed = match event.kind {
                EventKind::Site(site) => {
                    self.handle_site(site);
                    true
                }
                EventKind::Circle { event: idx, .. } => self.handle_circle(idx),
            };
            if processed {
                self.notify();
            }
        }
        debug!(
            vertices = self.mesh.verts.len(),
            half_edges = self.mesh.edges.len(),
            circle_events = self.circles_fired,
            "sweep finished"
        );
    }

    /// Bound every edge to the shape and close the cell rings. A cell that
    /// cannot be closed marks the diagram degenerate.
    fn clip(&mut self) {
        self.status = DiagramStatus::Clipping;
        let mut clipper = Clipper::new(self.shape, self.config.epsilon);
        let snapped = clipper.snap_vertices(&mut self.mesh);
        let discarded = clipper.clip_edges(&mut self.mesh);
        let failures = clipper.close_rings(&mut self.mesh);
        debug!(
            snapped,
            discarded,
            failed_cells = failures.len(),
            "clipping finished"
        );
        if !failures.is_empty() {
            self.degenerate = true;
        }
        for failure in failures {
            warn!(%failure, "cell left open");
            self.issues.push(failure);
        }
    }

    pub(crate) fn finish(self) -> (Mesh, Vec<VoronoiError>, bool, u64) {
        (self.mesh, self.issues, self.degenerate, self.messages)
    }

    fn notify(&mut self) {
        self.messages += 1;
        if let Some(observer) = self.observer.as_mut() {
            let beach_line = self.beach.sites();
            let snapshot = Snapshot {
                mesh: &self.mesh,
                status: self.status,
                sweep_y: self.sweep_y.is_finite().then_some(self.sweep_y),
                beach_line: &beach_line,
            };
            observer.notify(&snapshot, self.messages);
        }
    }

    fn site_coord(&self, site: SiteIdx) -> Coordinate {
        self.mesh.sites[site as usize].coord
    }

    fn arc_coord(&self, arc: ArcIdx) -> Coordinate {
        self.site_coord(self.beach.arc(arc).site)
    }

    // ───────────────────────────────── Site events ─────────────────────────────

    fn handle_site(&mut self, site: SiteIdx) {
        let p = self.site_coord(site);
        self.sweep_y = self.sweep_y.max(p.y);
        trace!(site, x = p.x, y = p.y, "site event");

        if self.beach.is_empty() {
            self.first_row_y = Some(p.y);
            self.beach.push_back(site, None);
            return;
        }

        // Sites on the bottom row arrive left to right and never fall under
        // an arc: append them, separated by vertical bisectors. A site even
        // one ulp higher is located like any other.
        if self.first_row_y == Some(p.y) {
            if let Some(last) = self.beach.last() {
                let left = self.beach.arc(last).site;
                let e = self.mesh.make_edge_pair(Some(left), Some(site));
                self.beach.push_back(site, Some(e));
                return;
            }
        }

        let directrix = self.sweep_y;
        let sites = &self.mesh.sites;
        let located = self.beach.locate_last(|beach, arc| match beach.prev(arc) {
            None => true,
            Some(left) => {
                let l = sites[beach.arc(left).site as usize].coord;
                let r = sites[beach.arc(arc).site as usize].coord;
                breakpoint_x(l, r, directrix) <= p.x
            }
        });
        let Some(above) = located else {
            return;
        };

        // Split the arc above the site: [a] becomes [a, site, a].
        let a = self.beach.arc(above).site;
        self.invalidate(above);
        let h = self.mesh.make_edge_pair(Some(a), Some(site));
        let middle = self.beach.insert_after(above, site, Some(h));
        let right = self.beach.insert_after(middle, a, Some(twin(h)));

        self.check_circle(above);
        self.check_circle(right);
    }

    // ──────────────────────────────── Circle events ────────────────────────────

    fn invalidate(&mut self, arc: ArcIdx) {
        if let Some(ev) = self.beach.arc_mut(arc).circle.take() {
            if let Some(event) = self.circles.get_mut(ev) {
                event.valid = false;
            }
        }
    }

    /// Schedule the circle event in which `arc` disappears, if its neighbors
    /// converge.
    fn check_circle(&mut self, arc: ArcIdx) {
        self.invalidate(arc);
        let (Some(left), Some(right)) = (self.beach.prev(arc), self.beach.next(arc)) else {
            return;
        };
        if self.beach.arc(left).site == self.beach.arc(right).site {
            return;
        }
        let a = self.arc_coord(left);
        let b = self.arc_coord(arc);
        let c = self.arc_coord(right);

        let ab = b - a;
        let ac = c - a;
        let cross = ab.perp_dot(ac);
        if cross <= 0.0 {
            return;
        }
        let Some(center) = circumcenter(a, b, c) else {
            self.record_degenerate(b, "circumcenter is not finite".into());
            return;
        };
        let y = (center.y + (a - center).length()).max(self.sweep_y);

        // A nearly collinear triple meets far away. Past the horizon the
        // arc may simply outlive the sweep; closer in, its vertex is noise.
        if cross <= self.config.collinearity_tolerance * ab.length() * ac.length() {
            if y > self.horizon {
                trace!(
                    x = center.x,
                    y = center.y,
                    "nearly collinear triple meets past the horizon"
                );
            } else {
                self.record_degenerate(b, "converging sites are nearly collinear".into());
            }
            return;
        }
        let seq = self.circle_seq;
        self.circle_seq += 1;
        let ev = self.circles.insert(CircleEvent {
            arc,
            center,
            y,
            valid: true,
        });
        self.beach.arc_mut(arc).circle = Some(ev);
        self.queue.insert(SweepEvent::circle(ev, seq, y, center.x));
    }

    /// Returns true if the event changed the diagram.
    fn handle_circle(&mut self, ev: EventIdx) -> bool {
        let Some(&event) = self.circles.get(ev) else {
            return false;
        };
        self.circles.free(ev);
        if !event.valid {
            return false;
        }

        let arc = event.arc;
        self.beach.arc_mut(arc).circle = None;
        let (Some(left), Some(right)) = (self.beach.prev(arc), self.beach.next(arc)) else {
            return false;
        };
        self.sweep_y = self.sweep_y.max(event.y);
        trace!(x = event.center.x, y = event.center.y, "circle event");

        if self.circles_fired >= self.max_circles {
            let reason = format!(
                "more than {} circle events for {} sites",
                self.max_circles,
                self.mesh.sites.len()
            );
            self.record_degenerate(event.center, reason);
            return false;
        }
        let (Some(t1), Some(t2)) = (self.beach.arc(arc).left_edge, self.beach.arc(right).left_edge)
        else {
            return false;
        };
        self.circles_fired += 1;

        // Weld co-circular events: an edge that already starts at this point
        // has zero length and is dropped.
        let p = event.center;
        let eps = self.config.epsilon;
        let mut welded = None;
        for t in [t1, t2] {
            if let Origin::At(v) = self.mesh.origin(t) {
                if self.mesh.verts[v as usize].coord.approx_eq(p, eps) {
                    welded.get_or_insert(v);
                    self.mesh.discard_pair(t);
                }
            }
        }
        let v = match welded {
            Some(v) => v,
            None => self.mesh.add_vertex(p, VertexKind::Voronoi),
        };
        self.mesh.set_origin(twin(t1), v);
        self.mesh.set_origin(twin(t2), v);

        let a = self.beach.arc(left).site;
        let c = self.beach.arc(right).site;
        let h = self.mesh.make_edge_pair(Some(a), Some(c));
        self.mesh.set_origin(h, v);

        self.invalidate(left);
        self.invalidate(right);
        self.beach.remove(arc);
        self.beach.arc_mut(right).left_edge = Some(h);

        self.check_circle(left);
        self.check_circle(right);
        true
    }

    fn record_degenerate(&mut self, at: Coordinate, reason: String) {
        warn!(x = at.x, y = at.y, %reason, "skipping degenerate circle event");
        self.degenerate = true;
        self.issues.push(VoronoiError::DegenerateEvent {
            x: at.x,
            y: at.y,
            reason,
        });
    }
}

#[cfg(test)]
mod tests;
