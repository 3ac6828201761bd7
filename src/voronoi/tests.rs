// Copyright 2025 Lars Brubaker
// Unit tests for the sweep internals.

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::config::VoronoiConfigBuilder;
use crate::mesh::Vertex;

fn square_box() -> BoundingShape {
    BoundingShape::rectangle(-5.0, 15.0, -5.0, 15.0).unwrap()
}

fn build<'a>(
    shape: &'a BoundingShape,
    config: VoronoiConfig,
    sites: &[(Real, Real)],
) -> DiagramBuilder<'a> {
    let coords: Vec<Coordinate> = sites.iter().map(|&p| p.into()).collect();
    let first: Vec<usize> = (0..coords.len()).collect();
    DiagramBuilder::new(shape, config, &coords, &first, None)
}

#[derive(Default)]
struct Recorder {
    log: Rc<RefCell<Vec<(u64, DiagramStatus, usize)>>>,
}

impl Observer for Recorder {
    fn notify(&mut self, snapshot: &Snapshot<'_>, message: u64) {
        self.log
            .borrow_mut()
            .push((message, snapshot.status(), snapshot.beach_line().len()));
    }
}

#[test]
fn circle_event_bound() {
    assert_eq!(max_circle_events(0), 0);
    assert_eq!(max_circle_events(2), 0);
    assert_eq!(max_circle_events(3), 1);
    assert_eq!(max_circle_events(4), 3);
    assert_eq!(max_circle_events(10), 15);
}

#[test]
fn bottom_row_is_appended_left_to_right() {
    let shape = BoundingShape::rectangle(-1.0, 11.0, -1.0, 1.0).unwrap();
    // Given out of order on purpose.
    let mut builder = build(&shape, VoronoiConfig::default(), &[(10.0, 0.0), (0.0, 0.0), (5.0, 0.0)]);
    while let Some(event) = builder.queue.extract_min() {
        if let EventKind::Site(site) = event.kind {
            builder.handle_site(site);
        }
    }
    assert_eq!(builder.beach.sites(), vec![1, 2, 0]);
    assert_eq!(builder.mesh.edges.len(), 4, "two bisectors");
    assert!(builder.mesh.verts.is_empty());
}

#[test]
fn bottom_row_cells() {
    let shape = BoundingShape::rectangle(-1.0, 11.0, -1.0, 1.0).unwrap();
    let mut builder = build(&shape, VoronoiConfig::default(), &[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
    builder.run();
    let (mesh, issues, degenerate, _) = builder.finish();
    assert!(issues.is_empty(), "{:?}", issues);
    assert!(!degenerate);
    assert_eq!(mesh.cell_area(0, Some(9)).unwrap(), 7.0);
    assert_eq!(mesh.cell_area(1, Some(9)).unwrap(), 10.0);
    assert_eq!(mesh.cell_area(2, Some(9)).unwrap(), 7.0);
}

#[test]
fn site_just_above_the_bottom_row_splits_an_arc() {
    let shape = BoundingShape::rectangle(-1.0, 11.0, -1.0, 1.0).unwrap();
    let sites = [(10.0, 1e-12), (0.0, 0.0)];
    let mut builder = build(&shape, VoronoiConfig::default(), &sites);
    while let Some(event) = builder.queue.extract_min() {
        if let EventKind::Site(site) = event.kind {
            builder.handle_site(site);
        }
    }
    assert_eq!(builder.beach.sites(), vec![1, 0, 1]);

    let mut builder = build(&shape, VoronoiConfig::default(), &sites);
    builder.run();
    let (mesh, issues, degenerate, _) = builder.finish();
    assert!(issues.is_empty(), "{:?}", issues);
    assert!(!degenerate);
    assert_eq!(mesh.cell_area(0, Some(6)).unwrap(), 12.0);
    assert_eq!(mesh.cell_area(1, Some(6)).unwrap(), 12.0);
}

#[test]
fn cocircular_sites_share_one_vertex() {
    let shape = square_box();
    let mut builder = build(
        &shape,
        VoronoiConfig::default(),
        &[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)],
    );
    builder.run();
    assert_eq!(builder.circles_fired, 2);
    let (mesh, issues, degenerate, _) = builder.finish();
    assert!(issues.is_empty(), "{:?}", issues);
    assert!(!degenerate);

    let centers: Vec<&Vertex> = mesh
        .verts
        .iter()
        .filter(|v| v.kind == VertexKind::Voronoi && !v.incident.is_empty())
        .collect();
    assert_eq!(centers.len(), 1);
    assert!(centers[0].coord.approx_eq(Coordinate::new(5.0, 5.0), 1e-9));
    assert_eq!(centers[0].incident.len(), 4);
    for s in 0..4 {
        assert_eq!(mesh.cell_area(s, Some(6)).unwrap(), 100.0);
    }
}

#[test]
fn nearly_collinear_triple_is_flagged() {
    let shape = square_box();
    let config = VoronoiConfigBuilder::new()
        .collinearity_tolerance(0.9)
        .unwrap()
        .build();
    let mut builder = build(&shape, config, &[(0.0, 0.0), (10.0, 0.0), (5.0, 8.66)]);
    builder.run();
    let (_, issues, degenerate, _) = builder.finish();
    assert!(degenerate);
    assert!(issues
        .iter()
        .any(|e| matches!(e, VoronoiError::DegenerateEvent { .. })));
}

#[test]
fn nearly_collinear_row_meets_past_the_horizon() {
    // The middle site dips by 1e-14: its neighbors converge about 1e15 above
    // the shape, which cannot touch any cell inside it.
    let shape = BoundingShape::rectangle(-1.0, 11.0, -1.0, 1.0).unwrap();
    let mut builder = build(
        &shape,
        VoronoiConfig::default(),
        &[(0.0, 0.0), (5.0, -1e-14), (10.0, 0.0)],
    );
    builder.run();
    assert_eq!(builder.circles_fired, 0);
    let (mesh, issues, degenerate, _) = builder.finish();
    assert!(issues.is_empty(), "{:?}", issues);
    assert!(!degenerate);
    assert_eq!(mesh.cell_area(0, Some(9)).unwrap(), 7.0);
    assert_eq!(mesh.cell_area(1, Some(9)).unwrap(), 10.0);
    assert_eq!(mesh.cell_area(2, Some(9)).unwrap(), 7.0);
}

#[test]
fn open_ring_marks_the_diagram_degenerate() {
    let shape = square_box();
    let mut builder = build(&shape, VoronoiConfig::default(), &[(0.0, 0.0), (10.0, 10.0)]);
    builder.sweep();
    // A stray piece of the bisector that ends inside the shape on both sides.
    let a = builder.mesh.add_vertex(Coordinate::new(8.0, 2.0), VertexKind::Voronoi);
    let b = builder.mesh.add_vertex(Coordinate::new(2.0, 8.0), VertexKind::Voronoi);
    let e = builder.mesh.make_edge_pair(Some(0), Some(1));
    builder.mesh.set_origin(e, a);
    builder.mesh.set_origin(twin(e), b);
    builder.clip();

    let (mesh, issues, degenerate, _) = builder.finish();
    assert!(degenerate);
    assert_eq!(issues.len(), 2, "{:?}", issues);
    assert!(issues
        .iter()
        .all(|i| matches!(i, VoronoiError::ClippingFailure { .. })));
    assert!(mesh.get_coordinates(0).is_err());
}

#[test]
fn reflex_and_doubly_wound_rings_are_rejected() {
    let shape = square_box();
    let clipper = Clipper::new(&shape, 1e-9);
    let c = |x: Real, y: Real| Coordinate::new(x, y);

    let square = [c(0.0, 0.0), c(4.0, 0.0), c(4.0, 4.0), c(0.0, 4.0)];
    assert!(clipper.check_convex(&square).is_ok());
    // A corner a hair inside the straight line still counts as convex.
    let flat = [c(0.0, 0.0), c(2.0, 1e-10), c(4.0, 0.0), c(4.0, 4.0), c(0.0, 4.0)];
    assert!(clipper.check_convex(&flat).is_ok());

    let dented = [c(0.0, 0.0), c(4.0, 0.0), c(2.0, 1.0), c(4.0, 4.0), c(0.0, 4.0)];
    assert!(clipper.check_convex(&dented).is_err());

    // Pentagram: every corner turns left, but the ring goes round twice.
    let star: Vec<Coordinate> = (0..5)
        .map(|k| {
            let a = (2 * k) as Real * std::f64::consts::TAU / 5.0;
            c(a.cos(), a.sin())
        })
        .collect();
    let err = clipper.check_convex(&star).unwrap_err();
    assert!(err.contains("winds"), "{}", err);
}

#[test]
fn stale_circle_events_are_not_reported() {
    let shape = square_box();
    let mut voronoi = Voronoi::new(shape);
    let recorder = Recorder::default();
    let log = recorder.log.clone();
    voronoi.attach_observer(Box::new(recorder));

    // Four sites, two valid circle events, one invalidated event.
    let diagram = voronoi
        .create_diagram([(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)])
        .unwrap();
    let log = log.borrow();
    assert_eq!(log.len(), 7);
    assert_eq!(diagram.messages(), 7);
    for (i, entry) in log.iter().enumerate() {
        assert_eq!(entry.0, i as u64 + 1);
    }
    assert!(log[..6].iter().all(|e| e.1 == DiagramStatus::Running));
    assert_eq!(log[6].1, DiagramStatus::Finalized);
    assert_eq!(log[0].2, 1, "one arc after the first site");
}

#[test]
fn duplicates_merge_into_first_position() {
    let shape = square_box();
    let inputs = vec![
        SiteInput::with_metadata((1.0, 1.0), "first"),
        SiteInput::with_metadata((9.0, 9.0), "other"),
        SiteInput::new((1.0 + 1e-12, 1.0)),
        SiteInput::with_metadata((1.0, 1.0 - 1e-12), "last"),
    ];
    let prepared = prepare_sites(inputs, &shape, &VoronoiConfig::default()).unwrap();
    assert_eq!(prepared.coords, vec![Coordinate::new(1.0, 1.0), Coordinate::new(9.0, 9.0)]);
    assert_eq!(prepared.first_input, vec![0, 1]);
    assert_eq!(prepared.input_site, vec![0, 1, 0, 0]);
    assert_eq!(prepared.metadata, vec![Some("last"), Some("other")]);
}

#[test]
fn rejects_bad_sites() {
    let shape = square_box();
    let config = VoronoiConfig::default();
    let empty: Vec<SiteInput> = Vec::new();
    assert!(matches!(
        prepare_sites(empty, &shape, &config),
        Err(VoronoiError::InvalidInput(_))
    ));
    let outside = vec![SiteInput::<()>::new((100.0, 0.0))];
    assert!(matches!(
        prepare_sites(outside, &shape, &config),
        Err(VoronoiError::InvalidInput(_))
    ));
    let nan = vec![SiteInput::<()>::new((Real::NAN, 0.0))];
    assert!(matches!(
        prepare_sites(nan, &shape, &config),
        Err(VoronoiError::InvalidInput(_))
    ));
}

#[test]
fn rejects_bad_config() {
    let config = VoronoiConfig {
        epsilon: -1.0,
        ..VoronoiConfig::default()
    };
    assert!(matches!(
        Voronoi::with_config(square_box(), config),
        Err(VoronoiError::InvalidConfig(_))
    ));
}
