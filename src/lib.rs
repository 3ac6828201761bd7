// voronoi-dcel: Fortune sweep-line Voronoi diagrams as a doubly-connected edge list
// Copyright 2025 Lars Brubaker
// License: MIT

pub mod beachline;
pub mod bounds;
pub mod bucketalloc;
pub mod config;
pub mod diagram;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod observer;
pub mod priorityq;
pub mod sweep;
pub mod voronoi;

pub use bounds::{BoundingShape, ShapeKind};
pub use config::{VoronoiConfig, VoronoiConfigBuilder};
pub use diagram::Diagram;
pub use error::{Result, VoronoiError};
pub use geom::{Coordinate, Real};
pub use mesh::{
    site_label, twin, EdgeIdx, HalfEdge, Mesh, Origin, Site, SiteIdx, VertIdx, Vertex, VertexKind,
};
pub use observer::{Observer, Snapshot};
pub use sweep::DiagramStatus;
pub use voronoi::{SiteInput, Voronoi};
