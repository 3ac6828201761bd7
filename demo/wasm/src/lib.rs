// Copyright 2025 Lars Brubaker
// WASM bindings for voronoi-dcel

use voronoi_dcel::{BoundingShape, Diagram, SiteIdx, Voronoi};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main_js() {
    console_error_panic_hook::set_once();
}

/// A clip shape plus the last diagram built inside it.
#[wasm_bindgen]
pub struct VoronoiJs {
    inner: Voronoi,
    diagram: Option<Diagram>,
}

#[wasm_bindgen]
impl VoronoiJs {
    /// Rectangle clip region.
    #[wasm_bindgen(constructor)]
    pub fn new(left: f64, right: f64, bottom: f64, top: f64) -> Result<VoronoiJs, JsError> {
        let shape = BoundingShape::rectangle(left, right, bottom, top)?;
        Ok(VoronoiJs {
            inner: Voronoi::new(shape),
            diagram: None,
        })
    }

    /// Convex polygon clip region from a flat [x0,y0, x1,y1, ...] array.
    pub fn with_polygon(corners: &[f64]) -> Result<VoronoiJs, JsError> {
        let shape = BoundingShape::polygon(pairs(corners))?;
        Ok(VoronoiJs {
            inner: Voronoi::new(shape),
            diagram: None,
        })
    }

    /// Build the diagram of a flat [x0,y0, x1,y1, ...] site array.
    pub fn compute(&mut self, sites: &[f64]) -> Result<(), JsError> {
        self.diagram = Some(self.inner.create_diagram(pairs(sites))?);
        Ok(())
    }

    pub fn site_count(&self) -> u32 {
        self.diagram.as_ref().map_or(0, |d| d.site_count() as u32)
    }

    /// Flat cell polygon [x0,y0, x1,y1, ...], empty if the cell is unavailable.
    pub fn cell(&self, site: u32) -> Vec<f64> {
        let Some(diagram) = &self.diagram else {
            return Vec::new();
        };
        diagram
            .get_coordinates(site as SiteIdx)
            .map(|coords| coords.iter().flat_map(|c| [c.x, c.y]).collect())
            .unwrap_or_default()
    }

    /// Cell area, or NaN if the cell is unavailable.
    pub fn cell_area(&self, site: u32) -> f64 {
        self.diagram
            .as_ref()
            .and_then(|d| d.cell_area(site as SiteIdx, None).ok())
            .unwrap_or(f64::NAN)
    }

    /// Flat [x0,y0, x1,y1, ...] of the Voronoi vertices inside the shape.
    pub fn vertices(&self) -> Vec<f64> {
        let Some(diagram) = &self.diagram else {
            return Vec::new();
        };
        diagram
            .interior_vertices()
            .into_iter()
            .filter_map(|v| diagram.vertex(v))
            .flat_map(|v| [v.coord.x, v.coord.y])
            .collect()
    }
}

fn pairs(flat: &[f64]) -> Vec<(f64, f64)> {
    flat.chunks_exact(2).map(|p| (p[0], p[1])).collect()
}

/// Convenience: cell areas of a site set in a rectangle, in site order.
#[wasm_bindgen]
pub fn cell_areas(sites: &[f64], left: f64, right: f64, bottom: f64, top: f64) -> Vec<f64> {
    let Ok(mut v) = VoronoiJs::new(left, right, bottom, top) else {
        return Vec::new();
    };
    if v.compute(sites).is_err() {
        return Vec::new();
    }
    (0..v.site_count()).map(|s| v.cell_area(s)).collect()
}
