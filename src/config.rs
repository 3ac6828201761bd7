// Copyright 2025 Lars Brubaker
// License: MIT
//
// Construction tolerances. Every geometric comparison made by the sweep and
// the clipper reads its tolerance from a VoronoiConfig; there are no hidden
// global constants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoronoiError};

/// Default coordinate tolerance.
pub const DEFAULT_EPSILON: f64 = 1e-9;
/// Default relative tolerance below which a converging triple counts as collinear.
pub const DEFAULT_COLLINEARITY_TOLERANCE: f64 = 1e-12;

/// Tolerances used while building a diagram.
///
/// `epsilon` is the absolute distance under which two coordinates are the same
/// point: duplicate sites are merged, co-circular vertices are welded, and
/// boundary crossings snap to shape corners.
///
/// `collinearity_tolerance` is relative: a triple of sites `a, b, c` is treated
/// as collinear when `|cross(b - a, c - a)| <= tol * |b - a| * |c - a|`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoronoiConfig {
    pub epsilon: f64,
    pub collinearity_tolerance: f64,
}

impl Default for VoronoiConfig {
    fn default() -> Self {
        VoronoiConfig {
            epsilon: DEFAULT_EPSILON,
            collinearity_tolerance: DEFAULT_COLLINEARITY_TOLERANCE,
        }
    }
}

impl VoronoiConfig {
    /// Check that both tolerances are finite and positive.
    pub fn validate(&self) -> Result<()> {
        check_tolerance("epsilon", self.epsilon)?;
        check_tolerance("collinearity_tolerance", self.collinearity_tolerance)
    }
}

fn check_tolerance(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(VoronoiError::InvalidConfig(format!(
            "{} must be finite and positive, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Builder for [`VoronoiConfig`] with validation on every setter.
///
/// ```rust
/// use voronoi_dcel::VoronoiConfigBuilder;
///
/// let config = VoronoiConfigBuilder::new()
///     .epsilon(1e-6)
///     .unwrap()
///     .build();
/// assert_eq!(config.epsilon, 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VoronoiConfigBuilder {
    config: VoronoiConfig,
}

impl VoronoiConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the coordinate tolerance.
    pub fn epsilon(mut self, epsilon: f64) -> Result<Self> {
        check_tolerance("epsilon", epsilon)?;
        self.config.epsilon = epsilon;
        Ok(self)
    }

    /// Set the relative collinearity tolerance for circle events.
    pub fn collinearity_tolerance(mut self, tolerance: f64) -> Result<Self> {
        check_tolerance("collinearity_tolerance", tolerance)?;
        self.config.collinearity_tolerance = tolerance;
        Ok(self)
    }

    pub fn build(self) -> VoronoiConfig {
        self.config
    }
}
