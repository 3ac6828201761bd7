// Copyright 2025 Lars Brubaker
// License: MIT
//
// Error taxonomy for diagram construction and queries.
//
// InvalidInput and InvalidConfig are fatal to the call that returns them.
// DegenerateEvent and ClippingFailure are partial failures: they are recorded
// on the finished diagram (see Diagram::issues) and the diagram stays usable
// for unaffected cells. IncompleteQuery is the normal answer for a cell ring
// that is not (yet) closed.

use crate::mesh::SiteIdx;

/// Errors produced while building or querying a Voronoi diagram.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VoronoiError {
    /// The sites or the bounding shape cannot be used.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A circle event was skipped because it was numerically unstable or
    /// exceeded the vertex bound for the number of sites.
    #[error("degenerate circle event at ({x}, {y}): {reason}")]
    DegenerateEvent { x: f64, y: f64, reason: String },

    /// The ring of a cell cannot be walked.
    #[error("cell {site} is unavailable: {reason}")]
    IncompleteQuery { site: SiteIdx, reason: String },

    /// An edge of the cell could not be bounded by the clip shape.
    #[error("clipping failed for cell {site}: {reason}")]
    ClippingFailure { site: SiteIdx, reason: String },
}

/// Result type alias for diagram operations.
pub type Result<T> = std::result::Result<T, VoronoiError>;

impl VoronoiError {
    /// True for the partial-failure categories that leave the diagram usable.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            VoronoiError::DegenerateEvent { .. } | VoronoiError::ClippingFailure { .. }
        )
    }

    pub(crate) fn incomplete(site: SiteIdx, reason: impl Into<String>) -> Self {
        VoronoiError::IncompleteQuery {
            site,
            reason: reason.into(),
        }
    }
}
