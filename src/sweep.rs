// Copyright 2025 Lars Brubaker
// License: MIT
//
// Sweep events and builder state.
//
// Events are ordered by sweep coordinate (y ascending). At exactly equal y,
// circle events come before site events; circle events are taken in the order
// their arc triples were registered, and site events left to right. The order
// is lexicographic on exact values, so the heap sees a total order.

use crate::beachline::ArcIdx;
use crate::geom::{Coordinate, Real};
use crate::mesh::SiteIdx;

/// Index into the circle event arena.
pub type EventIdx = u32;

/// Lifecycle of a diagram under construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagramStatus {
    Idle,
    Running,
    Clipping,
    Finalized,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EventKind {
    Site(SiteIdx),
    /// `seq` is the registration order, used to break ties.
    Circle { event: EventIdx, seq: u64 },
}

/// A queue entry. It carries its own sort key, so ordering needs no lookups.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepEvent {
    pub y: Real,
    pub x: Real,
    pub kind: EventKind,
}

impl SweepEvent {
    pub fn site(site: SiteIdx, at: Coordinate) -> Self {
        SweepEvent {
            y: at.y,
            x: at.x,
            kind: EventKind::Site(site),
        }
    }

    pub fn circle(event: EventIdx, seq: u64, y: Real, x: Real) -> Self {
        SweepEvent {
            y,
            x,
            kind: EventKind::Circle { event, seq },
        }
    }

    /// Returns true if `self` must be processed no later than `other`.
    pub fn leq(&self, other: &SweepEvent) -> bool {
        if self.y != other.y {
            return self.y < other.y;
        }
        match (self.kind, other.kind) {
            (EventKind::Circle { seq: a, .. }, EventKind::Circle { seq: b, .. }) => a <= b,
            (EventKind::Circle { .. }, EventKind::Site(_)) => true,
            (EventKind::Site(_), EventKind::Circle { .. }) => false,
            (EventKind::Site(_), EventKind::Site(_)) => self.x <= other.x,
        }
    }
}

/// A scheduled convergence of the arc `arc` with its two neighbors.
#[derive(Copy, Clone, Debug, Default)]
pub struct CircleEvent {
    /// The arc that disappears.
    pub arc: ArcIdx,
    /// The Voronoi vertex created when the event fires.
    pub center: Coordinate,
    /// Sweep coordinate at which the event fires.
    pub y: Real,
    /// Cleared when the arc triple changes before the event fires.
    pub valid: bool,
}
