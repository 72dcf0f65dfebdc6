//! Grid node type

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use crate::geo::GeoPoint;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One cell of the coverage grid.
///
/// A node is created once at grid-construction time with fixed coordinates.
/// The `active` and `border` flags are its only mutable state: `active` is
/// set by the grid's activation methods and `border` by the border-analysis
/// pass. Nodes are never destroyed during a mission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Row of this node within the grid
    row: usize,

    /// Column of this node within the grid
    col: usize,

    /// GPS coordinate of this node
    gps: GeoPoint,

    /// Position of this node in the grid's local frame
    local_m: Vector2<f64>,

    /// True if this node participates in traversal and border computation
    active: bool,

    /// True if the last border-analysis pass marked this node as a border
    /// node
    border: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Node {
    /// Create a new inactive node.
    pub(super) fn new(row: usize, col: usize, gps: GeoPoint, local_m: Vector2<f64>) -> Self {
        Self {
            row,
            col,
            gps,
            local_m,
            active: false,
            border: false,
        }
    }

    /// The (row, col) position of this node within the grid.
    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// The GPS coordinate of this node.
    pub fn gps(&self) -> &GeoPoint {
        &self.gps
    }

    /// The local-frame coordinate of this node in meters.
    pub fn local_m(&self) -> Vector2<f64> {
        self.local_m
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_border(&self) -> bool {
        self.border
    }

    /// Mark this node as active. Activation is monotonic, there is no
    /// deactivation.
    pub(super) fn activate(&mut self) {
        self.active = true;
    }

    pub(super) fn set_border(&mut self, border: bool) {
        self.border = border;
    }
}
