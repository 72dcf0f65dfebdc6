//! # Coverage grid module
//!
//! The grid discretizes a GPS-bounded rectangular area into a lattice of
//! [`Node`]s spaced a fixed number of meters apart, anchored at the
//! (lat_min, long_min) corner. An external planner activates the nodes
//! covering the traversable sub-region, after which a border-analysis pass
//! classifies the active nodes which sit on the coverage boundary. The
//! traversal generators in [`traverse`] then produce ordered waypoint
//! sequences over the lattice.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod node;
mod traverse;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use crate::geo::{self, GeoError, GeoPoint};
pub use node::Node;
pub use traverse::ControlMode;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Nominal spacing between neighbouring grid nodes in meters.
pub const STEP_SIZE_M: f64 = 2.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The coverage grid.
pub struct Grid {
    /// Row-major node storage, indexed by `row * num_cols + col`
    nodes: Vec<Node>,

    num_rows: usize,
    num_cols: usize,

    /// Nominal node spacing before geodesic rounding
    step_size_m: f64,

    /// The GPS origin corner (lat_min, long_min) of the grid's local frame
    origin: GeoPoint,

    /// Local-frame extent of the full bounding box (east, north) in meters
    size_m: Vector2<f64>,

    /// Cached border analysis, cleared whenever activation changes
    border: Option<BorderAnalysis>,
}

/// The result of a border-analysis pass over the grid.
#[derive(Debug, Clone, Default)]
pub struct BorderAnalysis {
    /// (row, col) positions of all active border nodes, in scan order
    pub border_positions: Vec<(usize, usize)>,

    /// Position of the leftmost active border node by column, ties broken
    /// by the first row encountered in scan order. `None` if no node is
    /// active.
    pub leftmost_pos: Option<(usize, usize)>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Invalid grid bounds: {0}")]
    InvalidBounds(#[from] GeoError),

    #[error(
        "Degenerate bounding box: latitude span {lat_min}..{lat_max}, \
         longitude span {long_min}..{long_max}"
    )]
    DegenerateBounds {
        lat_min: f64,
        lat_max: f64,
        long_min: f64,
        long_max: f64,
    },

    #[error("Step size must be positive, got {0} m")]
    InvalidStepSize(f64),

    #[error("Node ({0}, {1}) is outside the {2}x{3} grid")]
    NodeOutOfBounds(usize, usize, usize, usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Grid {
    /// Build a grid over the given GPS bounding box with the standard
    /// [`STEP_SIZE_M`] node spacing.
    ///
    /// All nodes start inactive.
    pub fn new(
        lat_min: f64,
        lat_max: f64,
        long_min: f64,
        long_max: f64,
    ) -> Result<Self, GridError> {
        Self::with_step(lat_min, lat_max, long_min, long_max, STEP_SIZE_M)
    }

    /// Build a grid with an explicit node spacing.
    ///
    /// The number of rows/columns is `floor(extent / step) + 1` along each
    /// axis, so the far edge of the lattice may fall up to one step short of
    /// the true boundary: the grid under-covers rather than over-covers.
    pub fn with_step(
        lat_min: f64,
        lat_max: f64,
        long_min: f64,
        long_max: f64,
        step_size_m: f64,
    ) -> Result<Self, GridError> {
        if !step_size_m.is_finite() || step_size_m <= 0.0 {
            return Err(GridError::InvalidStepSize(step_size_m));
        }

        // Malformed GPS input is fatal here
        let origin = GeoPoint::new(lat_min, long_min)?;
        let far_corner = GeoPoint::new(lat_max, long_max)?;

        // A box with zero or negative extent would produce an empty lattice
        if lat_max <= lat_min || long_max <= long_min {
            return Err(GridError::DegenerateBounds {
                lat_min,
                lat_max,
                long_min,
                long_max,
            });
        }

        let x_range_m = geo::distance_x(&origin, &far_corner);
        let y_range_m = geo::distance_y(&origin, &far_corner);

        // The +1 accounts for the node on the origin corner itself
        let num_cols = (x_range_m / step_size_m).floor() as usize + 1;
        let num_rows = (y_range_m / step_size_m).floor() as usize + 1;

        let lat_step_deg = geo::meters_to_lat(step_size_m);
        let long_step_deg = geo::meters_to_long(step_size_m, lat_min);

        let mut nodes = Vec::with_capacity(num_rows * num_cols);
        for row in 0..num_rows {
            for col in 0..num_cols {
                let gps = GeoPoint::new(
                    lat_min + row as f64 * lat_step_deg,
                    long_min + col as f64 * long_step_deg,
                )?;
                let local_m = geo::geo_to_local(&origin, &gps);
                nodes.push(Node::new(row, col, gps, local_m));
            }
        }

        Ok(Self {
            nodes,
            num_rows,
            num_cols,
            step_size_m,
            origin,
            size_m: Vector2::new(x_range_m, y_range_m),
            border: None,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Nominal node spacing in meters.
    pub fn step_size_m(&self) -> f64 {
        self.step_size_m
    }

    /// The GPS origin corner of the grid's local frame.
    pub fn origin(&self) -> &GeoPoint {
        &self.origin
    }

    /// Local-frame extent (east, north) of the bounding box in meters.
    pub fn size_m(&self) -> Vector2<f64> {
        self.size_m
    }

    /// The node at the given position, or `None` if out of bounds.
    pub fn node(&self, row: usize, col: usize) -> Option<&Node> {
        if row >= self.num_rows || col >= self.num_cols {
            return None;
        }

        Some(&self.nodes[row * self.num_cols + col])
    }

    // --------------------------- ACTIVATION --------------------------------

    /// Activate the node at the given position.
    ///
    /// Activation is monotonic for the lifetime of a grid: there is no
    /// deactivation. Any activation invalidates the cached border analysis.
    pub fn activate(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        if row >= self.num_rows || col >= self.num_cols {
            return Err(GridError::NodeOutOfBounds(
                row,
                col,
                self.num_rows,
                self.num_cols,
            ));
        }

        self.nodes[row * self.num_cols + col].activate();
        self.border = None;

        Ok(())
    }

    /// Activate all nodes in the range `[row, row_limit) x [col, col_limit)`.
    pub fn activate_range(
        &mut self,
        row: usize,
        col: usize,
        row_limit: usize,
        col_limit: usize,
    ) -> Result<(), GridError> {
        for r in row..row_limit {
            for c in col..col_limit {
                self.activate(r, c)?;
            }
        }

        Ok(())
    }

    // ------------------------- BORDER ANALYSIS ------------------------------

    /// The border analysis for the current activation state.
    ///
    /// Computed lazily on first query and cached until the next activation
    /// change invalidates it. The pass sets the `border` flag on every
    /// active node which lies on the outer edge of the grid or has an
    /// inactive node in its 3x3 neighbourhood, and records the leftmost
    /// active border node as the canonical traversal start.
    pub fn border_analysis(&mut self) -> &BorderAnalysis {
        if self.border.is_none() {
            let analysis = self.compute_borders();
            self.border = Some(analysis);
        }

        // Safe to unwrap, the cache was filled above
        self.border.as_ref().unwrap()
    }

    fn compute_borders(&mut self) -> BorderAnalysis {
        let mut analysis = BorderAnalysis::default();

        for row in 0..self.num_rows {
            for col in 0..self.num_cols {
                let is_border =
                    self.nodes[row * self.num_cols + col].is_active() && self.is_on_border(row, col);

                self.nodes[row * self.num_cols + col].set_border(is_border);

                if is_border {
                    analysis.border_positions.push((row, col));

                    let is_leftmost = match analysis.leftmost_pos {
                        Some((_, leftmost_col)) => col < leftmost_col,
                        None => true,
                    };
                    if is_leftmost {
                        analysis.leftmost_pos = Some((row, col));
                    }
                }
            }
        }

        analysis
    }

    /// Returns whether the (active) node at the given position is a border
    /// node.
    ///
    /// A node is on the border if it lies on the very edge of the grid, or
    /// if any node in its 3x3 neighbourhood is inactive. The node itself is
    /// included in the scan, which is harmless: it cannot be inactive
    /// relative to itself.
    fn is_on_border(&self, row: usize, col: usize) -> bool {
        if row == 0 || col == 0 || row == self.num_rows - 1 || col == self.num_cols - 1 {
            return true;
        }

        for r in (row - 1)..=(row + 1) {
            for c in (col - 1)..=(col + 1) {
                if !self.nodes[r * self.num_cols + c].is_active() {
                    return true;
                }
            }
        }

        false
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo;

    /// The engineering quad scenario box
    const QUAD: (f64, f64, f64, f64) = (42.444250, 42.444599, -76.483682, -76.483276);

    fn quad_grid() -> Grid {
        Grid::new(QUAD.0, QUAD.1, QUAD.2, QUAD.3).unwrap()
    }

    #[test]
    fn test_sizing_matches_extent() {
        let grid = quad_grid();

        let origin = GeoPoint::new(QUAD.0, QUAD.2).unwrap();
        let far = GeoPoint::new(QUAD.1, QUAD.3).unwrap();
        let x_range_m = geo::distance_x(&origin, &far);
        let y_range_m = geo::distance_y(&origin, &far);

        assert_eq!(grid.num_cols(), (x_range_m / STEP_SIZE_M).floor() as usize + 1);
        assert_eq!(grid.num_rows(), (y_range_m / STEP_SIZE_M).floor() as usize + 1);

        // The far node must not overshoot the bounding box extent
        let upper_right = grid.node(grid.num_rows() - 1, grid.num_cols() - 1).unwrap();
        assert!(upper_right.local_m()[0] <= x_range_m);
        assert!(upper_right.local_m()[1] <= y_range_m);
    }

    #[test]
    fn test_coordinates_monotonic() {
        let grid = quad_grid();

        for row in 1..grid.num_rows() {
            assert!(
                grid.node(row, 0).unwrap().gps().lat_deg()
                    > grid.node(row - 1, 0).unwrap().gps().lat_deg()
            );
        }
        for col in 1..grid.num_cols() {
            assert!(
                grid.node(0, col).unwrap().gps().long_deg()
                    > grid.node(0, col - 1).unwrap().gps().long_deg()
            );
        }
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        assert!(matches!(
            Grid::new(42.0, 42.0, -76.1, -76.0),
            Err(GridError::DegenerateBounds { .. })
        ));
        assert!(matches!(
            Grid::new(42.0, 43.0, -76.0, -76.1),
            Err(GridError::DegenerateBounds { .. })
        ));
    }

    #[test]
    fn test_malformed_gps_rejected() {
        assert!(matches!(
            Grid::new(f64::NAN, 42.0, -76.1, -76.0),
            Err(GridError::InvalidBounds(_))
        ));
    }

    #[test]
    fn test_nodes_start_inactive() {
        let grid = quad_grid();
        assert!(!grid.node(0, 0).unwrap().is_active());
    }

    #[test]
    fn test_activation_bounds_checked() {
        let mut grid = quad_grid();
        let (rows, cols) = (grid.num_rows(), grid.num_cols());

        assert!(grid.activate(0, 0).is_ok());
        assert!(matches!(
            grid.activate(rows, 0),
            Err(GridError::NodeOutOfBounds(..))
        ));
        assert!(matches!(
            grid.activate(0, cols),
            Err(GridError::NodeOutOfBounds(..))
        ));
    }

    #[test]
    fn test_border_count_fully_active() {
        let mut grid = quad_grid();
        let (rows, cols) = (grid.num_rows(), grid.num_cols());
        grid.activate_range(0, 0, rows, cols).unwrap();

        let analysis = grid.border_analysis();

        // A fully-activated rectangular grid has exactly its perimeter as
        // border nodes
        let expected = if rows <= 2 || cols <= 2 {
            rows * cols
        } else {
            2 * (rows + cols) - 4
        };
        assert_eq!(analysis.border_positions.len(), expected);
        assert_ne!(analysis.border_positions.len(), rows * cols);
        assert_eq!(analysis.leftmost_pos, Some((0, 0)));
    }

    #[test]
    fn test_border_inactive_hole() {
        let mut grid = quad_grid();
        let (rows, cols) = (grid.num_rows(), grid.num_cols());
        assert!(rows >= 5 && cols >= 5);

        // Activate everything except one interior node
        for row in 0..rows {
            for col in 0..cols {
                if (row, col) != (2, 2) {
                    grid.activate(row, col).unwrap();
                }
            }
        }

        // All 8 neighbours of the hole become border nodes
        let analysis = grid.border_analysis();
        let perimeter = 2 * (rows + cols) - 4;
        assert_eq!(analysis.border_positions.len(), perimeter + 8);
        assert!(grid.node(1, 1).unwrap().is_border());
        assert!(grid.node(2, 3).unwrap().is_border());
    }

    #[test]
    fn test_border_cache_invalidated_by_activation() {
        let mut grid = quad_grid();
        grid.activate(0, 0).unwrap();
        assert_eq!(grid.border_analysis().border_positions.len(), 1);

        grid.activate(0, 1).unwrap();
        assert_eq!(grid.border_analysis().border_positions.len(), 2);
        assert_eq!(grid.border_analysis().leftmost_pos, Some((0, 0)));
    }

    #[test]
    fn test_leftmost_tie_broken_by_scan_order() {
        let mut grid = quad_grid();
        grid.activate(3, 1).unwrap();
        grid.activate(1, 1).unwrap();

        // Both are border nodes in column 1, the lower row is scanned first
        assert_eq!(grid.border_analysis().leftmost_pos, Some((1, 1)));
    }
}
