//! Traversal generation for the coverage grid.
//!
//! The control mode enumeration lives here, in a leaf module both the grid
//! and the mission depend on, so neither has to reach into the other to
//! name a traversal.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{Grid, Node};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The control mode of a mission's traverse phase.
///
/// The three waypoint modes produce a coverage plan over the grid;
/// `Roomba` covers non-systematically with the boundary-bounce controller
/// and `Manual` leaves the robot under external command. Neither of the
/// latter has a waypoint plan.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Boustrophedon sweep over every node of the grid
    LawnmowerFull,

    /// Boustrophedon sweep over only the top and bottom row of each column
    LawnmowerBorders,

    /// Inward spiral over every node, reversed so the robot finishes at the
    /// starting corner
    Spiral,

    /// Non-systematic boundary-bounce coverage
    Roomba,

    /// External command, no planned traversal
    Manual,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Grid {
    /// The traversal waypoint sequence for the given control mode.
    ///
    /// Modes without a waypoint plan (`Roomba`, `Manual`) yield an empty
    /// sequence. That is not an error: the caller must treat an empty queue
    /// as "nothing to do".
    pub fn waypoints(&self, mode: ControlMode) -> Vec<Node> {
        match mode {
            ControlMode::LawnmowerFull => self.lawnmower_full_waypoints(),
            ControlMode::LawnmowerBorders => self.lawnmower_border_waypoints(),
            ControlMode::Spiral => self.spiral_waypoints(),
            ControlMode::Roomba | ControlMode::Manual => Vec::new(),
        }
    }

    /// Lawnmower traversal over every node of the grid.
    ///
    /// Column-major boustrophedon: even columns run bottom to top, odd
    /// columns top to bottom, starting at the bottom-left node (0, 0).
    fn lawnmower_full_waypoints(&self) -> Vec<Node> {
        let mut waypoints = Vec::with_capacity(self.num_rows() * self.num_cols());

        for col in 0..self.num_cols() {
            for row in 0..self.num_rows() {
                let row = if col % 2 == 0 {
                    row
                } else {
                    self.num_rows() - (row + 1)
                };

                // Safe to unwrap, row and col are within bounds by
                // construction
                waypoints.push(self.node(row, col).unwrap().clone());
            }
        }

        waypoints
    }

    /// Lawnmower traversal over only the bottom-row and top-row node of
    /// each column.
    ///
    /// Direction parity matches the full sweep so that consecutive
    /// waypoints across a column boundary share a row.
    fn lawnmower_border_waypoints(&self) -> Vec<Node> {
        let mut waypoints = Vec::with_capacity(2 * self.num_cols());
        let top_row = self.num_rows() - 1;

        for col in 0..self.num_cols() {
            let (first, second) = if col % 2 == 0 {
                (0, top_row)
            } else {
                (top_row, 0)
            };

            waypoints.push(self.node(first, col).unwrap().clone());
            waypoints.push(self.node(second, col).unwrap().clone());
        }

        waypoints
    }

    /// Spiral traversal over every node of the grid, exactly once each.
    ///
    /// Starting at (0, 0) the spiral advances through the direction cycle
    /// (+col, +row, -col, -row), rotating whenever the next cell is out of
    /// bounds or already visited; the bounds shrink implicitly as each ring
    /// is consumed. The generated path is reversed so that the robot's
    /// final destination is the starting corner.
    fn spiral_waypoints(&self) -> Vec<Node> {
        let rows = self.num_rows() as isize;
        let cols = self.num_cols() as isize;

        const STEP_COL: [isize; 4] = [1, 0, -1, 0];
        const STEP_ROW: [isize; 4] = [0, 1, 0, -1];

        let mut visited = vec![false; (rows * cols) as usize];
        let mut waypoints = Vec::with_capacity((rows * cols) as usize);

        let mut row: isize = 0;
        let mut col: isize = 0;
        let mut turn_state = 0;

        for _ in 0..rows * cols {
            visited[(row * cols + col) as usize] = true;
            waypoints.push(self.node(row as usize, col as usize).unwrap().clone());

            let mut next_row = row + STEP_ROW[turn_state];
            let mut next_col = col + STEP_COL[turn_state];

            let blocked = next_row < 0
                || next_row >= rows
                || next_col < 0
                || next_col >= cols
                || visited[(next_row * cols + next_col) as usize];

            if blocked {
                // Rotate to the next direction in the cycle. For a
                // rectangular ring one rotation always frees the way; after
                // the final node the advance is discarded with the loop.
                turn_state = (turn_state + 1) % 4;
                next_row = row + STEP_ROW[turn_state];
                next_col = col + STEP_COL[turn_state];
            }

            row = next_row;
            col = next_col;
        }

        waypoints.reverse();
        waypoints
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    fn quad_grid() -> Grid {
        Grid::new(42.444250, 42.444599, -76.483682, -76.483276).unwrap()
    }

    #[test]
    fn test_full_covers_every_node() {
        let grid = quad_grid();
        let waypoints = grid.waypoints(ControlMode::LawnmowerFull);

        assert_eq!(waypoints.len(), grid.num_rows() * grid.num_cols());
        assert_eq!(waypoints[0].position(), (0, 0));

        let unique: HashSet<_> = waypoints.iter().map(|n| n.position()).collect();
        assert_eq!(unique.len(), waypoints.len());
    }

    #[test]
    fn test_full_column_parity() {
        let grid = quad_grid();
        let waypoints = grid.waypoints(ControlMode::LawnmowerFull);
        let rows = grid.num_rows();

        // Column 0 ends at the top, column 1 starts at the top: the sweep
        // never teleports across a column boundary
        assert_eq!(waypoints[rows - 1].position(), (rows - 1, 0));
        assert_eq!(waypoints[rows].position(), (rows - 1, 1));
    }

    #[test]
    fn test_border_mode_two_nodes_per_column() {
        let grid = quad_grid();
        let waypoints = grid.waypoints(ControlMode::LawnmowerBorders);

        assert_eq!(waypoints.len(), 2 * grid.num_cols());
        assert_eq!(waypoints[0].position(), (0, 0));

        // Consecutive waypoints across a column boundary share a row
        for pair in waypoints.chunks(2).collect::<Vec<_>>().windows(2) {
            let (last_row, last_col) = pair[0][1].position();
            let (next_row, next_col) = pair[1][0].position();
            assert_eq!(last_row, next_row);
            assert_eq!(next_col, last_col + 1);
        }
    }

    #[test]
    fn test_spiral_visits_each_node_once() {
        let grid = quad_grid();
        let waypoints = grid.waypoints(ControlMode::Spiral);

        assert_eq!(waypoints.len(), grid.num_rows() * grid.num_cols());

        let unique: HashSet<_> = waypoints.iter().map(|n| n.position()).collect();
        assert_eq!(unique.len(), waypoints.len());
    }

    #[test]
    fn test_spiral_ends_at_start_corner() {
        let grid = quad_grid();
        let waypoints = grid.waypoints(ControlMode::Spiral);

        // Reversed path: the robot's final destination is the grid corner
        assert_eq!(waypoints.last().unwrap().position(), (0, 0));
        // And its second-to-last step is adjacent to it along the bottom row
        assert_eq!(waypoints[waypoints.len() - 2].position(), (0, 1));
    }

    #[test]
    fn test_unplanned_modes_yield_empty() {
        let grid = quad_grid();
        assert!(grid.waypoints(ControlMode::Roomba).is_empty());
        assert!(grid.waypoints(ControlMode::Manual).is_empty());
    }
}
