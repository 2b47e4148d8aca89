//! Maze routing with weighted wavefront expansion.

use crate::detailed::PathFinder;
use crate::grid::{GridCoord, NetId, RoutingState};
use crate::search::{wavefront, Path};

/// A router based on Lee's algorithm.
///
/// Finds a minimum-cost path for each connection, where a planar step costs 1
/// and a layer change costs `via_weight`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MazeRouter {
    /// The cost of a layer change.
    pub via_weight: f64,
}

impl PathFinder for MazeRouter {
    fn find_path(
        &self,
        state: &RoutingState,
        net: NetId,
        src: GridCoord,
        dst: GridCoord,
    ) -> Option<Path> {
        wavefront(state, net, src, dst, self.via_weight)
    }
}
