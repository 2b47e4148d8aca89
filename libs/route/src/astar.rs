//! Heuristic routing with bend and via cost shaping.

use crate::detailed::PathFinder;
use crate::grid::{GridCoord, NetId, RoutingState};
use crate::search::{astar, AStarWeights, Path};

/// A router based on A* search.
///
/// Penalizes bends and vias to produce straighter wires than [`MazeRouter`](crate::maze::MazeRouter),
/// at the cost of optimality. May fail to connect nets that the maze router connects.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AStarRouter {
    /// The cost of a layer change.
    pub via_weight: f64,
    /// The cost of changing planar heading.
    pub bend_weight: f64,
}

impl PathFinder for AStarRouter {
    fn find_path(
        &self,
        state: &RoutingState,
        net: NetId,
        src: GridCoord,
        dst: GridCoord,
    ) -> Option<Path> {
        astar(
            state,
            net,
            src,
            dst,
            AStarWeights {
                via: self.via_weight,
                bend: self.bend_weight,
            },
        )
    }
}
