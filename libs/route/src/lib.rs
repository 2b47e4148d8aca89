//! Grid-based routers.
//!
//! Three routers are provided, selected by [`RoutingAlgorithm`]:
//!
//! * [`maze`]: weighted wavefront expansion (Lee's algorithm).
//! * [`astar`]: A* search with bend and via penalties.
//! * [`global`]: one L-shaped wire per net over a coarse bin graph.
//!
//! The detailed routers share a multi-layer occupancy grid ([`grid::RoutingState`])
//! across all nets of a run. Nets are routed strictly in input order, and points
//! used by a routed net block every later net. Reordering nets can therefore
//! change which nets route successfully.
//!
//! # Example
//!
//! ```
//! use design::{Cell, Net, Pin, PinDirection};
//! use geometry::prelude::*;
//! use route::{run_routing, RoutingParams};
//!
//! let cells = vec![
//!     Cell::new("a", Point::new(10, 10), 10, 10)
//!         .with_pin(Pin::new("a.y", "Y", Point::new(5, 5), PinDirection::Output)),
//!     Cell::new("b", Point::new(70, 50), 10, 10)
//!         .with_pin(Pin::new("b.a", "A", Point::new(0, 5), PinDirection::Input)),
//! ];
//! let nets = vec![Net::new("n0", ["a.y", "b.a"])];
//! let params = RoutingParams::new("maze", 100, 100, 2)
//!     .with_cells(cells)
//!     .with_nets(nets);
//!
//! let result = run_routing(&params).unwrap();
//! assert!(result.success);
//! assert!(result.total_wirelength > 0);
//! ```
#![warn(missing_docs)]

use std::fmt::Display;
use std::str::FromStr;
use std::time::{Duration, Instant};

use arcstr::ArcStr;
use design::{runtime, Cell, Net, Wire};
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod astar;
pub mod detailed;
pub mod error;
pub mod global;
pub mod grid;
pub mod maze;
pub mod search;

pub use error::{Error, Result};

use crate::astar::AStarRouter;
use crate::grid::RoutingGrid;
use crate::maze::MazeRouter;

#[cfg(test)]
pub(crate) mod tests;

/// The default grid pitch.
pub const DEFAULT_GRID_SIZE: i64 = 10;
/// The default cost of a layer change.
pub const DEFAULT_VIA_WEIGHT: f64 = 1.0;
/// The default cost of a change in planar heading.
pub const DEFAULT_BEND_WEIGHT: f64 = 1.0;

/// The available routing algorithms.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingAlgorithm {
    /// Weighted wavefront expansion.
    Maze,
    /// Heuristic search with bend and via cost shaping.
    AStar,
    /// Coarse L-shaped routing over a bin graph.
    Global,
}

impl FromStr for RoutingAlgorithm {
    type Err = Error;

    /// Parses an algorithm tag, ignoring case.
    ///
    /// ```
    /// # use route::RoutingAlgorithm;
    /// assert_eq!("Lee".parse::<RoutingAlgorithm>().unwrap(), RoutingAlgorithm::Maze);
    /// assert_eq!("a*".parse::<RoutingAlgorithm>().unwrap(), RoutingAlgorithm::AStar);
    /// assert!("steiner".parse::<RoutingAlgorithm>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maze" | "lee" => Ok(Self::Maze),
            "astar" | "a*" | "a-star" => Ok(Self::AStar),
            "global" => Ok(Self::Global),
            _ => Err(Error::UnsupportedAlgorithm(s.into())),
        }
    }
}

impl Display for RoutingAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Maze => write!(f, "maze"),
            Self::AStar => write!(f, "astar"),
            Self::Global => write!(f, "global"),
        }
    }
}

/// Parameters for [`run_routing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingParams {
    /// The algorithm tag, parsed by [`RoutingAlgorithm::from_str`].
    pub algorithm: ArcStr,
    /// The chip width.
    pub chip_width: i64,
    /// The chip height.
    pub chip_height: i64,
    /// The placed cells.
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// The nets to route, in routing order.
    #[serde(default)]
    pub nets: Vec<Net>,
    /// The number of routing layers.
    pub layers: usize,
    /// The grid pitch. Defaults to [`DEFAULT_GRID_SIZE`].
    #[serde(default)]
    pub grid_size: Option<i64>,
    /// The cost of a layer change. Defaults to [`DEFAULT_VIA_WEIGHT`].
    #[serde(default)]
    pub via_weight: Option<f64>,
    /// The cost of a change in planar heading. Defaults to [`DEFAULT_BEND_WEIGHT`].
    ///
    /// Only used by the A* router.
    #[serde(default)]
    pub bend_weight: Option<f64>,
}

impl RoutingParams {
    /// Creates routing parameters with no cells or nets and default tunables.
    pub fn new(
        algorithm: impl Into<ArcStr>,
        chip_width: i64,
        chip_height: i64,
        layers: usize,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            chip_width,
            chip_height,
            cells: Vec::new(),
            nets: Vec::new(),
            layers,
            grid_size: None,
            via_weight: None,
            bend_weight: None,
        }
    }

    /// Sets the placed cells.
    pub fn with_cells(mut self, cells: Vec<Cell>) -> Self {
        self.cells = cells;
        self
    }

    /// Sets the nets to route.
    pub fn with_nets(mut self, nets: Vec<Net>) -> Self {
        self.nets = nets;
        self
    }

    /// Sets the grid pitch.
    pub fn with_grid_size(mut self, grid_size: i64) -> Self {
        self.grid_size = Some(grid_size);
        self
    }

    /// Sets the cost of a layer change.
    pub fn with_via_weight(mut self, via_weight: f64) -> Self {
        self.via_weight = Some(via_weight);
        self
    }

    /// Sets the cost of a change in planar heading.
    pub fn with_bend_weight(mut self, bend_weight: f64) -> Self {
        self.bend_weight = Some(bend_weight);
        self
    }

    /// The grid described by these parameters.
    pub fn grid(&self) -> Result<RoutingGrid> {
        RoutingGrid::new(
            self.chip_width,
            self.chip_height,
            self.layers,
            self.grid_size.unwrap_or(DEFAULT_GRID_SIZE),
        )
    }

    fn weight(name: &'static str, value: Option<f64>, default: f64) -> Result<f64> {
        let value = value.unwrap_or(default);
        if value.is_finite() && value >= 0. {
            Ok(value)
        } else {
            Err(Error::invalid(
                name,
                format!("must be finite and non-negative, got {value}"),
            ))
        }
    }
}

/// The output of [`run_routing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult {
    /// `true` if every net was routed.
    pub success: bool,
    /// The routed wires.
    pub wires: Vec<Wire>,
    /// The total Manhattan length of all wires.
    pub total_wirelength: i64,
    /// The number of layer changes.
    pub via_count: usize,
    /// The IDs of nets that could not be routed, in input order.
    pub unrouted_nets: Vec<ArcStr>,
    /// The wall-clock time spent routing.
    pub runtime: Duration,
}

/// Wiring produced by a router, before timing is attached.
#[derive(Debug, Default)]
pub struct Routed {
    /// The routed wires.
    pub wires: Vec<Wire>,
    /// The total Manhattan length of all wires.
    pub total_wirelength: i64,
    /// The number of layer changes.
    pub via_count: usize,
    /// The IDs of nets that could not be routed.
    pub unrouted_nets: Vec<ArcStr>,
}

impl Routed {
    fn finish(self, start: Instant) -> RoutingResult {
        RoutingResult {
            success: self.unrouted_nets.is_empty(),
            wires: self.wires,
            total_wirelength: self.total_wirelength,
            via_count: self.via_count,
            unrouted_nets: self.unrouted_nets,
            runtime: runtime::elapsed(start),
        }
    }
}

/// Routes all nets with the algorithm named by `params.algorithm`.
///
/// Each call allocates a fresh grid, so repeated calls with identical
/// parameters produce identical wires.
pub fn run_routing(params: &RoutingParams) -> Result<RoutingResult> {
    let start = Instant::now();
    let algorithm: RoutingAlgorithm = params.algorithm.parse()?;
    let grid = params.grid()?;
    let via_weight = RoutingParams::weight("via_weight", params.via_weight, DEFAULT_VIA_WEIGHT)?;
    let bend_weight =
        RoutingParams::weight("bend_weight", params.bend_weight, DEFAULT_BEND_WEIGHT)?;

    let span = tracing::info_span!("run_routing", %algorithm, nets = params.nets.len());
    let _guard = span.enter();

    let routed = match algorithm {
        RoutingAlgorithm::Maze => detailed::route(
            &MazeRouter { via_weight },
            grid,
            &params.cells,
            &params.nets,
        ),
        RoutingAlgorithm::AStar => detailed::route(
            &AStarRouter {
                via_weight,
                bend_weight,
            },
            grid,
            &params.cells,
            &params.nets,
        ),
        RoutingAlgorithm::Global => global::route(&grid, &params.cells, &params.nets),
    };
    let result = routed.finish(start);

    info!(
        wires = result.wires.len(),
        wirelength = result.total_wirelength,
        vias = result.via_count,
        unrouted = result.unrouted_nets.len(),
        runtime = ?result.runtime,
        "routing finished"
    );
    Ok(result)
}
