//! Multi-layer routing grid and occupancy state.

use std::ops::{Index, IndexMut};

use geometry::prelude::*;
use grid::Grid;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An identifier for a net, its position in the routed net list.
pub type NetId = usize;

/// A coordinate within the routing grid.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GridCoord {
    /// The layer.
    pub layer: usize,
    /// The x-coordinate.
    pub x: usize,
    /// The y-coordinate.
    pub y: usize,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    pub const fn new(layer: usize, x: usize, y: usize) -> Self {
        Self { layer, x, y }
    }

    /// The Manhattan distance between the planar projections of `self` and `other`.
    pub const fn planar_distance(&self, other: GridCoord) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// The state of a point on a routing grid.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PointState {
    /// The grid point is available for routing.
    #[default]
    Available,
    /// The grid point is occupied by a known net.
    Routed(NetId),
}

impl PointState {
    /// Whether or not the given point can be used to route the given net.
    pub fn is_available_for_net(&self, net: NetId) -> bool {
        match self {
            Self::Available => true,
            Self::Routed(n) => *n == net,
        }
    }
}

/// A single move between adjacent grid points.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Step {
    /// The destination of the move.
    pub to: GridCoord,
    /// The planar heading of the move, or [`None`] for a via.
    pub heading: Option<Heading>,
}

impl Step {
    /// Returns `true` if this step changes layers.
    #[inline]
    pub fn is_via(&self) -> bool {
        self.heading.is_none()
    }
}

/// The largest per-point footprint of the occupancy grid and search scratch buffers.
const MAX_POINT_BYTES: usize = std::mem::size_of::<Option<GridCoord>>();

/// The geometry of a routing grid.
///
/// Grid lines sit at multiples of the pitch, starting at the origin.
/// If the chip dimensions are not multiples of the pitch, the last
/// line in each direction absorbs the remainder.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RoutingGrid {
    chip: Rect,
    pitch: i64,
    layers: usize,
    nx: usize,
    ny: usize,
}

impl RoutingGrid {
    /// Creates a routing grid over `[0, width] x [0, height]`.
    pub fn new(width: i64, height: i64, layers: usize, pitch: i64) -> Result<Self> {
        if pitch <= 0 {
            return Err(Error::invalid("grid_size", format!("must be positive, got {pitch}")));
        }
        if layers == 0 {
            return Err(Error::invalid("layers", "must be at least 1"));
        }
        if width < 0 || height < 0 {
            return Err(Error::invalid(
                "chip_width/chip_height",
                format!("must be non-negative, got {width}x{height}"),
            ));
        }
        let lines = |extent: i64| usize::try_from(extent / pitch).ok()?.checked_add(1);
        let too_large = || {
            Error::invalid(
                "grid_size",
                format!("{width}x{height} with {layers} layers has too many grid points"),
            )
        };
        let (nx, ny) = lines(width).zip(lines(height)).ok_or_else(too_large)?;
        layers
            .checked_mul(nx)
            .and_then(|n| n.checked_mul(ny))
            .and_then(|n| n.checked_mul(MAX_POINT_BYTES))
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or_else(too_large)?;
        Ok(Self {
            chip: Rect::from_extent(width, height),
            pitch,
            layers,
            nx,
            ny,
        })
    }

    /// The chip outline.
    #[inline]
    pub fn chip(&self) -> Rect {
        self.chip
    }

    /// The spacing between adjacent grid lines.
    #[inline]
    pub fn pitch(&self) -> i64 {
        self.pitch
    }

    /// The number of routing layers.
    #[inline]
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// The number of grid lines in the x and y directions.
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Returns `true` if `coord` lies on this grid.
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.layer < self.layers && coord.x < self.nx && coord.y < self.ny
    }

    /// Quantizes a point to the nearest grid point on the given layer.
    ///
    /// Returns [`None`] if the point lies outside the chip or the layer does not exist.
    pub fn quantize(&self, p: Point, layer: usize) -> Option<GridCoord> {
        if layer >= self.layers {
            return None;
        }
        let x = to_grid_index(p.x, self.pitch, self.chip.width())?;
        let y = to_grid_index(p.y, self.pitch, self.chip.height())?;
        Some(GridCoord { layer, x, y })
    }

    /// The physical location of a grid point.
    pub fn point(&self, coord: GridCoord) -> Point {
        Point::new(coord.x as i64 * self.pitch, coord.y as i64 * self.pitch)
    }

    /// All moves out of `coord`.
    ///
    /// Planar neighbours come first, in [`Heading::ALL`] order,
    /// followed by the via to the layer above and the via to the layer below.
    pub fn neighbors(&self, coord: GridCoord) -> impl Iterator<Item = Step> + '_ {
        let planar = Heading::ALL.into_iter().filter_map(move |heading| {
            let (dx, dy) = heading.delta();
            let x = coord.x.checked_add_signed(dx as isize)?;
            let y = coord.y.checked_add_signed(dy as isize)?;
            let to = GridCoord::new(coord.layer, x, y);
            self.contains(to).then_some(Step {
                to,
                heading: Some(heading),
            })
        });
        let up = coord
            .layer
            .checked_add(1)
            .map(|layer| GridCoord { layer, ..coord });
        let down = coord
            .layer
            .checked_sub(1)
            .map(|layer| GridCoord { layer, ..coord });
        let vias = up
            .into_iter()
            .chain(down)
            .filter(|to| self.contains(*to))
            .map(|to| Step { to, heading: None });
        planar.chain(vias)
    }

    /// A dense index for `coord`, suitable for per-search scratch arrays.
    #[inline]
    pub(crate) fn flat_index(&self, coord: GridCoord) -> usize {
        (coord.layer * self.nx + coord.x) * self.ny + coord.y
    }

    /// The number of grid points across all layers.
    #[inline]
    pub(crate) fn num_points(&self) -> usize {
        self.layers * self.nx * self.ny
    }
}

/// Occupancy of every grid point, shared by all nets of one routing run.
#[derive(Debug, Clone)]
pub struct RoutingState {
    grid: RoutingGrid,
    layers: Vec<Grid<PointState>>,
}

impl Index<GridCoord> for RoutingState {
    type Output = PointState;

    fn index(&self, index: GridCoord) -> &Self::Output {
        &self.layers[index.layer][(index.x, index.y)]
    }
}

impl IndexMut<GridCoord> for RoutingState {
    fn index_mut(&mut self, index: GridCoord) -> &mut Self::Output {
        &mut self.layers[index.layer][(index.x, index.y)]
    }
}

impl RoutingState {
    /// Creates a new [`RoutingState`] with every point available.
    pub fn new(grid: RoutingGrid) -> Self {
        let (nx, ny) = grid.size();
        let layers = (0..grid.layers())
            .map(|_| Grid::init(nx, ny, PointState::Available))
            .collect();
        Self { grid, layers }
    }

    /// Returns a reference to the routing grid.
    pub fn grid(&self) -> &RoutingGrid {
        &self.grid
    }

    /// Whether or not `coord` can be used to route the given net.
    pub fn is_available_for_net(&self, coord: GridCoord, net: NetId) -> bool {
        self[coord].is_available_for_net(net)
    }

    /// Marks `coord` as used by `net`.
    ///
    /// Returns `true` if the point was previously available,
    /// `false` if `net` already owned it.
    pub fn mark(&mut self, coord: GridCoord, net: NetId) -> bool {
        let state = &mut self[coord];
        debug_assert!(state.is_available_for_net(net));
        let fresh = *state == PointState::Available;
        *state = PointState::Routed(net);
        fresh
    }

    /// Frees every point in `coords`.
    pub fn release(&mut self, coords: impl IntoIterator<Item = GridCoord>) {
        for coord in coords {
            self[coord] = PointState::Available;
        }
    }
}
