//! Design model shared by the routing, synthesis and buffering solvers.
//!
//! A design is a flat list of placed [`Cell`]s, each owning its [`Pin`]s,
//! together with a list of [`Net`]s that reference pins by ID.
//! Pin positions are stored relative to their owning cell;
//! the absolute position of a pin is `cell.position + pin.position`.
//! Use a [`PinIndex`] to resolve pin IDs to absolute positions.
//!
//! Solvers treat cells, pins and nets as read-only inputs and produce [`Wire`]s.
#![warn(missing_docs)]

use arcstr::ArcStr;
use geometry::prelude::Point;
use serde::{Deserialize, Serialize};

pub mod index;
pub mod runtime;
pub mod validation;

pub use index::{PinIndex, ResolvedPin};


/// The width of a wire emitted by a detailed router.
pub const DEFAULT_WIRE_WIDTH: i64 = 1;

/// Pin directions.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// Input.
    Input,
    /// Output.
    Output,
    /// Input or output.
    #[default]
    InOut,
}

/// A connection point on a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// The design-wide identifier of the pin.
    pub id: ArcStr,
    /// A human readable name, e.g. `A` or `Y`.
    pub name: ArcStr,
    /// The position of the pin relative to the lower-left corner of its cell.
    pub position: Point,
    /// The direction of the pin.
    #[serde(default)]
    pub direction: PinDirection,
}

impl Pin {
    /// Creates a new pin.
    pub fn new(
        id: impl Into<ArcStr>,
        name: impl Into<ArcStr>,
        position: Point,
        direction: PinDirection,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            direction,
        }
    }
}

/// A placed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// The design-wide identifier of the cell.
    pub id: ArcStr,
    /// The instance name of the cell.
    pub name: ArcStr,
    /// The width of the cell.
    pub width: i64,
    /// The height of the cell.
    pub height: i64,
    /// The position of the lower-left corner of the cell.
    pub position: Point,
    /// The pins owned by this cell.
    #[serde(default)]
    pub pins: Vec<Pin>,
    /// The cell type, e.g. `NAND2`.
    #[serde(default, rename = "type")]
    pub kind: ArcStr,
}

impl Cell {
    /// Creates a new cell with no pins.
    ///
    /// The name of the cell defaults to its ID.
    pub fn new(id: impl Into<ArcStr>, position: Point, width: i64, height: i64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            width,
            height,
            position,
            pins: Vec::new(),
            kind: ArcStr::new(),
        }
    }

    /// Sets the cell type.
    pub fn with_kind(mut self, kind: impl Into<ArcStr>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Adds a pin to the cell, returning the modified cell.
    pub fn with_pin(mut self, pin: Pin) -> Self {
        self.add_pin(pin);
        self
    }

    /// Adds a pin to the cell.
    pub fn add_pin(&mut self, pin: Pin) {
        self.pins.push(pin);
    }

    /// The absolute position of a pin placed on this cell.
    ///
    /// Returns [`None`] if the position does not fit in the coordinate range.
    #[inline]
    pub fn absolute(&self, pin: &Pin) -> Option<Point> {
        self.position.checked_add(pin.position)
    }
}

fn default_weight() -> f64 {
    1.0
}

/// A set of pins that must be electrically connected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    /// The design-wide identifier of the net.
    pub id: ArcStr,
    /// The name of the net.
    pub name: ArcStr,
    /// The IDs of the pins on this net.
    ///
    /// The first pin is treated as the source by star decompositions.
    #[serde(default)]
    pub pins: Vec<ArcStr>,
    /// The relative importance of the net.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Net {
    /// Creates a new net with the given pins and a weight of 1.
    pub fn new<I, S>(id: impl Into<ArcStr>, pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ArcStr>,
    {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            pins: pins.into_iter().map(Into::into).collect(),
            weight: default_weight(),
        }
    }

    /// Returns `true` if the net needs no wiring, ie. it has fewer than two pins.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.pins.len() < 2
    }
}

/// A routed wire: a polyline on a single layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    /// The identifier of the wire.
    pub id: ArcStr,
    /// The ID of the net this wire belongs to.
    pub net_id: ArcStr,
    /// The vertices of the polyline.
    pub points: Vec<Point>,
    /// The routing layer index.
    pub layer: usize,
    /// The wire width.
    pub width: i64,
}

impl Wire {
    /// The Manhattan length of the polyline.
    pub fn length(&self) -> i64 {
        self.points.windows(2).map(|w| w[0].manhattan(w[1])).sum()
    }
}
