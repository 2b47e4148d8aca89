//! Van Ginneken buffer insertion.
//!
//! A net is expanded into a star-shaped RC tree rooted at its first pin
//! ([`tree::BufferTree`]). Long connections are split into stations where
//! buffers may be placed. A bottom-up dynamic program ([`dp::solve`]) keeps
//! the Pareto-optimal trade-offs between delay, load capacitance and buffer
//! power at every node, and the fastest solution at the root is returned.
//!
//! # Example
//!
//! ```
//! use buffering::{van_ginneken_buffer_insertion, BufferingParams};
//! use design::{Cell, Net, Pin, PinDirection};
//! use geometry::prelude::*;
//!
//! let cells = vec![
//!     Cell::new("drv", Point::new(0, 0), 0, 0)
//!         .with_pin(Pin::new("drv.y", "Y", Point::zero(), PinDirection::Output)),
//!     Cell::new("load", Point::new(2000, 0), 0, 0)
//!         .with_pin(Pin::new("load.a", "A", Point::zero(), PinDirection::Input)),
//! ];
//! let params = BufferingParams::new(Net::new("n0", ["drv.y", "load.a"]), cells, 50.);
//!
//! let result = van_ginneken_buffer_insertion(&params).unwrap();
//! assert!(result.success);
//! assert!(result.buffer_count > 0);
//! ```
#![warn(missing_docs)]

use std::time::{Duration, Instant};

use arcstr::ArcStr;
use design::{runtime, Cell, Net, Pin, PinDirection, PinIndex};
use geometry::prelude::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub mod dp;
pub mod error;
pub mod library;
pub mod solution;
pub mod tree;

pub use error::{Error, Failure, Result};
pub use library::{default_library, BufferType};

use crate::dp::WireModel;
use crate::tree::BufferTree;

#[cfg(test)]
pub(crate) mod tests;

/// The default wire resistance per unit length.
pub const DEFAULT_WIRE_RESISTANCE: f64 = 0.1;
/// The default wire capacitance per unit length.
pub const DEFAULT_WIRE_CAPACITANCE: f64 = 0.2;
/// The default distance between candidate buffer locations.
pub const DEFAULT_SEGMENT_LENGTH: i64 = 100;
/// The default load capacitance of a sink pin.
pub const DEFAULT_SINK_LOAD: f64 = 1.0;

/// Parameters for [`van_ginneken_buffer_insertion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferingParams {
    /// The net to buffer. Its first resolvable pin is the driver.
    pub net: Net,
    /// The placed cells carrying the net's pins.
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// The available buffers. Defaults to [`default_library`] if empty.
    #[serde(default)]
    pub buffer_types: Vec<BufferType>,
    /// The largest load a buffer may drive.
    pub max_capacitance: f64,
    /// The target slew. Validated and reported, but not optimized for.
    #[serde(default)]
    pub target_slew: f64,
    /// Wire resistance per unit length. Defaults to [`DEFAULT_WIRE_RESISTANCE`].
    #[serde(default)]
    pub wire_resistance: Option<f64>,
    /// Wire capacitance per unit length. Defaults to [`DEFAULT_WIRE_CAPACITANCE`].
    #[serde(default)]
    pub wire_capacitance: Option<f64>,
    /// Spacing of candidate buffer locations. Defaults to [`DEFAULT_SEGMENT_LENGTH`].
    #[serde(default)]
    pub segment_length: Option<i64>,
    /// Load capacitance of each sink pin. Defaults to [`DEFAULT_SINK_LOAD`].
    #[serde(default)]
    pub sink_load: Option<f64>,
}

impl BufferingParams {
    /// Creates buffering parameters with the default library and wire model.
    pub fn new(net: Net, cells: Vec<Cell>, max_capacitance: f64) -> Self {
        Self {
            net,
            cells,
            buffer_types: Vec::new(),
            max_capacitance,
            target_slew: 0.,
            wire_resistance: None,
            wire_capacitance: None,
            segment_length: None,
            sink_load: None,
        }
    }

    /// Sets the available buffers.
    pub fn with_buffer_types(mut self, buffer_types: Vec<BufferType>) -> Self {
        self.buffer_types = buffer_types;
        self
    }

    /// Sets the target slew.
    pub fn with_target_slew(mut self, target_slew: f64) -> Self {
        self.target_slew = target_slew;
        self
    }

    /// Sets the per-unit wire resistance and capacitance.
    pub fn with_wire(mut self, resistance: f64, capacitance: f64) -> Self {
        self.wire_resistance = Some(resistance);
        self.wire_capacitance = Some(capacitance);
        self
    }

    /// Sets the spacing of candidate buffer locations.
    pub fn with_segment_length(mut self, segment_length: i64) -> Self {
        self.segment_length = Some(segment_length);
        self
    }

    /// Sets the sink load capacitance.
    pub fn with_sink_load(mut self, sink_load: f64) -> Self {
        self.sink_load = Some(sink_load);
        self
    }

    /// The buffers the solver may use.
    pub fn library(&self) -> Vec<BufferType> {
        if self.buffer_types.is_empty() {
            default_library()
        } else {
            self.buffer_types.clone()
        }
    }

    fn non_negative(name: &'static str, value: f64) -> Result<f64> {
        if value.is_finite() && value >= 0. {
            Ok(value)
        } else {
            Err(Error::invalid(
                name,
                format!("must be finite and non-negative, got {value}"),
            ))
        }
    }

    fn validate(&self) -> Result<Settings> {
        let max_capacitance = Self::non_negative("max_capacitance", self.max_capacitance)?;
        let target_slew = Self::non_negative("target_slew", self.target_slew)?;
        let wire = WireModel {
            resistance: Self::non_negative(
                "wire_resistance",
                self.wire_resistance.unwrap_or(DEFAULT_WIRE_RESISTANCE),
            )?,
            capacitance: Self::non_negative(
                "wire_capacitance",
                self.wire_capacitance.unwrap_or(DEFAULT_WIRE_CAPACITANCE),
            )?,
        };
        let sink_load =
            Self::non_negative("sink_load", self.sink_load.unwrap_or(DEFAULT_SINK_LOAD))?;
        let segment_length = self.segment_length.unwrap_or(DEFAULT_SEGMENT_LENGTH);
        if segment_length <= 0 {
            return Err(Error::invalid(
                "segment_length",
                format!("must be positive, got {segment_length}"),
            ));
        }
        let library = self.library();
        if let Some(ty) = library.iter().find(|ty| !ty.is_valid()) {
            return Err(Error::invalid(
                "buffer_types",
                format!("buffer `{}` has a negative or non-finite parameter", ty.name),
            ));
        }
        Ok(Settings {
            max_capacitance,
            target_slew,
            wire,
            sink_load,
            segment_length,
            library,
        })
    }
}

struct Settings {
    max_capacitance: f64,
    target_slew: f64,
    wire: WireModel,
    sink_load: f64,
    segment_length: i64,
    library: Vec<BufferType>,
}

/// The output of [`van_ginneken_buffer_insertion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferingResult {
    /// `true` if buffer insertion completed.
    pub success: bool,
    /// The inserted buffer cells.
    pub buffers: Vec<Cell>,
    /// The worst delay from the driver to any sink.
    pub total_delay: f64,
    /// The total power of the inserted buffers.
    pub power_cost: f64,
    /// The number of inserted buffers.
    pub buffer_count: usize,
    /// The wall-clock time spent.
    pub runtime: Duration,
}

impl BufferingResult {
    fn failed(start: Instant) -> Self {
        Self {
            success: false,
            buffers: Vec::new(),
            total_delay: 0.,
            power_cost: 0.,
            buffer_count: 0,
            runtime: runtime::elapsed(start),
        }
    }
}

/// Inserts buffers into `params.net` to minimize its worst sink delay.
///
/// Pins that cannot be found among `params.cells` are skipped. If none can
/// be found, the call fails with [`Error::NoPinsForNet`]. A net with a
/// single resolvable pin succeeds with no buffers.
pub fn van_ginneken_buffer_insertion(
    params: &BufferingParams,
) -> std::result::Result<BufferingResult, Failure> {
    let start = Instant::now();
    insert(params, start).map_err(|error| {
        warn!(net = %params.net.id, %error, "buffer insertion failed");
        Failure {
            error,
            result: BufferingResult::failed(start),
        }
    })
}

fn insert(params: &BufferingParams, start: Instant) -> Result<BufferingResult> {
    let settings = params.validate()?;
    let net = &params.net;

    let span = tracing::info_span!("van_ginneken", net = %net.id);
    let _guard = span.enter();
    debug!(
        target_slew = settings.target_slew,
        max_capacitance = settings.max_capacitance,
        "buffering net"
    );

    let index = PinIndex::new(&params.cells);
    let mut pins = Vec::new();
    for (id, position) in index.resolve(net) {
        match position {
            Some(position) => pins.push((id.clone(), position)),
            None => warn!(pin = %id, "skipping dangling pin"),
        }
    }
    let mut pins = pins.into_iter();
    let source = pins.next().ok_or_else(|| Error::NoPinsForNet(net.id.clone()))?;

    let tree = BufferTree::star(source, pins, settings.segment_length, settings.sink_load)?;
    let candidates = dp::solve(
        &tree,
        &settings.library,
        settings.wire,
        settings.max_capacitance,
    );
    debug!(
        nodes = tree.len(),
        candidates = candidates.len(),
        "solved buffering tree"
    );

    let (total_delay, power_cost, placements) = match dp::select(&candidates) {
        Some(best) => (best.delay, best.power, best.buffers.clone()),
        None => (0., 0., Vec::new()),
    };

    let buffers: Vec<Cell> = placements
        .iter()
        .sorted_by_key(|p| p.node)
        .enumerate()
        .map(|(i, p)| {
            let ty = &settings.library[p.buffer];
            buffer_cell(
                arcstr::format!("{}_buf{i}", net.id),
                ty.name.clone(),
                tree.node(p.node).position,
            )
        })
        .collect();

    let result = BufferingResult {
        success: true,
        buffer_count: buffers.len(),
        buffers,
        total_delay,
        power_cost,
        runtime: runtime::elapsed(start),
    };
    info!(
        buffers = result.buffer_count,
        delay = result.total_delay,
        power = result.power_cost,
        runtime = ?result.runtime,
        "buffer insertion finished"
    );
    Ok(result)
}

fn buffer_cell(id: ArcStr, kind: ArcStr, position: Point) -> Cell {
    Cell::new(id.clone(), position, 0, 0)
        .with_kind(kind)
        .with_pin(Pin::new(
            arcstr::format!("{id}.A"),
            "A",
            Point::zero(),
            PinDirection::Input,
        ))
        .with_pin(Pin::new(
            arcstr::format!("{id}.Y"),
            "Y",
            Point::zero(),
            PinDirection::Output,
        ))
}
