//! Gate-level logic synthesis.
//!
//! Netlists are parsed from a structural subset of Verilog (see [`parser`])
//! into a validated [`network::Network`]. Two flows are available,
//! selected by [`SynthesisAlgorithm`]:
//!
//! * Logic optimization: the network is converted to an and-inverter graph
//!   ([`aig::Aig`]), simplified according to an [`OptimizationGoal`], and
//!   emitted as `assign` statements.
//! * Technology mapping: every primitive is mapped one-to-one onto a cell
//!   of the target library.
//!
//! # Example
//!
//! ```
//! use logic::{run_synthesis, SynthesisParams};
//!
//! let netlist = "
//!     module top(a, b, y);
//!       input a, b;
//!       output y;
//!       nand g0(y, a, b);
//!     endmodule
//! ";
//! let result = run_synthesis(&SynthesisParams::new("techmap", netlist)).unwrap();
//! assert!(result.optimized_netlist.contains("generic_NAND2 g0"));
//! assert_eq!(result.gate_count, 1);
//! ```
#![warn(missing_docs)]

use std::fmt::Display;
use std::str::FromStr;
use std::time::{Duration, Instant};

use arcstr::ArcStr;
use design::runtime;
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod aig;
pub mod error;
pub mod network;
pub mod opt;
pub mod parser;
pub mod techmap;

pub use error::{Error, Result};
pub use opt::OptimizationGoal;

use crate::network::Network;
use crate::opt::{OptimizeOptions, DEFAULT_CLOCK_PERIOD};

#[cfg(test)]
pub(crate) mod tests;

/// The default target library.
pub const DEFAULT_LIBRARY: &str = "generic";

/// The available synthesis flows.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisAlgorithm {
    /// AIG-based logic optimization.
    LogicOpt,
    /// One-to-one technology mapping.
    TechMap,
}

impl FromStr for SynthesisAlgorithm {
    type Err = Error;

    /// Parses an algorithm tag, ignoring case.
    ///
    /// ```
    /// # use logic::SynthesisAlgorithm;
    /// assert_eq!(
    ///     "Technology_Mapping".parse::<SynthesisAlgorithm>().unwrap(),
    ///     SynthesisAlgorithm::TechMap,
    /// );
    /// assert!("retime".parse::<SynthesisAlgorithm>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logic_opt" | "logic-opt" | "logicopt" | "logic_optimization" => Ok(Self::LogicOpt),
            "techmap" | "tech_map" | "tech-map" | "technology_mapping" => Ok(Self::TechMap),
            _ => Err(Error::UnsupportedAlgorithm(s.into())),
        }
    }
}

impl Display for SynthesisAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LogicOpt => write!(f, "logic_opt"),
            Self::TechMap => write!(f, "techmap"),
        }
    }
}

fn default_library() -> ArcStr {
    ArcStr::from(DEFAULT_LIBRARY)
}

/// Parameters for [`run_synthesis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParams {
    /// The algorithm tag, parsed by [`SynthesisAlgorithm::from_str`].
    pub algorithm: ArcStr,
    /// The netlist source text.
    pub netlist: String,
    /// The library prefix used by technology mapping.
    #[serde(default = "default_library")]
    pub target_library: ArcStr,
    /// The optimization goal used by logic optimization.
    #[serde(default)]
    pub optimization_level: OptimizationGoal,
    /// The clock period in nanoseconds. Defaults to [`DEFAULT_CLOCK_PERIOD`].
    ///
    /// Only used with [`OptimizationGoal::Timing`].
    #[serde(default)]
    pub clock_period: Option<f64>,
}

impl SynthesisParams {
    /// Creates synthesis parameters with the default library and goal.
    pub fn new(algorithm: impl Into<ArcStr>, netlist: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            netlist: netlist.into(),
            target_library: default_library(),
            optimization_level: OptimizationGoal::default(),
            clock_period: None,
        }
    }

    /// Sets the target library.
    pub fn with_target_library(mut self, library: impl Into<ArcStr>) -> Self {
        self.target_library = library.into();
        self
    }

    /// Sets the optimization goal.
    pub fn with_goal(mut self, goal: OptimizationGoal) -> Self {
        self.optimization_level = goal;
        self
    }

    /// Sets the clock period.
    pub fn with_clock_period(mut self, clock_period: f64) -> Self {
        self.clock_period = Some(clock_period);
        self
    }

    fn clock_period(&self) -> Result<f64> {
        let period = self.clock_period.unwrap_or(DEFAULT_CLOCK_PERIOD);
        if period.is_finite() && period > 0. {
            Ok(period)
        } else {
            Err(Error::invalid(
                "clock_period",
                format!("must be finite and positive, got {period}"),
            ))
        }
    }
}

/// The output of [`run_synthesis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// `true` if synthesis completed.
    pub success: bool,
    /// The synthesized netlist text.
    pub optimized_netlist: String,
    /// The number of gates in the synthesized netlist.
    pub gate_count: usize,
    /// The estimated area.
    pub area: f64,
    /// The estimated power.
    pub power: f64,
    /// The estimated critical path delay, in nanoseconds.
    ///
    /// For the timing goal this is the `0.8 * clock_period` target rather
    /// than a measured delay.
    pub critical_path_delay: f64,
    /// The wall-clock time spent.
    pub runtime: Duration,
}

/// A synthesized netlist and its metrics, before timing is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesized {
    /// The netlist text.
    pub netlist: String,
    /// The number of gates.
    pub gate_count: usize,
    /// The estimated area.
    pub area: f64,
    /// The estimated power.
    pub power: f64,
    /// The estimated critical path delay.
    pub critical_path_delay: f64,
}

impl Synthesized {
    fn finish(self, start: Instant) -> SynthesisResult {
        SynthesisResult {
            success: true,
            optimized_netlist: self.netlist,
            gate_count: self.gate_count,
            area: self.area,
            power: self.power,
            critical_path_delay: self.critical_path_delay,
            runtime: runtime::elapsed(start),
        }
    }
}

/// Synthesizes a netlist with the flow named by `params.algorithm`.
pub fn run_synthesis(params: &SynthesisParams) -> Result<SynthesisResult> {
    let start = Instant::now();
    let algorithm: SynthesisAlgorithm = params.algorithm.parse()?;
    let clock_period = params.clock_period()?;

    let span = tracing::info_span!("run_synthesis", %algorithm);
    let _guard = span.enter();

    let network = Network::parse(&params.netlist)?;
    let synthesized = match algorithm {
        SynthesisAlgorithm::LogicOpt => opt::optimize(
            &network,
            OptimizeOptions {
                goal: params.optimization_level,
                clock_period,
            },
        ),
        SynthesisAlgorithm::TechMap => techmap::map(&network, &params.target_library),
    };
    let result = synthesized.finish(start);

    info!(
        gates = result.gate_count,
        area = result.area,
        delay = result.critical_path_delay,
        runtime = ?result.runtime,
        "synthesis finished"
    );
    Ok(result)
}
