//! Runs physical design and synthesis jobs.
//!
//! A [`Job`] bundles the parameters of one solver call. [`run`] dispatches
//! it to [`route::run_routing`], [`logic::run_synthesis`] or
//! [`buffering::van_ginneken_buffer_insertion`] and wraps the outcome in a
//! [`Report`].
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use tracing::info;

pub mod config;
pub mod error;

pub use buffering;
pub use design;
pub use geometry;
pub use logic;
pub use route;

pub use error::{Error, Result};

use buffering::{BufferingParams, BufferingResult};
use design::validation::{validate, IssueSet};
use geometry::prelude::*;
use logic::{SynthesisParams, SynthesisResult};
use route::{RoutingParams, RoutingResult};


/// A solver invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Job {
    /// Route nets on a grid.
    Routing(RoutingParams),
    /// Optimize or map a gate-level netlist.
    Synthesis(SynthesisParams),
    /// Insert buffers into a net.
    Buffering(BufferingParams),
}

impl Job {
    /// The kind of job, as written in job files.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Routing(_) => "routing",
            Self::Synthesis(_) => "synthesis",
            Self::Buffering(_) => "buffering",
        }
    }

    /// Checks the design referenced by this job.
    ///
    /// Returns [`None`] for jobs that carry no placed design.
    pub fn validate(&self) -> Option<IssueSet> {
        match self {
            Self::Routing(params) => Some(validate(
                &params.cells,
                &params.nets,
                Some(Rect::from_extent(params.chip_width, params.chip_height)),
            )),
            Self::Synthesis(_) => None,
            Self::Buffering(params) => Some(validate(
                &params.cells,
                std::slice::from_ref(&params.net),
                None,
            )),
        }
    }
}

/// The outcome of a [`Job`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Report {
    /// The result of a routing job.
    Routing(RoutingResult),
    /// The result of a synthesis job.
    Synthesis(SynthesisResult),
    /// The result of a buffering job.
    Buffering(BufferingResult),
}

impl Report {
    /// Returns `true` if the solver reported success.
    pub fn success(&self) -> bool {
        match self {
            Self::Routing(r) => r.success,
            Self::Synthesis(r) => r.success,
            Self::Buffering(r) => r.success,
        }
    }

    /// The wall-clock time the solver spent.
    pub fn runtime(&self) -> std::time::Duration {
        match self {
            Self::Routing(r) => r.runtime,
            Self::Synthesis(r) => r.runtime,
            Self::Buffering(r) => r.runtime,
        }
    }
}

/// Runs a job.
pub fn run(job: &Job) -> Result<Report> {
    let span = tracing::info_span!("run", kind = job.kind());
    let _guard = span.enter();

    let report = match job {
        Job::Routing(params) => Report::Routing(route::run_routing(params)?),
        Job::Synthesis(params) => Report::Synthesis(logic::run_synthesis(params)?),
        Job::Buffering(params) => {
            Report::Buffering(buffering::van_ginneken_buffer_insertion(params)?)
        }
    };
    info!(success = report.success(), runtime = ?report.runtime(), "job finished");
    Ok(report)
}
