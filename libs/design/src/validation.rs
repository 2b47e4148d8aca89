//! Design validation utilities.
//!
//! Validation is advisory: solvers accept designs with issues and
//! handle dangling or off-chip pins per net. Callers that want to
//! reject bad inputs up front can check [`IssueSet::has_error`].

use std::collections::HashSet;
use std::fmt::Display;

use arcstr::ArcStr;
use geometry::prelude::{Point, Rect};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::{Cell, Net, PinIndex};

/// An enumeration of possible severity levels.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    /// An informational message.
    Info,
    /// A warning.
    #[default]
    Warning,
    /// An error. Solvers still run, but the affected nets will not be connected.
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// An issue identified during validation of a design.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    cause: Cause,
    severity: Severity,
}

/// The cause of a validation [`Issue`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cause {
    /// Two cells have the same ID.
    DuplicateCellId {
        /// The repeated ID.
        id: ArcStr,
    },
    /// Two pins have the same ID.
    DuplicatePinId {
        /// The repeated ID.
        id: ArcStr,
    },
    /// A net references a pin that does not exist.
    DanglingPin {
        /// The net containing the reference.
        net: ArcStr,
        /// The missing pin ID.
        pin: ArcStr,
    },
    /// A pin's absolute position does not fit in the coordinate range.
    PinPositionOverflow {
        /// The pin ID.
        pin: ArcStr,
    },
    /// A pin lies outside the chip area.
    PinOutsideChip {
        /// The pin ID.
        pin: ArcStr,
        /// The absolute position of the pin.
        position: Point,
    },
    /// A net has fewer than two pins, so it needs no wiring.
    TrivialNet {
        /// The net ID.
        net: ArcStr,
    },
}

impl Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateCellId { id } => write!(f, "duplicate cell ID `{id}`"),
            Self::DuplicatePinId { id } => write!(f, "duplicate pin ID `{id}`"),
            Self::DanglingPin { net, pin } => {
                write!(f, "net `{net}` references undefined pin `{pin}`")
            }
            Self::PinPositionOverflow { pin } => {
                write!(f, "pin `{pin}` has an out-of-range position")
            }
            Self::PinOutsideChip { pin, position } => {
                write!(f, "pin `{pin}` at {position} lies outside the chip")
            }
            Self::TrivialNet { net } => write!(f, "net `{net}` has fewer than two pins"),
        }
    }
}

impl Issue {
    /// Creates a new issue from the given cause and severity.
    pub fn new(cause: Cause, severity: Severity) -> Self {
        Self { cause, severity }
    }

    /// Creates a new issue and logs it immediately.
    ///
    /// The log level will be selected according to the given severity.
    pub(crate) fn new_and_log(cause: Cause, severity: Severity) -> Self {
        let result = Self::new(cause, severity);
        match severity {
            Severity::Info => tracing::event!(Level::INFO, issue = ?result.cause, "{}", result),
            Severity::Warning => tracing::event!(Level::WARN, issue = ?result.cause, "{}", result),
            Severity::Error => tracing::event!(Level::ERROR, issue = ?result.cause, "{}", result),
        }
        result
    }

    /// Gets the underlying cause of this issue.
    #[inline]
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Gets the severity of this issue.
    #[inline]
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.cause)
    }
}

/// A collection of issues.
#[derive(Debug, Clone, Default)]
pub struct IssueSet {
    issues: Vec<Issue>,
    num_errors: usize,
    num_warnings: usize,
}

impl IssueSet {
    /// Creates a new, empty issue set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given issue to the issue set.
    pub fn add(&mut self, issue: Issue) {
        match issue.severity() {
            Severity::Error => self.num_errors += 1,
            Severity::Warning => self.num_warnings += 1,
            Severity::Info => (),
        };
        self.issues.push(issue);
    }

    /// Returns an iterator over all issues in the set.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    /// The number of issues in this issue set.
    #[inline]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns `true` if this issue set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns `true` if this issue set contains an error.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.num_errors > 0
    }

    /// The number of errors in this issue set.
    #[inline]
    pub fn num_errors(&self) -> usize {
        self.num_errors
    }

    /// The number of warnings in this issue set.
    #[inline]
    pub fn num_warnings(&self) -> usize {
        self.num_warnings
    }
}

/// Validates a design.
///
/// If `chip` is given, pins are also checked against the chip outline.
pub fn validate(cells: &[Cell], nets: &[Net], chip: Option<Rect>) -> IssueSet {
    let mut issues = IssueSet::new();

    let mut cell_ids = HashSet::new();
    for cell in cells {
        if !cell_ids.insert(&cell.id) {
            issues.add(Issue::new_and_log(
                Cause::DuplicateCellId {
                    id: cell.id.clone(),
                },
                Severity::Error,
            ));
        }
    }

    let index = PinIndex::new(cells);
    for id in index.duplicates() {
        issues.add(Issue::new_and_log(
            Cause::DuplicatePinId { id: id.clone() },
            Severity::Error,
        ));
    }

    for net in nets {
        if net.is_trivial() {
            issues.add(Issue::new_and_log(
                Cause::TrivialNet {
                    net: net.id.clone(),
                },
                Severity::Info,
            ));
        }
        for (pin, position) in index.resolve(net) {
            match position {
                None if index.is_overflowed(pin) => issues.add(Issue::new_and_log(
                    Cause::PinPositionOverflow { pin: pin.clone() },
                    Severity::Error,
                )),
                None => issues.add(Issue::new_and_log(
                    Cause::DanglingPin {
                        net: net.id.clone(),
                        pin: pin.clone(),
                    },
                    Severity::Error,
                )),
                Some(position) if chip.is_some_and(|chip| !chip.contains(position)) => issues
                    .add(Issue::new_and_log(
                        Cause::PinOutsideChip {
                            pin: pin.clone(),
                            position,
                        },
                        Severity::Warning,
                    )),
                Some(_) => (),
            }
        }
    }

    issues
}
