//! Buffer insertion error types.

use arcstr::ArcStr;

use crate::BufferingResult;

/// A result type returning buffer insertion errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for buffer insertion.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// None of the net's pins could be found among the cells.
    #[error("no resolvable pins for net `{0}`")]
    NoPinsForNet(ArcStr),
    /// A buffering parameter was out of range.
    #[error("invalid buffering parameter `{name}`: {reason}")]
    InvalidParameter {
        /// The name of the parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// A failed buffer insertion, with the well-formed result returned alongside.
///
/// The result has `success = false`, no buffers and zero delay, but still
/// reports the elapsed runtime.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("buffer insertion failed")]
pub struct Failure {
    /// The underlying error.
    #[source]
    pub error: Error,
    /// The result reported for the failed call.
    pub result: BufferingResult,
}
