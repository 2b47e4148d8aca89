//! Synthesis error types.

use arcstr::ArcStr;

use crate::parser::ParseError;

/// A result type returning synthesis errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for synthesis functions.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The algorithm tag did not name a known synthesis flow.
    #[error("Unsupported synthesis algorithm: {0}")]
    UnsupportedAlgorithm(ArcStr),
    /// The netlist could not be parsed.
    #[error("error parsing netlist: {0}")]
    Parse(#[from] ParseError),
    /// A synthesis parameter was out of range.
    #[error("invalid synthesis parameter `{name}`: {reason}")]
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
