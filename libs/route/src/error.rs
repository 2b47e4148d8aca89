//! Routing error types.

use arcstr::ArcStr;

/// A result type returning routing errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for routing functions.
///
/// Nets that cannot be connected are not errors; they are reported
/// in [`RoutingResult::unrouted_nets`](crate::RoutingResult::unrouted_nets).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The algorithm tag did not name a known router.
    #[error("Unsupported routing algorithm: {0}")]
    UnsupportedAlgorithm(ArcStr),
    /// A routing parameter was out of range.
    #[error("invalid routing parameter `{name}`: {reason}")]
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
