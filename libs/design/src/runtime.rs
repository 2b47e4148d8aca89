//! Wall-clock timing of solver invocations.

use std::time::{Duration, Instant};

/// The smallest runtime ever reported.
///
/// Consumers compare runtimes across invocations and treat zero as "not run".
pub const MIN_RUNTIME: Duration = Duration::from_nanos(1);

/// The time elapsed since `start`, never less than [`MIN_RUNTIME`].
#[inline]
pub fn elapsed(start: Instant) -> Duration {
    start.elapsed().max(MIN_RUNTIME)
}
