//! Buffer cell libraries.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

/// A buffer cell that may be inserted into a net.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferType {
    /// The cell name.
    pub name: ArcStr,
    /// The intrinsic delay of the buffer.
    pub delay: f64,
    /// The capacitance presented at the buffer input.
    pub input_capacitance: f64,
    /// The power consumed by one instance.
    pub power: f64,
}

impl BufferType {
    /// Creates a new buffer type.
    pub fn new(name: impl Into<ArcStr>, delay: f64, input_capacitance: f64, power: f64) -> Self {
        Self {
            name: name.into(),
            delay,
            input_capacitance,
            power,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        [self.delay, self.input_capacitance, self.power]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.)
    }
}

/// The library used when no buffer types are supplied.
///
/// Ordered from the fastest and largest cell to the slowest and smallest.
pub fn default_library() -> Vec<BufferType> {
    vec![
        BufferType::new("BUF_X4", 10., 4.0, 3.0),
        BufferType::new("BUF_X2", 15., 2.0, 1.5),
        BufferType::new("BUF_X1", 25., 1.0, 0.8),
    ]
}
