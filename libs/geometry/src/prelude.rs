//! An import prelude that re-exports commonly used items.

pub use crate::dir::{Dir, Heading};
pub use crate::point::Point;
pub use crate::rect::Rect;
pub use crate::snap::{snap_to_grid, to_grid_index};
