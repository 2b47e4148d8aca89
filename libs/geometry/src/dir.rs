//! Axis-aligned directions and compass headings.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An enumeration of axis-aligned directions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum Dir {
    /// The horizontal, or x-aligned, direction.
    Horiz,
    /// The vertical, or y-aligned, direction.
    Vert,
}

impl Dir {
    /// Returns the other direction.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Dir::Vert.other(), Dir::Horiz);
    /// assert_eq!(Dir::Horiz.other(), Dir::Vert);
    /// ```
    pub const fn other(&self) -> Self {
        match *self {
            Self::Horiz => Self::Vert,
            Self::Vert => Self::Horiz,
        }
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Horiz => write!(f, "horizontal"),
            Self::Vert => write!(f, "vertical"),
        }
    }
}

impl std::ops::Not for Dir {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.other()
    }
}

/// One of the four planar compass headings.
///
/// Headings are ordered east, west, north, south; neighbour enumeration
/// relies on this order being stable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Heading {
    /// Increasing x.
    East,
    /// Decreasing x.
    West,
    /// Increasing y.
    North,
    /// Decreasing y.
    South,
}

impl Heading {
    /// All headings, in neighbour enumeration order.
    pub const ALL: [Heading; 4] = [Self::East, Self::West, Self::North, Self::South];

    /// The axis this heading travels along.
    pub const fn dir(&self) -> Dir {
        match *self {
            Self::East | Self::West => Dir::Horiz,
            Self::North | Self::South => Dir::Vert,
        }
    }

    /// The unit step `(dx, dy)` of this heading.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Heading::South.delta(), (0, -1));
    /// ```
    pub const fn delta(&self) -> (i64, i64) {
        match *self {
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::North => (0, 1),
            Self::South => (0, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_axes() {
        for h in Heading::ALL {
            let (dx, dy) = h.delta();
            match h.dir() {
                Dir::Horiz => assert_eq!((dx.abs(), dy), (1, 0)),
                Dir::Vert => assert_eq!((dx, dy.abs()), (0, 1)),
            }
        }
        assert_eq!(!Dir::Horiz, Dir::Vert);
    }
}
