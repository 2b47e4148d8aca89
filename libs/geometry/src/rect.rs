//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    /// The lower-left corner.
    p0: Point,
    /// The upper-right corner.
    p1: Point,
}

impl Rect {
    /// Creates a rectangle with the given corners.
    ///
    /// The corners are reordered if necessary, so any two opposite corners may be given.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            p0: Point::new(a.x.min(b.x), a.y.min(b.y)),
            p1: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Creates a rectangle from all 4 sides (left, bottom, right, top).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(15, 20, 30, 40);
    /// assert_eq!(rect.left(), 15);
    /// assert_eq!(rect.top(), 40);
    /// ```
    pub fn from_sides(left: i64, bot: i64, right: i64, top: i64) -> Self {
        Self::new(Point::new(left, bot), Point::new(right, top))
    }

    /// Creates a rectangle spanning `[0, width] x [0, height]`.
    pub fn from_extent(width: i64, height: i64) -> Self {
        Self::new(Point::zero(), Point::new(width, height))
    }

    /// The left edge coordinate.
    #[inline]
    pub const fn left(&self) -> i64 {
        self.p0.x
    }

    /// The bottom edge coordinate.
    #[inline]
    pub const fn bot(&self) -> i64 {
        self.p0.y
    }

    /// The right edge coordinate.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.p1.x
    }

    /// The top edge coordinate.
    #[inline]
    pub const fn top(&self) -> i64 {
        self.p1.y
    }

    /// The width of the rectangle.
    #[inline]
    pub const fn width(&self) -> i64 {
        self.p1.x - self.p0.x
    }

    /// The height of the rectangle.
    #[inline]
    pub const fn height(&self) -> i64 {
        self.p1.y - self.p0.y
    }

    /// Returns `true` if `p` lies inside or on the boundary of the rectangle.
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.p0.x && p.x <= self.p1.x && p.y >= self.p0.y && p.y <= self.p1.y
    }

    /// Moves `p` to the closest point inside the rectangle.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_extent(100, 50);
    /// assert_eq!(rect.clamp_point(Point::new(120, -5)), Point::new(100, 0));
    /// ```
    pub fn clamp_point(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.p0.x, self.p1.x),
            p.y.clamp(self.p0.y, self.p1.y),
        )
    }
}
