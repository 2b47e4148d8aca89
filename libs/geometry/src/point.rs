//! 2-D points.

use serde::{Deserialize, Serialize};

use crate::dir::Dir;

/// A point in two-dimensional space.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Point {
    /// The x-coordinate of the point.
    pub x: i64,
    /// The y-coordinate of the point.
    pub y: i64,
}

impl Point {
    /// Creates a new [`Point`] from (x,y) coordinates.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, `(0, 0)`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let origin = Point::zero();
    /// assert_eq!(origin, Point::new(0, 0));
    /// ```
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Gets the coordinate associated with direction `dir`.
    pub const fn coord(&self, dir: Dir) -> i64 {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }

    /// The Manhattan (L1) distance between `self` and `other`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Point::new(-2, 3).manhattan(Point::new(4, -1)), 10);
    /// ```
    #[inline]
    pub const fn manhattan(&self, other: Point) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Returns `true` if `self`, `a` and `b` lie on one horizontal or vertical line.
    pub const fn is_collinear(&self, a: Point, b: Point) -> bool {
        (self.x == a.x && a.x == b.x) || (self.y == a.y && a.y == b.y)
    }

    /// Adds `other` to `self`, returning [`None`] on overflow.
    pub fn checked_add(&self, other: Point) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(other.x)?,
            self.y.checked_add(other.y)?,
        ))
    }

    /// The Manhattan distance between `self` and `other`, or [`None`] if it
    /// does not fit in an `i64`.
    pub fn checked_manhattan(&self, other: Point) -> Option<i64> {
        let dx = self.x.checked_sub(other.x)?.checked_abs()?;
        let dy = self.y.checked_sub(other.y)?.checked_abs()?;
        dx.checked_add(dy)
    }
}

impl std::ops::Add<Point> for Point {
    type Output = Self;
    fn add(self, rhs: Point) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign<Point> for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub<Point> for Point {
    type Output = Self;
    fn sub(self, rhs: Point) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign<Point> for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl From<(i64, i64)> for Point {
    fn from(value: (i64, i64)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_points() {
        let p = Point::new(0, 0);
        assert!(p.is_collinear(Point::new(0, 5), Point::new(0, 10)));
        assert!(p.is_collinear(Point::new(3, 0), Point::new(-7, 0)));
        assert!(!p.is_collinear(Point::new(3, 0), Point::new(3, 4)));
    }

    #[test]
    fn point_arithmetic() {
        let mut p = Point::new(5, 7) + Point::new(1, -2);
        assert_eq!(p, Point::new(6, 5));
        p -= Point::new(6, 5);
        assert_eq!(p, Point::zero());
        assert_eq!(Point::from((4, 2)).coord(Dir::Vert), 2);
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let far = Point::new(i64::MAX, 0);
        assert_eq!(far.checked_add(Point::new(1, 0)), None);
        assert_eq!(
            far.checked_add(Point::new(-1, 3)),
            Some(Point::new(i64::MAX - 1, 3))
        );
        assert_eq!(
            Point::new(-2, 3).checked_manhattan(Point::new(4, -1)),
            Some(10)
        );
        assert_eq!(far.checked_manhattan(Point::new(-1, 0)), None);
        assert_eq!(Point::new(i64::MIN, 0).checked_manhattan(Point::zero()), None);
    }
}
