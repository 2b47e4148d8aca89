//! 2-D integer geometry used by the routing and buffering solvers.
//!
//! # Examples
//!
//! Measure the Manhattan distance between two [points](crate::point::Point):
//!
//! ```
//! # use geometry::prelude::*;
//! let a = Point::new(10, 20);
//! let b = Point::new(30, 5);
//! assert_eq!(a.manhattan(b), 35);
//! ```
#![warn(missing_docs)]

extern crate self as geometry;

pub mod dir;
pub mod point;
pub mod prelude;
pub mod rect;
pub mod snap;
