//! Snapping utilities (eg. snap to a grid).

/// Snaps `pos` to the nearest multiple of `grid`.
///
/// Exact half-pitch positions round down. Results saturate at the bounds of `i64`.
pub const fn snap_to_grid(pos: i64, grid: i64) -> i64 {
    assert!(grid > 0);

    let rem = pos.rem_euclid(grid);
    if rem <= grid / 2 {
        pos.saturating_sub(rem)
    } else {
        pos.saturating_add(grid - rem)
    }
}

/// Converts `pos` to the index of the nearest grid line in `[0, extent]`.
///
/// Grid lines sit at multiples of `grid`. The last line is the largest multiple
/// not exceeding `extent`; positions past it (but within `extent`) snap onto it,
/// so the boundary cell absorbs any remainder.
/// Returns [`None`] if `pos` lies outside `[0, extent]`.
///
/// # Example
///
/// ```
/// # use geometry::prelude::*;
/// assert_eq!(to_grid_index(14, 10, 95), Some(1));
/// assert_eq!(to_grid_index(94, 10, 95), Some(9));
/// assert_eq!(to_grid_index(96, 10, 95), None);
/// ```
pub const fn to_grid_index(pos: i64, grid: i64, extent: i64) -> Option<usize> {
    assert!(grid > 0);
    if pos < 0 || pos > extent {
        return None;
    }
    let last = extent / grid;
    let idx = snap_to_grid(pos, grid) / grid;
    if idx > last {
        Some(last as usize)
    } else {
        Some(idx as usize)
    }
}
