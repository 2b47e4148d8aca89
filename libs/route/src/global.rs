//! Coarse global routing over a bin graph.
//!
//! Each net is approximated by a single L-shaped wire between the bins of its
//! first and last pins. There is no obstacle or capacity model, so runtime is
//! linear in the number of nets regardless of grid resolution.

use arcstr::ArcStr;
use design::{Cell, Net, PinIndex, Wire, DEFAULT_WIRE_WIDTH};
use geometry::prelude::*;
use tracing::{debug, warn};

use crate::grid::RoutingGrid;
use crate::Routed;

/// The width of a global routing wire.
pub const GLOBAL_WIRE_WIDTH: i64 = 2 * DEFAULT_WIRE_WIDTH;

/// The centre of the bin containing `p`, clamped to the chip.
///
/// Returns [`None`] if `p` lies outside the chip.
pub fn bin_center(grid: &RoutingGrid, p: Point) -> Option<Point> {
    let chip = grid.chip();
    if !chip.contains(p) {
        return None;
    }
    let pitch = grid.pitch();
    let center = |v: i64| (v.div_euclid(pitch) * pitch).saturating_add(pitch / 2);
    Some(chip.clamp_point(Point::new(center(p.x), center(p.y))))
}

/// Routes every net as a horizontal-then-vertical L between bin centres.
///
/// Only the first and last pins of a net are connected. Nets whose endpoints
/// are dangling or off-chip are reported unrouted.
pub fn route(grid: &RoutingGrid, cells: &[Cell], nets: &[Net]) -> Routed {
    let index = PinIndex::new(cells);
    let mut routed = Routed::default();

    for net in nets {
        if net.is_trivial() {
            continue;
        }
        let endpoint = |pin: Option<&ArcStr>| {
            pin.and_then(|id| index.position(id))
                .and_then(|p| bin_center(grid, p))
        };
        let (Some(src), Some(dst)) = (endpoint(net.pins.first()), endpoint(net.pins.last())) else {
            warn!(net = %net.id, "net endpoint is dangling or outside the chip");
            routed.unrouted_nets.push(net.id.clone());
            continue;
        };

        let wire = Wire {
            id: arcstr::format!("{}_g", net.id),
            net_id: net.id.clone(),
            points: vec![src, Point::new(dst.x, src.y), dst],
            layer: 0,
            width: GLOBAL_WIRE_WIDTH,
        };
        debug!(net = %net.id, from = %src, to = %dst, "global route");
        routed.total_wirelength += wire.length();
        routed.wires.push(wire);
    }

    routed
}
