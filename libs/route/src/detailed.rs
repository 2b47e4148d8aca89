//! The net loop shared by the grid-based detailed routers.

use arcstr::ArcStr;
use design::{Cell, Net, PinIndex, Wire, DEFAULT_WIRE_WIDTH};
use geometry::prelude::Point;
use tracing::{debug, warn};

use crate::grid::{GridCoord, NetId, RoutingGrid, RoutingState};
use crate::search::Path;
use crate::Routed;

/// The layer on which pins are accessed.
pub const PIN_LAYER: usize = 0;

/// A strategy for connecting two points of a net on a shared grid.
pub trait PathFinder {
    /// Finds a path from `src` to `dst` using points available to `net`.
    fn find_path(
        &self,
        state: &RoutingState,
        net: NetId,
        src: GridCoord,
        dst: GridCoord,
    ) -> Option<Path>;
}

/// The wiring of a single net, committed only if every connection succeeds.
#[derive(Debug, Default)]
struct NetRoute {
    wires: Vec<Wire>,
    wirelength: i64,
    vias: usize,
}

/// Routes `nets` in order on a fresh grid, decomposing each net into a star
/// from its first pin.
///
/// Points used by a routed net block all later nets. If any connection of a
/// net fails, the net is reported unrouted and all of its marks are released.
pub fn route<P: PathFinder>(
    finder: &P,
    grid: RoutingGrid,
    cells: &[Cell],
    nets: &[Net],
) -> Routed {
    let index = PinIndex::new(cells);
    let mut state = RoutingState::new(grid);
    let mut routed = Routed::default();

    for (id, net) in nets.iter().enumerate() {
        if net.is_trivial() {
            debug!(net = %net.id, "skipping net with fewer than two pins");
            continue;
        }
        let Some(terminals) = quantize_pins(&index, state.grid(), net) else {
            routed.unrouted_nets.push(net.id.clone());
            continue;
        };
        match route_net(finder, &mut state, id, net, &terminals) {
            Some(route) => {
                debug!(
                    net = %net.id,
                    wires = route.wires.len(),
                    wirelength = route.wirelength,
                    vias = route.vias,
                    "routed net"
                );
                routed.total_wirelength += route.wirelength;
                routed.via_count += route.vias;
                routed.wires.extend(route.wires);
            }
            None => {
                warn!(net = %net.id, "failed to route net");
                routed.unrouted_nets.push(net.id.clone());
            }
        }
    }

    routed
}

/// Resolves every pin of `net` to a grid point on the pin layer.
fn quantize_pins(index: &PinIndex, grid: &RoutingGrid, net: &Net) -> Option<Vec<GridCoord>> {
    index
        .resolve(net)
        .map(|(pin, position)| {
            let coord = position.and_then(|p| grid.quantize(p, PIN_LAYER));
            if coord.is_none() {
                warn!(net = %net.id, %pin, ?position, "pin is dangling or outside the chip");
            }
            coord
        })
        .collect()
}

fn route_net<P: PathFinder>(
    finder: &P,
    state: &mut RoutingState,
    id: NetId,
    net: &Net,
    terminals: &[GridCoord],
) -> Option<NetRoute> {
    let (&src, sinks) = terminals.split_first()?;
    let mut journal = Vec::new();
    let mut route = NetRoute::default();

    for &dst in sinks {
        let Some(path) = finder.find_path(state, id, src, dst) else {
            state.release(journal);
            return None;
        };
        for &coord in &path {
            if state.mark(coord, id) {
                journal.push(coord);
            }
        }
        route.vias += path.windows(2).filter(|w| w[0].layer != w[1].layer).count();
        for (layer, points) in runs(state.grid(), &path) {
            let wire = Wire {
                id: wire_id(&net.id, route.wires.len()),
                net_id: net.id.clone(),
                points,
                layer,
                width: DEFAULT_WIRE_WIDTH,
            };
            route.wirelength += wire.length();
            route.wires.push(wire);
        }
    }

    Some(route)
}

fn wire_id(net: &ArcStr, n: usize) -> ArcStr {
    arcstr::format!("{net}_w{n}")
}

/// Splits a path into same-layer polylines, dropping single-point runs.
fn runs<'a>(
    grid: &'a RoutingGrid,
    path: &'a Path,
) -> impl Iterator<Item = (usize, Vec<Point>)> + 'a {
    path.chunk_by(|a, b| a.layer == b.layer)
        .filter(|run| run.len() >= 2)
        .map(|run| {
            let layer = run[0].layer;
            (layer, simplify(run.iter().map(|c| grid.point(*c))))
        })
}

/// Collapses collinear interior vertices of a Manhattan polyline.
pub(crate) fn simplify(points: impl IntoIterator<Item = Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::new();
    for p in points {
        if let [.., a, b] = out[..] {
            if a.is_collinear(b, p) {
                if let Some(last) = out.last_mut() {
                    *last = p;
                }
                continue;
            }
        }
        out.push(p);
    }
    out
}
