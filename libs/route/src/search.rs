//! Path search primitives shared by the detailed routers.
//!
//! Both searches run on a [`RoutingState`] for a single net: a point is
//! traversable if it is free or already owned by that net. Neither search
//! mutates the state; marking is left to the caller.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geometry::prelude::Heading;

use crate::grid::{GridCoord, NetId, RoutingState};

/// A sequence of adjacent grid points, from source to target.
pub type Path = Vec<GridCoord>;

/// The cost of a planar step between adjacent grid points.
const STEP_COST: f64 = 1.0;

/// A frontier entry.
///
/// Entries pop in order of increasing `key`, then increasing `tie`,
/// then insertion order.
#[derive(Debug, Clone, Copy)]
struct Entry {
    key: f64,
    tie: f64,
    seq: u64,
    g: f64,
    coord: GridCoord,
    parent: Option<GridCoord>,
    heading: Option<Heading>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed, since `BinaryHeap` is a max-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.tie.total_cmp(&self.tie))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A priority queue of grid points with deterministic tie-breaking.
#[derive(Debug, Default)]
struct Frontier {
    heap: BinaryHeap<Entry>,
    seq: u64,
}

impl Frontier {
    fn push(&mut self, mut entry: Entry) {
        entry.seq = self.seq;
        self.seq += 1;
        self.heap.push(entry);
    }

    fn pop(&mut self) -> Option<Entry> {
        self.heap.pop()
    }
}

/// Per-search bookkeeping indexed by flattened grid coordinate.
struct Scratch {
    best: Vec<f64>,
    parent: Vec<Option<GridCoord>>,
    closed: Vec<bool>,
}

impl Scratch {
    fn new(n: usize) -> Self {
        Self {
            best: vec![f64::INFINITY; n],
            parent: vec![None; n],
            closed: vec![false; n],
        }
    }

    fn backtrack(&self, state: &RoutingState, target: GridCoord) -> Path {
        let mut path = vec![target];
        let mut cur = target;
        while let Some(prev) = self.parent[state.grid().flat_index(cur)] {
            path.push(prev);
            cur = prev;
        }
        path.reverse();
        path
    }
}

fn endpoints_usable(state: &RoutingState, net: NetId, src: GridCoord, dst: GridCoord) -> bool {
    let grid = state.grid();
    grid.contains(src)
        && grid.contains(dst)
        && state.is_available_for_net(src, net)
        && state.is_available_for_net(dst, net)
}

/// Weighted wavefront expansion (Lee's algorithm).
///
/// Expands in order of accumulated cost: unit cost per planar step and
/// `via_weight` per layer change. Equal-cost points expand in the order
/// they were reached. Returns [`None`] if the frontier is exhausted
/// before reaching `dst`.
pub fn wavefront(
    state: &RoutingState,
    net: NetId,
    src: GridCoord,
    dst: GridCoord,
    via_weight: f64,
) -> Option<Path> {
    if !endpoints_usable(state, net, src, dst) {
        return None;
    }
    let grid = state.grid();
    let mut scratch = Scratch::new(grid.num_points());
    let mut frontier = Frontier::default();
    scratch.best[grid.flat_index(src)] = 0.;
    frontier.push(Entry {
        key: 0.,
        tie: 0.,
        seq: 0,
        g: 0.,
        coord: src,
        parent: None,
        heading: None,
    });

    while let Some(entry) = frontier.pop() {
        let idx = grid.flat_index(entry.coord);
        if scratch.closed[idx] {
            continue;
        }
        scratch.closed[idx] = true;
        scratch.parent[idx] = entry.parent;
        if entry.coord == dst {
            return Some(scratch.backtrack(state, dst));
        }

        for step in grid.neighbors(entry.coord) {
            let next = grid.flat_index(step.to);
            if scratch.closed[next] || !state.is_available_for_net(step.to, net) {
                continue;
            }
            let g = entry.g + if step.is_via() { via_weight } else { STEP_COST };
            if g < scratch.best[next] {
                scratch.best[next] = g;
                frontier.push(Entry {
                    key: g,
                    tie: 0.,
                    seq: 0,
                    g,
                    coord: step.to,
                    parent: Some(entry.coord),
                    heading: None,
                });
            }
        }
    }
    None
}

/// Cost weights for [`astar`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AStarWeights {
    /// The cost of a layer change.
    pub via: f64,
    /// The cost added when a planar step changes heading.
    pub bend: f64,
}

/// Heuristic best-first search.
///
/// Orders the frontier by `f = g + h`, where `g` accumulates unit planar
/// steps, vias and bend penalties, and `h` is the planar Manhattan distance
/// to `dst`. `h` ignores via and bend costs, so the returned path is not
/// guaranteed to be the cheapest. Ties break toward lower `h`, then
/// insertion order. A bend is a planar step whose heading differs from the
/// previous planar step; vias neither cause nor reset bends.
pub fn astar(
    state: &RoutingState,
    net: NetId,
    src: GridCoord,
    dst: GridCoord,
    weights: AStarWeights,
) -> Option<Path> {
    if !endpoints_usable(state, net, src, dst) {
        return None;
    }
    let grid = state.grid();
    let mut scratch = Scratch::new(grid.num_points());
    let mut frontier = Frontier::default();
    let h = |c: GridCoord| c.planar_distance(dst) as f64;

    scratch.best[grid.flat_index(src)] = 0.;
    frontier.push(Entry {
        key: h(src),
        tie: h(src),
        seq: 0,
        g: 0.,
        coord: src,
        parent: None,
        heading: None,
    });

    while let Some(entry) = frontier.pop() {
        let idx = grid.flat_index(entry.coord);
        if scratch.closed[idx] {
            continue;
        }
        scratch.closed[idx] = true;
        scratch.parent[idx] = entry.parent;
        if entry.coord == dst {
            return Some(scratch.backtrack(state, dst));
        }

        for step in grid.neighbors(entry.coord) {
            let next = grid.flat_index(step.to);
            if scratch.closed[next] || !state.is_available_for_net(step.to, net) {
                continue;
            }
            let (cost, heading) = match step.heading {
                None => (weights.via, entry.heading),
                Some(heading) => {
                    let bend = match entry.heading {
                        Some(prev) if prev != heading => weights.bend,
                        _ => 0.,
                    };
                    (STEP_COST + bend, Some(heading))
                }
            };
            let g = entry.g + cost;
            if g < scratch.best[next] {
                scratch.best[next] = g;
                let h = h(step.to);
                frontier.push(Entry {
                    key: g + h,
                    tie: h,
                    seq: 0,
                    g,
                    coord: step.to,
                    parent: Some(entry.coord),
                    heading,
                });
            }
        }
    }
    None
}
