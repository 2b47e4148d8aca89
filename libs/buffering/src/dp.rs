//! The bottom-up buffer insertion dynamic program.

use tracing::trace;

use crate::library::BufferType;
use crate::solution::{prune, Candidate, Placement};
use crate::tree::{BufferTree, ROOT};

/// Per-unit-length wire parasitics.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WireModel {
    /// Resistance per unit length.
    pub resistance: f64,
    /// Capacitance per unit length.
    pub capacitance: f64,
}

/// Computes the Pareto-optimal candidates at the root of `tree`.
///
/// Leaves start with a single unbuffered candidate presenting their load.
/// At every other node, each child's candidates are carried up the
/// connecting wire, siblings are combined by cross product, and the node's
/// own load is added. Every candidate whose capacitance is at most
/// `max_capacitance` is then also offered with each buffer type driving it.
/// The candidate set is pruned after each step.
pub fn solve(
    tree: &BufferTree,
    library: &[BufferType],
    wire: WireModel,
    max_capacitance: f64,
) -> Vec<Candidate> {
    let mut sets: Vec<Vec<Candidate>> = vec![Vec::new(); tree.len()];

    for node in tree.nodes().iter().rev() {
        if node.is_leaf() {
            sets[node.id] = vec![Candidate::sink(node.load_capacitance)];
            continue;
        }

        let mut merged = vec![Candidate::sink(0.)];
        for &child in &node.children {
            let length = tree.edge_length(node.id, child) as f64;
            let r = wire.resistance * length;
            let c = wire.capacitance * length;
            let upstream: Vec<Candidate> = std::mem::take(&mut sets[child])
                .iter()
                .map(|cand| cand.through_wire(r, c))
                .collect();
            merged = prune(
                merged
                    .iter()
                    .flat_map(|a| upstream.iter().map(move |b| a.join(b)))
                    .collect(),
            );
        }
        for cand in &mut merged {
            cand.capacitance += node.load_capacitance;
        }

        let buffered: Vec<Candidate> = merged
            .iter()
            .filter(|cand| cand.capacitance <= max_capacitance)
            .flat_map(|cand| {
                library.iter().enumerate().map(move |(buffer, ty)| {
                    cand.buffered(
                        Placement {
                            node: node.id,
                            buffer,
                        },
                        ty.delay,
                        ty.input_capacitance,
                        ty.power,
                    )
                })
            })
            .collect();
        merged.extend(buffered);
        sets[node.id] = prune(merged);
        trace!(
            node = node.id,
            candidates = sets[node.id].len(),
            "computed candidates"
        );
    }

    std::mem::take(&mut sets[ROOT])
}

/// Picks the candidate with the least delay, breaking ties by lower power,
/// then lower capacitance, then position in `candidates`.
pub fn select(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates
        .iter()
        .reduce(|best, c| if c.selection_cmp(best).is_lt() { c } else { best })
}
