//! Candidate solutions and Pareto pruning.

use serde::{Deserialize, Serialize};

/// A buffer placed at a tree node.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// The index of the tree node.
    pub node: usize,
    /// The index of the buffer type in the library.
    pub buffer: usize,
}

/// One way of buffering the subtree below a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// The worst delay from this node to any sink.
    pub delay: f64,
    /// The capacitance seen looking into this node.
    pub capacitance: f64,
    /// The total power of the buffers in the subtree.
    pub power: f64,
    /// The buffers inserted in the subtree.
    pub buffers: Vec<Placement>,
}

impl Candidate {
    /// An unbuffered sink presenting `capacitance`.
    pub fn sink(capacitance: f64) -> Self {
        Self {
            delay: 0.,
            capacitance,
            power: 0.,
            buffers: Vec::new(),
        }
    }

    /// Returns `true` if `self` is no worse than `other` in every metric
    /// and strictly better in at least one.
    pub fn dominates(&self, other: &Self) -> bool {
        self.delay <= other.delay
            && self.capacitance <= other.capacitance
            && self.power <= other.power
            && (self.delay < other.delay
                || self.capacitance < other.capacitance
                || self.power < other.power)
    }

    /// Returns `true` if `self` and `other` have identical metrics.
    pub fn same_metrics(&self, other: &Self) -> bool {
        self.delay == other.delay
            && self.capacitance == other.capacitance
            && self.power == other.power
    }

    /// Propagates this candidate up a wire with total resistance `r` and
    /// total capacitance `c`, using the Elmore delay `r * (c + C_load)`.
    pub fn through_wire(&self, r: f64, c: f64) -> Self {
        Self {
            delay: self.delay + r * (c + self.capacitance),
            capacitance: self.capacitance + c,
            power: self.power,
            buffers: self.buffers.clone(),
        }
    }

    /// Joins the candidates of two sibling subtrees.
    pub fn join(&self, other: &Self) -> Self {
        Self {
            delay: self.delay.max(other.delay),
            capacitance: self.capacitance + other.capacitance,
            power: self.power + other.power,
            buffers: self
                .buffers
                .iter()
                .chain(&other.buffers)
                .copied()
                .collect(),
        }
    }

    /// Drives this candidate with a buffer placed at `node`.
    pub fn buffered(
        &self,
        placement: Placement,
        delay: f64,
        input_capacitance: f64,
        power: f64,
    ) -> Self {
        let mut buffers = self.buffers.clone();
        buffers.push(placement);
        Self {
            delay: self.delay + delay,
            capacitance: input_capacitance,
            power: self.power + power,
            buffers,
        }
    }

    /// Orders candidates for selection at the root: lower delay first,
    /// then lower power, then lower capacitance.
    pub fn selection_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.delay
            .total_cmp(&other.delay)
            .then(self.power.total_cmp(&other.power))
            .then(self.capacitance.total_cmp(&other.capacitance))
    }
}

/// Removes dominated candidates and collapses candidates with identical metrics.
///
/// The relative order of the surviving candidates is preserved; among
/// candidates with identical metrics, the first is kept.
pub fn prune(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let keep: Vec<bool> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            !candidates
                .iter()
                .enumerate()
                .any(|(j, other)| other.dominates(c) || (j < i && other.same_metrics(c)))
        })
        .collect();
    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(c, keep)| keep.then_some(c))
        .collect()
}

/// Returns `true` if no candidate in `set` dominates another.
pub fn is_pareto(set: &[Candidate]) -> bool {
    set.iter()
        .all(|a| set.iter().all(|b| !a.dominates(b)))
}
