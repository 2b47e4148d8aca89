//! And-inverter graphs.
//!
//! An [`Aig`] is an arena of nodes indexed by [`NodeId`]. Node 0 is the
//! constant `false`; `true` is its inversion. Every other node is a primary
//! input, an n-ary AND of literals, or a primary output with one fanin.
//! Nodes only reference nodes with smaller indices, so the arena is always
//! in topological order.

use std::ops::Not;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::network::{GateKind, Network, Operand};

/// An index into an [`Aig`].
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// A possibly inverted reference to a node.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Lit {
    /// The referenced node.
    pub node: NodeId,
    /// Whether the reference is inverted.
    pub inverted: bool,
}

impl Lit {
    /// The constant `false`.
    pub const FALSE: Lit = Lit {
        node: NodeId(0),
        inverted: false,
    };
    /// The constant `true`.
    pub const TRUE: Lit = Lit {
        node: NodeId(0),
        inverted: true,
    };

    /// A non-inverted reference to `node`.
    pub const fn positive(node: NodeId) -> Self {
        Self {
            node,
            inverted: false,
        }
    }

    /// The literal for a constant bit.
    pub const fn constant(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    /// The value of this literal, if it references the constant node.
    pub const fn const_value(&self) -> Option<bool> {
        if self.node.0 == 0 {
            Some(self.inverted)
        } else {
            None
        }
    }

    /// Inverts this literal if `invert` is `true`.
    pub fn invert_if(self, invert: bool) -> Self {
        Self {
            node: self.node,
            inverted: self.inverted ^ invert,
        }
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Self::Output {
        self.invert_if(true)
    }
}

/// The kind of an AIG node.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// The constant `false`.
    Constant,
    /// A primary input.
    Input(ArcStr),
    /// The conjunction of the node's fanins.
    And,
    /// A primary output driven by the node's single fanin.
    Output(ArcStr),
}

/// A node in an [`Aig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AigNode {
    /// The index of this node.
    pub id: NodeId,
    /// The kind of this node.
    pub kind: NodeKind,
    /// The fanins of this node; each carries its own inversion flag.
    pub fanins: Vec<Lit>,
    /// The logic depth of this node.
    pub level: usize,
    /// Whether the AND tree behind this node is balanced.
    ///
    /// An n-input AND is realized as a chain of `n - 1` two-input gates
    /// unless balanced, in which case its depth is `ceil(log2(n))`.
    pub balanced: bool,
}

impl AigNode {
    /// Returns `true` if this node is an AND gate.
    #[inline]
    pub fn is_and(&self) -> bool {
        self.kind == NodeKind::And
    }

    /// The number of two-input gate levels this node adds.
    pub fn depth(&self) -> usize {
        match self.kind {
            NodeKind::And => and_depth(self.fanins.len(), self.balanced),
            NodeKind::Output(_) => 1,
            NodeKind::Constant | NodeKind::Input(_) => 0,
        }
    }
}

/// The depth of an n-input AND, as a chain or as a balanced tree.
pub fn and_depth(n: usize, balanced: bool) -> usize {
    if balanced && n > 3 {
        n.next_power_of_two().trailing_zeros() as usize
    } else {
        n.saturating_sub(1).max(1)
    }
}

/// An and-inverter graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Aig {
    nodes: Vec<AigNode>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
}

impl Default for Aig {
    fn default() -> Self {
        Self::new()
    }
}

impl Aig {
    /// Creates an AIG containing only the constant node.
    pub fn new() -> Self {
        Self {
            nodes: vec![AigNode {
                id: NodeId(0),
                kind: NodeKind::Constant,
                fanins: Vec::new(),
                level: 0,
                balanced: false,
            }],
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    fn push(&mut self, kind: NodeKind, fanins: Vec<Lit>, balanced: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = AigNode {
            id,
            kind,
            fanins,
            level: 0,
            balanced,
        };
        node.level = self.level_of(&node);
        self.nodes.push(node);
        id
    }

    /// Adds a primary input.
    pub fn add_input(&mut self, name: impl Into<ArcStr>) -> Lit {
        let id = self.push(NodeKind::Input(name.into()), Vec::new(), false);
        self.inputs.push(id);
        Lit::positive(id)
    }

    /// Adds an AND of the given literals.
    ///
    /// No simplification is performed.
    pub fn add_and(&mut self, fanins: Vec<Lit>) -> Lit {
        self.add_and_with(fanins, false)
    }

    pub(crate) fn add_and_with(&mut self, fanins: Vec<Lit>, balanced: bool) -> Lit {
        debug_assert!(fanins.iter().all(|f| f.node.0 < self.nodes.len()));
        Lit::positive(self.push(NodeKind::And, fanins, balanced))
    }

    /// Adds a primary output driven by `lit`.
    pub fn add_output(&mut self, name: impl Into<ArcStr>, lit: Lit) -> NodeId {
        let id = self.push(NodeKind::Output(name.into()), vec![lit], false);
        self.outputs.push(id);
        id
    }

    /// Builds an AIG equivalent to a gate network.
    ///
    /// OR, NAND, NOR, NOT and XOR are rewritten with ANDs and inversions;
    /// no structural hashing is done, so every primitive yields fresh nodes.
    pub fn from_network(network: &Network) -> Self {
        let mut aig = Self::new();
        let mut signals = std::collections::HashMap::new();
        for input in network.inputs() {
            signals.insert(input.clone(), aig.add_input(input.clone()));
        }

        for gate in network.topological() {
            let lits: Vec<Lit> = gate
                .inputs
                .iter()
                .map(|op| match op {
                    Operand::Signal(name) => signals.get(name).copied().unwrap_or(Lit::FALSE),
                    Operand::Const { value, .. } => Lit::constant(*value),
                })
                .collect();
            let out = match gate.kind {
                GateKind::And => aig.add_and(lits),
                GateKind::Nand => !aig.add_and(lits),
                GateKind::Or => !aig.add_and(lits.into_iter().map(Not::not).collect()),
                GateKind::Nor => aig.add_and(lits.into_iter().map(Not::not).collect()),
                GateKind::Not => !lits[0],
                GateKind::Xor => {
                    let mut lits = lits.into_iter();
                    let first = lits.next().unwrap_or(Lit::FALSE);
                    lits.fold(first, |acc, lit| aig.xor(acc, lit))
                }
            };
            signals.insert(gate.output.clone(), out);
        }

        for output in network.outputs() {
            let lit = signals.get(output).copied().unwrap_or(Lit::FALSE);
            aig.add_output(output.clone(), lit);
        }
        aig
    }

    fn xor(&mut self, a: Lit, b: Lit) -> Lit {
        let x = self.add_and(vec![a, !b]);
        let y = self.add_and(vec![!a, b]);
        !self.add_and(vec![!x, !y])
    }

    /// Returns a reference to the node with the given ID.
    #[inline]
    pub fn node(&self, id: NodeId) -> &AigNode {
        &self.nodes[id.0]
    }

    /// All nodes, in topological order.
    pub fn nodes(&self) -> &[AigNode] {
        &self.nodes
    }

    /// The primary inputs.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// The primary outputs.
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// The AND nodes, in topological order.
    pub fn ands(&self) -> impl Iterator<Item = &AigNode> {
        self.nodes.iter().filter(|n| n.is_and())
    }

    /// The number of AND nodes.
    pub fn and_count(&self) -> usize {
        self.ands().count()
    }

    /// The largest level of any AND node, or 0 if there are none.
    pub fn max_level(&self) -> usize {
        self.ands().map(|n| n.level).max().unwrap_or(0)
    }

    fn level_of(&self, node: &AigNode) -> usize {
        let base = node
            .fanins
            .iter()
            .map(|f| self.nodes[f.node.0].level)
            .max()
            .unwrap_or(0);
        base + node.depth()
    }

    /// Recomputes every node's level from its fanins.
    pub fn compute_levels(&mut self) {
        for i in 0..self.nodes.len() {
            let level = self.level_of(&self.nodes[i]);
            self.nodes[i].level = level;
        }
    }

    /// Replaces the fanins of an AND node.
    pub(crate) fn set_fanins(&mut self, id: NodeId, fanins: Vec<Lit>) {
        self.nodes[id.0].fanins = fanins;
    }

    /// Marks an AND node as balanced.
    pub(crate) fn set_balanced(&mut self, id: NodeId) {
        self.nodes[id.0].balanced = true;
    }

    /// Rebuilds the graph, redirecting nodes and dropping unreachable ones.
    ///
    /// `replacements[i]`, if set, is a literal equivalent to node `i` that
    /// refers to a node with a smaller index. References to node `i` are
    /// redirected to it. Inputs and outputs are always kept; AND nodes are
    /// kept only if an output depends on them.
    pub fn rebuild(&self, replacements: &[Option<Lit>]) -> Aig {
        let resolve = |mut lit: Lit| {
            while let Some(r) = replacements.get(lit.node.0).copied().flatten() {
                lit = r.invert_if(lit.inverted);
            }
            lit
        };

        let mut live = vec![false; self.nodes.len()];
        for &out in &self.outputs {
            live[out.0] = true;
        }
        for i in (0..self.nodes.len()).rev() {
            let node = &self.nodes[i];
            if !live[i] || !(node.is_and() || matches!(node.kind, NodeKind::Output(_))) {
                continue;
            }
            for &f in &node.fanins {
                live[resolve(f).node.0] = true;
            }
        }

        let mut out = Aig::new();
        let mut map: Vec<Option<Lit>> = vec![None; self.nodes.len()];
        map[0] = Some(Lit::FALSE);
        let translate = |map: &[Option<Lit>], lit: Lit| {
            let lit = resolve(lit);
            map[lit.node.0]
                .unwrap_or(Lit::FALSE)
                .invert_if(lit.inverted)
        };
        for node in &self.nodes {
            match &node.kind {
                NodeKind::Constant => {}
                NodeKind::Input(name) => {
                    map[node.id.0] = Some(out.add_input(name.clone()));
                }
                NodeKind::And => {
                    if live[node.id.0] && replacements.get(node.id.0).copied().flatten().is_none() {
                        let fanins = node.fanins.iter().map(|&f| translate(&map, f)).collect();
                        map[node.id.0] = Some(out.add_and_with(fanins, node.balanced));
                    }
                }
                NodeKind::Output(name) => {
                    let lit = node.fanins.first().map_or(Lit::FALSE, |&f| translate(&map, f));
                    out.add_output(name.clone(), lit);
                }
            }
        }
        out
    }
}
