//! RC trees for buffer insertion.
//!
//! A [`BufferTree`] is an arena of [`TreeNode`]s rooted at the driving pin.
//! Children always have larger indices than their parents, so iterating
//! nodes in reverse index order visits every subtree before its root.

use arcstr::ArcStr;
use geometry::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The index of the root node.
pub const ROOT: usize = 0;

/// The largest number of nodes a [`BufferTree`] may hold.
pub const MAX_NODES: usize = 1 << 20;

/// A node of a [`BufferTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// The index of this node.
    pub id: usize,
    /// The location of this node.
    pub position: Point,
    /// The indices of this node's children.
    pub children: Vec<usize>,
    /// The pin at this node, if any.
    ///
    /// Intermediate stations along long wires carry no pin.
    pub pin: Option<ArcStr>,
    /// The capacitive load attached at this node.
    pub load_capacitance: f64,
}

impl TreeNode {
    /// Returns `true` if this node is a pin of the net.
    #[inline]
    pub fn is_pin(&self) -> bool {
        self.pin.is_some()
    }

    /// Returns `true` if this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A routing tree for one net.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferTree {
    nodes: Vec<TreeNode>,
}

impl BufferTree {
    /// Builds a star tree from `source` to every sink.
    ///
    /// Each source-to-sink connection follows an L-shaped path (horizontal,
    /// then vertical) with an intermediate station every `segment_length`
    /// units. Sinks carry a load of `sink_load`; stations carry none.
    ///
    /// Fails if a source-to-sink distance overflows or if the tree would
    /// exceed [`MAX_NODES`] nodes.
    pub fn star(
        source: (ArcStr, Point),
        sinks: impl IntoIterator<Item = (ArcStr, Point)>,
        segment_length: i64,
        sink_load: f64,
    ) -> Result<Self> {
        let (source_pin, source_pos) = source;
        let mut tree = Self {
            nodes: vec![TreeNode {
                id: ROOT,
                position: source_pos,
                children: Vec::new(),
                pin: Some(source_pin),
                load_capacitance: 0.,
            }],
        };
        for (pin, position) in sinks {
            let length = source_pos.checked_manhattan(position).ok_or_else(|| {
                Error::invalid(
                    "net",
                    format!("pin `{pin}` at {position} is out of range of the source"),
                )
            })?;
            let stations = if segment_length > 0 && length > 0 {
                ((length - 1) / segment_length) as usize
            } else {
                0
            };
            if stations >= MAX_NODES - tree.nodes.len() {
                return Err(Error::invalid(
                    "segment_length",
                    format!("{segment_length} splits the net into more than {MAX_NODES} nodes"),
                ));
            }
            let mut parent = ROOT;
            for k in 1..=stations as i64 {
                let station = along_l(source_pos, position, k * segment_length);
                parent = tree.push(parent, station, None, 0.);
            }
            tree.push(parent, position, Some(pin), sink_load);
        }
        Ok(tree)
    }

    fn push(&mut self, parent: usize, position: Point, pin: Option<ArcStr>, load: f64) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            id,
            position,
            children: Vec::new(),
            pin,
            load_capacitance: load,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// The root node.
    pub fn root(&self) -> &TreeNode {
        &self.nodes[ROOT]
    }

    /// Returns a reference to the node with the given index.
    #[inline]
    pub fn node(&self, id: usize) -> &TreeNode {
        &self.nodes[id]
    }

    /// All nodes, parents before children.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// The Manhattan length of the edge from `parent` to `child`.
    pub fn edge_length(&self, parent: usize, child: usize) -> i64 {
        self.nodes[parent]
            .position
            .manhattan(self.nodes[child].position)
    }

    /// The number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes. Never true for a built tree.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The point `distance` units along the L-shaped path from `from` to `to`.
fn along_l(from: Point, to: Point, distance: i64) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if distance <= dx.abs() {
        Point::new(from.x + dx.signum() * distance, from.y)
    } else {
        Point::new(to.x, from.y + dy.signum() * (distance - dx.abs()))
    }
}
