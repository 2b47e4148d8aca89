//! AIG optimization and structural netlist emission.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use arcstr::ArcStr;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aig::{Aig, AigNode, Lit, NodeId, NodeKind};
use crate::error::Error;
use crate::network::Network;
use crate::Synthesized;

/// The number of rewrite/refactor/balance rounds.
pub const OPT_ROUNDS: usize = 3;
/// The delay of one AND level, in nanoseconds.
pub const LEVEL_DELAY: f64 = 0.1;
/// The area of one AND gate.
pub const AREA_PER_GATE: f64 = 100.0;
/// The power of one AND gate.
pub const POWER_PER_GATE: f64 = 0.5;
/// The fraction of the clock period targeted by timing optimization.
pub const TIMING_TARGET: f64 = 0.8;
/// The default clock period, in nanoseconds.
pub const DEFAULT_CLOCK_PERIOD: f64 = 10.0;

/// What the optimizer should favor.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationGoal {
    /// Minimize gate count.
    #[default]
    Area,
    /// Minimize switching power; structural deduplication is skipped.
    Power,
    /// Meet a clock period, duplicating gates if necessary.
    Timing,
}

impl FromStr for OptimizationGoal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "area" => Ok(Self::Area),
            "power" => Ok(Self::Power),
            "timing" | "delay" => Ok(Self::Timing),
            _ => Err(Error::invalid(
                "optimization_level",
                format!("unknown optimization goal `{s}`"),
            )),
        }
    }
}

impl Display for OptimizationGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Area => "area",
            Self::Power => "power",
            Self::Timing => "timing",
        };
        write!(f, "{name}")
    }
}

/// The result of simplifying the fanins of an AND node.
enum Simplified {
    /// The node is equivalent to this literal.
    Alias(Lit),
    /// The node remains an AND of these fanins.
    And(Vec<Lit>),
}

/// Simplifies an AND over `fanins`.
///
/// Constant fanins are always folded. If `structural` is set, repeated
/// fanins are merged (`x & x = x`), complementary fanins fold to `false`
/// (`x & !x = 0`) and fanins are sorted into canonical order.
fn simplify(fanins: impl IntoIterator<Item = Lit>, structural: bool) -> Simplified {
    let mut out = Vec::new();
    for lit in fanins {
        match lit.const_value() {
            Some(false) => return Simplified::Alias(Lit::FALSE),
            Some(true) => continue,
            None => out.push(lit),
        }
    }
    if structural {
        out.sort();
        out.dedup();
        if out.windows(2).any(|w| w[0].node == w[1].node) {
            return Simplified::Alias(Lit::FALSE);
        }
    }
    match out.len() {
        0 => Simplified::Alias(Lit::TRUE),
        1 => Simplified::Alias(out[0]),
        _ => Simplified::And(out),
    }
}

fn resolve(replacements: &[Option<Lit>], mut lit: Lit) -> Lit {
    while let Some(r) = replacements[lit.node.0] {
        lit = r.invert_if(lit.inverted);
    }
    lit
}

fn simplify_pass(aig: &Aig, structural: bool) -> Aig {
    let mut work = aig.clone();
    let mut replacements: Vec<Option<Lit>> = vec![None; aig.nodes().len()];
    let mut signatures: HashMap<Vec<Lit>, NodeId> = HashMap::new();

    for node in aig.ands() {
        let fanins = node.fanins.iter().map(|&f| resolve(&replacements, f));
        match simplify(fanins, structural) {
            Simplified::Alias(lit) => replacements[node.id.0] = Some(lit),
            Simplified::And(fanins) => {
                if structural {
                    if let Some(&existing) = signatures.get(&fanins) {
                        replacements[node.id.0] = Some(Lit::positive(existing));
                        continue;
                    }
                    signatures.insert(fanins.clone(), node.id);
                }
                work.set_fanins(node.id, fanins);
            }
        }
    }
    work.rebuild(&replacements)
}

/// Folds constant fanins and removes logic that no output depends on.
pub fn propagate_constants(aig: &Aig) -> Aig {
    simplify_pass(aig, false)
}

/// Merges structurally identical AND nodes.
///
/// Nodes with the same canonical fanin set (including inversions) are merged
/// by redirecting their fanouts to the first such node. Repeated and
/// complementary fanins are simplified as well.
pub fn rewrite(aig: &Aig) -> Aig {
    simplify_pass(aig, true)
}

/// Recomputes node levels bottom-up.
pub fn refactor(aig: &mut Aig) {
    aig.compute_levels();
}

/// Balances wide AND nodes.
///
/// Nodes with more than three fanins are treated as balanced trees,
/// whose depth is logarithmic rather than linear in the fanin count.
pub fn balance(aig: &mut Aig) {
    let wide: Vec<_> = aig
        .ands()
        .filter(|n| n.fanins.len() > 3 && !n.balanced)
        .map(|n| n.id)
        .collect();
    for id in wide {
        aig.set_balanced(id);
    }
    aig.compute_levels();
}

/// Duplicates every AND node deeper than `max_level`.
///
/// The fanouts of each duplicated node are split alternately between the
/// original and its replica. Returns the new graph and the number of replicas.
///
/// Replication reduces fanout only. Logic depth is unchanged, so the
/// maximum level of the result equals that of `aig`.
pub fn replicate_deep_nodes(aig: &Aig, max_level: usize) -> (Aig, usize) {
    let mut out = Aig::new();
    let mut map: Vec<Vec<Lit>> = vec![Vec::new(); aig.nodes().len()];
    let mut uses = vec![0usize; aig.nodes().len()];
    map[0] = vec![Lit::FALSE];
    let mut replicas = 0;

    let mut translate = |map: &[Vec<Lit>], lit: Lit| {
        let copies = &map[lit.node.0];
        let i = uses[lit.node.0];
        uses[lit.node.0] += 1;
        copies
            .get(i % copies.len().max(1))
            .copied()
            .unwrap_or(Lit::FALSE)
            .invert_if(lit.inverted)
    };

    for node in aig.nodes() {
        match &node.kind {
            NodeKind::Constant => {}
            NodeKind::Input(name) => map[node.id.0] = vec![out.add_input(name.clone())],
            NodeKind::And => {
                let fanins: Vec<Lit> = node.fanins.iter().map(|&f| translate(&map, f)).collect();
                let mut copies = vec![out.add_and_with(fanins.clone(), node.balanced)];
                if node.level > max_level {
                    copies.push(out.add_and_with(fanins, node.balanced));
                    replicas += 1;
                }
                map[node.id.0] = copies;
            }
            NodeKind::Output(name) => {
                let lit = node
                    .fanins
                    .first()
                    .map_or(Lit::FALSE, |&f| translate(&map, f));
                out.add_output(name.clone(), lit);
            }
        }
    }
    (out, replicas)
}

/// Options for [`optimize`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OptimizeOptions {
    /// The optimization goal.
    pub goal: OptimizationGoal,
    /// The clock period in nanoseconds, used by [`OptimizationGoal::Timing`].
    pub clock_period: f64,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            goal: OptimizationGoal::default(),
            clock_period: DEFAULT_CLOCK_PERIOD,
        }
    }
}

/// Runs the optimization script on an AIG.
pub fn optimize_aig(aig: &Aig, goal: OptimizationGoal) -> Aig {
    let mut aig = propagate_constants(aig);
    debug!(gates = aig.and_count(), "propagated constants");
    for round in 0..OPT_ROUNDS {
        if goal != OptimizationGoal::Power {
            aig = rewrite(&aig);
        }
        refactor(&mut aig);
        balance(&mut aig);
        debug!(
            round,
            gates = aig.and_count(),
            levels = aig.max_level(),
            "finished optimization round"
        );
    }
    aig
}

/// Optimizes a network and emits the result as a structural netlist.
///
/// For [`OptimizationGoal::Timing`], the reported critical path delay is the
/// timing target `0.8 * clock_period`, not a delay measured on the result.
/// Gates deeper than the target level are replicated but the logic depth is
/// not reduced. Other goals report the maximum AND level times 0.1 ns.
pub fn optimize(network: &Network, options: OptimizeOptions) -> Synthesized {
    let aig = optimize_aig(&Aig::from_network(network), options.goal);

    let (aig, critical_path_delay) = match options.goal {
        OptimizationGoal::Timing => {
            let target = TIMING_TARGET * options.clock_period;
            let max_level = (target / LEVEL_DELAY + 1e-9).floor() as usize;
            let (aig, replicas) = replicate_deep_nodes(&aig, max_level);
            if replicas > 0 {
                debug!(replicas, max_level, "replicated gates to meet timing");
            }
            (aig, target)
        }
        OptimizationGoal::Area | OptimizationGoal::Power => {
            let delay = aig.max_level() as f64 * LEVEL_DELAY;
            (aig, delay)
        }
    };

    let gate_count = aig.and_count();
    Synthesized {
        netlist: emit(network, &aig),
        gate_count,
        area: gate_count as f64 * AREA_PER_GATE,
        power: gate_count as f64 * POWER_PER_GATE,
        critical_path_delay,
    }
}

fn node_name(node: &AigNode) -> ArcStr {
    match &node.kind {
        NodeKind::Input(name) | NodeKind::Output(name) => name.clone(),
        NodeKind::Constant | NodeKind::And => arcstr::format!("_n{}", node.id.0),
    }
}

fn literal(aig: &Aig, lit: Lit) -> String {
    match lit.const_value() {
        Some(value) => String::from(if value { "1'b1" } else { "1'b0" }),
        None => {
            let name = node_name(aig.node(lit.node));
            if lit.inverted {
                format!("~{name}")
            } else {
                name.to_string()
            }
        }
    }
}

/// Constant annotations and the module header shared by emitted netlists.
pub(crate) fn header(network: &Network) -> Vec<String> {
    let mut lines: Vec<String> = network
        .constants()
        .map(|(gate, literal)| format!("// constant {literal} feeds {} ({})", gate.label(), gate.kind))
        .collect();
    let ports = if network.ports().is_empty() {
        network
            .inputs()
            .iter()
            .chain(network.outputs())
            .unique()
            .join(", ")
    } else {
        network.ports().iter().join(", ")
    };
    let name = network.name().map_or("top", |n| n.as_str());
    lines.push(format!("module {name}({ports});"));
    if !network.inputs().is_empty() {
        lines.push(format!("  input {};", network.inputs().iter().join(", ")));
    }
    if !network.outputs().is_empty() {
        lines.push(format!("  output {};", network.outputs().iter().join(", ")));
    }
    lines
}

/// Emits an optimized AIG as `assign` statements.
///
/// Constant inputs of the source netlist are listed verbatim as comments,
/// and outputs that fold to constants are assigned `1'b0` or `1'b1`.
/// An empty network produces an empty string.
pub fn emit(network: &Network, aig: &Aig) -> String {
    if network.is_empty() {
        return String::new();
    }
    let mut lines = header(network);
    let wires: Vec<_> = aig.ands().map(node_name).collect();
    if !wires.is_empty() {
        lines.push(format!("  wire {};", wires.iter().join(", ")));
    }
    for node in aig.nodes() {
        match &node.kind {
            NodeKind::And => {
                let expr = node.fanins.iter().map(|&f| literal(aig, f)).join(" & ");
                lines.push(format!("  assign {} = {expr};", node_name(node)));
            }
            NodeKind::Output(name) => {
                let Some(&fanin) = node.fanins.first() else {
                    continue;
                };
                let source = literal(aig, fanin);
                if source != name.as_str() {
                    lines.push(format!("  assign {name} = {source};"));
                }
            }
            NodeKind::Constant | NodeKind::Input(_) => {}
        }
    }
    lines.push("endmodule".to_string());
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aig(src: &str) -> Aig {
        Aig::from_network(&Network::parse(src).unwrap())
    }

    #[test]
    fn rewrite_merges_duplicates() {
        let aig = aig("and g1(x, a, b); and g2(y, b, a); or g3(z, x, y);");
        assert_eq!(aig.and_count(), 3);
        let rewritten = rewrite(&aig);
        // `x | y` becomes `x | x = x`.
        assert_eq!(rewritten.and_count(), 1);
    }

    #[test]
    fn complementary_fanins_fold_to_false() {
        let aig = aig("not n(b, a); and g(y, a, b);");
        let rewritten = rewrite(&aig);
        assert_eq!(rewritten.and_count(), 0);
        let out = rewritten.node(rewritten.outputs()[0]);
        assert_eq!(out.fanins[0], Lit::FALSE);
    }

    #[test]
    fn constants_propagate() {
        let aig = aig("and g1(x, a, c, 1'b1); and g2(y, x, b, 1'b0); or g3(z, x, y);");
        let folded = propagate_constants(&aig);
        // y = 0, so z = x = a & c.
        assert_eq!(folded.and_count(), 1);
    }

    #[test]
    fn balance_reduces_depth_of_wide_ands() {
        let mut aig = aig("and u(y, a, b, c, d, e, f, g, h);");
        assert_eq!(aig.max_level(), 7);
        balance(&mut aig);
        assert_eq!(aig.max_level(), 3);
    }

    #[test]
    fn replication_splits_fanouts() {
        let aig = aig("and g1(x, a, b); and g2(y, x, c); and g3(z, x, d);");
        let (mut replicated, n) = replicate_deep_nodes(&aig, 0);
        assert_eq!(n, 3);
        assert_eq!(replicated.and_count(), 6);
        replicated.compute_levels();
        assert_eq!(replicated.max_level(), aig.max_level());
        let (_, none) = replicate_deep_nodes(&aig, 2);
        assert_eq!(none, 0);
    }
}
