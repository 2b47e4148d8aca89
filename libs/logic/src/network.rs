//! Boolean networks of primitive gates.

use std::collections::{HashSet, VecDeque};
use std::fmt::Display;

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parser::{self, ParseError, ParsedNetlist};

/// A primitive gate type.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
    /// Inversion.
    Not,
    /// Exclusive or.
    Xor,
    /// Inverted conjunction.
    Nand,
    /// Inverted disjunction.
    Nor,
}

impl GateKind {
    /// All primitive gate types.
    pub const ALL: [GateKind; 6] = [
        Self::And,
        Self::Or,
        Self::Not,
        Self::Xor,
        Self::Nand,
        Self::Nor,
    ];

    /// Looks up a primitive by its keyword, ignoring case.
    ///
    /// ```
    /// # use logic::network::GateKind;
    /// assert_eq!(GateKind::from_keyword("NAND"), Some(GateKind::Nand));
    /// assert_eq!(GateKind::from_keyword("buf"), None);
    /// ```
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(word))
    }

    /// The keyword used to instantiate this primitive.
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Xor => "xor",
            Self::Nand => "nand",
            Self::Nor => "nor",
        }
    }

    /// Returns `true` if this primitive accepts `n` inputs.
    pub const fn accepts_arity(&self, n: usize) -> bool {
        match self {
            Self::Not => n == 1,
            _ => n >= 2,
        }
    }

    pub(crate) const fn arity_description(&self) -> &'static str {
        match self {
            Self::Not => "exactly 1",
            _ => "at least 2",
        }
    }
}

impl Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A gate input.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub enum Operand {
    /// A named signal.
    Signal(ArcStr),
    /// A constant bit.
    Const {
        /// The value of the bit.
        value: bool,
        /// The literal as written in the source, e.g. `1'b0`.
        literal: ArcStr,
    },
}

impl Operand {
    /// The name of the signal, if this operand is not a constant.
    pub fn signal(&self) -> Option<&ArcStr> {
        match self {
            Self::Signal(name) => Some(name),
            Self::Const { .. } => None,
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signal(name) => write!(f, "{name}"),
            Self::Const { literal, .. } => write!(f, "{literal}"),
        }
    }
}

/// An instance of a primitive gate.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Gate {
    /// The gate type.
    pub kind: GateKind,
    /// The instance name, if one was given.
    pub name: Option<ArcStr>,
    /// The driven signal.
    pub output: ArcStr,
    /// The gate inputs, in order.
    pub inputs: Vec<Operand>,
    /// The source line of the instantiation.
    pub line: usize,
}

impl Gate {
    /// A label for this gate: its instance name, or else its output signal.
    pub fn label(&self) -> &ArcStr {
        self.name.as_ref().unwrap_or(&self.output)
    }
}

/// The driver of a signal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Driver {
    /// A primary input.
    Input,
    /// The gate at the given index.
    Gate(usize),
}

/// A validated network of primitive gates.
///
/// Every signal has exactly one driver and the gates form a DAG.
#[derive(Debug, Clone, Default)]
pub struct Network {
    name: Option<ArcStr>,
    ports: Vec<ArcStr>,
    inputs: Vec<ArcStr>,
    outputs: Vec<ArcStr>,
    gates: Vec<Gate>,
    drivers: IndexMap<ArcStr, Driver>,
    order: Vec<usize>,
}

impl Network {
    /// Parses and validates a netlist.
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        Self::from_netlist(parser::parse(src)?)
    }

    /// Validates a parsed netlist.
    ///
    /// Signals that are read but never driven become primary inputs.
    /// If no outputs are declared, every gate whose output is not read
    /// by another gate drives a primary output.
    pub fn from_netlist(netlist: ParsedNetlist) -> Result<Self, ParseError> {
        let ParsedNetlist {
            name,
            ports,
            inputs: declared_inputs,
            outputs: declared_outputs,
            wires: _,
            gates,
        } = netlist;

        let mut drivers = IndexMap::new();
        let mut inputs = Vec::new();
        for input in declared_inputs {
            if drivers.insert(input.clone(), Driver::Input).is_none() {
                inputs.push(input);
            }
        }
        for (i, gate) in gates.iter().enumerate() {
            if !gate.kind.accepts_arity(gate.inputs.len()) {
                return Err(ParseError::BadArity {
                    line: gate.line,
                    kind: gate.kind,
                    expected: gate.kind.arity_description(),
                    found: gate.inputs.len(),
                });
            }
            if drivers.insert(gate.output.clone(), Driver::Gate(i)).is_some() {
                return Err(ParseError::MultipleDrivers {
                    line: gate.line,
                    signal: gate.output.clone(),
                });
            }
        }

        let read = gates
            .iter()
            .flat_map(|g| g.inputs.iter().filter_map(Operand::signal))
            .chain(declared_outputs.iter())
            .cloned()
            .collect::<Vec<_>>();
        for signal in read {
            if !drivers.contains_key(&signal) {
                debug!(%signal, "treating undriven signal as a primary input");
                drivers.insert(signal.clone(), Driver::Input);
                inputs.push(signal);
            }
        }

        let mut outputs = Vec::new();
        let mut seen = HashSet::new();
        for output in declared_outputs {
            if seen.insert(output.clone()) {
                outputs.push(output);
            }
        }
        if outputs.is_empty() {
            let consumed: HashSet<_> = gates
                .iter()
                .flat_map(|g| g.inputs.iter().filter_map(Operand::signal))
                .collect();
            outputs = gates
                .iter()
                .filter(|g| !consumed.contains(&g.output))
                .map(|g| g.output.clone())
                .collect();
        }

        let order = topological_order(&gates, &drivers)?;

        Ok(Self {
            name,
            ports,
            inputs,
            outputs,
            gates,
            drivers,
            order,
        })
    }

    /// The module name, if one was declared.
    pub fn name(&self) -> Option<&ArcStr> {
        self.name.as_ref()
    }

    /// The module ports, in header order.
    pub fn ports(&self) -> &[ArcStr] {
        &self.ports
    }

    /// Primary inputs: declared inputs followed by implicit ones.
    pub fn inputs(&self) -> &[ArcStr] {
        &self.inputs
    }

    /// Primary outputs.
    pub fn outputs(&self) -> &[ArcStr] {
        &self.outputs
    }

    /// All gates, in source order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// The driver of a signal.
    pub fn driver(&self, signal: &str) -> Option<Driver> {
        self.drivers.get(signal).copied()
    }

    /// All gates, ordered so that every gate follows the drivers of its inputs.
    pub fn topological(&self) -> impl Iterator<Item = &Gate> {
        self.order.iter().map(|&i| &self.gates[i])
    }

    /// Returns `true` if the network has no gates and no ports.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty() && self.inputs.is_empty() && self.outputs.is_empty()
    }

    /// The number of gates on the longest input-to-output path.
    pub fn depth(&self) -> usize {
        let mut levels = vec![0; self.gates.len()];
        for &i in &self.order {
            levels[i] = 1 + self.gates[i]
                .inputs
                .iter()
                .filter_map(|op| match self.driver(op.signal()?)? {
                    Driver::Gate(j) => Some(levels[j]),
                    Driver::Input => None,
                })
                .max()
                .unwrap_or(0);
        }
        levels.into_iter().max().unwrap_or(0)
    }

    /// Every constant gate input, with the gate it feeds, in source order.
    pub fn constants(&self) -> impl Iterator<Item = (&Gate, &ArcStr)> {
        self.gates.iter().flat_map(|g| {
            g.inputs.iter().filter_map(move |op| match op {
                Operand::Const { literal, .. } => Some((g, literal)),
                Operand::Signal(_) => None,
            })
        })
    }
}

/// Orders gates with Kahn's algorithm, breaking ties by source order.
fn topological_order(
    gates: &[Gate],
    drivers: &IndexMap<ArcStr, Driver>,
) -> Result<Vec<usize>, ParseError> {
    let mut pending = vec![0usize; gates.len()];
    let mut fanouts = vec![Vec::new(); gates.len()];
    for (i, gate) in gates.iter().enumerate() {
        for signal in gate.inputs.iter().filter_map(Operand::signal) {
            if let Some(Driver::Gate(j)) = drivers.get(signal) {
                pending[i] += 1;
                fanouts[*j].push(i);
            }
        }
    }

    let mut ready: VecDeque<_> = (0..gates.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(gates.len());
    while let Some(i) = ready.pop_front() {
        order.push(i);
        for &j in &fanouts[i] {
            pending[j] -= 1;
            if pending[j] == 0 {
                ready.push_back(j);
            }
        }
    }

    match (0..gates.len()).find(|&i| pending[i] > 0) {
        Some(i) => Err(ParseError::CombinationalLoop {
            signal: gates[i].output.clone(),
        }),
        None => Ok(order),
    }
}
