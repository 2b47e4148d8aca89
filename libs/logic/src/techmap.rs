//! Technology mapping onto a named standard-cell library.

use itertools::Itertools;

use crate::network::{GateKind, Network};
use crate::opt::{header, LEVEL_DELAY};
use crate::Synthesized;

/// The area of one mapped cell.
pub const AREA_PER_CELL: f64 = 120.0;
/// The power of one mapped cell.
pub const POWER_PER_CELL: f64 = 0.6;

/// The library cell code for a primitive.
pub fn cell_code(kind: GateKind) -> &'static str {
    match kind {
        GateKind::And => "AND",
        GateKind::Or => "OR",
        GateKind::Not => "INV",
        GateKind::Xor => "XOR",
        GateKind::Nand => "NAND",
        GateKind::Nor => "NOR",
    }
}

/// The name of the library cell implementing `kind` with `arity` inputs.
///
/// ```
/// # use logic::network::GateKind;
/// # use logic::techmap::cell_name;
/// assert_eq!(cell_name("generic", GateKind::Nand, 3), "generic_NAND3");
/// assert_eq!(cell_name("sky130", GateKind::Not, 1), "sky130_INV");
/// ```
pub fn cell_name(library: &str, kind: GateKind, arity: usize) -> String {
    match kind {
        GateKind::Not => format!("{library}_{}", cell_code(kind)),
        _ => format!("{library}_{}{arity}", cell_code(kind)),
    }
}

/// The name of the `i`-th input pin of a mapped cell: `A`, `B`, ... `Z`,
/// then `I26`, `I27`, ...
pub fn input_pin(i: usize) -> String {
    match u8::try_from(i) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => format!("I{i}"),
    }
}

/// Maps every gate of a network onto a cell of `library`.
///
/// Each gate becomes one instance with named pin connections; the output
/// pin is `Y`. Constant operands are connected verbatim.
pub fn map(network: &Network, library: &str) -> Synthesized {
    let netlist = if network.is_empty() {
        String::new()
    } else {
        let mut lines = header(network);
        for (k, gate) in network.gates().iter().enumerate() {
            let instance = gate
                .name
                .as_ref()
                .map_or_else(|| format!("U{k}"), ToString::to_string);
            let pins = std::iter::once(format!(".Y({})", gate.output))
                .chain(
                    gate.inputs
                        .iter()
                        .enumerate()
                        .map(|(i, op)| format!(".{}({op})", input_pin(i))),
                )
                .join(", ");
            lines.push(format!(
                "  {} {instance} ({pins});",
                cell_name(library, gate.kind, gate.inputs.len())
            ));
        }
        lines.push("endmodule".to_string());
        let mut text = lines.join("\n");
        text.push('\n');
        text
    };

    let gate_count = network.gates().len();
    Synthesized {
        netlist,
        gate_count,
        area: gate_count as f64 * AREA_PER_CELL,
        power: gate_count as f64 * POWER_PER_CELL,
        critical_path_delay: network.depth() as f64 * LEVEL_DELAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_pins_are_lettered() {
        assert_eq!(input_pin(0), "A");
        assert_eq!(input_pin(25), "Z");
        assert_eq!(input_pin(26), "I26");
    }
}
