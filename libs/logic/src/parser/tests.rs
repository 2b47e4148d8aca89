use test_log::test;

use super::*;
use crate::network::{Driver, Network};

const HALF_ADDER: &str = r"
// A half adder.
module half_adder(a, b, s, c);
  input a, b;
  output s, c;
  /* sum
     and carry */
  XOR x0 (s, a, b);
  and a0 (c, a, b);
endmodule
";

fn tokens(src: &str) -> Vec<Token> {
    Tokenizer::new(src)
        .map(|t| t.map(|s| s.token))
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn tokenizes_identifiers_literals_and_punctuation() {
    assert_eq!(
        tokens("and g (y, \\a+b , 1'b0);"),
        vec![
            Token::Ident("and".into()),
            Token::Ident("g".into()),
            Token::LParen,
            Token::Ident("y".into()),
            Token::Comma,
            Token::Ident("a+b".into()),
            Token::Comma,
            Token::Literal("1'b0".into()),
            Token::RParen,
            Token::Semi,
        ]
    );
}

#[test]
fn comments_advance_line_numbers() {
    let spanned = Tokenizer::new("// one\n/* two\nthree */ x\ny")
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(spanned.len(), 2);
    assert_eq!(spanned[0].line, 3);
    assert_eq!(spanned[1].line, 4);
}

#[test]
fn unterminated_block_comment_is_an_error() {
    assert_eq!(
        parse("and g(y, a, b); /* oops"),
        Err(ParseError::UnexpectedEof { expected: "`*/`" })
    );
}

#[test]
fn parses_half_adder() {
    let netlist = parse(HALF_ADDER).unwrap();
    assert_eq!(netlist.name.as_deref(), Some("half_adder"));
    assert_eq!(netlist.ports, ["a", "b", "s", "c"]);
    assert_eq!(netlist.inputs, ["a", "b"]);
    assert_eq!(netlist.outputs, ["s", "c"]);
    assert_eq!(netlist.gates.len(), 2);

    let xor = &netlist.gates[0];
    assert_eq!(xor.kind, GateKind::Xor);
    assert_eq!(xor.name.as_deref(), Some("x0"));
    assert_eq!(xor.output, "s");
    assert_eq!(xor.line, 8);
}

#[test]
fn parses_ansi_ports() {
    let netlist = parse("module m(input a, b, output y); nand (y, a, b); endmodule").unwrap();
    assert_eq!(netlist.ports, ["a", "b", "y"]);
    assert_eq!(netlist.inputs, ["a", "b"]);
    assert_eq!(netlist.outputs, ["y"]);
    assert_eq!(netlist.gates[0].name, None);
}

#[test]
fn parses_comma_separated_instances() {
    let netlist = parse("not n0(x, a), n1(y, b);").unwrap();
    assert_eq!(netlist.gates.len(), 2);
    assert_eq!(netlist.gates[1].output, "y");
}

#[test]
fn parses_constants() {
    let netlist = parse("or g(y, a, 1'b1, 'h0);").unwrap();
    assert_eq!(
        netlist.gates[0].inputs,
        vec![
            Operand::Signal("a".into()),
            Operand::Const {
                value: true,
                literal: "1'b1".into()
            },
            Operand::Const {
                value: false,
                literal: "'h0".into()
            },
        ]
    );
}

#[test]
fn bit_values() {
    assert_eq!(bit_value("1'b0"), Some(false));
    assert_eq!(bit_value("1'B1"), Some(true));
    assert_eq!(bit_value("'d1"), Some(true));
    assert_eq!(bit_value("2'b01"), None);
    assert_eq!(bit_value("1'b2"), None);
    assert_eq!(bit_value("7"), None);
}

#[test]
fn unsupported_literals_are_errors() {
    assert_eq!(
        parse("and g(y, a,\n 4'b1010);"),
        Err(ParseError::UnsupportedLiteral {
            line: 2,
            literal: "4'b1010".into()
        })
    );
}

#[test]
fn skips_unknown_statements() {
    let netlist = parse(
        "module m(a, y);
           input a;
           output y;
           assign q = a;
           buf b0(z, a);
           wire [3:0] bus;
           not n0(y, a);
         endmodule",
    )
    .unwrap();
    assert_eq!(netlist.gates.len(), 1);
    assert!(netlist.wires.is_empty());
}

#[test]
fn empty_input_is_empty_netlist() {
    assert_eq!(parse("").unwrap(), ParsedNetlist::default());
    assert_eq!(parse("  \n\t// nothing\n").unwrap(), ParsedNetlist::default());
}

#[test]
fn errors_carry_line_numbers() {
    let err = parse("module m;\nand g(y a);").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedToken {
            line: 2,
            expected: "`,` or `)`",
            found: "a".to_string(),
        }
    );
    assert_eq!(err.to_string(), "line 2: expected `,` or `)`, found `a`");

    assert_eq!(
        parse("and g(y, a"),
        Err(ParseError::UnexpectedEof {
            expected: "`,` or `)`"
        })
    );
    assert!(matches!(
        parse("and g(1'b0, a, b);"),
        Err(ParseError::UnexpectedToken {
            expected: "output signal",
            ..
        })
    ));
}

#[test]
fn network_checks_arity() {
    assert_eq!(
        Network::parse("\nnot n(y, a, b);").unwrap_err(),
        ParseError::BadArity {
            line: 2,
            kind: GateKind::Not,
            expected: "exactly 1",
            found: 2
        }
    );
    assert!(matches!(
        Network::parse("and g(y, a);"),
        Err(ParseError::BadArity { found: 1, .. })
    ));
}

#[test]
fn network_rejects_multiple_drivers() {
    assert_eq!(
        Network::parse("and g0(y, a, b);\nor g1(y, a, b);").unwrap_err(),
        ParseError::MultipleDrivers {
            line: 2,
            signal: "y".into()
        }
    );
    assert!(matches!(
        Network::parse("input a; not n(a, b);"),
        Err(ParseError::MultipleDrivers { .. })
    ));
}

#[test]
fn network_rejects_loops() {
    assert!(matches!(
        Network::parse("and g0(x, a, y); and g1(y, x, b);"),
        Err(ParseError::CombinationalLoop { .. })
    ));
}

#[test]
fn network_infers_inputs_and_outputs() {
    let network = Network::parse("and g1(x, a, b); or g2(y, x, c); not g3(z, x);").unwrap();
    assert_eq!(network.inputs(), ["a", "b", "c"]);
    assert_eq!(network.outputs(), ["y", "z"]);
    assert_eq!(network.driver("x"), Some(Driver::Gate(0)));
    assert_eq!(network.driver("a"), Some(Driver::Input));
    assert_eq!(network.depth(), 2);
}

#[test]
fn network_orders_gates_topologically() {
    let network = Network::parse("or g2(y, x, c); and g1(x, a, b);").unwrap();
    let order: Vec<_> = network.topological().map(|g| g.output.as_str()).collect();
    assert_eq!(order, ["x", "y"]);
}
