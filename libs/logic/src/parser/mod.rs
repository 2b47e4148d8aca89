//! Gate-level netlist parser.
//!
//! Accepts a small structural subset of Verilog:
//!
//! ```text
//! module half_adder(a, b, s, c);
//!   input a, b;
//!   output s, c;
//!   xor x0 (s, a, b);
//!   and a0 (c, a, b);
//! endmodule
//! ```
//!
//! Supported statements are the module header (with plain or ANSI-style port
//! lists), `input`/`output`/`inout`/`wire` declarations, `endmodule`, and
//! instantiations of the `and`, `or`, `not`, `xor`, `nand` and `nor`
//! primitives, whose first terminal is the output. Keywords are
//! case-insensitive. Operands may be scalar signal names or 1-bit literals
//! such as `1'b0`. Any other statement is skipped up to the next `;`.

#[cfg(test)]
mod tests;

use std::fmt::Display;

use arcstr::ArcStr;
use thiserror::Error;
use tracing::warn;

use crate::network::{Gate, GateKind, Operand};

/// A token in a netlist.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Token {
    /// An identifier or keyword.
    Ident(ArcStr),
    /// A numeric literal, such as `1'b0` or `4`.
    Literal(ArcStr),
    /// `(`.
    LParen,
    /// `)`.
    RParen,
    /// `,`.
    Comma,
    /// `;`.
    Semi,
    /// Any other character.
    Other(char),
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ident(s) | Self::Literal(s) => write!(f, "{s}"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
            Self::Semi => write!(f, ";"),
            Self::Other(c) => write!(f, "{c}"),
        }
    }
}

/// A token and the line on which it starts.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// The 1-based line number.
    pub line: usize,
}

/// An error parsing a netlist.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseError {
    /// A token that does not fit the grammar.
    #[error("line {line}: expected {expected}, found `{found}`")]
    UnexpectedToken {
        /// The line of the offending token.
        line: usize,
        /// What the parser was looking for.
        expected: &'static str,
        /// The offending token.
        found: String,
    },
    /// The input ended in the middle of a statement or comment.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What the parser was looking for.
        expected: &'static str,
    },
    /// A literal other than a single bit.
    #[error("line {line}: unsupported literal `{literal}`")]
    UnsupportedLiteral {
        /// The line of the literal.
        line: usize,
        /// The literal text.
        literal: ArcStr,
    },
    /// A primitive instantiated with the wrong number of inputs.
    #[error("line {line}: `{kind}` expects {expected} inputs, found {found}")]
    BadArity {
        /// The line of the instantiation.
        line: usize,
        /// The primitive.
        kind: GateKind,
        /// A description of the accepted input counts.
        expected: &'static str,
        /// The number of inputs given.
        found: usize,
    },
    /// A signal driven by more than one gate, or by a gate and a primary input.
    #[error("line {line}: signal `{signal}` has multiple drivers")]
    MultipleDrivers {
        /// The line of the second driver.
        line: usize,
        /// The signal name.
        signal: ArcStr,
    },
    /// A cycle of gates with no sequential element.
    #[error("combinational loop through signal `{signal}`")]
    CombinationalLoop {
        /// A signal on the loop.
        signal: ArcStr,
    },
}

/// A parsed netlist, before any semantic checks.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ParsedNetlist {
    /// The module name, if a module header was present.
    pub name: Option<ArcStr>,
    /// The module ports, in header order.
    pub ports: Vec<ArcStr>,
    /// Declared primary inputs.
    pub inputs: Vec<ArcStr>,
    /// Declared primary outputs.
    pub outputs: Vec<ArcStr>,
    /// Declared internal wires.
    pub wires: Vec<ArcStr>,
    /// Primitive instances, in source order.
    pub gates: Vec<Gate>,
}

/// Parses a netlist.
///
/// Empty or whitespace-only input produces an empty netlist.
pub fn parse(src: &str) -> Result<ParsedNetlist, ParseError> {
    let tokens = Tokenizer::new(src).collect::<Result<Vec<_>, _>>()?;
    Parser::new(tokens).parse()
}

/// Interprets a literal as a single bit.
///
/// Accepts sized (`1'b1`) and unsized (`'b1`) literals in binary, octal,
/// decimal or hex whose value is 0 or 1.
pub fn bit_value(literal: &str) -> Option<bool> {
    let (size, rest) = literal.split_once('\'')?;
    if !(size.is_empty() || size == "1") {
        return None;
    }
    let mut chars = rest.chars();
    let base = chars.next()?;
    if !matches!(base.to_ascii_lowercase(), 'b' | 'o' | 'd' | 'h') {
        return None;
    }
    match chars.as_str() {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum DeclKind {
    Input,
    Output,
    InOut,
    Wire,
}

impl DeclKind {
    fn from_keyword(word: &str) -> Option<Self> {
        let word = word.to_ascii_lowercase();
        match word.as_str() {
            "input" => Some(Self::Input),
            "output" => Some(Self::Output),
            "inout" => Some(Self::InOut),
            "wire" => Some(Self::Wire),
            _ => None,
        }
    }
}

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
        }
    }

    fn rem(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rem().chars().next()
    }

    fn take1(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.take1();
        }
        &self.src[start..self.pos]
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            self.take_while(char::is_whitespace);
            let rem = self.rem();
            if rem.starts_with("//") {
                self.take_while(|c| c != '\n');
            } else if rem.starts_with("/*") {
                self.pos += 2;
                let Some(end) = self.rem().find("*/") else {
                    self.pos = self.src.len();
                    return Err(ParseError::UnexpectedEof { expected: "`*/`" });
                };
                self.line += self.rem()[..end].matches('\n').count();
                self.pos += end + 2;
            } else {
                return Ok(());
            }
        }
    }

    fn get(&mut self) -> Result<Option<Spanned>, ParseError> {
        self.skip_trivia()?;
        let line = self.line;
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let token = match c {
            '(' | ')' | ',' | ';' => {
                self.take1();
                match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    _ => Token::Semi,
                }
            }
            '\\' => {
                self.take1();
                Token::Ident(self.take_while(|c| !c.is_whitespace()).into())
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                Token::Ident(self.take_while(is_ident_char).into())
            }
            c if c.is_ascii_digit() || c == '\'' => {
                let start = self.pos;
                self.take_while(|c| c.is_ascii_digit());
                if self.peek() == Some('\'') {
                    self.take1();
                    self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                }
                Token::Literal(self.src[start..self.pos].into())
            }
            c => {
                self.take1();
                Token::Other(c)
            }
        };
        Ok(Some(Spanned { token, line }))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Spanned, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get().transpose()
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    netlist: ParsedNetlist,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Self {
            tokens,
            pos: 0,
            netlist: ParsedNetlist::default(),
        }
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_next(&mut self, expected: &'static str) -> Result<Spanned, ParseError> {
        self.next().ok_or(ParseError::UnexpectedEof { expected })
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), ParseError> {
        let next = self.expect_next(expected)?;
        if next.token == token {
            Ok(())
        } else {
            Err(unexpected(&next, expected))
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<ArcStr, ParseError> {
        match self.expect_next(expected)? {
            Spanned {
                token: Token::Ident(name),
                ..
            } => Ok(name),
            other => Err(unexpected(&other, expected)),
        }
    }

    fn parse(mut self) -> Result<ParsedNetlist, ParseError> {
        while let Some(tok) = self.next() {
            let Token::Ident(word) = &tok.token else {
                if tok.token != Token::Semi {
                    self.skip_statement(&tok);
                }
                continue;
            };
            if word.eq_ignore_ascii_case("module") {
                self.parse_module_header()?;
            } else if word.eq_ignore_ascii_case("endmodule") {
                continue;
            } else if let Some(kind) = DeclKind::from_keyword(word) {
                self.parse_declaration(kind, &tok)?;
            } else if let Some(kind) = GateKind::from_keyword(word) {
                self.parse_instances(kind)?;
            } else {
                self.skip_statement(&tok);
            }
        }
        Ok(self.netlist)
    }

    fn declare(&mut self, kind: DeclKind, name: ArcStr) {
        match kind {
            DeclKind::Input => self.netlist.inputs.push(name),
            DeclKind::Output => self.netlist.outputs.push(name),
            DeclKind::InOut => {
                warn!(signal = %name, "treating inout as input");
                self.netlist.inputs.push(name);
            }
            DeclKind::Wire => self.netlist.wires.push(name),
        }
    }

    fn parse_module_header(&mut self) -> Result<(), ParseError> {
        let name = self.expect_ident("module name")?;
        if let Some(prev) = &self.netlist.name {
            warn!(module = %name, first = %prev, "ignoring additional module header");
        } else {
            self.netlist.name = Some(name);
        }

        if self.peek().map(|t| &t.token) == Some(&Token::LParen) {
            self.next();
            let mut direction = None;
            loop {
                let tok = self.expect_next("port name or `)`")?;
                match &tok.token {
                    Token::RParen => break,
                    Token::Comma => continue,
                    Token::Ident(word) => match DeclKind::from_keyword(word) {
                        Some(kind) => direction = Some(kind),
                        None => {
                            self.netlist.ports.push(word.clone());
                            if let Some(kind) = direction {
                                self.declare(kind, word.clone());
                            }
                        }
                    },
                    _ => return Err(unexpected(&tok, "port name or `)`")),
                }
            }
        }
        self.expect(Token::Semi, "`;`")
    }

    fn parse_declaration(&mut self, kind: DeclKind, start: &Spanned) -> Result<(), ParseError> {
        let mut names = Vec::new();
        loop {
            let tok = self.expect_next("signal name or `;`")?;
            match tok.token {
                Token::Semi => break,
                Token::Comma => continue,
                Token::Ident(name) => names.push(name),
                Token::Other('[') => {
                    warn!(line = tok.line, "skipping vector declaration");
                    self.skip_statement(start);
                    return Ok(());
                }
                _ => return Err(unexpected(&tok, "signal name or `;`")),
            }
        }
        for name in names {
            self.declare(kind, name);
        }
        Ok(())
    }

    /// Parses one or more comma-separated instances of a primitive.
    fn parse_instances(&mut self, kind: GateKind) -> Result<(), ParseError> {
        loop {
            self.parse_instance(kind)?;
            let tok = self.expect_next("`,` or `;`")?;
            match tok.token {
                Token::Semi => return Ok(()),
                Token::Comma => continue,
                _ => return Err(unexpected(&tok, "`,` or `;`")),
            }
        }
    }

    fn parse_instance(&mut self, kind: GateKind) -> Result<(), ParseError> {
        let first = self.expect_next("instance name or `(`")?;
        let (name, open) = match first.token {
            Token::Ident(name) => (Some(name), self.expect_next("`(`")?),
            token => (
                None,
                Spanned {
                    token,
                    line: first.line,
                },
            ),
        };
        if open.token != Token::LParen {
            return Err(unexpected(&open, "`(`"));
        }
        let line = open.line;

        let mut terminals = Vec::new();
        loop {
            let tok = self.expect_next("terminal")?;
            let operand = match tok.token {
                Token::Ident(signal) => Operand::Signal(signal),
                Token::Literal(literal) => match bit_value(&literal) {
                    Some(value) => Operand::Const { value, literal },
                    None => {
                        return Err(ParseError::UnsupportedLiteral {
                            line: tok.line,
                            literal,
                        })
                    }
                },
                _ => return Err(unexpected(&tok, "terminal")),
            };
            terminals.push(operand);
            let tok = self.expect_next("`,` or `)`")?;
            match tok.token {
                Token::Comma => continue,
                Token::RParen => break,
                _ => return Err(unexpected(&tok, "`,` or `)`")),
            }
        }

        let mut terminals = terminals.into_iter();
        let output = match terminals.next() {
            Some(Operand::Signal(output)) => output,
            Some(Operand::Const { literal, .. }) => {
                return Err(ParseError::UnexpectedToken {
                    line,
                    expected: "output signal",
                    found: literal.to_string(),
                })
            }
            None => {
                return Err(ParseError::BadArity {
                    line,
                    kind,
                    expected: kind.arity_description(),
                    found: 0,
                })
            }
        };
        self.netlist.gates.push(Gate {
            kind,
            name,
            output,
            inputs: terminals.collect(),
            line,
        });
        Ok(())
    }

    /// Skips to the end of the current statement.
    ///
    /// Stops after the next `;`, or before the next `endmodule`.
    fn skip_statement(&mut self, start: &Spanned) {
        warn!(line = start.line, token = %start.token, "skipping unsupported statement");
        while let Some(tok) = self.peek() {
            let end = matches!(
                &tok.token,
                Token::Ident(word) if word.eq_ignore_ascii_case("endmodule")
            );
            if end {
                return;
            }
            let semi = tok.token == Token::Semi;
            self.pos += 1;
            if semi {
                return;
            }
        }
    }
}

fn unexpected(tok: &Spanned, expected: &'static str) -> ParseError {
    ParseError::UnexpectedToken {
        line: tok.line,
        expected,
        found: tok.token.to_string(),
    }
}
