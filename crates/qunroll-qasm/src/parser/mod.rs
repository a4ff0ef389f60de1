//! Parser for `OpenQASM` 2.0.

mod expression;
mod lowering;
mod statement;

pub(crate) use lowering::lower_to_circuit;

use qunroll_ir::Circuit;

use crate::ast::{Position, Program};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse a QASM 2.0 source string into a Circuit.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let program = parse_ast(source)?;
    lower_to_circuit(&program)
}

/// Parse a QASM 2.0 source string into an AST Program.
pub fn parse_ast(source: &str) -> ParseResult<Program> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

/// Byte offsets where each source line starts.
struct LineIndex(Vec<usize>);

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self(starts)
    }

    /// 1-based line and column of a byte offset.
    fn position(&self, offset: usize) -> Position {
        let line = self.0.partition_point(|&start| start <= offset);
        let start = self.0[line.saturating_sub(1)];
        Position {
            line,
            column: offset - start + 1,
        }
    }
}

/// Parser state.
pub(super) struct Parser {
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
    lines: LineIndex,
}

impl Parser {
    /// Create a new parser from source.
    fn new(source: &str) -> ParseResult<Self> {
        let lines = LineIndex::new(source);
        let mut tokens = Vec::new();

        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, message)) => {
                    let Position { line, column } = lines.position(span.start);
                    return Err(ParseError::LexerError {
                        line,
                        column,
                        message,
                    });
                }
            }
        }

        Ok(Self {
            tokens,
            pos: 0,
            lines,
        })
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Position of the current token, or of the last one at end of input.
    pub(super) fn position(&self) -> Position {
        let idx = self.pos.min(self.tokens.len().saturating_sub(1));
        self.tokens
            .get(idx)
            .map_or(Position { line: 1, column: 1 }, |t| {
                self.lines.position(t.span.start)
            })
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Error for the token at the current position.
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(found) => {
                let Position { line, column } = self.position();
                ParseError::UnexpectedToken {
                    line,
                    column,
                    expected: expected.into(),
                    found: found.to_string(),
                }
            }
            None => ParseError::UnexpectedEof(expected.into()),
        }
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.check(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    /// Check if current token matches.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parse the entire program.
    fn parse_program(&mut self) -> ParseResult<Program> {
        self.expect(Token::OpenQasm)?;
        let version = self.parse_version()?;
        self.expect(Token::Semicolon)?;

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            version,
            statements,
        })
    }

    /// Parse version number; only 2.0 is accepted.
    fn parse_version(&mut self) -> ParseResult<String> {
        let version = match self.peek() {
            Some(Token::FloatLiteral(v)) => format!("{v:.1}"),
            Some(Token::IntLiteral(v)) => format!("{v}.0"),
            Some(other) => return Err(ParseError::InvalidVersion(other.to_string())),
            None => return Err(ParseError::UnexpectedEof("version number".into())),
        };
        if version != "2.0" {
            return Err(ParseError::InvalidVersion(version));
        }
        self.pos += 1;
        Ok(version)
    }

    /// Parse identifier list.
    pub(super) fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    /// Parse an identifier.
    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::Identifier(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Parse an integer literal.
    pub(super) fn parse_int_literal(&mut self) -> ParseResult<u64> {
        match self.peek() {
            Some(&Token::IntLiteral(v)) => {
                self.pos += 1;
                Ok(v)
            }
            _ => Err(self.unexpected("integer")),
        }
    }

    /// Parse an integer that must fit in `u32`.
    pub(super) fn parse_u32(&mut self) -> ParseResult<u32> {
        let position = self.position();
        let value = self.parse_int_literal()?;
        u32::try_from(value).map_err(|_| ParseError::UnexpectedToken {
            line: position.line,
            column: position.column,
            expected: "integer below 2^32".into(),
            found: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bell_state() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q -> c;
        "#;

        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.dag().num_ops(), 4);
    }

    #[test]
    fn test_parse_parameterized() {
        let source = r"
            OPENQASM 2.0;
            qreg q[1];
            rx(pi/2) q[0];
            u3(0.1, -pi, 2*pi/3) q[0];
        ";

        let circuit = parse(source).unwrap();
        assert_eq!(circuit.depth().unwrap(), 2);
    }

    #[test]
    fn test_version_must_be_two() {
        let result = parse("OPENQASM 3.0;\nqreg q[1];");
        assert!(matches!(result, Err(ParseError::InvalidVersion(v)) if v == "3.0"));
    }

    #[test]
    fn test_error_position() {
        let source = "OPENQASM 2.0;\nqreg q[1];\nh q[0]\nx q[0];";
        match parse(source) {
            Err(ParseError::UnexpectedToken { line, column, .. }) => {
                assert_eq!((line, column), (4, 1));
            }
            other => panic!("expected UnexpectedToken, got {other:?}"),
        }
    }

    #[test]
    fn test_lexer_error_position() {
        let source = "OPENQASM 2.0;\nqreg q[1];\n  $";
        assert!(matches!(
            parse(source),
            Err(ParseError::LexerError { line: 3, column: 3, .. })
        ));
    }

    #[test]
    fn test_missing_header() {
        assert!(parse("qreg q[1];").is_err());
        assert!(matches!(parse(""), Err(ParseError::UnexpectedEof(_))));
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.position(0), Position { line: 1, column: 1 });
        assert_eq!(index.position(4), Position { line: 2, column: 2 });
        assert_eq!(index.position(7), Position { line: 4, column: 1 });
    }
}
