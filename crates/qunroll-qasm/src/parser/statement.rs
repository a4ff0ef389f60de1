//! Statement parsing for QASM 2.0.

use super::Parser;
use crate::ast::{Argument, Condition, GateCall, Operation, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.peek() {
            Some(Token::Include) => self.parse_include(),
            Some(Token::Qreg) => {
                let (name, size) = self.parse_register_decl(Token::Qreg)?;
                Ok(Statement::QregDecl { name, size })
            }
            Some(Token::Creg) => {
                let (name, size) = self.parse_register_decl(Token::Creg)?;
                Ok(Statement::CregDecl { name, size })
            }
            Some(Token::Opaque) => self.parse_opaque(),
            Some(Token::Gate) => Err(ParseError::Unsupported(format!(
                "gate definitions (line {})",
                self.position().line
            ))),
            Some(Token::If) => self.parse_if(),
            Some(_) => {
                let position = self.position();
                let op = self.parse_operation()?;
                Ok(Statement::Operation {
                    op,
                    condition: None,
                    position,
                })
            }
            None => Err(ParseError::UnexpectedEof("statement".into())),
        }
    }

    /// Parse include statement.
    fn parse_include(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Include)?;
        let path = match self.peek() {
            Some(Token::StringLiteral(s)) => s.clone(),
            _ => return Err(self.unexpected("string literal")),
        };
        self.pos += 1;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Include(path))
    }

    /// Parse `qreg name[n];` or `creg name[n];`.
    fn parse_register_decl(&mut self, keyword: Token) -> ParseResult<(String, u32)> {
        self.expect(keyword)?;
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.parse_u32()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;
        Ok((name, size))
    }

    /// Parse `opaque name(params) a, b;`.
    fn parse_opaque(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Opaque)?;
        let name = self.parse_identifier()?;
        let params = if self.consume(&Token::LParen) {
            let params = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.parse_identifier_list()?
            };
            self.expect(Token::RParen)?;
            params
        } else {
            vec![]
        };
        let qubits = self.parse_identifier_list()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::OpaqueDecl {
            name,
            params,
            qubits,
        })
    }

    /// Parse `if (creg == n) <operation>`.
    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let register = self.parse_identifier()?;
        self.expect(Token::EqEq)?;
        let value = self.parse_int_literal()?;
        self.expect(Token::RParen)?;

        let position = self.position();
        let op = self.parse_operation()?;
        if matches!(op, Operation::Barrier(_)) {
            return Err(ParseError::Unsupported(format!(
                "conditional barrier (line {})",
                position.line
            )));
        }
        Ok(Statement::Operation {
            op,
            condition: Some(Condition { register, value }),
            position,
        })
    }

    /// Parse a gate call, measure, reset or barrier.
    fn parse_operation(&mut self) -> ParseResult<Operation> {
        match self.peek() {
            Some(Token::Measure) => {
                self.pos += 1;
                let qubit = self.parse_argument()?;
                self.expect(Token::Arrow)?;
                let bit = self.parse_argument()?;
                self.expect(Token::Semicolon)?;
                Ok(Operation::Measure { qubit, bit })
            }
            Some(Token::Reset) => {
                self.pos += 1;
                let arg = self.parse_argument()?;
                self.expect(Token::Semicolon)?;
                Ok(Operation::Reset(arg))
            }
            Some(Token::Barrier) => {
                self.pos += 1;
                let args = self.parse_argument_list()?;
                self.expect(Token::Semicolon)?;
                Ok(Operation::Barrier(args))
            }
            Some(Token::Identifier(_) | Token::GateU | Token::GateCX) => {
                self.parse_gate_call().map(Operation::Gate)
            }
            _ => Err(self.unexpected("operation")),
        }
    }

    /// Parse `name(params) args;`.
    fn parse_gate_call(&mut self) -> ParseResult<GateCall> {
        let name = match self.advance() {
            Some(Token::Identifier(name)) => name,
            Some(Token::GateU) => "U".into(),
            Some(Token::GateCX) => "CX".into(),
            _ => return Err(ParseError::UnexpectedEof("gate name".into())),
        };

        let params = if self.consume(&Token::LParen) {
            let params = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
            params
        } else {
            vec![]
        };

        let args = self.parse_argument_list()?;
        self.expect(Token::Semicolon)?;

        Ok(GateCall { name, params, args })
    }

    fn parse_argument_list(&mut self) -> ParseResult<Vec<Argument>> {
        let mut args = vec![self.parse_argument()?];
        while self.consume(&Token::Comma) {
            args.push(self.parse_argument()?);
        }
        Ok(args)
    }

    /// Parse `reg` or `reg[i]`.
    fn parse_argument(&mut self) -> ParseResult<Argument> {
        let register = self.parse_identifier()?;
        if self.consume(&Token::LBracket) {
            let index = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Ok(Argument::indexed(register, index))
        } else {
            Ok(Argument::whole(register))
        }
    }
}
