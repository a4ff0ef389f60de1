//! Expression parsing for QASM 2.0.

use super::Parser;
use crate::ast::{BinOp, Expression};
use crate::error::ParseResult;
use crate::lexer::Token;

impl Parser {
    /// Parse an expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_binary_expr(0)
    }

    /// Parse binary expression with precedence climbing.
    fn parse_binary_expr(&mut self, min_prec: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op_precedence(op);
            if prec < min_prec {
                break;
            }
            self.pos += 1;

            let right = self.parse_binary_expr(prec + 1)?;
            left = Expression::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse unary expression.
    fn parse_unary_expr(&mut self) -> ParseResult<Expression> {
        if self.consume(&Token::Minus) {
            let expr = self.parse_unary_expr()?;
            return Ok(Expression::Neg(Box::new(expr)));
        }
        if self.consume(&Token::Plus) {
            return self.parse_unary_expr();
        }
        self.parse_primary_expr()
    }

    /// Parse primary expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Expression> {
        let expr = match self.peek() {
            Some(&Token::IntLiteral(v)) => Expression::Int(v),
            Some(&Token::FloatLiteral(v)) => Expression::Float(v),
            Some(Token::Pi) => Expression::Pi,
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.pos += 1;
                if self.consume(&Token::LParen) {
                    let arg = self.parse_expression()?;
                    self.expect(Token::RParen)?;
                    return Ok(Expression::FnCall {
                        name,
                        arg: Box::new(arg),
                    });
                }
                return Ok(Expression::Identifier(name));
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                return Ok(expr);
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.pos += 1;
        Ok(expr)
    }

    /// Peek at binary operator.
    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            _ => None,
        }
    }

    /// Parse a comma-separated expression list, possibly empty.
    pub(super) fn parse_expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }
}

/// Get operator precedence.
fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Sub => 1,
        BinOp::Mul | BinOp::Div => 2,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinOp, Expression, Operation, Statement};
    use crate::parser::parse_ast;

    fn param(source: &str) -> Expression {
        let program = parse_ast(&format!("OPENQASM 2.0;\nrz({source}) q[0];")).unwrap();
        match &program.statements[0] {
            Statement::Operation {
                op: Operation::Gate(call),
                ..
            } => call.params[0].clone(),
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 groups the product.
        let Expression::BinOp { op, right, .. } = param("1 + 2 * 3") else {
            panic!("expected binary op");
        };
        assert_eq!(op, BinOp::Add);
        assert!(matches!(*right, Expression::BinOp { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_left_associative() {
        let Expression::BinOp { left, op, .. } = param("pi / 2 / 4") else {
            panic!("expected binary op");
        };
        assert_eq!(op, BinOp::Div);
        assert!(matches!(*left, Expression::BinOp { op: BinOp::Div, .. }));
    }

    #[test]
    fn test_unary_and_calls() {
        assert!(matches!(param("-pi"), Expression::Neg(_)));
        assert!(matches!(
            param("cos(pi / 4)"),
            Expression::FnCall { ref name, .. } if name == "cos"
        ));
        assert_eq!(param("(2)"), Expression::Int(2));
    }
}
