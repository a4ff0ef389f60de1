//! Abstract Syntax Tree for `OpenQASM` 2.0.

use serde::{Deserialize, Serialize};

/// A complete QASM program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// QASM version (e.g., "2.0").
    pub version: String,
    /// Statements in the program.
    pub statements: Vec<Statement>,
}

/// Source position of a statement, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A statement in a QASM program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// Include statement. Accepted and ignored.
    Include(String),

    /// `qreg name[n];`
    QregDecl { name: String, size: u32 },

    /// `creg name[n];`
    CregDecl { name: String, size: u32 },

    /// `opaque name(params) args;`
    OpaqueDecl {
        name: String,
        params: Vec<String>,
        qubits: Vec<String>,
    },

    /// Quantum operation, possibly under a classical condition.
    Operation {
        op: Operation,
        condition: Option<Condition>,
        position: Position,
    },
}

/// A quantum operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    /// Gate application.
    Gate(GateCall),
    /// `measure a -> b;`
    Measure { qubit: Argument, bit: Argument },
    /// `reset a;`
    Reset(Argument),
    /// `barrier a, b;`
    Barrier(Vec<Argument>),
}

/// `if (creg == value)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub register: String,
    pub value: u64,
}

/// A gate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name.
    pub name: String,
    /// Gate parameters.
    pub params: Vec<Expression>,
    /// Arguments the gate acts on.
    pub args: Vec<Argument>,
}

/// A register element `q[i]` or a whole register `q`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub register: String,
    pub index: Option<u32>,
}

impl Argument {
    /// Reference a single register element.
    pub fn indexed(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Reference a whole register.
    pub fn whole(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Integer literal.
    Int(u64),
    /// Float literal.
    Float(f64),
    /// Pi constant.
    Pi,
    /// Identifier reference.
    Identifier(String),
    /// Binary operation.
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    /// Unary negation.
    Neg(Box<Expression>),
    /// Function call.
    FnCall { name: String, arg: Box<Expression> },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}
