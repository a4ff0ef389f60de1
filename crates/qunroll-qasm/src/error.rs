//! Error types for the QASM parser and emitter.

use thiserror::Error;

/// Errors that can occur while parsing or emitting QASM.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Unexpected token.
    #[error("Unexpected token at line {line}, column {column}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    /// Invalid version.
    #[error("Invalid OPENQASM version: {0} (expected 2.0)")]
    InvalidVersion(String),

    /// Undefined register or parameter name.
    #[error("Undefined identifier: {0}")]
    UndefinedIdentifier(String),

    /// Duplicate declaration.
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// Call to a gate that is neither standard nor declared.
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// Wrong number of arguments.
    #[error("Gate '{gate}' expects {expected} qubits, got {got}")]
    WrongQubitCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Wrong number of parameters.
    #[error("Gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Index out of bounds.
    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: usize,
        size: usize,
    },

    /// Whole-register arguments of different sizes.
    #[error("Register size mismatch in '{0}'")]
    RegisterSizeMismatch(String),

    /// Construct outside the supported subset.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] qunroll_ir::IrError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
