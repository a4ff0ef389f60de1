//! Error types for the compilation crate.

use qunroll_ir::IrError;
use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// An operation cannot be expressed in the target basis.
    ///
    /// Raised when a gate outside the basis has no decomposition rule, when a
    /// rule does not fit the gate it is registered for, or when expansion
    /// nests deeper than the configured bound.
    #[error("Unsupported operation '{name}': {reason}")]
    UnsupportedOperation { name: String, reason: String },

    /// The input graph violates a structural invariant.
    #[error("Malformed circuit graph: {0}")]
    MalformedGraph(String),

    /// Invalid pass or unroller configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl CompileError {
    pub(crate) fn unsupported(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CompileError::UnsupportedOperation {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<IrError> for CompileError {
    fn from(err: IrError) -> Self {
        CompileError::MalformedGraph(err.to_string())
    }
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
