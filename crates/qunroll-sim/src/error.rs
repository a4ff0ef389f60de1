//! Error types for the simulator.

use qunroll_ir::IrError;
use thiserror::Error;

/// Errors that can occur during simulation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// A custom gate has no matrix to apply.
    #[error("Cannot simulate custom gate '{0}'")]
    CustomGate(String),

    /// A gate parameter is not numeric.
    #[error("Gate '{gate}' has a symbolic parameter: {parameter}")]
    SymbolicParameter { gate: String, parameter: String },

    /// Circuit is wider than the simulator supports.
    #[error("Circuit has {required} qubits, simulator supports at most {max}")]
    TooManyQubits { required: usize, max: usize },

    /// Outcome keys are 64 bits wide.
    #[error("Circuit has {required} classical bits, simulator supports at most {max}")]
    TooManyClbits { required: usize, max: usize },

    /// Measurement and reset history split into too many branches.
    #[error("Simulation needs more than {max} classical branches")]
    TooManyBranches { max: usize },

    /// The operation needs a measurement-free circuit.
    #[error("Operation '{0}' is not allowed here")]
    UnexpectedOperation(String),

    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

/// Result type for simulation.
pub type SimResult<T> = Result<T, SimError>;
