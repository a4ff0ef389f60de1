//! qunroll circuit intermediate representation
//!
//! This crate provides the data structures the basis decomposer works on:
//! qubit and classical-bit identifiers grouped into registers, parameter
//! expressions, the `qelib1` gate set, classical conditions, and an
//! arena-backed circuit DAG.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`], and the
//!   [`QuantumRegister`] / [`ClassicalRegister`] groups that name them
//! - **Gates**: [`StandardGate`] for the `qelib1` library and [`CustomGate`]
//!   for opaque user-defined operations
//! - **Parameters**: [`ParameterExpression`] for numeric or symbolic angles
//! - **Instructions**: [`Instruction`] combining an operation, its operands and
//!   an optional [`ClassicalCondition`]
//! - **DAG**: [`CircuitDag`], one wire per qubit and per classical bit
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example: a conditioned correction
//!
//! ```rust
//! use qunroll_ir::{Circuit, ClassicalCondition, StandardGate};
//!
//! let mut circuit = Circuit::new("teleport_fixup");
//! let q = circuit.add_qreg("q", 2).unwrap();
//! let c = circuit.add_creg("c", 1).unwrap();
//!
//! circuit.h(q[0]).unwrap().cx(q[0], q[1]).unwrap();
//! circuit.measure(q[0], c[0]).unwrap();
//! circuit
//!     .gate_if(StandardGate::X, [q[1]], ClassicalCondition::register("c", 1))
//!     .unwrap();
//!
//! assert_eq!(circuit.dag().num_ops(), 4);
//! assert_eq!(circuit.depth().unwrap(), 4);
//! ```

pub mod circuit;
pub mod condition;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use condition::{ClassicalCondition, ConditionTarget};
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use parameter::{ParamFunction, ParameterExpression};
pub use qubit::{
    ClassicalRegister, Clbit, ClbitId, QuantumRegister, Qubit, QubitId, Register,
};
