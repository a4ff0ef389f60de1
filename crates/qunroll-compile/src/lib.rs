//! Basis decomposition for quantum circuits.
//!
//! This crate rewrites a [`CircuitDag`](qunroll_ir::CircuitDag) so that every
//! gate belongs to a caller-supplied [`BasisSet`]. Gates outside the basis
//! are expanded recursively through a [`RuleTable`] until nothing outside
//! the basis remains. Classical conditions are copied onto every gate of an
//! expansion, and the relative order of operations on each wire is kept.
//!
//! # Architecture
//!
//! ```text
//! Input DAG
//!     │
//!     ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (basis gates, analysis results)
//! └─────────────┘
//!     │
//!     ├── Unroller      (RuleTable, max depth, memoization)
//!     └── GatesInBasis  (records GatesInBasisResult)
//!     │
//!     ▼
//! Output DAG (basis gates and directives only)
//! ```
//!
//! # Example
//!
//! ```rust
//! use qunroll_compile::{BasisSet, PassManagerBuilder};
//! use qunroll_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("toffoli", 3, 0);
//! circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
//!
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_basis(BasisSet::clifford_t())
//!     .build();
//!
//! let mut dag = circuit.into_dag();
//! pm.run(&mut dag, &mut props).unwrap();
//! assert_eq!(dag.num_ops(), 15);
//! ```
//!
//! # Custom rules
//!
//! ```rust
//! use qunroll_compile::{BasisSet, Rule, RuleTable, Unroller};
//! use qunroll_ir::{Circuit, CustomGate, Instruction, QubitId, StandardGate};
//!
//! let rules = RuleTable::standard().with_rule(
//!     "bell",
//!     Rule::new(2, 0, |_, q| {
//!         vec![
//!             Instruction::single_qubit_gate(StandardGate::H, q[0]),
//!             Instruction::two_qubit_gate(StandardGate::CX, q[0], q[1]),
//!         ]
//!     }),
//! );
//!
//! let mut circuit = Circuit::with_size("bell", 2, 0);
//! circuit.gate(CustomGate::new("bell", 2), [QubitId(0), QubitId(1)]).unwrap();
//!
//! let unrolled = Unroller::new(BasisSet::u3_cx())
//!     .with_rules(rules)
//!     .unroll(circuit.dag())
//!     .unwrap();
//! assert_eq!(unrolled.count_ops()["cx"], 1);
//! ```

pub mod basis;
pub mod config;
pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;
pub mod rules;
pub mod unroller;

pub use basis::BasisSet;
pub use config::UnrollerConfig;
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{GatesInBasis, GatesInBasisResult};
pub use property::PropertySet;
pub use rules::{Rule, RuleTable};
pub use unroller::{DEFAULT_MAX_DEPTH, Unroller};
