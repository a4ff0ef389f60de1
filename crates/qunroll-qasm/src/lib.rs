//! `OpenQASM` 2.0 Parser and Emitter for qunroll
//!
//! Reads and writes the `qelib1` subset of OpenQASM 2.0 used to describe
//! circuits before and after basis decomposition.
//!
//! # Supported Features
//!
//! | Feature | Example |
//! |---------|---------|
//! | Version header | `OPENQASM 2.0;` |
//! | Includes (ignored) | `include "qelib1.inc";` |
//! | Registers | `qreg q[5];`, `creg c[5];` |
//! | Standard gates | `h q[0];`, `cx q[0], q[1];` |
//! | Built-ins | `U(θ,φ,λ) q[0];`, `CX q[0], q[1];` |
//! | Parameterized gates | `rz(pi/4) q[0];` |
//! | Register broadcast | `h q;`, `cx a, b;` |
//! | Measurement | `measure q -> c;` |
//! | Reset and barrier | `reset q[0];`, `barrier q;` |
//! | Classical control | `if (c == 1) x q[0];` |
//! | Opaque gates | `opaque oracle(theta) a, b;` |
//! | Comments | `// comment` |
//!
//! Gate definitions (`gate name ... { }`) are rejected; decompositions come
//! from a rule table instead.
//!
//! # Example: Parsing QASM
//!
//! ```rust
//! use qunroll_qasm::parse;
//!
//! let qasm = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     creg c[2];
//!     h q[0];
//!     cx q[0], q[1];
//!     measure q -> c;
//! "#;
//!
//! let circuit = parse(qasm).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.dag().count_ops()["measure"], 2);
//! ```
//!
//! # Example: Round-Trip
//!
//! ```rust
//! use qunroll_qasm::{emit, parse};
//!
//! let original = r#"
//! OPENQASM 2.0;
//! qreg q[3];
//! creg c[1];
//! h q[0];
//! cu1(pi/3) q[0], q[1];
//! measure q[1] -> c[0];
//! if (c == 1) ccx q[0], q[1], q[2];
//! "#;
//!
//! let circuit = parse(original).unwrap();
//! let emitted = emit(&circuit).unwrap();
//! let reparsed = parse(&emitted).unwrap();
//! assert!(circuit.dag().structurally_eq(reparsed.dag()));
//! ```

mod ast;
mod emitter;
mod error;
mod lexer;
mod parser;

pub use emitter::emit;
pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_ast};

/// AST types for callers that want the syntax tree.
pub mod syntax {
    pub use crate::ast::*;
}
