//! Exact statevector simulation for checking circuit rewrites.
//!
//! Two circuits are equivalent when their final states agree up to a global
//! phase ([`final_state`] plus [`Statevector::equiv_up_to_global_phase`]), or,
//! for circuits with measurement and classical control, when their outcome
//! distributions agree ([`outcome_distribution`] plus
//! [`distributions_close`]).
//!
//! # Example
//!
//! ```rust
//! use qunroll_ir::{Circuit, QubitId};
//! use qunroll_sim::final_state;
//!
//! let mut a = Circuit::with_size("a", 1, 0);
//! a.h(QubitId(0)).unwrap();
//! a.h(QubitId(0)).unwrap();
//!
//! let b = Circuit::with_size("b", 1, 0);
//!
//! let sa = final_state(a.dag()).unwrap();
//! let sb = final_state(b.dag()).unwrap();
//! assert!(sa.equiv_up_to_global_phase(&sb, 1e-10));
//! ```

pub mod error;
pub mod matrix;
pub mod simulator;
pub mod statevector;

pub use error::{SimError, SimResult};
pub use simulator::{
    MAX_BRANCHES, MAX_CLBITS, MAX_QUBITS, distributions_close, final_state, outcome_distribution,
    sample_counts,
};
pub use statevector::Statevector;
