//! Verification passes for checking unroller output.

use std::collections::BTreeSet;

use tracing::debug;

use qunroll_ir::CircuitDag;

use crate::basis::BasisSet;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Result of basis verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatesInBasisResult {
    /// Whether every gate is in the basis.
    pub all_in_basis: bool,
    /// Names of gates found outside the basis.
    pub offending: BTreeSet<String>,
}

/// Analysis pass that checks every gate of the DAG is in a basis.
///
/// Directives are always allowed. The result is stored in the
/// `PropertySet` as a [`GatesInBasisResult`].
#[derive(Debug, Clone, Default)]
pub struct GatesInBasis {
    basis: Option<BasisSet>,
}

impl GatesInBasis {
    /// Check against `PropertySet::basis_gates`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check against a fixed basis.
    pub fn with_basis(basis: BasisSet) -> Self {
        Self { basis: Some(basis) }
    }

    /// Compute the result without going through a `PropertySet`.
    pub fn check(dag: &CircuitDag, basis: &BasisSet) -> GatesInBasisResult {
        let offending: BTreeSet<String> = dag
            .graph()
            .node_weights()
            .filter_map(|node| node.instruction())
            .filter(|inst| inst.is_gate() && !basis.contains(inst.name()))
            .map(|inst| inst.name().to_string())
            .collect();
        GatesInBasisResult {
            all_in_basis: offending.is_empty(),
            offending,
        }
    }
}

impl Pass for GatesInBasis {
    fn name(&self) -> &'static str {
        "GatesInBasis"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = self
            .basis
            .as_ref()
            .or(properties.basis_gates.as_ref())
            .ok_or_else(|| {
                CompileError::InvalidConfiguration("no basis to verify against".into())
            })?;

        let result = Self::check(dag, basis);
        debug!(
            all_in_basis = result.all_in_basis,
            offending = ?result.offending,
            "basis verification"
        );
        properties.insert(result);
        Ok(())
    }
}
