//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::f64::consts::PI;

use qunroll_compile::{BasisSet, Unroller};
use qunroll_ir::{
    Circuit, CircuitDag, GateKind, InstructionKind, ParameterExpression, QubitId, StandardGate,
};
use qunroll_sim::{Statevector, final_state, outcome_distribution};

pub const TOLERANCE: f64 = 1e-9;

/// Build the standard gate `name` with fixed, generic angles.
pub fn standard_gate(name: &str) -> StandardGate {
    let angles = [0.7, -1.3, PI / 5.0];
    (0..=angles.len())
        .find_map(|n| {
            let params = angles[..n].iter().map(|&a| ParameterExpression::from(a)).collect();
            StandardGate::from_name(name, params)
        })
        .unwrap_or_else(|| panic!("'{name}' is not a standard gate"))
}

/// Prepare a generic entangled state on `n` qubits.
pub fn prepare(circuit: &mut Circuit, qubits: &[QubitId]) {
    for (i, &q) in qubits.iter().enumerate() {
        circuit.ry(0.4 + 0.3 * i as f64, q).unwrap();
        circuit.rz(1.1 - 0.5 * i as f64, q).unwrap();
    }
    for pair in qubits.windows(2) {
        circuit.cx(pair[0], pair[1]).unwrap();
    }
}

pub fn unroll(dag: &CircuitDag, basis: &BasisSet) -> CircuitDag {
    Unroller::new(basis.clone()).unroll(dag).unwrap()
}

/// Every op in `dag` is a gate named in `basis`, or not a gate at all.
pub fn only_basis_gates(dag: &CircuitDag, basis: &BasisSet) -> bool {
    dag.topological_ops().unwrap().all(|(_, inst)| match &inst.kind {
        InstructionKind::Gate(gate) => basis.contains(gate.name()),
        _ => true,
    })
}

pub fn same_state(a: &CircuitDag, b: &CircuitDag) -> bool {
    final_state(a)
        .unwrap()
        .equiv_up_to_global_phase(&final_state(b).unwrap(), TOLERANCE)
}

pub fn same_distribution(a: &CircuitDag, b: &CircuitDag) -> bool {
    qunroll_sim::distributions_close(
        &outcome_distribution(a).unwrap(),
        &outcome_distribution(b).unwrap(),
        TOLERANCE,
    )
}

/// Run the gates of a measurement-free DAG on an arbitrary input state.
///
/// Qubit `QubitId(k)` is bit `k` of the state index.
pub fn run_on(mut state: Statevector, dag: &CircuitDag) -> Statevector {
    for (_, inst) in dag.topological_ops().unwrap() {
        let InstructionKind::Gate(gate) = &inst.kind else {
            continue;
        };
        let GateKind::Standard(g) = &gate.kind else {
            panic!("custom gate {} in simulated circuit", gate.name());
        };
        let positions: Vec<usize> = inst.qubits.iter().map(|q| q.0 as usize).collect();
        state.apply_gate(g, &positions).unwrap();
    }
    state
}
