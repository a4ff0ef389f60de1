//! Property tests for the statevector simulator.

use proptest::prelude::*;
use qunroll_ir::StandardGate;
use qunroll_sim::Statevector;

const NUM_QUBITS: usize = 3;

fn gate_strategy() -> impl Strategy<Value = (StandardGate, Vec<usize>)> {
    let angle = -6.3f64..6.3;
    prop_oneof![
        (0..NUM_QUBITS).prop_map(|q| (StandardGate::H, vec![q])),
        (0..NUM_QUBITS).prop_map(|q| (StandardGate::T, vec![q])),
        (0..NUM_QUBITS).prop_map(|q| (StandardGate::SX, vec![q])),
        (angle.clone(), 0..NUM_QUBITS).prop_map(|(t, q)| (StandardGate::Ry(t.into()), vec![q])),
        (angle, 0..NUM_QUBITS).prop_map(|(t, q)| (StandardGate::Rz(t.into()), vec![q])),
        (0..NUM_QUBITS, 1..NUM_QUBITS)
            .prop_map(|(c, d)| (StandardGate::CX, vec![c, (c + d) % NUM_QUBITS])),
    ]
}

proptest! {
    #[test]
    fn gates_preserve_norm(gates in prop::collection::vec(gate_strategy(), 0..40)) {
        let mut state = Statevector::new(NUM_QUBITS);
        for (gate, qubits) in &gates {
            state.apply_gate(gate, qubits).unwrap();
        }
        let norm: f64 = state.probabilities().iter().sum();
        prop_assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn collapse_renormalizes(gates in prop::collection::vec(gate_strategy(), 1..20), qubit in 0..NUM_QUBITS) {
        let mut state = Statevector::new(NUM_QUBITS);
        for (gate, qubits) in &gates {
            state.apply_gate(gate, qubits).unwrap();
        }
        let p_one = state.probability_one(qubit);
        prop_assume!(p_one > 1e-6);
        state.collapse(qubit, true);
        prop_assert!((state.probability_one(qubit) - 1.0).abs() < 1e-9);
    }
}
