//! Property-based tests for QASM roundtrip conversion.
//!
//! circuit → QASM → circuit must give a structurally equal circuit. Bits
//! outside any register come back inside a fresh register but keep their ids.

use proptest::prelude::*;
use qunroll_ir::{
    Circuit, ClassicalCondition, ClbitId, Instruction, IrResult, QubitId, StandardGate,
};
use qunroll_qasm::{emit, parse};

/// Operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum Op {
    H(u32),
    Rz(f64, u32),
    U3(f64, f64, f64, u32),
    Cx(u32, u32),
    Cu1(f64, u32, u32),
    Ccx(u32, u32, u32),
    Measure(u32),
    CondX(u64, u32),
    Reset(u32),
}

impl Op {
    /// Apply with operand indices taken modulo the wire counts.
    fn apply(self, circuit: &mut Circuit, q: &[QubitId], c: &[ClbitId]) -> IrResult<()> {
        let q = |i: u32| q[i as usize % q.len()];
        let c = |i: u32| c[i as usize % c.len()];
        let applied = match self {
            Op::H(a) => circuit.h(q(a)),
            Op::Rz(t, a) => circuit.rz(t, q(a)),
            Op::U3(t, p, l, a) => circuit.u3(t, p, l, q(a)),
            Op::Cx(a, b) => circuit.cx(q(a), q(b)),
            Op::Cu1(t, a, b) => circuit.cu1(t, q(a), q(b)),
            Op::Ccx(a, b, t) => circuit.ccx(q(a), q(b), q(t)),
            Op::Measure(a) => circuit.measure(q(a), c(a)),
            Op::CondX(v, a) => {
                circuit.gate_if(StandardGate::X, [q(a)], ClassicalCondition::register("c", v))
            }
            Op::Reset(a) => circuit.reset(q(a)),
        };
        applied.map(|_| ())
    }
}

const NUM_QUBITS: u32 = 3;

fn arb_op() -> impl Strategy<Value = Op> {
    let q = 0..NUM_QUBITS;
    let angle = -10.0f64..10.0;
    prop_oneof![
        q.clone().prop_map(Op::H),
        (angle.clone(), q.clone()).prop_map(|(t, a)| Op::Rz(t, a)),
        (angle.clone(), angle.clone(), angle.clone(), q.clone())
            .prop_map(|(t, p, l, a)| Op::U3(t, p, l, a)),
        (q.clone(), 1..NUM_QUBITS).prop_map(|(a, d)| Op::Cx(a, (a + d) % NUM_QUBITS)),
        (angle, q.clone(), 1..NUM_QUBITS)
            .prop_map(|(t, a, d)| Op::Cu1(t, a, (a + d) % NUM_QUBITS)),
        q.clone().prop_map(|a| Op::Ccx(a, (a + 1) % 3, (a + 2) % 3)),
        q.clone().prop_map(Op::Measure),
        (0..8u64, q.clone()).prop_map(|(v, a)| Op::CondX(v, a)),
        q.prop_map(Op::Reset),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    prop::collection::vec(arb_op(), 0..25).prop_map(|ops| {
        let mut circuit = Circuit::new("roundtrip");
        let q = circuit.add_qreg("q", NUM_QUBITS).unwrap();
        let c = circuit.add_creg("c", NUM_QUBITS).unwrap();
        for op in ops {
            op.apply(&mut circuit, &q, &c).unwrap();
        }
        circuit
    })
}

/// Three qubits spread over registers and loose qubits in a random order.
fn arb_mixed_layout_circuit() -> impl Strategy<Value = Circuit> {
    (
        prop::sample::select(vec![
            vec![None, Some(2)],
            vec![Some(1), None, Some(1)],
            vec![Some(2), None],
            vec![None, None, Some(1)],
            vec![None, Some(1), None],
            vec![None, None, None],
        ]),
        prop::collection::vec(arb_op(), 0..20),
    )
        .prop_map(|(layout, ops)| {
            let mut circuit = Circuit::new("mixed");
            let mut q = Vec::new();
            for (i, piece) in layout.into_iter().enumerate() {
                match piece {
                    Some(size) => q.extend(circuit.add_qreg(format!("r{i}"), size).unwrap()),
                    None => q.push(circuit.add_qubit()),
                }
            }
            let c = circuit.add_creg("c", NUM_QUBITS).unwrap();
            for op in ops {
                op.apply(&mut circuit, &q, &c).unwrap();
            }
            circuit
        })
}

fn instructions(circuit: &Circuit) -> Vec<Instruction> {
    circuit
        .dag()
        .topological_ops()
        .unwrap()
        .map(|(_, inst)| inst.clone())
        .collect()
}

proptest! {
    #[test]
    fn roundtrip_is_structurally_equal(circuit in arb_circuit()) {
        let qasm = emit(&circuit).unwrap();
        let reparsed = parse(&qasm).unwrap();
        prop_assert!(
            circuit.dag().structurally_eq(reparsed.dag()),
            "roundtrip changed the circuit:\n{qasm}"
        );
    }

    #[test]
    fn roundtrip_keeps_loose_qubit_ids(circuit in arb_mixed_layout_circuit()) {
        let qasm = emit(&circuit).unwrap();
        let reparsed = parse(&qasm).unwrap();
        prop_assert_eq!(instructions(&reparsed), instructions(&circuit), "{}", qasm);
    }

    #[test]
    fn emit_is_deterministic(circuit in arb_circuit()) {
        prop_assert_eq!(emit(&circuit).unwrap(), emit(&circuit).unwrap());
    }
}

#[test]
fn roundtrip_preserves_register_layout() {
    let source = "OPENQASM 2.0;\nqreg a[2];\nqreg b[1];\ncreg m[2];\ncx a[1], b[0];\nmeasure a -> m;\n";
    let circuit = parse(source).unwrap();
    let reparsed = parse(&emit(&circuit).unwrap()).unwrap();
    assert!(circuit.dag().structurally_eq(reparsed.dag()));
    let names: Vec<_> = reparsed.dag().qregs().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
}
