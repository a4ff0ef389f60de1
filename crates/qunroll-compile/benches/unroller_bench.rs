//! Benchmarks for basis decomposition
//!
//! Run with: cargo bench -p qunroll-compile

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qunroll_compile::{BasisSet, Unroller};
use qunroll_ir::{Circuit, CircuitDag, QubitId, StandardGate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn from_qasm(source: &str) -> CircuitDag {
    qunroll_qasm::parse(source).unwrap().into_dag()
}

/// Benchmark the three reference circuits
fn bench_reference_circuits(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference");

    let basic = from_qasm("OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg qr[1];\nh qr[0];\n");
    let unroller = Unroller::new(BasisSet::new(["u2"]));
    group.bench_function("basic", |b| {
        b.iter(|| unroller.unroll(black_box(&basic)).unwrap());
    });

    let toffoli = from_qasm(
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg qr1[2];\nqreg qr2[1];\n\
         ccx qr1[0], qr1[1], qr2[0];\n",
    );
    let unroller = Unroller::new(BasisSet::clifford_t());
    group.bench_function("toffoli", |b| {
        b.iter(|| unroller.unroll(black_box(&toffoli)).unwrap());
    });

    let chain = from_qasm(
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg qr[1];\ncreg cr[1];\n\
         h qr;\ntdg qr;\nz qr;\nt qr;\nry(0.5) qr;\nrz(0.3) qr;\nrx(0.1) qr;\n\
         measure qr -> cr;\nif (cr == 1) x qr;\nif (cr == 1) y qr;\nif (cr == 1) z qr;\n",
    );
    let unroller = Unroller::new(BasisSet::new(["u1", "u2", "u3"]));
    group.bench_function("chain_conditional", |b| {
        b.iter(|| unroller.unroll(black_box(&chain)).unwrap());
    });

    group.finish();
}

fn random_circuit(num_qubits: u32, depth: usize, seed: u64) -> CircuitDag {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut circuit = Circuit::with_size("random", num_qubits, 0);
    for _ in 0..depth {
        for _ in 0..num_qubits {
            let name = StandardGate::NAMES[rng.gen_range(0..StandardGate::NAMES.len())];
            let gate = (0..=3)
                .find_map(|n| {
                    let params = (0..n).map(|_| rng.gen_range(-3.0f64..3.0).into()).collect();
                    StandardGate::from_name(name, params)
                })
                .unwrap();
            let mut qubits: Vec<u32> = (0..num_qubits).collect();
            let mut operands = Vec::new();
            for _ in 0..gate.num_qubits() {
                operands.push(QubitId(qubits.swap_remove(rng.gen_range(0..qubits.len()))));
            }
            circuit.gate(gate, operands).unwrap();
        }
    }
    circuit.into_dag()
}

/// Benchmark random circuits of growing size, with and without memoization
fn bench_random_circuits(c: &mut Criterion) {
    let mut group = c.benchmark_group("random");

    for &(num_qubits, depth) in &[(5, 10), (10, 20), (20, 40)] {
        let dag = random_circuit(num_qubits, depth, 42);
        let label = format!("{num_qubits}x{depth}");
        for memoize in [true, false] {
            let unroller = Unroller::new(BasisSet::ibm_qx()).with_memoize(memoize);
            let id = if memoize { "memoized" } else { "plain" };
            group.bench_with_input(BenchmarkId::new(id, &label), &dag, |b, dag| {
                b.iter(|| unroller.unroll(black_box(dag)).unwrap());
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_reference_circuits, bench_random_circuits);
criterion_main!(benches);
