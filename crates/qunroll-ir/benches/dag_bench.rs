//! Benchmarks for circuit DAG construction and traversal
//!
//! Run with: cargo bench -p qunroll-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qunroll_ir::{Circuit, QubitId};

fn layered_circuit(num_qubits: u32, layers: u32) -> Circuit {
    let mut circuit = Circuit::with_size("bench", num_qubits, 0);
    for _ in 0..layers {
        for q in 0..num_qubits {
            circuit.h(QubitId(q)).unwrap();
        }
        for q in 0..num_qubits - 1 {
            circuit.cx(QubitId(q), QubitId(q + 1)).unwrap();
        }
    }
    circuit
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("dag_apply");
    for num_qubits in [5u32, 20, 50] {
        group.bench_with_input(
            BenchmarkId::new("layers_10", num_qubits),
            &num_qubits,
            |b, &n| b.iter(|| layered_circuit(black_box(n), 10)),
        );
    }
    group.finish();
}

fn bench_topological_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("dag_topological_ops");
    for num_qubits in [5u32, 20, 50] {
        let dag = layered_circuit(num_qubits, 10).into_dag();
        group.bench_with_input(BenchmarkId::new("layers_10", num_qubits), &dag, |b, dag| {
            b.iter(|| black_box(dag.topological_ops().unwrap().count()));
        });
    }
    group.finish();
}

fn bench_depth(c: &mut Criterion) {
    let dag = layered_circuit(20, 20).into_dag();
    c.bench_function("dag_depth_20x20", |b| {
        b.iter(|| black_box(dag.depth().unwrap()));
    });
}

criterion_group!(benches, bench_apply, bench_topological_ops, bench_depth);
criterion_main!(benches);
