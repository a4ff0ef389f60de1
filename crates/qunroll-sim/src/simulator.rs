//! Exact circuit simulation over a DAG.

use std::collections::BTreeMap;

use rand::Rng;
use rustc_hash::FxHashMap;
use tracing::debug;

use qunroll_ir::{CircuitDag, ClbitId, GateKind, Instruction, InstructionKind, QubitId};

use crate::error::{SimError, SimResult};
use crate::statevector::Statevector;

/// Maximum number of qubits the simulator accepts.
pub const MAX_QUBITS: usize = 16;

/// Maximum number of classical bits, the width of an outcome key.
pub const MAX_CLBITS: usize = 64;

/// Maximum number of classical histories tracked at once.
///
/// Branches are never merged, since equal classical bits can hold different
/// quantum states, so each splitting measurement or reset can double the
/// count.
pub const MAX_BRANCHES: usize = 4096;

/// Branches below this probability are dropped.
const PRUNE: f64 = 1e-12;

/// Dense positions for the DAG's qubits and classical bits, in id order.
struct Layout {
    qubits: FxHashMap<QubitId, usize>,
    clbits: FxHashMap<ClbitId, usize>,
}

impl Layout {
    fn of(dag: &CircuitDag) -> SimResult<Self> {
        if dag.num_qubits() > MAX_QUBITS {
            return Err(SimError::TooManyQubits {
                required: dag.num_qubits(),
                max: MAX_QUBITS,
            });
        }
        if dag.num_clbits() > MAX_CLBITS {
            return Err(SimError::TooManyClbits {
                required: dag.num_clbits(),
                max: MAX_CLBITS,
            });
        }
        Ok(Self {
            qubits: dag.qubits().enumerate().map(|(i, q)| (q, i)).collect(),
            clbits: dag.clbits().enumerate().map(|(i, c)| (c, i)).collect(),
        })
    }

    fn qubit(&self, q: QubitId) -> SimResult<usize> {
        self.qubits.get(&q).copied().ok_or(SimError::Ir(
            qunroll_ir::IrError::QubitNotFound {
                qubit: q,
                op_name: None,
            },
        ))
    }

    fn clbit(&self, c: ClbitId) -> SimResult<usize> {
        self.clbits.get(&c).copied().ok_or(SimError::Ir(
            qunroll_ir::IrError::ClbitNotFound {
                clbit: c,
                op_name: None,
            },
        ))
    }

    fn positions(&self, qubits: &[QubitId]) -> SimResult<Vec<usize>> {
        qubits.iter().map(|&q| self.qubit(q)).collect()
    }
}

fn apply_gate(state: &mut Statevector, inst: &Instruction, layout: &Layout) -> SimResult<()> {
    let InstructionKind::Gate(gate) = &inst.kind else {
        return Err(SimError::UnexpectedOperation(inst.name().to_string()));
    };
    match &gate.kind {
        GateKind::Standard(g) => state.apply_gate(g, &layout.positions(&inst.qubits)?),
        GateKind::Custom(c) => Err(SimError::CustomGate(c.name.clone())),
    }
}

/// Final state of a measurement-free, unconditioned circuit.
pub fn final_state(dag: &CircuitDag) -> SimResult<Statevector> {
    let layout = Layout::of(dag)?;
    let mut state = Statevector::new(dag.num_qubits());

    for (_, inst) in dag.topological_ops()? {
        match &inst.kind {
            InstructionKind::Barrier | InstructionKind::Delay { .. } => {}
            InstructionKind::Gate(_) if inst.condition.is_none() => {
                apply_gate(&mut state, inst, &layout)?;
            }
            _ => return Err(SimError::UnexpectedOperation(inst.name().to_string())),
        }
    }
    Ok(state)
}

/// One classical history: its probability, quantum state and bit values.
#[derive(Clone)]
struct Branch {
    probability: f64,
    state: Statevector,
    clbits: u64,
}

impl Branch {
    /// Split on measuring `qubit`; each surviving child gets the outcome.
    fn measure(self, qubit: usize) -> impl Iterator<Item = (Branch, bool)> {
        let p_one = self.state.probability_one(qubit);
        let mut children = Vec::with_capacity(2);
        for (outcome, p) in [(false, 1.0 - p_one), (true, p_one)] {
            if self.probability * p > PRUNE {
                let mut child = self.clone();
                child.state.collapse(qubit, outcome);
                child.probability *= p;
                children.push((child, outcome));
            }
        }
        children.into_iter()
    }
}

/// Exact distribution of final classical register values.
///
/// Each measurement splits every branch by outcome, reset measures and
/// flips back to |0⟩, and conditioned operations apply per branch. Keys
/// hold classical bit `i` (in id order) at bit `i`. Fails with
/// [`SimError::TooManyBranches`] once more than [`MAX_BRANCHES`] histories
/// are live.
pub fn outcome_distribution(dag: &CircuitDag) -> SimResult<BTreeMap<u64, f64>> {
    let layout = Layout::of(dag)?;
    let mut branches = vec![Branch {
        probability: 1.0,
        state: Statevector::new(dag.num_qubits()),
        clbits: 0,
    }];

    for (_, inst) in dag.topological_ops()? {
        let mut next = Vec::with_capacity(branches.len());
        for mut branch in branches {
            if let Some(condition) = &inst.condition {
                let bits = branch.clbits;
                let satisfied = condition.is_satisfied(dag.cregs(), |c| {
                    layout
                        .clbits
                        .get(&c)
                        .is_some_and(|&pos| bits >> pos & 1 == 1)
                });
                if !satisfied? {
                    next.push(branch);
                    continue;
                }
            }

            match &inst.kind {
                InstructionKind::Gate(_) => {
                    apply_gate(&mut branch.state, inst, &layout)?;
                    next.push(branch);
                }
                InstructionKind::Measure => {
                    let mut pending = vec![branch];
                    for (&q, &c) in inst.qubits.iter().zip(&inst.clbits) {
                        let (qubit, bit) = (layout.qubit(q)?, layout.clbit(c)?);
                        pending = pending
                            .into_iter()
                            .flat_map(|b| b.measure(qubit))
                            .map(|(mut b, outcome)| {
                                b.clbits = (b.clbits & !(1 << bit)) | (u64::from(outcome) << bit);
                                b
                            })
                            .collect();
                    }
                    next.extend(pending);
                }
                InstructionKind::Reset => {
                    let mut pending = vec![branch];
                    for &q in &inst.qubits {
                        let qubit = layout.qubit(q)?;
                        pending = pending
                            .into_iter()
                            .flat_map(|b| b.measure(qubit))
                            .map(|(mut b, outcome)| {
                                if outcome {
                                    b.state.apply_matrix(&[], qubit, &crate::matrix::x());
                                }
                                b
                            })
                            .collect();
                    }
                    next.extend(pending);
                }
                InstructionKind::Barrier | InstructionKind::Delay { .. } => next.push(branch),
            }
        }
        if next.len() > MAX_BRANCHES {
            return Err(SimError::TooManyBranches { max: MAX_BRANCHES });
        }
        branches = next;
    }

    debug!(branches = branches.len(), "simulation finished");

    let mut distribution = BTreeMap::new();
    for branch in branches {
        *distribution.entry(branch.clbits).or_insert(0.0) += branch.probability;
    }
    Ok(distribution)
}

/// Check two outcome distributions agree within `tolerance` on every key.
pub fn distributions_close(
    a: &BTreeMap<u64, f64>,
    b: &BTreeMap<u64, f64>,
    tolerance: f64,
) -> bool {
    a.keys()
        .chain(b.keys())
        .all(|k| (a.get(k).unwrap_or(&0.0) - b.get(k).unwrap_or(&0.0)).abs() <= tolerance)
}

/// Draw `shots` samples from an outcome distribution.
pub fn sample_counts(
    distribution: &BTreeMap<u64, f64>,
    shots: u32,
    rng: &mut impl Rng,
) -> BTreeMap<u64, u32> {
    let mut counts = BTreeMap::new();
    let Some(&last) = distribution.keys().next_back() else {
        return counts;
    };
    for _ in 0..shots {
        let r: f64 = rng.r#gen();
        let mut cumulative = 0.0;
        let outcome = distribution
            .iter()
            .find(|&(_, &p)| {
                cumulative += p;
                r < cumulative
            })
            .map_or(last, |(&k, _)| k);
        *counts.entry(outcome).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use qunroll_ir::{Circuit, ClassicalCondition, CustomGate};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPS: f64 = 1e-10;

    #[test]
    fn test_bell_distribution() {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure_all().unwrap();

        let dist = outcome_distribution(circuit.dag()).unwrap();
        assert_eq!(dist.len(), 2);
        assert!((dist[&0b00] - 0.5).abs() < EPS);
        assert!((dist[&0b11] - 0.5).abs() < EPS);
    }

    #[test]
    fn test_conditioned_correction() {
        // Measure a |+⟩ qubit, then flip a second qubit only when it read 1.
        let mut circuit = Circuit::new("feedforward");
        let q = circuit.add_qreg("q", 2).unwrap();
        let c = circuit.add_creg("c", 2).unwrap();
        circuit.h(q[0]).unwrap();
        circuit.measure(q[0], c[0]).unwrap();
        circuit
            .gate_if(
                qunroll_ir::StandardGate::X,
                [q[1]],
                ClassicalCondition::register("c", 1),
            )
            .unwrap();
        circuit.measure(q[1], c[1]).unwrap();

        let dist = outcome_distribution(circuit.dag()).unwrap();
        assert!((dist[&0b00] - 0.5).abs() < EPS);
        assert!((dist[&0b11] - 0.5).abs() < EPS);
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut circuit = Circuit::with_size("reset", 1, 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.reset(QubitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let dist = outcome_distribution(circuit.dag()).unwrap();
        assert!((dist[&0] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_final_state_rejects_measurement() {
        let mut circuit = Circuit::with_size("m", 1, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        assert!(matches!(
            final_state(circuit.dag()),
            Err(SimError::UnexpectedOperation(_))
        ));
    }

    #[test]
    fn test_custom_gate_rejected() {
        let mut circuit = Circuit::with_size("custom", 1, 0);
        circuit.gate(CustomGate::new("oracle", 1), [QubitId(0)]).unwrap();
        assert!(matches!(
            final_state(circuit.dag()),
            Err(SimError::CustomGate(name)) if name == "oracle"
        ));
    }

    #[test]
    fn test_too_many_qubits() {
        let circuit = Circuit::with_size("wide", 17, 0);
        assert!(matches!(
            final_state(circuit.dag()),
            Err(SimError::TooManyQubits { required: 17, .. })
        ));
    }

    #[test]
    fn test_branch_cap() {
        // Each H then measure doubles the histories on a single qubit.
        let rounds = MAX_BRANCHES.trailing_zeros() + 1;
        let mut circuit = Circuit::with_size("branches", 1, rounds);
        for c in 0..rounds {
            circuit.h(QubitId(0)).unwrap();
            circuit.measure(QubitId(0), ClbitId(c)).unwrap();
        }
        assert!(matches!(
            outcome_distribution(circuit.dag()),
            Err(SimError::TooManyBranches { max: MAX_BRANCHES })
        ));

        let mut within = Circuit::with_size("branches", 1, rounds - 1);
        for c in 0..rounds - 1 {
            within.h(QubitId(0)).unwrap();
            within.measure(QubitId(0), ClbitId(c)).unwrap();
        }
        let dist = outcome_distribution(within.dag()).unwrap();
        assert_eq!(dist.len(), MAX_BRANCHES);
    }

    #[test]
    fn test_sampling_follows_distribution() {
        let dist = BTreeMap::from([(0, 0.25), (3, 0.75)]);
        let mut rng = StdRng::seed_from_u64(7);
        let counts = sample_counts(&dist, 4000, &mut rng);
        assert_eq!(counts.values().sum::<u32>(), 4000);
        let ones = f64::from(counts[&3]) / 4000.0;
        assert!((ones - 0.75).abs() < 0.05);
        assert!(!counts.contains_key(&1));
    }

    #[test]
    fn test_distributions_close() {
        let a = BTreeMap::from([(0, 0.5), (1, 0.5)]);
        let b = BTreeMap::from([(0, 0.5), (1, 0.5 + 1e-12), (2, 0.0)]);
        assert!(distributions_close(&a, &b, 1e-9));
        assert!(!distributions_close(&a, &BTreeMap::from([(0, 1.0)]), 1e-9));
    }
}
