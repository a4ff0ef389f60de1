//! High-level circuit builder API.

use crate::condition::ClassicalCondition;
use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::instruction::Instruction;
use crate::parameter::ParameterExpression;
use crate::qubit::{Clbit, ClassicalRegister, ClbitId, QuantumRegister, Qubit, QubitId};

/// A quantum circuit.
///
/// This provides a high-level API for building quantum circuits,
/// with convenient methods for the `qelib1` gates and directives.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// Classical bits in the circuit.
    clbits: Vec<Clbit>,
    /// The underlying DAG representation.
    dag: CircuitDag,
}

macro_rules! fixed_gate {
    ($(#[$doc:meta] $method:ident => $gate:ident($($q:ident),+);)*) => {
        $(
            #[$doc]
            pub fn $method(&mut self, $($q: QubitId),+) -> IrResult<&mut Self> {
                self.append(Instruction::gate(StandardGate::$gate, [$($q),+]))
            }
        )*
    };
}

macro_rules! rotation_gate {
    ($(#[$doc:meta] $method:ident => $gate:ident($($p:ident),+; $($q:ident),+);)*) => {
        $(
            #[$doc]
            pub fn $method(
                &mut self,
                $($p: impl Into<ParameterExpression>,)+
                $($q: QubitId),+
            ) -> IrResult<&mut Self> {
                self.append(Instruction::gate(
                    StandardGate::$gate($($p.into()),+),
                    [$($q),+],
                ))
            }
        )*
    };
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            dag: CircuitDag::new(),
        }
    }

    /// Create a circuit with a given number of anonymous qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    #[allow(clippy::cast_possible_truncation)]
    fn next_qubit_id(&self) -> QubitId {
        QubitId(self.qubits.len() as u32)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn next_clbit_id(&self) -> ClbitId {
        ClbitId(self.clbits.len() as u32)
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = self.next_qubit_id();
        self.qubits.push(Qubit::new(id));
        self.dag.add_qubit(id);
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        let name = name.into();
        if self.dag.qregs().iter().any(|r| r.name == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let ids: Vec<_> = (0..size)
            .map(|i| QubitId(self.next_qubit_id().0 + i))
            .collect();
        for &id in &ids {
            self.dag.add_qubit(id);
        }
        self.dag.add_qreg(QuantumRegister::new(name.clone(), ids.iter().copied()))?;
        self.qubits.extend(
            ids.iter()
                .zip(0..)
                .map(|(&id, i)| Qubit::with_register(id, &name, i)),
        );
        Ok(ids)
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = self.next_clbit_id();
        self.clbits.push(Clbit::new(id));
        self.dag.add_clbit(id);
        id
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        let name = name.into();
        if self.dag.cregs().iter().any(|r| r.name == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let ids: Vec<_> = (0..size)
            .map(|i| ClbitId(self.next_clbit_id().0 + i))
            .collect();
        for &id in &ids {
            self.dag.add_clbit(id);
        }
        self.dag.add_creg(ClassicalRegister::new(name.clone(), ids.iter().copied()))?;
        self.clbits.extend(
            ids.iter()
                .zip(0..)
                .map(|(&id, i)| Clbit::with_register(id, &name, i)),
        );
        Ok(ids)
    }

    /// Append any instruction.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    /// Append a gate that only runs when `condition` holds.
    pub fn gate_if(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
        condition: ClassicalCondition,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(gate, qubits).with_condition(condition))
    }

    fixed_gate! {
        /// Apply the identity gate.
        id => I(qubit);
        /// Apply Pauli-X gate.
        x => X(qubit);
        /// Apply Pauli-Y gate.
        y => Y(qubit);
        /// Apply Pauli-Z gate.
        z => Z(qubit);
        /// Apply Hadamard gate.
        h => H(qubit);
        /// Apply S gate.
        s => S(qubit);
        /// Apply S-dagger gate.
        sdg => Sdg(qubit);
        /// Apply T gate.
        t => T(qubit);
        /// Apply T-dagger gate.
        tdg => Tdg(qubit);
        /// Apply sqrt(X) gate.
        sx => SX(qubit);
        /// Apply sqrt(X)-dagger gate.
        sxdg => SXdg(qubit);
        /// Apply CNOT (CX) gate.
        cx => CX(control, target);
        /// Apply CY gate.
        cy => CY(control, target);
        /// Apply CZ gate.
        cz => CZ(control, target);
        /// Apply controlled-Hadamard gate.
        ch => CH(control, target);
        /// Apply SWAP gate.
        swap => Swap(q1, q2);
        /// Apply Toffoli (CCX) gate.
        ccx => CCX(c1, c2, target);
        /// Apply Fredkin (CSWAP) gate.
        cswap => CSwap(control, t1, t2);
    }

    rotation_gate! {
        /// Apply Rx rotation.
        rx => Rx(theta; qubit);
        /// Apply Ry rotation.
        ry => Ry(theta; qubit);
        /// Apply Rz rotation.
        rz => Rz(phi; qubit);
        /// Apply phase gate.
        p => P(lambda; qubit);
        /// Apply U1 gate.
        u1 => U1(lambda; qubit);
        /// Apply U2 gate.
        u2 => U2(phi, lambda; qubit);
        /// Apply U3 gate.
        u3 => U3(theta, phi, lambda; qubit);
        /// Apply controlled-Rz gate.
        crz => CRz(lambda; control, target);
        /// Apply controlled-U1 gate.
        cu1 => CU1(lambda; control, target);
        /// Apply controlled-U3 gate.
        cu3 => CU3(theta, phi, lambda; control, target);
        /// Apply ZZ rotation.
        rzz => RZZ(theta; q1, q2);
    }

    /// Apply a custom or standard gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(gate, qubits))
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i`, adding classical bits as needed.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.clbits.len() < self.qubits.len() {
            self.add_clbit();
        }
        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        let clbits: Vec<_> = self.clbits.iter().map(|c| c.id).take(qubits.len()).collect();
        self.append(Instruction::measure_all(qubits, clbits)?)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::reset(qubit))
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.append(Instruction::barrier(qubits))
    }

    /// Apply a delay to a qubit.
    pub fn delay(&mut self, qubit: QubitId, duration: u64) -> IrResult<&mut Self> {
        self.append(Instruction::delay(qubit, duration))
    }

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> IrResult<usize> {
        self.dag.depth()
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Consume the circuit and return the DAG.
    pub fn into_dag(self) -> CircuitDag {
        self.dag
    }

    /// Create a circuit from a DAG, recovering register membership.
    pub fn from_dag(dag: CircuitDag) -> Self {
        let qubits = dag
            .qubits()
            .map(|id| {
                dag.qregs()
                    .iter()
                    .find_map(|r| r.index_of(id).map(|i| (r, i)))
                    .map_or_else(
                        || Qubit::new(id),
                        |(r, i)| Qubit::with_register(id, &r.name, index_u32(i)),
                    )
            })
            .collect();
        let clbits = dag
            .clbits()
            .map(|id| {
                dag.cregs()
                    .iter()
                    .find_map(|r| r.index_of(id).map(|i| (r, i)))
                    .map_or_else(
                        || Clbit::new(id),
                        |(r, i)| Clbit::with_register(id, &r.name, index_u32(i)),
                    )
            })
            .collect();

        Self {
            name: "circuit".into(),
            qubits,
            clbits,
            dag,
        }
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits in the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }
}

#[allow(clippy::cast_possible_truncation)]
fn index_u32(i: usize) -> u32 {
    i as u32
}
