//! DAG-based circuit representation.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClassicalRegister, ClbitId, QuantumRegister, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, DagNode::Op(_))
    }

    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the DAG.
///
/// Qubit wires order before classical wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireId::Qubit(q) => write!(f, "{q}"),
            WireId::Clbit(c) => write!(f, "{c}"),
        }
    }
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG representing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// DAG-based circuit representation.
///
/// The circuit is represented as a directed acyclic graph where:
/// - Nodes are either input nodes, output nodes, or operation nodes
/// - Edges represent wires (quantum or classical)
/// - Each wire has exactly one input and one output node
/// - Operations are connected to wires in the order they were applied
///
/// Nodes live in an arena and are addressed by [`NodeIndex`]. The ordered
/// node list of a single wire is recovered by walking its edges, see
/// [`CircuitDag::wire_nodes`].
///
/// A classically conditioned operation is attached to every classical wire
/// its condition reads, so it stays ordered after the measurements that
/// write those bits.
///
/// ## Performance
///
/// The DAG maintains a `wire_front` index that maps each wire to the
/// last node before the output node, so `apply()` finds the predecessor
/// on each wire in O(1).
#[derive(Debug, Clone)]
pub struct CircuitDag {
    /// The underlying graph.
    graph: DiGraph<DagNode, DagEdge, u32>,
    /// Map from qubit to its input node.
    qubit_inputs: FxHashMap<QubitId, NodeIndex>,
    /// Map from qubit to its output node.
    qubit_outputs: FxHashMap<QubitId, NodeIndex>,
    /// Map from classical bit to its input node.
    clbit_inputs: FxHashMap<ClbitId, NodeIndex>,
    /// Map from classical bit to its output node.
    clbit_outputs: FxHashMap<ClbitId, NodeIndex>,
    /// Wire front: maps each wire to the node just before the output node.
    wire_front: FxHashMap<WireId, NodeIndex>,
    /// Quantum registers, in declaration order.
    qregs: Vec<QuantumRegister>,
    /// Classical registers, in declaration order.
    cregs: Vec<ClassicalRegister>,
    /// Global phase of the circuit.
    global_phase: f64,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::default(),
            qubit_inputs: FxHashMap::default(),
            qubit_outputs: FxHashMap::default(),
            clbit_inputs: FxHashMap::default(),
            clbit_outputs: FxHashMap::default(),
            wire_front: FxHashMap::default(),
            qregs: vec![],
            cregs: vec![],
            global_phase: 0.0,
        }
    }

    /// Create an empty DAG with the same wires, registers and global phase.
    pub fn empty_like(&self) -> Self {
        let mut dag = Self::new();
        for qubit in self.qubits() {
            dag.add_qubit(qubit);
        }
        for clbit in self.clbits() {
            dag.add_clbit(clbit);
        }
        dag.qregs.clone_from(&self.qregs);
        dag.cregs.clone_from(&self.cregs);
        dag.global_phase = self.global_phase;
        dag
    }

    fn add_wire(&mut self, wire: WireId) -> (NodeIndex, NodeIndex) {
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.wire_front.insert(wire, in_node);
        (in_node, out_node)
    }

    /// Add a qubit to the circuit. Adding an existing qubit is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.qubit_inputs.contains_key(&qubit) {
            return;
        }
        let (in_node, out_node) = self.add_wire(WireId::Qubit(qubit));
        self.qubit_inputs.insert(qubit, in_node);
        self.qubit_outputs.insert(qubit, out_node);
    }

    /// Add a classical bit to the circuit. Adding an existing bit is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.clbit_inputs.contains_key(&clbit) {
            return;
        }
        let (in_node, out_node) = self.add_wire(WireId::Clbit(clbit));
        self.clbit_inputs.insert(clbit, in_node);
        self.clbit_outputs.insert(clbit, out_node);
    }

    /// Declare a quantum register over existing qubits.
    pub fn add_qreg(&mut self, register: QuantumRegister) -> IrResult<()> {
        if self.qregs.iter().any(|r| r.name == register.name) {
            return Err(IrError::DuplicateRegister(register.name));
        }
        if let Some(&qubit) = register
            .bits
            .iter()
            .find(|q| !self.qubit_inputs.contains_key(q))
        {
            return Err(IrError::QubitNotFound {
                qubit,
                op_name: None,
            });
        }
        self.qregs.push(register);
        Ok(())
    }

    /// Declare a classical register over existing classical bits.
    pub fn add_creg(&mut self, register: ClassicalRegister) -> IrResult<()> {
        if self.cregs.iter().any(|r| r.name == register.name) {
            return Err(IrError::DuplicateRegister(register.name));
        }
        if let Some(&clbit) = register
            .bits
            .iter()
            .find(|c| !self.clbit_inputs.contains_key(c))
        {
            return Err(IrError::ClbitNotFound {
                clbit,
                op_name: None,
            });
        }
        self.cregs.push(register);
        Ok(())
    }

    /// Quantum registers in declaration order.
    pub fn qregs(&self) -> &[QuantumRegister] {
        &self.qregs
    }

    /// Classical registers in declaration order.
    pub fn cregs(&self) -> &[ClassicalRegister] {
        &self.cregs
    }

    /// Look up a classical register by name.
    pub fn creg(&self, name: &str) -> Option<&ClassicalRegister> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// Wires an instruction occupies: its qubits, the classical bits it
    /// writes, then any further classical bits its condition reads.
    fn op_wires(&self, instruction: &Instruction) -> IrResult<Vec<WireId>> {
        let op_name = Some(instruction.name().to_string());

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !self.qubit_inputs.contains_key(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    op_name: op_name.clone(),
                });
            }
            if !seen.insert(WireId::Qubit(qubit)) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    op_name: op_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if !self.clbit_inputs.contains_key(&clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    op_name: op_name.clone(),
                });
            }
            if !seen.insert(WireId::Clbit(clbit)) {
                return Err(IrError::InvalidDag(format!(
                    "classical bit {clbit} written twice by one operation ({})",
                    instruction.name()
                )));
            }
        }

        let mut wires: Vec<WireId> = instruction
            .qubits
            .iter()
            .map(|&q| WireId::Qubit(q))
            .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
            .collect();

        if let Some(condition) = &instruction.condition {
            for clbit in condition.clbits(&self.cregs)? {
                if !self.clbit_inputs.contains_key(&clbit) {
                    return Err(IrError::ClbitNotFound {
                        clbit,
                        op_name: op_name.clone(),
                    });
                }
                if seen.insert(WireId::Clbit(clbit)) {
                    wires.push(WireId::Clbit(clbit));
                }
            }
        }

        Ok(wires)
    }

    /// Output node of a wire.
    fn output_node(&self, wire: WireId) -> Option<NodeIndex> {
        match wire {
            WireId::Qubit(q) => self.qubit_outputs.get(&q).copied(),
            WireId::Clbit(c) => self.clbit_outputs.get(&c).copied(),
        }
    }

    /// Input node of a wire.
    fn input_node(&self, wire: WireId) -> Option<NodeIndex> {
        match wire {
            WireId::Qubit(q) => self.qubit_inputs.get(&q).copied(),
            WireId::Clbit(c) => self.clbit_inputs.get(&c).copied(),
        }
    }

    /// Apply an instruction at the end of every wire it occupies.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        let wires = self.op_wires(&instruction)?;
        let op_node = self.graph.add_node(DagNode::Op(instruction));

        for wire in wires {
            let out_node = self
                .output_node(wire)
                .ok_or_else(|| IrError::InvalidDag(format!("wire {wire} has no output node")))?;
            let prev_node = self
                .wire_front
                .get(&wire)
                .copied()
                .ok_or_else(|| IrError::InvalidDag(format!("wire {wire} has no front node")))?;

            let eid = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == wire && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!(
                        "Missing edge from predecessor to output for wire {wire}"
                    ))
                })?;
            self.graph.remove_edge(eid);
            self.graph.add_edge(prev_node, op_node, DagEdge { wire });
            self.graph.add_edge(op_node, out_node, DagEdge { wire });
            self.wire_front.insert(wire, op_node);
        }

        Ok(op_node)
    }

    /// Kahn's algorithm, always releasing the smallest ready node index.
    ///
    /// For a DAG built by appending, this reproduces insertion order.
    fn lexicographic_order(&self) -> IrResult<Vec<NodeIndex>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.edges_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                let target = edge.target().index();
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    ready.push(Reverse(edge.target()));
                }
            }
        }

        if order.len() != self.graph.node_count() {
            return Err(IrError::InvalidDag("Graph contains a cycle".into()));
        }
        Ok(order)
    }

    /// Operations in deterministic topological order.
    pub fn topological_ops(&self) -> IrResult<impl Iterator<Item = (NodeIndex, &Instruction)>> {
        let order = self.lexicographic_order()?;
        Ok(order.into_iter().filter_map(move |idx| match &self.graph[idx] {
            DagNode::Op(inst) => Some((idx, inst)),
            _ => None,
        }))
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    /// Operation nodes on one wire, from input to output.
    pub fn wire_nodes(&self, wire: WireId) -> IrResult<Vec<NodeIndex>> {
        let in_node = self
            .input_node(wire)
            .ok_or_else(|| IrError::InvalidDag(format!("wire {wire} is not part of the circuit")))?;
        let out_node = self
            .output_node(wire)
            .ok_or_else(|| IrError::InvalidDag(format!("wire {wire} has no output node")))?;

        let mut nodes = vec![];
        let mut current = in_node;
        let max_steps = self.graph.node_count();
        while current != out_node {
            current = self
                .graph
                .edges_directed(current, Direction::Outgoing)
                .find(|e| e.weight().wire == wire)
                .map(|e| e.target())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!(
                        "Wire {wire} is broken: no outgoing edge from node {}",
                        current.index()
                    ))
                })?;
            if current != out_node {
                if !self.graph[current].is_op() {
                    return Err(IrError::InvalidDag(format!(
                        "Wire {wire} passes through a foreign input or output node"
                    )));
                }
                nodes.push(current);
            }
            if nodes.len() > max_steps {
                return Err(IrError::InvalidDag(format!(
                    "Wire {wire} never reaches its output node"
                )));
            }
        }
        Ok(nodes)
    }

    /// Operations on one wire, in wire order.
    pub fn wire_ops(&self, wire: WireId) -> IrResult<Vec<&Instruction>> {
        Ok(self
            .wire_nodes(wire)?
            .into_iter()
            .filter_map(|n| self.get_instruction(n))
            .collect())
    }

    /// All wires, qubits first, each kind sorted by id.
    pub fn wires(&self) -> Vec<WireId> {
        self.qubits()
            .map(WireId::Qubit)
            .chain(self.clbits().map(WireId::Clbit))
            .collect()
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubit_inputs.len()
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.clbit_inputs.len()
    }

    /// Get the number of operations.
    ///
    /// Computed as total nodes minus input and output nodes (2 per wire).
    #[inline]
    pub fn num_ops(&self) -> usize {
        let io_nodes = 2 * (self.qubit_inputs.len() + self.clbit_inputs.len());
        self.graph.node_count().saturating_sub(io_nodes)
    }

    /// Number of operations of each name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for inst in self.graph.node_weights().filter_map(DagNode::instruction) {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Calculate the circuit depth: the longest chain of operations.
    pub fn depth(&self) -> IrResult<usize> {
        let mut depths = vec![0usize; self.graph.node_count()];
        let mut max_depth = 0usize;

        for node in self.lexicographic_order()? {
            let max_pred_depth = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths[e.source().index()])
                .max()
                .unwrap_or(0);

            let node_depth = max_pred_depth + usize::from(self.graph[node].is_op());
            max_depth = max_depth.max(node_depth);
            depths[node.index()] = node_depth;
        }

        Ok(max_depth)
    }

    /// Iterate over qubits in id order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        let mut qubits: Vec<_> = self.qubit_inputs.keys().copied().collect();
        qubits.sort_unstable();
        qubits.into_iter()
    }

    /// Iterate over classical bits in id order.
    pub fn clbits(&self) -> impl Iterator<Item = ClbitId> + '_ {
        let mut clbits: Vec<_> = self.clbit_inputs.keys().copied().collect();
        clbits.sort_unstable();
        clbits.into_iter()
    }

    /// Get the global phase.
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.global_phase = phase;
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &DiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Get a mutable reference to the underlying graph.
    ///
    /// Edits made here bypass every invariant `apply()` maintains; run
    /// [`verify_integrity`](Self::verify_integrity) afterwards.
    pub fn graph_mut(&mut self) -> &mut DiGraph<DagNode, DagEdge, u32> {
        &mut self.graph
    }

    /// Same wires, registers, global phase and per-wire operation sequences.
    ///
    /// Node indices are not compared, so two DAGs built from the same
    /// operations in different (valid) orders are structurally equal.
    pub fn structurally_eq(&self, other: &Self) -> bool {
        if self.wires() != other.wires()
            || self.qregs != other.qregs
            || self.cregs != other.cregs
            || self.global_phase != other.global_phase
            || self.num_ops() != other.num_ops()
        {
            return false;
        }
        self.wires()
            .into_iter()
            .all(|wire| match (self.wire_ops(wire), other.wire_ops(wire)) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            })
    }

    /// Verify the structural integrity of the DAG.
    ///
    /// Checks that:
    /// - The graph is acyclic
    /// - Every wire has an input and output node and an unbroken path
    ///   between them
    /// - Every operation node enters and leaves on the same set of wires
    /// - Every operation node lies on some wire
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidDag("Graph contains a cycle".into()));
        }

        let mut on_some_wire = FxHashSet::default();
        for wire in self.wires() {
            on_some_wire.extend(self.wire_nodes(wire)?);
        }

        for node in self.graph.node_indices() {
            let DagNode::Op(inst) = &self.graph[node] else {
                continue;
            };
            if !on_some_wire.contains(&node) {
                return Err(IrError::InvalidDag(format!(
                    "Operation '{}' at node {} is not on any wire",
                    inst.name(),
                    node.index()
                )));
            }
            let mut incoming: Vec<WireId> = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| e.weight().wire)
                .collect();
            let mut outgoing: Vec<WireId> = self
                .graph
                .edges_directed(node, Direction::Outgoing)
                .map(|e| e.weight().wire)
                .collect();
            incoming.sort_unstable();
            outgoing.sort_unstable();
            if incoming != outgoing {
                return Err(IrError::InvalidDag(format!(
                    "Operation '{}' at node {} enters and leaves on different wires",
                    inst.name(),
                    node.index()
                )));
            }
        }

        Ok(())
    }
}

impl Default for CircuitDag {
    fn default() -> Self {
        Self::new()
    }
}
