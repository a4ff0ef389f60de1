//! Operations placed on the DAG: gates plus the measure, reset, barrier and
//! delay directives, each with an optional classical condition.

use serde::{Deserialize, Serialize};

use crate::condition::ClassicalCondition;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::parameter::ParameterExpression;
use crate::qubit::{ClbitId, QubitId};

/// What an [`Instruction`] does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    Gate(Gate),
    /// Writes qubit `i` to classical bit `i`, pairwise.
    Measure,
    /// Returns the qubit to |0⟩.
    Reset,
    /// Ordering fence across its qubits.
    Barrier,
    /// Idle period.
    Delay {
        /// Device-specific time units.
        duration: u64,
    },
}

/// An operation with its operands.
///
/// `qubits` order is significant: for controlled gates the controls come
/// first. `clbits` is only populated for measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub qubits: Vec<QubitId>,
    pub clbits: Vec<ClbitId>,
    /// Gate applies only when this holds at run time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Instruction {
    fn new(kind: InstructionKind, qubits: Vec<QubitId>, clbits: Vec<ClbitId>) -> Self {
        Self {
            kind,
            qubits,
            clbits,
            condition: None,
        }
    }

    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::new(
            InstructionKind::Gate(gate.into()),
            qubits.into_iter().collect(),
            vec![],
        )
    }

    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Operands in (control, target) order.
    pub fn two_qubit_gate(gate: StandardGate, control: QubitId, target: QubitId) -> Self {
        Self::gate(gate, [control, target])
    }

    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self::new(InstructionKind::Measure, vec![qubit], vec![clbit])
    }

    /// Measure several qubits at once, pairing them with `clbits` in order.
    pub fn measure_all(
        qubits: impl IntoIterator<Item = QubitId>,
        clbits: impl IntoIterator<Item = ClbitId>,
    ) -> IrResult<Self> {
        let qubits: Vec<_> = qubits.into_iter().collect();
        let clbits: Vec<_> = clbits.into_iter().collect();
        if qubits.len() != clbits.len() {
            return Err(IrError::InvalidDag(format!(
                "cannot pair {} qubits with {} classical bits in one measurement",
                qubits.len(),
                clbits.len(),
            )));
        }
        Ok(Self::new(InstructionKind::Measure, qubits, clbits))
    }

    pub fn reset(qubit: QubitId) -> Self {
        Self::new(InstructionKind::Reset, vec![qubit], vec![])
    }

    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::new(InstructionKind::Barrier, qubits.into_iter().collect(), vec![])
    }

    pub fn delay(qubit: QubitId, duration: u64) -> Self {
        Self::new(InstructionKind::Delay { duration }, vec![qubit], vec![])
    }

    #[must_use]
    pub fn with_condition(mut self, condition: ClassicalCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    pub fn as_gate(&self) -> Option<&Gate> {
        if let InstructionKind::Gate(gate) = &self.kind {
            Some(gate)
        } else {
            None
        }
    }

    /// Gate parameters, empty for directives.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        self.as_gate()
            .map(|g| g.kind.parameters())
            .unwrap_or_default()
    }

    /// Gate name, or the directive's keyword.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(gate) => gate.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
            InstructionKind::Delay { .. } => "delay",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::CustomGate;

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::single_qubit_gate(StandardGate::U2(0.0.into(), 1.0.into()), QubitId(0));
        assert!(inst.is_gate());
        assert_eq!(inst.name(), "u2");
        assert_eq!(inst.parameters().len(), 2);
    }

    #[test]
    fn test_directives() {
        assert!(Instruction::measure(QubitId(0), ClbitId(0)).is_measure());
        assert_eq!(Instruction::reset(QubitId(0)).name(), "reset");
        let barrier = Instruction::barrier([QubitId(0), QubitId(1)]);
        assert!(!barrier.is_gate());
        assert!(barrier.parameters().is_empty());
        assert_eq!(Instruction::delay(QubitId(0), 10).name(), "delay");
        assert!(Instruction::measure_all([QubitId(0)], []).is_err());
    }

    #[test]
    fn test_condition_attaches() {
        let inst = Instruction::gate(CustomGate::new("oracle", 1), [QubitId(0)])
            .with_condition(ClassicalCondition::register("cr", 1));
        assert!(inst.condition.is_some());
        assert_eq!(inst.name(), "oracle");
    }

    #[test]
    fn test_serde_skips_missing_condition() {
        let inst = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        let json = serde_json::to_string(&inst).unwrap();
        assert!(!json.contains("condition"));
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);
    }
}
