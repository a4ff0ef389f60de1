//! Quantum gate types.

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;

/// Standard gates of the `qelib1` library, with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford+T gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(ParameterExpression),
    /// Rotation around Y axis.
    Ry(ParameterExpression),
    /// Rotation around Z axis.
    Rz(ParameterExpression),
    /// Phase gate.
    P(ParameterExpression),
    /// Phase gate U1(λ), diag(1, e^{iλ}).
    U1(ParameterExpression),
    /// U2(φ, λ) = U3(π/2, φ, λ).
    U2(ParameterExpression, ParameterExpression),
    /// Universal single-qubit gate U3(θ, φ, λ).
    U3(
        ParameterExpression,
        ParameterExpression,
        ParameterExpression,
    ),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// Controlled rotation around Z.
    CRz(ParameterExpression),
    /// Controlled U1.
    CU1(ParameterExpression),
    /// Controlled U3.
    CU3(
        ParameterExpression,
        ParameterExpression,
        ParameterExpression,
    ),
    /// ZZ rotation gate.
    RZZ(ParameterExpression),

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Every standard gate name, in declaration order.
    pub const NAMES: [&'static str; 29] = [
        "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz", "p",
        "u1", "u2", "u3", "cx", "cy", "cz", "ch", "swap", "crz", "cu1", "cu3", "rzz", "ccx",
        "cswap",
    ];

    /// Build a standard gate from its name and parameter list.
    ///
    /// Returns `None` if the name is not a standard gate or the number of
    /// parameters does not match.
    pub fn from_name(name: &str, params: Vec<ParameterExpression>) -> Option<Self> {
        let mut params = params.into_iter();
        let gate = match name {
            "id" => StandardGate::I,
            "x" => StandardGate::X,
            "y" => StandardGate::Y,
            "z" => StandardGate::Z,
            "h" => StandardGate::H,
            "s" => StandardGate::S,
            "sdg" => StandardGate::Sdg,
            "t" => StandardGate::T,
            "tdg" => StandardGate::Tdg,
            "sx" => StandardGate::SX,
            "sxdg" => StandardGate::SXdg,
            "rx" => StandardGate::Rx(params.next()?),
            "ry" => StandardGate::Ry(params.next()?),
            "rz" => StandardGate::Rz(params.next()?),
            "p" => StandardGate::P(params.next()?),
            "u1" => StandardGate::U1(params.next()?),
            "u2" => StandardGate::U2(params.next()?, params.next()?),
            "u3" => StandardGate::U3(params.next()?, params.next()?, params.next()?),
            "cx" => StandardGate::CX,
            "cy" => StandardGate::CY,
            "cz" => StandardGate::CZ,
            "ch" => StandardGate::CH,
            "swap" => StandardGate::Swap,
            "crz" => StandardGate::CRz(params.next()?),
            "cu1" => StandardGate::CU1(params.next()?),
            "cu3" => StandardGate::CU3(params.next()?, params.next()?, params.next()?),
            "rzz" => StandardGate::RZZ(params.next()?),
            "ccx" => StandardGate::CCX,
            "cswap" => StandardGate::CSwap,
            _ => return None,
        };
        if params.next().is_some() {
            return None;
        }
        Some(gate)
    }

    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U1(_) => "u1",
            StandardGate::U2(_, _) => "u2",
            StandardGate::U3(_, _, _) => "u3",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::CRz(_) => "crz",
            StandardGate::CU1(_) => "cu1",
            StandardGate::CU3(_, _, _) => "cu3",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::CRz(_)
            | StandardGate::CU1(_)
            | StandardGate::CU3(_, _, _)
            | StandardGate::RZZ(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,

            _ => 1,
        }
    }

    /// Check if any parameter of this gate is symbolic.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// Get parameters of this gate, in source order.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::U1(p)
            | StandardGate::CRz(p)
            | StandardGate::CU1(p)
            | StandardGate::RZZ(p) => vec![p],

            StandardGate::U2(a, b) => vec![a, b],

            StandardGate::U3(a, b, c) | StandardGate::CU3(a, b, c) => vec![a, b, c],

            _ => vec![],
        }
    }
}

/// A quantum gate, either standard or custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A custom user-defined gate.
    Custom(CustomGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
        }
    }

    /// Get the parameters.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            GateKind::Standard(g) => g.parameters(),
            GateKind::Custom(g) => g.params.iter().collect(),
        }
    }
}

/// A user-defined gate known only by name.
///
/// The IR attaches no semantics to a custom gate; it can only leave a
/// circuit through a decomposition rule or by being in the target basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on.
    pub num_qubits: u32,
    /// Parameters of the gate.
    pub params: Vec<ParameterExpression>,
}

impl CustomGate {
    /// Create a new custom gate.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            params: vec![],
        }
    }

    /// Add parameters to the gate.
    #[must_use]
    pub fn with_params(mut self, params: Vec<ParameterExpression>) -> Self {
        self.params = params;
        self
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
        }
    }

    /// Create a new gate from a custom gate.
    pub fn custom(gate: CustomGate) -> Self {
        Self {
            kind: GateKind::Custom(gate),
            label: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::custom(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CU1(PI.into()).num_qubits(), 2);
        assert_eq!(StandardGate::CSwap.num_qubits(), 3);

        assert!(!StandardGate::U1(ParameterExpression::constant(PI)).is_parameterized());
        assert!(StandardGate::U2(0.0.into(), ParameterExpression::symbol("l")).is_parameterized());
    }

    #[test]
    fn test_from_name_covers_every_gate() {
        for name in StandardGate::NAMES {
            let gate = (0..=3)
                .find_map(|n| StandardGate::from_name(name, vec![0.5.into(); n]))
                .unwrap_or_else(|| panic!("no parameter count accepted for {name}"));
            assert_eq!(gate.name(), name);
        }
    }

    #[test]
    fn test_from_name_rejects_wrong_param_count() {
        assert!(StandardGate::from_name("u3", vec![0.0.into(); 2]).is_none());
        assert!(StandardGate::from_name("h", vec![0.0.into()]).is_none());
        assert!(StandardGate::from_name("toffoli", vec![]).is_none());
    }

    #[test]
    fn test_custom_gate() {
        let custom = CustomGate::new("my_gate", 2).with_params(vec![(PI / 4.0).into()]);
        let gate = Gate::custom(custom).with_label("mine");
        assert_eq!(gate.name(), "my_gate");
        assert_eq!(gate.num_qubits(), 2);
        assert_eq!(gate.kind.parameters().len(), 1);
    }
}
