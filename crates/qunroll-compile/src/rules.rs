//! Decomposition rules.
//!
//! A [`RuleTable`] maps a gate name to a pure rewrite function. The function
//! receives the gate's parameters and a list of operand qubits and returns
//! the replacement instructions on those qubits. The unroller always calls a
//! rule with local operands `q0..qn`, so rules never see real wire ids.
//!
//! [`RuleTable::standard`] carries the `qelib1` definitions, which bottom out
//! in `u3` and `cx`.

use std::fmt;
use std::sync::Arc;

use qunroll_ir::{Instruction, ParameterExpression, QubitId, StandardGate};
use rustc_hash::FxHashMap;

/// Signature of a rewrite function.
pub type RewriteFn = dyn Fn(&[ParameterExpression], &[QubitId]) -> Vec<Instruction> + Send + Sync;

/// A decomposition rule for one gate name.
#[derive(Clone)]
pub struct Rule {
    num_qubits: u32,
    num_params: usize,
    rewrite: Arc<RewriteFn>,
}

impl Rule {
    /// Create a rule for a gate of the given arity and parameter count.
    pub fn new<F>(num_qubits: u32, num_params: usize, rewrite: F) -> Self
    where
        F: Fn(&[ParameterExpression], &[QubitId]) -> Vec<Instruction> + Send + Sync + 'static,
    {
        Self {
            num_qubits,
            num_params,
            rewrite: Arc::new(rewrite),
        }
    }

    /// Number of qubits the decomposed gate acts on.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of parameters the decomposed gate takes.
    pub fn num_params(&self) -> usize {
        self.num_params
    }

    /// Expand a gate with the given parameters on the given operands.
    pub fn apply(&self, params: &[ParameterExpression], qubits: &[QubitId]) -> Vec<Instruction> {
        (self.rewrite)(params, qubits)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("num_qubits", &self.num_qubits)
            .field("num_params", &self.num_params)
            .finish_non_exhaustive()
    }
}

/// Gate name to decomposition rule.
#[derive(Clone, Default)]
pub struct RuleTable {
    rules: FxHashMap<String, Rule>,
}

impl RuleTable {
    /// Create an empty rule table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, returning the rule it replaces.
    pub fn insert(&mut self, name: impl Into<String>, rule: Rule) -> Option<Rule> {
        self.rules.insert(name.into(), rule)
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.insert(name, rule);
        self
    }

    /// Remove the rule for a gate name.
    pub fn remove(&mut self, name: &str) -> Option<Rule> {
        self.rules.remove(name)
    }

    /// Look up the rule for a gate name.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Check if a rule exists for a gate name.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The `qelib1` rule set.
    #[allow(clippy::too_many_lines)]
    pub fn standard() -> Self {
        let mut table = Self::new();

        // Single-qubit gates, all reducing to u3 through u1/u2.
        table.insert(
            "u2",
            Rule::new(1, 2, |p, q| {
                vec![u3(pi() / c(2.0), p[0].clone(), p[1].clone(), q[0])]
            }),
        );
        table.insert(
            "u1",
            Rule::new(1, 1, |p, q| vec![u3(c(0.0), c(0.0), p[0].clone(), q[0])]),
        );
        table.insert("p", Rule::new(1, 1, |p, q| vec![u1(p[0].clone(), q[0])]));
        table.insert(
            "id",
            Rule::new(1, 0, |_, q| vec![u3(c(0.0), c(0.0), c(0.0), q[0])]),
        );
        table.insert("x", Rule::new(1, 0, |_, q| vec![u3(pi(), c(0.0), pi(), q[0])]));
        table.insert(
            "y",
            Rule::new(1, 0, |_, q| {
                vec![u3(pi(), pi() / c(2.0), pi() / c(2.0), q[0])]
            }),
        );
        table.insert("z", Rule::new(1, 0, |_, q| vec![u1(pi(), q[0])]));
        table.insert("h", Rule::new(1, 0, |_, q| vec![u2(c(0.0), pi(), q[0])]));
        table.insert("s", Rule::new(1, 0, |_, q| vec![u1(pi() / c(2.0), q[0])]));
        table.insert("sdg", Rule::new(1, 0, |_, q| vec![u1(-pi() / c(2.0), q[0])]));
        table.insert("t", Rule::new(1, 0, |_, q| vec![u1(pi() / c(4.0), q[0])]));
        table.insert("tdg", Rule::new(1, 0, |_, q| vec![u1(-pi() / c(4.0), q[0])]));
        table.insert(
            "sx",
            Rule::new(1, 0, |_, q| {
                vec![
                    fixed(StandardGate::Sdg, &[q[0]]),
                    fixed(StandardGate::H, &[q[0]]),
                    fixed(StandardGate::Sdg, &[q[0]]),
                ]
            }),
        );
        table.insert(
            "sxdg",
            Rule::new(1, 0, |_, q| {
                vec![
                    fixed(StandardGate::S, &[q[0]]),
                    fixed(StandardGate::H, &[q[0]]),
                    fixed(StandardGate::S, &[q[0]]),
                ]
            }),
        );
        table.insert(
            "rx",
            Rule::new(1, 1, |p, q| {
                vec![u3(p[0].clone(), -pi() / c(2.0), pi() / c(2.0), q[0])]
            }),
        );
        table.insert(
            "ry",
            Rule::new(1, 1, |p, q| vec![u3(p[0].clone(), c(0.0), c(0.0), q[0])]),
        );
        table.insert("rz", Rule::new(1, 1, |p, q| vec![u1(p[0].clone(), q[0])]));

        // Two-qubit gates.
        table.insert(
            "cz",
            Rule::new(2, 0, |_, q| {
                vec![
                    fixed(StandardGate::H, &[q[1]]),
                    cx(q[0], q[1]),
                    fixed(StandardGate::H, &[q[1]]),
                ]
            }),
        );
        table.insert(
            "cy",
            Rule::new(2, 0, |_, q| {
                vec![
                    fixed(StandardGate::Sdg, &[q[1]]),
                    cx(q[0], q[1]),
                    fixed(StandardGate::S, &[q[1]]),
                ]
            }),
        );
        table.insert(
            "ch",
            Rule::new(2, 0, |_, q| {
                let (a, b) = (q[0], q[1]);
                vec![
                    fixed(StandardGate::H, &[b]),
                    fixed(StandardGate::Sdg, &[b]),
                    cx(a, b),
                    fixed(StandardGate::H, &[b]),
                    fixed(StandardGate::T, &[b]),
                    cx(a, b),
                    fixed(StandardGate::T, &[b]),
                    fixed(StandardGate::H, &[b]),
                    fixed(StandardGate::S, &[b]),
                    fixed(StandardGate::X, &[b]),
                    fixed(StandardGate::S, &[a]),
                ]
            }),
        );
        table.insert(
            "swap",
            Rule::new(2, 0, |_, q| {
                vec![cx(q[0], q[1]), cx(q[1], q[0]), cx(q[0], q[1])]
            }),
        );
        table.insert(
            "crz",
            Rule::new(2, 1, |p, q| {
                let lambda = &p[0];
                vec![
                    u1(lambda.clone() / c(2.0), q[1]),
                    cx(q[0], q[1]),
                    u1(-lambda.clone() / c(2.0), q[1]),
                    cx(q[0], q[1]),
                ]
            }),
        );
        table.insert(
            "cu1",
            Rule::new(2, 1, |p, q| {
                let lambda = &p[0];
                vec![
                    u1(lambda.clone() / c(2.0), q[0]),
                    cx(q[0], q[1]),
                    u1(-lambda.clone() / c(2.0), q[1]),
                    cx(q[0], q[1]),
                    u1(lambda.clone() / c(2.0), q[1]),
                ]
            }),
        );
        table.insert(
            "cu3",
            Rule::new(2, 3, |p, q| {
                let (theta, phi, lambda) = (&p[0], &p[1], &p[2]);
                let (ctl, tgt) = (q[0], q[1]);
                vec![
                    u1((lambda.clone() + phi.clone()) / c(2.0), ctl),
                    u1((lambda.clone() - phi.clone()) / c(2.0), tgt),
                    cx(ctl, tgt),
                    u3(
                        -theta.clone() / c(2.0),
                        c(0.0),
                        -(phi.clone() + lambda.clone()) / c(2.0),
                        tgt,
                    ),
                    cx(ctl, tgt),
                    u3(theta.clone() / c(2.0), phi.clone(), c(0.0), tgt),
                ]
            }),
        );
        table.insert(
            "rzz",
            Rule::new(2, 1, |p, q| {
                vec![cx(q[0], q[1]), u1(p[0].clone(), q[1]), cx(q[0], q[1])]
            }),
        );

        // Three-qubit gates.
        table.insert(
            "ccx",
            Rule::new(3, 0, |_, q| {
                let (a, b, t) = (q[0], q[1], q[2]);
                vec![
                    fixed(StandardGate::H, &[t]),
                    cx(b, t),
                    fixed(StandardGate::Tdg, &[t]),
                    cx(a, t),
                    fixed(StandardGate::T, &[t]),
                    cx(b, t),
                    fixed(StandardGate::Tdg, &[t]),
                    cx(a, t),
                    fixed(StandardGate::T, &[b]),
                    fixed(StandardGate::T, &[t]),
                    fixed(StandardGate::H, &[t]),
                    cx(a, b),
                    fixed(StandardGate::T, &[a]),
                    fixed(StandardGate::Tdg, &[b]),
                    cx(a, b),
                ]
            }),
        );
        table.insert(
            "cswap",
            Rule::new(3, 0, |_, q| {
                let (a, b, t) = (q[0], q[1], q[2]);
                vec![cx(t, b), fixed(StandardGate::CCX, &[a, b, t]), cx(t, b)]
            }),
        );

        table
    }
}

impl fmt::Debug for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTable")
            .field("rules", &self.names())
            .finish()
    }
}

fn c(value: f64) -> ParameterExpression {
    ParameterExpression::constant(value)
}

fn pi() -> ParameterExpression {
    ParameterExpression::pi()
}

fn fixed(gate: StandardGate, qubits: &[QubitId]) -> Instruction {
    Instruction::gate(gate, qubits.iter().copied())
}

fn cx(control: QubitId, target: QubitId) -> Instruction {
    Instruction::two_qubit_gate(StandardGate::CX, control, target)
}

fn u1(lambda: ParameterExpression, qubit: QubitId) -> Instruction {
    Instruction::single_qubit_gate(StandardGate::U1(lambda.simplify()), qubit)
}

fn u2(phi: ParameterExpression, lambda: ParameterExpression, qubit: QubitId) -> Instruction {
    Instruction::single_qubit_gate(StandardGate::U2(phi.simplify(), lambda.simplify()), qubit)
}

fn u3(
    theta: ParameterExpression,
    phi: ParameterExpression,
    lambda: ParameterExpression,
    qubit: QubitId,
) -> Instruction {
    Instruction::single_qubit_gate(
        StandardGate::U3(theta.simplify(), phi.simplify(), lambda.simplify()),
        qubit,
    )
}
