//! Basis decomposition ("unrolling").
//!
//! The [`Unroller`] rewrites a circuit DAG so that every gate is a member of
//! a target [`BasisSet`]. Gates outside the basis are expanded through a
//! [`RuleTable`], recursively, until only basis gates remain. Directives are
//! copied through untouched.
//!
//! ```
//! use qunroll_compile::{BasisSet, Unroller};
//! use qunroll_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("h", 1, 0);
//! circuit.h(QubitId(0)).unwrap();
//!
//! let unrolled = Unroller::new(BasisSet::new(["u2"])).unroll(circuit.dag()).unwrap();
//! assert_eq!(unrolled.count_ops()["u2"], 1);
//! ```

use qunroll_ir::{CircuitDag, Gate, Instruction, InstructionKind, ParameterExpression, QubitId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, instrument, trace, warn};

use crate::basis::BasisSet;
use crate::config::UnrollerConfig;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::rules::RuleTable;

/// Default bound on nested rule applications.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Decomposes gates into a target basis.
#[derive(Debug, Clone)]
pub struct Unroller {
    basis: Option<BasisSet>,
    rules: RuleTable,
    max_depth: usize,
    memoize: bool,
}

/// A fully decomposed gate on local qubits `q0..qn`.
#[derive(Clone)]
struct Expansion {
    ops: Vec<Instruction>,
    /// Number of nested rule applications it took.
    height: usize,
}

type Memo = FxHashMap<String, Expansion>;

impl Unroller {
    /// Create an unroller for a basis with the standard rule table.
    pub fn new(basis: BasisSet) -> Self {
        Self {
            basis: Some(basis),
            ..Self::default()
        }
    }

    /// Build an unroller from a validated configuration.
    pub fn from_config(config: &UnrollerConfig) -> CompileResult<Self> {
        config.validate()?;
        Ok(Self::new(config.basis_set())
            .with_max_depth(config.max_depth)
            .with_memoize(config.memoize))
    }

    /// Replace the rule table.
    #[must_use]
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    /// Set the bound on nested rule applications.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enable or disable the per-call expansion cache.
    #[must_use]
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// The target basis, if one was set at construction.
    pub fn basis(&self) -> Option<&BasisSet> {
        self.basis.as_ref()
    }

    /// The rule table.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// The bound on nested rule applications.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decompose `dag` into this unroller's basis, returning a new DAG.
    ///
    /// The input is never modified. On error no partial result escapes.
    pub fn unroll(&self, dag: &CircuitDag) -> CompileResult<CircuitDag> {
        let basis = self.basis.as_ref().ok_or_else(|| {
            CompileError::InvalidConfiguration("unroller has no target basis".into())
        })?;
        self.unroll_into(dag, basis)
    }

    #[instrument(skip(self, dag, basis), fields(basis = %basis, ops = dag.num_ops()))]
    fn unroll_into(&self, dag: &CircuitDag, basis: &BasisSet) -> CompileResult<CircuitDag> {
        dag.verify_integrity()?;

        let mut out = dag.empty_like();
        let mut memo = Memo::default();

        for (node, inst) in dag.topological_ops()? {
            let gate = match &inst.kind {
                InstructionKind::Gate(gate) if !basis.contains(gate.name()) => gate,
                _ => {
                    trace!(node = node.index(), op = inst.name(), "copying");
                    out.apply(inst.clone())?;
                    continue;
                }
            };

            if inst.qubits.len() != gate.num_qubits() as usize {
                return Err(CompileError::MalformedGraph(format!(
                    "node {} applies {}-qubit gate '{}' to {} qubits",
                    node.index(),
                    gate.num_qubits(),
                    gate.name(),
                    inst.qubits.len()
                )));
            }

            let expansion = self.expand(gate, basis, 0, &mut memo)?;
            debug!(
                gate = gate.name(),
                ops = expansion.ops.len(),
                height = expansion.height,
                "expanded"
            );
            for op in &expansion.ops {
                out.apply(Instruction {
                    kind: op.kind.clone(),
                    qubits: remap(&op.qubits, &inst.qubits),
                    clbits: vec![],
                    condition: inst.condition.clone(),
                })?;
            }
        }

        Ok(out)
    }

    /// Fully decompose one gate on local operands.
    fn expand(
        &self,
        gate: &Gate,
        basis: &BasisSet,
        depth: usize,
        memo: &mut Memo,
    ) -> CompileResult<Expansion> {
        let name = gate.name();
        let num_qubits = gate.num_qubits();
        let params: Vec<ParameterExpression> = gate.kind.parameters().into_iter().cloned().collect();

        let key = self
            .memoize
            .then(|| format!("{name}/{num_qubits}{params:?}"));
        if let Some(cached) = key.as_ref().and_then(|k| memo.get(k)) {
            self.check_depth(name, depth + cached.height)?;
            return Ok(cached.clone());
        }

        let rule = self.rules.get(name).ok_or_else(|| {
            CompileError::unsupported(
                name,
                format!("no decomposition rule and not in basis {basis}"),
            )
        })?;
        if rule.num_qubits() != num_qubits || rule.num_params() != params.len() {
            return Err(CompileError::unsupported(
                name,
                format!(
                    "rule expects {} qubits and {} parameters, gate has {} and {}",
                    rule.num_qubits(),
                    rule.num_params(),
                    num_qubits,
                    params.len()
                ),
            ));
        }
        self.check_depth(name, depth + 1)?;

        let locals: Vec<QubitId> = (0..num_qubits).map(QubitId).collect();
        let mut ops = vec![];
        let mut height = 1;

        for sub in rule.apply(&params, &locals) {
            let InstructionKind::Gate(sub_gate) = &sub.kind else {
                return Err(CompileError::unsupported(
                    name,
                    format!("rule produced non-gate operation '{}'", sub.name()),
                ));
            };
            check_operands(name, sub_gate, &sub.qubits, num_qubits)?;

            if basis.contains(sub_gate.name()) {
                ops.push(Instruction {
                    kind: sub.kind.clone(),
                    qubits: sub.qubits.clone(),
                    clbits: vec![],
                    condition: None,
                });
                continue;
            }

            let child = self.expand(sub_gate, basis, depth + 1, memo)?;
            height = height.max(child.height + 1);
            ops.extend(child.ops.into_iter().map(|mut op| {
                op.qubits = remap(&op.qubits, &sub.qubits);
                op
            }));
        }

        let expansion = Expansion { ops, height };
        if let Some(key) = key {
            memo.insert(key, expansion.clone());
        }
        Ok(expansion)
    }

    fn check_depth(&self, name: &str, levels: usize) -> CompileResult<()> {
        if levels > self.max_depth {
            warn!(
                gate = name,
                max_depth = self.max_depth,
                "decomposition exceeded maximum expansion depth"
            );
            return Err(CompileError::unsupported(
                name,
                format!("exceeded maximum expansion depth {}", self.max_depth),
            ));
        }
        Ok(())
    }
}

impl Default for Unroller {
    /// An unroller with no basis of its own; as a pass it reads
    /// [`PropertySet::basis_gates`].
    fn default() -> Self {
        Self {
            basis: None,
            rules: RuleTable::standard(),
            max_depth: DEFAULT_MAX_DEPTH,
            memoize: true,
        }
    }
}

impl Pass for Unroller {
    fn name(&self) -> &'static str {
        "Unroller"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = self
            .basis
            .as_ref()
            .or(properties.basis_gates.as_ref())
            .ok_or_else(|| {
                CompileError::InvalidConfiguration(
                    "no target basis on the unroller or in the property set".into(),
                )
            })?;

        *dag = self.unroll_into(dag, basis)?;
        Ok(())
    }
}

/// Map local operand indices onto concrete qubits.
fn remap(local: &[QubitId], operands: &[QubitId]) -> Vec<QubitId> {
    local.iter().map(|q| operands[q.0 as usize]).collect()
}

/// A rule's output must stay on the operands of the gate it expands.
fn check_operands(
    rule_name: &str,
    gate: &Gate,
    qubits: &[QubitId],
    num_qubits: u32,
) -> CompileResult<()> {
    let mut seen = FxHashSet::default();
    let fits = qubits.len() == gate.num_qubits() as usize
        && qubits.iter().all(|q| q.0 < num_qubits && seen.insert(*q));
    if fits {
        Ok(())
    } else {
        Err(CompileError::unsupported(
            rule_name,
            format!(
                "rule applies '{}' to {:?}, outside the gate's {} operands",
                gate.name(),
                qubits,
                num_qubits
            ),
        ))
    }
}
