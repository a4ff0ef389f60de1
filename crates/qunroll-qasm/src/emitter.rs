//! QASM 2.0 emitter for serializing circuits.

use std::collections::BTreeSet;

use qunroll_ir::{
    Circuit, CircuitDag, ClassicalCondition, ClbitId, ConditionTarget, GateKind, Instruction,
    InstructionKind, ParameterExpression, QubitId, Register,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{ParseError, ParseResult};

/// Emit a circuit as QASM 2.0 source code.
///
/// Registers keep their names and indices and are declared in bit order, so
/// parsing the output gives every operation its original bit ids. Each run
/// of bits outside any register is declared as a fresh register. Parameters
/// must be numeric and are written with enough digits to parse back to the
/// same `f64`.
pub fn emit(circuit: &Circuit) -> ParseResult<String> {
    let mut emitter = Emitter::new(circuit.dag())?;
    emitter.emit_circuit(circuit.dag())
}

/// QASM 2.0 emitter.
struct Emitter {
    output: String,
    qubits: FxHashMap<QubitId, String>,
    clbits: FxHashMap<ClbitId, String>,
    /// Classical register per bit, with the register's width.
    clbit_regs: FxHashMap<ClbitId, (String, usize)>,
    /// `qreg` then `creg` declarations, each in order of first bit id.
    declarations: Vec<String>,
}

impl Emitter {
    fn new(dag: &CircuitDag) -> ParseResult<Self> {
        let mut emitter = Self {
            output: String::new(),
            qubits: FxHashMap::default(),
            clbits: FxHashMap::default(),
            clbit_regs: FxHashMap::default(),
            declarations: Vec::new(),
        };
        emitter.assign_names(dag)?;
        Ok(emitter)
    }

    /// Name every wire `reg[i]`.
    ///
    /// The parser numbers bits in declaration order, so registers are
    /// declared in order of their first bit and each run of loose bits gets
    /// its own register at its position.
    fn assign_names(&mut self, dag: &CircuitDag) -> ParseResult<()> {
        let mut taken: FxHashSet<String> = dag
            .qregs()
            .iter()
            .map(|r| r.name.clone())
            .chain(dag.cregs().iter().map(|r| r.name.clone()))
            .collect();

        for (name, bits) in declaration_order(dag.qregs(), dag.qubits(), "q", &mut taken)? {
            for (i, q) in bits.iter().enumerate() {
                self.qubits.insert(*q, format!("{name}[{i}]"));
            }
            self.declarations.push(format!("qreg {name}[{}];", bits.len()));
        }

        for (name, bits) in declaration_order(dag.cregs(), dag.clbits(), "c", &mut taken)? {
            for (i, c) in bits.iter().enumerate() {
                self.clbits.insert(*c, format!("{name}[{i}]"));
                self.clbit_regs.insert(*c, (name.clone(), bits.len()));
            }
            self.declarations.push(format!("creg {name}[{}];", bits.len()));
        }
        Ok(())
    }

    fn emit_circuit(&mut self, dag: &CircuitDag) -> ParseResult<String> {
        self.writeln("OPENQASM 2.0;");
        self.writeln("include \"qelib1.inc\";");

        // Opaque declarations for custom gates, once per name.
        let mut declared = BTreeSet::new();
        for (_, inst) in dag.topological_ops()? {
            let InstructionKind::Gate(gate) = &inst.kind else {
                continue;
            };
            let GateKind::Custom(custom) = &gate.kind else {
                continue;
            };
            if !declared.insert(custom.name.clone()) {
                continue;
            }
            let args = (0..custom.num_qubits)
                .map(|i| format!("a{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            if custom.params.is_empty() {
                self.writeln(&format!("opaque {} {args};", custom.name));
            } else {
                let params = (0..custom.params.len())
                    .map(|i| format!("p{i}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.writeln(&format!("opaque {}({params}) {args};", custom.name));
            }
        }

        for decl in std::mem::take(&mut self.declarations) {
            self.writeln(&decl);
        }

        for (_, inst) in dag.topological_ops()? {
            self.emit_instruction(inst)?;
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn emit_instruction(&mut self, inst: &Instruction) -> ParseResult<()> {
        let prefix = match &inst.condition {
            Some(cond) => format!("if ({}) ", self.emit_condition(cond)?),
            None => String::new(),
        };

        match &inst.kind {
            InstructionKind::Gate(gate) => {
                let params = gate
                    .kind
                    .parameters()
                    .into_iter()
                    .map(|p| emit_param(gate.name(), p))
                    .collect::<ParseResult<Vec<_>>>()?;
                let args = self.qubit_list(&inst.qubits)?;
                if params.is_empty() {
                    self.writeln(&format!("{prefix}{} {args};", gate.name()));
                } else {
                    self.writeln(&format!(
                        "{prefix}{}({}) {args};",
                        gate.name(),
                        params.join(", ")
                    ));
                }
            }

            InstructionKind::Measure => {
                for (q, c) in inst.qubits.iter().zip(&inst.clbits) {
                    let line = format!("{prefix}measure {} -> {};", self.qubit(*q)?, self.clbit(*c)?);
                    self.writeln(&line);
                }
            }

            InstructionKind::Reset => {
                for q in &inst.qubits {
                    let line = format!("{prefix}reset {};", self.qubit(*q)?);
                    self.writeln(&line);
                }
            }

            InstructionKind::Barrier => {
                if !inst.qubits.is_empty() {
                    let args = self.qubit_list(&inst.qubits)?;
                    self.writeln(&format!("barrier {args};"));
                }
            }

            InstructionKind::Delay { .. } => {
                return Err(ParseError::Unsupported("delay in OpenQASM 2.0".into()));
            }
        }

        Ok(())
    }

    /// `creg == value`. A bit condition is only expressible when the bit is
    /// a whole one-bit register.
    fn emit_condition(&self, cond: &ClassicalCondition) -> ParseResult<String> {
        match &cond.target {
            ConditionTarget::Register(name) => Ok(format!("{name} == {}", cond.value)),
            ConditionTarget::Bit(clbit) => match self.clbit_regs.get(clbit) {
                Some((name, 1)) => Ok(format!("{name} == {}", cond.value)),
                _ => Err(ParseError::Unsupported(format!(
                    "condition on bit {clbit} inside a wider register"
                ))),
            },
        }
    }

    fn qubit(&self, q: QubitId) -> ParseResult<&str> {
        self.qubits
            .get(&q)
            .map(String::as_str)
            .ok_or_else(|| ParseError::UndefinedIdentifier(q.to_string()))
    }

    fn clbit(&self, c: ClbitId) -> ParseResult<&str> {
        self.clbits
            .get(&c)
            .map(String::as_str)
            .ok_or_else(|| ParseError::UndefinedIdentifier(c.to_string()))
    }

    fn qubit_list(&self, qubits: &[QubitId]) -> ParseResult<String> {
        Ok(qubits
            .iter()
            .map(|&q| self.qubit(q))
            .collect::<ParseResult<Vec<_>>>()?
            .join(", "))
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// Registers, plus a fresh register per run of loose bits, sorted by first
/// bit id.
///
/// Fails when the declared order would renumber bits, i.e. when registers
/// interleave or list their bits out of order.
fn declaration_order<B: Copy + Ord + std::fmt::Display>(
    registers: &[Register<B>],
    bits: impl Iterator<Item = B>,
    prefix: &str,
    taken: &mut FxHashSet<String>,
) -> ParseResult<Vec<(String, Vec<B>)>> {
    let mut sorted: Vec<B> = bits.collect();
    sorted.sort_unstable();
    let registered: BTreeSet<B> = registers.iter().flat_map(|r| r.bits.iter().copied()).collect();

    let mut groups: Vec<(String, Vec<B>)> = registers
        .iter()
        .map(|r| (r.name.clone(), r.bits.clone()))
        .collect();
    let mut run: Vec<B> = Vec::new();
    for &bit in &sorted {
        if registered.contains(&bit) {
            if !run.is_empty() {
                groups.push((fresh_name(prefix, taken), std::mem::take(&mut run)));
            }
        } else {
            run.push(bit);
        }
    }
    if !run.is_empty() {
        groups.push((fresh_name(prefix, taken), run));
    }
    groups.sort_by_key(|(_, bits)| bits.first().copied());

    let declared = groups.iter().flat_map(|(_, bits)| bits.iter().copied());
    if let Some((expected, found)) = sorted.iter().zip(declared).find(|&(&a, b)| a != b) {
        return Err(ParseError::Unsupported(format!(
            "register layout cannot keep bit order: {found} is declared where {expected} belongs"
        )));
    }
    Ok(groups)
}

/// `prefix`, or `prefix` with the smallest numeric suffix not in `taken`.
fn fresh_name(prefix: &str, taken: &mut FxHashSet<String>) -> String {
    let name = std::iter::once(prefix.to_string())
        .chain((0..).map(|i| format!("{prefix}{i}")))
        .find(|n| !taken.contains(n))
        .unwrap_or_else(|| prefix.to_string());
    taken.insert(name.clone());
    name
}

/// Write a numeric parameter so it parses back to the same `f64`.
fn emit_param(gate: &str, param: &ParameterExpression) -> ParseResult<String> {
    let value = param
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::Unsupported(format!("non-numeric parameter {param} on '{gate}'")))?;
    let magnitude = value.abs();
    if value == 0.0 || (1e-6..1e15).contains(&magnitude) {
        Ok(format!("{value}"))
    } else {
        Ok(format!("{value:e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use qunroll_ir::{CustomGate, StandardGate};

    #[test]
    fn test_emit_bell_state() {
        let mut circuit = Circuit::new("bell");
        let q = circuit.add_qreg("q", 2).unwrap();
        let c = circuit.add_creg("c", 2).unwrap();
        circuit.h(q[0]).unwrap();
        circuit.cx(q[0], q[1]).unwrap();
        circuit.measure(q[0], c[0]).unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.starts_with("OPENQASM 2.0;\ninclude \"qelib1.inc\";\n"));
        assert!(qasm.contains("qreg q[2];"));
        assert!(qasm.contains("creg c[2];"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("cx q[0], q[1];"));
        assert!(qasm.contains("measure q[0] -> c[0];"));
    }

    #[test]
    fn test_emit_condition() {
        let mut circuit = Circuit::new("cond");
        let q = circuit.add_qreg("q", 1).unwrap();
        circuit.add_creg("flag", 2).unwrap();
        circuit
            .gate_if(StandardGate::X, [q[0]], ClassicalCondition::register("flag", 3))
            .unwrap();
        assert!(emit(&circuit).unwrap().contains("if (flag == 3) x q[0];"));
    }

    #[test]
    fn test_full_precision_parameters() {
        let mut circuit = Circuit::new("params");
        let q = circuit.add_qreg("q", 1).unwrap();
        let values = [0.1 + 0.2, -1.0 / 3.0, 1e-9, 2.5e20, 0.0];
        for v in values {
            circuit.rz(v, q[0]).unwrap();
        }
        let reparsed = parse(&emit(&circuit).unwrap()).unwrap();
        let got: Vec<f64> = reparsed
            .dag()
            .topological_ops()
            .unwrap()
            .map(|(_, inst)| inst.parameters()[0].as_f64().unwrap())
            .collect();
        assert_eq!(got, values);
    }

    #[test]
    fn test_loose_bits_get_fresh_registers() {
        let mut circuit = Circuit::new("loose");
        circuit.add_qreg("q", 1).unwrap();
        let extra = circuit.add_qubit();
        circuit.h(extra).unwrap();

        let qasm = emit(&circuit).unwrap();
        assert!(qasm.contains("qreg q[1];"));
        assert!(qasm.contains("qreg q0[1];"));
        assert!(qasm.contains("h q0[0];"));
        assert!(parse(&qasm).is_ok());
    }

    #[test]
    fn test_loose_bits_keep_their_ids() {
        let mut circuit = Circuit::new("mixed");
        let loose = circuit.add_qubit();
        let r = circuit.add_qreg("r", 1).unwrap();
        let tail = circuit.add_qubit();
        let flag = circuit.add_clbit();
        let m = circuit.add_creg("m", 1).unwrap();
        circuit.x(loose).unwrap();
        circuit.h(r[0]).unwrap();
        circuit.cx(tail, loose).unwrap();
        circuit.measure(loose, flag).unwrap();
        circuit.measure(r[0], m[0]).unwrap();

        let qasm = emit(&circuit).unwrap();
        let reparsed = parse(&qasm).unwrap();
        let ops = |c: &Circuit| -> Vec<(String, Vec<QubitId>, Vec<ClbitId>)> {
            c.dag()
                .topological_ops()
                .unwrap()
                .map(|(_, inst)| (inst.name().to_string(), inst.qubits.clone(), inst.clbits.clone()))
                .collect()
        };
        assert_eq!(ops(&reparsed), ops(&circuit), "{qasm}");
        assert_eq!(ops(&reparsed)[0], ("x".to_string(), vec![QubitId(0)], vec![]));
        let names: Vec<_> = reparsed.dag().qregs().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["q", "r", "q0"]);
    }

    #[test]
    fn test_interleaved_registers_rejected() {
        let mut dag = CircuitDag::new();
        for i in 0..4 {
            dag.add_qubit(QubitId(i));
        }
        dag.add_qreg(Register::new("even", [QubitId(0), QubitId(2)])).unwrap();
        dag.add_qreg(Register::new("odd", [QubitId(1), QubitId(3)])).unwrap();
        let circuit = Circuit::from_dag(dag);
        assert!(matches!(emit(&circuit), Err(ParseError::Unsupported(_))));
    }

    #[test]
    fn test_opaque_declared_once() {
        let mut circuit = Circuit::new("opaque");
        let q = circuit.add_qreg("q", 2).unwrap();
        let oracle = CustomGate::new("oracle", 2).with_params(vec![0.5.into()]);
        circuit.gate(oracle.clone(), [q[0], q[1]]).unwrap();
        circuit.gate(oracle, [q[1], q[0]]).unwrap();

        let qasm = emit(&circuit).unwrap();
        assert_eq!(qasm.matches("opaque oracle(p0) a0, a1;").count(), 1);
        assert!(qasm.contains("oracle(0.5) q[1], q[0];"));
        assert!(parse(&qasm).unwrap().dag().structurally_eq(circuit.dag()));
    }

    #[test]
    fn test_symbolic_parameter_rejected() {
        let mut circuit = Circuit::with_size("sym", 1, 0);
        circuit
            .rz(ParameterExpression::symbol("theta"), QubitId(0))
            .unwrap();
        assert!(matches!(emit(&circuit), Err(ParseError::Unsupported(_))));
    }

    #[test]
    fn test_delay_rejected() {
        let mut circuit = Circuit::with_size("delay", 1, 0);
        circuit.delay(QubitId(0), 10).unwrap();
        assert!(matches!(emit(&circuit), Err(ParseError::Unsupported(_))));
    }
}
