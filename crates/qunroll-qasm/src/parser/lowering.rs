//! AST-to-Circuit lowering for QASM 2.0.

use qunroll_ir::{
    Circuit, ClassicalCondition, ClbitId, CustomGate, Gate, Instruction, ParamFunction,
    ParameterExpression, QubitId, StandardGate,
};
use rustc_hash::FxHashMap;

use crate::ast::{Argument, BinOp, Condition, Expression, GateCall, Operation, Program, Statement};
use crate::error::{ParseError, ParseResult};

/// Lower an AST Program to a Circuit.
pub(crate) fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    let mut lowerer = Lowerer::default();
    for stmt in &program.statements {
        lowerer.lower_statement(stmt)?;
    }
    Ok(lowerer.circuit)
}

/// Signature of an `opaque` gate.
struct OpaqueSignature {
    num_params: usize,
    num_qubits: usize,
}

/// Lowers statements in order; names must be declared before use.
struct Lowerer {
    circuit: Circuit,
    qregs: FxHashMap<String, Vec<QubitId>>,
    cregs: FxHashMap<String, Vec<ClbitId>>,
    opaque: FxHashMap<String, OpaqueSignature>,
}

impl Default for Lowerer {
    fn default() -> Self {
        Self {
            circuit: Circuit::new("circuit"),
            qregs: FxHashMap::default(),
            cregs: FxHashMap::default(),
            opaque: FxHashMap::default(),
        }
    }
}

impl Lowerer {
    fn declared(&self, name: &str) -> bool {
        self.qregs.contains_key(name) || self.cregs.contains_key(name)
    }

    fn lower_statement(&mut self, stmt: &Statement) -> ParseResult<()> {
        match stmt {
            Statement::Include(_) => Ok(()),

            Statement::QregDecl { name, size } => {
                if self.declared(name) {
                    return Err(ParseError::DuplicateDeclaration(name.clone()));
                }
                let ids = self.circuit.add_qreg(name.clone(), *size)?;
                self.qregs.insert(name.clone(), ids);
                Ok(())
            }

            Statement::CregDecl { name, size } => {
                if self.declared(name) {
                    return Err(ParseError::DuplicateDeclaration(name.clone()));
                }
                let ids = self.circuit.add_creg(name.clone(), *size)?;
                self.cregs.insert(name.clone(), ids);
                Ok(())
            }

            Statement::OpaqueDecl {
                name,
                params,
                qubits,
            } => {
                if standard_param_count(name).is_some() || self.opaque.contains_key(name) {
                    return Err(ParseError::DuplicateDeclaration(name.clone()));
                }
                self.opaque.insert(
                    name.clone(),
                    OpaqueSignature {
                        num_params: params.len(),
                        num_qubits: qubits.len(),
                    },
                );
                Ok(())
            }

            Statement::Operation { op, condition, .. } => {
                let condition = condition.as_ref().map(|c| self.condition(c)).transpose()?;
                for inst in self.lower_operation(op)? {
                    let inst = match &condition {
                        Some(c) => inst.with_condition(c.clone()),
                        None => inst,
                    };
                    self.circuit.append(inst)?;
                }
                Ok(())
            }
        }
    }

    fn condition(&self, condition: &Condition) -> ParseResult<ClassicalCondition> {
        if !self.cregs.contains_key(&condition.register) {
            return Err(ParseError::UndefinedIdentifier(condition.register.clone()));
        }
        Ok(ClassicalCondition::register(
            condition.register.clone(),
            condition.value,
        ))
    }

    fn lower_operation(&self, op: &Operation) -> ParseResult<Vec<Instruction>> {
        match op {
            Operation::Gate(call) => self.lower_gate_call(call),

            Operation::Measure { qubit, bit } => {
                let qubits = self.resolve_qubits(qubit)?;
                let clbits = self.resolve_clbits(bit)?;
                if qubit.index.is_none() != bit.index.is_none() || qubits.len() != clbits.len() {
                    return Err(ParseError::RegisterSizeMismatch("measure".into()));
                }
                Ok(qubits
                    .into_iter()
                    .zip(clbits)
                    .map(|(q, c)| Instruction::measure(q, c))
                    .collect())
            }

            Operation::Reset(arg) => Ok(self
                .resolve_qubits(arg)?
                .into_iter()
                .map(Instruction::reset)
                .collect()),

            Operation::Barrier(args) => {
                let mut qubits = Vec::new();
                for arg in args {
                    for q in self.resolve_qubits(arg)? {
                        if !qubits.contains(&q) {
                            qubits.push(q);
                        }
                    }
                }
                Ok(vec![Instruction::barrier(qubits)])
            }
        }
    }

    fn lower_gate_call(&self, call: &GateCall) -> ParseResult<Vec<Instruction>> {
        let name = match call.name.as_str() {
            "U" => "u3",
            "CX" => "cx",
            other => other,
        };
        let params: Vec<_> = call
            .params
            .iter()
            .map(|e| expr_to_param(e).map(|p| p.simplify()))
            .collect::<ParseResult<_>>()?;

        let gate: Gate = if let Some(expected) = standard_param_count(name) {
            check_param_count(name, expected, params.len())?;
            StandardGate::from_name(name, params)
                .ok_or_else(|| ParseError::UnknownGate(name.into()))?
                .into()
        } else if let Some(sig) = self.opaque.get(name) {
            check_param_count(name, sig.num_params, params.len())?;
            let num_qubits = u32::try_from(sig.num_qubits)
                .map_err(|_| ParseError::Unsupported(format!("arity of '{name}'")))?;
            CustomGate::new(name, num_qubits).with_params(params).into()
        } else {
            return Err(ParseError::UnknownGate(call.name.clone()));
        };

        let expected = gate.num_qubits() as usize;
        if call.args.len() != expected {
            return Err(ParseError::WrongQubitCount {
                gate: name.into(),
                expected,
                got: call.args.len(),
            });
        }

        let operands = call
            .args
            .iter()
            .map(|arg| self.resolve_qubits(arg).map(|ids| (arg.index.is_none(), ids)))
            .collect::<ParseResult<Vec<_>>>()?;
        let width = broadcast_width(name, &operands)?;

        Ok((0..width)
            .map(|i| {
                let qubits = operands
                    .iter()
                    .map(|(whole, ids)| if *whole { ids[i] } else { ids[0] });
                Instruction::gate(gate.clone(), qubits)
            })
            .collect())
    }

    fn resolve_qubits(&self, arg: &Argument) -> ParseResult<Vec<QubitId>> {
        let ids = self
            .qregs
            .get(&arg.register)
            .ok_or_else(|| ParseError::UndefinedIdentifier(arg.register.clone()))?;
        select(&arg.register, ids, arg.index)
    }

    fn resolve_clbits(&self, arg: &Argument) -> ParseResult<Vec<ClbitId>> {
        let ids = self
            .cregs
            .get(&arg.register)
            .ok_or_else(|| ParseError::UndefinedIdentifier(arg.register.clone()))?;
        select(&arg.register, ids, arg.index)
    }
}

/// One element of a register, or all of it.
fn select<T: Copy>(register: &str, ids: &[T], index: Option<u32>) -> ParseResult<Vec<T>> {
    match index {
        None => Ok(ids.to_vec()),
        Some(i) => ids
            .get(i as usize)
            .map(|&id| vec![id])
            .ok_or_else(|| ParseError::IndexOutOfBounds {
                register: register.into(),
                index: i as usize,
                size: ids.len(),
            }),
    }
}

/// Number of applications for a call: the common size of its whole-register
/// arguments, or one if every argument is a single element.
fn broadcast_width(name: &str, operands: &[(bool, Vec<QubitId>)]) -> ParseResult<usize> {
    let mut width = None;
    for (whole, ids) in operands {
        if !whole {
            continue;
        }
        match width {
            None => width = Some(ids.len()),
            Some(w) if w != ids.len() => {
                return Err(ParseError::RegisterSizeMismatch(name.into()));
            }
            Some(_) => {}
        }
    }
    Ok(width.unwrap_or(1))
}

/// Parameter count of a standard gate, or `None` if `name` is not one.
fn standard_param_count(name: &str) -> Option<usize> {
    match name {
        "rx" | "ry" | "rz" | "p" | "u1" | "crz" | "cu1" | "rzz" => Some(1),
        "u2" => Some(2),
        "u3" | "cu3" => Some(3),
        _ if StandardGate::NAMES.contains(&name) => Some(0),
        _ => None,
    }
}

fn check_param_count(gate: &str, expected: usize, got: usize) -> ParseResult<()> {
    if expected == got {
        Ok(())
    } else {
        Err(ParseError::WrongParameterCount {
            gate: gate.into(),
            expected,
            got,
        })
    }
}

/// Convert an AST expression to a parameter expression.
#[allow(clippy::cast_precision_loss)]
fn expr_to_param(expr: &Expression) -> ParseResult<ParameterExpression> {
    Ok(match expr {
        Expression::Int(v) => ParameterExpression::constant(*v as f64),
        Expression::Float(v) => ParameterExpression::constant(*v),
        Expression::Pi => ParameterExpression::pi(),
        Expression::Identifier(name) => {
            return Err(ParseError::UndefinedIdentifier(name.clone()));
        }
        Expression::Neg(e) => -expr_to_param(e)?,
        Expression::BinOp { left, op, right } => {
            let (l, r) = (expr_to_param(left)?, expr_to_param(right)?);
            match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
            }
        }
        Expression::FnCall { name, arg } => {
            let function = ParamFunction::from_name(name)
                .ok_or_else(|| ParseError::UndefinedIdentifier(name.clone()))?;
            ParameterExpression::func(function, expr_to_param(arg)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use qunroll_ir::{ConditionTarget, InstructionKind, WireId};

    use crate::error::ParseError;
    use crate::parser::parse;

    fn header(body: &str) -> String {
        format!("OPENQASM 2.0;\ninclude \"qelib1.inc\";\n{body}")
    }

    #[test]
    fn test_broadcast_over_registers() {
        let circuit = parse(&header("qreg a[3];\nqreg b[3];\ncx a, b;\nh a;")).unwrap();
        let counts = circuit.dag().count_ops();
        assert_eq!(counts["cx"], 3);
        assert_eq!(counts["h"], 3);
    }

    #[test]
    fn test_broadcast_single_repeats() {
        let circuit = parse(&header("qreg a[1];\nqreg b[4];\ncx a[0], b;")).unwrap();
        assert_eq!(circuit.dag().count_ops()["cx"], 4);
        assert_eq!(circuit.depth().unwrap(), 4);
    }

    #[test]
    fn test_broadcast_size_mismatch() {
        let result = parse(&header("qreg a[2];\nqreg b[3];\ncx a, b;"));
        assert!(matches!(result, Err(ParseError::RegisterSizeMismatch(_))));
    }

    #[test]
    fn test_measure_broadcast() {
        let circuit = parse(&header("qreg q[3];\ncreg c[3];\nmeasure q -> c;")).unwrap();
        assert_eq!(circuit.dag().count_ops()["measure"], 3);
    }

    #[test]
    fn test_parameters_are_folded() {
        let circuit = parse(&header("qreg q[1];\nu1(pi/2 + 0.5) q[0];")).unwrap();
        let (_, inst) = circuit.dag().topological_ops().unwrap().next().unwrap();
        let params = inst.parameters();
        assert!((params[0].as_f64().unwrap() - (PI / 2.0 + 0.5)).abs() < 1e-12);
        assert!(matches!(params[0], qunroll_ir::ParameterExpression::Constant(_)));
    }

    #[test]
    fn test_builtin_u_is_u3() {
        let circuit = parse(&header("qreg q[2];\nU(0, 0, pi) q[0];\nCX q[0], q[1];")).unwrap();
        let counts = circuit.dag().count_ops();
        assert_eq!(counts["u3"], 1);
        assert_eq!(counts["cx"], 1);
    }

    #[test]
    fn test_conditioned_gate() {
        let circuit =
            parse(&header("qreg q[1];\ncreg c[2];\nmeasure q[0] -> c[0];\nif (c == 1) x q[0];"))
                .unwrap();
        let (_, last) = circuit.dag().topological_ops().unwrap().last().unwrap();
        let cond = last.condition.as_ref().unwrap();
        assert_eq!(cond.target, ConditionTarget::Register("c".into()));
        assert_eq!(cond.value, 1);
        // The conditioned op reads both bits of the register.
        let clbit_ops = circuit
            .dag()
            .wire_ops(WireId::Clbit(qunroll_ir::ClbitId(1)))
            .unwrap();
        assert_eq!(clbit_ops.len(), 1);
    }

    #[test]
    fn test_opaque_gate() {
        let circuit =
            parse(&header("opaque oracle(theta) a, b;\nqreg q[2];\noracle(0.5) q[0], q[1];"))
                .unwrap();
        let (_, inst) = circuit.dag().topological_ops().unwrap().next().unwrap();
        assert_eq!(inst.name(), "oracle");
        assert!(matches!(inst.kind, InstructionKind::Gate(_)));
    }

    #[test]
    fn test_errors() {
        let cases: [(&str, fn(&ParseError) -> bool); 8] = [
            ("qreg q[1];\nfoo q[0];", |e| matches!(e, ParseError::UnknownGate(_))),
            ("qreg q[1];\nh r[0];", |e| matches!(e, ParseError::UndefinedIdentifier(_))),
            ("qreg q[1];\nh q[1];", |e| matches!(e, ParseError::IndexOutOfBounds { index: 1, .. })),
            ("qreg q[2];\nh q[0], q[1];", |e| {
                matches!(e, ParseError::WrongQubitCount { expected: 1, got: 2, .. })
            }),
            ("qreg q[1];\nrx q[0];", |e| {
                matches!(e, ParseError::WrongParameterCount { expected: 1, got: 0, .. })
            }),
            ("qreg q[1];\nrz(theta) q[0];", |e| {
                matches!(e, ParseError::UndefinedIdentifier(n) if n == "theta")
            }),
            ("qreg q[1];\ncreg q[1];", |e| matches!(e, ParseError::DuplicateDeclaration(_))),
            ("qreg q[2];\ncx q[0], q[0];", |e| matches!(e, ParseError::CircuitError(_))),
        ];
        for (body, check) in cases {
            let err = parse(&header(body)).unwrap_err();
            assert!(check(&err), "{body}: {err}");
        }
    }
}
