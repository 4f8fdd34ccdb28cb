//! Materialization: applying a translation unit to a circuit.
//!
//! Pass 1 collects the register catalog and the `(name, arity)` gate table.
//! Pass 2 walks the code section in order. Each element is planned in full
//! (gate calls expanded, operands resolved, parameters evaluated) before
//! anything is applied, so a planning failure leaves the circuit untouched
//! for that element. Every applied operation must raise the target's
//! operation count; one that does not is reported as `OpNotFound`.

use nuqasm_ir::{ClassicalCondition, Operand, RegisterKind};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::{debug, info, instrument, trace};

use crate::binder::Binder;
use crate::element::{Element, ElementBody, OpCall, RegisterDecl};
use crate::error::{NuqasmError, NuqasmResult, SourceLocation};
use crate::expression::Expr;
use crate::gatedef::GateDefinition;
use crate::target::CircuitTarget;
use crate::unit::TranslationUnit;

/// Counts reported by a materialization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaterializeSummary {
    /// Registers created.
    pub registers: usize,
    /// Operations applied.
    pub ops: usize,
    /// Gate calls expanded, nested calls included.
    pub gate_calls: usize,
}

/// One operation ready to apply.
#[derive(Debug, Clone, PartialEq)]
enum Planned {
    Primitive {
        name: String,
        params: Vec<f64>,
        operands: Vec<Operand>,
        condition: Option<ClassicalCondition>,
    },
    Measure {
        source: Operand,
        target: Operand,
        condition: Option<ClassicalCondition>,
    },
    Barrier {
        operands: Vec<Operand>,
    },
}

impl Planned {
    fn name(&self) -> &str {
        match self {
            Planned::Primitive { name, .. } => name,
            Planned::Measure { .. } => "measure",
            Planned::Barrier { .. } => "barrier",
        }
    }

    fn arity(&self) -> usize {
        match self {
            Planned::Primitive { params, .. } => params.len(),
            _ => 0,
        }
    }
}

/// Per-element planning state.
struct Plan<'a> {
    at: &'a SourceLocation,
    condition: Option<&'a ClassicalCondition>,
    /// Gate calls being expanded, outermost first.
    stack: Vec<(String, usize)>,
    ops: Vec<Planned>,
    gate_calls: usize,
}

/// Applies a translation unit to a [`CircuitTarget`].
pub struct Materializer<'u> {
    unit: &'u TranslationUnit,
    gates: FxHashMap<(&'u str, usize), &'u GateDefinition>,
}

impl<'u> Materializer<'u> {
    pub fn new(unit: &'u TranslationUnit) -> Self {
        let mut gates = FxHashMap::default();
        for gate in &unit.gates {
            gates.insert((gate.name.as_str(), gate.arity()), gate);
        }
        Self { unit, gates }
    }

    /// The gate definition `(name, arity)` resolves to.
    pub fn gate(&self, name: &str, arity: usize) -> Option<&'u GateDefinition> {
        self.gates.get(&(name, arity)).copied()
    }

    #[instrument(skip_all, fields(unit = %self.unit.metadata.name))]
    pub fn materialize<T: CircuitTarget>(&self, target: &mut T) -> NuqasmResult<MaterializeSummary> {
        let catalog = self.register_catalog()?;
        debug!(registers = catalog.len(), gates = self.gates.len(), "catalog built");

        let mut summary = MaterializeSummary::default();
        for element in &self.unit.code {
            let at = self.location(element);
            let plan = match &element.body {
                ElementBody::Qreg(decl) => {
                    self.declare(target, decl, RegisterKind::Quantum, &at)?;
                    summary.registers += 1;
                    continue;
                }
                ElementBody::Creg(decl) => {
                    self.declare(target, decl, RegisterKind::Classical, &at)?;
                    summary.registers += 1;
                    continue;
                }
                ElementBody::Op(call) => self.plan_call(target, call, None, &at)?,
                ElementBody::CondOp { condition, op } => {
                    self.plan_call(target, op, Some(condition), &at)?
                }
                ElementBody::Measure {
                    source,
                    target: dest,
                } => plan_measure(target, source, dest, None, &at)?,
                ElementBody::CondMeasure {
                    condition,
                    source,
                    target: dest,
                } => plan_measure(target, source, dest, Some(condition), &at)?,
                ElementBody::Barrier { operands } => {
                    let mut plan = Plan::new(&at, None);
                    plan.ops.push(Planned::Barrier {
                        operands: resolve_all(target, operands, &at)?,
                    });
                    plan
                }
                _ => continue,
            };
            summary.gate_calls += plan.gate_calls;
            summary.ops += commit(target, plan.ops, &at)?;
        }

        info!(
            registers = summary.registers,
            ops = summary.ops,
            gate_calls = summary.gate_calls,
            "materialization complete"
        );
        Ok(summary)
    }

    /// Pass 1: register declarations in order, names unique across kinds.
    fn register_catalog(&self) -> NuqasmResult<Vec<&'u RegisterDecl>> {
        let mut seen = FxHashSet::default();
        let mut catalog = Vec::new();
        for (element, decl) in self.unit.register_declarations() {
            if !seen.insert(decl.name.as_str()) {
                return Err(NuqasmError::DuplicateRegister {
                    name: decl.name.clone(),
                    at: self.location(element),
                });
            }
            catalog.push(decl);
        }
        Ok(catalog)
    }

    fn declare<T: CircuitTarget>(
        &self,
        target: &mut T,
        decl: &RegisterDecl,
        kind: RegisterKind,
        at: &SourceLocation,
    ) -> NuqasmResult<()> {
        target
            .add_register(&decl.name, decl.size, kind)
            .map_err(|source| NuqasmError::Circuit {
                at: Some(at.clone()),
                source,
            })?;
        debug!(register = %decl.name, size = decl.size, kind = kind.keyword(), "register created");
        Ok(())
    }

    fn plan_call<'a, T: CircuitTarget>(
        &self,
        target: &T,
        call: &OpCall,
        condition: Option<&'a ClassicalCondition>,
        at: &'a SourceLocation,
    ) -> NuqasmResult<Plan<'a>> {
        let params = call
            .params
            .iter()
            .map(|text| parse_param(text, at))
            .collect::<NuqasmResult<Vec<_>>>()?;
        let mut plan = Plan::new(at, condition);
        self.dispatch(target, &call.op, params, &call.operands, &mut plan)?;
        Ok(plan)
    }

    /// Primitive first, then gate lookup by `(name, arity)`.
    fn dispatch<T: CircuitTarget>(
        &self,
        target: &T,
        op: &str,
        params: Vec<Expr>,
        operands: &[String],
        plan: &mut Plan<'_>,
    ) -> NuqasmResult<()> {
        if op == "barrier" {
            plan.ops.push(Planned::Barrier {
                operands: resolve_all(target, operands, plan.at)?,
            });
            return Ok(());
        }

        if target.has_primitive(op) {
            let values = params
                .iter()
                .map(|expr| {
                    expr.eval().map_err(|source| NuqasmError::Expression {
                        expr: expr.to_string(),
                        at: plan.at.clone(),
                        source,
                    })
                })
                .collect::<NuqasmResult<Vec<_>>>()?;
            plan.ops.push(Planned::Primitive {
                name: op.to_string(),
                params: values,
                operands: resolve_all(target, operands, plan.at)?,
                condition: plan.condition.cloned(),
            });
            return Ok(());
        }

        let arity = params.len();
        let gate = self.gate(op, arity).ok_or_else(|| NuqasmError::OpNotFound {
            op: op.to_string(),
            arity,
            at: plan.at.clone(),
        })?;
        if plan.stack.iter().any(|(name, a)| name == op && *a == arity) {
            let chain = plan
                .stack
                .iter()
                .map(|(name, _)| name.as_str())
                .chain(std::iter::once(op))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(NuqasmError::RecursiveGate {
                chain,
                at: plan.at.clone(),
            });
        }

        let binder = Binder::bind(gate, params, operands, plan.at)?;
        let body = binder.expand(plan.at)?;
        trace!(gate = op, arity, ops = body.len(), "expanding gate call");
        plan.gate_calls += 1;
        plan.stack.push((op.to_string(), arity));
        for bound in body {
            self.dispatch(target, &bound.op, bound.params, &bound.operands, plan)?;
        }
        plan.stack.pop();
        Ok(())
    }

    fn location(&self, element: &Element) -> SourceLocation {
        SourceLocation::new(
            self.unit.file_name(element.file),
            element.line,
            element.text(),
        )
    }
}

impl<'a> Plan<'a> {
    fn new(at: &'a SourceLocation, condition: Option<&'a ClassicalCondition>) -> Self {
        Self {
            at,
            condition,
            stack: Vec::new(),
            ops: Vec::new(),
            gate_calls: 0,
        }
    }
}

/// Apply planned operations, checking that each one lands.
fn commit<T: CircuitTarget>(
    target: &mut T,
    ops: Vec<Planned>,
    at: &SourceLocation,
) -> NuqasmResult<usize> {
    let count = ops.len();
    for planned in ops {
        let before = target.op_count();
        let result = match &planned {
            Planned::Primitive {
                name,
                params,
                operands,
                condition,
            } => target.apply_primitive(name, params, operands, condition.clone()),
            Planned::Measure {
                source,
                target: dest,
                condition,
            } => target.measure(*source, *dest, condition.clone()),
            Planned::Barrier { operands } => target.barrier(operands),
        };
        result.map_err(|source| NuqasmError::Circuit {
            at: Some(at.clone()),
            source,
        })?;
        if target.op_count() <= before {
            return Err(NuqasmError::OpNotFound {
                op: planned.name().to_string(),
                arity: planned.arity(),
                at: at.clone(),
            });
        }
        trace!(op = planned.name(), line = at.line, "applied");
    }
    Ok(count)
}

fn plan_measure<'a, T: CircuitTarget>(
    target: &T,
    source: &str,
    dest: &str,
    condition: Option<&'a ClassicalCondition>,
    at: &'a SourceLocation,
) -> NuqasmResult<Plan<'a>> {
    let mut plan = Plan::new(at, condition);
    plan.ops.push(Planned::Measure {
        source: resolve(target, source, at)?,
        target: resolve(target, dest, at)?,
        condition: condition.cloned(),
    });
    Ok(plan)
}

fn parse_param(text: &str, at: &SourceLocation) -> NuqasmResult<Expr> {
    Expr::parse(text).map_err(|source| NuqasmError::Expression {
        expr: text.to_string(),
        at: at.clone(),
        source,
    })
}

fn resolve<T: CircuitTarget>(target: &T, operand: &str, at: &SourceLocation) -> NuqasmResult<Operand> {
    target
        .resolve(operand)
        .ok_or_else(|| NuqasmError::UnresolvedOperand {
            operand: operand.to_string(),
            at: at.clone(),
        })
}

fn resolve_all<T: CircuitTarget>(
    target: &T,
    operands: &[String],
    at: &SourceLocation,
) -> NuqasmResult<Vec<Operand>> {
    operands.iter().map(|o| resolve(target, o, at)).collect()
}

/// Materialize `unit` into `target`.
pub fn materialize<T: CircuitTarget>(
    unit: &TranslationUnit,
    target: &mut T,
) -> NuqasmResult<MaterializeSummary> {
    Materializer::new(unit).materialize(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslatorOptions;
    use crate::source::MemoryLoader;
    use crate::translator::Translator;
    use nuqasm_ir::{Circuit, IrResult, Register};

    fn unit(source: &str) -> TranslationUnit {
        Translator::with_loader(TranslatorOptions::default(), MemoryLoader::new())
            .translate_str(source)
            .unwrap()
    }

    fn run(source: &str) -> (Circuit, NuqasmResult<MaterializeSummary>) {
        let unit = unit(source);
        let mut circuit = Circuit::new(unit.name());
        let result = materialize(&unit, &mut circuit);
        (circuit, result)
    }

    #[test]
    fn test_primitive_program() {
        let (circuit, summary) = run(
            "OPENQASM 2.0;\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0],q[1];\nmeasure q[0] -> c[0];\n",
        );
        let summary = summary.unwrap();
        assert_eq!(summary.registers, 2);
        assert_eq!(summary.ops, 3);
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.num_gates(), 2);
        assert_eq!(circuit.num_measurements(), 1);
    }

    #[test]
    fn test_gate_call_expands_to_primitive() {
        let (circuit, summary) = run(
            "OPENQASM 2.0;\ngate foo(a) q { rz(a) q; }\nqreg q[1];\nfoo(1.5707963267948966) q[0];\n",
        );
        assert_eq!(summary.unwrap().gate_calls, 1);
        let (gate, inst) = circuit.gates().next().unwrap();
        assert_eq!(gate.name(), "rz");
        assert_eq!(gate.parameters(), vec![1.5707963267948966]);
        assert_eq!(inst.operands, vec![Operand::Qubit(nuqasm_ir::QubitId(0))]);
    }

    #[test]
    fn test_nested_gates_and_barrier_in_body() {
        let (circuit, summary) = run(
            "OPENQASM 2.0;\n\
             gate inner(t) a { rx(t) a; }\n\
             gate outer(t) a,b { inner(t*2) a; barrier a,b; cx a,b; }\n\
             qreg q[2];\n\
             outer(pi/4) q[0],q[1];\n",
        );
        let summary = summary.unwrap();
        assert_eq!(summary.gate_calls, 2);
        assert_eq!(summary.ops, 3);
        let names: Vec<_> = circuit.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["rx", "barrier", "cx"]);
        let (rx, _) = circuit.gates().next().unwrap();
        assert!((rx.parameters()[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_op_not_found_commits_nothing() {
        let (circuit, result) = run("OPENQASM 2.0;\nqreg q[1];\nfrob q[0];\n");
        match result.unwrap_err() {
            NuqasmError::OpNotFound { op, arity, at } => {
                assert_eq!(op, "frob");
                assert_eq!(arity, 0);
                assert_eq!(at.line, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_failing_body_commits_nothing_for_element() {
        let (circuit, result) = run(
            "OPENQASM 2.0;\ngate g a { h a; frob a; }\nqreg q[1];\nx q[0];\ng q[0];\n",
        );
        assert!(matches!(result, Err(NuqasmError::OpNotFound { .. })));
        assert_eq!(circuit.num_ops(), 1);
    }

    #[test]
    fn test_arity_selects_definition() {
        let (circuit, _) = run(
            "OPENQASM 2.0;\ngate g a { x a; }\ngate g(t) a { rz(t) a; }\nqreg q[1];\ng(0.5) q[0];\ng q[0];\n",
        );
        let names: Vec<_> = circuit.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["rz", "x"]);
    }

    #[test]
    fn test_recursive_gate_detected() {
        let (_, result) = run(
            "OPENQASM 2.0;\ngate a q { b q; }\ngate b q { a q; }\nqreg r[1];\na r[0];\n",
        );
        match result.unwrap_err() {
            NuqasmError::RecursiveGate { chain, .. } => assert_eq!(chain, "a -> b -> a"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_conditional_call_propagates_condition() {
        let (circuit, _) = run(
            "OPENQASM 2.0;\ngate pair a,b { x a; x b; }\nqreg q[2];\ncreg c[1];\nif(c==1) pair q[0],q[1];\n",
        );
        assert_eq!(circuit.num_ops(), 2);
        assert!(circuit.instructions().iter().all(|i| {
            i.condition
                .as_ref()
                .is_some_and(|c| c.register == "c" && c.value == "1")
        }));
    }

    #[test]
    fn test_conditional_measure_carries_condition() {
        let (circuit, summary) = run(
            "OPENQASM 2.0;\nqreg q[1];\ncreg c[1];\nif(c==1) measure q[0] -> c[0];\n",
        );
        assert_eq!(summary.unwrap().ops, 1);
        let inst = &circuit.instructions()[0];
        assert!(inst.is_measure());
        assert!(inst.condition.as_ref().is_some_and(|c| c.register == "c" && c.value == "1"));
    }

    #[test]
    fn test_spaced_parameter_lists_materialize() {
        let (circuit, summary) = run(
            "OPENQASM 2.0;\n\
             gate g(a) q { rz (a) q; }\n\
             qreg q[1];\n\
             creg c[1];\n\
             rz (pi/2) q[0];\n\
             g (pi) q[0];\n\
             if (c==0) rz (pi/4) q[0];\n",
        );
        assert_eq!(summary.unwrap().gate_calls, 1);
        let angles: Vec<f64> = circuit.gates().map(|(g, _)| g.parameters()[0]).collect();
        assert_eq!(angles.len(), 3);
        assert!((angles[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((angles[1] - std::f64::consts::PI).abs() < 1e-12);
        assert!((angles[2] - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert!(circuit.instructions()[2].condition.is_some());
    }

    #[test]
    fn test_resolution_errors() {
        let (_, result) = run("OPENQASM 2.0;\nqreg q[1];\nh q[1];\n");
        assert!(matches!(result, Err(NuqasmError::UnresolvedOperand { ref operand, .. }) if operand == "q[1]"));

        let (_, result) = run("OPENQASM 2.0;\nh q[0];\nqreg q[1];\n");
        assert!(matches!(result, Err(NuqasmError::UnresolvedOperand { .. })));

        let (_, result) = run("OPENQASM 2.0;\nqreg q[1];\nrz(theta) q[0];\n");
        assert!(matches!(result, Err(NuqasmError::Expression { .. })));
    }

    #[test]
    fn test_duplicate_register_in_pass_one() {
        let (circuit, result) = run("OPENQASM 2.0;\nqreg q[1];\nx q[0];\ncreg q[1];\n");
        assert!(matches!(result, Err(NuqasmError::DuplicateRegister { ref at, .. }) if at.line == 4));
        assert_eq!(circuit.num_ops(), 0);
        assert_eq!(circuit.num_qubits(), 0);
    }

    #[test]
    fn test_malformed_call() {
        let (_, result) = run("OPENQASM 2.0;\ngate g a,b { cx a,b; }\nqreg q[2];\ng q[0];\n");
        assert!(matches!(result, Err(NuqasmError::MalformedMacroCall { .. })));
    }

    /// Accepts every primitive but never records anything.
    struct Silent(Vec<Register>);

    impl CircuitTarget for Silent {
        fn add_register(&mut self, name: &str, size: u32, kind: RegisterKind) -> IrResult<()> {
            self.0.push(Register {
                name: name.to_string(),
                kind,
                size,
                start: 0,
            });
            Ok(())
        }
        fn registers(&self) -> &[Register] {
            &self.0
        }
        fn has_primitive(&self, _name: &str) -> bool {
            true
        }
        fn apply_primitive(
            &mut self,
            _name: &str,
            _params: &[f64],
            _operands: &[Operand],
            _condition: Option<ClassicalCondition>,
        ) -> IrResult<()> {
            Ok(())
        }
        fn measure(
            &mut self,
            _source: Operand,
            _target: Operand,
            _condition: Option<ClassicalCondition>,
        ) -> IrResult<()> {
            Ok(())
        }
        fn barrier(&mut self, _operands: &[Operand]) -> IrResult<()> {
            Ok(())
        }
        fn op_count(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_silent_decline_is_op_not_found() {
        let unit = unit("OPENQASM 2.0;\nqreg q[1];\nh q[0];\n");
        let mut target = Silent(Vec::new());
        let err = materialize(&unit, &mut target).unwrap_err();
        assert!(matches!(err, NuqasmError::OpNotFound { ref op, .. } if op == "h"));
    }
}
