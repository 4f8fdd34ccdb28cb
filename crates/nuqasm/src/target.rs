//! The circuit-building side of materialization.

use nuqasm_ir::{
    Circuit, ClassicalCondition, ClbitId, IrError, IrResult, Operand, QubitId, Register,
    RegisterKind, StandardGate,
};

use crate::element::OperandRef;

/// What the materializer needs from a circuit.
pub trait CircuitTarget {
    /// Create a named register.
    fn add_register(&mut self, name: &str, size: u32, kind: RegisterKind) -> IrResult<()>;

    /// Registers in creation order.
    fn registers(&self) -> &[Register];

    /// Whether `name` is a primitive this target applies directly.
    fn has_primitive(&self, name: &str) -> bool;

    /// Apply a primitive.
    fn apply_primitive(
        &mut self,
        name: &str,
        params: &[f64],
        operands: &[Operand],
        condition: Option<ClassicalCondition>,
    ) -> IrResult<()>;

    fn measure(
        &mut self,
        source: Operand,
        target: Operand,
        condition: Option<ClassicalCondition>,
    ) -> IrResult<()>;

    fn barrier(&mut self, operands: &[Operand]) -> IrResult<()>;

    /// Operations applied so far.
    fn op_count(&self) -> usize;

    /// Resolve `name` or `name[index]` against the register catalog.
    fn resolve(&self, operand: &str) -> Option<Operand> {
        let reference = OperandRef::parse(operand)?;
        let (position, register) = self
            .registers()
            .iter()
            .enumerate()
            .find(|(_, r)| r.name == reference.register())?;
        match reference {
            OperandRef::Register(_) => {
                let id = u32::try_from(position).ok()?;
                Some(Operand::Register(nuqasm_ir::RegisterId(id)))
            }
            OperandRef::Bit(_, index) if index < register.size => match register.kind {
                RegisterKind::Quantum => Some(Operand::Qubit(QubitId(register.start + index))),
                RegisterKind::Classical => Some(Operand::Clbit(ClbitId(register.start + index))),
            },
            OperandRef::Bit(..) => None,
        }
    }
}

impl CircuitTarget for Circuit {
    fn add_register(&mut self, name: &str, size: u32, kind: RegisterKind) -> IrResult<()> {
        Circuit::add_register(self, name.to_string(), size, kind).map(|_| ())
    }

    fn registers(&self) -> &[Register] {
        Circuit::registers(self)
    }

    fn has_primitive(&self, name: &str) -> bool {
        name == "reset" || StandardGate::is_primitive(name)
    }

    fn apply_primitive(
        &mut self,
        name: &str,
        params: &[f64],
        operands: &[Operand],
        condition: Option<ClassicalCondition>,
    ) -> IrResult<()> {
        if name == "reset" {
            return match (params, operands) {
                ([], [operand]) => self.reset(*operand, condition).map(|_| ()),
                ([], _) => Err(IrError::QubitCountMismatch {
                    gate_name: name.to_string(),
                    expected: 1,
                    got: operands.len(),
                }),
                _ => Err(IrError::ParameterCountMismatch {
                    gate_name: name.to_string(),
                    expected: 0,
                    got: params.len(),
                }),
            };
        }
        self.apply_gate(name, params, operands, condition).map(|_| ())
    }

    fn measure(
        &mut self,
        source: Operand,
        target: Operand,
        condition: Option<ClassicalCondition>,
    ) -> IrResult<()> {
        Circuit::measure_conditional(self, source, target, condition).map(|_| ())
    }

    fn barrier(&mut self, operands: &[Operand]) -> IrResult<()> {
        Circuit::barrier(self, operands).map(|_| ())
    }

    fn op_count(&self) -> usize {
        self.num_ops()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuqasm_ir::RegisterId;

    fn circuit() -> Circuit {
        let mut c = Circuit::new("t");
        CircuitTarget::add_register(&mut c, "q", 2, RegisterKind::Quantum).unwrap();
        CircuitTarget::add_register(&mut c, "c", 2, RegisterKind::Classical).unwrap();
        CircuitTarget::add_register(&mut c, "anc", 3, RegisterKind::Quantum).unwrap();
        c
    }

    #[test]
    fn test_resolve_operands() {
        let c = circuit();
        assert_eq!(c.resolve("q"), Some(Operand::Register(RegisterId(0))));
        assert_eq!(c.resolve("q[1]"), Some(Operand::Qubit(QubitId(1))));
        assert_eq!(c.resolve("anc[2]"), Some(Operand::Qubit(QubitId(4))));
        assert_eq!(c.resolve("c[1]"), Some(Operand::Clbit(ClbitId(1))));
        assert_eq!(c.resolve("q[2]"), None);
        assert_eq!(c.resolve("zz"), None);
        assert_eq!(c.resolve("q[x]"), None);
    }

    #[test]
    fn test_primitive_capability() {
        let c = circuit();
        assert!(c.has_primitive("h"));
        assert!(c.has_primitive("U"));
        assert!(c.has_primitive("reset"));
        assert!(!c.has_primitive("foo"));
        assert!(!c.has_primitive("measure"));
    }

    #[test]
    fn test_apply_counts_ops() {
        let mut c = circuit();
        c.apply_primitive("h", &[], &[Operand::Qubit(QubitId(0))], None).unwrap();
        c.apply_primitive("reset", &[], &[Operand::Register(RegisterId(2))], None)
            .unwrap();
        CircuitTarget::measure(
            &mut c,
            Operand::Qubit(QubitId(0)),
            Operand::Clbit(ClbitId(0)),
            None,
        )
        .unwrap();
        CircuitTarget::barrier(&mut c, &[Operand::Register(RegisterId(0))]).unwrap();
        assert_eq!(c.op_count(), 4);

        assert!(c.apply_primitive("reset", &[1.0], &[Operand::Qubit(QubitId(0))], None).is_err());
        assert!(c.apply_primitive("reset", &[], &[], None).is_err());
        assert_eq!(c.op_count(), 4);
    }
}
