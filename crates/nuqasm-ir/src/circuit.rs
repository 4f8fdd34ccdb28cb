//! High-level circuit builder API.

use std::collections::BTreeMap;

use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{Clbit, ClbitId, Operand, Qubit, QubitId, Register, RegisterId, RegisterKind};

/// A quantum circuit.
///
/// Registers are created by name, operations are appended in program order
/// and every successful append increases [`Circuit::num_ops`] by exactly one.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Registers in declaration order.
    registers: Vec<Register>,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// Classical bits in the circuit.
    clbits: Vec<Clbit>,
    /// Applied operations.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a quantum register.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<RegisterId> {
        self.add_register(name.into(), size, RegisterKind::Quantum)
    }

    /// Add a classical register.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<RegisterId> {
        self.add_register(name.into(), size, RegisterKind::Classical)
    }

    /// Add a register of either kind. Names are unique across both namespaces.
    pub fn add_register(
        &mut self,
        name: String,
        size: u32,
        kind: RegisterKind,
    ) -> IrResult<RegisterId> {
        if self.find_register(&name).is_some() {
            return Err(IrError::DuplicateRegister(name));
        }
        if size == 0 {
            return Err(IrError::EmptyRegister(name));
        }

        let id = RegisterId(u32::try_from(self.registers.len()).unwrap_or(u32::MAX));
        let start = match kind {
            RegisterKind::Quantum => {
                let start = self.qubits.len() as u32;
                for index in 0..size {
                    self.qubits.push(Qubit {
                        id: QubitId(start + index),
                        register: name.clone(),
                        index,
                    });
                }
                start
            }
            RegisterKind::Classical => {
                let start = self.clbits.len() as u32;
                for index in 0..size {
                    self.clbits.push(Clbit {
                        id: ClbitId(start + index),
                        register: name.clone(),
                        index,
                    });
                }
                start
            }
        };
        self.registers.push(Register {
            name,
            kind,
            size,
            start,
        });
        Ok(id)
    }

    /// Look up a register by name.
    pub fn find_register(&self, name: &str) -> Option<RegisterId> {
        self.registers
            .iter()
            .position(|r| r.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(RegisterId)
    }

    /// Get a register by id.
    pub fn register(&self, id: RegisterId) -> Option<&Register> {
        self.registers.get(id.0 as usize)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Apply a primitive gate by name.
    pub fn apply_gate(
        &mut self,
        name: &str,
        params: &[f64],
        operands: &[Operand],
        condition: Option<ClassicalCondition>,
    ) -> IrResult<&mut Self> {
        let gate = StandardGate::from_name(name, params)?;
        if operands.len() != gate.num_qubits() {
            return Err(IrError::QubitCountMismatch {
                gate_name: name.to_string(),
                expected: gate.num_qubits(),
                got: operands.len(),
            });
        }
        self.check_broadcast(name, operands, RegisterKind::Quantum)?;

        let mut seen: Vec<QubitId> = Vec::with_capacity(operands.len());
        for operand in operands {
            if let Operand::Qubit(q) = operand {
                if seen.contains(q) {
                    return Err(IrError::DuplicateQubit {
                        qubit: self.describe(operand),
                        gate_name: name.to_string(),
                    });
                }
                seen.push(*q);
            }
        }

        self.instructions
            .push(Instruction::gate(gate, operands.iter().copied()).with_condition(condition));
        Ok(self)
    }

    /// Reset a qubit or a whole quantum register.
    pub fn reset(
        &mut self,
        operand: Operand,
        condition: Option<ClassicalCondition>,
    ) -> IrResult<&mut Self> {
        self.check_broadcast("reset", &[operand], RegisterKind::Quantum)?;
        self.instructions
            .push(Instruction::reset(operand).with_condition(condition));
        Ok(self)
    }

    /// Measure a qubit into a clbit, or a quantum register into an equally sized classical one.
    pub fn measure(&mut self, source: Operand, target: Operand) -> IrResult<&mut Self> {
        self.measure_conditional(source, target, None)
    }

    /// Measure, carrying a classical condition as metadata.
    pub fn measure_conditional(
        &mut self,
        source: Operand,
        target: Operand,
        condition: Option<ClassicalCondition>,
    ) -> IrResult<&mut Self> {
        let src = self.width(&source, RegisterKind::Quantum, "measure")?;
        let dst = self.width(&target, RegisterKind::Classical, "measure")?;
        if src != dst {
            return Err(IrError::RegisterSizeMismatch {
                operation: "measure".into(),
            });
        }
        self.instructions
            .push(Instruction::measure(source, target).with_condition(condition));
        Ok(self)
    }

    /// Add a barrier. An empty operand list spans every qubit.
    pub fn barrier(&mut self, operands: &[Operand]) -> IrResult<&mut Self> {
        for operand in operands {
            self.width(operand, RegisterKind::Quantum, "barrier")?;
        }
        self.instructions
            .push(Instruction::barrier(operands.iter().copied()));
        Ok(self)
    }

    /// Register-wide operands must agree in size.
    fn check_broadcast(
        &self,
        operation: &str,
        operands: &[Operand],
        kind: RegisterKind,
    ) -> IrResult<()> {
        let mut broadcast: Option<u32> = None;
        for operand in operands {
            if let Some(size) = self.width(operand, kind, operation)? {
                match broadcast {
                    Some(existing) if existing != size => {
                        return Err(IrError::RegisterSizeMismatch {
                            operation: operation.to_string(),
                        });
                    }
                    _ => broadcast = Some(size),
                }
            }
        }
        Ok(())
    }

    /// `Some(size)` for register operands, `None` for single bits.
    fn width(&self, operand: &Operand, kind: RegisterKind, operation: &str) -> IrResult<Option<u32>> {
        let expected = match kind {
            RegisterKind::Quantum => "quantum",
            RegisterKind::Classical => "classical",
        };
        let wrong_kind = || IrError::WrongOperandKind {
            operation: operation.to_string(),
            expected,
        };
        match operand {
            Operand::Register(id) => {
                let reg = self
                    .register(*id)
                    .ok_or_else(|| IrError::OperandNotFound(format!("register #{}", id.0)))?;
                if reg.kind == kind {
                    Ok(Some(reg.size))
                } else {
                    Err(wrong_kind())
                }
            }
            Operand::Qubit(q) => {
                if kind != RegisterKind::Quantum {
                    return Err(wrong_kind());
                }
                if (q.0 as usize) < self.qubits.len() {
                    Ok(None)
                } else {
                    Err(IrError::OperandNotFound(q.to_string()))
                }
            }
            Operand::Clbit(c) => {
                if kind != RegisterKind::Classical {
                    return Err(wrong_kind());
                }
                if (c.0 as usize) < self.clbits.len() {
                    Ok(None)
                } else {
                    Err(IrError::OperandNotFound(c.to_string()))
                }
            }
        }
    }

    /// Source-level spelling of an operand (`q`, `q[1]`).
    pub fn describe(&self, operand: &Operand) -> String {
        match operand {
            Operand::Register(id) => self
                .register(*id)
                .map_or_else(|| format!("register #{}", id.0), |r| r.name.clone()),
            Operand::Qubit(q) => self
                .qubits
                .get(q.0 as usize)
                .map_or_else(|| q.to_string(), ToString::to_string),
            Operand::Clbit(c) => self
                .clbits
                .get(c.0 as usize)
                .map_or_else(|| c.to_string(), ToString::to_string),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers in declaration order.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Get the qubits.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Applied operations in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of applied operations.
    pub fn num_ops(&self) -> usize {
        self.instructions.len()
    }

    /// Number of applied gates.
    pub fn num_gates(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_gate()).count()
    }

    /// Number of measurements.
    pub fn num_measurements(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_measure()).count()
    }

    /// Operation counts keyed by name.
    pub fn count_ops(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for inst in &self.instructions {
            *counts.entry(inst.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Gate instructions only.
    pub fn gates(&self) -> impl Iterator<Item = (&StandardGate, &Instruction)> {
        self.instructions.iter().filter_map(|inst| match &inst.kind {
            InstructionKind::Gate(g) => Some((g, inst)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Comparator;
    use std::f64::consts::PI;

    fn bell() -> Circuit {
        let mut circuit = Circuit::new("bell");
        circuit.add_qreg("q", 2).unwrap();
        circuit.add_creg("c", 2).unwrap();
        circuit
    }

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::new("test");
        let qr = circuit.add_qreg("qr", 3).unwrap();
        let cr = circuit.add_creg("cr", 2).unwrap();
        let q2 = circuit.add_qreg("anc", 1).unwrap();

        assert_eq!(qr, RegisterId(0));
        assert_eq!(cr, RegisterId(1));
        assert_eq!(q2, RegisterId(2));
        assert_eq!(circuit.num_qubits(), 4);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.qubits()[3].register, "anc");
        assert_eq!(circuit.register(q2).unwrap().start, 3);
    }

    #[test]
    fn test_duplicate_register_across_namespaces() {
        let mut circuit = Circuit::new("test");
        circuit.add_qreg("r", 1).unwrap();
        assert!(matches!(
            circuit.add_creg("r", 1),
            Err(IrError::DuplicateRegister(_))
        ));
        assert!(matches!(
            circuit.add_qreg("z", 0),
            Err(IrError::EmptyRegister(_))
        ));
    }

    #[test]
    fn test_bell_state() {
        let mut circuit = bell();
        circuit
            .apply_gate("h", &[], &[Operand::Qubit(QubitId(0))], None)
            .unwrap()
            .apply_gate(
                "cx",
                &[],
                &[Operand::Qubit(QubitId(0)), Operand::Qubit(QubitId(1))],
                None,
            )
            .unwrap();
        circuit
            .measure(Operand::Register(RegisterId(0)), Operand::Register(RegisterId(1)))
            .unwrap();

        assert_eq!(circuit.num_ops(), 3);
        assert_eq!(circuit.num_gates(), 2);
        assert_eq!(circuit.num_measurements(), 1);
        assert_eq!(circuit.count_ops()["cx"], 1);
    }

    #[test]
    fn test_parameterized_gate() {
        let mut circuit = bell();
        circuit
            .apply_gate("rz", &[PI / 2.0], &[Operand::Qubit(QubitId(1))], None)
            .unwrap();
        let (gate, _) = circuit.gates().next().unwrap();
        assert_eq!(*gate, StandardGate::Rz(PI / 2.0));
    }

    #[test]
    fn test_gate_operand_errors() {
        let mut circuit = bell();
        let q0 = Operand::Qubit(QubitId(0));
        assert!(matches!(
            circuit.apply_gate("cx", &[], &[q0], None),
            Err(IrError::QubitCountMismatch { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            circuit.apply_gate("cx", &[], &[q0, q0], None),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            circuit.apply_gate("h", &[], &[Operand::Clbit(ClbitId(0))], None),
            Err(IrError::WrongOperandKind { .. })
        ));
        assert!(matches!(
            circuit.apply_gate("h", &[], &[Operand::Qubit(QubitId(9))], None),
            Err(IrError::OperandNotFound(_))
        ));
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_broadcast_size_mismatch() {
        let mut circuit = bell();
        circuit.add_qreg("r", 3).unwrap();
        let err = circuit
            .apply_gate(
                "cx",
                &[],
                &[Operand::Register(RegisterId(0)), Operand::Register(RegisterId(2))],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, IrError::RegisterSizeMismatch { .. }));
    }

    #[test]
    fn test_measure_checks_namespaces() {
        let mut circuit = bell();
        assert!(circuit
            .measure(Operand::Clbit(ClbitId(0)), Operand::Clbit(ClbitId(1)))
            .is_err());
        circuit
            .measure(Operand::Qubit(QubitId(1)), Operand::Clbit(ClbitId(0)))
            .unwrap();
        assert_eq!(circuit.num_measurements(), 1);

        circuit
            .measure_conditional(
                Operand::Qubit(QubitId(0)),
                Operand::Clbit(ClbitId(1)),
                Some(ClassicalCondition::new("c", Comparator::Ne, "0")),
            )
            .unwrap();
        assert_eq!(circuit.num_measurements(), 2);
        assert!(circuit.instructions()[1].condition.is_some());
    }

    #[test]
    fn test_conditioned_reset_and_barrier() {
        let mut circuit = bell();
        circuit
            .reset(
                Operand::Qubit(QubitId(0)),
                Some(ClassicalCondition::new("c", Comparator::Eq, "1")),
            )
            .unwrap();
        circuit.barrier(&[]).unwrap();
        assert_eq!(circuit.count_ops()["reset"], 1);
        assert!(circuit.instructions()[0].condition.is_some());
        assert!(circuit.instructions()[1].is_barrier());
    }

    #[test]
    fn test_describe_operands() {
        let circuit = bell();
        assert_eq!(circuit.describe(&Operand::Qubit(QubitId(1))), "q[1]");
        assert_eq!(circuit.describe(&Operand::Register(RegisterId(1))), "c");
    }
}
