//! Circuit instructions combining operations with operands.

use serde::{Deserialize, Serialize};

use crate::gate::{ClassicalCondition, StandardGate};
use crate::qubit::Operand;

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A primitive gate.
    Gate(StandardGate),
    /// Measurement: operands are `[source, target]`.
    Measure,
    /// Reset qubit(s) to |0⟩.
    Reset,
    /// Barrier (synchronization point).
    Barrier,
}

impl InstructionKind {
    /// OpenQASM spelling of the instruction.
    pub fn name(&self) -> &'static str {
        match self {
            InstructionKind::Gate(gate) => gate.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
        }
    }
}

/// One applied operation.
///
/// Register-wide operands are kept as written; an instruction over a
/// register of size n stands for n broadcast applications but counts once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Operands in source order.
    pub operands: Vec<Operand>,
    /// Optional classical condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: StandardGate, operands: impl IntoIterator<Item = Operand>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
            operands: operands.into_iter().collect(),
            condition: None,
        }
    }

    /// Create a measurement instruction.
    pub fn measure(source: Operand, target: Operand) -> Self {
        Self {
            kind: InstructionKind::Measure,
            operands: vec![source, target],
            condition: None,
        }
    }

    /// Create a reset instruction.
    pub fn reset(operand: Operand) -> Self {
        Self {
            kind: InstructionKind::Reset,
            operands: vec![operand],
            condition: None,
        }
    }

    /// Create a barrier instruction.
    pub fn barrier(operands: impl IntoIterator<Item = Operand>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            operands: operands.into_iter().collect(),
            condition: None,
        }
    }

    /// Attach a classical condition.
    #[must_use]
    pub fn with_condition(mut self, condition: Option<ClassicalCondition>) -> Self {
        self.condition = condition;
        self
    }

    /// Name of the instruction.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }
}
