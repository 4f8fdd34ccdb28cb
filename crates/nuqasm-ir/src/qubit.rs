//! Registers, qubits, classical bits and operand handles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Unique identifier for a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Index of a register in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterId(pub u32);

/// The two register namespaces of OpenQASM 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterKind {
    /// `qreg`.
    Quantum,
    /// `creg`.
    Classical,
}

impl RegisterKind {
    /// Declaration keyword for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            RegisterKind::Quantum => "qreg",
            RegisterKind::Classical => "creg",
        }
    }
}

/// A named register and the contiguous run of bits it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// Register name as declared.
    pub name: String,
    /// Quantum or classical.
    pub kind: RegisterKind,
    /// Number of bits.
    pub size: u32,
    /// Id of the first bit (qubit or clbit, depending on `kind`).
    pub start: u32,
}

impl Register {
    /// Qubit ids of a quantum register, in index order.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        let ids = match self.kind {
            RegisterKind::Quantum => self.start..self.start + self.size,
            RegisterKind::Classical => 0..0,
        };
        ids.map(QubitId)
    }

    /// Clbit ids of a classical register, in index order.
    pub fn clbits(&self) -> impl Iterator<Item = ClbitId> + '_ {
        let ids = match self.kind {
            RegisterKind::Classical => self.start..self.start + self.size,
            RegisterKind::Quantum => 0..0,
        };
        ids.map(ClbitId)
    }
}

/// A quantum bit and its register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    /// The unique identifier.
    pub id: QubitId,
    /// The register this qubit belongs to.
    pub register: String,
    /// The index within the register.
    pub index: u32,
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// A classical bit and its register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clbit {
    /// The unique identifier.
    pub id: ClbitId,
    /// The register this bit belongs to.
    pub register: String,
    /// The index within the register.
    pub index: u32,
}

impl fmt::Display for Clbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// A resolved operand handle.
///
/// Whole-register references stay register-wide so the circuit can
/// broadcast them; indexed references resolve to a single bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// An entire register.
    Register(RegisterId),
    /// A single qubit.
    Qubit(QubitId),
    /// A single classical bit.
    Clbit(ClbitId),
}
