//! The primitive gate set and classical conditions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};

/// Names accepted by [`StandardGate::from_name`], with their parameter count.
///
/// Aliases (`U`/`u`/`u3`, `CX`/`cx`) map to the same gate.
pub const PRIMITIVES: &[(&str, usize)] = &[
    ("U", 3),
    ("u", 3),
    ("u3", 3),
    ("u2", 2),
    ("u1", 1),
    ("p", 1),
    ("id", 0),
    ("x", 0),
    ("y", 0),
    ("z", 0),
    ("h", 0),
    ("s", 0),
    ("sdg", 0),
    ("t", 0),
    ("tdg", 0),
    ("sx", 0),
    ("sxdg", 0),
    ("rx", 1),
    ("ry", 1),
    ("rz", 1),
    ("CX", 0),
    ("cx", 0),
    ("cy", 0),
    ("cz", 0),
    ("ch", 0),
    ("swap", 0),
    ("crx", 1),
    ("cry", 1),
    ("crz", 1),
    ("cu1", 1),
    ("cp", 1),
    ("cu3", 3),
    ("rxx", 1),
    ("rzz", 1),
    ("ccx", 0),
    ("cswap", 0),
];

/// Standard gates with known semantics. Angles are concrete radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),
    /// U2(φ, λ) = U(π/2, φ, λ).
    U2(f64, f64),
    /// U1(λ), a phase rotation.
    U1(f64),
    /// Phase gate.
    P(f64),
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
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
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
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
    /// Controlled rotation around X.
    CRx(f64),
    /// Controlled rotation around Y.
    CRy(f64),
    /// Controlled rotation around Z.
    CRz(f64),
    /// Controlled U1.
    CU1(f64),
    /// Controlled phase gate.
    CP(f64),
    /// Controlled U(θ, φ, λ).
    CU3(f64, f64, f64),
    /// XX rotation gate.
    RXX(f64),
    /// ZZ rotation gate.
    RZZ(f64),
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Whether `name` is part of the primitive set (any arity).
    pub fn is_primitive(name: &str) -> bool {
        PRIMITIVES.iter().any(|(n, _)| *n == name)
    }

    /// Build a gate from its OpenQASM name and evaluated parameters.
    pub fn from_name(name: &str, params: &[f64]) -> IrResult<Self> {
        let expected = PRIMITIVES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, arity)| *arity)
            .ok_or_else(|| IrError::UnknownPrimitive(name.to_string()))?;
        if params.len() != expected {
            return Err(IrError::ParameterCountMismatch {
                gate_name: name.to_string(),
                expected,
                got: params.len(),
            });
        }

        let p = |i: usize| params[i];
        Ok(match name {
            "U" | "u" | "u3" => StandardGate::U(p(0), p(1), p(2)),
            "u2" => StandardGate::U2(p(0), p(1)),
            "u1" => StandardGate::U1(p(0)),
            "p" => StandardGate::P(p(0)),
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
            "rx" => StandardGate::Rx(p(0)),
            "ry" => StandardGate::Ry(p(0)),
            "rz" => StandardGate::Rz(p(0)),
            "CX" | "cx" => StandardGate::CX,
            "cy" => StandardGate::CY,
            "cz" => StandardGate::CZ,
            "ch" => StandardGate::CH,
            "swap" => StandardGate::Swap,
            "crx" => StandardGate::CRx(p(0)),
            "cry" => StandardGate::CRy(p(0)),
            "crz" => StandardGate::CRz(p(0)),
            "cu1" => StandardGate::CU1(p(0)),
            "cp" => StandardGate::CP(p(0)),
            "cu3" => StandardGate::CU3(p(0), p(1), p(2)),
            "rxx" => StandardGate::RXX(p(0)),
            "rzz" => StandardGate::RZZ(p(0)),
            "ccx" => StandardGate::CCX,
            "cswap" => StandardGate::CSwap,
            other => return Err(IrError::UnknownPrimitive(other.to_string())),
        })
    }

    /// Canonical (lowercase qelib1) name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::U(..) => "u3",
            StandardGate::U2(..) => "u2",
            StandardGate::U1(_) => "u1",
            StandardGate::P(_) => "p",
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
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CU1(_) => "cu1",
            StandardGate::CP(_) => "cp",
            StandardGate::CU3(..) => "cu3",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            StandardGate::U(..)
            | StandardGate::U2(..)
            | StandardGate::U1(_)
            | StandardGate::P(_)
            | StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CU1(_)
            | StandardGate::CP(_)
            | StandardGate::CU3(..)
            | StandardGate::RXX(_)
            | StandardGate::RZZ(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Parameters of this gate, in declaration order.
    pub fn parameters(&self) -> Vec<f64> {
        match self {
            StandardGate::U(a, b, c) | StandardGate::CU3(a, b, c) => vec![*a, *b, *c],
            StandardGate::U2(a, b) => vec![*a, *b],
            StandardGate::U1(p)
            | StandardGate::P(p)
            | StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::CRx(p)
            | StandardGate::CRy(p)
            | StandardGate::CRz(p)
            | StandardGate::CU1(p)
            | StandardGate::CP(p)
            | StandardGate::RXX(p)
            | StandardGate::RZZ(p) => vec![*p],
            _ => vec![],
        }
    }
}

/// Comparison operator of a classical condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    /// `==`
    #[serde(rename = "==")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    Ne,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `<=`
    #[serde(rename = "<=")]
    Le,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `>=`
    #[serde(rename = ">=")]
    Ge,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// Classical condition gating an operation.
///
/// Carried as metadata; the circuit never evaluates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// The name of the classical register.
    pub register: String,
    /// The comparison applied to the register value.
    pub comparator: Comparator,
    /// Right-hand side, as written in the source.
    pub value: String,
}

impl ClassicalCondition {
    /// Create a new classical condition.
    pub fn new(register: impl Into<String>, comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            comparator,
            value: value.into(),
        }
    }
}

impl fmt::Display for ClassicalCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.register, self.comparator, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::U(1.0, 2.0, 3.0).parameters(), vec![1.0, 2.0, 3.0]);
        assert!(StandardGate::H.parameters().is_empty());
    }

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(StandardGate::from_name("CX", &[]).unwrap(), StandardGate::CX);
        assert_eq!(StandardGate::from_name("cx", &[]).unwrap().name(), "cx");
        assert_eq!(
            StandardGate::from_name("U", &[PI, 0.0, PI]).unwrap(),
            StandardGate::U(PI, 0.0, PI)
        );
        assert_eq!(StandardGate::from_name("u", &[PI, 0.0, PI]).unwrap().name(), "u3");
    }

    #[test]
    fn test_from_name_rejects_wrong_arity() {
        let err = StandardGate::from_name("rz", &[]).unwrap_err();
        assert!(matches!(
            err,
            IrError::ParameterCountMismatch { expected: 1, got: 0, .. }
        ));
    }

    #[test]
    fn test_unknown_primitive() {
        assert!(!StandardGate::is_primitive("majority"));
        assert!(StandardGate::is_primitive("cu3"));
        assert!(matches!(
            StandardGate::from_name("majority", &[]),
            Err(IrError::UnknownPrimitive(_))
        ));
    }

    #[test]
    fn test_condition_display() {
        let cond = ClassicalCondition::new("c", Comparator::Eq, "3");
        assert_eq!(cond.to_string(), "c==3");
    }
}
