//! nuqasm Circuit Representation
//!
//! This crate provides the circuit object that the nuqasm front end
//! materializes OpenQASM 2 programs into. It plays the role of the external
//! circuit-building collaborator: named quantum and classical registers, a
//! fixed set of primitive gates, dedicated measure/barrier entry points, and
//! an observable count of applied operations.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use nuqasm_ir::{Circuit, Operand, QubitId};
//!
//! let mut circuit = Circuit::new("bell_state");
//! let q = circuit.add_qreg("q", 2).unwrap();
//! let c = circuit.add_creg("c", 2).unwrap();
//!
//! circuit.apply_gate("h", &[], &[Operand::Qubit(QubitId(0))], None).unwrap();
//! circuit
//!     .apply_gate("cx", &[], &[Operand::Qubit(QubitId(0)), Operand::Qubit(QubitId(1))], None)
//!     .unwrap();
//! circuit.measure(Operand::Register(q), Operand::Register(c)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.num_ops(), 3);
//! ```
//!
//! # Primitive Gates
//!
//! | Gate | Qubits | Parameters |
//! |------|--------|------------|
//! | `U`/`u`/`u3`, `u2`, `u1`, `p` | 1 | 3, 2, 1, 1 |
//! | `id`, `x`, `y`, `z`, `h`, `s`, `sdg`, `t`, `tdg`, `sx`, `sxdg` | 1 | 0 |
//! | `rx`, `ry`, `rz` | 1 | 1 |
//! | `CX`/`cx`, `cy`, `cz`, `ch`, `swap` | 2 | 0 |
//! | `crx`, `cry`, `crz`, `cu1`, `cp`, `rxx`, `rzz` | 2 | 1 |
//! | `cu3` | 2 | 3 |
//! | `ccx`, `cswap` | 3 | 0 |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, Comparator, PRIMITIVES, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, Operand, Qubit, QubitId, Register, RegisterId, RegisterKind};
