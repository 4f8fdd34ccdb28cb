//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur while building a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A register with this name already exists in either namespace.
    #[error("Register '{0}' is already declared")]
    DuplicateRegister(String),

    /// Registers must hold at least one bit.
    #[error("Register '{0}' must have a positive size")]
    EmptyRegister(String),

    /// The operand handle does not belong to this circuit.
    #[error("Operand {0} not found in circuit")]
    OperandNotFound(String),

    /// The name is not part of the primitive gate set.
    #[error("Unknown primitive '{0}'")]
    UnknownPrimitive(String),

    /// A gate received the wrong number of parameters.
    #[error("Gate '{gate_name}' expects {expected} parameters, got {got}")]
    ParameterCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of parameters.
        expected: usize,
        /// Actual number of parameters provided.
        got: usize,
    },

    /// Gate requires different number of qubit operands.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of operands.
        expected: usize,
        /// Actual number of operands provided.
        got: usize,
    },

    /// Operand of the wrong namespace (classical where quantum is required or vice versa).
    #[error("Operation '{operation}' expects a {expected} operand")]
    WrongOperandKind {
        /// Operation being applied.
        operation: String,
        /// "quantum" or "classical".
        expected: &'static str,
    },

    /// Register-wide operands of one operation must have equal sizes.
    #[error("Operation '{operation}' broadcasts over registers of different sizes")]
    RegisterSizeMismatch {
        /// Operation being applied.
        operation: String,
    },

    /// The same qubit appears twice in one gate application.
    #[error("Duplicate qubit {qubit} in gate '{gate_name}'")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: String,
        /// Name of the gate.
        gate_name: String,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
