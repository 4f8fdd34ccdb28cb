//! Error types for translation and materialization.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expression::ExprError;

/// Where a diagnostic points: file name, 1-based line and the offending text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub text: String,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            text: text.into(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: `{}`", self.file, self.line, self.text)
    }
}

fn origin(at: Option<&SourceLocation>) -> String {
    at.map_or_else(|| "command line".to_string(), ToString::to_string)
}

/// Errors raised by the translator and the materializer.
///
/// Every error is fatal to the pass that raised it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NuqasmError {
    /// The first non-comment statement is not `OPENQASM 2.0;`.
    #[error("OPENQASM 2.0 declaration absent before {at}")]
    DeclarationAbsent { at: SourceLocation },

    /// Unclassifiable statement in strict mode.
    #[error("Unknown element at {at}")]
    UnknownElement { at: SourceLocation },

    /// A gate definition was still open at the end of its file.
    #[error("Incomplete gate definition '{name}' starting at {start}")]
    IncompleteGate { name: String, start: SourceLocation },

    /// A gate header was followed by a statement that does not open its body.
    #[error("Gate definition starting at {start} missing opening brace at {at}")]
    GateMissingOpenBrace {
        start: SourceLocation,
        at: SourceLocation,
    },

    /// A gate definition whose header or body could not be decomposed.
    #[error("Malformed gate definition '{name}' starting at {start}: {reason}")]
    MalformedGate {
        name: String,
        reason: String,
        start: SourceLocation,
    },

    /// No directory on the include path holds the file.
    #[error("Cannot find file '{path}' included from {}", origin(.at.as_ref()))]
    CannotFindFile {
        path: String,
        at: Option<SourceLocation>,
    },

    /// The file exists but could not be read.
    #[error("Cannot read file '{path}' included from {}: {reason}", origin(.at.as_ref()))]
    CannotReadFile {
        path: String,
        reason: String,
        at: Option<SourceLocation>,
    },

    /// A file includes itself, directly or transitively.
    #[error("Include cycle: '{path}' is already open at {at}")]
    IncludeCycle { path: String, at: SourceLocation },

    /// Neither a primitive nor a gate definition matches the operation.
    #[error("Operation '{op}' with {arity} parameter(s) not found at {at}")]
    OpNotFound {
        op: String,
        arity: usize,
        at: SourceLocation,
    },

    /// A gate call whose argument lists do not match the definition.
    #[error(
        "Malformed call of gate '{gate}' at {at}: expected {expected_params} parameter(s) and \
         {expected_registers} register(s), got {got_params} and {got_registers}"
    )]
    MalformedMacroCall {
        gate: String,
        expected_params: usize,
        got_params: usize,
        expected_registers: usize,
        got_registers: usize,
        at: SourceLocation,
    },

    /// An operand names no declared register, or indexes past its end.
    #[error("Unresolved operand '{operand}' at {at}")]
    UnresolvedOperand { operand: String, at: SourceLocation },

    /// A gate body uses a register symbol its header does not declare.
    #[error("Gate '{gate}' uses undeclared register symbol '{symbol}' (called at {at})")]
    UnboundGateRegister {
        gate: String,
        symbol: String,
        at: SourceLocation,
    },

    /// Gate definitions that expand into themselves.
    #[error("Recursive gate expansion {chain} at {at}")]
    RecursiveGate { chain: String, at: SourceLocation },

    /// A parameter expression that cannot be parsed or evaluated.
    #[error("Bad parameter expression '{expr}' at {at}: {source}")]
    Expression {
        expr: String,
        at: SourceLocation,
        #[source]
        source: ExprError,
    },

    /// Two register declarations share a name.
    #[error("Duplicate register '{name}' at {at}")]
    DuplicateRegister { name: String, at: SourceLocation },

    /// The circuit rejected an operation.
    #[error("Circuit error{}: {source}", .at.as_ref().map(|a| format!(" at {a}")).unwrap_or_default())]
    Circuit {
        at: Option<SourceLocation>,
        #[source]
        source: nuqasm_ir::IrError,
    },

    /// JSON (de)serialization of a translation unit failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Options could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<nuqasm_ir::IrError> for NuqasmError {
    fn from(source: nuqasm_ir::IrError) -> Self {
        NuqasmError::Circuit { at: None, source }
    }
}

impl NuqasmError {
    /// Stable numeric code, also used as the CLI exit status.
    pub fn errcode(&self) -> i32 {
        match self {
            NuqasmError::DeclarationAbsent { .. } => 20,
            NuqasmError::UnknownElement { .. } => 21,
            NuqasmError::IncompleteGate { .. } => 22,
            NuqasmError::GateMissingOpenBrace { .. } => 23,
            NuqasmError::MalformedGate { .. } => 24,
            NuqasmError::CannotFindFile { .. } => 30,
            NuqasmError::CannotReadFile { .. } => 31,
            NuqasmError::IncludeCycle { .. } => 32,
            NuqasmError::OpNotFound { .. } => 10,
            NuqasmError::MalformedMacroCall { .. } => 11,
            NuqasmError::UnresolvedOperand { .. } => 12,
            NuqasmError::UnboundGateRegister { .. } => 13,
            NuqasmError::RecursiveGate { .. } => 14,
            NuqasmError::Expression { .. } => 15,
            NuqasmError::DuplicateRegister { .. } => 16,
            NuqasmError::Circuit { .. } => 17,
            NuqasmError::Serialization(_) => 40,
            NuqasmError::Config(_) => 41,
        }
    }

    /// The location the error points at, if any.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            NuqasmError::DeclarationAbsent { at }
            | NuqasmError::UnknownElement { at }
            | NuqasmError::GateMissingOpenBrace { at, .. }
            | NuqasmError::IncludeCycle { at, .. }
            | NuqasmError::OpNotFound { at, .. }
            | NuqasmError::MalformedMacroCall { at, .. }
            | NuqasmError::UnresolvedOperand { at, .. }
            | NuqasmError::UnboundGateRegister { at, .. }
            | NuqasmError::RecursiveGate { at, .. }
            | NuqasmError::Expression { at, .. }
            | NuqasmError::DuplicateRegister { at, .. } => Some(at),
            NuqasmError::IncompleteGate { start, .. } | NuqasmError::MalformedGate { start, .. } => {
                Some(start)
            }
            NuqasmError::CannotFindFile { at, .. }
            | NuqasmError::CannotReadFile { at, .. }
            | NuqasmError::Circuit { at, .. } => at.as_ref(),
            NuqasmError::Serialization(_) | NuqasmError::Config(_) => None,
        }
    }

    /// Serializable summary of the error.
    pub fn packet(&self) -> ErrorPacket {
        let at = self.location();
        ErrorPacket {
            message: self.to_string(),
            filename: at.map(|a| a.file.clone()),
            linenum: at.map(|a| a.line),
            line: at.map(|a| a.text.clone()),
            errcode: self.errcode(),
        }
    }
}

/// Flat error report printed by the command-line tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPacket {
    pub message: String,
    pub filename: Option<String>,
    pub linenum: Option<usize>,
    pub line: Option<String>,
    pub errcode: i32,
}

/// Result type for translation and materialization.
pub type NuqasmResult<T> = Result<T, NuqasmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_carries_location() {
        let err = NuqasmError::OpNotFound {
            op: "foo".into(),
            arity: 0,
            at: SourceLocation::new("main.qasm", 4, "foo q[0];"),
        };
        let packet = err.packet();
        assert_eq!(packet.errcode, 10);
        assert_eq!(packet.filename.as_deref(), Some("main.qasm"));
        assert_eq!(packet.linenum, Some(4));
        assert_eq!(packet.line.as_deref(), Some("foo q[0];"));
        assert!(packet.message.contains("'foo'"));
    }

    #[test]
    fn test_missing_root_file_has_no_location() {
        let err = NuqasmError::CannotFindFile {
            path: "nope.qasm".into(),
            at: None,
        };
        assert!(err.to_string().contains("command line"));
        assert!(err.packet().filename.is_none());
    }

    #[test]
    fn test_circuit_error_from_ir() {
        let err: NuqasmError = nuqasm_ir::IrError::EmptyRegister("q".into()).into();
        assert_eq!(err.errcode(), 17);
        assert!(err.location().is_none());
    }
}
