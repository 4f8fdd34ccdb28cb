//! OpenQASM 2 front end
//!
//! This crate reads OpenQASM 2 source, follows `include` directives, and
//! produces a [`TranslationUnit`]: an ordered list of typed elements plus a
//! table of gate definitions. A [`Materializer`] then applies the unit to a
//! circuit, expanding gate calls down to primitives.
//!
//! # Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Split and normalize physical lines | [`line`] | statements |
//! | Classify each statement | [`classify`] | [`ElementKind`] |
//! | Build element bodies | [`element`] | [`Element`] |
//! | Collect multi-line gate definitions | [`gatedef`] | [`GateDefinition`] |
//! | Drive files and includes | [`translator`] | [`TranslationUnit`] |
//! | Bind and expand gate calls | [`binder`] | [`BoundOp`] |
//! | Apply to a circuit | [`materialize`] | [`Circuit`] |
//!
//! # Example
//!
//! ```rust
//! use nuqasm::{Translator, TranslatorOptions, materialize};
//! use nuqasm_ir::Circuit;
//!
//! let source = r#"
//! OPENQASM 2.0;
//! gate bell a,b { h a; cx a,b; }
//! qreg q[2];
//! creg c[2];
//! bell q[0],q[1];
//! measure q -> c;
//! "#;
//!
//! let unit = Translator::new(TranslatorOptions::default())
//!     .translate_str(source)
//!     .unwrap();
//! assert_eq!(unit.gates.len(), 1);
//!
//! let mut circuit = Circuit::new(unit.name());
//! let summary = materialize(&unit, &mut circuit).unwrap();
//! assert_eq!(summary.ops, 3);
//! assert_eq!(circuit.num_qubits(), 2);
//! ```

use std::path::Path;

use nuqasm_ir::Circuit;

pub mod binder;
pub mod classify;
pub mod config;
pub mod element;
pub mod emitter;
pub mod error;
pub mod expression;
pub mod frame;
pub mod gatedef;
pub mod lexer;
pub mod line;
pub mod materialize;
pub mod source;
mod statement;
pub mod target;
pub mod translator;
pub mod unit;

pub use binder::{Binder, BoundOp};
pub use classify::{ElementKind, classify};
pub use config::{INCLUDE_PATH_ENV, TranslatorOptions};
pub use element::{Element, ElementBody, OpCall, RegisterDecl};
pub use emitter::emit_qasm2;
pub use error::{ErrorPacket, NuqasmError, NuqasmResult, SourceLocation};
pub use expression::{Expr, ExprError};
pub use gatedef::{GateDefinition, GateParser};
pub use materialize::{MaterializeSummary, Materializer, materialize};
pub use source::{FsLoader, MemoryLoader, SourceLoader};
pub use target::CircuitTarget;
pub use translator::Translator;
pub use unit::{Metadata, TranslationUnit};

/// Translate `source` and materialize it into a fresh circuit.
///
/// Unknown statements are rejected regardless of `options.strict_unknown`.
pub fn load_str(source: &str, options: &TranslatorOptions) -> NuqasmResult<Circuit> {
    let options = options.clone().with_strict_unknown(true);
    let unit = Translator::new(options).translate_str(source)?;
    circuit_from_unit(&unit)
}

/// Translate the file at `path` and materialize it into a fresh circuit.
pub fn load_file(path: impl AsRef<Path>, options: &TranslatorOptions) -> NuqasmResult<Circuit> {
    let options = options.clone().with_strict_unknown(true);
    let unit = Translator::new(options).translate_file(path)?;
    circuit_from_unit(&unit)
}

/// Materialize a unit into a fresh circuit named after it.
pub fn circuit_from_unit(unit: &TranslationUnit) -> NuqasmResult<Circuit> {
    let mut circuit = Circuit::new(unit.name());
    materialize(unit, &mut circuit)?;
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_str() {
        let circuit = load_str(
            "OPENQASM 2.0;\nqreg q[1];\ncreg c[1];\nh q[0];\nmeasure q[0] -> c[0];\n",
            &TranslatorOptions::default().with_name("tiny"),
        )
        .unwrap();
        assert_eq!(circuit.name(), "tiny");
        assert_eq!(circuit.num_ops(), 2);
    }

    #[test]
    fn test_load_str_rejects_unknown() {
        let err = load_str("OPENQASM 2.0;\nqreg q[1];\n???\n", &TranslatorOptions::default())
            .unwrap_err();
        assert!(matches!(err, NuqasmError::UnknownElement { .. }));
    }

    #[test]
    fn test_load_file_missing() {
        let err = load_file("/nonexistent/prog.qasm", &TranslatorOptions::default()).unwrap_err();
        assert!(matches!(err, NuqasmError::CannotFindFile { at: None, .. }));
    }
}
