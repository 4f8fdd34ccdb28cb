//! The translation unit: the output of one translation pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::ElementKind;
use crate::element::{Element, ElementBody, RegisterDecl};
use crate::error::NuqasmResult;
use crate::gatedef::GateDefinition;

/// Unit-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    /// Source file paths; the index is the `file` of every element.
    pub files: Vec<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Deepest include nesting reached, the main file counting as 1.
    #[serde(default)]
    pub include_depth: usize,
}

/// Metadata, code section, gate table and optional source section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub metadata: Metadata,
    /// Elements in program order.
    pub code: Vec<Element>,
    /// Gate definitions in definition order.
    #[serde(default)]
    pub gates: Vec<GateDefinition>,
    /// Raw lines per file, parallel to `metadata.files`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Vec<Vec<String>>>,
}

impl TranslationUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: Metadata {
                name: name.into(),
                files: Vec::new(),
                started_at: Utc::now(),
                finished_at: None,
                include_depth: 0,
            },
            code: Vec::new(),
            gates: Vec::new(),
            source: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Whether the pass that produced this unit completed.
    pub fn is_finished(&self) -> bool {
        self.metadata.finished_at.is_some()
    }

    /// Path of the file with the given index.
    pub fn file_name(&self, index: usize) -> &str {
        self.metadata
            .files
            .get(index)
            .map_or("<unknown>", String::as_str)
    }

    /// The definition used for `name` with `arity` parameters. A later
    /// definition shadows an earlier one.
    pub fn gate(&self, name: &str, arity: usize) -> Option<&GateDefinition> {
        self.gates
            .iter()
            .rev()
            .find(|g| g.name == name && g.arity() == arity)
    }

    /// Register declarations in program order.
    pub fn register_declarations(&self) -> impl Iterator<Item = (&Element, &RegisterDecl)> {
        self.code.iter().filter_map(|e| match &e.body {
            ElementBody::Qreg(decl) | ElementBody::Creg(decl) => Some((e, decl)),
            _ => None,
        })
    }

    /// Elements of one kind.
    pub fn elements_of(&self, kind: ElementKind) -> impl Iterator<Item = &Element> {
        self.code.iter().filter(move |e| e.kind() == kind)
    }

    pub fn to_json(&self) -> NuqasmResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> NuqasmResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> NuqasmResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::OpCall;

    fn gate(name: &str, params: &[&str], line: usize) -> GateDefinition {
        GateDefinition {
            name: name.into(),
            params: params.iter().map(ToString::to_string).collect(),
            registers: vec!["q".into()],
            body: Vec::new(),
            file: 0,
            line,
            source: None,
        }
    }

    #[test]
    fn test_gate_lookup_by_name_and_arity() {
        let mut unit = TranslationUnit::new("t");
        unit.gates.push(gate("g", &[], 1));
        unit.gates.push(gate("g", &["a"], 2));
        unit.gates.push(gate("g", &[], 3));

        assert_eq!(unit.gate("g", 0).map(|g| g.line), Some(3));
        assert_eq!(unit.gate("g", 1).map(|g| g.line), Some(2));
        assert!(unit.gate("g", 2).is_none());
        assert!(unit.gate("h", 0).is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let mut unit = TranslationUnit::new("main");
        unit.metadata.files.push("main.qasm".into());
        unit.metadata.finished_at = Some(Utc::now());
        unit.code.push(Element {
            file: 0,
            line: 2,
            source: Some("qreg q[1];".into()),
            comment: None,
            body: ElementBody::Qreg(RegisterDecl {
                name: "q".into(),
                size: 1,
            }),
        });
        unit.code.push(Element {
            file: 0,
            line: 3,
            source: None,
            comment: Some("flip".into()),
            body: ElementBody::Op(OpCall {
                op: "x".into(),
                params: Vec::new(),
                operands: vec!["q[0]".into()],
            }),
        });
        unit.source = Some(vec![vec!["OPENQASM 2.0;".into()]]);

        let back = TranslationUnit::from_json(&unit.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, unit);
        assert_eq!(back.register_declarations().count(), 1);
        assert_eq!(back.elements_of(ElementKind::Operation).count(), 1);
        assert_eq!(back.file_name(0), "main.qasm");
        assert_eq!(back.file_name(7), "<unknown>");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(TranslationUnit::from_json("{\"metadata\": 1}").is_err());
    }
}
