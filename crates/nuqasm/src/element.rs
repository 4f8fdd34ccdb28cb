//! Typed elements of the code section and their builders.

use std::fmt;

use nuqasm_ir::{ClassicalCondition, Comparator};
use serde::{Deserialize, Serialize};

use crate::classify::ElementKind;
use crate::lexer::Token;
use crate::statement::StatementParser;

/// One classified statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Index into the unit's file list.
    pub file: usize,
    /// 1-based line within that file.
    pub line: usize,
    /// Normalized statement text, when element source retention is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Trailing `//` comment of the physical line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub body: ElementBody,
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        self.body.kind()
    }

    /// Retained source text, or a canonical rendering of the body.
    pub fn text(&self) -> String {
        self.source.clone().unwrap_or_else(|| self.body.to_string())
    }
}

/// A register declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDecl {
    pub name: String,
    pub size: u32,
}

/// An operation call: `op(params) operands;`.
///
/// Parameters stay as raw expression text until materialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OpCall {
    pub op: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(default)]
    pub operands: Vec<String>,
}

impl OpCall {
    /// Parse `name[(p1,p2)] a,b[;]`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parser = StatementParser::new(text)?;
        let call = parser.call()?;
        parser.consume(&Token::Semicolon);
        parser.is_eof().then_some(call)
    }

    /// Parameter count, the arity used for gate lookup.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for OpCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op)?;
        if !self.params.is_empty() {
            write!(f, "({})", self.params.join(","))?;
        }
        write!(f, " {};", self.operands.join(","))
    }
}

/// Element payload, tagged by `type` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementBody {
    Comment { text: String },
    Version { version: String },
    Include { path: String },
    Qreg(RegisterDecl),
    Creg(RegisterDecl),
    Measure { source: String, target: String },
    Barrier { operands: Vec<String> },
    GateDecl { name: String },
    Op(OpCall),
    CondOp {
        condition: ClassicalCondition,
        op: OpCall,
    },
    CondMeasure {
        condition: ClassicalCondition,
        source: String,
        target: String,
    },
    Unknown { text: String },
}

impl ElementBody {
    /// Build the payload for a classified statement.
    ///
    /// A statement whose fields cannot be extracted becomes `Unknown`.
    pub fn build(kind: ElementKind, text: &str) -> Self {
        let built = match kind {
            ElementKind::Blank => None,
            ElementKind::Comment => Some(ElementBody::Comment {
                text: text.trim_start_matches('/').trim().to_string(),
            }),
            ElementKind::VersionDeclaration => Some(ElementBody::Version {
                version: "2.0".into(),
            }),
            ElementKind::Include => build_include(text),
            ElementKind::QuantumRegisterDecl => build_register(text).map(ElementBody::Qreg),
            ElementKind::ClassicalRegisterDecl => build_register(text).map(ElementBody::Creg),
            ElementKind::Measure => build_measure(text),
            ElementKind::Barrier => build_barrier(text),
            ElementKind::GateDeclPlaceholder => {
                gate_name(text).map(|name| ElementBody::GateDecl { name })
            }
            ElementKind::Operation => OpCall::parse(text).map(ElementBody::Op),
            ElementKind::ConditionalOperation => build_conditional(text),
            ElementKind::Unknown => None,
        };
        built.unwrap_or_else(|| ElementBody::Unknown {
            text: text.to_string(),
        })
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ElementBody::Comment { .. } => ElementKind::Comment,
            ElementBody::Version { .. } => ElementKind::VersionDeclaration,
            ElementBody::Include { .. } => ElementKind::Include,
            ElementBody::Qreg(_) => ElementKind::QuantumRegisterDecl,
            ElementBody::Creg(_) => ElementKind::ClassicalRegisterDecl,
            ElementBody::Measure { .. } => ElementKind::Measure,
            ElementBody::Barrier { .. } => ElementKind::Barrier,
            ElementBody::GateDecl { .. } => ElementKind::GateDeclPlaceholder,
            ElementBody::Op(_) => ElementKind::Operation,
            ElementBody::CondOp { .. } | ElementBody::CondMeasure { .. } => {
                ElementKind::ConditionalOperation
            }
            ElementBody::Unknown { .. } => ElementKind::Unknown,
        }
    }
}

impl fmt::Display for ElementBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementBody::Comment { text } => write!(f, "// {text}"),
            ElementBody::Version { version } => write!(f, "OPENQASM {version};"),
            ElementBody::Include { path } => write!(f, "include \"{path}\";"),
            ElementBody::Qreg(r) => write!(f, "qreg {}[{}];", r.name, r.size),
            ElementBody::Creg(r) => write!(f, "creg {}[{}];", r.name, r.size),
            ElementBody::Measure { source, target } => write!(f, "measure {source} -> {target};"),
            ElementBody::Barrier { operands } => write!(f, "barrier {};", operands.join(",")),
            ElementBody::GateDecl { name } => write!(f, "gate {name}"),
            ElementBody::Op(op) => write!(f, "{op}"),
            ElementBody::CondOp { condition, op } => write!(f, "if({condition}) {op}"),
            ElementBody::CondMeasure {
                condition,
                source,
                target,
            } => write!(f, "if({condition}) measure {source} -> {target};"),
            ElementBody::Unknown { text } => write!(f, "{text}"),
        }
    }
}

/// A resolved-at-materialization operand reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandRef<'a> {
    /// Whole register: `q`.
    Register(&'a str),
    /// Single bit: `q[3]`.
    Bit(&'a str, u32),
}

impl<'a> OperandRef<'a> {
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.trim();
        match text.split_once('[') {
            None => is_identifier(text).then_some(OperandRef::Register(text)),
            Some((name, rest)) => {
                let index = rest.strip_suffix(']')?.trim().parse().ok()?;
                let name = name.trim();
                is_identifier(name).then_some(OperandRef::Bit(name, index))
            }
        }
    }

    pub fn register(&self) -> &'a str {
        match self {
            OperandRef::Register(name) | OperandRef::Bit(name, _) => name,
        }
    }
}

// ============================================================================
// Builders
// ============================================================================

impl StatementParser<'_> {
    /// `name [(exprs)] operands`. `barrier` is accepted as a name so gate
    /// bodies can carry it.
    pub(crate) fn call(&mut self) -> Option<OpCall> {
        let op = match self.advance()? {
            Token::Identifier(name) => name,
            Token::Barrier => "barrier".to_string(),
            _ => return None,
        };
        let params = if self.check(&Token::LParen) {
            self.expression_list()?
        } else {
            Vec::new()
        };
        let operands = self.operand_list()?;
        Some(OpCall {
            op,
            params,
            operands,
        })
    }

    /// `if(register cmp value)`
    fn condition(&mut self) -> Option<ClassicalCondition> {
        self.expect(&Token::If)?;
        self.expect(&Token::LParen)?;
        let register = self.identifier()?;
        let comparator = match self.advance()? {
            Token::EqEq => Comparator::Eq,
            Token::NotEq => Comparator::Ne,
            Token::Lt => Comparator::Lt,
            Token::LtEq => Comparator::Le,
            Token::Gt => Comparator::Gt,
            Token::GtEq => Comparator::Ge,
            _ => return None,
        };
        let value = self.int_literal()?;
        self.expect(&Token::RParen)?;
        Some(ClassicalCondition::new(register, comparator, value.to_string()))
    }

    /// `measure source -> target`
    fn measurement(&mut self) -> Option<(String, String)> {
        self.expect(&Token::Measure)?;
        let source = self.operand()?;
        self.expect(&Token::Arrow)?;
        let target = self.operand()?;
        Some((source, target))
    }
}

fn build_include(text: &str) -> Option<ElementBody> {
    let mut parser = StatementParser::new(text)?;
    parser.expect(&Token::Include)?;
    let Token::StringLiteral(path) = parser.advance()? else {
        return None;
    };
    parser.finish()?;
    Some(ElementBody::Include { path })
}

fn build_register(text: &str) -> Option<RegisterDecl> {
    let mut parser = StatementParser::new(text)?;
    if !(parser.consume(&Token::Qreg) || parser.consume(&Token::Creg)) {
        return None;
    }
    let name = parser.identifier()?;
    parser.expect(&Token::LBracket)?;
    let size = u32::try_from(parser.int_literal()?).ok()?;
    parser.expect(&Token::RBracket)?;
    parser.finish()?;
    Some(RegisterDecl { name, size })
}

fn build_measure(text: &str) -> Option<ElementBody> {
    let mut parser = StatementParser::new(text)?;
    let (source, target) = parser.measurement()?;
    parser.finish()?;
    Some(ElementBody::Measure { source, target })
}

fn build_barrier(text: &str) -> Option<ElementBody> {
    let mut parser = StatementParser::new(text)?;
    parser.expect(&Token::Barrier)?;
    let operands = parser.operand_list()?;
    parser.finish()?;
    Some(ElementBody::Barrier { operands })
}

fn build_conditional(text: &str) -> Option<ElementBody> {
    let mut parser = StatementParser::new(text)?;
    let condition = parser.condition()?;
    let body = if parser.check(&Token::Measure) {
        let (source, target) = parser.measurement()?;
        ElementBody::CondMeasure {
            condition,
            source,
            target,
        }
    } else {
        ElementBody::CondOp {
            condition,
            op: parser.call()?,
        }
    };
    parser.finish()?;
    Some(body)
}

/// Name of the gate a `gate ...` header declares.
pub(crate) fn gate_name(text: &str) -> Option<String> {
    let mut parser = StatementParser::new(text)?;
    parser.expect(&Token::Gate)?;
    parser.identifier()
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_call_parse() {
        let op = OpCall::parse("u3(pi/2,0,-pi) q[1];").unwrap();
        assert_eq!(op.op, "u3");
        assert_eq!(op.params, vec!["pi/2", "0", "-pi"]);
        assert_eq!(op.operands, vec!["q[1]"]);
        assert_eq!(op.arity(), 3);

        let op = OpCall::parse("cx q[0],q[1];").unwrap();
        assert!(op.params.is_empty());
        assert_eq!(op.operands, vec!["q[0]", "q[1]"]);

        let op = OpCall::parse("rz(cos(a+b),2) q").unwrap();
        assert_eq!(op.params, vec!["cos(a+b)", "2"]);

        assert!(OpCall::parse("h;").is_none());
        assert!(OpCall::parse("(x) q;").is_none());
    }

    #[test]
    fn test_empty_param_list_has_zero_arity() {
        let op = OpCall::parse("bar() q;").unwrap();
        assert_eq!(op.arity(), 0);
    }

    #[test]
    fn test_build_declarations() {
        assert_eq!(
            ElementBody::build(ElementKind::QuantumRegisterDecl, "qreg q[2];"),
            ElementBody::Qreg(RegisterDecl {
                name: "q".into(),
                size: 2
            })
        );
        assert_eq!(
            ElementBody::build(ElementKind::Include, "include \"qelib1.inc\";"),
            ElementBody::Include {
                path: "qelib1.inc".into()
            }
        );
        assert_eq!(
            ElementBody::build(ElementKind::Measure, "measure q[0] -> c[0];"),
            ElementBody::Measure {
                source: "q[0]".into(),
                target: "c[0]".into()
            }
        );
        assert_eq!(
            ElementBody::build(ElementKind::Barrier, "barrier q[0],r;"),
            ElementBody::Barrier {
                operands: vec!["q[0]".into(), "r".into()]
            }
        );
        assert_eq!(
            ElementBody::build(ElementKind::GateDeclPlaceholder, "gate foo(a) q {"),
            ElementBody::GateDecl { name: "foo".into() }
        );
    }

    #[test]
    fn test_build_conditional() {
        let body = ElementBody::build(ElementKind::ConditionalOperation, "if(c>=2) u1(pi) q[0];");
        let ElementBody::CondOp { condition, op } = body else {
            panic!("expected conditional, got {body:?}");
        };
        assert_eq!(condition.register, "c");
        assert_eq!(condition.comparator, Comparator::Ge);
        assert_eq!(condition.value, "2");
        assert_eq!(op.op, "u1");
        assert_eq!(op.params, vec!["pi"]);
    }

    #[test]
    fn test_space_before_parameter_list() {
        let op = OpCall::parse("rz (pi/2) q[0];").unwrap();
        assert_eq!(op.op, "rz");
        assert_eq!(op.params, vec!["pi/2"]);
        assert_eq!(op.operands, vec!["q[0]"]);

        let op = OpCall::parse("u3 ( a , b ,c ) q [ 1 ] , r;").unwrap();
        assert_eq!(op.params, vec!["a", "b", "c"]);
        assert_eq!(op.operands, vec!["q[1]", "r"]);
    }

    #[test]
    fn test_build_conditional_with_spaces() {
        let body = ElementBody::build(ElementKind::ConditionalOperation, "if (c == 1) rz (pi) q[0];");
        let ElementBody::CondOp { condition, op } = body else {
            panic!("expected conditional, got {body:?}");
        };
        assert_eq!(condition.register, "c");
        assert_eq!(condition.value, "1");
        assert_eq!(op.params, vec!["pi"]);
        assert_eq!(op.operands, vec!["q[0]"]);
    }

    #[test]
    fn test_build_conditional_measure() {
        assert_eq!(
            ElementBody::build(
                ElementKind::ConditionalOperation,
                "if(c!=0) measure q[0] -> c[1];"
            ),
            ElementBody::CondMeasure {
                condition: ClassicalCondition::new("c", Comparator::Ne, "0"),
                source: "q[0]".into(),
                target: "c[1]".into(),
            }
        );
    }

    #[test]
    fn test_register_size_must_fit() {
        assert!(matches!(
            ElementBody::build(ElementKind::QuantumRegisterDecl, "qreg q[5000000000];"),
            ElementBody::Unknown { .. }
        ));
        assert_eq!(
            ElementBody::build(ElementKind::ClassicalRegisterDecl, "creg c [ 3 ] ;"),
            ElementBody::Creg(RegisterDecl {
                name: "c".into(),
                size: 3
            })
        );
    }

    #[test]
    fn test_unextractable_becomes_unknown() {
        assert_eq!(
            ElementBody::build(ElementKind::Operation, "???"),
            ElementBody::Unknown { text: "???".into() }
        );
    }

    #[test]
    fn test_display_round_trips_through_classifier() {
        for text in [
            "qreg q[2];",
            "measure q[0] -> c[0];",
            "barrier q,r;",
            "u1(pi/2) q[0];",
            "if(c==1) x q[0];",
            "if(c==1) measure q[0] -> c[0];",
        ] {
            let kind = crate::classify::classify(text);
            assert_eq!(ElementBody::build(kind, text).to_string(), text);
        }
    }

    #[test]
    fn test_operand_ref() {
        assert_eq!(OperandRef::parse("q"), Some(OperandRef::Register("q")));
        assert_eq!(OperandRef::parse("q[3]"), Some(OperandRef::Bit("q", 3)));
        assert_eq!(OperandRef::parse("q[x]"), None);
        assert_eq!(OperandRef::parse("1q"), None);
        assert_eq!(OperandRef::parse("anc[0]").unwrap().register(), "anc");
    }

    #[test]
    fn test_element_serializes_with_type_tag() {
        let element = Element {
            file: 0,
            line: 3,
            source: None,
            comment: Some("entangle".into()),
            body: ElementBody::Op(OpCall::parse("cx q[0],q[1];").unwrap()),
        };
        let json = serde_json::to_string(&element).unwrap();
        assert!(json.contains("\"type\":\"op\""));
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back, element);
        assert_eq!(back.text(), "cx q[0],q[1];");
    }
}
