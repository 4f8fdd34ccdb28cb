//! Gate definitions and the state machine that collects them.
//!
//! A definition may span several statements:
//!
//! ```text
//! gate foo(a) q      <- Idle -> AwaitingOpenBrace
//! {                  <- AwaitingOpenBrace -> AccumulatingBody
//!   rz(a) q;         <- AccumulatingBody
//! }                  <- AccumulatingBody -> Idle, definition finished
//! ```
//!
//! The collected statements are joined and normalized before being
//! decomposed, so any line split of a definition yields the same record as
//! its one-line form.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::element::{OpCall, gate_name};
use crate::error::{NuqasmError, NuqasmResult, SourceLocation};
use crate::lexer::Token;
use crate::line::normalize;
use crate::statement::StatementParser;

/// A user-defined gate: `gate name(params) registers { body }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDefinition {
    pub name: String,
    /// Formal parameter symbols, in order.
    #[serde(default)]
    pub params: Vec<String>,
    /// Formal register symbols, in order.
    pub registers: Vec<String>,
    /// Body operations over the formal symbols.
    pub body: Vec<OpCall>,
    /// File index and 1-based line of the header.
    pub file: usize,
    pub line: usize,
    /// Normalized one-line text of the definition, when gate source retention is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl GateDefinition {
    /// Number of formal parameters; the arity used for lookup.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Decompose a complete one-line definition.
    pub fn parse(text: &str, file: usize, line: usize) -> Result<Self, String> {
        let mut parser = StatementParser::new(text).ok_or("unrecognized character")?;
        parser.expect(&Token::Gate).ok_or("missing 'gate' keyword")?;
        let name = parser
            .identifier()
            .ok_or_else(|| format!("bad gate name '{}'", parser.rest()))?;

        let params = if parser.consume(&Token::LParen) {
            if parser.consume(&Token::RParen) {
                Vec::new()
            } else {
                let params = parser.identifier_list().ok_or("bad parameter list")?;
                parser
                    .expect(&Token::RParen)
                    .ok_or("unbalanced parameter list")?;
                params
            }
        } else {
            Vec::new()
        };
        let registers = parser.identifier_list().ok_or("no register symbols")?;
        let mut seen = FxHashSet::default();
        for symbol in params.iter().chain(&registers) {
            if !seen.insert(symbol.as_str()) {
                return Err(format!("symbol '{symbol}' declared twice"));
            }
        }

        parser.expect(&Token::LBrace).ok_or("missing '{'")?;
        let mut body = Vec::new();
        while !parser.consume(&Token::RBrace) {
            if parser.is_eof() {
                return Err("missing '}'".into());
            }
            if parser.consume(&Token::Semicolon) {
                continue;
            }
            let rest = parser.rest();
            let call = parser
                .call()
                .filter(|_| parser.consume(&Token::Semicolon))
                .ok_or_else(|| {
                    let stmt = rest.split(';').next().unwrap_or(rest).trim();
                    format!("cannot decompose body statement '{stmt}'")
                })?;
            body.push(call);
        }
        if !parser.is_eof() {
            return Err("text after closing brace".into());
        }

        Ok(Self {
            name,
            params,
            registers,
            body,
            file,
            line,
            source: None,
        })
    }
}

/// A definition being collected.
#[derive(Debug)]
struct PendingGate {
    name: String,
    file: usize,
    start: SourceLocation,
    statements: Vec<String>,
}

#[derive(Debug, Default)]
enum GateState {
    #[default]
    Idle,
    AwaitingOpenBrace(PendingGate),
    AccumulatingBody(PendingGate),
}

/// Collects gate definitions statement by statement.
#[derive(Debug, Default)]
pub struct GateParser {
    state: GateState,
    retain_source: bool,
}

impl GateParser {
    pub fn new(retain_source: bool) -> Self {
        Self {
            state: GateState::Idle,
            retain_source,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GateState::Idle)
    }

    pub fn state_name(&self) -> &'static str {
        match self.state {
            GateState::Idle => "idle",
            GateState::AwaitingOpenBrace(_) => "awaiting_open_brace",
            GateState::AccumulatingBody(_) => "accumulating_body",
        }
    }

    /// Start a definition at a gate header statement.
    pub fn begin(
        &mut self,
        text: &str,
        file: usize,
        at: SourceLocation,
    ) -> NuqasmResult<Option<GateDefinition>> {
        let pending = PendingGate {
            name: gate_name(text).unwrap_or_default(),
            file,
            start: at,
            statements: vec![text.to_string()],
        };
        match (text.contains('{'), text.contains('}')) {
            (true, true) => self.finish(pending).map(Some),
            (true, false) => {
                self.state = GateState::AccumulatingBody(pending);
                Ok(None)
            }
            _ => {
                self.state = GateState::AwaitingOpenBrace(pending);
                Ok(None)
            }
        }
    }

    /// Feed the next statement. Returns the definition once its body closes.
    pub fn feed(
        &mut self,
        text: &str,
        file: usize,
        at: SourceLocation,
    ) -> NuqasmResult<Option<GateDefinition>> {
        match std::mem::take(&mut self.state) {
            GateState::Idle => self.begin(text, file, at),
            GateState::AwaitingOpenBrace(mut pending) => {
                if !text.contains('{') {
                    return Err(NuqasmError::GateMissingOpenBrace {
                        start: pending.start,
                        at,
                    });
                }
                pending.statements.push(text.to_string());
                if text.contains('}') {
                    self.finish(pending).map(Some)
                } else {
                    self.state = GateState::AccumulatingBody(pending);
                    Ok(None)
                }
            }
            GateState::AccumulatingBody(mut pending) => {
                pending.statements.push(text.to_string());
                if text.contains('}') {
                    self.finish(pending).map(Some)
                } else {
                    trace!(gate = %pending.name, "accumulating gate body");
                    self.state = GateState::AccumulatingBody(pending);
                    Ok(None)
                }
            }
        }
    }

    /// The input ended; a definition still open is an error.
    pub fn end_of_input(&mut self) -> NuqasmResult<()> {
        match std::mem::take(&mut self.state) {
            GateState::Idle => Ok(()),
            GateState::AwaitingOpenBrace(pending) | GateState::AccumulatingBody(pending) => {
                Err(NuqasmError::IncompleteGate {
                    name: pending.name,
                    start: pending.start,
                })
            }
        }
    }

    fn finish(&self, pending: PendingGate) -> NuqasmResult<GateDefinition> {
        let text = normalize(&pending.statements.join(" "));
        let mut definition = GateDefinition::parse(&text, pending.file, pending.start.line)
            .map_err(|reason| NuqasmError::MalformedGate {
                name: pending.name,
                reason,
                start: pending.start,
            })?;
        if self.retain_source {
            definition.source = Some(text);
        }
        Ok(definition)
    }
}
