//! Line classifier.
//!
//! Maps one normalized statement to an [`ElementKind`] by trying an ordered
//! list of rules; the first rule that matches wins. Every rule except the
//! blank, version and comment rules is a predicate over the lexed tokens.

use serde::{Deserialize, Serialize};

use crate::lexer::{Token, tokenize};

/// The closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Blank,
    Comment,
    VersionDeclaration,
    Include,
    QuantumRegisterDecl,
    ClassicalRegisterDecl,
    Measure,
    Barrier,
    GateDeclPlaceholder,
    Operation,
    ConditionalOperation,
    Unknown,
}

/// The exact version statement every program starts with.
pub const VERSION_DECLARATION: &str = "OPENQASM 2.0;";

type Rule = (ElementKind, fn(&[Token]) -> bool);

/// Token rules, tried in order after the textual ones.
const RULES: &[Rule] = &[
    (ElementKind::Include, is_include),
    (ElementKind::ConditionalOperation, is_conditional),
    (ElementKind::QuantumRegisterDecl, is_qreg),
    (ElementKind::ClassicalRegisterDecl, is_creg),
    (ElementKind::Measure, is_measure),
    (ElementKind::Barrier, is_barrier),
    (ElementKind::GateDeclPlaceholder, is_gate_opener),
    (ElementKind::Operation, is_operation),
];

/// Classify one statement.
pub fn classify(line: &str) -> ElementKind {
    let line = line.trim();
    if line.is_empty() {
        return ElementKind::Blank;
    }
    if line == VERSION_DECLARATION {
        return ElementKind::VersionDeclaration;
    }
    if line.starts_with("//") {
        return ElementKind::Comment;
    }
    match tokenize(line) {
        Ok(spanned) => {
            let tokens: Vec<Token> = spanned.into_iter().map(|t| t.token).collect();
            classify_tokens(&tokens)
        }
        Err(_) => ElementKind::Unknown,
    }
}

/// Classify an already lexed statement.
pub fn classify_tokens(tokens: &[Token]) -> ElementKind {
    RULES
        .iter()
        .find(|(_, matches)| matches(tokens))
        .map_or(ElementKind::Unknown, |(kind, _)| *kind)
}

// ============================================================================
// Shape predicates
// ============================================================================

/// `name` or `name[int]`. Returns the number of tokens consumed.
fn operand(tokens: &[Token]) -> Option<usize> {
    match tokens {
        [Token::Identifier(_), Token::LBracket, Token::IntLiteral(_), Token::RBracket, ..] => {
            Some(4)
        }
        [Token::Identifier(_), ..] => Some(1),
        _ => None,
    }
}

/// `operand (, operand)*`. Returns the number of tokens consumed.
fn operand_list(tokens: &[Token]) -> Option<usize> {
    let mut pos = operand(tokens)?;
    while tokens.get(pos) == Some(&Token::Comma) {
        pos += 1 + operand(&tokens[pos + 1..])?;
    }
    Some(pos)
}

/// `ident (, ident)*`. Returns the number of tokens consumed.
fn identifier_list(tokens: &[Token]) -> Option<usize> {
    let mut pos = 0;
    loop {
        if !matches!(tokens.get(pos), Some(Token::Identifier(_))) {
            return None;
        }
        pos += 1;
        if tokens.get(pos) != Some(&Token::Comma) {
            return Some(pos);
        }
        pos += 1;
    }
}

/// A balanced parenthesized group starting at `(`. Returns the number of
/// tokens consumed, closing `)` included.
fn paren_group(tokens: &[Token]) -> Option<usize> {
    if tokens.first() != Some(&Token::LParen) {
        return None;
    }
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            Token::Semicolon | Token::LBrace | Token::RBrace => return None,
            _ => {}
        }
    }
    None
}

fn is_include(tokens: &[Token]) -> bool {
    matches!(
        tokens,
        [Token::Include, Token::StringLiteral(_), Token::Semicolon]
    )
}

fn is_comparator(token: &Token) -> bool {
    matches!(
        token,
        Token::EqEq | Token::NotEq | Token::Lt | Token::LtEq | Token::Gt | Token::GtEq
    )
}

fn is_conditional(tokens: &[Token]) -> bool {
    match tokens {
        [
            Token::If,
            Token::LParen,
            Token::Identifier(_),
            cmp,
            Token::IntLiteral(_),
            Token::RParen,
            rest @ ..,
        ] => is_comparator(cmp) && (is_operation(rest) || is_measure(rest)),
        _ => false,
    }
}

fn is_register_decl(tokens: &[Token], keyword: &Token) -> bool {
    match tokens {
        [
            kw,
            Token::Identifier(_),
            Token::LBracket,
            Token::IntLiteral(size),
            Token::RBracket,
            Token::Semicolon,
        ] => kw == keyword && *size > 0 && u32::try_from(*size).is_ok(),
        _ => false,
    }
}

fn is_qreg(tokens: &[Token]) -> bool {
    is_register_decl(tokens, &Token::Qreg)
}

fn is_creg(tokens: &[Token]) -> bool {
    is_register_decl(tokens, &Token::Creg)
}

fn is_measure(tokens: &[Token]) -> bool {
    let Some((Token::Measure, rest)) = tokens.split_first() else {
        return false;
    };
    let Some(src) = operand(rest) else {
        return false;
    };
    if rest.get(src) != Some(&Token::Arrow) {
        return false;
    }
    let rest = &rest[src + 1..];
    operand(rest).is_some_and(|dst| rest.get(dst..) == Some(&[Token::Semicolon][..]))
}

fn is_barrier(tokens: &[Token]) -> bool {
    let Some((Token::Barrier, rest)) = tokens.split_first() else {
        return false;
    };
    operand_list(rest).is_some_and(|n| rest.get(n..) == Some(&[Token::Semicolon][..]))
}

/// `gate name [(params)] regs` followed by nothing or by `{`.
fn is_gate_opener(tokens: &[Token]) -> bool {
    let [Token::Gate, Token::Identifier(_), rest @ ..] = tokens else {
        return false;
    };
    let mut pos = 0;
    if rest.first() == Some(&Token::LParen) {
        if rest.get(1) == Some(&Token::RParen) {
            pos = 2;
        } else {
            match identifier_list(&rest[1..]) {
                Some(n) if rest.get(n + 1) == Some(&Token::RParen) => pos = n + 2,
                _ => return false,
            }
        }
    }
    match identifier_list(&rest[pos..]) {
        Some(n) => matches!(rest.get(pos + n), None | Some(Token::LBrace)),
        None => false,
    }
}

/// `name [(exprs)] operands;`
fn is_operation(tokens: &[Token]) -> bool {
    let Some((Token::Identifier(_), rest)) = tokens.split_first() else {
        return false;
    };
    let pos = if rest.first() == Some(&Token::LParen) {
        match paren_group(rest) {
            Some(n) => n,
            None => return false,
        }
    } else {
        0
    };
    let rest = &rest[pos..];
    operand_list(rest).is_some_and(|n| rest.get(n..) == Some(&[Token::Semicolon][..]))
}
