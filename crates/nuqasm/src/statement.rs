//! Token cursor over one statement.
//!
//! The element and gate builders read statements through this cursor, so
//! they see the same tokens the classifier matched on. Parameter
//! expressions are kept as source text, sliced out by token span.

use crate::lexer::{SpannedToken, Token, tokenize};

/// Cursor over the tokens of one statement.
pub(crate) struct StatementParser<'s> {
    source: &'s str,
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl<'s> StatementParser<'s> {
    /// Lex `source`. `None` when it contains a character outside the token set.
    pub(crate) fn new(source: &'s str) -> Option<Self> {
        let tokens = tokenize(source).ok()?;
        Some(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Whether the current token is of the same kind as `token`.
    pub(crate) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    pub(crate) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, token: &Token) -> Option<()> {
        self.consume(token).then_some(())
    }

    /// `;` closing the statement, with nothing after it.
    pub(crate) fn finish(&mut self) -> Option<()> {
        self.expect(&Token::Semicolon)?;
        self.is_eof().then_some(())
    }

    /// Source text from the current token to the end.
    pub(crate) fn rest(&self) -> &'s str {
        self.tokens
            .get(self.pos)
            .map_or("", |t| self.source[t.span.start..].trim())
    }

    pub(crate) fn identifier(&mut self) -> Option<String> {
        let Token::Identifier(name) = self.peek()? else {
            return None;
        };
        let name = name.clone();
        self.pos += 1;
        Some(name)
    }

    pub(crate) fn int_literal(&mut self) -> Option<u64> {
        let Token::IntLiteral(value) = self.peek()? else {
            return None;
        };
        let value = *value;
        self.pos += 1;
        Some(value)
    }

    /// `ident (, ident)*`
    pub(crate) fn identifier_list(&mut self) -> Option<Vec<String>> {
        let mut ids = vec![self.identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.identifier()?);
        }
        Some(ids)
    }

    /// `name` or `name[index]`, spelled without inner whitespace.
    pub(crate) fn operand(&mut self) -> Option<String> {
        let name = self.identifier()?;
        if !self.consume(&Token::LBracket) {
            return Some(name);
        }
        let index = self.int_literal()?;
        self.expect(&Token::RBracket)?;
        Some(format!("{name}[{index}]"))
    }

    /// `operand (, operand)*`
    pub(crate) fn operand_list(&mut self) -> Option<Vec<String>> {
        let mut operands = vec![self.operand()?];
        while self.consume(&Token::Comma) {
            operands.push(self.operand()?);
        }
        Some(operands)
    }

    /// `( expr (, expr)* )` or `()`, each expression as trimmed source text.
    pub(crate) fn expression_list(&mut self) -> Option<Vec<String>> {
        self.expect(&Token::LParen)?;
        if self.consume(&Token::RParen) {
            return Some(Vec::new());
        }

        let mut exprs = Vec::new();
        let mut depth = 0usize;
        let mut start = self.tokens.get(self.pos)?.span.start;
        let mut end = start;
        loop {
            let spanned = self.tokens.get(self.pos)?;
            let span = spanned.span.clone();
            match spanned.token {
                Token::LParen => depth += 1,
                Token::RParen if depth == 0 => {
                    exprs.push(self.slice(start, end)?);
                    self.pos += 1;
                    return Some(exprs);
                }
                Token::RParen => depth -= 1,
                Token::Comma if depth == 0 => {
                    exprs.push(self.slice(start, end)?);
                    self.pos += 1;
                    start = self.tokens.get(self.pos)?.span.start;
                    end = start;
                    continue;
                }
                Token::Semicolon | Token::LBrace | Token::RBrace => return None,
                _ => {}
            }
            end = span.end;
            self.pos += 1;
        }
    }

    /// Non-empty source text between two offsets.
    fn slice(&self, start: usize, end: usize) -> Option<String> {
        let text = self.source.get(start..end)?.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
