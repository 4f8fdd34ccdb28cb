//! Parameter expressions.
//!
//! Gate parameters are parsed into a small AST so that binding a formal
//! parameter replaces whole identifiers only (`a` never matches inside
//! `ab`), then evaluated over `f64`.

use std::f64::consts::PI;
use std::fmt;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::lexer::{Token, tokenize};

/// Expression errors.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ExprError {
    #[error("invalid character at offset {0}")]
    Lexer(usize),

    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("unbound identifier '{0}'")]
    Unbound(String),

    #[error("result is not a finite number")]
    NonFinite,
}

/// Binary operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
            BinOp::Pow => 3,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }
}

/// The unary functions of OpenQASM 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "exp" => Function::Exp,
            "ln" => Function::Ln,
            "sqrt" => Function::Sqrt,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Exp => x.exp(),
            Function::Ln => x.ln(),
            Function::Sqrt => x.sqrt(),
        }
    }
}

/// A parameter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Pi,
    Ident(String),
    Neg(Box<Expr>),
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Call { func: Function, arg: Box<Expr> },
}

impl Expr {
    /// Parse expression text.
    pub fn parse(text: &str) -> Result<Self, ExprError> {
        let tokens = tokenize(text)
            .map_err(|span| ExprError::Lexer(span.start))?
            .into_iter()
            .map(|t| t.token)
            .collect();
        let mut parser = ExprParser { tokens, pos: 0 };
        let expr = parser.parse_expression()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(ExprError::UnexpectedToken {
                expected: "end of expression".into(),
                found: token.to_string(),
            }),
        }
    }

    /// Replace bound identifiers by their expressions. Unbound identifiers
    /// are left in place.
    #[must_use]
    pub fn substitute(&self, bindings: &FxHashMap<String, Expr>) -> Expr {
        match self {
            Expr::Ident(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Expr::Number(_) | Expr::Pi => self.clone(),
            Expr::Neg(inner) => Expr::Neg(Box::new(inner.substitute(bindings))),
            Expr::BinOp { left, op, right } => Expr::BinOp {
                left: Box::new(left.substitute(bindings)),
                op: *op,
                right: Box::new(right.substitute(bindings)),
            },
            Expr::Call { func, arg } => Expr::Call {
                func: *func,
                arg: Box::new(arg.substitute(bindings)),
            },
        }
    }

    /// Evaluate to a finite real.
    pub fn eval(&self) -> Result<f64, ExprError> {
        let value = match self {
            Expr::Number(v) => *v,
            Expr::Pi => PI,
            Expr::Ident(name) => return Err(ExprError::Unbound(name.clone())),
            Expr::Neg(inner) => -inner.eval()?,
            Expr::BinOp { left, op, right } => {
                let (l, r) = (left.eval()?, right.eval()?);
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                }
            }
            Expr::Call { func, arg } => func.apply(arg.eval()?),
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExprError::NonFinite)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(v) => write!(f, "{v}"),
            Expr::Pi => write!(f, "pi"),
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::Neg(inner) => write!(f, "-({inner})"),
            Expr::BinOp { left, op, right } => write!(f, "({left}{}{right})", op.symbol()),
            Expr::Call { func, arg } => write!(f, "{}({arg})", func.name()),
        }
    }
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ExprError> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(ExprError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.to_string(),
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, ExprError> {
        self.parse_binary_expr(0)
    }

    /// Precedence climbing; `^` is right-associative.
    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();

            let next_min = if op == BinOp::Pow { prec } else { prec + 1 };
            let right = self.parse_binary_expr(next_min)?;
            left = Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Unary signs bind looser than `^`: `-2^2` is `-(2^2)`.
    fn parse_unary_expr(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                let operand = self.parse_binary_expr(BinOp::Pow.precedence())?;
                Ok(Expr::Neg(Box::new(operand)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_binary_expr(BinOp::Pow.precedence())
            }
            _ => self.parse_primary_expr(),
        }
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ExprError> {
        let token = self.advance().ok_or(ExprError::UnexpectedEnd)?;
        match token {
            Token::IntLiteral(v) => Ok(Expr::Number(v as f64)),
            Token::FloatLiteral(v) => Ok(Expr::Number(v)),
            Token::Pi => Ok(Expr::Pi),
            Token::Identifier(name) => {
                if self.peek() == Some(&Token::LParen) {
                    let func = Function::from_name(&name)
                        .ok_or_else(|| ExprError::UnknownFunction(name.clone()))?;
                    self.advance();
                    let arg = self.parse_expression()?;
                    self.expect(&Token::RParen)?;
                    Ok(Expr::Call {
                        func,
                        arg: Box::new(arg),
                    })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            other => Err(ExprError::UnexpectedToken {
                expected: "expression".into(),
                found: other.to_string(),
            }),
        }
    }

    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Caret => Some(BinOp::Pow),
            _ => None,
        }
    }
}
