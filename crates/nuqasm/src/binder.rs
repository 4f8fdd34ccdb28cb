//! Gate call binding and one-level expansion.

use rustc_hash::FxHashMap;

use crate::error::{NuqasmError, NuqasmResult, SourceLocation};
use crate::expression::Expr;
use crate::gatedef::GateDefinition;

/// A body operation with every formal symbol replaced by the call's actuals.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundOp {
    pub op: String,
    pub params: Vec<Expr>,
    pub operands: Vec<String>,
}

impl BoundOp {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Symbol tables for one gate call.
///
/// Built fresh per call, so two calls of the same gate never share bindings.
#[derive(Debug)]
pub struct Binder<'g> {
    gate: &'g GateDefinition,
    params: FxHashMap<String, Expr>,
    registers: FxHashMap<&'g str, String>,
}

impl<'g> Binder<'g> {
    /// Pair the gate's formals with the call's actuals, position by position.
    pub fn bind(
        gate: &'g GateDefinition,
        params: Vec<Expr>,
        operands: &[String],
        at: &SourceLocation,
    ) -> NuqasmResult<Self> {
        if params.len() != gate.params.len() || operands.len() != gate.registers.len() {
            return Err(NuqasmError::MalformedMacroCall {
                gate: gate.name.clone(),
                expected_params: gate.params.len(),
                got_params: params.len(),
                expected_registers: gate.registers.len(),
                got_registers: operands.len(),
                at: at.clone(),
            });
        }

        let params = gate.params.iter().cloned().zip(params).collect();
        let registers = gate
            .registers
            .iter()
            .map(String::as_str)
            .zip(operands.iter().cloned())
            .collect();
        Ok(Self {
            gate,
            params,
            registers,
        })
    }

    pub fn gate(&self) -> &'g GateDefinition {
        self.gate
    }

    /// Rewrite every body operation in terms of the call's actuals.
    pub fn expand(&self, at: &SourceLocation) -> NuqasmResult<Vec<BoundOp>> {
        self.gate
            .body
            .iter()
            .map(|body_op| {
                let params = body_op
                    .params
                    .iter()
                    .map(|text| {
                        Expr::parse(text)
                            .map(|expr| expr.substitute(&self.params))
                            .map_err(|source| NuqasmError::Expression {
                                expr: text.clone(),
                                at: at.clone(),
                                source,
                            })
                    })
                    .collect::<NuqasmResult<Vec<_>>>()?;

                let operands = body_op
                    .operands
                    .iter()
                    .map(|symbol| {
                        self.registers.get(symbol.as_str()).cloned().ok_or_else(|| {
                            NuqasmError::UnboundGateRegister {
                                gate: self.gate.name.clone(),
                                symbol: symbol.clone(),
                                at: at.clone(),
                            }
                        })
                    })
                    .collect::<NuqasmResult<Vec<_>>>()?;

                Ok(BoundOp {
                    op: body_op.op.clone(),
                    params,
                    operands,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn at() -> SourceLocation {
        SourceLocation::new("main.qasm", 9, "call")
    }

    fn gate(text: &str) -> GateDefinition {
        GateDefinition::parse(text, 0, 1).unwrap()
    }

    fn exprs(texts: &[&str]) -> Vec<Expr> {
        texts.iter().map(|t| Expr::parse(t).unwrap()).collect()
    }

    fn operands(texts: &[&str]) -> Vec<String> {
        texts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_expand_single_op() {
        let def = gate("gate foo(a) q { rz(a) q; }");
        let binder = Binder::bind(&def, exprs(&["1.5707963267948966"]), &operands(&["q[0]"]), &at()).unwrap();
        let ops = binder.expand(&at()).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].op, "rz");
        assert_eq!(ops[0].operands, vec!["q[0]"]);
        assert!((ops[0].params[0].eval().unwrap() - 1.5707963267948966).abs() < 1e-15);
    }

    #[test]
    fn test_expression_params_are_substituted_structurally() {
        let def = gate("gate g(theta,th) a,b { u1(theta/2) a; cx a,b; u1(-th) b; }");
        let binder = Binder::bind(&def, exprs(&["pi", "pi/4"]), &operands(&["q[1]", "r"]), &at()).unwrap();
        let ops = binder.expand(&at()).unwrap();
        assert_eq!(ops.len(), 3);
        assert!((ops[0].params[0].eval().unwrap() - PI / 2.0).abs() < 1e-12);
        assert_eq!(ops[1].operands, vec!["q[1]", "r"]);
        assert!((ops[2].params[0].eval().unwrap() + PI / 4.0).abs() < 1e-12);
        assert_eq!(binder.gate().name, "g");
    }

    #[test]
    fn test_two_calls_do_not_share_bindings() {
        let def = gate("gate foo(a) q { rz(a) q; }");
        let first = Binder::bind(&def, exprs(&["1"]), &operands(&["q[0]"]), &at()).unwrap();
        let second = Binder::bind(&def, exprs(&["2"]), &operands(&["q[1]"]), &at()).unwrap();
        let a = first.expand(&at()).unwrap();
        let b = second.expand(&at()).unwrap();
        assert_eq!(a[0].params[0].eval().unwrap(), 1.0);
        assert_eq!(b[0].params[0].eval().unwrap(), 2.0);
        assert_eq!(a[0].operands, vec!["q[0]"]);
        assert_eq!(b[0].operands, vec!["q[1]"]);
    }

    #[test]
    fn test_arity_mismatch_is_malformed_call() {
        let def = gate("gate foo(a) q { rz(a) q; }");
        let err = Binder::bind(&def, Vec::new(), &operands(&["q[0]"]), &at()).unwrap_err();
        assert!(matches!(
            err,
            NuqasmError::MalformedMacroCall { expected_params: 1, got_params: 0, .. }
        ));
        let err = Binder::bind(&def, exprs(&["1"]), &operands(&["a", "b"]), &at()).unwrap_err();
        assert!(matches!(
            err,
            NuqasmError::MalformedMacroCall { expected_registers: 1, got_registers: 2, .. }
        ));
    }

    #[test]
    fn test_undeclared_body_symbol() {
        let def = gate("gate bad q { x r; }");
        let binder = Binder::bind(&def, Vec::new(), &operands(&["q[0]"]), &at()).unwrap();
        assert!(matches!(
            binder.expand(&at()),
            Err(NuqasmError::UnboundGateRegister { ref symbol, .. }) if symbol == "r"
        ));
    }

    #[test]
    fn test_bad_body_expression() {
        let def = gate("gate bad(a) q { rz(a $ 2) q; }");
        let binder = Binder::bind(&def, exprs(&["1"]), &operands(&["q"]), &at()).unwrap();
        assert!(matches!(
            binder.expand(&at()),
            Err(NuqasmError::Expression { .. })
        ));
    }
}
