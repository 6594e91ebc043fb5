//! Left-to-right operand sequencing.
//!
//! A [`Sequence`] lowers a fixed list of operands in source order and keeps
//! the statements they need. An operand is captured into a temporary when
//! leaving it inline would let a later operand's side effects change its
//! value, when argument reordering would move it after another operand, or
//! when the caller needs to use it more than once.

use sablejs_core::ast::Expr;
use sablejs_core::js::{JsExpr, JsStmt};
use sablejs_core::{LoweringError, ScriptMetadata, Span};

use super::analysis::{has_side_effects, is_invariant};
use super::{ExprLowerer, Result};

/// Why an operand may need a temporary besides later side effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capture {
    /// The operand is used more than once.
    pub reuse: bool,
    /// A later operand is placed before this one in the output.
    pub reordered: bool,
}

/// A lowered operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub expr: JsExpr,
    /// The value is a new instance nobody else references.
    pub fresh: bool,
    /// The expression is a literal or temporary; nothing can change it.
    pub stable: bool,
}

pub struct Sequence<'ast> {
    operands: Vec<&'ast Expr<'ast>>,
    effects: Vec<bool>,
    next: usize,
    stmts: Vec<JsStmt>,
}

impl<'ast> Sequence<'ast> {
    pub fn new(operands: Vec<&'ast Expr<'ast>>, metadata: &dyn ScriptMetadata) -> Self {
        let effects = operands.iter().map(|op| has_side_effects(op, metadata)).collect();
        Self {
            operands,
            effects,
            next: 0,
            stmts: Vec::new(),
        }
    }

    /// Lower the next operand.
    pub fn lower_next(&mut self, lowerer: &mut ExprLowerer<'_, '_>, capture: Capture) -> Result<Operand> {
        let index = self.next;
        let Some(&expr) = self.operands.get(index) else {
            return Err(LoweringError::internal("operand sequence exhausted", Span::default()));
        };
        self.next += 1;

        let lowered = lowerer.lower(expr)?;
        self.stmts.extend(lowered.stmts);

        let later = &self.operands[index + 1..];
        let hoist = !lowered.stable && self.effects[index + 1..].iter().any(|e| *e) && !is_invariant(expr, later);
        let needs_temp =
            hoist || (capture.reordered && !lowered.stable) || (capture.reuse && !lowered.expr.is_reusable());

        if needs_temp {
            let temp = self.capture(lowerer, lowered.expr);
            return Ok(Operand {
                expr: temp,
                fresh: lowered.fresh,
                stable: true,
            });
        }
        Ok(Operand {
            expr: lowered.expr,
            fresh: lowered.fresh,
            stable: lowered.stable,
        })
    }

    /// Bind `expr` to a new temporary and return a reference to it.
    pub fn capture(&mut self, lowerer: &mut ExprLowerer<'_, '_>, expr: JsExpr) -> JsExpr {
        let name = lowerer.allocate_temp();
        tracing::trace!(temp = %name, value = %expr, "capturing operand");
        self.stmts.push(JsStmt::VarDecl {
            name: name.clone(),
            init: expr,
        });
        JsExpr::Identifier(name)
    }

    /// Whether any operand not yet lowered has side effects.
    pub fn remaining_has_side_effects(&self) -> bool {
        self.effects[self.next.min(self.effects.len())..].iter().any(|e| *e)
    }

    pub fn push(&mut self, stmt: JsStmt) {
        self.stmts.push(stmt);
    }

    pub fn extend(&mut self, stmts: Vec<JsStmt>) {
        self.stmts.extend(stmts);
    }

    pub fn into_statements(self) -> Vec<JsStmt> {
        self.stmts
    }
}
