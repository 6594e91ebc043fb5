//! Assignment lowering.
//!
//! Lowers:
//! - Simple assignment: `a = b`, including chains `a = b = c`
//! - Compound assignment: `a += b`, `a -= b`, etc.
//!
//! Targets the output language can assign natively stay native assignment
//! expressions, so reference-typed chains nest into a single statement.
//! Everything else (setters, inline code, base calls, multi-dimensional
//! arrays, receiver copies) becomes a call-shaped store whose result is the
//! stored value, never the setter's return value.

use sablejs_core::ast::AssignExpr;
use sablejs_core::js::{JsExpr, JsStmt};
use sablejs_core::{BinaryOp, LoweringError};

use super::{Capture, ExprLowerer, Lowered, Result, Sequence};
use crate::ValueUsage;
use crate::clone_policy::requires_clone;
use crate::emit::{self, inline_code};
use crate::lvalue::{LvalueKind, classify};

/// Lower an assignment expression.
pub fn lower_assign<'ast>(
    lowerer: &mut ExprLowerer<'_, '_>,
    assign: &'ast AssignExpr<'ast>,
    usage: ValueUsage,
) -> Result<Lowered> {
    let used = usage == ValueUsage::Used;
    match assign.op.binary_op() {
        None => lower_simple_assign(lowerer, assign, used),
        Some(op) => lower_compound_assign(lowerer, assign, op, used),
    }
}

/// Lower a simple assignment (`a = b`).
fn lower_simple_assign<'ast>(
    lowerer: &mut ExprLowerer<'_, '_>,
    assign: &'ast AssignExpr<'ast>,
    used: bool,
) -> Result<Lowered> {
    let lvalue = classify(assign.target, lowerer.context())?;
    let semantics = lowerer.metadata().type_semantics(lvalue.ty);
    let mutable = requires_clone(&semantics).is_some();
    let native = lvalue.is_natively_assignable();
    tracing::trace!(kind = ?lvalue.kind, native, mutable, used, "lowering assignment");

    let inline = inline_code::is_inline(lvalue.setter());
    let address_reuse = (native && used && mutable) || inline;
    let value_reuse = (!native && used && lvalue.kind != LvalueKind::ThisOfValueType) || inline;

    let mut operands = lvalue.operands();
    operands.push(assign.value);
    let mut seq = Sequence::new(operands, lowerer.metadata());
    let mut parts = lowerer.lower_address(&lvalue, &mut seq, address_reuse)?;
    let value = seq.lower_next(
        lowerer,
        Capture {
            reuse: value_reuse,
            reordered: false,
        },
    )?;
    let options = lowerer.options();

    if native {
        let target = emit::native_target(&lvalue, &parts.address, options)?;
        let stored = lowerer.clone_value(value.expr, lvalue.ty, value.fresh, 1);
        if used && mutable {
            // result is the stored copy, read back from the target
            seq.push(JsStmt::Expr(JsExpr::assign(target.clone(), stored)));
            return Ok(Lowered {
                stmts: seq.into_statements(),
                expr: target,
                fresh: false,
                stable: false,
            });
        }
        return Ok(Lowered {
            stmts: seq.into_statements(),
            expr: JsExpr::assign(target, stored),
            fresh: value.fresh,
            stable: false,
        });
    }

    let returns_value = used && lvalue.kind != LvalueKind::ThisOfValueType;
    let stored = lowerer.clone_value(
        value.expr.clone(),
        lvalue.ty,
        value.fresh,
        if returns_value { 2 } else { 1 },
    );
    lowerer.pass_args(&lvalue, lvalue.setter(), &mut parts, 1);
    let store = emit::emit_store(&lvalue, &parts.address, stored, options)?;

    if !used {
        return Ok(Lowered {
            stmts: seq.into_statements(),
            expr: store,
            fresh: false,
            stable: false,
        });
    }

    seq.push(JsStmt::Expr(store));
    let (expr, stable) = if returns_value {
        (value.expr, value.stable)
    } else {
        (JsExpr::This, true)
    };
    Ok(Lowered {
        stmts: seq.into_statements(),
        expr,
        fresh: false,
        stable,
    })
}

/// Lower a compound assignment (`a op= b`).
fn lower_compound_assign<'ast>(
    lowerer: &mut ExprLowerer<'_, '_>,
    assign: &'ast AssignExpr<'ast>,
    op: BinaryOp,
    used: bool,
) -> Result<Lowered> {
    let lvalue = classify(assign.target, lowerer.context())?;
    if lvalue.kind == LvalueKind::ThisOfValueType {
        return Err(LoweringError::internal(
            format!("compound assignment '{}' to the receiver", assign.op),
            assign.span,
        ));
    }
    let options = lowerer.options();

    let mut operands = lvalue.operands();
    operands.push(assign.value);
    let mut seq = Sequence::new(operands, lowerer.metadata());

    if lvalue.is_natively_assignable() {
        let parts = lowerer.lower_address(&lvalue, &mut seq, false)?;
        let value = seq.lower_next(lowerer, Capture::default())?;
        let target = emit::native_target(&lvalue, &parts.address, options)?;
        return Ok(Lowered {
            stmts: seq.into_statements(),
            expr: JsExpr::compound_assign(op, target, value.expr),
            fresh: true,
            stable: false,
        });
    }

    // The address is used twice: once by the getter, once by the setter.
    let mut parts = lowerer.lower_address(&lvalue, &mut seq, true)?;
    let mut getter_parts = parts.clone();
    lowerer.pass_args(&lvalue, lvalue.getter(), &mut getter_parts, 2);
    let mut old = emit::emit_load(&lvalue, &getter_parts.address, options)?;
    if seq.remaining_has_side_effects() {
        old = seq.capture(lowerer, old);
    }

    let value = seq.lower_next(lowerer, Capture::default())?;
    let mut new = JsExpr::binary(op, old, value.expr);
    if used || inline_code::is_inline(lvalue.setter()) {
        new = seq.capture(lowerer, new);
    }
    let stored = lowerer.clone_value(new.clone(), lvalue.ty, true, if used { 2 } else { 1 });
    lowerer.pass_args(&lvalue, lvalue.setter(), &mut parts, 2);
    let store = emit::emit_store(&lvalue, &parts.address, stored, options)?;
    tracing::trace!(kind = ?lvalue.kind, %op, "compound assignment through accessors");

    if !used {
        return Ok(Lowered {
            stmts: seq.into_statements(),
            expr: store,
            fresh: false,
            stable: false,
        });
    }
    seq.push(JsStmt::Expr(store));
    Ok(Lowered {
        stmts: seq.into_statements(),
        expr: new,
        fresh: false,
        stable: true,
    })
}
