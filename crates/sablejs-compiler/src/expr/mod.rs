//! Expression lowering.
//!
//! The [`ExprLowerer`] turns resolved expressions into output-language
//! expressions plus the statements that must run before them. Every lowered
//! sub-expression is evaluated exactly once, in source order; see
//! [`sequence`] for when temporaries are introduced.
//!
//! # Example
//!
//! ```ignore
//! let mut lowerer = ExprLowerer::new(&mut ctx);
//! let lowered = lowerer.lower_assignment(assign, ValueUsage::Discarded)?;
//! ```

mod analysis;
mod assignment;
mod sequence;

use sablejs_core::ast::{AssignExpr, CallExpr, Expr, LiteralKind, Receiver, TypeRef};
use sablejs_core::js::{JsExpr, JsStmt};
use sablejs_core::{AccessorImpl, LoweringError, MethodImpl, ScriptMetadata, TypeSemantics};

use crate::ValueUsage;
use crate::clone_policy::{clone_for_store, wrap_clone};
use crate::context::LoweringContext;
use crate::emit::{self, Address, inline_code};
use crate::lvalue::{Lvalue, classify};
use crate::options::LoweringOptions;

pub use sequence::{Capture, Operand, Sequence};

type Result<T> = std::result::Result<T, LoweringError>;

/// A lowered expression and the statements that must precede it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    pub stmts: Vec<JsStmt>,
    pub expr: JsExpr,
    /// The value is a new instance nobody else references.
    pub fresh: bool,
    /// The expression is a literal or temporary; nothing can change it.
    pub stable: bool,
}

impl Lowered {
    fn pure(expr: JsExpr, fresh: bool, stable: bool) -> Self {
        Self {
            stmts: Vec::new(),
            expr,
            fresh,
            stable,
        }
    }
}

/// Addressing operands of an lvalue after lowering.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredAddress {
    pub address: Address,
    /// Freshness of each index argument, in declared order.
    pub fresh: Vec<bool>,
}

/// Lowers expressions within one function body.
pub struct ExprLowerer<'a, 'ctx> {
    ctx: &'a mut LoweringContext<'ctx>,
}

impl<'a, 'ctx> ExprLowerer<'a, 'ctx> {
    pub fn new(ctx: &'a mut LoweringContext<'ctx>) -> Self {
        Self { ctx }
    }

    pub(crate) fn context(&self) -> &LoweringContext<'ctx> {
        self.ctx
    }

    pub(crate) fn metadata(&self) -> &'ctx dyn ScriptMetadata {
        self.ctx.metadata()
    }

    pub(crate) fn options(&self) -> &'ctx LoweringOptions {
        self.ctx.options()
    }

    pub(crate) fn allocate_temp(&mut self) -> String {
        self.ctx.allocate_temp()
    }

    /// Lower an assignment or compound assignment.
    pub fn lower_assignment<'ast>(&mut self, assign: &'ast AssignExpr<'ast>, usage: ValueUsage) -> Result<Lowered> {
        assignment::lower_assign(self, assign, usage)
    }

    /// Lower an expression in value position.
    pub fn lower<'ast>(&mut self, expr: &'ast Expr<'ast>) -> Result<Lowered> {
        match expr {
            Expr::Literal(literal) => Ok(Lowered::pure(lower_literal(literal.kind), true, true)),
            Expr::Local(local) => {
                let name = JsExpr::ident(local.local.name);
                let expr = if local.local.is_by_ref() {
                    JsExpr::member(name, self.options().by_ref_field())
                } else {
                    name
                };
                Ok(Lowered::pure(expr, false, false))
            }
            Expr::This(_) => Ok(Lowered::pure(JsExpr::This, false, true)),
            Expr::Default(default) => Ok(Lowered::pure(self.default_value(default.ty), true, false)),
            Expr::Field(_) | Expr::Property(_) | Expr::Indexer(_) | Expr::ArrayElement(_) | Expr::Dynamic(_) => {
                self.lower_load(expr)
            }
            Expr::Call(call) => self.lower_call(call),
            Expr::Binary(binary) => {
                let mut seq = Sequence::new(vec![binary.left, binary.right], self.metadata());
                let left = seq.lower_next(self, Capture::default())?;
                let right = seq.lower_next(self, Capture::default())?;
                Ok(Lowered {
                    stmts: seq.into_statements(),
                    expr: JsExpr::binary(binary.op, left.expr, right.expr),
                    fresh: true,
                    stable: false,
                })
            }
            Expr::Assign(assign) => self.lower_assignment(assign, ValueUsage::Used),
        }
    }

    /// `null` for reference types, `$Default({T})` for value types.
    fn default_value(&self, ty: TypeRef<'_>) -> JsExpr {
        match self.metadata().type_semantics(ty) {
            TypeSemantics::ReferenceType => JsExpr::Null,
            TypeSemantics::ImmutableValueType | TypeSemantics::MutableValueType { .. } => JsExpr::invoke(
                JsExpr::ident(self.options().default_intrinsic()),
                vec![JsExpr::type_handle(ty.name)],
            ),
        }
    }

    /// Read a storage location.
    fn lower_load<'ast>(&mut self, expr: &'ast Expr<'ast>) -> Result<Lowered> {
        let lvalue = classify(expr, self.context())?;
        let mut seq = Sequence::new(lvalue.operands(), self.metadata());
        let reuse = inline_code::is_inline(lvalue.getter());
        let mut parts = self.lower_address(&lvalue, &mut seq, reuse)?;
        self.pass_args(&lvalue, lvalue.getter(), &mut parts, 1);
        let load = emit::emit_load(&lvalue, &parts.address, self.options())?;
        Ok(Lowered {
            stmts: seq.into_statements(),
            expr: load,
            fresh: lvalue.load_is_fresh(),
            stable: false,
        })
    }

    fn lower_call<'ast>(&mut self, call: &'ast CallExpr<'ast>) -> Result<Lowered> {
        let method = call.method;
        let implementation = self.metadata().method_semantics(method);
        let inline = match &implementation {
            MethodImpl::Normal { .. } => false,
            MethodImpl::InlineCode { .. } => true,
            MethodImpl::NotUsableFromScript => {
                return Err(LoweringError::MemberNotUsableFromScript {
                    member: format!("{}.{}", method.declaring_type.name, method.name),
                    span: call.span,
                });
            }
        };
        // operands of inline code are substituted as trivial values or temporaries
        let capture = Capture {
            reuse: inline,
            ..Capture::default()
        };

        let receiver = match call.receiver {
            Receiver::Instance(expr) => Some(expr),
            Receiver::Static(_) | Receiver::Base(_) => None,
        };
        let operands = receiver.into_iter().chain(call.args.iter().copied()).collect();
        let mut seq = Sequence::new(operands, self.metadata());

        let object = match receiver {
            Some(_) => seq.lower_next(self, capture)?.expr,
            None => match call.receiver {
                Receiver::Static(owner) => JsExpr::type_handle(owner.name),
                _ => JsExpr::This,
            },
        };

        let mut args = Vec::with_capacity(call.args.len());
        for (i, arg) in call.args.iter().enumerate() {
            let param = method.params.get(i);
            let operand = seq.lower_next(self, capture)?;
            let ty = param.map_or_else(|| arg.ty(), |p| p.ty);
            args.push(self.clone_value(operand.expr, ty, operand.fresh, 1));
        }

        let expr = match &implementation {
            MethodImpl::Normal { name } => match call.receiver {
                Receiver::Base(declaring_type) => emit::call_base(declaring_type, name, args, self.options()),
                _ => JsExpr::call_method(object, name.as_str(), args),
            },
            MethodImpl::InlineCode { template } => {
                JsExpr::Verbatim(inline_code::substitute(template, call.span, |placeholder| {
                    match placeholder {
                        "this" => Some(&object),
                        name => method
                            .params
                            .iter()
                            .position(|p| p.name == name)
                            .or_else(|| name.parse::<usize>().ok())
                            .and_then(|i| args.get(i)),
                    }
                })?)
            }
            MethodImpl::NotUsableFromScript => {
                return Err(LoweringError::internal("unusable method reached emission", call.span));
            }
        };

        Ok(Lowered {
            stmts: seq.into_statements(),
            expr,
            fresh: true,
            stable: false,
        })
    }

    /// Lower the receiver and index arguments of `lvalue`.
    ///
    /// `seq` must start with `lvalue.operands()`. Supplied arguments are
    /// lowered in call-site order; omitted optional arguments are lowered
    /// afterwards from their declared defaults.
    pub(crate) fn lower_address<'ast>(
        &mut self,
        lvalue: &Lvalue<'ast>,
        seq: &mut Sequence<'ast>,
        reuse: bool,
    ) -> Result<LoweredAddress> {
        let object = match lvalue.receiver {
            Some(_) => Some(seq.lower_next(self, Capture { reuse, reordered: false })?.expr),
            None => None,
        };

        let order = lvalue.call_site_order();
        let supplied: Vec<&Expr<'ast>> = order.iter().map(|&d| lvalue.args[d].expr()).collect();
        let mut slots: Vec<Option<Operand>> = vec![None; lvalue.args.len()];
        for (position, &declared) in order.iter().enumerate() {
            let reordered = self.is_reorder_hazard(&supplied, &order, position);
            let operand = seq.lower_next(self, Capture { reuse, reordered })?;
            slots[declared] = Some(operand);
        }

        let mut args = Vec::with_capacity(slots.len());
        let mut fresh = Vec::with_capacity(slots.len());
        for (slot, arg) in slots.into_iter().zip(&lvalue.args) {
            let operand = match slot {
                Some(operand) => operand,
                None => {
                    let lowered = self.lower(arg.expr())?;
                    seq.extend(lowered.stmts);
                    let expr = if reuse && !lowered.expr.is_reusable() {
                        seq.capture(self, lowered.expr)
                    } else {
                        lowered.expr
                    };
                    Operand {
                        expr,
                        fresh: lowered.fresh,
                        stable: lowered.stable,
                    }
                }
            };
            args.push(operand.expr);
            fresh.push(operand.fresh);
        }

        Ok(LoweredAddress {
            address: Address { object, args },
            fresh,
        })
    }

    /// A side-effecting argument that ends up after a later, non-invariant
    /// argument in declared order must be evaluated early.
    fn is_reorder_hazard(&self, supplied: &[&Expr<'_>], order: &[usize], position: usize) -> bool {
        let current = supplied[position];
        analysis::has_side_effects(current, self.metadata())
            && (position + 1..supplied.len())
                .any(|later| order[later] < order[position] && !analysis::is_invariant(supplied[later], &[current]))
    }

    /// Apply the store rule for a value of type `ty` consumed `uses` times.
    pub(crate) fn clone_value(&self, expr: JsExpr, ty: TypeRef<'_>, fresh: bool, uses: usize) -> JsExpr {
        let semantics = self.metadata().type_semantics(ty);
        match clone_for_store(&semantics, fresh, uses) {
            Some(tag) => wrap_clone(expr, tag, self.options()),
            None => expr,
        }
    }

    /// Clone index arguments passed to script code through `accessor`.
    /// Native subscripts take their indices as they are.
    pub(crate) fn pass_args(
        &self,
        lvalue: &Lvalue<'_>,
        accessor: Option<&AccessorImpl>,
        parts: &mut LoweredAddress,
        uses: usize,
    ) {
        if !matches!(
            accessor,
            Some(AccessorImpl::Method { .. } | AccessorImpl::InlineCode { .. })
        ) {
            return;
        }
        for ((arg, fresh), declared) in parts.address.args.iter_mut().zip(&parts.fresh).zip(&lvalue.args) {
            let value = std::mem::replace(arg, JsExpr::Null);
            *arg = self.clone_value(value, declared.ty(), *fresh, uses);
        }
    }
}

fn lower_literal(kind: LiteralKind<'_>) -> JsExpr {
    match kind {
        LiteralKind::Int(value) => JsExpr::number(value as f64),
        LiteralKind::Double(value) => JsExpr::number(value),
        LiteralKind::Bool(value) => JsExpr::Bool(value),
        LiteralKind::String(value) => JsExpr::string(value),
        LiteralKind::Null => JsExpr::Null,
    }
}
