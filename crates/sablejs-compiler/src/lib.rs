//! sablejs assignment lowering
//!
//! Lowers resolved assignment expressions into an ordered list of
//! output-language statements plus a result expression, preserving
//! left-to-right evaluation, single evaluation of every sub-expression and
//! value-type copy semantics.
//!
//! ## Architecture
//!
//! - **Classification**: the target becomes an [`lvalue::Lvalue`] describing
//!   its storage kind, addressing operands and script implementation
//! - **Planning**: operands are sequenced left to right, temporaries are
//!   introduced where inlining would change evaluation order, and each link of
//!   a chain is stored innermost first
//! - **Emission**: loads and stores are shaped per implementation strategy
//!
//! ## Modules
//!
//! - [`clone_policy`]: When stored values must be copied
//! - [`context`]: Lowering context (metadata, allocator, diagnostics, options)
//! - [`emit`]: Load/store shapes and inline-code substitution
//! - [`expr`]: Expression lowering and the assignment planner
//! - [`lvalue`]: Assignment target classification
//! - [`options`]: Runtime names used by the generated code
//! - [`temps`]: Temporary variable allocation

pub mod clone_policy;
pub mod context;
pub mod emit;
pub mod expr;
pub mod lvalue;
pub mod options;
pub mod temps;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{EnclosingMember, LoweringContext};
pub use expr::{ExprLowerer, Lowered};
pub use options::LoweringOptions;
pub use temps::TemporaryAllocator;

// Re-export the shared types callers need alongside the entry point
pub use sablejs_core::{Diagnostic, DiagnosticSink, Diagnostics, ErrorCode, JsExpr, JsStmt, LoweringError};

use sablejs_core::ast::AssignExpr;

/// Whether the caller consumes the value of the assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueUsage {
    /// Statement context: `a = b;`
    Discarded,
    /// The assignment is a sub-expression; its value is used.
    Used,
}

/// Output of [`lower_assignment`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoweredAssignment {
    /// Statements to splice in before the point of use, in order.
    pub statements: Vec<JsStmt>,
    /// Expression standing for the assignment's value; `None` when the value
    /// is discarded or lowering failed.
    pub result: Option<JsExpr>,
}

impl LoweredAssignment {
    /// Whether nothing was produced.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.result.is_none()
    }
}

/// Lower one assignment or compound assignment.
///
/// Errors are reported to the context's diagnostic sink exactly once and
/// yield an empty [`LoweredAssignment`], so the caller can keep compiling
/// and collect further diagnostics.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn lower_assignment<'ast>(
    assign: &'ast AssignExpr<'ast>,
    usage: ValueUsage,
    ctx: &mut LoweringContext<'_>,
) -> LoweredAssignment {
    let outcome = ExprLowerer::new(ctx).lower_assignment(assign, usage);
    match outcome {
        Ok(Lowered { mut stmts, expr, .. }) => match usage {
            ValueUsage::Discarded => {
                stmts.push(JsStmt::Expr(expr));
                tracing::debug!(statements = stmts.len(), "lowered assignment");
                LoweredAssignment {
                    statements: stmts,
                    result: None,
                }
            }
            ValueUsage::Used => LoweredAssignment {
                statements: stmts,
                result: Some(expr),
            },
        },
        Err(err) => {
            tracing::warn!(code = %err.code(), span = %err.span(), "assignment lowering failed: {err}");
            ctx.report(Diagnostic::from(&err));
            LoweredAssignment::default()
        }
    }
}
