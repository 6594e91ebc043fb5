//! Side-effect and invariance queries over resolved expressions.

use sablejs_core::ast::{DynamicAccess, Expr, IndexerTarget, Receiver};
use sablejs_core::{PropertyImpl, ScriptMetadata};

fn receiver_expr<'ast>(receiver: Receiver<'ast>) -> Option<&'ast Expr<'ast>> {
    match receiver {
        Receiver::Instance(expr) => Some(expr),
        Receiver::Static(_) | Receiver::Base(_) => None,
    }
}

fn receiver_has_side_effects(receiver: Receiver<'_>, metadata: &dyn ScriptMetadata) -> bool {
    receiver_expr(receiver).is_some_and(|expr| has_side_effects(expr, metadata))
}

/// Whether evaluating `expr` may have an observable effect, including
/// running script code (accessor calls).
pub fn has_side_effects(expr: &Expr<'_>, metadata: &dyn ScriptMetadata) -> bool {
    match expr {
        Expr::Literal(_) | Expr::Local(_) | Expr::This(_) | Expr::Default(_) => false,
        Expr::Call(_) | Expr::Assign(_) => true,
        Expr::Field(field) => receiver_has_side_effects(field.receiver, metadata),
        Expr::Property(property) => match metadata.property_semantics(property.property).normalized() {
            PropertyImpl::Field { .. } => receiver_has_side_effects(property.receiver, metadata),
            _ => true,
        },
        Expr::Indexer(indexer) => {
            let native = match indexer.target {
                IndexerTarget::Resolved(property) => {
                    metadata.property_semantics(property).normalized() == PropertyImpl::NativeIndexer
                }
                IndexerTarget::Dynamic(candidates) => candidates
                    .first()
                    .is_some_and(|p| metadata.property_semantics(p).normalized() == PropertyImpl::NativeIndexer),
            };
            !native
                || receiver_has_side_effects(indexer.receiver, metadata)
                || indexer.args.iter().any(|a| has_side_effects(a.value, metadata))
        }
        Expr::ArrayElement(element) => {
            has_side_effects(element.array, metadata) || element.indices.iter().any(|i| has_side_effects(i, metadata))
        }
        Expr::Dynamic(dynamic) => {
            has_side_effects(dynamic.receiver, metadata)
                || match dynamic.access {
                    DynamicAccess::Member(_) => false,
                    DynamicAccess::Index(args) => args.iter().any(|a| has_side_effects(a.value, metadata)),
                }
        }
        Expr::Binary(binary) => has_side_effects(binary.left, metadata) || has_side_effects(binary.right, metadata),
    }
}

/// Whether `expr` evaluates to the same value no matter when it is
/// evaluated relative to `later`.
pub fn is_invariant(expr: &Expr<'_>, later: &[&Expr<'_>]) -> bool {
    match expr {
        Expr::Literal(_) | Expr::This(_) | Expr::Default(_) => true,
        Expr::Local(local) => !local.local.is_by_ref() && !later.iter().any(|e| writes_local(e, local.local.name)),
        _ => false,
    }
}

/// Whether `expr` contains an assignment to the local `name`.
pub fn writes_local(expr: &Expr<'_>, name: &str) -> bool {
    let in_receiver = |receiver: Receiver<'_>| receiver_expr(receiver).is_some_and(|e| writes_local(e, name));
    match expr {
        Expr::Literal(_) | Expr::Local(_) | Expr::This(_) | Expr::Default(_) => false,
        Expr::Assign(assign) => {
            matches!(assign.target, Expr::Local(local) if local.local.name == name)
                || writes_local(assign.target, name)
                || writes_local(assign.value, name)
        }
        Expr::Field(field) => in_receiver(field.receiver),
        Expr::Property(property) => in_receiver(property.receiver),
        Expr::Indexer(indexer) => {
            in_receiver(indexer.receiver) || indexer.args.iter().any(|a| writes_local(a.value, name))
        }
        Expr::ArrayElement(element) => {
            writes_local(element.array, name) || element.indices.iter().any(|i| writes_local(i, name))
        }
        Expr::Dynamic(dynamic) => {
            writes_local(dynamic.receiver, name)
                || match dynamic.access {
                    DynamicAccess::Member(_) => false,
                    DynamicAccess::Index(args) => args.iter().any(|a| writes_local(a.value, name)),
                }
        }
        Expr::Call(call) => in_receiver(call.receiver) || call.args.iter().any(|a| writes_local(a, name)),
        Expr::Binary(binary) => writes_local(binary.left, name) || writes_local(binary.right, name),
    }
}
